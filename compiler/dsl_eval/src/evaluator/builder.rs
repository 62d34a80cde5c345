//! `EvaluatorBuilder` for creating `Evaluator` instances.

use dsl_ir::Name;
use dsl_value::{IntoValue, Value};

use super::{Activation, Entry, Evaluator};
use crate::registry::{Callable, QualifiedName, Registry, ScriptFunction, ScriptId};
use crate::{DispatchError, Environment};

/// Evaluator settings a host may tune.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Reads that miss the current activation fall back to globals.
    pub global_fallback: bool,
    /// Maximum number of nested script function activations.
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            global_fallback: true,
            max_call_depth: 256,
        }
    }
}

/// Builder for creating `Evaluator` instances.
///
/// An evaluator either runs a loaded script's top level
/// ([`build_program`](Self::build_program)) or a single script function
/// with arguments ([`build_call`](Self::build_call)).
pub struct EvaluatorBuilder {
    registry: Registry,
    config: EvalConfig,
    globals: Vec<(Name, Value)>,
}

impl EvaluatorBuilder {
    pub fn new(registry: &Registry) -> Self {
        EvaluatorBuilder {
            registry: registry.clone(),
            config: EvalConfig::default(),
            globals: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn global_fallback(mut self, enabled: bool) -> Self {
        self.config.global_fallback = enabled;
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    /// Predefine a global variable.
    #[must_use]
    pub fn global(mut self, name: impl AsRef<str>, value: impl IntoValue) -> Self {
        self.globals.push((Name::new(name), value.into_value()));
        self
    }

    /// Evaluator for the top level of a loaded script.
    pub fn build_program(self, script: impl Into<ScriptId>) -> Result<Evaluator, DispatchError> {
        let script = script.into();
        let Some(ast) = self.registry.script_ast(&script) else {
            return Err(DispatchError::ScriptNotFound(script));
        };
        let root = ast.root();
        let mut evaluator = self.into_evaluator(
            Entry::Program,
            Activation {
                script,
                ast,
                function: None,
            },
        );
        // A missing root surfaces from the first `run`.
        if let Err(error) = evaluator.push_frame(root, 0) {
            evaluator.error = Some(error);
        }
        Ok(evaluator)
    }

    /// Evaluator for one call of a script function.
    ///
    /// `target` must name a script function (`"script::function"`); the
    /// completed result is its return value, or the void sentinel.
    pub fn build_call(
        self,
        target: impl Into<QualifiedName>,
        args: Vec<Value>,
    ) -> Result<Evaluator, DispatchError> {
        let target = target.into();
        let Some(script) = &target.script else {
            return Err(DispatchError::FunctionNotFound(target));
        };
        if !self.registry.has_script(script) {
            return Err(DispatchError::ScriptNotFound(script.clone()));
        }
        match self.registry.resolve(Some(script), &target.function) {
            Some(Callable::Script(function)) => self.build_function(function, args),
            Some(Callable::Native(_)) | None => Err(DispatchError::FunctionNotFound(target)),
        }
    }

    pub(crate) fn build_function(
        self,
        function: ScriptFunction,
        args: Vec<Value>,
    ) -> Result<Evaluator, DispatchError> {
        let qualified = || QualifiedName {
            script: Some(function.script.clone()),
            function: function.name.clone(),
        };
        let into_dispatch = |error| DispatchError::Script {
            function: qualified(),
            error: Box::new(error),
        };

        let params = function.parameters().map_err(into_dispatch)?;
        if params.len() != args.len() {
            return Err(DispatchError::ArityMismatch {
                function: function.name.clone(),
                expected: params.len(),
                found: args.len(),
            });
        }
        let body = function.body().map_err(into_dispatch)?;

        let mut evaluator = self.into_evaluator(
            Entry::Function,
            Activation {
                script: function.script.clone(),
                ast: function.ast.clone(),
                function: Some(function.name.clone()),
            },
        );
        evaluator.call_depth = 1;
        for (param, arg) in params.into_iter().zip(args) {
            evaluator.env.assign(param, arg);
        }
        evaluator.push_frame(body, 0).map_err(into_dispatch)?;
        Ok(evaluator)
    }

    fn into_evaluator(self, entry: Entry, root: Activation) -> Evaluator {
        let mut env = Environment::new(self.config.global_fallback);
        for (name, value) in self.globals {
            env.assign_global(name, value);
        }
        Evaluator::new(self.registry, self.config, env, entry, root)
    }
}
