//! Function registry and dispatch.
//!
//! Two independent tables, each behind its own read/write lock:
//! - **API table**: name to host function. Registration is generic over the
//!   host closure's parameter types (see [`NativeFn`]).
//! - **Script table**: script id to the script's `Ast` and the function
//!   definitions found in it by one pre-order traversal at load time.
//!
//! Evaluators resolve calls through [`Registry::resolve`]: the calling
//! script's own functions first, then API functions. Resolution clones the
//! entry out of the table, so no lock is held while a function runs and a
//! host function may itself register or invoke functions.

mod native;
mod qualified;

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, warn};

use dsl_ir::{Ast, Name, Node, NodeId, Parse, SharedAst};
use dsl_value::Value;

use crate::evaluator::{EvaluatorBuilder, RunStatus};
use crate::{malformed_tree, DispatchError, EvalResult, LoadError, SharedMutableRegistry};

pub use native::{NativeFn, NativeFunction, NativeReturn, Signature};
pub use qualified::{QualifiedName, ScriptId};

/// A function definition found in a loaded script.
#[derive(Clone, Debug)]
pub struct ScriptFunction {
    pub script: ScriptId,
    pub name: Name,
    pub ast: SharedAst,
    /// The `FunctionDefinition` node.
    pub definition: NodeId,
}

impl ScriptFunction {
    /// Declared parameter names, in order.
    pub fn parameters(&self) -> EvalResult<SmallVec<[Name; 4]>> {
        let Some(Node::FunctionDefinition { params, .. }) = self.ast.get(self.definition) else {
            return Err(malformed_tree(self.definition, "function definition"));
        };
        parameter_names(&self.ast, *params)
            .ok_or_else(|| malformed_tree(*params, "parameter list"))
    }

    /// The function's body block.
    pub fn body(&self) -> EvalResult<NodeId> {
        match self.ast.get(self.definition) {
            Some(Node::FunctionDefinition { body, .. }) if body.is_present() => Ok(*body),
            _ => Err(malformed_tree(self.definition, "function body")),
        }
    }
}

/// The target of a resolved call.
#[derive(Clone, Debug)]
pub enum Callable {
    Native(Arc<NativeFunction>),
    Script(ScriptFunction),
}

#[derive(Default)]
struct ApiTable {
    functions: FxHashMap<Name, Arc<NativeFunction>>,
}

struct ScriptEntry {
    ast: SharedAst,
    functions: FxHashMap<Name, NodeId>,
}

#[derive(Default)]
struct ScriptTable {
    scripts: FxHashMap<ScriptId, ScriptEntry>,
}

/// Catalogue of API and script functions.
///
/// Cloning produces another handle to the same tables.
#[derive(Clone, Default)]
pub struct Registry {
    api: SharedMutableRegistry<ApiTable>,
    scripts: SharedMutableRegistry<ScriptTable>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // API functions

    /// Register a host function with typed parameters.
    ///
    /// Re-registering a name replaces the previous function and logs a
    /// warning.
    pub fn register_fn<Args, F>(&self, name: impl AsRef<str>, f: F)
    where
        F: NativeFn<Args>,
    {
        self.insert_native(NativeFunction::typed(Name::new(name), f, false));
    }

    /// Register a host function whose calls suspend the calling script.
    ///
    /// The function runs when called; its return value is handed to the host
    /// in `RunStatus::Suspended` and becomes the call's result when the
    /// evaluator is resumed.
    pub fn register_yielding_fn<Args, F>(&self, name: impl AsRef<str>, f: F)
    where
        F: NativeFn<Args>,
    {
        self.insert_native(NativeFunction::typed(Name::new(name), f, true));
    }

    /// Register a host function taking any number of arguments.
    pub fn register_variadic<F>(&self, name: impl AsRef<str>, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, DispatchError> + Send + Sync + 'static,
    {
        self.insert_native(NativeFunction::variadic(Name::new(name), f));
    }

    fn insert_native(&self, function: NativeFunction) {
        let name = function.name().clone();
        let previous = self
            .api
            .write()
            .functions
            .insert(name.clone(), Arc::new(function));
        if previous.is_some() {
            warn!(function = %name, "API function registered twice; last registration wins");
        }
    }

    /// Remove a host function. Returns whether it existed.
    pub fn remove_fn(&self, name: &str) -> bool {
        self.api.write().functions.remove(name).is_some()
    }

    pub fn has_fn(&self, name: &str) -> bool {
        self.api.read().functions.contains_key(name)
    }

    /// Number of registered host functions.
    pub fn fn_count(&self) -> usize {
        self.api.read().functions.len()
    }

    pub fn signature(&self, name: &str) -> Option<Signature> {
        self.api
            .read()
            .functions
            .get(name)
            .map(|function| function.signature().clone())
    }

    // Script functions

    /// Register every function definition in `ast` under script `id`.
    ///
    /// Loading an id again replaces the whole entry. Returns the number of
    /// functions found.
    pub fn load_script(
        &self,
        id: impl Into<ScriptId>,
        ast: impl Into<SharedAst>,
    ) -> Result<usize, LoadError> {
        self.load(id.into(), ast.into())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(script = %id))]
    fn load(&self, id: ScriptId, ast: SharedAst) -> Result<usize, LoadError> {
        if ast.capacity_exceeded() {
            return Err(LoadError::CapacityExceeded { script: id });
        }
        match ast.get(ast.root()) {
            Some(Node::Program { .. }) => {}
            other => {
                return Err(LoadError::NotAProgram {
                    script: id,
                    found: other.map_or("nothing", |node| node.kind().as_str()),
                });
            }
        }

        // Traverse before taking the lock.
        let functions = collect_functions(&id, &ast)?;
        let count = functions.len();

        let previous = self
            .scripts
            .write()
            .scripts
            .insert(id, ScriptEntry { ast, functions });
        if previous.is_some() {
            warn!("script reloaded; previous functions replaced");
        }
        debug!(functions = count, "script loaded");
        Ok(count)
    }

    /// Parse `source` with `parser` and load the result.
    pub fn load_source<P: Parse + ?Sized>(
        &self,
        id: impl Into<ScriptId>,
        source: &str,
        parser: &P,
    ) -> Result<usize, LoadError> {
        let ast = parser.parse(source)?;
        self.load_script(id, ast)
    }

    /// Drop a script and all of its functions. Returns whether it existed.
    pub fn unload_script(&self, id: &ScriptId) -> bool {
        let removed = self.scripts.write().scripts.remove(id).is_some();
        if removed {
            debug!(script = %id, "script unloaded");
        }
        removed
    }

    /// Remove one function from a loaded script.
    pub fn remove_script_fn(&self, id: &ScriptId, name: &str) -> bool {
        self.scripts
            .write()
            .scripts
            .get_mut(id)
            .is_some_and(|entry| entry.functions.remove(name).is_some())
    }

    pub fn has_script(&self, id: &ScriptId) -> bool {
        self.scripts.read().scripts.contains_key(id)
    }

    pub fn has_script_fn(&self, id: &ScriptId, name: &str) -> bool {
        self.scripts
            .read()
            .scripts
            .get(id)
            .is_some_and(|entry| entry.functions.contains_key(name))
    }

    /// Number of functions registered for a script, if it is loaded.
    pub fn script_fn_count(&self, id: &ScriptId) -> Option<usize> {
        self.scripts
            .read()
            .scripts
            .get(id)
            .map(|entry| entry.functions.len())
    }

    /// The tree a script was loaded from.
    pub fn script_ast(&self, id: &ScriptId) -> Option<SharedAst> {
        self.scripts
            .read()
            .scripts
            .get(id)
            .map(|entry| Arc::clone(&entry.ast))
    }

    fn script_function(&self, id: &ScriptId, name: &Name) -> Option<ScriptFunction> {
        let scripts = self.scripts.read();
        let entry = scripts.scripts.get(id)?;
        let definition = *entry.functions.get(name)?;
        Some(ScriptFunction {
            script: id.clone(),
            name: name.clone(),
            ast: Arc::clone(&entry.ast),
            definition,
        })
    }

    // Dispatch

    /// Resolve a call made from `script`: its own functions first, then API
    /// functions.
    pub fn resolve(&self, script: Option<&ScriptId>, name: &Name) -> Option<Callable> {
        if let Some(function) = script.and_then(|id| self.script_function(id, name)) {
            return Some(Callable::Script(function));
        }
        self.api
            .read()
            .functions
            .get(name)
            .map(|function| Callable::Native(Arc::clone(function)))
    }

    /// Whether `target` resolves to a function.
    pub fn has(&self, target: impl Into<QualifiedName>) -> bool {
        let target = target.into();
        self.resolve(target.script.as_ref(), &target.function)
            .is_some()
    }

    /// Remove the function `target` names: a script function when scoped,
    /// an API function otherwise.
    pub fn remove(&self, target: impl Into<QualifiedName>) -> bool {
        let target = target.into();
        match &target.script {
            Some(id) => self.remove_script_fn(id, target.function.as_str()),
            None => self.remove_fn(target.function.as_str()),
        }
    }

    /// Invoke a function by name with dynamically-typed arguments.
    ///
    /// `"script::function"` resolves in that script's functions first, then
    /// among API functions. An unscoped `"function"` only ever names an API
    /// function: script functions are never reached without their script.
    ///
    /// A script function runs on a fresh evaluator to completion; its
    /// suspension points resume immediately with the value they produced.
    #[tracing::instrument(level = "debug", skip_all, fields(function = tracing::field::Empty))]
    pub fn invoke(
        &self,
        target: impl Into<QualifiedName>,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        let target = target.into();
        tracing::Span::current().record("function", tracing::field::display(&target));

        if let Some(id) = &target.script {
            if !self.has_script(id) {
                return Err(DispatchError::ScriptNotFound(id.clone()));
            }
        }
        let callable = self
            .resolve(target.script.as_ref(), &target.function)
            .ok_or_else(|| DispatchError::FunctionNotFound(target.clone()))?;

        match callable {
            Callable::Native(function) => function.call(args),
            Callable::Script(function) => run_to_completion(self, &target, function, args),
        }
    }
}

fn run_to_completion(
    registry: &Registry,
    target: &QualifiedName,
    function: ScriptFunction,
    args: &[Value],
) -> Result<Value, DispatchError> {
    let into_dispatch = |error| DispatchError::Script {
        function: target.clone(),
        error: Box::new(error),
    };
    let mut evaluator =
        EvaluatorBuilder::new(registry).build_function(function, args.to_vec())?;
    loop {
        match evaluator.run().map_err(into_dispatch)? {
            RunStatus::Completed(value) => return Ok(value.unwrap_or_else(Value::void)),
            RunStatus::Suspended(suspension) => {
                debug!(function = %suspension.function, "resuming synchronous call");
            }
            RunStatus::Pending => {}
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("api_functions", &self.fn_count())
            .field("scripts", &self.scripts.read().scripts.len())
            .finish()
    }
}

/// Names of a `FunctionParameterList` node's parameters.
pub(crate) fn parameter_names(ast: &Ast, params: NodeId) -> Option<SmallVec<[Name; 4]>> {
    let Some(Node::FunctionParameterList { names }) = ast.get(params) else {
        return None;
    };
    if !names.is_present() {
        return Some(SmallVec::new());
    }
    let Some(Node::NameList(range)) = ast.get(*names) else {
        return None;
    };
    ast.list(*range)
        .iter()
        .map(|&id| ast.name_of(id).cloned())
        .collect()
}

/// Find every function definition in a script, in document order.
fn collect_functions(script: &ScriptId, ast: &Ast) -> Result<FxHashMap<Name, NodeId>, LoadError> {
    let mut functions = FxHashMap::default();
    for (id, node) in ast.pre_order(ast.root()) {
        let Node::FunctionDefinition { name, params, body } = node else {
            continue;
        };
        let malformed = || LoadError::MalformedFunction {
            script: script.clone(),
            node: id,
        };
        let name = ast.name_of(*name).ok_or_else(malformed)?;
        if parameter_names(ast, *params).is_none() || !matches!(ast.get(*body), Some(Node::Block(_)))
        {
            return Err(malformed());
        }
        if functions.insert(name.clone(), id).is_some() {
            warn!(function = %name, "function defined twice in one script; last definition wins");
        }
    }
    Ok(functions)
}
