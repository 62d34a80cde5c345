//! Variable scoping for one evaluator.
//!
//! One `Scope` per function activation, kept on a stack; the bottom scope
//! belongs to the program activation and lives as long as the evaluator.
//! A separate global map sits beside the stack.
//!
//! - Reads check the current activation's scope, then the global map when
//!   global fallback is enabled.
//! - Writes update or create a binding in the current activation's scope,
//!   unless the assignment is declared global.

use rustc_hash::FxHashMap;

use dsl_ir::Name;
use dsl_value::Value;

/// Bindings of one function activation.
#[derive(Clone, Debug, Default)]
struct Scope {
    bindings: FxHashMap<Name, Value>,
}

/// Environment for the evaluator using a scope stack.
#[derive(Clone, Debug)]
pub struct Environment {
    /// Activation scopes, current one at the top. Never empty.
    scopes: Vec<Scope>,
    globals: FxHashMap<Name, Value>,
    global_fallback: bool,
}

impl Environment {
    /// Create an environment holding only the program activation.
    pub fn new(global_fallback: bool) -> Self {
        Environment {
            scopes: vec![Scope::default()],
            globals: FxHashMap::default(),
            global_fallback,
        }
    }

    /// Number of activation scopes, including the program's.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Enter a function activation.
    #[inline]
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Leave a function activation. The program scope is never popped.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Look up a variable: current scope first, then globals.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.local(name) {
            return Some(value);
        }
        if self.global_fallback {
            return self.global(name);
        }
        None
    }

    /// Look up a variable in the current activation only.
    pub fn local(&self, name: &str) -> Option<Value> {
        self.scopes
            .last()
            .and_then(|scope| scope.bindings.get(name))
            .cloned()
    }

    /// Look up a global variable.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.get(name).cloned()
    }

    /// Bind `name` in the current activation, updating an existing binding.
    #[inline]
    pub fn assign(&mut self, name: Name, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name, value);
        }
    }

    /// Bind `name` in the global map.
    pub fn assign_global(&mut self, name: Name, value: Value) {
        self.globals.insert(name, value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(true)
    }
}
