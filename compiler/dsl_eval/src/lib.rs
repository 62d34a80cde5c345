//! DSL Eval - Evaluator and function registry for the script runtime
//!
//! - `Evaluator`: a non-recursive, resumable state machine over an explicit
//!   frame stack. Every `step()` performs one frame transition, so a host can
//!   interleave many scripts, bound their work, and resume them after a
//!   suspension point.
//! - `Registry`: the catalogue of host (API) functions and per-script
//!   functions, shared between evaluators and threads behind read/write locks.
//! - `stdlib`: `print`, `wait` and `type_of` host functions.
//!
//! # Example
//!
//! ```text
//! let registry = Registry::new();
//! registry.register_fn("add", |a: i64, b: i64| a + b);
//! registry.load_script("main", ast)?;
//!
//! let mut evaluator = EvaluatorBuilder::new(&registry).build_program("main")?;
//! match evaluator.run()? {
//!     RunStatus::Completed(result) => { /* ... */ }
//!     RunStatus::Suspended(suspension) => { /* schedule, then run() again */ }
//!     RunStatus::Pending => unreachable!(),
//! }
//! ```

mod environment;
mod errors;
mod evaluator;
mod logging;
mod registry;
mod shared;
pub mod stdlib;

pub use environment::Environment;
pub use errors::{
    break_outside_loop, call_depth_exceeded, divide_by_zero, integer_overflow, invalid_for_step,
    malformed_tree, not_boolean, type_mismatch, unknown_variable, unresolved_function,
    DispatchError, EvalError, EvalErrorKind, EvalResult, LoadError,
};
pub use evaluator::{
    EvalConfig, Evaluator, EvaluatorBuilder, Frame, FrameState, RunStatus, Signal, Suspension,
};
pub use logging::init_tracing;
pub use registry::{
    Callable, NativeFn, NativeFunction, NativeReturn, QualifiedName, Registry, ScriptFunction,
    ScriptId, Signature,
};
pub use shared::SharedMutableRegistry;
