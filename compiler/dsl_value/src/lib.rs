//! DSL Value - Runtime values for the script runtime
//!
//! - `Value`: the closed set of dynamically-typed script values
//! - `evaluate_binary` / `evaluate_unary`: operator semantics over `Value`s
//! - `FromValue` / `IntoValue`: marshaling between `Value`s and host types
//!
//! Operators never panic. Unsupported operand kinds, division by zero and
//! integer overflow are reported as `OpError`, which the evaluator turns into
//! an error outcome for the current frame.

mod convert;
mod operators;
mod value;

pub use convert::{ConversionError, FromValue, IntoValue, ParamKind};
pub use operators::{evaluate_binary, evaluate_unary, OpError};
pub use value::{Heap, Value, ValueKind};
