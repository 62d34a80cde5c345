//! Error types and centralized error constructors.
//!
//! - `EvalError`: why a `run` stopped; carries the node of the frame that
//!   failed. Built through the factory functions below.
//! - `DispatchError`: why a by-name invocation failed (arity, argument
//!   kinds, unknown function, host failure).
//! - `LoadError`: why a script could not be registered.

use std::fmt;

use dsl_ir::{Name, NodeId, ParseFailure};
use dsl_value::{ConversionError, OpError, ValueKind};

use crate::registry::{QualifiedName, ScriptId};

/// Result of evaluation operations.
pub type EvalResult<T = dsl_value::Value> = Result<T, EvalError>;

/// Structured category of an evaluation error.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalErrorKind {
    UnknownVariable {
        name: Name,
    },
    /// Operator or loop bound applied to an unsupported kind.
    TypeMismatch {
        message: String,
    },
    DivideByZero,
    IntegerOverflow {
        operation: &'static str,
    },
    UnresolvedFunction {
        name: Name,
    },
    BreakOutsideLoop,
    /// A call failed at the dispatch bridge.
    Dispatch(DispatchError),
    /// A node is missing a required child or has a child of the wrong kind.
    MalformedTree {
        node: NodeId,
        expected: &'static str,
    },
    CallDepthExceeded {
        limit: usize,
    },
    InvalidForStep,
    /// `if` / `while` condition was not a Bool.
    NotBoolean {
        context: &'static str,
        found: ValueKind,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVariable { name } => write!(f, "unknown variable: {name}"),
            Self::TypeMismatch { message } => write!(f, "type mismatch: {message}"),
            Self::DivideByZero => write!(f, "division by zero"),
            Self::IntegerOverflow { operation } => {
                write!(f, "integer overflow in {operation}")
            }
            Self::UnresolvedFunction { name } => write!(f, "unresolved function: {name}"),
            Self::BreakOutsideLoop => write!(f, "`break` outside of a loop"),
            Self::Dispatch(err) => write!(f, "{err}"),
            Self::MalformedTree { node, expected } => {
                write!(f, "malformed tree at {node}: expected {expected}")
            }
            Self::CallDepthExceeded { limit } => {
                write!(f, "maximum call depth of {limit} exceeded")
            }
            Self::InvalidForStep => write!(f, "`for` step must not be zero"),
            Self::NotBoolean { context, found } => {
                write!(f, "{context} condition must be bool, found {found}")
            }
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Node of the frame that failed, when known.
    pub node: Option<NodeId>,
}

impl EvalError {
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        EvalError { kind, node: None }
    }

    /// Attach the failing node unless one is already recorded.
    #[must_use]
    pub fn at(mut self, node: NodeId) -> Self {
        if self.node.is_none() {
            self.node = Some(node);
        }
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(node) => write!(f, "{} (at {node})", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            EvalErrorKind::Dispatch(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OpError> for EvalError {
    fn from(err: OpError) -> Self {
        match err {
            OpError::DivideByZero => divide_by_zero(),
            OpError::Overflow(operation) => integer_overflow(operation),
            mismatch @ (OpError::TypeMismatch { .. } | OpError::UnaryTypeMismatch { .. }) => {
                type_mismatch(mismatch)
            }
        }
    }
}

impl From<DispatchError> for EvalError {
    fn from(err: DispatchError) -> Self {
        EvalError::from_kind(EvalErrorKind::Dispatch(err))
    }
}

// Factories

#[cold]
pub fn unknown_variable(name: &Name) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownVariable { name: name.clone() })
}

#[cold]
pub fn type_mismatch(message: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        message: message.to_string(),
    })
}

#[cold]
pub fn divide_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivideByZero)
}

#[cold]
pub fn integer_overflow(operation: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow { operation })
}

#[cold]
pub fn unresolved_function(name: &Name) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnresolvedFunction { name: name.clone() })
}

#[cold]
pub fn break_outside_loop() -> EvalError {
    EvalError::from_kind(EvalErrorKind::BreakOutsideLoop)
}

#[cold]
pub fn malformed_tree(node: NodeId, expected: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MalformedTree { node, expected }).at(node)
}

#[cold]
pub fn call_depth_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CallDepthExceeded { limit })
}

#[cold]
pub fn invalid_for_step() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidForStep)
}

#[cold]
pub fn not_boolean(context: &'static str, found: ValueKind) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotBoolean { context, found })
}

/// Failure to invoke a function by name.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("`{function}` expects {expected} argument(s), got {found}")]
    ArityMismatch {
        function: Name,
        expected: usize,
        found: usize,
    },
    #[error("argument {position} of `{function}`: {source}")]
    ArgumentTypeMismatch {
        function: Name,
        /// 1-based argument position.
        position: usize,
        source: ConversionError,
    },
    #[error("function `{0}` not found")]
    FunctionNotFound(QualifiedName),
    #[error("script `{0}` is not loaded")]
    ScriptNotFound(ScriptId),
    #[error("`{function}` failed: {message}")]
    HostFailure { function: Name, message: String },
    #[error("script function `{function}` failed: {error}")]
    Script {
        function: QualifiedName,
        error: Box<EvalError>,
    },
}

impl DispatchError {
    /// Host-side failure raised by a native function body.
    pub fn host_failure(function: &Name, message: impl fmt::Display) -> Self {
        DispatchError::HostFailure {
            function: function.clone(),
            message: message.to_string(),
        }
    }
}

/// Failure to register a script.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("failed to parse script: {0}")]
    Parse(#[from] ParseFailure),
    #[error("script `{script}` root is {found}, expected a program")]
    NotAProgram {
        script: ScriptId,
        found: &'static str,
    },
    #[error("malformed function definition at {node} in script `{script}`")]
    MalformedFunction { script: ScriptId, node: NodeId },
    #[error("script `{script}` is too large: its tree ran out of node indices")]
    CapacityExceeded { script: ScriptId },
}
