//! Marshaling between script `Value`s and host Rust types.
//!
//! Argument conversion is strict: a host parameter of type `i64` accepts
//! only `Value::Int`, never a `Float` or a numeric string. The widening
//! readers on `Value` (`as_int`, ...) exist for script semantics, not for
//! the host boundary.

use std::fmt;

use crate::{Value, ValueKind};

/// Declared kind of a host function parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParamKind {
    Bool,
    Int,
    Float,
    Str,
    /// Accepts any value unchanged.
    Any,
}

impl ParamKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ParamKind::Bool => "bool",
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::Str => "string",
            ParamKind::Any => "any",
        }
    }

    /// Whether a value of `kind` converts to this parameter kind.
    pub const fn accepts(self, kind: ValueKind) -> bool {
        matches!(
            (self, kind),
            (ParamKind::Any, _)
                | (ParamKind::Bool, ValueKind::Bool)
                | (ParamKind::Int, ValueKind::Int)
                | (ParamKind::Float, ValueKind::Float)
                | (ParamKind::Str, ValueKind::Str)
        )
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `Value` could not be converted to the requested host type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: ParamKind,
        found: ValueKind,
    },
    #[error("{value} is out of range for {target}")]
    OutOfRange { target: &'static str, value: i64 },
}

/// Conversion from a script value into a host parameter type.
pub trait FromValue: Sized {
    /// The parameter kind this type accepts, reported in signatures.
    const PARAM: ParamKind;

    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

#[cold]
fn mismatch(expected: ParamKind, value: &Value) -> ConversionError {
    ConversionError::Mismatch {
        expected,
        found: value.kind(),
    }
}

impl FromValue for bool {
    const PARAM: ParamKind = ParamKind::Bool;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch(Self::PARAM, other)),
        }
    }
}

impl FromValue for i64 {
    const PARAM: ParamKind = ParamKind::Int;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Int(n) => Ok(*n),
            other => Err(mismatch(Self::PARAM, other)),
        }
    }
}

impl FromValue for i32 {
    const PARAM: ParamKind = ParamKind::Int;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        let n = i64::from_value(value)?;
        i32::try_from(n).map_err(|_| ConversionError::OutOfRange {
            target: "i32",
            value: n,
        })
    }
}

impl FromValue for f64 {
    const PARAM: ParamKind = ParamKind::Float;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(x) => Ok(*x),
            other => Err(mismatch(Self::PARAM, other)),
        }
    }
}

impl FromValue for String {
    const PARAM: ParamKind = ParamKind::Str;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            other => Err(mismatch(Self::PARAM, other)),
        }
    }
}

impl FromValue for Value {
    const PARAM: ParamKind = ParamKind::Any;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

/// Conversion from a host return type into a script value.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::string(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::string(self)
    }
}

/// `()` maps to the void sentinel.
impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::void()
    }
}

#[cfg(test)]
mod tests;
