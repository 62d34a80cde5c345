//! Runtime values for the script runtime.
//!
//! The value set is closed: `Bool`, `Int` (64-bit signed), `Float` (64-bit)
//! and `Str`. Strings live behind `Heap<str>`, which can only be created by
//! `Value::string`, so every string a script sees is immutable and cheaply
//! shared between frames, scopes and threads.
//!
//! # Widening reads
//!
//! The `as_*` readers never fail. They widen or narrow across kinds:
//!
//! | from \ to | `as_bool`  | `as_int`           | `as_float` | `as_string` |
//! |-----------|------------|--------------------|------------|-------------|
//! | Bool      | itself     | 0 / 1              | 0.0 / 1.0  | `""`        |
//! | Int       | `!= 0`     | itself             | widened    | `""`        |
//! | Float     | `!= 0.0`   | truncated toward 0 | itself     | `""`        |
//! | Str       | `false`    | 0                  | 0.0        | contents    |
//!
//! Host marshaling (`FromValue`) does not use these readers; it requires an
//! exact kind match.

mod heap;

use std::fmt;
use std::sync::Arc;

pub use heap::Heap;

/// A dynamically-typed script value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Immutable shared string.
    Str(Heap<str>),
}

impl Value {
    /// The value returned by a call that produced none.
    ///
    /// Script-visible as `false`.
    #[inline]
    pub const fn void() -> Self {
        Value::Bool(false)
    }

    /// Create a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Heap::from_arc(Arc::from(s.as_ref())))
    }

    /// The kind tag of this value.
    #[inline]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
        }
    }

    /// Readable kind name for diagnostics.
    #[inline]
    pub const fn type_name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// `Bool` or `Int` or `Float`.
    #[inline]
    pub const fn is_numeric(&self) -> bool {
        !matches!(self, Value::Str(_))
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(_) => false,
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "float to int truncates toward zero and saturates"
    )]
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Bool(b) => i64::from(*b),
            Value::Int(n) => *n,
            Value::Float(f) => *f as i64,
            Value::Str(_) => 0,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "integers widen to the nearest float"
    )]
    pub fn as_float(&self) -> f64 {
        match self {
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Int(n) => *n as f64,
            Value::Float(f) => *f,
            Value::Str(_) => 0.0,
        }
    }

    /// String contents, or `""` for non-strings.
    pub fn as_string(&self) -> &str {
        match self {
            Value::Str(s) => s,
            _ => "",
        }
    }

    /// String contents if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            // Debug keeps the fractional part: `2.0`, not `2`.
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

/// Kind tag of a `Value`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
}

impl ValueKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
