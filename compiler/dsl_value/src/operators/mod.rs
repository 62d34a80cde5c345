//! Binary and unary operator semantics.
//!
//! Operands are classified before dispatch:
//! - **integer-like**: `Bool` (as 0/1) and `Int`
//! - **float**: `Float`
//! - **other**: `Str`
//!
//! Arithmetic runs in float precision when either operand is a `Float`, and in
//! checked integer precision otherwise. Comparisons run in float precision and
//! yield `Bool`. `and`/`or` require two `Bool`s and evaluate both sides here;
//! short-circuiting belongs to the evaluator's control flow. Two strings may
//! only be compared with `==` and `!=`.

use dsl_ir::{BinaryOp, UnaryOp};

use crate::{Value, ValueKind};

/// Why an operator produced no result.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OpError {
    #[error("division by zero")]
    DivideByZero,
    #[error("integer overflow in {0}")]
    Overflow(&'static str),
    #[error("cannot apply `{op}` to {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: ValueKind,
        right: ValueKind,
    },
    #[error("cannot apply unary `{op}` to {operand}")]
    UnaryTypeMismatch {
        op: &'static str,
        operand: ValueKind,
    },
}

/// Operand classification.
enum Operands {
    Int(i64, i64),
    Float(f64, f64),
}

fn classify(left: &Value, right: &Value) -> Option<Operands> {
    match (left, right) {
        (Value::Str(_), _) | (_, Value::Str(_)) => None,
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            Some(Operands::Float(left.as_float(), right.as_float()))
        }
        _ => Some(Operands::Int(left.as_int(), right.as_int())),
    }
}

#[cold]
fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> OpError {
    OpError::TypeMismatch {
        op: op.as_symbol(),
        left: left.kind(),
        right: right.kind(),
    }
}

/// Apply a binary operator to two evaluated operands.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, OpError> {
    if op.is_logical() {
        return eval_logical(op, left, right);
    }
    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        return match op {
            BinaryOp::Eq => Ok(Value::Bool(**a == **b)),
            BinaryOp::NotEq => Ok(Value::Bool(**a != **b)),
            _ => Err(mismatch(op, left, right)),
        };
    }
    let Some(operands) = classify(left, right) else {
        return Err(mismatch(op, left, right));
    };
    if op.is_comparison() {
        return Ok(Value::Bool(compare(op, left.as_float(), right.as_float())));
    }
    match operands {
        Operands::Int(a, b) => eval_int_arith(op, a, b),
        Operands::Float(a, b) => eval_float_arith(op, a, b),
    }
}

fn eval_logical(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, OpError> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(match op {
            BinaryOp::And => *a && *b,
            _ => *a || *b,
        })),
        _ => Err(mismatch(op, left, right)),
    }
}

fn compare(op: BinaryOp, a: f64, b: f64) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};

    let ord = a.partial_cmp(&b);
    match op {
        BinaryOp::Eq => ord == Some(Equal),
        BinaryOp::NotEq => ord != Some(Equal),
        BinaryOp::Lt => ord == Some(Less),
        BinaryOp::LtEq => matches!(ord, Some(Less | Equal)),
        BinaryOp::Gt => ord == Some(Greater),
        BinaryOp::GtEq => matches!(ord, Some(Greater | Equal)),
        _ => false,
    }
}

#[inline]
fn checked(result: Option<i64>, op_name: &'static str) -> Result<Value, OpError> {
    result.map(Value::Int).ok_or(OpError::Overflow(op_name))
}

fn eval_int_arith(op: BinaryOp, a: i64, b: i64) -> Result<Value, OpError> {
    match op {
        BinaryOp::Add => checked(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked(a.checked_mul(b), "multiplication"),
        BinaryOp::Div if b == 0 => Err(OpError::DivideByZero),
        BinaryOp::Div => checked(a.checked_div(b), "division"),
        BinaryOp::Mod if b == 0 => Err(OpError::DivideByZero),
        BinaryOp::Mod => checked(a.checked_rem(b), "remainder"),
        _ => Err(OpError::TypeMismatch {
            op: op.as_symbol(),
            left: ValueKind::Int,
            right: ValueKind::Int,
        }),
    }
}

fn eval_float_arith(op: BinaryOp, a: f64, b: f64) -> Result<Value, OpError> {
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div | BinaryOp::Mod if b == 0.0 => Err(OpError::DivideByZero),
        BinaryOp::Div => Ok(Value::Float(a / b)),
        BinaryOp::Mod => Ok(Value::Float(a % b)),
        _ => Err(OpError::TypeMismatch {
            op: op.as_symbol(),
            left: ValueKind::Float,
            right: ValueKind::Float,
        }),
    }
}

/// Apply a unary operator to an evaluated operand.
pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> Result<Value, OpError> {
    match (op, operand) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, Value::Int(n)) => checked(n.checked_neg(), "negation"),
        (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        _ => Err(OpError::UnaryTypeMismatch {
            op: op.as_symbol(),
            operand: operand.kind(),
        }),
    }
}

#[cfg(test)]
mod tests;
