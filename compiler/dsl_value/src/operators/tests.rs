use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn bin(op: BinaryOp, left: Value, right: Value) -> Result<Value, OpError> {
    evaluate_binary(op, &left, &right)
}

#[test]
fn test_int_arithmetic_stays_int() {
    assert_eq!(bin(BinaryOp::Add, Value::Int(2), Value::Int(3)), Ok(Value::Int(5)));
    assert_eq!(bin(BinaryOp::Sub, Value::Int(2), Value::Int(3)), Ok(Value::Int(-1)));
    assert_eq!(bin(BinaryOp::Mul, Value::Int(4), Value::Int(3)), Ok(Value::Int(12)));
    assert_eq!(bin(BinaryOp::Div, Value::Int(7), Value::Int(2)), Ok(Value::Int(3)));
    assert_eq!(bin(BinaryOp::Mod, Value::Int(7), Value::Int(2)), Ok(Value::Int(1)));
}

#[test]
fn test_float_promotes() {
    assert_eq!(bin(BinaryOp::Add, Value::Int(1), Value::Float(0.5)), Ok(Value::Float(1.5)));
    assert_eq!(bin(BinaryOp::Div, Value::Float(5.0), Value::Int(2)), Ok(Value::Float(2.5)));
    assert_eq!(bin(BinaryOp::Mul, Value::Bool(true), Value::Float(2.5)), Ok(Value::Float(2.5)));
}

#[test]
fn test_bool_counts_as_int() {
    assert_eq!(bin(BinaryOp::Add, Value::Bool(true), Value::Int(1)), Ok(Value::Int(2)));
    assert_eq!(bin(BinaryOp::Add, Value::Bool(true), Value::Bool(true)), Ok(Value::Int(2)));
}

#[test]
fn test_divide_by_zero_is_error() {
    assert_eq!(bin(BinaryOp::Div, Value::Int(5), Value::Int(0)), Err(OpError::DivideByZero));
    assert_eq!(bin(BinaryOp::Mod, Value::Int(5), Value::Int(0)), Err(OpError::DivideByZero));
    assert_eq!(bin(BinaryOp::Div, Value::Float(5.0), Value::Int(0)), Err(OpError::DivideByZero));
    assert_eq!(bin(BinaryOp::Mod, Value::Int(5), Value::Float(0.0)), Err(OpError::DivideByZero));
    assert_eq!(bin(BinaryOp::Div, Value::Int(5), Value::Bool(false)), Err(OpError::DivideByZero));
}

#[test]
fn test_fractional_divisor_is_not_zero() {
    assert_eq!(bin(BinaryOp::Div, Value::Float(5.0), Value::Float(0.5)), Ok(Value::Float(10.0)));
}

#[test]
fn test_integer_overflow() {
    assert_eq!(
        bin(BinaryOp::Add, Value::Int(i64::MAX), Value::Int(1)),
        Err(OpError::Overflow("addition"))
    );
    assert_eq!(
        bin(BinaryOp::Div, Value::Int(i64::MIN), Value::Int(-1)),
        Err(OpError::Overflow("division"))
    );
    assert_eq!(
        evaluate_unary(UnaryOp::Neg, &Value::Int(i64::MIN)),
        Err(OpError::Overflow("negation"))
    );
}

#[test]
fn test_comparisons_yield_bool() {
    assert_eq!(bin(BinaryOp::Lt, Value::Int(1), Value::Float(1.5)), Ok(Value::Bool(true)));
    assert_eq!(bin(BinaryOp::GtEq, Value::Int(2), Value::Int(2)), Ok(Value::Bool(true)));
    assert_eq!(bin(BinaryOp::Eq, Value::Int(1), Value::Float(1.0)), Ok(Value::Bool(true)));
    assert_eq!(bin(BinaryOp::NotEq, Value::Bool(true), Value::Int(1)), Ok(Value::Bool(false)));
    assert_eq!(
        bin(BinaryOp::Eq, Value::Float(f64::NAN), Value::Float(f64::NAN)),
        Ok(Value::Bool(false))
    );
}

#[test]
fn test_string_equality_only() {
    assert_eq!(
        bin(BinaryOp::Eq, Value::string("a"), Value::string("a")),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        bin(BinaryOp::NotEq, Value::string("a"), Value::string("b")),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        bin(BinaryOp::Add, Value::string("a"), Value::string("b")),
        Err(OpError::TypeMismatch {
            op: "+",
            left: ValueKind::Str,
            right: ValueKind::Str,
        })
    );
    assert_eq!(
        bin(BinaryOp::Eq, Value::string("1"), Value::Int(1)),
        Err(OpError::TypeMismatch {
            op: "==",
            left: ValueKind::Str,
            right: ValueKind::Int,
        })
    );
}

#[test]
fn test_logical_requires_bool() {
    assert_eq!(bin(BinaryOp::And, Value::Bool(true), Value::Bool(false)), Ok(Value::Bool(false)));
    assert_eq!(bin(BinaryOp::Or, Value::Bool(false), Value::Bool(true)), Ok(Value::Bool(true)));
    assert_eq!(
        bin(BinaryOp::And, Value::Int(1), Value::Bool(true)),
        Err(OpError::TypeMismatch {
            op: "and",
            left: ValueKind::Int,
            right: ValueKind::Bool,
        })
    );
}

#[test]
fn test_unary() {
    assert_eq!(evaluate_unary(UnaryOp::Not, &Value::Bool(true)), Ok(Value::Bool(false)));
    assert_eq!(evaluate_unary(UnaryOp::Neg, &Value::Int(3)), Ok(Value::Int(-3)));
    assert_eq!(evaluate_unary(UnaryOp::Neg, &Value::Float(1.5)), Ok(Value::Float(-1.5)));
    assert_eq!(
        evaluate_unary(UnaryOp::Not, &Value::Int(0)),
        Err(OpError::UnaryTypeMismatch {
            op: "not",
            operand: ValueKind::Int,
        })
    );
    assert_eq!(
        evaluate_unary(UnaryOp::Neg, &Value::Bool(true)),
        Err(OpError::UnaryTypeMismatch {
            op: "-",
            operand: ValueKind::Bool,
        })
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(OpError::DivideByZero.to_string(), "division by zero");
    assert_eq!(
        OpError::TypeMismatch {
            op: "<",
            left: ValueKind::Str,
            right: ValueKind::Float,
        }
        .to_string(),
        "cannot apply `<` to string and float"
    );
}

fn numeric() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        (-1_000_000_i64..1_000_000).prop_map(Value::Int),
        (-1.0e6..1.0e6_f64).prop_map(Value::Float),
    ]
}

proptest! {
    #[test]
    fn prop_comparisons_always_bool(a in numeric(), b in numeric()) {
        for op in BinaryOp::ALL.into_iter().filter(|op| op.is_comparison()) {
            let result = evaluate_binary(op, &a, &b);
            prop_assert!(matches!(result, Ok(Value::Bool(_))));
        }
    }

    #[test]
    fn prop_result_kind_follows_operands(a in numeric(), b in numeric()) {
        let either_float = matches!(a, Value::Float(_)) || matches!(b, Value::Float(_));
        for op in [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul] {
            let Ok(result) = evaluate_binary(op, &a, &b) else {
                continue;
            };
            let expected = if either_float { ValueKind::Float } else { ValueKind::Int };
            prop_assert_eq!(result.kind(), expected);
        }
    }

    #[test]
    fn prop_int_addition_commutes(a in any::<i32>(), b in any::<i32>()) {
        let (a, b) = (Value::Int(i64::from(a)), Value::Int(i64::from(b)));
        prop_assert_eq!(
            evaluate_binary(BinaryOp::Add, &a, &b),
            evaluate_binary(BinaryOp::Add, &b, &a)
        );
    }

    #[test]
    fn prop_lt_matches_gt_swapped(a in numeric(), b in numeric()) {
        prop_assert_eq!(
            evaluate_binary(BinaryOp::Lt, &a, &b),
            evaluate_binary(BinaryOp::Gt, &b, &a)
        );
    }

    #[test]
    fn prop_int_division_by_zero(a in any::<i64>()) {
        prop_assert_eq!(
            evaluate_binary(BinaryOp::Div, &Value::Int(a), &Value::Int(0)),
            Err(OpError::DivideByZero)
        );
        prop_assert_eq!(
            evaluate_binary(BinaryOp::Mod, &Value::Int(a), &Value::Int(0)),
            Err(OpError::DivideByZero)
        );
    }
}
