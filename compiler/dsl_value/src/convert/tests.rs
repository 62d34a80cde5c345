use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_exact_kind_match() {
    assert_eq!(bool::from_value(&Value::Bool(true)), Ok(true));
    assert_eq!(i64::from_value(&Value::Int(-9)), Ok(-9));
    assert_eq!(f64::from_value(&Value::Float(0.5)), Ok(0.5));
    assert_eq!(String::from_value(&Value::string("hi")), Ok("hi".to_owned()));
}

#[test]
fn test_no_silent_widening() {
    assert_eq!(
        i64::from_value(&Value::Float(1.0)),
        Err(ConversionError::Mismatch {
            expected: ParamKind::Int,
            found: ValueKind::Float,
        })
    );
    assert_eq!(
        f64::from_value(&Value::Int(1)),
        Err(ConversionError::Mismatch {
            expected: ParamKind::Float,
            found: ValueKind::Int,
        })
    );
    assert_eq!(
        bool::from_value(&Value::Int(1)),
        Err(ConversionError::Mismatch {
            expected: ParamKind::Bool,
            found: ValueKind::Int,
        })
    );
    assert!(String::from_value(&Value::Bool(false)).is_err());
}

#[test]
fn test_i32_range_checked() {
    assert_eq!(i32::from_value(&Value::Int(42)), Ok(42));
    assert_eq!(
        i32::from_value(&Value::Int(i64::from(i32::MAX) + 1)),
        Err(ConversionError::OutOfRange {
            target: "i32",
            value: 2_147_483_648,
        })
    );
}

#[test]
fn test_value_accepts_anything() {
    assert_eq!(Value::from_value(&Value::string("x")), Ok(Value::string("x")));
    assert_eq!(<Value as FromValue>::PARAM, ParamKind::Any);
}

#[test]
fn test_param_kind_accepts() {
    assert!(ParamKind::Int.accepts(ValueKind::Int));
    assert!(!ParamKind::Int.accepts(ValueKind::Float));
    assert!(ParamKind::Any.accepts(ValueKind::Str));
    assert_eq!(<i32 as FromValue>::PARAM, ParamKind::Int);
}

#[test]
fn test_into_value() {
    assert_eq!(7_i32.into_value(), Value::Int(7));
    assert_eq!(2.5.into_value(), Value::Float(2.5));
    assert_eq!("s".into_value(), Value::string("s"));
    assert_eq!(String::from("t").into_value(), Value::string("t"));
    assert_eq!(().into_value(), Value::void());
    assert_eq!(true.into_value(), Value::Bool(true));
}

#[test]
fn test_error_messages() {
    assert_eq!(
        ConversionError::Mismatch {
            expected: ParamKind::Str,
            found: ValueKind::Int,
        }
        .to_string(),
        "expected string, found int"
    );
    assert_eq!(
        ConversionError::OutOfRange {
            target: "i32",
            value: -5_000_000_000,
        }
        .to_string(),
        "-5000000000 is out of range for i32"
    );
}
