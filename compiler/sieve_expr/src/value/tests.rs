use super::*;
use pretty_assertions::assert_eq;
use sieve_diagnostic::ErrorKind;

#[test]
fn test_recognize_literals() {
    assert!(matches!(Value::recognize("true"), Some(Value::Bool(true))));
    assert!(matches!(Value::recognize("FALSE"), Some(Value::Bool(false))));
    assert!(matches!(Value::recognize("42"), Some(Value::Int(42))));
    assert!(matches!(Value::recognize("-7"), Some(Value::Int(-7))));
    assert!(matches!(Value::recognize("0x1F"), Some(Value::Int(31))));
    assert!(matches!(Value::recognize("0xFFFFFFFFFFFFFFFF"), Some(Value::Int(-1))));
    assert!(matches!(Value::recognize("1.5"), Some(Value::Float(f)) if f == 1.5));
    assert!(matches!(Value::recognize(".25"), Some(Value::Float(f)) if f == 0.25));
    assert!(matches!(Value::recognize("2e3"), Some(Value::Float(f)) if f == 2000.0));
    assert!(matches!(
        Value::recognize(r#""a\tb""#),
        Some(Value::Str(s)) if s == "a\tb"
    ));
}

#[test]
fn test_recognize_rejects_non_literals() {
    assert!(Value::recognize("hello").is_none());
    assert!(Value::recognize("0x").is_none());
    assert!(Value::recognize("1.2.3").is_none());
    assert!(Value::recognize("inf").is_none());
    assert!(Value::recognize("NaN").is_none());
    assert!(Value::recognize("\"unterminated").is_none());
}

#[test]
fn test_from_raw_falls_back_to_string() {
    assert_eq!(Value::from_raw("some text").to_string(), "some text");
    assert!(matches!(Value::from_raw(" 12 "), Value::Int(12)));
}

#[test]
fn test_display() {
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::Int(-3).to_string(), "-3");
    assert_eq!(Value::Float(3.0).to_string(), "3.0");
    assert_eq!(Value::Float(0.5).to_string(), "0.5");
    assert_eq!(Value::string("x").to_string(), "x");
}

#[test]
fn test_cross_type_equality_promotes() {
    assert_eq!(Value::Int(1), Value::Float(1.0));
    assert_ne!(Value::Int(1), Value::Float(1.5));
    assert_ne!(Value::Int(1), Value::Bool(true));
    assert_ne!(Value::string("1"), Value::Int(1));
}

#[test]
fn test_coercions() {
    assert_eq!(Value::Float(2.9).as_int().unwrap(), 2);
    assert_eq!(Value::string("12").as_int().unwrap(), 12);
    assert!((Value::Int(3).as_float().unwrap() - 3.0).abs() < f32::EPSILON);
    assert!(Value::string("TRUE").as_bool().unwrap());
    assert!(Value::Int(5).as_bool().unwrap());

    let err = Value::string("abc").as_int().unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeMismatch);
    let err = Value::Bool(true).as_float().unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeMismatch);
    let err = Value::string("maybe").as_bool().unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeMismatch);
}

#[test]
fn test_unescape() {
    assert_eq!(unescape(r#"q\"\\\n"#).unwrap(), "q\"\\\n");
    assert_eq!(unescape(r"A").unwrap(), "A");
    assert_eq!(unescape(r"\x").unwrap_err().kind, ErrorKind::Parse);
    assert_eq!(unescape(r"\u00").unwrap_err().kind, ErrorKind::Parse);
}

mod proptest_literals {
    use super::super::Value;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn integer_literals_round_trip(n in any::<i64>()) {
            let recognized = Value::recognize(&n.to_string());
            prop_assert!(matches!(recognized, Some(Value::Int(v)) if v == n));
        }

        #[test]
        fn plain_words_become_strings(word in "[g-z][a-z]{0,8}") {
            prop_assume!(word != "true" && word != "false");
            let raw = Value::from_raw(&word);
            prop_assert_eq!(raw.as_str(), Some(word.as_str()));
        }
    }
}
