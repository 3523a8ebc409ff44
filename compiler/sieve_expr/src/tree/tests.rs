use super::*;
use pretty_assertions::assert_eq;
use sieve_diagnostic::ErrorKind;

fn tree(text: &str) -> String {
    Expression::parse(text)
        .unwrap()
        .root
        .map(|node| node.to_string())
        .unwrap_or_default()
}

fn parse_err(text: &str) -> ErrorKind {
    Expression::parse(text).unwrap_err().kind
}

#[test]
fn test_precedence() {
    assert_eq!(tree("1+2*3"), "(1 + (2 * 3))");
    assert_eq!(tree("1*2+3"), "((1 * 2) + 3)");
    assert_eq!(tree("a==1&&b<2"), "((a == 1) && (b < 2))");
    assert_eq!(tree("(1+2)*3"), "((1 + 2) * 3)");
    assert_eq!(tree("!a&&b"), "((!a) && b)");
    assert_eq!(tree("!!a"), "(!(!a))");
}

#[test]
fn test_left_associative() {
    assert_eq!(tree("1-2-3"), "((1 - 2) - 3)");
    assert_eq!(tree("8/4/2"), "((8 / 4) / 2)");
    assert_eq!(tree("a||b^c"), "((a || b) ^ c)");
}

#[test]
fn test_negative_literal_folding() {
    assert_eq!(tree("-1"), "-1");
    assert_eq!(tree("1--2"), "(1 - -2)");
    assert_eq!(tree("2*-1.5"), "(2 * -1.5)");
    assert_eq!(tree("abs(-3)"), "abs(-3)");
    assert_eq!(tree("xml_attr(e, -1)"), "xml_attr(e, -1)");
}

#[test]
fn test_most_negative_integer_literal() {
    assert_eq!(tree("-9223372036854775808"), "-9223372036854775808");
    assert_eq!(tree("1*-9223372036854775808"), "(1 * -9223372036854775808)");
    assert_eq!(parse_err("9223372036854775808"), ErrorKind::Parse);
    assert_eq!(parse_err("1-9223372036854775808"), ErrorKind::Parse);
    assert_eq!(parse_err("-9223372036854775809"), ErrorKind::Parse);
}

#[test]
fn test_prefix_minus_needs_a_number() {
    assert_eq!(parse_err("-x"), ErrorKind::Parse);
    assert_eq!(parse_err("--2"), ErrorKind::Parse);
    assert_eq!(parse_err("1*-(2)"), ErrorKind::Parse);
}

#[test]
fn test_function_calls() {
    assert_eq!(tree("STRLEN(\"ab\")"), "strlen(\"ab\")");
    assert_eq!(tree("issubstr(\"a\", s+\"b\")"), "issubstr(\"a\", (s + \"b\"))");
    assert_eq!(tree("$twice(1, 2)"), "$twice(1, 2)");
    assert_eq!(tree("$now()"), "$now()");
    assert_eq!(tree("1+abs(2)*3"), "(1 + (abs(2) * 3))");
}

#[test]
fn test_empty_group() {
    assert!(Expression::parse("()").unwrap().is_empty());
    assert!(Expression::parse("  ").unwrap().is_empty());
    assert!(Expression::parse("(())").unwrap().is_empty());
    assert_eq!(parse_err("1+()"), ErrorKind::Parse);
}

#[test]
fn test_structural_errors() {
    for text in ["(1+2", "1+2)", "1 2", "1+", "*2", "nosuch(1)", "abs(1,", "abs(1;2)", ","] {
        assert_eq!(parse_err(text), ErrorKind::Parse, "{text}");
    }
}

#[test]
fn test_deep_nesting_does_not_overflow() {
    let depth = 5_000;
    let text = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(tree(&text), "1");
}
