use super::*;
use crate::template::ast::{Builtin, CmpOp, Condition, Expr, Lit};

#[test]
fn parses_dotted_path() {
    let e = parse_expr("event.payload.pos").unwrap();
    assert_eq!(
        e,
        Expr::Path(vec![
            "event".to_owned(),
            "payload".to_owned(),
            "pos".to_owned(),
        ])
    );
}

#[test]
fn parses_allowlisted_call() {
    let e = parse_expr("len(event.path)").unwrap();
    match e {
        Expr::Call { func, args } => {
            assert_eq!(func, Builtin::Len);
            assert_eq!(args.len(), 1);
        }
        other => panic!("unexpected ast: {other:?}"),
    }
}

#[test]
fn parses_nested_call_with_literal() {
    let e = parse_expr("max(len(event.path), 3)").unwrap();
    match e {
        Expr::Call { func, args } => {
            assert_eq!(func, Builtin::Max);
            assert_eq!(args.len(), 2);
            assert_eq!(args[1], Expr::Lit(Lit::Number(3.0)));
        }
        other => panic!("unexpected ast: {other:?}"),
    }
}

#[test]
fn rejects_unknown_function() {
    let err = parse_expr("eval(event.payload)").unwrap_err();
    assert!(err.message.contains("unknown function 'eval'"), "{err}");
}

#[test]
fn rejects_wrong_arity() {
    assert!(parse_expr("len(a, b)").is_err());
    assert!(parse_expr("max(a)").is_err());
}

#[test]
fn parses_negative_number_and_string_literals() {
    assert_eq!(parse_expr("-2.5").unwrap(), Expr::Lit(Lit::Number(-2.5)));
    assert_eq!(
        parse_expr("'goal'").unwrap(),
        Expr::Lit(Lit::Str("goal".to_owned()))
    );
    assert_eq!(
        parse_expr("\"goal\"").unwrap(),
        Expr::Lit(Lit::Str("goal".to_owned()))
    );
}

#[test]
fn parses_comparison_condition() {
    let c = parse_condition("event.payload.weight >= 3").unwrap();
    match c {
        Condition::Compare { op, left, right } => {
            assert_eq!(op, CmpOp::Ge);
            assert!(matches!(left, Expr::Path(_)));
            assert_eq!(right, Expr::Lit(Lit::Number(3.0)));
        }
        other => panic!("unexpected condition: {other:?}"),
    }
}

#[test]
fn parses_truthy_condition() {
    let c = parse_condition("event.payload.found").unwrap();
    assert!(matches!(c, Condition::Truthy(Expr::Path(_))));
}

#[test]
fn rejects_trailing_tokens() {
    assert!(parse_expr("event.pos extra").is_err());
    assert!(parse_condition("a == b == c").is_err());
}

#[test]
fn rejects_chained_member_on_literal() {
    assert!(parse_expr("3.foo").is_err());
}
