// tests/expression_tests.rs
//
// Expression grammar behavior through the public compile API.

use weft::errors::{ErrorCategory, ErrorKind};
use weft::expr::{ExprNode, ExpressionInfo};

fn compile(text: &str) -> Result<ExpressionInfo, weft::WeftError> {
    ExpressionInfo::compile(text, "tests")
}

#[test]
fn all_designators_parse() {
    let cases = [
        "execution(* foo.Bar.run(..))",
        "execution(foo.Bar.new(..))",
        "call(* foo..*.fetch*(int, ..))",
        "set(int foo.Bar.count)",
        "get(* foo.Bar.count)",
        "within(foo.bar..*)",
        "withincode(* foo.Bar.run(..))",
        "handler(java.io.IOException)",
        "staticinitialization(foo.Bar)",
        "cflow(execution(* foo.Bar.run(..)))",
        "cflowbelow(call(* foo.Bar.run(..)))",
        "this(foo.Bar)",
        "target(t)",
        "args(x, *, ..)",
        "@annotation(foo.Tx)",
        "@within(foo.Audited)",
        "somePointcut",
    ];
    for case in cases {
        assert!(compile(case).is_ok(), "should parse: {}", case);
    }
}

#[test]
fn operator_precedence_not_over_and_over_or() {
    let info = compile("!within(a..) && within(b..) || within(c..)").unwrap();
    // Parses as ((!within(a..) && within(b..)) || within(c..)).
    let ExprNode::Or(lhs, _) = info.root() else {
        panic!("expected Or at the root");
    };
    let ExprNode::And(negated, _) = lhs.as_ref() else {
        panic!("expected And on the left");
    };
    assert!(matches!(negated.as_ref(), ExprNode::Not(_)));
}

#[test]
fn whitespace_is_insignificant_between_operators() {
    let tight = compile("within(a..)&&!within(b..)").unwrap();
    let spaced = compile("within(a..)   &&   ! within(b..)").unwrap();
    assert_eq!(tight.root(), spaced.root());
}

#[test]
fn failure_modes_are_definition_errors() {
    let cases: Vec<(&str, ErrorCategory)> = vec![
        ("", ErrorCategory::Expression),
        ("   ", ErrorCategory::Expression),
        ("execution(* foo.Bar.run(..)) &&", ErrorCategory::Expression),
        ("(within(a..)", ErrorCategory::Expression),
        ("frobnicate(* foo.Bar.run(..))", ErrorCategory::Expression),
        ("within(a...b)", ErrorCategory::Pattern),
        ("execution(foo.Bar.run(..))", ErrorCategory::Pattern),
    ];
    for (text, category) in cases {
        let err = compile(text).unwrap_err();
        assert_eq!(
            err.kind.category(),
            category,
            "wrong category for: {}",
            text
        );
    }
}

#[test]
fn unknown_designator_names_the_offender() {
    let err = compile("frobnicate(* foo.Bar.run(..))").unwrap_err();
    let ErrorKind::UnknownDesignator { designator } = err.kind else {
        panic!("expected an unknown-designator error");
    };
    assert_eq!(designator, "frobnicate");
}

#[test]
fn compiling_twice_yields_equal_expressions() {
    let text = "execution(* foo.Bar.run(..)) && (args(x) || target(t))";
    assert_eq!(compile(text).unwrap(), compile(text).unwrap());
}

#[test]
fn source_text_is_preserved() {
    let text = "within(foo..*) || bar";
    let info = compile(text).unwrap();
    assert_eq!(info.source(), text);
    assert_eq!(info.namespace(), "tests");
}
