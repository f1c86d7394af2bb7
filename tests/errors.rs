mod common;

use common::run_err;
use kromium::error::Category;
use kromium::ErrorKind;
use pretty_assertions::assert_eq;

#[test]
fn test_lexical_errors_stop_scanning() {
    let err = run_err("new int x = 1 $ 2");
    assert_eq!(err.kind, ErrorKind::InvalidCharacter('$'));
    assert_eq!(err.category(), Category::Lexical);
    assert_eq!(err.span.start.column, 15);

    assert_eq!(run_err("\"open").kind, ErrorKind::UnterminatedString);
}

#[test]
fn test_syntax_error_report() {
    let err = run_err("new int x = (1 + 2");
    assert_eq!(err.category(), Category::Syntax);
    assert_eq!(
        err.to_string(),
        "Invalid Syntax: Expected ')'\nFile \"<test>\", line 1\n\nnew int x = (1 + 2\n                  ^"
    );
}

#[test]
fn test_undefined_variable() {
    let err = run_err("new int a = 1\na + b");
    assert_eq!(err.kind, ErrorKind::UndefinedVariable("b".to_string()));
    assert_eq!(err.span.text(), "b");
    assert_eq!(err.span.start.line, 2);
}

#[test]
fn test_runtime_report_has_traceback_and_excerpt() {
    let source = "func half(n) -> n / 0\nhalf(4)";
    let err = run_err(source);
    assert_eq!(
        err.to_string(),
        concat!(
            "Traceback (most recent call last):\n",
            "  File \"<test>\", line 2, in <program>\n",
            "  File \"<test>\", line 1, in half\n",
            "Runtime Error: Division by zero\n",
            "\n",
            "func half(n) -> n / 0\n",
            "                    ^",
        )
    );
}

#[test]
fn test_illegal_operation_covers_both_operands() {
    let err = run_err("[1] - \"x\"");
    assert_eq!(err.kind, ErrorKind::IllegalOperation);
    assert_eq!(err.span.text(), "[1] - \"x\"");
    assert!(err.to_string().ends_with("[1] - \"x\"\n^^^^^^^^^"));
}

#[test]
fn test_not_callable() {
    let err = run_err("new int x = 3\nx(1)");
    assert_eq!(err.kind, ErrorKind::NotCallable("3".to_string()));
    assert_eq!(err.span.text(), "x");
}

#[test]
fn test_builtin_errors_name_the_builtin_frame() {
    let err = run_err("len(out)");
    assert_eq!(err.kind, ErrorKind::IllegalOperation);
    let names: Vec<_> = err.traceback.iter().map(|frame| frame.name.as_str()).collect();
    assert_eq!(names, vec!["len", "<program>"]);
}

#[test]
fn test_multi_line_span_excerpt() {
    let err = run_err("(func () {\n  1\n}) - \"x\"");
    assert_eq!(err.kind, ErrorKind::IllegalOperation);
    let text = err.to_string();
    assert!(text.ends_with("(func () {\n ^^^^^^^^^\n  1\n^^^\n}) - \"x\"\n^^^^^^^^"));
}

#[test]
fn test_errors_abort_remaining_statements() {
    let (mut interpreter, output) = common::interpreter();
    let err = interpreter
        .run("<test>", "out(1)\nout(1 / 0)\nout(2)")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DivisionByZero);
    assert_eq!(output.lines(), vec!["1"]);
}

#[test]
fn test_reassigning_undefined_name() {
    assert_eq!(
        run_err("ghost = 1").kind,
        ErrorKind::UndefinedVariable("ghost".to_string())
    );
}

#[test]
fn test_func_bindings_reject_compound_assignment() {
    assert_eq!(run_err("new func f = out\nf += 1").kind, ErrorKind::IllegalOperation);
}
