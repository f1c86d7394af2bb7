mod common;

use std::fs;

use kromium::value::Value;
use kromium::{ErrorKind, Interpreter};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn test_include_defines_into_current_scope() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("math.kr"),
        "func square(n) -> n * n\nnew const double PI = 3.5\n",
    )
    .unwrap();

    let (interpreter, _) = common::interpreter();
    let mut interpreter = interpreter.with_base_path(dir.path());
    let value = interpreter
        .run("<stdin>", "include \"math.kr\"\nsquare(4) + PI")
        .unwrap();
    assert_eq!(value, Value::Double(19.5));
}

#[test]
fn test_include_resolves_relative_to_including_file() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("lib");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("inner.kr"), "out(\"inner\")\n7").unwrap();
    fs::write(nested.join("outer.kr"), "include \"inner.kr\"").unwrap();
    let main = dir.path().join("main.kr");
    fs::write(&main, "include \"lib/outer.kr\"").unwrap();

    let output = common::SharedOutput::default();
    // the base path points elsewhere, so only the file-relative lookup can succeed
    let mut interpreter = Interpreter::with_io(std::io::empty(), output.clone()).with_base_path(&nested);
    let source = fs::read_to_string(&main).unwrap();
    let value = interpreter.run(&main.display().to_string(), &source).unwrap();
    assert_eq!(value, Value::Integer(7));
    assert_eq!(output.lines(), vec!["inner"]);
}

#[test]
fn test_missing_include_is_runtime_error() {
    let dir = tempdir().unwrap();
    let (interpreter, _) = common::interpreter();
    let mut interpreter = interpreter.with_base_path(dir.path());

    let err = interpreter.run("<stdin>", "include \"nope.kr\"").unwrap_err();
    match err.kind {
        ErrorKind::IncludeFailed { path, .. } => assert_eq!(path, "nope.kr"),
        other => panic!("expected include failure, got {:?}", other),
    }
    assert_eq!(err.span.text(), "include \"nope.kr\"");
}

#[test]
fn test_circular_include_is_detected() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.kr"), "include \"b.kr\"").unwrap();
    fs::write(dir.path().join("b.kr"), "include \"a.kr\"").unwrap();

    let (interpreter, _) = common::interpreter();
    let mut interpreter = interpreter.with_base_path(dir.path());
    let err = interpreter.run("<stdin>", "include \"a.kr\"").unwrap_err();
    assert_eq!(err.kind, ErrorKind::CircularInclude("a.kr".to_string()));
}

#[test]
fn test_errors_in_included_file_carry_its_positions() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bad.kr"), "\n\n1 / 0").unwrap();

    let (interpreter, _) = common::interpreter();
    let mut interpreter = interpreter.with_base_path(dir.path());
    let err = interpreter.run("<stdin>", "include \"bad.kr\"").unwrap_err();
    assert_eq!(err.kind, ErrorKind::DivisionByZero);
    assert_eq!(err.span.start.line, 3);
    assert!(err.span.start.filename().ends_with("bad.kr"));
}

#[test]
fn test_syntax_error_in_included_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("broken.kr"), "new int = 1").unwrap();

    let (interpreter, _) = common::interpreter();
    let mut interpreter = interpreter.with_base_path(dir.path());
    let err = interpreter.run("<stdin>", "include \"broken.kr\"").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSyntax("Expected identifier".to_string()));
}
