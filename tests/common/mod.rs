#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use kromium::{Interpreter, KromiumError, Value};

/// In-memory sink that stays readable after the interpreter takes it
#[derive(Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An interpreter with empty input and captured output
pub fn interpreter() -> (Interpreter, SharedOutput) {
    let output = SharedOutput::default();
    (Interpreter::with_io(io::empty(), output.clone()), output)
}

/// Run `source`, returning its value and everything written by `out`
pub fn run(source: &str) -> (Value, Vec<String>) {
    let (mut interpreter, output) = interpreter();
    let value = interpreter.run("<test>", source).expect("Execution failed");
    (value, output.lines())
}

pub fn run_value(source: &str) -> Value {
    run(source).0
}

pub fn run_err(source: &str) -> KromiumError {
    let (mut interpreter, _) = interpreter();
    match interpreter.run("<test>", source) {
        Ok(value) => panic!("expected an error, got {:?}", value),
        Err(err) => err,
    }
}
