//! Kromium - a small statically-declared scripting language
//!
//! Source text is tokenized, parsed into an AST and evaluated directly by a
//! tree-walking interpreter.

pub mod position;
pub mod token;
pub mod lexer;
pub mod parser;
pub mod ast;
pub mod value;
pub mod scope;
pub mod interpreter;
pub mod error;

pub use error::{ErrorKind, KromiumError, Result};
pub use interpreter::Interpreter;
pub use lexer::Lexer;
pub use parser::Parser;
pub use value::Value;

/// Convenience function to run Kromium code in a fresh interpreter
pub fn run(filename: &str, source: &str) -> Result<Value> {
    let mut interpreter = Interpreter::new();
    interpreter.run(filename, source)
}

/// Version of the Kromium language
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
