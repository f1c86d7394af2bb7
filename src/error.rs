//! Error types for Kromium
//!
//! Every error carries the span it was raised at. Runtime errors also carry
//! the call frames that were active, so the report can show a traceback
//! above the caret-annotated excerpt.

use std::fmt;

use thiserror::Error;

use crate::position::Span;

/// Broad error classes, each rendered with its own title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Lexical,
    Syntax,
    Type,
    Runtime,
}

impl Category {
    pub fn title(&self) -> &'static str {
        match self {
            Category::Lexical => "Invalid Character",
            Category::Syntax => "Invalid Syntax",
            Category::Type => "Type Error",
            Category::Runtime => "Runtime Error",
        }
    }
}

/// Error kinds in Kromium
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Lexer errors
    #[error("\"{0}\"")]
    InvalidCharacter(char),
    #[error("expected '=' after '!'")]
    ExpectedEqualsAfterBang,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    // Parser errors
    #[error("{0}")]
    InvalidSyntax(String),

    // Type errors
    #[error("Cannot convert type '{found}' to '{expected}'")]
    TypeMismatch {
        found: &'static str,
        expected: &'static str,
    },

    // Runtime errors
    #[error("\"{0}\" is not defined")]
    UndefinedVariable(String),
    #[error("Illegal operation")]
    IllegalOperation,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Integer overflow")]
    IntegerOverflow,
    #[error("{count} too many args passed into '{name}'")]
    TooManyArgs { count: usize, name: String },
    #[error("{count} too few args passed into '{name}'")]
    TooFewArgs { count: usize, name: String },
    #[error("Variable {0} cannot be reassigned, because it is a constant")]
    ConstReassignment(String),
    #[error("List index {0} out of bounds")]
    IndexOutOfRange(i64),
    #[error("'{0}' is not callable")]
    NotCallable(String),
    #[error("Cannot convert '{0}' to Integer")]
    InvalidConversion(String),
    #[error("for loop variable '{0}' must be a declared Integer")]
    InvalidLoopVariable(String),
    #[error("for loop {0}")]
    InvalidLoopOperand(&'static str),
    #[error("break outside of loop")]
    BreakOutsideLoop,
    #[error("advance outside of loop")]
    AdvanceOutsideLoop,
    #[error("return outside of function")]
    ReturnOutsideFunction,
    #[error("Maximum recursion depth exceeded")]
    RecursionLimit,
    #[error("cannot include '{path}': {reason}")]
    IncludeFailed { path: String, reason: String },
    #[error("circular include of '{0}'")]
    CircularInclude(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl ErrorKind {
    pub fn category(&self) -> Category {
        match self {
            ErrorKind::InvalidCharacter(_)
            | ErrorKind::ExpectedEqualsAfterBang
            | ErrorKind::UnterminatedString
            | ErrorKind::InvalidNumber(_) => Category::Lexical,
            ErrorKind::InvalidSyntax(_) => Category::Syntax,
            ErrorKind::TypeMismatch { .. } => Category::Type,
            _ => Category::Runtime,
        }
    }
}

/// One line of a runtime traceback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame {
    pub filename: String,
    pub line: usize,
    pub name: String,
}

/// A Kromium error with location information
#[derive(Debug, Clone)]
pub struct KromiumError {
    pub kind: ErrorKind,
    pub span: Span,
    /// Innermost frame first
    pub traceback: Vec<TraceFrame>,
}

impl KromiumError {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            traceback: Vec::new(),
        }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::InvalidSyntax(message.into()), span)
    }

    pub fn with_traceback(mut self, traceback: Vec<TraceFrame>) -> Self {
        self.traceback = traceback;
        self
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// `Traceback (most recent call last):` followed by the frames,
    /// outermost first
    pub fn render_traceback(&self) -> String {
        let mut out = String::from("Traceback (most recent call last):\n");
        for frame in self.traceback.iter().rev() {
            out.push_str(&format!(
                "  File \"{}\", line {}, in {}\n",
                frame.filename, frame.line, frame.name
            ));
        }
        out
    }

    /// The offending source line(s) with carets under the span
    pub fn excerpt(&self) -> String {
        excerpt(&self.span)
    }
}

/// Render every line `span` touches, underlining the covered columns
pub fn excerpt(span: &Span) -> String {
    let file = &span.start.file;
    let first = span.start.line;
    // A span ending at column 1 stops on the previous line.
    let last = if span.end.line > first && span.end.column == 1 {
        span.end.line - 1
    } else {
        span.end.line.max(first)
    };

    let mut lines = Vec::new();
    for line_no in first..=last {
        let text = file.line(line_no).unwrap_or("");
        let width = text.chars().count();
        let from = if line_no == first { span.start.column - 1 } else { 0 };
        let to = if line_no == last && span.end.line == line_no {
            span.end.column - 1
        } else {
            width
        };
        let to = to.max(from + 1);
        lines.push(format!("{}\n{}{}", text, " ".repeat(from), "^".repeat(to - from)));
    }
    lines.join("\n")
}

impl fmt::Display for KromiumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = self.category();
        if category == Category::Runtime && !self.traceback.is_empty() {
            write!(f, "{}", self.render_traceback())?;
        }
        writeln!(f, "{}: {}", category.title(), self.kind)?;
        if category != Category::Runtime {
            writeln!(
                f,
                "File \"{}\", line {}",
                self.span.start.filename(),
                self.span.start.line
            )?;
        }
        write!(f, "\n{}", self.excerpt())
    }
}

impl std::error::Error for KromiumError {}

/// Result type for Kromium operations
pub type Result<T> = std::result::Result<T, KromiumError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{Position, SourceFile};

    fn span_of(source: &str, from: usize, to: usize) -> Span {
        let file = SourceFile::new("<test>", source);
        let mut pos = Position::start_of(file);
        let mut start = pos.clone();
        for (i, ch) in source.char_indices() {
            if i == from {
                start = pos.clone();
            }
            if i == to {
                break;
            }
            pos = pos.advanced(ch);
        }
        if from >= source.len() {
            start = pos.clone();
        }
        Span::new(start, pos)
    }

    #[test]
    fn test_excerpt_single_line() {
        let span = span_of("5 / 0", 4, 5);
        assert_eq!(excerpt(&span), "5 / 0\n    ^");
    }

    #[test]
    fn test_excerpt_multi_line() {
        let span = span_of("ab\ncd", 1, 4);
        assert_eq!(excerpt(&span), "ab\n ^\ncd\n^");
    }

    #[test]
    fn test_display_syntax_error() {
        let err = KromiumError::syntax("Expected ')'", span_of("(1", 2, 2));
        let text = err.to_string();
        assert!(text.starts_with("Invalid Syntax: Expected ')'\n"));
        assert!(text.contains("File \"<test>\", line 1"));
    }

    #[test]
    fn test_traceback_outermost_first() {
        let err = KromiumError::new(ErrorKind::DivisionByZero, span_of("1/0", 2, 3))
            .with_traceback(vec![
                TraceFrame { filename: "<test>".into(), line: 3, name: "inner".into() },
                TraceFrame { filename: "<test>".into(), line: 1, name: "<main>".into() },
            ]);
        let text = err.to_string();
        let main_at = text.find("in <main>").unwrap();
        let inner_at = text.find("in inner").unwrap();
        assert!(main_at < inner_at);
        assert!(text.contains("Runtime Error: Division by zero"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(ErrorKind::InvalidCharacter('$').category(), Category::Lexical);
        assert_eq!(ErrorKind::InvalidSyntax("x".into()).category(), Category::Syntax);
        assert_eq!(
            ErrorKind::TypeMismatch { found: "String", expected: "Integer" }.category(),
            Category::Type
        );
        assert_eq!(ErrorKind::IllegalOperation.category(), Category::Runtime);
    }
}
