//! Source positions for Kromium
//!
//! Every token, AST node and error refers back to the text it came from
//! through a `Position`, which keeps the file name and full source alive
//! so diagnostics can be rendered long after lexing has finished.

use std::fmt;
use std::rc::Rc;

/// A named unit of source text
#[derive(Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            text: text.into(),
        })
    }

    /// The text of a 1-based line, without its terminator
    pub fn line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1).and_then(|n| self.text.lines().nth(n))
    }
}

/// A cursor snapshot: byte index plus 1-based line and column
#[derive(Clone)]
pub struct Position {
    pub index: usize,
    pub line: usize,
    pub column: usize,
    pub file: Rc<SourceFile>,
}

impl Position {
    /// Position of the first character of `file`
    pub fn start_of(file: Rc<SourceFile>) -> Self {
        Self {
            index: 0,
            line: 1,
            column: 1,
            file,
        }
    }

    /// Step past `ch`, returning the position of the next character
    pub fn advanced(&self, ch: char) -> Self {
        let mut next = self.clone();
        next.index += ch.len_utf8();
        if ch == '\n' {
            next.line += 1;
            next.column = 1;
        } else {
            next.column += 1;
        }
        next
    }

    pub fn filename(&self) -> &str {
        &self.file.name
    }

    /// Remaining source text from this position on
    pub fn rest(&self) -> &str {
        self.file.text.get(self.index..).unwrap_or("")
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.line == other.line
            && self.column == other.column
            && Rc::ptr_eq(&self.file, &other.file)
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.name, self.line, self.column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.name, self.line, self.column)
    }
}

/// A half-open source range `[start, end)`
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span covering `self` through `other`
    pub fn to(&self, other: &Span) -> Span {
        Span::new(self.start.clone(), other.end.clone())
    }

    /// The source text the span covers
    pub fn text(&self) -> &str {
        self.start
            .file
            .text
            .get(self.start.index..self.end.index)
            .unwrap_or("")
    }
}
