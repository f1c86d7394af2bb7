//! Token definitions for Kromium
//!
//! Tokens represent the atomic units of meaning in source code.

use std::fmt;

use crate::position::Span;

/// Declared-type keywords usable in `new TYPE name = ...`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    Int,
    Double,
    String,
    Func,
    List,
}

impl TypeName {
    /// The keyword spelling: `int`, `double`, ...
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeName::Int => "int",
            TypeName::Double => "double",
            TypeName::String => "string",
            TypeName::Func => "func",
            TypeName::List => "list",
        }
    }

    /// The runtime kind name used in type errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeName::Int => "Integer",
            TypeName::Double => "Double",
            TypeName::String => "String",
            TypeName::Func => "Function",
            TypeName::List => "List",
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    New,
    Const,
    Not,
    And,
    Or,
    If,
    Elif,
    Else,
    For,
    While,
    Func,       // also the `func` type keyword
    Return,
    Break,
    Advance,    // continue
    Include,
    Int,
    Double,
    String,
    List,
}

impl Keyword {
    /// The declared type this keyword names, if any
    pub fn type_name(&self) -> Option<TypeName> {
        match self {
            Keyword::Int => Some(TypeName::Int),
            Keyword::Double => Some(TypeName::Double),
            Keyword::String => Some(TypeName::String),
            Keyword::Func => Some(TypeName::Func),
            Keyword::List => Some(TypeName::List),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::New => "new",
            Keyword::Const => "const",
            Keyword::Not => "not",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::If => "if",
            Keyword::Elif => "elif",
            Keyword::Else => "else",
            Keyword::For => "for",
            Keyword::While => "while",
            Keyword::Func => "func",
            Keyword::Return => "return",
            Keyword::Break => "break",
            Keyword::Advance => "advance",
            Keyword::Include => "include",
            Keyword::Int => "int",
            Keyword::Double => "double",
            Keyword::String => "string",
            Keyword::List => "list",
        }
    }
}

/// Token types in Kromium
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Integer(i64),
    Double(f64),
    Str(String),

    // Names
    Ident(String),
    Keyword(Keyword),

    // Arithmetic
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Pow,          // ^ or **

    // Assignment
    Equal,        // =
    PlusEqual,    // +=
    MinusEqual,   // -=
    StarEqual,    // *=
    SlashEqual,   // /=

    // Comparison
    EqualEqual,   // ==
    BangEqual,    // !=
    Less,         // <
    Greater,      // >
    LessEqual,    // <=
    GreaterEqual, // >=

    // Logical
    Ampersand,    // &
    Pipe,         // |

    // Delimiters
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Colon,        // :
    Semicolon,    // ;
    Comma,        // ,
    Arrow,        // ->

    // Special tokens
    Newline,      // statement separator
    Eof,          // end of input
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Integer(n) => write!(f, "{}", n),
            TokenKind::Double(n) => write!(f, "{:?}", n),
            TokenKind::Str(s) => write!(f, "\"{}\"", s),
            TokenKind::Ident(s) => write!(f, "{}", s),
            TokenKind::Keyword(k) => write!(f, "{}", k.as_str()),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Pow => write!(f, "^"),
            TokenKind::Equal => write!(f, "="),
            TokenKind::PlusEqual => write!(f, "+="),
            TokenKind::MinusEqual => write!(f, "-="),
            TokenKind::StarEqual => write!(f, "*="),
            TokenKind::SlashEqual => write!(f, "/="),
            TokenKind::EqualEqual => write!(f, "=="),
            TokenKind::BangEqual => write!(f, "!="),
            TokenKind::Less => write!(f, "<"),
            TokenKind::Greater => write!(f, ">"),
            TokenKind::LessEqual => write!(f, "<="),
            TokenKind::GreaterEqual => write!(f, ">="),
            TokenKind::Ampersand => write!(f, "&"),
            TokenKind::Pipe => write!(f, "|"),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::LeftBrace => write!(f, "{{"),
            TokenKind::RightBrace => write!(f, "}}"),
            TokenKind::LeftBracket => write!(f, "["),
            TokenKind::RightBracket => write!(f, "]"),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Arrow => write!(f, "->"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its kind, location and declared-type tag
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Set for literals and type keywords
    pub type_name: Option<TypeName>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        let type_name = match &kind {
            TokenKind::Integer(_) => Some(TypeName::Int),
            TokenKind::Double(_) => Some(TypeName::Double),
            TokenKind::Str(_) => Some(TypeName::String),
            TokenKind::Keyword(k) => k.type_name(),
            _ => None,
        };
        Self {
            kind,
            span,
            type_name,
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.kind, TokenKind::Keyword(k) if k == keyword)
    }
}

/// Check if a string is a keyword and return the corresponding token kind
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    let keyword = match ident {
        "new" => Keyword::New,
        "const" => Keyword::Const,
        "not" => Keyword::Not,
        "and" => Keyword::And,
        "or" => Keyword::Or,
        "if" => Keyword::If,
        "elif" => Keyword::Elif,
        "else" => Keyword::Else,
        "for" => Keyword::For,
        "while" => Keyword::While,
        "func" => Keyword::Func,
        "return" => Keyword::Return,
        "break" => Keyword::Break,
        "advance" => Keyword::Advance,
        "include" => Keyword::Include,
        "int" => Keyword::Int,
        "double" => Keyword::Double,
        "string" => Keyword::String,
        "list" => Keyword::List,
        _ => return None,
    };
    Some(TokenKind::Keyword(keyword))
}
