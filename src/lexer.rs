//! Lexer for Kromium
//!
//! Converts source code into a stream of tokens.

use std::rc::Rc;

use crate::error::{ErrorKind, KromiumError, Result};
use crate::position::{Position, SourceFile, Span};
use crate::token::{lookup_keyword, Token, TokenKind};

/// The lexer state
pub struct Lexer {
    pos: Position,
}

impl Lexer {
    /// Create a new lexer over `source`, reporting positions against `filename`
    pub fn new(filename: &str, source: &str) -> Self {
        Self::from_file(SourceFile::new(filename, source))
    }

    pub fn from_file(file: Rc<SourceFile>) -> Self {
        Self {
            pos: Position::start_of(file),
        }
    }

    /// Tokenize the entire source
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        tokens.push(Token::new(
            TokenKind::Eof,
            Span::new(self.pos.clone(), self.pos.clone()),
        ));

        tracing::trace!(file = self.pos.filename(), tokens = tokens.len(), "tokenized");
        Ok(tokens)
    }

    /// Get the next token
    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();

        let Some(ch) = self.peek_char() else {
            return Ok(None);
        };
        let start = self.pos.clone();

        let kind = match ch {
            // Single character tokens
            '(' => { self.advance(); TokenKind::LeftParen }
            ')' => { self.advance(); TokenKind::RightParen }
            '{' => { self.advance(); TokenKind::LeftBrace }
            '}' => { self.advance(); TokenKind::RightBrace }
            '[' => { self.advance(); TokenKind::LeftBracket }
            ']' => { self.advance(); TokenKind::RightBracket }
            ',' => { self.advance(); TokenKind::Comma }
            ';' => { self.advance(); TokenKind::Semicolon }
            ':' => { self.advance(); TokenKind::Colon }
            '^' => { self.advance(); TokenKind::Pow }
            '&' => { self.advance(); TokenKind::Ampersand }
            '|' => { self.advance(); TokenKind::Pipe }

            // Potentially two-character tokens
            '+' => self.munch(TokenKind::Plus, &[('=', TokenKind::PlusEqual)]),
            '-' => self.munch(
                TokenKind::Minus,
                &[('=', TokenKind::MinusEqual), ('>', TokenKind::Arrow)],
            ),
            '*' => self.munch(
                TokenKind::Star,
                &[('=', TokenKind::StarEqual), ('*', TokenKind::Pow)],
            ),
            '/' => self.munch(TokenKind::Slash, &[('=', TokenKind::SlashEqual)]),
            '=' => self.munch(TokenKind::Equal, &[('=', TokenKind::EqualEqual)]),
            '<' => self.munch(TokenKind::Less, &[('=', TokenKind::LessEqual)]),
            '>' => self.munch(TokenKind::Greater, &[('=', TokenKind::GreaterEqual)]),
            '!' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::BangEqual
                } else {
                    return Err(KromiumError::new(
                        ErrorKind::ExpectedEqualsAfterBang,
                        Span::new(start, self.pos.clone()),
                    ));
                }
            }

            // Newlines (significant for statement separation)
            '\n' => { self.advance(); TokenKind::Newline }

            '"' => self.scan_string(&start)?,
            c if c.is_ascii_digit() => self.scan_number(&start)?,
            c if c.is_ascii_alphabetic() => self.scan_identifier(),

            // Unknown character
            _ => {
                self.advance();
                return Err(KromiumError::new(
                    ErrorKind::InvalidCharacter(ch),
                    Span::new(start, self.pos.clone()),
                ));
            }
        };

        Ok(Some(Token::new(kind, Span::new(start, self.pos.clone()))))
    }

    /// Advance and return the current character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos = self.pos.advanced(ch);
        Some(ch)
    }

    /// Peek at the next character without advancing
    fn peek_char(&self) -> Option<char> {
        self.pos.rest().chars().next()
    }

    /// Consume one operator character, extending it with a second one
    /// when it matches an entry of `follow`
    fn munch(&mut self, single: TokenKind, follow: &[(char, TokenKind)]) -> TokenKind {
        self.advance();
        let Some(next) = self.peek_char() else {
            return single;
        };
        match follow.iter().find(|(c, _)| *c == next) {
            Some((_, kind)) => {
                self.advance();
                kind.clone()
            }
            None => single,
        }
    }

    /// Skip spaces, tabs and carriage returns; newlines are tokens
    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r') = self.peek_char() {
            self.advance();
        }
    }

    /// Scan a string literal, decoding `\n`, `\t` and `\a`
    fn scan_string(&mut self, start: &Position) -> Result<TokenKind> {
        // Consume opening quote
        self.advance();

        let mut value = String::new();

        loop {
            match self.advance() {
                Some('"') => return Ok(TokenKind::Str(value)),
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('a') => value.push('\u{7}'),
                    Some(c) => value.push(c),
                    None => break,
                },
                Some(c) => value.push(c),
                None => break,
            }
        }

        Err(KromiumError::new(
            ErrorKind::UnterminatedString,
            Span::new(start.clone(), self.pos.clone()),
        ))
    }

    /// Scan a number literal; a second decimal point ends the literal
    fn scan_number(&mut self, start: &Position) -> Result<TokenKind> {
        let mut text = String::new();
        let mut seen_dot = false;

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                text.push(c);
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                text.push(c);
            } else {
                break;
            }
            self.advance();
        }

        let invalid = || {
            KromiumError::new(
                ErrorKind::InvalidNumber(text.clone()),
                Span::new(start.clone(), self.pos.clone()),
            )
        };

        if seen_dot {
            text.parse::<f64>().map(TokenKind::Double).map_err(|_| invalid())
        } else {
            text.parse::<i64>().map(TokenKind::Integer).map_err(|_| invalid())
        }
    }

    /// Scan an identifier or keyword
    fn scan_identifier(&mut self) -> TokenKind {
        let mut text = String::new();

        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        lookup_keyword(&text).unwrap_or(TokenKind::Ident(text))
    }
}
