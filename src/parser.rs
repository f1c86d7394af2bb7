//! Parser for Kromium
//!
//! Converts tokens into an Abstract Syntax Tree. Recursive descent with one
//! rule per precedence level, lowest first:
//!
//! ```text
//! statement   = 'return' expression? | 'break' | 'advance'
//!             | 'include' STRING | expression
//! expression  = 'new' 'const'? TYPE IDENT '=' expression
//!             | comparison (('and' | 'or' | '&' | '|') comparison)*
//! comparison  = 'not' comparison | arithmetic (CMP arithmetic)*
//! arithmetic  = term (('+' | '-') term)*
//! term        = factor (('*' | '/') factor)*
//! factor      = ('+' | '-') factor | power
//! power       = call (('^' | '**') factor)*
//! call        = quark ('(' arguments? ')')*
//! ```

use std::rc::Rc;

use crate::ast::{ArithOp, AssignOp, BinaryOp, Body, BodyForm, CompareOp, IfCase, Node, UnaryOp};
use crate::error::{KromiumError, Result};
use crate::position::Span;
use crate::token::{Keyword, Token, TokenKind};

type Rule = fn(&mut Parser) -> Result<Node>;
type OperatorSet = fn(&TokenKind) -> Option<BinaryOp>;

const QUARK_EXPECTED: &str = "Expected int, double, string, identifier, 'new', 'not', '+', '-', '(', '[', 'if', 'for', 'while' or 'func'";

/// The parser state
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// Create a new parser from tokens; the last token must be `Eof`
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parse the tokens into a single statement-list node
    pub fn parse(&mut self) -> Result<Node> {
        self.skip_newlines();

        let program = if self.is_at_end() {
            Node::Block {
                statements: Vec::new(),
                span: self.peek().span.clone(),
            }
        } else {
            self.statements()?
        };

        self.skip_newlines();
        if !self.is_at_end() {
            return Err(self.error(
                "Expected '+', '-', '*', '/', '^', '==', '!=', '<', '>', '<=', '>=', 'and', 'or' or newline",
            ));
        }

        tracing::trace!(tokens = self.tokens.len(), "parsed source unit");
        Ok(program)
    }

    // ==================== Statements ====================

    /// One mandatory statement, then more statements separated by newlines.
    /// A further statement that fails without consuming a token ends the
    /// list and leaves that token for the caller.
    fn statements(&mut self) -> Result<Node> {
        let first = self.statement()?;
        let start = first.span().clone();
        let mut statements = vec![first];

        loop {
            if self.skip_newlines() == 0 {
                break;
            }
            let mark = self.current;
            match self.statement() {
                Ok(statement) => statements.push(statement),
                Err(_) if self.current == mark => break,
                Err(err) => return Err(err),
            }
        }

        let span = match statements.last() {
            Some(last) => start.to(last.span()),
            None => start,
        };
        Ok(Node::Block { statements, span })
    }

    fn statement(&mut self) -> Result<Node> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Keyword(Keyword::Return) => {
                self.advance();
                let mark = self.current;
                let value = match self.expression() {
                    Ok(value) => Some(Box::new(value)),
                    Err(_) if self.current == mark => None,
                    Err(err) => return Err(err),
                };
                Ok(Node::Return {
                    value,
                    span: self.span_from(&token.span),
                })
            }
            TokenKind::Keyword(Keyword::Break) => {
                self.advance();
                Ok(Node::Break { span: token.span })
            }
            TokenKind::Keyword(Keyword::Advance) => {
                self.advance();
                Ok(Node::Advance { span: token.span })
            }
            TokenKind::Keyword(Keyword::Include) => {
                self.advance();
                let path = match &self.peek().kind {
                    TokenKind::Str(path) => path.clone(),
                    _ => return Err(self.error("Expected a string path after 'include'")),
                };
                self.advance();
                Ok(Node::Include {
                    path,
                    span: self.span_from(&token.span),
                })
            }
            _ => self.expression(),
        }
    }

    // ==================== Expressions ====================

    fn expression(&mut self) -> Result<Node> {
        if self.peek().is_keyword(Keyword::New) {
            return self.declaration();
        }
        self.binary_chain(Parser::comparison, logical_op, Parser::comparison)
    }

    fn declaration(&mut self) -> Result<Node> {
        let start = self.advance().span.clone(); // consume 'new'
        let is_const = self.match_keyword(Keyword::Const);

        let type_name = match (&self.peek().kind, self.peek().type_name) {
            (TokenKind::Keyword(_), Some(type_name)) => type_name,
            (kind, _) => {
                return Err(self.error(format!(
                    "Expected 'int', 'double', 'string', 'func' or 'list', but got {}",
                    kind
                )))
            }
        };
        self.advance();

        let name = self.expect_ident("Expected identifier")?;
        self.expect(&TokenKind::Equal, "Expected '='")?;
        let value = self.expression()?;

        Ok(Node::VarDeclare {
            name,
            type_name,
            value: Box::new(value),
            is_const,
            span: self.span_from(&start),
        })
    }

    fn comparison(&mut self) -> Result<Node> {
        if self.peek().is_keyword(Keyword::Not) {
            let start = self.advance().span.clone();
            let operand = self.comparison()?;
            let span = start.to(operand.span());
            return Ok(Node::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                span,
            });
        }
        self.binary_chain(Parser::arithmetic, comparison_op, Parser::arithmetic)
    }

    fn arithmetic(&mut self) -> Result<Node> {
        self.binary_chain(Parser::term, additive_op, Parser::term)
    }

    fn term(&mut self) -> Result<Node> {
        self.binary_chain(Parser::factor, multiplicative_op, Parser::factor)
    }

    fn factor(&mut self) -> Result<Node> {
        let op = match self.peek().kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.power(),
        };
        let start = self.advance().span.clone();
        let operand = self.factor()?;
        let span = start.to(operand.span());
        Ok(Node::UnaryOp {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    /// The right operand re-enters `factor`, which makes `^` right-associative
    fn power(&mut self) -> Result<Node> {
        self.binary_chain(Parser::call, power_op, Parser::factor)
    }

    /// Left-associative chain `operand (OP right_operand)*` over the
    /// operators accepted by `operators`
    fn binary_chain(&mut self, operand: Rule, operators: OperatorSet, right_operand: Rule) -> Result<Node> {
        let mut left = operand(self)?;

        while let Some(op) = operators(&self.peek().kind) {
            self.advance();
            let right = right_operand(self)?;
            let span = left.span().to(right.span());
            left = Node::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    fn call(&mut self) -> Result<Node> {
        let mut node = self.quark()?;

        while self.match_token(&TokenKind::LeftParen) {
            node = self.finish_call(node)?;
        }

        Ok(node)
    }

    fn finish_call(&mut self, callee: Node) -> Result<Node> {
        let mut args = Vec::new();

        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(&TokenKind::RightParen, "Expected ',' or ')'")?;
        let span = callee.span().to(&self.previous().span);

        Ok(Node::Call {
            callee: Box::new(callee),
            args,
            span,
        })
    }

    fn quark(&mut self) -> Result<Node> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Integer(value) => {
                self.advance();
                Ok(Node::IntegerLiteral { value, span: token.span })
            }
            TokenKind::Double(value) => {
                self.advance();
                Ok(Node::DoubleLiteral { value, span: token.span })
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(Node::StringLiteral { value, span: token.span })
            }
            TokenKind::Ident(name) => {
                self.advance();
                let Some(op) = assign_op(&self.peek().kind) else {
                    return Ok(Node::VarAccess { name, span: token.span });
                };
                self.advance();
                let value = self.expression()?;
                let span = token.span.to(value.span());
                Ok(Node::VarReassign {
                    name,
                    op,
                    value: Box::new(value),
                    span,
                })
            }
            TokenKind::LeftParen => {
                self.advance();
                let node = self.expression()?;
                self.expect(&TokenKind::RightParen, "Expected ')'")?;
                Ok(node)
            }
            TokenKind::LeftBracket => self.list_literal(),
            TokenKind::Keyword(Keyword::If) => self.if_expr(),
            TokenKind::Keyword(Keyword::For) => self.for_expr(),
            TokenKind::Keyword(Keyword::While) => self.while_expr(),
            TokenKind::Keyword(Keyword::Func) => self.func_def(),
            _ => Err(self.error(QUARK_EXPECTED)),
        }
    }

    fn list_literal(&mut self) -> Result<Node> {
        let start = self.advance().span.clone(); // consume '['
        let mut elements = Vec::new();

        if !self.check(&TokenKind::RightBracket) {
            loop {
                elements.push(self.expression()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(&TokenKind::RightBracket, "Expected ',' or ']'")?;
        Ok(Node::ListLiteral {
            elements,
            span: self.span_from(&start),
        })
    }

    // ==================== Control flow ====================

    fn if_expr(&mut self) -> Result<Node> {
        let start = self.advance().span.clone(); // consume 'if'
        let mut cases = vec![self.if_case()?];
        let mut else_case = None;

        // elif/else may follow on a later line
        loop {
            let mark = self.current;
            self.skip_newlines();
            if self.match_keyword(Keyword::Elif) {
                cases.push(self.if_case()?);
            } else if self.match_keyword(Keyword::Else) {
                else_case = Some(self.body()?);
                break;
            } else {
                self.current = mark;
                break;
            }
        }

        Ok(Node::If {
            cases,
            else_case,
            span: self.span_from(&start),
        })
    }

    fn if_case(&mut self) -> Result<IfCase> {
        let condition = self.expression()?;
        let body = self.body()?;
        Ok(IfCase { condition, body })
    }

    fn for_expr(&mut self) -> Result<Node> {
        let start = self.advance().span.clone(); // consume 'for'

        let var = self.expect_ident("Expected identifier")?;
        self.expect(&TokenKind::Semicolon, "Expected ';'")?;

        self.expect_loop_var(&var)?;
        let compare = match self.peek().kind {
            TokenKind::EqualEqual => CompareOp::Eq,
            TokenKind::Less => CompareOp::Lt,
            TokenKind::Greater => CompareOp::Gt,
            TokenKind::LessEqual => CompareOp::Le,
            TokenKind::GreaterEqual => CompareOp::Ge,
            _ => return Err(self.error("Expected '==', '<', '>', '<=' or '>='")),
        };
        self.advance();
        let bound = self.expression()?;
        self.expect(&TokenKind::Semicolon, "Expected ';'")?;

        self.expect_loop_var(&var)?;
        let step_op = match assign_op(&self.peek().kind) {
            Some(AssignOp::Compound(op)) => op,
            _ => return Err(self.error("Expected '+=', '-=', '*=' or '/='")),
        };
        self.advance();
        let step = self.expression()?;

        let body = self.loop_body()?;

        Ok(Node::For {
            var,
            compare,
            bound: Box::new(bound),
            step_op,
            step: Box::new(step),
            body,
            span: self.span_from(&start),
        })
    }

    fn expect_loop_var(&mut self, var: &str) -> Result<()> {
        match &self.peek().kind {
            TokenKind::Ident(name) if name == var => {
                self.advance();
                Ok(())
            }
            _ => Err(self.error(format!(
                "Expected '{}': one variable must be used while creating a for loop",
                var
            ))),
        }
    }

    fn while_expr(&mut self) -> Result<Node> {
        let start = self.advance().span.clone(); // consume 'while'
        let condition = self.expression()?;
        let body = self.loop_body()?;

        Ok(Node::While {
            condition: Box::new(condition),
            body,
            span: self.span_from(&start),
        })
    }

    fn func_def(&mut self) -> Result<Node> {
        let start = self.advance().span.clone(); // consume 'func'

        let name = match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        };

        let expected = if name.is_some() { "Expected '('" } else { "Expected '(' or identifier" };
        self.expect(&TokenKind::LeftParen, expected)?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                params.push(self.expect_ident("Expected identifier")?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightParen, "Expected ',' or ')'")?;

        let body = self.body()?;

        Ok(Node::FuncDef {
            name,
            params,
            body: Rc::new(body),
            span: self.span_from(&start),
        })
    }

    // ==================== Bodies ====================

    /// `-> stmt`, `{ stmt }` or `{` newline statements `}`
    fn body(&mut self) -> Result<Body> {
        if self.match_token(&TokenKind::Arrow) {
            return self.inline_body();
        }

        let open = self.expect(&TokenKind::LeftBrace, "Expected '{' or '->'")?.span.clone();
        if self.check(&TokenKind::Newline) {
            return self.block_rest(open);
        }

        let node = self.statement()?;
        self.expect(&TokenKind::RightBrace, "Expected '}'")?;
        Ok(Body {
            node: Box::new(node),
            form: BodyForm::Inline,
        })
    }

    /// Loop bodies in braces are always statement blocks; `-> expr` is the
    /// accumulating form
    fn loop_body(&mut self) -> Result<Body> {
        if self.match_token(&TokenKind::Arrow) {
            return self.inline_body();
        }

        let open = self.expect(&TokenKind::LeftBrace, "Expected '{' or '->'")?.span.clone();
        self.block_rest(open)
    }

    /// A single statement, so `-> break` and `-> return x` are allowed
    fn inline_body(&mut self) -> Result<Body> {
        let node = self.statement()?;
        Ok(Body {
            node: Box::new(node),
            form: BodyForm::Inline,
        })
    }

    /// Statements up to the closing brace; `{` is already consumed
    fn block_rest(&mut self, open: Span) -> Result<Body> {
        self.skip_newlines();

        let statements = if self.check(&TokenKind::RightBrace) {
            Vec::new()
        } else {
            match self.statements()? {
                Node::Block { statements, .. } => statements,
                other => vec![other],
            }
        };

        self.skip_newlines();
        self.expect(&TokenKind::RightBrace, "Expected '}'")?;

        Ok(Body {
            node: Box::new(Node::Block {
                statements,
                span: self.span_from(&open),
            }),
            form: BodyForm::Block,
        })
    }

    // ==================== Helpers ====================

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().kind == *kind
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.peek().is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> Result<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    fn expect_ident(&mut self, message: &str) -> Result<String> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error(message))
        }
    }

    /// Returns how many newlines were skipped
    fn skip_newlines(&mut self) -> usize {
        let mut count = 0;
        while self.match_token(&TokenKind::Newline) {
            count += 1;
        }
        count
    }

    /// Span from `start` through the last consumed token
    fn span_from(&self, start: &Span) -> Span {
        start.to(&self.previous().span)
    }

    fn error(&self, message: impl Into<String>) -> KromiumError {
        KromiumError::syntax(message, self.peek().span.clone())
    }
}

fn logical_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Keyword(Keyword::And) | TokenKind::Ampersand => Some(BinaryOp::And),
        TokenKind::Keyword(Keyword::Or) | TokenKind::Pipe => Some(BinaryOp::Or),
        _ => None,
    }
}

fn comparison_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::EqualEqual => Some(BinaryOp::Eq),
        TokenKind::BangEqual => Some(BinaryOp::Ne),
        TokenKind::Less => Some(BinaryOp::Lt),
        TokenKind::Greater => Some(BinaryOp::Gt),
        TokenKind::LessEqual => Some(BinaryOp::Le),
        TokenKind::GreaterEqual => Some(BinaryOp::Ge),
        _ => None,
    }
}

fn additive_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        _ => None,
    }
}

fn multiplicative_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        _ => None,
    }
}

fn power_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Pow => Some(BinaryOp::Pow),
        _ => None,
    }
}

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    match kind {
        TokenKind::Equal => Some(AssignOp::Set),
        TokenKind::PlusEqual => Some(AssignOp::Compound(ArithOp::Add)),
        TokenKind::MinusEqual => Some(AssignOp::Compound(ArithOp::Sub)),
        TokenKind::StarEqual => Some(AssignOp::Compound(ArithOp::Mul)),
        TokenKind::SlashEqual => Some(AssignOp::Compound(ArithOp::Div)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::token::TypeName;

    fn parse(source: &str) -> Vec<Node> {
        let tokens = Lexer::new("<test>", source).tokenize().unwrap();
        match Parser::new(tokens).parse().unwrap() {
            Node::Block { statements, .. } => statements,
            other => panic!("expected statement list, got {:?}", other),
        }
    }

    fn parse_one(source: &str) -> Node {
        let mut statements = parse(source);
        assert_eq!(statements.len(), 1, "expected one statement in {:?}", source);
        statements.remove(0)
    }

    fn parse_error(source: &str) -> String {
        let tokens = Lexer::new("<test>", source).tokenize().unwrap();
        match Parser::new(tokens).parse() {
            Ok(node) => panic!("expected syntax error, got {:?}", node),
            Err(err) => err.kind.to_string(),
        }
    }

    #[test]
    fn test_declaration() {
        match parse_one("new const int x = 42") {
            Node::VarDeclare { name, type_name, is_const, value, .. } => {
                assert_eq!(name, "x");
                assert_eq!(type_name, TypeName::Int);
                assert!(is_const);
                assert!(matches!(*value, Node::IntegerLiteral { value: 42, .. }));
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_reassignment_ops() {
        let ops: Vec<_> = parse("x = 1\nx += 1\nx -= 1\nx *= 1\nx /= 1")
            .into_iter()
            .map(|node| match node {
                Node::VarReassign { op, .. } => op,
                other => panic!("expected reassignment, got {:?}", other),
            })
            .collect();
        assert_eq!(ops, vec![
            AssignOp::Set,
            AssignOp::Compound(ArithOp::Add),
            AssignOp::Compound(ArithOp::Sub),
            AssignOp::Compound(ArithOp::Mul),
            AssignOp::Compound(ArithOp::Div),
        ]);
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        match parse_one("1 + 2 * 3") {
            Node::BinaryOp { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(*right, Node::BinaryOp { op: BinaryOp::Mul, .. }));
            }
            other => panic!("expected addition, got {:?}", other),
        }
    }

    #[test]
    fn test_power_is_right_associative() {
        match parse_one("2 ^ 3 ** 2") {
            Node::BinaryOp { op: BinaryOp::Pow, left, right, .. } => {
                assert!(matches!(*left, Node::IntegerLiteral { value: 2, .. }));
                assert!(matches!(*right, Node::BinaryOp { op: BinaryOp::Pow, .. }));
            }
            other => panic!("expected power, got {:?}", other),
        }
    }

    #[test]
    fn test_logical_binds_loosest() {
        match parse_one("1 < 2 and not 3 == 4") {
            Node::BinaryOp { op: BinaryOp::And, left, right, .. } => {
                assert!(matches!(*left, Node::BinaryOp { op: BinaryOp::Lt, .. }));
                assert!(matches!(*right, Node::UnaryOp { op: UnaryOp::Not, .. }));
            }
            other => panic!("expected and, got {:?}", other),
        }
    }

    #[test]
    fn test_statement_list_stops_cleanly() {
        let statements = parse("\n\n1\n\n2\n3\n\n");
        assert_eq!(statements.len(), 3);
    }

    #[test]
    fn test_spans_cover_source() {
        match parse_one("new int total = 1 + 2") {
            Node::VarDeclare { span, value, .. } => {
                assert_eq!(span.text(), "new int total = 1 + 2");
                assert_eq!(value.span().text(), "1 + 2");
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_function_forms() {
        match parse_one("func add(a, b) -> a + b") {
            Node::FuncDef { name, params, body, .. } => {
                assert_eq!(name.as_deref(), Some("add"));
                assert_eq!(params, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(body.form, BodyForm::Inline);
            }
            other => panic!("expected function, got {:?}", other),
        }

        match parse_one("func (x) {\n  out(x)\n  return x\n}") {
            Node::FuncDef { name, body, .. } => {
                assert!(name.is_none());
                assert_eq!(body.form, BodyForm::Block);
                assert!(matches!(&*body.node, Node::Block { statements, .. } if statements.len() == 2));
            }
            other => panic!("expected function, got {:?}", other),
        }

        match parse_one("func twice(x) { x * 2 }") {
            Node::FuncDef { body, .. } => assert_eq!(body.form, BodyForm::Inline),
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_if_elif_else_across_lines() {
        let source = "if x {\n  1\n}\nelif y -> 2\nelse {\n  3\n}\nout(x)";
        let statements = parse(source);
        assert_eq!(statements.len(), 2);
        match &statements[0] {
            Node::If { cases, else_case, .. } => {
                assert_eq!(cases.len(), 2);
                assert_eq!(cases[0].body.form, BodyForm::Block);
                assert_eq!(cases[1].body.form, BodyForm::Inline);
                assert!(else_case.is_some());
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_for_loop() {
        match parse_one("for i; i < 10; i += 2 { out(i) }") {
            Node::For { var, compare, step_op, body, .. } => {
                assert_eq!(var, "i");
                assert_eq!(compare, CompareOp::Lt);
                assert_eq!(step_op, ArithOp::Add);
                assert_eq!(body.form, BodyForm::Block);
            }
            other => panic!("expected for loop, got {:?}", other),
        }

        match parse_one("for i; i >= 0; i -= 1 -> i") {
            Node::For { compare, step_op, body, .. } => {
                assert_eq!(compare, CompareOp::Ge);
                assert_eq!(step_op, ArithOp::Sub);
                assert_eq!(body.form, BodyForm::Inline);
            }
            other => panic!("expected for loop, got {:?}", other),
        }
    }

    #[test]
    fn test_while_loop() {
        match parse_one("while i < 3 {\n  i += 1\n}") {
            Node::While { body, .. } => assert_eq!(body.form, BodyForm::Block),
            other => panic!("expected while loop, got {:?}", other),
        }
    }

    #[test]
    fn test_calls_and_lists() {
        match parse_one("f(1, [2, 3], [])") {
            Node::Call { args, .. } => {
                assert_eq!(args.len(), 3);
                assert!(matches!(&args[1], Node::ListLiteral { elements, .. } if elements.len() == 2));
                assert!(matches!(&args[2], Node::ListLiteral { elements, .. } if elements.is_empty()));
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_control_statements() {
        let source = "func f() {\n  return\n}\nwhile 1 {\n  break\n  advance\n}\ninclude \"lib.kr\"";
        let statements = parse(source);
        assert_eq!(statements.len(), 3);
        match &statements[0] {
            Node::FuncDef { body, .. } => {
                assert!(matches!(&*body.node, Node::Block { statements, .. }
                    if matches!(statements[0], Node::Return { value: None, .. })));
            }
            other => panic!("expected function, got {:?}", other),
        }
        assert!(matches!(&statements[2], Node::Include { path, .. } if path == "lib.kr"));
    }

    #[test]
    fn test_empty_program_and_block() {
        assert!(parse("\n\n").is_empty());
        match parse_one("func f() {\n}") {
            Node::FuncDef { body, .. } => {
                assert!(matches!(&*body.node, Node::Block { statements, .. } if statements.is_empty()));
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(parse_error("(1 + 2"), "Expected ')'");
        assert_eq!(parse_error("f(1 2)"), "Expected ',' or ')'");
        assert_eq!(parse_error("[1, 2"), "Expected ',' or ']'");
        assert_eq!(parse_error("new x = 1"), "Expected 'int', 'double', 'string', 'func' or 'list', but got x");
        assert_eq!(parse_error("new int = 1"), "Expected identifier");
        assert_eq!(parse_error("1 +"), QUARK_EXPECTED);
        assert!(parse_error("for i; j < 3; i += 1 -> i").contains("one variable"));
        assert!(parse_error("1 2").starts_with("Expected '+'"));
    }

    #[test]
    fn test_committed_failure_inside_list_is_reported() {
        // the third statement consumes tokens before failing
        assert_eq!(parse_error("1\n2\n(3"), "Expected ')'");
    }

    #[test]
    fn test_error_points_at_current_token() {
        let tokens = Lexer::new("<test>", "(1 + 2").tokenize().unwrap();
        let err = Parser::new(tokens).parse().unwrap_err();
        assert_eq!(err.span.start.column, 7);
    }
}
