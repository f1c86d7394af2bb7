//! Abstract Syntax Tree definitions for Kromium
//!
//! Represents the structure of programs after parsing. Every node carries
//! the span of source it was parsed from.

use std::rc::Rc;

use crate::position::Span;
use crate::token::TypeName;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,      // +
    Sub,      // -
    Mul,      // *
    Div,      // /
    Pow,      // ^ or **
    Eq,       // ==
    Ne,       // !=
    Lt,       // <
    Gt,       // >
    Le,       // <=
    Ge,       // >=
    And,      // and, &
    Or,       // or, |
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus, // +
    Neg,  // -
    Not,  // not
}

/// The arithmetic half of a compound assignment or a `for` step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn as_binary(&self) -> BinaryOp {
        match self {
            ArithOp::Add => BinaryOp::Add,
            ArithOp::Sub => BinaryOp::Sub,
            ArithOp::Mul => BinaryOp::Mul,
            ArithOp::Div => BinaryOp::Div,
        }
    }
}

/// `=` or one of `+= -= *= /=`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Compound(ArithOp),
}

/// The comparison tested on every `for` iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    pub fn holds<T: PartialOrd>(&self, left: T, right: T) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Lt => left < right,
            CompareOp::Gt => left > right,
            CompareOp::Le => left <= right,
            CompareOp::Ge => left >= right,
        }
    }
}

/// How a construct's body was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyForm {
    /// `-> expr` or `{ expr }`: the expression's value is the result
    Inline,
    /// `{` newline statements `}`: the result is null
    Block,
}

/// The body of an `if` branch, loop or function
#[derive(Debug, Clone)]
pub struct Body {
    pub node: Box<Node>,
    pub form: BodyForm,
}

/// One `if` / `elif` arm
#[derive(Debug, Clone)]
pub struct IfCase {
    pub condition: Node,
    pub body: Body,
}

/// AST nodes
#[derive(Debug, Clone)]
pub enum Node {
    /// Integer literal: 42
    IntegerLiteral { value: i64, span: Span },

    /// Double literal: 3.14
    DoubleLiteral { value: f64, span: Span },

    /// String literal: "hello"
    StringLiteral { value: String, span: Span },

    /// List literal: [a, b, c]
    ListLiteral { elements: Vec<Node>, span: Span },

    /// Binary operation: a + b, x < y
    BinaryOp {
        left: Box<Node>,
        op: BinaryOp,
        right: Box<Node>,
        span: Span,
    },

    /// Unary operation: -x, not y
    UnaryOp {
        op: UnaryOp,
        operand: Box<Node>,
        span: Span,
    },

    /// Variable reference: foo
    VarAccess { name: String, span: Span },

    /// Declaration: new [const] TYPE name = value
    VarDeclare {
        name: String,
        type_name: TypeName,
        value: Box<Node>,
        is_const: bool,
        span: Span,
    },

    /// Reassignment: name = value, name += value, ...
    VarReassign {
        name: String,
        op: AssignOp,
        value: Box<Node>,
        span: Span,
    },

    /// if cond body (elif cond body)* (else body)?
    If {
        cases: Vec<IfCase>,
        else_case: Option<Body>,
        span: Span,
    },

    /// for var; var CMP bound; var STEP step body
    For {
        var: String,
        compare: CompareOp,
        bound: Box<Node>,
        step_op: ArithOp,
        step: Box<Node>,
        body: Body,
        span: Span,
    },

    /// while cond body
    While {
        condition: Box<Node>,
        body: Body,
        span: Span,
    },

    /// func [name](params) body
    FuncDef {
        name: Option<String>,
        params: Vec<String>,
        body: Rc<Body>,
        span: Span,
    },

    /// Call: callee(args)
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
        span: Span,
    },

    /// return [value]
    Return { value: Option<Box<Node>>, span: Span },

    /// break
    Break { span: Span },

    /// advance (continue)
    Advance { span: Span },

    /// include "path"
    Include { path: String, span: Span },

    /// Newline-separated statement list
    Block { statements: Vec<Node>, span: Span },
}

impl Node {
    pub fn span(&self) -> &Span {
        match self {
            Node::IntegerLiteral { span, .. }
            | Node::DoubleLiteral { span, .. }
            | Node::StringLiteral { span, .. }
            | Node::ListLiteral { span, .. }
            | Node::BinaryOp { span, .. }
            | Node::UnaryOp { span, .. }
            | Node::VarAccess { span, .. }
            | Node::VarDeclare { span, .. }
            | Node::VarReassign { span, .. }
            | Node::If { span, .. }
            | Node::For { span, .. }
            | Node::While { span, .. }
            | Node::FuncDef { span, .. }
            | Node::Call { span, .. }
            | Node::Return { span, .. }
            | Node::Break { span }
            | Node::Advance { span }
            | Node::Include { span, .. }
            | Node::Block { span, .. } => span,
        }
    }
}
