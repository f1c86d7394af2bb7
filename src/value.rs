//! Runtime value types for Kromium
//!
//! Operators dispatch on the left operand. They report failures as a bare
//! `ErrorKind`; the interpreter attaches the span and call frames.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::ast::{BinaryOp, Body, UnaryOp};
use crate::error::ErrorKind;
use crate::scope::{Scope, ScopeRef};
use crate::token::TypeName;

/// Result of applying an operator to values
pub type OpResult = std::result::Result<Value, ErrorKind>;

/// Runtime values in Kromium
#[derive(Clone)]
pub enum Value {
    /// 64-bit integer; also stands in for null and booleans
    Integer(i64),

    /// Floating point number
    Double(f64),

    /// String value
    String(String),

    /// Mutable list, shared by every binding that holds it
    List(Rc<RefCell<Vec<Value>>>),

    /// User-defined function
    Function(Rc<Function>),

    /// Built-in function
    BuiltinFunction(Builtin),
}

impl Value {
    pub fn null() -> Self {
        Value::Integer(0)
    }

    pub fn bool(value: bool) -> Self {
        Value::Integer(value as i64)
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// The kind name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Function(_) => "Function",
            Value::BuiltinFunction(_) => "BuiltinFunction",
        }
    }

    /// The declared type this value belongs to
    pub fn type_name(&self) -> TypeName {
        match self {
            Value::Integer(_) => TypeName::Int,
            Value::Double(_) => TypeName::Double,
            Value::String(_) => TypeName::String,
            Value::List(_) => TypeName::List,
            Value::Function(_) | Value::BuiltinFunction(_) => TypeName::Func,
        }
    }

    pub fn matches_type(&self, type_name: TypeName) -> bool {
        self.type_name() == type_name
    }

    /// Numbers are true when nonzero, strings when nonempty, everything
    /// else is false
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Integer(n) => *n != 0,
            Value::Double(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            _ => false,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Truthiness for `and`/`or`/`not`, which only accept scalars
    fn logical(&self) -> std::result::Result<bool, ErrorKind> {
        match self {
            Value::Integer(_) | Value::Double(_) | Value::String(_) => Ok(self.is_truthy()),
            _ => Err(ErrorKind::IllegalOperation),
        }
    }

    // ==================== Operators ====================

    pub fn binary(&self, op: BinaryOp, other: &Value) -> OpResult {
        match op {
            BinaryOp::Add => self.add(other),
            BinaryOp::Sub => self.sub(other),
            BinaryOp::Mul => self.mul(other),
            BinaryOp::Div => self.div(other),
            BinaryOp::Pow => self.pow(other),
            BinaryOp::Eq => self.equals(other).map(Value::bool),
            BinaryOp::Ne => self.equals(other).map(|eq| Value::bool(!eq)),
            BinaryOp::Lt => self.order(other, |a, b| a < b, |a, b| a < b),
            BinaryOp::Gt => self.order(other, |a, b| a > b, |a, b| a > b),
            BinaryOp::Le => self.order(other, |a, b| a <= b, |a, b| a <= b),
            BinaryOp::Ge => self.order(other, |a, b| a >= b, |a, b| a >= b),
            BinaryOp::And => Ok(Value::bool(self.logical()? & other.logical()?)),
            BinaryOp::Or => Ok(Value::bool(self.logical()? | other.logical()?)),
        }
    }

    pub fn unary(&self, op: UnaryOp) -> OpResult {
        match (op, self) {
            (UnaryOp::Plus, Value::Integer(_) | Value::Double(_)) => Ok(self.clone()),
            (UnaryOp::Neg, Value::Integer(n)) => n.checked_neg().map(Value::Integer).ok_or(ErrorKind::IntegerOverflow),
            (UnaryOp::Neg, Value::Double(n)) => Ok(Value::Double(-n)),
            (UnaryOp::Not, _) => Ok(Value::bool(!self.logical()?)),
            _ => Err(ErrorKind::IllegalOperation),
        }
    }

    fn add(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.checked_add(*b).map(Value::Integer).ok_or(ErrorKind::IntegerOverflow),
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            (Value::List(items), _) => {
                let mut items = items.borrow().clone();
                items.push(other.clone());
                Ok(Value::list(items))
            }
            _ => self.float_arith(other, |a, b| a + b),
        }
    }

    fn sub(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.checked_sub(*b).map(Value::Integer).ok_or(ErrorKind::IntegerOverflow),
            (Value::List(items), Value::Integer(index)) => {
                let mut items = items.borrow().clone();
                let at = resolve_index(items.len(), *index)?;
                items.remove(at);
                Ok(Value::list(items))
            }
            _ => self.float_arith(other, |a, b| a - b),
        }
    }

    fn mul(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.checked_mul(*b).map(Value::Integer).ok_or(ErrorKind::IntegerOverflow),
            (Value::Integer(n), Value::String(s)) | (Value::String(s), Value::Integer(n)) => repeat(s, *n),
            (Value::List(items), Value::List(extra)) => {
                let mut items = items.borrow().clone();
                items.extend(extra.borrow().iter().cloned());
                Ok(Value::list(items))
            }
            _ => self.float_arith(other, |a, b| a * b),
        }
    }

    fn div(&self, other: &Value) -> OpResult {
        if other.as_number() == Some(0.0) && self.as_number().is_some() {
            return Err(ErrorKind::DivisionByZero);
        }
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) if a.checked_rem(*b) == Some(0) => {
                a.checked_div(*b).map(Value::Integer).ok_or(ErrorKind::IntegerOverflow)
            }
            (Value::List(items), Value::Integer(index)) => {
                let items = items.borrow();
                let at = resolve_index(items.len(), *index)?;
                Ok(items[at].clone())
            }
            _ => self.float_arith(other, |a, b| a / b),
        }
    }

    fn pow(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) if *b >= 0 => u32::try_from(*b)
                .ok()
                .and_then(|exp| a.checked_pow(exp))
                .map(Value::Integer)
                .ok_or(ErrorKind::IntegerOverflow),
            _ => self.float_arith(other, f64::powf),
        }
    }

    /// Mixed or floating arithmetic. An Integer left operand yields an
    /// Integer whenever the result is integral.
    fn float_arith(&self, other: &Value, apply: fn(f64, f64) -> f64) -> OpResult {
        let (Some(a), Some(b)) = (self.as_number(), other.as_number()) else {
            return Err(ErrorKind::IllegalOperation);
        };
        let result = apply(a, b);
        match self {
            Value::Integer(_) => Ok(normalize(result)),
            _ => Ok(Value::Double(result)),
        }
    }

    fn equals(&self, other: &Value) -> std::result::Result<bool, ErrorKind> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a == b),
            (Value::String(a), Value::String(b)) => Ok(a == b),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => Ok(a == b),
                _ => Err(ErrorKind::IllegalOperation),
            },
        }
    }

    fn order(&self, other: &Value, ints: fn(&i64, &i64) -> bool, floats: fn(&f64, &f64) -> bool) -> OpResult {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::bool(ints(a, b))),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => Ok(Value::bool(floats(&a, &b))),
                _ => Err(ErrorKind::IllegalOperation),
            },
        }
    }

    /// Re-link a function that was stored without owning its scope
    pub(crate) fn attached(self) -> Value {
        match &self {
            Value::Function(function) => match &function.closure {
                Captured::Detached(weak) => match weak.upgrade() {
                    Some(scope) => Value::Function(Rc::new(function.with_closure(Captured::Owned(scope)))),
                    None => self,
                },
                Captured::Owned(_) => self,
            },
            _ => self,
        }
    }

    /// Drop the owning edge from a function to `scope` when it is about to
    /// be stored in that same scope
    pub(crate) fn detached_from(self, scope: &Scope) -> Value {
        match &self {
            Value::Function(function) => match &function.closure {
                Captured::Owned(captured) if std::ptr::eq(captured.as_ptr(), scope) => {
                    Value::Function(Rc::new(function.with_closure(Captured::Detached(Rc::downgrade(captured)))))
                }
                _ => self,
            },
            _ => self,
        }
    }
}

/// Map a possibly negative index onto `0..len`
pub fn resolve_index(len: usize, index: i64) -> std::result::Result<usize, ErrorKind> {
    let len = i64::try_from(len).map_err(|_| ErrorKind::IndexOutOfRange(index))?;
    let resolved = if index < 0 { index + len } else { index };
    if (0..len).contains(&resolved) {
        Ok(resolved as usize)
    } else {
        Err(ErrorKind::IndexOutOfRange(index))
    }
}

fn normalize(result: f64) -> Value {
    if result.is_finite() && result.fract() == 0.0 && result.abs() < i64::MAX as f64 {
        Value::Integer(result as i64)
    } else {
        Value::Double(result)
    }
}

/// `s` repeated `count` times; a negative count gives the empty string
fn repeat(s: &str, count: i64) -> OpResult {
    let count = usize::try_from(count).unwrap_or(0);
    if s.is_empty() || count == 0 {
        return Ok(Value::String(String::new()));
    }

    let total = s
        .len()
        .checked_mul(count)
        .filter(|&total| total <= isize::MAX as usize)
        .ok_or(ErrorKind::IntegerOverflow)?;
    let mut out = String::new();
    out.try_reserve_exact(total).map_err(|_| ErrorKind::IntegerOverflow)?;
    for _ in 0..count {
        out.push_str(s);
    }
    Ok(Value::String(out))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_value(self, f, &mut Vec::new())
    }
}

/// Lists that contain themselves print as `[...]` at the point of recursion
fn fmt_value(value: &Value, f: &mut fmt::Formatter<'_>, open: &mut Vec<*const RefCell<Vec<Value>>>) -> fmt::Result {
    match value {
        Value::Integer(n) => write!(f, "{}", n),
        Value::Double(n) => write!(f, "{:?}", n),
        Value::String(s) => write!(f, "{}", s),
        Value::List(items) => {
            let ptr = Rc::as_ptr(items);
            if open.contains(&ptr) {
                return write!(f, "[...]");
            }
            open.push(ptr);
            write!(f, "[")?;
            for (i, item) in items.borrow().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                fmt_value(item, f, open)?;
            }
            open.pop();
            write!(f, "]")
        }
        Value::Function(function) => write!(f, "<function {}>", function.display_name()),
        Value::BuiltinFunction(builtin) => write!(f, "<built-in function {}>", builtin.name()),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "String({:?})", s),
            _ => write!(f, "{}({})", self.kind_name(), self),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(&a.body, &b.body),
            (Value::BuiltinFunction(a), Value::BuiltinFunction(b)) => a == b,
            _ => false,
        }
    }
}

/// How a function holds the scope it was defined in
#[derive(Clone)]
pub enum Captured {
    Owned(ScopeRef),
    /// The copy stored inside its own defining scope
    Detached(Weak<RefCell<Scope>>),
}

impl Captured {
    pub fn scope(&self) -> Option<ScopeRef> {
        match self {
            Captured::Owned(scope) => Some(scope.clone()),
            Captured::Detached(weak) => weak.upgrade(),
        }
    }
}

/// User-defined function
#[derive(Clone)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Body>,
    pub closure: Captured,
}

impl Function {
    pub fn new(name: Option<String>, params: Vec<String>, body: Rc<Body>, scope: ScopeRef) -> Self {
        Self {
            name,
            params,
            body,
            closure: Captured::Owned(scope),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    fn with_closure(&self, closure: Captured) -> Self {
        Self {
            closure,
            ..self.clone()
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.display_name())
    }
}

/// Built-in functions bound in the root scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Out,
    Input,
    Integer,
    TypeOf,
    Len,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [Builtin::Out, Builtin::Input, Builtin::Integer, Builtin::TypeOf, Builtin::Len];

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Out => "out",
            Builtin::Input => "input",
            Builtin::Integer => "integer",
            Builtin::TypeOf => "typeof",
            Builtin::Len => "len",
        }
    }

    /// Parameter names, used for arity checks and argument binding
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            Builtin::Input => &[],
            _ => &["value"],
        }
    }
}
