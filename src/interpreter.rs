//! Tree-walking interpreter for Kromium
//!
//! Evaluates the AST directly. Scopes hold bindings; contexts form the
//! caller chain used only to build tracebacks. Control transfer (`return`,
//! `break`, `advance`) travels on the error path as an `Unwind` and is
//! caught by the construct that owns it.

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::ast::{ArithOp, AssignOp, BinaryOp, Body, BodyForm, CompareOp, IfCase, Node};
use crate::error::{ErrorKind, KromiumError, Result, TraceFrame};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::position::{Position, Span};
use crate::scope::{Binding, Scope, ScopeRef};
use crate::token::TypeName;
use crate::value::{resolve_index, Builtin, Function, Value};

/// Nested calls allowed before evaluation is aborted
pub const MAX_CALL_DEPTH: usize = 256;

/// One frame of the caller chain
pub struct Context {
    pub display_name: String,
    pub parent: Option<Rc<Context>>,
    /// Where the parent handed control to this frame
    pub entry: Option<Position>,
    pub scope: ScopeRef,
}

impl Context {
    pub fn root(scope: ScopeRef) -> Rc<Self> {
        Rc::new(Self {
            display_name: "<program>".to_string(),
            parent: None,
            entry: None,
            scope,
        })
    }

    fn call(name: &str, parent: &Rc<Context>, entry: &Span, scope: ScopeRef) -> Rc<Self> {
        Rc::new(Self {
            display_name: name.to_string(),
            parent: Some(parent.clone()),
            entry: Some(entry.start.clone()),
            scope,
        })
    }

    /// Frames from this context out to the root, innermost first
    pub fn traceback(&self, at: &Position) -> Vec<TraceFrame> {
        let mut frames = Vec::new();
        let mut pos = at.clone();
        let mut ctx = Some(self);

        while let Some(current) = ctx {
            frames.push(TraceFrame {
                filename: pos.filename().to_string(),
                line: pos.line,
                name: current.display_name.clone(),
            });
            match &current.entry {
                Some(entry) => pos = entry.clone(),
                None => break,
            }
            ctx = current.parent.as_deref();
        }

        frames
    }

    fn failure(&self, kind: ErrorKind, span: Span) -> KromiumError {
        let traceback = self.traceback(&span.start);
        KromiumError::new(kind, span).with_traceback(traceback)
    }

    fn error(&self, kind: ErrorKind, span: Span) -> Unwind {
        Unwind::Error(self.failure(kind, span))
    }
}

/// Why evaluation of a node stopped early
#[derive(Debug)]
enum Unwind {
    Error(KromiumError),
    Return(Value, Span),
    Break(Span),
    Advance(Span),
}

impl From<KromiumError> for Unwind {
    fn from(err: KromiumError) -> Self {
        Unwind::Error(err)
    }
}

type Flow<T> = std::result::Result<T, Unwind>;

/// What a compound assignment does, keyed by declared type and operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Update {
    Arithmetic,
    Concat,
    Repeat,
    Append,
    RemoveAt,
    Extend,
    Select,
}

fn update_rule(type_name: TypeName, op: ArithOp) -> Option<Update> {
    match (type_name, op) {
        (TypeName::Int | TypeName::Double, _) => Some(Update::Arithmetic),
        (TypeName::String, ArithOp::Add) => Some(Update::Concat),
        (TypeName::String, ArithOp::Mul) => Some(Update::Repeat),
        (TypeName::String, ArithOp::Sub | ArithOp::Div) => None,
        (TypeName::List, ArithOp::Add) => Some(Update::Append),
        (TypeName::List, ArithOp::Sub) => Some(Update::RemoveAt),
        (TypeName::List, ArithOp::Mul) => Some(Update::Extend),
        (TypeName::List, ArithOp::Div) => Some(Update::Select),
        (TypeName::Func, _) => None,
    }
}

/// Result of applying an update: a new value to bind, or the value of an
/// in-place list operation
enum Applied {
    Rebind(Value),
    InPlace(Value),
}

/// The interpreter state
pub struct Interpreter {
    globals: ScopeRef,
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    base_path: PathBuf,
    /// Canonical paths of the source units currently being evaluated
    includes: Vec<PathBuf>,
    depth: usize,
}

impl Interpreter {
    /// Create an interpreter reading stdin and writing stdout
    pub fn new() -> Self {
        Self::with_io(BufReader::new(io::stdin()), io::stdout())
    }

    /// Create an interpreter over the given input and output
    pub fn with_io(input: impl BufRead + 'static, output: impl Write + 'static) -> Self {
        Self {
            globals: Scope::root(),
            input: Box::new(input),
            output: Box::new(output),
            base_path: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            includes: Vec::new(),
            depth: 0,
        }
    }

    /// Directory relative includes resolve against when the including
    /// unit is not a file on disk
    pub fn with_base_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_path = dir.into();
        self
    }

    pub fn globals(&self) -> &ScopeRef {
        &self.globals
    }

    /// Discard every user binding
    pub fn reset(&mut self) {
        self.globals = Scope::root();
    }

    /// Lex, parse and evaluate one source unit against the root scope.
    /// Returns the value of its last statement.
    pub fn run(&mut self, filename: &str, source: &str) -> Result<Value> {
        let tokens = Lexer::new(filename, source).tokenize()?;
        let program = Parser::new(tokens).parse()?;

        let ctx = Context::root(self.globals.clone());
        self.depth = 0;
        self.includes.clear();
        if let Ok(path) = Path::new(filename).canonicalize() {
            self.includes.push(path);
        }

        let result = self.evaluate(&program, &ctx);
        let flushed = self.output.flush();

        match result {
            Ok(value) => match flushed {
                Ok(()) => Ok(value),
                Err(err) => Err(ctx.failure(ErrorKind::Io(err.to_string()), program.span().clone())),
            },
            Err(Unwind::Error(err)) => Err(err),
            Err(Unwind::Return(_, span)) => Err(ctx.failure(ErrorKind::ReturnOutsideFunction, span)),
            Err(Unwind::Break(span)) => Err(ctx.failure(ErrorKind::BreakOutsideLoop, span)),
            Err(Unwind::Advance(span)) => Err(ctx.failure(ErrorKind::AdvanceOutsideLoop, span)),
        }
    }

    fn evaluate(&mut self, node: &Node, ctx: &Rc<Context>) -> Flow<Value> {
        match node {
            Node::IntegerLiteral { value, .. } => Ok(Value::Integer(*value)),
            Node::DoubleLiteral { value, .. } => Ok(Value::Double(*value)),
            Node::StringLiteral { value, .. } => Ok(Value::String(value.clone())),

            Node::ListLiteral { elements, .. } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.evaluate(element, ctx)?);
                }
                Ok(Value::list(items))
            }

            Node::BinaryOp { left, op, right, span } => self.binary(left, *op, right, span, ctx),

            Node::UnaryOp { op, operand, span } => {
                let value = self.evaluate(operand, ctx)?;
                value.unary(*op).map_err(|kind| ctx.error(kind, span.clone()))
            }

            Node::VarAccess { name, span } => {
                let value = ctx.scope.borrow().get(name);
                value.ok_or_else(|| ctx.error(ErrorKind::UndefinedVariable(name.clone()), span.clone()))
            }

            Node::VarDeclare { name, type_name, value, is_const, span } => {
                self.declare(name, *type_name, value, *is_const, span, ctx)
            }

            Node::VarReassign { name, op, value, span } => self.reassign(name, *op, value, span, ctx),

            Node::If { cases, else_case, .. } => self.if_expr(cases, else_case.as_ref(), ctx),

            Node::For { var, compare, bound, step_op, step, body, span } => {
                self.for_loop(var, *compare, bound, *step_op, step, body, span, ctx)
            }

            Node::While { condition, body, .. } => self.while_loop(condition, body, ctx),

            Node::FuncDef { name, params, body, span } => self.func_def(name.as_ref(), params, body, span, ctx),

            Node::Call { callee, args, span } => self.call(callee, args, span, ctx),

            Node::Return { value, span } => {
                let value = match value {
                    Some(node) => self.evaluate(node, ctx)?,
                    None => Value::null(),
                };
                Err(Unwind::Return(value, span.clone()))
            }

            Node::Break { span } => Err(Unwind::Break(span.clone())),
            Node::Advance { span } => Err(Unwind::Advance(span.clone())),

            Node::Include { path, span } => self.include(path, span, ctx),

            Node::Block { statements, .. } => {
                let mut last = Value::null();
                for statement in statements {
                    last = self.evaluate(statement, ctx)?;
                }
                Ok(last)
            }
        }
    }

    fn body(&mut self, body: &Body, ctx: &Rc<Context>) -> Flow<Value> {
        let value = self.evaluate(&body.node, ctx)?;
        Ok(match body.form {
            BodyForm::Inline => value,
            BodyForm::Block => Value::null(),
        })
    }

    // ==================== Operators ====================

    fn binary(&mut self, left: &Node, op: BinaryOp, right: &Node, span: &Span, ctx: &Rc<Context>) -> Flow<Value> {
        let lhs = self.evaluate(left, ctx)?;
        let rhs = self.evaluate(right, ctx)?;

        lhs.binary(op, &rhs).map_err(|kind| {
            let at = match kind {
                ErrorKind::DivisionByZero | ErrorKind::IndexOutOfRange(_) => right.span(),
                _ => span,
            };
            ctx.error(kind, at.clone())
        })
    }

    // ==================== Variables ====================

    fn declare(
        &mut self,
        name: &str,
        type_name: TypeName,
        value: &Node,
        is_const: bool,
        span: &Span,
        ctx: &Rc<Context>,
    ) -> Flow<Value> {
        let result = self.evaluate(value, ctx)?;

        if !result.matches_type(type_name) {
            return Err(ctx.error(
                ErrorKind::TypeMismatch {
                    found: result.kind_name(),
                    expected: type_name.kind_name(),
                },
                value.span().clone(),
            ));
        }

        let redeclares_const = ctx.scope.borrow().is_local_const(name);
        if redeclares_const {
            return Err(ctx.error(ErrorKind::ConstReassignment(name.to_string()), span.clone()));
        }

        ctx.scope
            .borrow_mut()
            .define(name, Binding::typed(type_name, result.clone(), is_const));
        Ok(result)
    }

    fn reassign(&mut self, name: &str, op: AssignOp, value: &Node, span: &Span, ctx: &Rc<Context>) -> Flow<Value> {
        let rhs = self.evaluate(value, ctx)?;

        let binding = ctx.scope.borrow().lookup(name);
        let Some(binding) = binding else {
            return Err(ctx.error(ErrorKind::UndefinedVariable(name.to_string()), span.clone()));
        };
        if binding.is_const {
            return Err(ctx.error(ErrorKind::ConstReassignment(name.to_string()), span.clone()));
        }

        let applied = match op {
            AssignOp::Set => match binding.type_name {
                Some(type_name) if !rhs.matches_type(type_name) => {
                    return Err(ctx.error(
                        ErrorKind::TypeMismatch {
                            found: rhs.kind_name(),
                            expected: type_name.kind_name(),
                        },
                        value.span().clone(),
                    ));
                }
                _ => Applied::Rebind(rhs),
            },
            AssignOp::Compound(op) => apply_update(&binding, op, &rhs).map_err(|kind| {
                let at = match kind {
                    ErrorKind::DivisionByZero | ErrorKind::IndexOutOfRange(_) | ErrorKind::TypeMismatch { .. } => {
                        value.span()
                    }
                    _ => span,
                };
                ctx.error(kind, at.clone())
            })?,
        };

        match applied {
            Applied::Rebind(updated) => {
                ctx.scope.borrow_mut().set(name, updated.clone());
                Ok(updated)
            }
            Applied::InPlace(result) => Ok(result),
        }
    }

    // ==================== Control flow ====================

    fn if_expr(&mut self, cases: &[IfCase], else_case: Option<&Body>, ctx: &Rc<Context>) -> Flow<Value> {
        for case in cases {
            let condition = self.evaluate(&case.condition, ctx)?;
            if condition.is_truthy() {
                return self.body(&case.body, ctx);
            }
        }

        match else_case {
            Some(body) => self.body(body, ctx),
            None => Ok(Value::null()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn for_loop(
        &mut self,
        var: &str,
        compare: CompareOp,
        bound: &Node,
        step_op: ArithOp,
        step: &Node,
        body: &Body,
        span: &Span,
        ctx: &Rc<Context>,
    ) -> Flow<Value> {
        let binding = ctx.scope.borrow().lookup(var);
        let mut current = match binding {
            Some(Binding { value: Value::Integer(start), .. }) => start,
            _ => return Err(ctx.error(ErrorKind::InvalidLoopVariable(var.to_string()), span.clone())),
        };

        let limit = match self.evaluate(bound, ctx)? {
            limit @ (Value::Integer(_) | Value::Double(_)) => limit,
            _ => return Err(ctx.error(ErrorKind::InvalidLoopOperand("bound must be a number"), bound.span().clone())),
        };
        let amount = match self.evaluate(step, ctx)? {
            Value::Integer(amount) => amount,
            _ => return Err(ctx.error(ErrorKind::InvalidLoopOperand("step must be an Integer"), step.span().clone())),
        };

        let mut results = Vec::new();
        while loop_continues(compare, current, &limit) {
            self.assign_loop_var(var, current, span, ctx)?;

            match self.evaluate(&body.node, ctx) {
                Ok(value) => {
                    if body.form == BodyForm::Inline {
                        results.push(value);
                    }
                }
                Err(Unwind::Break(_)) => break,
                Err(Unwind::Advance(_)) => {}
                Err(other) => return Err(other),
            }

            current = step_integer(current, step_op, amount).map_err(|kind| ctx.error(kind, step.span().clone()))?;
        }

        Ok(loop_result(body, results))
    }

    fn assign_loop_var(&mut self, var: &str, value: i64, span: &Span, ctx: &Rc<Context>) -> Flow<()> {
        let is_const = ctx.scope.borrow().lookup(var).is_some_and(|binding| binding.is_const);
        if is_const {
            return Err(ctx.error(ErrorKind::ConstReassignment(var.to_string()), span.clone()));
        }
        ctx.scope.borrow_mut().set(var, Value::Integer(value));
        Ok(())
    }

    fn while_loop(&mut self, condition: &Node, body: &Body, ctx: &Rc<Context>) -> Flow<Value> {
        let mut results = Vec::new();

        loop {
            if !self.evaluate(condition, ctx)?.is_truthy() {
                break;
            }

            match self.evaluate(&body.node, ctx) {
                Ok(value) => {
                    if body.form == BodyForm::Inline {
                        results.push(value);
                    }
                }
                Err(Unwind::Break(_)) => break,
                Err(Unwind::Advance(_)) => {}
                Err(other) => return Err(other),
            }
        }

        Ok(loop_result(body, results))
    }

    // ==================== Functions ====================

    fn func_def(
        &mut self,
        name: Option<&String>,
        params: &[String],
        body: &Rc<Body>,
        span: &Span,
        ctx: &Rc<Context>,
    ) -> Flow<Value> {
        let function = Function::new(name.cloned(), params.to_vec(), body.clone(), ctx.scope.clone());
        let value = Value::Function(Rc::new(function));

        if let Some(name) = name {
            let redeclares_const = ctx.scope.borrow().is_local_const(name);
            if redeclares_const {
                return Err(ctx.error(ErrorKind::ConstReassignment(name.clone()), span.clone()));
            }
            ctx.scope
                .borrow_mut()
                .define(name.as_str(), Binding::typed(TypeName::Func, value.clone(), false));
        }

        Ok(value)
    }

    fn call(&mut self, callee: &Node, args: &[Node], span: &Span, ctx: &Rc<Context>) -> Flow<Value> {
        let target = self.evaluate(callee, ctx)?;

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate(arg, ctx)?);
        }

        match target {
            Value::Function(function) => self.call_function(&function, values, span, ctx),
            Value::BuiltinFunction(builtin) => self.call_builtin(builtin, values, span, ctx),
            other => Err(ctx.error(ErrorKind::NotCallable(other.to_string()), callee.span().clone())),
        }
    }

    fn call_function(&mut self, function: &Function, args: Vec<Value>, span: &Span, ctx: &Rc<Context>) -> Flow<Value> {
        let name = function.display_name();
        check_arity(name, function.params.len(), args.len()).map_err(|kind| ctx.error(kind, span.clone()))?;

        if self.depth >= MAX_CALL_DEPTH {
            return Err(ctx.error(ErrorKind::RecursionLimit, span.clone()));
        }

        let Some(closure) = function.closure.scope() else {
            return Err(ctx.error(ErrorKind::NotCallable(name.to_string()), span.clone()));
        };
        let scope = Scope::child(&closure);
        for (param, value) in function.params.iter().zip(args) {
            scope.borrow_mut().define(param.as_str(), Binding::untyped(value));
        }
        let call_ctx = Context::call(name, ctx, span, scope);

        tracing::trace!(function = name, depth = self.depth, "call");
        self.depth += 1;
        let result = self.evaluate(&function.body.node, &call_ctx);
        self.depth -= 1;

        match result {
            Ok(value) => Ok(match function.body.form {
                BodyForm::Inline => value,
                BodyForm::Block => Value::null(),
            }),
            Err(Unwind::Return(value, _)) => Ok(value),
            Err(Unwind::Break(span)) => Err(call_ctx.error(ErrorKind::BreakOutsideLoop, span)),
            Err(Unwind::Advance(span)) => Err(call_ctx.error(ErrorKind::AdvanceOutsideLoop, span)),
            Err(err) => Err(err),
        }
    }

    fn call_builtin(&mut self, builtin: Builtin, args: Vec<Value>, span: &Span, ctx: &Rc<Context>) -> Flow<Value> {
        let params = builtin.params();
        check_arity(builtin.name(), params.len(), args.len()).map_err(|kind| ctx.error(kind, span.clone()))?;

        let scope = Scope::child(&ctx.scope);
        for (param, value) in params.iter().zip(args) {
            scope.borrow_mut().define(*param, Binding::untyped(value));
        }
        let call_ctx = Context::call(builtin.name(), ctx, span, scope);
        let fail = |kind: ErrorKind| call_ctx.error(kind, span.clone());

        match builtin {
            Builtin::Out => {
                let value = argument(&call_ctx, span)?;
                writeln!(self.output, "{}", value).map_err(|err| fail(ErrorKind::Io(err.to_string())))?;
                Ok(Value::null())
            }
            Builtin::Input => {
                self.output.flush().map_err(|err| fail(ErrorKind::Io(err.to_string())))?;
                let mut line = String::new();
                self.input
                    .read_line(&mut line)
                    .map_err(|err| fail(ErrorKind::Io(err.to_string())))?;
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                Ok(Value::String(line))
            }
            Builtin::Integer => match argument(&call_ctx, span)? {
                Value::Integer(n) => Ok(Value::Integer(n)),
                Value::Double(n) if n.is_finite() && n.abs() < i64::MAX as f64 => Ok(Value::Integer(n.trunc() as i64)),
                Value::Double(n) => Err(fail(ErrorKind::InvalidConversion(format!("{:?}", n)))),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Integer)
                    .map_err(|_| fail(ErrorKind::InvalidConversion(s.clone()))),
                _ => Err(fail(ErrorKind::IllegalOperation)),
            },
            Builtin::TypeOf => {
                let value = argument(&call_ctx, span)?;
                Ok(Value::String(value.type_name().keyword().to_string()))
            }
            Builtin::Len => {
                let count = match argument(&call_ctx, span)? {
                    Value::String(s) => s.chars().count(),
                    Value::List(items) => items.borrow().len(),
                    number @ (Value::Integer(_) | Value::Double(_)) => number.to_string().chars().count(),
                    _ => return Err(fail(ErrorKind::IllegalOperation)),
                };
                i64::try_from(count)
                    .map(Value::Integer)
                    .map_err(|_| fail(ErrorKind::IntegerOverflow))
            }
        }
    }

    // ==================== Include ====================

    fn include(&mut self, path: &str, span: &Span, ctx: &Rc<Context>) -> Flow<Value> {
        let resolved = self.resolve_include(path, span);
        let canonical = resolved.canonicalize().unwrap_or_else(|_| resolved.clone());
        if self.includes.contains(&canonical) {
            return Err(ctx.error(ErrorKind::CircularInclude(path.to_string()), span.clone()));
        }

        let source = fs::read_to_string(&resolved).map_err(|err| {
            ctx.error(
                ErrorKind::IncludeFailed {
                    path: path.to_string(),
                    reason: err.to_string(),
                },
                span.clone(),
            )
        })?;
        tracing::debug!(path = %resolved.display(), "including source unit");

        let filename = resolved.display().to_string();
        let tokens = Lexer::new(&filename, &source).tokenize()?;
        let program = Parser::new(tokens).parse()?;

        self.includes.push(canonical);
        let result = self.evaluate(&program, ctx);
        self.includes.pop();
        result
    }

    /// Relative paths resolve against the including file's directory when
    /// that file exists, otherwise against the base path
    fn resolve_include(&self, path: &str, span: &Span) -> PathBuf {
        let requested = Path::new(path);
        if requested.is_absolute() {
            return requested.to_path_buf();
        }

        let including = Path::new(span.start.filename());
        match including.parent() {
            Some(dir) if including.is_file() => dir.join(requested),
            _ => self.base_path.join(requested),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// The sole argument of a one-parameter built-in
fn argument(ctx: &Context, span: &Span) -> Flow<Value> {
    let value = ctx.scope.borrow().get("value");
    value.ok_or_else(|| ctx.error(ErrorKind::UndefinedVariable("value".to_string()), span.clone()))
}

fn check_arity(name: &str, expected: usize, given: usize) -> std::result::Result<(), ErrorKind> {
    if given > expected {
        Err(ErrorKind::TooManyArgs {
            count: given - expected,
            name: name.to_string(),
        })
    } else if given < expected {
        Err(ErrorKind::TooFewArgs {
            count: expected - given,
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

fn loop_result(body: &Body, results: Vec<Value>) -> Value {
    match body.form {
        BodyForm::Inline => Value::list(results),
        BodyForm::Block => Value::null(),
    }
}

/// Test the counter against an Integer or Double bound
fn loop_continues(compare: CompareOp, current: i64, limit: &Value) -> bool {
    match limit {
        Value::Integer(limit) => compare.holds(current, *limit),
        Value::Double(limit) => compare.holds(current as f64, *limit),
        _ => false,
    }
}

fn step_integer(current: i64, op: ArithOp, amount: i64) -> std::result::Result<i64, ErrorKind> {
    let next = match op {
        ArithOp::Add => current.checked_add(amount),
        ArithOp::Sub => current.checked_sub(amount),
        ArithOp::Mul => current.checked_mul(amount),
        ArithOp::Div if amount == 0 => return Err(ErrorKind::DivisionByZero),
        ArithOp::Div => current.checked_div(amount),
    };
    next.ok_or(ErrorKind::IntegerOverflow)
}

/// Apply a compound assignment to a binding's current value
fn apply_update(binding: &Binding, op: ArithOp, rhs: &Value) -> std::result::Result<Applied, ErrorKind> {
    let current = &binding.value;
    let kind = binding.type_name.unwrap_or_else(|| current.type_name());
    let update = update_rule(kind, op).ok_or(ErrorKind::IllegalOperation)?;

    match (update, current, rhs) {
        (Update::Arithmetic, _, _) => {
            let result = current.binary(op.as_binary(), rhs)?;
            let result = match (binding.type_name, result) {
                (Some(TypeName::Int), Value::Double(n)) if n.is_finite() => Value::Integer(n.trunc() as i64),
                (Some(TypeName::Double), Value::Integer(n)) => Value::Double(n as f64),
                (_, result) => result,
            };
            match binding.type_name {
                Some(type_name) if !result.matches_type(type_name) => Err(ErrorKind::TypeMismatch {
                    found: result.kind_name(),
                    expected: type_name.kind_name(),
                }),
                _ => Ok(Applied::Rebind(result)),
            }
        }
        (Update::Concat | Update::Repeat, _, _) => Ok(Applied::Rebind(current.binary(op.as_binary(), rhs)?)),
        (Update::Append, Value::List(items), _) => {
            let item = rhs.clone();
            items.borrow_mut().push(item);
            Ok(Applied::InPlace(current.clone()))
        }
        (Update::RemoveAt, Value::List(items), Value::Integer(index)) => {
            let mut items_mut = items.borrow_mut();
            let at = resolve_index(items_mut.len(), *index)?;
            items_mut.remove(at);
            Ok(Applied::InPlace(current.clone()))
        }
        (Update::Extend, Value::List(items), Value::List(extra)) => {
            let extra: Vec<Value> = extra.borrow().clone();
            items.borrow_mut().extend(extra);
            Ok(Applied::InPlace(current.clone()))
        }
        (Update::Select, Value::List(items), Value::Integer(index)) => {
            let items = items.borrow();
            let at = resolve_index(items.len(), *index)?;
            Ok(Applied::InPlace(items[at].clone()))
        }
        _ => Err(ErrorKind::IllegalOperation),
    }
}
