//! Variable scopes for Kromium
//!
//! Handles scoped variable storage with declared types and constness.
//! A function stored in the very scope it captured holds that scope weakly,
//! so a named closure does not keep its own defining scope alive.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::token::TypeName;
use crate::value::{Builtin, Value};

/// Shared handle to a scope
pub type ScopeRef = Rc<RefCell<Scope>>;

/// A binding in a scope
#[derive(Debug, Clone)]
pub struct Binding {
    /// `None` for untyped bindings such as function parameters
    pub type_name: Option<TypeName>,
    pub value: Value,
    pub is_const: bool,
}

impl Binding {
    pub fn typed(type_name: TypeName, value: Value, is_const: bool) -> Self {
        Self {
            type_name: Some(type_name),
            value,
            is_const,
        }
    }

    pub fn untyped(value: Value) -> Self {
        Self {
            type_name: None,
            value,
            is_const: false,
        }
    }
}

/// Variable scope with lexical parent
#[derive(Debug, Default)]
pub struct Scope {
    values: HashMap<String, Binding>,
    parent: Option<ScopeRef>,
}

impl Scope {
    /// Create an empty scope with no parent
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a child scope with parent
    pub fn with_parent(parent: ScopeRef) -> Self {
        Self {
            values: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// A fresh shared child of `parent`
    pub fn child(parent: &ScopeRef) -> ScopeRef {
        Rc::new(RefCell::new(Self::with_parent(parent.clone())))
    }

    /// The root scope: null/boolean constants and the built-in functions
    pub fn root() -> ScopeRef {
        let mut scope = Self::new();

        for (name, value) in [("null", 0), ("none", 0), ("false", 0), ("true", 1)] {
            scope.define(name, Binding::typed(TypeName::Int, Value::Integer(value), true));
        }
        for builtin in Builtin::ALL {
            scope.define(builtin.name(), Binding::typed(TypeName::Func, Value::BuiltinFunction(builtin), true));
        }

        Rc::new(RefCell::new(scope))
    }

    /// Define (or overwrite) a binding in this scope
    pub fn define(&mut self, name: impl Into<String>, mut binding: Binding) {
        binding.value = binding.value.detached_from(self);
        self.values.insert(name.into(), binding);
    }

    /// Get a variable's value
    pub fn get(&self, name: &str) -> Option<Value> {
        self.lookup(name).map(|binding| binding.value)
    }

    /// Find a binding by walking the parent chain
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        if let Some(binding) = self.values.get(name) {
            let mut binding = binding.clone();
            binding.value = binding.value.attached();
            Some(binding)
        } else if let Some(parent) = &self.parent {
            parent.borrow().lookup(name)
        } else {
            None
        }
    }

    /// Whether this scope itself holds a constant named `name`
    pub fn is_local_const(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|binding| binding.is_const)
    }

    /// Replace the value of the nearest binding named `name`, keeping its
    /// type and constness. Returns false if no scope defines it.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        if self.values.contains_key(name) {
            let value = value.detached_from(self);
            if let Some(binding) = self.values.get_mut(name) {
                binding.value = value;
            }
            true
        } else if let Some(parent) = &self.parent {
            parent.borrow_mut().set(name, value)
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Body, BodyForm, Node};
    use crate::lexer::Lexer;
    use crate::value::{Captured, Function};

    fn dummy_body() -> Rc<Body> {
        let tokens = Lexer::new("<test>", "0").tokenize().unwrap();
        let span = tokens[0].span.clone();
        Rc::new(Body {
            node: Box::new(Node::IntegerLiteral { value: 0, span }),
            form: BodyForm::Inline,
        })
    }

    #[test]
    fn test_lookup_walks_parents() {
        let root = Scope::root();
        root.borrow_mut().define("x", Binding::typed(TypeName::Int, Value::Integer(1), false));
        let child = Scope::child(&root);
        let grandchild = Scope::child(&child);

        assert_eq!(grandchild.borrow().get("x"), Some(Value::Integer(1)));
        assert_eq!(grandchild.borrow().get("true"), Some(Value::Integer(1)));
        assert_eq!(grandchild.borrow().get("missing"), None);
    }

    #[test]
    fn test_set_updates_defining_scope() {
        let root = Scope::root();
        root.borrow_mut().define("x", Binding::typed(TypeName::Int, Value::Integer(1), false));
        let child = Scope::child(&root);

        assert!(child.borrow_mut().set("x", Value::Integer(2)));
        assert_eq!(root.borrow().get("x"), Some(Value::Integer(2)));
        assert!(!child.borrow_mut().set("y", Value::Integer(2)));
    }

    #[test]
    fn test_child_definitions_shadow() {
        let root = Scope::root();
        let child = Scope::child(&root);
        child.borrow_mut().define("out", Binding::untyped(Value::Integer(5)));

        assert_eq!(child.borrow().get("out"), Some(Value::Integer(5)));
        assert!(root.borrow().is_local_const("out"));
        assert!(!child.borrow().is_local_const("out"));
    }

    #[test]
    fn test_self_captured_function_is_stored_weakly() {
        let scope = Scope::root();
        let function = Function::new(Some("f".to_string()), Vec::new(), dummy_body(), scope.clone());
        scope.borrow_mut().define("f", Binding::typed(TypeName::Func, Value::Function(Rc::new(function)), false));

        // only the test's handle owns the scope
        assert_eq!(Rc::strong_count(&scope), 1);

        match scope.borrow().get("f") {
            Some(Value::Function(f)) => assert!(matches!(f.closure, Captured::Owned(_))),
            other => panic!("expected function, got {:?}", other),
        }

        let weak = Rc::downgrade(&scope);
        drop(scope);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_function_escaping_into_child_keeps_parent_alive() {
        let root = Scope::root();
        let inner = Scope::child(&root);
        let function = Function::new(None, Vec::new(), dummy_body(), inner.clone());

        // stored in a different scope, so the edge stays owning
        root.borrow_mut().define("g", Binding::untyped(Value::Function(Rc::new(function))));
        let weak = Rc::downgrade(&inner);
        drop(inner);
        assert!(weak.upgrade().is_some());
    }
}
