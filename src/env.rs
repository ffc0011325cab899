// ABOUTME: Environment module for managing variable bindings and scopes

use crate::types::Type;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    /// Declared annotation for names bound via a typed `var-decl`, checked
    /// again on every later plain assignment to that name (spec.md §4.4).
    types: RefCell<HashMap<String, Type>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            types: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            types: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines a binding in THIS scope (doesn't walk the parent chain).
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Defines a binding together with its declared type annotation.
    pub fn define_typed(&self, name: String, value: Value, ty: Type) {
        self.types.borrow_mut().insert(name.clone(), ty);
        self.bindings.borrow_mut().insert(name, value);
    }

    /// The declared type for `name`, if it (or an enclosing scope's
    /// binding of the same name) was introduced with an annotation.
    pub fn declared_type(&self, name: &str) -> Option<Type> {
        if self.bindings.borrow().contains_key(name) {
            return self.types.borrow().get(name).cloned();
        }
        self.parent.as_ref().and_then(|p| p.declared_type(name))
    }

    /// Looks up a name in this scope and parent scopes recursively.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Writes into the nearest enclosing scope that already defines `name`;
    /// if none does, defines it in the current scope. This is the
    /// assignment rule from spec.md §3.4/§4.5 — distinct from `set`, which
    /// only reports success when an existing binding was found.
    pub fn assign(&self, name: &str, value: Value) {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return;
        }
        if let Some(ref parent) = self.parent {
            if parent.has(name) {
                parent.assign(name, value);
                return;
            }
        }
        self.bindings.borrow_mut().insert(name.to_string(), value);
    }

    /// True if `name` is bound in this scope or any ancestor.
    pub fn has(&self, name: &str) -> bool {
        if self.bindings.borrow().contains_key(name) {
            return true;
        }
        self.parent.as_ref().is_some_and(|p| p.has(name))
    }

    /// The outermost ancestor in this chain — the target environment for
    /// top-level `require` evaluation (spec.md §4.5).
    pub fn root(self: &Rc<Self>) -> Rc<Self> {
        match &self.parent {
            Some(parent) => parent.root(),
            None => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("x".to_string(), Value::Integer(42));
        assert_eq!(env.get("x"), Some(Value::Integer(42)));
    }

    #[test]
    fn undefined_name_is_none() {
        let env = Environment::new();
        assert!(env.get("undefined").is_none());
    }

    #[test]
    fn shadowing_in_child_does_not_affect_parent() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Integer(1));

        let child = Environment::with_parent(parent.clone());
        child.define("x".to_string(), Value::Integer(2));

        assert_eq!(child.get("x"), Some(Value::Integer(2)));
        assert_eq!(parent.get("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn assign_writes_into_enclosing_scope() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Integer(1));

        let child = Environment::with_parent(parent.clone());
        child.assign("x", Value::Integer(99));

        assert_eq!(parent.get("x"), Some(Value::Integer(99)));
        assert!(!child.has_own("x"));
    }

    #[test]
    fn assign_with_no_existing_binding_defines_locally() {
        let parent = Environment::new();
        let child = Environment::with_parent(parent.clone());
        child.assign("y", Value::Integer(7));

        assert_eq!(child.get("y"), Some(Value::Integer(7)));
        assert!(parent.get("y").is_none());
    }

    impl Environment {
        fn has_own(&self, name: &str) -> bool {
            self.bindings.borrow().contains_key(name)
        }
    }
}
