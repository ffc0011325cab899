// ABOUTME: Runtime value types for the evaluator

use crate::ast::FunctionDef;
use crate::env::Environment;
use crate::error::VibeError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A user-defined function (or method) value: its definition plus the
/// environment it closes over. `owner` is filled in after the fact for
/// methods (set once, by `eval::eval_class_def`) so `super` dispatch knows
/// which class in the chain to resume searching from.
pub struct Function {
    pub def: Rc<FunctionDef>,
    pub closure: Rc<Environment>,
    pub owner: RefCell<Option<Rc<Class>>>,
}

impl Function {
    pub fn name(&self) -> &str {
        &self.def.name
    }
}

/// `owner` points back at the `Class` this method belongs to, which in
/// turn owns this very `Function` through its method table — a genuine
/// `Rc` cycle. A derived `Debug` would walk `owner` into the `Class`, back
/// into its `methods` map, and recurse forever, so this prints only the
/// name.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("owner", &self.owner.borrow().as_ref().map(|c| &c.name))
            .finish()
    }
}

/// A class: its own method table plus an optional parent for inherited
/// lookup and `super` dispatch.
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub parent: Option<Rc<Class>>,
    pub methods: HashMap<String, Rc<Function>>,
    pub ivars: Vec<String>,
}

impl Class {
    /// Walks `self` then the parent chain looking for a method.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        if let Some(m) = self.methods.get(name) {
            return Some(m.clone());
        }
        self.parent.as_ref().and_then(|p| p.find_method(name))
    }
}

#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    pub fields: RefCell<HashMap<String, Value>>,
}

/// The closed value set (spec.md §3.3). Arrays and instances are
/// heap-shared via `Rc<RefCell<_>>` so aliased variables observe each
/// other's mutations; `Return` is a non-local-control sentinel, never
/// user-visible outside `eval::call_function`.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Str(String),
    Boolean(bool),
    Nil,
    Array(Rc<RefCell<Vec<Value>>>),
    Function(Rc<Function>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    BoundMethod(Rc<Instance>, Rc<Function>),
    Error(Rc<VibeError>),
    Return(Box<Value>),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// Truthiness: only `false` and `Nil` are falsy (spec.md §4.5).
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Nil)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn type_name(&self) -> String {
        crate::types::Type::of_value(self).to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Array(a), Value::Array(b)) => *a.borrow() == *b.borrow(),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Nil => write!(f, "nil"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::Class(class) => write!(f, "<class {}>", class.name),
            Value::Instance(inst) => write!(f, "<instance of {}>", inst.class.name),
            Value::BoundMethod(inst, func) => {
                write!(f, "<bound method {}.{}>", inst.class.name, func.name())
            }
            Value::Error(err) => write!(f, "<error: {}>", err),
            Value::Return(inner) => write!(f, "{}", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsy_values_are_only_false_and_nil() {
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Nil.is_truthy());
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::Str(String::new()).is_truthy());
    }

    #[test]
    fn integer_and_float_equal_by_value() {
        assert_eq!(Value::Integer(2), Value::Float(2.0));
    }

    #[test]
    fn whole_floats_print_with_trailing_decimal() {
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(3.5).to_string(), "3.5");
    }

    #[test]
    fn arrays_share_mutations_across_clones() {
        let arr = Value::array(vec![Value::Integer(1)]);
        let alias = arr.clone();
        if let Value::Array(items) = &arr {
            items.borrow_mut().push(Value::Integer(2));
        }
        if let Value::Array(items) = &alias {
            assert_eq!(items.borrow().len(), 2);
        } else {
            panic!("expected array");
        }
    }
}
