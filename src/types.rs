// ABOUTME: Structural type representation and assignability checks
//
// Types are names, not inferred structure: `Int`, `Float`, `String`, `Bool`,
// `Nil`, `Any`, `function`, a user class name, or `Array<T>`. Checking
// happens inline at evaluation time against each value's runtime type
// (spec.md §4.4) — there is no separate static pass.

use crate::value::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float,
    Str,
    Bool,
    Nil,
    Any,
    Function,
    Array(Box<Type>),
    Named(String),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Float => write!(f, "Float"),
            Type::Str => write!(f, "String"),
            Type::Bool => write!(f, "Bool"),
            Type::Nil => write!(f, "Nil"),
            Type::Any => write!(f, "Any"),
            Type::Function => write!(f, "function"),
            Type::Array(elem) => write!(f, "Array<{}>", elem),
            Type::Named(name) => write!(f, "{}", name),
        }
    }
}

impl Type {
    /// Builtin type names are matched case-insensitively: spec.md §8's own
    /// concrete scenarios write `int` and `function` lowercase while §4.4's
    /// canonical list otherwise capitalizes (`Int`, `Float`, ...) — both
    /// spellings must resolve to the same builtin `Type`. A name that isn't
    /// one of the builtins is a user class name, kept verbatim (class names
    /// are case-sensitive identifiers, not a fixed keyword set).
    pub fn from_name(name: &str, generics: &[Type]) -> Type {
        match name.to_ascii_lowercase().as_str() {
            "int" => Type::Int,
            "float" => Type::Float,
            "string" => Type::Str,
            "bool" => Type::Bool,
            "nil" => Type::Nil,
            "any" => Type::Any,
            "function" => Type::Function,
            "array" => Type::Array(Box::new(generics.first().cloned().unwrap_or(Type::Any))),
            _ => Type::Named(name.to_string()),
        }
    }

    /// The runtime type of a value. Arrays report the element type of
    /// their first element, widening to `Any` when empty or mixed.
    pub fn of_value(value: &Value) -> Type {
        match value {
            Value::Integer(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Str(_) => Type::Str,
            Value::Boolean(_) => Type::Bool,
            Value::Nil => Type::Nil,
            Value::Array(items) => {
                let items = items.borrow();
                let mut elem = None;
                for item in items.iter() {
                    let t = Type::of_value(item);
                    match &elem {
                        None => elem = Some(t),
                        Some(prev) if *prev == t => {}
                        Some(_) => {
                            elem = Some(Type::Any);
                            break;
                        }
                    }
                }
                Type::Array(Box::new(elem.unwrap_or(Type::Any)))
            }
            Value::Function(_) => Type::Function,
            Value::Class(class) => Type::Named(class.name.clone()),
            Value::Instance(instance) => Type::Named(instance.class.name.clone()),
            Value::BoundMethod(instance, _) => Type::Named(instance.class.name.clone()),
            Value::Error(_) => Type::Named("Error".to_string()),
            Value::Return(inner) => Type::of_value(inner),
        }
    }

    /// Is a value of `self` assignable where `target` is expected?
    ///
    /// `Int` widens to `Float`, everything widens to `Any`, and
    /// `Array<T>` is covariant in `T` under this same relation.
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        if target == &Type::Any {
            return true;
        }
        if self == target {
            return true;
        }
        match (self, target) {
            (Type::Int, Type::Float) => true,
            (Type::Array(a), Type::Array(b)) => a.is_assignable_to(b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_widens_to_float() {
        assert!(Type::Int.is_assignable_to(&Type::Float));
        assert!(!Type::Float.is_assignable_to(&Type::Int));
    }

    #[test]
    fn everything_is_assignable_to_any() {
        assert!(Type::Int.is_assignable_to(&Type::Any));
        assert!(Type::Named("Dog".to_string()).is_assignable_to(&Type::Any));
    }

    #[test]
    fn array_is_covariant() {
        let int_array = Type::Array(Box::new(Type::Int));
        let float_array = Type::Array(Box::new(Type::Float));
        assert!(int_array.is_assignable_to(&float_array));
        assert!(!float_array.is_assignable_to(&int_array));
    }

    #[test]
    fn unrelated_named_types_are_not_assignable() {
        let dog = Type::Named("Dog".to_string());
        let cat = Type::Named("Cat".to_string());
        assert!(!dog.is_assignable_to(&cat));
    }

    #[test]
    fn builtin_names_match_case_insensitively() {
        // spec.md §8 scenarios 3 and 5 write `int` and `function` lowercase.
        assert_eq!(Type::from_name("int", &[]), Type::Int);
        assert_eq!(Type::from_name("Int", &[]), Type::Int);
        assert_eq!(Type::from_name("function", &[]), Type::Function);
        assert_eq!(Type::from_name("Function", &[]), Type::Function);
    }

    #[test]
    fn user_class_names_keep_their_original_case() {
        assert_eq!(Type::from_name("Dog", &[]), Type::Named("Dog".to_string()));
    }

    #[test]
    fn function_value_type_matches_lowercase_function_annotation() {
        assert_eq!(Type::from_name("function", &[]), Type::Function);
        assert!(Type::Function.is_assignable_to(&Type::Function));
    }
}
