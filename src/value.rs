use std::fmt;
use std::rc::Rc;

use crate::callable::{Callable, NativeFunction};
use crate::class::{InstanceRef, LoxClass};
use crate::function::LoxFunction;

/// A runtime value.
///
/// Reference kinds (functions, classes, instances) are shared handles:
/// cloning a `Value` never copies the underlying object.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Function(Rc<LoxFunction>),
    Native(Rc<NativeFunction>),
    Class(Rc<LoxClass>),
    Instance(InstanceRef),
}

impl Value {
    pub fn string<S: AsRef<str>>(s: S) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// The callable capability of this value, if it has one.
    pub fn as_callable(&self) -> Option<&dyn Callable> {
        match self {
            Value::Function(function) => Some(function.as_ref()),
            Value::Native(native) => Some(native.as_ref()),
            Value::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Short kind name used in diagnostics and logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) | Value::Native(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
        }
    }
}

/// Equality without coercion: primitives compare by value, objects by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Canonical decimal text: integral values print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 && n.is_sign_negative() {
        "-0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        buf.format(n as i64).to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => f.write_str(&format_number(*n)),

            Value::String(s) => write!(f, "{}", s),

            Value::Function(function) => write!(f, "<fn {}>", function.name()),

            Value::Native(native) => write!(f, "<native fn {}>", native.name()),

            Value::Class(class) => write!(f, "{}", class.name()),

            Value::Instance(instance) => write!(f, "{} instance", instance.borrow().class().name()),
        }
    }
}

#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn integral_numbers_print_without_fraction() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-12.0).to_string(), "-12");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-0.0).to_string(), "-0");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
    }

    #[test]
    fn equality_never_coerces() {
        assert_eq!(Value::Number(1.0), Value::Number(1.0));
        assert_ne!(Value::Number(1.0), Value::string("1"));
        assert_ne!(Value::Bool(false), Value::Nil);
        assert_eq!(Value::Nil, Value::Nil);
        assert_eq!(Value::string("ab"), Value::string("ab"));
    }

    #[test]
    fn only_callables_expose_the_capability() {
        assert!(Value::Number(1.0).as_callable().is_none());
        assert!(Value::string("f").as_callable().is_none());
    }
}
