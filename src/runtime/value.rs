use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::FunctionExpression;
use crate::interpreter::Evaluator;
use crate::interpreter::env::Env;
use crate::runtime::table::HashTable;

/// Native function implementation: `(evaluator, this, args) -> value`.
pub type NativeFn = Rc<dyn Fn(&mut Evaluator, Value, &[Value]) -> Result<Value, Exception>>;

/// A callable: either a user closure or a native hook.
#[derive(Clone)]
pub enum Function {
    User {
        declaration: Rc<FunctionExpression>,
        closure: Env,
    },
    Native {
        name: String,
        /// Exact argument count; negative disables the check.
        arity: i32,
        call: NativeFn,
    },
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User { declaration, .. } => f
                .debug_struct("Function::User")
                .field("parameters", &declaration.parameters)
                .finish_non_exhaustive(),
            Self::Native { name, arity, .. } => f
                .debug_struct("Function::Native")
                .field("name", name)
                .field("arity", arity)
                .finish_non_exhaustive(),
        }
    }
}

/// A function bound to a receiver. Constructor methods yield their receiver
/// from calls regardless of what the body returns.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub function: Rc<Function>,
    pub receiver: Value,
    pub is_constructor: bool,
}

/// Six named member maps plus default field values, produced by evaluating a
/// class literal. Member closures capture the environment the literal was
/// evaluated in.
#[derive(Debug, Clone, Default)]
pub struct Class {
    pub fields: HashMap<String, Value>,
    pub constructors: HashMap<String, Rc<Function>>,
    pub public: HashMap<String, Rc<Function>>,
    pub private: HashMap<String, Rc<Function>>,
    pub getters: HashMap<String, Rc<Function>>,
    pub setters: HashMap<String, Rc<Function>>,
}

/// Per-instance field map, seeded from the class defaults at construction.
/// The key set is fixed after that point.
#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    pub fields: RefCell<HashMap<String, Value>>,
}

/// A runtime exception: message plus a snapshot of the call stack taken at
/// throw time. Exceptions are ordinary values once caught.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Exception {
    pub message: String,
    pub trace: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Function(Rc<Function>),
    Method(Rc<Method>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    Array(Rc<RefCell<Vec<Value>>>),
    Table(Rc<RefCell<HashTable>>),
    Exception(Rc<Exception>),
}

impl Value {
    pub fn string(text: impl AsRef<str>) -> Self {
        Self::String(Rc::from(text.as_ref()))
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Self::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn table(table: HashTable) -> Self {
        Self::Table(Rc::new(RefCell::new(table)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Function(_) => "function",
            Self::Method(_) => "method",
            Self::Class(_) => "class",
            Self::Instance(_) => "instance",
            Self::Array(_) => "array",
            Self::Table(_) => "table",
            Self::Exception(_) => "exception",
        }
    }

    /// Only `null` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Boolean(value) => *value,
            _ => true,
        }
    }

    /// `===` semantics: heap values compare by pointer, interned constants
    /// and number scalars by value.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(left), Self::Boolean(right)) => left == right,
            (Self::Number(left), Self::Number(right)) => left == right,
            (Self::String(left), Self::String(right)) => Rc::ptr_eq(left, right),
            (Self::Function(left), Self::Function(right)) => Rc::ptr_eq(left, right),
            (Self::Method(left), Self::Method(right)) => Rc::ptr_eq(left, right),
            (Self::Class(left), Self::Class(right)) => Rc::ptr_eq(left, right),
            (Self::Instance(left), Self::Instance(right)) => Rc::ptr_eq(left, right),
            (Self::Array(left), Self::Array(right)) => Rc::ptr_eq(left, right),
            (Self::Table(left), Self::Table(right)) => Rc::ptr_eq(left, right),
            (Self::Exception(left), Self::Exception(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Rendering used inside containers: like `Display`, but strings keep
    /// their quotes so elements stay distinguishable.
    pub fn repr(&self) -> String {
        match self {
            Self::String(text) => format!("{text:?}"),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(text) => write!(f, "{text}"),
            Self::Function(_) => write!(f, "<function>"),
            Self::Method(method) => write!(f, "<method {}>", method.name),
            Self::Class(_) => write!(f, "<class>"),
            Self::Instance(_) => write!(f, "<instance>"),
            Self::Array(elements) => {
                write!(f, "array{{")?;
                for (index, element) in elements.borrow().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element.repr())?;
                }
                write!(f, "}}")
            }
            Self::Table(table) => write!(f, "{}", table.borrow().render()),
            Self::Exception(exception) => write!(f, "{exception}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_null_and_false_are_falsy() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::string("").is_truthy());
        assert!(Value::array(vec![]).is_truthy());
    }

    #[test]
    fn identity_compares_heap_values_by_pointer() {
        let shared = Value::array(vec![Value::Number(1.0)]);
        let alias = shared.clone();
        let other = Value::array(vec![Value::Number(1.0)]);
        assert!(shared.is_identical(&alias));
        assert!(!shared.is_identical(&other));

        let text = Value::string("hi");
        assert!(text.is_identical(&text.clone()));
        assert!(!text.is_identical(&Value::string("hi")));

        assert!(Value::Null.is_identical(&Value::Null));
        assert!(Value::Number(2.0).is_identical(&Value::Number(2.0)));
        assert!(!Value::Number(2.0).is_identical(&Value::Null));
    }

    #[test]
    fn renders_scalars_and_containers() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
        assert_eq!(Value::string("plain").to_string(), "plain");
        assert_eq!(
            Value::array(vec![Value::Number(1.0), Value::string("x")]).to_string(),
            "array{1, \"x\"}"
        );
    }
}
