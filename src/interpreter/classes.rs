//! Intrinsic classes: hidden classes whose public methods are reachable by
//! property access on built-in value types.

use std::collections::HashMap;
use std::rc::Rc;

use crate::interpreter::Evaluator;
use crate::runtime::value::{Class, Exception, Function, Value};

pub const CLASS_NUMBER: &str = "Number";
pub const CLASS_STRING: &str = "String";
pub const CLASS_ARRAY: &str = "Array";
pub const CLASS_TABLE: &str = "Table";

pub struct Intrinsics {
    pub number: Rc<Class>,
    pub string: Rc<Class>,
    pub array: Rc<Class>,
    pub table: Rc<Class>,
}

impl Intrinsics {
    pub fn create() -> Self {
        Self {
            number: Rc::new(number_class()),
            string: Rc::new(string_class()),
            array: Rc::new(array_class()),
            table: Rc::new(table_class()),
        }
    }
}

fn native(
    name: &str,
    arity: i32,
    call: impl Fn(&mut Evaluator, Value, &[Value]) -> Result<Value, Exception> + 'static,
) -> (String, Rc<Function>) {
    (
        name.to_string(),
        Rc::new(Function::Native {
            name: name.to_string(),
            arity,
            call: Rc::new(call),
        }),
    )
}

fn methods(entries: Vec<(String, Rc<Function>)>) -> Class {
    Class {
        public: entries.into_iter().collect::<HashMap<_, _>>(),
        ..Class::default()
    }
}

// Property dispatch only binds these methods to receivers of the matching
// type, so the receiver extractors treat a mismatch as an invariant failure.
fn number_receiver(this: &Value) -> f64 {
    match this {
        Value::Number(value) => *value,
        _ => unreachable!("number method bound to non-number receiver"),
    }
}

fn string_receiver(this: &Value) -> Rc<str> {
    match this {
        Value::String(text) => Rc::clone(text),
        _ => unreachable!("string method bound to non-string receiver"),
    }
}

fn array_receiver(this: &Value) -> Rc<std::cell::RefCell<Vec<Value>>> {
    match this {
        Value::Array(elements) => Rc::clone(elements),
        _ => unreachable!("array method bound to non-array receiver"),
    }
}

fn table_receiver(this: &Value) -> Rc<std::cell::RefCell<crate::runtime::table::HashTable>> {
    match this {
        Value::Table(table) => Rc::clone(table),
        _ => unreachable!("table method bound to non-table receiver"),
    }
}

fn number_class() -> Class {
    methods(vec![
        native("to_string", 0, |_evaluator, this, _args| {
            Ok(Value::string(number_receiver(&this).to_string()))
        }),
        native("to_boolean", 0, |_evaluator, this, _args| {
            Ok(Value::Boolean(number_receiver(&this) != 0.0))
        }),
    ])
}

fn string_class() -> Class {
    methods(vec![
        native("reverse", 0, |_evaluator, this, _args| {
            let text = string_receiver(&this);
            Ok(Value::string(text.chars().rev().collect::<String>()))
        }),
        native("to_upper_case", 0, |_evaluator, this, _args| {
            Ok(Value::string(string_receiver(&this).to_uppercase()))
        }),
        native("to_lower_case", 0, |_evaluator, this, _args| {
            Ok(Value::string(string_receiver(&this).to_lowercase()))
        }),
        native("length", 0, |_evaluator, this, _args| {
            Ok(Value::Number(string_receiver(&this).chars().count() as f64))
        }),
    ])
}

fn array_class() -> Class {
    methods(vec![
        native("push", -1, |evaluator, this, args| {
            if args.is_empty() {
                return Err(evaluator.exception("expected at least 1 argument, got 0"));
            }
            array_receiver(&this)
                .borrow_mut()
                .extend(args.iter().cloned());
            Ok(Value::Null)
        }),
        native("pop", 0, |evaluator, this, _args| {
            array_receiver(&this)
                .borrow_mut()
                .pop()
                .ok_or_else(|| evaluator.exception("array is empty"))
        }),
        native("length", 0, |_evaluator, this, _args| {
            Ok(Value::Number(array_receiver(&this).borrow().len() as f64))
        }),
    ])
}

fn table_class() -> Class {
    methods(vec![
        native("size", 0, |_evaluator, this, _args| {
            Ok(Value::Number(table_receiver(&this).borrow().size() as f64))
        }),
        native("delete", 1, |evaluator, this, args| {
            let existed = table_receiver(&this)
                .borrow_mut()
                .delete(&args[0])
                .map_err(|error| evaluator.exception(error.to_string()))?;
            Ok(Value::Boolean(existed))
        }),
        native("has", 1, |evaluator, this, args| {
            let present = table_receiver(&this)
                .borrow()
                .contains(&args[0])
                .map_err(|error| evaluator.exception(error.to_string()))?;
            Ok(Value::Boolean(present))
        }),
    ])
}
