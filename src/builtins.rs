//! Native functions installed into the global scope at evaluator
//! construction.

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::interpreter::Evaluator;
use crate::interpreter::env::Env;
use crate::runtime::value::{Exception, Function, Value};

pub fn install(globals: &Env) {
    for (name, arity, call) in [
        ("clock", 0, builtin_clock as NativePtr),
        ("random", 0, builtin_random as NativePtr),
        ("class_of", 1, builtin_class_of as NativePtr),
    ] {
        let function = Function::Native {
            name: name.to_string(),
            arity,
            call: Rc::new(call),
        };
        globals
            .declare(name, Value::Function(Rc::new(function)))
            .expect("builtin names are distinct in a fresh global scope");
    }
}

type NativePtr = fn(&mut Evaluator, Value, &[Value]) -> Result<Value, Exception>;

/// Seconds since the Unix epoch, with a fractional part.
fn builtin_clock(
    evaluator: &mut Evaluator,
    _this: Value,
    _args: &[Value],
) -> Result<Value, Exception> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|error| evaluator.exception(format!("clock went backwards: {error}")))?;
    Ok(Value::Number(elapsed.as_secs_f64()))
}

/// Uniform random number in `[0, 1)`.
fn builtin_random(
    _evaluator: &mut Evaluator,
    _this: Value,
    _args: &[Value],
) -> Result<Value, Exception> {
    Ok(Value::Number(rand::random::<f64>()))
}

/// The class of an instance; `null` for anything else.
fn builtin_class_of(
    _evaluator: &mut Evaluator,
    _this: Value,
    args: &[Value],
) -> Result<Value, Exception> {
    match &args[0] {
        Value::Instance(instance) => Ok(Value::Class(Rc::clone(&instance.class))),
        _ => Ok(Value::Null),
    }
}
