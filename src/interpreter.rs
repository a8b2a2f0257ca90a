//! Tree-walking evaluator.
//!
//! Statements execute against a chain of scopes ([`env::Env`]); non-local
//! control flow (`return` / `break` / `continue`) travels as a [`Flow`]
//! result, thrown exceptions travel on the error channel. Loops consume
//! their `Break`/`Continue`, function calls consume `Return`, and anything
//! that escapes its construct becomes a runtime exception.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use thiserror::Error;

use crate::ast::{Block, ClassExpression, Expression, Operator, Script, Statement};
use crate::builtins;
use crate::parser::{self, ParseError};
use crate::runtime::value::{Class, Exception, Function, Instance, Method, Value};

pub mod env;

mod classes;

use classes::{CLASS_ARRAY, CLASS_NUMBER, CLASS_STRING, CLASS_TABLE, Intrinsics};
use env::Env;

/// Everything `run_string` can report: a batch of syntax errors, or the
/// exception that escaped the program.
#[derive(Debug, Error)]
pub enum QuillError {
    #[error("compilation failed with {} error(s)", .0.len())]
    Compile(Vec<ParseError>),
    #[error("{0}")]
    Runtime(Exception),
}

/// Statement outcome: fall through, or one of the unwinding signals.
enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

type EvalResult<T> = Result<T, Exception>;

pub struct Evaluator {
    env: Env,
    call_stack: Vec<String>,
    intrinsics: Intrinsics,
    out: Box<dyn Write>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// An evaluator printing to stdout.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(out: Box<dyn Write>) -> Self {
        let env = Env::new();
        builtins::install(&env);
        let intrinsics = Intrinsics::create();
        for (name, class) in [
            (CLASS_NUMBER, &intrinsics.number),
            (CLASS_STRING, &intrinsics.string),
            (CLASS_ARRAY, &intrinsics.array),
            (CLASS_TABLE, &intrinsics.table),
        ] {
            env.declare(name, Value::Class(Rc::clone(class)))
                .expect("intrinsic class names are distinct in a fresh global scope");
        }
        Self {
            env,
            call_stack: Vec::new(),
            intrinsics,
            out,
        }
    }

    /// Expose a host function to scripts under `name`. A negative arity
    /// disables the argument-count check.
    pub fn register_native<F>(
        &mut self,
        name: &str,
        arity: i32,
        call: F,
    ) -> Result<(), env::EnvError>
    where
        F: Fn(&mut Evaluator, Value, &[Value]) -> Result<Value, Exception> + 'static,
    {
        let function = Function::Native {
            name: name.to_string(),
            arity,
            call: Rc::new(call),
        };
        self.env.declare(name, Value::Function(Rc::new(function)))
    }

    /// Parse and run `source` against this evaluator's globals. Used by the
    /// REPL, where declarations accumulate across lines.
    pub fn run_string(&mut self, source: &str) -> Result<(), QuillError> {
        let (script, errors) = parser::parse_source(source);
        if !errors.is_empty() {
            return Err(QuillError::Compile(errors));
        }
        self.run(&script).map_err(QuillError::Runtime)
    }

    /// Execute a script. A stray `return`/`break`/`continue` at top level is
    /// reported as an exception, like any other runtime failure.
    pub fn run(&mut self, script: &Script) -> Result<(), Exception> {
        match self.exec_all(&script.statements)? {
            Flow::Normal => Ok(()),
            Flow::Return(_) => Err(self.exception("'return' outside function")),
            Flow::Break => Err(self.exception("'break' outside loop")),
            Flow::Continue => Err(self.exception("'continue' outside loop")),
        }
    }

    /// An exception carrying a snapshot of the current call stack.
    pub fn exception(&self, message: impl Into<String>) -> Exception {
        Exception {
            message: message.into(),
            trace: self.call_stack.clone(),
        }
    }

    /* == statements ======================================================== */

    fn exec_all(&mut self, statements: &[Statement]) -> EvalResult<Flow> {
        for statement in statements {
            match self.exec(statement)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, statement: &Statement) -> EvalResult<Flow> {
        match statement {
            Statement::Bad => Err(self.exception("cannot evaluate malformed statement")),
            Statement::Declaration { name, value } => {
                let value = self.eval(value)?;
                self.env
                    .declare(name, value)
                    .map_err(|error| self.exception(error.to_string()))?;
                Ok(Flow::Normal)
            }
            Statement::Block(block) => self.exec_block(block),
            Statement::If {
                condition,
                then,
                otherwise,
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.exec(then)
                } else {
                    self.exec(otherwise)
                }
            }
            Statement::While { condition, body } => {
                while self.eval(condition)?.is_truthy() {
                    match self.exec(body)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                Ok(Flow::Normal)
            }
            Statement::DoWhile { body, condition } => {
                loop {
                    match self.exec(body)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                    if !self.eval(condition)?.is_truthy() {
                        break;
                    }
                }
                Ok(Flow::Normal)
            }
            Statement::Say(expression) => {
                let value = self.eval(expression)?;
                self.emit(value.to_string())?;
                Ok(Flow::Normal)
            }
            Statement::Return(expression) => Ok(Flow::Return(self.eval(expression)?)),
            Statement::Break => Ok(Flow::Break),
            Statement::Continue => Ok(Flow::Continue),
            Statement::Try {
                body,
                binding,
                catch,
                finally,
            } => self.exec_try(body, binding, catch, finally),
            Statement::Throw(expression) => {
                let value = self.eval(expression)?;
                Err(self.exception(value.to_string()))
            }
            Statement::Assignment { target, value } => {
                self.exec_assignment(target, value)?;
                Ok(Flow::Normal)
            }
            Statement::Expression(expression) => {
                self.eval(expression)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn exec_block(&mut self, block: &Block) -> EvalResult<Flow> {
        let saved = self.env.clone();
        self.env = saved.child();
        let result = self.exec_all(&block.statements);
        self.env = saved;
        result
    }

    // The try exception is always considered handled once the catch arm ran
    // (or was absent); only a *catch-body* exception resurfaces, and a
    // finally exception supersedes everything. A `return`/`break`/`continue`
    // leaving try or catch still runs finally first.
    fn exec_try(
        &mut self,
        body: &Statement,
        binding: &str,
        catch: &Statement,
        finally: &Statement,
    ) -> EvalResult<Flow> {
        let pending = match self.exec(body) {
            Err(exception) => {
                let saved = self.env.clone();
                self.env = saved.child();
                let result = match self
                    .env
                    .declare(binding, Value::Exception(Rc::new(exception)))
                {
                    Ok(()) => self.exec(catch),
                    Err(error) => Err(self.exception(error.to_string())),
                };
                self.env = saved;
                result
            }
            other => other,
        };

        match self.exec(finally)? {
            Flow::Normal => pending,
            flow => Ok(flow),
        }
    }

    fn exec_assignment(&mut self, target: &Expression, value: &Expression) -> EvalResult<()> {
        let value = self.eval(value)?;

        match target {
            Expression::Identifier(name) => self
                .env
                .set(name, value)
                .map_err(|error| self.exception(error.to_string())),
            Expression::Property { object, name } => {
                if matches!(**object, Expression::This) {
                    let this = self
                        .env
                        .get_this()
                        .ok_or_else(|| self.exception("'this' is undefined"))?;
                    let Value::Instance(instance) = this else {
                        return Err(self.exception("'this' is not an instance"));
                    };
                    let mut fields = instance.fields.borrow_mut();
                    return match fields.get_mut(name) {
                        Some(slot) => {
                            *slot = value;
                            Ok(())
                        }
                        None => Err(self.exception(format!("missing field '{name}'"))),
                    };
                }
                match self.eval(object)? {
                    Value::Instance(instance) => {
                        let Some(setter) = instance.class.setters.get(name).cloned() else {
                            return Err(self.exception(format!("missing setter '{name}'")));
                        };
                        let receiver = Value::Instance(instance);
                        self.call_function(
                            &setter,
                            Some(receiver),
                            vec![value],
                            format!("<set {name}>"),
                        )?;
                        Ok(())
                    }
                    other => Err(self.exception(format!(
                        "cannot assign property on {}",
                        other.type_name()
                    ))),
                }
            }
            Expression::Index { object, index } => {
                let index = self.eval(index)?;
                match self.eval(object)? {
                    Value::Array(elements) => {
                        let len = elements.borrow().len();
                        let position = self.array_index(&index, len)?;
                        elements.borrow_mut()[position] = value;
                        Ok(())
                    }
                    Value::Table(table) => {
                        table
                            .borrow_mut()
                            .set(&index, value)
                            .map_err(|error| self.exception(error.to_string()))?;
                        Ok(())
                    }
                    other => Err(self.exception(format!(
                        "{} does not support index assignment",
                        other.type_name()
                    ))),
                }
            }
            _ => Err(self.exception("invalid assignment target")),
        }
    }

    /* == expressions ======================================================= */

    pub fn eval(&mut self, expression: &Expression) -> EvalResult<Value> {
        match expression {
            Expression::Null => Ok(Value::Null),
            Expression::This => self
                .env
                .get_this()
                .ok_or_else(|| self.exception("'this' is undefined")),
            Expression::Boolean(value) => Ok(Value::Boolean(*value)),
            Expression::Number(value) => Ok(Value::Number(*value)),
            Expression::String(value) => Ok(Value::string(value)),
            Expression::Identifier(name) => self
                .env
                .get(name)
                .map_err(|error| self.exception(error.to_string())),
            Expression::Prefix { operator, operand } => {
                let operand = self.eval(operand)?;
                self.prefix_op(*operator, operand)
            }
            Expression::Infix {
                left,
                operator,
                right,
            } => self.eval_infix(*operator, left, right),
            Expression::Call { callee, arguments } => self.eval_call(callee, arguments),
            Expression::Property { object, name } => self.eval_property(object, name),
            Expression::Index { object, index } => self.eval_index(object, index),
            Expression::Slice { object, start, end } => self.eval_slice(object, start, end),
            Expression::Function(declaration) => Ok(Value::Function(Rc::new(Function::User {
                declaration: Rc::clone(declaration),
                closure: self.env.clone(),
            }))),
            Expression::Class(class) => self.eval_class(class),
            Expression::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval(element)?);
                }
                Ok(Value::array(values))
            }
            Expression::Table(pairs) => {
                let mut table = crate::runtime::table::HashTable::new();
                for (key, value) in pairs {
                    let key = self.eval(key)?;
                    let value = self.eval(value)?;
                    table
                        .set(&key, value)
                        .map_err(|error| self.exception(error.to_string()))?;
                }
                Ok(Value::table(table))
            }
        }
    }

    fn prefix_op(&self, operator: Operator, operand: Value) -> EvalResult<Value> {
        match operator {
            Operator::Not => Ok(Value::Boolean(!operand.is_truthy())),
            Operator::Minus | Operator::Plus => {
                let Value::Number(number) = operand else {
                    return Err(self.exception(format!(
                        "expected number, got {}",
                        operand.type_name()
                    )));
                };
                if operator == Operator::Minus {
                    Ok(Value::Number(-number))
                } else {
                    Ok(Value::Number(number))
                }
            }
            _ => Err(self.exception("unknown prefix operator")),
        }
    }

    fn eval_infix(
        &mut self,
        operator: Operator,
        left: &Expression,
        right: &Expression,
    ) -> EvalResult<Value> {
        match operator {
            // Identity fully evaluates both sides; or/and short-circuit.
            Operator::Is => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(Value::Boolean(left.is_identical(&right)))
            }
            Operator::Isnt => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(Value::Boolean(!left.is_identical(&right)))
            }
            Operator::Or => {
                let left = self.eval(left)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval(right)
                }
            }
            Operator::And => {
                let left = self.eval(left)?;
                if !left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval(right)
                }
            }
            _ => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                self.binary_op(operator, left, right)
            }
        }
    }

    // Arithmetic, comparison, and `==`/`!=` dispatch on the left operand.
    fn binary_op(&self, operator: Operator, left: Value, right: Value) -> EvalResult<Value> {
        match left {
            Value::Number(left) => self.number_op(operator, left, &right),
            Value::String(left) => self.string_op(operator, &left, &right),
            Value::Boolean(left) => self.boolean_op(operator, left, &right),
            Value::Null => self.null_op(operator, &right),
            other => Err(self.exception(format!(
                "'{operator}' is not supported for {}",
                other.type_name()
            ))),
        }
    }

    fn number_op(&self, operator: Operator, left: f64, right: &Value) -> EvalResult<Value> {
        // Cross-type equality is defined (false / true); everything else
        // requires a number on the right.
        match operator {
            Operator::Eq => {
                return Ok(Value::Boolean(
                    matches!(right, Value::Number(right) if *right == left),
                ));
            }
            Operator::Ne => {
                return Ok(Value::Boolean(
                    !matches!(right, Value::Number(right) if *right == left),
                ));
            }
            _ => {}
        }
        let Value::Number(right) = right else {
            return Err(self.exception(format!("expected number, got {}", right.type_name())));
        };
        let value = match operator {
            Operator::Plus => Value::Number(left + right),
            Operator::Minus => Value::Number(left - right),
            Operator::Star => Value::Number(left * right),
            Operator::Slash => Value::Number(left / right),
            Operator::Lt => Value::Boolean(left < *right),
            Operator::Le => Value::Boolean(left <= *right),
            Operator::Gt => Value::Boolean(left > *right),
            Operator::Ge => Value::Boolean(left >= *right),
            other => {
                return Err(self.exception(format!("'{other}' is not supported for number")));
            }
        };
        Ok(value)
    }

    fn string_op(&self, operator: Operator, left: &str, right: &Value) -> EvalResult<Value> {
        match operator {
            Operator::Plus => {
                let Value::String(right) = right else {
                    return Err(
                        self.exception(format!("expected string, got {}", right.type_name()))
                    );
                };
                Ok(Value::string(format!("{left}{right}")))
            }
            Operator::Eq => Ok(Value::Boolean(
                matches!(right, Value::String(right) if right.as_ref() == left),
            )),
            Operator::Ne => Ok(Value::Boolean(
                !matches!(right, Value::String(right) if right.as_ref() == left),
            )),
            other => Err(self.exception(format!("'{other}' is not supported for string"))),
        }
    }

    fn boolean_op(&self, operator: Operator, left: bool, right: &Value) -> EvalResult<Value> {
        match operator {
            Operator::Eq => Ok(Value::Boolean(
                matches!(right, Value::Boolean(right) if *right == left),
            )),
            Operator::Ne => Ok(Value::Boolean(
                !matches!(right, Value::Boolean(right) if *right == left),
            )),
            other => Err(self.exception(format!("'{other}' is not supported for boolean"))),
        }
    }

    fn null_op(&self, operator: Operator, right: &Value) -> EvalResult<Value> {
        match operator {
            Operator::Eq => Ok(Value::Boolean(matches!(right, Value::Null))),
            Operator::Ne => Ok(Value::Boolean(!matches!(right, Value::Null))),
            other => Err(self.exception(format!("'{other}' is not supported for null"))),
        }
    }

    fn eval_call(
        &mut self,
        callee: &Expression,
        argument_exprs: &[Expression],
    ) -> EvalResult<Value> {
        let callee = self.eval(callee)?;
        let mut arguments = Vec::with_capacity(argument_exprs.len());
        for argument in argument_exprs {
            arguments.push(self.eval(argument)?);
        }

        match callee {
            Value::Function(function) => {
                let frame = match &*function {
                    Function::Native { name, .. } => format!("<native {name}>"),
                    Function::User { .. } => "<function>".to_string(),
                };
                self.call_function(&function, None, arguments, frame)
            }
            Value::Method(method) => {
                let frame = if method.is_constructor {
                    format!("<constructor {}>", method.name)
                } else {
                    format!("<method {}>", method.name)
                };
                let result = self.call_function(
                    &method.function,
                    Some(method.receiver.clone()),
                    arguments,
                    frame,
                )?;
                if method.is_constructor {
                    Ok(method.receiver.clone())
                } else {
                    Ok(result)
                }
            }
            other => Err(self.exception(format!("{} is not callable", other.type_name()))),
        }
    }

    fn call_function(
        &mut self,
        function: &Function,
        this: Option<Value>,
        arguments: Vec<Value>,
        frame: String,
    ) -> EvalResult<Value> {
        match function {
            Function::Native { arity, call, .. } => {
                if *arity >= 0 && arguments.len() != *arity as usize {
                    return Err(self.exception(format!(
                        "expected {arity} arguments, got {}",
                        arguments.len()
                    )));
                }
                let call = Rc::clone(call);
                self.call_stack.push(frame);
                let result = call(self, this.unwrap_or(Value::Null), &arguments);
                self.call_stack.pop();
                result
            }
            Function::User {
                declaration,
                closure,
            } => {
                if declaration.parameters.len() != arguments.len() {
                    return Err(self.exception(format!(
                        "expected {} arguments, got {}",
                        declaration.parameters.len(),
                        arguments.len()
                    )));
                }

                let saved = self.env.clone();
                self.env = closure.child();
                self.env.set_this(this);
                for (parameter, value) in declaration.parameters.iter().zip(arguments) {
                    if let Err(error) = self.env.declare(parameter, value) {
                        self.env = saved;
                        return Err(self.exception(error.to_string()));
                    }
                }

                self.call_stack.push(frame);
                let result = self.exec_all(&declaration.body.statements);
                self.call_stack.pop();
                self.env = saved;

                match result? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal => Ok(Value::Null),
                    Flow::Break => Err(self.exception("'break' outside loop")),
                    Flow::Continue => Err(self.exception("'continue' outside loop")),
                }
            }
        }
    }

    fn eval_property(&mut self, object_expr: &Expression, name: &str) -> EvalResult<Value> {
        let object = self.eval(object_expr)?;

        // Built-in value types resolve through their intrinsic class.
        let intrinsic = match &object {
            Value::Number(_) => Some(Rc::clone(&self.intrinsics.number)),
            Value::String(_) => Some(Rc::clone(&self.intrinsics.string)),
            Value::Array(_) => Some(Rc::clone(&self.intrinsics.array)),
            Value::Table(_) => Some(Rc::clone(&self.intrinsics.table)),
            _ => None,
        };
        if let Some(class) = intrinsic {
            return match class.public.get(name).cloned() {
                Some(function) => Ok(bound_method(name, function, object)),
                None => Err(self.exception(format!("missing field or method '{name}'"))),
            };
        }

        match object {
            // Class property access names a constructor and allocates the
            // instance it will initialize, fields cloned from the defaults.
            Value::Class(class) => {
                let Some(constructor) = class.constructors.get(name).cloned() else {
                    return Err(self.exception(format!("missing constructor '{name}'")));
                };
                let instance = Value::Instance(Rc::new(Instance {
                    class: Rc::clone(&class),
                    fields: RefCell::new(class.fields.clone()),
                }));
                Ok(Value::Method(Rc::new(Method {
                    name: name.to_string(),
                    function: constructor,
                    receiver: instance,
                    is_constructor: true,
                })))
            }
            Value::Instance(instance) => {
                // Through `this`: fields, then private, then public methods.
                if matches!(object_expr, Expression::This) {
                    if let Some(value) = instance.fields.borrow().get(name) {
                        return Ok(value.clone());
                    }
                    if let Some(function) = instance.class.private.get(name).cloned() {
                        return Ok(bound_method(name, function, Value::Instance(instance)));
                    }
                    if let Some(function) = instance.class.public.get(name).cloned() {
                        return Ok(bound_method(name, function, Value::Instance(instance)));
                    }
                    return Err(self.exception(format!("missing field or method '{name}'")));
                }
                // From outside: getters run immediately, then public methods.
                if let Some(getter) = instance.class.getters.get(name).cloned() {
                    let receiver = Value::Instance(Rc::clone(&instance));
                    return self.call_function(
                        &getter,
                        Some(receiver),
                        Vec::new(),
                        format!("<get {name}>"),
                    );
                }
                if let Some(function) = instance.class.public.get(name).cloned() {
                    return Ok(bound_method(name, function, Value::Instance(instance)));
                }
                Err(self.exception(format!("missing property '{name}'")))
            }
            Value::Exception(exception) => match name {
                "message" => Ok(Value::string(&exception.message)),
                "trace" => Ok(Value::array(
                    exception.trace.iter().map(Value::string).collect(),
                )),
                _ => Err(self.exception(format!("missing field or method '{name}'"))),
            },
            other => Err(self.exception(format!("{} has no properties", other.type_name()))),
        }
    }

    fn eval_index(&mut self, object: &Expression, index: &Expression) -> EvalResult<Value> {
        let object = self.eval(object)?;
        let index = self.eval(index)?;
        match object {
            Value::Array(elements) => {
                let len = elements.borrow().len();
                let position = self.array_index(&index, len)?;
                let value = elements.borrow()[position].clone();
                Ok(value)
            }
            Value::Table(table) => {
                let result = table.borrow().get(&index);
                result.map_err(|error| self.exception(error.to_string()))
            }
            other => Err(self.exception(format!(
                "{} does not support index access",
                other.type_name()
            ))),
        }
    }

    fn eval_slice(
        &mut self,
        object: &Expression,
        start: &Expression,
        end: &Expression,
    ) -> EvalResult<Value> {
        let object = self.eval(object)?;
        let start = self.eval(start)?;
        let end = self.eval(end)?;
        let type_name = object.type_name();
        let Value::Array(elements) = object else {
            return Err(self.exception(format!("{type_name} does not support slicing")));
        };
        let len = elements.borrow().len();
        let start = self.slice_bound(&start, len)?;
        let end = self.slice_bound(&end, len)?;
        if start > end {
            return Err(self.exception("slice start greater than slice end"));
        }
        let slice = elements.borrow()[start..end].to_vec();
        Ok(Value::array(slice))
    }

    fn eval_class(&mut self, class: &ClassExpression) -> EvalResult<Value> {
        // Field defaults are evaluated once, here; member closures capture
        // the environment surrounding the literal.
        let mut fields = HashMap::new();
        for (name, expression) in &class.fields {
            let value = self.eval(expression)?;
            fields.insert(name.clone(), value);
        }
        Ok(Value::Class(Rc::new(Class {
            fields,
            constructors: self.member_map(&class.constructors),
            public: self.member_map(&class.public),
            private: self.member_map(&class.private),
            getters: self.member_map(&class.getters),
            setters: self.member_map(&class.setters),
        })))
    }

    fn member_map(
        &self,
        members: &[(String, Rc<crate::ast::FunctionExpression>)],
    ) -> HashMap<String, Rc<Function>> {
        members
            .iter()
            .map(|(name, declaration)| {
                (
                    name.clone(),
                    Rc::new(Function::User {
                        declaration: Rc::clone(declaration),
                        closure: self.env.clone(),
                    }),
                )
            })
            .collect()
    }

    /* == helpers =========================================================== */

    fn array_index(&self, index: &Value, len: usize) -> EvalResult<usize> {
        let Value::Number(number) = index else {
            return Err(self.exception(format!(
                "index must be a number, got {}",
                index.type_name()
            )));
        };
        if number.fract() != 0.0 {
            return Err(self.exception("index must be an integer"));
        }
        if *number < 0.0 || *number >= len as f64 {
            return Err(self.exception("index out of range"));
        }
        Ok(*number as usize)
    }

    // Slice bounds may equal the length.
    fn slice_bound(&self, bound: &Value, len: usize) -> EvalResult<usize> {
        let Value::Number(number) = bound else {
            return Err(self.exception(format!(
                "index must be a number, got {}",
                bound.type_name()
            )));
        };
        if number.fract() != 0.0 {
            return Err(self.exception("index must be an integer"));
        }
        if *number < 0.0 || *number > len as f64 {
            return Err(self.exception("index out of range"));
        }
        Ok(*number as usize)
    }

    fn emit(&mut self, text: String) -> EvalResult<()> {
        writeln!(self.out, "{text}")
            .map_err(|error| self.exception(format!("output write failed: {error}")))
    }
}

fn bound_method(name: &str, function: Rc<Function>, receiver: Value) -> Value {
    Value::Method(Rc::new(Method {
        name: name.to_string(),
        function,
        receiver,
        is_constructor: false,
    }))
}
