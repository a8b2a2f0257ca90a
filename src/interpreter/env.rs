use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::runtime::value::Value;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("variable '{name}' already exists")]
    AlreadyDeclared { name: String },
    #[error("variable '{name}' does not exist")]
    NotDeclared { name: String },
}

/// A lexical scope: name→value map, optional enclosing scope, optional bound
/// `this`. `Env` is a shared handle, so cloning one is how closures capture
/// their environment — later assignments through either handle are visible
/// to both.
#[derive(Debug, Clone, Default)]
pub struct Env {
    scope: Rc<RefCell<Scope>>,
}

#[derive(Debug, Default)]
struct Scope {
    store: HashMap<String, Value>,
    outer: Option<Env>,
    this: Option<Value>,
}

impl Env {
    /// A root scope with no enclosing environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh scope chained onto `self`.
    pub fn child(&self) -> Self {
        Self {
            scope: Rc::new(RefCell::new(Scope {
                store: HashMap::new(),
                outer: Some(self.clone()),
                this: None,
            })),
        }
    }

    /// Introduce a new name in this scope; shadowing an outer declaration is
    /// fine, redeclaring in the same scope is not.
    pub fn declare(&self, name: &str, value: Value) -> Result<(), EnvError> {
        let mut scope = self.scope.borrow_mut();
        if scope.store.contains_key(name) {
            return Err(EnvError::AlreadyDeclared {
                name: name.to_string(),
            });
        }
        scope.store.insert(name.to_string(), value);
        Ok(())
    }

    /// Look the name up, walking outward.
    pub fn get(&self, name: &str) -> Result<Value, EnvError> {
        let mut current = self.clone();
        loop {
            if let Some(value) = current.scope.borrow().store.get(name) {
                return Ok(value.clone());
            }
            let outer = current.scope.borrow().outer.clone();
            match outer {
                Some(env) => current = env,
                None => {
                    return Err(EnvError::NotDeclared {
                        name: name.to_string(),
                    });
                }
            }
        }
    }

    /// Rewrite the nearest scope that declared the name.
    pub fn set(&self, name: &str, value: Value) -> Result<(), EnvError> {
        let mut current = self.clone();
        loop {
            {
                let mut scope = current.scope.borrow_mut();
                if let Some(slot) = scope.store.get_mut(name) {
                    *slot = value;
                    return Ok(());
                }
            }
            let outer = current.scope.borrow().outer.clone();
            match outer {
                Some(env) => current = env,
                None => {
                    return Err(EnvError::NotDeclared {
                        name: name.to_string(),
                    });
                }
            }
        }
    }

    /// The innermost bound `this`, if any scope on the chain has one.
    pub fn get_this(&self) -> Option<Value> {
        let mut current = self.clone();
        loop {
            if let Some(this) = current.scope.borrow().this.clone() {
                return Some(this);
            }
            let outer = current.scope.borrow().outer.clone();
            match outer {
                Some(env) => current = env,
                None => return None,
            }
        }
    }

    pub fn set_this(&self, this: Option<Value>) {
        self.scope.borrow_mut().this = this;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_rejects_duplicates_in_the_same_scope() {
        let env = Env::new();
        env.declare("x", Value::Number(1.0)).expect("first declare");
        assert_eq!(
            env.declare("x", Value::Number(2.0)),
            Err(EnvError::AlreadyDeclared {
                name: "x".to_string()
            })
        );
    }

    #[test]
    fn get_walks_outward_and_shadowing_wins() {
        let outer = Env::new();
        outer.declare("x", Value::Number(1.0)).expect("declare");
        outer.declare("y", Value::Number(9.0)).expect("declare");

        let inner = outer.child();
        inner.declare("x", Value::Number(2.0)).expect("shadow");

        assert_eq!(inner.get("x").expect("get").to_string(), "2");
        assert_eq!(inner.get("y").expect("get").to_string(), "9");
        assert_eq!(
            inner.get("z").expect_err("undeclared name"),
            EnvError::NotDeclared {
                name: "z".to_string()
            }
        );
    }

    #[test]
    fn set_rewrites_the_declaring_scope() {
        let outer = Env::new();
        outer.declare("x", Value::Number(1.0)).expect("declare");
        let inner = outer.child();

        inner.set("x", Value::Number(5.0)).expect("set");
        assert_eq!(outer.get("x").expect("get").to_string(), "5");
        assert_eq!(
            inner.set("missing", Value::Null),
            Err(EnvError::NotDeclared {
                name: "missing".to_string()
            })
        );
    }

    #[test]
    fn assignments_are_visible_through_captured_handles() {
        let env = Env::new();
        env.declare("x", Value::Number(1.0)).expect("declare");
        let captured = env.clone();
        env.set("x", Value::Number(2.0)).expect("set");
        assert_eq!(captured.get("x").expect("get").to_string(), "2");
    }

    #[test]
    fn this_is_found_through_the_chain() {
        let outer = Env::new();
        assert!(outer.get_this().is_none());
        outer.set_this(Some(Value::Number(7.0)));
        let inner = outer.child();
        assert_eq!(inner.get_this().expect("this").to_string(), "7");
    }
}
