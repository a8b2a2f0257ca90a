//! Syntax tree produced by the parser and walked by the interpreter.
//!
//! Nodes are immutable once built. `Display` renders the tree back to a
//! compact one-statement-per-line form used by the file-mode dump.

use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    Eq,
    Ne,
    Is,
    Isnt,
    Lt,
    Le,
    Gt,
    Ge,
    Or,
    And,
    Not,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Is => "===",
            Self::Isnt => "!==",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Or => "or",
            Self::And => "and",
            Self::Not => "!",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Placeholder left behind when the parser recovers from an error.
    Bad,
    Declaration {
        name: String,
        value: Expression,
    },
    Block(Block),
    If {
        condition: Expression,
        then: Box<Statement>,
        otherwise: Box<Statement>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    DoWhile {
        body: Box<Statement>,
        condition: Expression,
    },
    Say(Expression),
    Return(Expression),
    Break,
    Continue,
    Try {
        body: Box<Statement>,
        binding: String,
        catch: Box<Statement>,
        finally: Box<Statement>,
    },
    Throw(Expression),
    Assignment {
        target: Expression,
        value: Expression,
    },
    Expression(Expression),
}

impl Statement {
    /// Filler used for an absent `else`, `catch`, or `finally` arm.
    pub fn null() -> Self {
        Self::Expression(Expression::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Null,
    This,
    Boolean(bool),
    Number(f64),
    String(String),
    Identifier(String),
    Prefix {
        operator: Operator,
        operand: Box<Expression>,
    },
    Infix {
        left: Box<Expression>,
        operator: Operator,
        right: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Property {
        object: Box<Expression>,
        name: String,
    },
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
    },
    Slice {
        object: Box<Expression>,
        start: Box<Expression>,
        end: Box<Expression>,
    },
    Function(Rc<FunctionExpression>),
    Class(ClassExpression),
    Array(Vec<Expression>),
    Table(Vec<(Expression, Expression)>),
}

/// Shared between the tree and runtime closures, so evaluating the same
/// literal twice does not copy the body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpression {
    pub parameters: Vec<String>,
    pub body: Block,
}

/// Member lists stay in source order; duplicates are resolved last-wins when
/// the literal is evaluated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassExpression {
    pub fields: Vec<(String, Expression)>,
    pub constructors: Vec<(String, Rc<FunctionExpression>)>,
    pub public: Vec<(String, Rc<FunctionExpression>)>,
    pub private: Vec<(String, Rc<FunctionExpression>)>,
    pub getters: Vec<(String, Rc<FunctionExpression>)>,
    pub setters: Vec<(String, Rc<FunctionExpression>)>,
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for statement in &self.statements {
            write!(f, "{statement} ")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bad => write!(f, "BAD"),
            Self::Declaration { name, value } => write!(f, "var {name} = {value};"),
            Self::Block(block) => write!(f, "{block}"),
            Self::If {
                condition,
                then,
                otherwise,
            } => write!(f, "if ({condition}) {then} else {otherwise}"),
            Self::While { condition, body } => write!(f, "while ({condition}) {body}"),
            Self::DoWhile { body, condition } => write!(f, "do {body} while ({condition});"),
            Self::Say(expression) => write!(f, "say {expression};"),
            Self::Return(expression) => write!(f, "return {expression};"),
            Self::Break => write!(f, "break;"),
            Self::Continue => write!(f, "continue;"),
            Self::Try {
                body,
                binding,
                catch,
                finally,
            } => write!(f, "try {body} catch ({binding}) {catch} finally {finally}"),
            Self::Throw(expression) => write!(f, "throw {expression};"),
            Self::Assignment { target, value } => write!(f, "{target} = {value};"),
            Self::Expression(expression) => write!(f, "{expression};"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::This => write!(f, "this"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Identifier(name) => write!(f, "{name}"),
            Self::Prefix { operator, operand } => write!(f, "({operator} {operand})"),
            Self::Infix {
                left,
                operator,
                right,
            } => write!(f, "({left} {operator} {right})"),
            Self::Call { callee, arguments } => {
                write!(f, "{callee}(")?;
                write_comma_separated(f, arguments)?;
                write!(f, ")")
            }
            Self::Property { object, name } => write!(f, "{object}.{name}"),
            Self::Index { object, index } => write!(f, "{object}[{index}]"),
            Self::Slice { object, start, end } => write!(f, "{object}[{start}:{end}]"),
            Self::Function(function) => write!(f, "{function}"),
            Self::Class(class) => write!(f, "{class}"),
            Self::Array(elements) => {
                write!(f, "array{{")?;
                write_comma_separated(f, elements)?;
                write!(f, "}}")
            }
            Self::Table(pairs) => {
                write!(f, "map{{")?;
                for (index, (key, value)) in pairs.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[{key}] = {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Display for FunctionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fun(")?;
        for (index, parameter) in self.parameters.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{parameter}")?;
        }
        write!(f, ") {}", self.body)
    }
}

impl fmt::Display for ClassExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class{{ ")?;
        for (name, value) in &self.fields {
            write!(f, "var {name} = {value}; ")?;
        }
        for (label, members) in [
            ("constructor", &self.constructors),
            ("public", &self.public),
            ("private", &self.private),
            ("get", &self.getters),
            ("set", &self.setters),
        ] {
            for (name, function) in members {
                write!(f, "{label} {name} {function} ")?;
            }
        }
        write!(f, "}}")
    }
}

fn write_comma_separated(f: &mut fmt::Formatter<'_>, items: &[Expression]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_statements_for_the_dump() {
        let script = Script {
            statements: vec![
                Statement::Declaration {
                    name: "x".to_string(),
                    value: Expression::Number(1.0),
                },
                Statement::If {
                    condition: Expression::Infix {
                        left: Box::new(Expression::Identifier("x".to_string())),
                        operator: Operator::Lt,
                        right: Box::new(Expression::Number(2.0)),
                    },
                    then: Box::new(Statement::Say(Expression::String("lo".to_string()))),
                    otherwise: Box::new(Statement::null()),
                },
                Statement::Bad,
            ],
        };
        assert_eq!(
            script.to_string(),
            "var x = 1;\nif ((x < 2)) say \"lo\"; else null;\nBAD\n"
        );
    }

    #[test]
    fn renders_literals_and_postfix_forms() {
        let expr = Expression::Call {
            callee: Box::new(Expression::Property {
                object: Box::new(Expression::Identifier("a".to_string())),
                name: "push".to_string(),
            }),
            arguments: vec![Expression::Number(1.0), Expression::Boolean(true)],
        };
        assert_eq!(expr.to_string(), "a.push(1, true)");

        let slice = Expression::Slice {
            object: Box::new(Expression::Identifier("a".to_string())),
            start: Box::new(Expression::Number(0.0)),
            end: Box::new(Expression::Number(2.0)),
        };
        assert_eq!(slice.to_string(), "a[0:2]");

        let table = Expression::Table(vec![(
            Expression::String("k".to_string()),
            Expression::Number(3.0),
        )]);
        assert_eq!(table.to_string(), "map{[\"k\"] = 3}");
    }
}
