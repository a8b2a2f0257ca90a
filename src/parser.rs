//! Recursive-descent parser with Pratt-style expression precedence.
//!
//! The parser pulls tokens from the lexer (with a one-token pushback slot),
//! builds a [`Script`], and collects every syntax error it can recover from:
//! a failed statement is replaced by [`Statement::Bad`] and `synchronize`
//! advances to a plausible restart point so one pass reports many errors.

use crate::ast::{Block, ClassExpression, Expression, FunctionExpression, Operator, Script, Statement};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

pub mod ast;
mod error;

pub use error::ParseError;

use std::rc::Rc;

type Parsed<T> = Result<T, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
}

fn token_precedence(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Or => Precedence::Or,
        TokenKind::And => Precedence::And,
        TokenKind::Eq | TokenKind::Ne | TokenKind::Is | TokenKind::Isnt => Precedence::Equality,
        TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge => Precedence::Comparison,
        TokenKind::Plus | TokenKind::Minus => Precedence::Term,
        TokenKind::Star | TokenKind::Slash => Precedence::Factor,
        TokenKind::LParen | TokenKind::LBracket | TokenKind::Dot => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

// Class members are introduced by contextual keywords, lexed as identifiers.
const LIT_CONSTRUCTOR: &str = "constructor";
const LIT_PUBLIC: &str = "public";
const LIT_PRIVATE: &str = "private";
const LIT_GET: &str = "get";
const LIT_SET: &str = "set";

pub struct Parser<'a> {
    lexer: &'a mut Lexer,
    current: Token,
    backpack: Option<Token>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: &'a mut Lexer) -> Self {
        let mut parser = Self {
            lexer,
            current: Token::new(TokenKind::Eof, "", 0, 0),
            backpack: None,
            errors: Vec::new(),
        };
        parser.advance();
        parser
    }

    /// Consume the whole token stream. The returned error list being
    /// non-empty means compilation failed, even though a `Script` (with
    /// `Bad` placeholders) is still produced.
    pub fn parse(mut self) -> (Script, Vec<ParseError>) {
        let mut script = Script::default();

        while !self.check(TokenKind::Eof) {
            match self.declaration() {
                Ok(statement) => script.statements.push(statement),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize();
                    script.statements.push(Statement::Bad);
                }
            }
            self.advance();
        }

        (script, self.errors)
    }

    fn declaration(&mut self) -> Parsed<Statement> {
        match self.current.kind {
            TokenKind::Var => {
                let (name, value) = self.var_decl()?;
                Ok(Statement::Declaration { name, value })
            }
            _ => self.statement(),
        }
    }

    fn statement(&mut self) -> Parsed<Statement> {
        match self.current.kind {
            TokenKind::Semicolon => return Ok(Statement::null()),
            TokenKind::LBrace => return Ok(Statement::Block(self.block()?)),
            TokenKind::While => return self.while_stmt(),
            TokenKind::Do => return self.do_stmt(),
            TokenKind::If => return self.if_stmt(),
            TokenKind::Say => return self.say_stmt(),
            TokenKind::Try => return self.try_stmt(),
            TokenKind::Throw => return self.throw_stmt(),
            TokenKind::Return => return self.return_stmt(),
            TokenKind::Break => {
                self.expect(TokenKind::Semicolon)?;
                return Ok(Statement::Break);
            }
            TokenKind::Continue => {
                self.expect(TokenKind::Semicolon)?;
                return Ok(Statement::Continue);
            }
            _ => {}
        }

        let expression = self.expression(Precedence::Lowest)?;
        if self.peek().kind == TokenKind::Assign {
            self.advance();
            return self.assign_stmt(expression);
        }

        self.expect(TokenKind::Semicolon)?;
        Ok(Statement::Expression(expression))
    }

    fn expression(&mut self, precedence: Precedence) -> Parsed<Expression> {
        let mut expression = match self.current.kind {
            TokenKind::LParen => {
                self.advance();
                if self.check(TokenKind::RParen) {
                    return Err(ParseError::at(&self.current, "unexpected ')'"));
                }
                let inner = self.expression(Precedence::Lowest)?;
                self.expect(TokenKind::RParen)?;
                inner
            }

            TokenKind::Class => self.class_lit()?,
            TokenKind::Fun => Expression::Function(self.fun_lit()?),
            TokenKind::Array => self.array_lit()?,
            TokenKind::Map => self.map_lit()?,

            TokenKind::Null => Expression::Null,
            TokenKind::Boolean => Expression::Boolean(self.current.literal == "true"),
            TokenKind::Number => {
                // The lexer only emits digit/dot sequences, so a failure here
                // is an invariant violation, not a user error.
                let value = self
                    .current
                    .literal
                    .parse::<f64>()
                    .expect("lexer produced an unparsable number literal");
                Expression::Number(value)
            }
            TokenKind::String => Expression::String(self.current.literal.clone()),

            TokenKind::Identifier => Expression::Identifier(self.current.literal.clone()),
            TokenKind::This => Expression::This,

            TokenKind::Minus | TokenKind::Plus | TokenKind::Bang => {
                let operator = prefix_operator(self.current.kind);
                self.advance();
                let operand = self.expression(Precedence::Unary)?;
                Expression::Prefix {
                    operator,
                    operand: Box::new(operand),
                }
            }

            TokenKind::Error => {
                return Err(ParseError::at(
                    &self.current,
                    format!("invalid lexeme '{}'", self.current.literal),
                ));
            }
            _ => {
                return Err(ParseError::at(
                    &self.current,
                    format!("unexpected '{}'", self.current.literal),
                ));
            }
        };

        while precedence < self.peek_precedence() {
            self.advance();
            expression = match self.current.kind {
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Lt
                | TokenKind::Le
                | TokenKind::Gt
                | TokenKind::Ge
                | TokenKind::Eq
                | TokenKind::Ne
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Is
                | TokenKind::Isnt => self.infix_expr(expression)?,
                TokenKind::LParen => self.call_expr(expression)?,
                TokenKind::Dot => self.prop_expr(expression)?,
                TokenKind::LBracket => self.index_expr(expression)?,
                _ => {
                    return Err(ParseError::at(
                        &self.current,
                        format!("unexpected '{}'", self.current.literal),
                    ));
                }
            };
        }

        Ok(expression)
    }

    /* == declarations ====================================================== */

    // Also used for class fields, hence the bare pair.
    fn var_decl(&mut self) -> Parsed<(String, Expression)> {
        self.expect(TokenKind::Identifier)?;
        let name = self.current.literal.clone();

        self.advance();
        if self.check(TokenKind::Semicolon) {
            return Ok((name, Expression::Null));
        }
        if self.check(TokenKind::Assign) {
            self.advance();
            let value = self.expression(Precedence::Lowest)?;
            self.expect(TokenKind::Semicolon)?;
            return Ok((name, value));
        }
        Err(ParseError::at(&self.current, "expected ';' or '='"))
    }

    /* == statements ======================================================== */

    fn block(&mut self) -> Parsed<Block> {
        let mut block = Block {
            statements: Vec::new(),
        };

        self.advance();
        while !self.check(TokenKind::RBrace) {
            match self.declaration() {
                Ok(statement) => block.statements.push(statement),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize();
                    block.statements.push(Statement::Bad);
                    if self.check(TokenKind::RBrace) {
                        return Ok(block);
                    }
                }
            }
            self.advance();
            if self.check(TokenKind::Eof) {
                return Err(ParseError::at(&self.current, "expected '}'"));
            }
        }

        Ok(block)
    }

    fn while_stmt(&mut self) -> Parsed<Statement> {
        self.expect(TokenKind::LParen)?;
        self.advance();
        let condition = self.expression(Precedence::Lowest)?;
        self.expect(TokenKind::RParen)?;
        self.advance();
        let body = self.statement()?;
        Ok(Statement::While {
            condition,
            body: Box::new(body),
        })
    }

    fn do_stmt(&mut self) -> Parsed<Statement> {
        self.advance();
        let body = self.statement()?;
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        self.advance();
        let condition = self.expression(Precedence::Lowest)?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Statement::DoWhile {
            body: Box::new(body),
            condition,
        })
    }

    fn if_stmt(&mut self) -> Parsed<Statement> {
        self.expect(TokenKind::LParen)?;
        self.advance();
        let condition = self.expression(Precedence::Lowest)?;
        self.expect(TokenKind::RParen)?;
        self.advance();
        let then = self.statement()?;
        let otherwise = if self.peek().kind == TokenKind::Else {
            self.advance();
            self.advance();
            self.statement()?
        } else {
            Statement::null()
        };
        Ok(Statement::If {
            condition,
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn say_stmt(&mut self) -> Parsed<Statement> {
        self.advance();
        let expression = self.expression(Precedence::Lowest)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Statement::Say(expression))
    }

    fn try_stmt(&mut self) -> Parsed<Statement> {
        self.advance();
        let body = self.statement()?;

        let mut ended = false;
        let (binding, catch) = if self.peek().kind == TokenKind::Catch {
            self.advance();
            self.expect(TokenKind::LParen)?;
            self.expect(TokenKind::Identifier)?;
            let binding = self.current.literal.clone();
            self.expect(TokenKind::RParen)?;
            self.advance();
            ended = true;
            (binding, self.statement()?)
        } else {
            ("_".to_string(), Statement::null())
        };

        let finally = if self.peek().kind == TokenKind::Finally {
            self.advance();
            self.advance();
            ended = true;
            self.statement()?
        } else {
            Statement::null()
        };

        if !ended {
            return Err(ParseError::at(&self.current, "expected 'catch' or 'finally'"));
        }
        Ok(Statement::Try {
            body: Box::new(body),
            binding,
            catch: Box::new(catch),
            finally: Box::new(finally),
        })
    }

    fn throw_stmt(&mut self) -> Parsed<Statement> {
        self.advance();
        let expression = self.expression(Precedence::Lowest)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Statement::Throw(expression))
    }

    fn return_stmt(&mut self) -> Parsed<Statement> {
        self.advance();
        let expression = self.expression(Precedence::Lowest)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Statement::Return(expression))
    }

    fn assign_stmt(&mut self, target: Expression) -> Parsed<Statement> {
        self.advance();
        let value = self.expression(Precedence::Lowest)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Statement::Assignment { target, value })
    }

    /* == expressions ======================================================= */

    fn class_lit(&mut self) -> Parsed<Expression> {
        let mut class = ClassExpression::default();

        self.expect(TokenKind::LBrace)?;
        self.advance();
        while !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::Var) {
                class.fields.push(self.var_decl()?);
            } else if self.current.literal == LIT_CONSTRUCTOR {
                class.constructors.push(self.member_fn()?);
            } else if self.current.literal == LIT_PUBLIC {
                class.public.push(self.member_fn()?);
            } else if self.current.literal == LIT_PRIVATE {
                class.private.push(self.member_fn()?);
            } else if self.current.literal == LIT_GET {
                class.getters.push(self.member_fn()?);
            } else if self.current.literal == LIT_SET {
                class.setters.push(self.member_fn()?);
            } else {
                return Err(ParseError::at(&self.current, "expected method declaration"));
            }
            self.advance();
            if self.check(TokenKind::Eof) {
                return Err(ParseError::at(&self.current, "expected '}'"));
            }
        }

        Ok(Expression::Class(class))
    }

    fn member_fn(&mut self) -> Parsed<(String, Rc<FunctionExpression>)> {
        self.expect(TokenKind::Identifier)?;
        let name = self.current.literal.clone();
        Ok((name, self.fun_lit()?))
    }

    fn fun_lit(&mut self) -> Parsed<Rc<FunctionExpression>> {
        self.expect(TokenKind::LParen)?;
        let parameters = self.parameters()?;
        self.expect(TokenKind::LBrace)?;
        let body = self.block()?;
        Ok(Rc::new(FunctionExpression { parameters, body }))
    }

    fn array_lit(&mut self) -> Parsed<Expression> {
        self.expect(TokenKind::LBrace)?;
        Ok(Expression::Array(self.array_elements()?))
    }

    fn map_lit(&mut self) -> Parsed<Expression> {
        self.expect(TokenKind::LBrace)?;
        Ok(Expression::Table(self.map_pairs()?))
    }

    fn infix_expr(&mut self, left: Expression) -> Parsed<Expression> {
        let operator = infix_operator(self.current.kind);
        let precedence = token_precedence(self.current.kind);
        self.advance();
        let right = self.expression(precedence)?;
        Ok(Expression::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    fn call_expr(&mut self, callee: Expression) -> Parsed<Expression> {
        let arguments = self.arguments()?;
        Ok(Expression::Call {
            callee: Box::new(callee),
            arguments,
        })
    }

    fn prop_expr(&mut self, object: Expression) -> Parsed<Expression> {
        self.expect(TokenKind::Identifier)?;
        Ok(Expression::Property {
            object: Box::new(object),
            name: self.current.literal.clone(),
        })
    }

    // `x[i]` or `x[a:b]`; the opening bracket is the current token.
    fn index_expr(&mut self, object: Expression) -> Parsed<Expression> {
        self.advance();
        let first = self.expression(Precedence::Lowest)?;
        self.advance();
        match self.current.kind {
            TokenKind::RBracket => Ok(Expression::Index {
                object: Box::new(object),
                index: Box::new(first),
            }),
            TokenKind::Colon => {
                self.advance();
                let end = self.expression(Precedence::Lowest)?;
                self.expect(TokenKind::RBracket)?;
                Ok(Expression::Slice {
                    object: Box::new(object),
                    start: Box::new(first),
                    end: Box::new(end),
                })
            }
            _ => Err(ParseError::at(&self.current, "expected ']' or ':'")),
        }
    }

    /* == parse utility ===================================================== */

    fn map_pairs(&mut self) -> Parsed<Vec<(Expression, Expression)>> {
        let mut pairs = Vec::new();
        if self.peek().kind == TokenKind::RBrace {
            self.advance();
            return Ok(pairs);
        }
        loop {
            self.expect(TokenKind::LBracket)?;
            self.advance();
            let key = self.expression(Precedence::Lowest)?;
            self.expect(TokenKind::RBracket)?;
            self.expect(TokenKind::Assign)?;
            self.advance();
            let value = self.expression(Precedence::Lowest)?;
            pairs.push((key, value));
            self.advance();
            if self.check(TokenKind::RBrace) {
                break;
            }
            if !self.check(TokenKind::Comma) {
                return Err(ParseError::at(&self.current, "expected ',' or '}'"));
            }
            if self.peek().kind == TokenKind::RBrace {
                self.advance();
                break;
            }
        }
        Ok(pairs)
    }

    fn array_elements(&mut self) -> Parsed<Vec<Expression>> {
        let mut elements = Vec::new();
        self.advance();
        if self.check(TokenKind::RBrace) {
            return Ok(elements);
        }
        loop {
            elements.push(self.expression(Precedence::Lowest)?);
            self.advance();
            if self.check(TokenKind::RBrace) {
                break;
            }
            if !self.check(TokenKind::Comma) {
                return Err(ParseError::at(&self.current, "expected ',' or '}'"));
            }
            self.advance();
            if self.check(TokenKind::RBrace) {
                break;
            }
        }
        Ok(elements)
    }

    fn arguments(&mut self) -> Parsed<Vec<Expression>> {
        let mut arguments = Vec::new();
        self.advance();
        if self.check(TokenKind::RParen) {
            return Ok(arguments);
        }
        loop {
            arguments.push(self.expression(Precedence::Lowest)?);
            self.advance();
            if self.check(TokenKind::RParen) {
                break;
            }
            if !self.check(TokenKind::Comma) {
                return Err(ParseError::at(&self.current, "expected ',' or ')'"));
            }
            self.advance();
            if self.check(TokenKind::RParen) {
                break;
            }
        }
        Ok(arguments)
    }

    fn parameters(&mut self) -> Parsed<Vec<String>> {
        let mut parameters = Vec::new();
        self.advance();
        if self.check(TokenKind::RParen) {
            return Ok(parameters);
        }
        loop {
            if !self.check(TokenKind::Identifier) {
                return Err(ParseError::at(&self.current, "expected 'identifier'"));
            }
            parameters.push(self.current.literal.clone());
            self.advance();
            if self.check(TokenKind::RParen) {
                break;
            }
            if !self.check(TokenKind::Comma) {
                return Err(ParseError::at(&self.current, "expected ',' or ')'"));
            }
            self.advance();
            if self.check(TokenKind::RParen) {
                break;
            }
        }
        Ok(parameters)
    }

    /* == utility =========================================================== */

    // Advance to a plausible statement boundary after an error: a ';' or '}'
    // on the current token, or just before a token that can begin a
    // statement. Error tokens are skipped without further reports.
    fn synchronize(&mut self) {
        while !self.check(TokenKind::Eof) {
            if self.check(TokenKind::Semicolon) || self.check(TokenKind::RBrace) {
                return;
            }
            match self.peek().kind {
                TokenKind::LBrace
                | TokenKind::Var
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::Say
                | TokenKind::If
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Try => return,
                _ => {}
            }
            self.advance();
        }
    }

    // Advances, then checks the new current token.
    fn expect(&mut self, kind: TokenKind) -> Parsed<()> {
        self.advance();
        if self.check(kind) {
            return Ok(());
        }
        if self.check(TokenKind::Error) {
            return Err(ParseError::at(
                &self.current,
                format!("invalid lexeme '{}'", self.current.literal),
            ));
        }
        Err(ParseError::at(
            &self.current,
            format!("expected '{kind}'"),
        ))
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn peek(&mut self) -> &Token {
        if self.backpack.is_none() {
            self.backpack = Some(self.lexer.next_token());
        }
        self.backpack.as_ref().expect("backpack filled above")
    }

    fn peek_precedence(&mut self) -> Precedence {
        token_precedence(self.peek().kind)
    }

    fn advance(&mut self) {
        self.current = match self.backpack.take() {
            Some(token) => token,
            None => self.lexer.next_token(),
        };
    }
}

fn prefix_operator(kind: TokenKind) -> Operator {
    match kind {
        TokenKind::Plus => Operator::Plus,
        TokenKind::Minus => Operator::Minus,
        TokenKind::Bang => Operator::Not,
        _ => unreachable!("prefix dispatch only matches '+', '-', '!'"),
    }
}

fn infix_operator(kind: TokenKind) -> Operator {
    match kind {
        TokenKind::Plus => Operator::Plus,
        TokenKind::Minus => Operator::Minus,
        TokenKind::Star => Operator::Star,
        TokenKind::Slash => Operator::Slash,
        TokenKind::Eq => Operator::Eq,
        TokenKind::Ne => Operator::Ne,
        TokenKind::Is => Operator::Is,
        TokenKind::Isnt => Operator::Isnt,
        TokenKind::Lt => Operator::Lt,
        TokenKind::Le => Operator::Le,
        TokenKind::Gt => Operator::Gt,
        TokenKind::Ge => Operator::Ge,
        TokenKind::Or => Operator::Or,
        TokenKind::And => Operator::And,
        _ => unreachable!("infix dispatch only matches binary operator tokens"),
    }
}

/// Lex and parse in one step.
pub fn parse_source(source: &str) -> (Script, Vec<ParseError>) {
    let mut lexer = Lexer::new(source);
    Parser::new(&mut lexer).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn parse_ok(source: &str) -> Script {
        let (script, errors) = parse_source(source);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        script
    }

    fn parse_errors(source: &str) -> Vec<ParseError> {
        let (_, errors) = parse_source(source);
        errors
    }

    fn ident(name: &str) -> Expression {
        Expression::Identifier(name.to_string())
    }

    fn num(value: f64) -> Expression {
        Expression::Number(value)
    }

    #[test]
    fn parses_declaration_and_say() {
        let script = parse_ok("var x = 1; say x;");
        assert_eq!(
            script.statements,
            vec![
                Statement::Declaration {
                    name: "x".to_string(),
                    value: num(1.0),
                },
                Statement::Say(ident("x")),
            ]
        );
    }

    #[test]
    fn declaration_without_initializer_defaults_to_null() {
        let script = parse_ok("var x;");
        assert_eq!(
            script.statements,
            vec![Statement::Declaration {
                name: "x".to_string(),
                value: Expression::Null,
            }]
        );
    }

    #[test]
    fn precedence_binds_factor_over_term_over_comparison() {
        let script = parse_ok("say 1 + 2 * 3 < 4;");
        let Statement::Say(expression) = &script.statements[0] else {
            panic!("expected say statement");
        };
        assert_eq!(expression.to_string(), "((1 + (2 * 3)) < 4)");
    }

    #[test]
    fn logical_operators_bind_loosest() {
        let script = parse_ok("say 1 < 2 and 3 == 3 or x;");
        let Statement::Say(expression) = &script.statements[0] else {
            panic!("expected say statement");
        };
        assert_eq!(expression.to_string(), "(((1 < 2) and (3 == 3)) or x)");
    }

    #[test]
    fn identity_operators_parse_at_equality_precedence() {
        let script = parse_ok("say a === b !== c;");
        let Statement::Say(expression) = &script.statements[0] else {
            panic!("expected say statement");
        };
        assert_eq!(expression.to_string(), "((a === b) !== c)");
    }

    #[test]
    fn prefix_operators_bind_tighter_than_infix() {
        let script = parse_ok("say -1 + !x;");
        let Statement::Say(expression) = &script.statements[0] else {
            panic!("expected say statement");
        };
        assert_eq!(expression.to_string(), "((- 1) + (! x))");
    }

    #[test]
    fn parses_postfix_chains() {
        let script = parse_ok("say a.b(1, 2)[0][1:2];");
        let Statement::Say(expression) = &script.statements[0] else {
            panic!("expected say statement");
        };
        assert_eq!(expression.to_string(), "a.b(1, 2)[0][1:2]");
    }

    #[test]
    fn parses_function_literal() {
        let script = parse_ok("var f = fun(a, b) { return a + b; };");
        let Statement::Declaration { value, .. } = &script.statements[0] else {
            panic!("expected declaration");
        };
        let Expression::Function(function) = value else {
            panic!("expected function literal");
        };
        assert_eq!(function.parameters, vec!["a", "b"]);
        assert_eq!(function.body.statements.len(), 1);
    }

    #[test]
    fn parses_class_literal_members() {
        let source = indoc! {r#"
            var c = class {
                var x = 0;
                constructor new(a) { this.x = a; }
                public get_x() { return this.x; }
                private helper() { return 1; }
                get size() { return this.x; }
                set size(v) { this.x = v; }
            };
        "#};
        let script = parse_ok(source);
        let Statement::Declaration { value, .. } = &script.statements[0] else {
            panic!("expected declaration");
        };
        let Expression::Class(class) = value else {
            panic!("expected class literal");
        };
        assert_eq!(class.fields.len(), 1);
        assert_eq!(class.constructors[0].0, "new");
        assert_eq!(class.public[0].0, "get_x");
        assert_eq!(class.private[0].0, "helper");
        assert_eq!(class.getters[0].0, "size");
        assert_eq!(class.setters[0].0, "size");
    }

    #[test]
    fn parses_array_and_map_literals_with_trailing_commas() {
        let script = parse_ok(r#"var a = array{1, 2,}; var m = map{["k"] = 1, [2] = true,}; var e = array{}; var n = map{};"#);
        let Statement::Declaration { value, .. } = &script.statements[0] else {
            panic!("expected declaration");
        };
        assert_eq!(value, &Expression::Array(vec![num(1.0), num(2.0)]));
        let Statement::Declaration { value, .. } = &script.statements[1] else {
            panic!("expected declaration");
        };
        assert_eq!(
            value,
            &Expression::Table(vec![
                (Expression::String("k".to_string()), num(1.0)),
                (num(2.0), Expression::Boolean(true)),
            ])
        );
        let Statement::Declaration { value, .. } = &script.statements[2] else {
            panic!("expected declaration");
        };
        assert_eq!(value, &Expression::Array(vec![]));
        let Statement::Declaration { value, .. } = &script.statements[3] else {
            panic!("expected declaration");
        };
        assert_eq!(value, &Expression::Table(vec![]));
    }

    #[test]
    fn parses_control_flow_statements() {
        let source = indoc! {r#"
            if (x) say 1; else { say 2; }
            while (x < 3) { x = x + 1; }
            do { x = x - 1; } while (0 < x);
        "#};
        let script = parse_ok(source);
        assert!(matches!(script.statements[0], Statement::If { .. }));
        assert!(matches!(script.statements[1], Statement::While { .. }));
        assert!(matches!(script.statements[2], Statement::DoWhile { .. }));
    }

    #[test]
    fn if_without_else_gets_a_null_arm() {
        let script = parse_ok("if (x) say 1;");
        let Statement::If { otherwise, .. } = &script.statements[0] else {
            panic!("expected if statement");
        };
        assert_eq!(**otherwise, Statement::null());
    }

    #[test]
    fn parses_try_catch_finally_forms() {
        let script = parse_ok("try { throw 1; } catch (e) { say e; } finally { say 2; }");
        let Statement::Try { binding, .. } = &script.statements[0] else {
            panic!("expected try statement");
        };
        assert_eq!(binding, "e");

        let script = parse_ok("try { say 1; } finally { say 2; }");
        let Statement::Try { binding, catch, .. } = &script.statements[0] else {
            panic!("expected try statement");
        };
        assert_eq!(binding, "_");
        assert_eq!(**catch, Statement::null());
    }

    #[test]
    fn try_requires_catch_or_finally() {
        let errors = parse_errors("try { say 1; }");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("expected 'catch' or 'finally'"));
    }

    #[test]
    fn parses_assignment_targets() {
        let script = parse_ok("x = 1; this.f = 2; a[0] = 3; p.size = 4;");
        assert_eq!(script.statements.len(), 4);
        for statement in &script.statements {
            assert!(matches!(statement, Statement::Assignment { .. }));
        }
    }

    #[test]
    fn reports_multiple_errors_with_bad_placeholders() {
        let (script, errors) = parse_source("var x 1; say 2; var = 3; say 4;");
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("expected ';' or '='"));
        assert_eq!(
            script
                .statements
                .iter()
                .filter(|s| matches!(s, Statement::Bad))
                .count(),
            2
        );
        assert!(script.statements.contains(&Statement::Say(num(2.0))));
        assert!(script.statements.contains(&Statement::Say(num(4.0))));
    }

    #[test]
    fn reports_error_positions() {
        let errors = parse_errors("say 1\nsay 2;");
        assert_eq!(errors.len(), 1);
        assert_eq!((errors[0].line, errors[0].column), (2, 1));
        assert!(errors[0].message.contains("expected ';'"));
    }

    #[test]
    fn reports_invalid_lexemes() {
        let errors = parse_errors("say \"abc\nsay 2;");
        assert!(!errors.is_empty());
        assert!(errors[0].message.contains("invalid lexeme"));

        let errors = parse_errors("say 1 /* never closed");
        assert!(errors.iter().any(|e| e.message.contains("invalid lexeme '/*...'")));
    }

    #[test]
    fn empty_parens_are_rejected() {
        let errors = parse_errors("say ();");
        assert!(errors[0].message.contains("unexpected ')'"));
    }

    #[test]
    fn unclosed_block_is_an_error() {
        let errors = parse_errors("{ say 1;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("expected '}'"));
    }

    #[test]
    fn backtick_identifiers_parse_like_plain_ones() {
        let script = parse_ok("var `my var` = 1; say `my var`;");
        assert_eq!(
            script.statements[0],
            Statement::Declaration {
                name: "my var".to_string(),
                value: num(1.0),
            }
        );
    }
}
