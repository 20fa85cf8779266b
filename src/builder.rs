//! Programmatic construction of syntax trees.
//!
//! A parser (or a test) owns one [`AstBuilder`] per program: it hands out a
//! fresh [`ExprId`] to every node the resolver annotates and stamps each
//! token with the builder's current source line. Every method takes `&self`
//! so calls nest freely: `b.binary(b.var("a"), TokenType::PLUS, b.number(1.0))`.
//!
//! Ids come from one process-wide counter, so trees from different builders
//! can share an interpreter (one program per REPL line, say) without their
//! resolution entries colliding.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use log::debug;

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::token::{Literal, Token, TokenType};

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(0);

#[derive(Debug)]
pub struct AstBuilder {
    line: Cell<usize>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self { line: Cell::new(1) }
    }

    /// Sets the source line stamped onto subsequently built tokens.
    pub fn at_line(&self, line: usize) -> &Self {
        self.line.set(line);
        self
    }

    pub fn current_line(&self) -> usize {
        self.line.get()
    }

    /// Allocates the next node id; never repeats within a process.
    pub fn next_id(&self) -> ExprId {
        ExprId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tokens
    // ─────────────────────────────────────────────────────────────────────────

    pub fn token(&self, token_type: TokenType, lexeme: &str) -> Token {
        Token::new(token_type, lexeme, self.line.get())
    }

    pub fn ident(&self, name: &str) -> Token {
        self.token(TokenType::IDENTIFIER, name)
    }

    fn operator(&self, token_type: TokenType) -> Token {
        let lexeme = match token_type {
            TokenType::PLUS => "+",
            TokenType::MINUS => "-",
            TokenType::STAR => "*",
            TokenType::SLASH => "/",
            TokenType::BANG => "!",
            TokenType::BANG_EQUAL => "!=",
            TokenType::EQUAL_EQUAL => "==",
            TokenType::GREATER => ">",
            TokenType::GREATER_EQUAL => ">=",
            TokenType::LESS => "<",
            TokenType::LESS_EQUAL => "<=",
            TokenType::AND => "and",
            TokenType::OR => "or",
            other => other.name(),
        };
        self.token(token_type, lexeme)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn number(&self, n: f64) -> Expr {
        Expr::Literal(Literal::Number(n))
    }

    pub fn string(&self, s: &str) -> Expr {
        Expr::Literal(Literal::Str(s.to_string()))
    }

    pub fn boolean(&self, b: bool) -> Expr {
        Expr::Literal(if b { Literal::True } else { Literal::False })
    }

    pub fn nil(&self) -> Expr {
        Expr::Literal(Literal::Nil)
    }

    pub fn grouping(&self, inner: Expr) -> Expr {
        Expr::Grouping(Box::new(inner))
    }

    pub fn unary(&self, operator: TokenType, right: Expr) -> Expr {
        Expr::Unary {
            operator: self.operator(operator),
            right: Box::new(right),
        }
    }

    pub fn binary(&self, left: Expr, operator: TokenType, right: Expr) -> Expr {
        Expr::Binary {
            left: Box::new(left),
            operator: self.operator(operator),
            right: Box::new(right),
        }
    }

    pub fn logical(&self, left: Expr, operator: TokenType, right: Expr) -> Expr {
        Expr::Logical {
            left: Box::new(left),
            operator: self.operator(operator),
            right: Box::new(right),
        }
    }

    pub fn var(&self, name: &str) -> Expr {
        Expr::Variable {
            id: self.next_id(),
            name: self.ident(name),
        }
    }

    pub fn assign(&self, name: &str, value: Expr) -> Expr {
        Expr::Assign {
            id: self.next_id(),
            name: self.ident(name),
            value: Box::new(value),
        }
    }

    pub fn call(&self, callee: Expr, arguments: Vec<Expr>) -> Expr {
        Expr::Call {
            callee: Box::new(callee),
            paren: self.token(TokenType::RIGHT_PAREN, ")"),
            arguments,
        }
    }

    pub fn get(&self, object: Expr, name: &str) -> Expr {
        Expr::Get {
            object: Box::new(object),
            name: self.ident(name),
        }
    }

    pub fn set(&self, object: Expr, name: &str, value: Expr) -> Expr {
        Expr::Set {
            object: Box::new(object),
            name: self.ident(name),
            value: Box::new(value),
        }
    }

    pub fn this(&self) -> Expr {
        Expr::This {
            id: self.next_id(),
            keyword: self.token(TokenType::THIS, "this"),
        }
    }

    pub fn super_method(&self, method: &str) -> Expr {
        Expr::Super {
            id: self.next_id(),
            keyword: self.token(TokenType::SUPER, "super"),
            method: self.ident(method),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    pub fn expression(&self, expr: Expr) -> Stmt {
        Stmt::Expression(expr)
    }

    pub fn print(&self, expr: Expr) -> Stmt {
        Stmt::Print(expr)
    }

    pub fn var_decl(&self, name: &str, initializer: Option<Expr>) -> Stmt {
        Stmt::Var {
            name: self.ident(name),
            initializer,
        }
    }

    pub fn block(&self, statements: Vec<Stmt>) -> Stmt {
        Stmt::Block(statements)
    }

    pub fn if_stmt(&self, condition: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
        Stmt::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        }
    }

    pub fn while_stmt(&self, condition: Expr, body: Stmt) -> Stmt {
        Stmt::While {
            condition,
            body: Box::new(body),
        }
    }

    /// Builds a function declaration node usable as a method.
    pub fn method(&self, name: &str, params: &[&str], body: Vec<Stmt>) -> Rc<FunctionDecl> {
        Rc::new(FunctionDecl {
            name: self.ident(name),
            params: params.iter().map(|p| self.ident(p)).collect(),
            body,
        })
    }

    pub fn function(&self, name: &str, params: &[&str], body: Vec<Stmt>) -> Stmt {
        Stmt::Function(self.method(name, params, body))
    }

    pub fn return_stmt(&self, value: Option<Expr>) -> Stmt {
        Stmt::Return {
            keyword: self.token(TokenType::RETURN, "return"),
            value,
        }
    }

    pub fn class(
        &self,
        name: &str,
        superclass: Option<&str>,
        methods: Vec<Rc<FunctionDecl>>,
    ) -> Stmt {
        debug!("Building class '{}' at line {}", name, self.line.get());
        let superclass = superclass.map(|s| self.var(s));
        Stmt::Class {
            name: self.ident(name),
            superclass,
            methods,
        }
    }
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}
