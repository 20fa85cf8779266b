//! Syntax trees consumed by the resolver and the interpreter.
//!
//! Trees are produced once by an external parser (or by
//! [`AstBuilder`](crate::builder::AstBuilder)) and are read‑only afterwards.
//! Nodes whose binding the resolver records carry an [`ExprId`]; the
//! resolution result lives in a side‑table keyed by that id, never in the
//! tree itself, so two textually identical references in different scopes
//! keep distinct hop counts.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::token::{Literal, Token};

/// Stable identity of an expression node, assigned at tree‑construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExprId(pub u32);

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// **Abstract‑Syntax‑Tree node** representing every kind of *expression*.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(Literal),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Prefix unary operator expression
    /// *Example:* `!isReady` or `-42`
    Unary {
        /// The operator token (`!` or `-`).
        operator: Token,
        right: Box<Expr>,
    },

    /// Infix binary operator expression
    /// *Example:* `a + b`, `x <= y`
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token, // `AND` or `OR`
        right: Box<Expr>,
    },

    /// Variable access.
    Variable { id: ExprId, name: Token },

    /// Assignment expression: `identifier "=" expression`
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Function‑, method‑ or constructor‑call expression.
    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// object.property
    Get { object: Box<Expr>, name: Token },

    /// object.property = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The `this` keyword inside a method.
    This { id: ExprId, keyword: Token },

    /// `super.method` inside a subclass method.
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },
}

impl Expr {
    /// Source line of the token most closely associated with this node.
    pub fn line(&self) -> usize {
        match self {
            Expr::Literal(_) => 0,
            Expr::Grouping(inner) => inner.line(),
            Expr::Unary { operator, .. } => operator.line,
            Expr::Binary { operator, .. } => operator.line,
            Expr::Logical { operator, .. } => operator.line,
            Expr::Variable { name, .. } => name.line,
            Expr::Assign { name, .. } => name.line,
            Expr::Call { paren, .. } => paren.line,
            Expr::Get { name, .. } => name.line,
            Expr::Set { name, .. } => name.line,
            Expr::This { keyword, .. } => keyword.line,
            Expr::Super { keyword, .. } => keyword.line,
        }
    }
}

/// A named function or method declaration.
///
/// Shared behind an `Rc` so every closure created from it points at the same
/// body instead of copying the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

/// **Abstract‑Syntax‑Tree node** for *statements*.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement used for output.
    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    /// `if` / `else` conditional.
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop. `for` loops arrive already desugared into this form.
    While { condition: Expr, body: Box<Stmt> },

    /// `fun name(params) { body }`
    Function(Rc<FunctionDecl>),

    /// `return expr?;`
    Return { keyword: Token, value: Option<Expr> },

    /// `class Name (< Super)? { methods }`
    Class {
        name: Token,
        /// Always an [`Expr::Variable`] when present.
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
