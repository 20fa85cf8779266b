//! Static resolver pass for the **Lox** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of `HashMap<&str,bool>` tracking declared/defined).
//! 2. Report static errors (redeclaration, forward‑read in initializer, invalid
//!    `return`, misplaced `this`/`super`, self‑inheritance).
//! 3. Tell the interpreter, for *each* variable occurrence, whether it’s a local
//!    (and at what depth) or a global, so the interpreter never falls back to
//!    dynamic lookup that would see a later shadowing local.
//!
//! The scope stack mirrors the environments the interpreter will create:
//! one per block, one per call for parameters + body, one per bound method
//! (`this`), and one per subclass (`super`). Any drift between the two breaks
//! every hop count, so both sides open scopes in exactly the same places.
//!
//! Hop counts are only handed to the interpreter once the whole program
//! resolved cleanly; a failing pass leaves the interpreter untouched. Nodes
//! that resolve to globals are committed too, clearing any entry an earlier
//! program left under the same id. Within one program every id must be
//! unique.

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::error::ResolveError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// What kind of function body are we in?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// What kind of class body are we in?  Used to validate `this` / `super`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances (locals vs. globals) for the interpreter.
pub struct Resolver<'a, 'interp> {
    interpreter: &'interp mut Interpreter,
    scopes: Vec<HashMap<&'a str, bool>>, // false=declared, true=defined
    resolved: Vec<(ExprId, Option<usize>)>, // None = global
    seen: HashSet<ExprId>,
    current_function: FunctionType,
    current_class: ClassType,
}

impl<'a, 'interp> Resolver<'a, 'interp> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'interp mut Interpreter) -> Self {
        info!("Resolver instantiated");
        Resolver {
            interpreter,
            scopes: Vec::new(),
            resolved: Vec::new(),
            seen: HashSet::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    /// Walk all top‑level statements, then commit the hop counts.
    pub fn resolve(&mut self, statements: &'a [Stmt]) -> Result<(), ResolveError> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );
        self.scopes.clear();
        self.resolved.clear();
        self.seen.clear();
        self.current_function = FunctionType::None;
        self.current_class = ClassType::None;

        for stmt in statements {
            self.resolve_stmt(stmt)?;
        }

        for (id, depth) in self.resolved.drain(..) {
            match depth {
                Some(depth) => self.interpreter.note_local(id, depth),
                None => self.interpreter.forget_local(id),
            }
        }
        info!("Resolve pass completed");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &'a Stmt) -> Result<(), ResolveError> {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                for s in statements {
                    self.resolve_stmt(s)?;
                }
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name)?;
                if let Some(expr) = initializer {
                    self.resolve_expr(expr)?;
                }
                self.define(name);
            }

            Stmt::Function(declaration) => {
                // name is visible *inside* its own body
                self.declare(&declaration.name)?;
                self.define(&declaration.name);
                self.resolve_function(declaration, FunctionType::Function)?;
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods)?,

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr)?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(then_branch)?;
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb)?;
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(body)?;
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    debug!("'return' outside of function at line {}", keyword.line);
                    return Err(ResolveError::ReturnOutsideFunction { line: keyword.line });
                }
                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        return Err(ResolveError::ReturnValueFromInitializer { line: keyword.line });
                    }
                    self.resolve_expr(expr)?;
                }
            }
        }
        Ok(())
    }

    fn resolve_class(
        &mut self,
        name: &'a Token,
        superclass: Option<&'a Expr>,
        methods: &'a [Rc<FunctionDecl>],
    ) -> Result<(), ResolveError> {
        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name)?;
        self.define(name);

        if let Some(superclass) = superclass {
            if let Expr::Variable { name: super_name, .. } = superclass {
                if super_name.lexeme == name.lexeme {
                    return Err(ResolveError::ClassInheritsFromItself {
                        name: super_name.lexeme.clone(),
                        line: super_name.line,
                    });
                }
            }
            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass)?;

            self.begin_scope();
            self.define_synthetic("super");
        }

        self.begin_scope();
        self.define_synthetic("this");

        for method in methods {
            let kind = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, kind)?;
        }

        self.end_scope();
        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &'a Expr) -> Result<(), ResolveError> {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => {
                self.resolve_expr(inner)?;
            }

            Expr::Unary { right, .. } => {
                self.resolve_expr(right)?;
            }

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)?;
            }

            Expr::Variable { id, name } => {
                // Cannot read in own initializer
                if let Some(scope) = self.scopes.last() {
                    if scope.get(name.lexeme.as_str()) == Some(&false) {
                        return Err(ResolveError::CannotReadLocalVariableInInitializer {
                            name: name.lexeme.clone(),
                            line: name.line,
                        });
                    }
                }
                self.resolve_local(*id, name)?;
            }

            Expr::Assign { id, name, value } => {
                // First resolve RHS, then bind LHS
                self.resolve_expr(value)?;
                self.resolve_local(*id, name)?;
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee)?;
                for arg in arguments {
                    self.resolve_expr(arg)?;
                }
            }

            Expr::Get { object, .. } => self.resolve_expr(object)?,

            Expr::Set { object, value, .. } => {
                self.resolve_expr(object)?;
                self.resolve_expr(value)?;
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    return Err(ResolveError::ThisOutsideClass { line: keyword.line });
                }
                self.resolve_local(*id, keyword)?;
            }

            Expr::Super { id, keyword, .. } => {
                match self.current_class {
                    ClassType::None => {
                        return Err(ResolveError::SuperOutsideClass { line: keyword.line });
                    }
                    ClassType::Class => {
                        return Err(ResolveError::SuperWithoutSuperclass { line: keyword.line });
                    }
                    ClassType::Subclass => {}
                }
                self.resolve_local(*id, keyword)?;
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function’s parameters + body.
    fn resolve_function(
        &mut self,
        declaration: &'a FunctionDecl,
        kind: FunctionType,
    ) -> Result<(), ResolveError> {
        let enclosing = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &declaration.params {
            self.declare(param)?;
            self.define(param);
        }
        for stmt in &declaration.body {
            self.resolve_stmt(stmt)?;
        }
        self.end_scope();

        self.current_function = enclosing;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &'a Token) -> Result<(), ResolveError> {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(name.lexeme.as_str()) {
                debug!("'{}' redeclared at line {}", name.lexeme, name.line);
                return Err(ResolveError::DuplicateVariableName {
                    name: name.lexeme.clone(),
                    line: name.line,
                });
            }
            scope.insert(name.lexeme.as_str(), false);
        }
        Ok(())
    }

    fn define(&mut self, name: &'a Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.as_str(), true);
        }
    }

    /// Binds an implicit name (`this`, `super`) in the innermost scope.
    fn define_synthetic(&mut self, name: &'static str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, true);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this occurrence as a local at depth `d` when some scope
    /// declares `name`; otherwise record it as global.
    fn resolve_local(&mut self, id: ExprId, name: &Token) -> Result<(), ResolveError> {
        if !self.seen.insert(id) {
            debug!("Node {} ('{}') appears twice", id, name.lexeme);
            return Err(ResolveError::DuplicateNodeId {
                id: id.0,
                name: name.lexeme.clone(),
                line: name.line,
            });
        }

        // innermost → outermost
        let depth = self
            .scopes
            .iter()
            .rev()
            .position(|scope| scope.contains_key(name.lexeme.as_str()));
        match depth {
            Some(depth) => debug!("Resolved '{}' {} at depth {}", name.lexeme, id, depth),
            None => debug!("Resolved '{}' {} as global", name.lexeme, id),
        }
        self.resolved.push((id, depth));
        Ok(())
    }
}
