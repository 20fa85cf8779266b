//! Tree‑walking evaluator.
//!
//! The interpreter keeps exactly one *current* environment. Blocks and calls
//! swap in a child scope through [`Interpreter::execute_block`], which puts
//! the previous scope back on every exit path (normal completion, `return`,
//! or error). Variable accesses use the hop counts recorded by the
//! [`Resolver`](crate::resolver::Resolver); nodes without one are globals.

use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, Stmt};
use crate::callable::natives;
use crate::class::{LoxClass, LoxInstance};
use crate::config::Config;
use crate::environment::{self, EnvRef, Environment};
use crate::error::RuntimeError;
use crate::function::LoxFunction;
use crate::stack;
use crate::token::{Literal, Token, TokenType};
use crate::value::{format_number, Value};

/// Outcome of executing a statement.
///
/// `Return` travels up through enclosing blocks and loops until the nearest
/// function call consumes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Convenient alias for interpreter results.
pub type IResult<T> = Result<T, RuntimeError>;

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    locals: HashMap<ExprId, usize>,
    output: Box<dyn Write>,
    config: Config,
    call_depth: usize,
}

impl Interpreter {
    /// Creates an interpreter printing to stdout, with natives such as
    /// `clock` defined in the global scope.
    pub fn new() -> Self {
        Self::with_config(Config::default(), Box::new(io::stdout()))
    }

    /// Creates an interpreter printing to `output`.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        Self::with_config(Config::default(), output)
    }

    pub fn with_config(config: Config, output: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter with {:?}", config);

        let globals = Environment::with_natives(natives()).into_ref();

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
            config,
            call_depth: 0,
        }
    }

    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Records that the node `id` refers to a binding `depth` scopes out.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        debug!("Noting local {} at depth {}", id, depth);
        self.locals.insert(id, depth);
    }

    /// Drops any hop count recorded for `id`, marking it global.
    pub fn forget_local(&mut self, id: ExprId) {
        self.locals.remove(&id);
    }

    /// Hop count recorded for `id`; `None` means global.
    pub fn local_depth(&self, id: ExprId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    /// The full resolution side‑table.
    pub fn locals(&self) -> &HashMap<ExprId, usize> {
        &self.locals
    }

    /// Interprets a list of statements (a "program") in the global scope.
    pub fn interpret(&mut self, statements: &[Stmt]) -> IResult<()> {
        info!("Interpreting {} statements", statements.len());
        for stmt in statements {
            self.execute(stmt)?;
        }
        self.output.flush()?;
        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Runs `statements` with `environment` as the current scope, restoring
    /// the caller's scope afterwards whatever the outcome.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> IResult<Flow> {
        let previous = mem::replace(&mut self.environment, environment);
        let result = self.execute_all(statements);
        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> IResult<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> IResult<Flow> {
        stack::ensure_sufficient_stack(|| self.execute_stmt(stmt))
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> IResult<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(name, value)?;
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                debug!("Entering block with {} statements", statements.len());
                let scope = Environment::with_enclosing(Rc::clone(&self.environment)).into_ref();
                self.execute_block(statements, scope)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);
                let function =
                    LoxFunction::new(Rc::clone(declaration), Rc::clone(&self.environment), false);
                self.environment
                    .borrow_mut()
                    .define(&declaration.name, Value::Function(Rc::new(function)))?;
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                debug!("Declaring class '{}'", name.lexeme);
                let superclass = match superclass {
                    Some(expr) => match self.evaluate(expr)? {
                        Value::Class(class) => Some(class),
                        other => {
                            debug!("Superclass of '{}' is a {}", name.lexeme, other.type_name());
                            return Err(RuntimeError::SuperClassMustBeAClass {
                                name: name.lexeme.clone(),
                                line: name.line,
                            });
                        }
                    },
                    None => None,
                };

                self.environment.borrow_mut().define(name, Value::Nil)?;

                // Methods of a subclass close over a scope that binds `super`.
                let method_scope = match &superclass {
                    Some(superclass) => {
                        let mut scope = Environment::with_enclosing(Rc::clone(&self.environment));
                        scope.define_str("super", name.line, Value::Class(Rc::clone(superclass)))?;
                        scope.into_ref()
                    }
                    None => Rc::clone(&self.environment),
                };

                let methods = methods
                    .iter()
                    .map(|method| {
                        let is_initializer = method.name.lexeme == "init";
                        let function =
                            LoxFunction::new(Rc::clone(method), Rc::clone(&method_scope), is_initializer);
                        (method.name.lexeme.clone(), Rc::new(function))
                    })
                    .collect::<HashMap<_, _>>();

                let class = LoxClass::new(name.lexeme.clone(), superclass, methods);
                self.environment
                    .borrow_mut()
                    .assign(name, Value::Class(Rc::new(class)))?;
                info!("Class '{}' defined", name.lexeme);
                Ok(Flow::Normal)
            }
        }
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        stack::ensure_sufficient_stack(|| self.evaluate_expr(expr))
    }

    fn evaluate_expr(&mut self, expr: &Expr) -> IResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(literal_value(literal)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                self.evaluate_unary(operator, right)
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                evaluate_binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                match operator.token_type {
                    TokenType::OR if is_truthy(&left) => Ok(left),
                    TokenType::AND if !is_truthy(&left) => Ok(left),
                    TokenType::OR | TokenType::AND => self.evaluate(right),
                    _ => Err(unsupported(operator)),
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                match self.local_depth(*id) {
                    Some(depth) => environment::assign_at(&self.environment, depth, name, value.clone())?,
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }
                debug!("Assigned value {} to '{}'", value, name.lexeme);
                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }
                self.call_value(&callee, values, paren)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(RuntimeError::OnlyInstancesCanHaveProperty {
                    name: name.lexeme.clone(),
                    line: name.line,
                }),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(RuntimeError::OnlyInstancesCanHaveFields {
                        name: name.lexeme.clone(),
                        line: name.line,
                    });
                };
                let value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());
                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_unary(&self, operator: &Token, right: Value) -> IResult<Value> {
        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::OperandMustBeANumber {
                    operator: operator.lexeme.clone(),
                    line: operator.line,
                }),
            },
            TokenType::BANG => Ok(Value::Bool(!is_truthy(&right))),
            _ => Err(unsupported(operator)),
        }
    }

    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> IResult<Value> {
        let unresolved = || RuntimeError::UndefinedVariable {
            name: keyword.lexeme.clone(),
            line: keyword.line,
        };
        let depth = self.local_depth(id).ok_or_else(unresolved)?;
        let Value::Class(superclass) = environment::get_at(&self.environment, depth, "super", keyword.line)? else {
            return Err(unresolved());
        };
        // `this` lives in the scope just inside the one binding `super`.
        let this_depth = depth.checked_sub(1).ok_or_else(unresolved)?;
        let Value::Instance(object) = environment::get_at(&self.environment, this_depth, "this", keyword.line)? else {
            return Err(unresolved());
        };

        let function = superclass
            .find_method(&method.lexeme)
            .ok_or_else(|| RuntimeError::UndefinedProperty {
                name: method.lexeme.clone(),
                line: method.line,
            })?;
        Ok(Value::Function(Rc::new(function.bind(&object)?)))
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> IResult<Value> {
        match self.local_depth(id) {
            Some(depth) => environment::get_at(&self.environment, depth, &name.lexeme, name.line),
            None => self.globals.borrow().get(name),
        }
    }

    /// Checks the callable capability and arity, then invokes `callee`.
    fn call_value(&mut self, callee: &Value, arguments: Vec<Value>, paren: &Token) -> IResult<Value> {
        let Some(callable) = callee.as_callable() else {
            debug!("Attempted to call a {}", callee.type_name());
            return Err(RuntimeError::FunctionCallIsNotSupportedHere {
                callee: callee.to_string(),
                line: paren.line,
            });
        };

        if arguments.len() != callable.arity() {
            return Err(RuntimeError::UnmatchedFunctionArguments {
                expected: callable.arity(),
                actual: arguments.len(),
                line: paren.line,
            });
        }

        if self.call_depth >= self.config.max_call_depth {
            debug!("Call depth {} reached calling '{}'", self.call_depth, callable.name());
            return Err(RuntimeError::StackOverflow {
                name: callable.name().to_string(),
                line: paren.line,
            });
        }

        self.call_depth += 1;
        let result = callable.call(self, arguments, paren);
        self.call_depth -= 1;

        if let Ok(value) = &result {
            debug!("'{}' returned: {}", callable.name(), value);
        }
        result
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Number(n) => Value::Number(*n),
        Literal::Str(s) => Value::string(s),
        Literal::True => Value::Bool(true),
        Literal::False => Value::Bool(false),
        Literal::Nil => Value::Nil,
    }
}

/// Evaluates a binary operator over already‑evaluated operands.
fn evaluate_binary(operator: &Token, left: Value, right: Value) -> IResult<Value> {
    match operator.token_type {
        TokenType::PLUS => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{}{}", a, b))),
            (Value::Number(a), Value::String(b)) => {
                Ok(Value::string(format!("{}{}", format_number(a), b)))
            }
            (Value::String(a), Value::Number(b)) => {
                Ok(Value::string(format!("{}{}", a, format_number(b))))
            }
            _ => Err(RuntimeError::OperandMustBeANumberOrString {
                operator: operator.lexeme.clone(),
                line: operator.line,
            }),
        },
        TokenType::MINUS => numbers(operator, left, right).map(|(a, b)| Value::Number(a - b)),
        TokenType::STAR => numbers(operator, left, right).map(|(a, b)| Value::Number(a * b)),
        TokenType::SLASH => numbers(operator, left, right).map(|(a, b)| Value::Number(a / b)),
        TokenType::GREATER => numbers(operator, left, right).map(|(a, b)| Value::Bool(a > b)),
        TokenType::GREATER_EQUAL => numbers(operator, left, right).map(|(a, b)| Value::Bool(a >= b)),
        TokenType::LESS => numbers(operator, left, right).map(|(a, b)| Value::Bool(a < b)),
        TokenType::LESS_EQUAL => numbers(operator, left, right).map(|(a, b)| Value::Bool(a <= b)),
        TokenType::EQUAL_EQUAL => Ok(Value::Bool(is_equal(&left, &right))),
        TokenType::BANG_EQUAL => Ok(Value::Bool(!is_equal(&left, &right))),
        _ => Err(unsupported(operator)),
    }
}

fn numbers(operator: &Token, left: Value, right: Value) -> IResult<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),
        (left, right) => {
            debug!(
                "Operator '{}' applied to {} and {}",
                operator.lexeme,
                left.type_name(),
                right.type_name()
            );
            Err(RuntimeError::OperandMustBeANumber {
                operator: operator.lexeme.clone(),
                line: operator.line,
            })
        }
    }
}

fn unsupported(operator: &Token) -> RuntimeError {
    RuntimeError::UnsupportedOperator {
        operator: operator.lexeme.clone(),
        line: operator.line,
    }
}

/// Only `false` is falsy.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Bool(false))
}

pub fn is_equal(left: &Value, right: &Value) -> bool {
    left == right
}
