//! Centralised error hierarchy for the **Lox interpreter core**.
//!
//! Two disjoint families exist:
//!
//! * [`ResolveError`] ‑ static failures found by the resolver pass. Any of
//!   them aborts resolution before a single statement executes.
//! * [`RuntimeError`] ‑ dynamic failures raised while evaluating. They unwind
//!   to the caller of [`Interpreter::interpret`](crate::interpreter::Interpreter::interpret).
//!
//! Both carry the offending lexeme and 1‑based source line. [`LoxError`]
//! wraps them (plus I/O and program decoding failures) for the driver.
//!
//! The module **does not** print diagnostics itself

use std::io;
use thiserror::Error;

/// Static (resolution‑time) error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// Two declarations of one name inside a single local scope.
    #[error("[line {line}] Error at '{name}': Already a variable with this name in this scope.")]
    DuplicateVariableName { name: String, line: usize },

    /// `var a = a;` inside a local scope.
    #[error("[line {line}] Error at '{name}': Can't read local variable in its own initializer.")]
    CannotReadLocalVariableInInitializer { name: String, line: usize },

    /// `return` outside any function body.
    #[error("[line {line}] Error at 'return': Can't return from top-level code.")]
    ReturnOutsideFunction { line: usize },

    /// `return <value>` inside an `init` method.
    #[error("[line {line}] Error at 'return': Can't return a value from an initializer.")]
    ReturnValueFromInitializer { line: usize },

    #[error("[line {line}] Error at 'this': Can't use 'this' outside of a class.")]
    ThisOutsideClass { line: usize },

    #[error("[line {line}] Error at 'super': Can't use 'super' outside of a class.")]
    SuperOutsideClass { line: usize },

    #[error("[line {line}] Error at 'super': Can't use 'super' in a class with no superclass.")]
    SuperWithoutSuperclass { line: usize },

    #[error("[line {line}] Error at '{name}': A class can't inherit from itself.")]
    ClassInheritsFromItself { name: String, line: usize },

    /// Two nodes of one program share an [`ExprId`](crate::ast::ExprId).
    #[error("[line {line}] Error at '{name}': Node id #{id} is used more than once.")]
    DuplicateNodeId { id: u32, name: String, line: usize },
}

impl ResolveError {
    /// 1‑based line the error points at.
    pub fn line(&self) -> usize {
        match self {
            ResolveError::DuplicateVariableName { line, .. }
            | ResolveError::CannotReadLocalVariableInInitializer { line, .. }
            | ResolveError::ReturnOutsideFunction { line }
            | ResolveError::ReturnValueFromInitializer { line }
            | ResolveError::ThisOutsideClass { line }
            | ResolveError::SuperOutsideClass { line }
            | ResolveError::SuperWithoutSuperclass { line }
            | ResolveError::ClassInheritsFromItself { line, .. }
            | ResolveError::DuplicateNodeId { line, .. } => *line,
        }
    }
}

/// Dynamic (evaluation‑time) error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'.\n[line {line}]")]
    UndefinedVariable { name: String, line: usize },

    /// `define` of a name that already exists in the same environment.
    #[error("Variable '{name}' is already defined in this scope.\n[line {line}]")]
    DuplicateVariableName { name: String, line: usize },

    #[error("Operand must be a number.\n[line {line}]")]
    OperandMustBeANumber { operator: String, line: usize },

    #[error("Operands must be numbers or strings.\n[line {line}]")]
    OperandMustBeANumberOrString { operator: String, line: usize },

    /// An operator tag the evaluator has no rule for (malformed tree).
    #[error("Unsupported operator '{operator}'.\n[line {line}]")]
    UnsupportedOperator { operator: String, line: usize },

    /// `callee` is the display form of the value that was called.
    #[error("Can only call functions and classes.\n[line {line}]")]
    FunctionCallIsNotSupportedHere { callee: String, line: usize },

    #[error("Expected {expected} arguments but got {actual}.\n[line {line}]")]
    UnmatchedFunctionArguments {
        expected: usize,
        actual: usize,
        line: usize,
    },

    #[error("Superclass must be a class.\n[line {line}]")]
    SuperClassMustBeAClass { name: String, line: usize },

    #[error("Only instances have properties.\n[line {line}]")]
    OnlyInstancesCanHaveProperty { name: String, line: usize },

    #[error("Only instances have fields.\n[line {line}]")]
    OnlyInstancesCanHaveFields { name: String, line: usize },

    #[error("Undefined property '{name}'.\n[line {line}]")]
    UndefinedProperty { name: String, line: usize },

    /// Call nesting exceeded [`Config::max_call_depth`](crate::config::Config).
    #[error("Stack overflow.\n[line {line}]")]
    StackOverflow { name: String, line: usize },

    /// Failure reported by a native function.
    #[error("Native function '{name}' failed: {message}\n[line {line}]")]
    Native {
        name: String,
        message: String,
        line: usize,
    },

    /// The output sink rejected a `print`.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RuntimeError {
    /// 1‑based line the error points at, when it originates from the program.
    pub fn line(&self) -> Option<usize> {
        match self {
            RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::DuplicateVariableName { line, .. }
            | RuntimeError::OperandMustBeANumber { line, .. }
            | RuntimeError::OperandMustBeANumberOrString { line, .. }
            | RuntimeError::UnsupportedOperator { line, .. }
            | RuntimeError::FunctionCallIsNotSupportedHere { line, .. }
            | RuntimeError::UnmatchedFunctionArguments { line, .. }
            | RuntimeError::SuperClassMustBeAClass { line, .. }
            | RuntimeError::OnlyInstancesCanHaveProperty { line, .. }
            | RuntimeError::OnlyInstancesCanHaveFields { line, .. }
            | RuntimeError::UndefinedProperty { line, .. }
            | RuntimeError::StackOverflow { line, .. }
            | RuntimeError::Native { line, .. } => Some(*line),
            RuntimeError::Io(_) => None,
        }
    }
}

/// Canonical error type handed to the driver.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Static‑analysis failure.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Runtime evaluation error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A serialized program that does not decode into a statement list.
    #[error("Malformed program: {0}")]
    Program(#[from] serde_json::Error),
}

impl LoxError {
    /// Process exit code the driver reports for this error (sysexits style).
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Resolve(_) | LoxError::Program(_) => 65,
            LoxError::Runtime(_) => 70,
            LoxError::Io(_) => 74,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
