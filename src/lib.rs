pub mod ast;
pub mod builder;
pub mod callable;
pub mod class;
pub mod config;
pub mod environment;
pub mod error;
pub mod function;
pub mod interpreter;
pub mod resolver;
pub mod stack;
pub mod token;
pub mod value;

use log::info;

use crate::ast::Stmt;
use crate::error::Result;
use crate::interpreter::Interpreter;
use crate::resolver::Resolver;

/// Resolves `statements` and, if that succeeds, interprets them.
///
/// Static errors abort before anything executes.
pub fn run(interpreter: &mut Interpreter, statements: &[Stmt]) -> Result<()> {
    Resolver::new(interpreter).resolve(statements)?;
    info!("Resolution succeeded, executing");
    interpreter.interpret(statements)?;
    Ok(())
}

/// Decodes a JSON‑serialized statement list produced by an external parser.
pub fn load_program(source: &[u8]) -> Result<Vec<Stmt>> {
    let statements: Vec<Stmt> = serde_json::from_slice(source)?;
    info!("Loaded program with {} top-level statements", statements.len());
    Ok(statements)
}
