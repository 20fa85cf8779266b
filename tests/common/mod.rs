#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::ast::Stmt;
use rox::config::Config;
use rox::error::LoxError;
use rox::interpreter::Interpreter;

/// Output sink the tests can read back after the interpreter wrote to it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.borrow())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An interpreter wired to a captured sink.
pub struct Harness {
    pub interpreter: Interpreter,
    output: SharedBuffer,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        init_logger();
        let output = SharedBuffer::default();
        let interpreter = Interpreter::with_config(config, Box::new(output.clone()));
        Self {
            interpreter,
            output,
        }
    }

    /// Resolves then interprets `program`.
    pub fn run(&mut self, program: &[Stmt]) -> Result<(), LoxError> {
        rox::run(&mut self.interpreter, program)
    }

    pub fn lines(&self) -> Vec<String> {
        self.output.lines()
    }
}

/// Runs `program` on a fresh interpreter, returning the outcome and printed lines.
pub fn run_program(program: &[Stmt]) -> (Result<(), LoxError>, Vec<String>) {
    let mut harness = Harness::new();
    let result = harness.run(program);
    (result, harness.lines())
}

/// Runs `program` and panics with the error text if it fails.
pub fn output_of(program: &[Stmt]) -> Vec<String> {
    let (result, lines) = run_program(program);
    if let Err(e) = result {
        panic!("program failed: {}", e);
    }
    lines
}
