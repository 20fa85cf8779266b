use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::callable::Callable;
use crate::class::InstanceRef;
use crate::environment::{self, EnvRef, Environment};
use crate::error::RuntimeError;
use crate::interpreter::{Flow, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// A user function paired with the environment it was declared in.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn is_initializer(&self) -> bool {
        self.is_initializer
    }

    /// A copy of this method whose closure is a fresh scope binding `this`
    /// to `instance`. The original closure is left untouched.
    pub fn bind(&self, instance: &InstanceRef) -> Result<LoxFunction, RuntimeError> {
        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));
        environment.define_str(
            "this",
            self.declaration.name.line,
            Value::Instance(Rc::clone(instance)),
        )?;
        Ok(LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: environment.into_ref(),
            is_initializer: self.is_initializer,
        })
    }
}

impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.name())
            .field("arity", &self.declaration.params.len())
            .field("is_initializer", &self.is_initializer)
            .finish()
    }
}

impl Callable for LoxFunction {
    fn name(&self) -> &str {
        LoxFunction::name(self)
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value, RuntimeError> {
        debug!("Calling user-defined function '{}'", self.name());
        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            debug!("Binding parameter '{}' to {}", param.lexeme, argument);
            environment.define(param, argument)?;
        }

        let flow = interpreter.execute_block(&self.declaration.body, environment.into_ref())?;

        if self.is_initializer {
            return environment::get_at(&self.closure, 0, "this", paren.line);
        }

        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}
