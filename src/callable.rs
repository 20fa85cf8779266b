//! The callable capability shared by functions, classes and natives.

use std::fmt;

use chrono::Utc;
use log::{debug, info};

use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// Anything invocable with a fixed arity.
///
/// The interpreter checks `arguments.len() == arity()` before calling
/// [`call`](Callable::call), so implementations may rely on it.
pub trait Callable {
    fn name(&self) -> &str;

    fn arity(&self) -> usize;

    /// `paren` is the call site's closing parenthesis, used for error lines.
    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value, RuntimeError>;
}

/// Host-implemented function exposed in the global scope.
pub struct NativeFunction {
    name: &'static str,
    arity: usize,
    func: fn(&[Value]) -> Result<Value, String>,
}

impl NativeFunction {
    pub fn new(name: &'static str, arity: usize, func: fn(&[Value]) -> Result<Value, String>) -> Self {
        Self { name, arity, func }
    }

    pub fn native_name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl Callable for NativeFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        _interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value, RuntimeError> {
        debug!("Calling native function '{}'", self.name);
        let result = (self.func)(&arguments).map_err(|message| RuntimeError::Native {
            name: self.name.to_string(),
            message,
            line: paren.line,
        })?;
        info!("Native function '{}' returned: {}", self.name, result);
        Ok(result)
    }
}

/// Seconds since the Unix epoch, with millisecond precision.
fn clock(_arguments: &[Value]) -> Result<Value, String> {
    let millis = Utc::now().timestamp_millis();
    Ok(Value::Number(millis as f64 / 1000.0))
}

/// The natives every fresh global scope starts with.
pub fn natives() -> Vec<NativeFunction> {
    vec![NativeFunction::new("clock", 0, clock)]
}
