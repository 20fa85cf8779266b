//! Chained lexical scopes.
//!
//! Each [`Environment`] owns its own bindings and an optional parent. Nodes
//! are shared through [`EnvRef`] so a closure can keep its defining scope
//! alive after the block that created it has exited.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::callable::NativeFunction;
use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;

/// Shared handle to an environment node.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// A root (global) scope.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// A root scope pre-populated with `natives`, keyed by their names.
    pub fn with_natives(natives: impl IntoIterator<Item = NativeFunction>) -> Self {
        let values = natives
            .into_iter()
            .map(|native| {
                debug!("Defining native function '{}'", native.native_name());
                (native.native_name().to_string(), Value::Native(Rc::new(native)))
            })
            .collect();
        Environment {
            values,
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wraps `self` into a shareable handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn enclosing(&self) -> Option<&EnvRef> {
        self.enclosing.as_ref()
    }

    /// Binds `name` in this node only. A name may be defined once per node.
    pub fn define(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        self.define_str(&name.lexeme, name.line, value)
    }

    /// Like [`define`](Self::define) for synthetic names (`this`, `super`,
    /// natives) that have no token of their own.
    pub fn define_str(&mut self, name: &str, line: usize, value: Value) -> Result<(), RuntimeError> {
        if self.values.contains_key(name) {
            debug!("Duplicate definition of '{}' at line {}", name, line);
            return Err(RuntimeError::DuplicateVariableName {
                name: name.to_string(),
                line,
            });
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Looks `name` up here, then along the enclosing chain.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(RuntimeError::UndefinedVariable {
                name: name.lexeme.clone(),
                line: name.line,
            })
        }
    }

    /// Overwrites an existing binding found here or along the chain.
    /// Assignment never creates a binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(RuntimeError::UndefinedVariable {
                name: name.lexeme.clone(),
                line: name.line,
            })
        }
    }

    /// Whether `name` is bound in this node (the chain is not consulted).
    pub fn contains_local(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// Walks exactly `distance` parent links from `env`.
///
/// Returns `None` when the chain is shorter than `distance`, which means the
/// resolver and the runtime nesting disagree.
pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
    let mut current = Rc::clone(env);
    for _ in 0..distance {
        let parent = current.borrow().enclosing.clone()?;
        current = parent;
    }
    Some(current)
}

/// Reads `name` from the node `distance` hops up, without any fallback search.
pub fn get_at(env: &EnvRef, distance: usize, name: &str, line: usize) -> Result<Value, RuntimeError> {
    let undefined = || RuntimeError::UndefinedVariable {
        name: name.to_string(),
        line,
    };
    let target = ancestor(env, distance).ok_or_else(undefined)?;
    let value = target.borrow().values.get(name).cloned();
    value.ok_or_else(undefined)
}

/// Overwrites `name` in the node `distance` hops up, without any fallback search.
pub fn assign_at(
    env: &EnvRef,
    distance: usize,
    name: &Token,
    value: Value,
) -> Result<(), RuntimeError> {
    let undefined = || RuntimeError::UndefinedVariable {
        name: name.lexeme.clone(),
        line: name.line,
    };
    let target = ancestor(env, distance).ok_or_else(undefined)?;
    let mut target = target.borrow_mut();
    match target.values.get_mut(&name.lexeme) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(undefined()),
    }
}
