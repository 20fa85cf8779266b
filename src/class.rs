//! User-defined classes and their instances.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::callable::Callable;
use crate::error::RuntimeError;
use crate::function::LoxFunction;
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// Shared handle to an instance; fields are mutated through it.
pub type InstanceRef = Rc<RefCell<LoxInstance>>;

pub struct LoxClass {
    name: String,
    methods: HashMap<String, Rc<LoxFunction>>,
    superclass: Option<Rc<LoxClass>>,
}

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Rc<LoxFunction>>,
    ) -> Self {
        Self {
            name,
            methods,
            superclass,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn superclass(&self) -> Option<&Rc<LoxClass>> {
        self.superclass.as_ref()
    }

    /// Looks `name` up on this class, then up the superclass chain.
    /// The first match wins.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        let mut class = Some(self);
        while let Some(current) = class {
            if let Some(method) = current.methods.get(name) {
                return Some(Rc::clone(method));
            }
            class = current.superclass.as_deref();
        }
        None
    }
}

impl fmt::Debug for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxClass")
            .field("name", &self.name)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("superclass", &self.superclass.as_ref().map(|s| s.name()))
            .finish()
    }
}

/// Calling a class constructs an instance and runs `init`, if any, on it.
/// The result is always the new instance.
impl Callable for Rc<LoxClass> {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.find_method("init")
            .map_or(0, |initializer| initializer.arity())
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value, RuntimeError> {
        debug!("Constructing instance of '{}'", self.name);
        let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(self))));
        if let Some(initializer) = self.find_method("init") {
            initializer
                .bind(&instance)?
                .call(interpreter, arguments, paren)?;
        }
        Ok(Value::Instance(instance))
    }
}

pub struct LoxInstance {
    class: Rc<LoxClass>,
    fields: HashMap<String, Value>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    pub fn class(&self) -> &Rc<LoxClass> {
        &self.class
    }

    /// Fields first, then methods bound to `instance`.
    pub fn get(instance: &InstanceRef, name: &Token) -> Result<Value, RuntimeError> {
        let method = {
            let this = instance.borrow();
            if let Some(value) = this.fields.get(&name.lexeme) {
                return Ok(value.clone());
            }
            this.class.find_method(&name.lexeme)
        };

        match method {
            Some(method) => Ok(Value::Function(Rc::new(method.bind(instance)?))),
            None => Err(RuntimeError::UndefinedProperty {
                name: name.lexeme.clone(),
                line: name.line,
            }),
        }
    }

    /// Always writes a field; fields shadow methods of the same name.
    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl fmt::Debug for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxInstance")
            .field("class", &self.class.name())
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}
