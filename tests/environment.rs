#[cfg(test)]
mod environment_tests {
    use std::rc::Rc;

    use rox::environment::{self, Environment};
    use rox::error::RuntimeError;
    use rox::token::{Token, TokenType};
    use rox::value::Value;

    fn name(lexeme: &str, line: usize) -> Token {
        Token::new(TokenType::IDENTIFIER, lexeme, line)
    }

    #[test]
    fn define_rejects_a_second_binding_in_the_same_node() {
        let mut env = Environment::new();
        env.define(&name("a", 1), Value::Number(1.0)).unwrap();

        let err = env.define(&name("a", 2), Value::Number(2.0)).unwrap_err();
        assert!(
            matches!(err, RuntimeError::DuplicateVariableName { ref name, line: 2 } if name == "a"),
            "unexpected error: {:?}",
            err
        );
    }

    #[test]
    fn define_allows_shadowing_in_a_child_node() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().define(&name("a", 1), Value::Number(1.0)).unwrap();

        let mut inner = Environment::with_enclosing(Rc::clone(&outer));
        inner.define(&name("a", 2), Value::Number(2.0)).unwrap();

        assert_eq!(inner.get(&name("a", 3)).unwrap(), Value::Number(2.0));
        assert_eq!(outer.borrow().get(&name("a", 3)).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn get_walks_the_enclosing_chain() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().define(&name("x", 1), Value::string("outer")).unwrap();
        let inner = Environment::with_enclosing(Rc::clone(&outer));

        assert_eq!(inner.get(&name("x", 2)).unwrap(), Value::string("outer"));

        let err = inner.get(&name("missing", 7)).unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedVariable { line: 7, .. }));
    }

    #[test]
    fn assign_overwrites_but_never_creates() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().define(&name("x", 1), Value::Nil).unwrap();
        let mut inner = Environment::with_enclosing(Rc::clone(&outer));

        inner.assign(&name("x", 2), Value::Bool(true)).unwrap();
        assert_eq!(outer.borrow().get(&name("x", 3)).unwrap(), Value::Bool(true));
        assert!(!inner.contains_local("x"));

        let err = inner.assign(&name("y", 4), Value::Nil).unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedVariable { ref name, .. } if name == "y"));
        assert!(!inner.contains_local("y"));
    }

    #[test]
    fn get_at_reads_exactly_the_requested_node() {
        let global = Environment::new().into_ref();
        global.borrow_mut().define(&name("a", 1), Value::Number(1.0)).unwrap();
        let middle = Environment::with_enclosing(Rc::clone(&global)).into_ref();
        middle.borrow_mut().define(&name("a", 1), Value::Number(2.0)).unwrap();
        let inner = Environment::with_enclosing(Rc::clone(&middle)).into_ref();

        assert_eq!(environment::get_at(&inner, 1, "a", 1).unwrap(), Value::Number(2.0));
        assert_eq!(environment::get_at(&inner, 2, "a", 1).unwrap(), Value::Number(1.0));

        // No fallback search from the target node.
        assert!(environment::get_at(&inner, 0, "a", 1).is_err());
        // Walking past the root is an error, not a panic.
        assert!(environment::get_at(&inner, 5, "a", 1).is_err());
    }

    #[test]
    fn assign_at_writes_exactly_the_requested_node() {
        let global = Environment::new().into_ref();
        global.borrow_mut().define(&name("a", 1), Value::Number(1.0)).unwrap();
        let inner = Environment::with_enclosing(Rc::clone(&global)).into_ref();
        inner.borrow_mut().define(&name("a", 1), Value::Number(2.0)).unwrap();

        environment::assign_at(&inner, 1, &name("a", 2), Value::Number(10.0)).unwrap();

        assert_eq!(environment::get_at(&inner, 0, "a", 1).unwrap(), Value::Number(2.0));
        assert_eq!(environment::get_at(&inner, 1, "a", 1).unwrap(), Value::Number(10.0));
        assert!(environment::assign_at(&inner, 1, &name("b", 2), Value::Nil).is_err());
    }

    #[test]
    fn child_keeps_parent_alive_after_the_creator_drops_it() {
        let child = {
            let parent = Environment::new().into_ref();
            parent.borrow_mut().define(&name("kept", 1), Value::Number(42.0)).unwrap();
            Environment::with_enclosing(parent).into_ref()
        };

        assert_eq!(environment::get_at(&child, 1, "kept", 1).unwrap(), Value::Number(42.0));
        assert!(environment::ancestor(&child, 1).is_some());
        assert!(environment::ancestor(&child, 2).is_none());
    }
}
