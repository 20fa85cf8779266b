mod common;

#[cfg(test)]
mod class_tests {
    use rox::builder::AstBuilder;
    use rox::error::{LoxError, RuntimeError};
    use rox::token::TokenType;

    use super::common::{output_of, run_program};

    fn runtime_error(result: Result<(), LoxError>) -> RuntimeError {
        match result {
            Err(LoxError::Runtime(e)) => e,
            other => panic!("expected a runtime error, got {:?}", other),
        }
    }

    #[test]
    fn super_call_runs_the_parent_method_first() {
        let b = AstBuilder::new();
        let program = vec![
            b.class("A", None, vec![b.method("greet", &[], vec![b.return_stmt(Some(b.string("A")))])]),
            b.class(
                "B",
                Some("A"),
                vec![b.method(
                    "greet",
                    &[],
                    vec![b.return_stmt(Some(b.binary(
                        b.call(b.super_method("greet"), vec![]),
                        TokenType::PLUS,
                        b.string("B"),
                    )))],
                )],
            ),
            b.print(b.call(b.get(b.call(b.var("B"), vec![]), "greet"), vec![])),
        ];

        assert_eq!(output_of(&program), vec!["AB"]);
    }

    #[test]
    fn super_binds_to_the_lexically_enclosing_superclass() {
        let b = AstBuilder::new();
        let program = vec![
            b.class("A", None, vec![b.method("who", &[], vec![b.return_stmt(Some(b.string("A")))])]),
            b.class(
                "B",
                Some("A"),
                vec![
                    b.method("who", &[], vec![b.return_stmt(Some(b.string("B")))]),
                    b.method(
                        "test",
                        &[],
                        vec![b.return_stmt(Some(b.call(b.super_method("who"), vec![])))],
                    ),
                ],
            ),
            b.class("C", Some("B"), vec![]),
            b.var_decl("c", Some(b.call(b.var("C"), vec![]))),
            b.print(b.call(b.get(b.var("c"), "test"), vec![])),
            b.print(b.call(b.get(b.var("c"), "who"), vec![])),
        ];

        assert_eq!(output_of(&program), vec!["A", "B"]);
    }

    #[test]
    fn initializer_sets_fields_through_this() {
        let b = AstBuilder::new();
        let program = vec![
            b.class(
                "Point",
                None,
                vec![
                    b.method(
                        "init",
                        &["x", "y"],
                        vec![
                            b.expression(b.set(b.this(), "x", b.var("x"))),
                            b.expression(b.set(b.this(), "y", b.var("y"))),
                        ],
                    ),
                    b.method(
                        "sum",
                        &[],
                        vec![b.return_stmt(Some(b.binary(
                            b.get(b.this(), "x"),
                            TokenType::PLUS,
                            b.get(b.this(), "y"),
                        )))],
                    ),
                ],
            ),
            b.var_decl("p", Some(b.call(b.var("Point"), vec![b.number(1.0), b.number(2.0)]))),
            b.print(b.call(b.get(b.var("p"), "sum"), vec![])),
            b.expression(b.set(b.var("p"), "x", b.number(10.0))),
            b.print(b.call(b.get(b.var("p"), "sum"), vec![])),
            b.print(b.var("p")),
            b.print(b.var("Point")),
        ];

        assert_eq!(output_of(&program), vec!["3", "12", "Point instance", "Point"]);
    }

    #[test]
    fn constructor_returns_the_instance_whatever_init_does() {
        let b = AstBuilder::new();
        let program = vec![
            b.class(
                "A",
                None,
                vec![b.method(
                    "init",
                    &[],
                    vec![
                        b.expression(b.set(b.this(), "v", b.number(1.0))),
                        b.return_stmt(None),
                    ],
                )],
            ),
            b.var_decl("a", Some(b.call(b.var("A"), vec![]))),
            b.print(b.get(b.var("a"), "v")),
            b.print(b.call(b.get(b.var("a"), "init"), vec![])),
        ];

        assert_eq!(output_of(&program), vec!["1", "A instance"]);
    }

    #[test]
    fn class_arity_follows_init() {
        let b = AstBuilder::new();
        let with_init = vec![
            b.class("A", None, vec![b.method("init", &["x"], vec![])]),
            b.expression(b.call(b.var("A"), vec![])),
        ];
        assert!(matches!(
            runtime_error(run_program(&with_init).0),
            RuntimeError::UnmatchedFunctionArguments { expected: 1, actual: 0, .. }
        ));

        let without_init = vec![
            b.class("E", None, vec![]),
            b.expression(b.call(b.var("E"), vec![b.number(1.0)])),
        ];
        assert!(matches!(
            runtime_error(run_program(&without_init).0),
            RuntimeError::UnmatchedFunctionArguments { expected: 0, actual: 1, .. }
        ));
    }

    #[test]
    fn subclasses_inherit_init() {
        let b = AstBuilder::new();
        let program = vec![
            b.class(
                "A",
                None,
                vec![b.method("init", &["x"], vec![b.expression(b.set(b.this(), "x", b.var("x")))])],
            ),
            b.class("B", Some("A"), vec![]),
            b.print(b.get(b.call(b.var("B"), vec![b.number(5.0)]), "x")),
        ];

        assert_eq!(output_of(&program), vec!["5"]);
    }

    #[test]
    fn fields_shadow_methods() {
        let b = AstBuilder::new();
        let program = vec![
            b.class("A", None, vec![b.method("m", &[], vec![b.return_stmt(Some(b.string("method")))])]),
            b.var_decl("a", Some(b.call(b.var("A"), vec![]))),
            b.print(b.call(b.get(b.var("a"), "m"), vec![])),
            b.expression(b.set(b.var("a"), "m", b.string("field"))),
            b.print(b.get(b.var("a"), "m")),
        ];

        assert_eq!(output_of(&program), vec!["method", "field"]);
    }

    #[test]
    fn extracted_methods_keep_their_receiver() {
        let b = AstBuilder::new();
        let program = vec![
            b.class(
                "Box",
                None,
                vec![
                    b.method("init", &["n"], vec![b.expression(b.set(b.this(), "n", b.var("n")))]),
                    b.method("get", &[], vec![b.return_stmt(Some(b.get(b.this(), "n")))]),
                ],
            ),
            b.var_decl("f", Some(b.get(b.call(b.var("Box"), vec![b.number(7.0)]), "get"))),
            b.print(b.call(b.var("f"), vec![])),
            b.print(b.var("f")),
        ];

        assert_eq!(output_of(&program), vec!["7", "<fn get>"]);
    }

    #[test]
    fn closures_inside_methods_capture_this() {
        let b = AstBuilder::new();
        let count = || b.get(b.this(), "count");
        let program = vec![
            b.class(
                "Counter",
                None,
                vec![
                    b.method("init", &[], vec![b.expression(b.set(b.this(), "count", b.number(0.0)))]),
                    b.method(
                        "makeInc",
                        &[],
                        vec![
                            b.function(
                                "inc",
                                &[],
                                vec![
                                    b.expression(b.set(
                                        b.this(),
                                        "count",
                                        b.binary(count(), TokenType::PLUS, b.number(1.0)),
                                    )),
                                    b.return_stmt(Some(count())),
                                ],
                            ),
                            b.return_stmt(Some(b.var("inc"))),
                        ],
                    ),
                ],
            ),
            b.var_decl("c", Some(b.call(b.var("Counter"), vec![]))),
            b.var_decl("inc", Some(b.call(b.get(b.var("c"), "makeInc"), vec![]))),
            b.expression(b.call(b.var("inc"), vec![])),
            b.print(b.call(b.var("inc"), vec![])),
            b.print(b.get(b.var("c"), "count")),
        ];

        assert_eq!(output_of(&program), vec!["2", "2"]);
    }

    #[test]
    fn methods_close_over_the_declaring_scope() {
        let b = AstBuilder::new();
        let program = vec![b.block(vec![
            b.var_decl("prefix", Some(b.string("hi "))),
            b.class(
                "Greeter",
                None,
                vec![b.method(
                    "say",
                    &["name"],
                    vec![b.return_stmt(Some(b.binary(b.var("prefix"), TokenType::PLUS, b.var("name"))))],
                )],
            ),
            b.print(b.call(
                b.get(b.call(b.var("Greeter"), vec![]), "say"),
                vec![b.string("bob")],
            )),
        ])];

        assert_eq!(output_of(&program), vec!["hi bob"]);
    }

    #[test]
    fn instances_compare_by_identity() {
        let b = AstBuilder::new();
        let program = vec![
            b.class("A", None, vec![]),
            b.var_decl("x", Some(b.call(b.var("A"), vec![]))),
            b.var_decl("y", Some(b.call(b.var("A"), vec![]))),
            b.print(b.binary(b.var("x"), TokenType::EQUAL_EQUAL, b.var("x"))),
            b.print(b.binary(b.var("x"), TokenType::EQUAL_EQUAL, b.var("y"))),
        ];

        assert_eq!(output_of(&program), vec!["true", "false"]);
    }

    #[test]
    fn properties_require_instances() {
        let b = AstBuilder::new();
        b.at_line(6);
        let get = vec![b.var_decl("x", Some(b.number(1.0))), b.print(b.get(b.var("x"), "y"))];
        assert!(matches!(
            runtime_error(run_program(&get).0),
            RuntimeError::OnlyInstancesCanHaveProperty { line: 6, .. }
        ));

        let set = vec![
            b.var_decl("x", Some(b.number(1.0))),
            b.expression(b.set(b.var("x"), "y", b.number(2.0))),
        ];
        assert!(matches!(
            runtime_error(run_program(&set).0),
            RuntimeError::OnlyInstancesCanHaveFields { line: 6, .. }
        ));
    }

    #[test]
    fn missing_properties_are_reported_by_name() {
        let b = AstBuilder::new();
        let program = vec![
            b.class("A", None, vec![]),
            b.print(b.get(b.call(b.var("A"), vec![]), "missing")),
        ];

        let err = runtime_error(run_program(&program).0);
        assert!(matches!(err, RuntimeError::UndefinedProperty { ref name, .. } if name == "missing"));
        assert!(err.to_string().starts_with("Undefined property 'missing'."));
    }

    #[test]
    fn superclass_must_be_a_class() {
        let b = AstBuilder::new();
        let program = vec![
            b.var_decl("NotAClass", Some(b.string("nope"))),
            b.class("B", Some("NotAClass"), vec![]),
        ];

        assert!(matches!(
            runtime_error(run_program(&program).0),
            RuntimeError::SuperClassMustBeAClass { ref name, .. } if name == "B"
        ));
    }

    #[test]
    fn super_reports_methods_the_parent_lacks() {
        let b = AstBuilder::new();
        let program = vec![
            b.class("A", None, vec![]),
            b.class(
                "B",
                Some("A"),
                vec![b.method("m", &[], vec![b.return_stmt(Some(b.call(b.super_method("gone"), vec![])))])],
            ),
            b.expression(b.call(b.get(b.call(b.var("B"), vec![]), "m"), vec![])),
        ];

        assert!(matches!(
            runtime_error(run_program(&program).0),
            RuntimeError::UndefinedProperty { ref name, .. } if name == "gone"
        ));
    }
}
