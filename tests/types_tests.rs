// Program-level tests for typedefs, enums, synonyms, and type sizing limits

mod common;

use common::*;
use tiza::ast::{BinOp, TypeSpec, Variable};
use tiza::interpreter::engine::Interpreter;
use tiza::interpreter::errors::ErrorKind;
use tiza::interpreter::expressions::ExpressionEvaluator;
use tiza::interpreter::limits::Limits;
use tiza::memory::value::Value;

fn value_of(state: &tiza::interpreter::state::State, name: &str) -> Value {
    state
        .get_variable_value(&Variable::plain(name, 1), &ExpressionEvaluator::new())
        .expect("variable should be readable")
}

#[test]
fn synonyms_are_transparent_in_declarations() {
    let state = run(program_with_typedefs(
        vec![typedef("meters", named("int"), 1)],
        vec![decl("height", named("meters"), 2)],
        vec![assign("height", int_lit(180, 3), 3)],
    ))
    .unwrap();
    assert_eq!(value_of(&state, "height"), Value::Int(180));
}

#[test]
fn synonym_chains_resolve_through_every_level() {
    let state = run(program_with_typedefs(
        vec![
            typedef("meters", named("int"), 1),
            typedef("altitude", named("meters"), 2),
        ],
        vec![decl("h", named("altitude"), 3)],
        vec![assign("h", int_lit(7, 4), 4)],
    ))
    .unwrap();
    assert_eq!(value_of(&state, "h"), Value::Int(7));
}

#[test]
fn typedef_of_an_unknown_name_fails_with_its_line() {
    let err = run(program_with_typedefs(
        vec![typedef("alias", named("no_such_type"), 9)],
        vec![],
        vec![],
    ))
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SynonymConstruction(_)));
    assert_eq!(err.line, Some(9));
}

#[test]
fn enum_variables_accept_only_their_own_constants() {
    let palette = TypeSpec::Enum {
        constants: vec!["red".into(), "green".into(), "blue".into()],
    };
    let ok = run(program_with_typedefs(
        vec![typedef("color", palette.clone(), 1)],
        vec![decl("c", named("color"), 2)],
        vec![assign("c", enum_lit("green", 3), 3)],
    ))
    .unwrap();
    assert_eq!(value_of(&ok, "c"), Value::EnumConstant("green".into()));

    let err = run(program_with_typedefs(
        vec![typedef("color", palette, 1)],
        vec![decl("c", named("color"), 2)],
        vec![assign("c", enum_lit("purple", 3), 3)],
    ))
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    assert_eq!(err.line, Some(3));
}

#[test]
fn enum_constants_collide_across_enums() {
    let err = run(program_with_typedefs(
        vec![
            typedef(
                "color",
                TypeSpec::Enum {
                    constants: vec!["red".into(), "blue".into()],
                },
                1,
            ),
            typedef(
                "mood",
                TypeSpec::Enum {
                    constants: vec!["happy".into(), "blue".into()],
                },
                2,
            ),
        ],
        vec![],
        vec![],
    ))
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeRegistration(_)));
    assert_eq!(err.line, Some(2));
}

#[test]
fn duplicate_type_names_are_rejected() {
    let err = run(program_with_typedefs(
        vec![
            typedef("meters", named("int"), 1),
            typedef("meters", named("real"), 2),
        ],
        vec![],
        vec![],
    ))
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeRegistration(_)));
}

#[test]
fn enum_constants_compare_by_name() {
    let state = run(program_with_typedefs(
        vec![typedef(
            "color",
            TypeSpec::Enum {
                constants: vec!["red".into(), "blue".into()],
            },
            1,
        )],
        vec![
            decl("c", named("color"), 2),
            decl("same", named("bool"), 3),
        ],
        vec![
            assign("c", enum_lit("red", 4), 4),
            assign(
                "same",
                binop(BinOp::Eq, var_expr("c", 5), enum_lit("red", 5), 5),
                5,
            ),
        ],
    ))
    .unwrap();
    assert_eq!(value_of(&state, "same"), Value::Bool(true));
}

#[test]
fn array_bounds_are_expressions_evaluated_at_declaration() {
    // array[1 .. 2 + 3] of int: 4 elements
    let bounds = TypeSpec::ArrayOf {
        of: Box::new(named("int")),
        axes: vec![(
            int_lit(1, 1),
            binop(BinOp::Add, int_lit(2, 1), int_lit(3, 1), 1),
        )],
    };
    let state = run(program(
        vec![decl("a", bounds, 1)],
        vec![assign_to(
            indexed("a", vec![int_lit(4, 2)], 2),
            int_lit(44, 2),
            2,
        )],
    ))
    .unwrap();
    assert_eq!(state.stack_cell_count(), 4);
    assert_eq!(
        state
            .get_variable_value(
                &indexed("a", vec![int_lit(4, 1)], 1),
                &ExpressionEvaluator::new()
            )
            .unwrap(),
        Value::Int(44)
    );
}

#[test]
fn absurdly_wide_array_bounds_fail_with_an_error_not_a_panic() {
    let err = run(program(
        vec![decl(
            "a",
            array_of(named("int"), &[(-(1 << 62), 1 << 62)]),
            1,
        )],
        vec![],
    ))
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Evaluation(_)));
    assert_eq!(err.line, Some(1));
}

#[test]
fn non_int_array_bounds_are_a_type_mismatch() {
    let bad = TypeSpec::ArrayOf {
        of: Box::new(named("int")),
        axes: vec![(int_lit(0, 1), bool_lit(true, 1))],
    };
    let err = run(program(vec![decl("a", bad, 1)], vec![])).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn oversized_declarations_hit_the_array_size_limit() {
    let limits = Limits {
        max_array_size: Some(100),
        ..Limits::unlimited()
    };
    let err = Interpreter::with_limits(
        program(
            vec![decl("a", array_of(named("int"), &[(0, 101)]), 1)],
            vec![],
        ),
        limits,
    )
    .run()
    .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::ArraySizeLimit { size: 101, limit: 100 }
    ));
    assert_eq!(err.line, Some(1));
}

#[test]
fn too_many_dimensions_hit_the_dimension_limit() {
    let limits = Limits {
        max_array_dimensions: Some(2),
        ..Limits::unlimited()
    };
    let err = Interpreter::with_limits(
        program(
            vec![decl(
                "a",
                array_of(named("int"), &[(0, 1), (0, 1), (0, 1)]),
                1,
            )],
            vec![],
        ),
        limits,
    )
    .run()
    .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::ArrayDimensionsLimit { dims: 3, limit: 2 }
    ));
}

#[test]
fn wide_tuples_hit_the_tuple_limit() {
    let wide = TypeSpec::Tuple {
        fields: (0..5)
            .map(|i| (format!("f{}", i), named("int")))
            .collect(),
    };
    let limits = Limits {
        max_tuple_size: Some(4),
        ..Limits::unlimited()
    };
    let err = Interpreter::with_limits(program(vec![decl("t", wide, 1)], vec![]), limits)
        .run()
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TupleSizeLimit { fields: 5, limit: 4 }
    ));
}

#[test]
fn deep_nesting_hits_the_composition_limit_even_through_typedefs() {
    let limits = Limits {
        max_type_composition_depth: Some(2),
        ..Limits::unlimited()
    };
    let err = Interpreter::with_limits(
        program_with_typedefs(
            vec![typedef("row", array_of(named("int"), &[(0, 2)]), 1)],
            vec![decl(
                "grid",
                TypeSpec::ArrayOf {
                    of: Box::new(TypeSpec::Tuple {
                        fields: vec![("cells".into(), named("row"))],
                    }),
                    axes: vec![(int_lit(0, 2), int_lit(2, 2))],
                },
                2,
            )],
            vec![],
        ),
        limits,
    )
    .run()
    .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TypeCompositionLimit { .. }
    ));
}
