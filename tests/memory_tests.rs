// Integration tests for alloc/free and pointer safety faults

mod common;

use common::*;
use tiza::ast::Variable;
use tiza::interpreter::engine::Interpreter;
use tiza::interpreter::errors::ErrorKind;
use tiza::interpreter::expressions::ExpressionEvaluator;
use tiza::interpreter::limits::Limits;
use tiza::memory::address::Partition;
use tiza::memory::value::Value;

fn value_of(state: &tiza::interpreter::state::State, var: &Variable) -> Value {
    state
        .get_variable_value(var, &ExpressionEvaluator::new())
        .expect("variable should be readable")
}

#[test]
fn alloc_creates_a_live_heap_cell_the_pointer_can_reach() {
    let state = run(program(
        vec![decl("p", pointer_of(named("int")), 1)],
        vec![
            builtin("alloc", Variable::plain("p", 2), 2),
            assign_to(deref("p", 3), int_lit(42, 3), 3),
        ],
    ))
    .unwrap();
    assert_eq!(state.heap_cells().len(), 1);
    assert_eq!(value_of(&state, &deref("p", 1)), Value::Int(42));
    let addr = value_of(&state, &Variable::plain("p", 1))
        .as_address()
        .unwrap();
    assert_eq!(addr.partition, Partition::Heap);
    assert!(state.is_live(addr));
}

#[test]
fn free_retires_the_cell_and_resets_the_pointer() {
    let state = run(program(
        vec![decl("p", pointer_of(named("int")), 1)],
        vec![
            builtin("alloc", Variable::plain("p", 2), 2),
            builtin("free", Variable::plain("p", 3), 3),
        ],
    ))
    .unwrap();
    assert!(state.heap_cells().is_empty());
    assert_eq!(value_of(&state, &Variable::plain("p", 1)), Value::Unknown);
}

#[test]
fn dereference_after_free_is_a_memory_fault() {
    // q := p; free(p); then reading *q must fault
    let err = run(program(
        vec![
            decl("p", pointer_of(named("int")), 1),
            decl("q", pointer_of(named("int")), 2),
            decl("x", named("int"), 3),
        ],
        vec![
            builtin("alloc", Variable::plain("p", 4), 4),
            assign_to(deref("p", 5), int_lit(5, 5), 5),
            assign("q", var_expr("p", 6), 6),
            builtin("free", Variable::plain("p", 7), 7),
            assign("x", tiza::ast::Expr::Variable(deref("q", 8)), 8),
        ],
    ))
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MemoryFault(_)));
    assert_eq!(err.line, Some(8));
}

#[test]
fn double_free_is_a_memory_fault() {
    // Both pointers alias one cell; the second free faults.
    let err = run(program(
        vec![
            decl("p", pointer_of(named("int")), 1),
            decl("q", pointer_of(named("int")), 2),
        ],
        vec![
            builtin("alloc", Variable::plain("p", 3), 3),
            assign("q", var_expr("p", 4), 4),
            builtin("free", Variable::plain("p", 5), 5),
            builtin("free", Variable::plain("q", 6), 6),
        ],
    ))
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MemoryFault(_)));
    assert_eq!(err.line, Some(6));
}

#[test]
fn freeing_a_null_or_unset_pointer_is_a_memory_fault() {
    let null_free = run(program(
        vec![decl("p", pointer_of(named("int")), 1)],
        vec![
            assign("p", null_lit(2), 2),
            builtin("free", Variable::plain("p", 3), 3),
        ],
    ))
    .unwrap_err();
    assert!(matches!(null_free.kind, ErrorKind::MemoryFault(_)));

    let unset_free = run(program(
        vec![decl("p", pointer_of(named("int")), 1)],
        vec![builtin("free", Variable::plain("p", 2), 2)],
    ))
    .unwrap_err();
    assert!(matches!(unset_free.kind, ErrorKind::MemoryFault(_)));
}

#[test]
fn dereferencing_null_is_a_memory_fault_and_non_pointers_a_type_mismatch() {
    let null_deref = run(program(
        vec![
            decl("p", pointer_of(named("int")), 1),
            decl("x", named("int"), 2),
        ],
        vec![
            assign("p", null_lit(3), 3),
            assign("x", tiza::ast::Expr::Variable(deref("p", 4)), 4),
        ],
    ))
    .unwrap_err();
    assert!(matches!(null_deref.kind, ErrorKind::MemoryFault(_)));

    let int_deref = run(program(
        vec![decl("x", named("int"), 1), decl("y", named("int"), 2)],
        vec![
            assign("x", int_lit(1, 3), 3),
            assign("y", tiza::ast::Expr::Variable(deref("x", 4)), 4),
        ],
    ))
    .unwrap_err();
    assert!(matches!(int_deref.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn alloc_on_a_non_pointer_is_a_type_mismatch() {
    let err = run(program(
        vec![decl("x", named("int"), 1)],
        vec![builtin("alloc", Variable::plain("x", 2), 2)],
    ))
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn retired_addresses_are_never_reissued() {
    let state = run(program(
        vec![decl("p", pointer_of(named("int")), 1)],
        vec![
            builtin("alloc", Variable::plain("p", 2), 2),
            builtin("free", Variable::plain("p", 3), 3),
            builtin("alloc", Variable::plain("p", 4), 4),
        ],
    ))
    .unwrap();
    let addr = value_of(&state, &Variable::plain("p", 1))
        .as_address()
        .unwrap();
    // The first allocation took offset 0; its retirement must not recycle it.
    assert_eq!(addr.offset, 1);
    assert_eq!(state.heap_cells().len(), 1);
}

#[test]
fn zero_sized_allocations_get_distinct_addresses() {
    // Two empty-array allocations must be separately live and separately
    // freeable, not collide on one heap address.
    let state = run(program(
        vec![
            decl("p", pointer_of(array_of(named("int"), &[(0, 0)])), 1),
            decl("q", pointer_of(array_of(named("int"), &[(0, 0)])), 2),
        ],
        vec![
            builtin("alloc", Variable::plain("p", 3), 3),
            builtin("alloc", Variable::plain("q", 4), 4),
        ],
    ))
    .unwrap();
    assert_eq!(state.heap_cells().len(), 2);
    let p = value_of(&state, &Variable::plain("p", 1)).as_address().unwrap();
    let q = value_of(&state, &Variable::plain("q", 1)).as_address().unwrap();
    assert_ne!(p, q);

    let freed = run(program(
        vec![
            decl("p", pointer_of(array_of(named("int"), &[(0, 0)])), 1),
            decl("q", pointer_of(array_of(named("int"), &[(0, 0)])), 2),
        ],
        vec![
            builtin("alloc", Variable::plain("p", 3), 3),
            builtin("alloc", Variable::plain("q", 4), 4),
            builtin("free", Variable::plain("p", 5), 5),
            builtin("free", Variable::plain("q", 6), 6),
        ],
    ))
    .unwrap();
    assert!(freed.heap_cells().is_empty());
}

#[test]
fn heap_growth_is_capped() {
    // Each allocation adds one int cell; the third exceeds a 2-cell heap.
    let looping = program(
        vec![
            decl("p", pointer_of(named("int")), 1),
            decl("n", named("int"), 2),
        ],
        vec![
            assign("n", int_lit(0, 3), 3),
            tiza::ast::Sentence::While {
                guard: binop(
                    tiza::ast::BinOp::Lt,
                    var_expr("n", 4),
                    int_lit(10, 4),
                    4,
                ),
                body: vec![
                    builtin("alloc", Variable::plain("p", 5), 5),
                    assign(
                        "n",
                        binop(tiza::ast::BinOp::Add, var_expr("n", 6), int_lit(1, 6), 6),
                        6,
                    ),
                ],
                line: 4,
            },
        ],
    );
    let limits = Limits {
        max_heap_cells: Some(2),
        ..Limits::unlimited()
    };
    let err = Interpreter::with_limits(looping, limits).run().unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::MemoryLimit { partition: "heap", cells: 3, limit: 2 }
    ));
}

#[test]
fn stack_growth_is_capped() {
    let limits = Limits {
        max_stack_cells: Some(5),
        ..Limits::unlimited()
    };
    let err = Interpreter::with_limits(
        program(vec![decl("a", array_of(named("int"), &[(0, 6)]), 1)], vec![]),
        limits,
    )
    .run()
    .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::MemoryLimit { partition: "stack", cells: 6, limit: 5 }
    ));
}

#[test]
fn alloc_of_a_composite_pointee_materializes_the_whole_cluster() {
    let state = run(program(
        vec![decl("p", pointer_of(array_of(named("int"), &[(0, 3)])), 1)],
        vec![builtin("alloc", Variable::plain("p", 2), 2)],
    ))
    .unwrap();
    assert_eq!(state.heap_cell_count(), 3);
    assert_eq!(state.heap_cells().len(), 1);
}
