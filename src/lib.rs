//! # Introduction
//!
//! Tiza executes programs written in a small imperative teaching language with
//! explicit pointers.  Memory management is deliberately manual — variables are
//! declared, heap cells are created with `alloc` and destroyed with `free` —
//! so that students can watch stack/heap layout evolve and observe pointer
//! safety violations (dangling aliases, double frees, out-of-bounds indexes)
//! as runtime faults instead of silent corruption.
//!
//! ## Execution pipeline
//!
//! ```text
//! AST → Interpreter → State (observed via hooks, persisted via snapshot)
//! ```
//!
//! 1. [`ast`] — the program representation consumed from an external parser:
//!    typedefs, declarations, and sentences, every node tagged with its source
//!    line.
//! 2. [`types`] — type descriptors (basic types, pointers, multi-dimensional
//!    arrays with runtime-evaluated bounds, tuples, enums, synonyms) and the
//!    run-scoped [`types::registry::TypeRegistry`].
//! 3. [`memory`] — the simulated memory model: partitioned
//!    [`memory::address::Address`]es, leaf and cluster
//!    [`memory::cell::Cell`]s, and a bump [`memory::allocator::Allocator`].
//! 4. [`interpreter`] — the expression evaluator, the statement evaluator,
//!    and the work-queue execution driver with its resource limiter.
//! 5. [`snapshot`] — save/load of a final [`interpreter::state::State`] for
//!    later inspection.
//!
//! ## Language core
//!
//! Types: `int`, `bool`, `real`, `char`, `pointer of T`, `array[a..b, ...] of
//! T`, tuples, enums, and transparent type synonyms.
//! Control flow: `if/else`, `while`, `skip`.
//! Built-ins: `alloc`, `free`.
//!
//! Functions and procedures are parsed and indexed but never evaluated; the
//! textual grammar, CLI, and visualization layers live outside this crate and
//! talk to it through the AST, the observer hooks, and the snapshot format.

pub mod ast;
pub mod interpreter;
pub mod memory;
pub mod snapshot;
pub mod types;
