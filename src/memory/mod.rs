//! Memory model for the interpreter
//!
//! This module provides the core memory abstractions:
//! - [`address`]: partitioned addresses (`S00001` / `H00017`)
//! - [`value`]: tagged runtime values with the `Unknown` sentinel
//! - [`cell`]: leaf cells and array/tuple clusters
//! - [`allocator`]: the per-partition bump allocator
//!
//! # Cell sizes
//!
//! Memory is measured in abstract cells rather than bytes: `int`, `bool`,
//! and `char` take one cell, `real` two, and every pointer one regardless of
//! what it points to.  The point is a layout students can count on their
//! fingers, not platform fidelity.
//!
//! # Lifecycle
//!
//! Stack addresses are assigned once at declaration and never retired.  Heap
//! addresses are born at `alloc` and retired at `free`; the allocator never
//! reuses an offset, so a retired address can only ever mean a dangling
//! pointer.

pub mod address;
pub mod allocator;
pub mod cell;
pub mod value;
