//! Execution state: the simulated stack and heap
//!
//! [`State`] owns every cell of one program run.  The stack maps variable
//! names to root cells; the heap maps root addresses to the cells `alloc`
//! created there.  All cross-references between cells are plain
//! [`Address`] values — pointers never hold references into the heap, they
//! hold addresses that are looked up (and liveness-checked) on every
//! dereference.  That lookup is what turns a dangling alias into a
//! [`MemoryFault`](crate::interpreter::errors::ErrorKind::MemoryFault)
//! instead of undefined behavior.
//!
//! # Variable resolution
//!
//! A [`Variable`] is a root name plus an access path of
//! dereference / index / field steps.  Resolution is two-phase: an immutable
//! walk evaluates index expressions against this same state and produces a
//! concrete [`CellLocation`] (root + flat child positions), which is then
//! navigated again for reads or — with a fresh mutable borrow — writes.

use crate::ast::{AccessStep, Variable};
use crate::interpreter::errors::{memory_fault, type_mismatch, ErrorKind, RuntimeError};
use crate::interpreter::expressions::ExpressionEvaluator;
use crate::memory::address::{Address, Partition};
use crate::memory::allocator::Allocator;
use crate::memory::cell::{Cell, LeafCell};
use crate::memory::value::Value;
use crate::types::Type;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Where a resolved cell lives: which root, then which child positions.
/// A dereference ends up here as a fresh heap root, never as a step.
#[derive(Debug, Clone)]
enum Root {
    Stack(String),
    Heap(Address),
}

#[derive(Debug, Clone, Copy)]
enum NavStep {
    Element(usize),
    Field(usize),
}

#[derive(Debug, Clone)]
struct CellLocation {
    root: Root,
    steps: Vec<NavStep>,
}

/// The memory state of one program run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    stack: FxHashMap<String, Cell>,
    declaration_order: Vec<String>,
    heap: BTreeMap<Address, Cell>,
    allocator: Allocator,
}

impl State {
    pub fn new() -> Self {
        State {
            stack: FxHashMap::default(),
            declaration_order: Vec::new(),
            heap: BTreeMap::new(),
            allocator: Allocator::new(),
        }
    }

    /// Declare a stack variable, eagerly allocating its full composite.
    pub fn declare_static_variable(&mut self, name: &str, ty: Type) -> Result<(), RuntimeError> {
        if self.stack.contains_key(name) {
            return Err(ErrorKind::AlreadyDeclared(name.to_string()).into());
        }
        let cell = self.allocator.allocate(Partition::Stack, &ty)?;
        debug!(variable = name, ty = %ty, address = %cell.address(), "declared stack variable");
        self.declaration_order.push(name.to_string());
        self.stack.insert(name.to_string(), cell);
        Ok(())
    }

    /// Name → type snapshot of the stack roots, in declaration order.
    pub fn list_declared_variables(&self) -> Vec<(String, Type)> {
        self.declaration_order
            .iter()
            .filter_map(|name| {
                self.stack
                    .get(name)
                    .map(|cell| (name.clone(), cell.ty().clone()))
            })
            .collect()
    }

    /// `alloc(v)`: create a fresh heap cell of the pointee type and aim the
    /// pointer leaf at it.
    pub fn alloc(
        &mut self,
        var: &Variable,
        evaluator: &ExpressionEvaluator,
    ) -> Result<Address, RuntimeError> {
        let result = self.alloc_inner(var, evaluator);
        result.map_err(|e| e.at(var.line))
    }

    fn alloc_inner(
        &mut self,
        var: &Variable,
        evaluator: &ExpressionEvaluator,
    ) -> Result<Address, RuntimeError> {
        let location = self.resolve_location(var, evaluator)?;
        let pointee = {
            let cell = self.cell_at(&location)?;
            let leaf = cell
                .as_leaf()
                .ok_or_else(|| type_mismatch("pointer variable", cell.ty().to_string()))?;
            match leaf.ty.synonym_closure() {
                Type::PointerOf(of) => (**of).clone(),
                other => return Err(type_mismatch("pointer variable", other.to_string())),
            }
        };
        let cell = self.allocator.allocate(Partition::Heap, &pointee)?;
        let addr = cell.address();
        debug!(address = %addr, ty = %pointee, "allocated heap cell");
        self.heap.insert(addr, cell);
        self.leaf_at_mut(&location)?.value = Value::Address(addr);
        Ok(addr)
    }

    /// `free(v)`: retire the heap allocation the pointer holds and reset the
    /// pointer to `Unknown`.  Aliases are deliberately not scrubbed — any
    /// other pointer still holding the address is now dangling and will
    /// fault on its next dereference.
    pub fn free(
        &mut self,
        var: &Variable,
        evaluator: &ExpressionEvaluator,
    ) -> Result<Address, RuntimeError> {
        let result = self.free_inner(var, evaluator);
        result.map_err(|e| e.at(var.line))
    }

    fn free_inner(
        &mut self,
        var: &Variable,
        evaluator: &ExpressionEvaluator,
    ) -> Result<Address, RuntimeError> {
        let location = self.resolve_location(var, evaluator)?;
        let addr = {
            let cell = self.cell_at(&location)?;
            let leaf = cell
                .as_leaf()
                .ok_or_else(|| type_mismatch("pointer variable", cell.ty().to_string()))?;
            if !leaf.ty.is_pointer() {
                return Err(type_mismatch("pointer variable", leaf.ty.to_string()));
            }
            match &leaf.value {
                Value::Address(addr) => *addr,
                Value::Null => return Err(memory_fault("free of null pointer")),
                Value::Unknown => return Err(memory_fault("free of uninitialized pointer")),
                other => {
                    return Err(memory_fault(format!("free of non-address value {}", other)))
                }
            }
        };
        if addr.partition != Partition::Heap || self.heap.remove(&addr).is_none() {
            return Err(memory_fault(format!(
                "double free or invalid free of address {}",
                addr
            )));
        }
        debug!(address = %addr, "freed heap cell");
        self.leaf_at_mut(&location)?.value = Value::Unknown;
        Ok(addr)
    }

    /// Read a leaf through its access path.  Freshly declared leaves read as
    /// [`Value::Unknown`]; composite cells cannot be read as a whole.
    pub fn get_variable_value(
        &self,
        var: &Variable,
        evaluator: &ExpressionEvaluator,
    ) -> Result<Value, RuntimeError> {
        let cell = self.cell_after_traversal(var, evaluator)?;
        match cell {
            Cell::Leaf(leaf) => Ok(leaf.value.clone()),
            other => Err(type_mismatch(
                "readable leaf cell",
                format!("composite {}", other.ty()),
            )
            .at(var.line)),
        }
    }

    /// Write a leaf through its access path, validating the value against
    /// the leaf's declared type.
    pub fn set_variable_value(
        &mut self,
        var: &Variable,
        value: Value,
        evaluator: &ExpressionEvaluator,
    ) -> Result<(), RuntimeError> {
        let location = self.resolve_location(var, evaluator)?;
        {
            let cell = self.cell_at(&location)?;
            let leaf = cell.as_leaf().ok_or_else(|| {
                type_mismatch("assignable leaf cell", format!("composite {}", cell.ty()))
                    .at(var.line)
            })?;
            if !leaf.ty.is_valid_value(&value) {
                return Err(type_mismatch(
                    leaf.ty.to_string(),
                    format!("{} ({})", value, value.kind_name()),
                )
                .at(var.line));
            }
        }
        self.leaf_at_mut(&location)?.value = value;
        Ok(())
    }

    /// Walk the access path from the stack root and return the cell it lands
    /// on — a leaf for scalar references, possibly a cluster for bare array
    /// or tuple names.
    pub fn cell_after_traversal(
        &self,
        var: &Variable,
        evaluator: &ExpressionEvaluator,
    ) -> Result<&Cell, RuntimeError> {
        let location = self
            .resolve_location(var, evaluator)
            .map_err(|e| e.at(var.line))?;
        self.cell_at(&location)
    }

    fn resolve_location(
        &self,
        var: &Variable,
        evaluator: &ExpressionEvaluator,
    ) -> Result<CellLocation, RuntimeError> {
        let mut current = self
            .stack
            .get(&var.name)
            .ok_or_else(|| RuntimeError::from(ErrorKind::UndeclaredVariable(var.name.clone())))?;
        let mut location = CellLocation {
            root: Root::Stack(var.name.clone()),
            steps: Vec::new(),
        };
        for step in &var.path {
            match step {
                AccessStep::Dereference => {
                    let leaf = current
                        .as_leaf()
                        .ok_or_else(|| type_mismatch("pointer", current.ty().to_string()))?;
                    if !leaf.ty.is_pointer() {
                        return Err(type_mismatch("pointer", leaf.ty.to_string()));
                    }
                    match &leaf.value {
                        Value::Address(addr) => {
                            current = self.heap.get(addr).ok_or_else(|| {
                                memory_fault(format!(
                                    "dereference of non-live address {} (freed or never allocated)",
                                    addr
                                ))
                            })?;
                            location = CellLocation {
                                root: Root::Heap(*addr),
                                steps: Vec::new(),
                            };
                        }
                        Value::Null => return Err(memory_fault("dereference of null pointer")),
                        Value::Unknown => {
                            return Err(memory_fault("dereference of uninitialized pointer"))
                        }
                        other => {
                            return Err(memory_fault(format!(
                                "dereference of non-address value {}",
                                other
                            )))
                        }
                    }
                }
                AccessStep::Index(exprs) => match current {
                    Cell::Array(cluster) => {
                        let mut indices = Vec::with_capacity(exprs.len());
                        for expr in exprs {
                            let value = evaluator.eval(expr, self)?;
                            indices.push(
                                value
                                    .as_int()
                                    .ok_or_else(|| {
                                        type_mismatch("int array index", value.kind_name())
                                            .at(expr.line())
                                    })?,
                            );
                        }
                        let flat = cluster.ty.flatten_index(&indices)?;
                        current = cluster.elements.get(flat).ok_or_else(|| {
                            memory_fault(format!("index {} beyond allocated elements", flat))
                        })?;
                        location.steps.push(NavStep::Element(flat));
                    }
                    other => return Err(type_mismatch("array", other.ty().to_string())),
                },
                AccessStep::Field(name) => match current {
                    Cell::Tuple(cluster) => {
                        let position = cluster
                            .fields
                            .iter()
                            .position(|(field, _)| field == name)
                            .ok_or_else(|| {
                                memory_fault(format!(
                                    "tuple {} has no field '{}'",
                                    cluster.ty, name
                                ))
                            })?;
                        current = &cluster.fields[position].1;
                        location.steps.push(NavStep::Field(position));
                    }
                    other => {
                        return Err(memory_fault(format!(
                            "field access on non-tuple cell of type {}",
                            other.ty()
                        )))
                    }
                },
            }
        }
        Ok(location)
    }

    fn cell_at(&self, location: &CellLocation) -> Result<&Cell, RuntimeError> {
        let mut current = match &location.root {
            Root::Stack(name) => self
                .stack
                .get(name)
                .ok_or_else(|| RuntimeError::from(ErrorKind::UndeclaredVariable(name.clone())))?,
            Root::Heap(addr) => self
                .heap
                .get(addr)
                .ok_or_else(|| memory_fault(format!("non-live address {}", addr)))?,
        };
        for step in &location.steps {
            current = match (current, step) {
                (Cell::Array(cluster), NavStep::Element(i)) => {
                    cluster.elements.get(*i).ok_or_else(|| {
                        memory_fault("resolved path no longer matches memory layout")
                    })?
                }
                (Cell::Tuple(cluster), NavStep::Field(i)) => {
                    &cluster
                        .fields
                        .get(*i)
                        .ok_or_else(|| {
                            memory_fault("resolved path no longer matches memory layout")
                        })?
                        .1
                }
                _ => return Err(memory_fault("resolved path no longer matches memory layout")),
            };
        }
        Ok(current)
    }

    fn cell_at_mut(&mut self, location: &CellLocation) -> Result<&mut Cell, RuntimeError> {
        let mut current = match &location.root {
            Root::Stack(name) => self
                .stack
                .get_mut(name)
                .ok_or_else(|| RuntimeError::from(ErrorKind::UndeclaredVariable(name.clone())))?,
            Root::Heap(addr) => self
                .heap
                .get_mut(addr)
                .ok_or_else(|| memory_fault(format!("non-live address {}", addr)))?,
        };
        for step in &location.steps {
            current = match (current, step) {
                (Cell::Array(cluster), NavStep::Element(i)) => {
                    cluster.elements.get_mut(*i).ok_or_else(|| {
                        memory_fault("resolved path no longer matches memory layout")
                    })?
                }
                (Cell::Tuple(cluster), NavStep::Field(i)) => {
                    &mut cluster
                        .fields
                        .get_mut(*i)
                        .ok_or_else(|| {
                            memory_fault("resolved path no longer matches memory layout")
                        })?
                        .1
                }
                _ => return Err(memory_fault("resolved path no longer matches memory layout")),
            };
        }
        Ok(current)
    }

    fn leaf_at_mut(&mut self, location: &CellLocation) -> Result<&mut LeafCell, RuntimeError> {
        let cell = self.cell_at_mut(location)?;
        match cell {
            Cell::Leaf(leaf) => Ok(leaf),
            other => Err(type_mismatch(
                "assignable leaf cell",
                format!("composite {}", other.ty()),
            )),
        }
    }

    /// Stack roots in declaration order (for observers and memory views).
    pub fn stack_roots(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.declaration_order
            .iter()
            .filter_map(|name| self.stack.get(name).map(|cell| (name.as_str(), cell)))
    }

    /// Live heap allocations, ordered by address.
    pub fn heap_cells(&self) -> &BTreeMap<Address, Cell> {
        &self.heap
    }

    /// Whether `addr` currently refers to a live heap allocation.
    pub fn is_live(&self, addr: Address) -> bool {
        self.heap.contains_key(&addr)
    }

    /// Live leaf count on the stack, for limit accounting.
    pub fn stack_cell_count(&self) -> u64 {
        self.stack.values().map(Cell::cell_count).sum()
    }

    /// Live leaf count on the heap, for limit accounting.
    pub fn heap_cell_count(&self) -> u64 {
        self.heap.values().map(Cell::cell_count).sum()
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
