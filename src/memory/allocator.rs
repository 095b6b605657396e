//! The bump allocator
//!
//! One monotonically increasing offset counter per partition.  Offsets are
//! never reused: freeing a heap cell retires its address for good, which
//! keeps the memory view honest about total growth — this is a teaching
//! model, not a free-list allocator.

use crate::interpreter::errors::RuntimeError;
use crate::memory::address::{Address, Partition};
use crate::memory::cell::{ArrayCluster, Cell, LeafCell, TupleCluster};
use crate::types::Type;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocator {
    next_stack_offset: u64,
    next_heap_offset: u64,
}

impl Allocator {
    pub fn new() -> Self {
        Allocator::default()
    }

    fn next_offset(&self, partition: Partition) -> u64 {
        match partition {
            Partition::Stack => self.next_stack_offset,
            Partition::Heap => self.next_heap_offset,
        }
    }

    fn advance(&mut self, partition: Partition, by: u64) {
        match partition {
            Partition::Stack => self.next_stack_offset += by,
            Partition::Heap => self.next_heap_offset += by,
        }
    }

    /// Allocate a cell (or cluster) of `ty` in `partition`.
    ///
    /// Arrays and tuples allocate every child eagerly, advancing the counter
    /// by the full composite size.  Cells keep the declared type as written
    /// (synonyms included); structure follows the synonym closure.
    ///
    /// A zero-element cluster still reserves one cell: base addresses must
    /// stay unique per allocation, or two empty heap clusters would collide
    /// in the arena.
    pub fn allocate(&mut self, partition: Partition, ty: &Type) -> Result<Cell, RuntimeError> {
        let base = Address::new(partition, self.next_offset(partition));
        let cell = match ty.synonym_closure() {
            Type::ArrayOf { of, .. } => {
                let count = ty.number_of_elements()?;
                let mut elements = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    elements.push(self.allocate(partition, of)?);
                }
                Cell::Array(ArrayCluster {
                    address: base,
                    ty: ty.clone(),
                    elements,
                })
            }
            Type::Tuple { fields } => {
                let mut children = Vec::with_capacity(fields.len());
                for (name, field_ty) in fields {
                    children.push((name.clone(), self.allocate(partition, field_ty)?));
                }
                Cell::Tuple(TupleCluster {
                    address: base,
                    ty: ty.clone(),
                    fields: children,
                })
            }
            _ => {
                self.advance(partition, ty.size()?);
                Cell::Leaf(LeafCell::new(base, ty.clone()))
            }
        };
        if self.next_offset(partition) == base.offset {
            self.advance(partition, 1);
        }
        Ok(cell)
    }
}
