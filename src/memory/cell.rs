//! Memory cells
//!
//! A [`Cell`] is either a *leaf* — one directly readable/writable location
//! holding a [`Value`] — or a composite *cluster* mirroring an array or
//! tuple.  Clusters expose structural navigation (element by flat index,
//! field by name) but can never be read or written as a whole; composite
//! assignment is unsupported by design.
//!
//! Composite allocation is eager: declaring an array or tuple materializes
//! every descendant leaf immediately, so `cell_count` (recursive leaf count)
//! is exact from the moment of declaration and drives memory-limit
//! accounting.

use crate::memory::address::Address;
use crate::memory::value::Value;
use crate::types::Type;
use serde::{Deserialize, Serialize};

/// A leaf cell: one addressed location with a type and a value.
/// Freshly allocated leaves hold [`Value::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafCell {
    pub address: Address,
    pub ty: Type,
    pub value: Value,
}

impl LeafCell {
    pub fn new(address: Address, ty: Type) -> Self {
        LeafCell {
            address,
            ty,
            value: Value::Unknown,
        }
    }
}

/// Children of an array, flat, one per flattened index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayCluster {
    pub address: Address,
    pub ty: Type,
    pub elements: Vec<Cell>,
}

/// Children of a tuple, in field declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TupleCluster {
    pub address: Address,
    pub ty: Type,
    pub fields: Vec<(String, Cell)>,
}

/// A leaf or a composite cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Leaf(LeafCell),
    Array(ArrayCluster),
    Tuple(TupleCluster),
}

impl Cell {
    /// The base address of this cell (for clusters, where their first
    /// descendant starts).
    pub fn address(&self) -> Address {
        match self {
            Cell::Leaf(leaf) => leaf.address,
            Cell::Array(cluster) => cluster.address,
            Cell::Tuple(cluster) => cluster.address,
        }
    }

    /// The declared type of this cell (synonyms preserved).
    pub fn ty(&self) -> &Type {
        match self {
            Cell::Leaf(leaf) => &leaf.ty,
            Cell::Array(cluster) => &cluster.ty,
            Cell::Tuple(cluster) => &cluster.ty,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafCell> {
        match self {
            Cell::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut LeafCell> {
        match self {
            Cell::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Recursive leaf count, used for memory-limit accounting.
    pub fn cell_count(&self) -> u64 {
        match self {
            Cell::Leaf(_) => 1,
            Cell::Array(cluster) => cluster.elements.iter().map(Cell::cell_count).sum(),
            Cell::Tuple(cluster) => cluster
                .fields
                .iter()
                .map(|(_, cell)| cell.cell_count())
                .sum(),
        }
    }

    /// Depth-first iteration over every leaf under this cell.
    pub fn leaves(&self) -> Vec<&LeafCell> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a LeafCell>) {
        match self {
            Cell::Leaf(leaf) => out.push(leaf),
            Cell::Array(cluster) => {
                for element in &cluster.elements {
                    element.collect_leaves(out);
                }
            }
            Cell::Tuple(cluster) => {
                for (_, cell) in &cluster.fields {
                    cell.collect_leaves(out);
                }
            }
        }
    }
}
