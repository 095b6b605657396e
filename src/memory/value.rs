//! Runtime value representation
//!
//! [`Value`] is what a leaf cell holds.  Unlike raw memory, values are tagged:
//! a pointer holds an [`Address`] (or the `null` literal), an enum holds its
//! constant name, and a declared-but-unset cell holds the [`Value::Unknown`]
//! sentinel.
//!
//! # Named literals
//!
//! `inf` maps to `Real(f64::INFINITY)` and counts as a valid value for both
//! `int` and `real` variables; `true`/`false` map to `Bool`; `null` to
//! [`Value::Null`].
//!
//! # Unknown tracking
//!
//! Reading a declared variable before any assignment yields `Unknown`, never
//! a type-specific default.  Applying an operator to `Unknown` is an
//! evaluation error, which is how uninitialized reads surface to students.

use crate::memory::address::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
    Char(char),
    Address(Address),
    Null,
    EnumConstant(String),
    #[default]
    Unknown, // Special marker for declared-but-unset cells
}

impl Value {
    /// Check if this value has been set
    pub fn is_known(&self) -> bool {
        !matches!(self, Value::Unknown)
    }

    /// Get the integer value, returns None if not an Int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the boolean value, returns None if not a Bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the address value, returns None if not an Address
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Value::Address(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Numeric view of the value (ints widen to f64), for arithmetic
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Short tag used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Address(_) => "address",
            Value::Null => "null",
            Value::EnumConstant(_) => "enum constant",
            Value::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Real(r) if r.is_infinite() && *r > 0.0 => write!(f, "inf"),
            Value::Real(r) => write!(f, "{}", r),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "'{}'", c),
            Value::Address(addr) => write!(f, "{}", addr),
            Value::Null => write!(f, "null"),
            Value::EnumConstant(name) => write!(f, "{}", name),
            Value::Unknown => write!(f, "?"),
        }
    }
}
