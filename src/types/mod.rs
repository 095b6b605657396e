//! Type descriptors
//!
//! A [`Type`] is a value-less descriptor: it knows its size in cells, whether
//! it is a pointer, and which runtime values are valid for it.  Composite
//! descriptors nest — `pointer of array[1..n] of int` is a `PointerOf`
//! wrapping an `ArrayOf` wrapping `Int`.
//!
//! # Sizes
//!
//! Sizes are counted in abstract cells, not bytes: `int`, `bool`, and `char`
//! occupy one cell, `real` two, and any pointer one regardless of pointee.
//! Arrays occupy `number_of_elements × element size`, tuples the sum of their
//! field sizes, enums the size of their `int` backing.
//!
//! # Array axes
//!
//! Array bounds are expressions, not constants — `array[1..n] of int` is
//! legal where `n` is a program variable.  Each bound is evaluated exactly
//! once, at declaration time, and memoized as an integer; sizing and index
//! flattening fault if asked to run before that happens.
//!
//! # Synonyms
//!
//! A [`Type::Synonym`] is a transparent alias: size, pointer-ness, and value
//! validity all delegate through the (possibly multi-level) underlying chain,
//! which by construction always terminates in a non-synonym type.

pub mod registry;

use crate::ast::Expr;
use crate::interpreter::errors::{type_mismatch, ErrorKind, RuntimeError};
use crate::interpreter::expressions::ExpressionEvaluator;
use crate::interpreter::state::State;
use crate::memory::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One bound of an array axis: the source expression plus its memoized
/// integer value once [`Type::eval_axes`] has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisBound {
    pub expr: Expr,
    pub value: Option<i64>,
}

impl AxisBound {
    pub fn new(expr: Expr) -> Self {
        AxisBound { expr, value: None }
    }

    fn resolved(&self) -> Result<i64, RuntimeError> {
        self.value.ok_or_else(|| {
            ErrorKind::Evaluation("array axis bounds have not been evaluated yet".into()).into()
        })
    }

    fn eval(&mut self, evaluator: &ExpressionEvaluator, state: &State) -> Result<(), RuntimeError> {
        if self.value.is_some() {
            return Ok(());
        }
        let value = evaluator.eval(&self.expr, state)?;
        match value.as_int() {
            Some(n) => {
                self.value = Some(n);
                Ok(())
            }
            None => Err(type_mismatch("int array bound", value.kind_name())),
        }
    }
}

/// One dimension of an array: the half-open index range `[from, to)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayAxis {
    pub from: AxisBound,
    pub to: AxisBound,
}

impl ArrayAxis {
    pub fn new(from: Expr, to: Expr) -> Self {
        ArrayAxis {
            from: AxisBound::new(from),
            to: AxisBound::new(to),
        }
    }

    pub fn from_value(&self) -> Result<i64, RuntimeError> {
        self.from.resolved()
    }

    pub fn to_value(&self) -> Result<i64, RuntimeError> {
        self.to.resolved()
    }

    /// Number of valid indices on this axis; empty ranges count as zero.
    pub fn length(&self) -> Result<i64, RuntimeError> {
        let length = self
            .to_value()?
            .checked_sub(self.from_value()?)
            .ok_or_else(|| {
                RuntimeError::from(ErrorKind::Evaluation(format!(
                    "array axis {} is too wide to represent",
                    self
                )))
            })?;
        Ok(length.max(0))
    }

    pub fn index_in_range(&self, index: i64) -> Result<bool, RuntimeError> {
        Ok(self.from_value()? <= index && index < self.to_value()?)
    }
}

impl fmt::Display for ArrayAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.from.value, self.to.value) {
            (Some(from), Some(to)) => write!(f, "{}..{}", from, to),
            _ => write!(f, "?..?"),
        }
    }
}

/// Type descriptors for the teaching language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Int,
    Bool,
    Real,
    Char,
    PointerOf(Box<Type>),
    ArrayOf {
        of: Box<Type>,
        axes: Vec<ArrayAxis>,
    },
    Tuple {
        fields: Vec<(String, Type)>,
    },
    Enum {
        constants: Vec<String>,
    },
    Synonym {
        name: String,
        underlying: Box<Type>,
    },
}

impl Type {
    /// Size in cells.  Array sizes need evaluated axes.
    pub fn size(&self) -> Result<u64, RuntimeError> {
        match self {
            Type::Int | Type::Bool | Type::Char => Ok(1),
            Type::Real => Ok(2),
            Type::PointerOf(_) => Ok(1),
            Type::ArrayOf { of, .. } => self
                .number_of_elements()?
                .checked_mul(of.size()?)
                .ok_or_else(|| {
                    RuntimeError::from(ErrorKind::Evaluation(
                        "array size in cells is too large to represent".into(),
                    ))
                }),
            Type::Tuple { fields } => {
                let mut total = 0;
                for (_, field_ty) in fields {
                    total += field_ty.size()?;
                }
                Ok(total)
            }
            Type::Enum { .. } => Type::Int.size(),
            Type::Synonym { underlying, .. } => underlying.size(),
        }
    }

    /// Whether a value of this type holds an address, through synonyms.
    pub fn is_pointer(&self) -> bool {
        matches!(self.synonym_closure(), Type::PointerOf(_))
    }

    /// Strip synonym wrappers down to the first non-synonym descriptor.
    pub fn synonym_closure(&self) -> &Type {
        let mut current = self;
        while let Type::Synonym { underlying, .. } = current {
            current = underlying;
        }
        current
    }

    /// Whether `value` may be stored in a leaf cell of this type.
    ///
    /// For arrays this asks about the *element* type: values are only ever
    /// assigned to array elements, never to the array itself.
    pub fn is_valid_value(&self, value: &Value) -> bool {
        match self {
            Type::Int => matches!(value, Value::Int(_))
                || matches!(value, Value::Real(r) if r.is_infinite()),
            Type::Real => matches!(value, Value::Real(_)),
            Type::Bool => matches!(value, Value::Bool(_)),
            Type::Char => matches!(value, Value::Char(_)),
            Type::PointerOf(_) => matches!(value, Value::Address(_) | Value::Null),
            Type::ArrayOf { of, .. } => of.is_valid_value(value),
            Type::Tuple { .. } => false,
            Type::Enum { constants } => {
                matches!(value, Value::EnumConstant(name) if constants.contains(name))
            }
            Type::Synonym { underlying, .. } => underlying.is_valid_value(value),
        }
    }

    /// Total element count of an array type; axes must be evaluated.
    pub fn number_of_elements(&self) -> Result<u64, RuntimeError> {
        match self.synonym_closure() {
            Type::ArrayOf { axes, .. } => {
                let mut total: u64 = 1;
                for axis in axes {
                    total = total.checked_mul(axis.length()? as u64).ok_or_else(|| {
                        RuntimeError::from(ErrorKind::Evaluation(
                            "array element count is too large to represent".into(),
                        ))
                    })?;
                }
                Ok(total)
            }
            other => Err(type_mismatch("array", other.to_string())),
        }
    }

    /// Evaluate every array-axis bound in this type tree, exactly once each.
    ///
    /// Runs at declaration time against the current state, so bounds may
    /// reference variables declared earlier in the program.  Recurses through
    /// pointers and tuples so that e.g. the pointee of `pointer of
    /// array[1..n] of int` is sized while `n` is still in scope.
    pub fn eval_axes(
        &mut self,
        evaluator: &ExpressionEvaluator,
        state: &State,
    ) -> Result<(), RuntimeError> {
        match self {
            Type::Int | Type::Bool | Type::Real | Type::Char | Type::Enum { .. } => Ok(()),
            Type::PointerOf(of) => of.eval_axes(evaluator, state),
            Type::ArrayOf { of, axes } => {
                for axis in axes.iter_mut() {
                    axis.from.eval(evaluator, state)?;
                    axis.to.eval(evaluator, state)?;
                }
                of.eval_axes(evaluator, state)
            }
            Type::Tuple { fields } => {
                for (_, field_ty) in fields.iter_mut() {
                    field_ty.eval_axes(evaluator, state)?;
                }
                Ok(())
            }
            Type::Synonym { underlying, .. } => underlying.eval_axes(evaluator, state),
        }
    }

    /// Map a multi-dimensional index onto the flat element list.
    ///
    /// Row-major: iterating axes from last to first, accumulate
    /// `flat += (idx - from) * stride; stride *= axis length`.  Wrong index
    /// arity is a type mismatch; an index outside its axis range is a memory
    /// fault.
    pub fn flatten_index(&self, indices: &[i64]) -> Result<usize, RuntimeError> {
        let axes = match self.synonym_closure() {
            Type::ArrayOf { axes, .. } => axes,
            other => return Err(type_mismatch("array", other.to_string())),
        };
        if indices.len() != axes.len() {
            return Err(type_mismatch(
                format!("{} array indices", axes.len()),
                format!("{}", indices.len()),
            ));
        }
        let mut flat: i64 = 0;
        let mut stride: i64 = 1;
        for (idx, axis) in indices.iter().rev().zip(axes.iter().rev()) {
            if !axis.index_in_range(*idx)? {
                return Err(ErrorKind::MemoryFault(format!(
                    "index {} is out of bounds for axis {}",
                    idx, axis
                ))
                .into());
            }
            flat += (idx - axis.from_value()?) * stride;
            stride *= axis.length()?;
        }
        Ok(flat as usize)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Real => write!(f, "real"),
            Type::Char => write!(f, "char"),
            Type::PointerOf(of) => write!(f, "pointer of {}", of),
            Type::ArrayOf { of, axes } => {
                let axes_str: Vec<String> = axes.iter().map(|a| a.to_string()).collect();
                write!(f, "array[{}] of {}", axes_str.join(", "), of)
            }
            Type::Tuple { fields } => {
                let fields_str: Vec<String> = fields
                    .iter()
                    .map(|(name, ty)| format!("{}: {}", name, ty))
                    .collect();
                write!(f, "tuple({})", fields_str.join(", "))
            }
            Type::Enum { constants } => write!(f, "enum({})", constants.join(", ")),
            Type::Synonym { name, .. } => write!(f, "{}", name),
        }
    }
}
