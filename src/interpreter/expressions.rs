//! Pure expression evaluation
//!
//! [`ExpressionEvaluator`] reduces an [`Expr`] to a [`Value`] against an
//! immutable [`State`].  Evaluation never mutates memory; a variable read is
//! the only way state enters the picture.
//!
//! # Operator semantics
//!
//! - `/` is true division and always yields a `real`, even for two ints.
//! - `%` follows euclidean remainder, so `-7 % 3 == 2`.
//! - Int arithmetic is checked; overflow is an evaluation error, not a wrap.
//! - Mixed int/real arithmetic promotes to `real`.
//! - `&&`/`||` demand `bool` operands on both sides and do not short-circuit:
//!   both children are evaluated before the operator applies.
//! - `==`/`!=` compare loosely: values of different kinds are simply unequal.
//!   Comparing against an unset (`Unknown`) value is an error instead.
//! - Ordering works on numbers and on chars, nothing else.

use crate::ast::{BinOp, Expr, Literal, LiteralKind, UnOp};
use crate::interpreter::errors::{ErrorKind, RuntimeError};
use crate::interpreter::state::State;
use crate::memory::value::Value;

fn evaluation(reason: impl Into<String>) -> RuntimeError {
    ErrorKind::Evaluation(reason.into()).into()
}

/// Stateless expression evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    pub fn new() -> Self {
        ExpressionEvaluator
    }

    /// Evaluate `expr` to a value, tagging errors with the nearest line.
    pub fn eval(&self, expr: &Expr, state: &State) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit) => Self::eval_literal(lit).map_err(|e| e.at(lit.line)),
            Expr::Variable(var) => state.get_variable_value(var, self),
            Expr::UnaryOp { op, operand, line } => {
                let value = self.eval(operand, state)?;
                Self::apply_unary(*op, value).map_err(|e| e.at(*line))
            }
            Expr::BinaryOp {
                op,
                left,
                right,
                line,
            } => {
                let lhs = self.eval(left, state)?;
                let rhs = self.eval(right, state)?;
                Self::apply_binary(*op, lhs, rhs).map_err(|e| e.at(*line))
            }
        }
    }

    fn eval_literal(lit: &Literal) -> Result<Value, RuntimeError> {
        match lit.kind {
            LiteralKind::Int => match lit.raw.as_str() {
                "inf" => Ok(Value::Real(f64::INFINITY)),
                raw => raw
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| evaluation(format!("malformed int literal '{}'", raw))),
            },
            LiteralKind::Real => match lit.raw.as_str() {
                "inf" => Ok(Value::Real(f64::INFINITY)),
                raw => raw
                    .parse::<f64>()
                    .map(Value::Real)
                    .map_err(|_| evaluation(format!("malformed real literal '{}'", raw))),
            },
            LiteralKind::Bool => match lit.raw.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                raw => Err(evaluation(format!("malformed bool literal '{}'", raw))),
            },
            LiteralKind::Char => {
                let mut chars = lit.raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(evaluation(format!(
                        "malformed char literal '{}'",
                        lit.raw
                    ))),
                }
            }
            LiteralKind::Null => Ok(Value::Null),
            LiteralKind::EnumConstant => Ok(Value::EnumConstant(lit.raw.clone())),
        }
    }

    fn apply_unary(op: UnOp, value: Value) -> Result<Value, RuntimeError> {
        if !value.is_known() {
            return Err(evaluation(format!(
                "operator {} applied to an unset value",
                op
            )));
        }
        match (op, &value) {
            (UnOp::Neg, Value::Int(n)) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| evaluation(format!("integer overflow in -{}", n))),
            (UnOp::Neg, Value::Real(r)) => Ok(Value::Real(-r)),
            (UnOp::Pos, Value::Int(_)) | (UnOp::Pos, Value::Real(_)) => Ok(value),
            (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            _ => Err(evaluation(format!(
                "operator {} is not applicable to {}",
                op,
                value.kind_name()
            ))),
        }
    }

    fn apply_binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
        if !lhs.is_known() || !rhs.is_known() {
            return Err(evaluation(format!(
                "operator {} applied to an unset value",
                op
            )));
        }
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul => Self::arithmetic(op, lhs, rhs),
            BinOp::Div => Self::divide(lhs, rhs),
            BinOp::Mod => Self::modulo(lhs, rhs),
            BinOp::And | BinOp::Or => Self::logical(op, lhs, rhs),
            BinOp::Eq => Ok(Value::Bool(Self::values_equal(&lhs, &rhs))),
            BinOp::Ne => Ok(Value::Bool(!Self::values_equal(&lhs, &rhs))),
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => Self::ordering(op, lhs, rhs),
        }
    }

    fn arithmetic(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
        match (&lhs, &rhs) {
            (Value::Int(a), Value::Int(b)) => {
                let result = match op {
                    BinOp::Add => a.checked_add(*b),
                    BinOp::Sub => a.checked_sub(*b),
                    BinOp::Mul => a.checked_mul(*b),
                    _ => unreachable!("arithmetic called with non-arithmetic operator"),
                };
                result.map(Value::Int).ok_or_else(|| {
                    evaluation(format!("integer overflow in {} {} {}", a, op, b))
                })
            }
            _ => {
                let (a, b) = Self::numeric_pair(op, &lhs, &rhs)?;
                Ok(Value::Real(match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    _ => unreachable!("arithmetic called with non-arithmetic operator"),
                }))
            }
        }
    }

    /// True division: the result is always a `real`.
    fn divide(lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
        let (a, b) = Self::numeric_pair(BinOp::Div, &lhs, &rhs)?;
        if b == 0.0 {
            return Err(evaluation("division by zero"));
        }
        Ok(Value::Real(a / b))
    }

    fn modulo(lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
        match (&lhs, &rhs) {
            (Value::Int(_), Value::Int(0)) => Err(evaluation("modulo by zero")),
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.rem_euclid(*b))),
            _ => {
                let (a, b) = Self::numeric_pair(BinOp::Mod, &lhs, &rhs)?;
                if b == 0.0 {
                    return Err(evaluation("modulo by zero"));
                }
                Ok(Value::Real(a.rem_euclid(b)))
            }
        }
    }

    fn logical(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
        match (lhs.as_bool(), rhs.as_bool()) {
            (Some(a), Some(b)) => Ok(Value::Bool(match op {
                BinOp::And => a && b,
                BinOp::Or => a || b,
                _ => unreachable!("logical called with non-logical operator"),
            })),
            _ => Err(evaluation(format!(
                "operator {} requires bool operands, got {} and {}",
                op,
                lhs.kind_name(),
                rhs.kind_name()
            ))),
        }
    }

    /// Loose equality: kind mismatches compare unequal rather than erroring.
    /// Ints and reals compare numerically across the kind boundary.
    fn values_equal(lhs: &Value, rhs: &Value) -> bool {
        match (lhs, rhs) {
            (Value::Int(_) | Value::Real(_), Value::Int(_) | Value::Real(_)) => {
                // both as_number by construction
                lhs.as_number() == rhs.as_number()
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Address(a), Value::Address(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::EnumConstant(a), Value::EnumConstant(b)) => a == b,
            _ => false,
        }
    }

    fn ordering(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
        let ordering = match (&lhs, &rhs) {
            (Value::Char(a), Value::Char(b)) => a.partial_cmp(b),
            _ => {
                let (a, b) = Self::numeric_pair(op, &lhs, &rhs)?;
                a.partial_cmp(&b)
            }
        };
        let ordering = ordering
            .ok_or_else(|| evaluation(format!("{} and {} are not comparable", lhs, rhs)))?;
        Ok(Value::Bool(match op {
            BinOp::Lt => ordering.is_lt(),
            BinOp::Le => ordering.is_le(),
            BinOp::Gt => ordering.is_gt(),
            BinOp::Ge => ordering.is_ge(),
            _ => unreachable!("ordering called with non-ordering operator"),
        }))
    }

    fn numeric_pair(op: BinOp, lhs: &Value, rhs: &Value) -> Result<(f64, f64), RuntimeError> {
        match (lhs.as_number(), rhs.as_number()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(evaluation(format!(
                "operator {} requires numeric operands, got {} and {}",
                op,
                lhs.kind_name(),
                rhs.kind_name()
            ))),
        }
    }
}
