//! Runtime error types for the interpreter
//!
//! All runtime errors are fatal: they propagate to the execution driver and
//! abort the run.  The driver's caller decides how to present the failure.
//!
//! [`RuntimeError`] pairs an [`ErrorKind`] with the source line of the
//! sentence or expression that raised it.  Lines are attached on the way out
//! via [`RuntimeError::at`], which keeps the innermost (most precise) line.

use std::fmt;
use thiserror::Error;

/// The failure taxonomy.  One variant per limited resource so that a limit
/// violation names exactly which knob was exceeded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    #[error("variable '{0}' is already declared")]
    AlreadyDeclared(String),

    #[error("variable '{0}' is not declared")]
    UndeclaredVariable(String),

    /// Value/type or operator/operand mismatch
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// Dereference of a non-live address, double free, or an index/field
    /// violation on a resolved cell
    #[error("memory fault: {0}")]
    MemoryFault(String),

    /// Malformed literal or invalid operator/operand combination
    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error("cannot construct synonym: {0}")]
    SynonymConstruction(String),

    /// Duplicate type name or enum-constant collision
    #[error("type registration failed: {0}")]
    TypeRegistration(String),

    #[error("array of {size} elements exceeds the size limit of {limit}")]
    ArraySizeLimit { size: u64, limit: u64 },

    #[error("array with {dims} dimensions exceeds the limit of {limit}")]
    ArrayDimensionsLimit { dims: u64, limit: u64 },

    #[error("tuple with {fields} fields exceeds the limit of {limit}")]
    TupleSizeLimit { fields: u64, limit: u64 },

    #[error("type composition depth {depth} exceeds the limit of {limit}")]
    TypeCompositionLimit { depth: u64, limit: u64 },

    #[error("{partition} holds {cells} cells, exceeding the limit of {limit}")]
    MemoryLimit {
        partition: &'static str,
        cells: u64,
        limit: u64,
    },

    #[error("executed {steps} steps, exceeding the limit of {limit}")]
    ExecutionStepsLimit { steps: u64, limit: u64 },

    /// Malformed limits file
    #[error("invalid limits configuration: {0}")]
    Config(String),

    /// State save/load failure
    #[error("snapshot failed: {0}")]
    Snapshot(String),
}

/// A runtime error, optionally located at a source line.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub line: Option<usize>,
}

impl RuntimeError {
    /// Attach a source line unless a more precise one is already present.
    pub fn at(mut self, line: usize) -> Self {
        self.line.get_or_insert(line);
        self
    }
}

impl From<ErrorKind> for RuntimeError {
    fn from(kind: ErrorKind) -> Self {
        RuntimeError { kind, line: None }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} at line {}", self.kind, line),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Shorthand for a [`TypeMismatch`](ErrorKind::TypeMismatch) error.
pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> RuntimeError {
    ErrorKind::TypeMismatch {
        expected: expected.into(),
        got: got.into(),
    }
    .into()
}

/// Shorthand for a [`MemoryFault`](ErrorKind::MemoryFault) error.
pub fn memory_fault(reason: impl Into<String>) -> RuntimeError {
    ErrorKind::MemoryFault(reason.into()).into()
}
