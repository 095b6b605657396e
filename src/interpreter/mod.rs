//! Program execution
//!
//! This module contains the execution pipeline:
//! - [`engine`]: the [`Interpreter`](engine::Interpreter) and its work-queue
//!   driver, plus observer hooks
//! - [`statements`]: per-sentence evaluation
//! - [`expressions`]: pure expression evaluation
//! - [`state`]: the simulated stack and heap
//! - [`limits`]: resource ceilings and their enforcement
//! - [`errors`]: the runtime failure taxonomy

pub mod engine;
pub mod errors;
pub mod expressions;
pub mod limits;
pub mod state;
pub mod statements;
