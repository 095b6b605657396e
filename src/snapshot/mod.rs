//! State persistence
//!
//! A [`State`] serializes to JSON in full: stack cells with their declared
//! types and values, live heap cells, and the allocator counters.  Restoring
//! the counters matters — a resumed state must keep minting fresh addresses,
//! never reissue a retired one.
//!
//! Pointer aliasing survives the round trip structurally: pointers are plain
//! addresses, so two pointers holding `H00004` still alias after reload.

use crate::interpreter::errors::{ErrorKind, RuntimeError};
use crate::interpreter::state::State;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

fn snapshot_error(context: &str, err: impl std::fmt::Display) -> RuntimeError {
    ErrorKind::Snapshot(format!("{}: {}", context, err)).into()
}

/// Serialize a state as JSON to any writer.
pub fn save_state<W: io::Write>(state: &State, writer: W) -> Result<(), RuntimeError> {
    serde_json::to_writer_pretty(writer, state).map_err(|e| snapshot_error("cannot save state", e))
}

/// Deserialize a state from any JSON reader.
pub fn load_state<R: io::Read>(reader: R) -> Result<State, RuntimeError> {
    serde_json::from_reader(reader).map_err(|e| snapshot_error("cannot load state", e))
}

/// Save a state to a file, creating or truncating it.
pub fn save_state_to_path(state: &State, path: impl AsRef<Path>) -> Result<(), RuntimeError> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| snapshot_error(&format!("cannot create {}", path.display()), e))?;
    save_state(state, BufWriter::new(file))
}

/// Load a state from a file.
pub fn load_state_from_path(path: impl AsRef<Path>) -> Result<State, RuntimeError> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| snapshot_error(&format!("cannot open {}", path.display()), e))?;
    load_state(BufReader::new(file))
}
