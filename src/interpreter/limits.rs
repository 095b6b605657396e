//! Resource limits
//!
//! Student programs run under configurable ceilings so a runaway loop or an
//! oversized array stops with a named limit error instead of exhausting the
//! host.  Every knob is optional; `None` means unchecked.
//!
//! # Configuration layering
//!
//! [`Limits::discover`] starts from the built-in defaults, then overlays
//! `limits.toml` from the working directory if present, then overlays the
//! file named by the `TIZA_LIMITS_FILE` environment variable if set.  Later
//! layers win per key; keys a file omits keep their previous value.

use crate::interpreter::errors::{ErrorKind, RuntimeError};
use crate::interpreter::state::State;
use crate::memory::address::Partition;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

const LIMITS_FILE: &str = "limits.toml";
const LIMITS_FILE_ENV: &str = "TIZA_LIMITS_FILE";

/// The limit knobs.  `None` disables the corresponding check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_array_size: Option<u64>,
    pub max_array_dimensions: Option<u64>,
    pub max_tuple_size: Option<u64>,
    pub max_type_composition_depth: Option<u64>,
    pub max_stack_cells: Option<u64>,
    pub max_heap_cells: Option<u64>,
    pub max_execution_steps: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_array_size: Some(10_000),
            max_array_dimensions: Some(4),
            max_tuple_size: Some(32),
            max_type_composition_depth: Some(8),
            max_stack_cells: Some(10_000),
            max_heap_cells: Some(10_000),
            max_execution_steps: Some(100_000),
        }
    }
}

impl Limits {
    /// All checks disabled.
    pub fn unlimited() -> Self {
        Limits {
            max_array_size: None,
            max_array_dimensions: None,
            max_tuple_size: None,
            max_type_composition_depth: None,
            max_stack_cells: None,
            max_heap_cells: None,
            max_execution_steps: None,
        }
    }

    /// Defaults overlaid with `limits.toml` and then `TIZA_LIMITS_FILE`.
    pub fn discover() -> Result<Limits, RuntimeError> {
        let mut limits = Limits::default();
        let local = Path::new(LIMITS_FILE);
        if local.is_file() {
            limits.merge_file(local)?;
        }
        if let Ok(path) = std::env::var(LIMITS_FILE_ENV) {
            limits.merge_file(Path::new(&path))?;
        }
        Ok(limits)
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), RuntimeError> {
        let text = fs::read_to_string(path).map_err(|e| {
            RuntimeError::from(ErrorKind::Config(format!(
                "cannot read {}: {}",
                path.display(),
                e
            )))
        })?;
        let overlay: LimitsOverlay = toml::from_str(&text).map_err(|e| {
            RuntimeError::from(ErrorKind::Config(format!(
                "cannot parse {}: {}",
                path.display(),
                e
            )))
        })?;
        debug!(path = %path.display(), "overlaying limits file");
        overlay.apply(self);
        Ok(())
    }
}

/// Sparse view of a limits file: only the keys present override.  A key set
/// in a file can tighten or loosen a limit but cannot disable it; disabling
/// is programmatic only, via [`Limits::unlimited`].
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LimitsOverlay {
    max_array_size: Option<u64>,
    max_array_dimensions: Option<u64>,
    max_tuple_size: Option<u64>,
    max_type_composition_depth: Option<u64>,
    max_stack_cells: Option<u64>,
    max_heap_cells: Option<u64>,
    max_execution_steps: Option<u64>,
}

impl LimitsOverlay {
    fn apply(self, limits: &mut Limits) {
        if let Some(v) = self.max_array_size {
            limits.max_array_size = Some(v);
        }
        if let Some(v) = self.max_array_dimensions {
            limits.max_array_dimensions = Some(v);
        }
        if let Some(v) = self.max_tuple_size {
            limits.max_tuple_size = Some(v);
        }
        if let Some(v) = self.max_type_composition_depth {
            limits.max_type_composition_depth = Some(v);
        }
        if let Some(v) = self.max_stack_cells {
            limits.max_stack_cells = Some(v);
        }
        if let Some(v) = self.max_heap_cells {
            limits.max_heap_cells = Some(v);
        }
        if let Some(v) = self.max_execution_steps {
            limits.max_execution_steps = Some(v);
        }
    }
}

/// Enforces [`Limits`] at the three checkpoints: type sizing at registration
/// and declaration, memory growth after declaration and `alloc`, and step
/// count before each sentence.
#[derive(Debug, Clone)]
pub struct Limiter {
    limits: Limits,
}

impl Limiter {
    pub fn new(limits: Limits) -> Self {
        Limiter { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Check array size/dimensions, tuple width, and composition depth for a
    /// resolved type.  Array element counts are only checked once axes have
    /// been evaluated; dimension and depth checks are structural and always
    /// run.
    pub fn check_type_sizing(&self, ty: &Type) -> Result<(), RuntimeError> {
        self.check_sizing_at_depth(ty, 1)
    }

    fn check_sizing_at_depth(&self, ty: &Type, depth: u64) -> Result<(), RuntimeError> {
        if let Some(limit) = self.limits.max_type_composition_depth {
            if depth > limit {
                return Err(ErrorKind::TypeCompositionLimit { depth, limit }.into());
            }
        }
        // Synonyms and pointers are transparent for depth accounting; arrays
        // and tuples add a level.
        match ty.synonym_closure() {
            Type::PointerOf(of) => self.check_sizing_at_depth(of, depth),
            array @ Type::ArrayOf { of, axes } => {
                if let Some(limit) = self.limits.max_array_dimensions {
                    let dims = axes.len() as u64;
                    if dims > limit {
                        return Err(ErrorKind::ArrayDimensionsLimit { dims, limit }.into());
                    }
                }
                let axes_evaluated = axes
                    .iter()
                    .all(|axis| axis.from.value.is_some() && axis.to.value.is_some());
                if axes_evaluated {
                    if let Some(limit) = self.limits.max_array_size {
                        let size = array.number_of_elements()?;
                        if size > limit {
                            return Err(ErrorKind::ArraySizeLimit { size, limit }.into());
                        }
                    }
                }
                self.check_sizing_at_depth(of, depth + 1)
            }
            Type::Tuple { fields } => {
                if let Some(limit) = self.limits.max_tuple_size {
                    let width = fields.len() as u64;
                    if width > limit {
                        return Err(ErrorKind::TupleSizeLimit {
                            fields: width,
                            limit,
                        }
                        .into());
                    }
                }
                for (_, field_ty) in fields {
                    self.check_sizing_at_depth(field_ty, depth + 1)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Check stack and heap growth after a declaration or allocation.
    pub fn check_memory(&self, state: &State) -> Result<(), RuntimeError> {
        if let Some(limit) = self.limits.max_stack_cells {
            let cells = state.stack_cell_count();
            if cells > limit {
                return Err(ErrorKind::MemoryLimit {
                    partition: Partition::Stack.label(),
                    cells,
                    limit,
                }
                .into());
            }
        }
        if let Some(limit) = self.limits.max_heap_cells {
            let cells = state.heap_cell_count();
            if cells > limit {
                return Err(ErrorKind::MemoryLimit {
                    partition: Partition::Heap.label(),
                    cells,
                    limit,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Check the running sentence count before each execution step.
    pub fn check_execution_steps(&self, steps: u64) -> Result<(), RuntimeError> {
        if let Some(limit) = self.limits.max_execution_steps {
            if steps > limit {
                return Err(ErrorKind::ExecutionStepsLimit { steps, limit }.into());
            }
        }
        Ok(())
    }
}
