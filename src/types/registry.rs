//! The type registry
//!
//! One [`TypeRegistry`] is owned by each interpreter and reset between runs —
//! there is no process-global registry.  It maps names to descriptors, seeds
//! the builtins, and enforces the two registration invariants: type names are
//! unique (builtins cannot be shadowed), and enum constant names are unique
//! across *all* enums registered in a program.

use crate::ast::TypeSpec;
use crate::interpreter::errors::{ErrorKind, RuntimeError};
use crate::types::{ArrayAxis, Type};
use rustc_hash::FxHashMap;

const BUILTINS: [(&str, Type); 4] = [
    ("int", Type::Int),
    ("bool", Type::Bool),
    ("real", Type::Real),
    ("char", Type::Char),
];

#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: FxHashMap<String, Type>,
    /// constant name -> owning enum type name, for cross-enum uniqueness
    enum_constants: FxHashMap<String, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            types: FxHashMap::default(),
            enum_constants: FxHashMap::default(),
        };
        registry.load_builtins();
        registry
    }

    fn load_builtins(&mut self) {
        for (name, ty) in BUILTINS {
            self.types.insert(name.to_string(), ty);
        }
    }

    /// Drop all user-registered types.  Called at the start of every run.
    pub fn reset(&mut self) {
        self.types.clear();
        self.enum_constants.clear();
        self.load_builtins();
    }

    pub fn lookup(&self, name: &str) -> Result<&Type, RuntimeError> {
        self.types.get(name).ok_or_else(|| {
            ErrorKind::TypeRegistration(format!("unknown type '{}'", name)).into()
        })
    }

    /// Register a named type, enforcing name and enum-constant uniqueness.
    pub fn register(&mut self, name: &str, ty: Type) -> Result<(), RuntimeError> {
        if self.types.contains_key(name) {
            return Err(
                ErrorKind::TypeRegistration(format!("type '{}' is already registered", name))
                    .into(),
            );
        }
        if let Type::Enum { constants } = &ty {
            for constant in constants {
                if let Some(owner) = self.enum_constants.get(constant) {
                    return Err(ErrorKind::TypeRegistration(format!(
                        "enum constant '{}' is already defined by enum '{}'",
                        constant, owner
                    ))
                    .into());
                }
            }
            for constant in constants {
                self.enum_constants
                    .insert(constant.clone(), name.to_string());
            }
        }
        self.types.insert(name.to_string(), ty);
        Ok(())
    }

    /// Process one typedef: enums register directly, anything else becomes a
    /// transparent synonym of its resolved underlying type.
    pub fn register_typedef(&mut self, name: &str, spec: &TypeSpec) -> Result<(), RuntimeError> {
        match spec {
            TypeSpec::Enum { constants } => self.register(
                name,
                Type::Enum {
                    constants: constants.clone(),
                },
            ),
            _ => {
                let underlying = self.resolve_spec(spec).map_err(|e| RuntimeError {
                    kind: ErrorKind::SynonymConstruction(format!(
                        "'{}' does not name a type ({})",
                        name, e.kind
                    )),
                    line: e.line,
                })?;
                self.register(
                    name,
                    Type::Synonym {
                        name: name.to_string(),
                        underlying: Box::new(underlying),
                    },
                )
            }
        }
    }

    /// Turn a syntactic type expression into a descriptor.  Array bounds stay
    /// unevaluated; [`Type::eval_axes`] runs later, at declaration time.
    pub fn resolve_spec(&self, spec: &TypeSpec) -> Result<Type, RuntimeError> {
        match spec {
            TypeSpec::Named(name) => Ok(self.lookup(name)?.clone()),
            TypeSpec::PointerOf(of) => Ok(Type::PointerOf(Box::new(self.resolve_spec(of)?))),
            TypeSpec::ArrayOf { of, axes } => Ok(Type::ArrayOf {
                of: Box::new(self.resolve_spec(of)?),
                axes: axes
                    .iter()
                    .map(|(from, to)| ArrayAxis::new(from.clone(), to.clone()))
                    .collect(),
            }),
            TypeSpec::Tuple { fields } => {
                let mut resolved = Vec::with_capacity(fields.len());
                for (name, field_spec) in fields {
                    resolved.push((name.clone(), self.resolve_spec(field_spec)?));
                }
                Ok(Type::Tuple { fields: resolved })
            }
            TypeSpec::Enum { constants } => Ok(Type::Enum {
                constants: constants.clone(),
            }),
        }
    }

    /// The enum type owning a constant name, if any.  Used by tooling to
    /// resolve bare constants back to their enum.
    pub fn enum_of_constant(&self, constant: &str) -> Option<&str> {
        self.enum_constants.get(constant).map(String::as_str)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_preseeded_and_protected() {
        let mut registry = TypeRegistry::new();
        assert!(registry.lookup("int").is_ok());
        assert!(registry.lookup("real").is_ok());
        let err = registry.register("int", Type::Bool).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeRegistration(_)));
    }

    #[test]
    fn enum_constants_are_unique_across_enums() {
        let mut registry = TypeRegistry::new();
        registry
            .register_typedef(
                "color",
                &TypeSpec::Enum {
                    constants: vec!["red".into(), "blue".into()],
                },
            )
            .unwrap();
        let err = registry
            .register_typedef(
                "mood",
                &TypeSpec::Enum {
                    constants: vec!["happy".into(), "blue".into()],
                },
            )
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeRegistration(_)));

        // No overlap: both register and both resolve
        registry
            .register_typedef(
                "size",
                &TypeSpec::Enum {
                    constants: vec!["small".into(), "large".into()],
                },
            )
            .unwrap();
        assert_eq!(registry.enum_of_constant("blue"), Some("color"));
        assert_eq!(registry.enum_of_constant("large"), Some("size"));
    }

    #[test]
    fn typedef_of_a_named_type_is_a_transparent_synonym() {
        let mut registry = TypeRegistry::new();
        registry
            .register_typedef("meters", &TypeSpec::Named("int".into()))
            .unwrap();
        let ty = registry.lookup("meters").unwrap();
        assert!(matches!(ty, Type::Synonym { .. }));
        assert!(matches!(ty.synonym_closure(), Type::Int));
    }

    #[test]
    fn typedef_of_an_unknown_name_is_a_synonym_construction_error() {
        let mut registry = TypeRegistry::new();
        let err = registry
            .register_typedef("alias", &TypeSpec::Named("nonsense".into()))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SynonymConstruction(_)));
    }

    #[test]
    fn reset_drops_user_types_but_keeps_builtins() {
        let mut registry = TypeRegistry::new();
        registry
            .register_typedef("meters", &TypeSpec::Named("int".into()))
            .unwrap();
        registry.reset();
        assert!(registry.lookup("meters").is_err());
        assert!(registry.lookup("int").is_ok());
    }
}
