//! # Schema Errors
//!
//! Fatal, programmer-visible failures. These indicate a configuration bug
//! (a schema that references a name nobody registered, a registry used
//! before it was installed), never bad user data. Bad user data becomes
//! [`dps_core::Issue`]s instead.

use std::fmt;

use thiserror::Error;

/// What kind of name failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Schema,
    Collection,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Schema => f.write_str("schema"),
            ReferenceKind::Collection => f.write_str("collection"),
        }
    }
}

/// Error raised while populating, freezing or querying registries.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// No schema is registered under this name.
    #[error("unknown schema '{0}'")]
    UnknownSchema(String),

    /// No collection is registered under this name.
    #[error("unknown collection '{0}'")]
    UnknownCollection(String),

    /// A registered schema references a name that was never registered.
    #[error("{kind} '{name}' referenced by schema '{referenced_by}' is not registered")]
    UnresolvedReference {
        /// Whether a schema or a collection is missing.
        kind: ReferenceKind,
        /// The missing name.
        name: String,
        /// The schema containing the reference.
        referenced_by: String,
    },

    /// A schema name was registered twice.
    #[error("schema '{0}' is already registered")]
    DuplicateSchema(String),

    /// A collection name was registered twice.
    #[error("collection '{0}' is already registered")]
    DuplicateCollection(String),

    /// References that only forward to each other and never reach a
    /// concrete node.
    #[error("reference cycle without a concrete node: {}", chain.join(" -> "))]
    ReferenceCycle {
        /// Schema names along the cycle, first name repeated at the end.
        chain: Vec<String>,
    },

    /// A schema definition could not be turned into a node.
    #[error("invalid definition for schema '{schema}': {reason}")]
    InvalidDefinition {
        /// Schema being defined.
        schema: String,
        /// Why the definition was rejected.
        reason: String,
    },

    /// A schema pack file could not be read or parsed.
    #[error("schema pack load error for '{path}': {reason}")]
    PackLoad {
        /// Path of the pack file.
        path: String,
        /// Reason the pack could not be loaded.
        reason: String,
    },

    /// The process-wide registry was already installed.
    #[error("the global registry is already installed")]
    RegistryInstalled,

    /// The process-wide registry was queried before installation.
    #[error("the global registry has not been installed")]
    RegistryNotInstalled,
}
