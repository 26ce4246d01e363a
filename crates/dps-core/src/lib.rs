//! # dps-core: Foundational Types for the Schema Engine
//!
//! The leaf crate of the workspace. It defines the vocabulary every node
//! implementation threads through a validation pass: where in a document
//! we are, what went wrong there, and what a namespaced identifier looks
//! like.
//!
//! ## Key Types
//!
//! 1. **`Path`**: an immutable pointer into a JSON document. Descending
//!    returns a new path; the parent is never mutated. Discriminant lookups
//!    rebase a path with [`PathOp`] sequences (pop, push, root).
//!
//! 2. **`Issues`**: the ordered per-call error sink. Validation never
//!    fails for data-shape problems; every problem becomes an [`Issue`]
//!    with a path, a kind, a severity and a message key.
//!
//! 3. **`ResourceId`**: `namespace:path` identifiers with an implied
//!    default namespace and the `#` tag sigil.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dps-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod ident;
pub mod issue;
pub mod path;

pub use error::CoreError;
pub use ident::{ResourceId, TAG_SIGIL};
pub use issue::{Issue, IssueKind, Issues, Severity};
pub use path::{Key, Path, PathOp};
