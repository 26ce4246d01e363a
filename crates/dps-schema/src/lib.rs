//! # dps-schema: Node-Based JSON Schema Engine
//!
//! Schemas are trees of [`Node`]s registered by name. A node validates a
//! JSON value in place, returning a best-effort coerced value and
//! recording every problem it finds, and synthesizes the smallest valid
//! default for itself.
//!
//! ## Building Blocks
//!
//! - Primitives: [`StringNode`] (enums, formats, resource pools),
//!   [`NumberNode`], [`BooleanNode`].
//! - Composites: [`ObjectNode`] with an optional [`Cases`] table,
//!   [`ListNode`], [`MapNode`].
//! - Combinators: [`Reference`], [`ChoiceNode`], [`SwitchNode`],
//!   [`ModNode`] and the optional wrapper ([`Node::optional`]).
//!
//! ## Registries
//!
//! Schemas and collections are registered into a [`RegistryBuilder`] in
//! any order. [`RegistryBuilder::build`] checks that every referenced name
//! exists and freezes the result into a [`Registry`]; references are still
//! looked up by name at use time, which is what allows self-referential
//! schemas. [`install`] optionally makes one registry process-wide.
//!
//! Schemas can also be declared in a YAML or JSON [`SchemaPack`].
//!
//! ## Crate Policy
//!
//! - Depends only on `dps-core` internally.
//! - Validation never returns `Err` for bad data; only registry problems
//!   are [`SchemaError`]s.
//! - Frozen registries are immutable and `Sync`; concurrent validation
//!   passes share them freely.

pub mod choice;
pub mod composite;
pub mod error;
pub mod modifier;
pub mod node;
pub mod pack;
pub mod primitive;
pub mod reference;
pub mod registry;
pub mod resource;
pub mod switch;
pub mod synth;
pub mod validate;

pub use choice::{convert_kind, ChoiceNode, Variant};
pub use composite::{Field, ListNode, MapNode, ObjectNode};
pub use error::{ReferenceKind, SchemaError};
pub use modifier::ModNode;
pub use node::{JsonKind, Node};
pub use pack::SchemaPack;
pub use primitive::{BooleanNode, EnumSource, NumberNode, StringFormat, StringNode, StringValidator};
pub use reference::Reference;
pub use registry::{global, install, CollectionRegistry, Registry, RegistryBuilder, SchemaRegistry};
pub use resource::{ResourceOptions, ResourcePool};
pub use switch::{Case, Cases, Discriminant, SwitchNode};
pub use synth::{default_value, default_value_with, Synthesis};
pub use validate::{validate, Validated, Validation, ValidationOptions, DEFAULT_NAMESPACE};
