//! # Registries
//!
//! Name tables for schemas and collections, with an explicit two-phase
//! lifecycle:
//!
//! 1. **Population**: a [`RegistryBuilder`] accepts registrations in any
//!    order. Schemas may reference names that are not registered yet.
//! 2. **Frozen**: [`RegistryBuilder::build`] checks that every referenced
//!    schema and collection exists, rejects reference chains that never
//!    reach a concrete node, and returns an immutable [`Registry`]. Nothing
//!    can be registered into a `Registry`; the phase boundary is a type
//!    boundary.
//!
//! A frozen registry is `Send + Sync` and can be shared across threads or
//! installed once as the process-wide registry via [`install`].

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use serde_json::Value;

use crate::error::{ReferenceKind, SchemaError};
use crate::node::{NameRef, Node};
use crate::synth::Synthesis;
use crate::validate::{validate, Validated, ValidationOptions};

/// Frozen schema name table.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Node>,
}

impl SchemaRegistry {
    /// Look up a schema.
    pub fn get(&self, name: &str) -> Result<&Node, SchemaError> {
        self.schemas
            .get(name)
            .ok_or_else(|| SchemaError::UnknownSchema(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns the names of all schemas, sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Frozen collection name table.
#[derive(Debug, Default)]
pub struct CollectionRegistry {
    collections: HashMap<String, Vec<String>>,
}

impl CollectionRegistry {
    /// Look up a collection's values, in registration order.
    pub fn get(&self, name: &str) -> Result<&[String], SchemaError> {
        self.collections
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| SchemaError::UnknownCollection(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Returns the names of all collections, sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.collections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// Population phase.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    schemas: HashMap<String, Node>,
    collections: HashMap<String, Vec<String>>,
    derived: Vec<(String, String)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under a unique name.
    pub fn register_schema(
        &mut self,
        name: impl Into<String>,
        node: impl Into<Node>,
    ) -> Result<(), SchemaError> {
        let name = name.into();
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::DuplicateSchema(name));
        }
        self.schemas.insert(name, node.into());
        Ok(())
    }

    /// Register a closed list of strings under a unique name.
    pub fn register_collection<I, S>(
        &mut self,
        name: impl Into<String>,
        values: I,
    ) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if self.collection_name_taken(&name) {
            return Err(SchemaError::DuplicateCollection(name));
        }
        self.collections
            .insert(name, values.into_iter().map(Into::into).collect());
        Ok(())
    }

    /// Register a collection synthesized at freeze time from the names of
    /// registered schemas starting with `prefix`, with the prefix removed.
    pub fn register_derived_collection(
        &mut self,
        name: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Result<(), SchemaError> {
        let name = name.into();
        if self.collection_name_taken(&name) {
            return Err(SchemaError::DuplicateCollection(name));
        }
        self.derived.push((name, prefix.into()));
        Ok(())
    }

    fn collection_name_taken(&self, name: &str) -> bool {
        self.collections.contains_key(name) || self.derived.iter().any(|(n, _)| n == name)
    }

    /// Freeze the registries.
    ///
    /// # Errors
    ///
    /// - `UnresolvedReference` if any schema references a schema or
    ///   collection that was never registered.
    /// - `ReferenceCycle` if references forward to each other without
    ///   ever reaching a concrete node.
    pub fn build(self) -> Result<Registry, SchemaError> {
        let RegistryBuilder {
            schemas,
            mut collections,
            derived,
        } = self;

        for (name, prefix) in derived {
            let mut values: Vec<String> = schemas
                .keys()
                .filter_map(|schema| schema.strip_prefix(prefix.as_str()))
                .filter(|rest| !rest.is_empty())
                .map(str::to_string)
                .collect();
            values.sort();
            collections.insert(name, values);
        }

        let mut names: Vec<&String> = schemas.keys().collect();
        names.sort();
        for name in &names {
            let mut missing: Option<(ReferenceKind, String)> = None;
            schemas[*name].visit_names(&mut |dep| {
                if missing.is_some() {
                    return;
                }
                match dep {
                    NameRef::Schema(s) if !schemas.contains_key(s) => {
                        missing = Some((ReferenceKind::Schema, s.to_string()));
                    }
                    NameRef::Collection(c) if !collections.contains_key(c) => {
                        missing = Some((ReferenceKind::Collection, c.to_string()));
                    }
                    _ => {}
                }
            });
            if let Some((kind, missing)) = missing {
                return Err(SchemaError::UnresolvedReference {
                    kind,
                    name: missing,
                    referenced_by: (*name).clone(),
                });
            }
        }

        for name in &names {
            check_forwarding_chain(name, &schemas)?;
        }

        tracing::debug!(
            schemas = schemas.len(),
            collections = collections.len(),
            "schema registry frozen"
        );

        Ok(Registry {
            schemas: SchemaRegistry { schemas },
            collections: CollectionRegistry { collections },
        })
    }
}

/// Follow pure indirections from `start`; fail if a name repeats.
fn check_forwarding_chain(start: &str, schemas: &HashMap<String, Node>) -> Result<(), SchemaError> {
    let mut chain = vec![start.to_string()];
    let mut seen: HashSet<&str> = HashSet::from([start]);
    let mut current = start;
    while let Some(next) = schemas.get(current).and_then(Node::forwards_to) {
        chain.push(next.to_string());
        if !seen.insert(next) {
            return Err(SchemaError::ReferenceCycle { chain });
        }
        current = next;
    }
    Ok(())
}

/// Frozen schema and collection registries.
#[derive(Debug)]
pub struct Registry {
    schemas: SchemaRegistry,
    collections: CollectionRegistry,
}

impl Registry {
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn collections(&self) -> &CollectionRegistry {
        &self.collections
    }

    /// Look up a schema.
    pub fn schema(&self, name: &str) -> Result<&Node, SchemaError> {
        self.schemas.get(name)
    }

    /// Look up a collection.
    pub fn collection(&self, name: &str) -> Result<&[String], SchemaError> {
        self.collections.get(name)
    }

    /// Validate `value` against the named schema.
    ///
    /// # Errors
    ///
    /// Only `UnknownSchema`; problems with the document are reported in
    /// the returned [`Validated`].
    pub fn validate(
        &self,
        schema: &str,
        value: &Value,
        options: &ValidationOptions,
    ) -> Result<Validated, SchemaError> {
        let node = self.schemas.get(schema)?;
        Ok(validate(node, self, value, options))
    }

    /// Synthesize the default document for the named schema. Case tags
    /// are matched in `options.default_namespace`.
    pub fn default_value(
        &self,
        schema: &str,
        options: &ValidationOptions,
    ) -> Result<Option<Value>, SchemaError> {
        let node = self.schemas.get(schema)?;
        let mut cx = Synthesis::new(self, options);
        // Expanding the root counts as expanding its name, so a direct
        // self-reference is cut at the first repeat.
        cx.enter(schema);
        Ok(cx.synthesize(node))
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Install `registry` as the process-wide registry. Can happen once.
pub fn install(registry: Registry) -> Result<&'static Registry, SchemaError> {
    GLOBAL
        .set(registry)
        .map_err(|_| SchemaError::RegistryInstalled)?;
    global()
}

/// The process-wide registry.
pub fn global() -> Result<&'static Registry, SchemaError> {
    GLOBAL.get().ok_or(SchemaError::RegistryNotInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::ObjectNode;
    use crate::primitive::{NumberNode, StringNode};
    use crate::resource::ResourceOptions;
    use serde_json::json;

    #[test]
    fn forward_references_resolve_at_freeze() {
        let mut builder = RegistryBuilder::new();
        builder
            .register_schema("outer", ObjectNode::new().field("inner", Node::reference("inner")))
            .unwrap();
        builder.register_schema("inner", NumberNode::new()).unwrap();
        let registry = builder.build().unwrap();
        assert_eq!(registry.schemas().names(), vec!["inner", "outer"]);
        assert!(registry
            .validate("outer", &json!({"inner": 1}), &ValidationOptions::default())
            .unwrap()
            .is_valid());
    }

    #[test]
    fn missing_schema_fails_freeze() {
        let mut builder = RegistryBuilder::new();
        builder.register_schema("a", Node::reference("nowhere")).unwrap();
        let err = builder.build().unwrap_err();
        match err {
            SchemaError::UnresolvedReference {
                kind,
                name,
                referenced_by,
            } => {
                assert_eq!(kind, ReferenceKind::Schema);
                assert_eq!(name, "nowhere");
                assert_eq!(referenced_by, "a");
            }
            other => panic!("Expected UnresolvedReference, got: {other}"),
        }
    }

    #[test]
    fn missing_collection_fails_freeze() {
        let mut builder = RegistryBuilder::new();
        builder
            .register_schema("a", StringNode::new().resource(ResourceOptions::collection("block")))
            .unwrap();
        let err = builder.build().unwrap_err();
        assert!(
            matches!(
                err,
                SchemaError::UnresolvedReference {
                    kind: ReferenceKind::Collection,
                    ..
                }
            ),
            "Expected collection UnresolvedReference, got: {err}"
        );
    }

    #[test]
    fn duplicates_rejected() {
        let mut builder = RegistryBuilder::new();
        builder.register_schema("a", NumberNode::new()).unwrap();
        assert!(matches!(
            builder.register_schema("a", NumberNode::new()),
            Err(SchemaError::DuplicateSchema(_))
        ));
        builder.register_collection("c", ["x"]).unwrap();
        assert!(matches!(
            builder.register_derived_collection("c", "p/"),
            Err(SchemaError::DuplicateCollection(_))
        ));
    }

    #[test]
    fn pure_reference_cycle_fails_freeze() {
        let mut builder = RegistryBuilder::new();
        builder.register_schema("a", Node::reference("b")).unwrap();
        builder.register_schema("b", Node::reference("a").optional()).unwrap();
        let err = builder.build().unwrap_err();
        assert!(
            matches!(err, SchemaError::ReferenceCycle { .. }),
            "Expected ReferenceCycle, got: {err}"
        );
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn derived_collection_from_schema_names() {
        let mut builder = RegistryBuilder::new();
        builder.register_schema("worldgen/biome", ObjectNode::new()).unwrap();
        builder.register_schema("worldgen/noise", ObjectNode::new()).unwrap();
        builder.register_schema("recipe", ObjectNode::new()).unwrap();
        builder.register_derived_collection("worldgen_file", "worldgen/").unwrap();
        let registry = builder.build().unwrap();
        assert_eq!(
            registry.collection("worldgen_file").unwrap(),
            &["biome".to_string(), "noise".to_string()]
        );
    }

    #[test]
    fn unknown_lookups() {
        let registry = RegistryBuilder::new().build().unwrap();
        assert!(matches!(registry.schema("x"), Err(SchemaError::UnknownSchema(_))));
        assert!(matches!(
            registry.collection("x"),
            Err(SchemaError::UnknownCollection(_))
        ));
        assert!(matches!(
            registry.validate("x", &json!({}), &ValidationOptions::default()),
            Err(SchemaError::UnknownSchema(_))
        ));
    }

    #[test]
    fn registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
