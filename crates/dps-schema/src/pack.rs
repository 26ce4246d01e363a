//! # Schema Packs
//!
//! A declarative file format for registering schemas and collections
//! without writing Rust: a YAML or JSON document with `collections`,
//! `derived_collections`, `schemas` and optional validation `options`.
//!
//! ```yaml
//! collections:
//!   loot_function: [set_count, enchant_randomly]
//! schemas:
//!   function:
//!     kind: object
//!     fields:
//!       - { name: function, kind: string, enum_collection: loot_function }
//!     cases:
//!       on: function
//!       cases:
//!         set_count:
//!           - { name: count, kind: number, integer: true, min: 1 }
//! ```
//!
//! Field entries may add `optional`, `default` (a literal), and
//! `enabled_when: { path: ../mode, equals: random }`; the latter two turn
//! the field into a [`ModNode`]. Closures (custom validation, match and
//! change functions) have no file representation; register those from
//! code.

use std::collections::BTreeMap;
use std::path::Path as FsPath;

use dps_core::PathOp;
use serde::Deserialize;
use serde_json::Value;

use crate::choice::{ChoiceNode, Variant};
use crate::composite::{ListNode, MapNode, ObjectNode};
use crate::error::SchemaError;
use crate::modifier::ModNode;
use crate::node::Node;
use crate::primitive::{NumberNode, StringFormat, StringNode};
use crate::registry::{Registry, RegistryBuilder};
use crate::resource::{ResourceOptions, ResourcePool};
use crate::switch::{Cases, Discriminant, SwitchNode};
use crate::validate::ValidationOptions;

/// A parsed schema pack.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaPack {
    #[serde(default)]
    pub options: ValidationOptions,
    #[serde(default)]
    pub collections: BTreeMap<String, Vec<String>>,
    /// Collection name → schema-name prefix.
    #[serde(default)]
    pub derived_collections: BTreeMap<String, String>,
    #[serde(default)]
    pub schemas: BTreeMap<String, NodeDef>,
}

/// A node definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDef {
    String {
        #[serde(default, rename = "enum")]
        enum_values: Option<Vec<String>>,
        #[serde(default)]
        enum_collection: Option<String>,
        #[serde(default)]
        additional: bool,
        #[serde(default)]
        format: Option<StringFormat>,
        #[serde(default)]
        resource: Option<ResourceDef>,
    },
    Number {
        #[serde(default)]
        integer: bool,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        color: bool,
    },
    Boolean,
    Object {
        #[serde(default)]
        fields: Vec<FieldDef>,
        #[serde(default)]
        cases: Option<CasesDef>,
    },
    List {
        items: Box<NodeDef>,
        #[serde(default)]
        min_length: Option<usize>,
        #[serde(default)]
        max_length: Option<usize>,
    },
    Map {
        keys: Box<NodeDef>,
        values: Box<NodeDef>,
    },
    /// `schema` rather than `name`, which field entries already use.
    Reference {
        schema: String,
    },
    Choice {
        variants: Vec<VariantDef>,
    },
    Switch {
        on: String,
        #[serde(default)]
        cases: BTreeMap<String, NodeDef>,
        #[serde(default)]
        fallback: Option<Box<NodeDef>>,
    },
}

/// Resource pool settings of a string definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceDef {
    /// Collection to draw the pool from.
    #[serde(default)]
    pub pool: Option<String>,
    /// Inline pool; with neither `pool` nor `values` the pool is open.
    #[serde(default)]
    pub values: Option<Vec<String>>,
    #[serde(default)]
    pub allow_tag: bool,
    #[serde(default)]
    pub allow_unknown: bool,
}

/// A named object field.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub enabled_when: Option<EnabledWhenDef>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(flatten)]
    pub node: NodeDef,
}

/// Enable a field only when another location holds a value.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnabledWhenDef {
    /// Path expression relative to the field, e.g. `../mode`.
    pub path: String,
    pub equals: Value,
}

/// An object case table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CasesDef {
    /// Discriminant path expression relative to the object, e.g. `type`.
    pub on: String,
    pub cases: BTreeMap<String, Vec<FieldDef>>,
}

/// A choice variant.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantDef {
    #[serde(rename = "type")]
    pub kind: String,
    pub node: NodeDef,
    #[serde(default)]
    pub priority: i32,
}

impl SchemaPack {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load a pack file. `.json` files are parsed as JSON, everything else
    /// as YAML.
    pub fn load(path: &FsPath) -> Result<Self, SchemaError> {
        let pack_error = |reason: String| SchemaError::PackLoad {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path)
            .map_err(|e| pack_error(format!("cannot read file: {e}")))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "json" => Self::from_json_str(&content)
                .map_err(|e| pack_error(format!("invalid JSON: {e}"))),
            _ => Self::from_yaml_str(&content)
                .map_err(|e| pack_error(format!("invalid YAML: {e}"))),
        }
    }

    /// Register everything in this pack.
    pub fn register(&self, builder: &mut RegistryBuilder) -> Result<(), SchemaError> {
        for (name, values) in &self.collections {
            builder.register_collection(name.clone(), values.iter().cloned())?;
        }
        for (name, prefix) in &self.derived_collections {
            builder.register_derived_collection(name.clone(), prefix.clone())?;
        }
        for (name, def) in &self.schemas {
            let node = def.to_node(name)?;
            builder.register_schema(name.clone(), node)?;
        }
        Ok(())
    }

    /// Register this pack alone and freeze.
    pub fn build(&self) -> Result<Registry, SchemaError> {
        let mut builder = RegistryBuilder::new();
        self.register(&mut builder)?;
        builder.build()
    }
}

fn invalid(schema: &str, reason: impl ToString) -> SchemaError {
    SchemaError::InvalidDefinition {
        schema: schema.to_string(),
        reason: reason.to_string(),
    }
}

impl NodeDef {
    /// Build the node. `schema` names the enclosing schema for errors.
    pub fn to_node(&self, schema: &str) -> Result<Node, SchemaError> {
        let node = match self {
            NodeDef::String {
                enum_values,
                enum_collection,
                additional,
                format,
                resource,
            } => {
                let mut node = StringNode::new().additional(*additional);
                match (enum_values, enum_collection) {
                    (Some(_), Some(_)) => {
                        return Err(invalid(schema, "both enum and enum_collection are set"))
                    }
                    (Some(values), None) => node = node.enum_values(values.iter().cloned()),
                    (None, Some(collection)) => node = node.enum_collection(collection.clone()),
                    (None, None) => {}
                }
                match (format, resource) {
                    (Some(_), Some(_)) => {
                        return Err(invalid(schema, "both format and resource are set"))
                    }
                    (Some(format), None) => node = node.format(*format),
                    (None, Some(resource)) => node = node.resource(resource.to_options(schema)?),
                    (None, None) => {}
                }
                node.into()
            }
            NodeDef::Number {
                integer,
                min,
                max,
                color,
            } => {
                let mut node = if *color {
                    NumberNode::color()
                } else if *integer {
                    NumberNode::integer()
                } else {
                    NumberNode::new()
                };
                if let Some(min) = min {
                    node = node.min(*min);
                }
                if let Some(max) = max {
                    node = node.max(*max);
                }
                node.into()
            }
            NodeDef::Boolean => crate::primitive::BooleanNode::new().into(),
            NodeDef::Object { fields, cases } => {
                let mut node = object_from_fields(fields, schema)?;
                if let Some(cases) = cases {
                    let discriminant = Discriminant::parse(&cases.on).map_err(|e| invalid(schema, e))?;
                    let mut table = Cases::new(discriminant);
                    for (tag, fields) in &cases.cases {
                        table = table.case(tag.clone(), object_from_fields(fields, schema)?);
                    }
                    node = node.cases(table);
                }
                node.into()
            }
            NodeDef::List {
                items,
                min_length,
                max_length,
            } => {
                let mut node = ListNode::new(items.to_node(schema)?);
                if let Some(min) = min_length {
                    node = node.min_length(*min);
                }
                if let Some(max) = max_length {
                    node = node.max_length(*max);
                }
                node.into()
            }
            NodeDef::Map { keys, values } => {
                MapNode::new(keys.to_node(schema)?, values.to_node(schema)?).into()
            }
            NodeDef::Reference { schema: target } => Node::reference(target.clone()),
            NodeDef::Choice { variants } => {
                if variants.is_empty() {
                    return Err(invalid(schema, "choice has no variants"));
                }
                let variants = variants
                    .iter()
                    .map(|v| -> Result<Variant, SchemaError> {
                        Ok(Variant::new(v.kind.clone(), v.node.to_node(schema)?).priority(v.priority))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                ChoiceNode::new(variants).into()
            }
            NodeDef::Switch {
                on,
                cases,
                fallback,
            } => {
                let discriminant = Discriminant::parse(on).map_err(|e| invalid(schema, e))?;
                let mut node = SwitchNode::new(discriminant);
                for (tag, def) in cases {
                    node = node.case(tag.clone(), def.to_node(schema)?);
                }
                if let Some(fallback) = fallback {
                    node = node.fallback(fallback.to_node(schema)?);
                }
                node.into()
            }
        };
        Ok(node)
    }
}

impl ResourceDef {
    fn to_options(&self, schema: &str) -> Result<ResourceOptions, SchemaError> {
        let pool = match (&self.pool, &self.values) {
            (Some(_), Some(_)) => return Err(invalid(schema, "both pool and values are set")),
            (Some(collection), None) => ResourcePool::Collection(collection.clone()),
            (None, Some(values)) => ResourcePool::Inline(values.clone()),
            (None, None) => ResourcePool::Open,
        };
        Ok(ResourceOptions::new(pool)
            .allow_tag(self.allow_tag)
            .allow_unknown(self.allow_unknown))
    }
}

fn object_from_fields(fields: &[FieldDef], schema: &str) -> Result<ObjectNode, SchemaError> {
    let mut object = ObjectNode::new();
    for field in fields {
        object = object.field(field.name.clone(), field.to_node(schema)?);
    }
    Ok(object)
}

impl FieldDef {
    fn to_node(&self, schema: &str) -> Result<Node, SchemaError> {
        let mut node = self.node.to_node(schema)?;

        let decorated = self.default.is_some()
            || self.enabled_when.is_some()
            || self.context.is_some()
            || self.category.is_some();
        if decorated {
            let mut m = ModNode::new(node);
            if let Some(default) = &self.default {
                m = m.default_literal(default.clone());
            }
            if let Some(when) = &self.enabled_when {
                let ops = PathOp::parse_expr(&when.path).map_err(|e| invalid(schema, e))?;
                m = m.enabled_when(ops, when.equals.clone());
            }
            if let Some(context) = &self.context {
                m = m.context(context.clone());
            }
            if let Some(category) = &self.category {
                m = m.category(category.clone());
            }
            node = m.into();
        }

        if self.optional {
            node = node.optional();
        }
        Ok(node)
    }
}
