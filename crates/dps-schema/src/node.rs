//! # Node
//!
//! The sum type every schema element belongs to. Each variant owns its
//! configuration; dispatch is an exhaustive `match`, so adding a node kind
//! forces every operation to handle it.
//!
//! Three operations are defined on every node:
//!
//! - [`Node::validate`]: check a value, record issues, return the
//!   (possibly coerced) value.
//! - [`Node::default_value`]: synthesize the smallest valid value, or
//!   `None` when the node contributes nothing (an optional field, a cut
//!   reference cycle).
//! - [`Node::is_enabled_at`]: whether the node participates at a path.
//!
//! Graph structure only enters through [`Reference`], which names a
//! registered schema instead of owning it, so a node tree is always a
//! finite tree and cycles are name lookups.

use std::fmt;

use dps_core::{Issue, IssueKind, Path};
use serde_json::Value;

use crate::choice::ChoiceNode;
use crate::composite::{ListNode, MapNode, ObjectNode};
use crate::modifier::ModNode;
use crate::primitive::{BooleanNode, NumberNode, StringNode};
use crate::reference::Reference;
use crate::registry::Registry;
use crate::switch::SwitchNode;
use crate::synth::Synthesis;
use crate::validate::Validation;

/// JSON value kinds, as seen by type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    Null,
    Boolean,
    Number,
    String,
    List,
    Object,
}

impl JsonKind {
    /// The kind of a concrete value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Boolean,
            Value::Number(_) => JsonKind::Number,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::List,
            Value::Object(_) => JsonKind::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JsonKind::Null => "null",
            JsonKind::Boolean => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::List => "list",
            JsonKind::Object => "object",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name a node depends on, collected when a registry is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameRef<'n> {
    Schema(&'n str),
    Collection(&'n str),
}

/// A schema element.
#[derive(Debug, Clone)]
pub enum Node {
    String(StringNode),
    Number(NumberNode),
    Boolean(BooleanNode),
    Object(ObjectNode),
    List(ListNode),
    Map(MapNode),
    Reference(Reference),
    Choice(ChoiceNode),
    Switch(SwitchNode),
    Mod(ModNode),
    /// Absence of this node's value is not reported, and synthesis omits it.
    Optional(Box<Node>),
}

impl Node {
    /// Shorthand for a [`Reference`] to a registered schema.
    pub fn reference(name: impl Into<String>) -> Node {
        Node::Reference(Reference::new(name))
    }

    /// Wrap this node so its absence is tolerated.
    pub fn optional(self) -> Node {
        Node::Optional(Box::new(self))
    }

    /// Validate `value`, found at `path`, recording issues in `cx`.
    ///
    /// Never fails: a value of the wrong kind is reported and replaced by
    /// the node's default so the walk can continue.
    pub fn validate(&self, path: &Path, value: &Value, cx: &mut Validation<'_>) -> Value {
        match self {
            Node::String(n) => n.validate(path, value, cx),
            Node::Number(n) => n.validate(path, value, cx),
            Node::Boolean(n) => n.validate(path, value, cx),
            Node::Object(n) => n.validate(path, value, cx),
            Node::List(n) => n.validate(path, value, cx),
            Node::Map(n) => n.validate(path, value, cx),
            Node::Reference(n) => n.validate(path, value, cx),
            Node::Choice(n) => n.validate(path, value, cx),
            Node::Switch(n) => n.validate(path, value, cx),
            Node::Mod(n) => n.validate(path, value, cx),
            Node::Optional(inner) => inner.validate(path, value, cx),
        }
    }

    /// Synthesize the smallest valid value for this node.
    ///
    /// `path` is the absolute location in the document being built, which
    /// is what enabled predicates and discriminants are evaluated against.
    pub fn default_value(&self, path: &Path, cx: &mut Synthesis<'_>) -> Option<Value> {
        match self {
            Node::String(n) => Some(n.default_value(cx.registry())),
            Node::Number(n) => Some(n.default_value()),
            Node::Boolean(n) => Some(n.default_value()),
            Node::Object(n) => n.default_value(path, cx),
            Node::List(n) => n.default_value(path, cx),
            Node::Map(n) => Some(n.default_value()),
            Node::Reference(n) => n.default_value(path, cx),
            Node::Choice(n) => n.default_value(path, cx),
            Node::Switch(n) => n.default_value(path, cx),
            Node::Mod(n) => n.default_value(path, cx),
            Node::Optional(_) => None,
        }
    }

    /// Whether this node participates at `path` of `root`.
    ///
    /// Only [`ModNode`]s with an enabled predicate can answer `false`;
    /// wrappers and references delegate.
    pub fn is_enabled_at(&self, path: &Path, root: &Value, registry: &Registry) -> bool {
        match self {
            Node::Mod(n) => n.is_enabled_at(path, root, registry),
            Node::Optional(inner) => inner.is_enabled_at(path, root, registry),
            Node::Reference(r) => registry
                .schemas()
                .get(r.name())
                .map_or(true, |target| target.is_enabled_at(path, root, registry)),
            _ => true,
        }
    }

    /// Whether an absent value is acceptable for this node.
    pub fn is_optional(&self, registry: &Registry) -> bool {
        match self {
            Node::Optional(_) => true,
            Node::Mod(n) => n.inner().is_optional(registry),
            Node::Reference(r) => registry
                .schemas()
                .get(r.name())
                .map_or(false, |target| target.is_optional(registry)),
            _ => false,
        }
    }

    /// The JSON kind values of this node have, if it is fixed.
    ///
    /// Choices and switches can take several shapes and return `None`.
    pub fn json_kind(&self, registry: &Registry) -> Option<JsonKind> {
        match self {
            Node::String(_) => Some(JsonKind::String),
            Node::Number(_) => Some(JsonKind::Number),
            Node::Boolean(_) => Some(JsonKind::Boolean),
            Node::Object(_) | Node::Map(_) => Some(JsonKind::Object),
            Node::List(_) => Some(JsonKind::List),
            Node::Reference(r) => registry
                .schemas()
                .get(r.name())
                .ok()
                .and_then(|target| target.json_kind(registry)),
            Node::Mod(n) => n.inner().json_kind(registry),
            Node::Optional(inner) => inner.json_kind(registry),
            Node::Choice(_) | Node::Switch(_) => None,
        }
    }

    /// Visit every schema and collection name this tree depends on.
    /// References are not followed.
    pub(crate) fn visit_names<'n>(&'n self, f: &mut dyn FnMut(NameRef<'n>)) {
        match self {
            Node::String(n) => n.visit_names(f),
            Node::Number(_) | Node::Boolean(_) => {}
            Node::Object(n) => {
                for field in n.all_fields() {
                    field.node.visit_names(f);
                }
            }
            Node::List(n) => n.element().visit_names(f),
            Node::Map(n) => {
                n.key().visit_names(f);
                n.value().visit_names(f);
            }
            Node::Reference(r) => f(NameRef::Schema(r.name())),
            Node::Choice(n) => {
                for variant in n.variants() {
                    variant.node().visit_names(f);
                }
            }
            Node::Switch(n) => {
                for (_, node) in n.cases() {
                    node.visit_names(f);
                }
                if let Some(fallback) = n.fallback_node() {
                    fallback.visit_names(f);
                }
            }
            Node::Mod(n) => n.inner().visit_names(f),
            Node::Optional(inner) => inner.visit_names(f),
        }
    }

    /// The next schema name reached without passing through a concrete
    /// node, if this node is a pure indirection.
    pub(crate) fn forwards_to(&self) -> Option<&str> {
        match self {
            Node::Reference(r) => Some(r.name()),
            Node::Mod(n) => n.inner().forwards_to(),
            Node::Optional(inner) => inner.forwards_to(),
            _ => None,
        }
    }
}

/// Record a kind mismatch at `path`.
pub(crate) fn report_type_mismatch(
    cx: &mut Validation<'_>,
    path: &Path,
    expected: JsonKind,
    found: &Value,
) {
    cx.report(
        Issue::error(
            path.clone(),
            IssueKind::TypeMismatch,
            format!("expected_{expected}"),
        )
        .with_params([JsonKind::of(found)]),
    );
}

impl From<StringNode> for Node {
    fn from(n: StringNode) -> Self {
        Node::String(n)
    }
}

impl From<NumberNode> for Node {
    fn from(n: NumberNode) -> Self {
        Node::Number(n)
    }
}

impl From<BooleanNode> for Node {
    fn from(n: BooleanNode) -> Self {
        Node::Boolean(n)
    }
}

impl From<ObjectNode> for Node {
    fn from(n: ObjectNode) -> Self {
        Node::Object(n)
    }
}

impl From<ListNode> for Node {
    fn from(n: ListNode) -> Self {
        Node::List(n)
    }
}

impl From<MapNode> for Node {
    fn from(n: MapNode) -> Self {
        Node::Map(n)
    }
}

impl From<Reference> for Node {
    fn from(n: Reference) -> Self {
        Node::Reference(n)
    }
}

impl From<ChoiceNode> for Node {
    fn from(n: ChoiceNode) -> Self {
        Node::Choice(n)
    }
}

impl From<SwitchNode> for Node {
    fn from(n: SwitchNode) -> Self {
        Node::Switch(n)
    }
}

impl From<ModNode> for Node {
    fn from(n: ModNode) -> Self {
        Node::Mod(n)
    }
}
