//! # Discriminated Switches
//!
//! Shapes that depend on a value stored elsewhere in the document, most
//! often the enclosing object's `type` field.
//!
//! - [`Cases`] is attached to an [`ObjectNode`](crate::composite::ObjectNode)
//!   and adds the selected case's fields to the object's field set.
//! - [`SwitchNode`] is a node in its own right: the whole node used at a
//!   location is picked by the discriminant.
//!
//! The discriminant is read fresh on every call. Nothing is memoized, so
//! a changed `type` between two validations of the same document selects
//! a different case with no trace of the previous one.

use dps_core::{CoreError, Path, PathOp};
use serde_json::Value;

use crate::composite::{Field, ObjectNode};
use crate::node::Node;
use crate::resource::{discriminant_text, tag_matches};
use crate::synth::Synthesis;
use crate::validate::Validation;

/// Where to read a discriminant, as a rewrite of the current path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminant {
    ops: Vec<PathOp>,
}

impl Discriminant {
    /// A member of the current object (`path/name`). Used by [`Cases`].
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            ops: vec![PathOp::Push(dps_core::Key::Field(name.into()))],
        }
    }

    /// A sibling of the current location (`path/../name`). Used by a
    /// [`SwitchNode`] sitting in an object field.
    pub fn sibling(name: impl Into<String>) -> Self {
        Self {
            ops: vec![
                PathOp::Pop,
                PathOp::Push(dps_core::Key::Field(name.into())),
            ],
        }
    }

    pub fn from_ops(ops: Vec<PathOp>) -> Self {
        Self { ops }
    }

    /// Parse a path expression such as `../type` or `/kind`.
    pub fn parse(expr: &str) -> Result<Self, CoreError> {
        PathOp::parse_expr(expr).map(Self::from_ops)
    }

    pub fn ops(&self) -> &[PathOp] {
        &self.ops
    }

    /// The discriminant's location for a node at `path`.
    pub fn locate(&self, path: &Path) -> Option<Path> {
        path.rebase(&self.ops)
    }

    /// Read the discriminant as text.
    pub fn read(&self, path: &Path, root: &Value) -> Option<String> {
        let location = self.locate(path)?;
        location.resolve(root).and_then(discriminant_text)
    }
}

/// One entry of a [`Cases`] table.
#[derive(Debug, Clone)]
pub struct Case {
    tag: String,
    fields: Vec<Field>,
}

impl Case {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// Extra object fields selected by a discriminant.
#[derive(Debug, Clone)]
pub struct Cases {
    discriminant: Discriminant,
    cases: Vec<Case>,
}

impl Cases {
    pub fn new(discriminant: Discriminant) -> Self {
        Self {
            discriminant,
            cases: Vec::new(),
        }
    }

    /// Fields added when the discriminant equals `tag`. Only the fields of
    /// `fields` are used; its own case table, if any, is ignored.
    pub fn case(mut self, tag: impl Into<String>, fields: ObjectNode) -> Self {
        self.cases.push(Case {
            tag: tag.into(),
            fields: fields.fields().to_vec(),
        });
        self
    }

    pub fn discriminant(&self) -> &Discriminant {
        &self.discriminant
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    /// The case selected for the object at `path`, if the discriminant is
    /// present and known.
    pub fn active(&self, path: &Path, root: &Value, namespace: &str) -> Option<&Case> {
        let value = self.discriminant.read(path, root)?;
        self.cases
            .iter()
            .find(|case| tag_matches(&case.tag, &value, namespace))
    }
}

/// A node chosen by a discriminant.
#[derive(Debug, Clone)]
pub struct SwitchNode {
    discriminant: Discriminant,
    cases: Vec<(String, Node)>,
    fallback: Option<Box<Node>>,
}

impl SwitchNode {
    pub fn new(discriminant: Discriminant) -> Self {
        Self {
            discriminant,
            cases: Vec::new(),
            fallback: None,
        }
    }

    /// Use `node` when the discriminant equals `tag`.
    pub fn case(mut self, tag: impl Into<String>, node: impl Into<Node>) -> Self {
        self.cases.push((tag.into(), node.into()));
        self
    }

    /// Use `node` when no case matches.
    pub fn fallback(mut self, node: impl Into<Node>) -> Self {
        self.fallback = Some(Box::new(node.into()));
        self
    }

    pub fn discriminant(&self) -> &Discriminant {
        &self.discriminant
    }

    pub fn cases(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.cases.iter().map(|(tag, node)| (tag.as_str(), node))
    }

    pub fn fallback_node(&self) -> Option<&Node> {
        self.fallback.as_deref()
    }

    /// The node in effect at `path` of `root`.
    pub fn active(&self, path: &Path, root: &Value, namespace: &str) -> Option<&Node> {
        let selected = self.discriminant.read(path, root).and_then(|value| {
            self.cases
                .iter()
                .find(|(tag, _)| tag_matches(tag, &value, namespace))
                .map(|(_, node)| node)
        });
        selected.or(self.fallback.as_deref())
    }

    /// With no active node the value passes through unchecked.
    pub(crate) fn validate(&self, path: &Path, value: &Value, cx: &mut Validation<'_>) -> Value {
        match self.active(path, cx.root(), &cx.options().default_namespace) {
            Some(node) => node.validate(path, value, cx),
            None => value.clone(),
        }
    }

    /// With no active node any value validates, so the default is null.
    pub(crate) fn default_value(&self, path: &Path, cx: &mut Synthesis<'_>) -> Option<Value> {
        match self.active(path, cx.root(), cx.namespace()) {
            Some(node) => node.default_value(path, cx),
            None => Some(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{BooleanNode, NumberNode, StringNode};
    use crate::registry::{Registry, RegistryBuilder};
    use crate::validate::{validate, ValidationOptions};
    use dps_core::IssueKind;
    use serde_json::json;

    fn registry() -> Registry {
        RegistryBuilder::new().build().unwrap()
    }

    fn ab_object() -> Node {
        ObjectNode::new()
            .field("type", StringNode::new().enum_values(["a", "b"]))
            .cases(
                Cases::new(Discriminant::field("type"))
                    .case("a", ObjectNode::new().field("x", NumberNode::new()))
                    .case("b", ObjectNode::new().field("y", NumberNode::new())),
            )
            .into()
    }

    #[test]
    fn active_case_fields_are_validated() {
        let reg = registry();
        let opts = ValidationOptions::default();
        let ok = validate(&ab_object(), &reg, &json!({"type": "a", "x": 5}), &opts);
        assert!(ok.issues.is_empty());

        let wrong = validate(&ab_object(), &reg, &json!({"type": "a", "y": 5}), &opts);
        assert_eq!(wrong.issues.len(), 1);
        let issue = &wrong.issues.as_slice()[0];
        assert_eq!(issue.kind, IssueKind::MissingField);
        assert_eq!(issue.path.to_string(), "/x");
    }

    #[test]
    fn unknown_discriminant_adds_no_fields() {
        let result = validate(
            &ab_object(),
            &registry(),
            &json!({"type": "c", "x": "not a number"}),
            &ValidationOptions::default(),
        );
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues.as_slice()[0].kind, IssueKind::InvalidEnum);
    }

    #[test]
    fn namespaced_discriminants_match() {
        let node: Node = ObjectNode::new()
            .field("type", StringNode::new())
            .cases(
                Cases::new(Discriminant::field("type"))
                    .case("minecraft:set_count", ObjectNode::new().field("count", NumberNode::new())),
            )
            .into();
        let result = validate(
            &node,
            &registry(),
            &json!({"type": "set_count"}),
            &ValidationOptions::default(),
        );
        assert_eq!(result.issues.as_slice()[0].path.to_string(), "/count");
    }

    #[test]
    fn switch_node_reads_sibling() {
        let node: Node = ObjectNode::new()
            .field("type", StringNode::new())
            .field(
                "value",
                SwitchNode::new(Discriminant::sibling("type"))
                    .case("number", NumberNode::new())
                    .case("text", StringNode::new()),
            )
            .into();
        let reg = registry();
        let opts = ValidationOptions::default();
        assert!(validate(&node, &reg, &json!({"type": "number", "value": 3}), &opts).is_valid());
        assert!(!validate(&node, &reg, &json!({"type": "text", "value": 3}), &opts).is_valid());
        // Unknown discriminant and no fallback: anything goes.
        assert!(validate(&node, &reg, &json!({"type": "other", "value": [1]}), &opts).is_valid());
    }

    #[test]
    fn switch_fallback() {
        let node: Node = ObjectNode::new()
            .field("type", StringNode::new())
            .field(
                "value",
                SwitchNode::new(Discriminant::sibling("type"))
                    .case("text", StringNode::new())
                    .fallback(NumberNode::new()),
            )
            .into();
        let result = validate(
            &node,
            &registry(),
            &json!({"type": "whatever", "value": "x"}),
            &ValidationOptions::default(),
        );
        assert_eq!(result.issues.as_slice()[0].message, "expected_number");
    }

    #[test]
    fn defaults_follow_synthesized_discriminant() {
        let reg = registry();
        let value = crate::synth::default_value(&ab_object(), &reg).unwrap();
        assert_eq!(value, json!({"type": "a", "x": 0}));
        let checked = validate(&ab_object(), &reg, &value, &ValidationOptions::default());
        assert!(checked.issues.is_empty());
    }

    fn nested_config() -> Node {
        ObjectNode::new()
            .field("type", StringNode::new().enum_values(["a", "b"]))
            .field(
                "config",
                ObjectNode::new().cases(
                    Cases::new(Discriminant::parse("../type").unwrap())
                        .case("a", ObjectNode::new().field("x", NumberNode::new()))
                        .case("b", ObjectNode::new().field("y", NumberNode::new())),
                ),
            )
            .into()
    }

    #[test]
    fn parent_discriminant_is_seen_during_synthesis() {
        let reg = registry();
        let value = crate::synth::default_value(&nested_config(), &reg).unwrap();
        assert_eq!(value, json!({"type": "a", "config": {"x": 0}}));
        let checked = validate(&nested_config(), &reg, &value, &ValidationOptions::default());
        assert!(checked.issues.is_empty(), "{}", checked.issues);
    }

    #[test]
    fn mismatch_replacement_reads_the_document() {
        let result = validate(
            &nested_config(),
            &registry(),
            &json!({"type": "b", "config": 5}),
            &ValidationOptions::default(),
        );
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.value["config"], json!({"y": 0}));
    }

    #[test]
    fn switch_without_active_node_defaults_to_null() {
        let node: Node = ObjectNode::new()
            .field("type", StringNode::new())
            .field(
                "value",
                SwitchNode::new(Discriminant::sibling("type")).case("n", NumberNode::new()),
            )
            .into();
        let reg = registry();
        let value = crate::synth::default_value(&node, &reg).unwrap();
        assert_eq!(value, json!({"type": "", "value": null}));
        let checked = validate(&node, &reg, &value, &ValidationOptions::default());
        assert!(checked.issues.is_empty(), "{}", checked.issues);
    }

    #[test]
    fn switch_default_uses_fallback() {
        let node: Node = ObjectNode::new()
            .field("type", StringNode::new())
            .field(
                "value",
                SwitchNode::new(Discriminant::sibling("type"))
                    .case("text", StringNode::new())
                    .fallback(BooleanNode::new()),
            )
            .into();
        let value = crate::synth::default_value(&node, &registry()).unwrap();
        assert_eq!(value, json!({"type": "", "value": false}));
    }

    #[test]
    fn discriminant_parse() {
        let d = Discriminant::parse("../type").unwrap();
        assert_eq!(d, Discriminant::sibling("type"));
        let located = d.locate(&Path::root().push("value")).unwrap();
        assert_eq!(located, Path::root().push("type"));
        assert!(d.locate(&Path::root()).is_none());
    }

    #[test]
    fn discriminant_reads_non_string_scalars() {
        let d = Discriminant::field("flag");
        assert_eq!(d.read(&Path::root(), &json!({"flag": true})), Some("true".into()));
        assert_eq!(d.read(&Path::root(), &json!({"flag": {}})), None);
    }
}
