//! # Composite Nodes
//!
//! Objects with a fixed field set, homogeneous lists, and maps whose key
//! set comes from the document.
//!
//! ## Object field policy
//!
//! An object validates its declared fields, not the document's keys:
//! unknown keys are carried through untouched and, unless the caller asks
//! for them, not reported. An absent field is reported as missing unless
//! its node is optional or disabled at that path. When the object carries
//! a [`Cases`] table, the fields of the case selected by the discriminant
//! are added to the declared set for this pass only.

use dps_core::{Issue, IssueKind, Path};
use serde_json::{Map, Value};

use crate::node::{report_type_mismatch, JsonKind, Node};
use crate::switch::Cases;
use crate::synth::Synthesis;
use crate::validate::Validation;

/// A named member of an object.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub node: Node,
}

impl Field {
    pub fn new(name: impl Into<String>, node: impl Into<Node>) -> Self {
        Self {
            name: name.into(),
            node: node.into(),
        }
    }
}

/// An object with named fields.
#[derive(Debug, Clone, Default)]
pub struct ObjectNode {
    fields: Vec<Field>,
    cases: Option<Cases>,
}

impl ObjectNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field. Declaration order is synthesis order.
    pub fn field(mut self, name: impl Into<String>, node: impl Into<Node>) -> Self {
        self.fields.push(Field::new(name, node));
        self
    }

    /// Attach a discriminated case table.
    pub fn cases(mut self, cases: Cases) -> Self {
        self.cases = Some(cases);
        self
    }

    /// The statically declared fields.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn case_table(&self) -> Option<&Cases> {
        self.cases.as_ref()
    }

    /// Declared fields plus the fields of every case.
    pub(crate) fn all_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().chain(
            self.cases
                .iter()
                .flat_map(|cases| cases.cases().iter().flat_map(|case| case.fields())),
        )
    }

    /// Declared fields plus the fields of the case active for the object
    /// at `path` of `root`.
    pub fn active_fields(&self, path: &Path, root: &Value, namespace: &str) -> Vec<&Field> {
        let mut fields: Vec<&Field> = self.fields.iter().collect();
        if let Some(case) = self
            .cases
            .as_ref()
            .and_then(|cases| cases.active(path, root, namespace))
        {
            fields.extend(case.fields());
        }
        fields
    }

    pub(crate) fn validate(&self, path: &Path, value: &Value, cx: &mut Validation<'_>) -> Value {
        let Some(map) = value.as_object() else {
            report_type_mismatch(cx, path, JsonKind::Object, value);
            let mut synth = cx.synthesis();
            return self
                .default_value(path, &mut synth)
                .unwrap_or_else(|| Value::Object(Map::new()));
        };

        let registry = cx.registry();
        let root = cx.root();
        let active = self.active_fields(path, root, &cx.options().default_namespace);
        let mut out = map.clone();

        for field in &active {
            let field_path = path.push(field.name.as_str());
            if !field.node.is_enabled_at(&field_path, root, registry) {
                continue;
            }
            match map.get(&field.name) {
                Some(child) => {
                    let checked = field.node.validate(&field_path, child, cx);
                    out.insert(field.name.clone(), checked);
                }
                None if field.node.is_optional(registry) => {}
                None => cx.report(
                    Issue::error(field_path, IssueKind::MissingField, "missing_field")
                        .with_params([field.name.as_str()]),
                ),
            }
        }

        if cx.options().report_unknown_keys {
            for key in map.keys() {
                if !active.iter().any(|f| &f.name == key) {
                    cx.report(
                        Issue::warning(path.push(key.as_str()), IssueKind::UnknownKey, "unknown_key")
                            .with_params([key]),
                    );
                }
            }
        }

        Value::Object(out)
    }

    /// Each enabled field's default, in declaration order, then the active
    /// case's fields. Every field is written into the document as soon as
    /// it exists so later predicates can read it.
    pub(crate) fn default_value(&self, path: &Path, cx: &mut Synthesis<'_>) -> Option<Value> {
        cx.place(path, Value::Object(Map::new()));
        let mut out = Map::new();
        synthesize_fields(&self.fields, path, &mut out, cx);

        if let Some(cases) = &self.cases {
            if let Some(case) = cases.active(path, cx.root(), cx.namespace()) {
                synthesize_fields(case.fields(), path, &mut out, cx);
            }
        }

        Some(Value::Object(out))
    }
}

fn synthesize_fields(
    fields: &[Field],
    path: &Path,
    out: &mut Map<String, Value>,
    cx: &mut Synthesis<'_>,
) {
    let registry = cx.registry();
    for field in fields {
        let field_path = path.push(field.name.as_str());
        if !field.node.is_enabled_at(&field_path, cx.root(), registry) {
            continue;
        }
        if let Some(value) = field.node.default_value(&field_path, cx) {
            cx.place(&field_path, value.clone());
            out.insert(field.name.clone(), value);
        }
    }
}

/// A homogeneous list.
#[derive(Debug, Clone)]
pub struct ListNode {
    element: Box<Node>,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl ListNode {
    pub fn new(element: impl Into<Node>) -> Self {
        Self {
            element: Box::new(element.into()),
            min_length: None,
            max_length: None,
        }
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn element(&self) -> &Node {
        &self.element
    }

    pub(crate) fn validate(&self, path: &Path, value: &Value, cx: &mut Validation<'_>) -> Value {
        let Some(items) = value.as_array() else {
            report_type_mismatch(cx, path, JsonKind::List, value);
            let mut synth = cx.synthesis();
            return self
                .default_value(path, &mut synth)
                .unwrap_or_else(|| Value::Array(Vec::new()));
        };

        if let Some(min) = self.min_length.filter(|min| items.len() < *min) {
            cx.report(
                Issue::error(path.clone(), IssueKind::OutOfRange, "list_too_short")
                    .with_params([min, items.len()]),
            );
        }
        if let Some(max) = self.max_length.filter(|max| items.len() > *max) {
            cx.report(
                Issue::error(path.clone(), IssueKind::OutOfRange, "list_too_long")
                    .with_params([max, items.len()]),
            );
        }

        let checked = items
            .iter()
            .enumerate()
            .map(|(i, item)| self.element.validate(&path.push(i), item, cx))
            .collect();
        Value::Array(checked)
    }

    /// `min_length` copies of the element default.
    pub(crate) fn default_value(&self, path: &Path, cx: &mut Synthesis<'_>) -> Option<Value> {
        let count = self.min_length.unwrap_or(0);
        cx.place(path, Value::Array(Vec::new()));
        let mut items = Vec::with_capacity(count);
        for i in 0..count {
            let item_path = path.push(i);
            match self.element.default_value(&item_path, cx) {
                Some(item) => {
                    cx.place(&item_path, item.clone());
                    items.push(item);
                }
                None => break,
            }
        }
        Some(Value::Array(items))
    }
}

/// An object whose keys come from the document.
#[derive(Debug, Clone)]
pub struct MapNode {
    key: Box<Node>,
    value: Box<Node>,
}

impl MapNode {
    /// `key` validates each key as a string value; `value` each entry.
    pub fn new(key: impl Into<Node>, value: impl Into<Node>) -> Self {
        Self {
            key: Box::new(key.into()),
            value: Box::new(value.into()),
        }
    }

    pub fn key(&self) -> &Node {
        &self.key
    }

    pub fn value(&self) -> &Node {
        &self.value
    }

    pub(crate) fn validate(&self, path: &Path, value: &Value, cx: &mut Validation<'_>) -> Value {
        let Some(map) = value.as_object() else {
            report_type_mismatch(cx, path, JsonKind::Object, value);
            return self.default_value();
        };

        let mut out = Map::new();
        for (key, entry) in map {
            let entry_path = path.push(key.as_str());
            self.key.validate(&entry_path, &Value::String(key.clone()), cx);
            let checked = self.value.validate(&entry_path, entry, cx);
            out.insert(key.clone(), checked);
        }
        Value::Object(out)
    }

    pub(crate) fn default_value(&self) -> Value {
        Value::Object(Map::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{BooleanNode, NumberNode, StringNode};
    use crate::registry::{Registry, RegistryBuilder};
    use crate::resource::ResourceOptions;
    use crate::validate::{validate, Validated, ValidationOptions};
    use serde_json::json;

    fn registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        builder
            .register_collection("item", ["minecraft:apple", "minecraft:stick"])
            .unwrap();
        builder.build().unwrap()
    }

    fn check(node: impl Into<Node>, value: Value) -> Validated {
        validate(&node.into(), &registry(), &value, &ValidationOptions::default())
    }

    #[test]
    fn object_validates_declared_fields_only() {
        let node = ObjectNode::new()
            .field("count", NumberNode::integer())
            .field("name", StringNode::new());
        let result = check(node, json!({"count": 2, "name": "x", "extra": [1]}));
        assert!(result.issues.is_empty());
        assert_eq!(result.value["extra"], json!([1]));
    }

    #[test]
    fn object_reports_missing_required_field() {
        let node = ObjectNode::new()
            .field("count", NumberNode::new())
            .field("note", Node::from(StringNode::new()).optional());
        let result = check(node, json!({}));
        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues.as_slice()[0];
        assert_eq!(issue.kind, IssueKind::MissingField);
        assert_eq!(issue.path, Path::root().push("count"));
    }

    #[test]
    fn object_errors_accumulate() {
        let node = ObjectNode::new()
            .field("a", NumberNode::new())
            .field("b", BooleanNode::new())
            .field("c", StringNode::new());
        let result = check(node, json!({"a": "x", "b": 1, "c": false}));
        assert_eq!(result.issues.len(), 3);
        assert_eq!(result.value, json!({"a": 0, "b": false, "c": ""}));
    }

    #[test]
    fn unknown_keys_reported_on_request() {
        let node: Node = ObjectNode::new().field("a", NumberNode::new()).into();
        let opts = ValidationOptions {
            report_unknown_keys: true,
            ..ValidationOptions::default()
        };
        let result = validate(&node, &registry(), &json!({"a": 1, "b": 2}), &opts);
        assert!(result.is_valid());
        let warning = result.issues.warnings().next().unwrap();
        assert_eq!(warning.kind, IssueKind::UnknownKey);
        assert_eq!(warning.path.to_string(), "/b");
    }

    #[test]
    fn object_mismatch_returns_default() {
        let node = ObjectNode::new().field("a", NumberNode::new().min(5.0));
        let result = check(node, json!("nope"));
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.value, json!({"a": 5}));
    }

    #[test]
    fn list_length_bounds() {
        let node = ListNode::new(NumberNode::new()).min_length(1).max_length(3);
        let empty = check(node.clone(), json!([]));
        assert_eq!(empty.issues.len(), 1);
        assert_eq!(empty.issues.as_slice()[0].kind, IssueKind::OutOfRange);

        let long = check(node.clone(), json!([1, 2, 3, 4]));
        assert_eq!(long.issues.len(), 1);
        assert_eq!(long.issues.as_slice()[0].message, "list_too_long");

        let long_and_bad = check(node, json!([1, "x", 3, "y"]));
        assert_eq!(long_and_bad.issues.len(), 3);
        assert_eq!(long_and_bad.value, json!([1, 0, 3, 0]));
    }

    #[test]
    fn list_element_paths() {
        let node = ListNode::new(StringNode::new());
        let result = check(node, json!(["a", 2]));
        assert_eq!(result.issues.as_slice()[0].path.to_string(), "/1");
    }

    #[test]
    fn list_default_fills_min_length() {
        let node: Node = ListNode::new(BooleanNode::new()).min_length(2).into();
        let value = crate::synth::default_value(&node, &registry()).unwrap();
        assert_eq!(value, json!([false, false]));
    }

    #[test]
    fn map_validates_keys_and_values() {
        let node = MapNode::new(
            StringNode::new().resource(ResourceOptions::collection("item")),
            NumberNode::integer().min(1.0),
        );
        let ok = check(node.clone(), json!({"apple": 2, "minecraft:stick": 1}));
        assert!(ok.issues.is_empty(), "{:?}", ok.issues);

        let bad = check(node, json!({"diamond": 2, "stick": 0}));
        assert_eq!(bad.issues.len(), 2);
        let kinds: Vec<IssueKind> = bad.issues.iter().map(|i| i.kind).collect();
        assert!(kinds.contains(&IssueKind::UnknownResource));
        assert!(kinds.contains(&IssueKind::OutOfRange));
    }

    #[test]
    fn map_default_is_empty() {
        let node = MapNode::new(StringNode::new(), NumberNode::new());
        assert_eq!(node.default_value(), json!({}));
    }
}
