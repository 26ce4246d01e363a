//! # Choice
//!
//! A structural union: the value's own shape decides which variant applies
//! (a bare string, a list of them, an object). Each variant carries a kind
//! tag, a match predicate over the raw value, a node, and an optional
//! conversion used when an editor switches the active variant.
//!
//! Variant selection: among the variants whose predicate accepts the
//! value, the highest `priority` wins; equal priorities go to the one
//! registered first.

use std::fmt;
use std::sync::Arc;

use dps_core::{Issue, IssueKind, Path};
use serde_json::Value;

use crate::node::{JsonKind, Node};
use crate::registry::Registry;
use crate::synth::{default_value, Synthesis};
use crate::validate::Validation;

/// Predicate deciding whether a raw value belongs to a variant.
pub type MatchFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Conversion from a value of another variant into a seed for this one.
pub type ChangeFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// One alternative of a [`ChoiceNode`].
#[derive(Clone)]
pub struct Variant {
    kind: String,
    node: Node,
    matches: Option<MatchFn>,
    change: Option<ChangeFn>,
    priority: i32,
}

impl Variant {
    /// A variant whose predicate accepts values of `node`'s JSON kind.
    pub fn new(kind: impl Into<String>, node: impl Into<Node>) -> Self {
        Self {
            kind: kind.into(),
            node: node.into(),
            matches: None,
            change: None,
            priority: 0,
        }
    }

    /// Replace the kind-based predicate.
    pub fn matches(mut self, f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.matches = Some(Arc::new(f));
        self
    }

    /// Conversion applied when switching into this variant.
    pub fn change(mut self, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.change = Some(Arc::new(f));
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Whether this variant claims `value`.
    pub fn accepts(&self, value: &Value, registry: &Registry) -> bool {
        match &self.matches {
            Some(f) => f(value),
            None => self
                .node
                .json_kind(registry)
                .map_or(true, |kind| kind == JsonKind::of(value)),
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("kind", &self.kind)
            .field("node", &self.node)
            .field("priority", &self.priority)
            .field("custom_match", &self.matches.is_some())
            .field("custom_change", &self.change.is_some())
            .finish()
    }
}

/// A union selected by the value's shape.
#[derive(Debug, Clone)]
pub struct ChoiceNode {
    variants: Vec<Variant>,
}

impl ChoiceNode {
    pub fn new(variants: Vec<Variant>) -> Self {
        Self { variants }
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// The variant with this kind tag.
    pub fn variant(&self, kind: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.kind == kind)
    }

    /// The variant that claims `value`.
    pub fn active_variant(&self, value: &Value, registry: &Registry) -> Option<&Variant> {
        let mut best: Option<&Variant> = None;
        for variant in &self.variants {
            if !variant.accepts(value, registry) {
                continue;
            }
            if best.map_or(true, |b| variant.priority > b.priority) {
                best = Some(variant);
            }
        }
        best
    }

    /// Convert `value` into a seed for the variant tagged `kind`.
    ///
    /// Uses the variant's own conversion when it has one, otherwise
    /// [`convert_kind`]. If the result is not claimed by the target
    /// variant, the target's default is used instead. Returns `None` for
    /// an unknown kind.
    pub fn change_to(&self, value: &Value, kind: &str, registry: &Registry) -> Option<Value> {
        let target = self.variant(kind)?;
        let seed = match &target.change {
            Some(f) => Some(f(value)),
            None => convert_kind(value, target.node.json_kind(registry)),
        };
        match seed {
            Some(seed) if target.accepts(&seed, registry) => Some(seed),
            _ => default_value(&target.node, registry),
        }
    }

    pub(crate) fn validate(&self, path: &Path, value: &Value, cx: &mut Validation<'_>) -> Value {
        if let Some(variant) = self.active_variant(value, cx.registry()) {
            return variant.node.validate(path, value, cx);
        }

        let kinds: Vec<&str> = self.variants.iter().map(|v| v.kind.as_str()).collect();
        cx.report(
            Issue::error(path.clone(), IssueKind::TypeMismatch, "expected_one_of")
                .with_params(kinds),
        );
        let mut synth = cx.synthesis();
        self.default_value(path, &mut synth)
            .unwrap_or(Value::Null)
    }

    /// The first variant's default.
    pub(crate) fn default_value(&self, path: &Path, cx: &mut Synthesis<'_>) -> Option<Value> {
        self.variants.first()?.node.default_value(path, cx)
    }
}

/// Best-effort conversion of `value` to the JSON kind `target`.
///
/// Values already of that kind are kept; a scalar becomes a one-element
/// list; a list yields its first element when that has the wanted kind.
/// `None` when no sensible conversion exists. An unknown target kind
/// keeps the value.
pub fn convert_kind(value: &Value, target: Option<JsonKind>) -> Option<Value> {
    let Some(target) = target else {
        return Some(value.clone());
    };
    let current = JsonKind::of(value);
    if current == target {
        return Some(value.clone());
    }
    match (value, target) {
        (Value::Array(items), _) => items
            .first()
            .filter(|first| JsonKind::of(first) == target)
            .cloned(),
        (_, JsonKind::List) => Some(Value::Array(vec![value.clone()])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::{ListNode, ObjectNode};
    use crate::primitive::{NumberNode, StringNode};
    use crate::registry::RegistryBuilder;
    use crate::validate::{validate, ValidationOptions};
    use serde_json::json;

    fn registry() -> Registry {
        RegistryBuilder::new().build().unwrap()
    }

    fn string_or_list() -> ChoiceNode {
        ChoiceNode::new(vec![
            Variant::new("string", StringNode::new()),
            Variant::new("list", ListNode::new(StringNode::new())),
        ])
    }

    #[test]
    fn picks_variant_by_shape() {
        let reg = registry();
        let choice = string_or_list();
        assert_eq!(choice.active_variant(&json!("a"), &reg).unwrap().kind(), "string");
        assert_eq!(choice.active_variant(&json!(["a"]), &reg).unwrap().kind(), "list");
        assert!(choice.active_variant(&json!(1), &reg).is_none());
    }

    #[test]
    fn no_variant_is_type_mismatch() {
        let node: Node = string_or_list().into();
        let result = validate(&node, &registry(), &json!(3), &ValidationOptions::default());
        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues.as_slice()[0];
        assert_eq!(issue.kind, IssueKind::TypeMismatch);
        assert_eq!(issue.params, vec!["string".to_string(), "list".to_string()]);
        assert_eq!(result.value, json!(""));
    }

    #[test]
    fn validation_delegates_to_variant() {
        let node: Node = string_or_list().into();
        let result = validate(&node, &registry(), &json!(["a", 2]), &ValidationOptions::default());
        assert_eq!(result.issues.as_slice()[0].path.to_string(), "/1");
    }

    #[test]
    fn priority_breaks_ties_else_first_wins() {
        let reg = registry();
        let choice = ChoiceNode::new(vec![
            Variant::new("low", NumberNode::new()),
            Variant::new("high", NumberNode::new()).priority(5),
            Variant::new("also_high", NumberNode::new()).priority(5),
        ]);
        assert_eq!(choice.active_variant(&json!(1), &reg).unwrap().kind(), "high");

        let tie = ChoiceNode::new(vec![
            Variant::new("first", NumberNode::new()),
            Variant::new("second", NumberNode::new()),
        ]);
        assert_eq!(tie.active_variant(&json!(1), &reg).unwrap().kind(), "first");
    }

    #[test]
    fn custom_match_predicate() {
        let reg = registry();
        let choice = ChoiceNode::new(vec![
            Variant::new("uniform", ObjectNode::new().field("min", NumberNode::new()))
                .matches(|v| v.get("min").is_some()),
            Variant::new("constant", NumberNode::new()),
        ]);
        assert_eq!(
            choice.active_variant(&json!({"min": 1}), &reg).unwrap().kind(),
            "uniform"
        );
        assert!(choice.active_variant(&json!({}), &reg).is_none());
    }

    #[test]
    fn change_wraps_and_unwraps() {
        let reg = registry();
        let choice = string_or_list();
        assert_eq!(choice.change_to(&json!("a"), "list", &reg), Some(json!(["a"])));
        assert_eq!(choice.change_to(&json!(["b", "c"]), "string", &reg), Some(json!("b")));
        assert_eq!(choice.change_to(&json!([]), "string", &reg), Some(json!("")));
        assert_eq!(choice.change_to(&json!("a"), "missing", &reg), None);
    }

    #[test]
    fn custom_change_falls_back_when_unclaimed() {
        let reg = registry();
        let choice = ChoiceNode::new(vec![
            Variant::new("number", NumberNode::new()).change(|_| json!("oops")),
            Variant::new("text", StringNode::new()),
        ]);
        assert_eq!(choice.change_to(&json!("x"), "number", &reg), Some(json!(0)));
    }

    #[test]
    fn convert_kind_rules() {
        assert_eq!(convert_kind(&json!(1), Some(JsonKind::List)), Some(json!([1])));
        assert_eq!(convert_kind(&json!([1, 2]), Some(JsonKind::Number)), Some(json!(1)));
        assert_eq!(convert_kind(&json!(["x"]), Some(JsonKind::Number)), None);
        assert_eq!(convert_kind(&json!({}), Some(JsonKind::String)), None);
        assert_eq!(convert_kind(&json!(true), None), Some(json!(true)));
    }
}
