//! # Reference
//!
//! By-name indirection to a registered schema. The name is looked up on
//! every call, never at construction, so a schema can refer to itself or
//! to a schema registered later.

use dps_core::Path;
use serde_json::Value;

use crate::synth::Synthesis;
use crate::validate::{report_unresolved, Validation};

/// A reference to a registered schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    name: String,
}

impl Reference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn validate(&self, path: &Path, value: &Value, cx: &mut Validation<'_>) -> Value {
        if !cx.enter_reference(&self.name, path.len()) {
            report_unresolved(cx, path, "reference_cycle", &self.name);
            return value.clone();
        }
        let out = match cx.registry().schemas().get(&self.name) {
            Ok(target) => target.validate(path, value, cx),
            Err(_) => {
                report_unresolved(cx, path, "unknown_schema", &self.name);
                value.clone()
            }
        };
        cx.leave_reference();
        out
    }

    /// `None` when the name is already being expanded further up.
    pub(crate) fn default_value(&self, path: &Path, cx: &mut Synthesis<'_>) -> Option<Value> {
        let target = match cx.registry().schemas().get(&self.name) {
            Ok(target) => target,
            Err(_) => {
                tracing::warn!(schema = %self.name, "unresolved schema reference during synthesis");
                return None;
            }
        };
        if !cx.enter(&self.name) {
            return None;
        }
        let out = target.default_value(path, cx);
        cx.leave();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::{ChoiceNode, Variant};
    use crate::composite::{ListNode, ObjectNode};
    use crate::node::Node;
    use crate::primitive::{NumberNode, StringNode};
    use crate::registry::RegistryBuilder;
    use crate::validate::{validate, ValidationOptions};
    use dps_core::IssueKind;
    use serde_json::json;

    #[test]
    fn self_reference_validates_nested_values() {
        let mut builder = RegistryBuilder::new();
        builder
            .register_schema(
                "condition",
                ObjectNode::new()
                    .field("name", StringNode::new())
                    .field("terms", Node::from(ListNode::new(Node::reference("condition"))).optional()),
            )
            .unwrap();
        let registry = builder.build().unwrap();

        let doc = json!({
            "name": "all",
            "terms": [
                {"name": "a"},
                {"name": "b", "terms": [{"name": 3}]}
            ]
        });
        let result = registry
            .validate("condition", &doc, &ValidationOptions::default())
            .unwrap();
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues.as_slice()[0].path.to_string(), "/terms/1/terms/0/name");
    }

    #[test]
    fn non_descending_loop_is_reported() {
        let mut builder = RegistryBuilder::new();
        builder
            .register_schema(
                "loop",
                ChoiceNode::new(vec![
                    Variant::new("number", NumberNode::new()),
                    Variant::new("again", Node::reference("loop")).matches(|v| v.is_string()),
                ]),
            )
            .unwrap();
        let registry = builder.build().unwrap();
        let result = validate(
            &Node::reference("loop"),
            &registry,
            &json!("x"),
            &ValidationOptions::default(),
        );
        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues.as_slice()[0];
        assert_eq!(issue.kind, IssueKind::UnresolvedReference);
        assert_eq!(issue.message, "reference_cycle");
        assert_eq!(result.value, json!("x"));
    }
}
