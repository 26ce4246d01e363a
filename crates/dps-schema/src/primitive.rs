//! # Primitive Nodes
//!
//! Strings, numbers and booleans. Each checks the value's JSON kind first;
//! a mismatch is reported once and the node's default is returned in its
//! place. Range and enumeration checks report but never rewrite the value.

use dps_core::{Issue, IssueKind, Path, ResourceId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;
use crate::node::{report_type_mismatch, JsonKind, NameRef};
use crate::registry::Registry;
use crate::resource::ResourceOptions;
use crate::validate::{report_unresolved, Validation};

/// Where a string node's closed option list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumSource {
    /// Options listed on the node itself.
    Inline(Vec<String>),
    /// Options taken from a registered collection.
    Collection(String),
}

impl EnumSource {
    /// Resolve the options.
    pub fn options<'r>(&'r self, registry: &'r Registry) -> Result<&'r [String], SchemaError> {
        match self {
            EnumSource::Inline(values) => Ok(values),
            EnumSource::Collection(name) => registry.collections().get(name),
        }
    }
}

/// Syntactic check applied to free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringFormat {
    /// `namespace:path` identifier, namespace optional.
    ResourceId,
    /// A regular expression that compiles.
    Regex,
    /// A hyphenated or simple UUID.
    Uuid,
}

impl StringFormat {
    fn message(&self) -> &'static str {
        match self {
            StringFormat::ResourceId => "invalid_resource_id",
            StringFormat::Regex => "invalid_regex",
            StringFormat::Uuid => "invalid_uuid",
        }
    }

    fn accepts(&self, s: &str, default_namespace: &str) -> bool {
        match self {
            StringFormat::ResourceId => ResourceId::parse(s, default_namespace).is_ok(),
            StringFormat::Regex => regex::Regex::new(s).is_ok(),
            StringFormat::Uuid => uuid::Uuid::parse_str(s).is_ok(),
        }
    }
}

/// Extra validation on a string's content.
#[derive(Debug, Clone)]
pub enum StringValidator {
    Format(StringFormat),
    Resource(ResourceOptions),
}

/// A string value.
#[derive(Debug, Clone, Default)]
pub struct StringNode {
    enum_values: Option<EnumSource>,
    additional: bool,
    validator: Option<StringValidator>,
}

impl StringNode {
    /// A free-form string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to an inline list of options.
    pub fn enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(EnumSource::Inline(
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Restrict to the options of a registered collection.
    pub fn enum_collection(mut self, collection: impl Into<String>) -> Self {
        self.enum_values = Some(EnumSource::Collection(collection.into()));
        self
    }

    /// Tolerate values outside the enumeration with a warning.
    pub fn additional(mut self, additional: bool) -> Self {
        self.additional = additional;
        self
    }

    pub fn format(mut self, format: StringFormat) -> Self {
        self.validator = Some(StringValidator::Format(format));
        self
    }

    /// Check the string against a resource pool.
    pub fn resource(mut self, options: ResourceOptions) -> Self {
        self.validator = Some(StringValidator::Resource(options));
        self
    }

    pub fn enum_source(&self) -> Option<&EnumSource> {
        self.enum_values.as_ref()
    }

    pub fn validator(&self) -> Option<&StringValidator> {
        self.validator.as_ref()
    }

    pub(crate) fn validate(&self, path: &Path, value: &Value, cx: &mut Validation<'_>) -> Value {
        let Some(s) = value.as_str() else {
            report_type_mismatch(cx, path, JsonKind::String, value);
            return self.default_value(cx.registry());
        };

        if let Some(source) = &self.enum_values {
            match source.options(cx.registry()) {
                Ok(options) if options.iter().any(|o| o == s) => {}
                Ok(_) => {
                    let issue = if self.additional {
                        Issue::warning(path.clone(), IssueKind::InvalidEnum, "invalid_enum_option")
                    } else {
                        Issue::error(path.clone(), IssueKind::InvalidEnum, "invalid_enum_option")
                    };
                    cx.report(issue.with_params([s]));
                }
                Err(_) => {
                    if let EnumSource::Collection(name) = source {
                        report_unresolved(cx, path, "unknown_collection", name);
                    }
                }
            }
        }

        match &self.validator {
            Some(StringValidator::Format(format)) => {
                if !format.accepts(s, &cx.options().default_namespace) {
                    cx.report(
                        Issue::error(path.clone(), IssueKind::InvalidFormat, format.message())
                            .with_params([s]),
                    );
                }
            }
            Some(StringValidator::Resource(resource)) => resource.check(path, s, cx),
            None => {}
        }

        value.clone()
    }

    /// First closed-enum option, else first pool entry, else `""`.
    pub(crate) fn default_value(&self, registry: &Registry) -> Value {
        if !self.additional {
            let first = self
                .enum_values
                .as_ref()
                .and_then(|source| source.options(registry).ok())
                .and_then(|options| options.first());
            if let Some(first) = first {
                return Value::String(first.clone());
            }
        }
        if let Some(StringValidator::Resource(resource)) = &self.validator {
            if let Some(first) = resource.first_entry(registry) {
                return Value::String(first);
            }
        }
        Value::String(String::new())
    }

    pub(crate) fn visit_names<'n>(&'n self, f: &mut dyn FnMut(NameRef<'n>)) {
        if let Some(EnumSource::Collection(name)) = &self.enum_values {
            f(NameRef::Collection(name));
        }
        if let Some(StringValidator::Resource(resource)) = &self.validator {
            if let Some(name) = resource.collection_name() {
                f(NameRef::Collection(name));
            }
        }
    }
}

/// A numeric value.
#[derive(Debug, Clone, Default)]
pub struct NumberNode {
    integer: bool,
    min: Option<f64>,
    max: Option<f64>,
    color: bool,
}

impl NumberNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// An integer-only number.
    pub fn integer() -> Self {
        Self {
            integer: true,
            ..Self::default()
        }
    }

    /// A packed `0xRRGGBB` color: an integer in `0..=0xFFFFFF`.
    pub fn color() -> Self {
        Self {
            integer: true,
            min: Some(0.0),
            max: Some(f64::from(0xFF_FF_FF)),
            color: true,
        }
    }

    /// Inclusive lower bound.
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn is_integer(&self) -> bool {
        self.integer
    }

    /// Whether editors should present the value as a color.
    pub fn is_color(&self) -> bool {
        self.color
    }

    pub fn bounds(&self) -> (Option<f64>, Option<f64>) {
        (self.min, self.max)
    }

    pub(crate) fn validate(&self, path: &Path, value: &Value, cx: &mut Validation<'_>) -> Value {
        let Some(n) = value.as_f64() else {
            report_type_mismatch(cx, path, JsonKind::Number, value);
            return self.default_value();
        };

        if self.integer && !(value.is_i64() || value.is_u64() || n.fract() == 0.0) {
            cx.report(
                Issue::error(path.clone(), IssueKind::InvalidFormat, "expected_integer")
                    .with_params([value]),
            );
        }

        let below = self.min.is_some_and(|min| n < min);
        let above = self.max.is_some_and(|max| n > max);
        if below || above {
            let bound = |b: Option<f64>, open: &str| b.map_or(open.to_string(), |v| v.to_string());
            cx.report(
                Issue::error(path.clone(), IssueKind::OutOfRange, "number_out_of_range").with_params([
                    bound(self.min, "-inf"),
                    bound(self.max, "inf"),
                    value.to_string(),
                ]),
            );
        }

        value.clone()
    }

    /// Zero, moved into the bounds when they exclude it. Integer nodes
    /// clamp into the integers inside the bounds; when there are none the
    /// result sits at the upper bound rounded down and fails validation.
    pub(crate) fn default_value(&self) -> Value {
        let (min, max) = if self.integer {
            (self.min.map(f64::ceil), self.max.map(f64::floor))
        } else {
            (self.min, self.max)
        };
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                tracing::warn!(min = ?self.min, max = ?self.max, "number bounds admit no value");
            }
        }
        let mut d = 0.0_f64;
        if let Some(lo) = min {
            d = d.max(lo);
        }
        if let Some(hi) = max {
            d = d.min(hi);
        }
        number_value(d)
    }
}

/// `d` as a JSON number: an integer when it is whole and fits in `i64`.
fn number_value(d: f64) -> Value {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if d.fract() == 0.0 && (-LIMIT..LIMIT).contains(&d) {
        return Value::from(d as i64);
    }
    serde_json::Number::from_f64(d).map_or(Value::from(0), Value::Number)
}

/// A boolean value.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanNode;

impl BooleanNode {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn validate(&self, path: &Path, value: &Value, cx: &mut Validation<'_>) -> Value {
        if value.is_boolean() {
            value.clone()
        } else {
            report_type_mismatch(cx, path, JsonKind::Boolean, value);
            self.default_value()
        }
    }

    pub(crate) fn default_value(&self) -> Value {
        Value::Bool(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::registry::{Registry, RegistryBuilder};
    use crate::validate::{validate, Validated, ValidationOptions};
    use serde_json::json;

    fn registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        builder
            .register_collection("gamemode", ["survival", "creative"])
            .unwrap();
        builder.build().unwrap()
    }

    fn check(node: impl Into<Node>, value: Value) -> Validated {
        validate(&node.into(), &registry(), &value, &ValidationOptions::default())
    }

    #[test]
    fn wrong_kind_yields_one_mismatch_and_default() {
        let cases: Vec<(Node, Value)> = vec![
            (StringNode::new().into(), json!(5)),
            (NumberNode::new().min(1.0).into(), json!("five")),
            (BooleanNode::new().into(), json!([true])),
        ];
        for (node, value) in cases {
            let result = validate(&node, &registry(), &value, &ValidationOptions::default());
            assert_eq!(result.issues.len(), 1, "{:?}", result.issues);
            assert_eq!(result.issues.as_slice()[0].kind, IssueKind::TypeMismatch);
            let expected = crate::synth::default_value(&node, &registry()).unwrap();
            assert_eq!(result.value, expected);
        }
    }

    #[test]
    fn mismatch_message_names_both_kinds() {
        let result = check(StringNode::new(), json!(true));
        let issue = &result.issues.as_slice()[0];
        assert_eq!(issue.message, "expected_string");
        assert_eq!(issue.params, vec!["boolean".to_string()]);
    }

    #[test]
    fn inline_enum() {
        let node = StringNode::new().enum_values(["a", "b"]);
        assert!(check(node.clone(), json!("a")).is_valid());
        let result = check(node, json!("c"));
        assert!(!result.is_valid());
        assert_eq!(result.issues.as_slice()[0].kind, IssueKind::InvalidEnum);
        assert_eq!(result.value, json!("c"));
    }

    #[test]
    fn additional_enum_downgrades_to_warning() {
        let result = check(StringNode::new().enum_values(["a"]).additional(true), json!("z"));
        assert!(result.is_valid());
        assert_eq!(result.issues.warnings().count(), 1);
    }

    #[test]
    fn collection_enum_and_default() {
        let node = StringNode::new().enum_collection("gamemode");
        assert!(check(node.clone(), json!("creative")).is_valid());
        assert!(!check(node.clone(), json!("hardcore")).is_valid());
        assert_eq!(node.default_value(&registry()), json!("survival"));
    }

    #[test]
    fn formats() {
        let uuid = StringNode::new().format(StringFormat::Uuid);
        assert!(check(uuid.clone(), json!("67e55044-10b1-426f-9247-bb680e5fe0c8")).is_valid());
        assert!(!check(uuid, json!("not-a-uuid")).is_valid());

        let re = StringNode::new().format(StringFormat::Regex);
        assert!(check(re.clone(), json!("^[a-z]+$")).is_valid());
        assert!(!check(re, json!("([unclosed")).is_valid());

        let id = StringNode::new().format(StringFormat::ResourceId);
        assert!(check(id.clone(), json!("stone")).is_valid());
        let result = check(id, json!("Not Valid"));
        assert_eq!(result.issues.as_slice()[0].message, "invalid_resource_id");
    }

    #[test]
    fn range_is_reported_not_clamped() {
        let node = NumberNode::new().min(1.0).max(3.0);
        let result = check(node.clone(), json!(7));
        assert_eq!(result.value, json!(7));
        assert_eq!(result.issues.as_slice()[0].kind, IssueKind::OutOfRange);
        assert_eq!(result.issues.len(), 1);
        assert!(check(node, json!(3)).is_valid());
    }

    #[test]
    fn integer_rejects_fractions() {
        let node = NumberNode::integer();
        assert!(check(node.clone(), json!(4)).is_valid());
        assert!(check(node.clone(), json!(4.0)).is_valid());
        let result = check(node, json!(4.5));
        assert_eq!(result.issues.as_slice()[0].message, "expected_integer");
    }

    #[test]
    fn number_defaults_respect_bounds() {
        assert_eq!(NumberNode::new().default_value(), json!(0));
        assert_eq!(NumberNode::new().min(2.0).default_value(), json!(2));
        assert_eq!(NumberNode::new().max(-1.5).default_value(), json!(-1.5));
        assert_eq!(NumberNode::integer().min(0.5).default_value(), json!(1));
        assert_eq!(NumberNode::integer().min(0.5).max(1.7).default_value(), json!(1));
        assert_eq!(NumberNode::integer().min(-3.5).max(-1.2).default_value(), json!(-2));
        assert_eq!(NumberNode::integer().max(-0.5).default_value(), json!(-1));
        // No integer between the bounds; the default never exceeds max.
        assert_eq!(NumberNode::integer().min(0.5).max(0.7).default_value(), json!(0));
        // Bounds beyond i64 stay whole instead of saturating.
        assert_eq!(NumberNode::integer().min(1e20).default_value(), json!(1e20));
        assert_eq!(NumberNode::color().default_value(), json!(0));
    }

    #[test]
    fn color_bounds() {
        let node = NumberNode::color();
        assert!(node.is_color());
        assert!(check(node.clone(), json!(0xFFFFFF)).is_valid());
        assert!(!check(node, json!(0x1000000)).is_valid());
    }
}
