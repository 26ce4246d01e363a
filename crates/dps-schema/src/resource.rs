//! # Resource Pools
//!
//! A resource-validated string must be a well-formed identifier and, unless
//! the pool is open, a member of its pool. Pools are compared on the
//! normalized `namespace:path` form, so `stone` and `minecraft:stone` are
//! the same entry under the default namespace.
//!
//! Tag references (`#minecraft:logs`) are a separate value class: when a
//! field allows them they are syntax-checked and accepted, but not looked
//! up in the pool.

use dps_core::{Issue, IssueKind, Path, ResourceId};
use serde_json::Value;

use crate::registry::Registry;
use crate::validate::{report_unresolved, Validation};

/// The set of identifiers a resource string may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourcePool {
    /// Members of a registered collection.
    Collection(String),
    /// Members listed inline.
    Inline(Vec<String>),
    /// Any well-formed identifier.
    Open,
}

/// Resource validation settings for a string node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOptions {
    pool: ResourcePool,
    allow_tag: bool,
    allow_unknown: bool,
}

impl ResourceOptions {
    pub fn new(pool: ResourcePool) -> Self {
        Self {
            pool,
            allow_tag: false,
            allow_unknown: false,
        }
    }

    /// Pool drawn from a registered collection.
    pub fn collection(name: impl Into<String>) -> Self {
        Self::new(ResourcePool::Collection(name.into()))
    }

    /// Pool listed inline.
    pub fn inline<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ResourcePool::Inline(values.into_iter().map(Into::into).collect()))
    }

    /// An open identifier namespace.
    pub fn open() -> Self {
        Self::new(ResourcePool::Open)
    }

    /// Accept `#`-prefixed tag references.
    pub fn allow_tag(mut self, allow: bool) -> Self {
        self.allow_tag = allow;
        self
    }

    /// Report identifiers outside the pool as warnings instead of errors.
    pub fn allow_unknown(mut self, allow: bool) -> Self {
        self.allow_unknown = allow;
        self
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn allows_tag(&self) -> bool {
        self.allow_tag
    }

    pub fn allows_unknown(&self) -> bool {
        self.allow_unknown
    }

    /// True when membership is never checked: an open pool, or an empty
    /// inline pool that allows unknown values.
    pub fn is_open(&self) -> bool {
        match &self.pool {
            ResourcePool::Open => true,
            ResourcePool::Inline(values) => values.is_empty() && self.allow_unknown,
            ResourcePool::Collection(_) => false,
        }
    }

    pub(crate) fn collection_name(&self) -> Option<&str> {
        match &self.pool {
            ResourcePool::Collection(name) => Some(name),
            _ => None,
        }
    }

    pub(crate) fn first_entry(&self, registry: &Registry) -> Option<String> {
        match &self.pool {
            ResourcePool::Collection(name) => {
                registry.collections().get(name).ok()?.first().cloned()
            }
            ResourcePool::Inline(values) => values.first().cloned(),
            ResourcePool::Open => None,
        }
    }

    pub(crate) fn check(&self, path: &Path, s: &str, cx: &mut Validation<'_>) {
        let namespace = cx.options().default_namespace.as_str();

        let (is_tag, raw) = match ResourceId::strip_tag(s) {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if is_tag && !self.allow_tag {
            cx.report(
                Issue::error(path.clone(), IssueKind::InvalidFormat, "tag_not_allowed")
                    .with_params([s]),
            );
            return;
        }

        let id = match ResourceId::parse(raw, namespace) {
            Ok(id) => id.to_string(),
            Err(_) => {
                cx.report(
                    Issue::error(path.clone(), IssueKind::InvalidFormat, "invalid_resource_id")
                        .with_params([s]),
                );
                return;
            }
        };

        if is_tag || self.is_open() || !cx.options().check_resources {
            return;
        }

        let (entries, pool_name): (&[String], &str) = match &self.pool {
            ResourcePool::Inline(values) => (values, "inline"),
            ResourcePool::Collection(name) => match cx.registry().collections().get(name) {
                Ok(values) => (values, name),
                Err(_) => {
                    report_unresolved(cx, path, "unknown_collection", name);
                    return;
                }
            },
            ResourcePool::Open => return,
        };

        let known = entries
            .iter()
            .any(|entry| ResourceId::normalize(entry, namespace).is_ok_and(|e| e == id));
        if known {
            return;
        }

        let issue = if self.allow_unknown {
            Issue::warning(path.clone(), IssueKind::UnknownResource, "unknown_resource")
        } else {
            Issue::error(path.clone(), IssueKind::UnknownResource, "unknown_resource")
        };
        cx.report(issue.with_params([id.as_str(), pool_name]));
    }
}

/// Whether a discriminant value selects a case tag: an exact match, or
/// both sides equal after identifier normalization.
pub(crate) fn tag_matches(tag: &str, value: &str, namespace: &str) -> bool {
    if tag == value {
        return true;
    }
    match (
        ResourceId::normalize(tag, namespace),
        ResourceId::normalize(value, namespace),
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Render a discriminant value as a tag string.
pub(crate) fn discriminant_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
