//! # Mod
//!
//! A decorator over another node. It leaves the inner node's shape alone
//! and overrides selected behavior: the synthesized default, whether the
//! node is enabled at a path, and validation itself (usually to call the
//! inner validation and then add a cross-field check). Context and
//! category tags ride along for presentation layers and are ignored here.

use std::fmt;
use std::sync::Arc;

use dps_core::{Path, PathOp};
use serde_json::Value;

use crate::node::Node;
use crate::registry::Registry;
use crate::synth::Synthesis;
use crate::validate::Validation;

/// Supplies a default independent of the inner node.
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Decides whether the node participates at a path of a document root.
pub type EnabledFn = Arc<dyn Fn(&Path, &Value) -> bool + Send + Sync>;

/// Replaces validation. Receives the inner node so it can delegate.
pub type ValidateFn =
    Arc<dyn Fn(&Node, &Path, &Value, &mut Validation<'_>) -> Value + Send + Sync>;

/// A node with overridden behavior.
#[derive(Clone)]
pub struct ModNode {
    inner: Box<Node>,
    default: Option<DefaultFn>,
    enabled: Option<EnabledFn>,
    validate: Option<ValidateFn>,
    context: Option<String>,
    category: Option<String>,
}

impl ModNode {
    pub fn new(inner: impl Into<Node>) -> Self {
        Self {
            inner: Box::new(inner.into()),
            default: None,
            enabled: None,
            validate: None,
            context: None,
            category: None,
        }
    }

    /// Synthesize with `f` instead of the inner node.
    pub fn default_with(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(Arc::new(f));
        self
    }

    /// Synthesize a fixed value.
    pub fn default_literal(self, value: Value) -> Self {
        self.default_with(move || value.clone())
    }

    /// Participate only where `f` holds.
    pub fn enabled(mut self, f: impl Fn(&Path, &Value) -> bool + Send + Sync + 'static) -> Self {
        self.enabled = Some(Arc::new(f));
        self
    }

    /// Participate only where the value at `ops` (applied to this node's
    /// path) equals `expected`.
    pub fn enabled_when(self, ops: Vec<PathOp>, expected: Value) -> Self {
        self.enabled(move |path, root| {
            path.rebase(&ops)
                .and_then(|location| location.resolve(root).cloned())
                .is_some_and(|found| found == expected)
        })
    }

    /// Replace validation.
    pub fn validate_with(
        mut self,
        f: impl Fn(&Node, &Path, &Value, &mut Validation<'_>) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(Arc::new(f));
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn inner(&self) -> &Node {
        &self.inner
    }

    pub fn context_tag(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn category_tag(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub(crate) fn validate(&self, path: &Path, value: &Value, cx: &mut Validation<'_>) -> Value {
        match &self.validate {
            Some(f) => f(&self.inner, path, value, cx),
            None => self.inner.validate(path, value, cx),
        }
    }

    pub(crate) fn default_value(&self, path: &Path, cx: &mut Synthesis<'_>) -> Option<Value> {
        match &self.default {
            Some(f) => Some(f()),
            None => self.inner.default_value(path, cx),
        }
    }

    pub(crate) fn is_enabled_at(&self, path: &Path, root: &Value, registry: &Registry) -> bool {
        match &self.enabled {
            Some(f) => f(path, root),
            None => self.inner.is_enabled_at(path, root, registry),
        }
    }
}

impl fmt::Debug for ModNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModNode")
            .field("inner", &self.inner)
            .field("default", &self.default.is_some())
            .field("enabled", &self.enabled.is_some())
            .field("validate", &self.validate.is_some())
            .field("context", &self.context)
            .field("category", &self.category)
            .finish()
    }
}
