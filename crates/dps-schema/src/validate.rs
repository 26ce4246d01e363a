//! # Validation
//!
//! A validation pass walks a node tree alongside a document. Each call
//! gets a fresh [`Validation`] context holding the frozen registry, the
//! document root (for discriminant and cross-field lookups), the options
//! and the issue sink. Nothing in the registry or the nodes is mutated,
//! so passes over different documents can run side by side against the
//! same registry.
//!
//! ## Termination
//!
//! Every descent into a child node moves into a sub-value, so a pass is
//! bounded by the depth of the document. The one way to recurse without
//! descending is a reference that comes back to itself at the same path
//! (a choice variant referencing its own schema, say); the context tracks
//! active references per depth and reports such a loop instead of
//! following it.

use dps_core::{Issue, IssueKind, Issues, Path};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node::Node;
use crate::registry::Registry;
use crate::synth::Synthesis;

/// Namespace implied by identifiers written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Per-call validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationOptions {
    /// Report object keys outside the active field set as warnings.
    pub report_unknown_keys: bool,
    /// Check resource identifiers against their pools. When false only
    /// identifier syntax is checked.
    pub check_resources: bool,
    /// Namespace used to normalize identifiers written without one.
    pub default_namespace: String,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            report_unknown_keys: false,
            check_resources: true,
            default_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// The outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validated {
    /// Best-effort value: mismatched parts replaced by defaults.
    pub value: Value,
    /// Every problem found, in document walk order.
    pub issues: Issues,
}

impl Validated {
    /// True when no error-severity issue was found.
    pub fn is_valid(&self) -> bool {
        !self.issues.has_errors()
    }
}

/// State for one validation pass.
pub struct Validation<'a> {
    registry: &'a Registry,
    root: &'a Value,
    options: &'a ValidationOptions,
    issues: Issues,
    active_refs: Vec<(String, usize)>,
}

impl<'a> Validation<'a> {
    /// Start a pass over `root`.
    pub fn new(registry: &'a Registry, root: &'a Value, options: &'a ValidationOptions) -> Self {
        Self {
            registry,
            root,
            options,
            issues: Issues::new(),
            active_refs: Vec::new(),
        }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// The whole document being validated.
    pub fn root(&self) -> &'a Value {
        self.root
    }

    pub fn options(&self) -> &'a ValidationOptions {
        self.options
    }

    /// Look up an absolute path in the document.
    pub fn get(&self, path: &Path) -> Option<&'a Value> {
        path.resolve(self.root)
    }

    /// Record an issue.
    pub fn report(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Issues recorded so far.
    pub fn issues(&self) -> &Issues {
        &self.issues
    }

    pub fn into_issues(self) -> Issues {
        self.issues
    }

    /// A synthesis context seeded with a copy of the document, for
    /// replacing mismatched values with defaults.
    pub fn synthesis(&self) -> Synthesis<'a> {
        Synthesis::seeded(self.registry, self.options, self.root.clone())
    }

    /// Mark `name` as being resolved at `depth`. Returns false if it is
    /// already being resolved there.
    pub(crate) fn enter_reference(&mut self, name: &str, depth: usize) -> bool {
        if self
            .active_refs
            .iter()
            .any(|(active, at)| *at == depth && active == name)
        {
            return false;
        }
        self.active_refs.push((name.to_string(), depth));
        true
    }

    pub(crate) fn leave_reference(&mut self) {
        self.active_refs.pop();
    }
}

/// Validate `value` against `node`.
pub fn validate(
    node: &Node,
    registry: &Registry,
    value: &Value,
    options: &ValidationOptions,
) -> Validated {
    let mut cx = Validation::new(registry, value, options);
    let value = node.validate(&Path::root(), value, &mut cx);
    let issues = cx.into_issues();
    tracing::debug!(
        errors = issues.errors().count(),
        warnings = issues.warnings().count(),
        "validation pass complete"
    );
    Validated { value, issues }
}

/// Record a missing-schema or missing-collection issue mid-pass.
pub(crate) fn report_unresolved(cx: &mut Validation<'_>, path: &Path, message: &str, name: &str) {
    tracing::warn!(name, path = %path, "unresolved name during validation");
    cx.report(
        Issue::error(path.clone(), IssueKind::UnresolvedReference, message).with_params([name]),
    );
}
