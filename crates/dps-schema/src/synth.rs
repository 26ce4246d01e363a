//! # Default Synthesis
//!
//! Produces the smallest value a node accepts, used to scaffold new
//! entries in an editor.
//!
//! ## Scope
//!
//! Synthesis builds one document. Objects and lists place themselves in
//! it before filling their children, and every finished field is written
//! back at its absolute path. Enabled predicates and discriminants are
//! therefore evaluated with the same paths validation uses: a field sees
//! every value declared before it anywhere in the document, including
//! the fields of enclosing objects (`../../mode`).
//!
//! When validation replaces a mismatched value, synthesis starts from a
//! copy of the document under validation and builds at the mismatched
//! path.
//!
//! ## Cycles
//!
//! Schemas may reference themselves. Synthesis keeps the stack of
//! reference names it is expanding and stops at the first repeat: the
//! repeated reference yields `None` and the enclosing object omits the
//! field.

use serde_json::Value;

use crate::node::Node;
use crate::registry::Registry;
use crate::validate::ValidationOptions;
use dps_core::{Key, Path};

/// State for one synthesis call.
pub struct Synthesis<'a> {
    registry: &'a Registry,
    root: Value,
    namespace: String,
    stack: Vec<String>,
}

impl<'a> Synthesis<'a> {
    pub fn new(registry: &'a Registry, options: &ValidationOptions) -> Self {
        Self::seeded(registry, options, Value::Null)
    }

    /// Start from an existing document instead of an empty one.
    pub fn seeded(registry: &'a Registry, options: &ValidationOptions, root: Value) -> Self {
        Self {
            registry,
            root,
            namespace: options.default_namespace.clone(),
            stack: Vec::new(),
        }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// The document built so far.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Namespace used when comparing discriminant tags.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Write `value` at `path` of the document. The parent must already
    /// exist; a list index may be at most one past the end.
    pub(crate) fn place(&mut self, path: &Path, value: Value) {
        let Some((last, parents)) = path.keys().split_last() else {
            self.root = value;
            return;
        };
        let mut target = &mut self.root;
        for key in parents {
            let next = match (key, target) {
                (Key::Field(name), Value::Object(map)) => map.get_mut(name),
                (Key::Index(i), Value::Array(items)) => items.get_mut(*i),
                _ => None,
            };
            match next {
                Some(child) => target = child,
                None => return,
            }
        }
        match (last, target) {
            (Key::Field(name), Value::Object(map)) => {
                map.insert(name.clone(), value);
            }
            (Key::Index(i), Value::Array(items)) if *i < items.len() => items[*i] = value,
            (Key::Index(i), Value::Array(items)) if *i == items.len() => items.push(value),
            _ => {}
        }
    }

    /// Push `name` on the expansion stack. Returns false if it is already
    /// being expanded.
    pub(crate) fn enter(&mut self, name: &str) -> bool {
        if self.stack.iter().any(|n| n == name) {
            tracing::trace!(schema = name, "cutting reference cycle during synthesis");
            return false;
        }
        self.stack.push(name.to_string());
        true
    }

    pub(crate) fn leave(&mut self) {
        self.stack.pop();
    }
}

/// Synthesize the default value of `node` with default options.
pub fn default_value(node: &Node, registry: &Registry) -> Option<Value> {
    default_value_with(node, registry, &ValidationOptions::default())
}

/// Synthesize the default value of `node`, matching case tags in the
/// namespace from `options`.
pub fn default_value_with(
    node: &Node,
    registry: &Registry,
    options: &ValidationOptions,
) -> Option<Value> {
    Synthesis::new(registry, options).synthesize(node)
}

impl Synthesis<'_> {
    /// Synthesize `node` as the whole document.
    pub fn synthesize(&mut self, node: &Node) -> Option<Value> {
        node.default_value(&Path::root(), self)
    }
}
