//! # Resource Identifiers
//!
//! Namespaced identifiers of the form `namespace:path`. The namespace may
//! be omitted in documents, in which case a default namespace is implied;
//! comparisons between identifiers always happen on the normalized form.
//!
//! A leading [`TAG_SIGIL`] marks a tag reference (`#namespace:group`):
//! the string names a group of identifiers rather than one identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Prefix marking a tag reference.
pub const TAG_SIGIL: char = '#';

/// A parsed `namespace:path` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    pub namespace: String,
    pub path: String,
}

fn valid_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.')
}

fn valid_path_char(c: char) -> bool {
    valid_namespace_char(c) || c == '/'
}

impl ResourceId {
    /// Parse an identifier, filling in `default_namespace` when the input
    /// has no `:`.
    pub fn parse(input: &str, default_namespace: &str) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidResourceId {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (namespace, path) = match input.split_once(':') {
            Some((ns, path)) => {
                if ns.is_empty() {
                    return Err(invalid("namespace is empty"));
                }
                (ns, path)
            }
            None => (default_namespace, input),
        };

        if path.is_empty() {
            return Err(invalid("path is empty"));
        }
        if let Some(c) = namespace.chars().find(|c| !valid_namespace_char(*c)) {
            return Err(invalid(&format!("illegal character '{c}' in namespace")));
        }
        if let Some(c) = path.chars().find(|c| !valid_path_char(*c)) {
            return Err(invalid(&format!("illegal character '{c}' in path")));
        }

        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Parse and render back in normalized `namespace:path` form.
    pub fn normalize(input: &str, default_namespace: &str) -> Result<String, CoreError> {
        Self::parse(input, default_namespace).map(|id| id.to_string())
    }

    /// If `input` is a tag reference, return the identifier after the sigil.
    pub fn strip_tag(input: &str) -> Option<&str> {
        input.strip_prefix(TAG_SIGIL)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}
