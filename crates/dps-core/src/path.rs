//! # Document Paths
//!
//! A [`Path`] is the ordered list of keys from the document root to the
//! current location. Paths are values: `push` and `pop` return new paths
//! so a node can hand a child its own location without affecting siblings.
//!
//! The same type addresses both the document being validated and, when a
//! discriminant must be read, a sibling location reached by rebasing
//! (`pop` then `push("type")`).

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::CoreError;

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Object member name.
    Field(String),
    /// Array position.
    Index(usize),
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Field(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Field(s)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Field(name) => f.write_str(name),
            Key::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A single path rewrite step used when rebasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOp {
    /// Ascend one level. Popping the root fails the rebase.
    Pop,
    /// Descend into a key.
    Push(Key),
    /// Discard everything and restart at the document root.
    Root,
}

impl PathOp {
    /// Parse a path expression into rebase operations.
    ///
    /// Segments are separated by `/`. `..` ascends, a leading `/` restarts
    /// from the root, all-digit segments become array indices and anything
    /// else is a field name:
    ///
    /// - `type` → `[Push("type")]`
    /// - `../type` → `[Pop, Push("type")]`
    /// - `/pools/0` → `[Root, Push("pools"), Push(0)]`
    pub fn parse_expr(expr: &str) -> Result<Vec<PathOp>, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidPathExpr {
            input: expr.to_string(),
            reason: reason.to_string(),
        };

        if expr.is_empty() {
            return Err(invalid("expression is empty"));
        }

        let mut ops = Vec::new();
        let rest = match expr.strip_prefix('/') {
            Some(rest) => {
                ops.push(PathOp::Root);
                rest
            }
            None => expr,
        };
        if rest.is_empty() {
            return Ok(ops);
        }

        for segment in rest.split('/') {
            match segment {
                "" => return Err(invalid("empty segment")),
                ".." => ops.push(PathOp::Pop),
                s if s.bytes().all(|b| b.is_ascii_digit()) => {
                    let index = s
                        .parse::<usize>()
                        .map_err(|e| invalid(&format!("index out of range: {e}")))?;
                    ops.push(PathOp::Push(Key::Index(index)));
                }
                s => ops.push(PathOp::Push(Key::Field(s.to_string()))),
            }
        }
        Ok(ops)
    }
}

/// An immutable pointer into a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    keys: Vec<Key>,
}

impl Path {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path one level deeper.
    pub fn push(&self, key: impl Into<Key>) -> Path {
        let mut keys = self.keys.clone();
        keys.push(key.into());
        Path { keys }
    }

    /// Returns the parent path. The root is its own parent.
    pub fn pop(&self) -> Path {
        let mut keys = self.keys.clone();
        keys.pop();
        Path { keys }
    }

    /// The parent path, or `None` at the root.
    pub fn parent(&self) -> Option<Path> {
        if self.keys.is_empty() {
            None
        } else {
            Some(self.pop())
        }
    }

    /// The final key.
    pub fn last(&self) -> Option<&Key> {
        self.keys.last()
    }

    /// Number of keys from the root.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True at the document root.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Apply rebase operations. Returns `None` if an operation pops past
    /// the root.
    pub fn rebase(&self, ops: &[PathOp]) -> Option<Path> {
        let mut keys = self.keys.clone();
        for op in ops {
            match op {
                PathOp::Pop => {
                    keys.pop()?;
                }
                PathOp::Push(key) => keys.push(key.clone()),
                PathOp::Root => keys.clear(),
            }
        }
        Some(Path { keys })
    }

    /// Look this path up in `root`.
    pub fn resolve<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.keys.iter().try_fold(root, |current, key| match (key, current) {
            (Key::Field(name), Value::Object(map)) => map.get(name),
            (Key::Index(i), Value::Array(items)) => items.get(*i),
            _ => None,
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.keys.is_empty() {
            return f.write_str("/");
        }
        for key in &self.keys {
            write!(f, "/{key}")?;
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
