//! # Validation Issues
//!
//! Per-document problems found during a validation pass. A pass never
//! aborts on bad data: each node records what it found in the [`Issues`]
//! sink and hands back a best-effort value, so an editor can show every
//! problem at its path at once.
//!
//! Messages are keys (`expected_string`, `number_out_of_range`) plus
//! positional parameters. Rendering them for humans is left to the
//! presentation layer; `Display` gives a plain fallback.

use std::fmt;

use serde::Serialize;

use crate::path::Path;

/// Classification of a validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The value's JSON kind does not match the node.
    TypeMismatch,
    /// A numeric or length bound was violated.
    OutOfRange,
    /// A required field is absent.
    MissingField,
    /// A string is not one of the node's enumerated options.
    InvalidEnum,
    /// A string does not satisfy its format validator.
    InvalidFormat,
    /// An identifier is not part of its resource pool.
    UnknownResource,
    /// An object key outside the active field set (only when requested).
    UnknownKey,
    /// A custom check spanning several fields failed.
    CrossFieldViolation,
    /// A schema or collection name could not be resolved mid-pass.
    UnresolvedReference,
}

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// A single problem at a document location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Where in the document the problem was found.
    pub path: Path,
    pub kind: IssueKind,
    pub severity: Severity,
    /// Message key, e.g. `expected_number`.
    pub message: String,
    /// Positional message parameters.
    pub params: Vec<String>,
}

impl Issue {
    /// Create an error-severity issue.
    pub fn error(path: Path, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            severity: Severity::Error,
            message: message.into(),
            params: Vec::new(),
        }
    }

    /// Create a warning-severity issue.
    pub fn warning(path: Path, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(path, kind, message)
        }
    }

    /// Attach message parameters.
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.params = params.into_iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "  {}: {level}: {}", self.path, self.message)?;
        if !self.params.is_empty() {
            write!(f, " ({})", self.params.join(", "))?;
        }
        Ok(())
    }
}

/// Ordered, append-only issue accumulator.
///
/// Create one per validation call. Sharing a sink between calls mixes
/// their results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Issues {
    issues: Vec<Issue>,
}

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue.
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Returns the number of issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// True if any error-severity issue was recorded.
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }

    /// Error-severity issues, in recording order.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    /// Warning-severity issues, in recording order.
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| !i.is_error())
    }

    /// Issues recorded exactly at `path`.
    pub fn at<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues.iter().filter(move |i| &i.path == path)
    }

    pub fn as_slice(&self) -> &[Issue] {
        &self.issues
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_vec(self) -> Vec<Issue> {
        self.issues
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path_and_params() {
        let issue = Issue::error(
            Path::root().push("rolls"),
            IssueKind::OutOfRange,
            "number_out_of_range",
        )
        .with_params([1, 3]);
        let display = issue.to_string();
        assert!(display.contains("/rolls"));
        assert!(display.contains("error: number_out_of_range (1, 3)"));
    }

    #[test]
    fn sink_keeps_order_and_splits_severity() {
        let mut issues = Issues::new();
        issues.push(Issue::warning(Path::root(), IssueKind::UnknownKey, "unknown_key"));
        issues.push(Issue::error(
            Path::root().push("x"),
            IssueKind::MissingField,
            "missing_field",
        ));
        assert_eq!(issues.len(), 2);
        assert!(issues.has_errors());
        assert_eq!(issues.errors().count(), 1);
        assert_eq!(issues.warnings().count(), 1);
        assert_eq!(issues.as_slice()[0].kind, IssueKind::UnknownKey);
        let x = Path::root().push("x");
        assert_eq!(issues.at(&x).count(), 1);
    }

    #[test]
    fn warnings_alone_are_not_errors() {
        let mut issues = Issues::new();
        issues.push(Issue::warning(
            Path::root(),
            IssueKind::UnknownResource,
            "unknown_resource",
        ));
        assert!(!issues.has_errors());
    }

    #[test]
    fn serializes_path_as_string() {
        let issue = Issue::error(Path::root().push("a").push(2), IssueKind::TypeMismatch, "expected_string");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["path"], "/a/2");
        assert_eq!(json["kind"], "type_mismatch");
        assert_eq!(json["severity"], "error");
    }
}
