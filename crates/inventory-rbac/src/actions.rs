//! # Verbs
//!
//! Defines the verbs that terminate every action string.
//! An action such as `/inventory/42/read` is a resource path followed by a verb.

use serde::{Deserialize, Serialize};

/// Verbs that can be performed on resources.
///
/// Every concrete action and every non-wildcard pattern ends in one of these:
/// - **Read**: View resource data
/// - **Write**: Create or modify resource data
/// - **Delete**: Remove resource instances
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    /// Read/view resource.
    Read,

    /// Create or update resource.
    Write,

    /// Delete resource.
    ///
    /// Grants permission to permanently remove resources.
    Delete,
}

impl Verb {
    /// Get the string representation of the verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Read => "read",
            Verb::Write => "write",
            Verb::Delete => "delete",
        }
    }

    /// Get the path suffix this verb contributes to an action (e.g. `/read`).
    pub fn suffix(&self) -> &'static str {
        match self {
            Verb::Read => "/read",
            Verb::Write => "/write",
            Verb::Delete => "/delete",
        }
    }

    /// Get all verbs.
    pub fn all() -> Vec<Self> {
        vec![Verb::Read, Verb::Write, Verb::Delete]
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
