//! # Action Patterns
//!
//! Wildcard patterns declared on roles and matched against concrete actions.
//!
//! A pattern of exactly `*` matches every action. Any other pattern is
//! matched case-insensitively against the *whole* action, with each `*`
//! standing for any run of zero or more characters:
//!
//! ```text
//! "/inventory/*"        matches "/inventory/5/read", "/inventory/delete"
//! "/user/*/role/*"      matches "/user/7/role/write"
//! "/product/read"       matches "/product/read" and "/PRODUCT/READ" only
//! ```
//!
//! Patterns are validated against the pattern grammar when a role is created
//! or edited ([`validate_pattern`]). The matcher itself never rejects a
//! pattern: anything that cannot be compiled simply matches nothing.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::actions::Verb;

/// The pattern that matches every action.
pub const WILDCARD: &str = "*";

/// Grammar violations for role-declared action patterns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Pattern is an empty string
    #[error("Action pattern must not be empty")]
    Empty,

    /// Pattern does not start with `/`
    #[error("Action pattern '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    /// Pattern contains `//`
    #[error("Action pattern '{0}' must not contain consecutive '/' characters")]
    ConsecutiveSlashes(String),

    /// Pattern contains a character other than alphanumerics, `/` and `*`
    #[error("Action pattern '{pattern}' contains invalid character '{character}'")]
    InvalidCharacter {
        /// The offending pattern.
        pattern: String,
        /// The first invalid character found.
        character: char,
    },

    /// Pattern does not end with a verb or `*`
    #[error("Action pattern '{0}' must end with '/read', '/write', '/delete' or '*'")]
    InvalidEnding(String),
}

/// Result type for pattern validation.
pub type PatternResult<T> = Result<T, PatternError>;

/// Validate a role-declared pattern against the action pattern grammar.
///
/// A pattern other than `*` must:
/// 1. end with `/read`, `/write`, `/delete` or `*`
/// 2. contain no two consecutive `/` characters
/// 3. use only alphanumeric characters, `/` and `*`
/// 4. start with `/`
///
/// # Example
///
/// ```
/// use inventory_rbac::pattern::{validate_pattern, PatternError};
///
/// assert!(validate_pattern("*").is_ok());
/// assert!(validate_pattern("/inventory/*").is_ok());
/// assert!(validate_pattern("/user/*/role/write").is_ok());
/// assert_eq!(
///     validate_pattern("inventory/read"),
///     Err(PatternError::MissingLeadingSlash("inventory/read".to_string()))
/// );
/// ```
pub fn validate_pattern(pattern: &str) -> PatternResult<()> {
    if pattern == WILDCARD {
        return Ok(());
    }
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    if !pattern.starts_with('/') {
        return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
    }
    if let Some(character) = pattern
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '/' || *c == '*'))
    {
        return Err(PatternError::InvalidCharacter {
            pattern: pattern.to_string(),
            character,
        });
    }
    if pattern.contains("//") {
        return Err(PatternError::ConsecutiveSlashes(pattern.to_string()));
    }

    let lowered = pattern.to_ascii_lowercase();
    let valid_ending = lowered.ends_with('*')
        || Verb::all()
            .iter()
            .any(|verb| lowered.ends_with(verb.suffix()));
    if !valid_ending {
        return Err(PatternError::InvalidEnding(pattern.to_string()));
    }

    Ok(())
}

/// Validate every pattern in a list, stopping at the first violation.
pub fn validate_patterns<'a, I>(patterns: I) -> PatternResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    patterns.into_iter().try_for_each(validate_pattern)
}

/// A compiled action pattern.
#[derive(Debug, Clone)]
pub struct ActionPattern {
    source: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    /// The bare `*` pattern.
    Any,
    /// Anchored, case-insensitive expression.
    Expr(Regex),
    /// The pattern could not be compiled and matches nothing.
    Never,
}

impl ActionPattern {
    /// Compile a pattern.
    ///
    /// Literal text between wildcards is escaped, so characters outside the
    /// grammar are matched literally rather than interpreted.
    pub fn compile(pattern: &str) -> Self {
        let matcher = if pattern == WILDCARD {
            Matcher::Any
        } else {
            let body = pattern
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*");

            match RegexBuilder::new(&format!(r"(?s)\A{}\z", body))
                .case_insensitive(true)
                .build()
            {
                Ok(regex) => Matcher::Expr(regex),
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "Action pattern could not be compiled");
                    Matcher::Never
                }
            }
        };

        Self {
            source: pattern.to_string(),
            matcher,
        }
    }

    /// Check whether a concrete action matches this pattern.
    pub fn matches(&self, action: &str) -> bool {
        match &self.matcher {
            Matcher::Any => true,
            Matcher::Expr(regex) => regex.is_match(action),
            Matcher::Never => false,
        }
    }

    /// Get the pattern as declared.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Display for ActionPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Check whether `action` matches `pattern`.
///
/// # Example
///
/// ```
/// use inventory_rbac::pattern::matches;
///
/// assert!(matches("/inventory/5/read", "*"));
/// assert!(matches("/inventory/5/read", "/inventory/*"));
/// assert!(!matches("/inventory/5/read", "/inventory/*/write"));
/// assert!(matches("/Product/Read", "/product/read"));
/// ```
pub fn matches(action: &str, pattern: &str) -> bool {
    ActionPattern::compile(pattern).matches(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_matches_everything() {
        for action in ["", "/role/read", "/user/7/role/delete", "anything at all"] {
            assert!(matches(action, "*"));
        }
    }

    #[test]
    fn test_literal_pattern_is_exact_and_case_insensitive() {
        assert!(matches("/product/read", "/product/read"));
        assert!(matches("/PRODUCT/READ", "/product/read"));
        assert!(matches("/product/read", "/Product/Read"));

        assert!(!matches("/product/read/extra", "/product/read"));
        assert!(!matches("/api/product/read", "/product/read"));
        assert!(!matches("/product/write", "/product/read"));
    }

    #[test]
    fn test_trailing_wildcard() {
        assert!(matches("/inventory/5/read", "/inventory/*"));
        assert!(matches("/inventory/delete", "/inventory/*"));
        assert!(matches("/inventory/", "/inventory/*"));
        assert!(!matches("/inventory", "/inventory/*"));
        assert!(!matches("/product/5/read", "/inventory/*"));
    }

    #[test]
    fn test_inner_wildcards() {
        assert!(matches("/user/7/role/write", "/user/*/role/*"));
        assert!(matches("/user/7/role/read", "/user/7/*/read"));
        assert!(!matches("/inventory/5/read", "/inventory/*/write"));
        assert!(!matches("/user/7/role/write", "/user/7/*/read"));
    }

    #[test]
    fn test_wildcard_spans_segments() {
        assert!(matches("/user/7/role/3/read", "/user/*/read"));
    }

    #[test]
    fn test_empty_pattern_matches_only_empty_action() {
        assert!(matches("", ""));
        assert!(!matches("/role/read", ""));
    }

    #[test]
    fn test_malformed_patterns_do_not_panic() {
        // Regex metacharacters are literal text in a pattern.
        assert!(!matches("/inventoryXread", "/inventory.read"));
        assert!(matches("/inventory.read", "/inventory.read"));
        assert!(!matches("/role/read", "/role/(read"));
        assert!(!matches("/role/read", "[/role/read"));
        assert!(matches("/a/b", "**/b"));
    }

    #[test]
    fn test_compiled_pattern() {
        let pattern = ActionPattern::compile("/inventory/*");
        assert_eq!(pattern.as_str(), "/inventory/*");
        assert!(pattern.matches("/inventory/1/write"));
        assert!(ActionPattern::compile("*").matches("anything at all"));
    }

    #[test]
    fn test_validate_accepts_grammar() {
        for pattern in [
            "*",
            "/inventory/*",
            "/inventory/read",
            "/inventory/5/write",
            "/user/*/role/delete",
            "/user/7/*/read",
            "/Product/READ",
        ] {
            assert_eq!(validate_pattern(pattern), Ok(()), "{pattern}");
        }
    }

    #[test]
    fn test_validate_rejects_missing_leading_slash() {
        assert_eq!(
            validate_pattern("inventory/read"),
            Err(PatternError::MissingLeadingSlash("inventory/read".to_string()))
        );
        assert!(validate_pattern("*/read").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_ending() {
        assert_eq!(
            validate_pattern("/inventory/update"),
            Err(PatternError::InvalidEnding("/inventory/update".to_string()))
        );
        assert!(validate_pattern("/inventory/").is_err());
        assert!(validate_pattern("/inventory").is_err());
    }

    #[test]
    fn test_validate_rejects_consecutive_slashes() {
        assert_eq!(
            validate_pattern("/inventory//read"),
            Err(PatternError::ConsecutiveSlashes("/inventory//read".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_invalid_characters() {
        assert_eq!(
            validate_pattern("/inventory/{id}/read"),
            Err(PatternError::InvalidCharacter {
                pattern: "/inventory/{id}/read".to_string(),
                character: '{',
            })
        );
        assert!(validate_pattern("/inventory/my-item/read").is_err());
        assert!(validate_pattern("/inventory/5/read ").is_err());
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert_eq!(validate_pattern(""), Err(PatternError::Empty));
    }

    #[test]
    fn test_validate_patterns_stops_at_first_error() {
        let result = validate_patterns(["/role/read", "role/write", "/role//delete"]);
        assert_eq!(
            result,
            Err(PatternError::MissingLeadingSlash("role/write".to_string()))
        );
        assert!(validate_patterns(Vec::<&str>::new()).is_ok());
    }
}
