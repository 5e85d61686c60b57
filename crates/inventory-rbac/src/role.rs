//! # Roles
//!
//! A role is a named, switchable bundle of allow and deny patterns.

use serde::{Deserialize, Deserializer, Serialize};

use crate::pattern::{validate_patterns, PatternResult};

/// Identifier of a stored role.
pub type RoleId = i64;

/// Identifier of a stored user.
pub type UserId = i64;

/// A role as read from the role store.
///
/// `allowed_actions` grants actions; `not_allowed_actions` takes them away
/// again for this role only. Null pattern lists deserialize as empty.
///
/// # Example
///
/// ```
/// use inventory_rbac::Role;
///
/// let role = Role::new(2, "Stock Clerk")
///     .with_allowed(["/inventory/*"])
///     .with_denied(["/inventory/delete"]);
/// assert!(role.is_active);
/// assert!(role.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Role id.
    pub id: RoleId,

    /// Unique role name, as carried in principal claims.
    pub name: String,

    /// Inactive roles never contribute permissions.
    pub is_active: bool,

    /// Patterns granted by this role.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub allowed_actions: Vec<String>,

    /// Patterns denied by this role; these override `allowed_actions`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub not_allowed_actions: Vec<String>,
}

impl Role {
    /// Create an active role with no patterns.
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_active: true,
            allowed_actions: Vec::new(),
            not_allowed_actions: Vec::new(),
        }
    }

    /// Set the allowed patterns.
    pub fn with_allowed<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_actions = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the denied patterns.
    pub fn with_denied<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.not_allowed_actions = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether the role is active.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Validate both pattern lists against the pattern grammar.
    pub fn validate(&self) -> PatternResult<()> {
        validate_patterns(self.allowed_actions.iter().map(String::as_str))?;
        validate_patterns(self.not_allowed_actions.iter().map(String::as_str))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternError;

    #[test]
    fn test_role_builder() {
        let role = Role::new(1, "Administrator").with_allowed(["*"]);
        assert_eq!(role.id, 1);
        assert_eq!(role.name, "Administrator");
        assert!(role.is_active);
        assert_eq!(role.allowed_actions, vec!["*"]);
        assert!(role.not_allowed_actions.is_empty());

        let inactive = Role::new(2, "Inactive Role").with_active(false);
        assert!(!inactive.is_active);
    }

    #[test]
    fn test_role_validate() {
        let role = Role::new(1, "Clerk").with_allowed(["inventory/read"]);
        assert_eq!(
            role.validate(),
            Err(PatternError::MissingLeadingSlash("inventory/read".to_string()))
        );

        let role = Role::new(1, "Clerk")
            .with_allowed(["/inventory/*"])
            .with_denied(["/inventory//delete"]);
        assert!(matches!(role.validate(), Err(PatternError::ConsecutiveSlashes(_))));
    }

    #[test]
    fn test_null_pattern_lists_deserialize_empty() {
        let json = r#"{"id":3,"name":"Viewer","isActive":true,"allowedActions":null}"#;
        let role: Role = serde_json::from_str(json).unwrap();
        assert!(role.allowed_actions.is_empty());
        assert!(role.not_allowed_actions.is_empty());
    }

    #[test]
    fn test_camel_case_round_trip_shape() {
        let role = Role::new(4, "Buyer").with_allowed(["/product/*"]);
        let value = serde_json::to_value(&role).unwrap();
        assert_eq!(value["isActive"], true);
        assert_eq!(value["allowedActions"][0], "/product/*");
        assert!(value["notAllowedActions"].as_array().unwrap().is_empty());
    }
}
