//! Role input models
//!
//! Administrators create roles from a [`NewRole`] and edit them with a
//! [`RolePatch`]. Both are validated before anything reaches the store: the
//! name must be present and every action pattern must satisfy the pattern
//! grammar.

use inventory_rbac::pattern::validate_patterns;
use inventory_rbac::{Role, RoleId};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{StoreError, StoreResult};

/// Input for creating a role.
///
/// # Examples
///
/// ```
/// use inventory_store::NewRole;
///
/// let role = NewRole::new("Stock Clerk")
///     .with_allowed(["/inventory/*"])
///     .with_denied(["/inventory/delete"]);
/// assert!(role.validate().is_ok());
///
/// let invalid = NewRole::new("Broken").with_allowed(["inventory/read"]);
/// assert!(invalid.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRole {
    /// Unique role name
    pub name: String,

    /// Whether the role is active (default: true)
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Allowed action patterns
    #[serde(default)]
    pub allowed_actions: Option<Vec<String>>,

    /// Denied action patterns
    #[serde(default)]
    pub not_allowed_actions: Option<Vec<String>>,
}

fn default_active() -> bool {
    true
}

impl NewRole {
    /// Creates an active role input with no patterns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_active: true,
            allowed_actions: None,
            not_allowed_actions: None,
        }
    }

    /// Set the allowed patterns.
    pub fn with_allowed<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_actions = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the denied patterns.
    pub fn with_denied<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.not_allowed_actions = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Mark the role inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Validates the name and both pattern lists.
    pub fn validate(&self) -> StoreResult<()> {
        validate_name(&self.name)?;
        validate_list(self.allowed_actions.as_deref())?;
        validate_list(self.not_allowed_actions.as_deref())
    }

    /// Builds the stored role once an id has been assigned.
    pub fn into_role(self, id: RoleId) -> Role {
        Role {
            id,
            name: self.name.trim().to_string(),
            is_active: self.is_active,
            allowed_actions: self.allowed_actions.unwrap_or_default(),
            not_allowed_actions: self.not_allowed_actions.unwrap_or_default(),
        }
    }
}

/// Partial update of a role.
///
/// Every updatable field is listed explicitly; absent fields are left
/// unchanged. For the pattern lists, an explicit `null` clears the list.
/// The role `id` may appear in the payload but is never changed, and any
/// other unknown field is rejected during deserialization.
///
/// # Examples
///
/// ```
/// use inventory_rbac::Role;
/// use inventory_store::RolePatch;
///
/// let mut role = Role::new(1, "Clerk").with_allowed(["/inventory/read"]);
/// let patch = RolePatch {
///     is_active: Some(false),
///     ..RolePatch::default()
/// };
/// patch.apply(&mut role).unwrap();
/// assert!(!role.is_active);
/// assert_eq!(role.allowed_actions, vec!["/inventory/read"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RolePatch {
    /// Ignored; roles cannot be renumbered.
    #[serde(default, rename = "id", skip_serializing)]
    pub ignored_id: Option<IgnoredAny>,

    /// New role name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New active flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    /// Replacement allowed patterns (`Some(None)` clears)
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub allowed_actions: Option<Option<Vec<String>>>,

    /// Replacement denied patterns (`Some(None)` clears)
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub not_allowed_actions: Option<Option<Vec<String>>>,
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<Vec<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

impl RolePatch {
    /// Check if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.is_active.is_none()
            && self.allowed_actions.is_none()
            && self.not_allowed_actions.is_none()
    }

    /// Validates every field the patch sets.
    pub fn validate(&self) -> StoreResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(list) = &self.allowed_actions {
            validate_list(list.as_deref())?;
        }
        if let Some(list) = &self.not_allowed_actions {
            validate_list(list.as_deref())?;
        }
        Ok(())
    }

    /// Validates the patch, then applies it to `role`.
    ///
    /// The role is left untouched when validation fails.
    pub fn apply(&self, role: &mut Role) -> StoreResult<()> {
        self.validate()?;

        if let Some(name) = &self.name {
            role.name = name.trim().to_string();
        }
        if let Some(is_active) = self.is_active {
            role.is_active = is_active;
        }
        if let Some(list) = &self.allowed_actions {
            role.allowed_actions = list.clone().unwrap_or_default();
        }
        if let Some(list) = &self.not_allowed_actions {
            role.not_allowed_actions = list.clone().unwrap_or_default();
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> StoreResult<()> {
    if name.trim().is_empty() {
        return Err(StoreError::MissingRoleName);
    }
    Ok(())
}

fn validate_list(patterns: Option<&[String]>) -> StoreResult<()> {
    if let Some(patterns) = patterns {
        validate_patterns(patterns.iter().map(String::as_str))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventory_rbac::PatternError;

    #[test]
    fn test_new_role_rejects_missing_leading_slash() {
        let role = NewRole::new("Clerk").with_allowed(["inventory/read"]);
        assert_eq!(
            role.validate(),
            Err(StoreError::InvalidPattern(PatternError::MissingLeadingSlash(
                "inventory/read".to_string()
            )))
        );
    }

    #[test]
    fn test_new_role_rejects_blank_name() {
        assert_eq!(NewRole::new("  ").validate(), Err(StoreError::MissingRoleName));
    }

    #[test]
    fn test_new_role_into_role() {
        let role = NewRole::new(" Clerk ")
            .with_allowed(["/inventory/*"])
            .into_role(9);
        assert_eq!(role.id, 9);
        assert_eq!(role.name, "Clerk");
        assert!(role.is_active);
        assert!(role.not_allowed_actions.is_empty());
    }

    #[test]
    fn test_new_role_deserialize_defaults() {
        let role: NewRole = serde_json::from_str(r#"{"name":"Viewer"}"#).unwrap();
        assert!(role.is_active);
        assert!(role.allowed_actions.is_none());
    }

    #[test]
    fn test_patch_validation_leaves_role_untouched() {
        let mut role = Role::new(1, "Clerk").with_allowed(["/inventory/read"]);
        let patch = RolePatch {
            name: Some("Senior Clerk".to_string()),
            allowed_actions: Some(Some(vec!["/inventory//read".to_string()])),
            ..RolePatch::default()
        };

        assert!(patch.apply(&mut role).is_err());
        assert_eq!(role.name, "Clerk");
        assert_eq!(role.allowed_actions, vec!["/inventory/read"]);
    }

    #[test]
    fn test_patch_null_clears_list() {
        let mut role = Role::new(1, "Clerk")
            .with_allowed(["/inventory/*"])
            .with_denied(["/inventory/delete"]);
        let patch: RolePatch = serde_json::from_str(r#"{"notAllowedActions":null}"#).unwrap();

        assert_eq!(patch.not_allowed_actions, Some(None));
        assert_eq!(patch.allowed_actions, None);

        patch.apply(&mut role).unwrap();
        assert!(role.not_allowed_actions.is_empty());
        assert_eq!(role.allowed_actions, vec!["/inventory/*"]);
    }

    #[test]
    fn test_patch_ignores_id_and_rejects_unknown_fields() {
        let patch: RolePatch = serde_json::from_str(r#"{"id":99,"isActive":false}"#).unwrap();
        assert_eq!(patch.is_active, Some(false));

        let unknown = serde_json::from_str::<RolePatch>(r#"{"colour":"red"}"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn test_empty_patch() {
        assert!(RolePatch::default().is_empty());
        let patch: RolePatch = serde_json::from_str(r#"{"id":3}"#).unwrap();
        assert!(patch.is_empty());
    }
}
