//! Token claims and the authenticated principal
//!
//! The authentication layer issues tokens carrying the user's role names and
//! a `userId` claim. Token validation happens upstream; this module only
//! reads the already-validated claims and derives the [`Principal`] the
//! decision point works with.

use inventory_rbac::UserId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Claims issued at login.
///
/// Role names may arrive under `roles` or `role`, as a single string or an
/// array; both shapes are produced by common token encoders.
///
/// # Example
///
/// ```
/// use inventory_authz::InventoryClaims;
///
/// let claims: InventoryClaims = serde_json::from_str(
///     r#"{"userId":"7","email":"clerk@inventorym.com","role":"Clerk"}"#,
/// ).unwrap();
/// assert_eq!(claims.roles, vec!["Clerk"]);
/// assert_eq!(claims.user_id(), Some(7));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryClaims {
    /// Names of the roles held when the token was issued
    #[serde(default, alias = "role", deserialize_with = "one_or_many")]
    pub roles: Vec<String>,

    /// Numeric user id, usually encoded as a string
    #[serde(
        default,
        rename = "userId",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id_claim: Option<serde_json::Value>,

    /// User email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Custom claims for extensibility
    #[serde(default, flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl InventoryClaims {
    /// Create claims for a set of role names.
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the `userId` claim.
    pub fn with_user_id(mut self, user_id: UserId) -> Self {
        self.user_id_claim = Some(serde_json::Value::String(user_id.to_string()));
        self
    }

    /// Get the user id, if the claim is present and numeric.
    ///
    /// A claim that does not parse as an integer is treated as absent.
    pub fn user_id(&self) -> Option<UserId> {
        match self.user_id_claim.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(role)) => vec![role],
        Some(OneOrMany::Many(roles)) => roles,
        None => Vec::new(),
    })
}

/// The authenticated caller, as seen by the decision point.
///
/// Role names come from the token and are resolved against the store on
/// every request, so a deactivated role stops granting immediately even for
/// tokens issued before the change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Claimed role names
    pub role_names: Vec<String>,

    /// User id, when the token carried a numeric `userId`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Principal {
    /// Create a principal holding the given role names.
    pub fn new<I, S>(role_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role_names: role_names.into_iter().map(Into::into).collect(),
            user_id: None,
        }
    }

    /// Set the user id.
    pub fn with_user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

impl From<&InventoryClaims> for Principal {
    fn from(claims: &InventoryClaims) -> Self {
        Self {
            role_names: claims.roles.clone(),
            user_id: claims.user_id(),
        }
    }
}

impl From<InventoryClaims> for Principal {
    fn from(claims: InventoryClaims) -> Self {
        let user_id = claims.user_id();
        Self {
            role_names: claims.roles,
            user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_with_role_array() {
        let claims: InventoryClaims = serde_json::from_str(
            r#"{"userId":"1","email":"admin@inventorym.com","roles":["Administrator","Clerk"],"first_name":"Ada"}"#,
        )
        .unwrap();

        assert_eq!(claims.roles, vec!["Administrator", "Clerk"]);
        assert_eq!(claims.email.as_deref(), Some("admin@inventorym.com"));
        assert_eq!(claims.custom.get("first_name"), Some(&serde_json::json!("Ada")));
    }

    #[test]
    fn test_claims_without_roles() {
        let claims: InventoryClaims = serde_json::from_str(r#"{"userId":"3"}"#).unwrap();
        assert!(claims.roles.is_empty());

        let principal = Principal::from(claims);
        assert!(principal.role_names.is_empty());
        assert_eq!(principal.user_id, Some(3));
    }

    #[test]
    fn test_unparseable_user_id_is_absent() {
        let claims: InventoryClaims =
            serde_json::from_str(r#"{"userId":"seven","role":"Clerk"}"#).unwrap();
        assert_eq!(claims.user_id(), None);
        assert_eq!(Principal::from(&claims).user_id, None);

        let numeric: InventoryClaims = serde_json::from_str(r#"{"userId":12}"#).unwrap();
        assert_eq!(numeric.user_id(), Some(12));
    }

    #[test]
    fn test_claims_builder() {
        let claims = InventoryClaims::new(["Viewer"]).with_user_id(42);
        let principal = Principal::from(&claims);

        assert_eq!(principal, Principal::new(["Viewer"]).with_user_id(42));
        assert_eq!(principal.role_names, vec!["Viewer"]);
    }
}
