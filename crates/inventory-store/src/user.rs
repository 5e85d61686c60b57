//! User records
//!
//! The authorization engine only reads a user's id and role membership; the
//! remaining profile fields are carried for the admin API's responses.

use inventory_rbac::{RoleId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A user and the ids of the roles they hold.
///
/// # Examples
///
/// ```
/// use inventory_store::User;
///
/// let user = User::new(1, "admin@inventorym.com").with_roles([1]);
/// assert!(user.has_role(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id
    pub id: UserId,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Unique email address
    pub email: String,

    /// Held roles (many-to-many, unordered)
    #[serde(default)]
    pub role_ids: BTreeSet<RoleId>,
}

impl User {
    /// Creates a user with no roles.
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            email: email.into(),
            role_ids: BTreeSet::new(),
        }
    }

    /// Set the user's name.
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Set the held roles.
    pub fn with_roles<I>(mut self, role_ids: I) -> Self
    where
        I: IntoIterator<Item = RoleId>,
    {
        self.role_ids = role_ids.into_iter().collect();
        self
    }

    /// Check if the user holds a role.
    pub fn has_role(&self, role_id: RoleId) -> bool {
        self.role_ids.contains(&role_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_roles_are_a_set() {
        let user = User::new(7, "clerk@inventorym.com")
            .with_name("Sam", "Clerk")
            .with_roles([2, 3, 2]);
        assert_eq!(user.role_ids.len(), 2);
        assert!(user.has_role(3));
        assert!(!user.has_role(1));
        assert_eq!(user.first_name, "Sam");
    }
}
