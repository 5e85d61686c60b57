//! # Resource Types
//!
//! Defines the resource kinds managed by the inventory API.
//! Resource kinds are the first segment of every action path.

use serde::{Deserialize, Serialize};

use crate::actions::Verb;

/// Resource kinds that appear in action paths.
///
/// - **Inventory**: Stock records
/// - **Product**: Product catalogue entries
/// - **Category**: Product categories
/// - **Role**: Authorization roles
/// - **User**: User accounts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Inventory (stock) records.
    Inventory,
    /// Product catalogue entries.
    Product,
    /// Product categories.
    Category,
    /// Authorization roles.
    Role,
    /// User accounts.
    User,
}

impl ResourceType {
    /// Get the path segment for the resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Inventory => "inventory",
            ResourceType::Product => "product",
            ResourceType::Category => "category",
            ResourceType::Role => "role",
            ResourceType::User => "user",
        }
    }

    /// Build the collection-level action for this resource, e.g. `/role/read`.
    ///
    /// # Example
    ///
    /// ```
    /// use inventory_rbac::actions::Verb;
    /// use inventory_rbac::resources::ResourceType;
    ///
    /// assert_eq!(ResourceType::Role.action(Verb::Read), "/role/read");
    /// ```
    pub fn action(&self, verb: Verb) -> String {
        format!("/{}{}", self.as_str(), verb.suffix())
    }

    /// Build an instance-level action, e.g. `/user/7/read`.
    ///
    /// The `id` may be a concrete value or a `{placeholder}` when declaring a
    /// template.
    pub fn instance_action(&self, id: impl std::fmt::Display, verb: Verb) -> String {
        format!("/{}/{}{}", self.as_str(), id, verb.suffix())
    }

    /// Build an action on a nested resource, e.g. `/user/{userid}/role/write`.
    pub fn nested_action(
        &self,
        id: impl std::fmt::Display,
        child: ResourceType,
        verb: Verb,
    ) -> String {
        format!("/{}/{}/{}{}", self.as_str(), id, child.as_str(), verb.suffix())
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
