//! # Inventory RBAC (Action-Based Access Control)
//!
//! This crate provides the action authorization engine for the Inventory
//! Manager API.
//!
//! ## Overview
//!
//! The inventory-rbac crate handles:
//! - **Verbs and Resources**: The vocabulary action strings are built from
//! - **Patterns**: Wildcard patterns declared on roles, and their grammar
//! - **Templates**: Action requirements with `{name}` route placeholders
//! - **Roles**: Allow and deny pattern lists with an active switch
//! - **Policy**: Combining roles into an allow/deny decision
//!
//! ## Architecture
//!
//! ```text
//! Action = /resource[/id][/child[/id]]/verb
//!
//! Examples:
//!   "/role/read"                 - Read any role
//!   "/inventory/42/write"        - Write inventory record 42
//!   "/user/7/role/delete"        - Remove a role from user 7
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use inventory_rbac::{ActionTemplate, CombinePolicy, PolicyEvaluator, Role, RouteParams};
//!
//! let clerk = Role::new(2, "Stock Clerk")
//!     .with_allowed(["/inventory/*"])
//!     .with_denied(["/inventory/delete"]);
//!
//! let mut params = RouteParams::new();
//! params.insert("id".to_string(), "42".to_string());
//! let action = ActionTemplate::new("/inventory/{id}/write").resolve(&params);
//!
//! let evaluator = PolicyEvaluator::new(CombinePolicy::AnyOf);
//! assert!(evaluator.is_action_allowed(&[clerk], &action, None));
//! ```
//!
//! ## Deny Precedence
//!
//! Within one role, a matching deny pattern always overrides a matching
//! allow pattern. Roles never cancel each other: if any active role grants
//! an action, that grant stands.

pub mod actions;
pub mod pattern;
pub mod policy;
pub mod resources;
pub mod role;
pub mod template;

// Re-export main types for convenience
pub use actions::Verb;
pub use pattern::{matches, validate_pattern, ActionPattern, PatternError, PatternResult};
pub use policy::{CombinePolicy, Decision, Grant, PolicyEvaluator};
pub use resources::ResourceType;
pub use role::{Role, RoleId, UserId};
pub use template::{ActionTemplate, RouteParams};
