//! # Inventory Authorization
//!
//! This crate puts the action engine from `inventory-rbac` in front of the
//! Inventory Manager admin API.
//!
//! ## Overview
//!
//! The inventory-authz crate handles:
//! - **Claims**: Reading role names and the user id from validated tokens
//! - **Routes**: The action templates each admin endpoint declares
//! - **Decision Point**: Authorizing a request against its endpoint
//! - **Permission Queries**: `has_permission(user_id, action)` for business logic
//! - **Configuration**: Combine policy, decision logging, role cache, log output
//!
//! ## Usage
//!
//! ```rust
//! use inventory_authz::{Authz, AuthzConfig, InventoryClaims, Method, Principal};
//! use inventory_rbac::{Role, RouteParams};
//! use inventory_store::{MemoryStore, User};
//!
//! # async fn example() -> inventory_authz::AuthzResult<()> {
//! let store = MemoryStore::new();
//! store
//!     .insert_role(Role::new(2, "Role Manager").with_allowed(["/user/*/role/*"]))
//!     .await;
//! store.insert_user(User::new(5, "manager@inventorym.com").with_roles([2])).await;
//!
//! let authz = Authz::new(store, AuthzConfig::from_env());
//!
//! let claims: InventoryClaims =
//!     serde_json::from_str(r#"{"userId":"5","role":"Role Manager"}"#).unwrap();
//! let principal = Principal::from(claims);
//!
//! let mut params = RouteParams::new();
//! params.insert("userid".to_string(), "9".to_string());
//! let verdict = authz
//!     .authorize_route(Some(&principal), Method::Get, "/user/{userid}/role", &params)
//!     .await?;
//! assert!(verdict.is_authorized());
//!
//! assert!(authz.permissions().has_permission(5, "/user/9/role/read").await?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Handling
//!
//! A role store failure is returned as [`AuthzError::Store`]; it never
//! produces an allow.

pub mod authorizer;
pub mod claims;
pub mod config;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod routes;
pub mod service;

// Re-export main types
pub use authorizer::{ActionAuthorizer, AuthorizationRequest, Verdict};
pub use claims::{InventoryClaims, Principal};
pub use config::{AuthzConfig, CacheConfig, ConfigError, DecisionLogging, LogConfig, LogFormat};
pub use endpoint::{Endpoint, Method, RouteTable};
pub use engine::{shared_store, Authz, SharedStore};
pub use error::{AuthzError, AuthzResult};
pub use service::{PermissionService, UserView, ROLES_READ_ACTION};
