//! # Inventory Role Storage
//!
//! This crate provides the role and user data the authorization engine
//! reads, and the administrative operations behind the role routes.
//!
//! ## Overview
//!
//! The inventory-store crate handles:
//! - **Store contracts**: `RoleStore` (engine reads) and `RoleRepository` (admin writes)
//! - **Role inputs**: `NewRole` and `RolePatch`, validated before storage
//! - **Users**: user records with their role membership
//! - **Memory store**: an in-process implementation of both contracts
//! - **Cache**: an optional read-through cache with write invalidation
//!
//! ## Architecture
//!
//! ```text
//! User ──(many-to-many)── Role
//!                           ├─ allowedActions
//!                           └─ notAllowedActions
//!
//! ActionAuthorizer ──→ RoleStore ──→ [CachedRoleStore] ──→ MemoryStore
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use inventory_store::{MemoryStore, NewRole, RoleRepository, User};
//!
//! # async fn example() -> inventory_store::StoreResult<()> {
//! let store = MemoryStore::new();
//! let clerk = store
//!     .create_role(NewRole::new("Stock Clerk").with_allowed(["/inventory/*"]))
//!     .await?;
//!
//! store.insert_user(User::new(7, "clerk@inventorym.com")).await;
//! store.assign_role(7, clerk.id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Integrity Rules
//!
//! - Role names are unique (ignoring ASCII case)
//! - Role patterns must satisfy the action pattern grammar
//! - Inactive roles cannot be assigned
//! - A role held by any user cannot be deleted

pub mod cache;
pub mod error;
pub mod memory;
pub mod roles;
pub mod store;
pub mod user;

// Re-export main types for convenience
pub use cache::{CacheStats, CachedRoleStore};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use roles::{NewRole, RolePatch};
pub use store::{RoleRepository, RoleStore};
pub use user::User;
