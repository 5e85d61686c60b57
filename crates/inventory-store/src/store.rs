//! Store contracts
//!
//! [`RoleStore`] is the read-only view the authorization engine consumes.
//! [`RoleRepository`] adds the administrative operations behind the role
//! routes. Both are async because implementations are expected to perform
//! I/O; the engine never holds a lock across these calls.

use async_trait::async_trait;
use inventory_rbac::{Role, RoleId, UserId};
use std::sync::Arc;

use crate::error::StoreResult;
use crate::roles::{NewRole, RolePatch};
use crate::user::User;

/// Role lookups used by the authorization engine.
///
/// Implementations must return fresh data on every call unless they are an
/// explicit cache, and must report transport failures as errors rather than
/// empty results.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Active roles whose names are in `names`. Unknown names are skipped.
    async fn active_roles_by_name(&self, names: &[String]) -> StoreResult<Vec<Role>>;

    /// Active roles held by a user. An unknown user holds no roles.
    async fn active_roles_for_user(&self, user_id: UserId) -> StoreResult<Vec<Role>>;
}

/// Role administration.
#[async_trait]
pub trait RoleRepository: RoleStore {
    /// All roles, active or not, ordered by id.
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;

    /// A role by id.
    async fn get_role(&self, role_id: RoleId) -> StoreResult<Option<Role>>;

    /// A user by id.
    async fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>>;

    /// All users, ordered by id.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Active roles held by a user; fails if the user does not exist.
    async fn user_roles(&self, user_id: UserId) -> StoreResult<Vec<Role>>;

    /// Validate and store a new role.
    async fn create_role(&self, role: NewRole) -> StoreResult<Role>;

    /// Validate and apply a patch to a role.
    async fn update_role(&self, role_id: RoleId, patch: RolePatch) -> StoreResult<Role>;

    /// Delete a role that no user holds.
    async fn delete_role(&self, role_id: RoleId) -> StoreResult<()>;

    /// Give a user an active role.
    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()>;

    /// Take a role away from a user.
    async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()>;
}

#[async_trait]
impl<T: RoleStore + ?Sized> RoleStore for Arc<T> {
    async fn active_roles_by_name(&self, names: &[String]) -> StoreResult<Vec<Role>> {
        (**self).active_roles_by_name(names).await
    }

    async fn active_roles_for_user(&self, user_id: UserId) -> StoreResult<Vec<Role>> {
        (**self).active_roles_for_user(user_id).await
    }
}

#[async_trait]
impl<T: RoleRepository + ?Sized> RoleRepository for Arc<T> {
    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        (**self).list_roles().await
    }

    async fn get_role(&self, role_id: RoleId) -> StoreResult<Option<Role>> {
        (**self).get_role(role_id).await
    }

    async fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>> {
        (**self).get_user(user_id).await
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        (**self).list_users().await
    }

    async fn user_roles(&self, user_id: UserId) -> StoreResult<Vec<Role>> {
        (**self).user_roles(user_id).await
    }

    async fn create_role(&self, role: NewRole) -> StoreResult<Role> {
        (**self).create_role(role).await
    }

    async fn update_role(&self, role_id: RoleId, patch: RolePatch) -> StoreResult<Role> {
        (**self).update_role(role_id, patch).await
    }

    async fn delete_role(&self, role_id: RoleId) -> StoreResult<()> {
        (**self).delete_role(role_id).await
    }

    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()> {
        (**self).assign_role(user_id, role_id).await
    }

    async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()> {
        (**self).remove_role(user_id, role_id).await
    }
}
