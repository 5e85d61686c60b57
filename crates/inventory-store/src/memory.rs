//! In-memory role and user store
//!
//! Suitable for single-process deployments, seeding, and tests. Every read
//! returns a snapshot copy, so an authorization decision never observes a
//! half-applied mutation.

use async_trait::async_trait;
use inventory_rbac::{Role, RoleId, UserId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::roles::{NewRole, RolePatch};
use crate::store::{RoleRepository, RoleStore};
use crate::user::User;

#[derive(Debug, Default)]
struct State {
    roles: BTreeMap<RoleId, Role>,
    users: BTreeMap<UserId, User>,
    last_role_id: RoleId,
}

impl State {
    fn name_taken(&self, name: &str, except: Option<RoleId>) -> bool {
        self.roles
            .values()
            .any(|r| Some(r.id) != except && r.name.eq_ignore_ascii_case(name.trim()))
    }

    fn active_roles_of(&self, user: &User) -> Vec<Role> {
        user.role_ids
            .iter()
            .filter_map(|id| self.roles.get(id))
            .filter(|r| r.is_active)
            .cloned()
            .collect()
    }
}

/// In-memory store implementation.
///
/// # Examples
///
/// ```
/// use inventory_store::{MemoryStore, NewRole, RoleRepository, RoleStore, User};
///
/// # async fn example() -> inventory_store::StoreResult<()> {
/// let store = MemoryStore::new();
/// let admin = store.create_role(NewRole::new("Administrator").with_allowed(["*"])).await?;
/// store.insert_user(User::new(1, "admin@inventorym.com")).await;
/// store.assign_role(1, admin.id).await?;
///
/// let roles = store.active_roles_for_user(1).await?;
/// assert_eq!(roles[0].name, "Administrator");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a role with an explicit id, bypassing validation.
    ///
    /// Used for seeding; ids assigned by `create_role` continue after the
    /// largest inserted id.
    pub async fn insert_role(&self, role: Role) {
        let mut state = self.state.write().await;
        state.last_role_id = state.last_role_id.max(role.id);
        state.roles.insert(role.id, role);
    }

    /// Insert or replace a user.
    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Number of stored roles.
    pub async fn role_count(&self) -> usize {
        self.state.read().await.roles.len()
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn active_roles_by_name(&self, names: &[String]) -> StoreResult<Vec<Role>> {
        let state = self.state.read().await;
        Ok(state
            .roles
            .values()
            .filter(|r| r.is_active && names.iter().any(|n| *n == r.name))
            .cloned()
            .collect())
    }

    async fn active_roles_for_user(&self, user_id: UserId) -> StoreResult<Vec<Role>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&user_id)
            .map(|user| state.active_roles_of(user))
            .unwrap_or_default())
    }
}

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        Ok(self.state.read().await.roles.values().cloned().collect())
    }

    async fn get_role(&self, role_id: RoleId) -> StoreResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }

    async fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn user_roles(&self, user_id: UserId) -> StoreResult<Vec<Role>> {
        let state = self.state.read().await;
        let user = state
            .users
            .get(&user_id)
            .ok_or(StoreError::UserNotFound(user_id))?;
        Ok(state.active_roles_of(user))
    }

    async fn create_role(&self, role: NewRole) -> StoreResult<Role> {
        role.validate()?;

        let mut state = self.state.write().await;
        if state.name_taken(&role.name, None) {
            return Err(StoreError::DuplicateRoleName(role.name.trim().to_string()));
        }

        state.last_role_id += 1;
        let role = role.into_role(state.last_role_id);
        state.roles.insert(role.id, role.clone());

        info!(role_id = role.id, name = %role.name, "Role created");
        Ok(role)
    }

    async fn update_role(&self, role_id: RoleId, patch: RolePatch) -> StoreResult<Role> {
        let mut state = self.state.write().await;

        if let Some(name) = &patch.name {
            if state.name_taken(name, Some(role_id)) {
                return Err(StoreError::DuplicateRoleName(name.trim().to_string()));
            }
        }

        let role = state
            .roles
            .get_mut(&role_id)
            .ok_or(StoreError::RoleNotFound(role_id))?;
        patch.apply(role)?;

        info!(role_id, name = %role.name, active = role.is_active, "Role updated");
        Ok(role.clone())
    }

    async fn delete_role(&self, role_id: RoleId) -> StoreResult<()> {
        let mut state = self.state.write().await;

        if !state.roles.contains_key(&role_id) {
            return Err(StoreError::RoleNotFound(role_id));
        }
        if state.users.values().any(|u| u.has_role(role_id)) {
            return Err(StoreError::RoleInUse(role_id));
        }

        state.roles.remove(&role_id);
        info!(role_id, "Role deleted");
        Ok(())
    }

    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()> {
        let mut state = self.state.write().await;

        let role_active = match state.roles.get(&role_id) {
            Some(role) => role.is_active,
            None if state.users.contains_key(&user_id) => {
                return Err(StoreError::RoleNotFound(role_id))
            }
            None => return Err(StoreError::UserNotFound(user_id)),
        };
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::UserNotFound(user_id))?;
        if !role_active {
            return Err(StoreError::RoleInactive(role_id));
        }

        user.role_ids.insert(role_id);
        info!(user_id, role_id, "Role assigned to user");
        Ok(())
    }

    async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()> {
        let mut state = self.state.write().await;

        let user = state
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::UserNotFound(user_id))?;
        if !user.role_ids.remove(&role_id) {
            return Err(StoreError::RoleNotFound(role_id));
        }

        info!(user_id, role_id, "Role removed from user");
        Ok(())
    }
}
