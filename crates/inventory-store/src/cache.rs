//! Read-through role cache
//!
//! [`CachedRoleStore`] wraps another store and keeps the active roles it has
//! read, keyed by role id, together with a name index and the active role
//! ids of each user looked up so far.
//!
//! The cache is only correct when every mutation goes through it: each
//! `RoleRepository` write is forwarded to the inner store and then drops the
//! entries it could have made stale.
//!
//! Every invalidation also advances an epoch. A lookup that misses records
//! the epoch before reading the inner store and only fills the cache if no
//! invalidation happened while it was reading, so a result fetched before a
//! concurrent write is returned to its caller but never cached.

use async_trait::async_trait;
use inventory_rbac::{Role, RoleId, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreResult;
use crate::roles::{NewRole, RolePatch};
use crate::store::{RoleRepository, RoleStore};
use crate::user::User;

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered entirely from the cache
    pub hits: u64,
    /// Lookups that reached the inner store
    pub misses: u64,
}

#[derive(Debug, Default)]
struct Entries {
    roles: HashMap<RoleId, Role>,
    by_name: HashMap<String, RoleId>,
    memberships: HashMap<UserId, Vec<RoleId>>,
    epoch: u64,
}

impl Entries {
    fn insert_role(&mut self, role: Role) {
        self.by_name.insert(role.name.clone(), role.id);
        self.roles.insert(role.id, role);
    }

    fn evict_role(&mut self, role_id: RoleId) {
        self.epoch += 1;
        if let Some(role) = self.roles.remove(&role_id) {
            self.by_name.remove(&role.name);
        }
        // A role change can alter which of a user's roles are active.
        self.memberships.clear();
    }

    fn evict_membership(&mut self, user_id: UserId) {
        self.epoch += 1;
        self.memberships.remove(&user_id);
    }

    fn cached_by_name(&self, name: &str) -> Option<&Role> {
        self.by_name.get(name).and_then(|id| self.roles.get(id))
    }
}

/// Read-through cache in front of a role store.
///
/// # Examples
///
/// ```
/// use inventory_store::{CachedRoleStore, MemoryStore, NewRole, RoleRepository, RoleStore};
///
/// # async fn example() -> inventory_store::StoreResult<()> {
/// let store = CachedRoleStore::new(MemoryStore::new());
/// store.create_role(NewRole::new("Viewer").with_allowed(["/product/read"])).await?;
///
/// let names = vec!["Viewer".to_string()];
/// store.active_roles_by_name(&names).await?; // miss
/// store.active_roles_by_name(&names).await?; // hit
/// assert_eq!(store.stats().hits, 1);
/// # Ok(())
/// # }
/// ```
pub struct CachedRoleStore<S> {
    inner: S,
    entries: RwLock<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<S> std::fmt::Debug for CachedRoleStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRoleStore")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl<S> CachedRoleStore<S> {
    /// Wrap a store.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            entries: RwLock::new(Entries::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Get hit/miss counts.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drop every cached entry.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let epoch = entries.epoch + 1;
        *entries = Entries {
            epoch,
            ..Entries::default()
        };
    }

    fn record(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl<S: RoleStore> RoleStore for CachedRoleStore<S> {
    async fn active_roles_by_name(&self, names: &[String]) -> StoreResult<Vec<Role>> {
        let (mut roles, missing, epoch) = {
            let entries = self.entries.read().await;
            let mut roles = Vec::new();
            let mut missing = Vec::new();
            for name in names {
                match entries.cached_by_name(name) {
                    Some(role) => roles.push(role.clone()),
                    None => missing.push(name.clone()),
                }
            }
            (roles, missing, entries.epoch)
        };

        self.record(missing.is_empty());
        if missing.is_empty() {
            return Ok(roles);
        }

        debug!(count = missing.len(), "Role cache miss by name");
        let fetched = self.inner.active_roles_by_name(&missing).await?;
        {
            let mut entries = self.entries.write().await;
            if entries.epoch == epoch {
                for role in &fetched {
                    entries.insert_role(role.clone());
                }
            } else {
                debug!("Roles changed during lookup, not caching");
            }
        }
        roles.extend(fetched);
        Ok(roles)
    }

    async fn active_roles_for_user(&self, user_id: UserId) -> StoreResult<Vec<Role>> {
        let epoch = {
            let entries = self.entries.read().await;
            if let Some(ids) = entries.memberships.get(&user_id) {
                let cached: Option<Vec<Role>> =
                    ids.iter().map(|id| entries.roles.get(id).cloned()).collect();
                if let Some(roles) = cached {
                    self.record(true);
                    return Ok(roles);
                }
            }
            entries.epoch
        };

        self.record(false);
        debug!(user_id, "Role cache miss by user");
        let fetched = self.inner.active_roles_for_user(user_id).await?;
        {
            let mut entries = self.entries.write().await;
            if entries.epoch == epoch {
                entries
                    .memberships
                    .insert(user_id, fetched.iter().map(|r| r.id).collect());
                for role in &fetched {
                    entries.insert_role(role.clone());
                }
            } else {
                debug!(user_id, "Roles changed during lookup, not caching");
            }
        }
        Ok(fetched)
    }
}

#[async_trait]
impl<S: RoleRepository> RoleRepository for CachedRoleStore<S> {
    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        self.inner.list_roles().await
    }

    async fn get_role(&self, role_id: RoleId) -> StoreResult<Option<Role>> {
        self.inner.get_role(role_id).await
    }

    async fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>> {
        self.inner.get_user(user_id).await
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.inner.list_users().await
    }

    async fn user_roles(&self, user_id: UserId) -> StoreResult<Vec<Role>> {
        self.inner.user_roles(user_id).await
    }

    async fn create_role(&self, role: NewRole) -> StoreResult<Role> {
        self.inner.create_role(role).await
    }

    async fn update_role(&self, role_id: RoleId, patch: RolePatch) -> StoreResult<Role> {
        let result = self.inner.update_role(role_id, patch).await;
        self.entries.write().await.evict_role(role_id);
        result
    }

    async fn delete_role(&self, role_id: RoleId) -> StoreResult<()> {
        let result = self.inner.delete_role(role_id).await;
        self.entries.write().await.evict_role(role_id);
        result
    }

    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()> {
        let result = self.inner.assign_role(user_id, role_id).await;
        self.entries.write().await.evict_membership(user_id);
        result
    }

    async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()> {
        let result = self.inner.remove_role(user_id, role_id).await;
        self.entries.write().await.evict_membership(user_id);
        result
    }
}
