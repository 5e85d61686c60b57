//! Wiring of the authorization components
//!
//! [`Authz`] builds the role store (optionally cached), the decision point,
//! the permission service and the admin route table from one
//! [`AuthzConfig`], sharing a single store between them.

use inventory_rbac::{Decision, RouteParams};
use inventory_store::{CachedRoleStore, RoleRepository};
use std::sync::Arc;
use tracing::{info, warn};

use crate::authorizer::{ActionAuthorizer, AuthorizationRequest, Verdict};
use crate::claims::Principal;
use crate::config::{AuthzConfig, CacheConfig};
use crate::endpoint::{Method, RouteTable};
use crate::error::AuthzResult;
use crate::routes::admin_routes;
use crate::service::PermissionService;

/// Role store shared by the decision point and the permission service.
pub type SharedStore = Arc<dyn RoleRepository>;

/// Wrap a store for sharing, adding the read-through cache when enabled.
pub fn shared_store<R>(store: R, cache: &CacheConfig) -> SharedStore
where
    R: RoleRepository + 'static,
{
    if cache.enabled {
        Arc::new(CachedRoleStore::new(store))
    } else {
        Arc::new(store)
    }
}

/// The assembled authorization engine.
///
/// # Example
///
/// ```
/// use inventory_authz::{Authz, AuthzConfig, Method, Principal};
/// use inventory_rbac::{Role, RouteParams};
/// use inventory_store::MemoryStore;
///
/// # async fn example() -> inventory_authz::AuthzResult<()> {
/// let store = MemoryStore::new();
/// store.insert_role(Role::new(1, "Administrator").with_allowed(["*"])).await;
///
/// let authz = Authz::new(store, AuthzConfig::default());
/// let principal = Principal::new(["Administrator"]);
/// let verdict = authz
///     .authorize_route(Some(&principal), Method::Delete, "/role/{id}", &RouteParams::new())
///     .await?;
/// assert!(verdict.is_authorized());
/// # Ok(())
/// # }
/// ```
pub struct Authz {
    config: AuthzConfig,
    routes: RouteTable,
    authorizer: ActionAuthorizer<SharedStore>,
    permissions: PermissionService<SharedStore>,
}

impl std::fmt::Debug for Authz {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authz")
            .field("config", &self.config)
            .field("routes", &self.routes.len())
            .finish_non_exhaustive()
    }
}

impl Authz {
    /// Assemble the engine with the admin API routes.
    pub fn new<R>(store: R, config: AuthzConfig) -> Self
    where
        R: RoleRepository + 'static,
    {
        Self::with_routes(store, config, admin_routes())
    }

    /// Assemble the engine with a custom route table.
    pub fn with_routes<R>(store: R, config: AuthzConfig, routes: RouteTable) -> Self
    where
        R: RoleRepository + 'static,
    {
        let store = shared_store(store, &config.cache);
        info!(
            combine = config.combine.as_str(),
            self_access = config.self_access,
            role_cache = config.cache.enabled,
            routes = routes.len(),
            "Authorization engine ready"
        );

        Self {
            authorizer: ActionAuthorizer::new(Arc::clone(&store), &config),
            permissions: PermissionService::new(store, &config),
            routes,
            config,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &AuthzConfig {
        &self.config
    }

    /// Get the route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Get the decision point.
    pub fn authorizer(&self) -> &ActionAuthorizer<SharedStore> {
        &self.authorizer
    }

    /// Get the permission service.
    pub fn permissions(&self) -> &PermissionService<SharedStore> {
        &self.permissions
    }

    /// Get the shared role store.
    pub fn store(&self) -> &SharedStore {
        self.authorizer.store()
    }

    /// Authorize a request against a registered route.
    ///
    /// A route with no registration is forbidden. Public routes are
    /// registered with no actions.
    pub async fn authorize_route(
        &self,
        principal: Option<&Principal>,
        method: Method,
        path: &str,
        route_params: &RouteParams,
    ) -> AuthzResult<Verdict> {
        let Some(endpoint) = self.routes.get(method, path) else {
            warn!(%method, path, "Route is not registered");
            return Ok(Verdict::Forbidden {
                decision: Decision::deny(),
            });
        };

        self.authorizer
            .authorize(AuthorizationRequest {
                principal,
                endpoint,
                route_params,
            })
            .await
    }
}
