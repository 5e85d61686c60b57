//! Programmatic permission queries
//!
//! Business logic that needs to know whether a user may perform an action,
//! outside the request pipeline, asks [`PermissionService`]. It loads the
//! user's active roles and runs the same evaluator the decision point uses,
//! so both paths agree for the same roles and user id.

use inventory_rbac::{Decision, PolicyEvaluator, Role, UserId};
use inventory_store::{RoleRepository, RoleStore, User};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::authorizer::log_decision;
use crate::config::{AuthzConfig, DecisionLogging};
use crate::error::{AuthzError, AuthzResult};

/// Action that lets a requester see the roles of other users.
pub const ROLES_READ_ACTION: &str = "/roles/read";

/// Permission checks by user id.
#[derive(Debug)]
pub struct PermissionService<S> {
    store: S,
    evaluator: PolicyEvaluator,
    logging: DecisionLogging,
}

impl<S: RoleStore> PermissionService<S> {
    /// Create a service over a role store.
    pub fn new(store: S, config: &AuthzConfig) -> Self {
        Self {
            store,
            evaluator: config.evaluator(),
            logging: config.decision_logging,
        }
    }

    /// Get the role store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Evaluate one action for a user and return the full decision.
    #[instrument(skip(self))]
    pub async fn check(&self, user_id: UserId, action: &str) -> AuthzResult<Decision> {
        let roles = self
            .store
            .active_roles_for_user(user_id)
            .await
            .map_err(|e| {
                error!(error = %e, "Role lookup failed");
                e
            })?;
        debug!(active = roles.len(), "Loaded roles");

        let decision = self
            .evaluator
            .evaluate(&roles, &[action.to_string()], Some(user_id));
        log_decision(self.logging, action, Some(user_id), &decision);
        Ok(decision)
    }

    /// Check whether a user may perform an action.
    pub async fn has_permission(&self, user_id: UserId, action: &str) -> AuthzResult<bool> {
        Ok(self.check(user_id, action).await?.allowed)
    }

    /// Check a permission, turning a denial into [`AuthzError::Forbidden`].
    pub async fn require_permission(&self, user_id: UserId, action: &str) -> AuthzResult<()> {
        if self.has_permission(user_id, action).await? {
            Ok(())
        } else {
            Err(AuthzError::Forbidden)
        }
    }
}

/// A user record as returned to a requester.
///
/// `roles` is present only when the requester may read role data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    /// User id
    pub id: UserId,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Email address
    pub email: String,

    /// Held roles, active or not
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
}

impl UserView {
    /// Build a view without role data.
    pub fn without_roles(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            roles: None,
        }
    }
}

impl<S: RoleRepository> PermissionService<S> {
    /// Load a user for `requester`, embedding roles only if the requester
    /// holds [`ROLES_READ_ACTION`].
    pub async fn user_view(&self, requester: UserId, user_id: UserId) -> AuthzResult<Option<UserView>> {
        let user = match self.store.get_user(user_id).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        let mut view = UserView::without_roles(&user);
        if self.has_permission(requester, ROLES_READ_ACTION).await? {
            view.roles = Some(self.held_roles(&user).await?);
        }
        Ok(Some(view))
    }

    /// Load every user for `requester`, embedding roles only if the
    /// requester holds [`ROLES_READ_ACTION`].
    pub async fn users_view(&self, requester: UserId) -> AuthzResult<Vec<UserView>> {
        let users = self.store.list_users().await?;
        let with_roles = self.has_permission(requester, ROLES_READ_ACTION).await?;

        let mut views = Vec::with_capacity(users.len());
        for user in &users {
            let mut view = UserView::without_roles(user);
            if with_roles {
                view.roles = Some(self.held_roles(user).await?);
            }
            views.push(view);
        }
        Ok(views)
    }

    async fn held_roles(&self, user: &User) -> AuthzResult<Vec<Role>> {
        let mut roles = Vec::with_capacity(user.role_ids.len());
        for role_id in &user.role_ids {
            if let Some(role) = self.store.get_role(*role_id).await? {
                roles.push(role);
            }
        }
        Ok(roles)
    }
}
