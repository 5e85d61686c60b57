//! Request-time authorization
//!
//! [`ActionAuthorizer`] is the decision point the serving layer calls for
//! every matched route. It resolves the endpoint's declared templates with
//! the request's route parameters, loads the active roles the principal
//! claims, and hands both to the policy evaluator.
//!
//! Role lookups go to the store on every request, so role edits take effect
//! immediately. A failed lookup is returned as an error, never as an allow.

use inventory_rbac::template::resolve_all;
use inventory_rbac::{Decision, PolicyEvaluator, RouteParams};
use inventory_store::RoleStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::claims::Principal;
use crate::config::{AuthzConfig, DecisionLogging};
use crate::endpoint::Endpoint;
use crate::error::{AuthzError, AuthzResult};

/// Outcome of authorizing one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The request may proceed
    Authorized {
        /// Evaluation details; empty for endpoints without requirements
        decision: Decision,
    },

    /// The principal lacks the required actions
    Forbidden {
        /// Evaluation details
        decision: Decision,
    },

    /// A protected endpoint was called without a principal
    Unauthenticated,
}

impl Verdict {
    /// Check if the request may proceed.
    pub fn is_authorized(&self) -> bool {
        matches!(self, Verdict::Authorized { .. })
    }

    /// Get the evaluation details, if the evaluator ran.
    pub fn decision(&self) -> Option<&Decision> {
        match self {
            Verdict::Authorized { decision } | Verdict::Forbidden { decision } => Some(decision),
            Verdict::Unauthenticated => None,
        }
    }

    /// Convert a rejection into the matching error.
    pub fn into_result(self) -> AuthzResult<Decision> {
        match self {
            Verdict::Authorized { decision } => Ok(decision),
            Verdict::Forbidden { .. } => Err(AuthzError::Forbidden),
            Verdict::Unauthenticated => Err(AuthzError::Unauthenticated),
        }
    }
}

/// One inbound request, as seen by the decision point.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationRequest<'a> {
    /// The authenticated caller, if any
    pub principal: Option<&'a Principal>,

    /// The matched endpoint
    pub endpoint: &'a Endpoint,

    /// Route parameter values of the request
    pub route_params: &'a RouteParams,
}

impl<'a> AuthorizationRequest<'a> {
    /// Create a request from an authenticated principal.
    pub fn new(
        principal: &'a Principal,
        endpoint: &'a Endpoint,
        route_params: &'a RouteParams,
    ) -> Self {
        Self {
            principal: Some(principal),
            endpoint,
            route_params,
        }
    }

    /// Create a request carrying no credentials.
    pub fn anonymous(endpoint: &'a Endpoint, route_params: &'a RouteParams) -> Self {
        Self {
            principal: None,
            endpoint,
            route_params,
        }
    }
}

/// The authorization decision point.
///
/// # Example
///
/// ```
/// use inventory_authz::{ActionAuthorizer, AuthorizationRequest, AuthzConfig, Endpoint, Method, Principal};
/// use inventory_rbac::{Role, RouteParams};
/// use inventory_store::MemoryStore;
///
/// # async fn example() -> inventory_authz::AuthzResult<()> {
/// let store = MemoryStore::new();
/// store.insert_role(Role::new(1, "Viewer").with_allowed(["/role/read"])).await;
///
/// let authorizer = ActionAuthorizer::new(store, &AuthzConfig::default());
/// let endpoint = Endpoint::new(Method::Get, "/role").requires("/role/read");
/// let principal = Principal::new(["Viewer"]);
/// let params = RouteParams::new();
///
/// let verdict = authorizer
///     .authorize(AuthorizationRequest::new(&principal, &endpoint, &params))
///     .await?;
/// assert!(verdict.is_authorized());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ActionAuthorizer<S> {
    store: S,
    evaluator: PolicyEvaluator,
    logging: DecisionLogging,
}

impl<S: RoleStore> ActionAuthorizer<S> {
    /// Create a decision point over a role store.
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

    /// Get the evaluator.
    pub fn evaluator(&self) -> &PolicyEvaluator {
        &self.evaluator
    }

    /// Authorize one request.
    ///
    /// Endpoints declaring no actions are authorized without consulting the
    /// principal or the store.
    #[instrument(skip(self, request), fields(endpoint = %request.endpoint))]
    pub async fn authorize(&self, request: AuthorizationRequest<'_>) -> AuthzResult<Verdict> {
        if !request.endpoint.is_protected() {
            debug!("Endpoint declares no actions");
            return Ok(Verdict::Authorized {
                decision: Decision::allow(),
            });
        }

        let principal = match request.principal {
            Some(principal) => principal,
            None => {
                if self.logging.logs_denials() {
                    warn!("Protected endpoint called without credentials");
                }
                return Ok(Verdict::Unauthenticated);
            }
        };

        let required = resolve_all(&request.endpoint.actions, request.route_params);
        let decision = self.decide(principal, &required).await?;
        log_decision(self.logging, &request.endpoint.to_string(), principal.user_id, &decision);

        Ok(if decision.allowed {
            Verdict::Authorized { decision }
        } else {
            Verdict::Forbidden { decision }
        })
    }

    /// Authorize one request, turning a rejection into an error.
    pub async fn require(&self, request: AuthorizationRequest<'_>) -> AuthzResult<Decision> {
        self.authorize(request).await?.into_result()
    }

    /// Evaluate concrete actions for a principal.
    ///
    /// An empty `required` list is denied; see [`ActionAuthorizer::authorize`]
    /// for endpoints without requirements.
    pub async fn decide(&self, principal: &Principal, required: &[String]) -> AuthzResult<Decision> {
        let roles = if principal.role_names.is_empty() {
            Vec::new()
        } else {
            self.store
                .active_roles_by_name(&principal.role_names)
                .await
                .map_err(|e| {
                    error!(error = %e, "Role lookup failed");
                    e
                })?
        };

        debug!(
            claimed = principal.role_names.len(),
            active = roles.len(),
            "Loaded roles"
        );
        Ok(self.evaluator.evaluate(&roles, required, principal.user_id))
    }
}

/// Log a decision according to the configured level.
pub(crate) fn log_decision(
    logging: DecisionLogging,
    subject: &str,
    user_id: Option<inventory_rbac::UserId>,
    decision: &Decision,
) {
    if decision.allowed {
        if logging.logs_grants() {
            let granted_by: Vec<&str> = decision.grants.iter().map(|g| g.role.as_str()).collect();
            info!(subject, ?user_id, ?granted_by, "Authorization granted");
        }
    } else if logging.logs_denials() {
        warn!(subject, ?user_id, ungranted = ?decision.ungranted, "Authorization denied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Method;
    use inventory_rbac::Role;
    use inventory_store::MemoryStore;

    async fn authorizer() -> ActionAuthorizer<MemoryStore> {
        let store = MemoryStore::new();
        store
            .insert_role(Role::new(1, "Administrator").with_allowed(["*"]))
            .await;
        store
            .insert_role(
                Role::new(2, "Role Manager")
                    .with_allowed(["/role/*", "/user/*/role/*"])
                    .with_denied(["/role/delete"]),
            )
            .await;
        store
            .insert_role(Role::new(3, "Retired").with_allowed(["*"]).with_active(false))
            .await;
        ActionAuthorizer::new(store, &AuthzConfig::default())
    }

    fn params(pairs: &[(&str, &str)]) -> RouteParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_unprotected_endpoint_is_authorized() {
        let authorizer = authorizer().await;
        let endpoint = Endpoint::new(Method::Post, "/auth/login");
        let params = RouteParams::new();

        let verdict = authorizer
            .authorize(AuthorizationRequest::anonymous(&endpoint, &params))
            .await
            .unwrap();
        assert!(verdict.is_authorized());
    }

    #[tokio::test]
    async fn test_anonymous_on_protected_endpoint() {
        let authorizer = authorizer().await;
        let endpoint = Endpoint::new(Method::Get, "/role").requires("/role/read");
        let params = RouteParams::new();

        let verdict = authorizer
            .authorize(AuthorizationRequest::anonymous(&endpoint, &params))
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Unauthenticated);
        assert!(matches!(verdict.into_result(), Err(AuthzError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_templates_resolved_from_route() {
        let authorizer = authorizer().await;
        let endpoint = Endpoint::new(Method::Post, "/user/{userid}/role/{roleId}")
            .requires("/user/{userid}/role/write");
        let principal = Principal::new(["Role Manager"]);
        let params = params(&[("userid", "9"), ("roleId", "2")]);

        let decision = authorizer
            .require(AuthorizationRequest::new(&principal, &endpoint, &params))
            .await
            .unwrap();
        assert_eq!(decision.grants[0].action, "/user/9/role/write");
        assert_eq!(decision.grants[0].role, "Role Manager");
    }

    #[tokio::test]
    async fn test_deny_pattern_forbids() {
        let authorizer = authorizer().await;
        let endpoint = Endpoint::new(Method::Delete, "/role/{id}").requires("/role/delete");
        let principal = Principal::new(["Role Manager"]);
        let params = params(&[("id", "4")]);

        let verdict = authorizer
            .authorize(AuthorizationRequest::new(&principal, &endpoint, &params))
            .await
            .unwrap();
        assert!(!verdict.is_authorized());
        assert_eq!(
            verdict.decision().unwrap().ungranted,
            vec!["/role/delete".to_string()]
        );
        assert!(matches!(verdict.into_result(), Err(AuthzError::Forbidden)));
    }

    #[tokio::test]
    async fn test_inactive_and_unknown_roles_grant_nothing() {
        let authorizer = authorizer().await;
        let principal = Principal::new(["Retired", "Ghost"]);

        let decision = authorizer
            .decide(&principal, &["/product/read".to_string()])
            .await
            .unwrap();
        assert!(!decision.allowed);
    }

    #[tokio::test]
    async fn test_self_access_without_roles() {
        let authorizer = authorizer().await;
        let endpoint = Endpoint::new(Method::Get, "/user/{id}").requires("/user/{id}/read");
        let principal = Principal::default().with_user_id(7);

        let own = params(&[("id", "7")]);
        let verdict = authorizer
            .authorize(AuthorizationRequest::new(&principal, &endpoint, &own))
            .await
            .unwrap();
        assert!(verdict.is_authorized());

        let other = params(&[("id", "8")]);
        let verdict = authorizer
            .authorize(AuthorizationRequest::new(&principal, &endpoint, &other))
            .await
            .unwrap();
        assert!(!verdict.is_authorized());
    }
}
