//! # Role Policy Evaluation
//!
//! Decides whether a set of roles grants the actions an endpoint requires.
//!
//! Each active role is evaluated on its own: an action is granted by a role
//! when one of the role's allow patterns matches it and none of the same
//! role's deny patterns does. A deny in one role never cancels a grant from
//! another role.
//!
//! When a requesting user id is known, every role's allow list is extended
//! with the implicit self-access grants `/user/{id}/*/read` and
//! `/user/{id}/read`. A requester holding no active role at all is still
//! given these grants on their own.
//!
//! The way per-action results combine into one decision is a
//! [`CombinePolicy`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pattern::ActionPattern;
use crate::role::{Role, UserId};

/// Name reported for grants that come from the implicit self-access patterns
/// of a requester with no active roles.
pub const SELF_ACCESS_GRANTOR: &str = "self";

/// How per-action grants combine into one decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinePolicy {
    /// Allowed when any role grants any one of the required actions.
    #[default]
    AnyOf,

    /// Allowed only when every required action is granted by some role.
    AllOf,
}

impl CombinePolicy {
    /// Get the string representation of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            CombinePolicy::AnyOf => "any_of",
            CombinePolicy::AllOf => "all_of",
        }
    }

    /// Parse policy from string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use inventory_rbac::CombinePolicy;
    ///
    /// assert_eq!(CombinePolicy::parse("all_of"), Some(CombinePolicy::AllOf));
    /// assert_eq!(CombinePolicy::parse("AnyOf"), Some(CombinePolicy::AnyOf));
    /// assert_eq!(CombinePolicy::parse("most_of"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "anyof" | "any" => Some(CombinePolicy::AnyOf),
            "allof" | "all" => Some(CombinePolicy::AllOf),
            _ => None,
        }
    }
}

/// A required action granted by a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// The concrete action that was granted.
    pub action: String,
    /// Name of the granting role, or [`SELF_ACCESS_GRANTOR`].
    pub role: String,
}

/// Outcome of one evaluation. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the requirement is satisfied.
    pub allowed: bool,
    /// Required actions that some role granted.
    pub grants: Vec<Grant>,
    /// Required actions that no role granted.
    pub ungranted: Vec<String>,
}

impl Decision {
    /// A decision that allows without any evaluated grant.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            ..Self::default()
        }
    }

    /// A decision that denies everything.
    pub fn deny() -> Self {
        Self::default()
    }
}

/// Implicit patterns letting a user read their own user record.
///
/// # Example
///
/// ```
/// use inventory_rbac::policy::self_access_patterns;
///
/// assert_eq!(self_access_patterns(7), ["/user/7/*/read", "/user/7/read"]);
/// ```
pub fn self_access_patterns(user_id: UserId) -> [String; 2] {
    [
        format!("/user/{}/*/read", user_id),
        format!("/user/{}/read", user_id),
    ]
}

/// A role with its patterns compiled for one evaluation.
struct CompiledRole<'a> {
    name: &'a str,
    allow: Vec<ActionPattern>,
    deny: Vec<ActionPattern>,
}

impl CompiledRole<'_> {
    fn grants(&self, action: &str) -> bool {
        let allowed = self.allow.iter().any(|p| p.matches(action));
        if !allowed {
            return false;
        }

        match self.deny.iter().find(|p| p.matches(action)) {
            Some(pattern) => {
                debug!(role = %self.name, action = %action, pattern = %pattern, "Action denied by role");
                false
            }
            None => true,
        }
    }
}

/// Evaluates roles against required actions.
///
/// The evaluator is a plain value: it holds no role data and may be shared
/// freely between concurrent requests.
///
/// # Example
///
/// ```
/// use inventory_rbac::{CombinePolicy, PolicyEvaluator, Role};
///
/// let clerk = Role::new(2, "Stock Clerk")
///     .with_allowed(["/inventory/*"])
///     .with_denied(["/inventory/delete"]);
/// let evaluator = PolicyEvaluator::new(CombinePolicy::AnyOf);
///
/// let roles = [clerk];
/// assert!(evaluator.is_allowed(&roles, &["/inventory/5/read".to_string()], None));
/// assert!(!evaluator.is_allowed(&roles, &["/inventory/delete".to_string()], None));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyEvaluator {
    combine: CombinePolicy,
    self_access: bool,
}

impl Default for PolicyEvaluator {
    fn default() -> Self {
        Self::new(CombinePolicy::default())
    }
}

impl PolicyEvaluator {
    /// Create an evaluator with implicit self-access grants enabled.
    pub fn new(combine: CombinePolicy) -> Self {
        Self {
            combine,
            self_access: true,
        }
    }

    /// Enable or disable the implicit self-access grants.
    pub fn with_self_access(mut self, enabled: bool) -> Self {
        self.self_access = enabled;
        self
    }

    /// Get the combination policy.
    pub fn combine(&self) -> CombinePolicy {
        self.combine
    }

    /// Evaluate `roles` against `required` actions.
    ///
    /// Inactive roles are ignored. An empty `required` list is never
    /// satisfied here; callers decide what an endpoint without requirements
    /// means.
    pub fn evaluate(
        &self,
        roles: &[Role],
        required: &[String],
        requester: Option<UserId>,
    ) -> Decision {
        let implicit: Vec<String> = match requester {
            Some(user_id) if self.self_access => self_access_patterns(user_id).to_vec(),
            _ => Vec::new(),
        };

        let mut compiled: Vec<CompiledRole<'_>> = roles
            .iter()
            .filter(|role| role.is_active)
            .map(|role| CompiledRole {
                name: role.name.as_str(),
                allow: role
                    .allowed_actions
                    .iter()
                    .chain(implicit.iter())
                    .map(|p| ActionPattern::compile(p))
                    .collect(),
                deny: role
                    .not_allowed_actions
                    .iter()
                    .map(|p| ActionPattern::compile(p))
                    .collect(),
            })
            .collect();

        if compiled.is_empty() && !implicit.is_empty() {
            compiled.push(CompiledRole {
                name: SELF_ACCESS_GRANTOR,
                allow: implicit.iter().map(|p| ActionPattern::compile(p)).collect(),
                deny: Vec::new(),
            });
        }

        let mut decision = Decision::deny();
        for action in required {
            match compiled.iter().find(|role| role.grants(action)) {
                Some(role) => {
                    debug!(role = %role.name, action = %action, "Action granted");
                    decision.grants.push(Grant {
                        action: action.clone(),
                        role: role.name.to_string(),
                    });
                }
                None => {
                    debug!(action = %action, "Action not granted by any role");
                    decision.ungranted.push(action.clone());
                }
            }
        }

        decision.allowed = match self.combine {
            CombinePolicy::AnyOf => !decision.grants.is_empty(),
            CombinePolicy::AllOf => !required.is_empty() && decision.ungranted.is_empty(),
        };
        decision
    }

    /// Evaluate and return only the verdict.
    pub fn is_allowed(&self, roles: &[Role], required: &[String], requester: Option<UserId>) -> bool {
        self.evaluate(roles, required, requester).allowed
    }

    /// Evaluate a single action.
    pub fn is_action_allowed(&self, roles: &[Role], action: &str, requester: Option<UserId>) -> bool {
        self.is_allowed(roles, &[action.to_string()], requester)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn any_of() -> PolicyEvaluator {
        PolicyEvaluator::new(CombinePolicy::AnyOf)
    }

    #[test]
    fn test_deny_overrides_allow_within_role() {
        let role = Role::new(1, "Clerk")
            .with_allowed(["/inventory/*"])
            .with_denied(["/inventory/delete"]);
        let roles = [role];

        assert!(any_of().is_action_allowed(&roles, "/inventory/5/read", None));
        assert!(any_of().is_action_allowed(&roles, "/inventory/5/write", None));
        assert!(!any_of().is_action_allowed(&roles, "/inventory/delete", None));
    }

    #[test]
    fn test_deny_in_one_role_does_not_cancel_another() {
        let restricted = Role::new(1, "Restricted")
            .with_allowed(["/inventory/*"])
            .with_denied(["/inventory/delete"]);
        let manager = Role::new(2, "Manager").with_allowed(["/inventory/delete"]);
        let roles = [restricted, manager];

        let decision = any_of().evaluate(&roles, &actions(&["/inventory/delete"]), None);
        assert!(decision.allowed);
        assert_eq!(decision.grants[0].role, "Manager");
    }

    #[test]
    fn test_inactive_roles_contribute_nothing() {
        let roles = [Role::new(2, "Inactive Role").with_allowed(["*"]).with_active(false)];
        for action in ["/role/read", "/inventory/1/delete", "/user/1/read"] {
            assert!(!any_of().is_action_allowed(&roles, action, None));
        }
    }

    #[test]
    fn test_administrator_wildcard() {
        let roles = [Role::new(1, "Administrator").with_allowed(["*"])];
        assert!(any_of().is_action_allowed(&roles, "/role/read", None));
    }

    #[test]
    fn test_multiple_allow_patterns() {
        let roles = [Role::new(3, "Buyer").with_allowed(["/inventory/*", "/product/*"])];
        assert!(any_of().is_action_allowed(&roles, "/product/write", None));
        assert!(!any_of().is_action_allowed(&roles, "/user/write", None));
    }

    #[test]
    fn test_self_access_without_roles() {
        assert!(any_of().is_action_allowed(&[], "/user/3/read", Some(3)));
        assert!(any_of().is_action_allowed(&[], "/user/3/role/read", Some(3)));
        assert!(!any_of().is_action_allowed(&[], "/user/3/write", Some(3)));
        assert!(!any_of().is_action_allowed(&[], "/user/4/read", Some(3)));
        assert!(!any_of().is_action_allowed(&[], "/user/3/read", None));
    }

    #[test]
    fn test_self_access_with_unrelated_role() {
        let roles = [Role::new(3, "Buyer").with_allowed(["/product/*"])];
        assert!(any_of().is_action_allowed(&roles, "/user/7/read", Some(7)));
        assert!(!any_of().is_action_allowed(&roles, "/user/8/read", Some(7)));
    }

    #[test]
    fn test_role_deny_applies_to_self_access() {
        let roles = [Role::new(5, "Locked").with_denied(["/user/*"])];
        assert!(!any_of().is_action_allowed(&roles, "/user/7/read", Some(7)));
    }

    #[test]
    fn test_self_access_with_only_inactive_roles() {
        let roles = [Role::new(5, "Dormant").with_active(false)];
        let decision = any_of().evaluate(&roles, &actions(&["/user/7/read"]), Some(7));
        assert!(decision.allowed);
        assert_eq!(decision.grants[0].role, SELF_ACCESS_GRANTOR);
    }

    #[test]
    fn test_self_access_can_be_disabled() {
        let evaluator = any_of().with_self_access(false);
        assert!(!evaluator.is_action_allowed(&[], "/user/3/read", Some(3)));
    }

    #[test]
    fn test_any_of_across_required_actions() {
        let roles = [Role::new(3, "Buyer").with_allowed(["/product/*"])];
        let required = actions(&["/user/1/write", "/product/write"]);

        let decision = any_of().evaluate(&roles, &required, None);
        assert!(decision.allowed);
        assert_eq!(decision.ungranted, vec!["/user/1/write"]);
    }

    #[test]
    fn test_all_of_across_required_actions() {
        let evaluator = PolicyEvaluator::new(CombinePolicy::AllOf);
        let buyer = Role::new(3, "Buyer").with_allowed(["/product/*"]);
        let clerk = Role::new(4, "Clerk").with_allowed(["/inventory/*"]);

        let required = actions(&["/product/write", "/inventory/write"]);
        assert!(!evaluator.is_allowed(&[buyer.clone()], &required, None));
        assert!(evaluator.is_allowed(&[buyer, clerk], &required, None));
    }

    #[test]
    fn test_empty_requirements_are_not_satisfied() {
        let roles = [Role::new(1, "Administrator").with_allowed(["*"])];
        assert!(!any_of().is_allowed(&roles, &[], None));
        assert!(!PolicyEvaluator::new(CombinePolicy::AllOf).is_allowed(&roles, &[], None));
    }

    #[test]
    fn test_no_roles_denies() {
        assert!(!any_of().is_action_allowed(&[], "/role/read", None));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let roles = [Role::new(1, "Clerk")
            .with_allowed(["/inventory/*"])
            .with_denied(["/inventory/delete"])];
        let required = actions(&["/inventory/delete", "/inventory/2/read"]);

        let first = any_of().evaluate(&roles, &required, Some(2));
        let second = any_of().evaluate(&roles, &required, Some(2));
        assert_eq!(first, second);
    }

    #[test]
    fn test_combine_policy_parse() {
        assert_eq!(CombinePolicy::parse("any_of"), Some(CombinePolicy::AnyOf));
        assert_eq!(CombinePolicy::parse("any-of"), Some(CombinePolicy::AnyOf));
        assert_eq!(CombinePolicy::parse("ALL"), Some(CombinePolicy::AllOf));
        assert_eq!(CombinePolicy::parse(""), None);
        assert_eq!(CombinePolicy::AllOf.as_str(), "all_of");
    }
}
