//! Endpoints and their declared action requirements
//!
//! Every protected endpoint declares, next to its method and path, the
//! action templates a caller must be granted. [`RouteTable`] holds those
//! declarations so the serving layer can look up what to check for a
//! matched route.

use inventory_rbac::ActionTemplate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Read a collection or an instance
    Get,

    /// Create an instance or an association
    Post,

    /// Replace an instance
    Put,

    /// Remove an instance or an association
    Delete,
}

impl Method {
    /// Get the string representation of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A route and the actions it requires.
///
/// An endpoint with no actions has no authorization requirement.
///
/// # Example
///
/// ```
/// use inventory_authz::{Endpoint, Method};
///
/// let endpoint = Endpoint::new(Method::Get, "/user/{userid}/role")
///     .requires("/user/{userid}/role/read");
/// assert!(endpoint.is_protected());
/// assert_eq!(endpoint.to_string(), "GET /user/{userid}/role");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// HTTP method
    pub method: Method,

    /// Path template, e.g. `/role/{id}`
    pub path: String,

    /// Declared action templates, in declaration order
    #[serde(default)]
    pub actions: Vec<ActionTemplate>,
}

impl Endpoint {
    /// Create an endpoint with no requirements.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            actions: Vec::new(),
        }
    }

    /// Declare a required action template.
    pub fn requires(mut self, action: impl Into<ActionTemplate>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Check if the endpoint declares any action.
    pub fn is_protected(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Placeholders in the declared actions that the path does not bind.
    ///
    /// These stay verbatim after resolution and can only match wildcard
    /// patterns.
    pub fn unbound_placeholders(&self) -> Vec<&str> {
        let path = ActionTemplate::new(self.path.as_str());
        let bound = path.placeholders();
        self.actions
            .iter()
            .flat_map(|action| action.placeholders())
            .filter(|name| !bound.iter().any(|b| b.eq_ignore_ascii_case(name)))
            .collect()
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Registry of endpoints keyed by method and path template.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    endpoints: BTreeMap<(Method, String), Endpoint>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint, replacing any previous one for the same route.
    pub fn register(&mut self, endpoint: Endpoint) -> &mut Self {
        let unbound = endpoint.unbound_placeholders();
        if !unbound.is_empty() {
            warn!(endpoint = %endpoint, ?unbound, "Action placeholders not bound by the route path");
        }
        self.endpoints
            .insert((endpoint.method, endpoint.path.clone()), endpoint);
        self
    }

    /// Register multiple endpoints.
    pub fn register_all<I>(&mut self, endpoints: I) -> &mut Self
    where
        I: IntoIterator<Item = Endpoint>,
    {
        for endpoint in endpoints {
            self.register(endpoint);
        }
        self
    }

    /// Get the endpoint registered for a method and path template.
    pub fn get(&self, method: Method, path: &str) -> Option<&Endpoint> {
        self.endpoints.get(&(method, path.to_string()))
    }

    /// Get all endpoints, ordered by method then path.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Check if no endpoint is registered.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
