//! # Action Templates
//!
//! Endpoints declare the actions they require as templates such as
//! `/user/{userid}/role/write`. Before matching, every `{name}` placeholder
//! is replaced with the value of the route parameter of the same name.
//!
//! Placeholders with no matching parameter are left verbatim, so the resolved
//! action still names the placeholder and will only match wildcard patterns.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Route parameter values of one request, keyed by parameter name.
pub type RouteParams = HashMap<String, String>;

/// An action string that may contain `{name}` placeholders.
///
/// # Example
///
/// ```
/// use inventory_rbac::template::{ActionTemplate, RouteParams};
///
/// let template = ActionTemplate::new("/user/{userid}/role/write");
/// assert_eq!(template.placeholders(), vec!["userid"]);
///
/// let mut params = RouteParams::new();
/// params.insert("userid".to_string(), "7".to_string());
/// assert_eq!(template.resolve(&params), "/user/7/role/write");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionTemplate(String);

impl ActionTemplate {
    /// Create a template from its declared string.
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Get the template as declared.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Names of the placeholders in declaration order.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.0.as_str();
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) if !after[..close].contains('{') => {
                    names.push(&after[..close]);
                    rest = &after[close + 1..];
                }
                _ => rest = after,
            }
        }
        names
    }

    /// Substitute route parameter values into the template.
    ///
    /// Parameter names are looked up exactly first, then ignoring ASCII case.
    pub fn resolve(&self, params: &RouteParams) -> String {
        let mut resolved = String::with_capacity(self.0.len());
        let mut rest = self.0.as_str();

        while let Some(open) = rest.find('{') {
            resolved.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            match after.find('}') {
                Some(close) if !after[..close].contains('{') => {
                    let name = &after[..close];
                    match lookup(params, name) {
                        Some(value) => resolved.push_str(value),
                        None => {
                            resolved.push('{');
                            resolved.push_str(name);
                            resolved.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                _ => {
                    resolved.push('{');
                    rest = after;
                }
            }
        }

        resolved.push_str(rest);
        resolved
    }
}

impl From<&str> for ActionTemplate {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ActionTemplate {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ActionTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn lookup<'a>(params: &'a RouteParams, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .or_else(|| {
            params
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
        .map(String::as_str)
}

/// Resolve each template independently, preserving declaration order.
pub fn resolve_all(templates: &[ActionTemplate], params: &RouteParams) -> Vec<String> {
    templates.iter().map(|t| t.resolve(params)).collect()
}
