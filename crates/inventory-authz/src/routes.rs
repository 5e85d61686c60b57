//! Action requirements of the admin API routes
//!
//! Role routes require actions on the role collection, except the
//! per-user membership routes, which are scoped to the user so a role can be
//! granted `/user/*/role/read` without seeing other roles. User routes
//! require actions on the user collection; reading a single user also
//! accepts the instance action, so under the any-of policy the implicit
//! self-access grant lets a user read their own record.
//!
//! Routes open to anonymous callers are registered explicitly with no
//! actions; a route missing from the table is never authorized.

use inventory_rbac::{ResourceType, Verb};

use crate::endpoint::{Endpoint, Method, RouteTable};

/// Role administration routes.
pub fn role_routes() -> Vec<Endpoint> {
    let role = ResourceType::Role;
    let user = ResourceType::User;

    vec![
        Endpoint::new(Method::Get, "/role").requires(role.action(Verb::Read)),
        Endpoint::new(Method::Get, "/role/{id}").requires(role.action(Verb::Read)),
        Endpoint::new(Method::Get, "/user/{userid}/role")
            .requires(user.nested_action("{userid}", role, Verb::Read)),
        Endpoint::new(Method::Post, "/role").requires(role.action(Verb::Write)),
        Endpoint::new(Method::Post, "/user/{userid}/role/{roleId}")
            .requires(user.nested_action("{userid}", role, Verb::Write)),
        Endpoint::new(Method::Put, "/role/{id}").requires(role.action(Verb::Write)),
        Endpoint::new(Method::Delete, "/role/{id}").requires(role.action(Verb::Delete)),
        Endpoint::new(Method::Delete, "/user/{userid}/role/{roleid}")
            .requires(user.nested_action("{userid}", role, Verb::Delete)),
    ]
}

/// User administration routes.
pub fn user_routes() -> Vec<Endpoint> {
    let user = ResourceType::User;

    vec![
        Endpoint::new(Method::Get, "/user").requires(user.action(Verb::Read)),
        Endpoint::new(Method::Get, "/user/{id}")
            .requires(user.action(Verb::Read))
            .requires(user.instance_action("{id}", Verb::Read)),
        Endpoint::new(Method::Post, "/user").requires(user.action(Verb::Write)),
        Endpoint::new(Method::Put, "/user/{id}").requires(user.action(Verb::Write)),
        Endpoint::new(Method::Delete, "/user/{id}").requires(user.action(Verb::Delete)),
    ]
}

/// Routes that require no authorization.
pub fn public_routes() -> Vec<Endpoint> {
    vec![Endpoint::new(Method::Post, "/auth/login")]
}

/// Collection and instance routes for a plain resource such as
/// `inventory`, `product` or `category`.
pub fn resource_routes(resource: ResourceType) -> Vec<Endpoint> {
    let collection = format!("/{}", resource);
    let instance = format!("/{}/{{id}}", resource);

    vec![
        Endpoint::new(Method::Get, collection.as_str()).requires(resource.action(Verb::Read)),
        Endpoint::new(Method::Get, instance.as_str()).requires(resource.action(Verb::Read)),
        Endpoint::new(Method::Post, collection.as_str()).requires(resource.action(Verb::Write)),
        Endpoint::new(Method::Put, instance.as_str()).requires(resource.action(Verb::Write)),
        Endpoint::new(Method::Delete, instance.as_str()).requires(resource.action(Verb::Delete)),
    ]
}

/// The full admin API: public, role and user routes, plus the plain
/// resources.
pub fn admin_routes() -> RouteTable {
    let mut table = RouteTable::new();
    table
        .register_all(public_routes())
        .register_all(role_routes())
        .register_all(user_routes());
    for resource in [
        ResourceType::Inventory,
        ResourceType::Product,
        ResourceType::Category,
    ] {
        table.register_all(resource_routes(resource));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(table: &RouteTable, method: Method, path: &str) -> Vec<String> {
        table
            .get(method, path)
            .map(|e| e.actions.iter().map(|a| a.as_str().to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_role_routes() {
        let table = admin_routes();

        assert_eq!(declared(&table, Method::Get, "/role"), vec!["/role/read"]);
        assert_eq!(declared(&table, Method::Get, "/role/{id}"), vec!["/role/read"]);
        assert_eq!(
            declared(&table, Method::Get, "/user/{userid}/role"),
            vec!["/user/{userid}/role/read"]
        );
        assert_eq!(declared(&table, Method::Post, "/role"), vec!["/role/write"]);
        assert_eq!(
            declared(&table, Method::Post, "/user/{userid}/role/{roleId}"),
            vec!["/user/{userid}/role/write"]
        );
        assert_eq!(declared(&table, Method::Put, "/role/{id}"), vec!["/role/write"]);
        assert_eq!(declared(&table, Method::Delete, "/role/{id}"), vec!["/role/delete"]);
        assert_eq!(
            declared(&table, Method::Delete, "/user/{userid}/role/{roleid}"),
            vec!["/user/{userid}/role/delete"]
        );
    }

    #[test]
    fn test_user_routes() {
        let table = admin_routes();
        assert_eq!(declared(&table, Method::Get, "/user"), vec!["/user/read"]);
        assert_eq!(
            declared(&table, Method::Get, "/user/{id}"),
            vec!["/user/read", "/user/{id}/read"]
        );
        assert_eq!(declared(&table, Method::Post, "/user"), vec!["/user/write"]);
        assert_eq!(declared(&table, Method::Put, "/user/{id}"), vec!["/user/write"]);
        assert_eq!(declared(&table, Method::Delete, "/user/{id}"), vec!["/user/delete"]);
    }

    #[test]
    fn test_resource_routes() {
        let table = admin_routes();
        assert_eq!(
            declared(&table, Method::Delete, "/category/{id}"),
            vec!["/category/delete"]
        );
        assert_eq!(declared(&table, Method::Get, "/inventory"), vec!["/inventory/read"]);
        assert_eq!(table.len(), 1 + 8 + 5 + 3 * 5);
    }

    #[test]
    fn test_only_login_is_public() {
        let public: Vec<String> = admin_routes()
            .endpoints()
            .filter(|e| !e.is_protected())
            .map(Endpoint::to_string)
            .collect();
        assert_eq!(public, vec!["POST /auth/login"]);
    }

    #[test]
    fn test_every_placeholder_is_bound() {
        let table = admin_routes();
        for endpoint in table.endpoints() {
            assert!(endpoint.unbound_placeholders().is_empty(), "{}", endpoint);
        }
    }
}
