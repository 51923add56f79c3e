//! HTTP surface descriptors
//!
//! The engine does not run an HTTP server. These types describe the
//! endpoints a router should mount for a resource type and which action each
//! one requires, plus the request and response bodies they exchange.

use access_rbac::{Action, AssignmentTargets, PrincipalKind};
use serde::{Deserialize, Serialize};

use crate::options::ResourceOptions;

/// Path prefix under which resource permission endpoints are mounted.
pub const ROUTE_PREFIX: &str = "/api/access-control";

/// HTTP method of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    /// Read without side effects
    Get,
    /// Create or replace an assignment
    Post,
    /// Remove an assignment
    Delete,
}

impl RouteMethod {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Delete => "DELETE",
        }
    }
}

/// What a route does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "principalKind", rename_all = "camelCase")]
pub enum RouteOperation {
    /// Return the [`ResourceDescription`]
    Describe,
    /// List assignments on one resource instance
    List,
    /// Set a principal's level from a [`SetPermissionBody`]
    Set(PrincipalKind),
    /// Remove a principal's assignment
    Remove(PrincipalKind),
}

/// One endpoint for a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// HTTP method
    pub method: RouteMethod,
    /// Path template with `:param` placeholders
    pub path: String,
    /// Service operation the route maps to
    pub operation: RouteOperation,
    /// Action the caller must hold on the resource
    pub required_action: Action,
}

/// Response body of the description endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescription {
    /// Principal kinds that may receive assignments
    pub assignments: AssignmentTargets,
    /// Level names, lowest first
    pub permissions: Vec<String>,
}

/// Request body of the set endpoints. An empty permission revokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPermissionBody {
    /// Level name; missing or empty means revoke
    #[serde(default)]
    pub permission: String,
}

fn principal_segment(kind: PrincipalKind) -> &'static str {
    match kind {
        PrincipalKind::User => "users/:userId",
        PrincipalKind::Team => "teams/:teamId",
        PrincipalKind::BuiltInRole => "builtInRoles/:builtInRole",
    }
}

/// Endpoints for a resource type.
///
/// Set and remove endpoints exist only for enabled principal kinds. Reads
/// require `<resource>.permissions:read`, writes
/// `<resource>.permissions:write`.
///
/// # Example
///
/// ```
/// use access_control::{routes, ResourceOptions, RouteMethod};
///
/// let routes = routes(&ResourceOptions::new("teams"));
/// assert_eq!(routes.len(), 4);
/// assert_eq!(routes[2].method, RouteMethod::Post);
/// assert_eq!(routes[2].path, "/api/access-control/teams/:resourceId/users/:userId");
/// assert_eq!(routes[2].required_action.as_str(), "teams.permissions:write");
/// ```
pub fn routes(options: &ResourceOptions) -> Vec<Route> {
    let base = format!("{}/{}", ROUTE_PREFIX, options.resource);
    let read = Action::permissions_read(&options.resource);
    let write = Action::permissions_write(&options.resource);

    let mut routes = vec![
        Route {
            method: RouteMethod::Get,
            path: format!("{}/description", base),
            operation: RouteOperation::Describe,
            required_action: read.clone(),
        },
        Route {
            method: RouteMethod::Get,
            path: format!("{}/:resourceId", base),
            operation: RouteOperation::List,
            required_action: read,
        },
    ];

    for kind in options.assignments.enabled_kinds() {
        let path = format!("{}/:resourceId/{}", base, principal_segment(kind));
        routes.push(Route {
            method: RouteMethod::Post,
            path: path.clone(),
            operation: RouteOperation::Set(kind),
            required_action: write.clone(),
        });
        routes.push(Route {
            method: RouteMethod::Delete,
            path,
            operation: RouteOperation::Remove(kind),
            required_action: write.clone(),
        });
    }

    routes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_follow_enabled_kinds() {
        let options = ResourceOptions::new("dashboards").with_assignments(AssignmentTargets::all());
        let routes = routes(&options);

        assert_eq!(routes.len(), 8);
        assert_eq!(routes[0].path, "/api/access-control/dashboards/description");
        assert!(routes
            .iter()
            .filter(|r| r.method == RouteMethod::Get)
            .all(|r| r.required_action.as_str() == "dashboards.permissions:read"));
        assert!(routes.iter().any(|r| r.operation == RouteOperation::Remove(PrincipalKind::BuiltInRole)
            && r.path == "/api/access-control/dashboards/:resourceId/builtInRoles/:builtInRole"));
    }

    #[test]
    fn test_users_only_routes() {
        let routes = routes(&ResourceOptions::new("teams"));
        let kinds: Vec<RouteOperation> = routes.iter().map(|r| r.operation).collect();
        assert_eq!(
            kinds,
            vec![
                RouteOperation::Describe,
                RouteOperation::List,
                RouteOperation::Set(PrincipalKind::User),
                RouteOperation::Remove(PrincipalKind::User),
            ]
        );
    }

    #[test]
    fn test_set_body_defaults_to_revoke() {
        let body: SetPermissionBody = serde_json::from_str("{}").unwrap();
        assert!(body.permission.is_empty());

        let body: SetPermissionBody = serde_json::from_str(r#"{"permission":"Admin"}"#).unwrap();
        assert_eq!(body.permission, "Admin");
    }
}
