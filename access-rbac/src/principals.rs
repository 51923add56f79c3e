//! # Principals
//!
//! Entities that can receive permissions on a resource: users, teams and
//! built-in (basic) organization roles.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PrincipalError;

/// Organization identifier.
pub type OrgId = i64;

/// User identifier.
pub type UserId = i64;

/// Team identifier.
pub type TeamId = i64;

/// Kind of principal an assignment targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PrincipalKind {
    /// A single user.
    User,
    /// A team of users.
    Team,
    /// A basic organization role (Viewer, Editor, Admin).
    BuiltInRole,
}

impl PrincipalKind {
    /// Get the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::User => "user",
            PrincipalKind::Team => "team",
            PrincipalKind::BuiltInRole => "builtInRole",
        }
    }

    /// All principal kinds.
    pub fn all() -> [Self; 3] {
        [PrincipalKind::User, PrincipalKind::Team, PrincipalKind::BuiltInRole]
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basic organization role that can be targeted by an assignment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuiltInRole {
    /// Read-only organization member
    Viewer,
    /// Organization member who can edit content
    Editor,
    /// Organization administrator
    Admin,
}

impl BuiltInRole {
    /// Get the string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltInRole::Viewer => "Viewer",
            BuiltInRole::Editor => "Editor",
            BuiltInRole::Admin => "Admin",
        }
    }

    /// Parse a basic role name (case-insensitive).
    ///
    /// ```
    /// use access_rbac::BuiltInRole;
    ///
    /// assert_eq!(BuiltInRole::parse("editor"), Some(BuiltInRole::Editor));
    /// assert_eq!(BuiltInRole::parse("Owner"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "viewer" => Some(BuiltInRole::Viewer),
            "editor" => Some(BuiltInRole::Editor),
            "admin" => Some(BuiltInRole::Admin),
            _ => None,
        }
    }
}

/// A concrete principal: kind plus identifier.
///
/// Ordering groups principals by kind (users, then teams, then built-in
/// roles) and then by id, which is the listing order of assignments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Principal {
    /// A user by id.
    User(UserId),
    /// A team by id.
    Team(TeamId),
    /// A basic organization role.
    BuiltInRole(BuiltInRole),
}

impl Principal {
    /// Parse a principal from its kind and raw identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PrincipalError::InvalidId`] when the id is not numeric for
    /// users and teams, or not a known basic role for built-in roles.
    ///
    /// # Example
    ///
    /// ```
    /// use access_rbac::{Principal, PrincipalKind};
    ///
    /// let user = Principal::parse(PrincipalKind::User, "7").unwrap();
    /// assert_eq!(user, Principal::User(7));
    /// assert!(Principal::parse(PrincipalKind::Team, "core").is_err());
    /// ```
    pub fn parse(kind: PrincipalKind, id: &str) -> Result<Self, PrincipalError> {
        let invalid = || PrincipalError::InvalidId {
            kind: kind.as_str(),
            id: id.to_string(),
        };
        match kind {
            PrincipalKind::User => id.parse().map(Principal::User).map_err(|_| invalid()),
            PrincipalKind::Team => id.parse().map(Principal::Team).map_err(|_| invalid()),
            PrincipalKind::BuiltInRole => BuiltInRole::parse(id)
                .map(Principal::BuiltInRole)
                .ok_or_else(invalid),
        }
    }

    /// The kind of this principal.
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Principal::User(_) => PrincipalKind::User,
            Principal::Team(_) => PrincipalKind::Team,
            Principal::BuiltInRole(_) => PrincipalKind::BuiltInRole,
        }
    }

    /// The identifier as a string.
    pub fn id_string(&self) -> String {
        match self {
            Principal::User(id) | Principal::Team(id) => id.to_string(),
            Principal::BuiltInRole(role) => role.as_str().to_string(),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id_string())
    }
}

/// Which principal kinds a resource type accepts assignments for.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentTargets {
    /// Assignments to individual users
    pub users: bool,
    /// Assignments to teams
    pub teams: bool,
    /// Assignments to basic organization roles
    pub built_in_roles: bool,
}

impl AssignmentTargets {
    /// Targets accepting users only.
    pub fn users_only() -> Self {
        Self {
            users: true,
            teams: false,
            built_in_roles: false,
        }
    }

    /// Targets accepting every principal kind.
    pub fn all() -> Self {
        Self {
            users: true,
            teams: true,
            built_in_roles: true,
        }
    }

    /// Check if assignments for this kind are allowed.
    pub fn allows(&self, kind: PrincipalKind) -> bool {
        match kind {
            PrincipalKind::User => self.users,
            PrincipalKind::Team => self.teams,
            PrincipalKind::BuiltInRole => self.built_in_roles,
        }
    }

    /// Allowed kinds in declaration order.
    pub fn enabled_kinds(&self) -> Vec<PrincipalKind> {
        PrincipalKind::all()
            .into_iter()
            .filter(|kind| self.allows(*kind))
            .collect()
    }
}
