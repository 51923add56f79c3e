//! # Access RBAC
//!
//! Vocabulary types for resource-scoped access control.
//!
//! ## Overview
//!
//! The access-rbac crate handles:
//! - **Actions**: Fine-grained `<domain>:<verb>` tokens such as `teams:read`
//! - **Permission Levels**: Named tiers (`Member`, `Admin`) per resource type
//! - **Action Catalogs**: Level → action set mapping, validated on construction
//! - **Principals**: Users, teams and built-in roles receiving permissions
//!
//! ## Architecture
//!
//! ```text
//! ActionCatalog<L>
//!   ├─ L::Member ─→ { teams:read }
//!   └─ L::Admin  ─→ { teams:read, teams:write, teams.permissions:write, ... }
//!
//! Assignment = (resource, resource id, Principal) ─→ ActionSet
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use access_rbac::{Action, ActionSet, Principal, PrincipalKind};
//!
//! let actions = ActionSet::parse(["teams:read", "teams:write"]).unwrap();
//! assert!(actions.contains(&Action::new("teams", "read")));
//!
//! let principal = Principal::parse(PrincipalKind::User, "42").unwrap();
//! assert_eq!(principal.kind(), PrincipalKind::User);
//! ```

pub mod actions;
pub mod error;
pub mod levels;
pub mod principals;

// Re-export main types for convenience
pub use actions::{Action, ActionSet};
pub use error::{CatalogError, CatalogResult, PrincipalError};
pub use levels::{ActionCatalog, PermissionLevel};
pub use principals::{AssignmentTargets, BuiltInRole, OrgId, Principal, PrincipalKind, TeamId, UserId};
