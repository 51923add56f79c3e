//! # Access Teams
//!
//! Team permissions built on the resource permission engine.
//!
//! ## Overview
//!
//! The access-teams crate handles:
//! - **Teams**: Teams within an organization and their memberships
//! - **Levels**: `Member` (`teams:read`) and `Admin` (team management plus
//!   permission and preference management)
//! - **Validation**: Team ids must be numeric and name a team of the organization
//! - **Membership sync**: Granting a user a level registers them as a team
//!   member, with the admin flag for `Admin`
//! - **Configuration**: Environment-driven service options
//!
//! ## Architecture
//!
//! ```text
//! ResourceServices
//!   └─ teams: ResourcePermissionService<TeamPermission>
//!        ├─ TeamValidator ──────→ TeamStore::get_team_by_id
//!        ├─ AssignmentStore
//!        └─ TeamMembershipHook ─→ TeamStore::add_or_update_team_member
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use access_control::RequestContext;
//! use access_store::{MemoryAssignmentStore, MemoryRoleStore};
//! use access_teams::{MemoryTeamStore, ResourceServices, TeamPermissionsConfig, TeamStore};
//!
//! async fn example() {
//!     let teams = Arc::new(MemoryTeamStore::new());
//!     let team = teams.create_team(7, "Platform").await.unwrap();
//!
//!     let services = ResourceServices::provide(
//!         &TeamPermissionsConfig::from_env(),
//!         Arc::new(MemoryAssignmentStore::new()),
//!         Arc::new(MemoryRoleStore::new()),
//!         teams,
//!     )
//!     .await
//!     .unwrap();
//!
//!     services
//!         .teams
//!         .set_user_permission(&RequestContext::new(), 7, &team.id.to_string(), 3, "Admin")
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod config;
pub mod membership;
pub mod permissions;
pub mod services;
pub mod store;
pub mod team;

// Re-export main types for convenience
pub use config::{ConfigError, TeamPermissionsConfig};
pub use membership::{TeamMember, TeamMemberPermission};
pub use permissions::{
    delete_team, provide_team_permissions, team_catalog, TeamMembershipHook, TeamPermission,
    TeamPermissionService, TeamValidator, TEAMS_RESOURCE, TEAM_ADMIN_ACTIONS, TEAM_MEMBER_ACTIONS,
};
pub use services::ResourceServices;
pub use store::{MemoryTeamStore, TeamStore, TeamStoreError, TeamStoreResult};
pub use team::Team;
