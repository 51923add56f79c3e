//! Team permissions
//!
//! Wires the generic resource permission service to teams: the `Member` and
//! `Admin` levels, a validator that looks teams up in the team store, and a
//! hook that mirrors user grants into team membership.

use access_control::{
    AssignmentHook, HookError, PermissionError, PermissionResult, RequestContext, ResourceId,
    ResourcePermissionService, ResourceValidator, ValidationError,
};
use access_rbac::{ActionCatalog, CatalogResult, OrgId, PermissionLevel, TeamId, UserId};
use access_store::{AssignmentStore, RoleStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::TeamPermissionsConfig;
use crate::membership::TeamMemberPermission;
use crate::store::{TeamStore, TeamStoreError};

/// Resource type name of teams.
pub const TEAMS_RESOURCE: &str = "teams";

/// Actions granted by the `Member` level.
pub const TEAM_MEMBER_ACTIONS: &[&str] = &["teams:read"];

/// Actions granted by the `Admin` level.
pub const TEAM_ADMIN_ACTIONS: &[&str] = &[
    "teams:read",
    "teams:delete",
    "teams:write",
    "teams.permissions:read",
    "teams.permissions:write",
    "teams.preferences:read",
    "teams.preferences:write",
];

/// Permission level on a team.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TeamPermission {
    /// May see the team
    Member,
    /// May manage the team and its permissions
    Admin,
}

impl PermissionLevel for TeamPermission {
    fn name(&self) -> &'static str {
        match self {
            TeamPermission::Member => "Member",
            TeamPermission::Admin => "Admin",
        }
    }
}

impl TeamPermission {
    /// Membership flag mirrored into the team store for this level.
    pub fn member_permission(&self) -> TeamMemberPermission {
        match self {
            TeamPermission::Member => TeamMemberPermission::Member,
            TeamPermission::Admin => TeamMemberPermission::Admin,
        }
    }
}

/// Permission service for teams.
pub type TeamPermissionService = ResourcePermissionService<TeamPermission>;

/// Catalog mapping team levels to actions.
///
/// # Errors
///
/// Never fails for the built-in action lists; the result mirrors
/// [`ActionCatalog::new`].
pub fn team_catalog() -> CatalogResult<ActionCatalog<TeamPermission>> {
    ActionCatalog::new([
        (TeamPermission::Member, TEAM_MEMBER_ACTIONS),
        (TeamPermission::Admin, TEAM_ADMIN_ACTIONS),
    ])
}

impl From<TeamStoreError> for ValidationError {
    fn from(err: TeamStoreError) -> Self {
        match err {
            TeamStoreError::TeamNotFound { .. } => ValidationError::NotFound(err.to_string()),
            other => ValidationError::Other(Box::new(other)),
        }
    }
}

impl From<TeamStoreError> for PermissionError {
    fn from(err: TeamStoreError) -> Self {
        match err {
            TeamStoreError::TeamNotFound { .. } => PermissionError::NotFound(err.to_string()),
            TeamStoreError::NameTaken(msg) => PermissionError::ConstraintViolation(msg),
            TeamStoreError::Unavailable(msg) => PermissionError::StoreUnavailable(msg),
        }
    }
}

/// Checks that a team exists in the organization.
#[derive(Clone)]
pub struct TeamValidator {
    teams: Arc<dyn TeamStore>,
}

impl TeamValidator {
    /// Create a validator backed by the given team store.
    pub fn new(teams: Arc<dyn TeamStore>) -> Self {
        Self { teams }
    }
}

#[async_trait]
impl ResourceValidator for TeamValidator {
    async fn validate(
        &self,
        _ctx: &RequestContext,
        org_id: OrgId,
        resource_id: &ResourceId,
    ) -> Result<(), ValidationError> {
        let team_id = team_id(resource_id).map_err(|_| {
            ValidationError::InvalidId(format!("team id {:?} is not numeric", resource_id.as_str()))
        })?;
        self.teams.get_team_by_id(org_id, team_id).await?;
        Ok(())
    }
}

/// Registers users granted a team level as members of that team.
///
/// `Admin` registers an administrator, `Member` a plain member. Repeated
/// grants update the existing membership.
#[derive(Clone)]
pub struct TeamMembershipHook {
    teams: Arc<dyn TeamStore>,
}

impl TeamMembershipHook {
    /// Create a hook writing to the given team store.
    pub fn new(teams: Arc<dyn TeamStore>) -> Self {
        Self { teams }
    }
}

#[async_trait]
impl AssignmentHook<TeamPermission> for TeamMembershipHook {
    async fn on_set_user(
        &self,
        _ctx: &RequestContext,
        org_id: OrgId,
        user_id: UserId,
        resource_id: &ResourceId,
        level: TeamPermission,
    ) -> Result<(), HookError> {
        let team_id = team_id(resource_id)?;
        self.teams
            .add_or_update_team_member(org_id, team_id, user_id, false, level.member_permission())
            .await?;
        Ok(())
    }
}

fn team_id(resource_id: &ResourceId) -> Result<TeamId, HookError> {
    resource_id
        .as_i64()
        .ok_or_else(|| format!("team id {:?} is not numeric", resource_id.as_str()).into())
}

/// Build the team permission service: catalog, validator and membership
/// hook, with meta roles provisioned.
///
/// # Errors
///
/// Catalog errors or role store errors from provisioning.
pub async fn provide_team_permissions(
    config: &TeamPermissionsConfig,
    store: Arc<dyn AssignmentStore>,
    roles: Arc<dyn RoleStore>,
    teams: Arc<dyn TeamStore>,
) -> PermissionResult<TeamPermissionService> {
    let service = ResourcePermissionService::new(
        config.resource_options(),
        team_catalog()?,
        Arc::new(TeamValidator::new(teams.clone())),
        store,
        roles,
    )
    .await?
    .with_hook(Arc::new(TeamMembershipHook::new(teams)));

    tracing::info!(
        resource = TEAMS_RESOURCE,
        only_managed = config.only_managed,
        "Team permission service ready"
    );
    Ok(service)
}

/// Delete a team and every permission assignment on it.
///
/// Assignments are dropped before the team itself, and the context is not
/// consulted once the team delete has started. A call that stops early
/// leaves the team in place, so it can be repeated until it completes.
///
/// Returns the number of assignments removed.
///
/// # Errors
///
/// `NotFound` if the team does not exist, store or context errors.
pub async fn delete_team(
    ctx: &RequestContext,
    service: &TeamPermissionService,
    teams: &dyn TeamStore,
    org_id: OrgId,
    team_id: TeamId,
) -> PermissionResult<usize> {
    ctx.check()?;
    teams.get_team_by_id(org_id, team_id).await?;
    let removed = service
        .delete_resource(ctx, org_id, &team_id.to_string())
        .await?;
    teams.delete_team(org_id, team_id).await?;

    tracing::info!(org_id, team_id, removed, "Team deleted with its permissions");
    Ok(removed)
}
