//! End-to-end team permission flows with in-memory collaborators.

use std::sync::Arc;

use access_control::{PermissionError, RequestContext};
use access_rbac::{
    AssignmentTargets, BuiltInRole, OrgId, Principal, PrincipalKind, TeamId, UserId,
};
use access_store::{MemoryAssignmentStore, MemoryRoleStore, ResourceScope, RoleStore};
use access_teams::{
    delete_team, MemoryTeamStore, ResourceServices, Team, TeamMember, TeamMemberPermission,
    TeamPermissionsConfig, TeamStore, TeamStoreResult, TEAM_ADMIN_ACTIONS,
};
use async_trait::async_trait;

struct Harness {
    services: ResourceServices,
    assignments: Arc<MemoryAssignmentStore>,
    roles: Arc<MemoryRoleStore>,
    teams: Arc<MemoryTeamStore>,
}

async fn harness_with(config: TeamPermissionsConfig) -> Harness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let assignments = Arc::new(MemoryAssignmentStore::new());
    let roles = Arc::new(MemoryRoleStore::new());
    let teams = Arc::new(MemoryTeamStore::new());
    teams.insert_team(Team::new(42, 7, "Platform")).await;

    let services = ResourceServices::provide(&config, assignments.clone(), roles.clone(), teams.clone())
        .await
        .unwrap();

    Harness {
        services,
        assignments,
        roles,
        teams,
    }
}

async fn harness() -> Harness {
    harness_with(TeamPermissionsConfig::default()).await
}

#[tokio::test]
async fn test_admin_grant_registers_team_admin() {
    let h = harness().await;
    let ctx = RequestContext::new();

    let stored = h
        .services
        .teams
        .set_user_permission(&ctx, 7, "42", 3, "Admin")
        .await
        .unwrap()
        .unwrap();

    let mut expected: Vec<&str> = TEAM_ADMIN_ACTIONS.to_vec();
    expected.sort_unstable();
    assert_eq!(stored.actions.to_strings(), expected);
    assert_eq!(stored.permission.as_deref(), Some("Admin"));
    assert_eq!(stored.principal, Principal::User(3));

    let members = h.teams.get_team_members(7, 42).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, 3);
    assert_eq!(members[0].permission, TeamMemberPermission::Admin);
    assert!(!members[0].external);
}

#[tokio::test]
async fn test_member_grant_registers_plain_member() {
    let h = harness().await;

    let stored = h
        .services
        .teams
        .set_user_permission(&RequestContext::new(), 7, "42", 3, "Member")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.actions.to_strings(), vec!["teams:read"]);

    let members = h.teams.get_team_members(7, 42).await.unwrap();
    assert_eq!(members[0].permission, TeamMemberPermission::Member);
    assert!(!members[0].is_admin());
}

#[tokio::test]
async fn test_member_then_admin_promotes() {
    let h = harness().await;
    let ctx = RequestContext::new();
    let teams = &h.services.teams;

    teams.set_user_permission(&ctx, 7, "42", 3, "Member").await.unwrap();
    teams.set_user_permission(&ctx, 7, "42", 3, "Admin").await.unwrap();

    let listed = teams.get_permissions(&ctx, 7, "42").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].permission.as_deref(), Some("Admin"));

    let members = h.teams.get_team_members(7, 42).await.unwrap();
    assert_eq!(members.len(), 1);
    assert!(members[0].is_admin());
}

#[tokio::test]
async fn test_invalid_team_id() {
    let h = harness().await;

    let err = h
        .services
        .teams
        .set_user_permission(&RequestContext::new(), 7, "abc", 3, "Admin")
        .await
        .unwrap_err();

    assert!(matches!(err, PermissionError::InvalidResourceId(_)));
    assert_eq!(err.status_code(), 400);
    assert!(h.assignments.is_empty().await);
    assert!(h.teams.get_team_members(7, 42).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_team_of_other_org_not_found() {
    let h = harness().await;

    let err = h
        .services
        .teams
        .set_user_permission(&RequestContext::new(), 8, "42", 3, "Member")
        .await
        .unwrap_err();

    assert!(matches!(err, PermissionError::NotFound(_)));
    assert!(h.assignments.is_empty().await);
}

#[tokio::test]
async fn test_unknown_level() {
    let h = harness().await;

    let err = h
        .services
        .teams
        .set_user_permission(&RequestContext::new(), 7, "42", 3, "Owner")
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "UNKNOWN_LEVEL");
    assert!(h.assignments.is_empty().await);
    assert!(h.teams.get_team_members(7, 42).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_disabled_principal_kinds() {
    let h = harness().await;
    let ctx = RequestContext::new();

    let err = h
        .services
        .teams
        .set_team_permission(&ctx, 7, "42", 5, "Member")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PermissionError::UnsupportedPrincipal { kind: PrincipalKind::Team, .. }
    ));

    let err = h
        .services
        .teams
        .set_built_in_role_permission(&ctx, 7, "42", BuiltInRole::Editor, "Member")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PermissionError::UnsupportedPrincipal { kind: PrincipalKind::BuiltInRole, .. }
    ));
    assert!(h.assignments.is_empty().await);
}

#[tokio::test]
async fn test_team_grants_when_enabled_skip_membership() {
    let config = TeamPermissionsConfig {
        assignments: AssignmentTargets::all(),
        ..Default::default()
    };
    let h = harness_with(config).await;

    h.services
        .teams
        .set_team_permission(&RequestContext::new(), 7, "42", 5, "Member")
        .await
        .unwrap();

    assert_eq!(h.assignments.len().await, 1);
    assert!(h.teams.get_team_members(7, 42).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_keeps_membership() {
    let h = harness().await;
    let ctx = RequestContext::new();
    let teams = &h.services.teams;

    teams.set_user_permission(&ctx, 7, "42", 3, "Admin").await.unwrap();
    teams
        .remove_permission(&ctx, 7, "42", Principal::User(3))
        .await
        .unwrap();
    teams
        .remove_permission(&ctx, 7, "42", Principal::User(3))
        .await
        .unwrap();

    assert!(teams.get_permissions(&ctx, 7, "42").await.unwrap().is_empty());
    assert_eq!(h.teams.get_team_members(7, 42).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_external_grants_are_left_alone() {
    let h = harness().await;
    let ctx = RequestContext::new();
    let scope = ResourceScope::new(7, "teams", "42");
    h.assignments
        .seed_external(
            &scope,
            Principal::User(9),
            access_rbac::ActionSet::parse(["teams:read"]).unwrap(),
        )
        .await;

    let teams = &h.services.teams;
    assert!(teams.get_permissions(&ctx, 7, "42").await.unwrap().is_empty());

    let err = teams
        .set_user_permission(&ctx, 7, "42", 9, "Admin")
        .await
        .unwrap_err();
    assert!(matches!(err, PermissionError::ConstraintViolation(_)));
    assert!(h.teams.get_team_members(7, 42).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_meta_roles_provisioned_once() {
    let h = harness().await;

    let again = ResourceServices::provide(
        &TeamPermissionsConfig::default(),
        h.assignments.clone(),
        h.roles.clone(),
        h.teams.clone(),
    )
    .await
    .unwrap();

    let roles = h.roles.list_roles(Some("Teams")).await.unwrap();
    assert_eq!(roles.len(), 2);
    assert!(roles.iter().all(|r| r.version == 1));

    let meta = again.teams.meta_roles();
    assert_eq!(meta.reader.definition.display_name, "Team permission reader");
    assert_eq!(meta.writer.definition.display_name, "Team permission writer");
    assert_eq!(meta.reader, h.services.teams.meta_roles().reader);

    let writer_actions: Vec<&str> = meta
        .writer
        .definition
        .permissions
        .iter()
        .map(|p| p.action.as_str())
        .collect();
    assert_eq!(
        writer_actions,
        vec!["teams.permissions:read", "teams.permissions:write", "teams:read"]
    );
}

#[tokio::test]
async fn test_describe_and_routes() {
    let h = harness().await;

    let description = h.services.team_service().describe();
    assert_eq!(description.permissions, vec!["Member", "Admin"]);
    assert_eq!(description.assignments, AssignmentTargets::users_only());

    let paths: Vec<String> = h.services.teams.routes().into_iter().map(|r| r.path).collect();
    assert!(paths.contains(&"/api/access-control/teams/:resourceId/users/:userId".to_string()));
    assert!(!paths.iter().any(|p| p.contains("builtInRoles")));
}

#[tokio::test]
async fn test_delete_team_drops_assignments() {
    let h = harness().await;
    let ctx = RequestContext::new();

    h.services
        .teams
        .set_user_permission(&ctx, 7, "42", 3, "Admin")
        .await
        .unwrap();

    let removed = delete_team(&ctx, &h.services.teams, h.teams.as_ref(), 7, 42)
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(h.assignments.is_empty().await);

    let err = delete_team(&ctx, &h.services.teams, h.teams.as_ref(), 7, 42)
        .await
        .unwrap_err();
    assert!(matches!(err, PermissionError::NotFound(_)));
}

#[tokio::test]
async fn test_cancelled_request_touches_nothing() {
    let h = harness().await;
    let ctx = RequestContext::new();
    ctx.cancel();

    let err = h
        .services
        .teams
        .set_user_permission(&ctx, 7, "42", 3, "Admin")
        .await
        .unwrap_err();

    assert!(matches!(err, PermissionError::Cancelled));
    assert!(h.assignments.is_empty().await);
    assert!(h.teams.get_team_members(7, 42).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_team_id_spellings_share_one_assignment() {
    let h = harness().await;
    let ctx = RequestContext::new();
    let teams = &h.services.teams;

    teams.set_user_permission(&ctx, 7, "42", 3, "Member").await.unwrap();
    teams.set_user_permission(&ctx, 7, "042", 3, "Admin").await.unwrap();
    let stored = teams
        .set_user_permission(&ctx, 7, "+42", 3, "Admin")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.resource_id, "42");

    assert_eq!(h.assignments.len().await, 1);
    let listed = teams.get_permissions(&ctx, 7, "42").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].permission.as_deref(), Some("Admin"));
    assert_eq!(teams.get_permissions(&ctx, 7, "0042").await.unwrap(), listed);

    let removed = delete_team(&ctx, teams, h.teams.as_ref(), 7, 42).await.unwrap();
    assert_eq!(removed, 1);
    assert!(h.assignments.is_empty().await);
}

/// Team store that cancels a request context at a chosen point.
struct CancellingTeamStore {
    inner: Arc<MemoryTeamStore>,
    ctx: RequestContext,
    cancel_on_lookup: bool,
}

#[async_trait]
impl TeamStore for CancellingTeamStore {
    async fn create_team(&self, org_id: OrgId, name: &str) -> TeamStoreResult<Team> {
        self.inner.create_team(org_id, name).await
    }

    async fn get_team_by_id(&self, org_id: OrgId, team_id: TeamId) -> TeamStoreResult<Team> {
        let team = self.inner.get_team_by_id(org_id, team_id).await;
        if self.cancel_on_lookup {
            self.ctx.cancel();
        }
        team
    }

    async fn add_or_update_team_member(
        &self,
        org_id: OrgId,
        team_id: TeamId,
        user_id: UserId,
        external: bool,
        permission: TeamMemberPermission,
    ) -> TeamStoreResult<TeamMember> {
        self.inner
            .add_or_update_team_member(org_id, team_id, user_id, external, permission)
            .await
    }

    async fn get_team_members(&self, org_id: OrgId, team_id: TeamId) -> TeamStoreResult<Vec<TeamMember>> {
        self.inner.get_team_members(org_id, team_id).await
    }

    async fn delete_team(&self, org_id: OrgId, team_id: TeamId) -> TeamStoreResult<()> {
        let deleted = self.inner.delete_team(org_id, team_id).await;
        if !self.cancel_on_lookup {
            self.ctx.cancel();
        }
        deleted
    }
}

#[tokio::test]
async fn test_delete_team_cancelled_during_team_delete_still_cascades() {
    let h = harness().await;
    let ctx = RequestContext::new();
    h.services
        .teams
        .set_user_permission(&ctx, 7, "42", 3, "Admin")
        .await
        .unwrap();

    let store = CancellingTeamStore {
        inner: h.teams.clone(),
        ctx: ctx.clone(),
        cancel_on_lookup: false,
    };
    let removed = delete_team(&ctx, &h.services.teams, &store, 7, 42).await.unwrap();

    assert_eq!(removed, 1);
    assert!(ctx.is_cancelled());
    assert!(h.assignments.is_empty().await);
    assert!(h.teams.get_team_by_id(7, 42).await.is_err());
}

#[tokio::test]
async fn test_delete_team_cancelled_early_can_be_retried() {
    let h = harness().await;
    h.services
        .teams
        .set_user_permission(&RequestContext::new(), 7, "42", 3, "Admin")
        .await
        .unwrap();

    let ctx = RequestContext::new();
    let store = CancellingTeamStore {
        inner: h.teams.clone(),
        ctx: ctx.clone(),
        cancel_on_lookup: true,
    };
    let err = delete_team(&ctx, &h.services.teams, &store, 7, 42)
        .await
        .unwrap_err();
    assert!(matches!(err, PermissionError::Cancelled));
    assert!(h.teams.get_team_by_id(7, 42).await.is_ok());
    assert_eq!(h.assignments.len().await, 1);

    let retry = RequestContext::new();
    let removed = delete_team(&retry, &h.services.teams, h.teams.as_ref(), 7, 42)
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(h.assignments.is_empty().await);
    assert!(h.teams.get_team_by_id(7, 42).await.is_err());
}
