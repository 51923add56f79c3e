//! Side-effect hooks
//!
//! A hook synchronizes external state after a permission level has been
//! stored, e.g. registering a user as a team member. Hooks run only after a
//! successful write and only for grants; removals do not call them.

use access_rbac::{BuiltInRole, OrgId, PermissionLevel, Principal, TeamId, UserId};
use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::HookError;
use crate::validator::ResourceId;

/// Hook invoked after a permission level is set, one method per principal
/// kind. Every method defaults to doing nothing, so implementations only
/// override the kinds they care about.
#[async_trait]
pub trait AssignmentHook<L: PermissionLevel>: Send + Sync {
    /// A user was granted `level` on the resource.
    async fn on_set_user(
        &self,
        _ctx: &RequestContext,
        _org_id: OrgId,
        _user_id: UserId,
        _resource_id: &ResourceId,
        _level: L,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// A team was granted `level` on the resource.
    async fn on_set_team(
        &self,
        _ctx: &RequestContext,
        _org_id: OrgId,
        _team_id: TeamId,
        _resource_id: &ResourceId,
        _level: L,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// A built-in role was granted `level` on the resource.
    async fn on_set_built_in_role(
        &self,
        _ctx: &RequestContext,
        _org_id: OrgId,
        _role: BuiltInRole,
        _resource_id: &ResourceId,
        _level: L,
    ) -> Result<(), HookError> {
        Ok(())
    }
}

/// Route a grant to the hook method for the principal's kind.
pub(crate) async fn dispatch<L: PermissionLevel>(
    hook: &dyn AssignmentHook<L>,
    ctx: &RequestContext,
    org_id: OrgId,
    principal: Principal,
    resource_id: &ResourceId,
    level: L,
) -> Result<(), HookError> {
    match principal {
        Principal::User(user_id) => hook.on_set_user(ctx, org_id, user_id, resource_id, level).await,
        Principal::Team(team_id) => hook.on_set_team(ctx, org_id, team_id, resource_id, level).await,
        Principal::BuiltInRole(role) => {
            hook.on_set_built_in_role(ctx, org_id, role, resource_id, level)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::ResourceIdKind;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    enum Level {
        Viewer,
    }

    impl PermissionLevel for Level {
        fn name(&self) -> &'static str {
            "Viewer"
        }
    }

    #[derive(Default)]
    struct TeamsOnly {
        calls: Mutex<Vec<TeamId>>,
    }

    #[async_trait]
    impl AssignmentHook<Level> for TeamsOnly {
        async fn on_set_team(
            &self,
            _ctx: &RequestContext,
            _org_id: OrgId,
            team_id: TeamId,
            _resource_id: &ResourceId,
            _level: Level,
        ) -> Result<(), HookError> {
            self.calls.lock().unwrap().push(team_id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_kind() {
        let hook = TeamsOnly::default();
        let ctx = RequestContext::new();
        let resource_id = ResourceId::parse(ResourceIdKind::Opaque, "dash-1").unwrap();

        dispatch(&hook, &ctx, 1, Principal::User(5), &resource_id, Level::Viewer)
            .await
            .unwrap();
        dispatch(&hook, &ctx, 1, Principal::Team(8), &resource_id, Level::Viewer)
            .await
            .unwrap();
        dispatch(
            &hook,
            &ctx,
            1,
            Principal::BuiltInRole(BuiltInRole::Editor),
            &resource_id,
            Level::Viewer,
        )
        .await
        .unwrap();

        assert_eq!(*hook.calls.lock().unwrap(), vec![8]);
    }
}
