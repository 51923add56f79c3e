//! Resource permission services
//!
//! One named field per resource type, built once at startup and shared by
//! reference with the request handlers.

use access_control::PermissionResult;
use access_store::{AssignmentStore, RoleStore};
use std::sync::Arc;

use crate::config::TeamPermissionsConfig;
use crate::permissions::{provide_team_permissions, TeamPermissionService};
use crate::store::TeamStore;

/// Permission services of every resource type.
#[derive(Debug, Clone)]
pub struct ResourceServices {
    /// Team permissions
    pub teams: Arc<TeamPermissionService>,
}

impl ResourceServices {
    /// Build every resource permission service, provisioning their meta roles.
    ///
    /// # Errors
    ///
    /// The first construction error of any service.
    pub async fn provide(
        config: &TeamPermissionsConfig,
        store: Arc<dyn AssignmentStore>,
        roles: Arc<dyn RoleStore>,
        teams: Arc<dyn TeamStore>,
    ) -> PermissionResult<Self> {
        let teams = provide_team_permissions(config, store, roles, teams).await?;
        Ok(Self {
            teams: Arc::new(teams),
        })
    }

    /// The team permission service.
    pub fn team_service(&self) -> &TeamPermissionService {
        &self.teams
    }
}
