//! Team store
//!
//! Port for the team domain the permission engine talks to, with an
//! in-memory implementation.

use access_rbac::{OrgId, TeamId, UserId};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::membership::{TeamMember, TeamMemberPermission};
use crate::team::Team;

/// Team store error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TeamStoreError {
    /// Team does not exist in the organization
    #[error("Team {team_id} not found in organization {org_id}")]
    TeamNotFound {
        /// Organization searched
        org_id: OrgId,
        /// Missing team
        team_id: TeamId,
    },

    /// Team name already taken in the organization
    #[error("Team name already taken: {0}")]
    NameTaken(String),

    /// Backend could not be reached
    #[error("Team store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for team store operations.
pub type TeamStoreResult<T> = Result<T, TeamStoreError>;

/// Team store trait.
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Create a team and assign it an id.
    async fn create_team(&self, org_id: OrgId, name: &str) -> TeamStoreResult<Team>;

    /// Look up a team within an organization.
    ///
    /// A team of another organization is reported as not found.
    async fn get_team_by_id(&self, org_id: OrgId, team_id: TeamId) -> TeamStoreResult<Team>;

    /// Add a user to a team, or change the flags of an existing membership.
    async fn add_or_update_team_member(
        &self,
        org_id: OrgId,
        team_id: TeamId,
        user_id: UserId,
        external: bool,
        permission: TeamMemberPermission,
    ) -> TeamStoreResult<TeamMember>;

    /// List a team's members ordered by user id.
    async fn get_team_members(&self, org_id: OrgId, team_id: TeamId) -> TeamStoreResult<Vec<TeamMember>>;

    /// Delete a team together with its memberships.
    async fn delete_team(&self, org_id: OrgId, team_id: TeamId) -> TeamStoreResult<()>;
}

#[derive(Default)]
struct TeamState {
    next_id: TeamId,
    teams: BTreeMap<TeamId, Team>,
    members: BTreeMap<(TeamId, UserId), TeamMember>,
}

impl TeamState {
    fn team(&self, org_id: OrgId, team_id: TeamId) -> TeamStoreResult<&Team> {
        self.teams
            .get(&team_id)
            .filter(|team| team.belongs_to(org_id))
            .ok_or(TeamStoreError::TeamNotFound { org_id, team_id })
    }
}

/// In-memory team store.
#[derive(Clone, Default)]
pub struct MemoryTeamStore {
    state: Arc<RwLock<TeamState>>,
}

impl std::fmt::Debug for MemoryTeamStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTeamStore").finish_non_exhaustive()
    }
}

impl MemoryTeamStore {
    /// Create a new in-memory team store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a team with a caller-chosen id, replacing any team with that id.
    pub async fn insert_team(&self, team: Team) {
        let mut state = self.state.write().await;
        state.next_id = state.next_id.max(team.id);
        state.teams.insert(team.id, team);
    }
}

#[async_trait]
impl TeamStore for MemoryTeamStore {
    async fn create_team(&self, org_id: OrgId, name: &str) -> TeamStoreResult<Team> {
        let mut state = self.state.write().await;
        if state
            .teams
            .values()
            .any(|team| team.belongs_to(org_id) && team.name == name)
        {
            return Err(TeamStoreError::NameTaken(name.to_string()));
        }

        state.next_id += 1;
        let team = Team::new(state.next_id, org_id, name);
        state.teams.insert(team.id, team.clone());

        tracing::debug!(org_id, team_id = team.id, name = %name, "Team created");
        Ok(team)
    }

    async fn get_team_by_id(&self, org_id: OrgId, team_id: TeamId) -> TeamStoreResult<Team> {
        self.state.read().await.team(org_id, team_id).cloned()
    }

    async fn add_or_update_team_member(
        &self,
        org_id: OrgId,
        team_id: TeamId,
        user_id: UserId,
        external: bool,
        permission: TeamMemberPermission,
    ) -> TeamStoreResult<TeamMember> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.team(org_id, team_id)?;

        let member = match state.members.get_mut(&(team_id, user_id)) {
            Some(existing) => {
                if existing.permission != permission || existing.external != external {
                    existing.permission = permission;
                    existing.external = external;
                    existing.updated_at = Utc::now();
                }
                existing.clone()
            }
            None => {
                let member = TeamMember::new(org_id, team_id, user_id, permission).with_external(external);
                state.members.insert((team_id, user_id), member.clone());
                member
            }
        };

        tracing::debug!(
            org_id,
            team_id,
            user_id,
            permission = permission.as_str(),
            "Team member saved"
        );
        Ok(member)
    }

    async fn get_team_members(&self, org_id: OrgId, team_id: TeamId) -> TeamStoreResult<Vec<TeamMember>> {
        let state = self.state.read().await;
        state.team(org_id, team_id)?;

        Ok(state
            .members
            .range((team_id, UserId::MIN)..=(team_id, UserId::MAX))
            .map(|(_, member)| member.clone())
            .collect())
    }

    async fn delete_team(&self, org_id: OrgId, team_id: TeamId) -> TeamStoreResult<()> {
        let mut state = self.state.write().await;
        state.team(org_id, team_id)?;

        state.teams.remove(&team_id);
        state.members.retain(|(team, _), _| *team != team_id);

        tracing::debug!(org_id, team_id, "Team deleted");
        Ok(())
    }
}
