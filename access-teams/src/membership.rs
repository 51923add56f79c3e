//! Team membership
//!
//! Membership links a user to a team with a permission flag. Admin members
//! may manage the team; plain members may only see it.

use access_rbac::{OrgId, TeamId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission flag stored on a team membership.
///
/// The numeric values are the persisted representation.
///
/// # Examples
///
/// ```
/// use access_teams::TeamMemberPermission;
///
/// assert_eq!(TeamMemberPermission::Admin.code(), 4);
/// assert_eq!(TeamMemberPermission::from_code(0), Some(TeamMemberPermission::Member));
/// assert!(TeamMemberPermission::parse("ADMIN").unwrap().is_admin());
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TeamMemberPermission {
    /// Regular member
    #[default]
    Member = 0,

    /// Team administrator
    Admin = 4,
}

impl TeamMemberPermission {
    /// Check if this is the admin flag.
    pub fn is_admin(&self) -> bool {
        matches!(self, TeamMemberPermission::Admin)
    }

    /// Persisted numeric value.
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Parse the persisted numeric value.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(TeamMemberPermission::Member),
            4 => Some(TeamMemberPermission::Admin),
            _ => None,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamMemberPermission::Member => "member",
            TeamMemberPermission::Admin => "admin",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "member" => Some(TeamMemberPermission::Member),
            "admin" => Some(TeamMemberPermission::Admin),
            _ => None,
        }
    }
}

/// A user's membership in a team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    /// Unique membership ID
    pub id: Uuid,

    /// Organization of the team
    pub org_id: OrgId,

    /// Team ID
    pub team_id: TeamId,

    /// User ID
    pub user_id: UserId,

    /// Member or admin
    pub permission: TeamMemberPermission,

    /// Whether the membership is synced from an external directory
    pub external: bool,

    /// When the user joined
    pub joined_at: DateTime<Utc>,

    /// When the permission flag last changed
    pub updated_at: DateTime<Utc>,
}

impl TeamMember {
    /// Creates a new membership.
    ///
    /// # Arguments
    ///
    /// * `org_id` - The team's organization
    /// * `team_id` - The team ID
    /// * `user_id` - The user ID
    /// * `permission` - Member or admin
    pub fn new(org_id: OrgId, team_id: TeamId, user_id: UserId, permission: TeamMemberPermission) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            org_id,
            team_id,
            user_id,
            permission,
            external: false,
            joined_at: now,
            updated_at: now,
        }
    }

    /// Mark the membership as synced from an external directory.
    pub fn with_external(mut self, external: bool) -> Self {
        self.external = external;
        self
    }

    /// Check if the member administers the team.
    pub fn is_admin(&self) -> bool {
        self.permission.is_admin()
    }
}
