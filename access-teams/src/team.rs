//! Team domain model
//!
//! A team groups users within an organization. Team ids are numeric and
//! unique across organizations; every lookup still names the organization so
//! a team can never be addressed from outside its tenant.

use access_rbac::{OrgId, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A team within an organization.
///
/// # Examples
///
/// ```
/// use access_teams::Team;
///
/// let team = Team::new(3, 7, "Platform").with_email("platform@example.com");
/// assert_eq!(team.name, "Platform");
/// assert_eq!(team.email.as_deref(), Some("platform@example.com"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Team ID
    pub id: TeamId,

    /// Owning organization
    pub org_id: OrgId,

    /// Display name, unique within the organization
    pub name: String,

    /// Contact address for the team
    pub email: Option<String>,

    /// When the team was created
    pub created_at: DateTime<Utc>,

    /// When the team was last updated
    pub updated_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new team.
    ///
    /// # Arguments
    ///
    /// * `id` - The team ID, assigned by the team store
    /// * `org_id` - The owning organization
    /// * `name` - The team name
    pub fn new(id: TeamId, org_id: OrgId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            org_id,
            name: name.into(),
            email: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the team's contact address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Check whether the team belongs to the given organization.
    pub fn belongs_to(&self, org_id: OrgId) -> bool {
        self.org_id == org_id
    }
}
