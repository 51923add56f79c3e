//! Role store
//!
//! Roles bundle scoped actions under a unique name. The permission engine
//! uses them for the delegated-administration ("meta") roles that grant the
//! right to read or change permissions on a whole resource type.

use access_rbac::Action;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// An action granted by a role, limited to a scope such as `teams:*`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RolePermission {
    /// Granted action
    pub action: Action,
    /// Scope the action applies to
    pub scope: String,
}

impl RolePermission {
    /// Create a new scoped role permission.
    pub fn new(action: Action, scope: impl Into<String>) -> Self {
        Self {
            action,
            scope: scope.into(),
        }
    }
}

/// Desired state of a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Unique role name, e.g. `fixed:teams.permissions:reader`
    pub name: String,
    /// Human-readable name
    pub display_name: String,
    /// Grouping label used by role pickers
    pub group: String,
    /// Optional description
    pub description: Option<String>,
    /// Granted permissions, sorted and deduplicated
    pub permissions: Vec<RolePermission>,
}

impl RoleDefinition {
    /// Create a role definition; permissions are sorted and deduplicated.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        group: impl Into<String>,
        permissions: impl IntoIterator<Item = RolePermission>,
    ) -> Self {
        let mut permissions: Vec<RolePermission> = permissions.into_iter().collect();
        permissions.sort();
        permissions.dedup();
        Self {
            name: name.into(),
            display_name: display_name.into(),
            group: group.into(),
            description: None,
            permissions,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if the role grants an action (in any scope).
    pub fn grants(&self, action: &Action) -> bool {
        self.permissions.iter().any(|p| &p.action == action)
    }
}

/// A stored role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role id
    pub id: Uuid,
    /// Incremented whenever the definition changes
    pub version: u32,
    /// Current definition
    pub definition: RoleDefinition,
    /// When the role was created
    pub created_at: DateTime<Utc>,
    /// When the definition last changed
    pub updated_at: DateTime<Utc>,
}

/// Role store trait.
///
/// Role names are unique; `upsert_role` is the only write and is idempotent,
/// so concurrent provisioning of the same role converges on one record.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Create the role, or update it in place if the definition changed.
    async fn upsert_role(&self, definition: RoleDefinition) -> StoreResult<Role>;

    /// Look up a role by name.
    async fn get_role(&self, name: &str) -> StoreResult<Option<Role>>;

    /// List roles, optionally restricted to one group, ordered by name.
    async fn list_roles(&self, group: Option<&str>) -> StoreResult<Vec<Role>>;
}

/// In-memory role store.
#[derive(Clone, Default)]
pub struct MemoryRoleStore {
    roles: Arc<RwLock<HashMap<String, Role>>>,
}

impl std::fmt::Debug for MemoryRoleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRoleStore").finish_non_exhaustive()
    }
}

impl MemoryRoleStore {
    /// Create a new in-memory role store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn upsert_role(&self, definition: RoleDefinition) -> StoreResult<Role> {
        if definition.name.trim().is_empty() {
            return Err(StoreError::ConstraintViolation(
                "role name must not be empty".to_string(),
            ));
        }

        let mut roles = self.roles.write().await;
        let now = Utc::now();

        let role = match roles.get(&definition.name) {
            Some(existing) if existing.definition == definition => return Ok(existing.clone()),
            Some(existing) => Role {
                id: existing.id,
                version: existing.version + 1,
                definition,
                created_at: existing.created_at,
                updated_at: now,
            },
            None => Role {
                id: Uuid::now_v7(),
                version: 1,
                definition,
                created_at: now,
                updated_at: now,
            },
        };

        roles.insert(role.definition.name.clone(), role.clone());
        Ok(role)
    }

    async fn get_role(&self, name: &str) -> StoreResult<Option<Role>> {
        Ok(self.roles.read().await.get(name).cloned())
    }

    async fn list_roles(&self, group: Option<&str>) -> StoreResult<Vec<Role>> {
        let roles = self.roles.read().await;
        let mut listed: Vec<Role> = roles
            .values()
            .filter(|r| group.map_or(true, |g| r.definition.group == g))
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.definition.name.cmp(&b.definition.name));
        Ok(listed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> RoleDefinition {
        RoleDefinition::new(
            "fixed:teams.permissions:reader",
            "Team permission reader",
            "Teams",
            [
                RolePermission::new(Action::permissions_read("teams"), "teams:*"),
                RolePermission::new(Action::new("teams", "read"), "teams:*"),
            ],
        )
    }

    #[test]
    fn test_definition_sorts_and_dedups() {
        let action = Action::new("teams", "read");
        let def = RoleDefinition::new(
            "r",
            "R",
            "G",
            [
                RolePermission::new(action.clone(), "teams:*"),
                RolePermission::new(action.clone(), "teams:*"),
            ],
        );
        assert_eq!(def.permissions.len(), 1);
        assert!(def.grants(&action));
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = MemoryRoleStore::new();
        let first = store.upsert_role(reader()).await.unwrap();
        let second = store.upsert_role(reader()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.version, 1);
        assert_eq!(store.list_roles(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_updates_changed_definition() {
        let store = MemoryRoleStore::new();
        let first = store.upsert_role(reader()).await.unwrap();
        let updated = store
            .upsert_role(reader().with_description("Read team permissions"))
            .await
            .unwrap();

        assert_eq!(updated.id, first.id);
        assert_eq!(updated.version, 2);
        assert_eq!(
            store
                .get_role("fixed:teams.permissions:reader")
                .await
                .unwrap()
                .unwrap()
                .definition
                .description
                .as_deref(),
            Some("Read team permissions")
        );
    }

    #[tokio::test]
    async fn test_list_by_group() {
        let store = MemoryRoleStore::new();
        store.upsert_role(reader()).await.unwrap();
        store
            .upsert_role(RoleDefinition::new("fixed:folders:reader", "Folder reader", "Folders", []))
            .await
            .unwrap();

        let teams = store.list_roles(Some("Teams")).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].definition.display_name, "Team permission reader");
        assert_eq!(store.list_roles(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let store = MemoryRoleStore::new();
        let err = store
            .upsert_role(RoleDefinition::new(" ", "x", "y", []))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }
}
