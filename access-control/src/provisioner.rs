//! Meta-role provisioning
//!
//! Each resource type gets two delegated-administration roles: a reader that
//! may view permissions on every instance of the type, and a writer that may
//! also change them. Provisioning goes through [`RoleStore::upsert_role`], so
//! running it again (or from several instances at once) converges on the
//! same two roles.

use access_rbac::{Action, ActionSet};
use access_store::{Role, RoleDefinition, RolePermission, RoleStore, StoreResult};
use std::sync::Arc;

/// The two roles provisioned for a resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaRoles {
    /// Role allowed to read permissions
    pub reader: Role,
    /// Role allowed to read and change permissions
    pub writer: Role,
}

/// Provisions the reader and writer meta roles for resource types.
#[derive(Clone)]
pub struct MetaRoleProvisioner {
    roles: Arc<dyn RoleStore>,
}

impl std::fmt::Debug for MetaRoleProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaRoleProvisioner").finish_non_exhaustive()
    }
}

impl MetaRoleProvisioner {
    /// Create a provisioner writing to the given role store.
    pub fn new(roles: Arc<dyn RoleStore>) -> Self {
        Self { roles }
    }

    /// Unique name of the reader role, e.g. `fixed:teams.permissions:reader`.
    pub fn reader_role_name(resource: &str) -> String {
        format!("fixed:{}.permissions:reader", resource)
    }

    /// Unique name of the writer role, e.g. `fixed:teams.permissions:writer`.
    pub fn writer_role_name(resource: &str) -> String {
        format!("fixed:{}.permissions:writer", resource)
    }

    /// Reader and writer role definitions for a resource type.
    ///
    /// The reader gets `read_actions` plus `<resource>.permissions:read`;
    /// the writer additionally gets `<resource>.permissions:write`. All
    /// actions are scoped to every instance of the type.
    pub fn definitions(
        resource: &str,
        role_group: &str,
        reader_display_name: &str,
        writer_display_name: &str,
        read_actions: &ActionSet,
    ) -> (RoleDefinition, RoleDefinition) {
        let scope = format!("{}:*", resource);

        let mut reader_actions = read_actions.clone();
        reader_actions.insert(Action::permissions_read(resource));

        let mut writer_actions = reader_actions.clone();
        writer_actions.insert(Action::permissions_write(resource));

        let scoped = |actions: &ActionSet| -> Vec<RolePermission> {
            actions
                .iter()
                .map(|a| RolePermission::new(a.clone(), scope.clone()))
                .collect()
        };

        let reader = RoleDefinition::new(
            Self::reader_role_name(resource),
            reader_display_name,
            role_group,
            scoped(&reader_actions),
        )
        .with_description(format!("Read permissions on all {}", resource));

        let writer = RoleDefinition::new(
            Self::writer_role_name(resource),
            writer_display_name,
            role_group,
            scoped(&writer_actions),
        )
        .with_description(format!("Read and change permissions on all {}", resource));

        (reader, writer)
    }

    /// Create or refresh both meta roles for a resource type.
    ///
    /// # Errors
    ///
    /// Store errors are returned unchanged. If the writer upsert fails the
    /// reader may already exist; running `provision` again completes it.
    pub async fn provision(
        &self,
        resource: &str,
        role_group: &str,
        reader_display_name: &str,
        writer_display_name: &str,
        read_actions: &ActionSet,
    ) -> StoreResult<MetaRoles> {
        let (reader, writer) = Self::definitions(
            resource,
            role_group,
            reader_display_name,
            writer_display_name,
            read_actions,
        );

        let reader = self.roles.upsert_role(reader).await?;
        let writer = self.roles.upsert_role(writer).await?;

        tracing::info!(
            resource = %resource,
            reader = %reader.definition.name,
            writer = %writer.definition.name,
            group = %role_group,
            "Meta roles provisioned"
        );

        Ok(MetaRoles { reader, writer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_store::MemoryRoleStore;

    fn team_reads() -> ActionSet {
        ActionSet::parse(["teams:read"]).unwrap()
    }

    #[test]
    fn test_definitions() {
        let (reader, writer) = MetaRoleProvisioner::definitions(
            "teams",
            "Teams",
            "Team permission reader",
            "Team permission writer",
            &team_reads(),
        );

        assert_eq!(reader.name, "fixed:teams.permissions:reader");
        assert_eq!(reader.group, "Teams");
        assert!(reader.grants(&Action::permissions_read("teams")));
        assert!(reader.grants(&Action::new("teams", "read")));
        assert!(!reader.grants(&Action::permissions_write("teams")));
        assert!(reader.permissions.iter().all(|p| p.scope == "teams:*"));

        assert_eq!(writer.name, "fixed:teams.permissions:writer");
        assert!(writer.grants(&Action::permissions_read("teams")));
        assert!(writer.grants(&Action::permissions_write("teams")));
        assert_eq!(writer.permissions.len(), reader.permissions.len() + 1);
    }

    #[tokio::test]
    async fn test_provision_twice_is_idempotent() {
        let store = Arc::new(MemoryRoleStore::new());
        let provisioner = MetaRoleProvisioner::new(store.clone());

        let first = provisioner
            .provision("teams", "Teams", "Team permission reader", "Team permission writer", &team_reads())
            .await
            .unwrap();
        let second = provisioner
            .provision("teams", "Teams", "Team permission reader", "Team permission writer", &team_reads())
            .await
            .unwrap();

        assert_eq!(first, second);
        let roles = store.list_roles(Some("Teams")).await.unwrap();
        assert_eq!(roles.len(), 2);
    }
}
