//! Per-resource-type configuration.

use access_rbac::{AssignmentTargets, PrincipalKind};
use serde::{Deserialize, Serialize};

use crate::validator::ResourceIdKind;

/// Static options of one resource permission service.
///
/// The function-valued parts of the configuration (resource validator,
/// side-effect hook) and the action catalog are passed to the service
/// separately; everything here is plain data and can be loaded from config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceOptions {
    /// Resource type, e.g. `teams`
    pub resource: String,

    /// Restrict listing and mutation to assignments created by this service
    #[serde(default)]
    pub only_managed: bool,

    /// Principal kinds that may receive assignments
    pub assignments: AssignmentTargets,

    /// How resource instance ids are spelled
    #[serde(default)]
    pub id_kind: ResourceIdKind,

    /// Display name of the meta role allowed to read permissions
    pub reader_role_name: String,

    /// Display name of the meta role allowed to change permissions
    pub writer_role_name: String,

    /// Group shown for the meta roles
    pub role_group: String,
}

impl ResourceOptions {
    /// Options for a resource type with numeric ids, user assignments only,
    /// and default meta role names derived from the resource name.
    pub fn new(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        Self {
            reader_role_name: format!("{} permission reader", resource),
            writer_role_name: format!("{} permission writer", resource),
            role_group: resource.clone(),
            resource,
            only_managed: false,
            assignments: AssignmentTargets::users_only(),
            id_kind: ResourceIdKind::Numeric,
        }
    }

    /// Set the only-managed flag.
    pub fn with_only_managed(mut self, only_managed: bool) -> Self {
        self.only_managed = only_managed;
        self
    }

    /// Set the allowed principal kinds.
    pub fn with_assignments(mut self, assignments: AssignmentTargets) -> Self {
        self.assignments = assignments;
        self
    }

    /// Set the resource id kind.
    pub fn with_id_kind(mut self, id_kind: ResourceIdKind) -> Self {
        self.id_kind = id_kind;
        self
    }

    /// Set meta role display names and group.
    pub fn with_meta_roles(
        mut self,
        reader_role_name: impl Into<String>,
        writer_role_name: impl Into<String>,
        role_group: impl Into<String>,
    ) -> Self {
        self.reader_role_name = reader_role_name.into();
        self.writer_role_name = writer_role_name.into();
        self.role_group = role_group.into();
        self
    }

    /// Check if assignments for this principal kind are allowed.
    pub fn allows(&self, kind: PrincipalKind) -> bool {
        self.assignments.allows(kind)
    }
}
