//! Resource permission service
//!
//! Orchestrates one resource type: checks the principal kind, parses and
//! validates the resource id, resolves the permission level through the
//! action catalog, persists the assignment and finally runs the side-effect
//! hook.
//!
//! ```text
//! set_permission
//!   ├─ principal kind enabled?        UnsupportedPrincipal
//!   ├─ resource id parses?            InvalidResourceId
//!   ├─ ResourceValidator::validate    NotFound / validator error
//!   ├─ ActionCatalog::resolve         UnknownLevel   ("" = revoke)
//!   ├─ AssignmentStore::set_assignment StoreUnavailable / ConstraintViolation
//!   └─ AssignmentHook                 HookFailed (assignment stays stored)
//! ```
//!
//! The request context is checked before every step that has not started
//! yet. A store write that has started is left to complete.

use access_rbac::{
    ActionCatalog, ActionSet, BuiltInRole, OrgId, PermissionLevel, Principal, PrincipalKind,
    TeamId, UserId,
};
use access_store::{AssignmentRecord, AssignmentStore, ResourceScope, RoleStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::{PermissionError, PermissionResult};
use crate::hooks::{self, AssignmentHook};
use crate::options::ResourceOptions;
use crate::provisioner::{MetaRoleProvisioner, MetaRoles};
use crate::routes::{self, ResourceDescription, Route};
use crate::validator::{ResourceId, ResourceValidator};

/// One assignment on a resource instance as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePermission {
    /// Resource type
    pub resource: String,
    /// Resource instance id
    pub resource_id: String,
    /// Principal holding the assignment
    pub principal: Principal,
    /// Granted actions
    pub actions: ActionSet,
    /// Level whose catalog entry equals `actions`, if any
    pub permission: Option<String>,
    /// Whether the assignment was created through the engine
    pub managed: bool,
}

/// A raw set-permission request, as carried by a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPermissionCommand {
    /// Kind of principal
    pub principal_kind: PrincipalKind,
    /// Principal id: a number for users and teams, a role name for built-in roles
    pub principal_id: String,
    /// Level name; empty to revoke
    pub permission: String,
}

/// Permission service for one resource type.
pub struct ResourcePermissionService<L: PermissionLevel> {
    options: ResourceOptions,
    catalog: ActionCatalog<L>,
    validator: Arc<dyn ResourceValidator>,
    hook: Option<Arc<dyn AssignmentHook<L>>>,
    store: Arc<dyn AssignmentStore>,
    meta_roles: MetaRoles,
}

impl<L: PermissionLevel> std::fmt::Debug for ResourcePermissionService<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePermissionService")
            .field("options", &self.options)
            .field("levels", &self.catalog.names())
            .field("has_hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

impl<L: PermissionLevel> ResourcePermissionService<L> {
    /// Create the service and provision its meta roles.
    ///
    /// Provisioning completes before the service is returned, so no
    /// assignment traffic can precede it.
    ///
    /// # Errors
    ///
    /// Role store errors from provisioning.
    pub async fn new(
        options: ResourceOptions,
        catalog: ActionCatalog<L>,
        validator: Arc<dyn ResourceValidator>,
        store: Arc<dyn AssignmentStore>,
        roles: Arc<dyn RoleStore>,
    ) -> PermissionResult<Self> {
        let meta_roles = MetaRoleProvisioner::new(roles)
            .provision(
                &options.resource,
                &options.role_group,
                &options.reader_role_name,
                &options.writer_role_name,
                &catalog.read_actions(&options.resource),
            )
            .await?;

        Ok(Self {
            options,
            catalog,
            validator,
            hook: None,
            store,
            meta_roles,
        })
    }

    /// Register the side-effect hook.
    pub fn with_hook(mut self, hook: Arc<dyn AssignmentHook<L>>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Resource type served.
    pub fn resource(&self) -> &str {
        &self.options.resource
    }

    /// Static options.
    pub fn options(&self) -> &ResourceOptions {
        &self.options
    }

    /// Level → actions mapping.
    pub fn catalog(&self) -> &ActionCatalog<L> {
        &self.catalog
    }

    /// Meta roles provisioned at construction.
    pub fn meta_roles(&self) -> &MetaRoles {
        &self.meta_roles
    }

    /// Enabled assignment targets and level names.
    pub fn describe(&self) -> ResourceDescription {
        ResourceDescription {
            assignments: self.options.assignments,
            permissions: self.catalog.names().into_iter().map(str::to_string).collect(),
        }
    }

    /// Endpoints the router should expose for this resource type.
    pub fn routes(&self) -> Vec<Route> {
        routes::routes(&self.options)
    }

    /// List assignments on a resource instance.
    ///
    /// Honors the only-managed flag. The resource validator is not called.
    ///
    /// # Errors
    ///
    /// `InvalidResourceId`, store errors, or context errors.
    pub async fn get_permissions(
        &self,
        ctx: &RequestContext,
        org_id: OrgId,
        resource_id: &str,
    ) -> PermissionResult<Vec<ResourcePermission>> {
        ctx.check()?;
        let resource_id = self.parse_resource_id(resource_id)?;
        let scope = self.scope(org_id, &resource_id);

        let records = self
            .store
            .get_assignments(&scope, self.options.only_managed)
            .await?;

        Ok(records
            .into_iter()
            .map(|record| self.to_permission(&scope, record))
            .collect())
    }

    /// Set (or, with an empty level, revoke) a principal's level on a
    /// resource instance.
    ///
    /// Returns the stored assignment, or `None` for a revoke.
    ///
    /// # Errors
    ///
    /// - `UnsupportedPrincipal` if the kind is disabled for this resource type
    /// - `InvalidResourceId` if the id does not parse
    /// - `NotFound` / `Validator` from the resource validator
    /// - `UnknownLevel` if the level is not in the catalog
    /// - `StoreUnavailable` / `ConstraintViolation` from the store; the hook
    ///   is not called
    /// - `HookFailed` if the hook fails; the assignment remains stored
    /// - `Cancelled` / `DeadlineExceeded` if the context ends between steps
    pub async fn set_permission(
        &self,
        ctx: &RequestContext,
        org_id: OrgId,
        resource_id: &str,
        principal: Principal,
        level: &str,
    ) -> PermissionResult<Option<ResourcePermission>> {
        ctx.check()?;
        self.ensure_allowed(principal.kind())?;
        let resource_id = self.parse_resource_id(resource_id)?;
        self.validate_resource(ctx, org_id, &resource_id).await?;

        match self.resolve_level(level)? {
            Some((level, actions)) => self
                .grant(ctx, org_id, &resource_id, principal, level, actions)
                .await
                .map(Some),
            None => {
                self.revoke(ctx, org_id, &resource_id, principal).await?;
                Ok(None)
            }
        }
    }

    /// Set a user's level on a resource instance.
    ///
    /// # Errors
    ///
    /// See [`set_permission`](Self::set_permission).
    pub async fn set_user_permission(
        &self,
        ctx: &RequestContext,
        org_id: OrgId,
        resource_id: &str,
        user_id: UserId,
        level: &str,
    ) -> PermissionResult<Option<ResourcePermission>> {
        self.set_permission(ctx, org_id, resource_id, Principal::User(user_id), level)
            .await
    }

    /// Set a team's level on a resource instance.
    ///
    /// # Errors
    ///
    /// See [`set_permission`](Self::set_permission).
    pub async fn set_team_permission(
        &self,
        ctx: &RequestContext,
        org_id: OrgId,
        resource_id: &str,
        team_id: TeamId,
        level: &str,
    ) -> PermissionResult<Option<ResourcePermission>> {
        self.set_permission(ctx, org_id, resource_id, Principal::Team(team_id), level)
            .await
    }

    /// Set a built-in role's level on a resource instance.
    ///
    /// # Errors
    ///
    /// See [`set_permission`](Self::set_permission).
    pub async fn set_built_in_role_permission(
        &self,
        ctx: &RequestContext,
        org_id: OrgId,
        resource_id: &str,
        role: BuiltInRole,
        level: &str,
    ) -> PermissionResult<Option<ResourcePermission>> {
        self.set_permission(ctx, org_id, resource_id, Principal::BuiltInRole(role), level)
            .await
    }

    /// Remove a principal's assignment on a resource instance.
    ///
    /// Removing an assignment that does not exist succeeds. No hook runs.
    ///
    /// # Errors
    ///
    /// `UnsupportedPrincipal`, `InvalidResourceId`, validator errors, store
    /// errors, or context errors.
    pub async fn remove_permission(
        &self,
        ctx: &RequestContext,
        org_id: OrgId,
        resource_id: &str,
        principal: Principal,
    ) -> PermissionResult<()> {
        ctx.check()?;
        self.ensure_allowed(principal.kind())?;
        let resource_id = self.parse_resource_id(resource_id)?;
        self.validate_resource(ctx, org_id, &resource_id).await?;
        self.revoke(ctx, org_id, &resource_id, principal).await
    }

    /// Apply several set/revoke commands to one resource instance.
    ///
    /// Every command is checked (principal kind and id, level) and the
    /// resource is validated before anything is written; commands are then
    /// applied in order. A store or hook failure stops the batch and leaves
    /// the commands applied so far in place.
    ///
    /// # Errors
    ///
    /// As for [`set_permission`](Self::set_permission), plus
    /// `InvalidPrincipal` for an unparsable principal id.
    pub async fn set_permissions(
        &self,
        ctx: &RequestContext,
        org_id: OrgId,
        resource_id: &str,
        commands: &[SetPermissionCommand],
    ) -> PermissionResult<Vec<ResourcePermission>> {
        ctx.check()?;
        let mut planned = Vec::with_capacity(commands.len());
        for command in commands {
            self.ensure_allowed(command.principal_kind)?;
            let principal = Principal::parse(command.principal_kind, &command.principal_id)?;
            planned.push((principal, self.resolve_level(&command.permission)?));
        }

        let resource_id = self.parse_resource_id(resource_id)?;
        self.validate_resource(ctx, org_id, &resource_id).await?;

        let mut stored = Vec::new();
        for (principal, level) in planned {
            match level {
                Some((level, actions)) => stored.push(
                    self.grant(ctx, org_id, &resource_id, principal, level, actions)
                        .await?,
                ),
                None => self.revoke(ctx, org_id, &resource_id, principal).await?,
            }
        }
        Ok(stored)
    }

    /// Drop every assignment on a deleted resource instance.
    ///
    /// Called by the owner of the resource after deleting it; the validator
    /// is not consulted since the resource is already gone. Returns the
    /// number of assignments removed.
    ///
    /// # Errors
    ///
    /// `InvalidResourceId`, store errors, or context errors.
    pub async fn delete_resource(
        &self,
        ctx: &RequestContext,
        org_id: OrgId,
        resource_id: &str,
    ) -> PermissionResult<usize> {
        ctx.check()?;
        let resource_id = self.parse_resource_id(resource_id)?;
        let removed = self
            .store
            .delete_resource(&self.scope(org_id, &resource_id))
            .await?;

        tracing::info!(
            resource = %self.options.resource,
            resource_id = %resource_id,
            org_id,
            removed,
            "Resource permissions deleted"
        );
        Ok(removed)
    }

    /// Drop every assignment held by a deleted principal in an organization.
    ///
    /// # Errors
    ///
    /// Store errors or context errors.
    pub async fn delete_principal(
        &self,
        ctx: &RequestContext,
        org_id: OrgId,
        principal: Principal,
    ) -> PermissionResult<usize> {
        ctx.check()?;
        let removed = self.store.delete_principal(org_id, principal).await?;

        tracing::info!(org_id, principal = %principal, removed, "Principal permissions deleted");
        Ok(removed)
    }

    fn ensure_allowed(&self, kind: PrincipalKind) -> PermissionResult<()> {
        if self.options.allows(kind) {
            Ok(())
        } else {
            Err(PermissionError::UnsupportedPrincipal {
                resource: self.options.resource.clone(),
                kind,
            })
        }
    }

    fn parse_resource_id(&self, raw: &str) -> PermissionResult<ResourceId> {
        ResourceId::parse(self.options.id_kind, raw).ok_or_else(|| {
            PermissionError::InvalidResourceId(format!("{} id {:?}", self.options.resource, raw))
        })
    }

    async fn validate_resource(
        &self,
        ctx: &RequestContext,
        org_id: OrgId,
        resource_id: &ResourceId,
    ) -> PermissionResult<()> {
        ctx.check()?;
        self.validator
            .validate(ctx, org_id, resource_id)
            .await
            .map_err(|err| {
                tracing::debug!(
                    resource = %self.options.resource,
                    resource_id = %resource_id,
                    org_id,
                    error = %err,
                    "Resource validation failed"
                );
                PermissionError::from(err)
            })
    }

    /// `None` means revoke.
    fn resolve_level(&self, name: &str) -> PermissionResult<Option<(L, ActionSet)>> {
        if name.is_empty() {
            return Ok(None);
        }
        self.catalog
            .resolve(name)
            .map(|(level, actions)| Some((level, actions.clone())))
            .ok_or_else(|| PermissionError::UnknownLevel {
                resource: self.options.resource.clone(),
                level: name.to_string(),
            })
    }

    async fn grant(
        &self,
        ctx: &RequestContext,
        org_id: OrgId,
        resource_id: &ResourceId,
        principal: Principal,
        level: L,
        actions: ActionSet,
    ) -> PermissionResult<ResourcePermission> {
        let scope = self.scope(org_id, resource_id);

        ctx.check()?;
        let record = self
            .store
            .set_assignment(&scope, principal, actions, self.options.only_managed)
            .await?;

        tracing::info!(
            resource = %self.options.resource,
            resource_id = %resource_id,
            org_id,
            principal = %principal,
            level = level.name(),
            "Permission set"
        );

        if let Some(hook) = &self.hook {
            ctx.check()?;
            if let Err(source) =
                hooks::dispatch(hook.as_ref(), ctx, org_id, principal, resource_id, level).await
            {
                tracing::warn!(
                    resource = %self.options.resource,
                    resource_id = %resource_id,
                    org_id,
                    principal = %principal,
                    level = level.name(),
                    error = %source,
                    "Permission stored but side-effect hook failed"
                );
                return Err(PermissionError::HookFailed {
                    level: level.name().to_string(),
                    source,
                });
            }
        }

        Ok(self.to_permission(&scope, record))
    }

    async fn revoke(
        &self,
        ctx: &RequestContext,
        org_id: OrgId,
        resource_id: &ResourceId,
        principal: Principal,
    ) -> PermissionResult<()> {
        let scope = self.scope(org_id, resource_id);

        ctx.check()?;
        let removed = self
            .store
            .remove_assignment(&scope, principal, self.options.only_managed)
            .await?;

        tracing::info!(
            resource = %self.options.resource,
            resource_id = %resource_id,
            org_id,
            principal = %principal,
            removed,
            "Permission removed"
        );
        Ok(())
    }

    fn scope(&self, org_id: OrgId, resource_id: &ResourceId) -> ResourceScope {
        ResourceScope::new(org_id, self.options.resource.clone(), resource_id.as_str())
    }

    fn to_permission(&self, scope: &ResourceScope, record: AssignmentRecord) -> ResourcePermission {
        ResourcePermission {
            resource: scope.resource.clone(),
            resource_id: scope.resource_id.clone(),
            principal: record.principal,
            permission: self
                .catalog
                .level_for_actions(&record.actions)
                .map(|level| level.name().to_string()),
            actions: record.actions,
            managed: record.managed,
        }
    }
}
