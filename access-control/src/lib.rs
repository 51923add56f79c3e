//! # Access Control
//!
//! Resource permission services for resource-scoped access control.
//!
//! ## Overview
//!
//! A [`ResourcePermissionService`] manages who may do what on the instances
//! of one resource type (e.g. a single team):
//! - **Validation**: principal kind, resource id syntax and existence, level
//! - **Assignment**: the level's action set is written to the assignment store,
//!   replacing any earlier set for the same principal
//! - **Side effects**: an optional [`AssignmentHook`] mirrors the grant into
//!   the owning domain after the write succeeds
//! - **Meta roles**: reader and writer roles for delegated administration are
//!   provisioned when the service is created
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use access_control::{
//!     RequestContext, ResourceId, ResourceOptions, ResourcePermissionService,
//!     ResourceValidator, ValidationError,
//! };
//! use access_rbac::{ActionCatalog, OrgId, PermissionLevel, Principal};
//! use access_store::{MemoryAssignmentStore, MemoryRoleStore};
//! use async_trait::async_trait;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
//! enum FolderPermission {
//!     View,
//! }
//!
//! impl PermissionLevel for FolderPermission {
//!     fn name(&self) -> &'static str {
//!         "View"
//!     }
//! }
//!
//! struct AnyFolder;
//!
//! #[async_trait]
//! impl ResourceValidator for AnyFolder {
//!     async fn validate(
//!         &self,
//!         _ctx: &RequestContext,
//!         _org_id: OrgId,
//!         _resource_id: &ResourceId,
//!     ) -> Result<(), ValidationError> {
//!         Ok(())
//!     }
//! }
//!
//! async fn example() {
//!     let catalog = ActionCatalog::new([(FolderPermission::View, vec!["folders:read"])]).unwrap();
//!     let service = ResourcePermissionService::new(
//!         ResourceOptions::new("folders"),
//!         catalog,
//!         Arc::new(AnyFolder),
//!         Arc::new(MemoryAssignmentStore::new()),
//!         Arc::new(MemoryRoleStore::new()),
//!     )
//!     .await
//!     .unwrap();
//!
//!     service
//!         .set_permission(&RequestContext::new(), 1, "12", Principal::User(7), "View")
//!         .await
//!         .unwrap();
//! }
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod hooks;
pub mod options;
pub mod provisioner;
pub mod routes;
pub mod service;
pub mod validator;

// Re-export main types
pub use context::RequestContext;
pub use error::{BoxError, HookError, PermissionError, PermissionResult, ValidationError};
pub use hooks::AssignmentHook;
pub use options::ResourceOptions;
pub use provisioner::{MetaRoleProvisioner, MetaRoles};
pub use routes::{
    routes, ResourceDescription, Route, RouteMethod, RouteOperation, SetPermissionBody, ROUTE_PREFIX,
};
pub use service::{ResourcePermission, ResourcePermissionService, SetPermissionCommand};
pub use validator::{ResourceId, ResourceIdKind, ResourceValidator};
