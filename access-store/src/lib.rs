//! # Access Store
//!
//! Persistence ports for resource-scoped access control, with in-memory
//! implementations for single-process deployments and tests.
//!
//! ## Overview
//!
//! - **Assignment store**: per (organization, resource type, resource id,
//!   principal) the set of granted actions, with cascading deletes for
//!   removed resources and principals
//! - **Role store**: uniquely named roles holding scoped actions, written
//!   through an idempotent upsert
//!
//! ## Usage
//!
//! ```rust,no_run
//! use access_rbac::{ActionSet, Principal};
//! use access_store::{AssignmentStore, MemoryAssignmentStore, ResourceScope};
//!
//! async fn example() {
//!     let store = MemoryAssignmentStore::new();
//!     let scope = ResourceScope::new(1, "teams", "42");
//!     let actions = ActionSet::parse(["teams:read"]).unwrap();
//!
//!     store
//!         .set_assignment(&scope, Principal::User(7), actions, true)
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod assignments;
pub mod error;
pub mod roles;

// Re-export main types
pub use assignments::{AssignmentRecord, AssignmentStore, MemoryAssignmentStore, ResourceScope};
pub use error::{StoreError, StoreResult};
pub use roles::{MemoryRoleStore, Role, RoleDefinition, RolePermission, RoleStore};
