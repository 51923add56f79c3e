//! Assignment store
//!
//! This module provides the assignment store abstraction and an in-memory
//! implementation. An assignment binds one principal to a set of actions on
//! one resource instance; there is at most one assignment per
//! (organization, resource type, resource id, principal).

use access_rbac::{ActionSet, OrgId, Principal};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};

/// Addresses one resource instance within an organization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceScope {
    /// Organization owning the resource
    pub org_id: OrgId,
    /// Resource type, e.g. `teams`
    pub resource: String,
    /// Resource instance id
    pub resource_id: String,
}

impl ResourceScope {
    /// Create a new resource scope.
    pub fn new(org_id: OrgId, resource: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            org_id,
            resource: resource.into(),
            resource_id: resource_id.into(),
        }
    }
}

/// A stored assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// Principal receiving the actions
    pub principal: Principal,
    /// Granted actions
    pub actions: ActionSet,
    /// Whether the assignment was created through the permission engine.
    ///
    /// Unmanaged assignments come from other provisioning mechanisms
    /// (e.g. organization-wide defaults).
    pub managed: bool,
    /// When the assignment was first created
    pub created_at: DateTime<Utc>,
    /// When the action set last changed
    pub updated_at: DateTime<Utc>,
}

/// Assignment store trait.
///
/// Implementations must make operations on a single
/// (scope, principal) key linearizable: a reader never observes a partially
/// replaced action set. When `only_managed` is set, unmanaged assignments
/// are invisible to reads and removals, and a write that would replace one
/// is rejected with [`StoreError::ConstraintViolation`].
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Replace the principal's action set on a resource.
    ///
    /// Setting the same actions again leaves the record untouched.
    async fn set_assignment(
        &self,
        scope: &ResourceScope,
        principal: Principal,
        actions: ActionSet,
        only_managed: bool,
    ) -> StoreResult<AssignmentRecord>;

    /// List assignments on a resource, ordered by principal.
    async fn get_assignments(
        &self,
        scope: &ResourceScope,
        only_managed: bool,
    ) -> StoreResult<Vec<AssignmentRecord>>;

    /// Remove the principal's assignment on a resource.
    ///
    /// Returns `false` when there was nothing (visible) to remove.
    async fn remove_assignment(
        &self,
        scope: &ResourceScope,
        principal: Principal,
        only_managed: bool,
    ) -> StoreResult<bool>;

    /// Remove every assignment on a deleted resource.
    async fn delete_resource(&self, scope: &ResourceScope) -> StoreResult<usize>;

    /// Remove every assignment held by a deleted principal in an organization.
    async fn delete_principal(&self, org_id: OrgId, principal: Principal) -> StoreResult<usize>;
}

type AssignmentKey = (ResourceScope, Principal);

/// In-memory assignment store.
///
/// Each write takes the map's write lock once and does not await while
/// holding it, so a write that has started always completes even if the
/// calling future is dropped afterwards.
#[derive(Clone, Default)]
pub struct MemoryAssignmentStore {
    assignments: Arc<RwLock<BTreeMap<AssignmentKey, AssignmentRecord>>>,
}

impl std::fmt::Debug for MemoryAssignmentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAssignmentStore").finish_non_exhaustive()
    }
}

impl MemoryAssignmentStore {
    /// Create a new in-memory assignment store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an assignment provisioned outside the permission engine.
    pub async fn seed_external(&self, scope: &ResourceScope, principal: Principal, actions: ActionSet) {
        let now = Utc::now();
        let record = AssignmentRecord {
            principal,
            actions,
            managed: false,
            created_at: now,
            updated_at: now,
        };
        self.assignments
            .write()
            .await
            .insert((scope.clone(), principal), record);
    }

    /// Total number of stored assignments, managed or not.
    pub async fn len(&self) -> usize {
        self.assignments.read().await.len()
    }

    /// Check if the store holds no assignments.
    pub async fn is_empty(&self) -> bool {
        self.assignments.read().await.is_empty()
    }
}

#[async_trait]
impl AssignmentStore for MemoryAssignmentStore {
    async fn set_assignment(
        &self,
        scope: &ResourceScope,
        principal: Principal,
        actions: ActionSet,
        only_managed: bool,
    ) -> StoreResult<AssignmentRecord> {
        if actions.is_empty() {
            return Err(StoreError::ConstraintViolation(
                "assignment must grant at least one action".to_string(),
            ));
        }

        let key = (scope.clone(), principal);
        let mut assignments = self.assignments.write().await;
        let now = Utc::now();

        let record = match assignments.get(&key) {
            Some(existing) if !existing.managed && only_managed => {
                return Err(StoreError::ConstraintViolation(format!(
                    "{} already holds an unmanaged assignment on {}:{}",
                    principal, scope.resource, scope.resource_id
                )));
            }
            Some(existing) if existing.managed && existing.actions == actions => {
                return Ok(existing.clone());
            }
            Some(existing) => AssignmentRecord {
                principal,
                actions,
                managed: true,
                created_at: existing.created_at,
                updated_at: now,
            },
            None => AssignmentRecord {
                principal,
                actions,
                managed: true,
                created_at: now,
                updated_at: now,
            },
        };

        assignments.insert(key, record.clone());
        tracing::debug!(
            org_id = scope.org_id,
            resource = %scope.resource,
            resource_id = %scope.resource_id,
            principal = %principal,
            actions = record.actions.len(),
            "Assignment stored"
        );
        Ok(record)
    }

    async fn get_assignments(
        &self,
        scope: &ResourceScope,
        only_managed: bool,
    ) -> StoreResult<Vec<AssignmentRecord>> {
        let assignments = self.assignments.read().await;
        Ok(assignments
            .iter()
            .filter(|((s, _), record)| s == scope && (record.managed || !only_managed))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn remove_assignment(
        &self,
        scope: &ResourceScope,
        principal: Principal,
        only_managed: bool,
    ) -> StoreResult<bool> {
        let key = (scope.clone(), principal);
        let mut assignments = self.assignments.write().await;

        match assignments.get(&key) {
            None => Ok(false),
            Some(record) if only_managed && !record.managed => Ok(false),
            Some(_) => {
                assignments.remove(&key);
                tracing::debug!(
                    org_id = scope.org_id,
                    resource = %scope.resource,
                    resource_id = %scope.resource_id,
                    principal = %principal,
                    "Assignment removed"
                );
                Ok(true)
            }
        }
    }

    async fn delete_resource(&self, scope: &ResourceScope) -> StoreResult<usize> {
        let mut assignments = self.assignments.write().await;
        let before = assignments.len();
        assignments.retain(|(s, _), _| s != scope);
        Ok(before - assignments.len())
    }

    async fn delete_principal(&self, org_id: OrgId, principal: Principal) -> StoreResult<usize> {
        let mut assignments = self.assignments.write().await;
        let before = assignments.len();
        assignments.retain(|(s, p), _| !(s.org_id == org_id && *p == principal));
        Ok(before - assignments.len())
    }
}
