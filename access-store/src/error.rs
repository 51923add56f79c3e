//! Store error types

use thiserror::Error;

/// Storage error types.
///
/// Store implementations map their backend failures onto these two cases;
/// callers propagate them unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend could not be reached or failed mid-operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Write rejected by a store-level constraint
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
