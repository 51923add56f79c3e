//! Error types for permission operations
//!
//! This module defines the errors returned by resource permission services,
//! resource validators and side-effect hooks.

use access_rbac::{CatalogError, PrincipalError, PrincipalKind};
use access_store::StoreError;
use thiserror::Error;

/// Boxed error used for collaborator failures the engine does not interpret.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by a side-effect hook.
pub type HookError = BoxError;

/// Error returned by a resource validator.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Resource does not exist in the organization
    #[error("{0}")]
    NotFound(String),

    /// Resource id is not addressable by this resource type
    #[error("{0}")]
    InvalidId(String),

    /// Lookup failed for another reason
    #[error(transparent)]
    Other(BoxError),
}

/// Permission service error types.
///
/// Validation errors (`UnsupportedPrincipal`, `InvalidPrincipal`,
/// `InvalidResourceId`, `NotFound`, `UnknownLevel`) are raised before any
/// write. `StoreUnavailable` and `ConstraintViolation` come from the
/// assignment store and abort before the hook runs. `HookFailed` means the
/// assignment **was** persisted and only the side effect failed.
#[derive(Debug, Error)]
pub enum PermissionError {
    /// Resource id could not be parsed for this resource type
    #[error("Invalid resource id: {0}")]
    InvalidResourceId(String),

    /// Resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Resource validator failed without a more specific cause
    #[error("Resource validation failed: {0}")]
    Validator(#[source] BoxError),

    /// Principal kind is not enabled for this resource type
    #[error("Assignments to {kind} principals are not supported for {resource}")]
    UnsupportedPrincipal {
        /// Resource type
        resource: String,
        /// Rejected principal kind
        kind: PrincipalKind,
    },

    /// Principal reference could not be parsed
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(#[from] PrincipalError),

    /// Permission level is not in the catalog
    #[error("Unknown permission level {level} for {resource}")]
    UnknownLevel {
        /// Resource type
        resource: String,
        /// Rejected level name
        level: String,
    },

    /// Assignment store could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Write rejected by a store constraint
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Assignment was persisted but the side-effect hook failed
    #[error("Permission {level} was stored but the hook failed: {source}")]
    HookFailed {
        /// Level whose hook failed
        level: String,
        /// Hook failure
        source: HookError,
    },

    /// Action catalog is invalid
    #[error("Invalid permission catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// Caller deadline passed
    #[error("Request deadline exceeded")]
    DeadlineExceeded,
}

/// Result type for permission operations.
pub type PermissionResult<T> = Result<T, PermissionError>;

impl From<StoreError> for PermissionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => PermissionError::StoreUnavailable(msg),
            StoreError::ConstraintViolation(msg) => PermissionError::ConstraintViolation(msg),
        }
    }
}

impl From<ValidationError> for PermissionError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::NotFound(msg) => PermissionError::NotFound(msg),
            ValidationError::InvalidId(msg) => PermissionError::InvalidResourceId(msg),
            ValidationError::Other(source) => PermissionError::Validator(source),
        }
    }
}

impl PermissionError {
    /// Check if this error should be logged at error level.
    ///
    /// Client mistakes are expected and logged at lower levels.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            PermissionError::StoreUnavailable(_)
                | PermissionError::Validator(_)
                | PermissionError::HookFailed { .. }
                | PermissionError::Catalog(_)
        )
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            PermissionError::InvalidResourceId(_)
            | PermissionError::UnsupportedPrincipal { .. }
            | PermissionError::InvalidPrincipal(_)
            | PermissionError::UnknownLevel { .. } => 400,

            PermissionError::NotFound(_) => 404,
            PermissionError::ConstraintViolation(_) => 409,
            PermissionError::Cancelled => 499,
            PermissionError::StoreUnavailable(_) => 503,
            PermissionError::DeadlineExceeded => 504,

            PermissionError::Validator(_)
            | PermissionError::HookFailed { .. }
            | PermissionError::Catalog(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            PermissionError::InvalidResourceId(_) => "INVALID_RESOURCE_ID",
            PermissionError::NotFound(_) => "NOT_FOUND",
            PermissionError::Validator(_) => "VALIDATION_FAILED",
            PermissionError::UnsupportedPrincipal { .. } => "UNSUPPORTED_PRINCIPAL",
            PermissionError::InvalidPrincipal(_) => "INVALID_PRINCIPAL",
            PermissionError::UnknownLevel { .. } => "UNKNOWN_LEVEL",
            PermissionError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            PermissionError::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            PermissionError::HookFailed { .. } => "HOOK_FAILED",
            PermissionError::Catalog(_) => "INVALID_CATALOG",
            PermissionError::Cancelled => "CANCELLED",
            PermissionError::DeadlineExceeded => "DEADLINE_EXCEEDED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_unchanged() {
        let err: PermissionError = StoreError::Unavailable("db down".to_string()).into();
        assert!(matches!(err, PermissionError::StoreUnavailable(ref m) if m == "db down"));
        assert_eq!(err.status_code(), 503);

        let err: PermissionError = StoreError::ConstraintViolation("dup".to_string()).into();
        assert_eq!(err.error_code(), "CONSTRAINT_VIOLATION");
    }

    #[test]
    fn test_validation_errors_map() {
        let err: PermissionError = ValidationError::NotFound("team 9 not found".to_string()).into();
        assert_eq!(err.to_string(), "Resource not found: team 9 not found");
        assert_eq!(err.status_code(), 404);

        let err: PermissionError = ValidationError::InvalidId("abc".to_string()).into();
        assert_eq!(err.error_code(), "INVALID_RESOURCE_ID");
    }

    #[test]
    fn test_hook_failed_keeps_source() {
        let err = PermissionError::HookFailed {
            level: "Admin".to_string(),
            source: "membership insert failed".into(),
        };
        assert!(err.is_server_error());
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "membership insert failed");
    }

    #[test]
    fn test_client_errors_are_not_server_errors() {
        let err = PermissionError::UnsupportedPrincipal {
            resource: "teams".to_string(),
            kind: PrincipalKind::Team,
        };
        assert!(!err.is_server_error());
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.to_string(),
            "Assignments to team principals are not supported for teams"
        );
    }
}
