//! Error types for catalog and principal parsing.

use thiserror::Error;

/// Errors raised while building an action catalog or parsing its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Action token is not of the form `<domain>:<verb>`
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A permission level grants no actions
    #[error("Permission level {0} has no actions")]
    EmptyLevel(String),

    /// The same permission level was registered twice
    #[error("Permission level {0} is registered more than once")]
    DuplicateLevel(String),

    /// Two levels share an action without one being layered on the other
    #[error("Action {action} appears in both {first} and {second}, which are not layered")]
    OverlappingLevels {
        /// Lower level name.
        first: String,
        /// Higher level name.
        second: String,
        /// First shared action.
        action: String,
    },
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while parsing a principal reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrincipalError {
    /// Principal id does not fit the principal kind
    #[error("Invalid {kind} id: {id}")]
    InvalidId {
        /// Principal kind as a string.
        kind: &'static str,
        /// Rejected id.
        id: String,
    },
}
