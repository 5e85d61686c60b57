//! Error types for role and user storage
//!
//! Storage errors cover both data-level rejections (unknown ids, conflicting
//! names, grammar violations) and transport failures of the backing store.

use inventory_rbac::{PatternError, RoleId, UserId};
use thiserror::Error;

/// Role and user store error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No role with this id exists
    #[error("Role could not be found: {0}")]
    RoleNotFound(RoleId),

    /// No user with this id exists
    #[error("User could not be found: {0}")]
    UserNotFound(UserId),

    /// Another role already uses this name
    #[error("A role named '{0}' already exists")]
    DuplicateRoleName(String),

    /// The role is still held by at least one user
    #[error("Role {0} cannot be deleted as it is associated with one or more users")]
    RoleInUse(RoleId),

    /// Inactive roles cannot be assigned
    #[error("Role {0} is not active")]
    RoleInactive(RoleId),

    /// Role name is missing or blank
    #[error("Role name is required")]
    MissingRoleName,

    /// A role pattern violates the pattern grammar
    #[error("Invalid role: {0}")]
    InvalidPattern(#[from] PatternError),

    /// The backing store could not be reached
    #[error("Role store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Check if this error is a failure of the store itself rather than a
    /// rejection of the request.
    pub fn is_server_error(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::RoleNotFound(_) | StoreError::UserNotFound(_) => 404,

            StoreError::DuplicateRoleName(_) | StoreError::RoleInUse(_) => 409,

            StoreError::RoleInactive(_)
            | StoreError::MissingRoleName
            | StoreError::InvalidPattern(_) => 400,

            StoreError::Unavailable(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::RoleNotFound(_) => "ROLE_NOT_FOUND",
            StoreError::UserNotFound(_) => "USER_NOT_FOUND",
            StoreError::DuplicateRoleName(_) => "DUPLICATE_ROLE_NAME",
            StoreError::RoleInUse(_) => "ROLE_IN_USE",
            StoreError::RoleInactive(_) => "ROLE_INACTIVE",
            StoreError::MissingRoleName => "MISSING_ROLE_NAME",
            StoreError::InvalidPattern(_) => "INVALID_ACTION_PATTERN",
            StoreError::Unavailable(_) => "STORE_UNAVAILABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(StoreError::RoleNotFound(1).status_code(), 404);
        assert_eq!(StoreError::RoleInUse(1).status_code(), 409);
        assert_eq!(StoreError::RoleInactive(1).status_code(), 400);
        assert_eq!(StoreError::Unavailable("down".into()).status_code(), 500);
    }

    #[test]
    fn test_pattern_error_converts() {
        let err: StoreError = PatternError::Empty.into();
        assert_eq!(err.error_code(), "INVALID_ACTION_PATTERN");
        assert!(!err.is_server_error());
        assert!(StoreError::Unavailable("timeout".into()).is_server_error());
    }
}
