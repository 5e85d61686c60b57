//! Error types for authorization operations
//!
//! A denied decision is reported as [`AuthzError::Forbidden`] only by the
//! helpers that turn a verdict into a `Result`; evaluation itself returns a
//! decision. Store failures are carried unchanged so the serving layer can
//! render them, and are never treated as an allow.

use inventory_store::StoreError;
use thiserror::Error;

use crate::config::ConfigError;

/// Authorization error types.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The principal lacks every required action
    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    /// The endpoint requires an authenticated principal
    #[error("Authentication required")]
    Unauthenticated,

    /// Role lookup failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for authorization operations.
pub type AuthzResult<T> = Result<T, AuthzError>;

impl AuthzError {
    /// Check if this error should be logged at error level.
    ///
    /// Denials are expected outcomes and are not server errors.
    pub fn is_server_error(&self) -> bool {
        match self {
            AuthzError::Store(err) => err.is_server_error(),
            AuthzError::Config(_) => true,
            AuthzError::Forbidden | AuthzError::Unauthenticated => false,
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthzError::Forbidden => 403,
            AuthzError::Unauthenticated => 401,
            AuthzError::Store(err) => err.status_code(),
            AuthzError::Config(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthzError::Forbidden => "FORBIDDEN",
            AuthzError::Unauthenticated => "UNAUTHENTICATED",
            AuthzError::Store(err) => err.error_code(),
            AuthzError::Config(_) => "CONFIG_ERROR",
        }
    }
}
