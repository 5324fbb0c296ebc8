//! Role Gateway error types
//!
//! Error definitions with transient/permanent classification so callers can
//! decide whether a failed operation is worth re-running.

use thiserror::Error;

use crate::types::StaffId;

/// Error that can occur during Role Gateway operations.
#[derive(Debug, Error)]
pub enum RbacError {
    /// Failed to establish a connection to the remote RBAC system.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network error during communication with the remote RBAC system.
    #[error("network error: {message}")]
    NetworkError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid credentials, or the token endpoint rejected the client.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The remote API refused the operation for the authenticated caller.
    #[error("authorization failed: insufficient permissions for {operation}")]
    AuthorizationFailed { operation: String },

    /// Gateway configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// The staff member does not currently hold the role being removed.
    ///
    /// This is the distinguishable "not present" condition (HTTP 404 from the
    /// remote API) that reconciliation classifies as *ignored*, not *failed*.
    #[error("staff {staff_id} does not hold role {role_code} in caseload {caseload}")]
    RoleNotHeld {
        staff_id: StaffId,
        caseload: String,
        role_code: String,
    },

    /// The remote API returned an unexpected status.
    #[error("remote RBAC API returned {status}: {message}")]
    RemoteApi { status: u16, message: String },

    /// The remote API returned a body we could not interpret.
    #[error("invalid response from remote RBAC API: {message}")]
    InvalidResponse { message: String },
}

impl RbacError {
    /// Check if this error is transient and the operation may succeed on a
    /// later pass.
    pub fn is_transient(&self) -> bool {
        match self {
            RbacError::ConnectionFailed { .. } | RbacError::NetworkError { .. } => true,
            RbacError::RemoteApi { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if this error is permanent and re-running won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    // Convenience constructors

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RbacError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        RbacError::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source.
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RbacError::NetworkError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        RbacError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Result type for Role Gateway operations.
pub type RbacResult<T> = Result<T, RbacError>;
