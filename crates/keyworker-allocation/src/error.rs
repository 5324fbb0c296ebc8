//! Allocation error types.

use thiserror::Error;

/// Errors that can occur while deallocating keyworker relationships.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The allocation store failed.
    #[error("allocation store error: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AllocationError {
    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        AllocationError::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error with source.
    pub fn store_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AllocationError::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for allocation operations.
pub type AllocationResult<T> = Result<T, AllocationError>;
