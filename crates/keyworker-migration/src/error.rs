//! Migration error types.

use thiserror::Error;

/// Errors that can occur when running a role migration.
///
/// Per-operation gateway failures are never surfaced here; they are absorbed
/// into the per-caseload statistics. The only fatal condition is an invalid
/// specification, rejected before any remote call is made.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The migration specification failed validation.
    ///
    /// Carries every violation found, not just the first.
    #[error("invalid migration specification: {}", violations.join("; "))]
    InvalidSpec { violations: Vec<String> },
}

impl MigrationError {
    /// The individual validation violations, when this is a spec error.
    pub fn violations(&self) -> &[String] {
        match self {
            MigrationError::InvalidSpec { violations } => violations,
        }
    }
}

/// Result type for migration operations.
pub type MigrationResult<T> = Result<T, MigrationError>;
