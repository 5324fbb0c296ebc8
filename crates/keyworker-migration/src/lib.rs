//! # keyworker-migration
//!
//! Role-assignment reconciliation engine for keyworker migrations.
//!
//! Given a desired-state [`RoleMigrationSpec`] (which staff, in which
//! caseloads, currently hold which match roles), the engine synchronizes the
//! remote RBAC system by assigning a target set of roles and removing an
//! obsolete set, tolerating partial failure per (staff, role) operation and
//! producing per-caseload [`CaseloadStats`].
//!
//! ## Architecture
//!
//! ```text
//!   RoleMigrationSpec ──► MigrationEngine ──► Vec<CaseloadStats>
//!                              │
//!                              ▼
//!                      dyn RoleGateway (keyworker-rbac)
//! ```
//!
//! Caseloads are processed concurrently with independent accumulators; the
//! result sequence matches the input caseload order.

pub mod engine;
pub mod error;
pub mod spec;
pub mod statistics;

pub use engine::MigrationEngine;
pub use error::{MigrationError, MigrationResult};
pub use spec::RoleMigrationSpec;
pub use statistics::{CaseloadStats, RemovalOutcome};
