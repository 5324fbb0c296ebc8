//! # keyworker-rbac
//!
//! Role Gateway abstraction over the prison platform's remote RBAC API.
//!
//! This crate provides:
//! - The [`RoleGateway`] capability trait consumed by the reconciliation
//!   engine (find staff by caseload+role, assign a role, remove a role)
//! - [`RemoteRoleGateway`], the reqwest-based production adapter
//! - Bearer / `OAuth2` client-credentials authentication with token caching
//! - A transient/permanent error taxonomy for gateway failures
//!
//! The trait boundary exists so reconciliation logic can be tested against an
//! in-memory fake while the remote adapter evolves independently.

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod remote;
pub mod types;

pub use auth::{GatewayAuth, GatewayCredentials};
pub use config::GatewayConfig;
pub use error::{RbacError, RbacResult};
pub use gateway::RoleGateway;
pub use remote::RemoteRoleGateway;
pub use types::StaffId;
