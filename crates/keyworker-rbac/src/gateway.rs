//! Role Gateway capability trait
//!
//! Capability abstraction over the remote RBAC system, so the reconciliation
//! engine can be exercised with an in-memory fake and the remote adapter can
//! evolve without touching reconciliation logic.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::RbacResult;
use crate::types::StaffId;

/// Capability interface over the remote role-based-access-control system.
///
/// Every operation is scoped to a single caseload. Implementations must be
/// safe to share across concurrent caseload tasks; the only shared state is
/// read-only client configuration.
#[async_trait]
pub trait RoleGateway: Send + Sync {
    /// Find staff currently holding `role_code` in `caseload`.
    ///
    /// Returns an empty set when nobody matches; an error indicates a
    /// remote/connectivity failure, never "no matches".
    async fn find_staff_matching_caseload_and_role(
        &self,
        caseload: &str,
        role_code: &str,
    ) -> RbacResult<HashSet<StaffId>>;

    /// Grant `role_code` to `staff_id` within `caseload`.
    ///
    /// Whether re-assigning an already-held role succeeds is decided by the
    /// remote system; callers must tolerate either answer.
    async fn assign_role(&self, staff_id: StaffId, caseload: &str, role_code: &str)
        -> RbacResult<()>;

    /// Revoke `role_code` from `staff_id` within `caseload`.
    ///
    /// When the staff member does not hold the role, implementations return
    /// [`RbacError::RoleNotHeld`](crate::error::RbacError::RoleNotHeld) so
    /// callers can classify the outcome as ignored rather than failed.
    async fn remove_role(&self, staff_id: StaffId, caseload: &str, role_code: &str)
        -> RbacResult<()>;
}
