//! Per-caseload outcome statistics.
//!
//! One record is accumulated per caseload during an engine pass, returned to
//! the caller, and never mutated afterward.

use serde::Serialize;
use std::collections::BTreeMap;

/// Classification of one removal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The role grant was removed.
    Succeeded,
    /// The staff member never held the role; not an operational failure.
    Ignored,
    /// The gateway reported a hard failure.
    Failed,
}

/// Outcome counters for one caseload.
///
/// Invariants: every attempted assign contributes exactly one unit to either
/// `num_assign_succeeded` or `num_assign_failed`; every attempted removal
/// contributes exactly one unit to exactly one of the three unassign counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaseloadStats {
    /// The caseload these counters describe.
    pub caseload: String,
    /// Size of the de-duplicated matched staff set.
    pub num_matched_users: u32,
    /// Assign attempts accepted by the gateway.
    pub num_assign_succeeded: u32,
    /// Assign attempts rejected by the gateway.
    pub num_assign_failed: u32,
    /// Removal attempts accepted by the gateway.
    pub num_unassign_succeeded: u32,
    /// Removal attempts targeting a role the staff member never held.
    pub num_unassign_ignored: u32,
    /// Removal attempts rejected by the gateway for any other reason.
    pub num_unassign_failed: u32,
}

impl CaseloadStats {
    /// Create empty counters for a caseload.
    pub fn new(caseload: impl Into<String>) -> Self {
        Self {
            caseload: caseload.into(),
            ..Self::default()
        }
    }

    /// Record one assign attempt.
    pub fn record_assign(&mut self, succeeded: bool) {
        if succeeded {
            self.num_assign_succeeded += 1;
        } else {
            self.num_assign_failed += 1;
        }
    }

    /// Record one removal attempt.
    pub fn record_removal(&mut self, outcome: RemovalOutcome) {
        match outcome {
            RemovalOutcome::Succeeded => self.num_unassign_succeeded += 1,
            RemovalOutcome::Ignored => self.num_unassign_ignored += 1,
            RemovalOutcome::Failed => self.num_unassign_failed += 1,
        }
    }

    /// Export as a flat string map for logging/metrics collaborators.
    ///
    /// The key set and naming (`numUsersMatched`, not `numMatchedUsers`) is a
    /// serialization contract; values are decimal strings.
    pub fn to_flat_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("caseload".to_string(), self.caseload.clone()),
            (
                "numUsersMatched".to_string(),
                self.num_matched_users.to_string(),
            ),
            (
                "numAssignRoleSucceeded".to_string(),
                self.num_assign_succeeded.to_string(),
            ),
            (
                "numAssignRoleFailed".to_string(),
                self.num_assign_failed.to_string(),
            ),
            (
                "numUnassignRoleSucceeded".to_string(),
                self.num_unassign_succeeded.to_string(),
            ),
            (
                "numUnassignRoleIgnored".to_string(),
                self.num_unassign_ignored.to_string(),
            ),
            (
                "numUnassignRoleFailed".to_string(),
                self.num_unassign_failed.to_string(),
            ),
        ])
    }
}
