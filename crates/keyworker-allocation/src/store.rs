//! Allocation store capability trait.
//!
//! Persistence of keyworker allocations is owned by the surrounding platform;
//! this crate only needs the narrow capability below to apply compensating
//! deallocations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use keyworker_rbac::StaffId;

use crate::error::AllocationResult;

/// Why an allocation was deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeallocationReason {
    /// Offender released from the establishment.
    Released,
    /// Offender transferred to another establishment.
    Transferred,
    /// Booking merged under a new number.
    Merged,
    /// Offender records deleted upstream.
    Deleted,
    /// Manual deallocation by an operator.
    Manual,
}

impl fmt::Display for DeallocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeallocationReason::Released => "RELEASED",
            DeallocationReason::Transferred => "TRANSFERRED",
            DeallocationReason::Merged => "MERGED",
            DeallocationReason::Deleted => "DELETED",
            DeallocationReason::Manual => "MANUAL",
        };
        f.write_str(s)
    }
}

/// One supervising-staff-to-offender relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyworkerAllocation {
    /// Allocation record identifier.
    pub id: i64,
    /// Offender display identifier.
    pub offender_no: String,
    /// Booking the allocation was made under.
    pub booking_id: i64,
    /// The supervising keyworker.
    pub staff_id: StaffId,
    /// Caseload (establishment) of the allocation.
    pub caseload: String,
    /// When the allocation was made.
    pub assigned_at: DateTime<Utc>,
    /// Whether the allocation is currently active.
    pub active: bool,
}

/// Capability interface over the platform's allocation persistence.
#[async_trait]
pub trait AllocationStore: Send + Sync {
    /// Active allocations for an offender, across bookings.
    async fn active_allocations_for_offender(
        &self,
        offender_no: &str,
    ) -> AllocationResult<Vec<KeyworkerAllocation>>;

    /// Active allocations under a specific booking.
    async fn active_allocations_for_booking(
        &self,
        booking_id: i64,
    ) -> AllocationResult<Vec<KeyworkerAllocation>>;

    /// Deactivate one allocation.
    ///
    /// `actor` is the explicit identity of whoever (or whatever event path)
    /// triggered the deactivation, recorded for audit.
    async fn deactivate(
        &self,
        allocation_id: i64,
        reason: DeallocationReason,
        deallocated_at: DateTime<Utc>,
        actor: Option<&str>,
    ) -> AllocationResult<()>;
}
