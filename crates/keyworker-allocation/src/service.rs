//! Keyworker deallocation service.
//!
//! The reconcile-then-apply companion to the migration engine: reacts to
//! offender lifecycle changes by deactivating the affected keyworker
//! allocations. Every operation is idempotent — an offender or booking with
//! no active allocation is a no-op, not an error.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::AllocationResult;
use crate::events::{MovementDirection, OffenderEvent};
use crate::store::{AllocationStore, DeallocationReason, KeyworkerAllocation};

/// Service invoked by the event-driven collaborator (SQS/JMS listener) and by
/// admin endpoints to deallocate keyworker relationships.
pub struct DeallocationService {
    store: Arc<dyn AllocationStore>,
}

impl DeallocationService {
    /// Create a service over an allocation store.
    pub fn new(store: Arc<dyn AllocationStore>) -> Self {
        Self { store }
    }

    /// Deallocate every active keyworker for an offender.
    ///
    /// Returns the number of allocations deactivated (zero when the offender
    /// has none).
    pub async fn deallocate_keyworkers_for_offender(
        &self,
        offender_no: &str,
        reason: DeallocationReason,
        actor: Option<&str>,
    ) -> AllocationResult<usize> {
        let allocations = self
            .store
            .active_allocations_for_offender(offender_no)
            .await?;
        self.deactivate_all(&allocations, reason, actor).await
    }

    /// Deallocate keyworkers under a booking that was merged away.
    pub async fn deallocate_for_merged_booking(
        &self,
        booking_id: i64,
        actor: Option<&str>,
    ) -> AllocationResult<usize> {
        let allocations = self.store.active_allocations_for_booking(booking_id).await?;
        self.deactivate_all(&allocations, DeallocationReason::Merged, actor)
            .await
    }

    /// React to an external movement.
    ///
    /// Only outward movements (release, transfer out) deallocate; admissions
    /// leave existing allocations untouched.
    pub async fn deallocate_for_external_movement(
        &self,
        offender_no: &str,
        direction: MovementDirection,
        actor: Option<&str>,
    ) -> AllocationResult<usize> {
        match direction {
            MovementDirection::Out => {
                self.deallocate_keyworkers_for_offender(
                    offender_no,
                    DeallocationReason::Released,
                    actor,
                )
                .await
            }
            MovementDirection::In => {
                debug!(offender_no = %offender_no, "Inward movement; keeping allocations");
                Ok(0)
            }
        }
    }

    /// Dispatch an offender lifecycle event to the matching deallocation path.
    pub async fn handle_event(
        &self,
        event: &OffenderEvent,
        actor: Option<&str>,
    ) -> AllocationResult<usize> {
        match event {
            OffenderEvent::ExternalMovement {
                offender_no,
                direction,
                ..
            } => {
                self.deallocate_for_external_movement(offender_no, *direction, actor)
                    .await
            }
            OffenderEvent::BookingNumberChanged { booking_id } => {
                self.deallocate_for_merged_booking(*booking_id, actor).await
            }
            OffenderEvent::OffenderDeleted { offender_no } => {
                self.deallocate_keyworkers_for_offender(
                    offender_no,
                    DeallocationReason::Deleted,
                    actor,
                )
                .await
            }
        }
    }

    async fn deactivate_all(
        &self,
        allocations: &[KeyworkerAllocation],
        reason: DeallocationReason,
        actor: Option<&str>,
    ) -> AllocationResult<usize> {
        let now = Utc::now();
        for allocation in allocations {
            self.store
                .deactivate(allocation.id, reason, now, actor)
                .await?;
        }

        if allocations.is_empty() {
            debug!(reason = %reason, "No active allocations to deallocate");
        } else {
            info!(
                count = allocations.len(),
                reason = %reason,
                actor = actor.unwrap_or("<system>"),
                "Deallocated keyworker allocations"
            );
        }

        Ok(allocations.len())
    }
}
