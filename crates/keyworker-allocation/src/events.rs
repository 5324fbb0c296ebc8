//! Offender lifecycle events consumed from the platform event stream.
//!
//! The upstream system publishes these as loosely-typed JSON; they are
//! modelled here as an explicit tagged enum so required fields are validated
//! at the boundary rather than fished out of dynamic maps downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of an external movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementDirection {
    /// Admission into an establishment.
    #[serde(rename = "IN")]
    In,
    /// Release or transfer out of an establishment.
    #[serde(rename = "OUT")]
    Out,
}

/// Offender lifecycle event relevant to keyworker allocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum OffenderEvent {
    /// An external movement (admission, release, transfer) was recorded.
    #[serde(rename = "EXTERNAL_MOVEMENT_RECORD-INSERTED", rename_all = "camelCase")]
    ExternalMovement {
        /// Offender display identifier (e.g. `A1234AA`).
        offender_no: String,
        /// Booking the movement belongs to.
        booking_id: i64,
        /// Movement type code from the upstream system (e.g. `REL`, `TRN`).
        movement_type: String,
        /// Whether the offender moved in or out.
        direction: MovementDirection,
        /// When the movement occurred.
        occurred_at: DateTime<Utc>,
    },

    /// A booking was merged and its number changed.
    #[serde(rename = "BOOKING_NUMBER-CHANGED", rename_all = "camelCase")]
    BookingNumberChanged {
        /// Booking whose number changed.
        booking_id: i64,
    },

    /// The offender's records were deleted upstream.
    #[serde(rename = "DATA_COMPLIANCE_DELETE-OFFENDER", rename_all = "camelCase")]
    OffenderDeleted {
        /// Offender display identifier.
        offender_no: String,
    },
}
