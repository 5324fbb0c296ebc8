//! # keyworker-allocation
//!
//! Offender-event model and the keyworker deallocation service.
//!
//! When the upstream prison system records an offender state change (release
//! or transfer out, booking merge, offender deletion), the platform's event
//! listener hands the parsed [`OffenderEvent`] to [`DeallocationService`],
//! which deactivates the affected keyworker allocations through the
//! [`AllocationStore`] capability. All paths are idempotent: an offender or
//! booking with no active allocation is a no-op.
//!
//! The acting identity is threaded explicitly into every deactivation for
//! audit; nothing here reads ambient security context.

pub mod error;
pub mod events;
pub mod service;
pub mod store;

pub use error::{AllocationError, AllocationResult};
pub use events::{MovementDirection, OffenderEvent};
pub use service::DeallocationService;
pub use store::{AllocationStore, DeallocationReason, KeyworkerAllocation};
