//! Role Gateway ID types
//!
//! Newtype wrappers for type-safe identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a staff member in the remote RBAC system.
///
/// Opaque to this platform; equality is by identifier only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(i64);

impl StaffId {
    /// Create a StaffId from the remote system's numeric identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner numeric value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StaffId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<i64> for StaffId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<StaffId> for i64 {
    fn from(id: StaffId) -> Self {
        id.0
    }
}
