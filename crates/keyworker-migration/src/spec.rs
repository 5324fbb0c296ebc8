//! Migration specification — the desired-state input to the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{MigrationError, MigrationResult};

/// Validation message for an empty caseload list.
pub const EMPTY_CASELOADS: &str = "caseloads must not be empty";

/// Validation message for an empty roles-to-match set.
pub const EMPTY_ROLES_TO_MATCH: &str = "roles to match must not be empty";

/// Caller-supplied specification of one role migration.
///
/// Constructed once per migration request, validated, consumed entirely by a
/// single engine invocation, then discarded. The external field names follow
/// the platform's HTTP contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMigrationSpec {
    /// Caseloads to process, in the order results should be returned.
    pub caseloads: Vec<String>,

    /// Roles used to discover the staff population to operate on.
    pub roles_to_match: BTreeSet<String>,

    /// Roles to grant to every matched staff member. May be empty.
    #[serde(default)]
    pub roles_to_assign: BTreeSet<String>,

    /// Roles to revoke from every matched staff member. May be empty.
    #[serde(default)]
    pub roles_to_remove: BTreeSet<String>,
}

impl RoleMigrationSpec {
    /// Create a specification from its parts.
    pub fn new<C, M, A, R>(caseloads: C, roles_to_match: M, roles_to_assign: A, roles_to_remove: R) -> Self
    where
        C: IntoIterator<Item = String>,
        M: IntoIterator<Item = String>,
        A: IntoIterator<Item = String>,
        R: IntoIterator<Item = String>,
    {
        Self {
            caseloads: caseloads.into_iter().collect(),
            roles_to_match: roles_to_match.into_iter().collect(),
            roles_to_assign: roles_to_assign.into_iter().collect(),
            roles_to_remove: roles_to_remove.into_iter().collect(),
        }
    }

    /// Validate the specification.
    ///
    /// Collects every violation rather than failing on the first, and has no
    /// side effects — valid specifications pass through unchanged.
    pub fn validate(&self) -> MigrationResult<()> {
        let mut violations = Vec::new();

        if self.caseloads.is_empty() {
            violations.push(EMPTY_CASELOADS.to_string());
        }
        if self.roles_to_match.is_empty() {
            violations.push(EMPTY_ROLES_TO_MATCH.to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(MigrationError::InvalidSpec { violations })
        }
    }
}
