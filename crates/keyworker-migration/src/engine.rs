//! Reconciliation engine orchestrator.
//!
//! Applies a [`RoleMigrationSpec`] caseload-by-caseload against the Role
//! Gateway, isolating failures at the level of an individual (staff, role)
//! operation so one failure never aborts the batch.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use keyworker_rbac::{RbacError, RoleGateway, StaffId};

use crate::error::MigrationResult;
use crate::spec::RoleMigrationSpec;
use crate::statistics::{CaseloadStats, RemovalOutcome};

/// Stateless orchestrator for role migrations.
///
/// Holds nothing but a shared gateway handle; every invocation of
/// [`migrate`](MigrationEngine::migrate) is independent.
pub struct MigrationEngine {
    gateway: Arc<dyn RoleGateway>,
}

impl MigrationEngine {
    /// Create an engine over a Role Gateway.
    pub fn new(gateway: Arc<dyn RoleGateway>) -> Self {
        Self { gateway }
    }

    /// Run a migration to completion.
    ///
    /// Returns one [`CaseloadStats`] per caseload, in the input caseload
    /// order. Fails only on an invalid specification, before any gateway
    /// call; per-operation failures are visible solely through the counters.
    pub async fn migrate(&self, spec: &RoleMigrationSpec) -> MigrationResult<Vec<CaseloadStats>> {
        self.migrate_with_cancel(spec, &CancellationToken::new())
            .await
    }

    /// Run a migration with caller-initiated cancellation.
    ///
    /// Once `cancel` fires, no new gateway calls are issued; calls already in
    /// flight complete and are counted, and the statistics accumulated so far
    /// are returned for every caseload.
    pub async fn migrate_with_cancel(
        &self,
        spec: &RoleMigrationSpec,
        cancel: &CancellationToken,
    ) -> MigrationResult<Vec<CaseloadStats>> {
        spec.validate()?;

        info!(
            caseloads = spec.caseloads.len(),
            roles_to_match = spec.roles_to_match.len(),
            roles_to_assign = spec.roles_to_assign.len(),
            roles_to_remove = spec.roles_to_remove.len(),
            "Starting role migration"
        );

        // Caseloads are independent; each future owns its accumulator
        // exclusively and join_all preserves the input ordering.
        let results = join_all(
            spec.caseloads
                .iter()
                .map(|caseload| self.process_caseload(caseload, spec, cancel)),
        )
        .await;

        Ok(results)
    }

    /// Match, assign, then remove for one caseload.
    async fn process_caseload(
        &self,
        caseload: &str,
        spec: &RoleMigrationSpec,
        cancel: &CancellationToken,
    ) -> CaseloadStats {
        let mut stats = CaseloadStats::new(caseload);

        let matched = self
            .match_staff(caseload, &spec.roles_to_match, cancel)
            .await;
        stats.num_matched_users = matched.len() as u32;

        'assign: for staff_id in &matched {
            for role_code in &spec.roles_to_assign {
                if cancel.is_cancelled() {
                    break 'assign;
                }
                match self.gateway.assign_role(*staff_id, caseload, role_code).await {
                    Ok(()) => stats.record_assign(true),
                    Err(e) => {
                        debug!(
                            caseload = %caseload,
                            staff_id = %staff_id,
                            role_code = %role_code,
                            error = %e,
                            "Role assignment failed"
                        );
                        stats.record_assign(false);
                    }
                }
            }
        }

        'remove: for staff_id in &matched {
            for role_code in &spec.roles_to_remove {
                if cancel.is_cancelled() {
                    break 'remove;
                }
                let outcome =
                    match self.gateway.remove_role(*staff_id, caseload, role_code).await {
                        Ok(()) => RemovalOutcome::Succeeded,
                        Err(RbacError::RoleNotHeld { .. }) => RemovalOutcome::Ignored,
                        Err(e) => {
                            debug!(
                                caseload = %caseload,
                                staff_id = %staff_id,
                                role_code = %role_code,
                                error = %e,
                                "Role removal failed"
                            );
                            RemovalOutcome::Failed
                        }
                    };
                stats.record_removal(outcome);
            }
        }

        info!(
            caseload = %caseload,
            num_matched_users = stats.num_matched_users,
            num_assign_succeeded = stats.num_assign_succeeded,
            num_assign_failed = stats.num_assign_failed,
            num_unassign_succeeded = stats.num_unassign_succeeded,
            num_unassign_ignored = stats.num_unassign_ignored,
            num_unassign_failed = stats.num_unassign_failed,
            "Completed caseload reconciliation"
        );

        stats
    }

    /// Union the find results across all match roles, de-duplicated.
    ///
    /// A gateway error for one role degrades that role's contribution rather
    /// than aborting the caseload. The sorted set gives a deterministic
    /// iteration order for the later phases.
    async fn match_staff(
        &self,
        caseload: &str,
        roles_to_match: &BTreeSet<String>,
        cancel: &CancellationToken,
    ) -> BTreeSet<StaffId> {
        let mut matched = BTreeSet::new();

        for role_code in roles_to_match {
            if cancel.is_cancelled() {
                break;
            }
            match self
                .gateway
                .find_staff_matching_caseload_and_role(caseload, role_code)
                .await
            {
                Ok(staff) => matched.extend(staff),
                Err(e) => {
                    warn!(
                        caseload = %caseload,
                        role_code = %role_code,
                        error = %e,
                        "Match query failed; continuing without this role's contribution"
                    );
                }
            }
        }

        matched
    }
}
