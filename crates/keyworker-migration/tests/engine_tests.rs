//! Reconciliation engine tests against an in-memory Role Gateway fake.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use keyworker_migration::{MigrationEngine, MigrationError, RoleMigrationSpec};
use keyworker_rbac::{RbacError, RbacResult, RoleGateway, StaffId};

/// In-memory Role Gateway with a scriptable role table and failure modes.
#[derive(Default)]
struct InMemoryRoleGateway {
    /// (caseload, role_code) -> staff currently holding the role.
    roles: Mutex<HashMap<(String, String), HashSet<StaffId>>>,
    /// (caseload, role_code) pairs whose find queries fail.
    failing_find: HashSet<(String, String)>,
    /// Staff whose assign calls always fail.
    failing_assign_staff: HashSet<StaffId>,
    /// (caseload, role_code) pairs whose remove calls hard-fail.
    failing_remove: HashSet<(String, String)>,
    /// Reject assignment of an already-held role instead of succeeding.
    reject_duplicate_assign: bool,
    /// Cancel this token from inside the Nth assign call, simulating a
    /// caller-initiated cancellation arriving while a call is in flight.
    cancel_during_assign: Option<(usize, CancellationToken)>,
    find_calls: AtomicUsize,
    assign_calls: AtomicUsize,
    remove_calls: AtomicUsize,
}

impl InMemoryRoleGateway {
    fn grant(&self, caseload: &str, role_code: &str, staff: &[i64]) {
        let mut roles = self.roles.lock().unwrap();
        roles
            .entry((caseload.to_string(), role_code.to_string()))
            .or_default()
            .extend(staff.iter().copied().map(StaffId::new));
    }

    fn holds(&self, caseload: &str, role_code: &str, staff_id: i64) -> bool {
        let roles = self.roles.lock().unwrap();
        roles
            .get(&(caseload.to_string(), role_code.to_string()))
            .is_some_and(|s| s.contains(&StaffId::new(staff_id)))
    }

    fn total_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
            + self.assign_calls.load(Ordering::SeqCst)
            + self.remove_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleGateway for InMemoryRoleGateway {
    async fn find_staff_matching_caseload_and_role(
        &self,
        caseload: &str,
        role_code: &str,
    ) -> RbacResult<HashSet<StaffId>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let key = (caseload.to_string(), role_code.to_string());
        if self.failing_find.contains(&key) {
            return Err(RbacError::network("find unavailable"));
        }
        let roles = self.roles.lock().unwrap();
        Ok(roles.get(&key).cloned().unwrap_or_default())
    }

    async fn assign_role(
        &self,
        staff_id: StaffId,
        caseload: &str,
        role_code: &str,
    ) -> RbacResult<()> {
        let call_number = self.assign_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((cancel_on, token)) = &self.cancel_during_assign {
            if call_number == *cancel_on {
                token.cancel();
            }
        }
        if self.failing_assign_staff.contains(&staff_id) {
            return Err(RbacError::RemoteApi {
                status: 500,
                message: "assign rejected".to_string(),
            });
        }
        let mut roles = self.roles.lock().unwrap();
        let holders = roles
            .entry((caseload.to_string(), role_code.to_string()))
            .or_default();
        if self.reject_duplicate_assign && holders.contains(&staff_id) {
            return Err(RbacError::RemoteApi {
                status: 409,
                message: "role already assigned".to_string(),
            });
        }
        holders.insert(staff_id);
        Ok(())
    }

    async fn remove_role(
        &self,
        staff_id: StaffId,
        caseload: &str,
        role_code: &str,
    ) -> RbacResult<()> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        let key = (caseload.to_string(), role_code.to_string());
        if self.failing_remove.contains(&key) {
            return Err(RbacError::RemoteApi {
                status: 500,
                message: "remove rejected".to_string(),
            });
        }
        let mut roles = self.roles.lock().unwrap();
        let held = roles.get_mut(&key).is_some_and(|s| s.remove(&staff_id));
        if held {
            Ok(())
        } else {
            Err(RbacError::RoleNotHeld {
                staff_id,
                caseload: caseload.to_string(),
                role_code: role_code.to_string(),
            })
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn engine(gateway: &Arc<InMemoryRoleGateway>) -> MigrationEngine {
    MigrationEngine::new(Arc::clone(gateway) as Arc<dyn RoleGateway>)
}

#[tokio::test]
async fn test_invalid_spec_rejected_before_any_gateway_call() {
    let gateway = Arc::new(InMemoryRoleGateway::default());
    let spec = RoleMigrationSpec::new(strings(&[]), strings(&[]), strings(&[]), strings(&[]));

    let err = engine(&gateway).migrate(&spec).await.unwrap_err();

    assert!(matches!(err, MigrationError::InvalidSpec { .. }));
    assert_eq!(err.violations().len(), 2);
    assert_eq!(gateway.total_calls(), 0);
}

#[tokio::test]
async fn test_matched_users_deduplicated_across_roles() {
    let gateway = Arc::new(InMemoryRoleGateway::default());
    // Staff 2 holds both match roles; must be counted once.
    gateway.grant("MDI", "100", &[1, 2]);
    gateway.grant("MDI", "200", &[2, 3]);

    let spec = RoleMigrationSpec::new(
        strings(&["MDI"]),
        strings(&["100", "200"]),
        strings(&[]),
        strings(&[]),
    );

    let stats = engine(&gateway).migrate(&spec).await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].num_matched_users, 3);
    assert_eq!(stats[0].num_assign_succeeded + stats[0].num_assign_failed, 0);
}

#[tokio::test]
async fn test_assign_attempts_partition_into_succeeded_and_failed() {
    let mut gateway = InMemoryRoleGateway::default();
    gateway.failing_assign_staff.insert(StaffId::new(2));
    let gateway = Arc::new(gateway);
    gateway.grant("MDI", "100", &[1, 2, 3]);

    let spec = RoleMigrationSpec::new(
        strings(&["MDI"]),
        strings(&["100"]),
        strings(&["P", "Q"]),
        strings(&[]),
    );

    let stats = engine(&gateway).migrate(&spec).await.unwrap();
    let s = &stats[0];

    // 3 matched staff x 2 assign roles = 6 attempts, staff 2 fails both.
    assert_eq!(s.num_assign_succeeded + s.num_assign_failed, 6);
    assert_eq!(s.num_assign_failed, 2);
    assert!(gateway.holds("MDI", "P", 1));
    assert!(gateway.holds("MDI", "Q", 3));
    assert!(!gateway.holds("MDI", "P", 2));
}

#[tokio::test]
async fn test_removal_attempts_classified_three_ways() {
    let mut gateway = InMemoryRoleGateway::default();
    gateway
        .failing_remove
        .insert(("MDI".to_string(), "Y".to_string()));
    let gateway = Arc::new(gateway);
    gateway.grant("MDI", "100", &[1, 2]);
    // Only staff 1 actually holds removal target X.
    gateway.grant("MDI", "X", &[1]);

    let spec = RoleMigrationSpec::new(
        strings(&["MDI"]),
        strings(&["100"]),
        strings(&[]),
        strings(&["X", "Y"]),
    );

    let stats = engine(&gateway).migrate(&spec).await.unwrap();
    let s = &stats[0];

    // 2 matched staff x 2 removal roles = 4 attempts.
    assert_eq!(
        s.num_unassign_succeeded + s.num_unassign_ignored + s.num_unassign_failed,
        4
    );
    assert_eq!(s.num_unassign_succeeded, 1); // staff 1 held X
    assert_eq!(s.num_unassign_ignored, 1); // staff 2 never held X
    assert_eq!(s.num_unassign_failed, 2); // Y removal hard-fails for both
    assert!(!gateway.holds("MDI", "X", 1));
}

#[tokio::test]
async fn test_end_to_end_two_caseloads_ordered() {
    let gateway = Arc::new(InMemoryRoleGateway::default());
    gateway.grant("MDI", "100", &[1, 2]);
    gateway.grant("MDI", "200", &[2, 3]);
    gateway.grant("LEI", "100", &[10]);

    let spec = RoleMigrationSpec::new(
        strings(&["MDI", "LEI"]),
        strings(&["100", "200"]),
        strings(&["P", "Q", "R"]),
        strings(&["X", "Y"]),
    );

    let stats = engine(&gateway).migrate(&spec).await.unwrap();

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].caseload, "MDI");
    assert_eq!(stats[1].caseload, "LEI");

    assert_eq!(stats[0].num_matched_users, 3);
    assert_eq!(stats[0].num_assign_succeeded, 9);
    assert_eq!(stats[0].num_assign_failed, 0);
    // Nobody held X or Y.
    assert_eq!(stats[0].num_unassign_ignored, 6);

    assert_eq!(stats[1].num_matched_users, 1);
    assert_eq!(stats[1].num_assign_succeeded, 3);
    assert_eq!(stats[1].num_unassign_ignored, 2);
}

#[tokio::test]
async fn test_rerun_is_clean_when_gateway_accepts_reassignment() {
    let gateway = Arc::new(InMemoryRoleGateway::default());
    gateway.grant("MDI", "100", &[1]);

    let spec = RoleMigrationSpec::new(
        strings(&["MDI"]),
        strings(&["100"]),
        strings(&["P"]),
        strings(&[]),
    );

    let eng = engine(&gateway);
    let first = eng.migrate(&spec).await.unwrap();
    let second = eng.migrate(&spec).await.unwrap();

    assert_eq!(first[0].num_assign_failed, 0);
    assert_eq!(second[0].num_assign_failed, 0);
    assert_eq!(second[0].num_assign_succeeded, 1);
}

#[tokio::test]
async fn test_rerun_counts_duplicate_rejection_as_failure() {
    let mut gateway = InMemoryRoleGateway::default();
    gateway.reject_duplicate_assign = true;
    let gateway = Arc::new(gateway);
    gateway.grant("MDI", "100", &[1]);

    let spec = RoleMigrationSpec::new(
        strings(&["MDI"]),
        strings(&["100"]),
        strings(&["P"]),
        strings(&[]),
    );

    let eng = engine(&gateway);
    let first = eng.migrate(&spec).await.unwrap();
    assert_eq!(first[0].num_assign_succeeded, 1);

    // Second pass: the gateway rejects the duplicate; that surfaces as a
    // failure count, never a crash.
    let second = eng.migrate(&spec).await.unwrap();
    assert_eq!(second[0].num_assign_succeeded, 0);
    assert_eq!(second[0].num_assign_failed, 1);
}

#[tokio::test]
async fn test_match_failure_degrades_one_role_not_the_caseload() {
    let mut gateway = InMemoryRoleGateway::default();
    gateway
        .failing_find
        .insert(("MDI".to_string(), "100".to_string()));
    let gateway = Arc::new(gateway);
    gateway.grant("MDI", "100", &[1]); // unreachable through the failing find
    gateway.grant("MDI", "200", &[2]);

    let spec = RoleMigrationSpec::new(
        strings(&["MDI"]),
        strings(&["100", "200"]),
        strings(&["P"]),
        strings(&[]),
    );

    let stats = engine(&gateway).migrate(&spec).await.unwrap();
    assert_eq!(stats[0].num_matched_users, 1);
    assert_eq!(stats[0].num_assign_succeeded, 1);
}

#[tokio::test]
async fn test_match_failure_in_one_caseload_does_not_block_others() {
    let mut gateway = InMemoryRoleGateway::default();
    gateway
        .failing_find
        .insert(("MDI".to_string(), "100".to_string()));
    let gateway = Arc::new(gateway);
    gateway.grant("LEI", "100", &[10, 11]);

    let spec = RoleMigrationSpec::new(
        strings(&["MDI", "LEI"]),
        strings(&["100"]),
        strings(&["P"]),
        strings(&[]),
    );

    let stats = engine(&gateway).migrate(&spec).await.unwrap();

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].caseload, "MDI");
    assert_eq!(stats[0].num_matched_users, 0);
    assert_eq!(stats[0].num_assign_succeeded + stats[0].num_assign_failed, 0);
    assert_eq!(stats[1].caseload, "LEI");
    assert_eq!(stats[1].num_matched_users, 2);
    assert_eq!(stats[1].num_assign_succeeded, 2);
}

#[tokio::test]
async fn test_mid_run_cancellation_counts_in_flight_call_then_stops() {
    let cancel = CancellationToken::new();
    let mut gateway = InMemoryRoleGateway::default();
    // The second assign call fires the cancellation while it is in flight.
    gateway.cancel_during_assign = Some((2, cancel.clone()));
    let gateway = Arc::new(gateway);
    gateway.grant("MDI", "100", &[1, 2, 3]);

    let spec = RoleMigrationSpec::new(
        strings(&["MDI"]),
        strings(&["100"]),
        strings(&["P", "Q"]),
        strings(&["X"]),
    );

    let stats = engine(&gateway)
        .migrate_with_cancel(&spec, &cancel)
        .await
        .unwrap();
    let s = &stats[0];

    // The match phase completed before cancellation.
    assert_eq!(s.num_matched_users, 3);

    // Exactly two assign calls were issued; the in-flight one completed and
    // is counted, and the conservation invariant holds for the attempts
    // actually made.
    assert_eq!(gateway.assign_calls.load(Ordering::SeqCst), 2);
    assert_eq!(s.num_assign_succeeded + s.num_assign_failed, 2);
    assert_eq!(s.num_assign_succeeded, 2);

    // No further gateway calls after cancellation: the removal phase never
    // starts despite a non-empty roles-to-remove set.
    assert_eq!(gateway.remove_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        s.num_unassign_succeeded + s.num_unassign_ignored + s.num_unassign_failed,
        0
    );
}

#[tokio::test]
async fn test_cancelled_token_issues_no_gateway_calls() {
    let gateway = Arc::new(InMemoryRoleGateway::default());
    gateway.grant("MDI", "100", &[1, 2]);

    let spec = RoleMigrationSpec::new(
        strings(&["MDI"]),
        strings(&["100"]),
        strings(&["P"]),
        strings(&["X"]),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();

    let stats = engine(&gateway)
        .migrate_with_cancel(&spec, &cancel)
        .await
        .unwrap();

    // A complete (all-zero) record is still returned per caseload.
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].num_matched_users, 0);
    assert_eq!(gateway.total_calls(), 0);
}
