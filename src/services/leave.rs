//! The leave-request workflow.
//!
//! Applications start `pending` and are decided exactly once. Every decision
//! is a compare-and-set on the store, so of two racing approve/reject calls
//! only one succeeds and the other sees an invalid-state error.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::error::{HrmsError, HrmsResult};
use crate::models::{LeaveApplication, LeaveBalance, LeaveStatus, LeaveType, inclusive_day_count};
use crate::store::{EmployeeDirectory, LeaveStore, TransitionOutcome, with_unique_code};

use super::notification::leave_decision_notice;
use super::{Actor, Notifier};

/// Input for a new leave application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequest {
    /// Display code of the applicant.
    pub employee_id: String,
    /// Kind of leave.
    pub leave_type: LeaveType,
    /// First day (inclusive).
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
    /// Stated reason.
    pub reason: String,
}

/// Applies for, decides and reports on leave.
#[derive(Clone)]
pub struct LeaveWorkflow {
    leaves: Arc<dyn LeaveStore>,
    directory: Arc<dyn EmployeeDirectory>,
    notifier: Arc<dyn Notifier>,
}

impl LeaveWorkflow {
    /// Creates the workflow over its store and collaborators.
    pub fn new(
        leaves: Arc<dyn LeaveStore>,
        directory: Arc<dyn EmployeeDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            leaves,
            directory,
            notifier,
        }
    }

    /// Submits a new application in `pending`.
    ///
    /// `days_requested` is the inclusive calendar-day count; weekends are not
    /// excluded.
    ///
    /// # Errors
    ///
    /// - `Validation` if `end_date < start_date` or the employee is not active
    /// - `NotFound` if the employee is unknown
    /// - `Forbidden` if a non-HR actor applies for someone else
    pub fn apply(&self, actor: &Actor, request: LeaveRequest) -> HrmsResult<LeaveApplication> {
        actor.require_self_or_hr(&request.employee_id, "apply for leave for another employee")?;

        if request.end_date < request.start_date {
            return Err(HrmsError::validation(
                "end_date",
                "End date must be on or after start date",
            ));
        }

        let employee = self
            .directory
            .get(&request.employee_id)?
            .ok_or_else(|| HrmsError::not_found("employee", &request.employee_id))?;
        if !employee.is_active() {
            return Err(HrmsError::validation(
                "employee_id",
                format!("{} is {} and cannot apply for leave", employee.employee_id, employee.status),
            ));
        }

        let days_requested = u32::try_from(inclusive_day_count(request.start_date, request.end_date))
            .map_err(|_| HrmsError::validation("end_date", "leave range is too long"))?;

        let application = with_unique_code("LVE", |code| {
            let application = LeaveApplication {
                id: code,
                employee_id: request.employee_id.clone(),
                leave_type: request.leave_type,
                start_date: request.start_date,
                end_date: request.end_date,
                days_requested,
                reason: request.reason.clone(),
                status: LeaveStatus::Pending,
                approved_by: None,
                approved_at: None,
                comments: None,
                created_at: Utc::now(),
            };
            self.leaves.insert(application.clone())?;
            Ok(application)
        })?;

        info!(
            application_id = %application.id,
            employee_id = %application.employee_id,
            leave_type = %application.leave_type,
            days_requested = application.days_requested,
            "Leave application submitted"
        );
        Ok(application)
    }

    /// Approves a pending application.
    ///
    /// Allowed for HR roles and for the applicant's direct manager.
    pub fn approve(&self, actor: &Actor, application_id: &str) -> HrmsResult<LeaveApplication> {
        self.decide(actor, application_id, LeaveStatus::Approved, None)
    }

    /// Rejects a pending application, recording `reason` as the comments.
    pub fn reject(
        &self,
        actor: &Actor,
        application_id: &str,
        reason: &str,
    ) -> HrmsResult<LeaveApplication> {
        self.decide(
            actor,
            application_id,
            LeaveStatus::Rejected,
            Some(reason.to_string()),
        )
    }

    fn decide(
        &self,
        actor: &Actor,
        application_id: &str,
        decision: LeaveStatus,
        comments: Option<String>,
    ) -> HrmsResult<LeaveApplication> {
        let verb = match decision {
            LeaveStatus::Approved => "approve",
            _ => "reject",
        };
        let application = self.load(application_id)?;
        let applicant = self.directory.get(&application.employee_id)?;
        let is_manager = applicant
            .as_ref()
            .and_then(|employee| employee.manager_id.as_deref())
            .is_some_and(|manager_id| actor.is(manager_id));
        if !(actor.is_hr() || is_manager) {
            warn!(
                application_id = %application_id,
                actor = %actor.employee_id,
                "Leave decision refused"
            );
            return Err(actor.forbidden(&format!("{} leave", verb)));
        }

        let mut updated = application.clone();
        updated.status = decision;
        updated.approved_by = Some(actor.employee_id.clone());
        updated.approved_at = Some(Utc::now());
        updated.comments = comments;
        self.commit(application.status, updated.clone(), verb)?;

        info!(
            application_id = %application_id,
            decision = %decision,
            decided_by = %actor.employee_id,
            "Leave application decided"
        );

        if let Some(notice) = applicant
            .as_ref()
            .and_then(|employee| leave_decision_notice(employee, &updated))
        {
            self.notifier.notify(notice);
        }
        Ok(updated)
    }

    /// Withdraws a pending application.
    ///
    /// Allowed for the applicant and for HR roles. Only pending applications
    /// can be cancelled.
    pub fn cancel(&self, actor: &Actor, application_id: &str) -> HrmsResult<LeaveApplication> {
        let application = self.load(application_id)?;
        actor.require_self_or_hr(&application.employee_id, "cancel another employee's leave")?;

        let loaded = application.status;
        let mut updated = application;
        updated.status = LeaveStatus::Cancelled;
        self.commit(loaded, updated.clone(), "cancel")?;

        info!(
            application_id = %application_id,
            cancelled_by = %actor.employee_id,
            "Leave application cancelled"
        );
        Ok(updated)
    }

    /// Writes a decided application if it is still in the `loaded` status.
    ///
    /// A transition the loaded status does not permit fails without touching
    /// the store; otherwise the store's compare-and-set decides races.
    fn commit(&self, loaded: LeaveStatus, updated: LeaveApplication, verb: &str) -> HrmsResult<()> {
        let id = updated.id.clone();
        let invalid = |current: LeaveStatus| HrmsError::InvalidState {
            entity: "leave application".to_string(),
            id: id.clone(),
            current: current.to_string(),
            attempted: verb.to_string(),
        };
        if !loaded.can_transition_to(updated.status) {
            return Err(invalid(loaded));
        }
        match self.leaves.transition(updated, loaded)? {
            TransitionOutcome::Applied => Ok(()),
            TransitionOutcome::Stale { current } => Err(invalid(current)),
        }
    }

    fn load(&self, application_id: &str) -> HrmsResult<LeaveApplication> {
        self.leaves
            .get(application_id)?
            .ok_or_else(|| HrmsError::not_found("leave application", application_id))
    }

    /// Returns one application, visible to the applicant, their manager and HR.
    pub fn get(&self, actor: &Actor, application_id: &str) -> HrmsResult<LeaveApplication> {
        let application = self.load(application_id)?;
        if actor.is(&application.employee_id) || actor.is_hr() {
            return Ok(application);
        }
        let is_manager = self
            .directory
            .get(&application.employee_id)?
            .and_then(|employee| employee.manager_id)
            .is_some_and(|manager_id| actor.is(&manager_id));
        if is_manager {
            Ok(application)
        } else {
            Err(actor.forbidden("view another employee's leave"))
        }
    }

    /// Counts approved applications per leave type, every type present.
    pub fn balance(&self, actor: &Actor, employee_id: &str) -> HrmsResult<LeaveBalance> {
        actor.require_self_or_hr(employee_id, "view another employee's leave balance")?;
        self.ensure_employee(employee_id)?;
        self.leaves.count_approved_by_type(employee_id)
    }

    /// Returns an employee's applications, oldest first.
    pub fn employee_applications(
        &self,
        actor: &Actor,
        employee_id: &str,
    ) -> HrmsResult<Vec<LeaveApplication>> {
        actor.require_self_or_hr(employee_id, "view another employee's leave")?;
        self.ensure_employee(employee_id)?;
        self.leaves.list_for_employee(employee_id)
    }

    /// Returns every pending application, oldest first. HR only.
    pub fn pending(&self, actor: &Actor) -> HrmsResult<Vec<LeaveApplication>> {
        actor.require_hr("list pending leave")?;
        self.leaves.list_by_status(LeaveStatus::Pending)
    }

    fn ensure_employee(&self, employee_id: &str) -> HrmsResult<()> {
        match self.directory.get(employee_id)? {
            Some(_) => Ok(()),
            None => Err(HrmsError::not_found("employee", employee_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::services::fixtures::{self, hr, make_date, manager, staff};
    use crate::services::notification::testing::RecordingNotifier;
    use crate::store::InMemoryLeaveStore;
    use proptest::prelude::*;
    use std::thread;

    struct Harness {
        workflow: LeaveWorkflow,
        notifier: Arc<RecordingNotifier>,
    }

    fn create_harness() -> Harness {
        let notifier = Arc::new(RecordingNotifier::default());
        let workflow = LeaveWorkflow::new(
            Arc::new(InMemoryLeaveStore::new()),
            fixtures::directory(),
            notifier.clone(),
        );
        Harness { workflow, notifier }
    }

    fn vacation(employee_id: &str, start: &str, end: &str) -> LeaveRequest {
        LeaveRequest {
            employee_id: employee_id.to_string(),
            leave_type: LeaveType::Vacation,
            start_date: make_date(start),
            end_date: make_date(end),
            reason: "Family trip".to_string(),
        }
    }

    /// LV-001: a working week of vacation
    #[test]
    fn test_apply_creates_pending_application() {
        let harness = create_harness();
        let application = harness
            .workflow
            .apply(&staff(), vacation("EMP000001", "2024-06-10", "2024-06-14"))
            .unwrap();

        assert_eq!(application.status, LeaveStatus::Pending);
        assert_eq!(application.days_requested, 5);
        assert!(application.id.starts_with("LVE"));
        assert!(application.approved_by.is_none());
    }

    #[test]
    fn test_apply_counts_weekend_days() {
        let harness = create_harness();
        // Friday to Monday
        let application = harness
            .workflow
            .apply(&staff(), vacation("EMP000001", "2024-06-14", "2024-06-17"))
            .unwrap();
        assert_eq!(application.days_requested, 4);
    }

    #[test]
    fn test_apply_rejects_reversed_range() {
        let harness = create_harness();
        let result = harness
            .workflow
            .apply(&staff(), vacation("EMP000001", "2024-06-14", "2024-06-10"));
        match result {
            Err(HrmsError::Validation { field, .. }) => assert_eq!(field, "end_date"),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_apply_for_unknown_or_inactive_employee() {
        let harness = create_harness();
        assert!(matches!(
            harness
                .workflow
                .apply(&hr(), vacation("EMP999999", "2024-06-10", "2024-06-10")),
            Err(HrmsError::NotFound { .. })
        ));
        assert!(matches!(
            harness
                .workflow
                .apply(&hr(), vacation("EMP000010", "2024-06-10", "2024-06-10")),
            Err(HrmsError::Validation { .. })
        ));
    }

    #[test]
    fn test_apply_for_someone_else_requires_hr() {
        let harness = create_harness();
        let result = harness
            .workflow
            .apply(&staff(), vacation("EMP000002", "2024-06-10", "2024-06-10"));
        assert!(matches!(result, Err(HrmsError::Forbidden { .. })));
    }

    #[test]
    fn test_hr_approves_and_employee_is_notified() {
        let harness = create_harness();
        let application = harness
            .workflow
            .apply(&staff(), vacation("EMP000001", "2024-06-10", "2024-06-14"))
            .unwrap();

        let approved = harness.workflow.approve(&hr(), &application.id).unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("EMP000009"));
        assert!(approved.approved_at.is_some());

        let sent = harness.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "emp000001@example.com");
        assert_eq!(sent[0].subject, "Leave Request Approved");
    }

    #[test]
    fn test_direct_manager_may_decide() {
        let harness = create_harness();
        let application = harness
            .workflow
            .apply(&staff(), vacation("EMP000001", "2024-06-10", "2024-06-11"))
            .unwrap();

        let rejected = harness
            .workflow
            .reject(&manager(), &application.id, "Quarter end")
            .unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
        assert_eq!(rejected.comments.as_deref(), Some("Quarter end"));
    }

    #[test]
    fn test_other_employees_may_not_decide() {
        let harness = create_harness();
        let application = harness
            .workflow
            .apply(&hr(), vacation("EMP000002", "2024-06-10", "2024-06-11"))
            .unwrap();

        // EMP000001 does not manage EMP000002
        let result = harness.workflow.approve(&staff(), &application.id);
        assert!(matches!(result, Err(HrmsError::Forbidden { .. })));

        let sales = Actor::new("EMP000002", Role::SalesManager);
        assert!(harness.workflow.approve(&sales, &application.id).is_err());
        assert!(harness.notifier.sent().is_empty());
    }

    #[test]
    fn test_decided_application_cannot_be_decided_again() {
        let harness = create_harness();
        let application = harness
            .workflow
            .apply(&staff(), vacation("EMP000001", "2024-06-10", "2024-06-14"))
            .unwrap();
        harness.workflow.approve(&hr(), &application.id).unwrap();

        match harness.workflow.reject(&hr(), &application.id, "Too late") {
            Err(HrmsError::InvalidState {
                current, attempted, ..
            }) => {
                assert_eq!(current, "approved");
                assert_eq!(attempted, "reject");
            }
            other => panic!("Expected InvalidState, got {:?}", other),
        }
        // The stored application is unchanged
        let stored = harness.workflow.get(&hr(), &application.id).unwrap();
        assert_eq!(stored.status, LeaveStatus::Approved);
        assert!(stored.comments.is_none());
    }

    #[test]
    fn test_approve_unknown_application() {
        let harness = create_harness();
        assert!(matches!(
            harness.workflow.approve(&hr(), "LVE404404"),
            Err(HrmsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_cancel_only_while_pending() {
        let harness = create_harness();
        let pending = harness
            .workflow
            .apply(&staff(), vacation("EMP000001", "2024-06-10", "2024-06-10"))
            .unwrap();
        let cancelled = harness.workflow.cancel(&staff(), &pending.id).unwrap();
        assert_eq!(cancelled.status, LeaveStatus::Cancelled);

        let approved = harness
            .workflow
            .apply(&staff(), vacation("EMP000001", "2024-07-01", "2024-07-02"))
            .unwrap();
        harness.workflow.approve(&hr(), &approved.id).unwrap();
        assert!(matches!(
            harness.workflow.cancel(&staff(), &approved.id),
            Err(HrmsError::InvalidState { .. })
        ));
    }

    /// Counts compare-and-set attempts reaching the store.
    #[derive(Default)]
    struct CountingLeaveStore {
        inner: InMemoryLeaveStore,
        transitions: std::sync::atomic::AtomicUsize,
    }

    impl LeaveStore for CountingLeaveStore {
        fn insert(&self, application: LeaveApplication) -> HrmsResult<()> {
            self.inner.insert(application)
        }

        fn get(&self, id: &str) -> HrmsResult<Option<LeaveApplication>> {
            self.inner.get(id)
        }

        fn transition(
            &self,
            updated: LeaveApplication,
            expected: LeaveStatus,
        ) -> HrmsResult<TransitionOutcome<LeaveStatus>> {
            self.transitions
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.transition(updated, expected)
        }

        fn list_for_employee(&self, employee_id: &str) -> HrmsResult<Vec<LeaveApplication>> {
            self.inner.list_for_employee(employee_id)
        }

        fn list_by_status(&self, status: LeaveStatus) -> HrmsResult<Vec<LeaveApplication>> {
            self.inner.list_by_status(status)
        }

        fn count_approved_by_type(&self, employee_id: &str) -> HrmsResult<LeaveBalance> {
            self.inner.count_approved_by_type(employee_id)
        }
    }

    #[test]
    fn test_decided_application_is_refused_before_the_store() {
        let store = Arc::new(CountingLeaveStore::default());
        let workflow = LeaveWorkflow::new(
            store.clone(),
            fixtures::directory(),
            Arc::new(RecordingNotifier::default()),
        );
        let application = workflow
            .apply(&staff(), vacation("EMP000001", "2024-06-10", "2024-06-11"))
            .unwrap();
        workflow.approve(&hr(), &application.id).unwrap();
        assert_eq!(store.transitions.load(std::sync::atomic::Ordering::SeqCst), 1);

        match workflow.cancel(&staff(), &application.id) {
            Err(HrmsError::InvalidState { current, attempted, .. }) => {
                assert_eq!(current, "approved");
                assert_eq!(attempted, "cancel");
            }
            other => panic!("Expected InvalidState, got {:?}", other),
        }
        assert!(workflow.reject(&hr(), &application.id, "Too late").is_err());
        assert_eq!(store.transitions.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_by_someone_else_is_forbidden() {
        let harness = create_harness();
        let application = harness
            .workflow
            .apply(&staff(), vacation("EMP000001", "2024-06-10", "2024-06-10"))
            .unwrap();
        assert!(matches!(
            harness.workflow.cancel(&manager(), &application.id),
            Err(HrmsError::Forbidden { .. })
        ));
        assert!(harness.workflow.cancel(&hr(), &application.id).is_ok());
    }

    #[test]
    fn test_balance_counts_approved_applications() {
        let harness = create_harness();
        for (start, end) in [("2024-06-10", "2024-06-14"), ("2024-07-01", "2024-07-01")] {
            let application = harness
                .workflow
                .apply(&staff(), vacation("EMP000001", start, end))
                .unwrap();
            harness.workflow.approve(&hr(), &application.id).unwrap();
        }
        harness
            .workflow
            .apply(&staff(), vacation("EMP000001", "2024-08-01", "2024-08-01"))
            .unwrap();

        let balance = harness.workflow.balance(&staff(), "EMP000001").unwrap();
        assert_eq!(balance.len(), LeaveType::ALL.len());
        // A count of applications, not of days
        assert_eq!(balance[&LeaveType::Vacation], 2);
        assert_eq!(balance[&LeaveType::Sick], 0);
    }

    #[test]
    fn test_balance_for_unknown_employee() {
        let harness = create_harness();
        assert!(matches!(
            harness.workflow.balance(&hr(), "EMP999999"),
            Err(HrmsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_pending_list_is_hr_only_and_ordered() {
        let harness = create_harness();
        let first = harness
            .workflow
            .apply(&staff(), vacation("EMP000001", "2024-06-10", "2024-06-10"))
            .unwrap();
        let second = harness
            .workflow
            .apply(&manager(), vacation("EMP000002", "2024-06-11", "2024-06-11"))
            .unwrap();

        let pending = harness.workflow.pending(&hr()).unwrap();
        let ids: Vec<&str> = pending.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&first.id.as_str()));
        assert!(ids.contains(&second.id.as_str()));
        assert!(pending[0].created_at <= pending[1].created_at);

        assert!(harness.workflow.pending(&staff()).is_err());
    }

    #[test]
    fn test_manager_can_view_report_application() {
        let harness = create_harness();
        let application = harness
            .workflow
            .apply(&staff(), vacation("EMP000001", "2024-06-10", "2024-06-10"))
            .unwrap();
        assert!(harness.workflow.get(&manager(), &application.id).is_ok());

        let stranger = Actor::new("EMP000010", Role::Employee);
        assert!(harness.workflow.get(&stranger, &application.id).is_err());
    }

    #[test]
    fn test_concurrent_approve_and_reject_have_one_winner() {
        let harness = create_harness();
        let application = harness
            .workflow
            .apply(&staff(), vacation("EMP000001", "2024-06-10", "2024-06-14"))
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let workflow = harness.workflow.clone();
                let id = application.id.clone();
                thread::spawn(move || {
                    if i % 2 == 0 {
                        workflow.approve(&hr(), &id)
                    } else {
                        workflow.reject(&manager(), &id, "No cover")
                    }
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, HrmsError::InvalidState { .. }))
        );
        assert_eq!(harness.notifier.sent().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_days_requested_is_inclusive_count(offset in 0i64..400, length in 0i64..60) {
            let harness = create_harness();
            let start = make_date("2024-01-01") + chrono::Duration::days(offset);
            let end = start + chrono::Duration::days(length);
            let request = LeaveRequest {
                employee_id: "EMP000001".to_string(),
                leave_type: LeaveType::Sick,
                start_date: start,
                end_date: end,
                reason: String::new(),
            };
            let application = harness.workflow.apply(&staff(), request).unwrap();
            prop_assert_eq!(i64::from(application.days_requested), length + 1);
        }
    }
}
