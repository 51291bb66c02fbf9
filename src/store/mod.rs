//! Storage seams for the HRMS core.
//!
//! Services talk to persistence only through these traits. Every guarded
//! write (a status transition, a versioned update, a unique insert) is a
//! single atomic operation on the store, so two racing callers can never
//! both win. The [`memory`] module provides `parking_lot`-backed
//! implementations used by the tests and by the binary when no database is
//! configured. The [`postgres`] module persists the same data with `sqlx`.

mod codes;
pub mod memory;
pub mod postgres;

use chrono::NaiveDate;

use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    AttendanceRecord, Employee, LeaveApplication, LeaveBalance, LeaveStatus, PayPeriod,
    PayrollRecord, PayrollStatus,
};

/// Walks up the reporting chain from `manager_id` and fails if it reaches
/// `employee_id`.
///
/// `manager_of` returns the manager of a given employee (`None` at the top
/// of a chain or for unknown codes). The walk is bounded by `limit` steps in
/// case stored data already loops.
pub(crate) fn ensure_no_manager_cycle(
    employee_id: &str,
    manager_id: &str,
    limit: usize,
    mut manager_of: impl FnMut(&str) -> Option<String>,
) -> HrmsResult<()> {
    if manager_id == employee_id {
        return Err(HrmsError::validation(
            "manager_id",
            "an employee cannot manage themselves",
        ));
    }
    let mut current = manager_id.to_string();
    for _ in 0..limit {
        match manager_of(&current) {
            None => return Ok(()),
            Some(next) if next == employee_id => {
                return Err(HrmsError::validation(
                    "manager_id",
                    format!(
                        "{} already reports to {} through {}",
                        manager_id, employee_id, current
                    ),
                ));
            }
            Some(next) => current = next,
        }
    }
    Ok(())
}

pub use codes::{CODE_SUFFIX_LEN, MAX_CODE_ATTEMPTS, random_code, with_unique_code};
pub use memory::{
    InMemoryAttendanceStore, InMemoryEmployeeDirectory, InMemoryLeaveStore, InMemoryPayrollStore,
};
pub use postgres::{
    PgAttendanceStore, PgEmployeeDirectory, PgLeaveStore, PgPayrollStore, PgStore,
};

/// Outcome of a compare-and-set status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome<S> {
    /// The row held the expected status and was replaced.
    Applied,
    /// The row had already moved on; nothing was written.
    Stale {
        /// The status the row actually holds.
        current: S,
    },
}

/// Lookup and maintenance of employees, keyed by display code.
pub trait EmployeeDirectory: Send + Sync {
    /// Returns the employee with the given display code.
    fn get(&self, employee_id: &str) -> HrmsResult<Option<Employee>>;

    /// Returns true if the employee exists and is active.
    fn exists_active(&self, employee_id: &str) -> HrmsResult<bool>;

    /// Inserts a new employee. Fails with a conflict if the display code is taken.
    fn insert(&self, employee: Employee) -> HrmsResult<()>;

    /// Marks an employee terminated and returns the stored row.
    ///
    /// Only the status column is written, so a concurrent manager change is
    /// never undone. Terminating twice is a no-op. Fails with not-found if
    /// absent.
    fn terminate(&self, employee_id: &str) -> HrmsResult<Employee>;

    /// Sets or clears an employee's manager and returns the stored row.
    ///
    /// Existence of both employees and the absence of a reporting cycle are
    /// checked in the same atomic step as the write, so two racing
    /// assignments cannot close a loop between them.
    ///
    /// # Errors
    ///
    /// - `NotFound` if either employee does not exist
    /// - `Validation` on field `manager_id` for a self-reference or a cycle
    fn set_manager(&self, employee_id: &str, manager_id: Option<&str>) -> HrmsResult<Employee>;

    /// Returns every employee ordered by display code.
    fn list(&self) -> HrmsResult<Vec<Employee>>;
}

/// The attendance ledger. At most one record per (employee, date).
pub trait AttendanceStore: Send + Sync {
    /// Returns the record for an employee on a date.
    fn find(&self, employee_id: &str, date: NaiveDate) -> HrmsResult<Option<AttendanceRecord>>;

    /// Returns an employee's records in `[start, end]`, ordered by date.
    fn find_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> HrmsResult<Vec<AttendanceRecord>>;

    /// Inserts a new record. Fails with a conflict if one exists for the
    /// same (employee, date).
    fn insert(&self, record: AttendanceRecord) -> HrmsResult<AttendanceRecord>;

    /// Replaces a record if its `version` still matches the stored one.
    ///
    /// The stored version is bumped. A stale version is a conflict.
    fn update(&self, record: AttendanceRecord) -> HrmsResult<AttendanceRecord>;

    /// Inserts or overwrites the record for (employee, date) unconditionally.
    fn upsert(&self, record: AttendanceRecord) -> HrmsResult<AttendanceRecord>;
}

/// Persistence of leave applications.
pub trait LeaveStore: Send + Sync {
    /// Inserts a new application. Fails with a conflict if the id is taken.
    fn insert(&self, application: LeaveApplication) -> HrmsResult<()>;

    /// Returns the application with the given id.
    fn get(&self, id: &str) -> HrmsResult<Option<LeaveApplication>>;

    /// Replaces the application only if its stored status is `expected`.
    fn transition(
        &self,
        updated: LeaveApplication,
        expected: LeaveStatus,
    ) -> HrmsResult<TransitionOutcome<LeaveStatus>>;

    /// Returns an employee's applications ordered by `created_at`, then id.
    fn list_for_employee(&self, employee_id: &str) -> HrmsResult<Vec<LeaveApplication>>;

    /// Returns all applications with a status, ordered by `created_at`, then id.
    fn list_by_status(&self, status: LeaveStatus) -> HrmsResult<Vec<LeaveApplication>>;

    /// Counts approved applications per leave type, zero-filled.
    fn count_approved_by_type(&self, employee_id: &str) -> HrmsResult<LeaveBalance>;
}

/// Persistence of payroll records. Unique per (employee, pay period).
pub trait PayrollStore: Send + Sync {
    /// Saves a draft for the record's period.
    ///
    /// An existing draft for the same period is overwritten in place, keeping
    /// its id and `created_at`. An existing processed or paid record fails
    /// with an immutable-record error.
    fn save_draft(&self, record: PayrollRecord) -> HrmsResult<PayrollRecord>;

    /// Returns the record with the given id.
    fn get(&self, id: uuid::Uuid) -> HrmsResult<Option<PayrollRecord>>;

    /// Returns the record for an employee's pay period.
    fn find_for_period(
        &self,
        employee_id: &str,
        period: &PayPeriod,
    ) -> HrmsResult<Option<PayrollRecord>>;

    /// Replaces the record only if its stored status is `expected`.
    fn transition(
        &self,
        updated: PayrollRecord,
        expected: PayrollStatus,
    ) -> HrmsResult<TransitionOutcome<PayrollStatus>>;

    /// Returns an employee's records, newest pay period first.
    fn list_for_employee(&self, employee_id: &str) -> HrmsResult<Vec<PayrollRecord>>;
}
