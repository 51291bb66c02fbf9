//! In-memory store implementations.
//!
//! Each store keeps its rows behind one `parking_lot::RwLock`; guarded writes
//! hold the write lock for the whole read-check-replace.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    AttendanceRecord, Employee, EmployeeStatus, LeaveApplication, LeaveBalance, LeaveStatus, LeaveType, PayPeriod,
    PayrollRecord, PayrollStatus,
};

use super::{
    AttendanceStore, EmployeeDirectory, LeaveStore, PayrollStore, TransitionOutcome,
    ensure_no_manager_cycle,
};

/// Employee directory held in memory.
#[derive(Debug, Default)]
pub struct InMemoryEmployeeDirectory {
    employees: RwLock<BTreeMap<String, Employee>>,
}

impl InMemoryEmployeeDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory pre-populated with `employees`.
    pub fn with_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        let map = employees
            .into_iter()
            .map(|employee| (employee.employee_id.clone(), employee))
            .collect();
        Self {
            employees: RwLock::new(map),
        }
    }
}

impl EmployeeDirectory for InMemoryEmployeeDirectory {
    fn get(&self, employee_id: &str) -> HrmsResult<Option<Employee>> {
        Ok(self.employees.read().get(employee_id).cloned())
    }

    fn exists_active(&self, employee_id: &str) -> HrmsResult<bool> {
        Ok(self
            .employees
            .read()
            .get(employee_id)
            .is_some_and(Employee::is_active))
    }

    fn insert(&self, employee: Employee) -> HrmsResult<()> {
        let mut employees = self.employees.write();
        if employees.contains_key(&employee.employee_id) {
            return Err(HrmsError::Conflict {
                message: format!("employee code {} is already in use", employee.employee_id),
            });
        }
        employees.insert(employee.employee_id.clone(), employee);
        Ok(())
    }

    fn terminate(&self, employee_id: &str) -> HrmsResult<Employee> {
        let mut employees = self.employees.write();
        let employee = employees
            .get_mut(employee_id)
            .ok_or_else(|| HrmsError::not_found("employee", employee_id))?;
        employee.status = EmployeeStatus::Terminated;
        Ok(employee.clone())
    }

    fn set_manager(&self, employee_id: &str, manager_id: Option<&str>) -> HrmsResult<Employee> {
        let mut employees = self.employees.write();
        if !employees.contains_key(employee_id) {
            return Err(HrmsError::not_found("employee", employee_id));
        }
        if let Some(manager_id) = manager_id {
            if !employees.contains_key(manager_id) {
                return Err(HrmsError::not_found("employee", manager_id));
            }
            ensure_no_manager_cycle(employee_id, manager_id, employees.len(), |code| {
                employees
                    .get(code)
                    .and_then(|employee| employee.manager_id.clone())
            })?;
        }

        let employee = employees
            .get_mut(employee_id)
            .ok_or_else(|| HrmsError::not_found("employee", employee_id))?;
        employee.manager_id = manager_id.map(str::to_string);
        Ok(employee.clone())
    }

    fn list(&self) -> HrmsResult<Vec<Employee>> {
        Ok(self.employees.read().values().cloned().collect())
    }
}

/// Attendance ledger held in memory, keyed by (employee, date).
#[derive(Debug, Default)]
pub struct InMemoryAttendanceStore {
    records: RwLock<BTreeMap<(String, NaiveDate), AttendanceRecord>>,
}

impl InMemoryAttendanceStore {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttendanceStore for InMemoryAttendanceStore {
    fn find(&self, employee_id: &str, date: NaiveDate) -> HrmsResult<Option<AttendanceRecord>> {
        Ok(self
            .records
            .read()
            .get(&(employee_id.to_string(), date))
            .cloned())
    }

    fn find_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> HrmsResult<Vec<AttendanceRecord>> {
        if end < start {
            return Ok(Vec::new());
        }
        let from = (employee_id.to_string(), start);
        let to = (employee_id.to_string(), end);
        Ok(self
            .records
            .read()
            .range(from..=to)
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn insert(&self, mut record: AttendanceRecord) -> HrmsResult<AttendanceRecord> {
        let mut records = self.records.write();
        let key = (record.employee_id.clone(), record.date);
        if records.contains_key(&key) {
            return Err(HrmsError::Conflict {
                message: format!(
                    "attendance for {} on {} already exists",
                    record.employee_id, record.date
                ),
            });
        }
        record.version = 1;
        records.insert(key, record.clone());
        Ok(record)
    }

    fn update(&self, mut record: AttendanceRecord) -> HrmsResult<AttendanceRecord> {
        let mut records = self.records.write();
        let key = (record.employee_id.clone(), record.date);
        let stored = records.get_mut(&key).ok_or_else(|| {
            HrmsError::not_found(
                "attendance record",
                format!("{} on {}", record.employee_id, record.date),
            )
        })?;
        if stored.version != record.version {
            return Err(HrmsError::Conflict {
                message: format!(
                    "attendance for {} on {} was modified concurrently",
                    record.employee_id, record.date
                ),
            });
        }
        record.id = stored.id;
        record.version = stored.version + 1;
        *stored = record.clone();
        Ok(record)
    }

    fn upsert(&self, mut record: AttendanceRecord) -> HrmsResult<AttendanceRecord> {
        let mut records = self.records.write();
        let key = (record.employee_id.clone(), record.date);
        match records.get_mut(&key) {
            Some(stored) => {
                record.id = stored.id;
                record.version = stored.version + 1;
                *stored = record.clone();
            }
            None => {
                record.version = 1;
                records.insert(key, record.clone());
            }
        }
        Ok(record)
    }
}

/// Leave applications held in memory.
#[derive(Debug, Default)]
pub struct InMemoryLeaveStore {
    applications: RwLock<HashMap<String, LeaveApplication>>,
}

impl InMemoryLeaveStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut applications: Vec<LeaveApplication>) -> Vec<LeaveApplication> {
        applications.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        applications
    }
}

impl LeaveStore for InMemoryLeaveStore {
    fn insert(&self, application: LeaveApplication) -> HrmsResult<()> {
        let mut applications = self.applications.write();
        if applications.contains_key(&application.id) {
            return Err(HrmsError::Conflict {
                message: format!("leave application {} already exists", application.id),
            });
        }
        applications.insert(application.id.clone(), application);
        Ok(())
    }

    fn get(&self, id: &str) -> HrmsResult<Option<LeaveApplication>> {
        Ok(self.applications.read().get(id).cloned())
    }

    fn transition(
        &self,
        updated: LeaveApplication,
        expected: LeaveStatus,
    ) -> HrmsResult<TransitionOutcome<LeaveStatus>> {
        let mut applications = self.applications.write();
        let stored = applications
            .get_mut(&updated.id)
            .ok_or_else(|| HrmsError::not_found("leave application", updated.id.clone()))?;
        if stored.status != expected {
            return Ok(TransitionOutcome::Stale {
                current: stored.status,
            });
        }
        *stored = updated;
        Ok(TransitionOutcome::Applied)
    }

    fn list_for_employee(&self, employee_id: &str) -> HrmsResult<Vec<LeaveApplication>> {
        let matching = self
            .applications
            .read()
            .values()
            .filter(|application| application.employee_id == employee_id)
            .cloned()
            .collect();
        Ok(Self::sorted(matching))
    }

    fn list_by_status(&self, status: LeaveStatus) -> HrmsResult<Vec<LeaveApplication>> {
        let matching = self
            .applications
            .read()
            .values()
            .filter(|application| application.status == status)
            .cloned()
            .collect();
        Ok(Self::sorted(matching))
    }

    fn count_approved_by_type(&self, employee_id: &str) -> HrmsResult<LeaveBalance> {
        let mut balance: LeaveBalance = LeaveType::ALL.iter().map(|kind| (*kind, 0)).collect();
        for application in self.applications.read().values() {
            if application.employee_id == employee_id && application.status == LeaveStatus::Approved
            {
                *balance.entry(application.leave_type).or_insert(0) += 1;
            }
        }
        Ok(balance)
    }
}

/// Payroll records held in memory.
#[derive(Debug, Default)]
pub struct InMemoryPayrollStore {
    records: RwLock<HashMap<Uuid, PayrollRecord>>,
}

impl InMemoryPayrollStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_period(record: &PayrollRecord, employee_id: &str, period: &PayPeriod) -> bool {
    record.employee_id == employee_id
        && record.pay_period_start == period.start_date
        && record.pay_period_end == period.end_date
}

impl PayrollStore for InMemoryPayrollStore {
    fn save_draft(&self, mut record: PayrollRecord) -> HrmsResult<PayrollRecord> {
        let mut records = self.records.write();
        let period = record.pay_period();
        let existing = records
            .values_mut()
            .find(|stored| same_period(stored, &record.employee_id, &period));

        match existing {
            Some(stored) if !stored.status.is_mutable() => Err(HrmsError::ImmutableRecord {
                id: stored.id.to_string(),
                status: stored.status.to_string(),
            }),
            Some(stored) => {
                record.id = stored.id;
                record.created_at = stored.created_at;
                record.status = PayrollStatus::Draft;
                *stored = record.clone();
                Ok(record)
            }
            None => {
                record.status = PayrollStatus::Draft;
                records.insert(record.id, record.clone());
                Ok(record)
            }
        }
    }

    fn get(&self, id: Uuid) -> HrmsResult<Option<PayrollRecord>> {
        Ok(self.records.read().get(&id).cloned())
    }

    fn find_for_period(
        &self,
        employee_id: &str,
        period: &PayPeriod,
    ) -> HrmsResult<Option<PayrollRecord>> {
        Ok(self
            .records
            .read()
            .values()
            .find(|record| same_period(record, employee_id, period))
            .cloned())
    }

    fn transition(
        &self,
        updated: PayrollRecord,
        expected: PayrollStatus,
    ) -> HrmsResult<TransitionOutcome<PayrollStatus>> {
        let mut records = self.records.write();
        let stored = records
            .get_mut(&updated.id)
            .ok_or_else(|| HrmsError::not_found("payroll record", updated.id.to_string()))?;
        if stored.status != expected {
            return Ok(TransitionOutcome::Stale {
                current: stored.status,
            });
        }
        *stored = updated;
        Ok(TransitionOutcome::Applied)
    }

    fn list_for_employee(&self, employee_id: &str) -> HrmsResult<Vec<PayrollRecord>> {
        let mut matching: Vec<PayrollRecord> = self
            .records
            .read()
            .values()
            .filter(|record| record.employee_id == employee_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.pay_period_start.cmp(&a.pay_period_start));
        Ok(matching)
    }
}
