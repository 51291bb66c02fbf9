//! Attendance ledger operations.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::error::{HrmsError, HrmsResult};
use crate::models::{AttendanceRecord, AttendanceStatus, Employee};
use crate::store::{AttendanceStore, EmployeeDirectory};

use super::Actor;

/// An HR correction to one day's attendance.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceCorrection {
    /// Display code of the employee.
    pub employee_id: String,
    /// The day being corrected.
    pub date: NaiveDate,
    /// Status for the day.
    pub status: AttendanceStatus,
    /// Clock-in time.
    pub clock_in: Option<NaiveDateTime>,
    /// Clock-out time.
    pub clock_out: Option<NaiveDateTime>,
    /// Unpaid break minutes.
    pub break_minutes: u32,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Attendance for one employee over a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceReport {
    /// Display code of the employee.
    pub employee_id: String,
    /// First day of the range.
    pub start: NaiveDate,
    /// Last day of the range.
    pub end: NaiveDate,
    /// Records in date order.
    pub records: Vec<AttendanceRecord>,
    /// Records with status `present`.
    pub present_days: u32,
    /// Sum of recorded hours.
    pub total_hours: Decimal,
}

/// Check-in, check-out, corrections and reports.
#[derive(Clone)]
pub struct AttendanceService {
    attendance: Arc<dyn AttendanceStore>,
    directory: Arc<dyn EmployeeDirectory>,
}

impl AttendanceService {
    /// Creates the service over its stores.
    pub fn new(attendance: Arc<dyn AttendanceStore>, directory: Arc<dyn EmployeeDirectory>) -> Self {
        Self {
            attendance,
            directory,
        }
    }

    fn active_employee(&self, employee_id: &str) -> HrmsResult<Employee> {
        let employee = self
            .directory
            .get(employee_id)?
            .ok_or_else(|| HrmsError::not_found("employee", employee_id))?;
        if !employee.is_active() {
            return Err(HrmsError::validation(
                "employee_id",
                format!("{} is {}", employee_id, employee.status),
            ));
        }
        Ok(employee)
    }

    /// Records the start of the working day at `at`.
    ///
    /// Creates the day's record, or fills in a record HR created without a
    /// clock-in time.
    ///
    /// # Errors
    ///
    /// Returns a conflict if the employee already clocked in that day,
    /// including when a concurrent check-in wins the race.
    pub fn check_in(
        &self,
        actor: &Actor,
        employee_id: &str,
        at: NaiveDateTime,
    ) -> HrmsResult<AttendanceRecord> {
        actor.require_self_or_hr(employee_id, "check in another employee")?;
        self.active_employee(employee_id)?;

        let date = at.date();
        let already_checked_in = || HrmsError::Conflict {
            message: "Already checked in today".to_string(),
        };

        let result = match self.attendance.find(employee_id, date)? {
            Some(record) if record.clock_in.is_some() => return Err(already_checked_in()),
            Some(mut record) => {
                record.clock_in = Some(at);
                record.status = AttendanceStatus::Present;
                record.recompute_hours()?;
                self.attendance.update(record)
            }
            None => {
                let mut record =
                    AttendanceRecord::new(employee_id, date, AttendanceStatus::Present);
                record.clock_in = Some(at);
                self.attendance.insert(record)
            }
        };

        let record = result.map_err(|err| match err {
            HrmsError::Conflict { .. } => already_checked_in(),
            other => other,
        })?;
        info!(employee_id = %employee_id, date = %date, "Checked in");
        Ok(record)
    }

    /// Records the end of the working day at `at` and recomputes hours.
    ///
    /// # Errors
    ///
    /// Returns a validation error if there is no check-in for that day, or if
    /// `at` is earlier than the check-in.
    pub fn check_out(
        &self,
        actor: &Actor,
        employee_id: &str,
        at: NaiveDateTime,
    ) -> HrmsResult<AttendanceRecord> {
        actor.require_self_or_hr(employee_id, "check out another employee")?;
        self.active_employee(employee_id)?;

        let date = at.date();
        let mut record = match self.attendance.find(employee_id, date)? {
            Some(record) if record.clock_in.is_some() => record,
            _ => return Err(HrmsError::validation("clock_in", "Check-in not found")),
        };

        record.clock_out = Some(at);
        record.recompute_hours()?;
        let record = self.attendance.update(record)?;

        info!(
            employee_id = %employee_id,
            date = %date,
            total_hours = %record.hours_or_zero(),
            "Checked out"
        );
        Ok(record)
    }

    /// Creates or overwrites a day's record. HR only.
    pub fn record_attendance(
        &self,
        actor: &Actor,
        correction: AttendanceCorrection,
    ) -> HrmsResult<AttendanceRecord> {
        actor.require_hr("correct attendance")?;
        if self.directory.get(&correction.employee_id)?.is_none() {
            return Err(HrmsError::not_found("employee", &correction.employee_id));
        }

        let mut record = match self.attendance.find(&correction.employee_id, correction.date)? {
            Some(existing) => existing,
            None => AttendanceRecord::new(
                correction.employee_id.clone(),
                correction.date,
                correction.status,
            ),
        };
        record.status = correction.status;
        record.clock_in = correction.clock_in;
        record.clock_out = correction.clock_out;
        record.break_minutes = correction.break_minutes;
        record.notes = correction.notes;
        record.recompute_hours()?;

        let record = self.attendance.upsert(record)?;
        info!(
            employee_id = %record.employee_id,
            date = %record.date,
            corrected_by = %actor.employee_id,
            "Attendance recorded"
        );
        Ok(record)
    }

    /// Returns an employee's attendance in `[start, end]`.
    pub fn attendance_report(
        &self,
        actor: &Actor,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> HrmsResult<AttendanceReport> {
        actor.require_self_or_hr(employee_id, "view another employee's attendance")?;
        if end < start {
            return Err(HrmsError::validation("end", "End date must be on or after start date"));
        }
        if self.directory.get(employee_id)?.is_none() {
            return Err(HrmsError::not_found("employee", employee_id));
        }

        let records = self.attendance.find_range(employee_id, start, end)?;
        let present_days = records.iter().filter(|record| record.is_present()).count() as u32;
        let total_hours = records.iter().map(AttendanceRecord::hours_or_zero).sum();

        Ok(AttendanceReport {
            employee_id: employee_id.to_string(),
            start,
            end,
            records,
            present_days,
            total_hours,
        })
    }
}
