//! Attendance record model.
//!
//! One [`AttendanceRecord`] exists per employee per calendar date. Worked
//! hours are derived from the clock-in/clock-out pair and the unpaid break
//! minutes, and are recomputed every time the timestamps change.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HrmsError, HrmsResult};

/// Attendance status for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Worked the day. Only this status counts as a working day for payroll.
    Present,
    /// Did not work.
    Absent,
    /// Arrived late.
    Late,
    /// Worked half a day.
    HalfDay,
}

/// A single day's attendance for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Display code of the employee.
    pub employee_id: String,
    /// The calendar date this record covers.
    pub date: NaiveDate,
    /// When the employee clocked in.
    pub clock_in: Option<NaiveDateTime>,
    /// When the employee clocked out.
    pub clock_out: Option<NaiveDateTime>,
    /// Unpaid break time in minutes.
    pub break_minutes: u32,
    /// Worked hours, present only when both timestamps are set.
    pub total_hours: Option<Decimal>,
    /// The attendance status for the day.
    pub status: AttendanceStatus,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Optimistic concurrency counter, bumped by the store on every update.
    #[serde(default)]
    pub version: u64,
}

impl AttendanceRecord {
    /// Creates an empty record for the given employee and date.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            date,
            clock_in: None,
            clock_out: None,
            break_minutes: 0,
            total_hours: None,
            status,
            notes: None,
            version: 0,
        }
    }

    /// Recomputes `total_hours` from the timestamps and break minutes.
    ///
    /// Hours are `(clock_out - clock_in - break_minutes) / 60`, floored at
    /// zero and rounded to two decimal places. If either timestamp is
    /// missing, `total_hours` becomes `None`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `clock_out` is earlier than `clock_in`.
    ///
    /// # Example
    ///
    /// ```
    /// use people360::models::{AttendanceRecord, AttendanceStatus};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    /// let mut record = AttendanceRecord::new("EMP000001", date, AttendanceStatus::Present);
    /// record.clock_in = date.and_hms_opt(9, 0, 0);
    /// record.clock_out = date.and_hms_opt(17, 30, 0);
    /// record.break_minutes = 30;
    /// record.recompute_hours().unwrap();
    ///
    /// assert_eq!(record.total_hours, Some(Decimal::new(800, 2)));
    /// ```
    pub fn recompute_hours(&mut self) -> HrmsResult<()> {
        self.total_hours = match (self.clock_in, self.clock_out) {
            (Some(clock_in), Some(clock_out)) => {
                if clock_out < clock_in {
                    return Err(HrmsError::validation(
                        "clock_out",
                        "clock-out time is earlier than clock-in time",
                    ));
                }
                let total_minutes = (clock_out - clock_in).num_minutes();
                let worked_minutes = (total_minutes - i64::from(self.break_minutes)).max(0);
                let hours = Decimal::new(worked_minutes, 0) / Decimal::new(60, 0);
                Some(hours.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
            }
            _ => None,
        };
        Ok(())
    }

    /// Returns worked hours, treating missing hours as zero.
    pub fn hours_or_zero(&self) -> Decimal {
        self.total_hours.unwrap_or(Decimal::ZERO)
    }

    /// Returns true if this record counts as a worked day for payroll.
    pub fn is_present(&self) -> bool {
        self.status == AttendanceStatus::Present
    }
}
