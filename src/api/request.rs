//! Request types for the People360 API.

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::models::{AttendanceStatus, LeaveType, Role};
use crate::services::{AttendanceCorrection, LeaveRequest, NewEmployee};

/// A JSON body that may be left out entirely.
///
/// An empty (or all-whitespace) body yields `T::default()`. Anything else must
/// parse as `T`; a malformed body is rejected like [`Json`] would reject it,
/// never silently replaced by the default.
#[derive(Debug, Clone, Default)]
pub struct OptionalJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(Self(value))
    }
}

/// Body of `POST /employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterEmployeeRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Department name.
    #[serde(default)]
    pub department: Option<String>,
    /// Job title.
    #[serde(default)]
    pub position: Option<String>,
    /// Monthly baseline salary.
    #[serde(default)]
    pub salary: Option<Decimal>,
    /// Role to act under.
    #[serde(default = "default_role")]
    pub role: Role,
    /// Display code of the direct manager.
    #[serde(default)]
    pub manager_id: Option<String>,
    /// Hire date; defaults to today.
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
}

fn default_role() -> Role {
    Role::Employee
}

impl From<RegisterEmployeeRequest> for NewEmployee {
    fn from(req: RegisterEmployeeRequest) -> Self {
        NewEmployee {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            department: req.department,
            position: req.position,
            salary: req.salary,
            role: req.role,
            manager_id: req.manager_id,
            hire_date: req.hire_date,
        }
    }
}

/// Body of `PUT /employees/:employee_id/manager`. A null manager clears it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignManagerRequest {
    /// Display code of the new manager.
    pub manager_id: Option<String>,
}

/// Body of the check-in and check-out endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClockRequest {
    /// Whose attendance; defaults to the caller.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// When; defaults to now.
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

/// Body of `PUT /attendance/:employee_id/:date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceCorrectionRequest {
    /// Status for the day.
    pub status: AttendanceStatus,
    /// Clock-in time.
    #[serde(default)]
    pub clock_in: Option<NaiveDateTime>,
    /// Clock-out time.
    #[serde(default)]
    pub clock_out: Option<NaiveDateTime>,
    /// Unpaid break minutes.
    #[serde(default)]
    pub break_minutes: u32,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl AttendanceCorrectionRequest {
    /// Attaches the path parameters.
    pub fn into_correction(self, employee_id: String, date: NaiveDate) -> AttendanceCorrection {
        AttendanceCorrection {
            employee_id,
            date,
            status: self.status,
            clock_in: self.clock_in,
            clock_out: self.clock_out,
            break_minutes: self.break_minutes,
            notes: self.notes,
        }
    }
}

/// Query of `GET /attendance/report/:employee_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRangeQuery {
    /// First day (inclusive).
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
}

/// Body of `POST /leave/apply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyLeaveRequest {
    /// Applicant; defaults to the caller.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Kind of leave.
    pub leave_type: LeaveType,
    /// First day (inclusive).
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
    /// Stated reason.
    #[serde(default)]
    pub reason: String,
}

impl ApplyLeaveRequest {
    /// Resolves the applicant against the caller.
    pub fn into_leave_request(self, caller: &str) -> LeaveRequest {
        LeaveRequest {
            employee_id: self.employee_id.unwrap_or_else(|| caller.to_string()),
            leave_type: self.leave_type,
            start_date: self.start_date,
            end_date: self.end_date,
            reason: self.reason,
        }
    }
}

/// Body of `POST /leave/reject/:id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectLeaveRequest {
    /// Reason given to the applicant.
    #[serde(default)]
    pub reason: Option<String>,
}

impl RejectLeaveRequest {
    /// The reason, or "No reason provided".
    pub fn reason_or_default(&self) -> &str {
        self.reason
            .as_deref()
            .filter(|reason| !reason.trim().is_empty())
            .unwrap_or("No reason provided")
    }
}

/// Optional `?employee_id=` on self-service reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeQuery {
    /// Whose data; defaults to the caller.
    #[serde(default)]
    pub employee_id: Option<String>,
}

/// `?month=&year=` for payroll previews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodQuery {
    /// Month, 1-12.
    pub month: u32,
    /// Four-digit year.
    pub year: i32,
}

/// Body of `POST /payroll/run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPayrollRequest {
    /// Whose payroll.
    pub employee_id: String,
    /// Month, 1-12.
    pub month: u32,
    /// Four-digit year.
    pub year: i32,
}
