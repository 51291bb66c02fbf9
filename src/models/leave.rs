//! Leave application model and status machine.
//!
//! A [`LeaveApplication`] starts `pending` and moves to exactly one of the
//! terminal states `approved`, `rejected` or `cancelled`. No transition leaves
//! a terminal state.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The kind of leave being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Sick leave.
    Sick,
    /// Annual/vacation leave.
    Vacation,
    /// Maternity leave.
    Maternity,
    /// Paternity leave.
    Paternity,
    /// Unpaid leave.
    Unpaid,
}

impl LeaveType {
    /// All leave types, in a stable order.
    pub const ALL: [LeaveType; 5] = [
        LeaveType::Sick,
        LeaveType::Vacation,
        LeaveType::Maternity,
        LeaveType::Paternity,
        LeaveType::Unpaid,
    ];
}

impl std::fmt::Display for LeaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveType::Sick => write!(f, "sick"),
            LeaveType::Vacation => write!(f, "vacation"),
            LeaveType::Maternity => write!(f, "maternity"),
            LeaveType::Paternity => write!(f, "paternity"),
            LeaveType::Unpaid => write!(f, "unpaid"),
        }
    }
}

/// Workflow status of a leave application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting a decision. The only non-terminal state.
    Pending,
    /// Approved by HR or the employee's manager.
    Approved,
    /// Rejected by HR or the employee's manager.
    Rejected,
    /// Withdrawn before a decision was made.
    Cancelled,
}

impl LeaveStatus {
    /// Returns true for states that admit no further transition.
    pub fn is_terminal(self) -> bool {
        match self {
            LeaveStatus::Pending => false,
            LeaveStatus::Approved | LeaveStatus::Rejected | LeaveStatus::Cancelled => true,
        }
    }

    /// Returns true if `self -> next` is a permitted transition.
    ///
    /// # Example
    ///
    /// ```
    /// use people360::models::LeaveStatus;
    ///
    /// assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Approved));
    /// assert!(!LeaveStatus::Approved.can_transition_to(LeaveStatus::Cancelled));
    /// assert!(!LeaveStatus::Pending.can_transition_to(LeaveStatus::Pending));
    /// ```
    pub fn can_transition_to(self, next: LeaveStatus) -> bool {
        self == LeaveStatus::Pending && next.is_terminal()
    }
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveStatus::Pending => write!(f, "pending"),
            LeaveStatus::Approved => write!(f, "approved"),
            LeaveStatus::Rejected => write!(f, "rejected"),
            LeaveStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// An employee's request for time off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplication {
    /// Application code (e.g., "LVE7Q2M0A").
    pub id: String,
    /// Display code of the applicant.
    pub employee_id: String,
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Inclusive calendar-day count of the range.
    pub days_requested: u32,
    /// The applicant's stated reason.
    #[serde(default)]
    pub reason: String,
    /// Current workflow status.
    pub status: LeaveStatus,
    /// Display code of whoever approved or rejected the application.
    pub approved_by: Option<String>,
    /// When the application was approved or rejected.
    pub approved_at: Option<DateTime<Utc>>,
    /// Decision comments (the rejection reason).
    pub comments: Option<String>,
    /// When the application was submitted.
    pub created_at: DateTime<Utc>,
}

/// Number of calendar days in the inclusive range `[start, end]`.
///
/// Weekends are not excluded.
///
/// # Example
///
/// ```
/// use people360::models::inclusive_day_count;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
/// assert_eq!(inclusive_day_count(start, end), 5);
/// ```
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Count of approved applications per leave type.
///
/// Every leave type is present, zero-filled.
pub type LeaveBalance = BTreeMap<LeaveType, u32>;

#[cfg(test)]
mod tests {
    use super::*;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_single_day_counts_as_one() {
        let day = make_date("2024-06-10");
        assert_eq!(inclusive_day_count(day, day), 1);
    }

    #[test]
    fn test_range_spanning_weekend_counts_calendar_days() {
        // Friday to Monday
        assert_eq!(
            inclusive_day_count(make_date("2024-06-14"), make_date("2024-06-17")),
            4
        );
    }

    #[test]
    fn test_range_spanning_month_boundary() {
        assert_eq!(
            inclusive_day_count(make_date("2024-02-28"), make_date("2024-03-01")),
            3
        );
    }

    #[test]
    fn test_only_pending_is_non_terminal() {
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::Rejected.is_terminal());
        assert!(LeaveStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_no_transition_out_of_terminal_states() {
        for from in [
            LeaveStatus::Approved,
            LeaveStatus::Rejected,
            LeaveStatus::Cancelled,
        ] {
            for to in [
                LeaveStatus::Pending,
                LeaveStatus::Approved,
                LeaveStatus::Rejected,
                LeaveStatus::Cancelled,
            ] {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_leave_type_serialization() {
        assert_eq!(
            serde_json::to_string(&LeaveType::Paternity).unwrap(),
            "\"paternity\""
        );
        let parsed: LeaveType = serde_json::from_str("\"unpaid\"").unwrap();
        assert_eq!(parsed, LeaveType::Unpaid);
        assert!(serde_json::from_str::<LeaveType>("\"personal\"").is_err());
    }

    #[test]
    fn test_balance_serializes_with_type_keys() {
        let mut balance = LeaveBalance::new();
        balance.insert(LeaveType::Sick, 2);
        balance.insert(LeaveType::Vacation, 0);
        let json = serde_json::to_value(&balance).unwrap();
        assert_eq!(json["sick"], 2);
        assert_eq!(json["vacation"], 0);
    }
}
