//! Working-day detection.
//!
//! Payroll treats Monday through Friday as working days and excludes weekends
//! unconditionally. There is no holiday calendar.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::{AuditStep, PayPeriod};

/// Returns true if `date` falls on Monday through Friday.
///
/// # Example
///
/// ```
/// use people360::calculation::is_working_day;
/// use chrono::NaiveDate;
///
/// // 2024-04-06 is a Saturday
/// assert!(!is_working_day(NaiveDate::from_ymd_opt(2024, 4, 6).unwrap()));
/// // 2024-04-08 is a Monday
/// assert!(is_working_day(NaiveDate::from_ymd_opt(2024, 4, 8).unwrap()));
/// ```
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts working days in the inclusive range `[start, end]`.
///
/// Returns zero when `end < start`.
///
/// # Example
///
/// ```
/// use people360::calculation::count_working_days;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
/// assert_eq!(count_working_days(start, end), 22);
/// ```
pub fn count_working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| is_working_day(*date))
        .count() as u32
}

/// The result of counting the working days in a pay period.
#[derive(Debug, Clone)]
pub struct WorkingDaysResult {
    /// Weekdays in the period.
    pub working_days: u32,
    /// The audit step recording the count.
    pub audit_step: AuditStep,
}

/// Counts the working days of a pay period and records an audit step.
pub fn working_days_in_period(period: &PayPeriod, step_number: u32) -> WorkingDaysResult {
    let working_days = count_working_days(period.start_date, period.end_date);
    let calendar_days = period.days().count();

    WorkingDaysResult {
        working_days,
        audit_step: AuditStep {
            step_number,
            rule_id: "working_days".to_string(),
            rule_name: "Working Days".to_string(),
            input: serde_json::json!({
                "start_date": period.start_date.to_string(),
                "end_date": period.end_date.to_string()
            }),
            output: serde_json::json!({
                "working_days": working_days,
                "calendar_days": calendar_days
            }),
            reasoning: format!(
                "{} of {} calendar days in {} fall on Monday to Friday",
                working_days,
                calendar_days,
                period.label()
            ),
        },
    }
}
