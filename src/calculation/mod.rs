//! Payroll calculation rules.
//!
//! Each rule is a pure function returning its result together with an
//! [`AuditStep`](crate::models::AuditStep). [`calculate_monthly_payroll`]
//! chains them into a full [`PayrollBreakdown`](crate::models::PayrollBreakdown).

mod absence;
mod deductions;
mod money;
mod monthly_payroll;
mod overtime;
mod working_days;

pub use absence::{
    AbsenceDeductionResult, DailyRateResult, calculate_absence_deduction, calculate_daily_rate,
};
pub use deductions::{
    PercentageResult, calculate_allowances, calculate_other_deductions, calculate_tax,
};
pub use money::{MONEY_DP, round_money};
pub use monthly_payroll::calculate_monthly_payroll;
pub use overtime::{OvertimeResult, calculate_overtime};
pub use working_days::{
    WorkingDaysResult, count_working_days, is_working_day, working_days_in_period,
};
