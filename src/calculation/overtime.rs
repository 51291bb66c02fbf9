//! Monthly overtime calculation.
//!
//! Overtime is measured over the whole month: every present day is expected
//! to contribute the standard daily hours, and any recorded hours beyond that
//! total are paid at the overtime multiplier of the hourly rate.

use rust_decimal::Decimal;

use crate::config::PayrollPolicy;
use crate::models::AuditStep;

use super::round_money;

/// The result of the overtime rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OvertimeResult {
    /// Hours expected from the present days.
    pub expected_hours: Decimal,
    /// Hours beyond the expected hours (never negative).
    pub overtime_hours: Decimal,
    /// The hourly overtime rate, unrounded.
    pub overtime_rate: Decimal,
    /// Overtime pay, rounded to cents.
    pub overtime_amount: Decimal,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Calculates overtime hours and pay for a month.
///
/// - `expected_hours = present_days * standard_daily_hours`
/// - `overtime_hours = max(0, total_hours - expected_hours)`
/// - `overtime_rate = (daily_rate / standard_daily_hours) * overtime_multiplier`
/// - `overtime_amount = overtime_hours * overtime_rate`
///
/// # Example
///
/// ```
/// use people360::calculation::calculate_overtime;
/// use people360::config::PayrollPolicy;
/// use rust_decimal::Decimal;
///
/// // 20 present days, 170 hours, $100/day
/// let result = calculate_overtime(
///     Decimal::new(170, 0),
///     20,
///     Decimal::new(100, 0),
///     &PayrollPolicy::default(),
///     1,
/// );
/// assert_eq!(result.overtime_hours, Decimal::new(10, 0));
/// // 100 / 8 * 1.5 = 18.75 per hour
/// assert_eq!(result.overtime_amount, Decimal::new(18750, 2));
/// ```
pub fn calculate_overtime(
    total_hours: Decimal,
    present_days: u32,
    daily_rate: Decimal,
    policy: &PayrollPolicy,
    step_number: u32,
) -> OvertimeResult {
    let expected_hours = Decimal::from(present_days) * policy.standard_daily_hours;
    let overtime_hours = (total_hours - expected_hours).max(Decimal::ZERO);
    let overtime_rate = (daily_rate / policy.standard_daily_hours) * policy.overtime_multiplier;
    let overtime_amount = round_money(overtime_hours * overtime_rate);

    let reasoning = if overtime_hours > Decimal::ZERO {
        format!(
            "{} hours recorded exceeds {} expected hours ({} days x {}); {} overtime hours at ${}/hour = ${}",
            total_hours,
            expected_hours,
            present_days,
            policy.standard_daily_hours,
            overtime_hours,
            overtime_rate,
            overtime_amount
        )
    } else {
        format!(
            "{} hours recorded does not exceed {} expected hours; no overtime",
            total_hours, expected_hours
        )
    };

    OvertimeResult {
        expected_hours,
        overtime_hours,
        overtime_rate,
        overtime_amount,
        audit_step: AuditStep {
            step_number,
            rule_id: "overtime".to_string(),
            rule_name: "Monthly Overtime".to_string(),
            input: serde_json::json!({
                "total_hours": total_hours.to_string(),
                "present_days": present_days,
                "daily_rate": daily_rate.to_string(),
                "standard_daily_hours": policy.standard_daily_hours.to_string(),
                "overtime_multiplier": policy.overtime_multiplier.to_string()
            }),
            output: serde_json::json!({
                "expected_hours": expected_hours.to_string(),
                "overtime_hours": overtime_hours.to_string(),
                "overtime_rate": overtime_rate.to_string(),
                "overtime_amount": overtime_amount.to_string()
            }),
            reasoning,
        },
    }
}
