//! Daily rate and absence deduction.
//!
//! The daily rate divides the monthly salary by a flat day count (30 by
//! default) regardless of the month's real length. Every weekday of the
//! period without a `present` attendance record is deducted at that rate.

use rust_decimal::Decimal;

use crate::config::PayrollPolicy;
use crate::models::AuditStep;

use super::round_money;

/// The result of deriving the daily rate.
#[derive(Debug, Clone)]
pub struct DailyRateResult {
    /// Salary per day, unrounded.
    pub daily_rate: Decimal,
    /// The audit step recording the derivation.
    pub audit_step: AuditStep,
}

/// Derives the daily rate from the monthly salary.
///
/// # Example
///
/// ```
/// use people360::calculation::calculate_daily_rate;
/// use people360::config::PayrollPolicy;
/// use rust_decimal::Decimal;
///
/// let result = calculate_daily_rate(Decimal::new(300000, 2), &PayrollPolicy::default(), 1);
/// assert_eq!(result.daily_rate, Decimal::new(100, 0));
/// ```
pub fn calculate_daily_rate(
    basic_salary: Decimal,
    policy: &PayrollPolicy,
    step_number: u32,
) -> DailyRateResult {
    let daily_rate = basic_salary / policy.days_per_month;

    DailyRateResult {
        daily_rate,
        audit_step: AuditStep {
            step_number,
            rule_id: "daily_rate".to_string(),
            rule_name: "Daily Rate".to_string(),
            input: serde_json::json!({
                "basic_salary": basic_salary.to_string(),
                "days_per_month": policy.days_per_month.to_string()
            }),
            output: serde_json::json!({
                "daily_rate": daily_rate.to_string()
            }),
            reasoning: format!(
                "Basic salary ${} / {} days = ${} per day",
                basic_salary, policy.days_per_month, daily_rate
            ),
        },
    }
}

/// The result of the absence deduction rule.
#[derive(Debug, Clone)]
pub struct AbsenceDeductionResult {
    /// Weekdays without a present record.
    pub absent_days: u32,
    /// Amount withheld, rounded to cents.
    pub absence_deduction: Decimal,
    /// The audit step recording the deduction.
    pub audit_step: AuditStep,
}

/// Deducts pay for working days not covered by a present record.
///
/// `absent_days = max(0, working_days - present_days)`; the deduction is
/// `absent_days * daily_rate`.
///
/// # Example
///
/// ```
/// use people360::calculation::calculate_absence_deduction;
/// use rust_decimal::Decimal;
///
/// let result = calculate_absence_deduction(22, 20, Decimal::new(100, 0), 1);
/// assert_eq!(result.absent_days, 2);
/// assert_eq!(result.absence_deduction, Decimal::new(20000, 2));
/// ```
pub fn calculate_absence_deduction(
    working_days: u32,
    present_days: u32,
    daily_rate: Decimal,
    step_number: u32,
) -> AbsenceDeductionResult {
    let absent_days = working_days.saturating_sub(present_days);
    let absence_deduction = round_money(Decimal::from(absent_days) * daily_rate);

    AbsenceDeductionResult {
        absent_days,
        absence_deduction,
        audit_step: AuditStep {
            step_number,
            rule_id: "absence_deduction".to_string(),
            rule_name: "Absence Deduction".to_string(),
            input: serde_json::json!({
                "working_days": working_days,
                "present_days": present_days,
                "daily_rate": daily_rate.to_string()
            }),
            output: serde_json::json!({
                "absent_days": absent_days,
                "absence_deduction": absence_deduction.to_string()
            }),
            reasoning: format!(
                "{} working days - {} present days = {} absent days at ${} = ${}",
                working_days, present_days, absent_days, daily_rate, absence_deduction
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_daily_rate_uses_flat_thirty_days() {
        let result = calculate_daily_rate(dec("3100"), &PayrollPolicy::default(), 1);
        // Same divisor even though e.g. February has fewer days
        assert_eq!(result.daily_rate, dec("3100") / dec("30"));
        assert_eq!(result.audit_step.rule_id, "daily_rate");
    }

    #[test]
    fn test_zero_salary_gives_zero_rate() {
        let result = calculate_daily_rate(Decimal::ZERO, &PayrollPolicy::default(), 1);
        assert_eq!(result.daily_rate, Decimal::ZERO);
    }

    #[test]
    fn test_no_absence_when_all_days_present() {
        let result = calculate_absence_deduction(22, 22, dec("100"), 2);
        assert_eq!(result.absent_days, 0);
        assert_eq!(result.absence_deduction, dec("0.00"));
    }

    #[test]
    fn test_more_present_days_than_working_days_floors_at_zero() {
        // Weekend work recorded as present
        let result = calculate_absence_deduction(22, 24, dec("100"), 2);
        assert_eq!(result.absent_days, 0);
        assert_eq!(result.absence_deduction, Decimal::ZERO);
    }

    #[test]
    fn test_deduction_is_rounded_to_cents() {
        // 1000 / 30 = 33.333..., three absent days = 100.00
        let rate = dec("1000") / dec("30");
        let result = calculate_absence_deduction(22, 19, rate, 2);
        assert_eq!(result.absent_days, 3);
        assert_eq!(result.absence_deduction, dec("100.00"));
    }

    #[test]
    fn test_full_month_absent() {
        let result = calculate_absence_deduction(22, 0, dec("100"), 2);
        assert_eq!(result.absent_days, 22);
        assert_eq!(result.absence_deduction, dec("2200.00"));
        assert!(result.audit_step.reasoning.contains("22 absent days"));
    }
}
