//! Allowances, tax and other deductions.
//!
//! All three are flat percentages. Tax uses a single threshold: gross pay
//! strictly above it is taxed at the high rate, everything else at the
//! standard rate.

use rust_decimal::Decimal;

use crate::config::PayrollPolicy;
use crate::models::AuditStep;

use super::round_money;

/// The result of a flat-percentage rule.
#[derive(Debug, Clone)]
pub struct PercentageResult {
    /// The rate that was applied.
    pub rate: Decimal,
    /// The resulting amount, rounded to cents.
    pub amount: Decimal,
    /// The audit step recording the rule.
    pub audit_step: AuditStep,
}

fn percentage_step(
    step_number: u32,
    rule_id: &str,
    rule_name: &str,
    base_name: &str,
    base: Decimal,
    rate: Decimal,
    amount: Decimal,
) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        input: serde_json::json!({
            base_name: base.to_string(),
            "rate": rate.to_string()
        }),
        output: serde_json::json!({
            "amount": amount.to_string()
        }),
        reasoning: format!("{} ${} x {} = ${}", base_name, base, rate, amount),
    }
}

/// Calculates the flat allowance on basic salary.
///
/// # Example
///
/// ```
/// use people360::calculation::calculate_allowances;
/// use people360::config::PayrollPolicy;
/// use rust_decimal::Decimal;
///
/// let result = calculate_allowances(Decimal::new(300000, 2), &PayrollPolicy::default(), 1);
/// assert_eq!(result.amount, Decimal::new(30000, 2));
/// ```
pub fn calculate_allowances(
    basic_salary: Decimal,
    policy: &PayrollPolicy,
    step_number: u32,
) -> PercentageResult {
    let rate = policy.allowance_rate;
    let amount = round_money(basic_salary * rate);
    PercentageResult {
        rate,
        amount,
        audit_step: percentage_step(
            step_number,
            "allowances",
            "Flat Allowance",
            "basic_salary",
            basic_salary,
            rate,
            amount,
        ),
    }
}

/// Calculates income tax on gross pay.
///
/// # Example
///
/// ```
/// use people360::calculation::calculate_tax;
/// use people360::config::PayrollPolicy;
/// use rust_decimal::Decimal;
///
/// let policy = PayrollPolicy::default();
/// assert_eq!(calculate_tax(Decimal::new(3100, 0), &policy, 1).amount, Decimal::new(31000, 2));
/// assert_eq!(calculate_tax(Decimal::new(60000, 0), &policy, 1).amount, Decimal::new(900000, 2));
/// ```
pub fn calculate_tax(gross_pay: Decimal, policy: &PayrollPolicy, step_number: u32) -> PercentageResult {
    let rate = if gross_pay > policy.tax.threshold {
        policy.tax.high_rate
    } else {
        policy.tax.standard_rate
    };
    let amount = round_money(gross_pay * rate);
    let mut audit_step = percentage_step(
        step_number,
        "tax",
        "Income Tax",
        "gross_pay",
        gross_pay,
        rate,
        amount,
    );
    audit_step.input["threshold"] = serde_json::json!(policy.tax.threshold.to_string());

    PercentageResult {
        rate,
        amount,
        audit_step,
    }
}

/// Calculates other flat deductions on gross pay.
pub fn calculate_other_deductions(
    gross_pay: Decimal,
    policy: &PayrollPolicy,
    step_number: u32,
) -> PercentageResult {
    let rate = policy.other_deduction_rate;
    let amount = round_money(gross_pay * rate);
    PercentageResult {
        rate,
        amount,
        audit_step: percentage_step(
            step_number,
            "other_deductions",
            "Other Deductions",
            "gross_pay",
            gross_pay,
            rate,
            amount,
        ),
    }
}
