//! Monthly payroll calculation.
//!
//! [`calculate_monthly_payroll`] is a pure function: given an employee, a pay
//! period and that period's attendance records it always produces the same
//! [`PayrollBreakdown`].

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::PayrollPolicy;
use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    AttendanceRecord, AuditStep, AuditTrace, AuditWarning, Employee, MAX_MONTHLY_SALARY, PayPeriod,
    PayrollBreakdown,
};

use super::{
    calculate_absence_deduction, calculate_allowances, calculate_daily_rate,
    calculate_other_deductions, calculate_overtime, calculate_tax, round_money,
    working_days_in_period,
};

/// Calculates a month's payroll for one employee.
///
/// Records belonging to another employee or dated outside the period are
/// ignored with a warning in the audit trace.
///
/// # Errors
///
/// Returns a validation error if the employee's salary is negative or above
/// [`MAX_MONTHLY_SALARY`].
///
/// # Example
///
/// ```
/// use people360::calculation::calculate_monthly_payroll;
/// use people360::config::PayrollPolicy;
/// use people360::models::{Employee, EmployeeStatus, PayPeriod, Role};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let employee = Employee {
///     id: Uuid::new_v4(),
///     employee_id: "EMP000001".to_string(),
///     first_name: "Amina".to_string(),
///     last_name: "Odhiambo".to_string(),
///     email: "amina@example.com".to_string(),
///     department: None,
///     position: None,
///     salary: Some(Decimal::new(300000, 2)),
///     status: EmployeeStatus::Active,
///     manager_id: None,
///     role: Role::Employee,
///     hire_date: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(),
/// };
/// let period = PayPeriod::for_month(2024, 4).unwrap();
///
/// // No attendance at all: every one of the 22 weekdays is deducted.
/// let breakdown = calculate_monthly_payroll(&employee, period, &[], &PayrollPolicy::default()).unwrap();
/// assert_eq!(breakdown.absent_days, 22);
/// assert_eq!(breakdown.net_pay, breakdown.gross_pay - breakdown.tax_deduction - breakdown.other_deductions);
/// ```
pub fn calculate_monthly_payroll(
    employee: &Employee,
    period: PayPeriod,
    records: &[AttendanceRecord],
    policy: &PayrollPolicy,
) -> HrmsResult<PayrollBreakdown> {
    let salary = employee.monthly_salary();
    if salary < Decimal::ZERO {
        return Err(HrmsError::validation(
            "salary",
            format!("salary for {} is negative", employee.employee_id),
        ));
    }
    if salary > MAX_MONTHLY_SALARY {
        return Err(HrmsError::validation(
            "salary",
            format!(
                "salary for {} exceeds {}",
                employee.employee_id, MAX_MONTHLY_SALARY
            ),
        ));
    }
    let basic_salary = round_money(salary);

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut step_number: u32 = 1;

    if employee.salary.is_none() {
        warnings.push(AuditWarning {
            code: "NO_SALARY".to_string(),
            message: format!("{} has no salary on file; using 0", employee.employee_id),
        });
    }

    let (in_period, ignored): (Vec<&AttendanceRecord>, Vec<&AttendanceRecord>) =
        records.iter().partition(|record| {
            record.employee_id == employee.employee_id && period.contains_date(record.date)
        });
    if !ignored.is_empty() {
        warnings.push(AuditWarning {
            code: "RECORDS_OUTSIDE_PERIOD".to_string(),
            message: format!(
                "{} attendance records did not belong to {} in {} and were ignored",
                ignored.len(),
                employee.employee_id,
                period.label()
            ),
        });
    }

    let working = working_days_in_period(&period, step_number);
    steps.push(working.audit_step);
    step_number += 1;

    let actual_days = in_period.iter().filter(|record| record.is_present()).count() as u32;
    let total_hours: Decimal = in_period.iter().map(|record| record.hours_or_zero()).sum();
    steps.push(AuditStep {
        step_number,
        rule_id: "attendance_summary".to_string(),
        rule_name: "Attendance Summary".to_string(),
        input: serde_json::json!({ "records": in_period.len() }),
        output: serde_json::json!({
            "actual_days": actual_days,
            "total_hours": total_hours.to_string()
        }),
        reasoning: format!(
            "{} present days and {} recorded hours across {} records",
            actual_days,
            total_hours,
            in_period.len()
        ),
    });
    step_number += 1;

    let daily = calculate_daily_rate(basic_salary, policy, step_number);
    steps.push(daily.audit_step);
    step_number += 1;

    let absence =
        calculate_absence_deduction(working.working_days, actual_days, daily.daily_rate, step_number);
    steps.push(absence.audit_step);
    step_number += 1;

    let overtime = calculate_overtime(total_hours, actual_days, daily.daily_rate, policy, step_number);
    steps.push(overtime.audit_step);
    step_number += 1;

    let allowances = calculate_allowances(basic_salary, policy, step_number);
    steps.push(allowances.audit_step);
    step_number += 1;

    let gross_pay =
        basic_salary + allowances.amount + overtime.overtime_amount - absence.absence_deduction;
    steps.push(AuditStep {
        step_number,
        rule_id: "gross_pay".to_string(),
        rule_name: "Gross Pay".to_string(),
        input: serde_json::json!({
            "basic_salary": basic_salary.to_string(),
            "allowances": allowances.amount.to_string(),
            "overtime_amount": overtime.overtime_amount.to_string(),
            "absence_deduction": absence.absence_deduction.to_string()
        }),
        output: serde_json::json!({ "gross_pay": gross_pay.to_string() }),
        reasoning: format!(
            "${} + ${} + ${} - ${} = ${}",
            basic_salary,
            allowances.amount,
            overtime.overtime_amount,
            absence.absence_deduction,
            gross_pay
        ),
    });
    step_number += 1;

    let tax = calculate_tax(gross_pay, policy, step_number);
    steps.push(tax.audit_step);
    step_number += 1;

    let other = calculate_other_deductions(gross_pay, policy, step_number);
    steps.push(other.audit_step);
    step_number += 1;

    let net_pay = gross_pay - tax.amount - other.amount;
    steps.push(AuditStep {
        step_number,
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "tax_deduction": tax.amount.to_string(),
            "other_deductions": other.amount.to_string()
        }),
        output: serde_json::json!({ "net_pay": net_pay.to_string() }),
        reasoning: format!(
            "${} - ${} - ${} = ${}",
            gross_pay, tax.amount, other.amount, net_pay
        ),
    });

    if gross_pay < Decimal::ZERO {
        warnings.push(AuditWarning {
            code: "NEGATIVE_GROSS".to_string(),
            message: format!("absence deduction exceeds earnings; gross pay is ${}", gross_pay),
        });
    }

    debug!(
        employee_id = %employee.employee_id,
        period = %period.label(),
        gross_pay = %gross_pay,
        net_pay = %net_pay,
        "Payroll calculated"
    );

    Ok(PayrollBreakdown {
        employee_id: employee.employee_id.clone(),
        pay_period: period,
        basic_salary,
        daily_rate: daily.daily_rate,
        allowances: allowances.amount,
        overtime_amount: overtime.overtime_amount,
        absence_deduction: absence.absence_deduction,
        gross_pay,
        tax_rate: tax.rate,
        tax_deduction: tax.amount,
        other_deductions: other.amount,
        net_pay,
        working_days: working.working_days,
        actual_days,
        absent_days: absence.absent_days,
        total_hours,
        overtime_hours: overtime.overtime_hours,
        audit_trace: AuditTrace { steps, warnings },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::is_working_day;
    use crate::models::{AttendanceStatus, EmployeeStatus, Role};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_employee(salary: Option<&str>) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            employee_id: "EMP000001".to_string(),
            first_name: "Amina".to_string(),
            last_name: "Odhiambo".to_string(),
            email: "amina@example.com".to_string(),
            department: None,
            position: None,
            salary: salary.map(dec),
            status: EmployeeStatus::Active,
            manager_id: None,
            role: Role::Employee,
            hire_date: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(),
        }
    }

    fn present_day(date: NaiveDate, hours: &str) -> AttendanceRecord {
        let mut record = AttendanceRecord::new("EMP000001", date, AttendanceStatus::Present);
        record.total_hours = Some(dec(hours));
        record
    }

    /// Present records with `hours` each on the first `days` weekdays of the period.
    fn weekday_records(period: &PayPeriod, days: usize, hours: &str) -> Vec<AttendanceRecord> {
        period
            .days()
            .filter(|date| is_working_day(*date))
            .take(days)
            .map(|date| present_day(date, hours))
            .collect()
    }

    /// PR-001: the April example (20 of 22 weekdays present at 8h)
    #[test]
    fn test_april_example() {
        let employee = create_test_employee(Some("3000.00"));
        let period = PayPeriod::for_month(2024, 4).unwrap();
        let records = weekday_records(&period, 20, "8.0");

        let breakdown =
            calculate_monthly_payroll(&employee, period, &records, &PayrollPolicy::default())
                .unwrap();

        assert_eq!(breakdown.working_days, 22);
        assert_eq!(breakdown.actual_days, 20);
        assert_eq!(breakdown.total_hours, dec("160"));
        assert_eq!(breakdown.daily_rate, dec("100"));
        assert_eq!(breakdown.absent_days, 2);
        assert_eq!(breakdown.absence_deduction, dec("200.00"));
        assert_eq!(breakdown.overtime_hours, Decimal::ZERO);
        assert_eq!(breakdown.overtime_amount, dec("0.00"));
        assert_eq!(breakdown.allowances, dec("300.00"));
        assert_eq!(breakdown.gross_pay, dec("3100.00"));
        assert_eq!(breakdown.tax_rate, dec("0.10"));
        assert_eq!(breakdown.tax_deduction, dec("310.00"));
        assert_eq!(breakdown.other_deductions, dec("155.00"));
        assert_eq!(breakdown.net_pay, dec("2635.00"));
        assert_eq!(breakdown.net_pay.to_string(), "2635.00");
    }

    /// PR-002: overtime on top of a full month
    #[test]
    fn test_full_month_with_overtime() {
        let employee = create_test_employee(Some("3000.00"));
        let period = PayPeriod::for_month(2024, 4).unwrap();
        let records = weekday_records(&period, 22, "9.0");

        let breakdown =
            calculate_monthly_payroll(&employee, period, &records, &PayrollPolicy::default())
                .unwrap();

        assert_eq!(breakdown.absent_days, 0);
        assert_eq!(breakdown.overtime_hours, dec("22"));
        // 22h * 18.75
        assert_eq!(breakdown.overtime_amount, dec("412.50"));
        assert_eq!(breakdown.gross_pay, dec("3712.50"));
        assert_eq!(breakdown.tax_deduction, dec("371.25"));
        assert_eq!(breakdown.other_deductions, dec("185.63"));
        assert_eq!(breakdown.net_pay, dec("3155.62"));
    }

    /// PR-003: high earner crosses the tax threshold
    #[test]
    fn test_high_earner_uses_high_tax_rate() {
        let employee = create_test_employee(Some("60000.00"));
        let period = PayPeriod::for_month(2024, 4).unwrap();
        let records = weekday_records(&period, 22, "8");

        let breakdown =
            calculate_monthly_payroll(&employee, period, &records, &PayrollPolicy::default())
                .unwrap();

        assert_eq!(breakdown.gross_pay, dec("66000.00"));
        assert_eq!(breakdown.tax_rate, dec("0.15"));
        assert_eq!(breakdown.tax_deduction, dec("9900.00"));
    }

    #[test]
    fn test_missing_salary_warns_and_pays_zero() {
        let employee = create_test_employee(None);
        let period = PayPeriod::for_month(2024, 4).unwrap();

        let breakdown =
            calculate_monthly_payroll(&employee, period, &[], &PayrollPolicy::default()).unwrap();

        assert_eq!(breakdown.gross_pay, Decimal::ZERO);
        assert_eq!(breakdown.net_pay, Decimal::ZERO);
        assert_eq!(breakdown.audit_trace.warnings[0].code, "NO_SALARY");
    }

    #[test]
    fn test_negative_salary_is_rejected() {
        let employee = create_test_employee(Some("-1.00"));
        let period = PayPeriod::for_month(2024, 4).unwrap();
        let result = calculate_monthly_payroll(&employee, period, &[], &PayrollPolicy::default());
        assert!(matches!(result, Err(HrmsError::Validation { .. })));
    }

    #[test]
    fn test_salary_above_cap_is_rejected() {
        let employee = create_test_employee(Some("75000000000000000000000000000"));
        let period = PayPeriod::for_month(2024, 4).unwrap();
        match calculate_monthly_payroll(&employee, period, &[], &PayrollPolicy::default()) {
            Err(HrmsError::Validation { field, .. }) => assert_eq!(field, "salary"),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_salary_at_cap_with_overtime_does_not_overflow() {
        let employee = create_test_employee(Some("1000000000"));
        let period = PayPeriod::for_month(2024, 4).unwrap();
        let records = weekday_records(&period, 22, "16");
        let breakdown =
            calculate_monthly_payroll(&employee, period, &records, &PayrollPolicy::default()).unwrap();
        assert!(breakdown.overtime_amount > Decimal::ZERO);
        assert_eq!(breakdown.tax_rate, Decimal::new(15, 2));
    }

    #[test]
    fn test_non_present_statuses_contribute_hours_but_not_days() {
        let employee = create_test_employee(Some("3000.00"));
        let period = PayPeriod::for_month(2024, 4).unwrap();
        let mut records = weekday_records(&period, 21, "8");
        let mut late = AttendanceRecord::new(
            "EMP000001",
            NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
            AttendanceStatus::Late,
        );
        late.total_hours = Some(dec("6"));
        records.push(late);

        let breakdown =
            calculate_monthly_payroll(&employee, period, &records, &PayrollPolicy::default())
                .unwrap();

        assert_eq!(breakdown.actual_days, 21);
        assert_eq!(breakdown.absent_days, 1);
        assert_eq!(breakdown.total_hours, dec("174"));
        assert_eq!(breakdown.overtime_hours, dec("6"));
    }

    #[test]
    fn test_records_outside_period_are_ignored() {
        let employee = create_test_employee(Some("3000.00"));
        let period = PayPeriod::for_month(2024, 4).unwrap();
        let mut records = weekday_records(&period, 22, "8");
        records.push(present_day(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), "8"));

        let breakdown =
            calculate_monthly_payroll(&employee, period, &records, &PayrollPolicy::default())
                .unwrap();

        assert_eq!(breakdown.actual_days, 22);
        assert_eq!(
            breakdown.audit_trace.warnings[0].code,
            "RECORDS_OUTSIDE_PERIOD"
        );
    }

    #[test]
    fn test_audit_trace_has_one_step_per_rule_in_order() {
        let employee = create_test_employee(Some("3000.00"));
        let period = PayPeriod::for_month(2024, 4).unwrap();

        let breakdown =
            calculate_monthly_payroll(&employee, period, &[], &PayrollPolicy::default()).unwrap();

        let rule_ids: Vec<&str> = breakdown
            .audit_trace
            .steps
            .iter()
            .map(|step| step.rule_id.as_str())
            .collect();
        assert_eq!(
            rule_ids,
            vec![
                "working_days",
                "attendance_summary",
                "daily_rate",
                "absence_deduction",
                "overtime",
                "allowances",
                "gross_pay",
                "tax",
                "other_deductions",
                "net_pay",
            ]
        );
        for (index, step) in breakdown.audit_trace.steps.iter().enumerate() {
            assert_eq!(step.step_number, index as u32 + 1);
        }
    }

    proptest! {
        #[test]
        fn prop_net_and_gross_identities_hold(
            salary_cents in 0i64..20_000_000,
            present in 0usize..=22,
            hours_tenths in 0i64..160,
        ) {
            let mut employee = create_test_employee(None);
            employee.salary = Some(Decimal::new(salary_cents, 2));
            let period = PayPeriod::for_month(2024, 4).unwrap();
            let hours = Decimal::new(hours_tenths, 1).to_string();
            let records = weekday_records(&period, present, &hours);

            let breakdown = calculate_monthly_payroll(&employee, period, &records, &PayrollPolicy::default()).unwrap();

            prop_assert_eq!(
                breakdown.gross_pay,
                breakdown.basic_salary + breakdown.allowances + breakdown.overtime_amount - breakdown.absence_deduction
            );
            prop_assert_eq!(
                breakdown.net_pay,
                breakdown.gross_pay - breakdown.tax_deduction - breakdown.other_deductions
            );
            prop_assert!(breakdown.overtime_hours >= Decimal::ZERO);
        }

        #[test]
        fn prop_calculation_is_deterministic(
            salary_cents in 0i64..20_000_000,
            present in 0usize..=22,
        ) {
            let mut employee = create_test_employee(None);
            employee.salary = Some(Decimal::new(salary_cents, 2));
            let period = PayPeriod::for_month(2024, 4).unwrap();
            let records = weekday_records(&period, present, "8.5");
            let policy = PayrollPolicy::default();

            let first = calculate_monthly_payroll(&employee, period, &records, &policy).unwrap();
            let second = calculate_monthly_payroll(&employee, period, &records, &policy).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
