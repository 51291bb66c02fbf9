//! Payroll models.
//!
//! [`PayrollBreakdown`] is the pure output of a payroll calculation.
//! [`PayrollRecord`] is the persisted form of a breakdown, moving through
//! `draft -> processed -> paid`. [`Payslip`] is the presentation view handed
//! to the employee.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditTrace, PayPeriod};

/// Lifecycle status of a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Computed but not yet approved for payment. May be recomputed.
    Draft,
    /// Approved for payment. Immutable from here on.
    Processed,
    /// Payment has been made.
    Paid,
}

impl PayrollStatus {
    /// Returns true if the record may still be recomputed.
    pub fn is_mutable(self) -> bool {
        self == PayrollStatus::Draft
    }
}

impl std::fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayrollStatus::Draft => write!(f, "draft"),
            PayrollStatus::Processed => write!(f, "processed"),
            PayrollStatus::Paid => write!(f, "paid"),
        }
    }
}

/// The full result of a monthly payroll calculation for one employee.
///
/// All money fields are rounded to two decimal places. `gross_pay` and
/// `net_pay` are derived from the rounded components, so
/// `gross_pay == basic_salary + allowances + overtime_amount - absence_deduction`
/// and `net_pay == gross_pay - tax_deduction - other_deductions` hold exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBreakdown {
    /// Display code of the employee.
    pub employee_id: String,
    /// The calendar month the breakdown covers.
    pub pay_period: PayPeriod,
    /// Monthly baseline salary.
    pub basic_salary: Decimal,
    /// Salary per day under the flat-month assumption (unrounded).
    pub daily_rate: Decimal,
    /// Flat allowance.
    pub allowances: Decimal,
    /// Pay for hours beyond the expected daily hours.
    pub overtime_amount: Decimal,
    /// Pay withheld for weekdays without a present record.
    pub absence_deduction: Decimal,
    /// Gross pay.
    pub gross_pay: Decimal,
    /// The tax rate applied to gross pay.
    pub tax_rate: Decimal,
    /// Tax withheld.
    pub tax_deduction: Decimal,
    /// Other flat-rate deductions.
    pub other_deductions: Decimal,
    /// Take-home pay.
    pub net_pay: Decimal,
    /// Weekdays in the period.
    pub working_days: u32,
    /// Days with a present attendance record.
    pub actual_days: u32,
    /// Weekdays not covered by a present record.
    pub absent_days: u32,
    /// Sum of recorded hours.
    pub total_hours: Decimal,
    /// Hours beyond the expected hours.
    pub overtime_hours: Decimal,
    /// Rule-by-rule explanation of the calculation.
    pub audit_trace: AuditTrace,
}

/// A persisted payroll record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Display code of the employee.
    pub employee_id: String,
    /// First day of the pay period.
    pub pay_period_start: NaiveDate,
    /// Last day of the pay period.
    pub pay_period_end: NaiveDate,
    /// Monthly baseline salary.
    pub basic_salary: Decimal,
    /// Flat allowance.
    pub allowances: Decimal,
    /// Overtime pay.
    pub overtime_amount: Decimal,
    /// Pay withheld for absences.
    pub absence_deduction: Decimal,
    /// Gross pay.
    pub gross_pay: Decimal,
    /// Tax withheld.
    pub tax_deduction: Decimal,
    /// Other deductions.
    pub other_deductions: Decimal,
    /// Take-home pay.
    pub net_pay: Decimal,
    /// Lifecycle status.
    pub status: PayrollStatus,
    /// When the record was first created.
    pub created_at: DateTime<Utc>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl PayrollRecord {
    /// Builds a new draft record from a breakdown.
    pub fn draft_from(breakdown: &PayrollBreakdown, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: breakdown.employee_id.clone(),
            pay_period_start: breakdown.pay_period.start_date,
            pay_period_end: breakdown.pay_period.end_date,
            basic_salary: breakdown.basic_salary,
            allowances: breakdown.allowances,
            overtime_amount: breakdown.overtime_amount,
            absence_deduction: breakdown.absence_deduction,
            gross_pay: breakdown.gross_pay,
            tax_deduction: breakdown.tax_deduction,
            other_deductions: breakdown.other_deductions,
            net_pay: breakdown.net_pay,
            status: PayrollStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the pay period the record covers.
    pub fn pay_period(&self) -> PayPeriod {
        PayPeriod {
            start_date: self.pay_period_start,
            end_date: self.pay_period_end,
        }
    }

    /// Sum of all deductions.
    pub fn total_deductions(&self) -> Decimal {
        self.tax_deduction + self.other_deductions
    }
}

/// Employee section of a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipEmployee {
    /// Full name.
    pub name: String,
    /// Display code.
    pub employee_id: String,
    /// Job title, or "N/A".
    pub position: String,
    /// Department, or "N/A".
    pub department: String,
}

/// Earnings section of a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipEarnings {
    /// Monthly baseline salary.
    pub basic_salary: Decimal,
    /// Flat allowance.
    pub allowances: Decimal,
    /// Overtime pay.
    pub overtime: Decimal,
    /// Pay withheld for absences.
    pub absence_deduction: Decimal,
    /// Gross pay.
    pub gross_pay: Decimal,
}

/// Deductions section of a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipDeductions {
    /// Tax withheld.
    pub tax: Decimal,
    /// Other deductions.
    pub other: Decimal,
    /// Sum of all deductions.
    pub total_deductions: Decimal,
}

/// Payslip data for a single payroll record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// The payroll record this payslip was generated from.
    pub payroll_record_id: Uuid,
    /// Who is being paid.
    pub employee: PayslipEmployee,
    /// The pay period covered.
    pub pay_period: PayPeriod,
    /// Earnings breakdown.
    pub earnings: PayslipEarnings,
    /// Deductions breakdown.
    pub deductions: PayslipDeductions,
    /// Take-home pay.
    pub net_pay: Decimal,
    /// Record status at generation time.
    pub status: PayrollStatus,
    /// The date the payslip was generated.
    pub generated_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_sample_breakdown() -> PayrollBreakdown {
        PayrollBreakdown {
            employee_id: "EMP000001".to_string(),
            pay_period: PayPeriod::for_month(2024, 4).unwrap(),
            basic_salary: dec("3000.00"),
            daily_rate: dec("100"),
            allowances: dec("300.00"),
            overtime_amount: dec("0.00"),
            absence_deduction: dec("200.00"),
            gross_pay: dec("3100.00"),
            tax_rate: dec("0.10"),
            tax_deduction: dec("310.00"),
            other_deductions: dec("155.00"),
            net_pay: dec("2635.00"),
            working_days: 22,
            actual_days: 20,
            absent_days: 2,
            total_hours: dec("160"),
            overtime_hours: dec("0"),
            audit_trace: AuditTrace::default(),
        }
    }

    #[test]
    fn test_draft_from_copies_money_fields() {
        let breakdown = create_sample_breakdown();
        let now = Utc::now();
        let record = PayrollRecord::draft_from(&breakdown, now);

        assert_eq!(record.status, PayrollStatus::Draft);
        assert_eq!(record.employee_id, "EMP000001");
        assert_eq!(record.gross_pay, dec("3100.00"));
        assert_eq!(record.net_pay, dec("2635.00"));
        assert_eq!(record.absence_deduction, dec("200.00"));
        assert_eq!(record.pay_period(), breakdown.pay_period);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_total_deductions() {
        let record = PayrollRecord::draft_from(&create_sample_breakdown(), Utc::now());
        assert_eq!(record.total_deductions(), dec("465.00"));
    }

    #[test]
    fn test_only_draft_is_mutable() {
        assert!(PayrollStatus::Draft.is_mutable());
        assert!(!PayrollStatus::Processed.is_mutable());
        assert!(!PayrollStatus::Paid.is_mutable());
    }

    #[test]
    fn test_money_serializes_as_string() {
        let record = PayrollRecord::draft_from(&create_sample_breakdown(), Utc::now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["net_pay"], "2635.00");
        assert_eq!(json["status"], "draft");
    }
}
