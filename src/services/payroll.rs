//! Payroll runs and the payroll record lifecycle.
//!
//! Records move `draft -> processed -> paid`. A draft may be recomputed any
//! number of times; once processed it is immutable.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::calculation::calculate_monthly_payroll;
use crate::config::PayrollPolicy;
use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    Employee, PayPeriod, PayrollBreakdown, PayrollRecord, PayrollStatus, Payslip,
    PayslipDeductions, PayslipEarnings, PayslipEmployee,
};
use crate::store::{AttendanceStore, EmployeeDirectory, PayrollStore, TransitionOutcome};

use super::notification::payslip_notice;
use super::{Actor, Notifier};

/// Computes, persists and advances payroll records.
#[derive(Clone)]
pub struct PayrollService {
    directory: Arc<dyn EmployeeDirectory>,
    attendance: Arc<dyn AttendanceStore>,
    payroll: Arc<dyn PayrollStore>,
    notifier: Arc<dyn Notifier>,
    policy: PayrollPolicy,
}

impl PayrollService {
    /// Creates the service over its stores, collaborators and policy.
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        attendance: Arc<dyn AttendanceStore>,
        payroll: Arc<dyn PayrollStore>,
        notifier: Arc<dyn Notifier>,
        policy: PayrollPolicy,
    ) -> Self {
        Self {
            directory,
            attendance,
            payroll,
            notifier,
            policy,
        }
    }

    /// Returns the policy the service calculates with.
    pub fn policy(&self) -> &PayrollPolicy {
        &self.policy
    }

    fn employee(&self, employee_id: &str) -> HrmsResult<Employee> {
        self.directory
            .get(employee_id)?
            .ok_or_else(|| HrmsError::not_found("employee", employee_id))
    }

    fn record(&self, id: Uuid) -> HrmsResult<PayrollRecord> {
        self.payroll
            .get(id)?
            .ok_or_else(|| HrmsError::not_found("payroll record", id.to_string()))
    }

    /// Calculates a month's payroll without persisting it. HR only.
    ///
    /// # Errors
    ///
    /// - `Validation` if `month` is not in `1..=12`
    /// - `NotFound` if the employee is unknown
    pub fn calculate_monthly_payroll(
        &self,
        actor: &Actor,
        employee_id: &str,
        month: u32,
        year: i32,
    ) -> HrmsResult<PayrollBreakdown> {
        actor.require_hr("calculate payroll")?;
        let period = PayPeriod::for_month(year, month)?;
        let employee = self.employee(employee_id)?;
        let records =
            self.attendance
                .find_range(employee_id, period.start_date, period.end_date)?;
        calculate_monthly_payroll(&employee, period, &records, &self.policy)
    }

    /// Calculates and saves a month's payroll as a draft. HR only.
    ///
    /// Re-running for the same period overwrites the draft in place.
    ///
    /// # Errors
    ///
    /// Returns `ImmutableRecord` if the period's record is already processed
    /// or paid.
    pub fn create_payroll_record(
        &self,
        actor: &Actor,
        employee_id: &str,
        month: u32,
        year: i32,
    ) -> HrmsResult<PayrollRecord> {
        let breakdown = self.calculate_monthly_payroll(actor, employee_id, month, year)?;
        let record = self
            .payroll
            .save_draft(PayrollRecord::draft_from(&breakdown, Utc::now()))?;

        info!(
            payroll_id = %record.id,
            employee_id = %employee_id,
            period = %breakdown.pay_period.label(),
            net_pay = %record.net_pay,
            "Payroll draft saved"
        );
        Ok(record)
    }

    /// Moves a draft to `processed` and notifies the employee. HR only.
    pub fn process_payroll(&self, actor: &Actor, id: Uuid) -> HrmsResult<PayrollRecord> {
        actor.require_hr("process payroll")?;
        let record = self.advance(id, PayrollStatus::Draft, PayrollStatus::Processed, "process")?;

        if let Some(employee) = self.directory.get(&record.employee_id)? {
            self.notifier.notify(payslip_notice(&employee, &record));
        }
        Ok(record)
    }

    /// Moves a processed record to `paid`. HR only.
    pub fn mark_paid(&self, actor: &Actor, id: Uuid) -> HrmsResult<PayrollRecord> {
        actor.require_hr("mark payroll as paid")?;
        self.advance(id, PayrollStatus::Processed, PayrollStatus::Paid, "pay")
    }

    fn advance(
        &self,
        id: Uuid,
        from: PayrollStatus,
        to: PayrollStatus,
        verb: &str,
    ) -> HrmsResult<PayrollRecord> {
        let mut record = self.record(id)?;
        let invalid = |current: PayrollStatus| HrmsError::InvalidState {
            entity: "payroll record".to_string(),
            id: id.to_string(),
            current: current.to_string(),
            attempted: verb.to_string(),
        };
        if record.status != from {
            return Err(invalid(record.status));
        }

        record.status = to;
        record.updated_at = Utc::now();
        match self.payroll.transition(record.clone(), from)? {
            TransitionOutcome::Applied => {
                info!(payroll_id = %id, status = %to, "Payroll record advanced");
                Ok(record)
            }
            TransitionOutcome::Stale { current } => Err(invalid(current)),
        }
    }

    /// Returns one record, visible to HR and to the employee it pays.
    pub fn get_payroll_record(&self, actor: &Actor, id: Uuid) -> HrmsResult<PayrollRecord> {
        let record = self.record(id)?;
        actor.require_self_or_hr(&record.employee_id, "view another employee's payroll")?;
        Ok(record)
    }

    /// Returns an employee's records, newest period first.
    pub fn list_employee_payroll(
        &self,
        actor: &Actor,
        employee_id: &str,
    ) -> HrmsResult<Vec<PayrollRecord>> {
        actor.require_self_or_hr(employee_id, "view another employee's payroll")?;
        self.employee(employee_id)?;
        self.payroll.list_for_employee(employee_id)
    }

    /// Builds the payslip view of a record.
    pub fn generate_payslip(&self, actor: &Actor, id: Uuid, today: NaiveDate) -> HrmsResult<Payslip> {
        let record = self.get_payroll_record(actor, id)?;
        let employee = self.employee(&record.employee_id)?;
        let not_assigned = || "N/A".to_string();

        Ok(Payslip {
            payroll_record_id: record.id,
            employee: PayslipEmployee {
                name: employee.full_name(),
                employee_id: employee.employee_id.clone(),
                position: employee.position.clone().unwrap_or_else(not_assigned),
                department: employee.department.clone().unwrap_or_else(not_assigned),
            },
            pay_period: record.pay_period(),
            earnings: PayslipEarnings {
                basic_salary: record.basic_salary,
                allowances: record.allowances,
                overtime: record.overtime_amount,
                absence_deduction: record.absence_deduction,
                gross_pay: record.gross_pay,
            },
            deductions: PayslipDeductions {
                tax: record.tax_deduction,
                other: record.other_deductions,
                total_deductions: record.total_deductions(),
            },
            net_pay: record.net_pay,
            status: record.status,
            generated_date: today,
        })
    }
}
