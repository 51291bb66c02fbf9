//! Core data models for the People360 HRMS core.
//!
//! This module contains all the domain models used throughout the services.

mod attendance;
mod audit;
mod employee;
mod leave;
mod pay_period;
mod payroll;

pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use audit::{AuditStep, AuditTrace, AuditWarning};
pub use employee::{Employee, EmployeeStatus, MAX_MONTHLY_SALARY, Role};
pub use leave::{LeaveApplication, LeaveBalance, LeaveStatus, LeaveType, inclusive_day_count};
pub use pay_period::PayPeriod;
pub use payroll::{
    PayrollBreakdown, PayrollRecord, PayrollStatus, Payslip, PayslipDeductions, PayslipEarnings,
    PayslipEmployee,
};
