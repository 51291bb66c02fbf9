//! Configuration types for the HRMS core.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Income-tax brackets.
///
/// A single threshold: gross pay strictly above `threshold` is taxed at
/// `high_rate`, everything else at `standard_rate`. There is no progressive
/// schedule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxBrackets {
    /// Gross pay above which the high rate applies.
    pub threshold: Decimal,
    /// Rate applied at or below the threshold.
    pub standard_rate: Decimal,
    /// Rate applied above the threshold.
    pub high_rate: Decimal,
}

impl Default for TaxBrackets {
    fn default() -> Self {
        Self {
            threshold: dec!(50000),
            standard_rate: dec!(0.10),
            high_rate: dec!(0.15),
        }
    }
}

/// Company-wide payroll constants.
///
/// These apply to every employee; none of them is overridable per employee.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PayrollPolicy {
    /// Divisor turning the monthly salary into a daily rate. A flat 30
    /// regardless of the month's real length.
    pub days_per_month: Decimal,
    /// Hours expected per present day.
    pub standard_daily_hours: Decimal,
    /// Multiplier applied to the hourly rate for overtime.
    pub overtime_multiplier: Decimal,
    /// Allowance as a fraction of basic salary.
    pub allowance_rate: Decimal,
    /// Tax brackets.
    pub tax: TaxBrackets,
    /// Other deductions as a fraction of gross pay.
    pub other_deduction_rate: Decimal,
}

impl Default for PayrollPolicy {
    fn default() -> Self {
        Self {
            days_per_month: dec!(30),
            standard_daily_hours: dec!(8),
            overtime_multiplier: dec!(1.5),
            allowance_rate: dec!(0.10),
            tax: TaxBrackets::default(),
            other_deduction_rate: dec!(0.05),
        }
    }
}

/// Outgoing mail settings used by the notification delivery task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// SMTP server host.
    pub mail_server: Option<String>,
    /// SMTP port.
    pub mail_port: Option<u16>,
    /// Sender address.
    pub sender: Option<String>,
}

impl NotificationSettings {
    /// Returns true when enough settings are present to deliver mail.
    pub fn is_complete(&self) -> bool {
        self.mail_server.is_some() && self.sender.is_some()
    }

    /// Returns the configured port, defaulting to 587.
    pub fn port(&self) -> u16 {
        self.mail_port.unwrap_or(587)
    }
}

/// The complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Payroll constants.
    pub payroll: PayrollPolicy,
    /// Notification delivery settings.
    pub notifications: NotificationSettings,
}
