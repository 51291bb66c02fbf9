//! Employee model and related types.
//!
//! This module defines the [`Employee`] struct, its [`EmployeeStatus`], and the
//! closed [`Role`] enumeration used for access control.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on a monthly salary. Every payroll figure derived from a salary
/// at or below it stays within `Decimal` range.
pub const MAX_MONTHLY_SALARY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Employment status of an employee.
///
/// Employees are never physically removed; termination is a status change
/// so that attendance and payroll history stay intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Currently employed and able to apply for leave or clock in.
    Active,
    /// Temporarily inactive (e.g., extended absence).
    Inactive,
    /// Soft-deleted.
    Terminated,
}

impl std::fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmployeeStatus::Active => write!(f, "active"),
            EmployeeStatus::Inactive => write!(f, "inactive"),
            EmployeeStatus::Terminated => write!(f, "terminated"),
        }
    }
}

/// The role a user acts under.
///
/// Capabilities are decided by exhaustive matches on this enum rather than by
/// comparing free-text role names.
///
/// # Example
///
/// ```
/// use people360::models::Role;
///
/// assert!(Role::HrManager.can_access_hr());
/// assert!(!Role::SalesManager.can_access_hr());
/// assert_eq!("hr_manager".parse::<Role>().unwrap(), Role::HrManager);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// Human-resources manager.
    HrManager,
    /// Sales manager (CRM side).
    SalesManager,
    /// Support agent (CRM side).
    SupportAgent,
    /// Regular employee.
    Employee,
    /// External customer account.
    Customer,
}

impl Role {
    /// Returns true if the role may use HR features (approvals, payroll,
    /// employee records).
    pub fn can_access_hr(self) -> bool {
        match self {
            Role::Admin | Role::HrManager => true,
            Role::SalesManager | Role::SupportAgent | Role::Employee | Role::Customer => false,
        }
    }

    /// Returns true if the role may use CRM features.
    pub fn can_access_crm(self) -> bool {
        match self {
            Role::Admin | Role::SalesManager | Role::SupportAgent => true,
            Role::HrManager | Role::Employee | Role::Customer => false,
        }
    }

    /// Returns true if the role may manage user accounts.
    pub fn can_manage_users(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Returns the wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::HrManager => "hr_manager",
            Role::SalesManager => "sales_manager",
            Role::SupportAgent => "support_agent",
            Role::Employee => "employee",
            Role::Customer => "customer",
        }
    }

    /// Returns the human-readable name of the role.
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::HrManager => "HR Manager",
            Role::SalesManager => "Sales Manager",
            Role::SupportAgent => "Support Agent",
            Role::Employee => "Employee",
            Role::Customer => "Customer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "hr_manager" => Ok(Role::HrManager),
            "sales_manager" => Ok(Role::SalesManager),
            "support_agent" => Ok(Role::SupportAgent),
            "employee" => Ok(Role::Employee),
            "customer" => Ok(Role::Customer),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Represents an employee in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Opaque, stable identifier.
    pub id: Uuid,
    /// Unique display code (e.g., "EMP4K2Q9Z").
    pub employee_id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email, used for notifications.
    pub email: String,
    /// Department name, if assigned.
    #[serde(default)]
    pub department: Option<String>,
    /// Job title, if assigned.
    #[serde(default)]
    pub position: Option<String>,
    /// Monthly baseline salary.
    #[serde(default)]
    pub salary: Option<Decimal>,
    /// Employment status.
    pub status: EmployeeStatus,
    /// Display code of the employee's direct manager.
    #[serde(default)]
    pub manager_id: Option<String>,
    /// The role this employee acts under.
    pub role: Role,
    /// The date the employee was hired.
    pub hire_date: NaiveDate,
}

impl Employee {
    /// Returns the employee's full name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns true if the employee is active.
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    /// Returns the monthly salary, treating a missing salary as zero.
    pub fn monthly_salary(&self) -> Decimal {
        self.salary.unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_employee(status: EmployeeStatus) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            employee_id: "EMP000001".to_string(),
            first_name: "Amina".to_string(),
            last_name: "Odhiambo".to_string(),
            email: "amina@example.com".to_string(),
            department: Some("Finance".to_string()),
            position: Some("Analyst".to_string()),
            salary: Some(Decimal::new(300000, 2)),
            status,
            manager_id: None,
            role: Role::Employee,
            hire_date: NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
        }
    }

    #[test]
    fn test_deserialize_employee() {
        let json = r#"{
            "id": "6f1c1c50-8d3e-4a43-9a8e-2b1f5f2d3c4b",
            "employee_id": "EMP000002",
            "first_name": "Juma",
            "last_name": "Mwangi",
            "email": "juma@example.com",
            "salary": "4500.00",
            "status": "active",
            "role": "hr_manager",
            "hire_date": "2021-01-04"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.employee_id, "EMP000002");
        assert_eq!(employee.salary, Some(Decimal::new(450000, 2)));
        assert_eq!(employee.role, Role::HrManager);
        assert!(employee.department.is_none());
        assert!(employee.manager_id.is_none());
    }

    #[test]
    fn test_full_name() {
        let employee = create_test_employee(EmployeeStatus::Active);
        assert_eq!(employee.full_name(), "Amina Odhiambo");
    }

    #[test]
    fn test_is_active() {
        assert!(create_test_employee(EmployeeStatus::Active).is_active());
        assert!(!create_test_employee(EmployeeStatus::Inactive).is_active());
        assert!(!create_test_employee(EmployeeStatus::Terminated).is_active());
    }

    #[test]
    fn test_missing_salary_is_zero() {
        let mut employee = create_test_employee(EmployeeStatus::Active);
        employee.salary = None;
        assert_eq!(employee.monthly_salary(), Decimal::ZERO);
    }

    #[test]
    fn test_role_capabilities() {
        assert!(Role::Admin.can_access_hr());
        assert!(Role::HrManager.can_access_hr());
        assert!(!Role::Employee.can_access_hr());
        assert!(!Role::Customer.can_access_hr());

        assert!(Role::SupportAgent.can_access_crm());
        assert!(!Role::HrManager.can_access_crm());

        assert!(Role::Admin.can_manage_users());
        assert!(!Role::HrManager.can_manage_users());
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [
            Role::Admin,
            Role::HrManager,
            Role::SalesManager,
            Role::SupportAgent,
            Role::Employee,
            Role::Customer,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&EmployeeStatus::Terminated).unwrap(),
            "\"terminated\""
        );
        assert_eq!(EmployeeStatus::Inactive.to_string(), "inactive");
    }
}
