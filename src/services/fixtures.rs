//! Shared builders for service tests.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Employee, EmployeeStatus, Role};
use crate::store::InMemoryEmployeeDirectory;

use super::Actor;

pub fn make_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

pub fn employee(code: &str, role: Role) -> Employee {
    Employee {
        id: Uuid::new_v4(),
        employee_id: code.to_string(),
        first_name: format!("First{}", &code[3..]),
        last_name: "Tester".to_string(),
        email: format!("{}@example.com", code.to_lowercase()),
        department: Some("Operations".to_string()),
        position: Some("Associate".to_string()),
        salary: Some(Decimal::new(300000, 2)),
        status: EmployeeStatus::Active,
        manager_id: None,
        role,
        hire_date: make_date("2022-01-03"),
    }
}

/// EMP000001 (employee, managed by EMP000002), EMP000002 (employee),
/// EMP000009 (HR manager), EMP000010 (terminated).
pub fn directory() -> Arc<InMemoryEmployeeDirectory> {
    let mut staff = employee("EMP000001", Role::Employee);
    staff.manager_id = Some("EMP000002".to_string());
    let manager = employee("EMP000002", Role::Employee);
    let hr = employee("EMP000009", Role::HrManager);
    let mut gone = employee("EMP000010", Role::Employee);
    gone.status = EmployeeStatus::Terminated;
    Arc::new(InMemoryEmployeeDirectory::with_employees([
        staff, manager, hr, gone,
    ]))
}

pub fn staff() -> Actor {
    Actor::new("EMP000001", Role::Employee)
}

pub fn manager() -> Actor {
    Actor::new("EMP000002", Role::Employee)
}

pub fn hr() -> Actor {
    Actor::new("EMP000009", Role::HrManager)
}
