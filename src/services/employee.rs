//! Employee directory operations.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::error::{HrmsError, HrmsResult};
use crate::models::{Employee, EmployeeStatus, MAX_MONTHLY_SALARY, Role};
use crate::store::{EmployeeDirectory, with_unique_code};

use super::Actor;

/// Input for registering an employee.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Department name.
    pub department: Option<String>,
    /// Job title.
    pub position: Option<String>,
    /// Monthly baseline salary.
    pub salary: Option<Decimal>,
    /// Role to act under.
    pub role: Role,
    /// Display code of the direct manager.
    pub manager_id: Option<String>,
    /// Hire date; defaults to the registration date.
    pub hire_date: Option<NaiveDate>,
}

/// Registers, looks up and maintains employees.
#[derive(Clone)]
pub struct EmployeeService {
    directory: Arc<dyn EmployeeDirectory>,
}

impl EmployeeService {
    /// Creates the service over a directory.
    pub fn new(directory: Arc<dyn EmployeeDirectory>) -> Self {
        Self { directory }
    }

    /// Returns the employee with the given display code.
    pub fn get(&self, employee_id: &str) -> HrmsResult<Employee> {
        self.directory
            .get(employee_id)?
            .ok_or_else(|| HrmsError::not_found("employee", employee_id))
    }

    /// Returns true if the employee exists and is active.
    pub fn exists_active(&self, employee_id: &str) -> HrmsResult<bool> {
        self.directory.exists_active(employee_id)
    }

    /// Returns every employee. HR only.
    pub fn list(&self, actor: &Actor) -> HrmsResult<Vec<Employee>> {
        actor.require_hr("list employees")?;
        self.directory.list()
    }

    /// Registers a new active employee under a freshly generated `EMP` code.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless the actor holds an HR role
    /// - `Validation` for blank names, a malformed email, or a salary that is
    ///   negative or above [`MAX_MONTHLY_SALARY`]
    /// - `NotFound` if the named manager does not exist
    pub fn register(&self, actor: &Actor, new: NewEmployee, today: NaiveDate) -> HrmsResult<Employee> {
        actor.require_hr("register employees")?;

        if new.first_name.trim().is_empty() {
            return Err(HrmsError::validation("first_name", "must not be blank"));
        }
        if new.last_name.trim().is_empty() {
            return Err(HrmsError::validation("last_name", "must not be blank"));
        }
        if !new.email.contains('@') {
            return Err(HrmsError::validation("email", "must be an email address"));
        }
        if new.salary.is_some_and(|salary| salary < Decimal::ZERO) {
            return Err(HrmsError::validation("salary", "must not be negative"));
        }
        if new.salary.is_some_and(|salary| salary > MAX_MONTHLY_SALARY) {
            return Err(HrmsError::validation(
                "salary",
                format!("must not exceed {}", MAX_MONTHLY_SALARY),
            ));
        }
        if let Some(manager_id) = &new.manager_id {
            self.get(manager_id)?;
        }

        let employee = with_unique_code("EMP", |code| {
            let employee = Employee {
                id: Uuid::new_v4(),
                employee_id: code,
                first_name: new.first_name.trim().to_string(),
                last_name: new.last_name.trim().to_string(),
                email: new.email.trim().to_string(),
                department: new.department.clone(),
                position: new.position.clone(),
                salary: new.salary,
                status: EmployeeStatus::Active,
                manager_id: new.manager_id.clone(),
                role: new.role,
                hire_date: new.hire_date.unwrap_or(today),
            };
            self.directory.insert(employee.clone())?;
            Ok(employee)
        })?;

        info!(
            employee_id = %employee.employee_id,
            role = %employee.role,
            registered_by = %actor.employee_id,
            "Employee registered"
        );
        Ok(employee)
    }

    /// Soft-deletes an employee. Terminating twice is a no-op.
    pub fn terminate(&self, actor: &Actor, employee_id: &str) -> HrmsResult<Employee> {
        actor.require_hr("terminate employees")?;
        let employee = self.directory.terminate(employee_id)?;
        info!(
            employee_id = %employee_id,
            terminated_by = %actor.employee_id,
            "Employee terminated"
        );
        Ok(employee)
    }

    /// Sets or clears an employee's direct manager.
    ///
    /// # Errors
    ///
    /// - `Validation` if the employee would manage themselves, directly or
    ///   through a chain of managers
    /// - `NotFound` if either employee does not exist
    pub fn assign_manager(
        &self,
        actor: &Actor,
        employee_id: &str,
        manager_id: Option<&str>,
    ) -> HrmsResult<Employee> {
        actor.require_hr("assign managers")?;
        let employee = self.directory.set_manager(employee_id, manager_id)?;
        info!(
            employee_id = %employee_id,
            manager_id = manager_id.unwrap_or("none"),
            "Manager assigned"
        );
        Ok(employee)
    }
}
