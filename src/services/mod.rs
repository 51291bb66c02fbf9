//! Business services for the HRMS core.
//!
//! Services are stateless: each holds `Arc` handles to the stores and
//! collaborators it needs and performs one operation per call. Access
//! control is decided here against the calling [`Actor`].

mod attendance;
mod employee;
#[cfg(test)]
mod fixtures;
mod leave;
pub mod notification;
mod payroll;

use crate::error::{HrmsError, HrmsResult};
use crate::models::Role;

pub use attendance::{AttendanceCorrection, AttendanceReport, AttendanceService};
pub use employee::{EmployeeService, NewEmployee};
pub use leave::{LeaveRequest, LeaveWorkflow};
pub use notification::{
    ChannelNotifier, LogMailer, Mailer, Notification, Notifier, run_delivery,
};
pub use payroll::PayrollService;

/// The identity a request is made under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Display code of the calling employee.
    pub employee_id: String,
    /// The role the caller acts under.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    pub fn new(employee_id: impl Into<String>, role: Role) -> Self {
        Self {
            employee_id: employee_id.into(),
            role,
        }
    }

    /// Returns true if the actor holds an HR role.
    pub fn is_hr(&self) -> bool {
        self.role.can_access_hr()
    }

    /// Returns true if the actor is the given employee.
    pub fn is(&self, employee_id: &str) -> bool {
        self.employee_id == employee_id
    }

    /// Fails with [`HrmsError::Forbidden`] unless the actor holds an HR role.
    pub fn require_hr(&self, action: &str) -> HrmsResult<()> {
        if self.is_hr() {
            Ok(())
        } else {
            Err(self.forbidden(action))
        }
    }

    /// Fails unless the actor is `employee_id` or holds an HR role.
    pub fn require_self_or_hr(&self, employee_id: &str, action: &str) -> HrmsResult<()> {
        if self.is(employee_id) || self.is_hr() {
            Ok(())
        } else {
            Err(self.forbidden(action))
        }
    }

    /// Builds a [`HrmsError::Forbidden`] for this actor.
    pub fn forbidden(&self, action: &str) -> HrmsError {
        HrmsError::Forbidden {
            role: self.role.to_string(),
            action: action.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hr_may_act_for_anyone() {
        let hr = Actor::new("EMP000009", Role::HrManager);
        assert!(hr.require_hr("run payroll").is_ok());
        assert!(hr.require_self_or_hr("EMP000001", "view balance").is_ok());
    }

    #[test]
    fn test_employee_may_only_act_for_self() {
        let employee = Actor::new("EMP000001", Role::Employee);
        assert!(employee.require_self_or_hr("EMP000001", "view balance").is_ok());

        match employee.require_self_or_hr("EMP000002", "view balance") {
            Err(HrmsError::Forbidden { role, action }) => {
                assert_eq!(role, "employee");
                assert_eq!(action, "view balance");
            }
            other => panic!("Expected Forbidden, got {:?}", other),
        }
        assert!(employee.require_hr("run payroll").is_err());
    }

    #[test]
    fn test_crm_roles_are_not_hr() {
        assert!(!Actor::new("EMP000003", Role::SalesManager).is_hr());
        assert!(!Actor::new("EMP000004", Role::SupportAgent).is_hr());
        assert!(Actor::new("EMP000005", Role::Admin).is_hr());
    }
}
