//! Error types for the People360 HRMS core.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur in the leave workflow, the
//! attendance ledger and payroll processing.

use thiserror::Error;

/// The main error type for the HRMS core.
///
/// Every service operation returns this error type. None of the variants is
/// fatal to the process; each one is meant to be reported at the request
/// boundary.
///
/// # Example
///
/// ```
/// use people360::error::HrmsError;
///
/// let error = HrmsError::NotFound {
///     entity: "employee".to_string(),
///     id: "EMP000000".to_string(),
/// };
/// assert_eq!(error.to_string(), "employee not found: EMP000000");
/// ```
#[derive(Debug, Error)]
pub enum HrmsError {
    /// Input was malformed or violated a business rule.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g., "employee", "leave application").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A state transition was attempted from a state that does not allow it.
    #[error("Cannot {attempted} {entity} '{id}': current status is {current}")]
    InvalidState {
        /// The kind of entity.
        entity: String,
        /// The identifier of the entity.
        id: String,
        /// The status the entity was in.
        current: String,
        /// The action that was attempted (e.g., "approve").
        attempted: String,
    },

    /// A payroll record that is no longer a draft was asked to change.
    #[error("Payroll record '{id}' is {status} and can no longer be modified")]
    ImmutableRecord {
        /// The payroll record id.
        id: String,
        /// The record's current status.
        status: String,
    },

    /// A write lost a race or collided with an existing unique row.
    #[error("Conflict: {message}")]
    Conflict {
        /// A description of the conflict.
        message: String,
    },

    /// The caller's role does not permit the action.
    #[error("Role '{role}' is not permitted to {action}")]
    Forbidden {
        /// The caller's role.
        role: String,
        /// The action that was refused.
        action: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The backing store failed to complete an operation.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the failure.
        message: String,
    },
}

impl HrmsError {
    /// Shorthand for a [`HrmsError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`HrmsError::NotFound`] error.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// A type alias for Results that return HrmsError.
pub type HrmsResult<T> = Result<T, HrmsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_displays_field_and_message() {
        let error = HrmsError::validation("end_date", "must not be before start_date");
        assert_eq!(
            error.to_string(),
            "Invalid field 'end_date': must not be before start_date"
        );
    }

    #[test]
    fn test_not_found_displays_entity_and_id() {
        let error = HrmsError::not_found("leave application", "LVE123ABC");
        assert_eq!(error.to_string(), "leave application not found: LVE123ABC");
    }

    #[test]
    fn test_invalid_state_displays_transition() {
        let error = HrmsError::InvalidState {
            entity: "leave application".to_string(),
            id: "LVE123ABC".to_string(),
            current: "approved".to_string(),
            attempted: "reject".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Cannot reject leave application 'LVE123ABC': current status is approved"
        );
    }

    #[test]
    fn test_immutable_record_displays_status() {
        let error = HrmsError::ImmutableRecord {
            id: "abc".to_string(),
            status: "processed".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Payroll record 'abc' is processed and can no longer be modified"
        );
    }

    #[test]
    fn test_forbidden_displays_role_and_action() {
        let error = HrmsError::Forbidden {
            role: "employee".to_string(),
            action: "approve leave".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Role 'employee' is not permitted to approve leave"
        );
    }

    #[test]
    fn test_config_not_found_displays_path() {
        let error = HrmsError::ConfigNotFound {
            path: "/missing/payroll.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/payroll.yaml"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<HrmsError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_conflict() -> HrmsResult<()> {
            Err(HrmsError::Conflict {
                message: "Already checked in today".to_string(),
            })
        }

        fn propagates_error() -> HrmsResult<()> {
            returns_conflict()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
