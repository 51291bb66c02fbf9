//! Audit trace types.
//!
//! Every payroll rule application records an [`AuditStep`] so that a computed
//! breakdown can be explained line by line.

use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use people360::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
/// };
/// assert!(trace.find_step("daily_rate").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Returns the first step recorded for `rule_id`.
    pub fn find_step(&self, rule_id: &str) -> Option<&AuditStep> {
        self.steps.iter().find(|step| step.rule_id == rule_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_step_by_rule_id() {
        let trace = AuditTrace {
            steps: vec![AuditStep {
                step_number: 1,
                rule_id: "daily_rate".to_string(),
                rule_name: "Daily Rate".to_string(),
                input: serde_json::json!({"basic_salary": "3000.00"}),
                output: serde_json::json!({"daily_rate": "100"}),
                reasoning: "3000.00 / 30 = 100".to_string(),
            }],
            warnings: vec![],
        };

        assert_eq!(trace.find_step("daily_rate").unwrap().step_number, 1);
        assert!(trace.find_step("tax").is_none());
    }

    #[test]
    fn test_audit_trace_serialization() {
        let trace = AuditTrace {
            steps: vec![],
            warnings: vec![AuditWarning {
                code: "NO_SALARY".to_string(),
                message: "Employee has no salary on file".to_string(),
            }],
        };
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["warnings"][0]["code"], "NO_SALARY");
        assert!(json["steps"].as_array().unwrap().is_empty());
    }
}
