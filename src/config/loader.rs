//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading service
//! configuration from YAML files.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{HrmsError, HrmsResult};

use super::types::{NotificationSettings, PayrollPolicy, ServiceConfig};

/// Loads and provides access to service configuration.
///
/// # Directory Structure
///
/// ```text
/// config/people360/
/// ├── payroll.yaml        # Payroll constants (required)
/// └── notifications.yaml  # Mail settings (optional)
/// ```
///
/// # Example
///
/// ```no_run
/// use people360::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/people360").unwrap();
/// println!("Daily rate divisor: {}", loader.payroll_policy().days_per_month);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: ServiceConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `payroll.yaml` is missing
    /// - Any file contains invalid YAML
    /// - The payroll policy contains a non-positive divisor
    pub fn load<P: AsRef<Path>>(path: P) -> HrmsResult<Self> {
        let path = path.as_ref();

        let payroll_path = path.join("payroll.yaml");
        let payroll = Self::load_yaml::<PayrollPolicy>(&payroll_path)?;
        Self::validate_policy(&payroll, &payroll_path)?;

        let notifications_path = path.join("notifications.yaml");
        let notifications = if notifications_path.exists() {
            Self::load_yaml::<NotificationSettings>(&notifications_path)?
        } else {
            NotificationSettings::default()
        };

        Ok(Self {
            config: ServiceConfig {
                payroll,
                notifications,
            },
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> HrmsResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| HrmsError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| HrmsError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_policy(policy: &PayrollPolicy, path: &Path) -> HrmsResult<()> {
        let divisors = [
            ("days_per_month", policy.days_per_month),
            ("standard_daily_hours", policy.standard_daily_hours),
        ];
        for (name, value) in divisors {
            if value <= Decimal::ZERO {
                return Err(HrmsError::ConfigParseError {
                    path: path.display().to_string(),
                    message: format!("{} must be positive, got {}", name, value),
                });
            }
        }
        Ok(())
    }

    /// Returns the payroll constants.
    pub fn payroll_policy(&self) -> &PayrollPolicy {
        &self.config.payroll
    }

    /// Returns the notification settings.
    pub fn notifications(&self) -> &NotificationSettings {
        &self.config.notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::path::PathBuf;

    fn config_path() -> &'static str {
        "./config/people360"
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "people360-config-{}-{}",
            name,
            uuid::Uuid::new_v4()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_valid_configuration() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.payroll_policy(), &PayrollPolicy::default());
        assert_eq!(loader.notifications().port(), 587);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("./config/does-not-exist");
        match result {
            Err(HrmsError::ConfigNotFound { path }) => {
                assert!(path.contains("payroll.yaml"));
            }
            other => panic!("Expected ConfigNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_yaml_returns_parse_error() {
        let dir = scratch_dir("bad-yaml");
        fs::write(dir.join("payroll.yaml"), "days_per_month: [not, a, number\n").unwrap();

        let result = ConfigLoader::load(&dir);
        assert!(matches!(result, Err(HrmsError::ConfigParseError { .. })));
    }

    #[test]
    fn test_zero_days_per_month_is_rejected() {
        let dir = scratch_dir("zero-days");
        fs::write(dir.join("payroll.yaml"), "days_per_month: \"0\"\n").unwrap();

        match ConfigLoader::load(&dir) {
            Err(HrmsError::ConfigParseError { message, .. }) => {
                assert!(message.contains("days_per_month"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_notifications_file_uses_defaults() {
        let dir = scratch_dir("no-notifications");
        fs::write(dir.join("payroll.yaml"), "allowance_rate: \"0.08\"\n").unwrap();

        let loader = ConfigLoader::load(&dir).unwrap();
        assert_eq!(loader.payroll_policy().allowance_rate, dec!(0.08));
        assert!(!loader.notifications().is_complete());
    }
}
