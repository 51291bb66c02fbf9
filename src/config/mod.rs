//! Configuration loading and management for the HRMS core.
//!
//! This module provides functionality to load the payroll policy and
//! notification settings from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use people360::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/people360").unwrap();
//! println!("Allowance rate: {}", config.payroll_policy().allowance_rate);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{NotificationSettings, PayrollPolicy, ServiceConfig, TaxBrackets};
