//! People360 HRMS core
//!
//! This crate implements the leave-request workflow, the attendance ledger,
//! the employee directory and the monthly payroll calculator of the People360
//! HR system, and exposes them over a JSON HTTP API.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
