//! Application state for the People360 API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::services::{AttendanceService, EmployeeService, LeaveWorkflow, Notifier, PayrollService};
use crate::store::{
    AttendanceStore, EmployeeDirectory, InMemoryAttendanceStore, InMemoryEmployeeDirectory,
    InMemoryLeaveStore, InMemoryPayrollStore, LeaveStore, PayrollStore, PgStore,
};

/// The stores the services are wired over.
#[derive(Clone)]
pub struct Stores {
    /// Employee directory.
    pub directory: Arc<dyn EmployeeDirectory>,
    /// Attendance ledger.
    pub attendance: Arc<dyn AttendanceStore>,
    /// Leave applications.
    pub leaves: Arc<dyn LeaveStore>,
    /// Payroll records.
    pub payroll: Arc<dyn PayrollStore>,
}

impl Stores {
    /// Empty in-memory stores.
    pub fn in_memory() -> Self {
        Self::with_directory(Arc::new(InMemoryEmployeeDirectory::new()))
    }

    /// In-memory stores around an existing directory.
    pub fn with_directory(directory: Arc<dyn EmployeeDirectory>) -> Self {
        Self {
            directory,
            attendance: Arc::new(InMemoryAttendanceStore::new()),
            leaves: Arc::new(InMemoryLeaveStore::new()),
            payroll: Arc::new(InMemoryPayrollStore::new()),
        }
    }

    /// Postgres-backed stores sharing one pool.
    pub fn postgres(store: &PgStore) -> Self {
        Self {
            directory: Arc::new(store.directory()),
            attendance: Arc::new(store.attendance()),
            leaves: Arc::new(store.leaves()),
            payroll: Arc::new(store.payroll()),
        }
    }
}

/// Shared application state.
///
/// Holds the services every handler calls.
#[derive(Clone)]
pub struct AppState {
    employees: EmployeeService,
    attendance: AttendanceService,
    leave: LeaveWorkflow,
    payroll: PayrollService,
}

impl AppState {
    /// Wires the services over `stores`, sending notifications to `notifier`.
    pub fn new(config: &ConfigLoader, stores: Stores, notifier: Arc<dyn Notifier>) -> Self {
        let policy = config.payroll_policy().clone();
        Self {
            employees: EmployeeService::new(stores.directory.clone()),
            attendance: AttendanceService::new(stores.attendance.clone(), stores.directory.clone()),
            leave: LeaveWorkflow::new(
                stores.leaves.clone(),
                stores.directory.clone(),
                notifier.clone(),
            ),
            payroll: PayrollService::new(
                stores.directory,
                stores.attendance,
                stores.payroll,
                notifier,
                policy,
            ),
        }
    }

    /// Employee directory operations.
    pub fn employees(&self) -> &EmployeeService {
        &self.employees
    }

    /// Attendance ledger operations.
    pub fn attendance(&self) -> &AttendanceService {
        &self.attendance
    }

    /// The leave workflow.
    pub fn leave(&self) -> &LeaveWorkflow {
        &self.leave
    }

    /// Payroll operations.
    pub fn payroll(&self) -> &PayrollService {
        &self.payroll
    }
}
