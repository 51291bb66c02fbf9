//! HTTP API module for People360.
//!
//! This module provides the JSON endpoints for the employee directory,
//! attendance, the leave workflow and payroll.

mod auth;
mod handlers;
mod request;
mod response;
mod state;

pub use auth::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
pub use handlers::create_router;
pub use request::{
    ApplyLeaveRequest, AssignManagerRequest, AttendanceCorrectionRequest, ClockRequest,
    DateRangeQuery, EmployeeQuery, OptionalJson, PeriodQuery, RegisterEmployeeRequest, RejectLeaveRequest,
    RunPayrollRequest,
};
pub use response::{ApiError, ApiErrorResponse, MessageResponse};
pub use state::{AppState, Stores};
