//! HTTP request handlers for the People360 API.
//!
//! Every handler opens a [`RequestContext`], which tags the request with a
//! correlation id and logs its outcome and duration.

mod attendance;
mod employees;
mod leave;
mod payroll;

use std::time::Instant;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::HrmsResult;

use super::response::{ApiErrorResponse, MessageResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/employees",
            get(employees::list_employees).post(employees::register_employee),
        )
        .route("/employees/:employee_id", get(employees::get_employee))
        .route(
            "/employees/:employee_id/terminate",
            post(employees::terminate_employee),
        )
        .route(
            "/employees/:employee_id/manager",
            put(employees::assign_manager),
        )
        .route("/attendance/check-in", post(attendance::check_in))
        .route("/attendance/check-out", post(attendance::check_out))
        .route(
            "/attendance/report/:employee_id",
            get(attendance::attendance_report),
        )
        .route(
            "/attendance/:employee_id/:date",
            put(attendance::record_attendance),
        )
        .route("/leave/apply", post(leave::apply_leave))
        .route("/leave/approve/:id", post(leave::approve_leave))
        .route("/leave/reject/:id", post(leave::reject_leave))
        .route("/leave/cancel/:id", post(leave::cancel_leave))
        .route("/leave/balance", get(leave::leave_balance))
        .route("/leave/applications", get(leave::my_applications))
        .route("/leave/applications/:id", get(leave::get_application))
        .route("/leave/pending", get(leave::pending_applications))
        .route(
            "/payroll/preview/:employee_id",
            get(payroll::preview_payroll),
        )
        .route("/payroll/run", post(payroll::run_payroll))
        .route(
            "/payroll/employee/:employee_id",
            get(payroll::employee_payroll),
        )
        .route("/payroll/:id", get(payroll::get_payroll))
        .route("/payroll/:id/process", post(payroll::process_payroll))
        .route("/payroll/:id/pay", post(payroll::mark_paid))
        .route("/payroll/:id/payslip", get(payroll::payslip))
        .with_state(state)
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

/// Handler for GET /health.
async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Per-request logging scope.
struct RequestContext {
    correlation_id: Uuid,
    operation: &'static str,
    started: Instant,
}

impl RequestContext {
    /// Generates a correlation id and logs the start of `operation`.
    fn start(operation: &'static str) -> Self {
        let correlation_id = Uuid::new_v4();
        info!(correlation_id = %correlation_id, operation, "Processing request");
        Self {
            correlation_id,
            operation,
            started: Instant::now(),
        }
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Renders a service result, logging success or failure.
    fn finish<T: Serialize>(
        self,
        status: StatusCode,
        message: &str,
        result: HrmsResult<T>,
    ) -> Response {
        match result {
            Ok(data) => {
                info!(
                    correlation_id = %self.correlation_id,
                    operation = self.operation,
                    duration_us = self.started.elapsed().as_micros(),
                    "Request completed successfully"
                );
                (status, Json(MessageResponse::new(message, data))).into_response()
            }
            Err(err) => {
                warn!(
                    correlation_id = %self.correlation_id,
                    operation = self.operation,
                    error = %err,
                    "Request failed"
                );
                ApiErrorResponse::from(err).into_response()
            }
        }
    }

    /// Renders an extraction failure.
    fn reject(self, error: ApiErrorResponse) -> Response {
        warn!(
            correlation_id = %self.correlation_id,
            operation = self.operation,
            code = %error.error.code,
            "Request rejected"
        );
        error.into_response()
    }
}
