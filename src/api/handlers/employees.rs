//! Employee directory endpoints.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use chrono::Local;

use crate::api::request::{AssignManagerRequest, RegisterEmployeeRequest};
use crate::api::response::ApiErrorResponse;
use crate::api::state::AppState;
use crate::services::Actor;

use super::RequestContext;

/// Handler for GET /employees.
pub(super) async fn list_employees(State(state): State<AppState>, actor: Actor) -> Response {
    let ctx = RequestContext::start("employees.list");
    let result = state.employees().list(&actor);
    ctx.finish(StatusCode::OK, "Employees retrieved", result)
}

/// Handler for POST /employees.
pub(super) async fn register_employee(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<RegisterEmployeeRequest>, JsonRejection>,
) -> Response {
    let ctx = RequestContext::start("employees.register");
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = ApiErrorResponse::from_json_rejection(ctx.correlation_id(), rejection);
            return ctx.reject(error);
        }
    };

    let today = Local::now().date_naive();
    let result = state.employees().register(&actor, request.into(), today);
    ctx.finish(StatusCode::CREATED, "Employee registered successfully", result)
}

/// Handler for GET /employees/:employee_id.
pub(super) async fn get_employee(
    State(state): State<AppState>,
    actor: Actor,
    Path(employee_id): Path<String>,
) -> Response {
    let ctx = RequestContext::start("employees.get");
    let result = actor
        .require_self_or_hr(&employee_id, "view another employee's record")
        .and_then(|()| state.employees().get(&employee_id));
    ctx.finish(StatusCode::OK, "Employee retrieved", result)
}

/// Handler for POST /employees/:employee_id/terminate.
pub(super) async fn terminate_employee(
    State(state): State<AppState>,
    actor: Actor,
    Path(employee_id): Path<String>,
) -> Response {
    let ctx = RequestContext::start("employees.terminate");
    let result = state.employees().terminate(&actor, &employee_id);
    ctx.finish(StatusCode::OK, "Employee terminated", result)
}

/// Handler for PUT /employees/:employee_id/manager.
pub(super) async fn assign_manager(
    State(state): State<AppState>,
    actor: Actor,
    Path(employee_id): Path<String>,
    payload: Result<Json<AssignManagerRequest>, JsonRejection>,
) -> Response {
    let ctx = RequestContext::start("employees.assign_manager");
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = ApiErrorResponse::from_json_rejection(ctx.correlation_id(), rejection);
            return ctx.reject(error);
        }
    };

    let result =
        state
            .employees()
            .assign_manager(&actor, &employee_id, request.manager_id.as_deref());
    ctx.finish(StatusCode::OK, "Manager assigned", result)
}
