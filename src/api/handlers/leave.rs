//! Leave workflow endpoints.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};

use crate::api::request::{ApplyLeaveRequest, EmployeeQuery, OptionalJson, RejectLeaveRequest};
use crate::api::response::ApiErrorResponse;
use crate::api::state::AppState;
use crate::services::Actor;

use super::RequestContext;

/// Handler for POST /leave/apply.
pub(super) async fn apply_leave(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<ApplyLeaveRequest>, JsonRejection>,
) -> Response {
    let ctx = RequestContext::start("leave.apply");
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = ApiErrorResponse::from_json_rejection(ctx.correlation_id(), rejection);
            return ctx.reject(error);
        }
    };

    let request = request.into_leave_request(&actor.employee_id);
    let result = state.leave().apply(&actor, request);
    ctx.finish(
        StatusCode::CREATED,
        "Leave application submitted successfully",
        result,
    )
}

/// Handler for POST /leave/approve/:id.
pub(super) async fn approve_leave(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response {
    let ctx = RequestContext::start("leave.approve");
    let result = state.leave().approve(&actor, &id);
    ctx.finish(StatusCode::OK, "Leave application approved", result)
}

/// Handler for POST /leave/reject/:id.
///
/// The body is optional; a missing reason becomes "No reason provided".
pub(super) async fn reject_leave(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    payload: Result<OptionalJson<RejectLeaveRequest>, JsonRejection>,
) -> Response {
    let ctx = RequestContext::start("leave.reject");
    let request = match payload {
        Ok(OptionalJson(req)) => req,
        Err(rejection) => {
            let error = ApiErrorResponse::from_json_rejection(ctx.correlation_id(), rejection);
            return ctx.reject(error);
        }
    };
    let result = state
        .leave()
        .reject(&actor, &id, request.reason_or_default());
    ctx.finish(StatusCode::OK, "Leave application rejected", result)
}

/// Handler for POST /leave/cancel/:id.
pub(super) async fn cancel_leave(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response {
    let ctx = RequestContext::start("leave.cancel");
    let result = state.leave().cancel(&actor, &id);
    ctx.finish(StatusCode::OK, "Leave application cancelled", result)
}

/// Handler for GET /leave/balance.
pub(super) async fn leave_balance(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<EmployeeQuery>,
) -> Response {
    let ctx = RequestContext::start("leave.balance");
    let employee_id = query.employee_id.unwrap_or_else(|| actor.employee_id.clone());
    let result = state.leave().balance(&actor, &employee_id);
    ctx.finish(StatusCode::OK, "Leave balance", result)
}

/// Handler for GET /leave/applications.
pub(super) async fn my_applications(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<EmployeeQuery>,
) -> Response {
    let ctx = RequestContext::start("leave.applications");
    let employee_id = query.employee_id.unwrap_or_else(|| actor.employee_id.clone());
    let result = state.leave().employee_applications(&actor, &employee_id);
    ctx.finish(StatusCode::OK, "Leave applications", result)
}

/// Handler for GET /leave/applications/:id.
pub(super) async fn get_application(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response {
    let ctx = RequestContext::start("leave.get");
    let result = state.leave().get(&actor, &id);
    ctx.finish(StatusCode::OK, "Leave application", result)
}

/// Handler for GET /leave/pending.
pub(super) async fn pending_applications(State(state): State<AppState>, actor: Actor) -> Response {
    let ctx = RequestContext::start("leave.pending");
    let result = state.leave().pending(&actor);
    ctx.finish(StatusCode::OK, "Pending leave applications", result)
}
