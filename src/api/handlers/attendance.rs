//! Attendance endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Response,
};
use chrono::{Local, NaiveDate};

use crate::api::request::{AttendanceCorrectionRequest, ClockRequest, DateRangeQuery, OptionalJson};
use crate::api::response::ApiErrorResponse;
use crate::api::state::AppState;
use crate::services::Actor;

use super::RequestContext;

fn resolve_clock(actor: &Actor, request: ClockRequest) -> (String, chrono::NaiveDateTime) {
    let employee_id = request
        .employee_id
        .unwrap_or_else(|| actor.employee_id.clone());
    let at = request
        .timestamp
        .unwrap_or_else(|| Local::now().naive_local());
    (employee_id, at)
}

/// Handler for POST /attendance/check-in.
///
/// The body is optional; without one the caller checks in now.
pub(super) async fn check_in(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<OptionalJson<ClockRequest>, JsonRejection>,
) -> Response {
    let ctx = RequestContext::start("attendance.check_in");
    let request = match payload {
        Ok(OptionalJson(req)) => req,
        Err(rejection) => {
            let error = ApiErrorResponse::from_json_rejection(ctx.correlation_id(), rejection);
            return ctx.reject(error);
        }
    };
    let (employee_id, at) = resolve_clock(&actor, request);
    let result = state.attendance().check_in(&actor, &employee_id, at);
    ctx.finish(StatusCode::OK, "Check-in successful", result)
}

/// Handler for POST /attendance/check-out.
pub(super) async fn check_out(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<OptionalJson<ClockRequest>, JsonRejection>,
) -> Response {
    let ctx = RequestContext::start("attendance.check_out");
    let request = match payload {
        Ok(OptionalJson(req)) => req,
        Err(rejection) => {
            let error = ApiErrorResponse::from_json_rejection(ctx.correlation_id(), rejection);
            return ctx.reject(error);
        }
    };
    let (employee_id, at) = resolve_clock(&actor, request);
    let result = state.attendance().check_out(&actor, &employee_id, at);
    ctx.finish(StatusCode::OK, "Check-out successful", result)
}

/// Handler for PUT /attendance/:employee_id/:date.
pub(super) async fn record_attendance(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<(String, NaiveDate)>, PathRejection>,
    payload: Result<Json<AttendanceCorrectionRequest>, JsonRejection>,
) -> Response {
    let ctx = RequestContext::start("attendance.record");
    let (employee_id, date) = match path {
        Ok(Path(params)) => params,
        Err(rejection) => {
            let error = ApiErrorResponse::from_path_rejection(ctx.correlation_id(), rejection);
            return ctx.reject(error);
        }
    };
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = ApiErrorResponse::from_json_rejection(ctx.correlation_id(), rejection);
            return ctx.reject(error);
        }
    };

    let result = state
        .attendance()
        .record_attendance(&actor, request.into_correction(employee_id, date));
    ctx.finish(StatusCode::OK, "Attendance recorded", result)
}

/// Handler for GET /attendance/report/:employee_id?start=&end=.
pub(super) async fn attendance_report(
    State(state): State<AppState>,
    actor: Actor,
    Path(employee_id): Path<String>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Response {
    let ctx = RequestContext::start("attendance.report");
    let range = match query {
        Ok(Query(range)) => range,
        Err(rejection) => {
            let error = ApiErrorResponse::from_query_rejection(ctx.correlation_id(), rejection);
            return ctx.reject(error);
        }
    };

    let result = state
        .attendance()
        .attendance_report(&actor, &employee_id, range.start, range.end);
    ctx.finish(StatusCode::OK, "Attendance report", result)
}
