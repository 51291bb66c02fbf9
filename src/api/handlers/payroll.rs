//! Payroll endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Response,
};
use chrono::Local;
use uuid::Uuid;

use crate::api::request::{PeriodQuery, RunPayrollRequest};
use crate::api::response::ApiErrorResponse;
use crate::api::state::AppState;
use crate::services::Actor;

use super::RequestContext;

/// Extracts a payroll record id, rendering a 400 if it is not a UUID.
fn record_id(
    ctx: RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<(RequestContext, Uuid), Response> {
    match path {
        Ok(Path(id)) => Ok((ctx, id)),
        Err(rejection) => {
            let error = ApiErrorResponse::from_path_rejection(ctx.correlation_id(), rejection);
            Err(ctx.reject(error))
        }
    }
}

/// Handler for GET /payroll/preview/:employee_id?month=&year=.
pub(super) async fn preview_payroll(
    State(state): State<AppState>,
    actor: Actor,
    Path(employee_id): Path<String>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Response {
    let ctx = RequestContext::start("payroll.preview");
    let period = match query {
        Ok(Query(period)) => period,
        Err(rejection) => {
            let error = ApiErrorResponse::from_query_rejection(ctx.correlation_id(), rejection);
            return ctx.reject(error);
        }
    };

    let result =
        state
            .payroll()
            .calculate_monthly_payroll(&actor, &employee_id, period.month, period.year);
    ctx.finish(StatusCode::OK, "Payroll calculated", result)
}

/// Handler for POST /payroll/run.
pub(super) async fn run_payroll(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<RunPayrollRequest>, JsonRejection>,
) -> Response {
    let ctx = RequestContext::start("payroll.run");
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = ApiErrorResponse::from_json_rejection(ctx.correlation_id(), rejection);
            return ctx.reject(error);
        }
    };

    let result = state.payroll().create_payroll_record(
        &actor,
        &request.employee_id,
        request.month,
        request.year,
    );
    ctx.finish(StatusCode::CREATED, "Payroll draft saved", result)
}

/// Handler for GET /payroll/:id.
pub(super) async fn get_payroll(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let (ctx, id) = match record_id(RequestContext::start("payroll.get"), path) {
        Ok(found) => found,
        Err(response) => return response,
    };
    let result = state.payroll().get_payroll_record(&actor, id);
    ctx.finish(StatusCode::OK, "Payroll record", result)
}

/// Handler for POST /payroll/:id/process.
pub(super) async fn process_payroll(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let (ctx, id) = match record_id(RequestContext::start("payroll.process"), path) {
        Ok(found) => found,
        Err(response) => return response,
    };
    let result = state.payroll().process_payroll(&actor, id);
    ctx.finish(StatusCode::OK, "Payroll processed", result)
}

/// Handler for POST /payroll/:id/pay.
pub(super) async fn mark_paid(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let (ctx, id) = match record_id(RequestContext::start("payroll.pay"), path) {
        Ok(found) => found,
        Err(response) => return response,
    };
    let result = state.payroll().mark_paid(&actor, id);
    ctx.finish(StatusCode::OK, "Payroll marked as paid", result)
}

/// Handler for GET /payroll/:id/payslip.
pub(super) async fn payslip(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let (ctx, id) = match record_id(RequestContext::start("payroll.payslip"), path) {
        Ok(found) => found,
        Err(response) => return response,
    };
    let today = Local::now().date_naive();
    let result = state.payroll().generate_payslip(&actor, id, today);
    ctx.finish(StatusCode::OK, "Payslip generated", result)
}

/// Handler for GET /payroll/employee/:employee_id.
pub(super) async fn employee_payroll(
    State(state): State<AppState>,
    actor: Actor,
    Path(employee_id): Path<String>,
) -> Response {
    let ctx = RequestContext::start("payroll.list");
    let result = state.payroll().list_employee_payroll(&actor, &employee_id);
    ctx.finish(StatusCode::OK, "Payroll records", result)
}
