//! Response types for the People360 API.
//!
//! Successful calls answer `{ "message": ..., "data": ... }`; failures answer
//! `{ "error": ..., "code": ..., "details": ... }` with the status chosen by
//! the `From<HrmsError>` mapping below.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::HrmsError;

/// Body of a successful response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse<T> {
    /// Human-readable outcome.
    pub message: String,
    /// The payload, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> MessageResponse<T> {
    /// Creates a response carrying `data`.
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    #[serde(rename = "error")]
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response with the given body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    /// A 401 response for a request without a usable identity.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: ApiError::new("UNAUTHENTICATED", message),
        }
    }

    /// Maps a JSON body rejection, logging it under `correlation_id`.
    pub fn from_json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> Self {
        let error = match rejection {
            JsonRejection::JsonDataError(err) => {
                let body_text = err.body_text();
                warn!(
                    correlation_id = %correlation_id,
                    error = %body_text,
                    "JSON data error"
                );
                if body_text.contains("missing field") {
                    ApiError::validation_error(body_text)
                } else {
                    ApiError::malformed_json(body_text)
                }
            }
            JsonRejection::JsonSyntaxError(err) => {
                warn!(
                    correlation_id = %correlation_id,
                    error = %err,
                    "JSON syntax error"
                );
                ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
            }
            _ => ApiError::malformed_json("Failed to parse request body"),
        };
        Self::bad_request(error)
    }

    /// Maps a query-string rejection.
    pub fn from_query_rejection(correlation_id: Uuid, rejection: QueryRejection) -> Self {
        warn!(correlation_id = %correlation_id, error = %rejection.body_text(), "Query rejected");
        Self::bad_request(ApiError::validation_error(rejection.body_text()))
    }

    /// Maps a path-parameter rejection.
    pub fn from_path_rejection(correlation_id: Uuid, rejection: PathRejection) -> Self {
        warn!(correlation_id = %correlation_id, error = %rejection.body_text(), "Path rejected");
        Self::bad_request(ApiError::validation_error(rejection.body_text()))
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<HrmsError> for ApiErrorResponse {
    fn from(error: HrmsError) -> Self {
        let message = error.to_string();
        match error {
            HrmsError::Validation { field, message } => ApiErrorResponse::bad_request(
                ApiError::with_details("VALIDATION_ERROR", message, format!("field: {}", field)),
            ),
            HrmsError::NotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("NOT_FOUND", message),
            },
            HrmsError::InvalidState { current, .. } => {
                ApiErrorResponse::bad_request(ApiError::with_details(
                    "INVALID_STATE",
                    message,
                    format!("current status: {}", current),
                ))
            }
            HrmsError::ImmutableRecord { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("IMMUTABLE_RECORD", message))
            }
            HrmsError::Conflict { message } => {
                ApiErrorResponse::bad_request(ApiError::new("CONFLICT", message))
            }
            HrmsError::Forbidden { .. } => ApiErrorResponse {
                status: StatusCode::FORBIDDEN,
                error: ApiError::new("FORBIDDEN", message),
            },
            HrmsError::ConfigNotFound { .. } | HrmsError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                }
            }
            HrmsError::Storage { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("STORAGE_ERROR", "Storage error", message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"error\":\"Test message\""));
        assert!(!json.contains("details")); // Should be skipped when None
    }

    #[test]
    fn test_message_response_serialization() {
        let response = MessageResponse::new("Leave applied", serde_json::json!({"id": "LVE1"}));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["message"], "Leave applied");
        assert_eq!(json["data"]["id"], "LVE1");
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (HrmsError::validation("end_date", "bad"), StatusCode::BAD_REQUEST),
            (HrmsError::not_found("employee", "EMP1"), StatusCode::NOT_FOUND),
            (
                HrmsError::InvalidState {
                    entity: "leave application".to_string(),
                    id: "LVE1".to_string(),
                    current: "approved".to_string(),
                    attempted: "reject".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                HrmsError::ImmutableRecord {
                    id: "x".to_string(),
                    status: "paid".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                HrmsError::Conflict {
                    message: "Already checked in today".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                HrmsError::Forbidden {
                    role: "employee".to_string(),
                    action: "approve leave".to_string(),
                },
                StatusCode::FORBIDDEN,
            ),
            (
                HrmsError::Storage {
                    message: "down".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            let response: ApiErrorResponse = error.into();
            assert_eq!(response.status, expected);
        }
    }

    #[test]
    fn test_conflict_keeps_plain_message() {
        let response: ApiErrorResponse = HrmsError::Conflict {
            message: "Already checked in today".to_string(),
        }
        .into();
        assert_eq!(response.error.code, "CONFLICT");
        assert_eq!(response.error.message, "Already checked in today");
    }
}
