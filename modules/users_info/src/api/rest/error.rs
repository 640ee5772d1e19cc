use axum::http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse, ValidationError};

use crate::domain::error::DomainError;

/// Coded problem for `instance`, tagged with the request id when known
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
    trace_id: Option<&str>,
) -> ProblemResponse {
    Problem::coded(status, code, title, detail)
        .with_instance(instance)
        .with_trace_id(trace_id)
        .into()
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str, trace_id: Option<&str>) -> ProblemResponse {
    match e {
        DomainError::Validation {
            message,
            violations,
        } => {
            let mut resp = from_parts(
                StatusCode::BAD_REQUEST,
                "USERS_VALIDATION",
                "Validation error",
                message.clone(),
                instance,
                trace_id,
            );
            resp.0 = resp.0.with_errors(
                violations
                    .iter()
                    .map(|v| ValidationError {
                        detail: v.message.clone(),
                        pointer: v.pointer.to_string(),
                    })
                    .collect(),
            );
            resp
        }
        DomainError::EmailAlreadyExists { email } => from_parts(
            StatusCode::CONFLICT,
            "USERS_EMAIL_CONFLICT",
            "Email already exists",
            format!("Email '{}' is already in use", email),
            instance,
            trace_id,
        ),
        DomainError::UserNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "USERS_NOT_FOUND",
            "User not found",
            format!("User with id {} was not found", id),
            instance,
            trace_id,
        ),
        DomainError::UserNotFoundByEmail { email } => from_parts(
            StatusCode::NOT_FOUND,
            "USERS_NOT_FOUND",
            "User not found",
            format!("User with email '{}' was not found", email),
            instance,
            trace_id,
        ),
        DomainError::Storage { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Storage error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_STORAGE",
                "Internal error",
                "An internal storage error occurred",
                instance,
                trace_id,
            )
        }
    }
}

/// Malformed or mistyped request body.
pub fn bad_body(detail: impl Into<String>, instance: &str, trace_id: Option<&str>) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "USERS_VALIDATION",
        "Validation error",
        detail,
        instance,
        trace_id,
    )
}

/// A path id that is not a UUID cannot name a stored user.
pub fn unknown_id(raw: &str, instance: &str, trace_id: Option<&str>) -> ProblemResponse {
    from_parts(
        StatusCode::NOT_FOUND,
        "USERS_NOT_FOUND",
        "User not found",
        format!("User with id {} was not found", raw),
        instance,
        trace_id,
    )
}
