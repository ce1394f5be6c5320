use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use chariot_auth::AuthError;
use chariot_core::DomainError;
use chariot_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => match e {
            DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
            DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
            DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        },
        ServiceError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        ServiceError::Auth(AuthError::InvalidCredentials) => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid username or password",
        ),
        ServiceError::Auth(e) => {
            tracing::error!(error = %e, "authentication backend failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "auth_error", e.to_string())
        }
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
        ServiceError::Report(e) => {
            tracing::error!(error = %e, "report generation failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "report_error", e.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
