use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};

use chariot_auth::Permission;
use chariot_core::LogId;

use crate::app::extract::ApiQuery;
use crate::app::{dto, errors, AppServices};
use crate::authz;
use crate::context::PrincipalContext;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

pub fn router() -> Router {
    Router::new()
        .route("/", get(history))
        .route("/:log_id", delete(delete_log))
}

pub async fn history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiQuery(q): ApiQuery<dto::LimitQuery>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::LOGS_READ) {
        return resp;
    }

    let limit = q.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    match services.chariot().history(limit).await {
        Ok(logs) => {
            let logs: Vec<_> = logs.iter().map(dto::log_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "logs": logs }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Admins only; unresolved logs are refused.
pub async fn delete_log(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(log_id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::LOGS_DELETE) {
        return resp;
    }

    let log_id: LogId = match log_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid log id"),
    };

    match services.chariot().delete_log(log_id).await {
        Ok(()) => {
            tracing::info!(log = %log_id, by = %principal.username(), "log deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
