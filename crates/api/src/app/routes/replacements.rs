use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use chariot_auth::Permission;
use chariot_core::LogId;

use crate::app::extract::ApiJson;
use crate::app::{dto, errors, AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/pending", get(pending))
        .route("/:log_id", post(replace))
}

pub async fn pending(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::LOGS_READ) {
        return resp;
    }

    match services.chariot().pending_replacements().await {
        Ok(logs) => {
            let logs: Vec<_> = logs.iter().map(dto::log_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "logs": logs }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Put the checked items of one log back on the cart.
pub async fn replace(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(log_id): Path<String>,
    ApiJson(body): ApiJson<dto::ReplacementRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::REPLACEMENT_COMMIT) {
        return resp;
    }

    let log_id: LogId = match log_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid log id"),
    };
    let checked = match dto::parse_item_ids(&body.item_ids) {
        Ok(ids) => ids,
        Err(resp) => return resp,
    };

    match services
        .chariot()
        .commit_replacement(log_id, &checked, principal.display_name(), Utc::now())
        .await
    {
        Ok(res) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "resolved": res.resolved,
                "log": dto::log_to_json(&res.log),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
