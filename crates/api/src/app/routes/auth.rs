use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use chariot_auth::SessionClaims;

use crate::app::extract::ApiJson;
use crate::app::{dto, errors, AppServices};
use crate::context::PrincipalContext;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::LoginRequest>,
) -> axum::response::Response {
    let user = match services.chariot().login(&body.username, &body.password).await {
        Ok(u) => u,
        Err(e) => return errors::service_error_to_response(e),
    };

    let claims = SessionClaims::for_user(&user, Utc::now(), services.token_ttl());
    let token = match services.codec().encode(&claims) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "failed to sign session token");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", e.to_string());
        }
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "token": token,
            "expires_at": claims.exp,
            "user": dto::user_to_json(&user),
        })),
    )
        .into_response()
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    let p = principal.principal();
    Json(serde_json::json!({
        "username": p.username,
        "display_name": p.display_name,
        "role": p.role,
        "permissions": p.permissions,
    }))
}
