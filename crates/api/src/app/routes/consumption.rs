use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use chariot_auth::Permission;
use chariot_inventory::Cart;

use crate::app::extract::ApiJson;
use crate::app::{dto, errors, AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/", post(commit_consumption))
}

/// Record what was taken from the cart for one patient.
pub async fn commit_consumption(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<dto::ConsumptionRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::CONSUMPTION_COMMIT) {
        return resp;
    }

    let mut lines = Vec::with_capacity(body.items.len());
    for (raw, qty) in &body.items {
        match dto::parse_item_id(raw) {
            Ok(id) => lines.push((id, *qty)),
            Err(resp) => return resp,
        }
    }
    let cart: Cart = lines.into_iter().collect();
    if cart.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "cart is empty");
    }

    match services
        .chariot()
        .commit_consumption(principal.display_name(), &body.patient_ref, &cart, Utc::now())
        .await
    {
        Ok(log) => (StatusCode::CREATED, Json(dto::log_to_json(&log))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
