use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use chariot_auth::Permission;

use crate::app::extract::ApiQuery;
use crate::app::{dto, errors, AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/items", get(list_items))
        .route("/drawers", get(by_drawer))
        .route("/overview", get(overview))
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiQuery(q): ApiQuery<dto::SearchQuery>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::INVENTORY_READ) {
        return resp;
    }

    let catalog = match services.chariot().catalog().await {
        Ok(c) => c,
        Err(e) => return errors::service_error_to_response(e),
    };

    let items: Vec<_> = match q.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(needle) => catalog.search(needle).into_iter().map(dto::item_to_json).collect(),
        None => catalog.items().iter().map(dto::item_to_json).collect(),
    };

    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn by_drawer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::INVENTORY_READ) {
        return resp;
    }

    match services.chariot().catalog().await {
        Ok(catalog) => {
            let drawers: Vec<_> = catalog.by_drawer().iter().map(dto::drawer_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "drawers": drawers }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Stock versus allotment for every item (managers).
pub async fn overview(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::STOCK_OVERVIEW) {
        return resp;
    }

    match services.chariot().catalog().await {
        Ok(catalog) => {
            let rows: Vec<_> = catalog.items().iter().map(dto::overview_row).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": rows }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
