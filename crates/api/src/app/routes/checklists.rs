use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use chariot_auth::{authorize, Permission};
use chariot_core::ChecklistId;
use chariot_infra::services::ChecklistReport;

use crate::app::extract::{ApiJson, ApiQuery};
use crate::app::{dto, errors, AppServices};
use crate::authz;
use crate::context::PrincipalContext;

/// Size of the archive picker; larger pages are the manager overview.
const PICKER_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(validate))
        .route("/status", get(status))
        .route("/:id", axum::routing::delete(delete_checklist))
        .route("/:id/pdf", get(pdf))
}

fn pdf_response(status: StatusCode, report: ChecklistReport) -> axum::response::Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report.file_name),
            ),
        ],
        report.pdf,
    )
        .into_response()
}

fn parse_id(raw: &str) -> Result<ChecklistId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid checklist id"))
}

/// Whether a checklist can be started (no unresolved consumption).
pub async fn status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::CHECKLISTS_RUN) {
        return resp;
    }

    match services.chariot().checklist_status().await {
        Ok(gate) => (StatusCode::OK, Json(gate)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Validate a completed run; responds with the PDF report.
pub async fn validate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<dto::ChecklistRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::CHECKLISTS_RUN) {
        return resp;
    }

    let mut verdicts = Vec::with_capacity(body.verdicts.len());
    for (raw, verdict) in &body.verdicts {
        match dto::parse_item_id(raw) {
            Ok(id) => verdicts.push((id, *verdict)),
            Err(resp) => return resp,
        }
    }

    match services
        .chariot()
        .validate_checklist(verdicts, body.secured, principal.display_name(), Utc::now())
        .await
    {
        Ok(done) => pdf_response(StatusCode::CREATED, done.report),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiQuery(q): ApiQuery<dto::LimitQuery>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::CHECKLISTS_READ) {
        return resp;
    }

    let mut limit = q.limit.unwrap_or(PICKER_LIMIT).min(MAX_LIMIT);
    if limit > PICKER_LIMIT && authorize(principal.principal(), Permission::CHECKLISTS_HISTORY).is_err() {
        limit = PICKER_LIMIT;
    }

    match services.chariot().checklists(limit).await {
        Ok(records) => {
            let records: Vec<_> = records.iter().map(dto::checklist_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "checklists": records }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Regenerate the PDF of an archived checklist.
pub async fn pdf(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::CHECKLISTS_READ) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.chariot().checklist_pdf(id, Utc::now()).await {
        Ok(report) => pdf_response(StatusCode::OK, report),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_checklist(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::CHECKLISTS_DELETE) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.chariot().delete_checklist(id).await {
        Ok(()) => {
            tracing::info!(checklist = %id, by = %principal.username(), "checklist deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
