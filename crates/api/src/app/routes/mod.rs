use axum::{routing::get, Router};

pub mod auth;
pub mod checklists;
pub mod consumption;
pub mod inventory;
pub mod logs;
pub mod replacements;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(auth::whoami))
        .nest("/inventory", inventory::router())
        .nest("/consumption", consumption::router())
        .nest("/replacements", replacements::router())
        .nest("/logs", logs::router())
        .nest("/checklists", checklists::router())
}
