//! API-side authorization guard.
//!
//! Handlers call [`require`] before invoking a use case; infra stays
//! auth-agnostic.

use axum::http::StatusCode;
use axum::response::Response;

use chariot_auth::authorize;

use crate::app::errors;
use crate::context::PrincipalContext;

/// Check that the caller holds `permission`, or build the 403 response.
pub fn require(principal: &PrincipalContext, permission: &str) -> Result<(), Response> {
    authorize(principal.principal(), permission).map_err(|e| {
        tracing::info!(user = %principal.username(), permission, "forbidden");
        errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string())
    })
}
