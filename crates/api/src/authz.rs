//! API-side authorization guard.
//!
//! Handlers call this before touching any service, so the search core stays
//! auth-agnostic.

use axum::http::StatusCode;

use stocklookup_auth::{Permission, authorize};

use crate::app::errors;
use crate::context::SessionContext;

/// Check that the request's session grants `required`; `403` JSON otherwise.
pub fn require(session: &SessionContext, required: &Permission) -> Result<(), axum::response::Response> {
    authorize(session.session(), required).map_err(|e| {
        tracing::info!(user = %session.name(), permission = %required.as_str(), "request forbidden");
        errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string())
    })
}
