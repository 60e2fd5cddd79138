use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stocklookup_auth::Permission;

use crate::app::dto;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/search", get(search_products))
        .route("/equivalents/:code", get(get_equivalents))
}

/// Equivalence-aware search. Store failures surface as an empty page.
pub async fn search_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Query(params): Query<dto::SearchParams>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&session, &Permission::SEARCH_PRODUCTS) {
        return resp;
    }

    let request = match params.page_request() {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let page = services.search().search(params.query(), request).await;

    (StatusCode::OK, Json(dto::page_to_json(page))).into_response()
}

pub async fn get_equivalents(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(code): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&session, &Permission::SEARCH_PRODUCTS) {
        return resp;
    }

    let code = code.trim();
    if code.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "code cannot be empty");
    }

    let related = services.search().resolver().resolve(code).await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "code": code,
            "related_codes": related.into_iter().collect::<Vec<_>>(),
        })),
    )
        .into_response()
}
