use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use stocklookup_auth::{Session, User};
use stocklookup_catalog::{Page, PageRequest, SearchResult};
use stocklookup_core::Entity;

use crate::app::errors;
use crate::context::SessionContext;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Raw `/products/search` query string. Numbers stay strings until
/// `page_request` so malformed values get the JSON error shape.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl SearchParams {
    pub fn query(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }

    /// `page` defaults to 1, `page_size` to 20 and is capped at 100; zero or
    /// non-numeric values are rejected.
    pub fn page_request(&self) -> Result<PageRequest, axum::response::Response> {
        let page = parse_positive("page", self.page.as_deref(), 1)?;
        let page_size = parse_positive("page_size", self.page_size.as_deref(), DEFAULT_PAGE_SIZE)?;

        PageRequest::new(page, page_size.min(MAX_PAGE_SIZE))
            .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_pagination", e.to_string()))
    }
}

fn parse_positive(name: &str, raw: Option<&str>, default: u32) -> Result<u32, axum::response::Response> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(default);
    };

    match raw.parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_pagination",
            format!("{name} must be a positive integer"),
        )),
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn search_result_to_json(result: SearchResult) -> serde_json::Value {
    let (product, related_codes) = result.into_parts();
    serde_json::json!({
        "id": product.id().to_string(),
        "code": product.code(),
        "stock": product.stock().get(),
        "available": product.stock().is_available(),
        "price": product.price().to_string(),
        "price_cents": product.price().cents(),
        "application": product.application(),
        "related_codes": related_codes.into_iter().collect::<Vec<_>>(),
    })
}

pub fn page_to_json(page: Page<SearchResult>) -> serde_json::Value {
    let total_pages = page.total_pages();
    let has_more = page.has_more();
    serde_json::json!({
        "items": page.items.into_iter().map(search_result_to_json).collect::<Vec<_>>(),
        "total_count": page.total_count,
        "page": page.page,
        "page_size": page.page_size,
        "total_pages": total_pages,
        "has_more": has_more,
    })
}

pub fn user_to_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id().to_string(),
        "name": user.name(),
        "roles": user.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "must_change_password": user.must_change_password(),
    })
}

pub fn login_to_json(token: String, session: &Session, user: &User) -> serde_json::Value {
    serde_json::json!({
        "token": token,
        "expires_at": rfc3339(session.expires_at()),
        "user": user_to_json(user),
    })
}

pub fn session_to_json(session: &SessionContext) -> serde_json::Value {
    serde_json::json!({
        "user_id": session.user_id().to_string(),
        "name": session.name(),
        "roles": session.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "expires_at": rfc3339(session.expires_at()),
    })
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, page_size: Option<&str>) -> SearchParams {
        SearchParams {
            q: Some("13E".to_string()),
            page: page.map(str::to_string),
            page_size: page_size.map(str::to_string),
        }
    }

    #[test]
    fn missing_pagination_uses_defaults() {
        let req = params(None, None).page_request().unwrap();
        assert_eq!((req.page(), req.page_size()), (1, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn page_size_is_capped() {
        let req = params(Some("2"), Some("5000")).page_request().unwrap();
        assert_eq!((req.page(), req.page_size()), (2, MAX_PAGE_SIZE));
    }

    #[test]
    fn zero_and_garbage_are_rejected() {
        for (page, size) in [(Some("0"), None), (None, Some("0")), (Some("-1"), None), (Some("x"), None)] {
            let res = params(page, size).page_request().unwrap_err();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn missing_query_is_blank() {
        assert_eq!(SearchParams::default().query(), "");
    }
}
