use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use stocklookup_auth::{JwtCodec, Session};

use crate::app::errors;
use crate::context::SessionContext;

/// The only route a session flagged `must_change_password` may reach.
pub const CHANGE_PASSWORD_PATH: &str = "/auth/change-password";

#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn JwtCodec>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())
        .ok_or_else(|| errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "missing bearer token"))?;

    let session = state
        .sessions
        .validate(token, Utc::now())
        .map_err(errors::session_error_to_response)?;

    require_password_changed(&session, req.uri().path())?;

    req.extensions_mut().insert(SessionContext::new(session));

    Ok(next.run(req).await)
}

fn require_password_changed(session: &Session, path: &str) -> Result<(), Response> {
    if session.must_change_password() && path != CHANGE_PASSWORD_PATH {
        return Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "password_change_required",
            "password must be changed before continuing",
        ));
    }
    Ok(())
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use chrono::Duration;
    use stocklookup_auth::{Role, User};
    use stocklookup_core::UserId;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn other_schemes_and_blank_tokens_are_ignored() {
        assert_eq!(extract_bearer(&headers("Basic Zm9v")), None);
        assert_eq!(extract_bearer(&headers("Bearer   ")), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }

    #[test]
    fn flagged_session_only_reaches_change_password() {
        let user = User::new(UserId::new(), "ana", true, vec![Role::USER])
            .unwrap()
            .with_must_change_password(true);
        let session = Session::start(&user, Utc::now(), Duration::hours(1));

        assert!(require_password_changed(&session, CHANGE_PASSWORD_PATH).is_ok());
        for path in ["/whoami", "/products/search"] {
            let res = require_password_changed(&session, path).unwrap_err();
            assert_eq!(res.status(), StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn cleared_session_passes_everywhere() {
        let user = User::new(UserId::new(), "maria", true, vec![Role::USER]).unwrap();
        let session = Session::start(&user, Utc::now(), Duration::hours(1));

        assert!(require_password_changed(&session, "/products/search").is_ok());
    }
}
