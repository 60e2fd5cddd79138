use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stocklookup_auth::{AuthError, SessionError};

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::Validation(e) => json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
        AuthError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid user name or password")
        }
        AuthError::InactiveUser => json_error(StatusCode::UNAUTHORIZED, "inactive_user", "user is inactive"),
        AuthError::Directory(e) => {
            tracing::error!(error = %e, "user directory failure");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "unavailable", "authentication is temporarily unavailable")
        }
    }
}

pub fn session_error_to_response(err: SessionError) -> axum::response::Response {
    let code = match err {
        SessionError::Expired => "session_expired",
        SessionError::NotYetValid | SessionError::InvalidTimeWindow | SessionError::Malformed(_) => {
            "invalid_session"
        }
    };
    json_error(StatusCode::UNAUTHORIZED, code, err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
