use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;

use stocklookup_auth::{Session, User, authenticate};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

/// Public auth routes. `/auth/change-password` needs a session and is
/// registered with the protected routes.
pub fn router() -> Router {
    Router::new().route("/login", post(login))
}

/// Exchange a name and password for a signed session token.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let user = match authenticate(services.users(), &body.name, &body.password).await {
        Ok(user) => user,
        Err(e) => return errors::auth_error_to_response(e),
    };

    let (token, session) = match issue_session(&services, &user) {
        Ok(issued) => issued,
        Err(resp) => return resp,
    };

    tracing::info!(user = %user.name(), expires_at = %session.expires_at(), "user logged in");

    (StatusCode::OK, Json(dto::login_to_json(token, &session, &user))).into_response()
}

/// Replace the caller's password and hand back a session with the
/// must-change flag cleared.
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::ChangePasswordRequest>,
) -> axum::response::Response {
    let user = match stocklookup_auth::change_password(
        services.users(),
        session.user_id(),
        &body.current_password,
        &body.new_password,
        &body.confirm_password,
    )
    .await
    {
        Ok(user) => user,
        Err(e) => return errors::auth_error_to_response(e),
    };

    let (token, session) = match issue_session(&services, &user) {
        Ok(issued) => issued,
        Err(resp) => return resp,
    };

    (StatusCode::OK, Json(dto::login_to_json(token, &session, &user))).into_response()
}

fn issue_session(services: &AppServices, user: &User) -> Result<(String, Session), axum::response::Response> {
    let session = Session::start(user, Utc::now(), services.session_ttl());
    match services.sessions().issue(&session) {
        Ok(token) => Ok((token, session)),
        Err(e) => {
            tracing::error!(error = %e, "failed to sign session token");
            Err(errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "could not issue session"))
        }
    }
}
