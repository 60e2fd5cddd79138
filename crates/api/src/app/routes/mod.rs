use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::CHANGE_PASSWORD_PATH;

pub mod auth;
pub mod products;
pub mod system;

/// Router for all authenticated (session-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route(CHANGE_PASSWORD_PATH, post(auth::change_password))
        .nest("/products", products::router())
}
