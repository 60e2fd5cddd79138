use thiserror::Error;

use crate::{Permission, Session};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a session for one permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check over the session's roles)
///
/// Expiry is not checked here; sessions are validated when the token is decoded.
pub fn authorize(session: &Session, required: &Permission) -> Result<(), AuthzError> {
    let granted = session
        .roles()
        .iter()
        .flat_map(|role| role.permissions())
        .any(|p| p.is_wildcard() || p == *required);

    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
