use chrono::{DateTime, Utc};

use stocklookup_auth::{Role, Session};
use stocklookup_core::UserId;

/// Session context for a request.
///
/// Inserted by the auth middleware once the bearer token has been validated;
/// must be present for all protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session: Session,
}

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn user_id(&self) -> UserId {
        self.session.user_id()
    }

    pub fn name(&self) -> &str {
        self.session.name()
    }

    pub fn roles(&self) -> &[Role] {
        self.session.roles()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.session.expires_at()
    }
}
