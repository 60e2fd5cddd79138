//! Explicit login sessions.
//!
//! A session is a value: who is logged in, with which roles, and when the
//! session stops being valid. It is carried in a signed token and handed to
//! request handlers by the HTTP layer; nothing here reads ambient state or the
//! clock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stocklookup_core::UserId;

use crate::{Role, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Subject: the logged-in user.
    sub: UserId,
    name: String,
    roles: Vec<Role>,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    /// Only the change-password endpoint is reachable while set.
    #[serde(default)]
    must_change_password: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session has expired")]
    Expired,

    #[error("session not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid session time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("malformed session token: {0}")]
    Malformed(String),
}

impl Session {
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        roles: Vec<Role>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id,
            name: name.into(),
            roles,
            issued_at,
            expires_at,
            must_change_password: false,
        }
    }

    /// Open a session for `user` that lasts `ttl` from `now`.
    pub fn start(user: &User, now: DateTime<Utc>, ttl: Duration) -> Self {
        let mut session = Self::new(user.id(), user.name(), user.roles().to_vec(), now, now + ttl);
        session.must_change_password = user.must_change_password();
        session
    }

    pub fn user_id(&self) -> UserId {
        self.sub
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn must_change_password(&self) -> bool {
        self.must_change_password
    }

    /// Pure expiry check. A session is expired from `expires_at` onwards.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Full time-window validation at `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.expires_at <= self.issued_at {
            return Err(SessionError::InvalidTimeWindow);
        }
        if now < self.issued_at {
            return Err(SessionError::NotYetValid);
        }
        if self.is_expired(now) {
            return Err(SessionError::Expired);
        }
        Ok(())
    }
}
