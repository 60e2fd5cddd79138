//! Signed session tokens (HS256 JWT).
//!
//! The token payload is the `Session` itself. Time-window checks are done by
//! `Session::validate` against an explicit `now`, not by the JWT library, so
//! expiry stays testable and uses the same rule everywhere.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{Session, SessionError};

/// Encode sessions to tokens and decode them back.
pub trait JwtCodec: Send + Sync {
    fn issue(&self, session: &Session) -> Result<String, SessionError>;

    /// Verify the signature, decode the session and validate it at `now`.
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Session, SessionError>;
}

pub struct Hs256JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256JwtCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        let mut validation = Validation::new(Algorithm::HS256);
        // Session carries its own RFC 3339 window; no registered claims required.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl JwtCodec for Hs256JwtCodec {
    fn issue(&self, session: &Session) -> Result<String, SessionError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), session, &self.encoding)
            .map_err(|e| SessionError::Malformed(e.to_string()))
    }

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Session, SessionError> {
        let data = jsonwebtoken::decode::<Session>(token, &self.decoding, &self.validation)
            .map_err(|e| SessionError::Malformed(e.to_string()))?;

        data.claims.validate(now)?;
        Ok(data.claims)
    }
}
