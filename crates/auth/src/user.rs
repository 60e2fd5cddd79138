//! Application users.

use stocklookup_core::{DomainError, DomainResult, UserId};

use crate::Role;

const MAX_NAME_LEN: usize = 255;

/// A user able to log in to the stock lookup.
///
/// # Invariants
/// - `name` is trimmed, non-empty and at most 255 characters.
/// - Inactive users cannot authenticate (enforced by `authenticate`).
/// - A user flagged `must_change_password` may log in, but the session only
///   unlocks the change-password endpoint until the flag is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    active: bool,
    roles: Vec<Role>,
    must_change_password: bool,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, active: bool, roles: Vec<Role>) -> DomainResult<Self> {
        let name = validate_name(&name.into())?;
        Ok(Self {
            id,
            name,
            active,
            roles,
            must_change_password: false,
        })
    }

    pub fn with_must_change_password(mut self, must_change_password: bool) -> Self {
        self.must_change_password = must_change_password;
        self
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn must_change_password(&self) -> bool {
        self.must_change_password
    }
}

/// Trim and bound-check a login name.
pub fn validate_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation("user name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation("user name cannot exceed 255 characters"));
    }
    Ok(name.to_string())
}
