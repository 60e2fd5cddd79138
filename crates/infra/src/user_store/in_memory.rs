use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stocklookup_auth::{DirectoryError, User, UserDirectory};
use stocklookup_core::UserId;

/// In-memory user directory for tests/dev.
///
/// Passwords are held as given; this directory is never backed by real accounts.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, (String, User)>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user, keyed by name.
    pub fn add_user(&self, user: User, password: impl Into<String>) {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.name().to_string(), (password.into(), user));
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn verify_credentials(&self, name: &str, password: &str) -> Result<Option<User>, DirectoryError> {
        let users = self
            .users
            .read()
            .map_err(|_| DirectoryError("user directory lock poisoned".to_string()))?;

        Ok(users
            .get(name)
            .filter(|(stored, _)| stored == password)
            .map(|(_, user)| user.clone()))
    }

    async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<Option<User>, DirectoryError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| DirectoryError("user directory lock poisoned".to_string()))?;

        let Some((stored, user)) = users
            .values_mut()
            .find(|(stored, user)| user.id() == user_id && stored == current)
        else {
            return Ok(None);
        };

        *stored = new.to_string();
        *user = user.clone().with_must_change_password(false);
        Ok(Some(user.clone()))
    }
}
