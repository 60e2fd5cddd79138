//! Login and password change: credential checks against a user directory.

use async_trait::async_trait;
use thiserror::Error;

use stocklookup_core::{DomainError, UserId};

use crate::User;
use crate::user::validate_name;

/// Failure of the backing user directory itself (not a wrong password).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("user directory unavailable: {0}")]
pub struct DirectoryError(pub String);

/// Source of users and credential checks.
///
/// Password verification belongs to the directory (for Postgres, a `crypt()`
/// comparison inside the query) so plaintext never has to be compared here.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// The user with `name` if `password` matches, otherwise `None`.
    async fn verify_credentials(&self, name: &str, password: &str) -> Result<Option<User>, DirectoryError>;

    /// Replace the password of `user_id` if `current` matches, clearing the
    /// must-change flag. Returns the updated user, or `None` when the user is
    /// unknown or `current` is wrong.
    async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<Option<User>, DirectoryError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user is inactive")]
    InactiveUser,

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Verify `name`/`password` and return the active user.
///
/// Inactive users are rejected even with correct credentials.
pub async fn authenticate<D>(directory: &D, name: &str, password: &str) -> Result<User, AuthError>
where
    D: UserDirectory + ?Sized,
{
    let name = validate_name(name)?;

    let user = directory
        .verify_credentials(&name, password)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !user.is_active() {
        tracing::info!(user = %user.name(), "login refused for inactive user");
        return Err(AuthError::InactiveUser);
    }

    Ok(user)
}

/// Change the password of a logged-in user.
///
/// `new` must be non-blank, equal to `confirm` and different from `current`.
pub async fn change_password<D>(
    directory: &D,
    user_id: UserId,
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<User, AuthError>
where
    D: UserDirectory + ?Sized,
{
    if new.trim().is_empty() {
        return Err(DomainError::validation("new password cannot be empty").into());
    }
    if new != confirm {
        return Err(DomainError::validation("password confirmation does not match").into());
    }
    if new == current {
        return Err(DomainError::validation("new password must differ from the current one").into());
    }

    let user = directory
        .change_password(user_id, current, new)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    tracing::info!(user = %user.name(), "password changed");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::Role;

    struct Directory {
        users: Mutex<HashMap<String, (String, User)>>,
        down: bool,
    }

    impl Directory {
        fn new() -> Self {
            let mut users = HashMap::new();
            let active = User::new(UserId::new(), "maria", true, vec![Role::USER]).unwrap();
            let inactive = User::new(UserId::new(), "joao", false, vec![Role::USER]).unwrap();
            let fresh = User::new(UserId::new(), "ana", true, vec![Role::USER])
                .unwrap()
                .with_must_change_password(true);
            users.insert("maria".to_string(), ("s3cret".to_string(), active));
            users.insert("joao".to_string(), ("pw".to_string(), inactive));
            users.insert("ana".to_string(), ("initial".to_string(), fresh));
            Self {
                users: Mutex::new(users),
                down: false,
            }
        }

        fn id_of(&self, name: &str) -> UserId {
            self.users.lock().unwrap()[name].1.id()
        }
    }

    #[async_trait]
    impl UserDirectory for Directory {
        async fn verify_credentials(&self, name: &str, password: &str) -> Result<Option<User>, DirectoryError> {
            if self.down {
                return Err(DirectoryError("connection refused".to_string()));
            }
            Ok(self
                .users
                .lock()
                .unwrap()
                .get(name)
                .filter(|(pw, _)| pw == password)
                .map(|(_, u)| u.clone()))
        }

        async fn change_password(
            &self,
            user_id: UserId,
            current: &str,
            new: &str,
        ) -> Result<Option<User>, DirectoryError> {
            if self.down {
                return Err(DirectoryError("connection refused".to_string()));
            }
            let mut users = self.users.lock().unwrap();
            let Some((pw, user)) = users
                .values_mut()
                .find(|(pw, u)| u.id() == user_id && pw == current)
            else {
                return Ok(None);
            };
            *pw = new.to_string();
            *user = user.clone().with_must_change_password(false);
            Ok(Some(user.clone()))
        }
    }

    #[tokio::test]
    async fn active_user_with_right_password_logs_in() {
        let user = authenticate(&Directory::new(), " maria ", "s3cret").await.unwrap();
        assert_eq!(user.name(), "maria");
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let err = authenticate(&Directory::new(), "maria", "nope").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn inactive_user_is_rejected() {
        let err = authenticate(&Directory::new(), "joao", "pw").await.unwrap_err();
        assert_eq!(err, AuthError::InactiveUser);
    }

    #[tokio::test]
    async fn blank_name_is_a_validation_error() {
        let err = authenticate(&Directory::new(), "  ", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn directory_outage_is_surfaced() {
        let mut dir = Directory::new();
        dir.down = true;
        let err = authenticate(&dir, "maria", "s3cret").await.unwrap_err();
        assert!(matches!(err, AuthError::Directory(_)));
    }

    #[tokio::test]
    async fn password_change_clears_the_flag_and_swaps_the_password() {
        let dir = Directory::new();
        let id = dir.id_of("ana");

        let user = change_password(&dir, id, "initial", "n3w-pass", "n3w-pass").await.unwrap();
        assert!(!user.must_change_password());

        assert_eq!(
            authenticate(&dir, "ana", "initial").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
        let user = authenticate(&dir, "ana", "n3w-pass").await.unwrap();
        assert!(!user.must_change_password());
    }

    #[tokio::test]
    async fn password_change_rejects_bad_input_before_the_directory() {
        let mut dir = Directory::new();
        dir.down = true;
        let id = UserId::new();

        for (current, new, confirm) in [
            ("initial", "", ""),
            ("initial", "   ", "   "),
            ("initial", "n3w-pass", "other"),
            ("initial", "initial", "initial"),
        ] {
            let err = change_password(&dir, id, current, new, confirm).await.unwrap_err();
            assert!(matches!(err, AuthError::Validation(_)), "{new:?}/{confirm:?}");
        }
    }

    #[tokio::test]
    async fn password_change_with_wrong_current_password_is_refused() {
        let dir = Directory::new();
        let id = dir.id_of("ana");

        let err = change_password(&dir, id, "guess", "n3w-pass", "n3w-pass").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(authenticate(&dir, "ana", "initial").await.unwrap().must_change_password());
    }

    #[tokio::test]
    async fn password_change_surfaces_directory_outage() {
        let mut dir = Directory::new();
        let id = dir.id_of("ana");
        dir.down = true;

        let err = change_password(&dir, id, "initial", "n3w-pass", "n3w-pass").await.unwrap_err();
        assert!(matches!(err, AuthError::Directory(_)));
    }
}
