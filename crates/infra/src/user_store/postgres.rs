//! Postgres-backed user directory.
//!
//! Passwords are stored as pgcrypto `crypt()` hashes; verification happens in
//! the query so the hash never leaves the database.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use stocklookup_auth::{DirectoryError, Role, User, UserDirectory};
use stocklookup_core::UserId;

#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: Arc<PgPool>,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create a user unless one with the same name exists. Used to seed the
    /// development account on startup.
    pub async fn ensure_user(&self, user: &User, password: &str) -> Result<(), DirectoryError> {
        let roles: Vec<&str> = user.roles().iter().map(Role::as_str).collect();

        sqlx::query(
            "INSERT INTO users (id, name, password, active, roles, must_change_password) \
             VALUES ($1, $2, crypt($3, gen_salt('bf')), $4, $5, $6) \
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(*user.id().as_uuid())
        .bind(user.name())
        .bind(password)
        .bind(user.is_active())
        .bind(roles)
        .bind(user.must_change_password())
        .execute(&*self.pool)
        .await
        .map_err(|e| DirectoryError(format!("ensure_user failed: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    #[instrument(skip(self, password))]
    async fn verify_credentials(&self, name: &str, password: &str) -> Result<Option<User>, DirectoryError> {
        let row = sqlx::query(
            "SELECT id, name, active, roles, must_change_password FROM users \
             WHERE name = $1 AND password = crypt($2, password)",
        )
        .bind(name)
        .bind(password)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| DirectoryError(format!("verify_credentials failed: {e}")))?;

        row.map(|row| user_from_row(&row)).transpose()
    }

    /// Check and replace in one statement so the stored hash is never read
    /// back.
    #[instrument(skip(self, current, new))]
    async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<Option<User>, DirectoryError> {
        let row = sqlx::query(
            "UPDATE users \
             SET password = crypt($3, gen_salt('bf')), must_change_password = FALSE \
             WHERE id = $1 AND password = crypt($2, password) \
             RETURNING id, name, active, roles, must_change_password",
        )
        .bind(*user_id.as_uuid())
        .bind(current)
        .bind(new)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| DirectoryError(format!("change_password failed: {e}")))?;

        row.map(|row| user_from_row(&row)).transpose()
    }
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> Result<User, DirectoryError> {
    let row = UserRow::from_row(row).map_err(|e| DirectoryError(format!("failed to read user row: {e}")))?;
    let roles = row.roles.into_iter().map(Role::new).collect();

    User::new(UserId::from_uuid(row.id), row.name, row.active, roles)
        .map(|user| user.with_must_change_password(row.must_change_password))
        .map_err(|e| DirectoryError(format!("invalid user row {}: {e}", row.id)))
}

struct UserRow {
    id: Uuid,
    name: String,
    active: bool,
    roles: Vec<String>,
    must_change_password: bool,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            active: row.try_get("active")?,
            roles: row.try_get("roles")?,
            must_change_password: row.try_get("must_change_password")?,
        })
    }
}
