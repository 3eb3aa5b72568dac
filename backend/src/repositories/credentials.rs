//! Credential store: user accounts and refresh-token records.
//!
//! The session and account services only talk to the [`CredentialStore`]
//! trait, so tests can swap the PostgreSQL implementation for a mock or an
//! in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::auth::NewRefreshToken;
use crate::models::user::{NewUser, User, UserChanges};
use crate::repositories::transaction::{begin_transaction, commit_transaction, rollback_transaction};
use crate::types::UserId;

const USER_COLUMNS: &str =
    "id, name, username, password_hash, role, status, employee_code, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, AppError>;

    /// All users, newest first.
    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// Fails with `Conflict` when the username is taken.
    async fn create_user(&self, user: &NewUser) -> Result<User, AppError>;

    async fn update_user_name(&self, id: UserId, name: &str) -> Result<Option<User>, AppError>;

    async fn update_user(
        &self,
        username: &str,
        changes: &UserChanges,
    ) -> Result<Option<User>, AppError>;

    /// Returns `false` when no user has the id.
    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> Result<bool, AppError>;

    async fn create_refresh_token(&self, token: &NewRefreshToken) -> Result<(), AppError>;

    /// Owner of the token with this hash, if it is neither revoked nor expired at `now`.
    async fn find_active_refresh_token_owner(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, AppError>;

    /// Revokes `presented_hash` and stores `replacement` as one unit.
    ///
    /// Returns `false`, leaving nothing changed, when the presented token is
    /// no longer active for `replacement.user_id`.
    async fn rotate_refresh_token(
        &self,
        presented_hash: &str,
        replacement: &NewRefreshToken,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Returns whether an active token was revoked.
    async fn revoke_refresh_token(&self, token_hash: &str) -> Result<bool, AppError>;

    /// Returns the number of tokens revoked.
    async fn revoke_all_refresh_tokens_for_user(&self, user_id: UserId) -> Result<u64, AppError>;
}

#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("username already exists".into())
        }
        _ => AppError::Storage(err),
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, username, password_hash, role, status, employee_code) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.status.as_str())
        .bind(&user.employee_code)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    async fn update_user_name(&self, id: UserId, name: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user(
        &self,
        username: &str,
        changes: &UserChanges,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
                 name = COALESCE($2, name), \
                 role = COALESCE($3, role), \
                 status = COALESCE($4, status), \
                 employee_code = COALESCE($5, employee_code) \
             WHERE username = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(changes.name.as_deref())
        .bind(changes.role.as_deref())
        .bind(changes.status.map(|status| status.as_str()))
        .bind(changes.employee_code.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_refresh_token(&self, token: &NewRefreshToken) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_active_refresh_token_owner(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, AppError> {
        let owner = sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM refresh_tokens \
             WHERE token_hash = $1 AND revoked_at IS NULL AND expires_at > $2",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(owner)
    }

    async fn rotate_refresh_token(
        &self,
        presented_hash: &str,
        replacement: &NewRefreshToken,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut tx = begin_transaction(&self.pool).await?;

        // Concurrent rotations of one token serialize on the row lock; the loser matches nothing.
        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $3 \
             WHERE token_hash = $1 AND user_id = $2 AND revoked_at IS NULL AND expires_at > $3",
        )
        .bind(presented_hash)
        .bind(replacement.user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if revoked.rows_affected() == 0 {
            rollback_transaction(tx).await?;
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(replacement.user_id)
        .bind(&replacement.token_hash)
        .bind(replacement.expires_at)
        .execute(&mut *tx)
        .await?;

        commit_transaction(tx).await?;
        Ok(true)
    }

    async fn revoke_refresh_token(&self, token_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() \
             WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_refresh_tokens_for_user(&self, user_id: UserId) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() \
             WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > NOW()",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
