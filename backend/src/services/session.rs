//! Login, refresh-token rotation and logout.
//!
//! The manager keeps no state of its own. Every session transition is a call
//! into the injected [`CredentialStore`].

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::config::Config;
use crate::error::AppError;
use crate::models::auth::{NewRefreshToken, SessionTokens};
use crate::models::user::{normalize_username, User, UserResponse};
use crate::repositories::CredentialStore;
use crate::types::UserId;
use crate::utils::jwt::{create_access_token, hash_refresh_token, issue_refresh_token};
use crate::utils::password::verify_password_blocking;

#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_hours: i64,
}

impl From<&Config> for TokenSettings {
    fn from(config: &Config) -> Self {
        TokenSettings {
            secret: config.jwt_secret.clone(),
            access_ttl_minutes: config.access_token_minutes,
            refresh_ttl_hours: config.refresh_token_hours,
        }
    }
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    settings: TokenSettings,
}

impl SessionManager {
    pub fn new(store: Arc<dyn CredentialStore>, settings: TokenSettings) -> Self {
        Self { store, settings }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<SessionTokens, AppError> {
        let username = normalize_username(username);
        let user = self
            .store
            .find_user_by_username(&username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active() {
            return Err(AppError::AccountInactive);
        }

        let matches =
            verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
        if !matches {
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.access_token_for(&user)?;
        let issued = issue_refresh_token()?;
        self.store
            .create_refresh_token(&self.refresh_record(user.id, issued.lookup_hash))
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok(self.session(access_token, issued.raw, user))
    }

    /// Exchanges a refresh token for a new pair. The presented token is spent.
    pub async fn refresh(&self, raw_refresh_token: &str) -> Result<SessionTokens, AppError> {
        let raw = raw_refresh_token.trim();
        if raw.is_empty() {
            return Err(AppError::InvalidRefreshToken);
        }

        let presented_hash = hash_refresh_token(raw);
        let now = Utc::now();
        let owner = self
            .store
            .find_active_refresh_token_owner(&presented_hash, now)
            .await?
            .ok_or(AppError::InvalidRefreshToken)?;

        let user = self
            .store
            .find_user_by_id(owner)
            .await?
            .ok_or(AppError::InvalidRefreshToken)?;
        if !user.is_active() {
            return Err(AppError::AccountInactive);
        }

        // Signed before rotation so a signing fault cannot strand the session.
        let access_token = self.access_token_for(&user)?;
        let issued = issue_refresh_token()?;
        let replacement = self.refresh_record(user.id, issued.lookup_hash);

        let rotated = self
            .store
            .rotate_refresh_token(&presented_hash, &replacement, now)
            .await?;
        if !rotated {
            tracing::warn!(user_id = %user.id, "Refresh token was rotated concurrently");
            return Err(AppError::InvalidRefreshToken);
        }

        tracing::debug!(user_id = %user.id, "Refresh token rotated");
        Ok(self.session(access_token, issued.raw, user))
    }

    /// Revokes the given refresh token. Missing, unknown and already revoked
    /// tokens all succeed.
    pub async fn logout(&self, raw_refresh_token: Option<&str>) -> Result<(), AppError> {
        let raw = raw_refresh_token.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Ok(());
        }

        let revoked = self
            .store
            .revoke_refresh_token(&hash_refresh_token(raw))
            .await?;
        tracing::debug!(revoked, "Logout processed");
        Ok(())
    }

    /// Revokes every active refresh token of the user.
    pub async fn revoke_all_for_user(&self, user_id: UserId) -> Result<u64, AppError> {
        let revoked = self
            .store
            .revoke_all_refresh_tokens_for_user(user_id)
            .await?;
        tracing::info!(user_id = %user_id, revoked, "Revoked all refresh tokens");
        Ok(revoked)
    }

    fn access_token_for(&self, user: &User) -> Result<String, AppError> {
        create_access_token(
            user,
            &self.settings.secret,
            self.settings.access_ttl_minutes,
        )
    }

    fn refresh_record(&self, user_id: UserId, token_hash: String) -> NewRefreshToken {
        NewRefreshToken {
            user_id,
            token_hash,
            expires_at: Utc::now() + Duration::hours(self.settings.refresh_ttl_hours),
        }
    }

    fn session(&self, access_token: String, refresh_token: String, user: User) -> SessionTokens {
        SessionTokens {
            access_token,
            refresh_token,
            expires_in: self.settings.access_ttl_minutes * 60,
            user: UserResponse::from(user),
        }
    }
}
