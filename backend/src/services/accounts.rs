//! Account lifecycle: registration, admin management and credential changes.

use std::sync::Arc;

use crate::error::AppError;
use crate::models::user::{
    is_known_role, normalize_employee_code, normalize_username, AdminUpdateUserRequest, NewUser, User, UserChanges,
    UserResponse, UserStatus, ADMIN_ROLE, REGISTERED_ROLE,
};
use crate::repositories::CredentialStore;
use crate::services::session::SessionManager;
use crate::types::UserId;
use crate::utils::password::{hash_password_blocking, verify_password_blocking};
use crate::validation::rules::{ensure_password, is_valid_employee_code, EMPLOYEE_CODE_MESSAGE};

/// Credentials and profile for a user created by an administrator.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub status: UserStatus,
    pub employee_code: String,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    sessions: SessionManager,
}

impl AccountService {
    pub fn new(store: Arc<dyn CredentialStore>, sessions: SessionManager) -> Self {
        Self { store, sessions }
    }

    /// Self-registration always yields an active `user`.
    pub async fn register(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> Result<UserResponse, AppError> {
        let user = self
            .create(NewAccount {
                name: name.to_string(),
                username: username.to_string(),
                password: password.to_string(),
                role: REGISTERED_ROLE.to_string(),
                status: UserStatus::Active,
                employee_code: String::new(),
            })
            .await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(UserResponse::from(user))
    }

    pub async fn create_user(&self, mut account: NewAccount) -> Result<UserResponse, AppError> {
        if !is_known_role(&account.role) {
            return Err(AppError::Validation(vec!["role is invalid".into()]));
        }
        account.employee_code = normalize_employee_code(&account.employee_code);
        if account.employee_code.is_empty() {
            return Err(AppError::Validation(vec![
                "name, username, employee_code and password are required".into(),
            ]));
        }
        if !is_valid_employee_code(&account.employee_code) {
            return Err(AppError::Validation(vec![EMPLOYEE_CODE_MESSAGE.into()]));
        }
        let user = self.create(account).await?;
        tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "User created");
        Ok(UserResponse::from(user))
    }

    async fn create(&self, account: NewAccount) -> Result<User, AppError> {
        let name = account.name.trim().to_string();
        let username = normalize_username(&account.username);
        let password = account.password.trim().to_string();
        if name.is_empty() || username.is_empty() || password.is_empty() {
            return Err(AppError::Validation(vec![
                "name, username and password are required".into(),
            ]));
        }
        ensure_password(&password)?;

        let password_hash = hash_password_blocking(password).await?;
        self.store
            .create_user(&NewUser {
                name,
                username,
                password_hash,
                role: account.role,
                status: account.status,
                employee_code: account.employee_code,
            })
            .await
    }

    /// Blank fields keep their stored values.
    pub async fn update_user(
        &self,
        username: &str,
        request: AdminUpdateUserRequest,
    ) -> Result<UserResponse, AppError> {
        let changes = user_changes(request)?;
        let user = self
            .store
            .update_user(&normalize_username(username), &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))?;
        tracing::info!(user_id = %user.id, status = %user.status, role = %user.role, "User updated");
        Ok(UserResponse::from(user))
    }

    pub async fn list_users(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn profile(&self, user_id: UserId) -> Result<UserResponse, AppError> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    pub async fn update_own_name(
        &self,
        user_id: UserId,
        name: &str,
    ) -> Result<UserResponse, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(vec!["name is required".into()]));
        }
        self.store
            .update_user_name(user_id, name)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    /// Changes the caller's password and signs out every device.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let current_password = current_password.trim();
        let new_password = new_password.trim();
        if current_password.is_empty() || new_password.is_empty() {
            return Err(AppError::Validation(vec![
                "current_password and new_password are required".into(),
            ]));
        }
        ensure_password(new_password)?;

        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))?;
        let matches =
            verify_password_blocking(current_password.to_string(), user.password_hash).await?;
        if !matches {
            return Err(AppError::BadRequest("current password is incorrect".into()));
        }

        self.replace_password(user.id, new_password).await
    }

    /// Sets a new password chosen by an administrator and signs the user out.
    pub async fn reset_password(&self, username: &str, new_password: &str) -> Result<(), AppError> {
        let new_password = new_password.trim();
        ensure_password(new_password)?;

        let user = self
            .store
            .find_user_by_username(&normalize_username(username))
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))?;

        self.replace_password(user.id, new_password).await
    }

    async fn replace_password(&self, user_id: UserId, new_password: &str) -> Result<(), AppError> {
        let password_hash = hash_password_blocking(new_password.to_string()).await?;
        if !self.store.set_password_hash(user_id, &password_hash).await? {
            return Err(AppError::NotFound("user not found".into()));
        }
        self.sessions.revoke_all_for_user(user_id).await?;
        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Creates the bootstrap administrator unless the username already exists.
    ///
    /// Returns whether an account was created.
    pub async fn ensure_default_admin(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> Result<bool, AppError> {
        let username = normalize_username(username);
        if username.is_empty() || password.trim().is_empty() {
            return Err(AppError::Validation(vec![
                "admin username and password are required".into(),
            ]));
        }
        if self.store.find_user_by_username(&username).await?.is_some() {
            tracing::debug!(username = %username, "Default admin already present");
            return Ok(false);
        }

        let name = if name.trim().is_empty() { "System Admin" } else { name };
        let created = self
            .create(NewAccount {
                name: name.to_string(),
                username: username.clone(),
                password: password.to_string(),
                role: ADMIN_ROLE.to_string(),
                status: UserStatus::Active,
                employee_code: String::new(),
            })
            .await;
        match created {
            Ok(user) => {
                tracing::info!(user_id = %user.id, username = %user.username, "Default admin created");
                Ok(true)
            }
            // Another instance created it first.
            Err(AppError::Conflict(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

fn user_changes(request: AdminUpdateUserRequest) -> Result<UserChanges, AppError> {
    let name = request.name.trim();
    let role = request.role.trim();
    let status = request.status.trim();
    let employee_code = normalize_employee_code(&request.employee_code);

    if !role.is_empty() && !is_known_role(role) {
        return Err(AppError::Validation(vec!["role is invalid".into()]));
    }
    let status = if status.is_empty() {
        None
    } else {
        Some(UserStatus::parse(status).ok_or_else(|| {
            AppError::Validation(vec!["status must be active or inactive".into()])
        })?)
    };
    if !employee_code.is_empty() && !is_valid_employee_code(&employee_code) {
        return Err(AppError::Validation(vec![EMPLOYEE_CODE_MESSAGE.into()]));
    }

    Ok(UserChanges {
        name: (!name.is_empty()).then(|| name.to_string()),
        role: (!role.is_empty()).then(|| role.to_string()),
        status,
        employee_code: (!employee_code.is_empty()).then_some(employee_code),
    })
}
