//! Domain service for accounts: signup, login and API key lookup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::User;
use crate::domain::FieldErrors;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
            created_at: user.created_at,
        }
    }
}

/// Login result containing user info and API key.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub username: String,
    pub api_key: String,
}

/// Signup submission. Both password boxes must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// The non-secret part of a signup form, echoed back when the form is
/// redisplayed. Passwords are never sent back.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SignupFormValues {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&SignupForm> for SignupFormValues {
    fn from(form: &SignupForm) -> Self {
        Self {
            username: form.username.clone(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
        }
    }
}

/// Field order of the signup form.
pub const SIGNUP_FIELDS: [&str; 5] = ["username", "first_name", "last_name", "password1", "password2"];

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a regular (non-staff) account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] with per-field messages when the form
    /// is invalid or the username is taken. No account is created then.
    async fn register_user(&self, form: &SignupForm) -> Result<UserInfo, AuthError>;

    /// Verifies credentials and returns the account's API key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Resolves an API key to its account, if any.
    async fn verify_api_key(&self, api_key: &str) -> Result<Option<UserInfo>, AuthError>;

    /// Gets information for a specific user.
    async fn get_user_info(&self, username: &str) -> Result<UserInfo, AuthError>;
}
