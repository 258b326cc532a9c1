//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::db::{ConstraintKind, NewUser, Store, constraint_violation};
use crate::domain::FieldErrors;
use crate::services::auth_service::{AuthError, AuthService, LoginResult, SignupForm, UserInfo};
use crate::services::password_policy::{validate_name, validate_password, validate_username};

pub struct SeaOrmAuthService {
    store: Store,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }
}

/// Runs every signup check and collects the failures per field.
fn validate_signup(form: &SignupForm, min_password_length: usize) -> Result<(), FieldErrors> {
    let username = form.username.trim();
    let first_name = form.first_name.trim();
    let last_name = form.last_name.trim();

    let mut errors = FieldErrors::new();
    validate_username(username, &mut errors);
    validate_name("first_name", first_name, &mut errors);
    validate_name("last_name", last_name, &mut errors);

    if form.password1.is_empty() {
        errors.add("password1", "This field is required.");
    }

    if form.password2.is_empty() {
        errors.add("password2", "This field is required.");
    } else if form.password1 != form.password2 {
        errors.add("password2", "The two password fields didn't match.");
    } else {
        validate_password(
            &form.password2,
            min_password_length,
            &[
                ("username", username),
                ("first name", first_name),
                ("last name", last_name),
            ],
            &mut errors,
        );
    }

    errors.into_result()
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register_user(&self, form: &SignupForm) -> Result<UserInfo, AuthError> {
        let security = self.config.read().await.security.clone();

        validate_signup(form, security.min_password_length).map_err(AuthError::Validation)?;

        let new_user = NewUser {
            username: form.username.trim().to_string(),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            password: form.password1.clone(),
            is_staff: false,
        };

        match self.store.create_user(new_user, &security).await {
            Ok(user) => {
                info!(username = %user.username, "Registered new account");
                Ok(UserInfo::from(user))
            }
            Err(e) if constraint_violation(&e) == Some(ConstraintKind::Unique) => {
                Err(AuthError::Validation(FieldErrors::single(
                    "username",
                    "A user with that username already exists.",
                )))
            }
            Err(e) => Err(AuthError::Database(e.to_string())),
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let is_valid = self.store.verify_user_password(username, password).await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(LoginResult {
            username: user.username,
            api_key: user.api_key,
        })
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<UserInfo>, AuthError> {
        let user = self.store.verify_api_key(api_key).await?;
        Ok(user.map(UserInfo::from))
    }

    async fn get_user_info(&self, username: &str) -> Result<UserInfo, AuthError> {
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserInfo::from(user))
    }
}
