use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse, SignupFormDto};
use crate::services::{
    AuthError, SIGNUP_FIELDS, SignupForm, SignupFormValues, UserInfo,
};

const SESSION_USER_KEY: &str = "user";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub api_key: String,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::UserNotFound => Self::Unauthorized("User not found".to_string()),
            AuthError::Validation(errors) => Self::InvalidFields(errors),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Admin gate. The caller is identified by:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
///
/// and must belong to a staff account.
pub async fn require_staff(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(user) = current_user(&state, &session, &headers).await? else {
        return Err(ApiError::Unauthorized("Authentication required".to_string()));
    };

    tracing::Span::current().record("user_id", &user.username);

    if !user.is_staff {
        tracing::warn!(username = %user.username, "Non-staff account tried an admin route");
        return Err(ApiError::Forbidden("Staff access required".to_string()));
    }

    Ok(next.run(request).await)
}

/// Extract API key from headers
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

/// The account behind the session or API key, if any.
async fn current_user(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
) -> Result<Option<UserInfo>, ApiError> {
    if let Ok(Some(username)) = session.get::<String>(SESSION_USER_KEY).await {
        match state.auth().get_user_info(&username).await {
            Ok(user) => return Ok(Some(user)),
            Err(AuthError::UserNotFound) => {
                // Account deleted while the session was alive.
                let _ = session.flush().await;
            }
            Err(e) => return Err(e.into()),
        }
    }

    match extract_api_key(headers) {
        Some(key) => Ok(state.auth().verify_api_key(&key).await?),
        None => Ok(None),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /auth/signup
/// The empty registration form
pub async fn signup_form() -> Json<ApiResponse<SignupFormDto>> {
    Json(ApiResponse::success(SignupFormDto {
        fields: SIGNUP_FIELDS,
        values: SignupFormValues::default(),
    }))
}

/// POST /auth/signup
/// Creates a regular account and redirects to the login page. A rejected form
/// comes back with per-field messages and the non-secret values.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SignupForm>,
) -> Result<Response, ApiError> {
    match state.auth().register_user(&form).await {
        Ok(_) => {
            let login_url = state.config().read().await.catalog.login_url.clone();
            Ok(Redirect::to(&login_url).into_response())
        }
        Err(AuthError::Validation(errors)) => {
            let body = ApiResponse::invalid(
                "Validation failed",
                errors,
                Some(SignupFormDto {
                    fields: SIGNUP_FIELDS,
                    values: SignupFormValues::from(&form),
                }),
            );
            Ok((StatusCode::BAD_REQUEST, Json(body)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /auth/login
/// Authenticate with username and password, returns API key on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth()
        .login(&payload.username, &payload.password)
        .await?;

    if let Err(e) = session.insert(SESSION_USER_KEY, &result.username).await {
        return Err(ApiError::internal(format!("Failed to create session: {e}")));
    }

    tracing::info!(username = %result.username, "User logged in");

    Ok(Json(ApiResponse::success(LoginResponse {
        username: result.username,
        api_key: result.api_key,
    })))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

/// GET /auth/me
/// Current account (session or API key)
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = current_user(&state, &session, &headers)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    Ok(Json(ApiResponse::success(user)))
}
