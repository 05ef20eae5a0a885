use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{
    require_password, validate_email, validate_name, validate_password, validate_phone,
};
use super::extract::ApiJson;
use super::{ApiError, ApiResponse, AppState, FlatResponse};
use crate::db::User;
use crate::services::{AuthError, AuthSession, Registration, UserProfile};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: String,
    pub membership_type: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserExists => Self::validation(err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::AccountDisabled
            | AuthError::InvalidToken => Self::unauthorized(err.to_string()),
            AuthError::UserNotFound => Self::NotFound(err.to_string()),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the `Authorization: Bearer <token>` header to an active user and
/// stores it as a request extension for the handlers behind this layer.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer(&headers) else {
        return Err(ApiError::unauthorized("Not authorized, no token"));
    };

    let user = state
        .auth_service()
        .authenticate(token)
        .await
        .map_err(|e| match e {
            AuthError::Database(_) | AuthError::Internal(_) => ApiError::from(e),
            AuthError::AccountDisabled => ApiError::unauthorized(e.to_string()),
            _ => ApiError::unauthorized("Not authorized, token failed"),
        })?;

    tracing::Span::current().record("user_id", user.id);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Must run after [`auth_middleware`].
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = request
        .extensions()
        .get::<User>()
        .is_some_and(User::is_admin);

    if !is_admin {
        return Err(ApiError::forbidden("Not authorized as an admin"));
    }

    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate_name(&payload.name)?.to_string();
    let email = validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    let phone = validate_phone(&payload.phone)?.to_string();

    let session = state
        .auth_service()
        .register(Registration {
            name,
            email,
            password: payload.password,
            phone,
            membership_type: payload
                .membership_type
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(FlatResponse::with_message("Registration successful", session)),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<FlatResponse<AuthSession>>, ApiError> {
    let email = validate_email(&payload.email)?;
    require_password(&payload.password)?;

    let session = state
        .auth_service()
        .login(&email, &payload.password)
        .await?;

    tracing::info!(user_id = session.user.id, "User logged in");
    Ok(Json(FlatResponse::with_message("Login successful", session)))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let profile = state.auth_service().profile(user.id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer(&headers), Some("abc.def"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer(&headers), None);
    }
}
