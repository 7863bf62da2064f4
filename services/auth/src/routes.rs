//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use common::models::{NewUser, ProfileLinks, Role, User, VerificationStatus};

use crate::{
    AppState,
    jwt::remaining_lifetime,
    repositories::user::{hash_password, verify_password},
    validation::{validate_email, validate_password, validate_profile},
};

/// Request for help seeker registration
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub description: String,
    pub phone_number: String,
    #[serde(flatten)]
    pub links: ProfileLinks,
}

/// Request for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request carrying a refresh token (refresh and logout)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Identity summary returned with a token pair
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub url_id: i32,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub status: VerificationStatus,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            url_id: user.url_id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            status: user.effective_status(),
        }
    }
}

/// Response for token generation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: SessionUser,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/logout", post(logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Sign a token pair for `user` and store the refresh session
async fn issue_tokens(state: &AppState, user: &User) -> Result<TokenResponse, AuthError> {
    let access_token = state.jwt_service.generate_access_token(user).map_err(|e| {
        error!("Failed to generate access token: {}", e);
        AuthError::InternalServerError
    })?;

    let refresh_token = state.jwt_service.generate_refresh_token(user).map_err(|e| {
        error!("Failed to generate refresh token: {}", e);
        AuthError::InternalServerError
    })?;

    state
        .session_manager
        .store(user.id, &refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to store session in Redis: {}", e);
            AuthError::InternalServerError
        })?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
        user: SessionUser::from(user),
    })
}

/// Help seeker registration endpoint
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let email = normalize_email(&payload.email);

    validate_email(&email).map_err(AuthError::BadRequest)?;
    validate_password(&payload.password).map_err(AuthError::BadRequest)?;
    validate_profile(&payload.full_name, &payload.description, &payload.phone_number)
        .map_err(AuthError::BadRequest)?;

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        AuthError::InternalServerError
    })?;

    let new_user = NewUser {
        email,
        password_hash,
        full_name: payload.full_name.trim().to_string(),
        description: payload.description.trim().to_string(),
        phone_number: payload.phone_number.trim().to_string(),
        links: payload.links,
    };

    let user = state
        .user_repository
        .create(&new_user)
        .await
        .map_err(|e| {
            error!("Failed to create user: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or_else(|| {
            warn!(email = %new_user.email, "email already registered");
            AuthError::Conflict("Email already registered".to_string())
        })?;

    info!(user_id = %user.id, url_id = user.url_id, "help seeker registered");
    let response = issue_tokens(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let email = normalize_email(&payload.email);

    if !state.rate_limiter.is_allowed(&email).await {
        return Err(AuthError::TooManyRequests);
    }

    let user = state
        .user_repository
        .find_by_email(&email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or_else(|| {
            warn!(%email, "login for unknown email");
            AuthError::Unauthorized
        })?;

    let valid = verify_password(&user, &payload.password).map_err(|e| {
        error!("Failed to verify password: {}", e);
        AuthError::InternalServerError
    })?;

    if !valid {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(AuthError::Unauthorized);
    }

    state.rate_limiter.reset(&email).await;
    info!(user_id = %user.id, "user logged in");

    Ok(Json(issue_tokens(&state, &user).await?))
}

/// Refresh token endpoint
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let claims = state
        .jwt_service
        .validate_refresh_token(&payload.refresh_token)
        .map_err(|_| AuthError::Unauthorized)?;

    let is_blacklisted = state
        .jwt_service
        .is_token_blacklisted(&state.redis_pool, &payload.refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to check if token is blacklisted: {}", e);
            AuthError::InternalServerError
        })?;

    if is_blacklisted {
        return Err(AuthError::Unauthorized);
    }

    let is_current = state
        .session_manager
        .is_current(claims.sub, &payload.refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to read session: {}", e);
            AuthError::InternalServerError
        })?;

    if !is_current {
        warn!(user_id = %claims.sub, "refresh with superseded token");
        return Err(AuthError::Unauthorized);
    }

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    let access_token = state.jwt_service.generate_access_token(&user).map_err(|e| {
        error!("Failed to generate access token: {}", e);
        AuthError::InternalServerError
    })?;

    let new_refresh_token = state
        .jwt_service
        .rotate_refresh_token(&state.redis_pool, &user, &payload.refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to rotate refresh token: {}", e);
            AuthError::InternalServerError
        })?;

    state
        .session_manager
        .store(user.id, &new_refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to update session in Redis: {}", e);
            AuthError::InternalServerError
        })?;

    Ok(Json(TokenResponse {
        access_token,
        refresh_token: new_refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
        user: SessionUser::from(&user),
    }))
}

/// Logout endpoint
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let claims = state
        .jwt_service
        .validate_refresh_token(&payload.refresh_token)
        .map_err(|_| AuthError::Unauthorized)?;

    let expiry = remaining_lifetime(&claims).map_err(|e| {
        error!("Failed to compute token lifetime: {}", e);
        AuthError::InternalServerError
    })?;

    state
        .jwt_service
        .blacklist_token(&state.redis_pool, &payload.refresh_token, expiry)
        .await
        .map_err(|e| {
            error!("Failed to blacklist token: {}", e);
            AuthError::InternalServerError
        })?;

    state
        .session_manager
        .delete(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to remove session from Redis: {}", e);
            AuthError::InternalServerError
        })?;

    info!(user_id = %claims.sub, "user logged out");
    Ok(Json(serde_json::json!({"message": "Logged out successfully"})))
}

/// Error type for authentication endpoints
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Too many login attempts")]
    TooManyRequests,
    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
