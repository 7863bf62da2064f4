//! Authentication middleware for JWT token validation
//!
//! Tokens are issued by the auth service. Only identity is taken from them;
//! roles are looked up per request by the guards.

use anyhow::Result;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Claims the api reads from an auth service token. `exp` is checked by
/// the validator.
#[derive(Debug, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub token_type: TokenType,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
}

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Verifies access tokens against the auth service's public key
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn from_public_key(pem: &str) -> Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(pem.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Build from `JWT_PUBLIC_KEY`, holding either a PEM or a path to one
    pub fn from_env() -> Result<Self> {
        let value = std::env::var("JWT_PUBLIC_KEY")
            .map_err(|_| anyhow::anyhow!("JWT_PUBLIC_KEY environment variable not set"))?;

        let pem = if value.starts_with("-----BEGIN") {
            value
        } else {
            std::fs::read_to_string(&value)
                .or_else(|_| {
                    let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
                    path.push(&value);
                    std::fs::read_to_string(path)
                })
                .map_err(|e| anyhow::anyhow!("Failed to read public key file: {}", e))?
        };

        Self::from_public_key(&pem)
    }

    /// Validate an access token. Refresh tokens are rejected.
    pub fn verify_access_token(&self, token: &str) -> Result<AuthUser> {
        let claims =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        if claims.token_type != TokenType::Access {
            anyhow::bail!("not an access token");
        }

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(ApiError::Unauthorized)?;

    let user = state.jwt_verifier.verify_access_token(token).map_err(|e| {
        warn!("Rejected token: {}", e);
        ApiError::Unauthorized
    })?;
    debug!(user_id = %user.id, email = %user.email, "request authenticated");

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Optional caller identity for public routes.
///
/// A missing or invalid token yields an anonymous caller rather than an error.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(MaybeAuthUser(None));
        };

        match state.jwt_verifier.verify_access_token(token) {
            Ok(user) => Ok(MaybeAuthUser(Some(user))),
            Err(e) => {
                debug!("Ignoring invalid token on public route: {}", e);
                Ok(MaybeAuthUser(None))
            }
        }
    }
}
