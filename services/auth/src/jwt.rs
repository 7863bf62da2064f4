//! JWT service for token generation, validation, and management
//!
//! Tokens are signed with RS256. Claims carry identity only (`sub`, `email`);
//! the api service re-reads the caller's role from the database on every
//! authorization check, so no role is ever embedded here.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;
use uuid::Uuid;

use common::{cache::RedisPool, models::User};

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Private key for signing tokens (PEM)
    pub private_key: String,
    /// Public key for verifying tokens (PEM)
    pub public_key: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PRIVATE_KEY`: Private key (PEM) or path to a PEM file
    /// - `JWT_PUBLIC_KEY`: Public key (PEM) or path to a PEM file
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let private_key = read_pem_var("JWT_PRIVATE_KEY")?;
        let public_key = read_pem_var("JWT_PUBLIC_KEY")?;

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .unwrap_or(900);

        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .unwrap_or(604800);

        Ok(JwtConfig {
            private_key,
            public_key,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

/// Read a PEM either inline from the variable or from the file it points at
fn read_pem_var(name: &str) -> Result<String> {
    let value =
        std::env::var(name).map_err(|_| anyhow::anyhow!("{} environment variable not set", name))?;

    if value.starts_with("-----BEGIN") {
        return Ok(value);
    }

    let pem = std::fs::read_to_string(&value)
        .or_else(|_| {
            let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            path.push(&value);
            std::fs::read_to_string(path)
        })
        .map_err(|e| anyhow::anyhow!("Failed to read {} file: {}", name, e))?;
    Ok(pem.trim().to_string())
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// User email
    pub email: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())?;
        let decoding_key = DecodingKey::from_rsa_pem(config.public_key.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    fn sign(&self, user: &User, token_type: TokenType, ttl: u64) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            iat: now,
            exp: now + ttl,
            token_type,
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?;
        debug!(user_id = %user.id, ?token_type, "jwt signed");
        Ok(token)
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user: &User) -> Result<String> {
        self.sign(user, TokenType::Access, self.config.access_token_expiry)
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user: &User) -> Result<String> {
        self.sign(user, TokenType::Refresh, self.config.refresh_token_expiry)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Validate a token and require it to be a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims> {
        let claims = self.validate_token(token)?;
        if claims.token_type != TokenType::Refresh {
            anyhow::bail!("Token is not a refresh token");
        }
        Ok(claims)
    }

    /// Check if a token is blacklisted in Redis
    pub async fn is_token_blacklisted(&self, redis_pool: &RedisPool, token: &str) -> Result<bool> {
        let key = blacklist_key(token);
        let result = redis_pool.get(&key).await?;
        Ok(result.is_some())
    }

    /// Blacklist a token in Redis for `expiry` seconds
    pub async fn blacklist_token(
        &self,
        redis_pool: &RedisPool,
        token: &str,
        expiry: u64,
    ) -> Result<()> {
        // SETEX rejects a zero TTL; an already-expired token needs no entry
        if expiry == 0 {
            return Ok(());
        }
        redis_pool.set(&blacklist_key(token), "1", Some(expiry)).await
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Get the refresh token expiry time
    pub fn refresh_token_expiry(&self) -> u64 {
        self.config.refresh_token_expiry
    }

    /// Rotate a refresh token
    ///
    /// Blacklists the old refresh token for its remaining lifetime and
    /// issues a new one for the same user.
    pub async fn rotate_refresh_token(
        &self,
        redis_pool: &RedisPool,
        user: &User,
        old_refresh_token: &str,
    ) -> Result<String> {
        let claims = self.validate_refresh_token(old_refresh_token)?;

        if claims.sub != user.id {
            anyhow::bail!("Token does not belong to user");
        }

        let expiry = remaining_lifetime(&claims)?;
        self.blacklist_token(redis_pool, old_refresh_token, expiry)
            .await?;

        self.generate_refresh_token(user)
    }
}

/// Seconds until the token expires, zero when already expired
pub fn remaining_lifetime(claims: &Claims) -> Result<u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs();
    Ok(claims.exp.saturating_sub(now))
}

fn blacklist_key(token: &str) -> String {
    format!("blacklisted_token:{}", token)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use common::models::{Role, VerificationStatus};

    pub(crate) fn test_config() -> JwtConfig {
        JwtConfig {
            private_key: include_str!("../tests/fixtures/private.pem").to_string(),
            public_key: include_str!("../tests/fixtures/public.pem").to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 3600,
        }
    }

    pub(crate) fn test_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            url_id: 7,
            email: "seeker@example.com".to_string(),
            password_hash: "hash".to_string(),
            full_name: "Seeker".to_string(),
            description: "needs help".to_string(),
            phone_number: "+15550100".to_string(),
            role: Role::HelpSeeker,
            status: Some(VerificationStatus::Pending),
            verified_by: None,
            verified_at: None,
            remarks: None,
            view_count: 0,
            linkedin_url: None,
            campaign_url: None,
            facebook_url: None,
            telegram_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn access_token_round_trip_carries_identity_only() {
        let service = JwtService::new(test_config()).unwrap();
        let user = test_user();

        let token = service.generate_access_token(&user).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn refresh_validation_rejects_access_tokens() {
        let service = JwtService::new(test_config()).unwrap();
        let user = test_user();

        let access = service.generate_access_token(&user).unwrap();
        let err = service.validate_refresh_token(&access).unwrap_err();
        assert!(err.to_string().contains("not a refresh token"));

        let refresh = service.generate_refresh_token(&user).unwrap();
        let claims = service.validate_refresh_token(&refresh).unwrap();
        assert_eq!(claims.token_type, TokenType::Refresh);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = JwtService::new(test_config()).unwrap();
        let mut token = service.generate_access_token(&test_user()).unwrap();
        token.push('x');
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn invalid_pem_fails_construction() {
        let mut config = test_config();
        config.private_key = "not a key".to_string();
        assert!(JwtService::new(config).is_err());
    }

    #[test]
    fn remaining_lifetime_saturates() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@b.co".to_string(),
            iat: 0,
            exp: 1,
            token_type: TokenType::Refresh,
        };
        assert_eq!(remaining_lifetime(&claims).unwrap(), 0);
    }
}
