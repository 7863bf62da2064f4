//! Refresh-token sessions kept in Redis
//!
//! One live refresh token per user; a refresh request must present exactly
//! the stored token, so a rotated-out token cannot be replayed even before
//! its blacklist entry is checked.

use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use common::cache::RedisPool;

/// Session manager for handling user sessions in Redis
#[derive(Clone)]
pub struct SessionManager {
    redis_pool: RedisPool,
    ttl_seconds: u64,
}

impl SessionManager {
    pub fn new(redis_pool: RedisPool, ttl_seconds: u64) -> Self {
        Self {
            redis_pool,
            ttl_seconds,
        }
    }

    /// Store (or replace) the refresh token for a user
    pub async fn store(&self, user_id: Uuid, refresh_token: &str) -> Result<()> {
        info!(%user_id, "storing session");
        self.redis_pool
            .set(&session_key(user_id), refresh_token, Some(self.ttl_seconds))
            .await
    }

    /// Delete the session for a user
    pub async fn delete(&self, user_id: Uuid) -> Result<()> {
        info!(%user_id, "deleting session");
        self.redis_pool.delete(&session_key(user_id)).await
    }

    /// Check that `refresh_token` is the one currently stored for the user
    pub async fn is_current(&self, user_id: Uuid, refresh_token: &str) -> Result<bool> {
        let stored = self.redis_pool.get(&session_key(user_id)).await?;
        Ok(stored.as_deref() == Some(refresh_token))
    }
}

fn session_key(user_id: Uuid) -> String {
    format!("session:{}", user_id)
}
