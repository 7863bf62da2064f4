//! Redis implementation of [`ViewLedger`]

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use common::cache::RedisPool;

use crate::store::ViewLedger;

#[derive(Clone)]
pub struct RedisViewLedger {
    redis_pool: RedisPool,
    ttl_seconds: u64,
}

impl RedisViewLedger {
    pub fn new(redis_pool: RedisPool, ttl_seconds: u64) -> Self {
        Self {
            redis_pool,
            ttl_seconds,
        }
    }
}

fn view_key(session_id: &str, user_id: Uuid) -> String {
    format!("viewed:{}:{}", session_id, user_id)
}

#[async_trait]
impl ViewLedger for RedisViewLedger {
    async fn claim(&self, session_id: &str, user_id: Uuid) -> Result<bool> {
        self.redis_pool
            .set_if_absent(&view_key(session_id, user_id), "1", self.ttl_seconds)
            .await
    }

    async fn release(&self, session_id: &str, user_id: Uuid) -> Result<()> {
        self.redis_pool.delete(&view_key(session_id, user_id)).await
    }
}
