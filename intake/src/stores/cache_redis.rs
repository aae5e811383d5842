//! Redis-backed key-value cache.
//!
//! Every command runs on a cloned [`ConnectionManager`] and is wrapped in a
//! timeout, so a slow or partitioned Redis surfaces as a prompt
//! [`IntakeError::Cache`] instead of a stalled request.
//!
//! # Example
//!
//! ```no_run
//! use eventform_intake::stores::RedisCache;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = RedisCache::new("redis://127.0.0.1:6379", Duration::from_millis(250)).await?;
//! # Ok(())
//! # }
//! ```

use eventform_core::providers::{KeyValueCache, Readiness};
use eventform_core::{IntakeError, Result};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};
use std::future::Future;
use std::time::Duration;

/// Redis implementation of [`KeyValueCache`].
#[derive(Clone)]
pub struct RedisCache {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
    /// Upper bound on one command.
    op_timeout: Duration,
}

impl RedisCache {
    /// Connect to Redis.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    /// * `op_timeout` - Upper bound on each command
    ///
    /// # Errors
    ///
    /// Returns error if connection to Redis fails.
    pub async fn new(redis_url: &str, op_timeout: Duration) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| IntakeError::Cache(format!("Failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            IntakeError::Cache(format!("Failed to create Redis connection manager: {e}"))
        })?;

        tracing::info!(timeout_ms = op_timeout.as_millis(), "Connected to Redis");

        Ok(Self {
            conn_manager,
            op_timeout,
        })
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        command: impl Future<Output = RedisResult<T>> + Send,
    ) -> Result<T> {
        match tokio::time::timeout(self.op_timeout, command).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(IntakeError::Cache(format!("Failed to {operation}: {e}"))),
            Err(_) => Err(IntakeError::Cache(format!(
                "Timed out during {operation} after {}ms",
                self.op_timeout.as_millis()
            ))),
        }
    }
}

impl KeyValueCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn_manager.clone();
        self.bounded("get key", async move { conn.get(key).await })
            .await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let seconds = ttl.as_secs().max(1);
        self.bounded("set key", async move { conn.set_ex(key, value, seconds).await })
            .await
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn_manager.clone();
        let seconds = ttl.as_secs().max(1);

        // SET ... NX replies OK when it wrote and nil when the key existed
        let reply: Option<String> = self
            .bounded("set key if absent", async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("NX")
                    .arg("EX")
                    .arg(seconds)
                    .query_async(&mut conn)
                    .await
            })
            .await?;

        Ok(reply.is_some())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut conn = self.conn_manager.clone();
        self.bounded("increment counter", async move { conn.incr(key, 1_i64).await })
            .await
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let _removed: i64 = self
            .bounded("delete key", async move { conn.del(key).await })
            .await?;
        Ok(())
    }
}

impl Readiness for RedisCache {
    async fn check_ready(&self) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let _pong: String = self
            .bounded("ping", async move {
                redis::cmd("PING").query_async(&mut conn).await
            })
            .await?;
        Ok(())
    }
}
