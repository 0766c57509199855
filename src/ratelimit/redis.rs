//! Redis 固定窗口限流
//!
//! 计数器 key 为 `{prefix}:{identifier}:{bucket}`，通过 Lua 脚本原子地
//! INCR 并在首次写入时设置 PEXPIRE，多实例共享同一计数。

use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::RwLock;
use tracing::{debug, error};

use super::traits::{FixedWindow, LimiterHealth, RateLimitDecision, RateLimiter};
use crate::errors::{Result, RoomDreamError};

const FIXED_WINDOW_SCRIPT: &str = r#"
local count = redis.call("INCR", KEYS[1])
if count == 1 then
  redis.call("PEXPIRE", KEYS[1], ARGV[1])
end
return count
"#;

pub struct RedisRateLimiter {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    script: redis::Script,
    window: FixedWindow,
    key_prefix: String,
}

impl RedisRateLimiter {
    /// 创建客户端（不会立即连接）
    pub fn new(url: &str, window: FixedWindow, key_prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            RoomDreamError::configuration(format!("Invalid rate limit redis URL: {}", e))
        })?;
        let key_prefix = key_prefix.into();

        debug!(
            "RedisRateLimiter created with prefix: '{}', limit: {} per {}ms",
            key_prefix, window.limit, window.window_ms
        );

        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            script: redis::Script::new(FIXED_WINDOW_SCRIPT),
            window,
            key_prefix,
        })
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> std::result::Result<MultiplexedConnection, redis::RedisError> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis rate limit connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis rate limit connection reset due to error");
    }

    async fn increment(&self, key: &str) -> std::result::Result<u64, redis::RedisError> {
        let mut conn = self.get_connection().await?;
        let count: u64 = self
            .script
            .key(key)
            .arg(self.window.window_ms)
            .invoke_async(&mut conn)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn limit(&self, identifier: &str) -> Result<RateLimitDecision> {
        let bucket = self.window.bucket(chrono::Utc::now().timestamp_millis());
        let key = FixedWindow::key(&self.key_prefix, identifier, bucket);

        match self.increment(&key).await {
            Ok(count) => Ok(self.window.decide(count, bucket)),
            Err(e) => {
                error!("Redis rate limit increment failed for {}: {}", key, e);
                self.reset_connection().await;
                Err(e.into())
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }

    fn window(&self) -> Option<FixedWindow> {
        Some(self.window)
    }

    async fn health_check(&self) -> LimiterHealth {
        let mut conn = match self.get_connection().await {
            Ok(conn) => conn,
            Err(e) => return LimiterHealth::unhealthy(self.backend_name(), e.to_string()),
        };

        let pong: std::result::Result<String, redis::RedisError> =
            redis::cmd("PING").query_async(&mut conn).await;
        match pong {
            Ok(_) => LimiterHealth::healthy(self.backend_name()),
            Err(e) => {
                self.reset_connection().await;
                LimiterHealth::unhealthy(self.backend_name(), e.to_string())
            }
        }
    }
}
