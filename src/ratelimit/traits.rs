use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::Result;

/// 固定窗口参数
///
/// 同一窗口内的所有请求共享一个计数器；窗口边界按 `window_ms` 对齐到 Unix 时间。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWindow {
    pub limit: u64,
    pub window_ms: i64,
}

impl FixedWindow {
    pub fn new(limit: u64, window: Duration) -> Self {
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX).max(1);
        Self { limit, window_ms }
    }

    /// 当前时间所在窗口编号
    pub fn bucket(&self, now_ms: i64) -> i64 {
        now_ms.div_euclid(self.window_ms)
    }

    /// 窗口结束时间（Unix 毫秒）
    pub fn reset_at(&self, bucket: i64) -> i64 {
        bucket.saturating_add(1).saturating_mul(self.window_ms)
    }

    /// 根据窗口内累计次数做出判定（count 包含本次请求）
    pub fn decide(&self, count: u64, bucket: i64) -> RateLimitDecision {
        RateLimitDecision {
            success: count <= self.limit,
            limit: self.limit,
            remaining: self.limit.saturating_sub(count),
            reset: self.reset_at(bucket),
        }
    }

    pub fn key(prefix: &str, identifier: &str, bucket: i64) -> String {
        format!("{}:{}:{}", prefix, identifier, bucket)
    }

    pub fn window_hours(&self) -> i64 {
        (self.window_ms as f64 / 3_600_000.0).round() as i64
    }
}

/// 一次限流判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub success: bool,
    pub limit: u64,
    pub remaining: u64,
    /// 窗口重置时间（Unix 毫秒）
    pub reset: i64,
}

impl RateLimitDecision {
    /// 距离重置的小时数（四舍五入）
    pub fn reset_in_hours(&self, now_ms: i64) -> i64 {
        ((self.reset - now_ms) as f64 / 3_600_000.0).round() as i64
    }
}

/// 限流后端健康状态
#[derive(Debug, Clone, Serialize)]
pub struct LimiterHealth {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LimiterHealth {
    pub fn healthy(backend: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            backend: backend.to_string(),
            error: None,
        }
    }

    pub fn unhealthy(backend: &str, error: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            backend: backend.to_string(),
            error: Some(error.into()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// 记录一次请求并返回判定结果（被拒绝的请求同样计数）
    async fn limit(&self, identifier: &str) -> Result<RateLimitDecision>;

    fn backend_name(&self) -> &'static str;

    /// `None` 表示不限流
    fn window(&self) -> Option<FixedWindow>;

    async fn health_check(&self) -> LimiterHealth {
        LimiterHealth::healthy(self.backend_name())
    }
}
