//! 进程内固定窗口限流
//!
//! 每个 (identifier, bucket) 一个原子计数器，存放在 Moka 缓存中，
//! TTL 等于窗口长度，过期窗口自动淘汰。多实例部署时计数不共享，应使用 redis 后端。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use moka::sync::Cache;
use tracing::trace;

use super::traits::{FixedWindow, RateLimitDecision, RateLimiter};
use crate::errors::Result;

/// 计数器缓存最大容量
const MEMORY_MAX_CAPACITY: u64 = 100_000;

pub struct MemoryRateLimiter {
    window: FixedWindow,
    key_prefix: String,
    counters: Cache<String, Arc<AtomicU64>>,
}

impl MemoryRateLimiter {
    pub fn new(window: FixedWindow, key_prefix: impl Into<String>) -> Self {
        let counters = Cache::builder()
            .time_to_live(Duration::from_millis(window.window_ms as u64))
            .max_capacity(MEMORY_MAX_CAPACITY)
            .build();

        Self {
            window,
            key_prefix: key_prefix.into(),
            counters,
        }
    }

    /// 以给定时间点做一次判定
    pub fn limit_at(&self, identifier: &str, now_ms: i64) -> RateLimitDecision {
        let bucket = self.window.bucket(now_ms);
        let key = FixedWindow::key(&self.key_prefix, identifier, bucket);

        let counter = self
            .counters
            .get_with(key, || Arc::new(AtomicU64::new(0)));
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;

        trace!(
            "Memory rate limit: identifier={}, bucket={}, count={}",
            identifier, bucket, count
        );
        self.window.decide(count, bucket)
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn limit(&self, identifier: &str) -> Result<RateLimitDecision> {
        Ok(self.limit_at(identifier, chrono::Utc::now().timestamp_millis()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn window(&self) -> Option<FixedWindow> {
        Some(self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: u64) -> MemoryRateLimiter {
        MemoryRateLimiter::new(FixedWindow::new(limit, Duration::from_secs(3600)), "test")
    }

    #[test]
    fn test_allows_up_to_limit_then_rejects() {
        let limiter = limiter(3);
        let now = 1_700_000_000_000;
        for expected_remaining in [2, 1, 0] {
            let decision = limiter.limit_at("1.2.3.4", now);
            assert!(decision.success);
            assert_eq!(decision.remaining, expected_remaining);
        }
        let decision = limiter.limit_at("1.2.3.4", now);
        assert!(!decision.success);
        assert_eq!(decision.limit, 3);
    }

    #[test]
    fn test_identifiers_are_independent() {
        let limiter = limiter(1);
        let now = 1_700_000_000_000;
        assert!(limiter.limit_at("a", now).success);
        assert!(!limiter.limit_at("a", now).success);
        assert!(limiter.limit_at("b", now).success);
    }

    #[test]
    fn test_next_window_starts_fresh() {
        let limiter = limiter(1);
        let now = 1_700_000_000_000;
        let first = limiter.limit_at("a", now);
        assert!(first.success);
        assert!(!limiter.limit_at("a", now).success);

        let next = limiter.limit_at("a", first.reset);
        assert!(next.success);
        assert_eq!(next.reset, first.reset + 3_600_000);
    }
}
