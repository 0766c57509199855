use async_trait::async_trait;

use super::traits::{FixedWindow, RateLimitDecision, RateLimiter};
use crate::errors::Result;

/// 不限流（`rate_limit.backend = "none"`）
#[derive(Default)]
pub struct NullRateLimiter;

#[async_trait]
impl RateLimiter for NullRateLimiter {
    async fn limit(&self, _identifier: &str) -> Result<RateLimitDecision> {
        Ok(RateLimitDecision {
            success: true,
            limit: 0,
            remaining: 0,
            reset: 0,
        })
    }

    fn backend_name(&self) -> &'static str {
        "none"
    }

    fn window(&self) -> Option<FixedWindow> {
        None
    }
}
