//! 按客户端的固定窗口限流
//!
//! 后端：
//! - `redis`: 共享计数（多实例）
//! - `memory`: 进程内计数
//! - `none`: 不限流

pub mod memory;
pub mod null;
pub mod redis;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

pub use self::memory::MemoryRateLimiter;
pub use self::null::NullRateLimiter;
pub use self::redis::RedisRateLimiter;
pub use self::traits::{FixedWindow, LimiterHealth, RateLimitDecision, RateLimiter};

use crate::config::{RateLimitBackend, RateLimitConfig};
use crate::errors::Result;

/// 根据配置创建限流器
pub fn create_rate_limiter(config: &RateLimitConfig) -> Result<Arc<dyn RateLimiter>> {
    let window = FixedWindow::new(config.max_requests, Duration::from_secs(config.window_secs));

    let limiter: Arc<dyn RateLimiter> = match config.backend {
        RateLimitBackend::Redis => Arc::new(RedisRateLimiter::new(
            &config.redis_url,
            window,
            config.key_prefix.clone(),
        )?),
        RateLimitBackend::Memory => {
            Arc::new(MemoryRateLimiter::new(window, config.key_prefix.clone()))
        }
        RateLimitBackend::None => Arc::new(NullRateLimiter),
    };

    info!(
        "Rate limiter: backend={}, {} requests per {}s",
        limiter.backend_name(),
        config.max_requests,
        config.window_secs
    );
    Ok(limiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_picks_backend() {
        let mut config = RateLimitConfig::default();
        assert_eq!(create_rate_limiter(&config).unwrap().backend_name(), "memory");

        config.backend = RateLimitBackend::None;
        let limiter = create_rate_limiter(&config).unwrap();
        assert_eq!(limiter.backend_name(), "none");
        assert!(limiter.window().is_none());
    }
}
