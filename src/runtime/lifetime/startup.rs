use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::StaticConfig;
use crate::ratelimit::create_rate_limiter;
use crate::services::{GenerationService, GenerationSettings, ReplicateClient};

pub struct StartupContext {
    pub generation: Arc<GenerationService>,
}

/// 准备服务器启动的上下文（预测 API 客户端、限流器）
pub fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    // redis (rediss://) 与 ureq 都需要 rustls provider
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let api = ReplicateClient::new(
        &config.replicate.api_url,
        &config.replicate.api_key,
        Duration::from_secs(config.replicate.request_timeout_secs),
    );
    if config.replicate.api_key.trim().is_empty() {
        warn!("REPLICATE_API_KEY is not set; /generate will answer 500 until it is configured");
    }

    let limiter =
        create_rate_limiter(&config.rate_limit).context("Failed to create rate limiter")?;

    let generation = Arc::new(GenerationService::new(
        Arc::new(api),
        limiter,
        GenerationSettings::from_config(config),
    ));

    info!(
        "Pre-startup completed in {:?} (model version {})",
        start_time.elapsed(),
        config.replicate.model_version
    );

    Ok(StartupContext { generation })
}
