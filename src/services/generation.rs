//! Generation service
//!
//! Runs one room redesign end to end: validate the request, build the
//! prompt, submit a prediction and poll it at a fixed interval until the
//! job succeeds or fails. No retries, no backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

use super::prediction::{
    GeneratedImage, Prediction, PredictionApi, PredictionInput, PredictionRequest,
    PredictionStatus,
};
use super::prompt::{PromptPlan, build_prompt};
use crate::config::{GenerationConfig, StaticConfig};
use crate::errors::{Result, RoomDreamError};
use crate::ratelimit::{RateLimitDecision, RateLimiter};

/// Guidance scale as sent by clients: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GuidanceScale {
    Number(f64),
    Text(String),
}

impl GuidanceScale {
    /// `None` means "use the default"
    ///
    /// The number `0` and the empty string fall back to the default. Other
    /// strings are read like a float prefix, so `"0"` is zero and `"9.5x"`
    /// is 9.5; strings without a numeric prefix fall back too.
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) if *n == 0.0 => return None,
            Self::Number(n) => *n,
            Self::Text(s) => leading_float(s)?,
        };
        value.is_finite().then_some(value)
    }
}

/// 解析字符串开头的浮点数（忽略前导空白与尾随字符）
fn leading_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// `POST /generate` 请求体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    /// Extra requirements appended in template mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<GuidanceScale>,
    /// Accepted for client compatibility; the model call does not use it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_seed: Option<bool>,
}

impl GenerateRequest {
    pub fn guidance_scale(&self) -> Option<f64> {
        self.scale.as_ref().and_then(GuidanceScale::value)
    }

    fn has_custom_prompt(&self) -> bool {
        self.custom_prompt
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }

    /// 校验构建 prompt 所需的字段
    ///
    /// The image reference itself is judged by the prediction API. Theme and
    /// room are only required when no custom prompt is given.
    pub fn validate(&self) -> Result<()> {
        if self
            .image_url
            .as_deref()
            .is_none_or(|u| u.trim().is_empty())
        {
            return Err(RoomDreamError::validation("imageUrl is required"));
        }

        if !self.has_custom_prompt() {
            for (field, value) in [("theme", &self.theme), ("room", &self.room)] {
                if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                    return Err(RoomDreamError::validation(format!(
                        "{} is required when customPrompt is empty",
                        field
                    )));
                }
            }
        }

        Ok(())
    }
}

/// 生成服务设置
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model_version: String,
    pub poll_interval: Duration,
    /// `None` = poll until the job finishes
    pub poll_timeout: Option<Duration>,
    pub generation: GenerationConfig,
    /// Proxies whose forwarded client IP is trusted for rate limiting
    pub trusted_proxies: Vec<String>,
}

impl GenerationSettings {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            model_version: config.replicate.model_version.clone(),
            poll_interval: Duration::from_millis(config.replicate.poll_interval_ms),
            poll_timeout: (config.replicate.poll_timeout_secs > 0)
                .then(|| Duration::from_secs(config.replicate.poll_timeout_secs)),
            generation: config.generation.clone(),
            trusted_proxies: config.rate_limit.trusted_proxies.clone(),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from_config(&StaticConfig::default())
    }
}

pub struct GenerationService {
    api: Arc<dyn PredictionApi>,
    limiter: Arc<dyn RateLimiter>,
    settings: GenerationSettings,
}

impl GenerationService {
    pub fn new(
        api: Arc<dyn PredictionApi>,
        limiter: Arc<dyn RateLimiter>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            api,
            limiter,
            settings,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api.is_configured()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn limiter(&self) -> &Arc<dyn RateLimiter> {
        &self.limiter
    }

    /// Count one request for `identifier` against its window.
    pub async fn check_rate_limit(&self, identifier: &str) -> Result<RateLimitDecision> {
        self.limiter.limit(identifier).await
    }

    /// Validate, submit and wait for the generated image.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedImage> {
        request.validate()?;

        let plan = build_prompt(request, &self.settings.generation);
        debug!(
            "Prompt plan: custom={}, strength={}, guidance_scale={}",
            plan.custom, plan.strength, plan.guidance_scale
        );
        trace!("Generated prompt: {}", plan.prompt);

        // validate() 已保证存在
        let image = request.image_url.as_deref().unwrap_or_default().trim();
        let prediction = self
            .api
            .create(&self.prediction_request(&plan, image))
            .await?;
        info!(
            "Prediction {} submitted with status {:?}",
            prediction.id, prediction.status
        );

        self.wait_for_result(prediction).await
    }

    fn prediction_request(&self, plan: &PromptPlan, image: &str) -> PredictionRequest {
        let generation = &self.settings.generation;
        PredictionRequest {
            version: self.settings.model_version.clone(),
            input: PredictionInput {
                prompt: plan.prompt.clone(),
                image: image.to_string(),
                strength: plan.strength,
                guidance_scale: plan.guidance_scale,
                num_inference_steps: generation.num_inference_steps,
                image_resolution: generation.image_resolution.to_string(),
                detect_resolution: generation.image_resolution,
            },
        }
    }

    /// Poll `urls.get` immediately, then every `poll_interval`.
    async fn wait_for_result(&self, prediction: Prediction) -> Result<GeneratedImage> {
        let poll_url = prediction.urls.get.clone().ok_or_else(|| {
            error!("Prediction {} has no poll URL", prediction.id);
            RoomDreamError::generation_failed("prediction response has no poll URL")
        })?;

        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            trace!("Polling prediction (attempt {})", attempts);
            let current = self.api.fetch(&poll_url).await?;

            match current.status {
                PredictionStatus::Succeeded => {
                    info!(
                        "Prediction {} succeeded after {} polls in {:?}",
                        current.id,
                        attempts,
                        started.elapsed()
                    );
                    return current.output.ok_or_else(|| {
                        error!("Prediction {} succeeded without output", current.id);
                        RoomDreamError::generation_failed("prediction succeeded without output")
                    });
                }
                PredictionStatus::Failed | PredictionStatus::Canceled => {
                    let detail = current
                        .error
                        .as_ref()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| format!("{:?}", current.status));
                    error!("Generation failed: {}", detail);
                    return Err(RoomDreamError::generation_failed(detail));
                }
                PredictionStatus::Starting
                | PredictionStatus::Processing
                | PredictionStatus::Unknown => {}
            }

            if let Some(timeout) = self.settings.poll_timeout
                && started.elapsed() >= timeout
            {
                error!(
                    "Prediction {} still {:?} after {:?}",
                    current.id, current.status, timeout
                );
                return Err(RoomDreamError::GenerationTimeout(timeout.as_secs()));
            }

            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }
}
