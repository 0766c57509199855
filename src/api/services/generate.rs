//! `POST /generate`
//!
//! 检查顺序固定：API 密钥 → 限流 → 请求体解析 → 生成。

use std::sync::Arc;
use std::time::Instant;

use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, error, info, trace, warn};

use super::types::{ErrorBody, GenerateResponse, RateLimitedBody};
use crate::errors::RoomDreamError;
use crate::ratelimit::{FixedWindow, RateLimitDecision};
use crate::services::{GenerateRequest, GenerationService};
use crate::utils::client_identifier;

pub struct GenerateService;

impl GenerateService {
    pub async fn generate(
        req: HttpRequest,
        body: web::Bytes,
        service: web::Data<Arc<GenerationService>>,
    ) -> HttpResponse {
        let start_time = Instant::now();

        if !service.is_configured() {
            error!("REPLICATE_API_KEY is not set");
            return error_response(&RoomDreamError::configuration("API key is not set"));
        }

        let identifier = client_identifier(&req, &service.settings().trusted_proxies);
        match service.check_rate_limit(&identifier).await {
            Ok(decision) if !decision.success => {
                info!(
                    "Rate limit reached for {} ({} per window)",
                    identifier, decision.limit
                );
                return rate_limited_response(&decision, service.limiter().window());
            }
            Ok(decision) => {
                trace!(
                    "Rate limit ok for {}: {} remaining",
                    identifier, decision.remaining
                );
            }
            Err(e) => {
                error!("Rate limit check failed: {}", e);
                return error_response(&e);
            }
        }

        let request: GenerateRequest = match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                warn!("Invalid generate request body from {}: {}", identifier, e);
                return error_response(&RoomDreamError::validation(format!(
                    "Invalid request body: {}",
                    e
                )));
            }
        };

        debug!(
            "Generate request: theme={:?}, room={:?}, custom_prompt={}, scale={:?}",
            request.theme,
            request.room,
            request.custom_prompt.is_some(),
            request.scale
        );

        match service.generate(&request).await {
            Ok(image) => {
                info!("Generation completed in {:?}", start_time.elapsed());
                HttpResponse::Ok().json(GenerateResponse { image })
            }
            Err(e) => {
                warn!(
                    "Generation failed after {:?}: {}",
                    start_time.elapsed(),
                    e
                );
                error_response(&e)
            }
        }
    }
}

/// 错误映射为 `{ error }` + 对应状态码
pub fn error_response(err: &RoomDreamError) -> HttpResponse {
    let details = match err {
        RoomDreamError::RateLimitStore(msg) => Some(msg.clone()),
        _ => None,
    };

    HttpResponse::build(err.http_status()).json(ErrorBody {
        error: err.public_message(),
        details,
    })
}

fn rate_limited_response(
    decision: &RateLimitDecision,
    window: Option<FixedWindow>,
) -> HttpResponse {
    let window_hours = window.map(|w| w.window_hours()).unwrap_or_default();
    let now = chrono::Utc::now().timestamp_millis();

    HttpResponse::TooManyRequests().json(RateLimitedBody {
        error: "Rate limit reached".to_string(),
        message: format!(
            "You have reached the limit of {} room generations per {} hours. \
             Please try again after {} hours from your first generation. \
             This limit helps us maintain service quality for all users.",
            decision.limit, window_hours, window_hours
        ),
        limit: decision.limit,
        remaining: decision.remaining,
        reset: decision.reset,
        reset_in_hours: decision.reset_in_hours(now),
    })
}

/// `/generate` 与 `/api/generate` 两个路径
pub fn generate_routes() -> actix_web::Resource {
    web::resource(["/generate", "/api/generate"]).route(web::post().to(GenerateService::generate))
}
