//! Replicate 预测 API 客户端
//!
//! 使用 ureq（同步）发送请求，在 spawn_blocking 中执行，避免阻塞 actix worker。
//! 状态码解析是纯函数，便于测试。

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, trace, warn};
use ureq::Agent;

use super::PredictionApi;
use super::types::{Prediction, PredictionRequest};
use crate::errors::{Result, RoomDreamError};

/// 提交失败且响应中无可用错误信息时的默认文本
const DEFAULT_CREATE_ERROR: &str = "Failed to generate image";

pub struct ReplicateClient {
    agent: Agent,
    api_url: String,
    api_key: String,
}

impl ReplicateClient {
    /// `api_url` 形如 `https://api.replicate.com/v1`
    pub fn new(api_url: &str, api_key: &str, request_timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(request_timeout))
            // 非 2xx 也返回响应，由我们自己解析状态码
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
        }
    }

    fn predictions_url(&self) -> String {
        format!("{}/predictions", self.api_url)
    }

    fn authorization(&self) -> String {
        format!("Token {}", self.api_key)
    }

    fn create_sync(
        agent: Agent,
        url: String,
        authorization: String,
        request: PredictionRequest,
    ) -> Result<Prediction> {
        let mut resp = agent
            .post(&url)
            .header("Authorization", authorization.as_str())
            .send_json(&request)?;

        let status = resp.status().as_u16();
        let body = resp.body_mut().read_to_string()?;
        trace!("Prediction create response {}: {}", status, body);

        interpret_create_response(status, &body)
    }

    fn fetch_sync(agent: Agent, url: String, authorization: String) -> Result<Prediction> {
        let mut resp = agent
            .get(&url)
            .header("Authorization", authorization.as_str())
            .call()?;

        let status = resp.status().as_u16();
        let body = resp.body_mut().read_to_string()?;
        trace!("Prediction poll response {}: {}", status, body);

        interpret_poll_response(status, &body)
    }
}

#[async_trait]
impl PredictionApi for ReplicateClient {
    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn create(&self, request: &PredictionRequest) -> Result<Prediction> {
        let agent = self.agent.clone();
        let url = self.predictions_url();
        let authorization = self.authorization();
        let request = request.clone();

        debug!("Submitting prediction to {}", url);
        tokio::task::spawn_blocking(move || Self::create_sync(agent, url, authorization, request))
            .await
            .map_err(|e| {
                warn!("Prediction create spawn_blocking failed: {}", e);
                RoomDreamError::transport(e.to_string())
            })?
    }

    async fn fetch(&self, url: &str) -> Result<Prediction> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let authorization = self.authorization();

        tokio::task::spawn_blocking(move || Self::fetch_sync(agent, url, authorization))
            .await
            .map_err(|e| {
                warn!("Prediction poll spawn_blocking failed: {}", e);
                RoomDreamError::transport(e.to_string())
            })?
    }
}

/// 解析提交响应
///
/// - 429 → 上游限流
/// - 其他非 2xx → 原状态码，消息取 JSON `error`/`detail` 字段或原始文本
pub(crate) fn interpret_create_response(status: u16, body: &str) -> Result<Prediction> {
    if status == 429 {
        warn!("Prediction API rate limited the request");
        return Err(RoomDreamError::UpstreamRateLimited);
    }

    if !(200..300).contains(&status) {
        error!("Prediction API error response {}: {}", status, body);
        return Err(RoomDreamError::upstream(status, upstream_error_message(body)));
    }

    Ok(serde_json::from_str(body)?)
}

/// 解析轮询响应
pub(crate) fn interpret_poll_response(status: u16, body: &str) -> Result<Prediction> {
    if !(200..300).contains(&status) {
        error!("Prediction poll error response {}: {}", status, body);
        return Err(RoomDreamError::PollFailed { status });
    }

    Ok(serde_json::from_str(body)?)
}

fn upstream_error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => ["error", "detail"]
            .iter()
            .filter_map(|field| match &json[*field] {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) if s.is_empty() => None,
                serde_json::Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .next()
            .unwrap_or_else(|| DEFAULT_CREATE_ERROR.to_string()),
        Err(_) if body.trim().is_empty() => DEFAULT_CREATE_ERROR.to_string(),
        Err(_) => body.to_string(),
    }
}
