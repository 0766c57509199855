//! `/generate` HTTP 客户端
//!
//! 同步 ureq 调用，CLI 中放在 spawn_blocking 里执行。

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};
use ureq::Agent;

use super::ClientError;
use crate::services::GenerateRequest;

const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

pub struct DreamClient {
    agent: Agent,
    endpoint: String,
}

impl DreamClient {
    /// `server` 形如 `http://127.0.0.1:8080`
    pub fn new(server: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            endpoint: format!("{}/generate", server.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 提交一次生成请求，返回生成图片 URL
    pub fn generate(&self, request: &GenerateRequest) -> Result<String, ClientError> {
        debug!("POST {}", self.endpoint);
        let mut resp = self
            .agent
            .post(&self.endpoint)
            .send_json(request)
            .map_err(|e| {
                warn!("Request to {} failed: {}", self.endpoint, e);
                ClientError::Connection(e.to_string())
            })?;

        let status = resp.status().as_u16();
        let body = resp
            .body_mut()
            .read_to_string()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(ClientError::Server {
                status,
                message: failure_message(status, &body),
            });
        }

        serde_json::from_str::<Value>(&body)
            .ok()
            .as_ref()
            .and_then(extract_image_url)
            .ok_or(ClientError::UnexpectedResponse)
    }
}

/// 从成功响应中取图片 URL
///
/// 支持 `{"image": "url"}`、`{"image": [..]}` 与裸数组；
/// 数组取第二个元素（处理后的图片），只有一个时取第一个。
pub fn extract_image_url(body: &Value) -> Option<String> {
    let image = match body {
        Value::Object(map) => map.get("image")?,
        other => other,
    };

    match image {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        Value::Array(items) => items
            .get(1)
            .or_else(|| items.first())
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// 非 2xx 响应的用户提示
pub fn failure_message(status: u16, body: &str) -> String {
    if status == 429 {
        return RATE_LIMITED_MESSAGE.to_string();
    }

    if let Ok(json) = serde_json::from_str::<Value>(body)
        && let Some(error) = json.get("error").and_then(Value::as_str)
        && !error.is_empty()
    {
        return error.to_string();
    }

    if !body.trim().is_empty() {
        return body.to_string();
    }

    format!("Server error: {}", status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_single_url() {
        assert_eq!(
            extract_image_url(&json!({"image": "https://r8.im/out.png"})),
            Some("https://r8.im/out.png".to_string())
        );
    }

    #[test]
    fn test_extract_prefers_second_element() {
        let body = json!({"image": ["https://r8.im/edges.png", "https://r8.im/out.png"]});
        assert_eq!(extract_image_url(&body), Some("https://r8.im/out.png".to_string()));

        let body = json!(["https://r8.im/only.png"]);
        assert_eq!(extract_image_url(&body), Some("https://r8.im/only.png".to_string()));
    }

    #[test]
    fn test_extract_rejects_unknown_shapes() {
        assert_eq!(extract_image_url(&json!({"url": "x"})), None);
        assert_eq!(extract_image_url(&json!({"image": []})), None);
        assert_eq!(extract_image_url(&json!({"image": 3})), None);
    }

    #[test]
    fn test_failure_message_priority() {
        assert_eq!(failure_message(429, r#"{"error":"x"}"#), RATE_LIMITED_MESSAGE);
        assert_eq!(
            failure_message(500, r#"{"error":"Image generation failed"}"#),
            "Image generation failed"
        );
        assert_eq!(failure_message(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(failure_message(503, ""), "Server error: 503");
    }

    #[test]
    fn test_endpoint_normalized() {
        let client = DreamClient::new("http://localhost:8080/", Duration::from_secs(1));
        assert_eq!(client.endpoint(), "http://localhost:8080/generate");
    }

    #[test]
    fn test_unreachable_server_is_connection_error() {
        // 先占用一个空闲端口再释放，保证无人监听
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = DreamClient::new(&format!("http://127.0.0.1:{}", port), Duration::from_secs(2));
        let err = client.generate(&GenerateRequest::default()).unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
        assert!(err.user_message().starts_with("Could not connect"));
    }
}
