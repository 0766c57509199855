//! API 响应类型

use serde::Serialize;

use crate::services::GeneratedImage;
use crate::services::StyleCatalog;

/// 成功响应：`{ "image": ... }`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub image: GeneratedImage,
}

/// 错误响应：`{ "error": "..." }`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// 限流响应（429）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitedBody {
    pub error: String,
    pub message: String,
    pub limit: u64,
    pub remaining: u64,
    /// 窗口重置时间（Unix 毫秒）
    pub reset: i64,
    pub reset_in_hours: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    pub limit: u64,
    pub window_hours: i64,
    pub backend: String,
}

/// `GET /options`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    #[serde(flatten)]
    pub catalog: StyleCatalog,
    pub rate_limit: Option<RateLimitInfo>,
}
