use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum RoomDreamError {
    Configuration(String),
    Validation(String),
    RateLimitStore(String),
    UpstreamRateLimited,
    Upstream { status: u16, message: String },
    PollFailed { status: u16 },
    GenerationFailed(String),
    GenerationTimeout(u64),
    Transport(String),
    Serialization(String),
}

impl RoomDreamError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            RoomDreamError::Configuration(_) => "E001",
            RoomDreamError::Validation(_) => "E002",
            RoomDreamError::RateLimitStore(_) => "E003",
            RoomDreamError::UpstreamRateLimited => "E004",
            RoomDreamError::Upstream { .. } => "E005",
            RoomDreamError::PollFailed { .. } => "E006",
            RoomDreamError::GenerationFailed(_) => "E007",
            RoomDreamError::GenerationTimeout(_) => "E008",
            RoomDreamError::Transport(_) => "E009",
            RoomDreamError::Serialization(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            RoomDreamError::Configuration(_) => "Configuration Error",
            RoomDreamError::Validation(_) => "Validation Error",
            RoomDreamError::RateLimitStore(_) => "Rate Limit Store Error",
            RoomDreamError::UpstreamRateLimited => "Upstream Rate Limited",
            RoomDreamError::Upstream { .. } => "Upstream Error",
            RoomDreamError::PollFailed { .. } => "Prediction Poll Error",
            RoomDreamError::GenerationFailed(_) => "Generation Failed",
            RoomDreamError::GenerationTimeout(_) => "Generation Timeout",
            RoomDreamError::Transport(_) => "Transport Error",
            RoomDreamError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情（用于日志）
    pub fn message(&self) -> String {
        match self {
            RoomDreamError::Configuration(msg)
            | RoomDreamError::Validation(msg)
            | RoomDreamError::RateLimitStore(msg)
            | RoomDreamError::GenerationFailed(msg)
            | RoomDreamError::Transport(msg)
            | RoomDreamError::Serialization(msg) => msg.clone(),
            RoomDreamError::UpstreamRateLimited => "prediction API returned 429".to_string(),
            RoomDreamError::Upstream { status, message } => {
                format!("prediction API returned {}: {}", status, message)
            }
            RoomDreamError::PollFailed { status } => {
                format!("prediction poll returned {}", status)
            }
            RoomDreamError::GenerationTimeout(secs) => {
                format!("prediction did not finish within {}s", secs)
            }
        }
    }

    /// 返回给调用方的错误文本
    ///
    /// Upstream messages are forwarded as-is; internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            RoomDreamError::Configuration(msg) => format!("Server configuration error: {}", msg),
            RoomDreamError::Validation(msg) => msg.clone(),
            RoomDreamError::RateLimitStore(_) => "An unexpected error occurred".to_string(),
            RoomDreamError::UpstreamRateLimited => {
                "Rate limit exceeded. Please try again later.".to_string()
            }
            RoomDreamError::Upstream { message, .. } => message.clone(),
            RoomDreamError::PollFailed { .. } => "Failed to get generation result".to_string(),
            RoomDreamError::GenerationFailed(_) => "Image generation failed".to_string(),
            RoomDreamError::GenerationTimeout(_) => "Image generation timed out".to_string(),
            RoomDreamError::Transport(_) | RoomDreamError::Serialization(_) => {
                "Failed to process request".to_string()
            }
        }
    }

    /// 映射到 HTTP 状态码
    ///
    /// Upstream statuses that are not valid HTTP codes collapse to 502.
    pub fn http_status(&self) -> StatusCode {
        match self {
            RoomDreamError::Validation(_) => StatusCode::BAD_REQUEST,
            RoomDreamError::UpstreamRateLimited => StatusCode::TOO_MANY_REQUESTS,
            RoomDreamError::Upstream { status, .. } | RoomDreamError::PollFailed { status } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            RoomDreamError::GenerationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RoomDreamError::Configuration(_)
            | RoomDreamError::RateLimitStore(_)
            | RoomDreamError::GenerationFailed(_)
            | RoomDreamError::Transport(_)
            | RoomDreamError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for RoomDreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for RoomDreamError {}

// 便捷的构造函数
impl RoomDreamError {
    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        RoomDreamError::Configuration(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        RoomDreamError::Validation(msg.into())
    }

    pub fn rate_limit_store<T: Into<String>>(msg: T) -> Self {
        RoomDreamError::RateLimitStore(msg.into())
    }

    pub fn upstream<T: Into<String>>(status: u16, msg: T) -> Self {
        RoomDreamError::Upstream {
            status,
            message: msg.into(),
        }
    }

    pub fn generation_failed<T: Into<String>>(msg: T) -> Self {
        RoomDreamError::GenerationFailed(msg.into())
    }

    pub fn transport<T: Into<String>>(msg: T) -> Self {
        RoomDreamError::Transport(msg.into())
    }
}

impl From<serde_json::Error> for RoomDreamError {
    fn from(err: serde_json::Error) -> Self {
        RoomDreamError::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for RoomDreamError {
    fn from(err: redis::RedisError) -> Self {
        RoomDreamError::RateLimitStore(err.to_string())
    }
}

impl From<ureq::Error> for RoomDreamError {
    fn from(err: ureq::Error) -> Self {
        RoomDreamError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RoomDreamError>;
