//! Client layer
//!
//! Talks to a running server's `/generate` endpoint and models the
//! transient page state (photo, result, loading flag, error text).
//!
//! ```text
//! CLI ──→ DreamClient ──HTTP──→ /generate
//!          │
//!          └→ DreamSession (one generation in flight at a time)
//! ```

mod dream_client;
mod session;

pub use dream_client::{DreamClient, extract_image_url, failure_message};
pub use session::{DreamSession, append_new_to_name};

use std::fmt;

/// 连接失败时显示的文本
pub const CONNECTION_FAILED_MESSAGE: &str =
    "Could not connect to the server. Please check your internet connection and try again.";

/// 响应格式无法识别时显示的文本
pub const UNEXPECTED_FORMAT_MESSAGE: &str =
    "Unexpected server response format. Please try again.";

/// 客户端侧的生成失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// 服务器不可达
    Connection(String),
    /// 服务器返回非 2xx
    Server { status: u16, message: String },
    /// 2xx 但响应体无法识别
    UnexpectedResponse,
    /// 已有生成请求在进行中，或尚未上传照片
    NotReady(String),
}

impl ClientError {
    /// 面向用户的提示文本
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Connection(_) => CONNECTION_FAILED_MESSAGE.to_string(),
            ClientError::Server { message, .. } => message.clone(),
            ClientError::UnexpectedResponse => UNEXPECTED_FORMAT_MESSAGE.to_string(),
            ClientError::NotReady(msg) => msg.clone(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Connection(e) => write!(f, "connection error: {}", e),
            ClientError::Server { status, message } => write!(f, "{}: {}", status, message),
            ClientError::UnexpectedResponse => write!(f, "{}", UNEXPECTED_FORMAT_MESSAGE),
            ClientError::NotReady(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ClientError {}
