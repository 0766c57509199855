use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

/// 限流存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumIter, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RateLimitBackend {
    /// Redis 兼容存储（多实例共享计数）
    Redis,
    /// 进程内计数
    #[default]
    Memory,
    /// 不限流
    None,
}

impl std::fmt::Display for RateLimitBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for RateLimitBackend {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            "none" => Ok(Self::None),
            _ => Err(format!(
                "Invalid rate limit backend: '{}'. Valid: redis, memory, none",
                s
            )),
        }
    }
}

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、worker 数量
/// - replicate: 预测 API 地址、密钥、模型版本、轮询参数
/// - generation: 生成参数默认值
/// - rate_limit: 限流配置
/// - cors: 跨域配置
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub replicate: ReplicateConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config file > 默认值
    /// ENV 前缀：RD，分隔符：__
    /// 示例：RD__SERVER__PORT=9999
    ///
    /// `REPLICATE_API_KEY` is honoured when no key was configured otherwise.
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 RD，分隔符 __
            .add_source(
                Environment::with_prefix("RD")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        };

        if config.replicate.api_key.trim().is_empty()
            && let Ok(key) = std::env::var("REPLICATE_API_KEY")
        {
            config.replicate.api_key = key;
        }

        config
    }

    /// 生成示例 TOML 配置文件（全部为默认值）
    pub fn generate_sample_config() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&Self::default())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 请求体上限（字节）
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// 预测 API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicateConfig {
    #[serde(default = "default_replicate_api_url")]
    pub api_url: String,
    /// 为空时 /generate 返回 500
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model_version")]
    pub model_version: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// 0 = 不设轮询上限
    #[serde(default)]
    pub poll_timeout_secs: u64,
    /// 单次 HTTP 请求超时
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// 生成参数默认值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_guidance_scale")]
    pub default_guidance_scale: f64,
    #[serde(default = "default_num_inference_steps")]
    pub num_inference_steps: u32,
    #[serde(default = "default_image_resolution")]
    pub image_resolution: u32,
    #[serde(default = "default_custom_strength")]
    pub custom_strength: f64,
    #[serde(default = "default_template_strength")]
    pub template_strength: f64,
}

/// 限流配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub backend: RateLimitBackend,
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// 可信代理（IP 或 CIDR）。为空时私有地址来的连接自动视为代理
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_replicate_api_url() -> String {
    "https://api.replicate.com/v1".to_string()
}

fn default_model_version() -> String {
    "854e8727697a057c525cdb45ab037f64ecca770a1769cc52287c2e56472a247b".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_guidance_scale() -> f64 {
    8.5
}

fn default_num_inference_steps() -> u32 {
    30
}

fn default_image_resolution() -> u32 {
    768
}

fn default_custom_strength() -> f64 {
    0.6
}

fn default_template_strength() -> f64 {
    0.65
}

fn default_max_requests() -> u64 {
    10
}

fn default_window_secs() -> u64 {
    12 * 60 * 60
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_key_prefix() -> String {
    "roomdream:ratelimit".to_string()
}

fn default_cors_max_age() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            api_url: default_replicate_api_url(),
            api_key: String::new(),
            model_version: default_model_version(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_timeout_secs: 0,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_guidance_scale: default_guidance_scale(),
            num_inference_steps: default_num_inference_steps(),
            image_resolution: default_image_resolution(),
            custom_strength: default_custom_strength(),
            template_strength: default_template_strength(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            backend: RateLimitBackend::default(),
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            redis_url: default_redis_url(),
            key_prefix: default_key_prefix(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_service_limits() {
        let config = StaticConfig::default();
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window_secs, 43_200);
        assert_eq!(config.rate_limit.backend, RateLimitBackend::Memory);
        assert_eq!(config.replicate.poll_interval_ms, 1000);
        assert_eq!(config.generation.default_guidance_scale, 8.5);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp file");
        writeln!(
            file,
            "[server]\nport = 9123\n\n[rate_limit]\nbackend = \"none\"\nmax_requests = 3\n\n[replicate]\napi_key = \"r8_test\"\n"
        )
        .unwrap();

        let path = file.path().to_string_lossy().to_string();
        let config = StaticConfig::load(Some(&path));
        assert_eq!(config.server.port, 9123);
        assert_eq!(config.rate_limit.backend, RateLimitBackend::None);
        assert_eq!(config.rate_limit.max_requests, 3);
        assert_eq!(config.replicate.api_key, "r8_test");
        // 未配置的段落使用默认值
        assert_eq!(config.rate_limit.window_secs, 43_200);
    }

    #[test]
    fn test_sample_config_round_trips_through_toml() {
        let sample = StaticConfig::generate_sample_config().unwrap();
        assert!(sample.contains("[rate_limit]"));
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.replicate.model_version, default_model_version());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Redis".parse::<RateLimitBackend>(), Ok(RateLimitBackend::Redis));
        assert!("sqlite".parse::<RateLimitBackend>().is_err());
    }
}
