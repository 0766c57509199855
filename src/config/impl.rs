use std::sync::{Arc, OnceLock};

use super::StaticConfig;

static CONFIG: OnceLock<Arc<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config_from() first.")
        .clone()
}

/// Initialize the global configuration
///
/// `None` reads `config.toml` when present; env overrides apply either way.
/// Only the first call has an effect.
///
/// # Examples
/// ```no_run
/// use roomdream::config::init_config_from;
/// init_config_from(Some("/etc/roomdream/config.toml"));
/// ```
pub fn init_config_from(path: Option<&str>) {
    CONFIG.get_or_init(|| Arc::new(StaticConfig::load(path)));
}
