//! 应用运行配置加载。

use std::env;
use std::time::Duration;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub tcp_host: String,
    pub tcp_port: u16,
    /// 单次读取的最大字节数（握手帧与消息帧共用）
    pub read_buffer_bytes: usize,
    pub poller_enabled: bool,
    pub poll_interval_seconds: u64,
    pub poll_initial_delay_seconds: u64,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("PANEL_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("PANEL_DATABASE_URL".to_string()))?;
        let db_max_connections = read_u32_with_default("PANEL_DB_MAX_CONNECTIONS", 8)?;
        let tcp_host = env::var("PANEL_TCP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let tcp_port = read_u16_with_default("PANEL_TCP_PORT", 12345)?;
        let read_buffer_bytes = read_u64_with_default("PANEL_READ_BUFFER_BYTES", 1024)?;
        if read_buffer_bytes == 0 {
            return Err(ConfigError::Invalid(
                "PANEL_READ_BUFFER_BYTES".to_string(),
                "0".to_string(),
            ));
        }
        let poller_enabled = read_bool_with_default("PANEL_POLLER_ENABLED", true);
        let poll_interval_seconds = read_u64_with_default("PANEL_POLL_INTERVAL_SECONDS", 30)?;
        if poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "PANEL_POLL_INTERVAL_SECONDS".to_string(),
                "0".to_string(),
            ));
        }
        let poll_initial_delay_seconds =
            read_u64_with_default("PANEL_POLL_INITIAL_DELAY_SECONDS", 3)?;

        Ok(Self {
            database_url,
            db_max_connections,
            tcp_host,
            tcp_port,
            read_buffer_bytes: read_buffer_bytes as usize,
            poller_enabled,
            poll_interval_seconds,
            poll_initial_delay_seconds,
        })
    }

    /// TCP 监听地址（`host:port`）。
    pub fn tcp_addr(&self) -> String {
        format!("{}:{}", self.tcp_host, self.tcp_port)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn poll_initial_delay(&self) -> Duration {
        Duration::from_secs(self.poll_initial_delay_seconds)
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
