// Configuration types module
// Defines all configuration-related data structures

use std::time::Duration;

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Quiz backend service
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base address, e.g. `http://localhost:5163`
    pub base_url: String,
    /// Upper bound for a single backend exchange, in seconds
    pub timeout: u64,
}

/// Browser session configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Key used to tag session cookies
    pub secret: String,
    pub cookie_name: String,
    /// Sessions untouched for longer than this (seconds) are dropped
    pub idle_timeout: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

/// The settings the router is constructed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub backend_base_url: String,
    pub backend_timeout: Duration,
    pub session_secret: String,
}
