// Configuration module entry point
// Loads typed configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

pub use state::AppState;
pub use types::{
    BackendConfig, BridgeConfig, Config, HttpConfig, LoggingConfig, PerformanceConfig,
    ServerConfig, SessionConfig,
};

/// Secret used when none is configured; only fit for local development
pub const DEV_SESSION_SECRET: &str = "dev-secret-change-me";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("QUIZ").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("backend.base_url", "http://localhost:5163")?
            .set_default("backend.timeout", 10)?
            .set_default("session.secret", DEV_SESSION_SECRET)?
            .set_default("session.cookie_name", "quiz_session")?
            .set_default("session.idle_timeout", 3600)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "quiz-frontend")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            // Plain variables kept for compatibility with existing deployments
            .set_override_option("backend.base_url", std::env::var("BACKEND_URL").ok())?
            .set_override_option("session.secret", std::env::var("SECRET_KEY").ok())?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if !self.backend.base_url.starts_with("http://") {
            return Err(config::ConfigError::Message(format!(
                "backend.base_url must be an http:// address, got '{}'",
                self.backend.base_url
            )));
        }
        if self.backend.timeout == 0 {
            return Err(config::ConfigError::Message(
                "backend.timeout must be at least 1 second".to_string(),
            ));
        }
        if self.session.secret.is_empty() {
            return Err(config::ConfigError::Message(
                "session.secret must not be empty".to_string(),
            ));
        }
        if self.session.cookie_name.is_empty() {
            return Err(config::ConfigError::Message(
                "session.cookie_name must not be empty".to_string(),
            ));
        }
        self.get_socket_addr().map_err(config::ConfigError::Message)?;
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Settings handed to the router at construction
    pub fn bridge(&self) -> BridgeConfig {
        BridgeConfig {
            backend_base_url: self.backend.base_url.trim_end_matches('/').to_string(),
            backend_timeout: Duration::from_secs(self.backend.timeout),
            session_secret: self.session.secret.clone(),
        }
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.session.secret == DEV_SESSION_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                workers: None,
            },
            backend: BackendConfig {
                base_url: "http://localhost:5163/".to_string(),
                timeout: 10,
            },
            session: SessionConfig {
                secret: "s3cret".to_string(),
                cookie_name: "quiz_session".to_string(),
                idle_timeout: 3600,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: true,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
                max_connections: None,
            },
            http: HttpConfig {
                server_name: "quiz-frontend".to_string(),
                max_body_size: 1024,
            },
        }
    }

    #[test]
    fn test_bridge_trims_trailing_slash() {
        let bridge = sample().bridge();
        assert_eq!(bridge.backend_base_url, "http://localhost:5163");
        assert_eq!(bridge.backend_timeout, Duration::from_secs(10));
        assert_eq!(bridge.session_secret, "s3cret");
    }

    #[test]
    fn test_validate_rejects_https_backend() {
        let mut cfg = sample();
        cfg.backend.base_url = "https://quiz.example.com".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_host() {
        let mut cfg = sample();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let mut cfg = sample();
        cfg.session.secret = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample().validate().is_ok());
        assert!(!sample().uses_dev_secret());
    }
}
