//! Server configuration from environment variables.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use mdeasy_core::HEARTBEAT_INTERVAL_SECS;

/// Default port, shared with the CLI default URL.
pub const DEFAULT_PORT: u16 = 8765;

/// Default bind address. Any other address requires a refresh key.
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Directory served as the document tree.
    pub doc_root: PathBuf,
    /// Address to bind.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Origin used in rewritten document links.
    pub base_url: String,
    /// Shared secret for the refresh hook; empty disables the check.
    pub refresh_key: String,
    /// Idle interval before a keep-alive event on the change stream.
    pub heartbeat_interval: Duration,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            doc_root: PathBuf::from("."),
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            base_url: format!("http://localhost:{}", DEFAULT_PORT),
            refresh_key: String::new(),
            heartbeat_interval: Duration::from_secs(HEARTBEAT_INTERVAL_SECS),
            log_level: "info".to_string(),
            cors_allowed_origins: "*".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `DOC_ROOT`: Document root (default: ".")
    /// - `HOST`: Bind address (default: 127.0.0.1)
    /// - `PORT`: Server port (default: 8765)
    /// - `BASE_URL`: Origin for rewritten links (default: http://localhost:{PORT})
    /// - `REFRESH_KEY`: Shared secret for POST /refresh (required unless HOST is 127.0.0.1)
    /// - `HEARTBEAT_SECS`: Keep-alive interval of the event stream (default: 30)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let doc_root = env::var("DOC_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.doc_root);

        let host = match non_empty_var("HOST") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "HOST".to_string(),
                reason: format!("not an IP address: {}", value),
            })?,
            None => defaults.host,
        };

        let port = match non_empty_var("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                reason: format!("not a port number: {}", value),
            })?,
            None => defaults.port,
        };

        let base_url = non_empty_var("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let refresh_key = env::var("REFRESH_KEY").unwrap_or_default();

        let heartbeat_interval = match non_empty_var("HEARTBEAT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "HEARTBEAT_SECS".to_string(),
                        reason: format!("expected a positive number of seconds: {}", value),
                    });
                }
            },
            None => defaults.heartbeat_interval,
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        let cors_allowed_origins =
            env::var("CORS_ALLOWED_ORIGINS").unwrap_or(defaults.cors_allowed_origins);

        let config = Self {
            doc_root,
            host,
            port,
            base_url,
            refresh_key,
            heartbeat_interval,
            log_level,
            cors_allowed_origins,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that expose the refresh hook without a key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host != DEFAULT_HOST && self.refresh_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "REFRESH_KEY".to_string(),
                reason: format!(
                    "must be set when binding to {} instead of {}",
                    self.host, DEFAULT_HOST
                ),
            });
        }
        Ok(())
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("doc_root", &self.doc_root)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("refresh_key", &(!self.refresh_key.is_empty()).then_some("<redacted>"))
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("log_level", &self.log_level)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: &[&str] = &[
        "DOC_ROOT",
        "HOST",
        "PORT",
        "BASE_URL",
        "REFRESH_KEY",
        "HEARTBEAT_SECS",
        "LOG_LEVEL",
        "CORS_ALLOWED_ORIGINS",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: env-reading tests run inside the single test below.
            unsafe { env::remove_var(var) };
        }
    }

    fn set(name: &str, value: &str) {
        // SAFETY: env-reading tests run inside the single test below.
        unsafe { env::set_var(name, value) };
    }

    // One test so that no other test observes the environment mid-change.
    #[test]
    fn test_from_env() {
        clear_env();
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.port, 8765);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.base_url, "http://localhost:8765");
        assert_eq!(config.refresh_key, "");
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cors_allowed_origins, "*");

        set("PORT", "9000");
        set("BASE_URL", "https://docs.example.com/");
        set("HEARTBEAT_SECS", "5");
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.base_url, "https://docs.example.com");
        assert_eq!(config.heartbeat_interval, Duration::from_secs(5));

        clear_env();
        set("PORT", "9000");
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.base_url, "http://localhost:9000");

        clear_env();
        set("HOST", "0.0.0.0");
        assert!(matches!(
            ServerConfig::from_env(),
            Err(ConfigError::InvalidValue { ref name, .. }) if name == "REFRESH_KEY"
        ));
        set("REFRESH_KEY", "s3cret");
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8765");

        clear_env();
        set("PORT", "eighty");
        assert!(matches!(
            ServerConfig::from_env(),
            Err(ConfigError::InvalidValue { ref name, .. }) if name == "PORT"
        ));

        clear_env();
        set("HEARTBEAT_SECS", "0");
        assert!(ServerConfig::from_env().is_err());

        clear_env();
        set("HOST", "localhost");
        assert!(ServerConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_validate_default_host_without_key() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_other_host_requires_key() {
        for host in ["127.0.0.2", "::1", "0.0.0.0", "192.168.1.10"] {
            let mut config = ServerConfig {
                host: host.parse().unwrap(),
                ..ServerConfig::default()
            };
            assert!(config.validate().is_err(), "host {}", host);

            config.refresh_key = "s3cret".to_string();
            assert!(config.validate().is_ok(), "host {}", host);
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ServerConfig {
            refresh_key: "s3cret".to_string(),
            ..ServerConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("<redacted>"));
    }
}
