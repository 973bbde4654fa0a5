//! Application configuration

use std::env;
use std::net::SocketAddr;

use planning_poker_shared::room_code::DEFAULT_MAX_ATTEMPTS;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_host: String,
    pub port: u16,

    // Sessions
    pub room_code_max_attempts: usize,

    // Logging
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_host: env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: match env::var("PORT") {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("PORT", raw))?,
                Err(_) => 3001,
            },

            // Sessions
            room_code_max_attempts: match env::var("ROOM_CODE_MAX_ATTEMPTS") {
                Ok(raw) => match raw.trim().parse::<usize>() {
                    Ok(n) if n >= 1 => n,
                    _ => return Err(ConfigError::Invalid("ROOM_CODE_MAX_ATTEMPTS", raw)),
                },
                Err(_) => DEFAULT_MAX_ATTEMPTS,
            },

            // Logging
            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Socket address the HTTP server listens on
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse()
            .map_err(|_| ConfigError::Invalid("BIND_HOST", self.bind_host.clone()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3001,
            room_code_max_attempts: DEFAULT_MAX_ATTEMPTS,
            log_json: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
