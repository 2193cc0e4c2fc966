//! Server configuration.
//!
//! Values come from the environment (a `.env` file is honoured), falling
//! back to the defaults below. CLI flags override both.
//!
//! | Variable      | Default     |
//! |---------------|-------------|
//! | `VOICES_HOST` | `0.0.0.0`   |
//! | `VOICES_PORT` | `5001`      |
//! | `DB_PATH`     | `voices.db` |

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::store::DEFAULT_DB_PATH;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5001;

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

impl ServerConfig {
    /// Load from environment variables, ignoring unparsable values.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        Self {
            host: env::var("VOICES_HOST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.host),
            port: env::var("VOICES_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            db_path: env::var("DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
        }
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    /// Socket address to bind.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5001);
        assert_eq!(config.db_path, PathBuf::from("voices.db"));
        assert_eq!(config.addr().to_string(), "0.0.0.0:5001");
    }

    #[test]
    fn test_builder_overrides() {
        let config = ServerConfig::default()
            .with_host(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .with_port(8080)
            .with_db_path("/tmp/survey.db");

        assert_eq!(config.addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.db_path, PathBuf::from("/tmp/survey.db"));
    }
}
