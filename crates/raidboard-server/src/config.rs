//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Directory the default record files live in.
    /// Env: `DATA_DIR`
    /// Default: `./data`
    pub data_dir: PathBuf,

    /// Path of the accounts record file.
    /// Env: `ACCOUNTS_FILE`
    /// Default: `<data_dir>/users.csv`
    pub accounts_file: PathBuf,

    /// Path of the events record file.
    /// Env: `EVENTS_FILE`
    /// Default: `<data_dir>/raids.csv`
    pub events_file: PathBuf,

    /// Static background image served to the front-end, if any.
    /// Env: `BACKGROUND_IMAGE`
    /// Default: unset.
    pub background_image: Option<PathBuf>,

    /// Human-readable name for this board instance.
    /// Env: `INSTANCE_NAME`
    /// Default: `"Raid Board"`
    pub instance_name: String,

    /// Login session lifetime in days.
    /// Env: `SESSION_TTL_DAYS`
    /// Default: `7`
    pub session_ttl_days: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("./data");
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            accounts_file: data_dir.join("users.csv"),
            events_file: data_dir.join("raids.csv"),
            data_dir,
            background_image: None,
            instance_name: "Raid Board".to_string(),
            session_ttl_days: 7,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults. `ACCOUNTS_FILE` / `EVENTS_FILE` override `DATA_DIR` for
    /// their respective files.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Ok(dir) = std::env::var("DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
            config.accounts_file = config.data_dir.join("users.csv");
            config.events_file = config.data_dir.join("raids.csv");
        }

        if let Ok(path) = std::env::var("ACCOUNTS_FILE") {
            config.accounts_file = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("EVENTS_FILE") {
            config.events_file = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("BACKGROUND_IMAGE") {
            if !path.is_empty() {
                config.background_image = Some(PathBuf::from(path));
            }
        }

        if let Ok(name) = std::env::var("INSTANCE_NAME") {
            config.instance_name = name;
        }

        if let Ok(val) = std::env::var("SESSION_TTL_DAYS") {
            match val.parse::<i64>() {
                Ok(days) if days > 0 => config.session_ttl_days = days,
                _ => {
                    tracing::warn!(value = %val, "Invalid SESSION_TTL_DAYS, using default");
                }
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.accounts_file, PathBuf::from("./data/users.csv"));
        assert_eq!(config.events_file, PathBuf::from("./data/raids.csv"));
        assert_eq!(config.session_ttl_days, 7);
        assert!(config.background_image.is_none());
    }
}
