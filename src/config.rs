//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use chrono::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Seconds added after the latest possible finish time before an exam cache is discarded
    pub grace_delay_secs: u64,
    /// Whether this instance runs as a production deployment
    pub is_production: bool,
    /// Whether this node is allowed to run scheduled tasks
    pub is_scheduling_node: bool,
    /// Optional JSON file used to seed the in-memory exam repository
    pub exam_seed_path: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `GRACE_DELAY_SECS` - Grace delay in seconds (default: 1800)
    /// - `DEPLOYMENT_PRODUCTION` - Production deployment flag (default: false)
    /// - `SCHEDULING_ENABLED` - Scheduling-capable node flag (default: true)
    /// - `EXAM_SEED_PATH` - Exam seed file (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            grace_delay_secs: env::var("GRACE_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.grace_delay_secs),
            is_production: env::var("DEPLOYMENT_PRODUCTION")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.is_production),
            is_scheduling_node: env::var("SCHEDULING_ENABLED")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.is_scheduling_node),
            exam_seed_path: env::var("EXAM_SEED_PATH").ok().filter(|v| !v.is_empty()),
        }
    }

    /// Grace delay as a chrono duration.
    pub fn grace_delay(&self) -> Duration {
        let secs = i64::try_from(self.grace_delay_secs).unwrap_or(i64::MAX);
        Duration::seconds(secs.min(i64::MAX / 1000))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            grace_delay_secs: 1800,
            is_production: false,
            is_scheduling_node: true,
            exam_seed_path: None,
        }
    }
}

/// Accepts the usual spellings of a boolean environment flag.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.grace_delay_secs, 1800);
        assert!(!config.is_production);
        assert!(config.is_scheduling_node);
        assert!(config.exam_seed_path.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("GRACE_DELAY_SECS");
        env::remove_var("DEPLOYMENT_PRODUCTION");
        env::remove_var("SCHEDULING_ENABLED");
        env::remove_var("EXAM_SEED_PATH");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.grace_delay_secs, 1800);
        assert!(!config.is_production);
        assert!(config.is_scheduling_node);
    }

    #[test]
    fn test_grace_delay_conversion() {
        let config = Config {
            grace_delay_secs: 90,
            ..Config::default()
        };
        assert_eq!(config.grace_delay(), Duration::seconds(90));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
