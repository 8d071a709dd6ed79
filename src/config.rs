//! Server configuration module
//! Handles dynamic configuration parameters for the dashboard backend

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_STATS_INTERVAL_SECS};
use crate::error::{FleetWatchError, Result};
use std::env;
use std::time::Duration;

/// Server configuration parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Cadence of the periodic stats broadcast
    pub stats_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            stats_interval: Duration::from_secs(DEFAULT_STATS_INTERVAL_SECS),
        }
    }
}

impl ServerConfig {
    /// Create a test configuration bound to loopback
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            stats_interval: Duration::from_millis(50),
        }
    }

    /// Load configuration from environment variables if available
    pub fn from_env() -> Result<Self> {
        let host = env::var("FLEETWATCH_HOST").unwrap_or(DEFAULT_HOST.to_string());

        let port = match env::var("FLEETWATCH_PORT") {
            Ok(raw) => raw.parse().map_err(|_| {
                FleetWatchError::ConfigError(format!("Invalid FLEETWATCH_PORT value: {}", raw))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let stats_interval_secs = match env::var("FLEETWATCH_STATS_INTERVAL") {
            Ok(raw) => raw.parse().map_err(|_| {
                FleetWatchError::ConfigError(format!(
                    "Invalid FLEETWATCH_STATS_INTERVAL value: {}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_STATS_INTERVAL_SECS,
        };

        if stats_interval_secs == 0 {
            return Err(FleetWatchError::ConfigError(
                "FLEETWATCH_STATS_INTERVAL must be at least 1 second".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            stats_interval: Duration::from_secs(stats_interval_secs),
        })
    }
}
