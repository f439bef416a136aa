//! Configuration for the distribution service

use distribution_ledger::{Policy, ProviderId};
use serde::{Deserialize, Serialize};

/// Distribution service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Scheduler poll interval (milliseconds)
    pub poll_interval_ms: u64,

    /// Metrics listen address
    pub metrics_listen_addr: String,

    /// Distribution policy
    pub policy: Policy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "distribution-service".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            poll_interval_ms: 60_000,
            metrics_listen_addr: "0.0.0.0:9090".to_string(),
            policy: Policy::default(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(admin) = std::env::var("DISTRIBUTION_ADMIN") {
            config.policy.admin = ProviderId::new(admin);
        }

        if let Ok(interval) = std::env::var("DISTRIBUTION_POLL_INTERVAL_MS") {
            config.poll_interval_ms = interval
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid poll interval: {}", e)))?;
        }

        if let Ok(addr) = std::env::var("DISTRIBUTION_METRICS_ADDR") {
            config.metrics_listen_addr = addr;
        }

        Ok(config)
    }
}
