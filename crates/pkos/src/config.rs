//! Configuration management for PK_OS.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use pkos_common::constants::{CONTRACTS_PAGE_SIZE, DEFAULT_STORE_URL, GENERATED_MISSION_COUNT};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Durable store: `memory://`, `file://<path>` or `redis://...`
    #[serde(default = "default_store_url")]
    pub store_url: String,

    /// Procedural missions generated at boot
    #[serde(default = "default_mission_count")]
    pub mission_count: usize,

    /// Rows per `contracts` page
    #[serde(default = "default_page_size")]
    pub contracts_page_size: usize,

    /// Fixed RNG seed for reproducible sessions
    #[serde(default)]
    pub seed: Option<u64>,

    /// How often the console advances the virtual clock
    #[serde(default = "default_clock_resolution")]
    pub clock_resolution_ms: u64,
}

// Default value functions
fn default_store_url() -> String { DEFAULT_STORE_URL.to_string() }
fn default_mission_count() -> usize { GENERATED_MISSION_COUNT }
fn default_page_size() -> usize { CONTRACTS_PAGE_SIZE }
fn default_clock_resolution() -> u64 { 100 }

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref store) = args.store {
            config.store_url = store.clone();
        }
        if let Some(missions) = args.missions {
            config.mission_count = missions;
        }
        if args.seed.is_some() {
            config.seed = args.seed;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.contracts_page_size == 0 {
            anyhow::bail!(pkos_common::PkosError::Config(
                "contracts_page_size must be at least 1".into()
            ));
        }
        if self.clock_resolution_ms == 0 {
            anyhow::bail!(pkos_common::PkosError::Config(
                "clock_resolution_ms must be at least 1".into()
            ));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_url: default_store_url(),
            mission_count: default_mission_count(),
            contracts_page_size: default_page_size(),
            seed: None,
            clock_resolution_ms: default_clock_resolution(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.mission_count, 1000);
        assert_eq!(config.contracts_page_size, 10);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "store_url = \"memory://\"\nseed = 42",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: AppConfig = settings.try_deserialize().unwrap();
        assert_eq!(config.store_url, "memory://");
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.mission_count, 1000);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let config = AppConfig {
            contracts_page_size: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
