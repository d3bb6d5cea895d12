use serde::Deserialize;
use std::env;

use wayfare_catalog::PricingConfig;
use wayfare_loyalty::LoyaltyConfig;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub pricing: PricingConfig,
    pub loyalty: LoyaltyConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SeedConfig {
    /// Load the demo flights, hotels and bookings at startup
    pub enabled: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `WAYFARE__SERVER__PORT=9000`
            .add_source(
                config::Environment::with_prefix("WAYFARE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Self::from_settings(s)
    }

    /// Deserialize and validate already-layered settings
    pub fn from_settings(settings: config::Config) -> Result<Self, config::ConfigError> {
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.pricing.validate().map_err(config::ConfigError::Message)?;
        self.loyalty.validate().map_err(config::ConfigError::Message)?;
        Ok(())
    }
}
