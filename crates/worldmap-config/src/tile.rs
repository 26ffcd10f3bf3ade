use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Configuration for the tile service, matching §6.5's recognized knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileConfig {
    pub port: u16,
    #[serde(default)]
    pub proxy_url: Option<String>,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_cache_size() -> usize {
    1000
}

fn default_batch_size() -> usize {
    50
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl TileConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::OutOfRange { field: "port", min: 1, max: 65535 });
        }
        if self.cache_size < 100 {
            return Err(ConfigError::TooSmall { field: "cacheSize", min: 100 });
        }
        if self.batch_size < 1 {
            return Err(ConfigError::TooSmall { field: "batchSize", min: 1 });
        }
        if self.tick_interval_ms < 10 {
            return Err(ConfigError::TooSmall { field: "tickIntervalMs", min: 10 });
        }
        Ok(())
    }
}
