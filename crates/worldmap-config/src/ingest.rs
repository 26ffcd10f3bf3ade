use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Configuration for the ingest service, matching §6.4's recognized knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestConfig {
    pub minecraft: MinecraftConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinecraftConfig {
    pub version: String,
    pub server_host: String,
    pub server_port: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { enabled: false, host: "127.0.0.1".to_owned(), port: 8000 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceConfig {
    pub enable_chunk_caching: bool,
    pub world_save_interval: u32,
    pub max_loaded_chunks: u32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { enable_chunk_caching: true, world_save_interval: 1000, max_loaded_chunks: 1024 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedConfig {
    pub profiles_folder: String,
    pub enable_debug_logging: bool,
    pub auto_reconnect: bool,
    pub reconnect_interval: u32,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            profiles_folder: "profiles".to_owned(),
            enable_debug_logging: false,
            auto_reconnect: true,
            reconnect_interval: 1000,
        }
    }
}

impl IngestConfig {
    /// Checks every range named in §6.4; does not mutate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.minecraft.server_port == 0 {
            return Err(ConfigError::OutOfRange { field: "minecraft.serverPort", min: 1, max: 65535 });
        }
        if self.relay.enabled && self.relay.port == 0 {
            return Err(ConfigError::OutOfRange { field: "relay.port", min: 1, max: 65535 });
        }
        if !(100..=10_000).contains(&self.performance.world_save_interval) {
            return Err(ConfigError::OutOfRange {
                field: "performance.worldSaveInterval",
                min: 100,
                max: 10_000,
            });
        }
        if self.performance.max_loaded_chunks < 100 {
            return Err(ConfigError::TooSmall { field: "performance.maxLoadedChunks", min: 100 });
        }
        if !(1_000..=30_000).contains(&self.advanced.reconnect_interval) {
            return Err(ConfigError::OutOfRange {
                field: "advanced.reconnectInterval",
                min: 1_000,
                max: 30_000,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> IngestConfig {
        IngestConfig {
            minecraft: MinecraftConfig {
                version: "1.20.4".to_owned(),
                server_host: "localhost".to_owned(),
                server_port: 25565,
            },
            relay: RelayConfig::default(),
            performance: PerformanceConfig::default(),
            advanced: AdvancedConfig::default(),
        }
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn rejects_undersized_max_loaded_chunks() {
        let mut cfg = valid();
        cfg.performance.max_loaded_chunks = 10;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parses_from_toml() {
        let toml_str = r#"
            [minecraft]
            version = "1.20.4"
            serverHost = "localhost"
            serverPort = 25565
        "#;
        let cfg: IngestConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.minecraft.server_port, 25565);
        assert!(!cfg.relay.enabled);
        assert!(cfg.validate().is_ok());
    }
}
