//! Typed configuration for the ingest and tile services, loaded from TOML
//! with `#[serde(default)]` filling in the documented defaults, then checked
//! against the named ranges with an explicit [`validate`](IngestConfig::validate)/
//! [`validate`](TileConfig::validate) pass.

mod ingest;
mod tile;

use std::path::Path;

use thiserror::Error;

pub use ingest::{AdvancedConfig, IngestConfig, MinecraftConfig, PerformanceConfig, RelayConfig};
pub use tile::TileConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{field} must be in {min}..={max}")]
    OutOfRange { field: &'static str, min: u32, max: u32 },
    #[error("{field} must be at least {min}")]
    TooSmall { field: &'static str, min: usize },
}

/// Reads and parses a TOML config file but does not validate it.
pub fn load<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
    Ok(toml::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_and_parses_tile_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 7070").unwrap();
        let cfg: TileConfig = load(file.path()).unwrap();
        assert_eq!(cfg.port, 7070);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn load_reports_missing_file() {
        let result: Result<TileConfig, _> = load(Path::new("/nonexistent/worldmap.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
