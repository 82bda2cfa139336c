use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::geodesy::Station;
use crate::ingest::{IngestOptions, RecordFilePattern, DEFAULT_SANITY_CEILING_NM};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid station coordinates: {0:?} (expected \"lat,lon\")")]
    InvalidStation(String),
    #[error("no station configured (use --station or station.coordinates)")]
    MissingStation,
    #[error("--display needs a maps API key (--api-key, AIS_BEAM_MAPS_API_KEY or display.api_key)")]
    MissingApiKey,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub station: Option<StationConfig>,
    pub ingest: IngestConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    pub coordinates: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub topic: String,
    pub record_extension: String,
    pub sanity_ceiling_nm: f64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            topic: "ais".to_string(),
            record_extension: "jsonl".to_string(),
            sanity_ceiling_nm: DEFAULT_SANITY_CEILING_NM,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub bind: String,
    pub api_key: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            api_key: None,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // an empty file is a valid, all-default config
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// The station from `coordinates` if given, otherwise from the file.
    pub fn station(&self, coordinates: Option<&str>) -> Result<Station, ConfigError> {
        let name = self.station.as_ref().and_then(|s| s.name.clone());
        let coordinates = coordinates
            .or(self.station.as_ref().map(|s| s.coordinates.as_str()))
            .ok_or(ConfigError::MissingStation)?;

        Station::from_coordinates(coordinates, name)
            .ok_or_else(|| ConfigError::InvalidStation(coordinates.to_string()))
    }

    /// The display credential, preferring `api_key` over the file.
    pub fn api_key(&self, api_key: Option<&str>) -> Result<String, ConfigError> {
        api_key
            .or(self.display.api_key.as_deref())
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn ingest_options(&self, exclude: HashSet<u64>, debug: bool) -> IngestOptions {
        IngestOptions {
            topic: self.ingest.topic.clone(),
            pattern: RecordFilePattern::new(&self.ingest.record_extension),
            sanity_ceiling_nm: self.ingest.sanity_ceiling_nm,
            exclude,
            debug,
        }
    }
}
