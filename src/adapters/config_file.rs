//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document.  Missing keys
//! take their defaults, so a file only needs the values it overrides.
//! Saves go through a sibling temp file and a rename so a crash never
//! leaves a half-written config behind.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::ThermostatConfig;

pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for FileConfigStore {
    fn load(&self) -> Result<ThermostatConfig, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        let cfg: ThermostatConfig =
            serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate().map_err(ConfigError::ValidationFailed)?;
        info!("Config: loaded {}", self.path.display());
        Ok(cfg)
    }

    fn save(&self, config: &ThermostatConfig) -> Result<(), ConfigError> {
        config.validate().map_err(ConfigError::ValidationFailed)?;
        let json = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|_| ConfigError::IoError)?;
        fs::rename(&tmp, &self.path).map_err(|_| ConfigError::IoError)?;
        info!("Config: saved {}", self.path.display());
        Ok(())
    }
}
