//! Sync configuration.
//!
//! All tunable parameters for the engine: which store paths to watch and
//! the alert/colour thresholds.  Loaded from a JSON file; any field left
//! out takes its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::reading::Quantity;

/// Store paths for each watched quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreKeys {
    pub temperature: String,
    pub humidity: String,
    pub light: String,
    pub rain: String,
}

impl StoreKeys {
    pub fn key(&self, quantity: Quantity) -> &str {
        match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::Humidity => &self.humidity,
            Quantity::Light => &self.light,
            Quantity::Rain => &self.rain,
        }
    }
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            temperature: "sensor/temperature".to_owned(),
            humidity: "sensor/humidity".to_owned(),
            light: "light".to_owned(),
            rain: "RainSensor/isRaining".to_owned(),
        }
    }
}

/// Core sync configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub keys: StoreKeys,

    // --- Alerts ---
    /// Temperature (Celsius) strictly above which the high-temperature alert fires.
    pub temperature_alert_c: f64,
    /// Title used for every alert.
    pub alert_title: String,

    // --- Display ---
    /// Top of the green → yellow → red temperature gradient (Celsius).
    pub temperature_scale_max_c: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            keys: StoreKeys::default(),
            temperature_alert_c: 30.0,
            alert_title: "Warning!".to_owned(),
            temperature_scale_max_c: 30.0,
        }
    }
}

impl SyncConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: SyncConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `path`.  A missing file is [`ConfigError::NotFound`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::Io(e.to_string()),
        })?;
        Self::from_json(&text)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for q in Quantity::ALL {
            if self.keys.key(q).trim().is_empty() {
                return Err(ConfigError::ValidationFailed("store key must not be empty"));
            }
        }
        for (i, a) in Quantity::ALL.iter().enumerate() {
            for b in &Quantity::ALL[i + 1..] {
                if self.keys.key(*a) == self.keys.key(*b) {
                    return Err(ConfigError::ValidationFailed("store keys must be distinct"));
                }
            }
        }
        if !self.temperature_alert_c.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "temperature_alert_c must be finite",
            ));
        }
        if !(self.temperature_scale_max_c.is_finite() && self.temperature_scale_max_c > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "temperature_scale_max_c must be finite and > 0",
            ));
        }
        if self.alert_title.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("alert_title must not be empty"));
        }
        Ok(())
    }
}
