// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Simulator configuration

use crate::error::SimError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up by [`SimulatorConfig::load`]
pub const CONFIG_FILE: &str = "routersim.toml";

/// How feed rate is integrated over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickTiming {
    /// Every tick advances `1 / tick_rate` seconds regardless of wall time
    #[default]
    Fixed,
    /// Ticks advance by the measured time passed to `Simulator::advance`
    Elapsed,
}

/// Simulator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Stock extent along X
    pub sheet_width: f64,
    /// Stock extent along Y
    pub sheet_height: f64,
    /// Stock extent along Z
    pub sheet_thickness: f64,
    /// XY offset of the stock from the machine origin
    pub sheet_margin: f64,
    pub tool_diameter: f64,
    /// Visible tool length, for the render surface only
    pub tool_length: f64,
    /// Top of every sweep; must clear the stock
    pub plunge_height: f64,
    /// Initial feed rate in length units per second
    pub feed_rate: f64,
    /// Assumed tick frequency in Hz
    pub tick_rate: f64,
    pub timing: TickTiming,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            sheet_width: 2440.0,
            sheet_height: 1220.0,
            sheet_thickness: 24.0,
            sheet_margin: 20.0,
            tool_diameter: 6.35,
            tool_length: 80.0,
            plunge_height: 100.0,
            feed_rate: 100.0,
            tick_rate: 60.0,
            timing: TickTiming::Fixed,
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: SimulatorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };

        if let Some(feed_rate) = env_f64("ROUTERSIM_FEED_RATE")? {
            config.feed_rate = feed_rate;
        }
        if let Some(diameter) = env_f64("ROUTERSIM_TOOL_DIAMETER")? {
            config.tool_diameter = diameter;
        }
        if let Some(tick_rate) = env_f64("ROUTERSIM_TICK_RATE")? {
            config.tick_rate = tick_rate;
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn tool_radius(&self) -> f64 {
        self.tool_diameter / 2.0
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let positive = [
            ("sheet_width", self.sheet_width),
            ("sheet_height", self.sheet_height),
            ("sheet_thickness", self.sheet_thickness),
            ("tool_diameter", self.tool_diameter),
            ("tick_rate", self.tick_rate),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if !self.sheet_margin.is_finite() {
            return Err(SimError::InvalidConfig("sheet_margin must be finite".into()));
        }

        if !(self.plunge_height > self.sheet_thickness) || !self.plunge_height.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "plunge_height {} must exceed sheet_thickness {}",
                self.plunge_height, self.sheet_thickness
            )));
        }

        if !(self.feed_rate > 0.0) || !self.feed_rate.is_finite() {
            return Err(SimError::InvalidFeedRate(self.feed_rate));
        }

        Ok(())
    }
}

fn env_f64(name: &str) -> Result<Option<f64>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("{name} is not a number: {value:?}")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tool_radius(), 3.175);
        assert_eq!(config.timing, TickTiming::Fixed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SimulatorConfig =
            toml::from_str("feed_rate = 50.0\ntiming = \"elapsed\"").unwrap();
        assert_eq!(config.feed_rate, 50.0);
        assert_eq!(config.timing, TickTiming::Elapsed);
        assert_eq!(config.sheet_width, 2440.0);
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let file = NamedTempFile::with_suffix(".toml")?;
        let config = SimulatorConfig {
            tool_diameter: 3.0,
            ..Default::default()
        };
        config.save(file.path())?;

        let loaded = SimulatorConfig::from_file(file.path())?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_plunge_must_clear_stock() {
        let config = SimulatorConfig {
            plunge_height: 10.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_feed_rate_must_be_positive() {
        let config = SimulatorConfig {
            feed_rate: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(SimError::InvalidFeedRate(0.0)));
    }
}
