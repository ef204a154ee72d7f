//! Process-wide configuration.
//!
//! Loaded once (optionally from an `automap.toml`) and read-only afterwards.
//! Both the aggregation mode and the color mode are strategy selections: a
//! session runs with one of each, never a mix.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::core::errors::{Error, Result};
use crate::core::types::ScoreScale;

/// How a function-level automation score is derived from its subfunctions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationMode {
    /// Cost-weighted mean: sum(score * cost) / sum(cost). Zero total weight
    /// yields 0.0.
    #[default]
    Weighted,
    /// Plain mean of subfunction scores. An empty list yields the scale
    /// minimum.
    Simple,
}

/// How calibrated scores map to colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    /// Three fixed colors keyed off the scale, ignoring calibration.
    FixedTier,
    /// Three fixed colors keyed off the calibrated p80/p40 thresholds.
    #[default]
    PercentileTier,
    /// Multi-stop gradient interpolated over the calibrated [min, max].
    ContinuousGradient,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AutomapConfig {
    #[serde(default)]
    pub aggregation_mode: AggregationMode,

    #[serde(default)]
    pub color_mode: ColorMode,

    /// Canonical score scale for datasets that do not declare one.
    #[serde(default)]
    pub scale: ScoreScale,

    /// Decimal places applied to displayed scores/costs. Internal
    /// aggregation always runs on unrounded values.
    #[serde(default = "default_display_decimals")]
    pub display_decimals: u32,

    /// Length of ranked top/bottom lists in summaries.
    #[serde(default = "default_ranked_list_len")]
    pub ranked_list_len: usize,

    /// High-tier threshold used before any calibration has happened.
    #[serde(default = "default_uncalibrated_p80")]
    pub uncalibrated_p80: f64,

    /// Medium-tier threshold used before any calibration has happened.
    #[serde(default = "default_uncalibrated_p40")]
    pub uncalibrated_p40: f64,
}

fn default_display_decimals() -> u32 {
    2
}

fn default_ranked_list_len() -> usize {
    3
}

fn default_uncalibrated_p80() -> f64 {
    4.0
}

fn default_uncalibrated_p40() -> f64 {
    3.0
}

impl Default for AutomapConfig {
    fn default() -> Self {
        Self {
            aggregation_mode: AggregationMode::default(),
            color_mode: ColorMode::default(),
            scale: ScoreScale::default(),
            display_decimals: default_display_decimals(),
            ranked_list_len: default_ranked_list_len(),
            uncalibrated_p80: default_uncalibrated_p80(),
            uncalibrated_p40: default_uncalibrated_p40(),
        }
    }
}

impl AutomapConfig {
    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.scale.min >= self.scale.max {
            return Err(Error::Configuration(format!(
                "score scale min ({}) must be below max ({})",
                self.scale.min, self.scale.max
            )));
        }
        if self.uncalibrated_p40 >= self.uncalibrated_p80 {
            return Err(Error::Configuration(format!(
                "uncalibrated p40 ({}) must be below p80 ({})",
                self.uncalibrated_p40, self.uncalibrated_p80
            )));
        }
        if self.ranked_list_len == 0 {
            return Err(Error::Configuration(
                "ranked_list_len must be at least 1".to_string(),
            ));
        }
        if self.display_decimals > 6 {
            return Err(Error::Configuration(format!(
                "display_decimals ({}) is unreasonably large",
                self.display_decimals
            )));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AutomapConfig = toml::from_str(&content)
            .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `automap.toml` from the given directory if present, else defaults.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join("automap.toml");
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}

static CONFIG: OnceLock<AutomapConfig> = OnceLock::new();

/// Install the process-wide configuration. First caller wins; later calls
/// return the already-installed value.
pub fn init_config(config: AutomapConfig) -> &'static AutomapConfig {
    CONFIG.get_or_init(|| config)
}

/// The process-wide configuration, defaulting if none was installed.
pub fn get_config() -> &'static AutomapConfig {
    CONFIG.get_or_init(AutomapConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AutomapConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_scale() {
        let config = AutomapConfig {
            scale: ScoreScale::new(5.0, 1.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let config = AutomapConfig {
            uncalibrated_p80: 2.0,
            uncalibrated_p40: 3.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_kebab_case_modes() {
        let config: AutomapConfig = toml::from_str(
            r#"
            aggregation_mode = "simple"
            color_mode = "continuous-gradient"
            "#,
        )
        .unwrap();
        assert_eq!(config.aggregation_mode, AggregationMode::Simple);
        assert_eq!(config.color_mode, ColorMode::ContinuousGradient);
    }
}
