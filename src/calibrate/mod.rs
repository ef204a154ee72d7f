//! Score calibration: percentile thresholds computed per dataset, and the
//! mapping from raw scores to tiers, labels and colors.
//!
//! Calibration is relative, not absolute: "High" means the top stratum of
//! the batch the calibrator was last fed for the active key. There is no
//! process-global calibration state; a [`Calibrator`] is an owned value a
//! request threads through its calls. Hosts that genuinely share one across
//! threads wrap it in [`SharedCalibrator`].

pub mod palette;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::{get_config, AutomapConfig, ColorMode};
use crate::core::errors::{Error, Result};
use crate::core::types::ScoreScale;

pub use palette::{gradient_color, gradient_legend, tier_color, LegendStop, ROOT_COLOR};

/// Nudge applied to the calibrated max when a batch has no spread, so
/// gradient interpolation never divides by zero.
const EQUAL_BOUNDS_NUDGE: f64 = 1e-6;

/// Qualitative automation-potential bucket. Ordered Low < Medium < High.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::High => "High",
            Tier::Medium => "Medium",
            Tier::Low => "Low",
        }
    }
}

/// Thresholds computed from one batch of scores.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub p80: f64,
    pub p40: f64,
    pub min: f64,
    pub max: f64,
    pub scale: ScoreScale,
}

impl Calibration {
    /// Compute thresholds from a batch. Returns `None` for an empty batch
    /// (callers keep whatever calibration they had).
    pub fn from_scores(scores: &[f64], scale: ScoreScale) -> Option<Self> {
        let mut sorted: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let min = sorted[0];
        let mut max = sorted[sorted.len() - 1];
        if max <= min {
            max = min + EQUAL_BOUNDS_NUDGE;
        }
        Some(Self {
            p80: percentile(&sorted, 80.0),
            p40: percentile(&sorted, 40.0),
            min,
            max,
            scale,
        })
    }

    /// The documented fallback used before any calibration has happened for
    /// a key: fixed thresholds over the configured scale.
    pub fn uncalibrated(config: &AutomapConfig) -> Self {
        Self {
            p80: config.uncalibrated_p80,
            p40: config.uncalibrated_p40,
            min: config.scale.min,
            max: config.scale.max,
            scale: config.scale,
        }
    }

    /// Tier for a score under these thresholds. A missing score is Low,
    /// deterministically, never an error.
    pub fn tier(&self, score: Option<f64>) -> Tier {
        match score {
            Some(s) if s >= self.p80 => Tier::High,
            Some(s) if s >= self.p40 => Tier::Medium,
            _ => Tier::Low,
        }
    }

    /// Normalized position of a score within the calibrated range.
    fn gradient_position(&self, score: f64) -> f64 {
        (score - self.min) / (self.max - self.min)
    }
}

/// Standard percentile with linear interpolation between ranks.
/// `sorted` must be non-empty and ascending.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Keyed calibration context.
///
/// Holds one [`Calibration`] per key (typically an industry slug or a view
/// identifier) plus the active key lookups run against.
#[derive(Clone, Debug)]
pub struct Calibrator {
    color_mode: ColorMode,
    fallback: Calibration,
    calibrations: HashMap<String, Calibration>,
    active: Option<String>,
}

impl Calibrator {
    /// Calibrator using the process-wide configuration.
    pub fn new() -> Self {
        Self::with_config(get_config())
    }

    pub fn with_config(config: &AutomapConfig) -> Self {
        Self {
            color_mode: config.color_mode,
            fallback: Calibration::uncalibrated(config),
            calibrations: HashMap::new(),
            active: None,
        }
    }

    /// Compute and store thresholds for `key` on the configured scale, and
    /// make `key` active. An empty batch is a no-op apart from activation.
    pub fn calibrate(&mut self, scores: &[f64], key: &str) -> Result<()> {
        self.calibrate_scaled(scores, key, self.fallback.scale)
    }

    /// As [`Self::calibrate`], for a dataset that declares its own scale.
    ///
    /// Recalibrating an existing key with the same scale replaces its
    /// thresholds; doing so with a different scale is a programmer error
    /// and fails loudly rather than producing meaningless comparisons.
    pub fn calibrate_scaled(&mut self, scores: &[f64], key: &str, scale: ScoreScale) -> Result<()> {
        if let Some(existing) = self.calibrations.get(key) {
            if existing.scale != scale {
                return Err(Error::Validation(format!(
                    "calibration key '{}' already holds scale {:?}, refusing {:?}",
                    key, existing.scale, scale
                )));
            }
        }
        if let Some(calibration) = Calibration::from_scores(scores, scale) {
            self.calibrations.insert(key.to_string(), calibration);
        } else {
            log::debug!("empty calibration batch for key '{key}', thresholds unchanged");
        }
        self.active = Some(key.to_string());
        Ok(())
    }

    /// Switch which stored calibration lookups use, without recomputing.
    pub fn set_active(&mut self, key: &str) {
        self.active = Some(key.to_string());
    }

    /// The calibration lookups currently resolve against: the active key's
    /// stored thresholds, or the documented uncalibrated fallback.
    pub fn active(&self) -> Calibration {
        self.active
            .as_deref()
            .and_then(|key| self.calibrations.get(key))
            .copied()
            .unwrap_or(self.fallback)
    }

    pub fn tier_for(&self, score: Option<f64>) -> Tier {
        self.active().tier(score)
    }

    /// Human-readable potential label for a score.
    pub fn label_for(&self, score: Option<f64>) -> &'static str {
        self.tier_for(score).label()
    }

    /// Display color for a score under the configured color mode.
    pub fn color_for(&self, score: Option<f64>) -> String {
        let calibration = self.active();
        match self.color_mode {
            ColorMode::FixedTier => tier_color(self.fallback.tier(score)).to_string(),
            ColorMode::PercentileTier => tier_color(calibration.tier(score)).to_string(),
            ColorMode::ContinuousGradient => match score {
                Some(s) => gradient_color(calibration.gradient_position(s)),
                None => gradient_color(0.0),
            },
        }
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper for hosts that share one calibrator across
/// concurrent sessions. Writes (calibration, activation) take the write
/// lock; color/label lookups take the read lock.
#[derive(Debug, Default)]
pub struct SharedCalibrator {
    inner: RwLock<Calibrator>,
}

impl SharedCalibrator {
    pub fn new(calibrator: Calibrator) -> Self {
        Self {
            inner: RwLock::new(calibrator),
        }
    }

    pub fn calibrate(&self, scores: &[f64], key: &str) -> Result<()> {
        self.inner.write().calibrate(scores, key)
    }

    pub fn set_active(&self, key: &str) {
        self.inner.write().set_active(key);
    }

    pub fn color_for(&self, score: Option<f64>) -> String {
        self.inner.read().color_for(score)
    }

    pub fn label_for(&self, score: Option<f64>) -> &'static str {
        self.inner.read().label_for(score)
    }

    /// Run a closure against a snapshot of the calibrator, so a sequence of
    /// lookups sees one consistent calibration.
    pub fn with_snapshot<T>(&self, f: impl FnOnce(&Calibrator) -> T) -> T {
        f(&self.inner.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AutomapConfig;
    use pretty_assertions::assert_eq;

    fn calibrator() -> Calibrator {
        Calibrator::with_config(&AutomapConfig::default())
    }

    #[test]
    fn percentile_linear_interpolation_reference() {
        let scores: Vec<f64> = (1..=10).map(f64::from).collect();
        assert!((percentile(&scores, 80.0) - 8.2).abs() < 1e-9);
        assert!((percentile(&scores, 40.0) - 4.6).abs() < 1e-9);
    }

    #[test]
    fn reference_batch_tiers() {
        let mut cal = calibrator();
        let scores: Vec<f64> = (1..=10).map(f64::from).collect();
        cal.calibrate(&scores, "ref").unwrap();
        assert_eq!(cal.tier_for(Some(9.0)), Tier::High);
        assert_eq!(cal.tier_for(Some(5.0)), Tier::Medium);
        assert_eq!(cal.tier_for(Some(4.0)), Tier::Low);
    }

    #[test]
    fn calibration_is_idempotent() {
        let scores = [2.0, 3.5, 4.0, 1.5, 5.0];
        let first = Calibration::from_scores(&scores, ScoreScale::ONE_TO_FIVE).unwrap();
        let second = Calibration::from_scores(&scores, ScoreScale::ONE_TO_FIVE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_batch_keeps_prior_thresholds() {
        let mut cal = calibrator();
        cal.calibrate(&[1.0, 2.0, 3.0, 4.0, 5.0], "bfsi").unwrap();
        let before = cal.active();
        cal.calibrate(&[], "bfsi").unwrap();
        assert_eq!(cal.active(), before);
    }

    #[test]
    fn uncalibrated_key_uses_documented_defaults() {
        let cal = calibrator();
        // Defaults: p80 = 4.0, p40 = 3.0 on the 1-5 scale.
        assert_eq!(cal.tier_for(Some(4.5)), Tier::High);
        assert_eq!(cal.tier_for(Some(3.0)), Tier::Medium);
        assert_eq!(cal.tier_for(Some(2.9)), Tier::Low);
    }

    #[test]
    fn missing_score_is_low_and_colored() {
        let cal = calibrator();
        assert_eq!(cal.tier_for(None), Tier::Low);
        assert_eq!(cal.label_for(None), "Low");
        assert_eq!(cal.color_for(None), tier_color(Tier::Low));
    }

    #[test]
    fn set_active_switches_without_recompute() {
        let mut cal = calibrator();
        cal.calibrate(&[1.0, 1.0, 1.0, 5.0, 5.0], "a").unwrap();
        cal.calibrate(&[1.0, 5.0, 5.0, 5.0, 5.0], "b").unwrap();
        let b = cal.active();
        cal.set_active("a");
        assert_ne!(cal.active(), b);
        cal.set_active("b");
        assert_eq!(cal.active(), b);
    }

    #[test]
    fn equal_scores_nudge_max_bound() {
        let calibration = Calibration::from_scores(&[3.0, 3.0, 3.0], ScoreScale::ONE_TO_FIVE)
            .unwrap();
        assert!(calibration.max > calibration.min);
        // Gradient interpolation stays finite.
        let position = calibration.gradient_position(3.0);
        assert!(position.is_finite());
    }

    #[test]
    fn scale_collision_fails_loudly() {
        let mut cal = calibrator();
        cal.calibrate_scaled(&[1.0, 3.0, 5.0], "bfsi", ScoreScale::ONE_TO_FIVE)
            .unwrap();
        let err = cal
            .calibrate_scaled(&[2.0, 10.0, 18.0], "bfsi", ScoreScale::new(0.0, 20.0))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn tiers_are_monotonic_in_score() {
        let mut cal = calibrator();
        cal.calibrate(&[1.0, 2.0, 3.0, 4.0, 5.0], "m").unwrap();
        let tiers: Vec<Tier> = [1.0, 2.0, 3.0, 4.0, 5.0]
            .iter()
            .map(|&s| cal.tier_for(Some(s)))
            .collect();
        assert!(tiers.windows(2).all(|w| w[0] <= w[1]));
    }
}
