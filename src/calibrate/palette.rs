//! Color assignment for calibrated scores.
//!
//! Two families: a fixed three-color palette keyed off tiers, and a
//! multi-stop gradient interpolated over the calibrated score range.

use serde::Serialize;

use super::Tier;

/// Tier palette (dark green / green / amber), shared by the fixed-tier and
/// percentile-tier modes.
pub const TIER_HIGH_COLOR: &str = "#1A7A4A";
pub const TIER_MEDIUM_COLOR: &str = "#52B788";
pub const TIER_LOW_COLOR: &str = "#F4C542";

/// Color of the synthetic root node in treemap layouts.
pub const ROOT_COLOR: &str = "#132038";

/// Gradient stops as (position in [0, 1], r, g, b). Low scores sit at the
/// red end, high scores at the green end.
const GRADIENT: [(f64, u8, u8, u8); 6] = [
    (0.00, 180, 30, 20),
    (0.15, 192, 57, 43),
    (0.30, 230, 126, 34),
    (0.55, 241, 196, 15),
    (0.70, 88, 196, 98),
    (1.00, 39, 174, 96),
];

pub fn tier_color(tier: Tier) -> &'static str {
    match tier {
        Tier::High => TIER_HIGH_COLOR,
        Tier::Medium => TIER_MEDIUM_COLOR,
        Tier::Low => TIER_LOW_COLOR,
    }
}

/// Interpolate the gradient at a normalized position.
///
/// Positions outside [0, 1] are clamped, so callers may divide by any
/// nonzero span without pre-clamping the score.
pub fn gradient_color(t: f64) -> String {
    let t = t.clamp(0.0, 1.0);
    for window in GRADIENT.windows(2) {
        let (t0, r0, g0, b0) = window[0];
        let (t1, r1, g1, b1) = window[1];
        if t >= t0 && t <= t1 {
            let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            let r = r0 as f64 + f * (r1 as f64 - r0 as f64);
            let g = g0 as f64 + f * (g1 as f64 - g0 as f64);
            let b = b0 as f64 + f * (b1 as f64 - b0 as f64);
            return format!("#{:02X}{:02X}{:02X}", r as u8, g as u8, b as u8);
        }
    }
    let (_, r, g, b) = GRADIENT[0];
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// One entry of a rendered gradient legend.
#[derive(Clone, Debug, Serialize)]
pub struct LegendStop {
    pub color: String,
    pub label: &'static str,
    pub position: f64,
}

/// Legend stops for UI rendering of the gradient mode.
pub fn gradient_legend() -> Vec<LegendStop> {
    [
        (0.0, "Low"),
        (0.25, ""),
        (0.5, "Medium"),
        (0.75, ""),
        (1.0, "High"),
    ]
    .iter()
    .map(|&(position, label)| LegendStop {
        color: gradient_color(position),
        label,
        position,
    })
    .collect()
}
