//! Data boundary: typed repositories over the tabular source files.
//!
//! All schema validation happens here. Raw rows never cross into the core;
//! by the time an [`crate::core::types::Industry`] or
//! [`crate::core::types::Task`] exists, every score is numeric and within
//! its scale and every cost is non-negative.

pub mod repository;
pub mod tasks;

pub use repository::IndustryRepository;
pub use tasks::TaskRepository;

use serde_json::Value;

use crate::core::types::ScoreScale;

/// Coerce a raw score cell to a number on the given scale.
///
/// Missing or non-numeric cells become the scale minimum, and out-of-range
/// values are clamped; both are logged and never silently dropped, since
/// dropping rows would corrupt weighted averages downstream.
pub(crate) fn coerce_score(raw: Option<&Value>, scale: ScoreScale, context: &str) -> f64 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(score) if scale.contains(score) => score,
        Some(score) => {
            log::warn!(
                "{context}: score {score} outside scale [{}, {}], clamping",
                scale.min,
                scale.max
            );
            scale.clamp(score)
        }
        None => {
            log::warn!(
                "{context}: malformed or missing score {raw:?}, coercing to scale minimum {}",
                scale.min
            );
            scale.min
        }
    }
}

/// Case- and whitespace-insensitive key normalization for name-matched
/// grouping (the task dataset joins on names, not foreign keys).
pub(crate) fn normalize_key(part: &str) -> String {
    part.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_scores_pass_through() {
        let v = json!(3.5);
        assert_eq!(coerce_score(Some(&v), ScoreScale::ONE_TO_FIVE, "t"), 3.5);
    }

    #[test]
    fn string_scores_are_parsed() {
        let v = json!(" 4.0 ");
        assert_eq!(coerce_score(Some(&v), ScoreScale::ONE_TO_FIVE, "t"), 4.0);
    }

    #[test]
    fn malformed_scores_become_scale_minimum() {
        let v = json!("n/a");
        assert_eq!(coerce_score(Some(&v), ScoreScale::ONE_TO_FIVE, "t"), 1.0);
        assert_eq!(coerce_score(None, ScoreScale::ONE_TO_FIVE, "t"), 1.0);
        let null = Value::Null;
        assert_eq!(coerce_score(Some(&null), ScoreScale::ONE_TO_FIVE, "t"), 1.0);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let v = json!(12.0);
        assert_eq!(coerce_score(Some(&v), ScoreScale::ONE_TO_FIVE, "t"), 5.0);
    }

    #[test]
    fn keys_normalize_case_and_whitespace() {
        assert_eq!(normalize_key("  Claims Processing "), "claims processing");
    }
}
