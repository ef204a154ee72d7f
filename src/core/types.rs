//! Core data model: the Industry -> Function -> Subfunction tree and the
//! task-level (L3) records that hang off it by name.
//!
//! Leaf values are authoritative. Parent-level metrics (function unit cost,
//! function score, industry averages) are always derived by the aggregation
//! engine and never stored here.

use serde::{Deserialize, Serialize};

/// The numeric scale automation scores are expressed on.
///
/// The scale travels with every loaded dataset; nothing downstream assumes
/// a particular range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreScale {
    pub min: f64,
    pub max: f64,
}

impl ScoreScale {
    pub const ONE_TO_FIVE: ScoreScale = ScoreScale { min: 1.0, max: 5.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.min && score <= self.max
    }

    pub fn clamp(&self, score: f64) -> f64 {
        score.clamp(self.min, self.max)
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl Default for ScoreScale {
    fn default() -> Self {
        Self::ONE_TO_FIVE
    }
}

/// A named sub-criterion score attached to a subfunction.
///
/// Some dataset variants supply only the composite `automation_score`; for
/// those this list is empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub name: String,
    pub score: f64,
}

/// Leaf of the tree: an L2 subfunction within an L1 function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subfunction {
    /// Stable identifier, slug derived from the name.
    pub id: String,
    pub name: String,
    /// Cost expressed as a percentage of industry revenue. Always >= 0.
    pub cost_pct_revenue: f64,
    /// Absolute cost in currency millions, computed when revenue is known.
    #[serde(default)]
    pub absolute_cost_m: Option<f64>,
    /// Composite automation potential score, within the industry's scale.
    pub automation_score: f64,
    #[serde(default)]
    pub role_description: String,
    #[serde(default)]
    pub criteria: Vec<CriterionScore>,
}

/// An L1 function grouping an ordered list of subfunctions.
///
/// Unit cost and automation score are derived quantities; see
/// [`crate::aggregate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: String,
    pub name: String,
    pub subfunctions: Vec<Subfunction>,
}

/// Root of the tree: one industry dataset.
///
/// Function costs are independent percentages of revenue and need not sum
/// to 100%.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Industry {
    /// Cache/lookup key, slug of the name.
    pub slug: String,
    pub name: String,
    /// Total revenue in currency millions, when the dataset supplies it.
    #[serde(default)]
    pub revenue_m: Option<f64>,
    #[serde(default)]
    pub scale: ScoreScale,
    pub functions: Vec<Function>,
}

impl Industry {
    pub fn function(&self, function_id: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.id == function_id)
    }

    /// All subfunction scores in input order, across every function.
    pub fn all_scores(&self) -> Vec<f64> {
        self.functions
            .iter()
            .flat_map(|f| f.subfunctions.iter().map(|sf| sf.automation_score))
            .collect()
    }
}

impl Function {
    pub fn subfunction(&self, subfunction_id: &str) -> Option<&Subfunction> {
        self.subfunctions.iter().find(|sf| sf.id == subfunction_id)
    }

    pub fn scores(&self) -> Vec<f64> {
        self.subfunctions
            .iter()
            .map(|sf| sf.automation_score)
            .collect()
    }
}

/// One scored dimension of a task-level record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskDimension {
    pub name: String,
    pub score: f64,
    pub label: String,
    pub reason: String,
}

/// A task-level (L3) record, grouped under (industry, l1, l2) by name.
///
/// Tasks are not nested inside the tree; they are derived fresh from the
/// task dataset per query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub description: String,
    pub ai_score: f64,
    pub dimensions: Vec<TaskDimension>,
}

impl Task {
    /// Dimensions sorted by score descending, stable for equal scores.
    pub fn dimensions_by_score(&self) -> Vec<&TaskDimension> {
        let mut dims: Vec<&TaskDimension> = self.dimensions.iter().collect();
        dims.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        dims
    }
}

/// Derive a stable identifier from a display name.
///
/// Lowercases, maps runs of non-alphanumeric characters to single
/// underscores, and trims leading/trailing separators.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_sep = true;
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_sep = false;
        } else if !last_sep {
            slug.push('_');
            last_sep = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}
