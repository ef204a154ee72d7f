//! Aggregation engine: derives parent-level metrics from child-level data.
//!
//! Leaf values are authoritative; everything here recomputes from the
//! subfunctions on every call and never stores results back on the tree.
//! Weighting rules differ by level on purpose: function scores are
//! cost-weighted (or simple) means of subfunction scores, while the
//! industry average is a plain mean of function scores, not re-weighted by
//! cost.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::config::{get_config, AggregationMode, AutomapConfig};
use crate::core::types::{Function, Industry, ScoreScale, Subfunction};

/// Ranked-list length for the flat all-subfunction overview.
const OVERVIEW_LIST_LEN: usize = 5;

/// Sum of subfunction costs, as % of revenue. Empty list is 0.
pub fn function_unit_cost(function: &Function) -> f64 {
    function
        .subfunctions
        .iter()
        .map(|sf| sf.cost_pct_revenue)
        .sum()
}

/// Sum of subfunction absolute costs, when the dataset carries revenue.
pub fn function_absolute_cost(function: &Function) -> Option<f64> {
    if function
        .subfunctions
        .iter()
        .all(|sf| sf.absolute_cost_m.is_none())
    {
        return None;
    }
    Some(
        function
            .subfunctions
            .iter()
            .filter_map(|sf| sf.absolute_cost_m)
            .sum(),
    )
}

/// Function-level automation score under the given mode.
///
/// Weighted: `sum(score * cost) / sum(cost)`; zero total weight yields 0.0
/// (never NaN). Simple: plain mean; an empty list yields the scale minimum.
pub fn function_automation_score(
    function: &Function,
    mode: AggregationMode,
    scale: ScoreScale,
) -> f64 {
    let subfunctions = &function.subfunctions;
    match mode {
        AggregationMode::Weighted => {
            let total_weight: f64 = subfunctions.iter().map(|sf| sf.cost_pct_revenue).sum();
            if total_weight == 0.0 {
                return 0.0;
            }
            let weighted: f64 = subfunctions
                .iter()
                .map(|sf| sf.automation_score * sf.cost_pct_revenue)
                .sum();
            weighted / total_weight
        }
        AggregationMode::Simple => {
            if subfunctions.is_empty() {
                return scale.min;
            }
            let total: f64 = subfunctions.iter().map(|sf| sf.automation_score).sum();
            total / subfunctions.len() as f64
        }
    }
}

/// Round a value for display. Aggregation internals never call this;
/// applying it mid-tree would compound rounding error.
pub fn round_display(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// One entry of a ranked top/bottom list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub id: String,
    pub name: String,
    /// L1 function name, for subfunction-level entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub score: f64,
    pub cost_pct_revenue: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_cost_m: Option<f64>,
}

/// Industry-level rollup over function-level scores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndustrySummary {
    pub function_count: usize,
    /// Simple mean of function-level scores (not cost-weighted).
    pub avg_score: f64,
    pub total_cost_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_absolute_cost_m: Option<f64>,
    pub top: Vector<RankedEntry>,
    pub bottom: Vector<RankedEntry>,
}

/// Function-level rollup over its subfunctions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionSummary {
    pub function_id: String,
    pub function_name: String,
    pub subfunction_count: usize,
    pub avg_score: f64,
    pub total_cost_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_absolute_cost_m: Option<f64>,
    pub top: Vector<RankedEntry>,
    pub bottom: Vector<RankedEntry>,
}

/// Flat rollup over every subfunction in the industry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubfunctionOverview {
    pub subfunction_count: usize,
    pub avg_score: f64,
    pub total_cost_pct: f64,
    pub top: Vector<RankedEntry>,
    pub bottom: Vector<RankedEntry>,
}

/// Detail view data for one subfunction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubfunctionDetail {
    pub id: String,
    pub name: String,
    pub function_name: String,
    pub score: f64,
    /// Score as a percentage of the scale maximum, for bar rendering.
    pub score_pct_of_max: f64,
    pub cost_pct_revenue: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_cost_m: Option<f64>,
    pub role_description: String,
}

/// Take the top/bottom `n` of a scored list, ties kept in input order.
fn rank<T: Clone>(entries: &[T], score_of: impl Fn(&T) -> f64, n: usize) -> (Vector<T>, Vector<T>) {
    let mut descending: Vec<T> = entries.to_vec();
    // Stable sort: equal scores never reorder.
    descending.sort_by(|a, b| {
        score_of(b)
            .partial_cmp(&score_of(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut ascending: Vec<T> = entries.to_vec();
    ascending.sort_by(|a, b| {
        score_of(a)
            .partial_cmp(&score_of(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    (
        descending.into_iter().take(n).collect(),
        ascending.into_iter().take(n).collect(),
    )
}

/// Summarize an industry: counts, simple-mean score, totals, ranked lists.
///
/// An industry with no functions summarizes to zero counts and totals with
/// empty lists, never an error. Display fields are rounded here; the
/// intermediates are not.
pub fn industry_summary(industry: &Industry) -> IndustrySummary {
    industry_summary_with(industry, get_config())
}

pub fn industry_summary_with(industry: &Industry, config: &AutomapConfig) -> IndustrySummary {
    let decimals = config.display_decimals;
    let entries: Vec<RankedEntry> = industry
        .functions
        .iter()
        .map(|f| RankedEntry {
            id: f.id.clone(),
            name: f.name.clone(),
            parent: None,
            score: function_automation_score(f, config.aggregation_mode, industry.scale),
            cost_pct_revenue: function_unit_cost(f),
            absolute_cost_m: function_absolute_cost(f),
        })
        .collect();

    let avg_score = if entries.is_empty() {
        0.0
    } else {
        entries.iter().map(|e| e.score).sum::<f64>() / entries.len() as f64
    };
    let total_cost_pct: f64 = entries.iter().map(|e| e.cost_pct_revenue).sum();
    let total_absolute_cost_m = industry
        .revenue_m
        .map(|_| entries.iter().filter_map(|e| e.absolute_cost_m).sum());

    let (top, bottom) = rank(&entries, |e| e.score, config.ranked_list_len);

    IndustrySummary {
        function_count: entries.len(),
        avg_score: round_display(avg_score, decimals),
        total_cost_pct: round_display(total_cost_pct, decimals),
        total_absolute_cost_m: total_absolute_cost_m.map(|c| round_display(c, decimals)),
        top: top.into_iter().map(|e| e.rounded(decimals)).collect(),
        bottom: bottom.into_iter().map(|e| e.rounded(decimals)).collect(),
    }
}

/// Summarize one function over its subfunctions.
pub fn function_summary(industry: &Industry, function: &Function) -> FunctionSummary {
    function_summary_with(industry, function, get_config())
}

pub fn function_summary_with(
    industry: &Industry,
    function: &Function,
    config: &AutomapConfig,
) -> FunctionSummary {
    let decimals = config.display_decimals;
    let entries: Vec<RankedEntry> = function
        .subfunctions
        .iter()
        .map(|sf| subfunction_entry(sf, &function.name))
        .collect();

    let avg_score = if entries.is_empty() {
        industry.scale.min
    } else {
        entries.iter().map(|e| e.score).sum::<f64>() / entries.len() as f64
    };
    let total_cost_pct: f64 = entries.iter().map(|e| e.cost_pct_revenue).sum();
    let total_absolute_cost_m = function_absolute_cost(function);

    let (top, bottom) = rank(&entries, |e| e.score, config.ranked_list_len);

    FunctionSummary {
        function_id: function.id.clone(),
        function_name: function.name.clone(),
        subfunction_count: entries.len(),
        avg_score: round_display(avg_score, decimals),
        total_cost_pct: round_display(total_cost_pct, decimals),
        total_absolute_cost_m: total_absolute_cost_m.map(|c| round_display(c, decimals)),
        top: top.into_iter().map(|e| e.rounded(decimals)).collect(),
        bottom: bottom.into_iter().map(|e| e.rounded(decimals)).collect(),
    }
}

/// Flat summary across every subfunction of the industry, for the
/// all-subfunction overview page.
pub fn subfunction_overview(industry: &Industry) -> SubfunctionOverview {
    subfunction_overview_with(industry, get_config())
}

pub fn subfunction_overview_with(
    industry: &Industry,
    config: &AutomapConfig,
) -> SubfunctionOverview {
    let decimals = config.display_decimals;
    let entries: Vec<RankedEntry> = industry
        .functions
        .iter()
        .flat_map(|f| {
            f.subfunctions
                .iter()
                .map(|sf| subfunction_entry(sf, &f.name))
        })
        .collect();

    let avg_score = if entries.is_empty() {
        0.0
    } else {
        entries.iter().map(|e| e.score).sum::<f64>() / entries.len() as f64
    };
    let total_cost_pct: f64 = entries.iter().map(|e| e.cost_pct_revenue).sum();

    let (top, bottom) = rank(&entries, |e| e.score, OVERVIEW_LIST_LEN);

    SubfunctionOverview {
        subfunction_count: entries.len(),
        avg_score: round_display(avg_score, decimals),
        total_cost_pct: round_display(total_cost_pct, decimals),
        top: top.into_iter().map(|e| e.rounded(decimals)).collect(),
        bottom: bottom.into_iter().map(|e| e.rounded(decimals)).collect(),
    }
}

/// Detail record for one subfunction, ready for a focused panel.
pub fn subfunction_detail(
    industry: &Industry,
    function: &Function,
    subfunction: &Subfunction,
) -> SubfunctionDetail {
    let config = get_config();
    let decimals = config.display_decimals;
    let scale_max = industry.scale.max;
    let score_pct = if scale_max > 0.0 {
        (subfunction.automation_score / scale_max) * 100.0
    } else {
        0.0
    };
    SubfunctionDetail {
        id: subfunction.id.clone(),
        name: subfunction.name.clone(),
        function_name: function.name.clone(),
        score: round_display(subfunction.automation_score, decimals),
        score_pct_of_max: round_display(score_pct, 0),
        cost_pct_revenue: round_display(subfunction.cost_pct_revenue, decimals),
        absolute_cost_m: subfunction.absolute_cost_m.map(|c| round_display(c, 1)),
        role_description: subfunction.role_description.clone(),
    }
}

fn subfunction_entry(sf: &Subfunction, function_name: &str) -> RankedEntry {
    RankedEntry {
        id: sf.id.clone(),
        name: sf.name.clone(),
        parent: Some(function_name.to_string()),
        score: sf.automation_score,
        cost_pct_revenue: sf.cost_pct_revenue,
        absolute_cost_m: sf.absolute_cost_m,
    }
}

impl RankedEntry {
    fn rounded(mut self, decimals: u32) -> Self {
        self.score = round_display(self.score, decimals);
        self.cost_pct_revenue = round_display(self.cost_pct_revenue, decimals);
        self.absolute_cost_m = self.absolute_cost_m.map(|c| round_display(c, 1));
        self
    }
}
