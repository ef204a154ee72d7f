//! Hierarchical layout builder: flattens the tree into parent/child/value
//! records for nested-rectangle rendering.
//!
//! Every builder recalibrates the passed [`Calibrator`] over exactly the
//! scores visible at its level before coloring, so colors are locally
//! contrastive at each drill-down level. Input order is preserved; render
//! order affects visual packing.

use serde::{Deserialize, Serialize};

use crate::aggregate::{function_automation_score, function_unit_cost, round_display};
use crate::calibrate::{Calibrator, ROOT_COLOR};
use crate::config::{get_config, AutomapConfig};
use crate::core::errors::Result;
use crate::core::types::{Function, Industry};

/// Metadata attached to a layout node for hover panels and badges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subfunction_count: Option<usize>,
    /// Owning L1 function name, on flat overview nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_pct_revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_cost_m: Option<f64>,
}

/// One rectangle of a treemap. The root has an empty parent and zero value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub label: String,
    pub parent: String,
    pub value: f64,
    pub color: String,
    pub meta: NodeMeta,
}

/// Flattened treemap: a root node followed by its children in input order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreemapLayout {
    pub nodes: Vec<LayoutNode>,
}

impl TreemapLayout {
    fn with_root(label: &str) -> Self {
        Self {
            nodes: vec![LayoutNode {
                label: label.to_string(),
                parent: String::new(),
                value: 0.0,
                color: ROOT_COLOR.to_string(),
                meta: NodeMeta::default(),
            }],
        }
    }

    /// A layout with children beyond the synthetic root.
    pub fn has_drawable_area(&self) -> bool {
        self.nodes.iter().skip(1).any(|n| n.value > 0.0)
    }

    /// Sum of child values under the given parent label.
    pub fn child_value_sum(&self, parent: &str) -> f64 {
        self.nodes
            .iter()
            .filter(|n| n.parent == parent)
            .map(|n| n.value)
            .sum()
    }

    /// Parallel label column, in render order.
    pub fn labels(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.label.as_str()).collect()
    }

    pub fn parents(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.parent.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.value).collect()
    }

    pub fn colors(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.color.as_str()).collect()
    }
}

/// Function-level treemap for one industry: root -> L1 functions, sized by
/// unit cost, colored by the configured aggregation of subfunction scores.
///
/// Calibrates over every subfunction score in the industry first. An
/// industry with no functions yields just the root; callers render an
/// empty state.
pub fn build_industry_layout(industry: &Industry, calibrator: &mut Calibrator) -> Result<TreemapLayout> {
    build_industry_layout_with(industry, calibrator, get_config())
}

pub fn build_industry_layout_with(
    industry: &Industry,
    calibrator: &mut Calibrator,
    config: &AutomapConfig,
) -> Result<TreemapLayout> {
    let decimals = config.display_decimals;
    calibrator.calibrate_scaled(
        &industry.all_scores(),
        &format!("industry:{}", industry.slug),
        industry.scale,
    )?;

    let mut layout = TreemapLayout::with_root(&industry.name);
    for function in &industry.functions {
        let unit_cost = function_unit_cost(function);
        let score = function_automation_score(function, config.aggregation_mode, industry.scale);
        layout.nodes.push(LayoutNode {
            label: function.name.clone(),
            parent: industry.name.clone(),
            value: unit_cost,
            color: calibrator.color_for(Some(score)),
            meta: NodeMeta {
                id: function.id.clone(),
                score: Some(round_display(score, decimals)),
                tier_label: Some(calibrator.label_for(Some(score)).to_string()),
                subfunction_count: Some(function.subfunctions.len()),
                ..NodeMeta::default()
            },
        });
    }
    Ok(layout)
}

/// Subfunction-level treemap for one function: root -> L2 subfunctions,
/// sized by cost% of revenue.
///
/// Calibrates over this function's own subfunction scores, so colors
/// contrast within the function rather than across the industry.
pub fn build_function_layout(
    industry: &Industry,
    function: &Function,
    calibrator: &mut Calibrator,
) -> Result<TreemapLayout> {
    build_function_layout_with(industry, function, calibrator, get_config())
}

pub fn build_function_layout_with(
    industry: &Industry,
    function: &Function,
    calibrator: &mut Calibrator,
    config: &AutomapConfig,
) -> Result<TreemapLayout> {
    let decimals = config.display_decimals;
    calibrator.calibrate_scaled(
        &function.scores(),
        &format!("function:{}:{}", industry.slug, function.id),
        industry.scale,
    )?;

    let mut layout = TreemapLayout::with_root(&function.name);
    for sf in &function.subfunctions {
        let score = sf.automation_score;
        layout.nodes.push(LayoutNode {
            label: sf.name.clone(),
            parent: function.name.clone(),
            value: sf.cost_pct_revenue,
            color: calibrator.color_for(Some(score)),
            meta: NodeMeta {
                id: sf.id.clone(),
                score: Some(round_display(score, decimals)),
                tier_label: Some(calibrator.label_for(Some(score)).to_string()),
                cost_pct_revenue: Some(round_display(sf.cost_pct_revenue, decimals)),
                absolute_cost_m: sf.absolute_cost_m.map(|c| round_display(c, 1)),
                ..NodeMeta::default()
            },
        });
    }
    Ok(layout)
}

/// Flat overview treemap: root -> every L2 subfunction in the industry,
/// sized by absolute cost when revenue is known, else by cost%.
pub fn build_subfunction_overview_layout(
    industry: &Industry,
    calibrator: &mut Calibrator,
) -> Result<TreemapLayout> {
    build_subfunction_overview_layout_with(industry, calibrator, get_config())
}

pub fn build_subfunction_overview_layout_with(
    industry: &Industry,
    calibrator: &mut Calibrator,
    config: &AutomapConfig,
) -> Result<TreemapLayout> {
    let decimals = config.display_decimals;
    let has_revenue = industry.revenue_m.is_some();
    calibrator.calibrate_scaled(
        &industry.all_scores(),
        &format!("overview:{}", industry.slug),
        industry.scale,
    )?;

    let mut layout = TreemapLayout::with_root(&industry.name);
    for function in &industry.functions {
        for sf in &function.subfunctions {
            let score = sf.automation_score;
            let value = if has_revenue {
                sf.absolute_cost_m.unwrap_or(sf.cost_pct_revenue)
            } else {
                sf.cost_pct_revenue
            };
            layout.nodes.push(LayoutNode {
                label: sf.name.clone(),
                parent: industry.name.clone(),
                value,
                color: calibrator.color_for(Some(score)),
                meta: NodeMeta {
                    id: sf.id.clone(),
                    score: Some(round_display(score, decimals)),
                    tier_label: Some(calibrator.label_for(Some(score)).to_string()),
                    function_name: Some(function.name.clone()),
                    cost_pct_revenue: Some(round_display(sf.cost_pct_revenue, decimals)),
                    absolute_cost_m: sf.absolute_cost_m.map(|c| round_display(c, 1)),
                    ..NodeMeta::default()
                },
            });
        }
    }
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AutomapConfig;
    use crate::core::types::{ScoreScale, Subfunction};
    use pretty_assertions::assert_eq;

    fn subfunction(id: &str, cost: f64, score: f64) -> Subfunction {
        Subfunction {
            id: id.to_string(),
            name: id.to_uppercase(),
            cost_pct_revenue: cost,
            absolute_cost_m: None,
            automation_score: score,
            role_description: String::new(),
            criteria: Vec::new(),
        }
    }

    fn industry() -> Industry {
        Industry {
            slug: "bfsi".into(),
            name: "BFSI".into(),
            revenue_m: None,
            scale: ScoreScale::ONE_TO_FIVE,
            functions: vec![
                Function {
                    id: "ops".into(),
                    name: "Operations".into(),
                    subfunctions: vec![subfunction("a", 10.0, 2.0), subfunction("b", 20.0, 4.0)],
                },
                Function {
                    id: "fin".into(),
                    name: "Finance".into(),
                    subfunctions: vec![subfunction("c", 5.0, 3.0), subfunction("d", 5.0, 3.0)],
                },
            ],
        }
    }

    #[test]
    fn industry_layout_has_synthetic_root_and_preserves_order() {
        let industry = industry();
        let config = AutomapConfig::default();
        let mut cal = Calibrator::with_config(&config);
        let layout = build_industry_layout_with(&industry, &mut cal, &config).unwrap();

        assert_eq!(layout.nodes.len(), 3);
        assert_eq!(layout.nodes[0].label, "BFSI");
        assert_eq!(layout.nodes[0].parent, "");
        assert_eq!(layout.nodes[0].value, 0.0);
        assert_eq!(layout.labels()[1..], ["Operations", "Finance"]);
        assert_eq!(layout.parents()[1..], ["BFSI", "BFSI"]);
    }

    #[test]
    fn industry_layout_sizes_by_unit_cost() {
        let industry = industry();
        let config = AutomapConfig::default();
        let mut cal = Calibrator::with_config(&config);
        let layout = build_industry_layout_with(&industry, &mut cal, &config).unwrap();
        assert_eq!(layout.nodes[1].value, 30.0);
        assert_eq!(layout.nodes[2].value, 10.0);
        assert_eq!(layout.nodes[1].meta.subfunction_count, Some(2));
    }

    #[test]
    fn child_values_reconstruct_parent_unit_cost() {
        let industry = industry();
        let config = AutomapConfig::default();
        let mut cal = Calibrator::with_config(&config);
        for function in &industry.functions {
            let layout =
                build_function_layout_with(&industry, function, &mut cal, &config).unwrap();
            let sum = layout.child_value_sum(&function.name);
            assert!((sum - function_unit_cost(function)).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_industry_yields_root_only_layout() {
        let industry = Industry {
            slug: "empty".into(),
            name: "Empty".into(),
            revenue_m: None,
            scale: ScoreScale::ONE_TO_FIVE,
            functions: vec![],
        };
        let config = AutomapConfig::default();
        let mut cal = Calibrator::with_config(&config);
        let layout = build_industry_layout_with(&industry, &mut cal, &config).unwrap();
        assert_eq!(layout.nodes.len(), 1);
        assert!(!layout.has_drawable_area());
    }

    #[test]
    fn overview_layout_uses_absolute_cost_when_revenue_known() {
        let mut industry = industry();
        industry.revenue_m = Some(1000.0);
        for f in &mut industry.functions {
            for sf in &mut f.subfunctions {
                sf.absolute_cost_m = Some(sf.cost_pct_revenue * 10.0);
            }
        }
        let config = AutomapConfig::default();
        let mut cal = Calibrator::with_config(&config);
        let layout =
            build_subfunction_overview_layout_with(&industry, &mut cal, &config).unwrap();
        assert_eq!(layout.nodes.len(), 5);
        assert_eq!(layout.nodes[1].value, 100.0);
        assert_eq!(layout.nodes[1].meta.function_name.as_deref(), Some("Operations"));
    }

    #[test]
    fn function_layout_recalibrates_locally() {
        // Within "Finance" both subfunctions score 3.0; locally that batch
        // has no spread, so both land in the same tier with the same color.
        let industry = industry();
        let config = AutomapConfig::default();
        let mut cal = Calibrator::with_config(&config);
        let layout = build_function_layout_with(
            &industry,
            industry.function("fin").unwrap(),
            &mut cal,
            &config,
        )
        .unwrap();
        assert_eq!(layout.nodes[1].color, layout.nodes[2].color);
        assert_eq!(layout.nodes[1].meta.tier_label, layout.nodes[2].meta.tier_label);
    }
}
