//! Degenerate trees must produce well-formed empty layouts, never errors.

use automap::config::AutomapConfig;
use automap::layout::{build_function_layout_with, build_subfunction_overview_layout_with};
use automap::{Calibrator, Function, Industry, ScoreScale, SharedCalibrator, Subfunction};
use pretty_assertions::assert_eq;

fn zero_cost_industry() -> Industry {
    Industry {
        slug: "zero".into(),
        name: "Zero".into(),
        revenue_m: None,
        scale: ScoreScale::ONE_TO_FIVE,
        functions: vec![Function {
            id: "f".into(),
            name: "F".into(),
            subfunctions: vec![
                Subfunction {
                    id: "a".into(),
                    name: "A".into(),
                    cost_pct_revenue: 0.0,
                    absolute_cost_m: None,
                    automation_score: 3.0,
                    role_description: String::new(),
                    criteria: Vec::new(),
                },
                Subfunction {
                    id: "b".into(),
                    name: "B".into(),
                    cost_pct_revenue: 0.0,
                    absolute_cost_m: None,
                    automation_score: 4.0,
                    role_description: String::new(),
                    criteria: Vec::new(),
                },
            ],
        }],
    }
}

#[test]
fn zero_size_branch_yields_no_drawable_area() {
    let industry = zero_cost_industry();
    let config = AutomapConfig::default();
    let mut calibrator = Calibrator::with_config(&config);

    let layout =
        build_function_layout_with(&industry, &industry.functions[0], &mut calibrator, &config)
            .unwrap();
    // Nodes exist so the caller can render an empty state with labels.
    assert_eq!(layout.nodes.len(), 3);
    assert!(!layout.has_drawable_area());
    assert_eq!(layout.child_value_sum("F"), 0.0);
}

#[test]
fn function_with_no_subfunctions_still_lays_out() {
    let industry = Industry {
        slug: "bare".into(),
        name: "Bare".into(),
        revenue_m: None,
        scale: ScoreScale::ONE_TO_FIVE,
        functions: vec![Function {
            id: "f".into(),
            name: "F".into(),
            subfunctions: vec![],
        }],
    };
    let config = AutomapConfig::default();
    let mut calibrator = Calibrator::with_config(&config);

    let layout =
        build_function_layout_with(&industry, &industry.functions[0], &mut calibrator, &config)
            .unwrap();
    assert_eq!(layout.nodes.len(), 1);
    assert!(!layout.has_drawable_area());

    let overview =
        build_subfunction_overview_layout_with(&industry, &mut calibrator, &config).unwrap();
    assert_eq!(overview.nodes.len(), 1);
}

#[test]
fn shared_calibrator_serves_concurrent_lookups() {
    let config = AutomapConfig::default();
    let shared = SharedCalibrator::new(Calibrator::with_config(&config));
    shared.calibrate(&[1.0, 2.0, 3.0, 4.0, 5.0], "bfsi").unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for score in [1.0, 2.5, 4.9] {
                    let label = shared.label_for(Some(score));
                    assert!(["Low", "Medium", "High"].contains(&label));
                }
            });
        }
    });

    // A consistent snapshot across a sequence of lookups.
    shared.with_snapshot(|calibrator| {
        assert_eq!(calibrator.label_for(Some(5.0)), "High");
        assert_eq!(calibrator.label_for(Some(1.0)), "Low");
    });
}
