// Export modules for library usage
pub mod advisor;
pub mod aggregate;
pub mod calibrate;
pub mod config;
pub mod core;
pub mod data;
pub mod layout;

// Re-export commonly used types
pub use crate::core::{
    slugify, CriterionScore, Error, Function, Industry, Result, ScoreScale, Subfunction, Task,
    TaskDimension,
};

pub use crate::config::{
    get_config, init_config, AggregationMode, AutomapConfig, ColorMode,
};

pub use crate::calibrate::{
    gradient_legend, percentile, Calibration, Calibrator, SharedCalibrator, Tier,
};

pub use crate::aggregate::{
    function_automation_score, function_summary, function_unit_cost, industry_summary,
    round_display, subfunction_detail, subfunction_overview, FunctionSummary, IndustrySummary,
    RankedEntry, SubfunctionDetail, SubfunctionOverview,
};

pub use crate::layout::{
    build_function_layout, build_industry_layout, build_subfunction_overview_layout, LayoutNode,
    NodeMeta, TreemapLayout,
};

pub use crate::data::{IndustryRepository, TaskRepository};

pub use crate::advisor::{respond, task_use_cases, AdvisorReply, Question};
