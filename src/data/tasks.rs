//! Task-level (L3) repository.
//!
//! The task dataset is a flat JSON array of rows keyed by industry, L1 and
//! L2 *names* — a string-matched grouping, not a foreign key. Rows are
//! parsed and coerced once at load; grouped, ranked lookups are cached.

use dashmap::DashMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::{coerce_score, normalize_key};
use crate::core::errors::Result;
use crate::core::types::{ScoreScale, Task, TaskDimension};

/// The five named dimensions of a task record: display name and the column
/// prefix its score/label/reason cells use in the source dataset.
pub const DIMENSIONS: [(&str, &str); 5] = [
    ("Data Availability", "data_availability"),
    ("Task Pattern Density", "task_pattern_density"),
    ("Error Tolerance", "error_tolerance"),
    ("Regulatory Complexity", "regulatory_complexity"),
    ("Implementation Barriers", "implementation_barriers"),
];

#[derive(Debug, Deserialize)]
struct RawTaskRow {
    industry: String,
    l1_function: String,
    l2_function: String,
    l3_function: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    ai_score: Option<Value>,
    /// Dimension columns (`<prefix>_score` / `_label` / `_reason`).
    #[serde(flatten)]
    cells: Map<String, Value>,
}

pub struct TaskRepository {
    rows: Vec<(String, Task)>,
    cache: DashMap<String, Arc<Vec<Task>>>,
    scale: ScoreScale,
}

impl TaskRepository {
    /// Load the task dataset from a JSON array file.
    pub fn from_file(path: &Path, scale: ScoreScale) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content, scale)
    }

    /// Parse the task dataset from a JSON array string.
    pub fn from_json(json: &str, scale: ScoreScale) -> Result<Self> {
        let raw_rows: Vec<RawTaskRow> = serde_json::from_str(json)?;
        let rows = raw_rows
            .into_iter()
            .map(|row| {
                let key = group_key(&row.industry, &row.l1_function, &row.l2_function);
                let context = format!("task '{}'", row.l3_function.trim());
                let ai_score = coerce_score(row.ai_score.as_ref(), scale, &context);
                let dimensions = DIMENSIONS
                    .iter()
                    .map(|&(name, prefix)| parse_dimension(&row.cells, name, prefix, scale, &context))
                    .collect();
                let task = Task {
                    name: row.l3_function.trim().to_string(),
                    description: row.description.trim().to_string(),
                    ai_score,
                    dimensions,
                };
                (key, task)
            })
            .collect();
        Ok(Self {
            rows,
            cache: DashMap::new(),
            scale,
        })
    }

    pub fn scale(&self) -> ScoreScale {
        self.scale
    }

    /// Tasks for an (industry, l1, l2) group, ranked by composite score
    /// descending with ties in input order. Unknown groups yield an empty
    /// list, never an error.
    pub fn tasks_for(&self, industry: &str, l1_name: &str, l2_name: &str) -> Arc<Vec<Task>> {
        let key = group_key(industry, l1_name, l2_name);
        if let Some(cached) = self.cache.get(&key) {
            return Arc::clone(&cached);
        }
        let mut tasks: Vec<Task> = self
            .rows
            .iter()
            .filter(|(row_key, _)| *row_key == key)
            .map(|(_, task)| task.clone())
            .collect();
        tasks.sort_by(|a, b| {
            b.ai_score
                .partial_cmp(&a.ai_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let tasks = Arc::new(tasks);
        let entry = self.cache.entry(key).or_insert_with(|| Arc::clone(&tasks));
        Arc::clone(&entry)
    }

    /// Case-insensitive lookup of one task within its group.
    pub fn task_by_name(
        &self,
        industry: &str,
        l1_name: &str,
        l2_name: &str,
        task_name: &str,
    ) -> Option<Task> {
        let wanted = normalize_key(task_name);
        self.tasks_for(industry, l1_name, l2_name)
            .iter()
            .find(|task| normalize_key(&task.name) == wanted)
            .cloned()
    }

    /// Composite scores of a group, for per-batch badge calibration.
    pub fn group_scores(&self, industry: &str, l1_name: &str, l2_name: &str) -> Vec<f64> {
        self.tasks_for(industry, l1_name, l2_name)
            .iter()
            .map(|task| task.ai_score)
            .collect()
    }
}

fn group_key(industry: &str, l1: &str, l2: &str) -> String {
    format!(
        "{}\u{1f}{}\u{1f}{}",
        normalize_key(industry),
        normalize_key(l1),
        normalize_key(l2)
    )
}

fn parse_dimension(
    cells: &Map<String, Value>,
    name: &str,
    prefix: &str,
    scale: ScoreScale,
    context: &str,
) -> TaskDimension {
    let score = coerce_score(
        cells.get(&format!("{prefix}_score")),
        scale,
        &format!("{context} {name}"),
    );
    let text = |suffix: &str| {
        cells
            .get(&format!("{prefix}_{suffix}"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string()
    };
    TaskDimension {
        name: name.to_string(),
        score,
        label: text("label"),
        reason: text("reason"),
    }
}
