//! Industry repository: loads per-industry JSON documents into the typed
//! tree, with a concurrent read-through cache.
//!
//! Documents live as `<data_dir>/<slug>.json`. The source files are static,
//! so concurrent first-population for the same key is harmless: both
//! workers parse the same bytes and the cache keeps one of the identical
//! results.

use dashmap::DashMap;
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::coerce_score;
use crate::core::errors::{Error, Result};
use crate::core::types::{slugify, CriterionScore, Function, Industry, ScoreScale, Subfunction};

/// Raw document schema, as found on disk. Scores stay `Value` until
/// coercion so a malformed cell degrades instead of failing the document.
#[derive(Debug, Deserialize)]
struct RawIndustryDoc {
    industry: String,
    #[serde(default)]
    revenue_m: Option<f64>,
    #[serde(default)]
    scale: Option<ScoreScale>,
    #[serde(default)]
    functions: Vec<RawFunction>,
}

#[derive(Debug, Deserialize)]
struct RawFunction {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    subfunctions: Vec<RawSubfunction>,
}

#[derive(Debug, Deserialize)]
struct RawSubfunction {
    #[serde(default)]
    id: Option<String>,
    name: String,
    cost_pct_revenue: f64,
    #[serde(default)]
    automation_score: Option<Value>,
    #[serde(default)]
    role_description: String,
    #[serde(default)]
    criteria: Vec<CriterionScore>,
}

pub struct IndustryRepository {
    data_dir: PathBuf,
    cache: DashMap<String, Arc<Industry>>,
}

impl IndustryRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache: DashMap::new(),
        }
    }

    /// Industry keys available on disk, sorted.
    pub fn available_industries(&self) -> Result<Vec<String>> {
        let pattern = self.data_dir.join("*.json");
        let pattern = pattern.to_string_lossy();
        let mut keys: Vec<String> = glob::glob(&pattern)
            .map_err(|e| Error::Configuration(format!("bad data dir pattern: {e}")))?
            .filter_map(|entry| entry.ok())
            .filter_map(|path| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().to_lowercase())
            })
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Load (or fetch from cache) one industry by key.
    pub fn load_industry(&self, industry_key: &str) -> Result<Arc<Industry>> {
        let key = industry_key.trim().to_lowercase();
        if let Some(cached) = self.cache.get(&key) {
            return Ok(Arc::clone(&cached));
        }
        let path = self.data_dir.join(format!("{key}.json"));
        if !path.exists() {
            return Err(Error::IndustryNotFound(industry_key.to_string()));
        }
        let industry = Arc::new(parse_industry_file(&key, &path)?);
        let entry = self
            .cache
            .entry(key)
            .or_insert_with(|| Arc::clone(&industry));
        Ok(Arc::clone(&entry))
    }

    /// Parse every available industry up front, in parallel.
    pub fn preload_all(&self) -> Result<usize> {
        let keys = self.available_industries()?;
        let loaded: Result<Vec<_>> = keys
            .par_iter()
            .map(|key| self.load_industry(key).map(|_| ()))
            .collect();
        loaded?;
        Ok(keys.len())
    }

    pub fn get_function(&self, industry_key: &str, function_id: &str) -> Result<Function> {
        let industry = self.load_industry(industry_key)?;
        industry
            .function(function_id)
            .cloned()
            .ok_or_else(|| Error::FunctionNotFound {
                industry: industry_key.to_string(),
                function: function_id.to_string(),
            })
    }

    pub fn get_subfunction(
        &self,
        industry_key: &str,
        function_id: &str,
        subfunction_id: &str,
    ) -> Result<Subfunction> {
        let function = self.get_function(industry_key, function_id)?;
        function
            .subfunction(subfunction_id)
            .cloned()
            .ok_or_else(|| Error::SubfunctionNotFound {
                industry: industry_key.to_string(),
                function: function_id.to_string(),
                subfunction: subfunction_id.to_string(),
            })
    }
}

fn parse_industry_file(slug: &str, path: &Path) -> Result<Industry> {
    let content = fs::read_to_string(path)?;
    parse_industry(slug, &content).map_err(|e| e.with_context(path.display().to_string()))
}

/// Parse and validate one industry document.
///
/// Costs must be non-negative (a schema error otherwise); scores are
/// coerced per [`coerce_score`]; missing ids are slugs of the names;
/// absolute costs are derived when revenue is present.
pub fn parse_industry(slug: &str, json: &str) -> Result<Industry> {
    let raw: RawIndustryDoc = serde_json::from_str(json)?;
    let scale = raw.scale.unwrap_or_default();
    let revenue_m = raw.revenue_m;

    let mut functions = Vec::with_capacity(raw.functions.len());
    for raw_function in raw.functions {
        let function_id = raw_function
            .id
            .unwrap_or_else(|| slugify(&raw_function.name));
        let mut subfunctions = Vec::with_capacity(raw_function.subfunctions.len());
        for raw_sf in raw_function.subfunctions {
            if raw_sf.cost_pct_revenue < 0.0 || !raw_sf.cost_pct_revenue.is_finite() {
                return Err(Error::schema(
                    slug,
                    format!(
                        "subfunction '{}' has invalid cost {}",
                        raw_sf.name, raw_sf.cost_pct_revenue
                    ),
                ));
            }
            let context = format!("{slug}/{function_id}/{}", raw_sf.name);
            let automation_score = coerce_score(raw_sf.automation_score.as_ref(), scale, &context);
            let absolute_cost_m = revenue_m.map(|rev| raw_sf.cost_pct_revenue * rev / 100.0);
            subfunctions.push(Subfunction {
                id: raw_sf.id.unwrap_or_else(|| slugify(&raw_sf.name)),
                name: raw_sf.name,
                cost_pct_revenue: raw_sf.cost_pct_revenue,
                absolute_cost_m,
                automation_score,
                role_description: raw_sf.role_description,
                criteria: raw_sf.criteria,
            });
        }
        functions.push(Function {
            id: function_id,
            name: raw_function.name,
            subfunctions,
        });
    }

    Ok(Industry {
        slug: slug.to_string(),
        name: raw.industry,
        revenue_m,
        scale,
        functions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const DOC: &str = indoc! {r#"
        {
          "industry": "BFSI",
          "revenue_m": 500.0,
          "functions": [
            {
              "name": "Claims Processing",
              "subfunctions": [
                {
                  "name": "Intake & Triage",
                  "cost_pct_revenue": 2.0,
                  "automation_score": 4.2,
                  "role_description": "First notice of loss handling"
                },
                {
                  "name": "Adjudication",
                  "cost_pct_revenue": 3.0,
                  "automation_score": "bad"
                }
              ]
            }
          ]
        }
    "#};

    #[test]
    fn parses_and_derives_ids_and_absolute_costs() {
        let industry = parse_industry("bfsi", DOC).unwrap();
        assert_eq!(industry.name, "BFSI");
        assert_eq!(industry.scale, ScoreScale::ONE_TO_FIVE);
        let function = &industry.functions[0];
        assert_eq!(function.id, "claims_processing");
        let sf = &function.subfunctions[0];
        assert_eq!(sf.id, "intake_triage");
        assert_eq!(sf.automation_score, 4.2);
        // 2% of 500M revenue.
        assert_eq!(sf.absolute_cost_m, Some(10.0));
    }

    #[test]
    fn malformed_score_coerces_to_scale_minimum() {
        let industry = parse_industry("bfsi", DOC).unwrap();
        let sf = &industry.functions[0].subfunctions[1];
        assert_eq!(sf.automation_score, 1.0);
    }

    #[test]
    fn negative_cost_is_a_schema_error() {
        let doc = r#"{
            "industry": "X",
            "functions": [{
                "name": "F",
                "subfunctions": [{"name": "S", "cost_pct_revenue": -1.0, "automation_score": 3.0}]
            }]
        }"#;
        let err = parse_industry("x", doc).unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn declared_scale_is_honored() {
        let doc = r#"{
            "industry": "X",
            "scale": {"min": 0.0, "max": 20.0},
            "functions": [{
                "name": "F",
                "subfunctions": [{"name": "S", "cost_pct_revenue": 1.0, "automation_score": 17.0}]
            }]
        }"#;
        let industry = parse_industry("x", doc).unwrap();
        assert_eq!(industry.scale, ScoreScale::new(0.0, 20.0));
        assert_eq!(industry.functions[0].subfunctions[0].automation_score, 17.0);
    }
}
