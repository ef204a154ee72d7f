//! Templated advisor panel: a fixed question catalog with static response
//! tables, and dimension-driven use-case suggestions for task records.
//!
//! Responses are lookup tables by design; there is no model call anywhere
//! in this module.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::types::Task;

/// The canned questions the panel offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Question {
    TopOpportunities,
    AiUseCases,
    KeyChallenges,
    WhereToStart,
    ExpectedRoi,
    HowWeHelp,
}

impl Question {
    pub const ALL: [Question; 6] = [
        Question::TopOpportunities,
        Question::AiUseCases,
        Question::KeyChallenges,
        Question::WhereToStart,
        Question::ExpectedRoi,
        Question::HowWeHelp,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Question::TopOpportunities => "Top Automation Opportunities",
            Question::AiUseCases => "AI Use Cases",
            Question::KeyChallenges => "Key Challenges",
            Question::WhereToStart => "Where to Start",
            Question::ExpectedRoi => "Expected ROI",
            Question::HowWeHelp => "How We Can Help",
        }
    }
}

static RESPONSES: Lazy<HashMap<Question, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([
        (
            Question::TopOpportunities,
            vec![
                "High-volume, rule-based processes with structured data inputs",
                "Document-heavy workflows with repetitive extraction tasks",
                "Exception handling and reconciliation processes",
                "Reporting pipelines with predictable data flows",
                "Customer-facing query resolution with defined answer sets",
            ],
        ),
        (
            Question::AiUseCases,
            vec![
                "Intelligent Document Processing (IDP) using OCR plus language models",
                "ML-based predictive scoring and risk models",
                "Conversational AI for internal and external query handling",
                "Process mining to identify bottleneck workflows",
                "Robotic Process Automation (RPA) for structured data tasks",
                "NLP-based classification and routing engines",
            ],
        ),
        (
            Question::KeyChallenges,
            vec![
                "Legacy system integration and data quality gaps",
                "Change management and workforce reskilling needs",
                "Regulatory compliance requirements limiting full automation",
                "Model explainability demands from audit and risk teams",
                "Siloed data making it hard to build unified training sets",
            ],
        ),
        (
            Question::WhereToStart,
            vec![
                "Prioritise high-repeatability, high-volume processes first",
                "Run a 6-week AI maturity assessment to baseline current state",
                "Pilot in one subfunction before scaling across the function",
                "Establish a data governance framework as a prerequisite",
                "Identify a cross-functional AI champion to sponsor the program",
            ],
        ),
        (
            Question::ExpectedRoi,
            vec![
                "20-40% reduction in processing turnaround time",
                "30-50% decrease in manual effort through FTE redeployment",
                "60-80% reduction in error rates for structured data tasks",
                "Payback period typically 12-18 months post-implementation",
                "Additional uplift from improved compliance and audit outcomes",
            ],
        ),
        (
            Question::HowWeHelp,
            vec![
                "End-to-end AI operationalization, from strategy to deployment",
                "Pre-built industry accelerators reduce implementation time",
                "Dedicated change management and training programs",
                "Regulatory-aware model design for compliance-heavy domains",
                "Managed services for ongoing model monitoring and improvement",
            ],
        ),
    ])
});

/// Use cases keyed by task dimension name, picked when that dimension
/// ranks among the task's strongest.
static DIMENSION_USE_CASES: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([
        (
            "Data Availability",
            vec![
                "Automated data pipeline to consolidate fragmented records",
                "OCR and NLP extraction to digitize unstructured documents",
                "Real-time data quality monitoring with anomaly flagging",
            ],
        ),
        (
            "Task Pattern Density",
            vec![
                "RPA bots to handle repetitive rule-based workflows end-to-end",
                "Intelligent workflow orchestration with exception routing to humans",
                "Process mining to identify and prioritize automation candidates",
            ],
        ),
        (
            "Error Tolerance",
            vec![
                "AI-assisted human review with confidence scoring before action",
                "Automated audit trails and reconciliation checks at each step",
                "Dual-control validation layer for high-stakes decisions",
            ],
        ),
        (
            "Regulatory Complexity",
            vec![
                "RegTech AI for real-time compliance monitoring and alerting",
                "Automated regulatory reporting with jurisdictional rule engines",
                "NLP-based policy change detection and impact assessment",
            ],
        ),
        (
            "Implementation Barriers",
            vec![
                "API-first integration layer to connect legacy systems",
                "Phased pilots: automate low-risk tasks first to build confidence",
                "Change management tooling for training and adoption tracking",
            ],
        ),
    ])
});

const GENERIC_USE_CASES: [&str; 5] = [
    "Intelligent process automation to eliminate manual, repetitive steps",
    "AI-powered decision support with explainable recommendations",
    "Predictive analytics to anticipate issues before they escalate",
    "Natural language interfaces for staff productivity and query resolution",
    "Continuous monitoring and anomaly detection across operational data",
];

/// One rendered advisor answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvisorReply {
    pub question: Question,
    pub heading: String,
    pub lines: Vec<String>,
}

/// Answer a catalog question, optionally headed with the unit under
/// discussion (a function or subfunction name).
pub fn respond(question: Question, context_name: Option<&str>) -> AdvisorReply {
    let heading = match context_name {
        Some(name) => format!("{} — {}", question.label(), name),
        None => question.label().to_string(),
    };
    let lines = RESPONSES
        .get(&question)
        .map(|lines| lines.iter().map(|s| s.to_string()).collect())
        .unwrap_or_default();
    AdvisorReply {
        question,
        heading,
        lines,
    }
}

/// Use-case suggestions for a task: two suggestions from each of its two
/// strongest dimensions, topped up with generic ones, deduplicated,
/// capped at five. Without a task, the generic list stands in.
pub fn task_use_cases(task: Option<&Task>) -> Vec<&'static str> {
    let Some(task) = task else {
        return GENERIC_USE_CASES.to_vec();
    };
    let mut cases: Vec<&'static str> = Vec::new();
    for dimension in task.dimensions_by_score().into_iter().take(2) {
        if let Some(suggestions) = DIMENSION_USE_CASES.get(dimension.name.as_str()) {
            cases.extend(suggestions.iter().take(2));
        }
    }
    cases.extend(GENERIC_USE_CASES.iter().take(3));
    let mut seen = std::collections::HashSet::new();
    cases.retain(|case| seen.insert(*case));
    cases.truncate(5);
    cases
}
