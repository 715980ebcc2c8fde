use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalize::{Field, Normalized, Shape, Variant};

/// Structured summary of a bid document, produced by the analysis stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub metadata: AnalysisMetadata,
    pub ai_summary: AiSummary,
    pub tech_checklist: Vec<ChecklistItem>,
    pub tech_specifications: Vec<TechSpecification>,
    pub scoring_rules: Vec<ScoringRule>,
    /// Keys the service sent outside the declared fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisMetadata {
    pub total_words: u64,
    pub key_points_count: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSummary {
    pub core_requirements_summary: String,
    pub key_technical_points: Vec<String>,
    /// Milestone label to date string, e.g. "bid deadline" -> "2025-12-15".
    pub key_dates: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AiSummary {
    fn default() -> Self {
        Self {
            core_requirements_summary: NO_DATA.to_string(),
            key_technical_points: Vec::new(),
            key_dates: BTreeMap::new(),
            extra: Map::new(),
        }
    }
}

/// Placeholder summary used when the service returned none.
pub const NO_DATA: &str = "no data";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistItem {
    pub item: String,
    pub page: u32,
    pub score: f64,
    pub priority: Priority,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechSpecification {
    pub category: String,
    pub content: String,
    /// e.g. `line_number`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRule {
    pub category: String,
    pub item: String,
    pub score: f64,
    /// Percentage string such as "15%".
    pub weight: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const METADATA: Shape = Shape::Object(&[
    Field {
        name: "total_words",
        aliases: &[],
        shape: Shape::Integer,
    },
    Field {
        name: "key_points_count",
        aliases: &[],
        shape: Shape::Integer,
    },
]);

const AI_SUMMARY: Shape = Shape::Object(&[
    Field {
        name: "core_requirements_summary",
        aliases: &["核心需求总结"],
        shape: Shape::Text(NO_DATA),
    },
    Field {
        name: "key_technical_points",
        aliases: &["关键技术要点"],
        shape: Shape::Array(&Shape::Text("")),
    },
    Field {
        name: "key_dates",
        aliases: &["重要时间节点"],
        shape: Shape::Map(&Shape::Text("")),
    },
]);

const PRIORITY: Shape = Shape::Choice {
    variants: &[
        Variant {
            canonical: "high",
            aliases: &["高"],
        },
        Variant {
            canonical: "medium",
            aliases: &["中"],
        },
        Variant {
            canonical: "low",
            aliases: &["低"],
        },
    ],
    default: "medium",
};

const CHECKLIST_ITEM: Shape = Shape::Object(&[
    Field {
        name: "item",
        aliases: &[],
        shape: Shape::Text(""),
    },
    Field {
        name: "page",
        aliases: &[],
        shape: Shape::Integer,
    },
    Field {
        name: "score",
        aliases: &[],
        shape: Shape::Number,
    },
    Field {
        name: "priority",
        aliases: &[],
        shape: PRIORITY,
    },
]);

const TECH_SPECIFICATION: Shape = Shape::Object(&[
    Field {
        name: "category",
        aliases: &[],
        shape: Shape::Text(""),
    },
    Field {
        name: "content",
        aliases: &[],
        shape: Shape::Text(""),
    },
]);

const SCORING_RULE: Shape = Shape::Object(&[
    Field {
        name: "category",
        aliases: &[],
        shape: Shape::Text(""),
    },
    Field {
        name: "item",
        aliases: &[],
        shape: Shape::Text(""),
    },
    Field {
        name: "score",
        aliases: &[],
        shape: Shape::Number,
    },
    Field {
        name: "weight",
        aliases: &[],
        shape: Shape::Text(""),
    },
]);

impl Normalized for AnalysisResult {
    const SHAPE: Shape = Shape::Object(&[
        Field {
            name: "metadata",
            aliases: &[],
            shape: METADATA,
        },
        Field {
            name: "ai_summary",
            aliases: &[],
            shape: AI_SUMMARY,
        },
        Field {
            name: "tech_checklist",
            aliases: &[],
            shape: Shape::Array(&CHECKLIST_ITEM),
        },
        Field {
            name: "tech_specifications",
            aliases: &[],
            shape: Shape::Array(&TECH_SPECIFICATION),
        },
        Field {
            name: "scoring_rules",
            aliases: &[],
            shape: Shape::Array(&SCORING_RULE),
        },
    ]);

    const NAME: &'static str = "analysis";
}
