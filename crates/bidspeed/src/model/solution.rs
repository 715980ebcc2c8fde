use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalize::{Field, Normalized, Shape, Variant};

/// Proposed technical solution, produced from an [`AnalysisResult`].
///
/// [`AnalysisResult`]: super::AnalysisResult
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolutionResult {
    pub solution_overview: SolutionOverview,
    pub technical_solutions: Vec<TechnicalSolution>,
    pub system_architecture: SystemArchitecture,
    pub implementation_plan: ImplementationPlan,
    pub deviation_table: Vec<DeviationEntry>,
    /// Input of the supplier stage.
    pub key_requirements: KeyRequirements,
    pub generated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolutionOverview {
    pub project_name: String,
    pub solution_type: String,
    pub total_budget_estimate: String,
    pub implementation_duration: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalSolution {
    pub solution_name: String,
    /// Percentage string such as "95%".
    pub match_score: String,
    pub advantages: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemArchitecture {
    pub layers: Vec<ArchitectureLayer>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureLayer {
    pub name: String,
    /// Unique, in presentation order.
    pub components: Vec<String>,
    /// Unique, in presentation order.
    pub technologies: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImplementationPlan {
    pub phases: Vec<ImplementationPhase>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImplementationPhase {
    pub phase: String,
    pub duration_weeks: u32,
    pub start_date: String,
    pub end_date: String,
    pub deliverables: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviationEntry {
    pub requirement: String,
    pub our_solution: String,
    pub deviation_status: DeviationStatus,
    pub impact_assessment: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How a proposed item deviates from the bid requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviationStatus {
    /// Exceeds the requirement.
    #[serde(rename = "positive")]
    Positive,
    /// Meets the requirement exactly.
    #[default]
    #[serde(rename = "none")]
    Compliant,
    /// Falls short of the requirement.
    #[serde(rename = "negative")]
    Negative,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyRequirements {
    pub product_names: Vec<String>,
    pub tech_requirements: Vec<String>,
    pub industry: String,
    pub budget_range: String,
    /// Passed through to the supplier service.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const TEXT: Shape = Shape::Text("");
const TEXT_LIST: Shape = Shape::Array(&TEXT);
const TEXT_SET: Shape = Shape::Set(&TEXT);

const OVERVIEW: Shape = Shape::Object(&[
    Field {
        name: "project_name",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "solution_type",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "total_budget_estimate",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "implementation_duration",
        aliases: &[],
        shape: TEXT,
    },
]);

const TECHNICAL_SOLUTION: Shape = Shape::Object(&[
    Field {
        name: "solution_name",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "match_score",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "advantages",
        aliases: &[],
        shape: TEXT_LIST,
    },
]);

const LAYER: Shape = Shape::Object(&[
    Field {
        name: "name",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "components",
        aliases: &[],
        shape: TEXT_SET,
    },
    Field {
        name: "technologies",
        aliases: &[],
        shape: TEXT_SET,
    },
]);

const ARCHITECTURE: Shape = Shape::Object(&[Field {
    name: "layers",
    aliases: &[],
    shape: Shape::Array(&LAYER),
}]);

const PHASE: Shape = Shape::Object(&[
    Field {
        name: "phase",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "duration_weeks",
        aliases: &[],
        shape: Shape::Integer,
    },
    Field {
        name: "start_date",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "end_date",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "deliverables",
        aliases: &[],
        shape: TEXT_LIST,
    },
]);

const PLAN: Shape = Shape::Object(&[Field {
    name: "phases",
    aliases: &[],
    shape: Shape::Array(&PHASE),
}]);

const DEVIATION_STATUS: Shape = Shape::Choice {
    variants: &[
        Variant {
            canonical: "positive",
            aliases: &["正偏离"],
        },
        Variant {
            canonical: "none",
            aliases: &["无偏离"],
        },
        Variant {
            canonical: "negative",
            aliases: &["负偏离"],
        },
    ],
    default: "none",
};

const DEVIATION: Shape = Shape::Object(&[
    Field {
        name: "requirement",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "our_solution",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "deviation_status",
        aliases: &[],
        shape: DEVIATION_STATUS,
    },
    Field {
        name: "impact_assessment",
        aliases: &[],
        shape: TEXT,
    },
]);

const KEY_REQUIREMENTS: Shape = Shape::Object(&[
    Field {
        name: "product_names",
        aliases: &[],
        shape: TEXT_LIST,
    },
    Field {
        name: "tech_requirements",
        aliases: &[],
        shape: TEXT_LIST,
    },
    Field {
        name: "industry",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "budget_range",
        aliases: &[],
        shape: TEXT,
    },
]);

impl Normalized for SolutionResult {
    const SHAPE: Shape = Shape::Object(&[
        Field {
            name: "solution_overview",
            aliases: &[],
            shape: OVERVIEW,
        },
        Field {
            name: "technical_solutions",
            aliases: &[],
            shape: Shape::Array(&TECHNICAL_SOLUTION),
        },
        Field {
            name: "system_architecture",
            aliases: &[],
            shape: ARCHITECTURE,
        },
        Field {
            name: "implementation_plan",
            aliases: &[],
            shape: PLAN,
        },
        Field {
            name: "deviation_table",
            aliases: &[],
            shape: Shape::Array(&DEVIATION),
        },
        Field {
            name: "key_requirements",
            aliases: &[],
            shape: KEY_REQUIREMENTS,
        },
        Field {
            name: "generated_at",
            aliases: &[],
            shape: Shape::OptionalText,
        },
    ]);

    const NAME: &'static str = "solution";
}
