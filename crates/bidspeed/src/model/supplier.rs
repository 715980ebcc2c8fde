use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalize::{Field, Normalized, Shape};

/// Ranked supplier candidates for a solution's key requirements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierResult {
    pub total_found: u64,
    pub top_suppliers: Vec<Supplier>,
    pub search_keywords: Vec<String>,
    pub search_timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Supplier {
    pub name: String,
    pub credit_rating: String,
    pub total_score: f64,
    pub description: String,
    pub website: String,
    pub contact_info: ContactInfo,
    pub past_projects: Vec<PastProject>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PastProject {
    pub project_name: String,
    pub year: u32,
    /// Contract value as displayed, e.g. "12M CNY".
    pub amount: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const TEXT: Shape = Shape::Text("");

const CONTACT: Shape = Shape::Object(&[
    Field {
        name: "contact_person",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "phone",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "email",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "address",
        aliases: &[],
        shape: TEXT,
    },
]);

const PROJECT: Shape = Shape::Object(&[
    Field {
        name: "project_name",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "year",
        aliases: &[],
        shape: Shape::Integer,
    },
    Field {
        name: "amount",
        aliases: &[],
        shape: TEXT,
    },
]);

const SUPPLIER: Shape = Shape::Object(&[
    Field {
        name: "name",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "credit_rating",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "total_score",
        aliases: &[],
        shape: Shape::Number,
    },
    Field {
        name: "description",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "website",
        aliases: &[],
        shape: TEXT,
    },
    Field {
        name: "contact_info",
        aliases: &[],
        shape: CONTACT,
    },
    Field {
        name: "past_projects",
        aliases: &[],
        shape: Shape::Array(&PROJECT),
    },
]);

impl Normalized for SupplierResult {
    const SHAPE: Shape = Shape::Object(&[
        Field {
            name: "total_found",
            aliases: &[],
            shape: Shape::Integer,
        },
        Field {
            name: "top_suppliers",
            aliases: &[],
            shape: Shape::Array(&SUPPLIER),
        },
        Field {
            name: "search_keywords",
            aliases: &[],
            shape: Shape::Array(&TEXT),
        },
        Field {
            name: "search_timestamp",
            aliases: &[],
            shape: Shape::OptionalText,
        },
    ]);

    const NAME: &'static str = "supplier";
}
