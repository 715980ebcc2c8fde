//! Builders for service responses and config files.

#![allow(dead_code)]

use serde_json::{json, Value};

/// Builder for `/api/analyze` response bodies.
pub struct AnalysisResponseBuilder {
    success: Option<bool>,
    error: Option<String>,
    total_words: Value,
    summary: Option<Value>,
    checklist: Vec<Value>,
    extra: Vec<(String, Value)>,
}

impl AnalysisResponseBuilder {
    pub fn new() -> Self {
        Self {
            success: Some(true),
            error: None,
            total_words: json!(1580),
            summary: None,
            checklist: vec![],
            extra: vec![],
        }
    }

    pub fn failed(error: Option<&str>) -> Self {
        Self {
            success: Some(false),
            error: error.map(str::to_string),
            ..Self::new()
        }
    }

    pub fn without_success_flag(mut self) -> Self {
        self.success = None;
        self
    }

    pub fn total_words(mut self, total_words: impl Into<Value>) -> Self {
        self.total_words = total_words.into();
        self
    }

    pub fn summary(mut self, summary: Value) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn checklist_item(mut self, item: &str, priority: &str, score: impl Into<Value>) -> Self {
        self.checklist.push(json!({
            "item": item,
            "page": 1,
            "score": score.into(),
            "priority": priority,
        }));
        self
    }

    /// Overrides or adds a top-level key.
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.extra.push((key.to_string(), value));
        self
    }

    pub fn build(self) -> Value {
        let key_points = self.checklist.len();
        let mut body = json!({
            "metadata": {
                "total_words": self.total_words,
                "key_points_count": key_points,
            },
            "tech_checklist": self.checklist,
            "tech_specifications": [],
            "scoring_rules": [],
        });
        let map = body.as_object_mut().unwrap();
        if let Some(success) = self.success {
            map.insert("success".to_string(), json!(success));
        }
        if let Some(error) = self.error {
            map.insert("error".to_string(), json!(error));
        }
        if let Some(summary) = self.summary {
            map.insert("ai_summary".to_string(), summary);
        }
        for (key, value) in self.extra {
            map.insert(key, value);
        }
        body
    }
}

/// Builder for `/api/generate-solution` response bodies.
pub struct SolutionResponseBuilder {
    project_name: String,
    product_names: Vec<String>,
    industry: String,
    deviations: Vec<Value>,
    envelope: Option<(bool, Option<String>)>,
}

impl SolutionResponseBuilder {
    pub fn new() -> Self {
        Self {
            project_name: "Data center upgrade".to_string(),
            product_names: vec!["Server".to_string(), "Switch".to_string()],
            industry: "IT equipment".to_string(),
            deviations: vec![],
            envelope: None,
        }
    }

    pub fn project_name(mut self, name: &str) -> Self {
        self.project_name = name.to_string();
        self
    }

    pub fn product_names(mut self, names: &[&str]) -> Self {
        self.product_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn deviation(mut self, requirement: &str, status: &str) -> Self {
        self.deviations.push(json!({
            "requirement": requirement,
            "our_solution": "as offered",
            "deviation_status": status,
            "impact_assessment": "none",
        }));
        self
    }

    pub fn success(mut self, success: bool, error: Option<&str>) -> Self {
        self.envelope = Some((success, error.map(str::to_string)));
        self
    }

    pub fn build(self) -> Value {
        let mut body = json!({
            "solution_overview": {
                "project_name": self.project_name,
                "solution_type": "Private cloud",
                "total_budget_estimate": "4.8 million CNY",
                "implementation_duration": "6 months",
            },
            "technical_solutions": [
                {
                    "solution_name": "Virtualized compute",
                    "match_score": "92%",
                    "advantages": ["Elastic capacity"],
                }
            ],
            "system_architecture": { "layers": [] },
            "implementation_plan": { "phases": [] },
            "deviation_table": self.deviations,
            "key_requirements": {
                "product_names": self.product_names,
                "tech_requirements": ["128GB memory"],
                "industry": self.industry,
                "budget_range": "5 million CNY",
            },
        });
        if let Some((success, error)) = self.envelope {
            let map = body.as_object_mut().unwrap();
            map.insert("success".to_string(), json!(success));
            if let Some(error) = error {
                map.insert("error".to_string(), json!(error));
            }
        }
        body
    }
}

/// Builder for `/api/find-suppliers` response bodies.
pub struct SupplierResponseBuilder {
    suppliers: Vec<Value>,
    total_found: Value,
    envelope: Option<(bool, Option<String>)>,
}

impl SupplierResponseBuilder {
    pub fn new() -> Self {
        Self {
            suppliers: vec![],
            total_found: json!(0),
            envelope: None,
        }
    }

    pub fn supplier(mut self, name: &str, rating: &str, score: impl Into<Value>) -> Self {
        self.suppliers.push(json!({
            "name": name,
            "credit_rating": rating,
            "total_score": score.into(),
            "description": "",
            "website": "",
            "contact_info": { "phone": "400-000-0000" },
            "past_projects": [],
        }));
        self
    }

    pub fn total_found(mut self, total: impl Into<Value>) -> Self {
        self.total_found = total.into();
        self
    }

    pub fn success(mut self, success: bool, error: Option<&str>) -> Self {
        self.envelope = Some((success, error.map(str::to_string)));
        self
    }

    pub fn build(self) -> Value {
        let mut body = json!({
            "total_found": self.total_found,
            "top_suppliers": self.suppliers,
        });
        if let Some((success, error)) = self.envelope {
            let map = body.as_object_mut().unwrap();
            map.insert("success".to_string(), json!(success));
            if let Some(error) = error {
                map.insert("error".to_string(), json!(error));
            }
        }
        body
    }
}

/// Builder for config file contents.
pub struct ConfigBuilder {
    version: String,
    api_base_url: String,
    request_timeout_secs: Option<Value>,
    max_size_mb: Option<Value>,
    allowed_extensions: Option<Vec<String>>,
    channel_capacity: Option<Value>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            version: "1.0".to_string(),
            api_base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: None,
            max_size_mb: None,
            allowed_extensions: None,
            channel_capacity: None,
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.to_string();
        self
    }

    pub fn request_timeout_secs(mut self, secs: impl Into<Value>) -> Self {
        self.request_timeout_secs = Some(secs.into());
        self
    }

    pub fn max_size_mb(mut self, mb: impl Into<Value>) -> Self {
        self.max_size_mb = Some(mb.into());
        self
    }

    pub fn allowed_extensions(mut self, extensions: &[&str]) -> Self {
        self.allowed_extensions = Some(extensions.iter().map(|e| e.to_string()).collect());
        self
    }

    pub fn channel_capacity(mut self, capacity: impl Into<Value>) -> Self {
        self.channel_capacity = Some(capacity.into());
        self
    }

    pub fn build(self) -> Value {
        let mut config = json!({
            "version": self.version,
            "api_base_url": self.api_base_url,
        });
        let map = config.as_object_mut().unwrap();
        if let Some(timeout) = self.request_timeout_secs {
            map.insert("request_timeout_secs".to_string(), timeout);
        }
        let mut upload = serde_json::Map::new();
        if let Some(mb) = self.max_size_mb {
            upload.insert("max_size_mb".to_string(), mb);
        }
        if let Some(extensions) = self.allowed_extensions {
            upload.insert("allowed_extensions".to_string(), json!(extensions));
        }
        if !upload.is_empty() {
            map.insert("upload".to_string(), Value::Object(upload));
        }
        if let Some(capacity) = self.channel_capacity {
            map.insert("notifications".to_string(), json!({ "channel_capacity": capacity }));
        }
        config
    }

    pub fn to_json(self) -> String {
        serde_json::to_string_pretty(&self.build()).unwrap()
    }
}
