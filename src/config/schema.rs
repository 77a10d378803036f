//! Mock file schema definitions.
//!
//! This module defines the structure of a mock file.
//! All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

use crate::error::MockError;
use crate::mock::{MockResponse, MockResponses, RequestPredicate, TargetRule};
use crate::routing::MockRouter;

/// Root of a mock file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MockFile {
    /// Logging settings.
    pub settings: Settings,

    /// Mocked routes, tried in file order.
    pub mocks: Vec<MockConfig>,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// One mocked route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MockConfig {
    /// Route template (e.g., "/users/:id").
    pub route: String,

    /// Candidate answers, in priority order.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// One target rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    /// Request predicate; absent means catch-all.
    #[serde(default)]
    pub request: Option<RequestConfig>,

    /// Response fragment. Checked only when the target is selected.
    pub response: serde_json::Value,
}

/// Request predicate.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestConfig {
    /// One method or a list of methods.
    pub method: Option<OneOrMany>,

    /// Content type the request must accept (e.g., "json", "text/html").
    pub accepts: Option<String>,
}

/// A single value or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value.clone()],
            OneOrMany::Many(values) => values.clone(),
        }
    }
}

impl RequestConfig {
    fn to_predicate(&self) -> RequestPredicate {
        // Methods are checked in validation; anything left unparsable is skipped.
        let methods = self.method.as_ref().map(|m| {
            m.to_vec()
                .iter()
                .filter_map(|name| name.parse().ok())
                .collect()
        });
        RequestPredicate {
            methods,
            accepts: self.accepts.clone(),
        }
    }
}

impl TargetConfig {
    pub fn to_rule(&self) -> TargetRule {
        TargetRule::with_request(
            self.request.as_ref().map(RequestConfig::to_predicate),
            MockResponse::from_value(self.response.clone()),
        )
    }
}

impl MockConfig {
    pub fn build(&self) -> Result<MockResponses, MockError> {
        let rules: Vec<TargetRule> = self.targets.iter().map(TargetConfig::to_rule).collect();
        MockResponses::new(&self.route, rules)
    }
}

impl MockFile {
    /// Build every mock, in file order.
    pub fn build(&self) -> Result<Vec<MockResponses>, MockError> {
        self.mocks.iter().map(MockConfig::build).collect()
    }

    /// Build every mock into one chain.
    pub fn build_router(&self) -> Result<MockRouter, MockError> {
        self.build().map(MockRouter::new)
    }
}
