//! Source definition types
//!
//! Declarative HTTP page source definitions for YAML parsing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// HTTP endpoint that serves pages through offset/limit query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceDefinition {
    /// Source name
    pub name: String,
    /// Base URL for all requests
    pub base_url: String,
    /// URL path appended to the base URL
    #[serde(default)]
    pub path: String,
    /// Query parameter carrying the offset
    #[serde(default = "default_offset_param")]
    pub offset_param: String,
    /// Query parameter carrying the page size
    #[serde(default = "default_limit_param")]
    pub limit_param: String,
    /// Dot path to the record array (empty = the body is the array)
    #[serde(default)]
    pub records_path: String,
    /// Page size override for controllers built from this source
    #[serde(default)]
    pub page_size: Option<usize>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Extra query parameters sent with every request
    #[serde(default)]
    pub params: HashMap<String, String>,
    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_offset_param() -> String {
    "offset".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl SourceDefinition {
    /// Create a definition with defaults for everything but name and URL
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            path: String::new(),
            offset_param: default_offset_param(),
            limit_param: default_limit_param(),
            records_path: String::new(),
            page_size: None,
            timeout_seconds: default_timeout_seconds(),
            params: HashMap::new(),
            headers: HashMap::new(),
        }
    }

    /// Full request URL (base URL joined with path)
    pub fn url(&self) -> String {
        if self.path.is_empty() {
            return self.base_url.clone();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
