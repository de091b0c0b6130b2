//! HTTP offset/limit fetcher
//!
//! Pages through a JSON API by sending offset and limit query parameters and
//! pulling the record array out of each response body.

use super::types::PageFetcher;
use crate::error::{Error, Result};
use crate::source::{validate_source, SourceDefinition};
use crate::types::PageRequest;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Fetches pages from an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    url: Url,
    offset_param: String,
    limit_param: String,
    records_path: String,
    params: HashMap<String, String>,
    headers: HashMap<String, String>,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher for the given URL with default parameter names
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("pageflow/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: Url::parse(url)?,
            offset_param: "offset".to_string(),
            limit_param: "limit".to_string(),
            records_path: String::new(),
            params: HashMap::new(),
            headers: HashMap::new(),
            timeout: Duration::from_secs(30),
        })
    }

    /// Create a fetcher from a validated source definition
    pub fn from_source(def: &SourceDefinition) -> Result<Self> {
        validate_source(def)?;

        let mut fetcher = Self::new(&def.url())?
            .with_offset_param(&def.offset_param)
            .with_limit_param(&def.limit_param)
            .with_records_path(&def.records_path)
            .with_timeout(def.timeout());
        fetcher.params.clone_from(&def.params);
        fetcher.headers.clone_from(&def.headers);
        Ok(fetcher)
    }

    /// Set the offset query parameter name
    #[must_use]
    pub fn with_offset_param(mut self, name: impl Into<String>) -> Self {
        self.offset_param = name.into();
        self
    }

    /// Set the limit query parameter name
    #[must_use]
    pub fn with_limit_param(mut self, name: impl Into<String>) -> Self {
        self.limit_param = name.into();
        self
    }

    /// Set the dot path to the record array
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = path.into();
        self
    }

    /// Add a query parameter sent with every request
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a header sent with every request
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Target URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch one page as raw JSON records
    pub async fn fetch_values(&self, request: PageRequest) -> Result<Vec<Value>> {
        let mut query: Vec<(&str, String)> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        query.push((self.offset_param.as_str(), request.offset.to_string()));
        query.push((self.limit_param.as_str(), request.limit.to_string()));

        let mut req = self
            .client
            .get(self.url.clone())
            .query(&query)
            .timeout(self.timeout);
        for (key, value) in &self.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        debug!("Fetching {} ({})", self.url, request);
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Page request failed with {}: {}", status.as_u16(), self.url);
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body_text = response.text().await?;
        let body: Value = serde_json::from_str(&body_text)?;
        let records = extract_records(&body, &self.records_path)?;

        debug!("Fetched {} records at offset {}", records.len(), request.offset);
        Ok(records)
    }
}

#[async_trait]
impl<T> PageFetcher<T> for HttpFetcher
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, request: PageRequest) -> Result<Vec<T>> {
        self.fetch_values(request)
            .await?
            .into_iter()
            .map(|record| serde_json::from_value(record).map_err(Error::from))
            .collect()
    }
}

/// Pull the record array out of a response body
///
/// Accepts `data.items` or `$.data.items`. An empty path means the body is
/// the array itself; a `null` at the path counts as an empty page.
pub(crate) fn extract_records(body: &Value, path: &str) -> Result<Vec<Value>> {
    let trimmed = path.trim_start_matches('$').trim_start_matches('.');

    let mut current = body;
    if !trimmed.is_empty() {
        for part in trimmed.split('.') {
            current = match current {
                Value::Object(map) => map
                    .get(part)
                    .ok_or_else(|| Error::record_extraction(path, format!("missing '{part}'")))?,
                _ => {
                    return Err(Error::record_extraction(
                        path,
                        format!("cannot descend into '{part}'"),
                    ))
                }
            };
        }
    }

    match current {
        Value::Array(records) => Ok(records.clone()),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::record_extraction(
            path,
            format!("expected an array, found {}", json_type_name(other)),
        )),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
