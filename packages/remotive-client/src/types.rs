use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for a single listings search.
#[derive(Debug, Clone)]
pub struct JobSearch {
    pub search: String,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub timeout: Duration,
}

impl JobSearch {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            limit: None,
            category: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Query string pairs. Empty search, zero limit and absent category are omitted.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if !self.search.is_empty() {
            params.push(("search", self.search.clone()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            params.push(("limit", limit.to_string()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        params
    }
}

/// A single listing as returned by the API.
///
/// Values are kept loosely typed; normalization happens downstream.
/// `None` means the key was absent or JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawJob {
    pub id: Option<Value>,
    pub title: Option<Value>,
    pub company_name: Option<Value>,
    pub category: Option<Value>,
    pub job_type: Option<Value>,
    pub salary: Option<Value>,
    pub publication_date: Option<Value>,
    pub url: Option<Value>,
}

impl RawJob {
    /// Pick the known fields out of one element of the `jobs` array.
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).filter(|v| !v.is_null()).cloned();

        Self {
            id: field("id"),
            title: field("title"),
            company_name: field("company_name"),
            category: field("category"),
            job_type: field("job_type"),
            salary: field("salary"),
            publication_date: field("publication_date"),
            url: field("url"),
        }
    }
}
