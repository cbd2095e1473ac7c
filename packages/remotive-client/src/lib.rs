//! Pure Remotive REST API client.
//!
//! A minimal client for the public Remotive remote-jobs listing endpoint.
//! One call, one `GET`, no retries: callers decide what a failed fetch means.
//!
//! # Example
//!
//! ```rust,ignore
//! use remotive_client::{JobSearch, RemotiveClient};
//!
//! let client = RemotiveClient::new();
//!
//! let jobs = client.fetch_jobs(&JobSearch::new("python").with_limit(5)).await?;
//! for job in &jobs {
//!     println!("{:?}", job.title);
//! }
//! ```

pub mod error;
#[cfg(feature = "stub")]
pub mod stub;
pub mod types;

pub use error::{RemotiveError, Result};
pub use types::{JobSearch, RawJob};

use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://remotive.com/api/remote-jobs";

#[derive(Debug, Clone)]
pub struct RemotiveClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for RemotiveClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RemotiveClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at another listings endpoint (mirror, local stub).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one search and return the raw listings, at most `search.limit` of them.
    pub async fn fetch_jobs(&self, search: &JobSearch) -> Result<Vec<RawJob>> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&search.query_params())
            .timeout(search.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemotiveError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let mut jobs = parse_jobs(&body)?;
        if let Some(limit) = search.limit.filter(|l| *l > 0) {
            jobs.truncate(limit as usize);
        }
        tracing::info!(search = %search.search, count = jobs.len(), "Fetched job listings");

        Ok(jobs)
    }
}

/// Extract listings from a response body shaped like `{"jobs": [...]}`.
pub fn parse_jobs(body: &str) -> Result<Vec<RawJob>> {
    let data: Value = serde_json::from_str(body)
        .map_err(|e| RemotiveError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let jobs = data
        .get("jobs")
        .and_then(Value::as_array)
        .ok_or_else(|| RemotiveError::MalformedResponse("no jobs found".to_string()))?;

    Ok(jobs.iter().map(RawJob::from_value).collect())
}
