//! Raw listing → [`Posting`] normalization.
//!
//! Field rules, in order:
//! 1. `publication_date`: first 11 characters parsed as `YYYY-MM-DD`;
//!    anything else becomes `None` and the row is kept.
//! 2. Text fields are coerced to strings. A missing `salary` becomes `""`,
//!    other missing text fields stay `None`.
//! 3. Rows still missing a `NOT NULL` column (`id`, `title`, `company_name`,
//!    `job_type`, `url`) are dropped and counted.

use chrono::NaiveDate;
use remotive_client::RawJob;
use serde_json::Value;

use crate::error::DateParseError;
use crate::posting::Posting;

/// Length of the `YYYY-MM-DDT` prefix of an upstream timestamp.
const DATE_PREFIX_LEN: usize = 11;

/// A listing with corrected types but not yet checked for completeness.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedJob {
    pub id: Option<i32>,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub category: Option<String>,
    pub job_type: Option<String>,
    pub salary: String,
    pub publication_date: Option<NaiveDate>,
    pub url: Option<String>,
}

/// Output of [`transform`] for one batch.
#[derive(Debug, Clone, Default)]
pub struct TransformedBatch {
    pub postings: Vec<Posting>,
    pub dropped: usize,
}

impl NormalizedJob {
    pub fn from_raw(raw: &RawJob) -> Self {
        let publication_date = raw.publication_date.as_ref().and_then(|value| {
            let text = coerce_text(value);
            match parse_publication_date(&text) {
                Ok(date) => Some(date),
                Err(e) => {
                    tracing::debug!(error = %e, "Publication date replaced with missing marker");
                    None
                }
            }
        });

        Self {
            id: raw.id.as_ref().and_then(coerce_id),
            title: raw.title.as_ref().map(coerce_text),
            company_name: raw.company_name.as_ref().map(coerce_text),
            category: raw.category.as_ref().map(coerce_text),
            job_type: raw.job_type.as_ref().map(coerce_text),
            salary: raw.salary.as_ref().map(coerce_text).unwrap_or_default(),
            publication_date,
            url: raw.url.as_ref().map(coerce_text),
        }
    }

    /// `None` if any `NOT NULL` column is missing.
    pub fn into_posting(self) -> Option<Posting> {
        Some(Posting {
            id: self.id?,
            title: self.title?,
            company_name: self.company_name?,
            category: self.category,
            job_type: self.job_type?,
            salary: self.salary,
            publication_date: self.publication_date,
            url: self.url?,
        })
    }
}

/// Normalize a fetched batch, dropping rows that cannot satisfy the table schema.
pub fn transform(raw: &[RawJob]) -> TransformedBatch {
    let mut batch = TransformedBatch::default();

    for job in raw {
        let normalized = NormalizedJob::from_raw(job);
        let id = normalized.id;
        match normalized.into_posting() {
            Some(posting) => batch.postings.push(posting),
            None => {
                tracing::debug!(id = ?id, "Dropping listing with missing required fields");
                batch.dropped += 1;
            }
        }
    }

    tracing::info!(
        rows = batch.postings.len(),
        dropped = batch.dropped,
        "Listings cleaned"
    );
    batch
}

/// Parse the date part of an upstream timestamp such as `2024-05-01T10:00:00`.
pub fn parse_publication_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let prefix: String = raw.chars().take(DATE_PREFIX_LEN).collect();
    let date = prefix.trim().trim_end_matches('T');

    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| DateParseError {
        raw: raw.to_string(),
    })
}

/// String form of a loosely typed value. Strings are taken verbatim.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Integer ids arrive as numbers, occasionally as numeric strings.
fn coerce_id(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|id| i32::try_from(id).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
