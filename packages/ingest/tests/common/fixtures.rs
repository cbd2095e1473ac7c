//! Test fixtures for building postings and raw listings.

#![allow(dead_code)]

use chrono::NaiveDate;
use ingest_core::Posting;
use remotive_client::RawJob;
use serde_json::json;

/// A complete posting with a deterministic title and url.
pub fn posting(id: i32) -> Posting {
    Posting {
        id,
        title: format!("Senior Python Developer #{}", id),
        company_name: "Acme Remote".to_string(),
        category: Some("Software Development".to_string()),
        job_type: "full_time".to_string(),
        salary: "$100k - $120k".to_string(),
        publication_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        url: format!("https://remotive.com/remote-jobs/software-dev/{}", id),
    }
}

/// A raw listing as the API would return it.
pub fn raw_job(id: i32) -> RawJob {
    RawJob {
        id: Some(json!(id)),
        title: Some(json!(format!("Data Engineer #{}", id))),
        company_name: Some(json!("Acme Remote")),
        category: Some(json!("Data")),
        job_type: Some(json!("contract")),
        salary: Some(json!("$90k")),
        publication_date: Some(json!("2024-05-01T10:00:00Z")),
        url: Some(json!(format!("https://remotive.com/remote-jobs/data/{}", id))),
    }
}
