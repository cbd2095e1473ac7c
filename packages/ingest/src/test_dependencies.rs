// Mock collaborators for exercising the runner without network or database
//
// MockJobSource answers searches from a script keyed by term.
// MockPostingSink keeps postings in memory with the same insert-or-ignore,
// all-or-nothing semantics as the Postgres loader.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use remotive_client::{JobSearch, RawJob, RemotiveError};

use crate::error::LoadError;
use crate::loader::LoadReport;
use crate::posting::Posting;
use crate::traits::{BaseJobSource, BasePostingSink};

// =============================================================================
// Mock Job Source
// =============================================================================

/// Scripted outcome for one search term.
#[derive(Debug, Clone)]
pub enum MockFetch {
    Jobs(Vec<RawJob>),
    /// Non-2xx answer, reported as a fetch failure
    Unavailable,
    /// 2xx answer without a `jobs` array
    Malformed,
}

#[derive(Clone, Default)]
pub struct MockJobSource {
    responses: Arc<Mutex<HashMap<String, MockFetch>>>,
    calls: Arc<Mutex<Vec<JobSearch>>>,
}

impl MockJobSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, term: &str, response: MockFetch) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(term.to_string(), response);
        self
    }

    /// Searches received so far, in order.
    pub fn calls(&self) -> Vec<JobSearch> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searched_terms(&self) -> Vec<String> {
        self.calls().into_iter().map(|s| s.search).collect()
    }
}

#[async_trait]
impl BaseJobSource for MockJobSource {
    async fn fetch(&self, search: &JobSearch) -> Result<Vec<RawJob>, RemotiveError> {
        self.calls.lock().unwrap().push(search.clone());

        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&search.search)
            .cloned()
            .unwrap_or(MockFetch::Jobs(Vec::new()));

        match response {
            MockFetch::Jobs(jobs) => {
                let limit = search.limit.filter(|l| *l > 0).map(|l| l as usize).unwrap_or(usize::MAX);
                Ok(jobs.into_iter().take(limit).collect())
            }
            MockFetch::Unavailable => Err(RemotiveError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            }),
            MockFetch::Malformed => Err(RemotiveError::MalformedResponse(
                "no jobs found".to_string(),
            )),
        }
    }
}

// =============================================================================
// Mock Posting Sink
// =============================================================================

#[derive(Clone, Default)]
pub struct MockPostingSink {
    rows: Arc<Mutex<BTreeMap<i32, Posting>>>,
    fail_on_id: Arc<Mutex<Option<i32>>>,
    batches: Arc<Mutex<usize>>,
}

impl MockPostingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any batch containing this id fail and roll back.
    pub fn failing_on(self, id: i32) -> Self {
        *self.fail_on_id.lock().unwrap() = Some(id);
        self
    }

    pub fn rows(&self) -> Vec<Posting> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    pub fn batches(&self) -> usize {
        *self.batches.lock().unwrap()
    }
}

#[async_trait]
impl BasePostingSink for MockPostingSink {
    async fn load(&self, postings: &[Posting]) -> Result<LoadReport, LoadError> {
        *self.batches.lock().unwrap() += 1;
        let fail_on = *self.fail_on_id.lock().unwrap();

        // Stage into a copy so a failure leaves the table untouched.
        let mut staged = self.rows.lock().unwrap().clone();
        let mut inserted = 0;
        for (row, posting) in postings.iter().enumerate() {
            if Some(posting.id) == fail_on {
                return Err(LoadError::Insert {
                    row,
                    id: posting.id,
                    source: sqlx::Error::Protocol("injected insert failure".to_string()),
                });
            }
            if !staged.contains_key(&posting.id) {
                staged.insert(posting.id, posting.clone());
                inserted += 1;
            }
        }

        *self.rows.lock().unwrap() = staged;
        Ok(LoadReport {
            attempted: postings.len(),
            inserted,
            skipped: postings.len() - inserted,
        })
    }
}
