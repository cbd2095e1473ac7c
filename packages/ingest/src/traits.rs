// Trait definitions for the runner's collaborators
//
// These are INFRASTRUCTURE traits only: where listings come from and where
// postings go. Pipeline logic lives in the runner.
//
// Naming convention: Base* for trait names (e.g., BaseJobSource)

use async_trait::async_trait;
use remotive_client::{JobSearch, RawJob, RemotiveClient, RemotiveError};

use crate::error::LoadError;
use crate::loader::{LoadReport, PostgresLoader};
use crate::posting::Posting;

// =============================================================================
// Job Source (listing API)
// =============================================================================

#[async_trait]
pub trait BaseJobSource: Send + Sync {
    /// Run one search. No retries.
    async fn fetch(&self, search: &JobSearch) -> Result<Vec<RawJob>, RemotiveError>;
}

#[async_trait]
impl BaseJobSource for RemotiveClient {
    async fn fetch(&self, search: &JobSearch) -> Result<Vec<RawJob>, RemotiveError> {
        self.fetch_jobs(search).await
    }
}

// =============================================================================
// Posting Sink (storage)
// =============================================================================

#[async_trait]
pub trait BasePostingSink: Send + Sync {
    /// Store a batch all-or-nothing, ignoring ids already present.
    async fn load(&self, postings: &[Posting]) -> Result<LoadReport, LoadError>;
}

#[async_trait]
impl BasePostingSink for PostgresLoader {
    async fn load(&self, postings: &[Posting]) -> Result<LoadReport, LoadError> {
        PostgresLoader::load(self, postings).await
    }
}
