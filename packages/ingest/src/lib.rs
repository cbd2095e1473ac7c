// Remote job postings ingester - core
//
// Pulls listings from the Remotive API per search term, normalizes them into
// postings, and stores them in Postgres with insert-or-ignore semantics.
// Binaries in src/bin drive a single term, the scheduled run, or a read-back.

pub mod config;
pub mod error;
pub mod loader;
pub mod posting;
pub mod runner;
pub mod scheduler;
pub mod test_dependencies;
pub mod traits;
pub mod transform;

pub use config::*;
pub use error::{DateParseError, LoadError};
pub use loader::{LoadReport, PostgresLoader};
pub use posting::{JobTypeCount, Posting};
pub use runner::{RunReport, Runner, RunnerConfig, Stage, TermReport, TermStatus};
pub use scheduler::{IngestScheduler, RunMode};
pub use traits::{BaseJobSource, BasePostingSink};
pub use transform::{transform, NormalizedJob, TransformedBatch};
