//! Paginated job search collection: build the search URL, fetch each page,
//! extract listings, skip the ones seen in earlier runs, append the rest to a
//! CSV file.

pub mod collector;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod query;
mod record;
pub mod seen;
pub mod server;
pub mod terms;

pub use collector::{
    JobCollector, RunEvent, RunOptions, RunOutcome, RunReport, SeenIdPersistence, collect_jobs,
};
pub use config::Settings;
pub use error::{ExtractError, FetchError, StorageError, TransportError};
pub use extract::{JobExtractor, parse_job_list};
pub use fetch::{HttpFetcher, PageFetcher};
pub use output::JobCsvWriter;
pub use query::{PAGE_SIZE, Query};
pub use record::JobRecord;
pub use seen::SeenIds;
pub use terms::{TermCategory, translate};
