//! The paging loop: fetch, extract, drop already-seen listings, write the
//! rest, advance.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::FetchError;
use crate::extract::JobExtractor;
use crate::fetch::PageFetcher;
use crate::output::JobCsvWriter;
use crate::query::{PAGE_SIZE, Query};
use crate::record::JobRecord;
use crate::seen::SeenIds;

pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(3000);
pub const DEFAULT_OUTPUT: &str = "jobs.csv";
pub const DEFAULT_SEEN_IDS: &str = "existing-job-ids.txt";

/// When the seen-id file is rewritten.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeenIdPersistence {
    /// Once, when the run ends.
    #[default]
    OnExit,
    /// After every page that wrote records, and again at the end.
    EveryPage,
}

#[derive(Clone, Debug)]
pub struct RunOptions {
    pub output_path: PathBuf,
    pub seen_ids_path: PathBuf,
    /// Pause before every fetch after the first.
    pub page_delay: Duration,
    pub persistence: SeenIdPersistence,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            seen_ids_path: PathBuf::from(DEFAULT_SEEN_IDS),
            page_delay: DEFAULT_PAGE_DELAY,
            persistence: SeenIdPersistence::default(),
        }
    }
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The configured limit was met before another page was requested.
    LimitReached,
    /// A page came back without listings.
    Exhausted,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Records written during this run, in write order.
    pub added: Vec<JobRecord>,
    pub pages_fetched: usize,
    /// Offset the next page would have been requested at.
    pub next_offset: u32,
}

/// Progress notices, mirrored to an optional channel.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunEvent {
    Started {
        known_ids: usize,
    },
    PageFetched {
        offset: u32,
        url: String,
        listings: usize,
        new: usize,
    },
    DuplicatesSkipped {
        offset: u32,
    },
    JobsAdded {
        offset: u32,
        jobs: Vec<JobRecord>,
        total_added: usize,
    },
    Finished {
        outcome: RunOutcome,
        total_added: usize,
        pages_fetched: usize,
    },
    Failed {
        error: String,
    },
}

impl RunEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RunEvent::Started { .. } => "start",
            RunEvent::PageFetched { .. } => "page",
            RunEvent::DuplicatesSkipped { .. } => "skip",
            RunEvent::JobsAdded { .. } => "jobs",
            RunEvent::Finished { .. } => "done",
            RunEvent::Failed { .. } => "error",
        }
    }
}

pub struct JobCollector {
    fetcher: Arc<dyn PageFetcher>,
    extractor: JobExtractor,
    options: RunOptions,
    events: Option<mpsc::Sender<RunEvent>>,
}

struct Progress {
    offset: u32,
    pages_fetched: usize,
    added: Vec<JobRecord>,
}

impl JobCollector {
    pub fn new(fetcher: Arc<dyn PageFetcher>, options: RunOptions) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher,
            extractor: JobExtractor::new()?,
            options,
            events: None,
        })
    }

    pub fn with_events(mut self, tx: mpsc::Sender<RunEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    async fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.events {
            // a gone receiver must not stop the run
            let _ = tx.send(event).await;
        }
    }

    /// Runs `query` until the limit is met or the provider runs out of
    /// listings.
    ///
    /// On error the rows already written stay in the output and their keys are
    /// still saved to the seen-id file before the error is returned.
    pub async fn run(&self, query: &Query) -> Result<RunReport, FetchError> {
        info!(
            keyword = %query.keyword,
            location = %query.location,
            limit = query.limit,
            "Fetching jobs..."
        );
        let result = self.run_inner(query).await;
        match &result {
            Ok(report) => {
                info!(
                    outcome = ?report.outcome,
                    pages = report.pages_fetched,
                    "Total new jobs added: {}",
                    report.added.len()
                );
                self.emit(RunEvent::Finished {
                    outcome: report.outcome,
                    total_added: report.added.len(),
                    pages_fetched: report.pages_fetched,
                })
                .await;
            }
            Err(e) => {
                error!(error = %e, "job collection aborted");
                self.emit(RunEvent::Failed {
                    error: e.to_string(),
                })
                .await;
            }
        }
        result
    }

    async fn run_inner(&self, query: &Query) -> Result<RunReport, FetchError> {
        let mut seen = SeenIds::load(&self.options.seen_ids_path)?;
        let mut writer = JobCsvWriter::open(&self.options.output_path)?;
        self.emit(RunEvent::Started {
            known_ids: seen.len(),
        })
        .await;

        let mut progress = Progress {
            offset: 0,
            pages_fetched: 0,
            added: Vec::new(),
        };
        let driven = self
            .drive(query, &mut seen, &mut writer, &mut progress)
            .await;

        let flushed = writer.flush();
        let saved = seen.save();
        let outcome = match driven {
            Ok(outcome) => outcome,
            Err(e) => {
                if let Err(save_err) = flushed.and(saved) {
                    error!(error = %save_err, "could not persist progress after failure");
                }
                return Err(e);
            }
        };
        flushed?;
        saved?;

        Ok(RunReport {
            outcome,
            added: progress.added,
            pages_fetched: progress.pages_fetched,
            next_offset: progress.offset,
        })
    }

    async fn drive(
        &self,
        query: &Query,
        seen: &mut SeenIds,
        writer: &mut JobCsvWriter,
        progress: &mut Progress,
    ) -> Result<RunOutcome, FetchError> {
        let limit = query.limit();
        loop {
            if limit.is_some_and(|l| progress.added.len() >= l) {
                return Ok(RunOutcome::LimitReached);
            }

            if progress.pages_fetched > 0 && !self.options.page_delay.is_zero() {
                sleep(self.options.page_delay).await;
            }

            let url = query.search_url(progress.offset)?;
            debug!(offset = progress.offset, %url, "fetching page");
            let body = self.fetcher.fetch(&url).await?;
            progress.pages_fetched += 1;

            let listings = self.extractor.extract(&body);
            if listings.is_empty() {
                self.emit(RunEvent::PageFetched {
                    offset: progress.offset,
                    url: url.to_string(),
                    listings: 0,
                    new: 0,
                })
                .await;
                return Ok(RunOutcome::Exhausted);
            }

            let listed = listings.len();
            let mut page_keys = HashSet::new();
            let fresh: Vec<JobRecord> = listings
                .into_iter()
                .filter(|job| {
                    let key = job.dedup_key();
                    !seen.contains(&key) && page_keys.insert(key)
                })
                .collect();

            self.emit(RunEvent::PageFetched {
                offset: progress.offset,
                url: url.to_string(),
                listings: listed,
                new: fresh.len(),
            })
            .await;

            if fresh.is_empty() {
                info!(offset = progress.offset, "Skipping duplicate jobs...");
                self.emit(RunEvent::DuplicatesSkipped {
                    offset: progress.offset,
                })
                .await;
                progress.offset += PAGE_SIZE;
                continue;
            }

            let room = limit
                .map(|l| l - progress.added.len())
                .unwrap_or(fresh.len());
            let accepted: Vec<JobRecord> = fresh.into_iter().take(room).collect();

            info!(offset = progress.offset, "Adding {} new jobs...", accepted.len());
            for job in &accepted {
                writer.write(job)?;
                seen.insert(job.dedup_key());
            }
            writer.flush()?;
            if self.options.persistence == SeenIdPersistence::EveryPage {
                seen.save()?;
            }

            progress.added.extend(accepted.iter().cloned());
            self.emit(RunEvent::JobsAdded {
                offset: progress.offset,
                jobs: accepted,
                total_added: progress.added.len(),
            })
            .await;
            progress.offset += PAGE_SIZE;
        }
    }
}

/// Builds a collector over `fetcher` and runs `query` once.
pub async fn collect_jobs(
    fetcher: Arc<dyn PageFetcher>,
    query: &Query,
    options: RunOptions,
) -> Result<RunReport, FetchError> {
    JobCollector::new(fetcher, options)?.run(query).await
}
