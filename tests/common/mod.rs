#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use jobtrawl::{PageFetcher, RunOptions, SeenIdPersistence, TransportError};
use tempfile::TempDir;
use url::Url;

/// Serves canned pages keyed by the `start` offset; unknown offsets get an
/// empty page. Offsets listed in `fail_at` answer with a 429.
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: HashMap<u32, String>,
    fail_at: Vec<u32>,
    requested: Mutex<Vec<Url>>,
    watch: Option<(u32, PathBuf)>,
    observed: Mutex<Option<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, offset: u32, ids: &[&str]) -> Self {
        self.pages.insert(offset, listing_page(ids));
        self
    }

    pub fn raw(mut self, offset: u32, html: &str) -> Self {
        self.pages.insert(offset, html.to_string());
        self
    }

    pub fn fail_at(mut self, offset: u32) -> Self {
        self.fail_at.push(offset);
        self
    }

    /// Reads `path` when the page at `offset` is requested.
    pub fn watch_file_at(mut self, offset: u32, path: PathBuf) -> Self {
        self.watch = Some((offset, path));
        self
    }

    /// Contents of the watched file at request time; `""` if it was missing.
    pub fn observed(&self) -> Option<String> {
        self.observed.lock().unwrap().clone()
    }

    pub fn offsets(&self) -> Vec<u32> {
        self.requested
            .lock()
            .unwrap()
            .iter()
            .map(offset_of)
            .collect()
    }
}

fn offset_of(url: &Url) -> u32 {
    url.query_pairs()
        .find(|(k, _)| k == "start")
        .and_then(|(_, v)| v.parse().ok())
        .expect("every search url carries start")
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, TransportError> {
        self.requested.lock().unwrap().push(url.clone());
        let offset = offset_of(url);
        if let Some((at, path)) = &self.watch {
            if *at == offset {
                let text = std::fs::read_to_string(path).unwrap_or_default();
                *self.observed.lock().unwrap() = Some(text);
            }
        }
        if self.fail_at.contains(&offset) {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: 429,
            });
        }
        Ok(self.pages.get(&offset).cloned().unwrap_or_default())
    }
}

pub fn listing_page(ids: &[&str]) -> String {
    let items: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<li>
  <div class="base-card" data-entity-urn="urn:li:jobPosting:{id}">
    <a class="base-card__full-link" href="https://www.linkedin.com/jobs/view/job-{id}?refId=r{id}"></a>
    <h3 class="base-search-card__title">Job {id}</h3>
    <h4 class="base-search-card__subtitle">Company {id}</h4>
    <span class="job-search-card__location">Remote</span>
    <time datetime="2024-05-01">1 day ago</time>
  </div>
</li>"#
            )
        })
        .collect();
    format!("<!DOCTYPE html><html><body><ul>{items}</ul></body></html>")
}

pub fn ids(range: std::ops::Range<u32>) -> Vec<String> {
    range.map(|n| format!("{}", 4_000_000_000u64 + n as u64)).collect()
}

pub fn as_refs(ids: &[String]) -> Vec<&str> {
    ids.iter().map(String::as_str).collect()
}

pub fn options(dir: &TempDir) -> RunOptions {
    RunOptions {
        output_path: dir.path().join("jobs.csv"),
        seen_ids_path: dir.path().join("existing-job-ids.txt"),
        page_delay: Duration::ZERO,
        persistence: SeenIdPersistence::OnExit,
    }
}

/// Data rows of the output, header excluded.
pub fn csv_ids(dir: &TempDir) -> Vec<String> {
    let path = dir.path().join("jobs.csv");
    if !path.exists() {
        return Vec::new();
    }
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.records()
        .map(|r| r.unwrap().get(0).unwrap().to_string())
        .collect()
}

pub fn seen_file(dir: &TempDir) -> Vec<String> {
    let path = dir.path().join("existing-job-ids.txt");
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
