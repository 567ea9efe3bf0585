use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::collector::{DEFAULT_OUTPUT, DEFAULT_SEEN_IDS, RunOptions, SeenIdPersistence};
use crate::fetch::DEFAULT_TIMEOUT;

/// Service configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub port: u16,
    pub output_path: PathBuf,
    pub seen_ids_path: PathBuf,
    pub page_delay: Duration,
    pub request_timeout: Duration,
    pub persist_seen_every_page: bool,
    pub respect_robots: bool,
}

impl Settings {
    /// Load configuration from the process environment and `.env`
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let flag = |key: &str| -> Result<bool> {
            match var(key) {
                None => Ok(false),
                Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                    "1" | "true" | "yes" | "on" => Ok(true),
                    "0" | "false" | "no" | "off" | "" => Ok(false),
                    other => anyhow::bail!("{key} must be a boolean, got {other:?}"),
                },
            }
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            output_path: var("JOBS_CSV")
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_string())
                .into(),
            seen_ids_path: var("SEEN_IDS_FILE")
                .unwrap_or_else(|| DEFAULT_SEEN_IDS.to_string())
                .into(),
            page_delay: match var("PAGE_DELAY_MS") {
                Some(v) => Duration::from_millis(
                    v.parse().context("PAGE_DELAY_MS must be milliseconds")?,
                ),
                None => crate::collector::DEFAULT_PAGE_DELAY,
            },
            request_timeout: match var("REQUEST_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(
                    v.parse().context("REQUEST_TIMEOUT_SECS must be seconds")?,
                ),
                None => DEFAULT_TIMEOUT,
            },
            persist_seen_every_page: flag("PERSIST_SEEN_EVERY_PAGE")?,
            respect_robots: flag("RESPECT_ROBOTS_TXT")?,
        })
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            output_path: self.output_path.clone(),
            seen_ids_path: self.seen_ids_path.clone(),
            page_delay: self.page_delay,
            persistence: if self.persist_seen_every_page {
                SeenIdPersistence::EveryPage
            } else {
                SeenIdPersistence::OnExit
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.port, 8080);
        assert_eq!(s.output_path, PathBuf::from("jobs.csv"));
        assert_eq!(s.seen_ids_path, PathBuf::from("existing-job-ids.txt"));
        assert_eq!(s.page_delay, Duration::from_millis(3000));
        assert_eq!(s.request_timeout, Duration::from_secs(25));
        assert!(!s.respect_robots);
        assert_eq!(s.run_options().persistence, SeenIdPersistence::OnExit);
    }

    #[test]
    fn overrides() {
        let s = settings(&[
            ("PORT", "9000"),
            ("JOBS_CSV", "/tmp/out.csv"),
            ("PAGE_DELAY_MS", "0"),
            ("PERSIST_SEEN_EVERY_PAGE", "true"),
            ("RESPECT_ROBOTS_TXT", "1"),
        ])
        .unwrap();
        assert_eq!(s.port, 9000);
        assert_eq!(s.output_path, PathBuf::from("/tmp/out.csv"));
        assert!(s.page_delay.is_zero());
        assert!(s.respect_robots);
        assert_eq!(s.run_options().persistence, SeenIdPersistence::EveryPage);
    }

    #[test]
    fn rejects_garbage() {
        assert!(settings(&[("PORT", "eighty")]).is_err());
        assert!(settings(&[("PAGE_DELAY_MS", "-1")]).is_err());
        assert!(settings(&[("RESPECT_ROBOTS_TXT", "maybe")]).is_err());
    }
}
