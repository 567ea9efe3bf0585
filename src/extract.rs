//! Turns one page of search markup into [`JobRecord`]s.
//!
//! Every `<li>` is a candidate listing. Fields are looked up independently and
//! fall back to an empty string, so a sparse card still produces a record.

use scraper::{ElementRef, Html, Selector};
use time::Date;
use time::macros::format_description;

use crate::error::ExtractError;
use crate::record::JobRecord;

const LISTING: &str = "li";
const CARD: &str = "div.base-card";
const TITLE: &str = ".base-search-card__title";
const SUBTITLE: &str = ".base-search-card__subtitle";
const LOCATION: &str = ".job-search-card__location";
const POSTED: &str = "time";
const SALARY: &str = ".job-search-card__salary-info";
const LINK: &str = ".base-card__full-link";

const ENTITY_URN_ATTR: &str = "data-entity-urn";
const TRACKING_PARAMS: &[&str] = &["refId", "trackingId"];

/// Compiled selectors for the guest search listing cards.
#[derive(Debug)]
pub struct JobExtractor {
    listing: Selector,
    card: Selector,
    title: Selector,
    subtitle: Selector,
    location: Selector,
    posted: Selector,
    salary: Selector,
    link: Selector,
}

fn compile(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css,
        reason: e.to_string(),
    })
}

impl JobExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            listing: compile(LISTING)?,
            card: compile(CARD)?,
            title: compile(TITLE)?,
            subtitle: compile(SUBTITLE)?,
            location: compile(LOCATION)?,
            posted: compile(POSTED)?,
            salary: compile(SALARY)?,
            link: compile(LINK)?,
        })
    }

    /// Records in the order their listings appear in `html`.
    pub fn extract(&self, html: &str) -> Vec<JobRecord> {
        let doc = Html::parse_document(html);
        doc.select(&self.listing)
            .map(|li| self.parse_listing(&li))
            .collect()
    }

    fn parse_listing(&self, li: &ElementRef) -> JobRecord {
        let job_id = li
            .select(&self.card)
            .next()
            .and_then(|card| card.value().attr(ENTITY_URN_ATTR))
            .and_then(|urn| urn.rsplit(':').next())
            .unwrap_or_default()
            .to_string();

        let date = li
            .select(&self.posted)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .map(iso_date)
            .unwrap_or_default();

        let salary: String = text_of(li, &self.salary)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let job_url = li
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| strip_tracking(href).to_string())
            .unwrap_or_default();

        JobRecord {
            job_id,
            position: text_of(li, &self.title),
            company: text_of(li, &self.subtitle),
            location: text_of(li, &self.location),
            date,
            salary,
            job_url,
        }
    }
}

/// Convenience for one-off parsing; builds the selectors on every call.
pub fn parse_job_list(html: &str) -> Result<Vec<JobRecord>, ExtractError> {
    Ok(JobExtractor::new()?.extract(html))
}

fn text_of(scope: &ElementRef, sel: &Selector) -> String {
    scope
        .select(sel)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Keeps a calendar date, or the date part of a timestamp; anything else is
/// dropped.
fn iso_date(raw: &str) -> String {
    let raw = raw.trim();
    let Some(head) = raw.get(..10) else {
        return String::new();
    };
    let rest = &raw[10..];
    if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
        return String::new();
    }
    match Date::parse(head, format_description!("[year]-[month]-[day]")) {
        Ok(_) => head.to_string(),
        Err(_) => String::new(),
    }
}

fn strip_tracking(href: &str) -> &str {
    let cut = TRACKING_PARAMS
        .iter()
        .flat_map(|p| [format!("?{p}"), format!("&{p}")])
        .filter_map(|needle| href.find(&needle))
        .min()
        .unwrap_or(href.len());
    &href[..cut]
}
