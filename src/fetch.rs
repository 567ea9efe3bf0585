//! Page transport: `fetch(url) -> body`.

use std::time::Duration;

use async_trait::async_trait;
use rand::{Rng, rng};
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, DNT, HeaderMap, HeaderName, HeaderValue, PRAGMA,
    REFERER, UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use robotstxt::DefaultMatcher;
use tracing::{debug, warn};
use url::Url;

use crate::error::TransportError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Raw body of one page.
    async fn fetch(&self, url: &Url) -> Result<String, TransportError>;
}

/// `reqwest`-backed fetcher that looks like a desktop browser.
pub struct HttpFetcher {
    client: reqwest::Client,
    respect_robots: bool,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(8))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            respect_robots: false,
        })
    }

    /// Refuse URLs the host's robots.txt disallows.
    pub fn respect_robots(mut self, yes: bool) -> Self {
        self.respect_robots = yes;
        self
    }

    async fn allowed_by_robots(&self, url: &Url) -> bool {
        let robots_url = match url.join("/robots.txt") {
            Ok(u) => u,
            Err(_) => return true,
        };
        let robots_txt = match self.client.get(robots_url.as_str()).send().await {
            Ok(rsp) => rsp.text().await.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "robots.txt unavailable, assuming allowed");
                String::new()
            }
        };
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&robots_txt, "Mozilla", url.as_str())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, TransportError> {
        if self.respect_robots && !self.allowed_by_robots(url).await {
            return Err(TransportError::RobotsDisallowed {
                url: url.to_string(),
            });
        }

        let referer = url.origin().ascii_serialization();
        let rsp = self
            .client
            .get(url.as_str())
            .headers(browser_headers(&referer))
            .send()
            .await?;

        let status = rsp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = rsp.text().await?;
        debug!(%url, status = status.as_u16(), len = body.len(), "fetched page");
        Ok(body)
    }
}

fn browser_headers(referer: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(USER_AGENT, HeaderValue::from_static(random_desktop_ua()));
    h.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    h.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    if let Ok(v) = HeaderValue::from_str(referer) {
        h.insert(REFERER, v);
    }
    h.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    h.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    h.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    h.insert(DNT, HeaderValue::from_static("1"));
    h.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );
    h.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    h.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    h
}

fn random_desktop_ua() -> &'static str {
    const UAS: &[&str] = &[
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    ];
    UAS[rng().random_range(0..UAS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_look_like_a_browser() {
        let h = browser_headers("https://www.linkedin.com");
        assert!(h[USER_AGENT].to_str().unwrap().starts_with("Mozilla/5.0"));
        assert_eq!(h[REFERER], "https://www.linkedin.com");
        assert_eq!(h["sec-fetch-mode"], "navigate");
    }

    #[test]
    fn bad_referer_is_skipped() {
        let h = browser_headers("bad\nvalue");
        assert!(h.get(REFERER).is_none());
    }
}
