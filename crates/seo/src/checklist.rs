use agentsite_core::{PageSignalReport, SeoReport, normalize_route_path};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use std::time::Duration;
use thiserror::Error;

use crate::checks::evaluate_checks;
use crate::signals::PageSignals;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Network access used by the evaluator
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Body of a page that answered with a success status
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;

    /// Whether the resource exists; never errors
    async fn probe(&self, url: &str) -> bool;
}

/// `reqwest`-backed fetcher; redirects are followed before judging status
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("agentsite-seo-check/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    async fn probe(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Probe of {} failed: {}", url, e);
                false
            }
        }
    }
}

/// Runs the SEO checklist against a live site
pub struct SeoEvaluator<F> {
    fetcher: F,
    pages: Vec<String>,
}

impl<F: PageFetcher> SeoEvaluator<F> {
    /// `pages` are paths under the origin, with or without a leading `/`;
    /// the home page is always included
    pub fn new(fetcher: F, pages: Vec<String>) -> Self {
        let mut pages: Vec<String> = pages.iter().map(|p| normalize_route_path(p)).collect();
        if !pages.iter().any(|p| p == "/") {
            pages.insert(0, "/".to_string());
        }
        Self { fetcher, pages }
    }

    /// Fetch every page and both probes concurrently, then reduce to a report.
    ///
    /// Never fails: each unreachable resource degrades its own checks.
    pub async fn evaluate(&self, origin: &str) -> SeoReport {
        let origin = origin.trim().trim_end_matches('/');
        tracing::info!(origin, pages = self.pages.len(), "Running SEO checklist");

        let page_fetches = join_all(self.pages.iter().map(|path| self.fetch_page(origin, path)));
        let sitemap_url = format!("{}/sitemap.xml", origin);
        let robots_url = format!("{}/robots.txt", origin);

        let (pages, sitemap_ok, robots_ok) = tokio::join!(
            page_fetches,
            self.fetcher.probe(&sitemap_url),
            self.fetcher.probe(&robots_url),
        );

        let home = pages
            .iter()
            .find(|(path, _)| path == "/")
            .and_then(|(_, signals)| signals.as_ref());
        let checks = evaluate_checks(home, origin, sitemap_ok, robots_ok);

        let pages = pages
            .iter()
            .map(|(path, signals)| match signals {
                Some(signals) => signals.report(path),
                None => PageSignalReport::unreachable(path),
            })
            .collect();

        SeoReport {
            checks,
            pages,
            checked_at: Utc::now(),
        }
    }

    async fn fetch_page(&self, origin: &str, path: &str) -> (String, Option<PageSignals>) {
        let url = format!("{}{}", origin, path);
        match self.fetcher.fetch_html(&url).await {
            Ok(html) => (path.to_string(), Some(PageSignals::extract(&html))),
            Err(e) => {
                tracing::warn!("Could not fetch {}: {}", url, e);
                (path.to_string(), None)
            }
        }
    }
}
