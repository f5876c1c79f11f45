//! Sequential records crawler.
//!
//! One page source, one page at a time: load the start page, discover record
//! links, then visit each link, extract its record, and pause before the next.
//! A page that fails to load or parse is logged and skipped. Only a failure on
//! the start page, or an empty link set, ends the run.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use nsrecords_discovery::{LinkFilter, discover_record_links};
use nsrecords_extractor::extract_record_from_html;
use nsrecords_shared::{
    CrawlConfig, CrawlResult, DebugConfig, LinkFilterConfig, NsRecordsError, RecordEntry, Result,
};
use scraper::Html;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::debug::DebugCapture;
use crate::sources::PageSource;

// ---------------------------------------------------------------------------
// CrawlReport
// ---------------------------------------------------------------------------

/// Outcome of a completed crawl.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Extracted records, in link order.
    pub records: CrawlResult,
    /// Every link discovery produced, in visit order.
    pub links: Vec<Url>,
    /// Pages that yielded no record (URL, reason).
    pub failures: Vec<(String, String)>,
    /// Wall-clock duration of the crawl.
    pub duration: Duration,
}

impl CrawlReport {
    /// Whether any discovered page was skipped.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting crawl status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a record page is loaded.
    fn page_started(&self, url: &Url, current: usize, total: usize);
    /// Called after a record page was processed, successfully or not.
    fn page_finished(&self, url: &Url, outcome: std::result::Result<&RecordEntry, &NsRecordsError>);
    /// Called when the crawl completes.
    fn done(&self, report: &CrawlReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_started(&self, _url: &Url, _current: usize, _total: usize) {}
    fn page_finished(&self, _url: &Url, _outcome: std::result::Result<&RecordEntry, &NsRecordsError>) {}
    fn done(&self, _report: &CrawlReport) {}
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Drives a [`PageSource`] through discovery and extraction.
pub struct Crawler<S> {
    source: S,
    config: CrawlConfig,
    link_filter: LinkFilterConfig,
    capture: DebugCapture,
}

impl<S: PageSource> Crawler<S> {
    /// Create a crawler that owns `source` for its whole lifetime.
    pub fn new(source: S, config: CrawlConfig) -> Self {
        Self {
            source,
            config,
            link_filter: LinkFilterConfig::default(),
            capture: DebugCapture::disabled(),
        }
    }

    /// Replace the default link filter.
    pub fn with_link_filter(mut self, link_filter: LinkFilterConfig) -> Self {
        self.link_filter = link_filter;
        self
    }

    /// Enable or disable debug artifact capture.
    pub fn with_debug(mut self, debug: DebugConfig) -> Self {
        self.capture = DebugCapture::new(debug);
        self
    }

    /// Give the page source back (e.g. to inspect a fixture's visits).
    pub fn into_source(self) -> S {
        self.source
    }

    /// Navigate to `url`, wait `settle`, and return the rendered HTML.
    ///
    /// Navigation is bounded by the configured timeout; the settle wait is not.
    pub async fn load_page(&mut self, url: &Url, settle: Duration) -> Result<String> {
        let timeout = self.config.navigation_timeout;
        match tokio::time::timeout(timeout, self.source.goto(url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(NsRecordsError::Timeout {
                    url: url.to_string(),
                    timeout,
                });
            }
        }

        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        let html = self.source.content().await?;
        if let Err(e) = self.capture.snapshot(url, &html) {
            warn!(%url, error = %e, "failed to save debug snapshot");
        }
        Ok(html)
    }

    /// Load the start page and discover the record links it lists.
    #[instrument(skip_all, fields(start_url = %start_url, source = self.source.name()))]
    pub async fn discover(&mut self, start_url: &Url) -> Result<BTreeSet<Url>> {
        let filter = LinkFilter::new(&self.link_filter, start_url)?;
        let html = self.load_page(start_url, self.config.start_settle).await?;
        let links = discover_in_html(&html, start_url, &filter)?;

        if let Err(e) = self.capture.write_links(&links) {
            warn!(error = %e, "failed to save debug link list");
        }
        Ok(links)
    }

    /// Load one record page and extract it.
    pub async fn extract(&mut self, url: &Url) -> Result<RecordEntry> {
        let html = self.load_page(url, self.config.settle).await?;
        extract_record_from_html(&html, url)
    }

    /// Crawl every record linked from `start_url`.
    ///
    /// Fails only if the start page cannot be loaded or lists no records.
    #[instrument(skip_all, fields(start_url = %start_url, source = self.source.name()))]
    pub async fn crawl(
        &mut self,
        start_url: &Url,
        progress: &dyn ProgressReporter,
    ) -> Result<CrawlReport> {
        let started = Instant::now();

        info!(
            timeout_ms = self.config.navigation_timeout.as_millis(),
            settle_ms = self.config.settle.as_millis(),
            pacing_ms = self.config.pacing.as_millis(),
            debug = self.capture.is_enabled(),
            "starting crawl"
        );

        progress.phase("Discovering record links");
        let links: Vec<Url> = self.discover(start_url).await?.into_iter().collect();

        progress.phase("Extracting records");
        let total = links.len();
        let mut records = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (i, url) in links.iter().enumerate() {
            progress.page_started(url, i + 1, total);
            debug!(%url, current = i + 1, total, "processing record page");

            match self.extract(url).await {
                Ok(entry) => {
                    info!(
                        %url,
                        record = %entry.record_name,
                        fields = entry.fields.len(),
                        "record extracted"
                    );
                    progress.page_finished(url, Ok(&entry));
                    records.push(entry);
                }
                Err(e) => {
                    warn!(%url, error = %e, "skipping page");
                    progress.page_finished(url, Err(&e));
                    failures.push((url.to_string(), e.to_string()));
                }
            }

            if i + 1 < total && !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }
        }

        let report = CrawlReport {
            records,
            links,
            failures,
            duration: started.elapsed(),
        };

        info!(
            links = report.links.len(),
            records = report.records.len(),
            failures = report.failures.len(),
            duration_ms = report.duration.as_millis(),
            "crawl completed"
        );
        progress.done(&report);

        Ok(report)
    }
}

/// Parse the start page and run discovery on it.
///
/// Kept synchronous so the parsed document never lives across an await.
fn discover_in_html(html: &str, start_url: &Url, filter: &LinkFilter) -> Result<BTreeSet<Url>> {
    let doc = Html::parse_document(html);
    discover_record_links(&doc, start_url, filter)
}
