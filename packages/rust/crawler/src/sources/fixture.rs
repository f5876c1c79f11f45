//! In-memory page source for tests and offline runs.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use nsrecords_shared::{NsRecordsError, Result};
use tracing::debug;
use url::Url;

use super::PageSource;

/// Serves pages from a URL → HTML map.
///
/// Unknown URLs fail like a network error. Navigations are recorded so tests
/// can assert on the order pages were visited.
#[derive(Debug, Default)]
pub struct FixturePageSource {
    pages: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    current: Option<String>,
    visited: Vec<Url>,
}

impl FixturePageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`.
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(normalize(url), html.into());
        self
    }

    /// Make navigation to `url` take `delay` before completing.
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(normalize(url), delay);
        self
    }

    /// Serve every `*.html` file in `dir` at `base.join(file_name)`.
    pub fn from_dir(dir: &Path, base: &Url) -> Result<Self> {
        let mut source = Self::new();
        let entries = std::fs::read_dir(dir).map_err(|e| NsRecordsError::io(dir, e))?;

        for entry in entries {
            let path = entry.map_err(|e| NsRecordsError::io(dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let url = base.join(file_name).map_err(|e| {
                NsRecordsError::validation(format!("cannot place {file_name} under {base}: {e}"))
            })?;
            let html = std::fs::read_to_string(&path).map_err(|e| NsRecordsError::io(&path, e))?;
            debug!(%url, path = %path.display(), "fixture page");
            source.pages.insert(normalize(url.as_str()), html);
        }

        Ok(source)
    }

    /// Number of pages served.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// URLs navigated to, in order.
    pub fn visited(&self) -> &[Url] {
        &self.visited
    }
}

/// Fixture lookups ignore fragments.
fn normalize(url: &str) -> String {
    url.split('#').next().unwrap_or(url).to_string()
}

impl PageSource for FixturePageSource {
    async fn goto(&mut self, url: &Url) -> Result<()> {
        self.current = None;
        self.visited.push(url.clone());

        let key = normalize(url.as_str());
        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }

        let html = self
            .pages
            .get(&key)
            .ok_or_else(|| NsRecordsError::Network(format!("{url}: no fixture page")))?;
        self.current = Some(html.clone());
        Ok(())
    }

    async fn content(&mut self) -> Result<String> {
        self.current
            .clone()
            .ok_or_else(|| NsRecordsError::Network("no page loaded".into()))
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
