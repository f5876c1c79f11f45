//! Headless Chrome page source.
//!
//! One browser, one tab, reused for every navigation. `headless_chrome` is
//! blocking, so each call runs on tokio's blocking pool through a
//! [`BlockingSlot`]; a navigation abandoned by the crawler's timeout is waited
//! out before the tab is touched again.

use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};
use nsrecords_shared::{NsRecordsError, Result};
use tracing::{debug, info};
use url::Url;

use super::PageSource;
use super::blocking::BlockingSlot;

/// Keep the browser alive across long settle/pacing pauses.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(300);

/// Drives a single Chrome tab.
pub struct BrowserPageSource {
    // Dropping the browser closes the tab; keep it for the source's lifetime.
    _browser: Browser,
    tab: Arc<Tab>,
    navigation: BlockingSlot<()>,
    reads: BlockingSlot<String>,
}

impl BrowserPageSource {
    /// Launch Chrome and open the tab every navigation will reuse.
    ///
    /// `navigation_timeout` also bounds each blocking tab call, so a
    /// navigation the crawler gave up on ends on its own.
    pub fn launch(navigation_timeout: Duration, headless: bool) -> Result<Self> {
        let browser = Browser::new(LaunchOptions {
            headless,
            idle_browser_timeout: IDLE_BROWSER_TIMEOUT,
            ..Default::default()
        })
        .map_err(|e| NsRecordsError::Network(format!("failed to launch browser: {e}")))?;

        let tab = browser
            .new_tab()
            .map_err(|e| NsRecordsError::Network(format!("failed to create tab: {e}")))?;
        tab.set_default_timeout(navigation_timeout);

        info!(headless, "browser launched");
        Ok(Self {
            _browser: browser,
            tab,
            navigation: BlockingSlot::new(),
            reads: BlockingSlot::new(),
        })
    }
}

impl PageSource for BrowserPageSource {
    async fn goto(&mut self, url: &Url) -> Result<()> {
        self.reads.drain().await;

        let tab = Arc::clone(&self.tab);
        let target = url.to_string();
        debug!(%url, "navigating");

        self.navigation
            .run(move || {
                tab.navigate_to(&target).map_err(|e| {
                    NsRecordsError::Network(format!("{target}: navigation failed: {e}"))
                })?;
                tab.wait_until_navigated().map_err(|e| {
                    NsRecordsError::Network(format!("{target}: page load failed: {e}"))
                })?;
                Ok(())
            })
            .await
    }

    async fn content(&mut self) -> Result<String> {
        self.navigation.drain().await;

        let tab = Arc::clone(&self.tab);
        self.reads
            .run(move || {
                tab.get_content().map_err(|e| {
                    NsRecordsError::Network(format!("failed to read page content: {e}"))
                })
            })
            .await
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
