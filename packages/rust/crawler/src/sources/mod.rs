//! Page sources: where rendered HTML comes from.
//!
//! A [`PageSource`] behaves like a single browser tab. The crawler navigates
//! it to one URL at a time, waits for the page to settle, then reads the
//! current HTML. Discovery and extraction only ever see that HTML, so any
//! source can be swapped in without touching them.

// Only the browser source blocks; the slot is tested without it.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
mod blocking;
#[cfg(feature = "browser")]
mod browser;
mod fixture;
mod http;

use std::future::Future;

use nsrecords_shared::Result;
use url::Url;

#[cfg(feature = "browser")]
pub use browser::BrowserPageSource;
pub use fixture::FixturePageSource;
pub use http::HttpPageSource;

/// Something that can load a URL and hand back its rendered HTML.
///
/// Implementations own their page handle exclusively; calls never overlap.
pub trait PageSource: Send {
    /// Navigate to `url`, replacing the current page.
    ///
    /// Resolves once the navigation has completed. The crawler bounds this
    /// call with its navigation timeout.
    fn goto(&mut self, url: &Url) -> impl Future<Output = Result<()>> + Send;

    /// HTML of the current page as it is rendered right now.
    fn content(&mut self) -> impl Future<Output = Result<String>> + Send;

    /// Short name for logs (`"http"`, `"browser"`, `"fixture"`).
    fn name(&self) -> &'static str;
}
