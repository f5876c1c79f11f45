//! Page source selection for CLI runs.

use std::path::Path;
use std::time::Duration;

use color_eyre::eyre::Result;
#[cfg(not(feature = "browser"))]
use color_eyre::eyre::eyre;
#[cfg(feature = "browser")]
use nsrecords_crawler::BrowserPageSource;
use nsrecords_crawler::{FixturePageSource, HttpPageSource, PageSource};
use nsrecords_shared::PageSourceKind;
use tracing::info;
use url::Url;

/// The page source chosen on the command line.
pub(crate) enum CliSource {
    Http(HttpPageSource),
    Fixture(FixturePageSource),
    #[cfg(feature = "browser")]
    Browser(BrowserPageSource),
}

impl CliSource {
    /// Open the source for `kind`, or serve `fixtures` when given.
    ///
    /// Fixture files are served next to `start_url`, under their file names.
    pub(crate) fn open(
        kind: PageSourceKind,
        fixtures: Option<&Path>,
        start_url: &Url,
        navigation_timeout: Duration,
    ) -> Result<Self> {
        if let Some(dir) = fixtures {
            let source = FixturePageSource::from_dir(dir, start_url)?;
            info!(dir = %dir.display(), pages = source.len(), "serving fixture pages");
            return Ok(Self::Fixture(source));
        }

        match kind {
            PageSourceKind::Http => Ok(Self::Http(HttpPageSource::new(navigation_timeout)?)),
            PageSourceKind::Browser => open_browser(navigation_timeout),
        }
    }
}

#[cfg(feature = "browser")]
fn open_browser(navigation_timeout: Duration) -> Result<CliSource> {
    Ok(CliSource::Browser(BrowserPageSource::launch(
        navigation_timeout,
        true,
    )?))
}

#[cfg(not(feature = "browser"))]
fn open_browser(_navigation_timeout: Duration) -> Result<CliSource> {
    Err(eyre!(
        "this build has no browser support; rebuild with `--features browser` or use `--source http`"
    ))
}

impl PageSource for CliSource {
    async fn goto(&mut self, url: &Url) -> nsrecords_shared::Result<()> {
        match self {
            Self::Http(s) => s.goto(url).await,
            Self::Fixture(s) => s.goto(url).await,
            #[cfg(feature = "browser")]
            Self::Browser(s) => s.goto(url).await,
        }
    }

    async fn content(&mut self) -> nsrecords_shared::Result<String> {
        match self {
            Self::Http(s) => s.content().await,
            Self::Fixture(s) => s.content().await,
            #[cfg(feature = "browser")]
            Self::Browser(s) => s.content().await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Http(s) => s.name(),
            Self::Fixture(s) => s.name(),
            #[cfg(feature = "browser")]
            Self::Browser(s) => s.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_take_precedence() {
        let start = Url::parse("https://h/script/record/start.html").unwrap();
        let source = CliSource::open(
            PageSourceKind::Browser,
            Some(Path::new("../../fixtures/html")),
            &start,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(source.name(), "fixture");
    }

    #[test]
    fn http_is_the_default_source() {
        let start = Url::parse("https://h/script/record/start.html").unwrap();
        let source =
            CliSource::open(PageSourceKind::Http, None, &start, Duration::from_secs(1)).unwrap();
        assert_eq!(source.name(), "http");
    }

    #[cfg(not(feature = "browser"))]
    #[test]
    fn browser_requires_feature() {
        let start = Url::parse("https://h/script/record/start.html").unwrap();
        let err = CliSource::open(PageSourceKind::Browser, None, &start, Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(err.to_string().contains("--features browser"));
    }
}
