//! Debug artifacts: raw HTML snapshots and the discovered link list.
//!
//! Capture is observability only. Write failures are logged by the caller and
//! never change what a crawl extracts.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use nsrecords_shared::{DebugConfig, NsRecordsError, Result};
use tracing::debug;
use url::Url;

/// File the discovered links are written to.
pub const LINKS_FILE: &str = "links.txt";

/// Writes debug artifacts according to a [`DebugConfig`].
#[derive(Debug)]
pub struct DebugCapture {
    config: DebugConfig,
    snapshots: usize,
}

impl DebugCapture {
    pub fn new(config: DebugConfig) -> Self {
        Self {
            config,
            snapshots: 0,
        }
    }

    /// A capture that writes nothing.
    pub fn disabled() -> Self {
        Self::new(DebugConfig::Disabled)
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.config, DebugConfig::Enabled { .. })
    }

    /// Save `html` if the snapshot budget allows. Returns the written path.
    pub fn snapshot(&mut self, url: &Url, html: &str) -> Result<Option<PathBuf>> {
        let DebugConfig::Enabled {
            dir,
            snapshot_limit,
        } = &self.config
        else {
            return Ok(None);
        };
        if self.snapshots >= *snapshot_limit {
            return Ok(None);
        }

        ensure_dir(dir)?;
        let path = dir.join(format!("page_{:02}_{}.html", self.snapshots, file_stem(url)));
        std::fs::write(&path, html).map_err(|e| NsRecordsError::io(&path, e))?;
        self.snapshots += 1;

        debug!(%url, path = %path.display(), "saved page snapshot");
        Ok(Some(path))
    }

    /// Write one discovered link per line.
    pub fn write_links(&self, links: &BTreeSet<Url>) -> Result<Option<PathBuf>> {
        let DebugConfig::Enabled { dir, .. } = &self.config else {
            return Ok(None);
        };

        ensure_dir(dir)?;
        let path = dir.join(LINKS_FILE);
        let mut body = String::new();
        for link in links {
            body.push_str(link.as_str());
            body.push('\n');
        }
        std::fs::write(&path, body).map_err(|e| NsRecordsError::io(&path, e))?;

        debug!(count = links.len(), path = %path.display(), "saved link list");
        Ok(Some(path))
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| NsRecordsError::io(dir, e))
}

/// Filesystem-safe name for a page, from its last path segment.
fn file_stem(url: &Url) -> String {
    let last = url
        .path_segments()
        .and_then(|s| s.filter(|p| !p.is_empty()).next_back())
        .unwrap_or("index");
    let stem = last.trim_end_matches(".html").trim_end_matches(".htm");

    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "index".into() } else { cleaned }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn disabled_writes_nothing() {
        let mut capture = DebugCapture::disabled();
        assert!(!capture.is_enabled());
        assert!(capture.snapshot(&url("https://h/a.html"), "<p/>").unwrap().is_none());
        assert!(capture.write_links(&BTreeSet::new()).unwrap().is_none());
    }

    #[test]
    fn snapshots_stop_at_limit() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("debug");
        let mut capture = DebugCapture::new(DebugConfig::Enabled {
            dir: dir.clone(),
            snapshot_limit: 2,
        });

        let first = capture.snapshot(&url("https://h/record/account.html"), "<h1>A</h1>").unwrap();
        let second = capture.snapshot(&url("https://h/record/x%20y.html"), "<h1>B</h1>").unwrap();
        let third = capture.snapshot(&url("https://h/record/z.html"), "<h1>C</h1>").unwrap();

        assert_eq!(first, Some(dir.join("page_00_account.html")));
        assert_eq!(second, Some(dir.join("page_01_x_20y.html")));
        assert!(third.is_none());
        assert_eq!(std::fs::read_to_string(dir.join("page_00_account.html")).unwrap(), "<h1>A</h1>");
    }

    #[test]
    fn link_list_one_per_line() {
        let tmp = tempfile::tempdir().unwrap();
        let capture = DebugCapture::new(DebugConfig::Enabled {
            dir: tmp.path().to_path_buf(),
            snapshot_limit: 0,
        });
        let links: BTreeSet<Url> =
            [url("https://h/record/b.html"), url("https://h/record/a.html")].into_iter().collect();

        let path = capture.write_links(&links).unwrap().unwrap();
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "https://h/record/a.html\nhttps://h/record/b.html\n"
        );
    }

    #[test]
    fn file_stem_fallbacks() {
        assert_eq!(file_stem(&url("https://h/")), "index");
        assert_eq!(file_stem(&url("https://h/record/")), "record");
    }
}
