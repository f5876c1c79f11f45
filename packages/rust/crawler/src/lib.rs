//! Records browser crawler.
//!
//! This crate provides:
//! - [`sources`]: where page HTML comes from (HTTP, headless Chrome, fixtures)
//! - [`Crawler`]: sequential discovery + extraction over one page source
//! - [`debug`]: optional HTML snapshots and link lists for troubleshooting

pub mod debug;
mod engine;
pub mod sources;

pub use debug::DebugCapture;
pub use engine::{CrawlReport, Crawler, ProgressReporter, SilentProgress};
#[cfg(feature = "browser")]
pub use sources::BrowserPageSource;
pub use sources::{FixturePageSource, HttpPageSource, PageSource};

#[cfg(test)]
mod tests {
    use super::*;
    use nsrecords_shared::CrawlConfig;
    use std::path::Path;
    use url::Url;

    // -----------------------------------------------------------------------
    // Fixture directory crawl
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn crawls_fixture_records_browser() {
        // from_dir serves each file under its own name, so point the start page
        // at record_*.html names instead of the real record slugs.
        let base = Url::parse("https://h/help/helpcenter/en_US/srbrowser/Browser2024_2/script/record/")
            .unwrap();
        let start_html = r#"<html><body>
            <div id="leftmenu"><ul>
              <li><a href="record_widget.html">Widget</a></li>
              <li><a href="record_account.html">Account</a></li>
              <li><a href="record_no_fields.html">Customer</a></li>
              <li><a href="record_gone.html">Gone</a></li>
            </ul></div>
        </body></html>"#;

        let source = FixturePageSource::from_dir(Path::new("../../../fixtures/html"), &base)
            .unwrap()
            .with_page(base.join("start.html").unwrap().as_str(), start_html);

        let start_url = base.join("start.html").unwrap();
        let mut crawler = Crawler::new(source, CrawlConfig::immediate());
        let report = crawler.crawl(&start_url, &SilentProgress).await.unwrap();

        let names: Vec<&str> = report.records.iter().map(|r| r.record_name.as_str()).collect();
        assert_eq!(names, vec!["Account", "Widget"]);
        assert_eq!(report.records[0].record_internal_id, "record_account");
        assert_eq!(report.records[0].fields.len(), 4);
        assert_eq!(report.failures.len(), 2);

        let json = serde_json::to_value(&report.records).unwrap();
        assert_eq!(json[1]["fields"][0]["required"], true);
        assert!(json[1]["fields"][0].get("nlsapiSubmitField").is_some());
    }
}
