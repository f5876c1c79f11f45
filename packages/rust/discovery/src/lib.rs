//! Record link discovery.
//!
//! Given the rendered start page of the records browser, find every link that
//! points at an individual record page. Two passes over the same document are
//! unioned:
//!
//! 1. every anchor whose href contains `/record/` and ends with `.html`;
//! 2. every anchor inside a navigation container (see [`nav`]) whose href
//!    mentions `.html`.
//!
//! Links are resolved against the start URL, filtered, and deduplicated.
//! Discovery never follows the links it finds.

mod inspect;
mod nav;
mod resolve;

use std::collections::BTreeSet;
use std::sync::LazyLock;

use nsrecords_shared::{LinkFilterConfig, NsRecordsError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

pub use inspect::{AnchorInfo, IframeInfo, LinkReport, inspect_links};
pub use nav::{NAV_TOKENS, find_nav_containers, is_nav_container};
pub use resolve::resolve_href;

/// Path fragment every record page URL contains.
const RECORD_PATH_MARKER: &str = "/record/";

/// Suffix of a documentation page.
const PAGE_SUFFIX: &str = ".html";

static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector"));

// ---------------------------------------------------------------------------
// Link filter
// ---------------------------------------------------------------------------

/// Decides which resolved links survive discovery.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    /// Required host, when restricted to the start URL's site.
    host: Option<String>,
    /// If non-empty, the URL path must match at least one.
    include: Vec<Regex>,
    /// If the URL path matches any, the link is dropped.
    exclude: Vec<Regex>,
}

impl LinkFilter {
    /// Build a filter for links discovered from `start_url`.
    pub fn new(config: &LinkFilterConfig, start_url: &Url) -> Result<Self> {
        let host = if config.same_host_only {
            Some(start_url.host_str().unwrap_or("").to_string())
        } else {
            None
        };

        Ok(Self {
            host,
            include: compile_globs(&config.include_patterns)?,
            exclude: compile_globs(&config.exclude_patterns)?,
        })
    }

    /// Whether `url` should be kept.
    pub fn allows(&self, url: &Url) -> bool {
        if let Some(host) = &self.host {
            if url.host_str().unwrap_or("") != host {
                return false;
            }
        }

        let path = url.path();
        if self.exclude.iter().any(|p| p.is_match(path)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.is_match(path))
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            glob_to_regex(p).ok_or_else(|| {
                NsRecordsError::validation(format!("invalid link pattern '{p}'"))
            })
        })
        .collect()
}

/// Convert a glob-like pattern to a regex.
fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let escaped = regex::escape(pattern)
        .replace(r"\*\*", ".*")
        .replace(r"\*", "[^/]*")
        .replace(r"\?", ".");
    Regex::new(&format!("^{escaped}$")).ok()
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Whether an href names a record page (`…/record/….html`).
///
/// The raw href is tested, so a trailing `#fragment` or `?query` disqualifies
/// it here; such links are still picked up by the navigation pass.
pub fn is_record_href(href: &str) -> bool {
    let href = href.trim();
    href.contains(RECORD_PATH_MARKER) && href.ends_with(PAGE_SUFFIX)
}

/// Whether an href found inside a navigation container names a page.
fn is_nav_page_href(href: &str) -> bool {
    href.contains(PAGE_SUFFIX)
}

/// Collect record page URLs linked from the start page.
///
/// Returns an error if nothing survives; a crawl has no work without links.
#[instrument(skip_all, fields(start_url = %start_url))]
pub fn discover_record_links(
    doc: &Html,
    start_url: &Url,
    filter: &LinkFilter,
) -> Result<BTreeSet<Url>> {
    let mut links = BTreeSet::new();

    let anchor_hits = collect(doc.select(&ANCHOR_SEL), start_url, filter, is_record_href, &mut links);
    debug!(anchor_hits, "record-pattern anchor pass done");

    let containers = find_nav_containers(doc);
    if containers.is_empty() {
        debug!("no navigation container found; anchor pass is the only source");
    } else {
        let mut nav_hits = 0;
        for container in &containers {
            nav_hits += collect(
                container.select(&ANCHOR_SEL),
                start_url,
                filter,
                is_nav_page_href,
                &mut links,
            );
        }
        debug!(containers = containers.len(), nav_hits, "navigation pass done");
    }

    if links.is_empty() {
        warn!("no record links discovered");
        return Err(NsRecordsError::discovery(format!(
            "no record links found on {start_url}"
        )));
    }

    info!(links = links.len(), "record links discovered");
    Ok(links)
}

/// Resolve and keep matching anchors; returns how many anchors matched.
fn collect<'a>(
    anchors: impl Iterator<Item = ElementRef<'a>>,
    start_url: &Url,
    filter: &LinkFilter,
    matches: fn(&str) -> bool,
    out: &mut BTreeSet<Url>,
) -> usize {
    let mut hits = 0;
    for el in anchors {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if !matches(href) {
            continue;
        }
        if let Some(url) = resolve_href(start_url, href) {
            if filter.allows(&url) {
                hits += 1;
                out.insert(url);
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_fixture(name: &str) -> Html {
        let path = format!("../../../fixtures/html/{name}");
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("missing fixture: {path}"));
        Html::parse_document(&content)
    }

    fn start() -> Url {
        Url::parse("https://h/a/b/c.html").unwrap()
    }

    fn discover(html: &str) -> Result<Vec<String>> {
        let doc = Html::parse_document(html);
        let filter = LinkFilter::new(&LinkFilterConfig::default(), &start())?;
        Ok(discover_record_links(&doc, &start(), &filter)?
            .into_iter()
            .map(String::from)
            .collect())
    }

    #[test]
    fn record_href_pattern() {
        assert!(is_record_href("/help/record/account.html"));
        assert!(is_record_href("  ../record/account.html "));
        assert!(!is_record_href("../record/account.html#fields"));
        assert!(!is_record_href("/help/record/account.html?v=2"));
        assert!(!is_record_href("/help/record/account.htm"));
        assert!(!is_record_href("/help/search/account.html"));
        assert!(!is_record_href("record/account.html"));
    }

    #[test]
    fn anchor_pass_resolves_relative_links() {
        let links = discover(
            r#"<body><p>
                <a href="/record/x.html">root-relative</a>
                <a href="sub/record/y.html">relative</a>
                <a href="/guide/intro.html">not a record</a>
            </p></body>"#,
        )
        .unwrap();
        assert_eq!(
            links,
            vec!["https://h/a/b/sub/record/y.html", "https://h/record/x.html"]
        );
    }

    #[test]
    fn duplicate_anchors_collapse() {
        let links = discover(
            r#"<body>
                <a href="/record/x.html">one</a>
                <a href="https://h/record/x.html">two</a>
                <a href="/record/x.html#fields">three</a>
            </body>"#,
        )
        .unwrap();
        assert_eq!(links, vec!["https://h/record/x.html"]);
    }

    #[test]
    fn fragment_links_need_a_nav_container() {
        let outside = discover(r#"<body><a href="/record/x.html#fields">x</a></body>"#);
        assert!(matches!(outside, Err(NsRecordsError::Discovery { .. })));

        let links = discover(r#"<body><nav><a href="/record/x.html#fields">x</a></nav></body>"#)
            .unwrap();
        assert_eq!(links, vec!["https://h/record/x.html"]);
    }

    #[test]
    fn nav_pass_adds_non_record_pages() {
        let links = discover(
            r#"<body>
                <div class="leftnav"><a href="account.html">Account</a></div>
                <a href="elsewhere.html">outside nav</a>
            </body>"#,
        )
        .unwrap();
        assert_eq!(links, vec!["https://h/a/b/account.html"]);
    }

    #[test]
    fn empty_result_is_an_error() {
        let err = discover(r#"<body><a href="/guide/intro.html">intro</a></body>"#).unwrap_err();
        assert!(matches!(err, NsRecordsError::Discovery { .. }));
    }

    #[test]
    fn other_hosts_are_dropped_by_default() {
        let links = discover(
            r#"<body>
                <a href="https://other.example.com/record/x.html">x</a>
                <a href="/record/y.html">y</a>
            </body>"#,
        )
        .unwrap();
        assert_eq!(links, vec!["https://h/record/y.html"]);
    }

    #[test]
    fn exclude_patterns_drop_links() {
        let doc = Html::parse_document(
            r#"<body><a href="/record/x.html">x</a><a href="/record/old/y.html">y</a></body>"#,
        );
        let config = LinkFilterConfig {
            same_host_only: true,
            include_patterns: vec![],
            exclude_patterns: vec!["/record/old/**".into()],
        };
        let filter = LinkFilter::new(&config, &start()).unwrap();
        let links = discover_record_links(&doc, &start(), &filter).unwrap();
        assert_eq!(links.len(), 1);
        assert!(links.contains(&Url::parse("https://h/record/x.html").unwrap()));
    }

    #[test]
    fn include_patterns_restrict_links() {
        let filter = LinkFilter::new(
            &LinkFilterConfig {
                same_host_only: false,
                include_patterns: vec!["/script/record/*.html".into()],
                exclude_patterns: vec![],
            },
            &start(),
        )
        .unwrap();
        assert!(filter.allows(&Url::parse("https://x/script/record/a.html").unwrap()));
        assert!(!filter.allows(&Url::parse("https://x/script/record/deep/a.html").unwrap()));
    }

    #[test]
    fn records_browser_fixture() {
        let doc = load_fixture("records_browser_start.html");
        let start = Url::parse(
            "https://system.netsuite.com/help/helpcenter/en_US/srbrowser/Browser2025_2/script/record/amortizationtemplate.html",
        )
        .unwrap();
        let filter = LinkFilter::new(&LinkFilterConfig::default(), &start).unwrap();
        let links = discover_record_links(&doc, &start, &filter).unwrap();

        let ids: Vec<&str> = links
            .iter()
            .filter_map(|u| u.path_segments().and_then(|mut s| s.next_back()))
            .collect();
        assert_eq!(
            ids,
            vec!["account.html", "amortizationtemplate.html", "customer.html", "widget.html"]
        );
    }
}
