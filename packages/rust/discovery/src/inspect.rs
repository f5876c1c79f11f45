//! Link diagnostics for a start page.
//!
//! When discovery comes back empty the usual culprit is markup: the menu lives
//! in an iframe, or its container carries none of the expected class names.
//! [`inspect_links`] reports what the page actually contains.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::nav::has_nav_token;
use crate::resolve::resolve_href;
use crate::{ANCHOR_SEL, is_record_href};

static NAV_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("nav").expect("nav selector"));

static ASIDE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("aside").expect("aside selector"));

static BLOCK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, section, ul, ol").expect("block selector"));

static IFRAME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe").expect("iframe selector"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One anchor on the inspected page.
#[derive(Debug, Clone)]
pub struct AnchorInfo {
    /// Visible text, whitespace-trimmed.
    pub text: String,
    /// Raw `href` attribute.
    pub href: String,
    /// Absolute URL, when the href resolves to one.
    pub resolved: Option<Url>,
    /// Whether the href matches the record page pattern.
    pub is_record: bool,
}

/// An `iframe` on the inspected page.
#[derive(Debug, Clone, Default)]
pub struct IframeInfo {
    pub src: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Everything [`inspect_links`] found.
#[derive(Debug, Clone, Default)]
pub struct LinkReport {
    /// Anchors in document order.
    pub anchors: Vec<AnchorInfo>,
    /// Number of `nav` elements.
    pub nav_elements: usize,
    /// Number of `aside` elements.
    pub aside_elements: usize,
    /// `tag.class#id` of block elements carrying a nav token.
    pub token_containers: Vec<String>,
    /// Frames; navigation inside them is invisible to discovery.
    pub iframes: Vec<IframeInfo>,
}

impl LinkReport {
    /// Anchors that match the record pattern.
    pub fn record_anchors(&self) -> impl Iterator<Item = &AnchorInfo> {
        self.anchors.iter().filter(|a| a.is_record)
    }
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Describe the links and navigation structure of a page.
pub fn inspect_links(doc: &Html, page_url: &Url) -> LinkReport {
    let anchors = doc
        .select(&ANCHOR_SEL)
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            Some(AnchorInfo {
                text: el.text().collect::<String>().trim().to_string(),
                href: href.to_string(),
                resolved: resolve_href(page_url, href),
                is_record: is_record_href(href),
            })
        })
        .collect();

    let token_containers = doc
        .select(&BLOCK_SEL)
        .filter(has_nav_token)
        .map(|el| {
            let v = el.value();
            let classes: Vec<&str> = v.classes().collect();
            let mut label = v.name().to_string();
            if !classes.is_empty() {
                label.push('.');
                label.push_str(&classes.join("."));
            }
            if let Some(id) = v.id() {
                label.push('#');
                label.push_str(id);
            }
            label
        })
        .collect();

    let iframes = doc
        .select(&IFRAME_SEL)
        .map(|el| {
            let v = el.value();
            IframeInfo {
                src: v.attr("src").map(String::from),
                id: v.attr("id").map(String::from),
                name: v.attr("name").map(String::from),
            }
        })
        .collect();

    LinkReport {
        anchors,
        nav_elements: doc.select(&NAV_SEL).count(),
        aside_elements: doc.select(&ASIDE_SEL).count(),
        token_containers,
        iframes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_anchors_and_structure() {
        let html = r#"<html><body>
            <nav><a href="/record/x.html"> X </a></nav>
            <div class="leftmenu" id="records"><a href="y.html">Y</a></div>
            <iframe src="/frame.html" name="content"></iframe>
            <a href="mailto:docs@example.com">mail</a>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let url = Url::parse("https://h/a/b/c.html").unwrap();
        let report = inspect_links(&doc, &url);

        assert_eq!(report.anchors.len(), 3);
        assert_eq!(report.anchors[0].text, "X");
        assert!(report.anchors[0].is_record);
        assert_eq!(
            report.anchors[0].resolved.as_ref().map(Url::as_str),
            Some("https://h/record/x.html")
        );
        assert!(!report.anchors[1].is_record);
        assert!(report.anchors[2].resolved.is_none());
        assert_eq!(report.record_anchors().count(), 1);

        assert_eq!(report.nav_elements, 1);
        assert_eq!(report.aside_elements, 0);
        assert_eq!(report.token_containers, vec!["div.leftmenu#records"]);

        assert_eq!(report.iframes.len(), 1);
        assert_eq!(report.iframes[0].src.as_deref(), Some("/frame.html"));
        assert_eq!(report.iframes[0].name.as_deref(), Some("content"));
        assert!(report.iframes[0].id.is_none());
    }
}
