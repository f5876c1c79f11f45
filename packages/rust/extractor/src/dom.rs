//! Small DOM queries over a parsed document.
//!
//! Everything here is a pure function of an [`Html`] tree, so extraction can
//! be exercised against static fixtures without a browser.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

/// HTML heading levels, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

static HEADING_SELS: LazyLock<[Selector; 6]> = LazyLock::new(|| {
    ["h1", "h2", "h3", "h4", "h5", "h6"]
        .map(|tag| Selector::parse(tag).expect("heading selector"))
});

impl HeadingLevel {
    fn selector(self) -> &'static Selector {
        &HEADING_SELS[self as usize]
    }
}

/// Text content of an element with surrounding whitespace removed.
///
/// Descendant text nodes are joined as they are; whitespace between them is
/// kept.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// First heading whose text satisfies `predicate`.
///
/// Levels are tried in the order given; within a level the first match in
/// document order wins, so an `h2` match beats an earlier `h3` when `levels`
/// lists `H2` first.
pub fn find_heading<'a>(
    doc: &'a Html,
    levels: &[HeadingLevel],
    predicate: impl Fn(&str) -> bool,
) -> Option<ElementRef<'a>> {
    levels.iter().find_map(|level| {
        doc.select(level.selector())
            .find(|el| predicate(&element_text(el)))
    })
}

/// First element named `tag` that comes after `anchor` in document order.
///
/// The anchor's own descendants count as following it, matching how a
/// pre-order walk of the document sees them.
pub fn next_in_document_order<'a>(
    doc: &'a Html,
    anchor: ElementRef<'a>,
    tag: &str,
) -> Option<ElementRef<'a>> {
    doc.tree
        .root()
        .descendants()
        .skip_while(|node| *node != *anchor)
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_heading_respects_level_order() {
        let doc = Html::parse_document(
            "<body><h3>Fields (h3)</h3><h2>Fields (h2)</h2><h4>Fields (h4)</h4></body>",
        );

        let el = find_heading(&doc, &[HeadingLevel::H2, HeadingLevel::H3], |t| t.contains("Fields"))
            .unwrap();
        assert_eq!(el.value().name(), "h2");

        let el = find_heading(&doc, &[HeadingLevel::H4, HeadingLevel::H2], |t| t.contains("Fields"))
            .unwrap();
        assert_eq!(el.value().name(), "h4");
    }

    #[test]
    fn find_heading_first_match_within_level() {
        let doc = Html::parse_document("<body><h2>Overview</h2><h2>Fields</h2><h2>Fields again</h2></body>");
        let el = find_heading(&doc, &[HeadingLevel::H2], |t| t.contains("Fields")).unwrap();
        assert_eq!(element_text(&el), "Fields");
    }

    #[test]
    fn find_heading_none() {
        let doc = Html::parse_document("<body><h2>Sublists</h2><p>Fields</p></body>");
        assert!(find_heading(&doc, &[HeadingLevel::H2, HeadingLevel::H3], |t| t.contains("Fields")).is_none());
    }

    #[test]
    fn next_table_crosses_container_boundaries() {
        let doc = Html::parse_document(
            r#"<body>
                <table id="before"><tr><td>x</td></tr></table>
                <div><h2>Fields</h2></div>
                <section><p>intro</p><table id="after"><tr><td>y</td></tr></table></section>
                <table id="later"></table>
            </body>"#,
        );
        let heading = find_heading(&doc, &[HeadingLevel::H2], |t| t == "Fields").unwrap();
        let table = next_in_document_order(&doc, heading, "table").unwrap();
        assert_eq!(table.value().id(), Some("after"));
    }

    #[test]
    fn next_in_document_order_none_after_last() {
        let doc = Html::parse_document(r#"<body><table></table><h2>Fields</h2><p>end</p></body>"#);
        let heading = find_heading(&doc, &[HeadingLevel::H2], |_| true).unwrap();
        assert!(next_in_document_order(&doc, heading, "table").is_none());
    }

    #[test]
    fn element_text_trims() {
        let doc = Html::parse_document("<body><h1>\n  Account <small>(acct)</small>\n</h1></body>");
        let h1 = find_heading(&doc, &[HeadingLevel::H1], |_| true).unwrap();
        assert_eq!(element_text(&h1), "Account (acct)");
    }

    #[test]
    fn element_text_keeps_inner_whitespace() {
        let doc = Html::parse_document("<body><h1> Line\n  <b>x</b> </h1></body>");
        let h1 = find_heading(&doc, &[HeadingLevel::H1], |_| true).unwrap();
        assert_eq!(element_text(&h1), "Line\n  x");
    }
}
