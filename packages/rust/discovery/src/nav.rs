//! Navigation container heuristics.
//!
//! The records browser lists every record in a side menu, but its markup is
//! not stable enough to target with one selector. A container counts as
//! navigation if it is a `nav`/`aside` element, or a block element whose
//! `class` or `id` mentions one of [`NAV_TOKENS`].

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Class/id fragments that mark an element as navigation.
pub const NAV_TOKENS: [&str; 5] = ["nav", "sidebar", "menu", "toc", "tree"];

/// Elements that are navigation by tag alone.
const NAV_TAGS: [&str; 2] = ["nav", "aside"];

/// Elements eligible for the class/id token test.
static CONTAINER_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("nav, aside, div, section, ul, ol").expect("container selector")
});

static NAV_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = NAV_TOKENS.join("|");
    Regex::new(&format!("(?i)(?:{alternation})")).expect("nav token regex")
});

/// Whether `el` looks like a navigation container.
pub fn is_nav_container(el: &ElementRef<'_>) -> bool {
    let value = el.value();
    if NAV_TAGS.contains(&value.name()) {
        return true;
    }
    has_nav_token(el)
}

/// Whether the element's `class` or `id` attribute mentions a nav token.
pub(crate) fn has_nav_token(el: &ElementRef<'_>) -> bool {
    let value = el.value();
    ["class", "id"]
        .iter()
        .filter_map(|attr| value.attr(attr))
        .any(|v| NAV_TOKEN_RE.is_match(v))
}

/// All navigation containers in document order.
///
/// Nested containers are all returned; callers deduplicate what they collect.
pub fn find_nav_containers(doc: &Html) -> Vec<ElementRef<'_>> {
    doc.select(&CONTAINER_SEL)
        .filter(is_nav_container)
        .collect()
}
