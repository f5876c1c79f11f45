//! Href resolution against the page that contains the link.

use url::Url;

/// Resolve an `href` found on the page at `base` into an absolute URL.
///
/// Uses standard reference resolution, so absolute hrefs pass through,
/// root-relative hrefs keep only the base's scheme and host, and anything
/// else resolves against the base's parent path. Fragments are dropped.
///
/// Returns `None` for empty or in-page hrefs, `javascript:`/`mailto:` links,
/// unparsable references, and non-HTTP results.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("mailto:") {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => {}
        _ => return None,
    }
    resolved.set_fragment(None);
    Some(resolved)
}
