//! Record page extraction for the records browser.
//!
//! A record page has an `h1` with the record's name and a "Fields" heading
//! followed by a six-column table. This crate provides:
//! - [`dom`]: pure DOM queries (heading search, document-order lookups)
//! - [`extract_record`]: page → [`RecordEntry`](nsrecords_shared::RecordEntry)

pub mod dom;
mod record;

pub use dom::HeadingLevel;
pub use record::{
    ExtractError, FIELDS_HEADING_LEVELS, FIELDS_HEADING_TEXT, extract_record, is_required,
    parse_field_row, record_internal_id,
};

use nsrecords_shared::{RecordEntry, Result};
use scraper::Html;
use url::Url;

/// Parse `html` and extract its record, attaching `url` to any failure.
pub fn extract_record_from_html(html: &str, url: &Url) -> Result<RecordEntry> {
    let doc = Html::parse_document(html);
    extract_record(&doc, url).map_err(|e| e.at(url))
}
