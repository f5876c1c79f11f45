//! Record page extraction.

use std::sync::LazyLock;

use nsrecords_shared::{FieldDescriptor, NsRecordsError, RecordEntry};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::dom::{HeadingLevel, element_text, find_heading, next_in_document_order};

/// Text the Fields heading must contain.
pub const FIELDS_HEADING_TEXT: &str = "Fields";

/// Heading levels searched for the Fields heading, in priority order.
pub const FIELDS_HEADING_LEVELS: [HeadingLevel; 3] =
    [HeadingLevel::H2, HeadingLevel::H3, HeadingLevel::H4];

/// Cells a Fields row needs to be kept.
const FIELD_COLUMNS: usize = 6;

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("row selector"));

static CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("cell selector"));

/// Why a page yielded no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("no h1 heading")]
    MissingTitle,

    #[error("no heading containing \"Fields\"")]
    MissingFieldsHeading,

    #[error("no table after the \"Fields\" heading")]
    MissingFieldsTable,
}

impl ExtractError {
    /// Attach the page URL, producing the workspace error type.
    pub fn at(self, url: &Url) -> NsRecordsError {
        NsRecordsError::Extract {
            url: url.to_string(),
            message: self.to_string(),
        }
    }
}

/// Extract a [`RecordEntry`] from a parsed record page.
pub fn extract_record(doc: &Html, url: &Url) -> Result<RecordEntry, ExtractError> {
    let title = find_heading(doc, &[HeadingLevel::H1], |_| true)
        .ok_or(ExtractError::MissingTitle)?;
    let record_name = element_text(&title);

    let record_internal_id = record_internal_id(url);

    let heading = find_heading(doc, &FIELDS_HEADING_LEVELS, |text| {
        text.contains(FIELDS_HEADING_TEXT)
    })
    .ok_or(ExtractError::MissingFieldsHeading)?;

    let table =
        next_in_document_order(doc, heading, "table").ok_or(ExtractError::MissingFieldsTable)?;

    let mut rows = 0usize;
    let fields: Vec<FieldDescriptor> = table
        .select(&ROW_SEL)
        .skip(1)
        .inspect(|_| rows += 1)
        .filter_map(parse_field_row)
        .collect();

    debug!(
        %url,
        record = %record_name,
        rows,
        fields = fields.len(),
        dropped = rows - fields.len(),
        "record extracted"
    );

    Ok(RecordEntry {
        record_name,
        record_internal_id,
        fields,
    })
}

/// Map one table row to a field; rows with fewer than six cells yield `None`.
pub fn parse_field_row(row: ElementRef<'_>) -> Option<FieldDescriptor> {
    let cells: Vec<String> = row.select(&CELL_SEL).map(|c| element_text(&c)).collect();
    if cells.len() < FIELD_COLUMNS {
        return None;
    }

    let mut cells = cells.into_iter();
    let mut next = || cells.next().unwrap_or_default();
    let internal_id = next();
    let field_type = next();
    let nlsapi_submit_field = next();
    let label = next();
    let required = is_required(&next());
    let help = next();

    Some(FieldDescriptor {
        internal_id,
        field_type,
        nlsapi_submit_field,
        label,
        required,
        help,
    })
}

/// Whether a Required cell reads `true`, ignoring case and outer whitespace.
pub fn is_required(cell: &str) -> bool {
    cell.trim().eq_ignore_ascii_case("true")
}

/// Record id from the last path segment of `url`, extension stripped.
///
/// In-page "Internal ID" text is not consulted.
pub fn record_internal_id(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .unwrap_or("");

    match segment.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
        _ => segment.to_string(),
    }
}
