//! Core domain types: records, their fields, and crawl output.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FieldDescriptor
// ---------------------------------------------------------------------------

/// One row of a record's Fields table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Script id of the field (first column).
    pub internal_id: String,
    /// Field type as printed by the browser (`select`, `text`, ...).
    #[serde(rename = "type")]
    pub field_type: String,
    /// Whether the field supports `nlapiSubmitField`, verbatim.
    pub nlsapi_submit_field: String,
    /// UI label.
    pub label: String,
    /// Mandatory flag.
    pub required: bool,
    /// Help text.
    pub help: String,
}

// ---------------------------------------------------------------------------
// RecordEntry
// ---------------------------------------------------------------------------

/// A documented record type together with its field definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEntry {
    /// Display name taken from the page's `h1`.
    pub record_name: String,
    /// Identifier derived from the page URL, not from page text.
    pub record_internal_id: String,
    /// Field rows in table order.
    pub fields: Vec<FieldDescriptor>,
}

/// The records produced by a crawl, one per successfully processed page.
pub type CrawlResult = Vec<RecordEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_field() -> FieldDescriptor {
        FieldDescriptor {
            internal_id: "subsidiary".into(),
            field_type: "select".into(),
            nlsapi_submit_field: "false".into(),
            label: "Subsidiary".into(),
            required: true,
            help: "The subsidiary this record belongs to.".into(),
        }
    }

    #[test]
    fn field_uses_published_key_names() {
        let json = serde_json::to_value(sample_field()).expect("serialize");
        let obj = json.as_object().expect("object");
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["help", "internalId", "label", "nlsapiSubmitField", "required", "type"]
        );
        assert_eq!(json["type"], "select");
        assert_eq!(json["required"], true);
    }

    #[test]
    fn record_entry_shape() {
        let entry = RecordEntry {
            record_name: "Amortization Template".into(),
            record_internal_id: "amortizationtemplate".into(),
            fields: vec![sample_field()],
        };

        let json = serde_json::to_string_pretty(&vec![entry.clone()]).expect("serialize");
        assert!(json.contains("\"recordName\": \"Amortization Template\""));
        assert!(json.contains("\"recordInternalId\": \"amortizationtemplate\""));

        let parsed: CrawlResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, vec![entry]);
    }
}
