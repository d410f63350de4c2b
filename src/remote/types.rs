// src/remote/types.rs
// =============================================================================
// Wire types for the Sitecore item API.
//
// Every response, whether it is a single item or a page of children, comes
// back in the same envelope:
//
//   { "statusCode": 200,
//     "error":  { "message": "" },
//     "result": { "totalCount": 1, "resultCount": 1, "items": [ ... ] } }
//
// The envelope is decoded strictly (unknown top-level keys are a decode
// error). Item records keep every key they arrive with, so that what we write
// to disk is what the server sent. All maps are BTreeMaps so the same record
// always serializes to the same bytes.
// =============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Response envelope shared by the full-item and child-listing queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    #[serde(rename = "statusCode")]
    pub status_code: i64,

    #[serde(default)]
    pub error: Option<RemoteMessage>,

    #[serde(default)]
    pub result: Option<ResultSet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteMessage {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultSet {
    #[serde(rename = "totalCount", default)]
    pub total_count: u64,

    #[serde(rename = "resultCount", default)]
    pub result_count: u64,

    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

impl Envelope {
    /// Message reported by the remote side, or an empty string.
    pub fn error_message(&self) -> &str {
        self.error.as_ref().map(|e| e.message.as_str()).unwrap_or("")
    }

    pub fn items(&self) -> &[ItemRecord] {
        self.result.as_ref().map(|r| r.items.as_slice()).unwrap_or(&[])
    }

    pub fn into_items(self) -> Vec<ItemRecord> {
        self.result.map(|r| r.items).unwrap_or_default()
    }

    pub fn total_count(&self) -> u64 {
        self.result.as_ref().map(|r| r.total_count).unwrap_or(0)
    }

    pub fn result_count(&self) -> u64 {
        self.result.as_ref().map(|r| r.result_count).unwrap_or(0)
    }

    /// The single child-index document written for a container.
    pub fn consolidated(total_count: u64, items: Vec<ItemRecord>) -> Self {
        Envelope {
            status_code: 200,
            error: Some(RemoteMessage::default()),
            result: Some(ResultSet {
                total_count,
                result_count: items.len() as u64,
                items,
            }),
        }
    }
}

/// One content item as the API returns it.
///
/// Minimal (listing) payloads carry no `Fields`; full payloads do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "Path", default)]
    pub path: String,

    #[serde(rename = "TemplateName", default)]
    pub template_name: String,

    #[serde(rename = "HasChildren", default)]
    pub has_children: bool,

    #[serde(rename = "Fields", default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Field>>,

    // DisplayName, Template, Version, Url, ... kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ItemRecord {
    /// Value of the first field with the given name.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .as_ref()?
            .values()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// A field on an item: open name -> (declared type, raw value) record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Type", default)]
    pub field_type: String,

    #[serde(rename = "Value", default)]
    pub value: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One decoded page of a child listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub result_count: u64,
    pub items: Vec<ItemRecord>,
}

impl ListingPage {
    pub fn from_envelope(page: u32, page_size: u32, envelope: Envelope) -> Self {
        let total_count = envelope.total_count();
        let result_count = envelope.result_count();
        ListingPage {
            page,
            page_size,
            total_count,
            result_count,
            items: envelope.into_items(),
        }
    }
}

/// `{ABCD-...}` -> `ABCD-...`
pub fn strip_braces(id: &str) -> &str {
    if id.len() > 1 && id.starts_with('{') && id.ends_with('}') {
        &id[1..id.len() - 1]
    } else {
        id
    }
}

/// Key used in media URLs: no braces, no hyphens.
pub fn media_key(id: &str) -> String {
    strip_braces(id).replace('-', "")
}
