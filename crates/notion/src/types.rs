//! Wire structs for the subset of the Notion API that ntx consumes.
//!
//! Only the fields the generator and runtime client actually read are
//! modeled; unknown fields are ignored on deserialization. Query result rows
//! are kept as raw `serde_json::Value` on purpose — the response simplifier
//! owns their interpretation and the raw page is handed back to callers
//! untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One run of rich text. Only the plain rendering is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RichTextRun {
    /// Concatenation-ready plain text of this run.
    #[serde(default)]
    pub plain_text: String,
}

/// One option of a `select` or `multi_select` property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectOption {
    /// Remote-assigned option id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable option label.
    pub name: String,
    /// Display color. Unused by ntx but round-tripped for completeness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Kind-specific metadata for choice-like properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectMeta {
    /// Ordered option list as configured remotely.
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

/// One property descriptor of a database schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteProperty {
    /// Remote property id.
    #[serde(default)]
    pub id: String,
    /// Remote property name (the human-facing column name).
    #[serde(default)]
    pub name: String,
    /// Kind discriminator string (`title`, `select`, `relation`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Option list for `select` properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<SelectMeta>,
    /// Option list for `multi_select` properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_select: Option<SelectMeta>,
}

impl RemoteProperty {
    /// Option labels for choice-like kinds, in remote order.
    pub fn option_names(&self) -> Vec<String> {
        let meta = self.select.as_ref().or(self.multi_select.as_ref());
        meta.map(|m| m.options.iter().map(|o| o.name.clone()).collect())
            .unwrap_or_default()
    }
}

/// A database schema as returned by the schema-retrieval call.
///
/// Properties are keyed by remote name in a `BTreeMap` so that iteration
/// order is stable across fetches of the same schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    /// Remote database identifier.
    pub id: String,
    /// Database title as rich text runs.
    #[serde(default)]
    pub title: Vec<RichTextRun>,
    /// Property descriptors keyed by remote property name.
    #[serde(default)]
    pub properties: BTreeMap<String, RemoteProperty>,
}

impl Database {
    /// Plain-text database title, or `"Untitled"` when the title is empty.
    pub fn display_name(&self) -> String {
        let joined: String = self.title.iter().map(|run| run.plain_text.as_str()).collect();
        if joined.is_empty() {
            "Untitled".to_string()
        } else {
            joined
        }
    }
}

/// Sort direction of a wire sort entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// One wire sort entry, already using the remote property name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sort {
    /// Remote property name to sort on.
    pub property: String,
    /// Sort direction.
    pub direction: SortDirection,
}

/// Body of a database query call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryRequest {
    /// Compiled wire filter, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    /// Wire sort entries, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorts: Option<Vec<Sort>>,
    /// Resume cursor from a previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    /// Page size cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// One page of raw query results.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    /// Raw result rows, untouched.
    #[serde(default)]
    pub results: Vec<Value>,
    /// Cursor for the next page, when `has_more` is set.
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Whether more pages exist.
    #[serde(default)]
    pub has_more: bool,
}

/// Parent reference of a page creation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageParent {
    /// The database the new record belongs to.
    pub database_id: String,
}

/// Page icon, emoji form only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    /// A single emoji icon.
    Emoji {
        /// The emoji character.
        emoji: String,
    },
}

/// Body of a page creation call.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePageRequest {
    /// Parent database reference.
    pub parent: PageParent,
    /// Property payloads keyed by remote property name.
    pub properties: serde_json::Map<String, Value>,
    /// Optional page icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}
