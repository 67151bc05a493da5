//! Listing request parameters and page types.

use serde::{Deserialize, Serialize};

/// Parameters of a single listing request.
///
/// Every field is optional; an empty `marker` is the same as no marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Only list keys starting with this string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Start listing after this key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Upper bound on the number of entries in one page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_keys: Option<u32>,
    /// Roll up keys sharing a prefix up to this delimiter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

impl ListParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the marker.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_max_keys(mut self, max_keys: u32) -> Self {
        self.max_keys = Some(max_keys);
        self
    }

    /// Sets the delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Returns the marker, treating an empty string as absent.
    pub fn effective_marker(&self) -> Option<&str> {
        self.marker.as_deref().filter(|m| !m.is_empty())
    }
}

/// One object in a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Full store key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time.
    pub last_modified: Option<jiff::Timestamp>,
    /// Entity tag.
    pub e_tag: Option<String>,
    /// Storage tier the object lives in.
    pub storage_class: Option<String>,
}

impl ListEntry {
    /// Creates an entry with only a key and a size.
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
            e_tag: None,
            storage_class: None,
        }
    }
}

/// One page of a listing, returned as the store produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Entries in store order.
    pub contents: Vec<ListEntry>,
    /// Whether more entries remain after this page.
    pub is_truncated: bool,
    /// Cursor for the next page, when the store reports one.
    pub next_marker: Option<String>,
    /// Rolled-up prefixes when a delimiter was requested.
    pub common_prefixes: Vec<String>,
}

impl ListPage {
    /// Creates a page from entries and a truncation flag.
    pub fn new(contents: Vec<ListEntry>, is_truncated: bool) -> Self {
        Self {
            contents,
            is_truncated,
            next_marker: None,
            common_prefixes: Vec::new(),
        }
    }

    /// Sets the store-reported cursor.
    #[must_use]
    pub fn with_next_marker(mut self, next_marker: impl Into<String>) -> Self {
        self.next_marker = Some(next_marker.into());
        self
    }

    /// Key of the last entry, the natural cursor for the next page.
    pub fn last_key(&self) -> Option<&str> {
        self.contents.last().map(|entry| entry.key.as_str())
    }

    /// Iterates over the entry keys in store order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.contents.iter().map(|entry| entry.key.as_str())
    }
}
