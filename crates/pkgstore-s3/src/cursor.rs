//! Pagination state for aggregated listings.

use std::collections::HashSet;

use pkgstore_object::ListPage;

use crate::{StorageError, StorageResult};

/// Deduplicated set of object keys gathered across listing pages.
pub type ObjectKeys = HashSet<String>;

/// Cursor threaded through the pages of one aggregated listing.
///
/// Starts out expecting a page; each [`advance`](Self::advance) moves the
/// marker to the last key of the page and records whether the store
/// reported more results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCursor {
    marker: String,
    truncated: bool,
    pages: usize,
}

impl ListCursor {
    /// Creates a cursor starting after `marker` (empty for the beginning).
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            truncated: true,
            pages: 0,
        }
    }

    /// Marker to send with the next page request.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Number of pages applied so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Whether another page must be fetched.
    #[inline]
    pub fn has_more(&self) -> bool {
        self.truncated
    }

    /// Applies a fetched page to the cursor.
    ///
    /// The next marker is the key of the last entry; an empty page falls
    /// back to the store-reported `next_marker`. A truncated page that
    /// leaves the marker where it was would make the next request identical
    /// to this one, so it fails with [`StorageError::Pagination`] instead.
    pub fn advance(&mut self, page: &ListPage) -> StorageResult<()> {
        self.pages += 1;
        self.truncated = page.is_truncated;

        let next = page.last_key().or(page.next_marker.as_deref());
        match next {
            Some(marker) if marker != self.marker => {
                self.marker = marker.to_owned();
                Ok(())
            }
            _ if !self.truncated => Ok(()),
            _ => Err(StorageError::Pagination {
                marker: self.marker.clone(),
                pages: self.pages,
            }),
        }
    }
}

impl Default for ListCursor {
    fn default() -> Self {
        Self::new(String::new())
    }
}
