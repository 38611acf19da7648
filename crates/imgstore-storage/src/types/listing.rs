//! Paginated listing request and response.

use serde::{Deserialize, Serialize};

/// Parameters of a single list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Only keys starting with this prefix are returned.
    pub prefix: String,
    /// Groups keys sharing the segment up to this delimiter into common prefixes.
    pub delimiter: Option<String>,
    /// Opaque cursor returned by the previous page.
    pub continuation_token: Option<String>,
    /// Page-size hint; providers may return fewer entries.
    pub max_keys: Option<i32>,
}

impl ListRequest {
    /// Creates a request for the first page under `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Sets the delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Sets the page-size hint.
    #[must_use]
    pub fn with_max_keys(mut self, max_keys: Option<i32>) -> Self {
        self.max_keys = max_keys;
        self
    }
}

/// An object entry of a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedObject {
    pub key: String,
    pub size: u64,
}

impl ListedObject {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }
}

/// Result of one list call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    /// Objects matched by the request.
    pub objects: Vec<ListedObject>,
    /// Common prefixes (only populated when a delimiter was sent).
    pub common_prefixes: Vec<String>,
    /// Cursor for the next page.
    pub next_continuation_token: Option<String>,
    /// Whether the provider has more results.
    pub is_truncated: bool,
}

impl ListingPage {
    /// Creates the last (non-truncated) page.
    pub fn last(objects: Vec<ListedObject>, common_prefixes: Vec<String>) -> Self {
        Self {
            objects,
            common_prefixes,
            next_continuation_token: None,
            is_truncated: false,
        }
    }

    /// Marks the page as truncated, resumable with `token`.
    #[must_use]
    pub fn with_next(mut self, token: impl Into<String>) -> Self {
        self.next_continuation_token = Some(token.into());
        self.is_truncated = true;
        self
    }

    /// Sum of the object sizes on this page.
    pub fn total_size(&self) -> u64 {
        self.objects.iter().map(|o| o.size).sum()
    }
}
