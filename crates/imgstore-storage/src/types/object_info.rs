//! Object metadata returned by a HEAD request.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Metadata of a single stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    /// Key the metadata was requested for.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time, if the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
    /// Entity tag, if the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
    /// MIME content-type, if the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl ObjectInfo {
    /// Creates metadata with only key and size set.
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
            e_tag: None,
            content_type: None,
        }
    }
}
