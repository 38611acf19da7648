//! Object bytes returned by a GET request.

use bytes::Bytes;

use super::ObjectInfo;

/// Full contents of an object together with its metadata.
#[derive(Debug, Clone)]
pub struct ObjectContent {
    /// Metadata reported alongside the body.
    pub info: ObjectInfo,
    data: Bytes,
}

impl ObjectContent {
    /// Creates a new [`ObjectContent`].
    pub fn new(info: ObjectInfo, data: Bytes) -> Self {
        Self { info, data }
    }

    /// Consume the content, returning the body.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    /// Return a byte-slice view of the content.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the content-type, if known.
    pub fn content_type(&self) -> Option<&str> {
        self.info.content_type.as_deref()
    }

    /// Number of bytes in the body.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the body is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
