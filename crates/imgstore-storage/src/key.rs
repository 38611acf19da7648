//! Slash-joined object keys.

use derive_more::{Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Path separator used for keys and as the listing delimiter.
pub(crate) const DELIMITER: &str = "/";

/// Joins key segments with `/`.
///
/// No normalization is applied: empty segments produce empty path
/// components, exactly as the store would see them.
pub fn join_key<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut key = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            key.push_str(DELIMITER);
        }
        key.push_str(part.as_ref());
    }
    key
}

/// Key of an object or prefix in the bucket.
///
/// Dereferences to `String`, so it can be passed anywhere a `&str` key is
/// expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Deref, Display, From, Into, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Wraps an already joined key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Builds a key from its path segments.
    pub fn join<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(join_key(parts))
    }

    /// Returns the listing prefix for the folder named by this key (`"{key}/"`).
    pub fn folder_prefix(&self) -> String {
        folder_prefix(&self.0)
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StorageKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

/// Listing prefix for `folder`.
pub(crate) fn folder_prefix(folder: &str) -> String {
    format!("{folder}{DELIMITER}")
}

/// Last path segment of a common prefix such as `"images/rpi3/"` → `"rpi3"`.
///
/// Returns `None` for prefixes that do not end in the delimiter, which are
/// not folders.
pub(crate) fn folder_name(prefix: &str) -> Option<&str> {
    let trimmed = prefix.strip_suffix(DELIMITER)?;
    let name = match trimmed.rfind(DELIMITER) {
        Some(idx) => &trimmed[idx + DELIMITER.len()..],
        None => trimmed,
    };
    Some(name)
}
