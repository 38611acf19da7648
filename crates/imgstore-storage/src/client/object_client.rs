//! Capability trait implemented by every storage client.

use std::fmt;

use crate::Result;
use crate::types::{ListRequest, ListingPage, ObjectContent, ObjectInfo};

/// The three provider operations the facade is built on.
///
/// Implementations must map a missing object to [`Error::NotFound`] and
/// pass every other provider failure through as [`Error::Backend`].
///
/// [`Error::NotFound`]: crate::Error::NotFound
/// [`Error::Backend`]: crate::Error::Backend
#[async_trait::async_trait]
pub trait ObjectClient: fmt::Debug + Send + Sync + 'static {
    /// Unique identifier of the client kind (e.g. `"s3"`, `"memory"`).
    fn id(&self) -> &str;

    /// Fetch object metadata without the body.
    async fn head_object(&self, key: &str) -> Result<ObjectInfo>;

    /// Fetch the whole object.
    async fn get_object(&self, key: &str) -> Result<ObjectContent>;

    /// Fetch one page of a listing.
    async fn list_objects(&self, request: &ListRequest) -> Result<ListingPage>;
}
