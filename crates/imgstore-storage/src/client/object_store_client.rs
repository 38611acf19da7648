//! Storage client backed by [`object_store::ObjectStore`].
//!
//! [`ObjectStoreClient`] is a thin, cloneable wrapper around
//! `Arc<dyn ObjectStore>` used for the local filesystem and in-memory
//! backends. `object_store` drives its own pagination, so every listing is
//! answered as a single, non-truncated page.

use std::path::Path as FsPath;
use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectMeta, ObjectStore, PutOptions, PutPayload};

use super::ObjectClient;
use crate::key::DELIMITER;
use crate::types::{ListRequest, ListedObject, ListingPage, ObjectContent, ObjectInfo};
use crate::{Error, Result, TRACING_TARGET_CLIENT};

/// Cloneable handle to any [`ObjectStore`] backend.
///
/// All methods accept slash-separated string keys and convert them to
/// [`object_store::path::Path`] internally.
#[derive(Clone, Debug)]
pub struct ObjectStoreClient {
    store: Arc<dyn ObjectStore>,
    id: &'static str,
}

impl ObjectStoreClient {
    /// Wrap a concrete [`ObjectStore`] implementation.
    pub fn new(store: impl ObjectStore, id: &'static str) -> Self {
        Self {
            store: Arc::new(store),
            id,
        }
    }

    /// Create an empty in-memory store.
    pub fn memory() -> Self {
        Self::new(InMemory::new(), "memory")
    }

    /// Serve objects from files under `root`, which must exist.
    pub fn local(root: impl AsRef<FsPath>) -> Result<Self> {
        let root = root.as_ref();
        let store = LocalFileSystem::new_with_prefix(root).map_err(|e| {
            Error::invalid_config(format!(
                "cannot use '{}' as storage root: {e}",
                root.display()
            ))
        })?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            root = %root.display(),
            "Local storage client initialized"
        );

        Ok(Self::new(store, "local"))
    }

    /// Upload `data` to `key`, optionally setting the content-type.
    ///
    /// Used to seed development and test stores; the facade itself is
    /// read-only.
    #[tracing::instrument(name = "object.put", skip(self, data), fields(size = data.len()))]
    pub async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> Result<()> {
        let mut opts = PutOptions::default();
        if let Some(ct) = content_type {
            opts.attributes
                .insert(object_store::Attribute::ContentType, ct.to_string().into());
        }
        self.store
            .put_opts(&Path::from(key), PutPayload::from(data), opts)
            .await
            .map_err(|e| from_object_store("put", key, e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ObjectClient for ObjectStoreClient {
    fn id(&self) -> &str {
        self.id
    }

    #[tracing::instrument(name = "object.head", skip(self))]
    async fn head_object(&self, key: &str) -> Result<ObjectInfo> {
        let meta = self
            .store
            .head(&Path::from(key))
            .await
            .map_err(|e| from_object_store("head", key, e))?;
        Ok(to_object_info(key, &meta))
    }

    #[tracing::instrument(name = "object.get", skip(self))]
    async fn get_object(&self, key: &str) -> Result<ObjectContent> {
        let result = self
            .store
            .get(&Path::from(key))
            .await
            .map_err(|e| from_object_store("get", key, e))?;

        let mut info = to_object_info(key, &result.meta);
        info.content_type = result
            .attributes
            .get(&object_store::Attribute::ContentType)
            .map(|v| v.to_string());

        let data = result
            .bytes()
            .await
            .map_err(|e| from_object_store("get", key, e))?;
        Ok(ObjectContent::new(info, data))
    }

    #[tracing::instrument(name = "object.list", skip_all, fields(prefix = %request.prefix))]
    async fn list_objects(&self, request: &ListRequest) -> Result<ListingPage> {
        let prefix = match to_list_prefix(&request.prefix) {
            ListPrefix::Root => None,
            ListPrefix::Path(path) => Some(path),
            ListPrefix::Unmatchable => {
                tracing::debug!(
                    target: TRACING_TARGET_CLIENT,
                    prefix = %request.prefix,
                    "Prefix has an empty segment, nothing can match"
                );
                return Ok(ListingPage::default());
            }
        };

        let page = match request.delimiter.as_deref() {
            Some(_) => {
                let listing = self
                    .store
                    .list_with_delimiter(prefix.as_ref())
                    .await
                    .map_err(|e| from_object_store("list", &request.prefix, e))?;

                ListingPage::last(
                    listing.objects.iter().map(to_listed_object).collect(),
                    listing
                        .common_prefixes
                        .iter()
                        .map(|p| format!("{p}{DELIMITER}"))
                        .collect(),
                )
            }
            None => {
                let objects: Vec<ObjectMeta> = self
                    .store
                    .list(prefix.as_ref())
                    .try_collect()
                    .await
                    .map_err(|e| from_object_store("list", &request.prefix, e))?;

                ListingPage::last(objects.iter().map(to_listed_object).collect(), Vec::new())
            }
        };

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            objects = page.objects.len(),
            common_prefixes = page.common_prefixes.len(),
            "Listing complete"
        );

        Ok(page)
    }
}

/// An S3-style key prefix mapped onto `object_store` paths.
enum ListPrefix {
    /// The empty prefix lists the whole store.
    Root,
    Path(Path),
    /// `object_store` paths have no empty segments, so a prefix such as
    /// `"/"` or `"a//"` matches no stored object.
    Unmatchable,
}

/// Strips exactly one trailing delimiter and converts the rest.
fn to_list_prefix(prefix: &str) -> ListPrefix {
    if prefix.is_empty() {
        return ListPrefix::Root;
    }

    let trimmed = prefix.strip_suffix(DELIMITER).unwrap_or(prefix);
    if trimmed.split(DELIMITER).any(str::is_empty) {
        return ListPrefix::Unmatchable;
    }

    ListPrefix::Path(Path::from(trimmed))
}

fn to_object_info(key: &str, meta: &ObjectMeta) -> ObjectInfo {
    let mut info = ObjectInfo::new(key, meta.size);
    info.last_modified =
        jiff::Timestamp::from_millisecond(meta.last_modified.timestamp_millis()).ok();
    info.e_tag = meta.e_tag.clone();
    info
}

fn to_listed_object(meta: &ObjectMeta) -> ListedObject {
    ListedObject::new(meta.location.to_string(), meta.size)
}

/// Convert an [`object_store::Error`] into a crate [`Error`].
fn from_object_store(operation: &'static str, key: &str, err: object_store::Error) -> Error {
    match err {
        object_store::Error::NotFound { .. } => Error::not_found(key),
        err => Error::backend(operation, err),
    }
}
