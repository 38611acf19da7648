//! The storage facade.
//!
//! [`Storage`] turns the provider's HEAD, GET and paginated LIST calls into
//! the handful of lookups the image registry needs: object metadata and
//! content, existence checks, the total size of a folder and the names of
//! its immediate sub-folders.
//!
//! Aggregations walk the listing sequentially. Each page is requested only
//! after the previous one arrived, and any failure discards the partial
//! result.

use std::collections::HashSet;
use std::sync::Arc;

use crate::client::{ObjectClient, ObjectStoreClient, S3Client};
use crate::key::{DELIMITER, folder_name, folder_prefix};
use crate::types::{ListRequest, ListingPage, ObjectContent, ObjectInfo};
use crate::{Error, Result, StorageBackend, StorageConfig, TRACING_TARGET_STORAGE};

/// Key probed by [`Storage::verify_reachable`].
const VERIFY_PROBE_KEY: &str = "_imgstore_verify_probe";

/// Read-only facade over a storage client.
///
/// Cloning is cheap and clones share the underlying client.
#[derive(Clone, Debug)]
pub struct Storage {
    client: Arc<dyn ObjectClient>,
    page_size: Option<i32>,
}

impl Storage {
    /// Wrap a client.
    pub fn new(client: impl ObjectClient) -> Self {
        Self::from_client(Arc::new(client))
    }

    /// Wrap a shared client.
    pub fn from_client(client: Arc<dyn ObjectClient>) -> Self {
        Self {
            client,
            page_size: None,
        }
    }

    /// Build the client selected by `config`.
    ///
    /// The backend and, for S3, the signing style are fixed here for the
    /// lifetime of the facade.
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        config.validate()?;

        let client: Arc<dyn ObjectClient> = match config.storage_backend {
            StorageBackend::S3 => Arc::new(S3Client::connect(config).await?),
            StorageBackend::Local => {
                let root = config.storage_root.as_deref().ok_or_else(|| {
                    Error::invalid_config("local backend requires a root directory")
                })?;
                Arc::new(ObjectStoreClient::local(root)?)
            }
            StorageBackend::Memory => Arc::new(ObjectStoreClient::memory()),
        };

        tracing::info!(
            target: TRACING_TARGET_STORAGE,
            backend = %config.storage_backend,
            client = client.id(),
            page_size = ?config.page_size(),
            "Storage initialized"
        );

        Ok(Self::from_client(client).with_page_size(config.page_size()))
    }

    /// Set the page-size hint sent with every list request.
    #[must_use]
    pub fn with_page_size(mut self, page_size: Option<i32>) -> Self {
        self.page_size = page_size;
        self
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &dyn ObjectClient {
        self.client.as_ref()
    }

    /// Verify that the backing store is reachable.
    ///
    /// Issues a HEAD for a probe key. A not-found response is treated as
    /// success (the bucket answered), any other error is propagated.
    #[tracing::instrument(name = "storage.verify", skip(self))]
    pub async fn verify_reachable(&self) -> Result<()> {
        match self.client.head_object(VERIFY_PROBE_KEY).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Metadata of the object at `key`.
    ///
    /// Fails with [`Error::NotFound`] if the object does not exist.
    #[tracing::instrument(name = "storage.get_file_info", skip(self))]
    pub async fn get_file_info(&self, key: &str) -> Result<ObjectInfo> {
        self.client.head_object(key).await
    }

    /// Contents of the object at `key`.
    ///
    /// Fails with [`Error::NotFound`] if the object does not exist.
    #[tracing::instrument(name = "storage.get_file", skip(self))]
    pub async fn get_file(&self, key: &str) -> Result<ObjectContent> {
        self.client.get_object(key).await
    }

    /// Whether an object exists at `key`.
    ///
    /// Only a not-found answer maps to `false`; every other failure is
    /// returned to the caller.
    #[tracing::instrument(name = "storage.file_exists", skip(self))]
    pub async fn file_exists(&self, key: &str) -> Result<bool> {
        match self.get_file_info(key).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Total size in bytes of every object below `folder/`.
    #[tracing::instrument(name = "storage.get_folder_size", skip(self))]
    pub async fn get_folder_size(&self, folder: &str) -> Result<u64> {
        let request = ListRequest::new(folder_prefix(folder)).with_max_keys(self.page_size);

        let mut total = 0u64;
        let pages = self
            .paginate(request, |page| total += page.total_size())
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_STORAGE,
            folder,
            pages,
            total,
            "Folder size computed"
        );
        Ok(total)
    }

    /// Names of the immediate sub-folders of `folder/`, in listing order.
    #[tracing::instrument(name = "storage.list_folders", skip(self))]
    pub async fn list_folders(&self, folder: &str) -> Result<Vec<String>> {
        let request = ListRequest::new(folder_prefix(folder))
            .with_delimiter(DELIMITER)
            .with_max_keys(self.page_size);

        let mut folders = Vec::new();
        let pages = self
            .paginate(request, |page| {
                folders.extend(
                    page.common_prefixes
                        .iter()
                        .filter_map(|prefix| folder_name(prefix))
                        .map(str::to_owned),
                );
            })
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_STORAGE,
            folder,
            pages,
            count = folders.len(),
            "Folders listed"
        );
        Ok(folders)
    }

    /// Feeds every page of the listing described by `request` to `on_page`.
    ///
    /// `is_truncated` decides whether another page is requested; the
    /// continuation token is only the cursor. A truncated page without a
    /// token ends the walk. A token that was already sent during this walk
    /// aborts it. Returns the number of pages fetched.
    async fn paginate<F>(&self, mut request: ListRequest, mut on_page: F) -> Result<usize>
    where
        F: FnMut(ListingPage),
    {
        let mut pages = 0usize;
        let mut sent_tokens = HashSet::new();

        loop {
            let mut page = self.client.list_objects(&request).await?;
            pages += 1;

            let is_truncated = page.is_truncated;
            let next_token = page.next_continuation_token.take();
            on_page(page);

            if !is_truncated {
                break;
            }

            let Some(token) = next_token else {
                tracing::warn!(
                    target: TRACING_TARGET_STORAGE,
                    prefix = %request.prefix,
                    pages,
                    "Listing reported truncation without a continuation token"
                );
                break;
            };

            if !sent_tokens.insert(token.clone()) {
                return Err(Error::pagination(
                    request.prefix,
                    format!("continuation token '{token}' was already used"),
                ));
            }

            tracing::trace!(
                target: TRACING_TARGET_STORAGE,
                prefix = %request.prefix,
                pages,
                "Fetching next listing page"
            );
            request.continuation_token = Some(token);
        }

        Ok(pages)
    }
}
