//! Prelude module for convenient imports.

pub use crate::client::{ObjectClient, ObjectStoreClient, S3Client};
pub use crate::types::{ListRequest, ListedObject, ListingPage, ObjectContent, ObjectInfo};
pub use crate::{
    AuthStyle, Error, Result, Storage, StorageBackend, StorageConfig, StorageKey, join_key,
};
