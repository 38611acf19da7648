#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for storage client operations.
///
/// Use this target for logging client construction and provider requests.
pub const TRACING_TARGET_CLIENT: &str = "imgstore_storage::client";

/// Tracing target for facade operations.
///
/// Use this target for logging lookups, pagination progress and aggregation.
pub const TRACING_TARGET_STORAGE: &str = "imgstore_storage::storage";

pub mod client;
mod config;
mod error;
mod key;
mod storage;
pub mod types;

#[doc(hidden)]
pub mod prelude;

pub use config::{AuthStyle, StorageBackend, StorageConfig};
pub use error::{Error, Result};
pub use key::{StorageKey, join_key};
pub use storage::Storage;
