//! Storage connection configuration.

use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result};

/// How requests to the S3 endpoint are authenticated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum AuthStyle {
    /// Requests are signed (SigV4) with credentials from the default AWS chain.
    #[serde(rename = "SIGV4")]
    #[strum(serialize = "SIGV4")]
    SigV4,
    /// Requests are sent unsigned, for publicly readable buckets.
    #[default]
    #[serde(rename = "NONE", alias = "UNSIGNED")]
    #[strum(to_string = "NONE", serialize = "UNSIGNED")]
    Unsigned,
}

/// Which store backs the facade.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Amazon S3 or any S3-compatible endpoint.
    #[default]
    S3,
    /// A directory on the local filesystem.
    Local,
    /// A process-local in-memory store.
    Memory,
}

/// Configuration for the image storage with sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct StorageConfig {
    /// Bucket holding the images
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-bucket", env = "IMAGE_STORAGE_BUCKET")
    )]
    pub storage_bucket: String,

    /// Custom endpoint URL (for S3-compatible storage like MinIO)
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-endpoint", env = "IMAGE_STORAGE_ENDPOINT")
    )]
    #[serde(default)]
    pub storage_endpoint: Option<String>,

    /// Use path-style addressing (`endpoint/bucket/key`) instead of virtual hosts
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-force-path-style", env = "IMAGE_STORAGE_FORCE_PATH_STYLE")
    )]
    #[serde(default)]
    pub storage_force_path_style: bool,

    /// Request signing: `SIGV4` or `NONE`
    #[cfg_attr(
        feature = "config",
        arg(
            long = "storage-auth-style",
            env = "IMAGE_STORAGE_AUTH_STYLE",
            default_value_t = AuthStyle::Unsigned
        )
    )]
    #[serde(default)]
    pub storage_auth_style: AuthStyle,

    /// AWS region (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-region", env = "IMAGE_STORAGE_REGION")
    )]
    #[serde(default)]
    pub storage_region: Option<String>,

    /// Storage backend: `s3`, `local` or `memory`
    #[cfg_attr(
        feature = "config",
        arg(
            long = "storage-backend",
            env = "IMAGE_STORAGE_BACKEND",
            default_value_t = StorageBackend::S3
        )
    )]
    #[serde(default)]
    pub storage_backend: StorageBackend,

    /// Root directory for the `local` backend
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-root", env = "IMAGE_STORAGE_ROOT")
    )]
    #[serde(default)]
    pub storage_root: Option<PathBuf>,

    /// Maximum keys requested per listing page (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-page-size", env = "IMAGE_STORAGE_PAGE_SIZE")
    )]
    #[serde(default)]
    pub storage_page_size: Option<i32>,
}

// Default values
const DEFAULT_REGION: &str = "us-east-1";
const MAX_PAGE_SIZE: i32 = 1000;

impl StorageConfig {
    /// Create a new S3 configuration for `bucket`.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            storage_bucket: bucket.into(),
            storage_endpoint: None,
            storage_force_path_style: false,
            storage_auth_style: AuthStyle::default(),
            storage_region: None,
            storage_backend: StorageBackend::default(),
            storage_root: None,
            storage_page_size: None,
        }
    }

    /// Create a configuration for the in-memory backend.
    pub fn memory() -> Self {
        Self::new("memory").with_backend(StorageBackend::Memory)
    }

    /// Create a configuration for the local filesystem backend rooted at `root`.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::new("local")
            .with_backend(StorageBackend::Local)
            .with_root(root)
    }

    /// Returns the region, using the default if not set.
    #[inline]
    pub fn region(&self) -> &str {
        self.storage_region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Returns the page-size hint sent with list requests, if any.
    #[inline]
    pub fn page_size(&self) -> Option<i32> {
        self.storage_page_size
    }

    /// Set the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.storage_endpoint = Some(endpoint.into());
        self
    }

    /// Enable or disable path-style addressing.
    #[must_use]
    pub fn with_force_path_style(mut self, force_path_style: bool) -> Self {
        self.storage_force_path_style = force_path_style;
        self
    }

    /// Set the request signing style.
    #[must_use]
    pub fn with_auth_style(mut self, auth_style: AuthStyle) -> Self {
        self.storage_auth_style = auth_style;
        self
    }

    /// Set the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.storage_region = Some(region.into());
        self
    }

    /// Set the backend.
    #[must_use]
    pub fn with_backend(mut self, backend: StorageBackend) -> Self {
        self.storage_backend = backend;
        self
    }

    /// Set the local root directory.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage_root = Some(root.into());
        self
    }

    /// Set the listing page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.storage_page_size = Some(page_size);
        self
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.storage_page_size
            && !(1..=MAX_PAGE_SIZE).contains(&size)
        {
            return Err(Error::invalid_config(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {size}"
            )));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.storage_bucket.trim().is_empty() {
                    return Err(Error::invalid_config("bucket cannot be empty"));
                }
                if let Some(endpoint) = &self.storage_endpoint
                    && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
                {
                    return Err(Error::invalid_config(format!(
                        "invalid endpoint URL format: {endpoint}"
                    )));
                }
            }
            StorageBackend::Local => {
                if self.storage_root.is_none() {
                    return Err(Error::invalid_config(
                        "local backend requires a root directory",
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = StorageConfig::new("images");
        assert_eq!(config.storage_bucket, "images");
        assert_eq!(config.region(), "us-east-1");
        assert_eq!(config.storage_auth_style, AuthStyle::Unsigned);
        assert_eq!(config.storage_backend, StorageBackend::S3);
        assert!(!config.storage_force_path_style);
        assert_eq!(config.page_size(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StorageConfig::new("images")
            .with_endpoint("http://localhost:9000")
            .with_force_path_style(true)
            .with_auth_style(AuthStyle::SigV4)
            .with_region("eu-central-1")
            .with_page_size(250);

        assert_eq!(config.storage_endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(config.storage_force_path_style);
        assert_eq!(config.storage_auth_style, AuthStyle::SigV4);
        assert_eq!(config.region(), "eu-central-1");
        assert_eq!(config.page_size(), Some(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(StorageConfig::new("").validate().is_err());
        assert!(
            StorageConfig::new("images")
                .with_endpoint("localhost:9000")
                .validate()
                .is_err()
        );
        assert!(StorageConfig::new("images").with_page_size(0).validate().is_err());
        assert!(StorageConfig::new("images").with_page_size(1001).validate().is_err());

        let mut local = StorageConfig::local("/tmp/images");
        assert!(local.validate().is_ok());
        local.storage_root = None;
        assert!(local.validate().is_err());

        assert!(StorageConfig::memory().validate().is_ok());
    }

    #[test]
    fn test_auth_style_parsing() {
        assert_eq!("SIGV4".parse::<AuthStyle>().unwrap(), AuthStyle::SigV4);
        assert_eq!("sigv4".parse::<AuthStyle>().unwrap(), AuthStyle::SigV4);
        assert_eq!("NONE".parse::<AuthStyle>().unwrap(), AuthStyle::Unsigned);
        assert_eq!("unsigned".parse::<AuthStyle>().unwrap(), AuthStyle::Unsigned);
        assert!("basic".parse::<AuthStyle>().is_err());
        assert_eq!(AuthStyle::SigV4.to_string(), "SIGV4");
        assert_eq!(AuthStyle::Unsigned.to_string(), "NONE");
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("s3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!("Local".parse::<StorageBackend>().unwrap(), StorageBackend::Local);
        assert_eq!(StorageBackend::Memory.to_string(), "memory");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: StorageConfig = serde_json::from_str(
            r#"{ "storage_bucket": "images", "storage_auth_style": "SIGV4" }"#,
        )
        .unwrap();
        assert_eq!(config.storage_bucket, "images");
        assert_eq!(config.storage_auth_style, AuthStyle::SigV4);
        assert_eq!(config.storage_backend, StorageBackend::S3);
        assert_eq!(config.storage_endpoint, None);
    }
}
