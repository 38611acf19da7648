//! Error types for storage operations.

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for all storage operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The object or bucket does not exist (remote returned 404).
    #[error("Object '{key}' not found")]
    NotFound { key: String },

    /// Any other failure reported by the provider, passed through unchanged.
    #[error("Storage operation '{operation}' failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
        #[source]
        source: BoxedError,
    },

    /// The listing endpoint kept returning a token that does not advance.
    #[error("Pagination under '{prefix}' aborted: {reason}")]
    Pagination { prefix: String, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Create a not-found error for `key`.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Wrap a provider error raised by `operation`.
    pub fn backend(
        operation: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            operation,
            message: source.to_string(),
            source: Box::new(source),
        }
    }

    /// Wrap a provider error, overriding its display message.
    ///
    /// Some SDK errors only render a terse summary through `Display`.
    pub fn backend_with_message(
        operation: &'static str,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Create a pagination error
    pub fn pagination(prefix: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Pagination {
            prefix: prefix.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the remote reported the object as missing.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
