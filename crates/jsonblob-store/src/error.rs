/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No object exists at the requested key.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The key is not a valid relative object key.
    #[error("invalid object key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The backend rejected or could not serve the request.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns `true` for the "missing key" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
