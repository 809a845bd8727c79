//! Storage error types.

use thiserror::Error;

/// Errors raised by upload validation and the document store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The file extension is not in the allowed set for the context.
    #[error("file type .{extension} is not allowed here")]
    ExtensionNotAllowed { extension: String },

    /// The file has no usable name or extension.
    #[error("filename is missing or has no extension")]
    MissingExtension,

    /// The upload exceeds the size limit.
    #[error("file of {size} bytes exceeds the {max} byte limit")]
    FileTooLarge { size: u64, max: u64 },

    /// The backing store could not be initialized.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// An operation against the backing store failed.
    #[error("storage backend error: {0}")]
    Backend(#[from] opendal::Error),
}

impl StorageError {
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
