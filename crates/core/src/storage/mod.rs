//! Upload validation and document file storage.

mod error;
mod service;

pub use error::StorageError;
pub use service::{
    DocumentStorage, MAX_UPLOAD_BYTES, StoredFile, UploadContext, unique_filename,
    validate_upload,
};
