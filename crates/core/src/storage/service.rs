//! Document file store backed by Apache OpenDAL.

use opendal::{ErrorKind, Operator, services};
use uuid::Uuid;

use super::error::StorageError;

/// Default upload size limit: 16 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

const DOCUMENT_EXTENSIONS: [&str; 7] = ["pdf", "doc", "docx", "xls", "xlsx", "jpg", "png"];
const LOGO_EXTENSIONS: [&str; 3] = ["jpg", "png", "gif"];

/// What kind of upload is being validated. Each context carries its own
/// allowed extension set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadContext {
    /// Client documents and invoice attachments.
    Documents,
    /// The company logo.
    Logos,
}

impl UploadContext {
    /// The extensions accepted in this context, lowercase without dots.
    #[must_use]
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Documents => &DOCUMENT_EXTENSIONS,
            Self::Logos => &LOGO_EXTENSIONS,
        }
    }
}

/// A file persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Collision-resistant name the file was stored under.
    pub stored_name: String,
    /// The name the uploader gave the file.
    pub original_name: String,
    /// Store-relative path, `{folder}/{stored_name}`.
    pub path: String,
}

/// Validates an upload against its context's extension set and size limit.
///
/// # Errors
///
/// Returns `StorageError::MissingExtension` for a nameless or
/// extensionless file, `ExtensionNotAllowed` for a type outside the
/// context's set, and `FileTooLarge` past `max_bytes`.
pub fn validate_upload(
    context: UploadContext,
    original_name: &str,
    size: u64,
    max_bytes: u64,
) -> Result<(), StorageError> {
    let extension = extension_of(original_name).ok_or(StorageError::MissingExtension)?;
    if !context.allowed_extensions().contains(&extension.as_str()) {
        return Err(StorageError::ExtensionNotAllowed { extension });
    }
    if size > max_bytes {
        return Err(StorageError::FileTooLarge {
            size,
            max: max_bytes,
        });
    }
    Ok(())
}

/// Builds a collision-resistant stored name: `{sanitized_stem}_{uuid}.{ext}`.
///
/// # Errors
///
/// Returns `StorageError::MissingExtension` if the name has no extension.
pub fn unique_filename(original_name: &str) -> Result<String, StorageError> {
    let extension = extension_of(original_name).ok_or(StorageError::MissingExtension)?;
    let stem = original_name
        .rsplit_once('.')
        .map_or(original_name, |(stem, _)| stem);
    let sanitized = sanitize(stem);
    Ok(format!(
        "{}_{}.{}",
        sanitized,
        Uuid::new_v4().simple(),
        extension
    ))
}

fn extension_of(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Keeps ASCII alphanumerics, dots, hyphens, and underscores; everything
/// else becomes an underscore. An all-unsafe name collapses to `file`.
fn sanitize(stem: &str) -> String {
    let sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.chars().all(|c| c == '_') {
        "file".to_string()
    } else {
        sanitized
    }
}

/// File store for client documents, invoice attachments, and the logo.
#[derive(Debug, Clone)]
pub struct DocumentStorage {
    operator: Operator,
    max_bytes: u64,
}

impl DocumentStorage {
    /// Creates a store rooted at a local directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` if the operator cannot be built.
    pub fn local(root: &str, max_bytes: u64) -> Result<Self, StorageError> {
        let builder = services::Fs::default().root(root);
        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();
        Ok(Self {
            operator,
            max_bytes,
        })
    }

    /// The configured upload size limit in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Validates and persists an upload under `folder`.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is written, or
    /// `StorageError::Backend` if the write fails.
    pub async fn save(
        &self,
        context: UploadContext,
        folder: &str,
        original_name: &str,
        content: Vec<u8>,
    ) -> Result<StoredFile, StorageError> {
        validate_upload(context, original_name, content.len() as u64, self.max_bytes)?;
        let stored_name = unique_filename(original_name)?;
        let path = format!("{folder}/{stored_name}");

        self.operator.write(&path, content).await?;

        Ok(StoredFile {
            stored_name,
            original_name: original_name.to_string(),
            path,
        })
    }

    /// Reads a stored file back.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Backend` if the read fails.
    pub async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let buffer = self.operator.read(path).await?;
        Ok(buffer.to_vec())
    }

    /// Deletes a stored file. Deleting a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Backend` if deletion fails.
    pub async fn delete(&self, path: &str) -> Result<(), StorageError> {
        match self.operator.delete(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_extensions_accepted() {
        for name in [
            "report.pdf",
            "ledger.XLSX",
            "scan.jpg",
            "contract.docx",
        ] {
            assert!(validate_upload(UploadContext::Documents, name, 1024, MAX_UPLOAD_BYTES).is_ok());
        }
    }

    #[test]
    fn test_logo_context_rejects_documents() {
        let err =
            validate_upload(UploadContext::Logos, "logo.pdf", 1024, MAX_UPLOAD_BYTES).unwrap_err();
        assert!(matches!(
            err,
            StorageError::ExtensionNotAllowed { extension } if extension == "pdf"
        ));
        assert!(validate_upload(UploadContext::Logos, "logo.gif", 1024, MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn test_executable_rejected() {
        let err = validate_upload(UploadContext::Documents, "payload.exe", 10, MAX_UPLOAD_BYTES)
            .unwrap_err();
        assert!(matches!(err, StorageError::ExtensionNotAllowed { .. }));
    }

    #[test]
    fn test_missing_extension_rejected() {
        for name in ["README", "archive.", ""] {
            let err =
                validate_upload(UploadContext::Documents, name, 10, MAX_UPLOAD_BYTES).unwrap_err();
            assert!(matches!(err, StorageError::MissingExtension));
        }
    }

    #[test]
    fn test_oversized_upload_rejected() {
        let err = validate_upload(
            UploadContext::Documents,
            "big.pdf",
            MAX_UPLOAD_BYTES + 1,
            MAX_UPLOAD_BYTES,
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { .. }));
    }

    #[test]
    fn test_exact_limit_accepted() {
        assert!(validate_upload(
            UploadContext::Documents,
            "fits.pdf",
            MAX_UPLOAD_BYTES,
            MAX_UPLOAD_BYTES
        )
        .is_ok());
    }

    #[test]
    fn test_unique_filename_shape() {
        let name = unique_filename("Q1 statement (final).pdf").unwrap();
        assert!(name.starts_with("Q1_statement__final__"));
        assert!(name.ends_with(".pdf"));
        assert_ne!(
            unique_filename("a.pdf").unwrap(),
            unique_filename("a.pdf").unwrap()
        );
    }

    #[test]
    fn test_unsafe_stem_collapses_to_placeholder() {
        let name = unique_filename("ملف.pdf").unwrap();
        assert!(name.starts_with("file_"));
    }

    fn temp_store() -> DocumentStorage {
        let root = std::env::temp_dir().join(format!("store_{}", Uuid::new_v4().simple()));
        DocumentStorage::local(&root.to_string_lossy(), MAX_UPLOAD_BYTES).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_read_back() {
        let store = temp_store();
        let stored = store
            .save(
                UploadContext::Documents,
                "documents/abc",
                "statement.pdf",
                b"%PDF-1.7 content".to_vec(),
            )
            .await
            .unwrap();

        assert!(stored.path.starts_with("documents/abc/statement_"));
        let content = store.read(&stored.path).await.unwrap();
        assert_eq!(content, b"%PDF-1.7 content");
    }

    #[tokio::test]
    async fn test_save_rejects_before_writing() {
        let store = temp_store();
        let err = store
            .save(UploadContext::Logos, "logos", "logo.exe", vec![0u8; 10])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ExtensionNotAllowed { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let store = temp_store();
        store.delete("documents/nope/gone.pdf").await.unwrap();
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Stored names never contain characters outside the safe set.
    proptest! {
        #[test]
        fn prop_unique_filename_safe_chars(stem in ".{0,40}") {
            let name = format!("{stem}.pdf");
            if let Ok(stored) = unique_filename(&name) {
                for c in stored.chars() {
                    let safe = c.is_ascii_alphanumeric()
                        || c == '.'
                        || c == '-'
                        || c == '_';
                    prop_assert!(safe, "unsafe char {:?} in {}", c, stored);
                }
                prop_assert!(stored.ends_with(".pdf"));
            }
        }
    }

    // Validation accepts exactly the context's extension set.
    proptest! {
        #[test]
        fn prop_extension_gate(ext in "[a-z]{1,5}") {
            let name = format!("upload.{ext}");
            let result =
                validate_upload(UploadContext::Documents, &name, 1, MAX_UPLOAD_BYTES);
            let allowed = UploadContext::Documents
                .allowed_extensions()
                .contains(&ext.as_str());
            prop_assert_eq!(result.is_ok(), allowed);
        }
    }
}
