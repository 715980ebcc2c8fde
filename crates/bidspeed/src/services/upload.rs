//! Client-side checks applied before a document leaves the machine.

use std::path::Path;

use crate::error::UploadError;

pub const DEFAULT_MAX_SIZE_MB: u64 = 16;

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

/// A validated document ready for the upload transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedUpload {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Accepted document types and size limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    allowed_extensions: Vec<String>,
    max_size_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()),
            DEFAULT_MAX_SIZE_MB,
        )
    }
}

impl UploadPolicy {
    pub fn new<I, S>(allowed_extensions: I, max_size_mb: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
            max_size_bytes: max_size_mb.saturating_mul(1024 * 1024),
        }
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Checks name and size, returning the MIME type to send.
    ///
    /// The size limit is exclusive.
    pub fn check(&self, filename: &str, size: u64) -> Result<String, UploadError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if extension.is_empty() || !self.allowed_extensions.contains(&extension) {
            return Err(UploadError::UnsupportedType(filename.to_string()));
        }

        if size >= self.max_size_bytes {
            return Err(UploadError::TooLarge {
                filename: filename.to_string(),
                size,
                limit: self.max_size_bytes,
            });
        }

        Ok(mime_guess::from_ext(&extension)
            .first_or_octet_stream()
            .essence_str()
            .to_string())
    }

    /// Reads `path` and checks it against the policy.
    pub async fn prepare(&self, path: &Path) -> Result<PreparedUpload, UploadError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| UploadError::UnsupportedType(path.display().to_string()))?;

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| UploadError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mime_type = self.check(&filename, metadata.len())?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| UploadError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(PreparedUpload {
            filename,
            mime_type,
            bytes,
        })
    }
}
