//! Avatar file selection and local preview.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use skilllink_core::validation::{ValidationError, check_avatar};

/// An avatar file that passed the type and size checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarSelection {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: String,
    pub size: u64,
}

impl AvatarSelection {
    /// Inspect `path` and validate it as an avatar without reading its contents.
    pub fn inspect(path: &Path) -> Result<Self, ValidationError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            ValidationError::field(
                "profile_picture",
                format!("Cannot read {}: {e}", path.display()),
            )
        })?;
        let mime = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream");
        Self::checked(path, mime, metadata.len())
    }

    /// Validate an already-known MIME type and size.
    pub fn checked(path: &Path, mime: &str, size: u64) -> Result<Self, ValidationError> {
        check_avatar(mime, size)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "avatar".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            mime: mime.to_string(),
            size,
        })
    }

    /// Read the file and encode it as a `data:` URL for local preview.
    pub async fn read_data_url(&self) -> std::io::Result<String> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(data_url(&self.mime, &bytes))
    }
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
