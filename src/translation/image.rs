use crate::utils::{Result, SignboardError};
use std::path::Path;

/// An image picked by the user, owned by the session until it is uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    file_name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, inferring the media type from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            SignboardError::ValidationError(format!("cannot read {}: {}", path.display(), e))
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let media_type = path
            .extension()
            .and_then(|ext| media_type_for_extension(&ext.to_string_lossy()))
            .unwrap_or("application/octet-stream");

        Ok(Self::new(file_name, media_type, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Presence and content-type checks only; pixel data is not inspected.
    pub fn validate(&self, max_bytes: u64) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(SignboardError::ValidationError(format!(
                "{} is empty",
                self.file_name
            )));
        }
        if !self.media_type.starts_with("image/") {
            return Err(SignboardError::ValidationError(format!(
                "{} is not an image ({})",
                self.file_name, self.media_type
            )));
        }
        if self.bytes.len() as u64 > max_bytes {
            return Err(SignboardError::ValidationError(format!(
                "{} exceeds the {} byte upload limit",
                self.file_name, max_bytes
            )));
        }
        Ok(())
    }

    /// Extension used for the local preview file.
    pub(crate) fn preview_suffix(&self) -> &'static str {
        match self.media_type.as_str() {
            "image/png" => ".png",
            "image/jpeg" => ".jpg",
            "image/gif" => ".gif",
            "image/bmp" => ".bmp",
            "image/webp" => ".webp",
            "image/tiff" => ".tiff",
            _ => ".img",
        }
    }
}

pub fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}
