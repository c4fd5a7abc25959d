use crate::translation::ImageFile;
use crate::utils::{Result, SignboardError};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Local copy of the selected image that a viewer can open.
///
/// The backing file is removed when the handle is dropped, so replacing the
/// session's handle releases the previous preview.
#[derive(Debug)]
pub struct PreviewHandle {
    file: NamedTempFile,
}

impl PreviewHandle {
    pub fn create(image: &ImageFile, dir: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("signboard-preview-").suffix(image.preview_suffix());

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| SignboardError::PreviewError(e.to_string()))?;

        file.write_all(image.bytes())
            .and_then(|_| file.flush())
            .map_err(|e| SignboardError::PreviewError(e.to_string()))?;

        debug!(path = %file.path().display(), "Created preview");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        debug!(path = %self.file.path().display(), "Releasing preview");
    }
}
