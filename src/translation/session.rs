use crate::backend::TranslateBackend;
use crate::translation::preview::PreviewHandle;
use crate::translation::{ImageFile, TranslationResult};
use crate::utils::{Result, SignboardError, UploadConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    FileSelected,
    Submitting,
    Succeeded,
    Failed,
}

/// An accepted submission. The session only accepts the outcome for the
/// ticket it issued last.
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    id: u64,
    image: ImageFile,
}

impl SubmitTicket {
    pub fn image(&self) -> &ImageFile {
        &self.image
    }
}

/// One upload-and-translate lifecycle.
///
/// Picking a file always drops the previous file, preview, result and error,
/// and invalidates any request still in flight.
#[derive(Debug)]
pub struct TranslationSession {
    max_upload_bytes: u64,
    preview_dir: Option<PathBuf>,
    phase: SessionPhase,
    file: Option<ImageFile>,
    preview: Option<PreviewHandle>,
    result: Option<TranslationResult>,
    error: Option<SignboardError>,
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl TranslationSession {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            max_upload_bytes: config.max_bytes,
            preview_dir: config.preview_dir.clone(),
            phase: SessionPhase::Idle,
            file: None,
            preview: None,
            result: None,
            error: None,
            in_flight: None,
            next_ticket: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn file(&self) -> Option<&ImageFile> {
        self.file.as_ref()
    }

    pub fn preview_path(&self) -> Option<&Path> {
        self.preview.as_ref().map(PreviewHandle::path)
    }

    pub fn result(&self) -> Option<&TranslationResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&SignboardError> {
        self.error.as_ref()
    }

    pub fn select_file(&mut self, file: Option<ImageFile>) -> SessionPhase {
        self.discard();

        let file = match file {
            Some(file) => file,
            None => return self.reject(SignboardError::ValidationError("no file provided".to_string())),
        };
        if let Err(err) = file.validate(self.max_upload_bytes) {
            return self.reject(err);
        }

        match PreviewHandle::create(&file, self.preview_dir.as_deref()) {
            Ok(preview) => self.preview = Some(preview),
            Err(err) => warn!(file = file.file_name(), error = %err, "No preview for selected file"),
        }

        debug!(file = file.file_name(), size = file.len(), "File selected");
        self.file = Some(file);
        self.phase = SessionPhase::FileSelected;
        self.phase
    }

    /// Starts a submission of the selected file.
    ///
    /// Fails with `ValidationError` when nothing is selected (held in the
    /// session) and with `SubmissionInFlight` while a request is pending (the
    /// pending request is left alone).
    pub fn begin_submit(&mut self) -> Result<SubmitTicket> {
        if self.phase == SessionPhase::Submitting {
            return Err(SignboardError::SubmissionInFlight);
        }

        let Some(image) = self.file.clone() else {
            let err = SignboardError::ValidationError("no file selected".to_string());
            self.error = Some(err.clone());
            return Err(err);
        };

        self.next_ticket += 1;
        self.in_flight = Some(self.next_ticket);
        self.phase = SessionPhase::Submitting;
        self.result = None;
        self.error = None;

        Ok(SubmitTicket {
            id: self.next_ticket,
            image,
        })
    }

    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<TranslationResult>,
    ) -> SessionPhase {
        if self.in_flight != Some(ticket.id) {
            debug!(file = ticket.image.file_name(), "Discarding superseded translation");
            return self.phase;
        }
        self.in_flight = None;

        match outcome {
            Ok(result) => {
                info!(
                    file = ticket.image.file_name(),
                    texts = result.len(),
                    "Translation succeeded"
                );
                self.result = Some(result);
                self.phase = SessionPhase::Succeeded;
            }
            Err(err) => {
                warn!(file = ticket.image.file_name(), error = %err, "Translation failed");
                self.error = Some(err);
                self.phase = SessionPhase::Failed;
            }
        }
        self.phase
    }

    pub async fn submit(&mut self, backend: &dyn TranslateBackend) -> SessionPhase {
        let ticket = match self.begin_submit() {
            Ok(ticket) => ticket,
            Err(_) => return self.phase,
        };
        let outcome = backend.translate(ticket.image()).await;
        self.complete_submit(ticket, outcome)
    }

    /// Back to `Idle`, releasing the preview.
    pub fn reset(&mut self) {
        self.discard();
        self.phase = SessionPhase::Idle;
    }

    fn discard(&mut self) {
        self.file = None;
        self.preview = None;
        self.result = None;
        self.error = None;
        self.in_flight = None;
    }

    fn reject(&mut self, err: SignboardError) -> SessionPhase {
        debug!(error = %err, "File rejected");
        self.error = Some(err);
        self.phase = SessionPhase::Idle;
        self.phase
    }
}
