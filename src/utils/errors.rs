use thiserror::Error;

/// Every failure the client can hold in state or hand back to a caller.
///
/// Errors are plain values so the state machines can keep the last one for
/// display and tests can compare them directly.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignboardError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("{message}")]
    BackendError { status: u16, message: String },

    #[error("Failed to load translation history: {0}")]
    LoadError(String),

    #[error("Failed to delete translation: {0}")]
    DeleteError(String),

    #[error("Failed to clear history: {0}")]
    ClearError(String),

    #[error("A translation request is already in flight")]
    SubmissionInFlight,

    #[error("Preview error: {0}")]
    PreviewError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, SignboardError>;

impl SignboardError {
    /// Message shown to the user, without the variant prefix for errors that
    /// already carry a server- or transport-supplied text.
    pub fn user_message(&self) -> String {
        match self {
            SignboardError::BackendError { message, .. } => message.clone(),
            SignboardError::TransportError(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    pub fn into_load_error(self) -> Self {
        SignboardError::LoadError(self.user_message())
    }

    pub fn into_delete_error(self) -> Self {
        SignboardError::DeleteError(self.user_message())
    }

    pub fn into_clear_error(self) -> Self {
        SignboardError::ClearError(self.user_message())
    }
}

impl From<reqwest::Error> for SignboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SignboardError::MalformedResponse(err.to_string())
        } else {
            SignboardError::TransportError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_displays_server_message() {
        let err = SignboardError::BackendError {
            status: 400,
            message: "Invalid file type".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid file type");
    }

    #[test]
    fn history_side_errors_wrap_the_underlying_message() {
        let err = SignboardError::TransportError("connection refused".to_string());
        assert_eq!(
            err.clone().into_delete_error(),
            SignboardError::DeleteError("connection refused".to_string())
        );
        assert_eq!(
            err.into_load_error().to_string(),
            "Failed to load translation history: connection refused"
        );
    }
}
