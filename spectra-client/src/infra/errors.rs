use std::time::Duration;

use thiserror::Error;

/// The request could not be built from the current selection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("no image selected")]
    EmptyImage,
    #[error("image data is not valid base64: {0}")]
    InvalidBase64(String),
}

/// Coarse classification of [`ProcessingError`], stable for display and
/// matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingErrorKind {
    Network,
    Timeout,
    Cancelled,
    Rejected,
    MalformedResponse,
}

/// Failure of a single processing submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("network error: {0}")]
    Network(String),
    #[error("processing timed out after {}", humantime::format_duration(*.0))]
    Timeout(Duration),
    #[error("processing request was cancelled")]
    Cancelled,
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("malformed response from processing service: {0}")]
    MalformedResponse(String),
}

impl ProcessingError {
    pub fn kind(&self) -> ProcessingErrorKind {
        match self {
            ProcessingError::Network(_) => ProcessingErrorKind::Network,
            ProcessingError::Timeout(_) => ProcessingErrorKind::Timeout,
            ProcessingError::Cancelled => ProcessingErrorKind::Cancelled,
            ProcessingError::Rejected { .. } => ProcessingErrorKind::Rejected,
            ProcessingError::MalformedResponse(_) => {
                ProcessingErrorKind::MalformedResponse
            }
        }
    }

    /// Map a transport failure, keeping reqwest's own timeouts distinct.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ProcessingError::Timeout(timeout)
        } else {
            ProcessingError::Network(err.to_string())
        }
    }
}

/// Failure of the auxiliary endpoints (health probe, upload).
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request failed with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}
