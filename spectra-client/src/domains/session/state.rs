//! Session state owned by the session domain.

use std::fmt;
use std::time::Duration;

use spectra_model::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::infra::errors::{ProcessingError, ProcessingErrorKind};

/// Where the session is in its request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No image selected.
    #[default]
    Idle,
    /// Image selected, nothing outstanding.
    Ready,
    /// Exactly one processing request outstanding.
    Processing,
}

/// The image the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSelection {
    image: EncodedImage,
    name: Option<String>,
}

impl ImageSelection {
    /// Wrap an already encoded image (data URL or bare base64).
    pub fn new(image: EncodedImage) -> Self {
        Self { image, name: None }
    }

    /// Build a selection from raw file bytes.
    pub fn from_bytes(bytes: &[u8], name: Option<String>) -> Self {
        Self {
            image: EncodedImage::from_bytes(bytes, sniff_mime(bytes)),
            name,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn image(&self) -> &EncodedImage {
        &self.image
    }

    /// Form suitable for display (the data URL).
    pub fn display(&self) -> &str {
        self.image.as_str()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// MIME type from the file signature.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'B', b'M', ..] => "image/bmp",
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => {
            "image/tiff"
        }
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
            "image/webp"
        }
        _ => "application/octet-stream",
    }
}

/// Identity of one submission. Strictly increasing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The outstanding request and the handle that aborts it.
#[derive(Debug, Clone)]
pub struct InFlight {
    pub token: RequestToken,
    pub cancel: CancellationToken,
}

/// A user-facing failure of the last submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ProcessingErrorKind,
    pub message: String,
}

impl From<&ProcessingError> for ErrorInfo {
    fn from(err: &ProcessingError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Policy knobs of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub process_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            process_timeout: Duration::from_secs(120),
        }
    }
}

/// All mutable state of one session. Mutated only by
/// [`super::update::update`].
#[derive(Debug, Default)]
pub struct SessionState {
    pub selection: Option<ImageSelection>,
    pub editor: FilterEditor,
    pub result: Option<ProcessingResult>,
    pub phase: Phase,
    pub error: Option<ErrorInfo>,
    /// Non-fatal notice, e.g. a failed health probe.
    pub warning: Option<String>,
    pub in_flight: Option<InFlight>,
    pub options: SessionOptions,
    last_token: u64,
}

impl SessionState {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &FilterConfig {
        self.editor.config()
    }

    pub fn is_processing(&self) -> bool {
        self.phase == Phase::Processing
    }

    /// Whether a completion tagged `token` may still touch this state.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.token == token)
    }

    pub(crate) fn issue_token(&mut self) -> RequestToken {
        self.last_token += 1;
        RequestToken(self.last_token)
    }

    /// Abort and forget the outstanding request, if any.
    pub(crate) fn invalidate_in_flight(&mut self) -> Option<RequestToken> {
        self.in_flight.take().map(|in_flight| {
            in_flight.cancel.cancel();
            in_flight.token
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase_monotonically() {
        let mut state = SessionState::default();
        let first = state.issue_token();
        let second = state.issue_token();
        assert!(second > first);
        assert_eq!(first.value() + 1, second.value());
    }

    #[test]
    fn invalidating_cancels_the_handle() {
        let mut state = SessionState::default();
        let cancel = CancellationToken::new();
        let token = state.issue_token();
        state.in_flight = Some(InFlight {
            token,
            cancel: cancel.clone(),
        });
        assert!(state.is_current(token));

        assert_eq!(state.invalidate_in_flight(), Some(token));
        assert!(cancel.is_cancelled());
        assert!(!state.is_current(token));
    }

    #[test]
    fn mime_is_sniffed_from_signature() {
        assert_eq!(sniff_mime(&[0x89, b'P', b'N', b'G', 0x0d]), "image/png");
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(sniff_mime(b"hello"), "application/octet-stream");

        let selection =
            ImageSelection::from_bytes(b"BM\0\0", Some("a.bmp".into()));
        assert!(selection.display().starts_with("data:image/bmp;base64,"));
        assert_eq!(selection.name(), Some("a.bmp"));
    }
}
