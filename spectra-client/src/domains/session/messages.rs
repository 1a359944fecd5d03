use spectra_model::{ConfigPatch, ProcessingResult};

use super::state::{ImageSelection, RequestToken};
use crate::infra::api_types::HealthStatus;
use crate::infra::errors::ProcessingError;

#[derive(Clone)]
pub enum Message {
    /// Replace the selected image. Supersedes any in-flight request.
    SelectImage(ImageSelection),
    /// Local edit of the filter parameters.
    UpdateConfig(ConfigPatch),
    /// Load a named preset.
    ApplyPreset(String),
    /// Send the current selection and config for processing.
    Submit,
    /// A processing call tagged `token` resolved.
    ProcessingFinished {
        token: RequestToken,
        outcome: Result<ProcessingResult, ProcessingError>,
    },
    CheckHealth,
    HealthChecked(Result<HealthStatus, String>),
    DismissError,
}

impl Message {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectImage(_) => "Session::SelectImage",
            Self::UpdateConfig(_) => "Session::UpdateConfig",
            Self::ApplyPreset(_) => "Session::ApplyPreset",
            Self::Submit => "Session::Submit",
            Self::ProcessingFinished { .. } => "Session::ProcessingFinished",
            Self::CheckHealth => "Session::CheckHealth",
            Self::HealthChecked(_) => "Session::HealthChecked",
            Self::DismissError => "Session::DismissError",
        }
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelectImage(selection) => write!(
                f,
                "Session::SelectImage({})",
                selection.name().unwrap_or("<unnamed>")
            ),
            Self::UpdateConfig(patch) => {
                write!(f, "Session::UpdateConfig({:?})", patch)
            }
            Self::ApplyPreset(key) => write!(f, "Session::ApplyPreset({})", key),
            Self::ProcessingFinished { token, outcome } => write!(
                f,
                "Session::ProcessingFinished({}, {})",
                token,
                if outcome.is_ok() { "ok" } else { "err" }
            ),
            Self::HealthChecked(result) => write!(
                f,
                "Session::HealthChecked({})",
                if result.is_ok() { "ok" } else { "err" }
            ),
            other => f.write_str(other.name()),
        }
    }
}
