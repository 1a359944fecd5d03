use spectra_model::{EncodedImage, FilterConfig, QualityMetrics};

use super::state::{Phase, SessionState};

/// Read-only projection of [`SessionState`] for presentation code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionView<'a> {
    /// Data URL of the selected image.
    pub selection: Option<&'a str>,
    pub selection_name: Option<&'a str>,
    pub processed_image: Option<&'a EncodedImage>,
    pub magnitude_spectrum: Option<&'a EncodedImage>,
    pub filter_mask: Option<&'a EncodedImage>,
    pub metrics: Option<QualityMetrics>,
    pub config: FilterConfig,
    /// Key of the active preset, `"custom"` after any manual edit.
    pub active_preset: &'static str,
    pub is_busy: bool,
    pub can_submit: bool,
    pub error: Option<&'a str>,
    pub warning: Option<&'a str>,
}

impl<'a> SessionView<'a> {
    pub fn from_state(state: &'a SessionState) -> Self {
        let result = state.result.as_ref();
        let config = *state.config();
        Self {
            selection: state.selection.as_ref().map(|s| s.display()),
            selection_name: state.selection.as_ref().and_then(|s| s.name()),
            processed_image: result.map(|r| &r.processed_image),
            magnitude_spectrum: result.map(|r| &r.magnitude_spectrum),
            filter_mask: result.map(|r| &r.filter_mask),
            metrics: result.map(|r| r.metrics),
            config,
            active_preset: state.editor.active_preset().key(),
            is_busy: state.phase == Phase::Processing,
            can_submit: state.phase == Phase::Ready
                && state.selection.is_some()
                && config.validate().is_valid(),
            error: state.error.as_ref().map(|e| e.message.as_str()),
            warning: state.warning.as_deref(),
        }
    }
}
