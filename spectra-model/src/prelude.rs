//! Client-facing snapshot of the model surface.
//! Prefer importing from this module in session and presentation code.

pub use super::editor::{BandParams, FilterEditor};
pub use super::error::{UnknownPresetError, ValidationError};
pub use super::filter::{
    BANDWIDTH_RANGE, CENTER_FREQ_RANGE, CUTOFF_RANGE, ConfigPatch,
    FilterConfig, FilterMode, FilterType, ORDER_RANGE,
};
pub use super::preset::{ActivePreset, Preset, apply_preset, presets};
pub use super::result::{EncodedImage, ProcessingResult, QualityMetrics};
