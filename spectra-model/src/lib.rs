//! Core data model for the Spectra frequency-domain filtering client.
//!
//! Everything here is pure and deterministic: filter parameters and their
//! validation, the preset table, the editable filter state, and the result
//! types returned by the processing service.
#![allow(missing_docs)]

pub mod editor;
pub mod error;
pub mod filter;
pub mod prelude;
pub mod preset;
pub mod result;

// Intentionally curated re-exports for downstream consumers.
pub use editor::{BandParams, FilterEditor};
pub use error::{
    ImageDataError, ParseFilterError, UnknownPresetError, ValidationError,
};
pub use filter::{
    ConfigPatch, ConfigValidation, DEFAULT_ORDER, FilterConfig, FilterMode,
    FilterType,
};
pub use preset::{
    ActivePreset, CUSTOM_PRESET_KEY, Preset, apply_preset, find_preset,
    presets,
};
pub use result::{
    EncodedImage, ProcessingResult, QualityMetrics, strip_data_url_prefix,
};
