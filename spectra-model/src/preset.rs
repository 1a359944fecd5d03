//! Built-in filter presets.
//!
//! A preset is a template: selecting one copies its configuration into the
//! editor, and later edits never flow back into the table.

use std::fmt;

use crate::error::UnknownPresetError;
use crate::filter::{DEFAULT_ORDER, FilterConfig, FilterMode, FilterType};

/// Key reported while the configuration no longer matches a preset.
pub const CUSTOM_PRESET_KEY: &str = "custom";

/// A named, fully specified filter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub config: FilterConfig,
}

const fn preset_config(
    filter_type: FilterType,
    filter_mode: FilterMode,
    cutoff: u16,
    order: u8,
    band: Option<(u16, u16)>,
) -> FilterConfig {
    let (center_freq, bandwidth) = match band {
        Some((center, width)) => (Some(center), Some(width)),
        None => (None, None),
    };
    FilterConfig {
        filter_type,
        filter_mode,
        cutoff,
        order,
        center_freq,
        bandwidth,
    }
}

static PRESETS: [Preset; 9] = [
    Preset {
        key: "default",
        label: "Default",
        description: "Gaussian low-pass at the recommended radius r=20",
        config: preset_config(
            FilterType::Gaussian,
            FilterMode::Lowpass,
            20,
            DEFAULT_ORDER,
            None,
        ),
    },
    Preset {
        key: "light_smoothing",
        label: "Light smoothing",
        description: "Wide Gaussian low-pass that removes fine grain only",
        config: preset_config(
            FilterType::Gaussian,
            FilterMode::Lowpass,
            60,
            DEFAULT_ORDER,
            None,
        ),
    },
    Preset {
        key: "strong_smoothing",
        label: "Strong smoothing",
        description: "Narrow Butterworth low-pass for heavy noise",
        config: preset_config(
            FilterType::Butterworth,
            FilterMode::Lowpass,
            10,
            2,
            None,
        ),
    },
    Preset {
        key: "blur",
        label: "Blur",
        description: "Ideal low-pass; hard cutoff with visible ringing",
        config: preset_config(
            FilterType::Ideal,
            FilterMode::Lowpass,
            15,
            DEFAULT_ORDER,
            None,
        ),
    },
    Preset {
        key: "edge_enhance",
        label: "Edge enhancement",
        description: "Butterworth high-pass that keeps only edges",
        config: preset_config(
            FilterType::Butterworth,
            FilterMode::Highpass,
            30,
            2,
            None,
        ),
    },
    Preset {
        key: "sharpen",
        label: "Sharpen",
        description: "Gentle Gaussian high-pass above the dominant structure",
        config: preset_config(
            FilterType::Gaussian,
            FilterMode::Highpass,
            10,
            DEFAULT_ORDER,
            None,
        ),
    },
    Preset {
        key: "noise_reject",
        label: "Periodic noise removal",
        description: "Gaussian band-reject around a mid-frequency ring",
        config: preset_config(
            FilterType::Gaussian,
            FilterMode::Bandreject,
            20,
            DEFAULT_ORDER,
            Some((50, 20)),
        ),
    },
    Preset {
        key: "narrow_reject",
        label: "Narrow band-reject",
        description: "Steep Butterworth notch ring for a single interference",
        config: preset_config(
            FilterType::Butterworth,
            FilterMode::Bandreject,
            20,
            4,
            Some((80, 8)),
        ),
    },
    Preset {
        key: "strong_reject",
        label: "Strong band-reject",
        description: "Ideal band-reject over a wide ring",
        config: preset_config(
            FilterType::Ideal,
            FilterMode::Bandreject,
            20,
            DEFAULT_ORDER,
            Some((60, 40)),
        ),
    },
];

/// All built-in presets in display order.
pub fn presets() -> &'static [Preset] {
    &PRESETS
}

/// Look up a preset by exact key.
pub fn find_preset(key: &str) -> Result<&'static Preset, UnknownPresetError> {
    PRESETS
        .iter()
        .find(|preset| preset.key == key)
        .ok_or_else(|| UnknownPresetError(key.to_string()))
}

/// Resolve a preset key into its normalized configuration.
pub fn apply_preset(key: &str) -> Result<FilterConfig, UnknownPresetError> {
    find_preset(key).map(|preset| preset.config.normalize())
}

/// Which preset, if any, the editor's configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePreset {
    Named(&'static str),
    Custom,
}

impl ActivePreset {
    pub fn key(&self) -> &'static str {
        match self {
            ActivePreset::Named(key) => key,
            ActivePreset::Custom => CUSTOM_PRESET_KEY,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ActivePreset::Custom)
    }
}

impl fmt::Display for ActivePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
