//! Editable filter state: the current configuration plus the preset it was
//! derived from.

use crate::error::UnknownPresetError;
use crate::filter::{ConfigPatch, FilterConfig, FilterMode, FilterType};
use crate::preset::{ActivePreset, find_preset};

/// Band-reject parameters remembered while another mode is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandParams {
    pub center_freq: u16,
    pub bandwidth: u16,
}

impl Default for BandParams {
    fn default() -> Self {
        Self {
            center_freq: 50,
            bandwidth: 25,
        }
    }
}

/// The user's filter settings.
///
/// Every field setter marks the selection as [`ActivePreset::Custom`];
/// only [`FilterEditor::apply_preset`] selects a named preset. The stored
/// config is kept normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEditor {
    config: FilterConfig,
    band: BandParams,
    active: ActivePreset,
}

impl Default for FilterEditor {
    fn default() -> Self {
        Self {
            config: FilterConfig::default(),
            band: BandParams::default(),
            active: ActivePreset::Named("default"),
        }
    }
}

impl FilterEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an explicit config, marked as custom.
    pub fn from_config(config: FilterConfig) -> Self {
        let mut editor = Self::default();
        editor.remember_band(&config);
        editor.config = config.normalize();
        editor.active = ActivePreset::Custom;
        editor
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn active_preset(&self) -> ActivePreset {
        self.active
    }

    pub fn band_params(&self) -> BandParams {
        self.band
    }

    /// Replace the config wholesale with a preset's.
    pub fn apply_preset(&mut self, key: &str) -> Result<(), UnknownPresetError> {
        let preset = find_preset(key)?;
        self.remember_band(&preset.config);
        self.config = preset.config.normalize();
        self.active = ActivePreset::Named(preset.key);
        Ok(())
    }

    /// Apply a partial edit. An empty patch is not an edit and leaves the
    /// preset selection alone.
    pub fn apply_patch(&mut self, patch: &ConfigPatch) {
        if patch.is_empty() {
            return;
        }

        if let Some(center) = patch.center_freq {
            self.band.center_freq = center;
        }
        if let Some(width) = patch.bandwidth {
            self.band.bandwidth = width;
        }

        let mut next = self.config.patched(patch);
        if next.filter_mode.is_band_reject() {
            next.center_freq = Some(self.band.center_freq);
            next.bandwidth = Some(self.band.bandwidth);
        }
        self.config = next.normalize();
        self.active = ActivePreset::Custom;
    }

    pub fn set_filter_type(&mut self, value: FilterType) {
        self.apply_patch(&ConfigPatch::new().filter_type(value));
    }

    pub fn set_filter_mode(&mut self, value: FilterMode) {
        self.apply_patch(&ConfigPatch::new().filter_mode(value));
    }

    pub fn set_cutoff(&mut self, value: u16) {
        self.apply_patch(&ConfigPatch::new().cutoff(value));
    }

    pub fn set_order(&mut self, value: u8) {
        self.apply_patch(&ConfigPatch::new().order(value));
    }

    pub fn set_center_freq(&mut self, value: u16) {
        self.apply_patch(&ConfigPatch::new().center_freq(value));
    }

    pub fn set_bandwidth(&mut self, value: u16) {
        self.apply_patch(&ConfigPatch::new().bandwidth(value));
    }

    fn remember_band(&mut self, config: &FilterConfig) {
        if let Some(center) = config.center_freq {
            self.band.center_freq = center;
        }
        if let Some(width) = config.bandwidth {
            self.band.bandwidth = width;
        }
    }
}
