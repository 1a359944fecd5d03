//! Frequency-domain filter parameters.
//!
//! A [`FilterConfig`] is a value object: every edit produces a new revision.
//! Conditional fields (`center_freq`, `bandwidth`) are modelled as `Option`
//! so that absence, not a zero value, decides whether they reach the wire.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseFilterError, ValidationError};

/// Domain of the cutoff radius.
pub const CUTOFF_RANGE: RangeInclusive<u16> = 1..=200;
/// Domain of the Butterworth order.
pub const ORDER_RANGE: RangeInclusive<u8> = 1..=10;
/// Domain of the band-reject center frequency.
pub const CENTER_FREQ_RANGE: RangeInclusive<u16> = 1..=200;
/// Domain of the band-reject bandwidth.
pub const BANDWIDTH_RANGE: RangeInclusive<u16> = 1..=100;

/// Order sent when the caller never chose one.
pub const DEFAULT_ORDER: u8 = 2;

/// Shape of the frequency-domain multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FilterType {
    /// Hard cutoff.
    Ideal,
    /// Smooth roll-off with a tunable order.
    Butterworth,
    /// Smooth roll-off, order independent.
    #[default]
    Gaussian,
}

impl FilterType {
    pub fn all() -> &'static [FilterType] {
        &[FilterType::Ideal, FilterType::Butterworth, FilterType::Gaussian]
    }

    /// Name used in the `filter_type` form field.
    pub fn api_name(&self) -> &'static str {
        match self {
            FilterType::Ideal => "ideal",
            FilterType::Butterworth => "butterworth",
            FilterType::Gaussian => "gaussian",
        }
    }

    /// Whether the `order` parameter changes the filter's shape.
    pub fn uses_order(&self) -> bool {
        matches!(self, FilterType::Butterworth)
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

impl FromStr for FilterType {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterType::all()
            .iter()
            .copied()
            .find(|t| t.api_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseFilterError {
                kind: "filter type",
                value: s.to_string(),
            })
    }
}

/// Which band the filter attenuates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FilterMode {
    /// Keep frequencies inside the cutoff radius.
    #[default]
    Lowpass,
    /// Keep frequencies outside the cutoff radius.
    Highpass,
    /// Attenuate a ring around `center_freq` of width `bandwidth`.
    Bandreject,
}

impl FilterMode {
    pub fn all() -> &'static [FilterMode] {
        &[FilterMode::Lowpass, FilterMode::Highpass, FilterMode::Bandreject]
    }

    /// Name used in the `filter_mode` form field.
    pub fn api_name(&self) -> &'static str {
        match self {
            FilterMode::Lowpass => "lowpass",
            FilterMode::Highpass => "highpass",
            FilterMode::Bandreject => "bandreject",
        }
    }

    pub fn is_band_reject(&self) -> bool {
        matches!(self, FilterMode::Bandreject)
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

impl FromStr for FilterMode {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FilterMode::all()
            .iter()
            .copied()
            .find(|m| m.api_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseFilterError {
                kind: "filter mode",
                value: s.to_string(),
            })
    }
}

/// Complete parameter set for one processing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterConfig {
    pub filter_type: FilterType,
    pub filter_mode: FilterMode,
    /// Filter radius / cutoff frequency.
    pub cutoff: u16,
    /// Always carried; only consumed by Butterworth filters.
    pub order: u8,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub center_freq: Option<u16>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub bandwidth: Option<u16>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filter_type: FilterType::Gaussian,
            filter_mode: FilterMode::Lowpass,
            cutoff: 20,
            order: DEFAULT_ORDER,
            center_freq: None,
            bandwidth: None,
        }
    }
}

/// Outcome of [`FilterConfig::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigValidation {
    pub missing_fields: Vec<&'static str>,
    pub out_of_range: Vec<&'static str>,
}

impl ConfigValidation {
    pub fn is_valid(&self) -> bool {
        self.missing_fields.is_empty() && self.out_of_range.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ValidationError {
                missing_fields: self.missing_fields,
                out_of_range: self.out_of_range,
            })
        }
    }
}

impl FilterConfig {
    /// Check domain ranges and the presence of mode-conditional fields.
    ///
    /// `center_freq`/`bandwidth` are only inspected for band-reject configs,
    /// since they are dropped for every other mode.
    pub fn validate(&self) -> ConfigValidation {
        let mut report = ConfigValidation::default();

        if !CUTOFF_RANGE.contains(&self.cutoff) {
            report.out_of_range.push("cutoff");
        }
        if !ORDER_RANGE.contains(&self.order) {
            report.out_of_range.push("order");
        }

        if self.filter_mode.is_band_reject() {
            match self.center_freq {
                None => report.missing_fields.push("center_freq"),
                Some(v) if !CENTER_FREQ_RANGE.contains(&v) => {
                    report.out_of_range.push("center_freq")
                }
                Some(_) => {}
            }
            match self.bandwidth {
                None => report.missing_fields.push("bandwidth"),
                Some(v) if !BANDWIDTH_RANGE.contains(&v) => {
                    report.out_of_range.push("bandwidth")
                }
                Some(_) => {}
            }
        }

        report
    }

    /// Shorthand for `validate().is_valid()`.
    pub fn is_complete(&self) -> bool {
        self.validate().is_valid()
    }

    /// Drop the band parameters unless the mode is band-reject.
    #[must_use]
    pub fn normalize(self) -> Self {
        if self.filter_mode.is_band_reject() {
            self
        } else {
            Self {
                center_freq: None,
                bandwidth: None,
                ..self
            }
        }
    }

    /// Apply every field present in `patch`, leaving the rest untouched.
    #[must_use]
    pub fn patched(self, patch: &ConfigPatch) -> Self {
        Self {
            filter_type: patch.filter_type.unwrap_or(self.filter_type),
            filter_mode: patch.filter_mode.unwrap_or(self.filter_mode),
            cutoff: patch.cutoff.unwrap_or(self.cutoff),
            order: patch.order.unwrap_or(self.order),
            center_freq: patch.center_freq.or(self.center_freq),
            bandwidth: patch.bandwidth.or(self.bandwidth),
        }
    }
}

/// A partial edit of a [`FilterConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    pub filter_type: Option<FilterType>,
    pub filter_mode: Option<FilterMode>,
    pub cutoff: Option<u16>,
    pub order: Option<u8>,
    pub center_freq: Option<u16>,
    pub bandwidth: Option<u16>,
}

impl ConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_type(mut self, value: FilterType) -> Self {
        self.filter_type = Some(value);
        self
    }

    pub fn filter_mode(mut self, value: FilterMode) -> Self {
        self.filter_mode = Some(value);
        self
    }

    pub fn cutoff(mut self, value: u16) -> Self {
        self.cutoff = Some(value);
        self
    }

    pub fn order(mut self, value: u8) -> Self {
        self.order = Some(value);
        self
    }

    pub fn center_freq(mut self, value: u16) -> Self {
        self.center_freq = Some(value);
        self
    }

    pub fn bandwidth(mut self, value: u16) -> Self {
        self.bandwidth = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
