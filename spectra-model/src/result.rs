//! Artifacts returned by the processing service.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ImageDataError;

/// Return the base64 payload of a `data:<mime>;base64,<payload>` string, or
/// the whole input when it carries no such prefix.
pub fn strip_data_url_prefix(value: &str) -> &str {
    if let Some(rest) = value.strip_prefix("data:")
        && let Some(idx) = rest.find(";base64,")
    {
        return &rest[idx + ";base64,".len()..];
    }
    value
}

/// A self-contained displayable image, usually a base64 data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build a data URL from raw bytes.
    pub fn from_bytes(bytes: &[u8], mime: &str) -> Self {
        Self(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        strip_data_url_prefix(&self.0).trim().is_empty()
    }

    /// MIME type declared by the data URL prefix, if any.
    pub fn mime_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let end = rest.find([';', ','])?;
        let mime = &rest[..end];
        (!mime.is_empty()).then_some(mime)
    }

    /// Decode the base64 payload into raw image bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ImageDataError> {
        let payload = strip_data_url_prefix(&self.0).trim();
        if payload.is_empty() {
            return Err(ImageDataError::Empty);
        }
        Ok(STANDARD.decode(payload)?)
    }
}

impl From<String> for EncodedImage {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Fidelity of the filtered image against the original.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QualityMetrics {
    /// Mean squared error, never negative.
    pub mse: f64,
    /// Peak signal-to-noise ratio in dB.
    pub psnr: f64,
    /// Structural similarity in `[-1, 1]`, 1 meaning identical.
    pub ssim: f64,
}

/// Everything one successful processing call produced.
///
/// Replaced as a unit; there is no partially populated result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProcessingResult {
    pub processed_image: EncodedImage,
    pub magnitude_spectrum: EncodedImage,
    pub filter_mask: EncodedImage,
    pub metrics: QualityMetrics,
    /// The service echoes the decoded input back; older servers omit it.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub original_image: Option<EncodedImage>,
}
