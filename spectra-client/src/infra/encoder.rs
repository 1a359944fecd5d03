//! Turns the selected image and the filter configuration into the multipart
//! body of `POST /api/process`.
//!
//! Pure transformation: nothing here touches the network. The payload keeps
//! its text parts as an ordered list so tests can assert on the exact set
//! that would be sent.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use reqwest::multipart::{Form, Part};
use spectra_model::{EncodedImage, FilterConfig, strip_data_url_prefix};

use crate::infra::errors::EncodingError;

/// Form field carrying the image bytes.
pub const IMAGE_FIELD: &str = "image";
/// File name the service expects on the image part.
pub const IMAGE_FILENAME: &str = "image.png";
/// Content type declared on the image part.
pub const IMAGE_MIME: &str = "image/png";

/// Accepts what browsers' `atob` accepts: padded or unpadded input and
/// non-canonical trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Transport-ready body of a processing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessPayload {
    image: Vec<u8>,
    fields: Vec<(&'static str, String)>,
}

impl ProcessPayload {
    pub fn image_bytes(&self) -> &[u8] {
        &self.image
    }

    /// Scalar parts in the order they are appended to the form.
    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Build the multipart form. Consumes the payload since the image part
    /// takes ownership of the bytes.
    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let image = Part::bytes(self.image)
            .file_name(IMAGE_FILENAME)
            .mime_str(IMAGE_MIME)?;
        let form = self
            .fields
            .into_iter()
            .fold(Form::new().part(IMAGE_FIELD, image), |form, (k, v)| {
                form.text(k, v)
            });
        Ok(form)
    }
}

/// Encode `image` and `config` into a [`ProcessPayload`].
///
/// The config is normalized first, so `center_freq` and `bandwidth` are
/// present exactly when the mode is band-reject and the values are set.
pub fn encode(
    image: Option<&EncodedImage>,
    config: &FilterConfig,
) -> Result<ProcessPayload, EncodingError> {
    let image = image.ok_or(EncodingError::EmptyImage)?;
    // Wrapped base64 (MIME line breaks) is common in pasted data URLs.
    let payload: String = strip_data_url_prefix(image.as_str())
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if payload.is_empty() {
        return Err(EncodingError::EmptyImage);
    }

    let bytes = LENIENT
        .decode(&payload)
        .map_err(|err| EncodingError::InvalidBase64(err.to_string()))?;
    if bytes.is_empty() {
        return Err(EncodingError::EmptyImage);
    }

    let config = config.normalize();
    let mut fields = vec![
        ("filter_type", config.filter_type.api_name().to_string()),
        ("filter_mode", config.filter_mode.api_name().to_string()),
        ("cutoff", config.cutoff.to_string()),
        ("order", config.order.to_string()),
    ];
    if let Some(center) = config.center_freq {
        fields.push(("center_freq", center.to_string()));
    }
    if let Some(width) = config.bandwidth {
        fields.push(("bandwidth", width.to_string()));
    }

    Ok(ProcessPayload {
        image: bytes,
        fields,
    })
}
