use thiserror::Error;

/// A filter configuration that is incomplete or out of domain.
///
/// Raised before anything is encoded; such a configuration never reaches the
/// wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid filter configuration: {}", describe(.missing_fields, .out_of_range))]
pub struct ValidationError {
    /// Wire names of fields the filter mode requires but the config lacks.
    pub missing_fields: Vec<&'static str>,
    /// Wire names of fields whose value lies outside their domain.
    pub out_of_range: Vec<&'static str>,
}

fn describe(missing: &[&'static str], out_of_range: &[&'static str]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing {}", missing.join(", ")));
    }
    if !out_of_range.is_empty() {
        parts.push(format!("out of range {}", out_of_range.join(", ")));
    }
    parts.join("; ")
}

/// Lookup of a preset key that is not in the built-in table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown preset '{0}'")]
pub struct UnknownPresetError(pub String);

/// Failure to turn an encoded image string back into bytes.
#[derive(Debug, Error)]
pub enum ImageDataError {
    #[error("image data is empty")]
    Empty,
    #[error("image data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Parsing of a filter family or mode name failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {kind} '{value}'")]
pub struct ParseFilterError {
    pub kind: &'static str,
    pub value: String,
}
