//! Wire shapes of the processing service's JSON bodies.

use serde::{Deserialize, Serialize};
use spectra_model::{EncodedImage, ProcessingResult, QualityMetrics};

/// Route table of the processing service.
pub mod routes {
    pub const HEALTH: &str = "/api/health";
    pub const PROCESS: &str = "/api/process";
    pub const UPLOAD: &str = "/api/upload";
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Body of a successful `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    pub filename: String,
    #[serde(default)]
    pub filepath: Option<String>,
    #[serde(default)]
    pub preview: Option<EncodedImage>,
}

/// `{ "error": "..." }` returned alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /api/process`. Every field is optional on the wire so a
/// missing one can be reported by name instead of as a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub original_image: Option<EncodedImage>,
    #[serde(default)]
    pub processed_image: Option<EncodedImage>,
    #[serde(default)]
    pub magnitude_spectrum: Option<EncodedImage>,
    #[serde(default)]
    pub filter_mask: Option<EncodedImage>,
    #[serde(default)]
    pub metrics: Option<MetricsBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsBody {
    #[serde(default)]
    pub mse: Option<f64>,
    #[serde(default)]
    pub psnr: Option<f64>,
    #[serde(default)]
    pub ssim: Option<f64>,
}

impl ProcessResponse {
    /// Assemble a complete result, or name every missing field.
    pub fn into_result(self) -> Result<ProcessingResult, Vec<&'static str>> {
        let mut missing = Vec::new();

        let processed_image =
            present(self.processed_image, "processed_image", &mut missing);
        let magnitude_spectrum = present(
            self.magnitude_spectrum,
            "magnitude_spectrum",
            &mut missing,
        );
        let filter_mask =
            present(self.filter_mask, "filter_mask", &mut missing);

        let metrics = match self.metrics {
            Some(body) => {
                // SSIM lies in [-1, 1]; heavy high-pass output can score
                // below zero.
                let mse = body.mse.filter(|v| *v >= 0.0);
                let ssim = body.ssim.filter(|v| (-1.0..=1.0).contains(v));
                let psnr = body.psnr;
                if mse.is_none() {
                    missing.push("metrics.mse");
                }
                if psnr.is_none() {
                    missing.push("metrics.psnr");
                }
                if ssim.is_none() {
                    missing.push("metrics.ssim");
                }
                match (mse, psnr, ssim) {
                    (Some(mse), Some(psnr), Some(ssim)) => {
                        Some(QualityMetrics { mse, psnr, ssim })
                    }
                    _ => None,
                }
            }
            None => {
                missing.push("metrics");
                None
            }
        };

        match (processed_image, magnitude_spectrum, filter_mask, metrics) {
            (
                Some(processed_image),
                Some(magnitude_spectrum),
                Some(filter_mask),
                Some(metrics),
            ) if missing.is_empty() => Ok(ProcessingResult {
                processed_image,
                magnitude_spectrum,
                filter_mask,
                metrics,
                original_image: self.original_image,
            }),
            _ => Err(missing),
        }
    }
}

fn present(
    image: Option<EncodedImage>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<EncodedImage> {
    match image {
        Some(image) if !image.is_empty() => Some(image),
        _ => {
            missing.push(field);
            None
        }
    }
}
