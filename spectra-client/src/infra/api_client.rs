use std::time::Duration;

use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use spectra_model::ProcessingResult;

use crate::infra::api_types::{
    ErrorBody, HealthStatus, ProcessResponse, UploadResponse, routes,
};
use crate::infra::config::{ClientConfig, normalize_base_url};
use crate::infra::encoder::{IMAGE_FIELD, ProcessPayload};
use crate::infra::errors::{ApiError, ProcessingError};
use crate::infra::services::api::SubmitOptions;

/// HTTP client for the remote processing service.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ApiClient {
    /// Create a client for `config.server_url`.
    ///
    /// No client-wide timeout is installed: `/api/process` carries its own
    /// per-call bound, the other endpoints use `request_timeout`.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&config.server_url);
        let client = Client::builder()
            .connect_timeout(config.request_timeout())
            .build()
            .map_err(ApiError::Client)?;

        info!(
            "[ApiClient] Creating new API client with base URL: {}",
            base_url
        );

        Ok(Self {
            client,
            base_url,
            request_timeout: config.request_timeout(),
        })
    }

    /// Build an absolute URL for a service route.
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let p = path.as_ref();
        if p.starts_with("http://") || p.starts_with("https://") {
            return p.to_string();
        }
        format!("{}/{}", self.base_url, p.trim_start_matches('/'))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Liveness probe against `GET /api/health`.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = self.build_url(routes::HEALTH);
        debug!("[ApiClient] GET {}", url);
        let request = self.client.get(&url).timeout(self.request_timeout);
        self.execute_json(request).await
    }

    /// Upload a raw image file to `POST /api/upload`.
    pub async fn upload_image(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<UploadResponse, ApiError> {
        let url = self.build_url(routes::UPLOAD);
        debug!(
            "[ApiClient] POST {} ({} bytes, file '{}')",
            url,
            bytes.len(),
            filename
        );
        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part(IMAGE_FIELD, part);
        let request = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.request_timeout);
        self.execute_json(request).await
    }

    /// Submit one processing request.
    ///
    /// Exactly one outbound request is made and it is never retried. The
    /// call resolves with [`ProcessingError::Cancelled`] as soon as
    /// `options.cancel` fires and with [`ProcessingError::Timeout`] once
    /// `options.timeout` elapses, whichever comes first.
    pub async fn process(
        &self,
        payload: ProcessPayload,
        options: SubmitOptions,
    ) -> Result<ProcessingResult, ProcessingError> {
        let url = self.build_url(routes::PROCESS);
        let form = payload
            .into_form()
            .map_err(|err| ProcessingError::Network(err.to_string()))?;
        let timeout = options.timeout;

        debug!("[ApiClient] POST {} (timeout {:?})", url, timeout);

        let request = self.client.post(&url).multipart(form).timeout(timeout);
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = tokio::select! {
            biased;
            _ = options.cancel.cancelled() => {
                info!("[ApiClient] Processing request to {} cancelled", url);
                return Err(ProcessingError::Cancelled);
            }
            outcome = tokio::time::timeout(timeout, exchange) => match outcome {
                Err(_) => {
                    warn!("[ApiClient] Processing request timed out after {:?}", timeout);
                    return Err(ProcessingError::Timeout(timeout));
                }
                Ok(Err(err)) => {
                    warn!("[ApiClient] Processing request failed: {}", err);
                    return Err(ProcessingError::from_transport(err, timeout));
                }
                Ok(Ok(exchange)) => exchange,
            },
        };

        debug!("[ApiClient] {} responded with {}", url, status);
        interpret_process_response(status, &body)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            Ok(serde_json::from_slice(&body)?)
        } else {
            Err(ApiError::Rejected {
                status: status.as_u16(),
                message: error_message(status, &body),
            })
        }
    }
}

/// Classify a `/api/process` response.
pub fn interpret_process_response(
    status: StatusCode,
    body: &[u8],
) -> Result<ProcessingResult, ProcessingError> {
    if !status.is_success() {
        return Err(ProcessingError::Rejected {
            status: status.as_u16(),
            message: error_message(status, body),
        });
    }

    let response: ProcessResponse = serde_json::from_slice(body)
        .map_err(|err| ProcessingError::MalformedResponse(err.to_string()))?;

    if response.success == Some(false) {
        let message = response
            .error
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or_else(|| "processing did not succeed".to_string());
        return Err(ProcessingError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    response.into_result().map_err(|missing| {
        ProcessingError::MalformedResponse(format!(
            "missing or invalid fields: {}",
            missing.join(", ")
        ))
    })
}

/// Human-readable message for a failed response: the structured `error`
/// field, else the raw body text, else the status line.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(ErrorBody { error: Some(message) }) =
        serde_json::from_slice::<ErrorBody>(body)
        && !message.trim().is_empty()
    {
        return message;
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown status")
    )
}
