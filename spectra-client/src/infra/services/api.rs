//! Processing service trait and its HTTP implementation
//!
//! The session domain only sees [`ProcessingService`], so it can be driven
//! by a stub in tests.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use spectra_model::ProcessingResult;
use tokio_util::sync::CancellationToken;

use crate::infra::api_client::ApiClient;
use crate::infra::api_types::{HealthStatus, UploadResponse};
use crate::infra::encoder::ProcessPayload;
use crate::infra::errors::{ApiError, ProcessingError};

/// Per-call bounds for [`ProcessingService::process`].
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub timeout: Duration,
    /// Firing this aborts the call with [`ProcessingError::Cancelled`].
    pub cancel: CancellationToken,
}

impl SubmitOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Operations the remote processing service offers.
#[async_trait]
pub trait ProcessingService: Send + Sync + Debug {
    /// Liveness probe.
    async fn health(&self) -> Result<HealthStatus, ApiError>;

    /// Issue exactly one processing request for `payload`.
    async fn process(
        &self,
        payload: ProcessPayload,
        options: SubmitOptions,
    ) -> Result<ProcessingResult, ProcessingError>;

    /// Store an image on the service side.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<UploadResponse, ApiError>;
}

#[async_trait]
impl ProcessingService for ApiClient {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        ApiClient::health(self).await
    }

    async fn process(
        &self,
        payload: ProcessPayload,
        options: SubmitOptions,
    ) -> Result<ProcessingResult, ProcessingError> {
        ApiClient::process(self, payload, options).await
    }

    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<UploadResponse, ApiError> {
        self.upload_image(bytes, filename).await
    }
}
