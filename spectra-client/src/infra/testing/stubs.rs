use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use spectra_model::{EncodedImage, ProcessingResult, QualityMetrics};
use tokio::sync::oneshot;

use crate::infra::api_types::{HealthStatus, UploadResponse};
use crate::infra::encoder::ProcessPayload;
use crate::infra::errors::{ApiError, ProcessingError};
use crate::infra::services::api::{ProcessingService, SubmitOptions};

type Outcome = Result<ProcessingResult, ProcessingError>;

enum Scripted {
    Ready(Outcome),
    Gated(oneshot::Receiver<Outcome>),
}

/// Completes a held `process` call from the test body.
#[derive(Debug)]
pub struct ResponseGate(oneshot::Sender<Outcome>);

impl ResponseGate {
    /// Release the held call with `outcome`. Returns `false` when the call
    /// already gave up (e.g. it was cancelled).
    pub fn complete(self, outcome: Outcome) -> bool {
        self.0.send(outcome).is_ok()
    }

    /// Resolves once the held call has given up waiting.
    pub async fn abandoned(&mut self) {
        self.0.closed().await
    }
}

struct InnerState {
    script: VecDeque<Scripted>,
    payloads: Vec<ProcessPayload>,
    healthy: bool,
}

/// Scripted [`ProcessingService`]: every `process` call pops the next
/// queued response and records the payload it was given.
#[derive(Clone)]
pub struct TestProcessingService {
    inner: Arc<RwLock<InnerState>>,
}

impl std::fmt::Debug for TestProcessingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestProcessingService")
            .field("calls", &self.call_count())
            .finish()
    }
}

impl Default for TestProcessingService {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProcessingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(InnerState {
                script: VecDeque::new(),
                payloads: Vec::new(),
                healthy: true,
            })),
        }
    }

    /// Queue an immediate response.
    pub fn respond_with(&self, outcome: Outcome) {
        if let Ok(mut guard) = self.inner.write() {
            guard.script.push_back(Scripted::Ready(outcome));
        }
    }

    /// Queue a response that stays pending until the gate is completed.
    pub fn hold(&self) -> ResponseGate {
        let (tx, rx) = oneshot::channel();
        if let Ok(mut guard) = self.inner.write() {
            guard.script.push_back(Scripted::Gated(rx));
        }
        ResponseGate(tx)
    }

    pub fn set_healthy(&self, healthy: bool) {
        if let Ok(mut guard) = self.inner.write() {
            guard.healthy = healthy;
        }
    }

    /// Number of `process` calls received so far.
    pub fn call_count(&self) -> usize {
        self.inner.read().map(|g| g.payloads.len()).unwrap_or(0)
    }

    pub fn payloads(&self) -> Vec<ProcessPayload> {
        self.inner
            .read()
            .map(|g| g.payloads.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProcessingService for TestProcessingService {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let healthy = self.inner.read().map(|g| g.healthy).unwrap_or(false);
        if healthy {
            Ok(HealthStatus {
                status: "ok".into(),
                message: Some("stub".into()),
            })
        } else {
            Err(ApiError::Rejected {
                status: 503,
                message: "stub service is down".into(),
            })
        }
    }

    async fn process(
        &self,
        payload: ProcessPayload,
        options: SubmitOptions,
    ) -> Result<ProcessingResult, ProcessingError> {
        let next = match self.inner.write() {
            Ok(mut guard) => {
                guard.payloads.push(payload);
                guard.script.pop_front()
            }
            Err(_) => None,
        };

        match next {
            Some(Scripted::Ready(outcome)) => outcome,
            Some(Scripted::Gated(rx)) => tokio::select! {
                biased;
                _ = options.cancel.cancelled() => Err(ProcessingError::Cancelled),
                outcome = rx => outcome.unwrap_or_else(|_| {
                    Err(ProcessingError::Network("gate dropped".into()))
                }),
            },
            None => Err(ProcessingError::Network(
                "no scripted response".into(),
            )),
        }
    }

    async fn upload(
        &self,
        _bytes: Vec<u8>,
        filename: &str,
    ) -> Result<UploadResponse, ApiError> {
        Ok(UploadResponse {
            success: true,
            filename: filename.to_string(),
            filepath: Some(format!("uploads/{filename}")),
            preview: None,
        })
    }
}

/// A complete result whose images are tagged with `tag`.
pub fn sample_result(tag: &str) -> ProcessingResult {
    let image = |kind: &str| {
        EncodedImage::from_bytes(format!("{tag}:{kind}").as_bytes(), "image/png")
    };
    ProcessingResult {
        processed_image: image("processed"),
        magnitude_spectrum: image("spectrum"),
        filter_mask: image("mask"),
        metrics: QualityMetrics {
            mse: 4.2,
            psnr: 41.9,
            ssim: 0.97,
        },
        original_image: None,
    }
}
