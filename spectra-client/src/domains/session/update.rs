//! Session domain update logic

use log::{debug, error, info, warn};
use spectra_model::{UnknownPresetError, ValidationError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::SessionDomain;
use super::messages::Message;
use super::state::{ErrorInfo, InFlight, Phase, RequestToken, SessionState};
use crate::common::Task;
use crate::infra::encoder;
use crate::infra::errors::{EncodingError, ProcessingError};
use crate::infra::services::SubmitOptions;

/// Why a submit was turned into a no-op.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejection {
    #[error("no image selected")]
    NoSelection,
    #[error("a processing request is already outstanding")]
    Busy,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

pub fn update(domain: &mut SessionDomain, message: Message) -> Task<Message> {
    debug!("[Session] {:?}", message);

    match message {
        Message::SelectImage(selection) => {
            let state = &mut domain.state;
            if let Some(stale) = state.invalidate_in_flight() {
                info!(
                    "[Session] New selection supersedes request {}",
                    stale
                );
            }
            state.selection = Some(selection);
            state.result = None;
            state.error = None;
            state.phase = Phase::Ready;
            Task::none()
        }

        Message::UpdateConfig(patch) => {
            domain.state.editor.apply_patch(&patch);
            Task::none()
        }

        Message::ApplyPreset(key) => {
            // Failure is already logged; the config stays untouched.
            let _ = apply_preset(&mut domain.state, &key);
            Task::none()
        }

        Message::Submit => match begin_submit(domain) {
            Ok((_, task)) => task,
            Err(rejection) => {
                debug!("[Session] Submit ignored: {}", rejection);
                Task::none()
            }
        },

        Message::ProcessingFinished { token, outcome } => {
            finish_processing(&mut domain.state, token, outcome);
            Task::none()
        }

        Message::CheckHealth => {
            let service = domain.service.clone();
            Task::perform(
                async move {
                    service.health().await.map_err(|err| err.to_string())
                },
                Message::HealthChecked,
            )
        }

        Message::HealthChecked(outcome) => {
            let state = &mut domain.state;
            match outcome {
                Ok(status) if status.is_ok() => state.warning = None,
                Ok(status) => {
                    warn!("[Session] Service reports status '{}'", status.status);
                    state.warning = Some(match status.message {
                        Some(message) => format!(
                            "processing service reports '{}': {}",
                            status.status, message
                        ),
                        None => format!(
                            "processing service reports '{}'",
                            status.status
                        ),
                    });
                }
                Err(err) => {
                    warn!("[Session] Health check failed: {}", err);
                    state.warning =
                        Some(format!("processing service unreachable: {err}"));
                }
            }
            Task::none()
        }

        Message::DismissError => {
            domain.state.error = None;
            Task::none()
        }
    }
}

/// Load preset `key` into the editor.
pub fn apply_preset(
    state: &mut SessionState,
    key: &str,
) -> Result<(), UnknownPresetError> {
    state.editor.apply_preset(key).inspect_err(|err| {
        error!("[Session] {}", err);
    })
}

/// Validate, encode and start a submission.
///
/// On rejection the state is left exactly as it was. On success the session
/// is `Processing` and the returned task resolves into
/// [`Message::ProcessingFinished`] for the returned token.
pub fn begin_submit(
    domain: &mut SessionDomain,
) -> Result<(RequestToken, Task<Message>), SubmitRejection> {
    let state = &mut domain.state;
    if state.phase == Phase::Processing {
        return Err(SubmitRejection::Busy);
    }
    let selection =
        state.selection.as_ref().ok_or(SubmitRejection::NoSelection)?;
    let config = *state.config();
    config.validate().into_result()?;
    let payload = encoder::encode(Some(selection.image()), &config)?;

    let token = state.issue_token();
    let cancel = CancellationToken::new();
    state.in_flight = Some(InFlight {
        token,
        cancel: cancel.clone(),
    });
    state.phase = Phase::Processing;
    state.error = None;

    info!(
        "[Session] Submitting request {} ({} {} cutoff {})",
        token, config.filter_type, config.filter_mode, config.cutoff
    );

    let service = domain.service.clone();
    let options =
        SubmitOptions::new(state.options.process_timeout).with_cancel(cancel);
    let task = Task::perform(
        async move { service.process(payload, options).await },
        move |outcome| Message::ProcessingFinished { token, outcome },
    );
    Ok((token, task))
}

fn finish_processing(
    state: &mut SessionState,
    token: RequestToken,
    outcome: Result<spectra_model::ProcessingResult, ProcessingError>,
) {
    if !state.is_current(token) {
        debug!("[Session] Discarding stale completion for {}", token);
        return;
    }

    state.in_flight = None;
    state.phase = if state.selection.is_some() {
        Phase::Ready
    } else {
        Phase::Idle
    };

    match outcome {
        Ok(result) => {
            info!(
                "[Session] Request {} succeeded (psnr {:.2} dB, ssim {:.3})",
                token, result.metrics.psnr, result.metrics.ssim
            );
            state.result = Some(result);
            state.error = None;
        }
        Err(err) => {
            warn!("[Session] Request {} failed: {}", token, err);
            state.error = Some(ErrorInfo::from(&err));
        }
    }
}
