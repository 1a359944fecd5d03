use std::sync::Arc;

use log::debug;
use spectra_model::{ConfigPatch, UnknownPresetError};
use tokio::sync::mpsc;

use super::SessionDomain;
use super::messages::Message;
use super::state::{ImageSelection, RequestToken, SessionOptions, SessionState};
use super::update::{self, SubmitRejection, update};
use super::view::SessionView;
use crate::common::Task;
use crate::infra::services::ProcessingService;

/// Owner of one session.
///
/// Every transition runs through [`update`] on the caller's task. Work a
/// transition starts (the processing call, a health probe) runs on the
/// tokio runtime and comes back as a [`Message`] through
/// [`SessionController::next_message`], so completions are applied by the
/// same owner that issued them.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct SessionController {
    domain: SessionDomain,
    sender: mpsc::UnboundedSender<Message>,
    receiver: mpsc::UnboundedReceiver<Message>,
    pending: usize,
}

impl SessionController {
    pub fn new(service: Arc<dyn ProcessingService>) -> Self {
        Self::with_options(service, SessionOptions::default())
    }

    pub fn with_options(
        service: Arc<dyn ProcessingService>,
        options: SessionOptions,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            domain: SessionDomain::with_options(service, options),
            sender,
            receiver,
            pending: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.domain.state
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView::from_state(&self.domain.state)
    }

    /// Number of started tasks whose message has not been applied yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn select_image(&mut self, selection: ImageSelection) {
        self.dispatch(Message::SelectImage(selection));
    }

    pub fn update_config(&mut self, patch: ConfigPatch) {
        self.dispatch(Message::UpdateConfig(patch));
    }

    pub fn apply_preset(&mut self, key: &str) -> Result<(), UnknownPresetError> {
        update::apply_preset(&mut self.domain.state, key)
    }

    /// Start processing the current selection. A rejected submit changes
    /// nothing and is not queued.
    pub fn submit(&mut self) -> Result<RequestToken, SubmitRejection> {
        let (token, task) = update::begin_submit(&mut self.domain)?;
        self.spawn(task);
        Ok(token)
    }

    pub fn check_health(&mut self) {
        self.dispatch(Message::CheckHealth);
    }

    pub fn dismiss_error(&mut self) {
        self.dispatch(Message::DismissError);
    }

    /// Apply `message` and start whatever work it yields.
    pub fn dispatch(&mut self, message: Message) {
        let task = update(&mut self.domain, message);
        self.spawn(task);
    }

    /// Wait for the next completed task. `None` when nothing is pending.
    pub async fn next_message(&mut self) -> Option<Message> {
        if self.pending == 0 {
            return None;
        }
        let message = self.receiver.recv().await?;
        self.pending -= 1;
        Some(message)
    }

    /// Apply one completed task. Returns `false` when nothing was pending.
    pub async fn step(&mut self) -> bool {
        match self.next_message().await {
            Some(message) => {
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    /// Drive the session until no task is outstanding.
    pub async fn run_until_idle(&mut self) {
        while self.step().await {}
    }

    fn spawn(&mut self, task: Task<Message>) {
        let Some(future) = task.into_future() else {
            return;
        };
        self.pending += 1;
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let message = future.await;
            if sender.send(message).is_err() {
                debug!("[Session] Controller dropped before task completed");
            }
        });
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(token) = self.domain.state.invalidate_in_flight() {
            debug!("[Session] Controller dropped, cancelled request {}", token);
        }
    }
}
