//! Session domain - one image, one filter configuration, at most one
//! outstanding processing request

pub mod controller;
pub mod messages;
pub mod state;
pub mod update;
pub mod view;

use std::sync::Arc;

use crate::infra::services::ProcessingService;

pub use self::controller::SessionController;
pub use self::messages::Message;
pub use self::state::{
    ErrorInfo, ImageSelection, Phase, RequestToken, SessionOptions,
    SessionState,
};
pub use self::update::SubmitRejection;
pub use self::view::SessionView;

/// Session domain state container
#[derive(Debug)]
pub struct SessionDomain {
    pub state: SessionState,
    /// Service processing requests are sent to
    pub service: Arc<dyn ProcessingService>,
}

impl SessionDomain {
    pub fn new(service: Arc<dyn ProcessingService>) -> Self {
        Self::with_options(service, SessionOptions::default())
    }

    pub fn with_options(
        service: Arc<dyn ProcessingService>,
        options: SessionOptions,
    ) -> Self {
        Self {
            state: SessionState::new(options),
            service,
        }
    }
}
