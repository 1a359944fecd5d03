//! Service traits separating the session domain from concrete transports.

pub mod api;

pub use api::{ProcessingService, SubmitOptions};
