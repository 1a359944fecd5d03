//! Spectra client library
//!
//! Session orchestration and transport for a remote 2D Fourier
//! image-filtering service. The `spectra` binary in `src/main.rs` is a thin
//! front end over these modules.
//!
//! Notes
//! - [`domains::session`] owns all session state and sequences requests.
//! - [`infra`] holds the HTTP client, request encoding, configuration and
//!   the test doubles used by the integration tests.

pub mod common;
pub mod domains;
pub mod infra;

pub use domains::session::{SessionController, SessionView};
pub use infra::api_client::ApiClient;
pub use infra::config::ClientConfig;
