//! In-process test doubles for the service traits.

pub mod stubs;

pub use stubs::{ResponseGate, TestProcessingService, sample_result};
