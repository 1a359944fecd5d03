pub mod api_client;
pub mod api_types;
pub mod config;
pub mod encoder;
pub mod errors;
pub mod services;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
