//! Feature domains of the client

pub mod session;
