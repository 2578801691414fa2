//! CLI command implementations.

pub mod endpoint;
pub mod init;
pub mod read;
pub mod send;
pub mod setup;
