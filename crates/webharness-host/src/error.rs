//! Host error types.

use thiserror::Error;

/// Errors raised by the in-memory host.
#[derive(Debug, Error)]
pub enum HostError {
    /// The application-configuration callback never installed a handler.
    #[error("application configuration did not install a handler")]
    NoApplication,

    /// A header name or value handed to the client was not valid.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}
