//! Harness error types.

use http::StatusCode;
use thiserror::Error;
use webharness_host::HostError;

/// Errors raised by a harness verb call.
///
/// Only [`UnsuccessfulStatus`](HarnessError::UnsuccessfulStatus) is
/// synthesized here; every other variant passes an underlying failure
/// through unchanged.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The response status was outside the 2xx range and the call required
    /// success. Carries the status display name and the full response body
    /// so a failing test shows what the server actually said.
    #[error("Status code {name} is not considered as success.\nBody: {body}")]
    UnsuccessfulStatus {
        /// Display name of the status code, e.g. `InternalServerError`.
        name: String,
        /// The status code itself.
        status: StatusCode,
        /// The full raw response body.
        body: String,
    },

    /// A transport-level failure from the hosted server capability.
    #[error(transparent)]
    Host(#[from] HostError),

    /// The request payload could not be serialized to JSON, or a response
    /// body could not be deserialized.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The request could not be assembled, e.g. the path was not a valid
    /// URI.
    #[error(transparent)]
    InvalidRequest(#[from] http::Error),
}
