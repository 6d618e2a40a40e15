//! Engine error types.

use thiserror::Error;

/// Errors that can occur while talking to a backend or resolving identities.
///
/// Vendor-logical errors (HTTP 200 with an embedded error status) are not
/// represented here; the reconciler classifies those into an [`Outcome`]
/// instead of raising them.
///
/// [`Outcome`]: crate::reconciler::Outcome
#[derive(Debug, Error)]
pub enum Error {
    /// Non-success HTTP status from a backend.
    #[error("transport error: HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    /// Expected key missing from a decoded response envelope.
    #[error("missing `{0}` key in response envelope")]
    Envelope(String),

    /// No deployment policy with the requested name.
    #[error("deployment policy `{0}` not found")]
    PolicyNotFound(String),

    /// User search returned no results.
    #[error("service desk user `{0}` not found")]
    UserNotFound(String),

    /// Request could not be issued or the body could not be read.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON shape the endpoint promises.
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
