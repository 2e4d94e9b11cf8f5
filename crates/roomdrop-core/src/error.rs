//! Error taxonomy for the room lifecycle core.

use thiserror::Error;

/// Failures produced by the lifecycle core.
///
/// Each variant is a stable caller-visible outcome; transports map variants
/// to their own status codes without parsing messages. Messages carry enough
/// context for server-side logs but never internal fault detail.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Missing or malformed input. Client-fixable, never retried.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Bad credentials, or a bearer token that does not resolve.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A uniqueness rule was violated (duplicate signup email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unknown user/room/record, or a code+password pair matching no active
    /// room. Code and password mismatches are collapsed into this one
    /// outcome so callers cannot probe which field was wrong.
    #[error("not found: {0}")]
    NotFound(String),

    /// Backing store or RNG fault. Surfaced to callers as a generic server
    /// fault; the message stays in server logs.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;
