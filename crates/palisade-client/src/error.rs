//! Error types for palisade-client.

use palisade_directory::PeerUuid;
use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the peer management authority.
///
/// Transport failure and an application-level error envelope are distinct
/// outcomes: the first means the authority could not be reached or did not
/// answer sensibly, the second means it answered and said no.
#[derive(Debug, Error)]
pub enum Error {
    /// The authority was unreachable, timed out, or the request failed
    /// below the application layer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The authority answered with a body that parses as neither the
    /// expected payload nor an error envelope.
    #[error("malformed response from authority: {detail}")]
    MalformedResponse { detail: String },

    /// The authority rejected the request with an error envelope.
    #[error("authority rejected request (code {code}): {}", .messages.join(", "))]
    Application { messages: Vec<String>, code: i64 },

    /// Locally detected malformed input. No remote call was made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Admit would replace the certificate of an already-known peer.
    /// Remove the peer first to make the re-keying explicit.
    #[error("peer {uuid} is already known with a different certificate")]
    TrustConflict { uuid: PeerUuid },
}
