use thiserror::Error;

/// Failure taxonomy for the vitals client. Every variant is recoverable:
/// the worst degraded state is an empty or stale window plus a visible
/// status message.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The one-shot snapshot request failed (transport error or non-2xx).
    /// Surfaced to the presentation layer; the previous window is retained.
    #[error("snapshot request to {url} failed: {reason}")]
    Snapshot { url: String, reason: String },

    /// A stream message carried a payload that is not a valid vital record.
    /// The event is dropped and the stream stays open.
    #[error("malformed stream payload: {0}")]
    Parse(#[from] serde_json::Error),

    /// The persistent stream connection failed or ended. Triggers the
    /// fixed-delay reconnect cycle.
    #[error("stream transport failed: {0}")]
    Transport(String),
}
