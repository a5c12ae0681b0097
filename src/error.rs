/// Error taxonomy for the triage core.
///
/// Nothing here is fatal to the process: every variant maps to a
/// displayable state (blocked-with-retry, error-with-retry, warning) or
/// to a safe default on the degraded read paths.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriageError {
    /// Photo library access was not granted. Surfaced as a blocking
    /// state with a retry action; never retried automatically.
    #[error("photo library access denied")]
    PermissionDenied,

    /// A photo source call (enumerate, info, delete) failed.
    #[error("photo source error: {0}")]
    Source(String),

    /// A persistence read or write failed. Load failures degrade to an
    /// empty pile; save failures leave the in-memory mutation standing.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Input handed to the core could not be parsed, e.g. a serialized
    /// photo-id list. Degrades to an empty queue, never a crash.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}
