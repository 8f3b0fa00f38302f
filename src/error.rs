use thiserror::Error;

/// Failures a report request can end with.
///
/// The computation itself has no failure modes of its own: every ratio has a
/// zero fallback. Anything that goes wrong at the storage or rendering boundary
/// is folded into `Internal`.
#[derive(Debug, Error)]
pub enum DiagnosticsError {
    #[error("authentication required: pass --handle or set CREATOR_HANDLE")]
    AuthenticationRequired,

    #[error("profile not found: {handle}")]
    ProfileNotFound { handle: String },

    #[error("invalid window: {0} days (must be greater than zero)")]
    InvalidWindow(i64),

    #[error("internal failure: {0:#}")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for DiagnosticsError {
    fn from(err: anyhow::Error) -> Self {
        DiagnosticsError::Internal(err)
    }
}
