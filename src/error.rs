use thiserror::Error;

/// Failure of a single request against the analysis API.
///
/// Every variant is recoverable: the chat client turns it into connection
/// state or an error message in the thread.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("request aborted: {0}")]
    Aborted(String),
}

impl ApiError {
    /// The reason is the standard phrase for the code. reqwest does not
    /// expose the phrase the server wrote on its status line, and HTTP/2
    /// has none.
    pub fn status(status: reqwest::StatusCode) -> Self {
        Self::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            Self::Aborted("request cancelled".to_string())
        } else {
            Self::Aborted("request task panicked".to_string())
        }
    }
}
