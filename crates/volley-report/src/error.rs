/// Why a summary did not reach the history service.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The request never completed: connection refused, timeout, bad URL.
    #[error("history request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("history service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}
