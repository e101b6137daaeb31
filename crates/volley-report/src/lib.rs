//! Result reporting for Volley.
//!
//! Every finished match is described by a [`MatchSummary`] and handed to
//! a [`ResultSink`]. Delivery is best effort: the engine logs failures and
//! never waits on them.

mod error;
mod history;
mod http;

pub use error::ReportError;
pub use history::HistorySink;
pub use http::HttpResultSink;

use volley_protocol::MatchSummary;

/// Where finished matches go.
///
/// Implementations must be cheap to share; the engine calls `report` from
/// a detached task per match.
///
/// ```rust
/// use volley_protocol::MatchSummary;
/// use volley_report::{ReportError, ResultSink};
///
/// /// Prints results instead of storing them.
/// struct StdoutSink;
///
/// impl ResultSink for StdoutSink {
///     async fn report(&self, summary: &MatchSummary) -> Result<(), ReportError> {
///         println!("{} won {}", summary.winner_identity(), summary.score);
///         Ok(())
///     }
/// }
/// ```
pub trait ResultSink: Send + Sync + 'static {
    fn report(
        &self,
        summary: &MatchSummary,
    ) -> impl std::future::Future<Output = Result<(), ReportError>> + Send;
}

/// Discards every summary after logging it at debug level. Used when no
/// history service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResultSink;

impl ResultSink for NoopResultSink {
    async fn report(&self, summary: &MatchSummary) -> Result<(), ReportError> {
        tracing::debug!(
            session_id = %summary.session_id,
            reason = %summary.reason,
            score = %summary.score,
            "no history service configured, result dropped"
        );
        Ok(())
    }
}
