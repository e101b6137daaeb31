use volley_protocol::MatchSummary;

use crate::{HttpResultSink, NoopResultSink, ReportError, ResultSink};

/// The sink picked from configuration: HTTP when a history URL is set,
/// logging only otherwise.
#[derive(Debug, Clone)]
pub enum HistorySink {
    Http(HttpResultSink),
    Noop(NoopResultSink),
}

impl HistorySink {
    pub fn from_url(url: Option<&str>) -> Result<Self, ReportError> {
        match url {
            Some(url) if !url.trim().is_empty() => Ok(Self::Http(HttpResultSink::new(url)?)),
            _ => Ok(Self::Noop(NoopResultSink)),
        }
    }
}

impl ResultSink for HistorySink {
    async fn report(&self, summary: &MatchSummary) -> Result<(), ReportError> {
        match self {
            Self::Http(sink) => sink.report(summary).await,
            Self::Noop(sink) => sink.report(summary).await,
        }
    }
}
