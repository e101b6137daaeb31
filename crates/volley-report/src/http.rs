use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use volley_protocol::MatchSummary;

use crate::{ReportError, ResultSink};

/// POSTs each summary as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpResultSink {
    client: Client,
    url: String,
}

impl HttpResultSink {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(url: impl Into<String>) -> Result<Self, ReportError> {
        Self::with_timeout(url, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, ReportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ResultSink for HttpResultSink {
    async fn report(&self, summary: &MatchSummary) -> Result<(), ReportError> {
        let response = self.client.post(&self.url).json(summary).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Status { status, body });
        }

        debug!(session_id = %summary.session_id, %status, "result delivered");
        Ok(())
    }
}
