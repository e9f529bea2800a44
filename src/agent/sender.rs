use super::buffer::Buffer;
use super::shutdown::Shutdown;
use super::stats::Stats;
use crate::metrics::MetricRecord;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("collector responded with {0}")]
    Status(StatusCode),
}

/// Builds the collector endpoint for `address`. A bare `host[:port]` gets an
/// `http://` scheme; `/update/` is appended as is, so a trailing slash on the
/// address is kept.
pub fn update_url(address: &str) -> String {
    if address.starts_with("http://") || address.starts_with("https://") {
        format!("{address}/update/")
    } else {
        format!("http://{address}/update/")
    }
}

/// Posts buffered records to the collector, one request per record.
pub struct Sender {
    client: Client,
    url: String,
    stats: Arc<Stats>,
}

impl Sender {
    pub fn new(client: Client, address: &str, stats: Arc<Stats>) -> Self {
        Self {
            client,
            url: update_url(address),
            stats,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn send(&self, record: &MetricRecord) -> Result<(), SendError> {
        let body = serde_json::to_vec(record)?;

        let response = self
            .client
            .post(self.url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            return Err(SendError::Status(status));
        }

        Ok(())
    }

    /// Sends records until the buffer is empty. A record that fails to send
    /// is logged and dropped. Once shutdown has been requested no further
    /// request is started, but one already in flight is allowed to finish.
    pub async fn flush(&self, buffer: &Buffer, shutdown: &Shutdown) {
        self.stats.record_report();

        while !shutdown.is_requested() {
            let Some(record) = buffer.pop() else {
                return;
            };

            match self.send(&record).await {
                Ok(()) => {
                    self.stats.record_sent();
                    debug!(id = record.id(), mtype = %record.kind(), "sent metric");
                }
                Err(e) => {
                    self.stats.record_send_error();
                    error!(id = record.id(), url = %self.url, "failed to send metric: {e}");
                }
            }
        }

        debug!("shutdown requested, abandoning {} buffered records", buffer.len());
    }
}
