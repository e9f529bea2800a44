use crate::common;
use crate::config::Config;
use crate::metrics::MetricRecord;
use crate::Error;

use reqwest::Client;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{error, info};

pub mod buffer;
pub mod sampler;
pub mod sender;
pub mod shutdown;
pub mod stats;

use buffer::Buffer;
use sampler::Sampler;
use sender::Sender;
use shutdown::Shutdown;
use stats::Stats;

/// The reporting agent: samples the runtime on the poll interval, buffers the
/// records, and forwards them to the collector on the report interval.
pub struct Agent {
    config: Arc<Config>,
    sampler: Sampler,
    buffer: Buffer,
    sender: Sender,
    stats: Arc<Stats>,
}

impl Agent {
    pub fn new(config: Arc<Config>) -> Result<Self, Error> {
        let client = Client::builder().http1_only().build()?;
        let stats = Arc::new(Stats::default());

        Ok(Self {
            sampler: Sampler::new(),
            buffer: Buffer::new(config.buffer_capacity()),
            sender: Sender::new(client, config.address(), stats.clone()),
            stats,
            config,
        })
    }

    pub fn stats(&self) -> Arc<Stats> {
        self.stats.clone()
    }

    /// Runs the agent loop until `shutdown` fires.
    ///
    /// Sampled records are moved into the buffer one at a time as space
    /// allows. While any are still waiting for space no further samples are
    /// taken, which is how a full buffer slows the poll cadence without
    /// holding up report ticks or shutdown. Records still buffered when the
    /// loop exits are abandoned.
    pub async fn run(self, mut shutdown: Shutdown) {
        let Self {
            config,
            mut sampler,
            buffer,
            sender,
            stats,
        } = self;

        info!(
            url = sender.url(),
            poll_interval = %humantime::format_duration(config.poll_interval()),
            report_interval = %humantime::format_duration(config.report_interval()),
            buffer_capacity = buffer.capacity(),
            "agent starting"
        );

        let mut poll = common::interval(config.poll_interval());
        let mut report = common::interval(config.report_interval());

        // sampled but not yet admitted to the buffer
        let mut pending: VecDeque<MetricRecord> = VecDeque::new();

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("shutdown requested");
                    break;
                }
                _ = poll.tick(), if pending.is_empty() => {
                    let batch = sampler.sample();
                    stats.record_poll(batch.len());
                    pending.extend(batch);
                }
                slot = buffer.reserve(), if !pending.is_empty() => {
                    match slot {
                        Ok(slot) => {
                            if let Some(record) = pending.pop_front() {
                                slot.fill(record);
                            }
                        }
                        Err(e) => {
                            error!("{e}");
                            break;
                        }
                    }
                }
                _ = report.tick() => {
                    sender.flush(&buffer, &shutdown).await;
                }
            }
        }

        stats.record_abandoned(buffer.len() + pending.len());
        let snapshot = stats.snapshot();

        info!(
            polls = snapshot.polls,
            reports = snapshot.reports,
            sampled = snapshot.records_sampled,
            sent = snapshot.records_sent,
            errors = snapshot.send_errors,
            abandoned = snapshot.records_abandoned,
            "agent stopped"
        );
    }
}
