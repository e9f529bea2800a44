use crate::metrics::MetricRecord;

use rand::Rng;
use tracing::debug;

pub mod alloc;
mod runtime;

pub use runtime::{MemStats, RuntimeReader};

pub const RANDOM_VALUE: &str = "RandomValue";
pub const POLL_COUNT: &str = "PollCount";

/// Produces one batch of records per poll cycle: the runtime memory gauges,
/// `RandomValue`, and a `PollCount` counter with a delta of one.
pub struct Sampler {
    reader: RuntimeReader,
    // poll cycles completed so far
    poll_count: u64,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler {
    pub fn new() -> Self {
        Self {
            reader: RuntimeReader::new(),
            poll_count: 0,
        }
    }

    pub fn sample(&mut self) -> Vec<MetricRecord> {
        let stats = self.reader.read();
        let random: f64 = rand::thread_rng().gen_range(0.0..1.0);

        self.poll_count += 1;

        let mut batch: Vec<MetricRecord> = stats
            .gauges()
            .into_iter()
            .map(|(id, value)| MetricRecord::gauge(id, value))
            .collect();

        batch.push(MetricRecord::gauge(RANDOM_VALUE, random));
        batch.push(MetricRecord::counter(POLL_COUNT, 1));

        debug!(poll_count = self.poll_count, records = batch.len(), "sampled runtime");

        batch
    }
}
