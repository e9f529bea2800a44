use std::sync::atomic::{AtomicU64, Ordering};

/// Self-monitoring counters for the agent loop.
#[derive(Debug, Default)]
pub struct Stats {
    polls: AtomicU64,
    reports: AtomicU64,
    records_sampled: AtomicU64,
    records_sent: AtomicU64,
    send_errors: AtomicU64,
    records_abandoned: AtomicU64,
}

impl Stats {
    pub fn record_poll(&self, records: usize) {
        self.polls.fetch_add(1, Ordering::Relaxed);
        self.records_sampled
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    pub fn record_report(&self) {
        self.reports.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sent(&self) {
        self.records_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_error(&self) {
        self.send_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Records left behind in the buffer or still waiting for space when the
    /// agent stopped.
    pub fn record_abandoned(&self, records: usize) {
        self.records_abandoned
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            polls: self.polls.load(Ordering::Relaxed),
            reports: self.reports.load(Ordering::Relaxed),
            records_sampled: self.records_sampled.load(Ordering::Relaxed),
            records_sent: self.records_sent.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
            records_abandoned: self.records_abandoned.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub polls: u64,
    pub reports: u64,
    pub records_sampled: u64,
    pub records_sent: u64,
    pub send_errors: u64,
    pub records_abandoned: u64,
}

impl StatsSnapshot {
    /// Every sampled record is eventually sent, dropped after a failed send,
    /// or abandoned at shutdown.
    pub fn is_balanced(&self) -> bool {
        self.records_sampled == self.records_sent + self.send_errors + self.records_abandoned
    }
}
