use crate::metrics::MetricRecord;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, OwnedPermit, Receiver, Sender};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("metric buffer is closed")]
pub struct BufferClosed;

/// Bounded FIFO between the sampler and the sender.
///
/// `offer` waits while the buffer is full; draining never waits. Both ends
/// are internally synchronized so producer and consumer may live on
/// different tasks.
pub struct Buffer {
    tx: Sender<MetricRecord>,
    rx: Mutex<Receiver<MetricRecord>>,
    capacity: usize,
}

/// A reserved place in the buffer. Filling it never waits.
pub struct Slot(OwnedPermit<MetricRecord>);

impl Slot {
    pub fn fill(self, record: MetricRecord) {
        self.0.send(record);
    }
}

impl Buffer {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);

        Self {
            tx,
            rx: Mutex::new(rx),
            capacity,
        }
    }

    /// Appends a record, waiting for space if the buffer is full.
    pub async fn offer(&self, record: MetricRecord) -> Result<(), BufferClosed> {
        self.tx.send(record).await.map_err(|_| BufferClosed)
    }

    /// Waits until one record can be appended and holds that place.
    ///
    /// Dropping the future before it completes gives nothing up, which makes
    /// it safe to race against other events.
    pub async fn reserve(&self) -> Result<Slot, BufferClosed> {
        self.tx
            .clone()
            .reserve_owned()
            .await
            .map(Slot)
            .map_err(|_| BufferClosed)
    }

    /// Removes the oldest record without waiting.
    pub fn pop(&self) -> Option<MetricRecord> {
        self.rx.lock().try_recv().ok()
    }

    /// Removes and returns everything currently buffered without waiting for
    /// new arrivals.
    pub fn drain(&self) -> Vec<MetricRecord> {
        let mut rx = self.rx.lock();
        let mut records = Vec::with_capacity(rx.len());

        while let Ok(record) = rx.try_recv() {
            records.push(record);
        }

        records
    }

    pub fn len(&self) -> usize {
        self.capacity - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
