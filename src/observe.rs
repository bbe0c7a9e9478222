//! Optional hooks for counting what the pipeline drops or fails to deliver.
//! Nothing here changes behavior; the default observer does nothing.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::client::DeliveryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The measurement value could not be coerced to a float.
    NotANumber,
    /// NaN or infinity, which JSON cannot carry.
    NonFinite,
}

pub trait Observer: core::fmt::Debug + Send + Sync {
    fn dropped(&self, _reason: DropReason) {}
    fn batch_sent(&self, _count: usize) {}
    fn batch_failed(&self, _error: &DeliveryError) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;
impl Observer for NoopObserver {}

#[derive(Debug, Default)]
pub struct CountingObserver {
    not_a_number: AtomicU64,
    non_finite: AtomicU64,
    sent: AtomicU64,
    failed_batches: AtomicU64,
}
impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn not_a_number(&self) -> u64 {
        self.not_a_number.load(Ordering::Relaxed)
    }
    pub fn non_finite(&self) -> u64 {
        self.non_finite.load(Ordering::Relaxed)
    }
    /// Metrics accepted by the endpoint.
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
    pub fn failed_batches(&self) -> u64 {
        self.failed_batches.load(Ordering::Relaxed)
    }
}
impl Observer for CountingObserver {
    fn dropped(&self, reason: DropReason) {
        let counter = match reason {
            DropReason::NotANumber => &self.not_a_number,
            DropReason::NonFinite => &self.non_finite,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
    fn batch_sent(&self, count: usize) {
        self.sent.fetch_add(count as u64, Ordering::Relaxed);
    }
    fn batch_failed(&self, _error: &DeliveryError) {
        self.failed_batches.fetch_add(1, Ordering::Relaxed);
    }
}
