
use std::sync::atomic::{AtomicU64, Ordering};

/// A rectangle of reference samples read by a first filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRegion {
    /// Index of the top-left sample in the reference plane.
    pub start: usize,
    pub stride: usize,
    pub width: usize,
    pub height: usize,
}

impl ReadRegion {
    #[must_use]
    pub const fn samples(&self) -> u64 {
        (self.width * self.height) as u64
    }
}

/// Passive instrumentation of reference memory traffic.
///
/// Observers never influence the prediction. They are shared across threads,
/// so any state they keep must use interior synchronization.
pub trait BandwidthObserver: Send + Sync {
    fn on_read(&self, region: ReadRegion);
}

/// Counts reads and the number of samples they cover.
#[derive(Debug, Default)]
pub struct ReadCounter {
    reads: AtomicU64,
    samples: AtomicU64,
}

impl ReadCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reported reads.
    #[must_use]
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Total number of samples covered by the reported reads.
    #[must_use]
    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.reads.store(0, Ordering::Relaxed);
        self.samples.store(0, Ordering::Relaxed);
    }
}

impl BandwidthObserver for ReadCounter {
    fn on_read(&self, region: ReadRegion) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.samples.fetch_add(region.samples(), Ordering::Relaxed);
    }
}
