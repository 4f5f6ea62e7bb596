//! Dispatch counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Thread-safe counters shared by the dispatch loop and its workers.
#[derive(Debug, Default)]
pub struct DispatchStats {
    written: AtomicU64,
    failed: AtomicU64,
}

impl DispatchStats {
    /// Count one record accepted by the sink.
    pub fn record_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one record the sink rejected. It is not retried.
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values.
    pub fn snapshot(&self) -> DispatchStatsSnapshot {
        DispatchStatsSnapshot {
            written: self.written.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStatsSnapshot {
    /// Records accepted by the sink.
    pub written: u64,
    /// Records the sink rejected.
    pub failed: u64,
}

impl DispatchStatsSnapshot {
    /// Change events handled, successful or not.
    pub fn total(&self) -> u64 {
        self.written + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn counts_from_several_threads() {
        let stats = Arc::new(DispatchStats::default());

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        if i % 10 == 0 {
                            stats.record_failed();
                        } else {
                            stats.record_written();
                        }
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot, DispatchStatsSnapshot { written: 360, failed: 40 });
        assert_eq!(snapshot.total(), 400);
    }
}
