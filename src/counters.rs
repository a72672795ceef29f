use std::sync::atomic::{AtomicU64, Ordering};

/// Run-wide counters shared by every worker.
///
/// Only increments are exposed; there is no reset or decrement.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    /// Derivation attempts. A worker counts an address as soon as it is derived, before its
    /// balance lookup resolves, so this can run ahead of the completed lookups.
    checked: AtomicU64,
    errors: AtomicU64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub checked: u64,
    pub errors: u64,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment_checked(&self) {
        self.checked.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// The two values are read independently of each other.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            checked: self.checked.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::counters::{CounterSnapshot, ProgressCounters};
    use std::thread::scope;

    #[test]
    fn no_lost_updates() {
        const THREADS: u64 = 16;
        const INCREMENTS: u64 = 10_000;

        for _ in 0..5 {
            let counters = ProgressCounters::new();
            scope(|s| {
                for i in 0..THREADS {
                    let counters = &counters;
                    s.spawn(move || {
                        for _ in 0..INCREMENTS {
                            counters.increment_checked();
                            if i % 2 == 0 {
                                counters.increment_errors();
                            }
                        }
                    });
                }
            });
            assert_eq!(
                counters.snapshot(),
                CounterSnapshot {
                    checked: THREADS * INCREMENTS,
                    errors: THREADS / 2 * INCREMENTS,
                }
            );
        }
    }

    #[test]
    fn monotonic_reads() {
        let counters = ProgressCounters::new();
        scope(|s| {
            s.spawn(|| {
                for _ in 0..50_000 {
                    counters.increment_checked();
                }
            });
            s.spawn(|| {
                let mut last = 0;
                for _ in 0..50_000 {
                    let now = counters.snapshot().checked;
                    assert!(now >= last);
                    last = now;
                }
            });
        });
        assert_eq!(counters.snapshot().checked, 50_000);
    }
}
