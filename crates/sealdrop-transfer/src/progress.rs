//! Progress accounting, owned by the orchestrators
//!
//! Transport workers report fractional deltas through callbacks; only the
//! orchestrator-owned accumulators here touch the aggregate. Both are
//! hardened against regression so every emitted sequence is monotonically
//! non-decreasing and ends at exactly 1.0 on success.

use std::sync::Mutex;

/// Overall-progress callback, called with a fraction in `[0, 1]`.
pub type ProgressFn = Box<dyn Fn(f64) + Send + Sync>;

/// Upload aggregate: one slot per chunk index, overall = sum / count.
///
/// A slot never decreases, so the aggregate is monotonic even if a worker's
/// transport restarts its per-chunk progress (e.g. on proxy fallback).
pub struct ProgressTable {
    slots: Mutex<Vec<f64>>,
    sink: Option<ProgressFn>,
}

impl ProgressTable {
    pub fn new(count: usize, sink: Option<ProgressFn>) -> Self {
        Self {
            slots: Mutex::new(vec![0.0; count]),
            sink,
        }
    }

    /// Emit the starting 0.0 before any chunk moves.
    pub fn emit_start(&self) {
        if let Some(sink) = &self.sink {
            sink(0.0);
        }
    }

    /// Record chunk `index` at `fraction` complete and re-emit the aggregate.
    /// Regressions are ignored.
    pub fn report(&self, index: usize, fraction: f64) {
        let aggregate = {
            let mut slots = self.slots.lock().expect("progress lock poisoned");
            let clamped = fraction.clamp(0.0, 1.0);
            if clamped <= slots[index] {
                return;
            }
            slots[index] = clamped;
            slots.iter().sum::<f64>() / slots.len() as f64
        };
        if let Some(sink) = &self.sink {
            sink(aggregate);
        }
    }
}

/// Download gauge: bytes loaded against the plaintext total.
///
/// Loaded bytes are ciphertext (each chunk carries a fixed overhead), so the
/// ratio is clamped; `finish` pins the final value to exactly 1.0.
pub struct ProgressGauge {
    total: u64,
    loaded: u64,
    sink: Option<ProgressFn>,
}

impl ProgressGauge {
    pub fn new(total: u64, sink: Option<ProgressFn>) -> Self {
        Self {
            total,
            loaded: 0,
            sink,
        }
    }

    pub fn add(&mut self, bytes: usize) {
        self.loaded += bytes as u64;
        if let Some(sink) = &self.sink {
            sink((self.loaded as f64 / self.total as f64).min(1.0));
        }
    }

    pub fn finish(&self) {
        if let Some(sink) = &self.sink {
            sink(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_sink() -> (ProgressFn, Arc<Mutex<Vec<f64>>>) {
        let samples = Arc::new(Mutex::new(Vec::new()));
        let captured = samples.clone();
        let sink: ProgressFn = Box::new(move |p| captured.lock().unwrap().push(p));
        (sink, samples)
    }

    fn assert_monotonic(samples: &[f64]) {
        for pair in samples.windows(2) {
            assert!(
                pair[1] >= pair[0],
                "progress regressed: {} -> {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_aggregate_is_mean_of_slots() {
        let (sink, samples) = recording_sink();
        let table = ProgressTable::new(4, Some(sink));

        table.report(0, 1.0);
        table.report(1, 0.5);

        let samples = samples.lock().unwrap();
        assert_eq!(*samples, vec![0.25, 0.375]);
    }

    #[test]
    fn test_regression_is_ignored() {
        let (sink, samples) = recording_sink();
        let table = ProgressTable::new(2, Some(sink));

        table.report(0, 0.8);
        table.report(0, 0.3); // transport restarted; must not lower the aggregate
        table.report(0, 1.0);
        table.report(1, 1.0);

        let samples = samples.lock().unwrap();
        assert_monotonic(&samples);
        assert_eq!(*samples.last().unwrap(), 1.0);
    }

    #[test]
    fn test_interleaved_workers_stay_monotonic() {
        let (sink, samples) = recording_sink();
        let table = ProgressTable::new(3, Some(sink));

        // Completion order differs from index order
        for (index, fraction) in [
            (2, 0.5),
            (0, 0.25),
            (2, 1.0),
            (1, 0.75),
            (0, 1.0),
            (1, 1.0),
        ] {
            table.report(index, fraction);
        }

        let samples = samples.lock().unwrap();
        assert_monotonic(&samples);
        assert_eq!(*samples.last().unwrap(), 1.0);
    }

    #[test]
    fn test_gauge_clamps_and_finishes_at_one() {
        let (sink, samples) = recording_sink();
        let mut gauge = ProgressGauge::new(100, Some(sink));

        gauge.add(60);
        gauge.add(60); // ciphertext overhead pushes past the plaintext total
        gauge.finish();

        let samples = samples.lock().unwrap();
        assert_eq!(*samples, vec![0.6, 1.0, 1.0]);
        assert_monotonic(&samples);
    }
}
