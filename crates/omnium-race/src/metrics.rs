//! Cumulative race metrics.
//!
//! A [`MetricsRecorder`] is shared across rider workers and bumped with
//! relaxed atomics on each event; [`RaceMetrics`] is the plain snapshot
//! embedded in the final race report.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counter snapshot for a finished (or in-flight) race.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RaceMetrics {
    /// Chronometer ticks elapsed.
    pub ticks: u64,
    /// Successful cell-to-cell moves.
    pub moves: u64,
    /// Moves refused because the destination cell was full.
    pub blocked_moves: u64,
    /// Finish-line crossings.
    pub lap_completions: u64,
    /// Rank swaps from overtakes.
    pub overtakes: u64,
    /// Riders removed by the worst-rank rule.
    pub eliminations: u64,
    /// Riders removed by breakdown.
    pub breakdowns: u64,
}

/// Thread-safe accumulator behind [`RaceMetrics`].
#[derive(Default)]
pub struct MetricsRecorder {
    moves: AtomicU64,
    blocked_moves: AtomicU64,
    lap_completions: AtomicU64,
    overtakes: AtomicU64,
    eliminations: AtomicU64,
    breakdowns: AtomicU64,
}

impl MetricsRecorder {
    /// Fresh, all-zero recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed move.
    pub fn record_move(&self) {
        self.moves.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a move refused by a full destination cell.
    pub fn record_blocked_move(&self) {
        self.blocked_moves.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finish-line crossing.
    pub fn record_lap_completion(&self) {
        self.lap_completions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record `count` overtake rank swaps.
    pub fn record_overtakes(&self, count: u32) {
        if count > 0 {
            self.overtakes.fetch_add(u64::from(count), Ordering::Relaxed);
        }
    }

    /// Record a worst-rank elimination.
    pub fn record_elimination(&self) {
        self.eliminations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a breakdown.
    pub fn record_breakdown(&self) {
        self.breakdowns.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters, stamping in the final tick count.
    pub fn snapshot(&self, ticks: u64) -> RaceMetrics {
        RaceMetrics {
            ticks,
            moves: self.moves.load(Ordering::Relaxed),
            blocked_moves: self.blocked_moves.load(Ordering::Relaxed),
            lap_completions: self.lap_completions.load(Ordering::Relaxed),
            overtakes: self.overtakes.load(Ordering::Relaxed),
            eliminations: self.eliminations.load(Ordering::Relaxed),
            breakdowns: self.breakdowns.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = RaceMetrics::default();
        assert_eq!(m.ticks, 0);
        assert_eq!(m.moves, 0);
        assert_eq!(m.blocked_moves, 0);
        assert_eq!(m.lap_completions, 0);
        assert_eq!(m.overtakes, 0);
        assert_eq!(m.eliminations, 0);
        assert_eq!(m.breakdowns, 0);
    }

    #[test]
    fn snapshot_reflects_recorded_counts() {
        let recorder = MetricsRecorder::new();
        recorder.record_move();
        recorder.record_move();
        recorder.record_blocked_move();
        recorder.record_lap_completion();
        recorder.record_overtakes(3);
        recorder.record_overtakes(0);
        recorder.record_elimination();
        recorder.record_breakdown();

        let m = recorder.snapshot(42);
        assert_eq!(m.ticks, 42);
        assert_eq!(m.moves, 2);
        assert_eq!(m.blocked_moves, 1);
        assert_eq!(m.lap_completions, 1);
        assert_eq!(m.overtakes, 3);
        assert_eq!(m.eliminations, 1);
        assert_eq!(m.breakdowns, 1);
    }

    #[test]
    fn recorder_is_safe_across_threads() {
        use std::sync::Arc;
        use std::thread;

        let recorder = Arc::new(MetricsRecorder::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let recorder = Arc::clone(&recorder);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        recorder.record_move();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(recorder.snapshot(0).moves, 8000);
    }
}
