//! Inter-arrival timing statistics.
//!
//! An explicit accumulator for the gaps between consecutive notification
//! deliveries, owned by the driver's caller and fed from the sink. Used by
//! the timing-only profile to characterize transmission latency.

use std::time::{Duration, Instant};

/// Accumulates inter-arrival intervals between recorded events.
///
/// The first call to [`record`](Self::record) only arms the clock; every
/// subsequent call appends the gap since the previous one.
#[derive(Debug, Default)]
pub struct IntervalStats {
    last: Option<Instant>,
    deltas: Vec<Duration>,
}

impl IntervalStats {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event at the current instant.
    pub fn record(&mut self) {
        self.record_at(Instant::now());
    }

    /// Record an event at an explicit instant.
    pub fn record_at(&mut self, now: Instant) {
        if let Some(last) = self.last.replace(now) {
            self.deltas.push(now.saturating_duration_since(last));
        }
    }

    /// Number of recorded intervals (one less than the number of events).
    pub fn count(&self) -> usize {
        self.deltas.len()
    }

    /// Check if no interval has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// The recorded intervals, in arrival order.
    pub fn intervals(&self) -> &[Duration] {
        &self.deltas
    }

    /// Arithmetic mean of the recorded intervals.
    pub fn mean(&self) -> Option<Duration> {
        if self.deltas.is_empty() {
            return None;
        }
        let total: Duration = self.deltas.iter().sum();
        Some(total / self.deltas.len() as u32)
    }

    /// Median of the recorded intervals (average of the two middle values
    /// for an even count).
    pub fn median(&self) -> Option<Duration> {
        if self.deltas.is_empty() {
            return None;
        }
        let mut sorted = self.deltas.clone();
        sorted.sort();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            Some(sorted[mid])
        } else {
            Some((sorted[mid - 1] + sorted[mid]) / 2)
        }
    }

    /// The largest recorded interval.
    pub fn max(&self) -> Option<Duration> {
        self.deltas.iter().max().copied()
    }

    /// Fraction of intervals strictly greater than `threshold`, in `0..=1`.
    /// Returns 0 when nothing has been recorded.
    pub fn fraction_above(&self, threshold: Duration) -> f64 {
        if self.deltas.is_empty() {
            return 0.0;
        }
        let above = self.deltas.iter().filter(|d| **d > threshold).count();
        above as f64 / self.deltas.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn stats_from_millis(gaps: &[u64]) -> IntervalStats {
        let mut stats = IntervalStats::new();
        let start = Instant::now();
        let mut elapsed = Duration::ZERO;
        stats.record_at(start);
        for gap in gaps {
            elapsed += Duration::from_millis(*gap);
            stats.record_at(start + elapsed);
        }
        stats
    }

    #[test]
    fn test_first_record_arms_only() {
        let mut stats = IntervalStats::new();
        stats.record_at(Instant::now());
        assert!(stats.is_empty());
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.mean(), None);
        assert_eq!(stats.median(), None);
    }

    #[test]
    fn test_mean_and_max() {
        let stats = stats_from_millis(&[10, 20, 30]);
        assert_eq!(stats.count(), 3);
        assert_eq!(stats.mean(), Some(Duration::from_millis(20)));
        assert_eq!(stats.max(), Some(Duration::from_millis(30)));
    }

    #[test]
    fn test_median_odd_and_even() {
        let odd = stats_from_millis(&[30, 10, 20]);
        assert_eq!(odd.median(), Some(Duration::from_millis(20)));

        let even = stats_from_millis(&[10, 40, 20, 30]);
        assert_eq!(even.median(), Some(Duration::from_millis(25)));
    }

    #[test]
    fn test_fraction_above() {
        let stats = stats_from_millis(&[10, 40, 50, 20]);
        assert_eq!(stats.fraction_above(Duration::from_millis(32)), 0.5);
        assert_eq!(stats.fraction_above(Duration::from_millis(100)), 0.0);

        let empty = IntervalStats::new();
        assert_eq!(empty.fraction_above(Duration::from_millis(1)), 0.0);
    }

    #[test]
    fn test_intervals_in_arrival_order() {
        let stats = stats_from_millis(&[5, 15, 10]);
        assert_eq!(
            stats.intervals(),
            &[
                Duration::from_millis(5),
                Duration::from_millis(15),
                Duration::from_millis(10)
            ]
        );
    }
}
