//! Agreement-based stopping rule of the basin-hopping search.
//!
//! The tracker keeps the objective values of accepted trials which landed
//! within `agreement_tol` of the best value seen so far. Whenever a trial
//! finds a value better than the best one by more than the tolerance, the
//! record is reset to that single value. The search is deemed converged once
//! `agreement_target` mutually agreeing values have been recorded.
use serde::{Deserialize, Serialize};

/// Classification of an accepted trial value against the current best value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Agreement {
    /// Worse than the current best value by at least the tolerance
    Rejected,
    /// Within the tolerance band below the threshold of rejection
    Agreeing,
    /// Strictly better than the current best value minus the tolerance
    NewBest,
}

/// Rolling record of agreeing best values
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceTracker {
    /// Number of agreeing values required to stop
    target: usize,
    /// Absolute tolerance under which two values denote the same minimum
    tol: f64,
    /// Filled slots, at most `target` values
    record: Vec<f64>,
}

impl ConvergenceTracker {
    /// Constructor given the agreement target and the agreement tolerance.
    ///
    /// The target is expected to be positive, this is checked by
    /// [`crate::HopConfig::check()`].
    pub fn new(target: usize, tol: f64) -> Self {
        ConvergenceTracker {
            target,
            tol,
            record: Vec::with_capacity(target),
        }
    }

    /// Number of agreeing values required to stop
    pub fn target(&self) -> usize {
        self.target
    }

    /// Agreement tolerance
    pub fn tolerance(&self) -> f64 {
        self.tol
    }

    /// Number of currently recorded agreeing values
    pub fn count(&self) -> usize {
        self.record.len()
    }

    /// Recorded agreeing values in order of arrival
    pub fn record(&self) -> &[f64] {
        &self.record
    }

    /// Minimum of the recorded values if any
    pub fn current_best(&self) -> Option<f64> {
        self.record.iter().copied().reduce(f64::min)
    }

    /// Whether enough agreeing values have been recorded
    pub fn is_converged(&self) -> bool {
        self.count() >= self.target
    }

    /// Classify `value` against the current best value.
    ///
    /// Comparisons are made in the order rejected, agreeing, new best, so that
    /// `best + tol` is rejected while `best - tol` is agreeing.
    /// A NaN value is always rejected.
    pub fn classify(&self, value: f64) -> Agreement {
        if value.is_nan() {
            return Agreement::Rejected;
        }
        match self.current_best() {
            None => Agreement::NewBest,
            Some(best) if value >= best + self.tol => Agreement::Rejected,
            Some(best) if value >= best - self.tol => Agreement::Agreeing,
            Some(_) => Agreement::NewBest,
        }
    }

    /// Process the outcome of a trial and returns whether the search should stop.
    ///
    /// Trials not accepted by the driver leave the tracker untouched.
    pub fn record_trial(&mut self, value: f64, accepted: bool) -> bool {
        if !accepted {
            return false;
        }
        match self.classify(value) {
            Agreement::Rejected => (),
            Agreement::Agreeing => {
                // saturate at target
                if self.record.len() < self.target {
                    self.record.push(value);
                }
            }
            Agreement::NewBest => {
                self.record.clear();
                self.record.push(value);
            }
        }
        self.is_converged()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_first_accepted_trial_fills_first_slot() {
        let mut tracker = ConvergenceTracker::new(5, 1e-5);
        assert_eq!(tracker.count(), 0);
        assert_eq!(tracker.current_best(), None);

        assert!(!tracker.record_trial(3.0, true));
        assert_eq!(tracker.count(), 1);
        assert_eq!(tracker.record(), &[3.0]);
    }

    #[test]
    fn test_rejected_trial_leaves_state_unchanged() {
        let mut tracker = ConvergenceTracker::new(3, 0.01);
        tracker.record_trial(2.0, true);
        tracker.record_trial(2.001, true);
        let before = tracker.clone();

        for value in [-100., 2.0, 50., f64::NAN] {
            assert!(!tracker.record_trial(value, false));
            assert_eq!(tracker, before);
        }
    }

    #[test]
    fn test_rejected_trial_does_not_stop_converged_tracker() {
        let mut tracker = ConvergenceTracker::new(1, 0.01);
        assert!(tracker.record_trial(1.0, true));
        assert!(!tracker.record_trial(1.0, false));
        assert!(tracker.is_converged());
    }

    #[test]
    fn test_identical_values_stop_exactly_at_target() {
        let target = 4;
        let mut tracker = ConvergenceTracker::new(target, 1e-5);
        for i in 1..target {
            assert!(!tracker.record_trial(-1.5, true), "stopped at call {i}");
            assert_eq!(tracker.count(), i);
        }
        assert!(tracker.record_trial(-1.5, true));
        assert_eq!(tracker.count(), target);
    }

    #[test]
    fn test_strictly_decreasing_values_never_accumulate() {
        let mut tracker = ConvergenceTracker::new(2, 0.5);
        for value in [10.0, 9.0, 8.0, 7.0, 6.0, 5.0, -3.0] {
            assert!(!tracker.record_trial(value, true));
            assert_eq!(tracker.count(), 1);
            assert_eq!(tracker.current_best(), Some(value));
        }
    }

    #[test]
    fn test_tolerance_boundaries() {
        let mut tracker = ConvergenceTracker::new(5, 0.001);
        tracker.record_trial(5.0, true);

        assert_eq!(tracker.classify(5.001), Agreement::Rejected);
        tracker.record_trial(5.001, true);
        assert_eq!(tracker.count(), 1);

        assert_eq!(tracker.classify(4.999), Agreement::Agreeing);
        tracker.record_trial(4.999, true);
        assert_eq!(tracker.count(), 2);
    }

    #[test]
    fn test_classification() {
        let mut tracker = ConvergenceTracker::new(5, 0.1);
        assert_eq!(tracker.classify(1e10), Agreement::NewBest);
        tracker.record_trial(1.0, true);
        assert_eq!(tracker.classify(1.2), Agreement::Rejected);
        assert_eq!(tracker.classify(1.05), Agreement::Agreeing);
        assert_eq!(tracker.classify(0.95), Agreement::Agreeing);
        assert_eq!(tracker.classify(0.8), Agreement::NewBest);
        assert_eq!(tracker.classify(f64::NAN), Agreement::Rejected);
        assert_eq!(tracker.classify(f64::NEG_INFINITY), Agreement::NewBest);
    }

    #[test]
    fn test_nan_is_ignored() {
        let mut tracker = ConvergenceTracker::new(2, 0.1);
        assert!(!tracker.record_trial(f64::NAN, true));
        assert_eq!(tracker.count(), 0);
        tracker.record_trial(1.0, true);
        assert!(!tracker.record_trial(f64::NAN, true));
        assert_eq!(tracker.record(), &[1.0]);
    }

    #[test]
    fn test_agreement_trajectory() {
        let mut tracker = ConvergenceTracker::new(3, 0.01);
        let values = [2.0, 2.005, 1.0, 1.002, 1.001];
        let expected_counts = [1, 2, 1, 2, 3];
        let expected_stops = [false, false, false, false, true];

        for ((value, count), stop) in values.iter().zip(expected_counts).zip(expected_stops) {
            assert_eq!(tracker.record_trial(*value, true), stop);
            assert_eq!(tracker.count(), count);
        }
        assert_eq!(tracker.record(), &[1.0, 1.002, 1.001]);
        assert_abs_diff_eq!(tracker.current_best().unwrap(), 1.0);
    }

    #[test]
    fn test_best_follows_lower_agreeing_value() {
        let mut tracker = ConvergenceTracker::new(10, 0.01);
        tracker.record_trial(1.0, true);
        tracker.record_trial(0.995, true);
        assert_abs_diff_eq!(tracker.current_best().unwrap(), 0.995);
        // 1.006 agreed with 1.0 but is now rejected against 0.995
        assert_eq!(tracker.classify(1.006), Agreement::Rejected);
    }

    #[test]
    fn test_count_never_exceeds_target() {
        let target = 3;
        let mut tracker = ConvergenceTracker::new(target, 0.5);
        let values = [
            4.0, 4.1, 3.9, 4.2, 4.0, 4.3, 3.8, 4.0, 4.1, 2.0, 2.1, 2.2, 2.3, 1.9,
        ];
        for value in values {
            tracker.record_trial(value, true);
            assert!(tracker.count() <= target);
            assert!(tracker.count() >= 1);
        }
        assert!(tracker.is_converged());
        assert_eq!(tracker.count(), target);
    }
}
