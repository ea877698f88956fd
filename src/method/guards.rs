
//! Numerical safeguards shared by the methods.

use std::collections::VecDeque;

/// Function values (and, for Fixed Point, steps) below this magnitude
/// are treated as exactly zero.
pub const EXACT_TOLERANCE: f64 = 1e-10;

/// Estimates beyond this magnitude are treated as diverging.
pub const DIVERGENCE_BOUND: f64 = 1e15;

/// How close an estimate must come to an earlier one to count as a
/// revisit.
pub const OSCILLATION_TOLERANCE: f64 = 1e-6;

/// Number of distinct recent estimates remembered.
pub const OSCILLATION_WINDOW: usize = 5;

/// A step shorter than this fraction of the one before it counts as
/// contracting.
pub const CONTRACTION_RATIO: f64 = 1.0 - 1e-3;

/// Detects an iteration cycling between values instead of settling.
#[derive(Debug, Clone)]
pub struct OscillationDetector {
  recent: VecDeque<f64>,
  last_step: Option<f64>,
}

impl OscillationDetector {
  pub fn new(initial: f64) -> Self {
    Self::seeded(&[initial])
  }

  /// A detector that already remembers `seeds`, oldest first.
  pub fn seeded(seeds: &[f64]) -> Self {
    let mut detector = Self {
      recent: VecDeque::with_capacity(OSCILLATION_WINDOW + 1),
      last_step: None,
    };
    for &seed in seeds {
      detector.observe(seed);
    }
    detector
  }

  /// Records `estimate`. Returns true if it jumped away from the
  /// immediately preceding estimate back to within
  /// [`OSCILLATION_TOLERANCE`] of an earlier one, without the step
  /// having shrunk against the step before it. A contracting
  /// alternation is converging, not cycling.
  pub fn observe(&mut self, estimate: f64) -> bool {
    let Some(&previous) = self.recent.back() else {
      self.recent.push_back(estimate);
      return false;
    };
    let step = (estimate - previous).abs();
    if step <= OSCILLATION_TOLERANCE {
      return false;
    }
    let contracting = self.last_step.is_some_and(|last| step < CONTRACTION_RATIO * last);
    let earlier = self.recent.len() - 1;
    let revisits = !contracting && self.recent.iter()
      .take(earlier)
      .any(|x| (estimate - x).abs() <= OSCILLATION_TOLERANCE);
    self.last_step = Some(step);
    self.recent.push_back(estimate);
    if self.recent.len() > OSCILLATION_WINDOW {
      self.recent.pop_front();
    }
    revisits
  }
}

pub fn is_diverging(estimate: f64) -> bool {
  estimate.abs() > DIVERGENCE_BOUND
}

pub fn is_exact_zero(value: f64) -> bool {
  value.abs() < EXACT_TOLERANCE
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_two_cycle() {
    let mut detector = OscillationDetector::new(0.0);
    assert!(!detector.observe(1.0));
    assert!(detector.observe(0.0));
  }

  #[test]
  fn test_converging_sequence_is_not_oscillating() {
    let mut detector = OscillationDetector::new(3.0);
    for x in [2.1666, 2.0064, 2.00001, 2.0000000001, 2.0] {
      assert!(!detector.observe(x), "{x}");
    }
  }

  #[test]
  fn test_window_forgets_old_values() {
    let mut detector = OscillationDetector::new(0.0);
    for x in [1.0, 2.0, 3.0, 4.0, 5.0] {
      assert!(!detector.observe(x));
    }
    // 0.0 has left the window.
    assert!(!detector.observe(0.0));
    assert!(detector.observe(5.0));
  }

  #[test]
  fn test_shrinking_alternation_is_not_oscillating() {
    let mut detector = OscillationDetector::new(0.739082298);
    for x in [0.739087043, 0.739083847, 0.739086000, 0.739084550, 0.739085527] {
      assert!(!detector.observe(x), "{x}");
    }
    let mut detector = OscillationDetector::new(0.739086);
    let seen: Vec<bool> = [0.739084, 0.7390852, 0.7390848]
      .into_iter()
      .map(|x| detector.observe(x))
      .collect();
    assert_eq!(seen, vec![false, false, false]);
  }

  #[test]
  fn test_cycle_after_contraction() {
    let mut detector = OscillationDetector::new(0.0);
    assert!(!detector.observe(4.0));
    assert!(!detector.observe(1.0));
    assert!(!detector.observe(2.0));
    assert!(detector.observe(1.0));
  }

  #[test]
  fn test_seeded_detector_remembers_every_seed() {
    let mut detector = OscillationDetector::seeded(&[3.0, 4.0]);
    assert!(detector.observe(3.0));
  }

  #[test]
  fn test_guards() {
    assert!(is_diverging(2e15));
    assert!(!is_diverging(-1e14));
    assert!(is_exact_zero(-1e-11));
    assert!(!is_exact_zero(1e-9));
  }
}
