
//! Bookkeeping shared by the open methods (Newton-Raphson and
//! Secant): everything that happens once a method has proposed its
//! next estimate.

use super::MethodKind;
use super::guards::{is_diverging, is_exact_zero, OscillationDetector};
use crate::convergence::{ConvergencePolicy, ErrorMetric, ErrorSample, PolicyStop};
use crate::expression::Expression;
use crate::status::{SolveResult, SolveStatus};
use crate::trace::{IterationRecord, SolveTrace};

use std::ops::ControlFlow;

/// How an open iteration ended.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Outcome {
  pub status: SolveStatus,
  pub estimate: Option<f64>,
  pub message: String,
}

#[derive(Debug)]
pub(super) struct OpenIteration<'a> {
  function: &'a Expression,
  policy: &'a ConvergencePolicy,
  metric: ErrorMetric,
  detector: OscillationDetector,
  trace: SolveTrace,
  iteration: usize,
}

impl Outcome {
  pub fn new(status: SolveStatus, estimate: Option<f64>, message: impl Into<String>) -> Self {
    Self { status, estimate, message: message.into() }
  }
}

impl<'a> OpenIteration<'a> {
  /// Starts from the method's seed estimates, oldest first.
  pub fn new(function: &'a Expression, policy: &'a ConvergencePolicy, seeds: &[f64]) -> Self {
    Self {
      function,
      policy,
      metric: policy.effective_metric(false),
      detector: OscillationDetector::seeded(seeds),
      trace: SolveTrace::new(),
      iteration: 0,
    }
  }

  /// A fresh row for the current iteration.
  pub fn record(&self) -> IterationRecord {
    IterationRecord::new(self.iteration, self.metric)
  }

  pub fn iteration(&self) -> usize {
    self.iteration
  }

  /// Checks the proposed estimate `next`, records `row` (which should
  /// already carry the method's own fields) and consults the policy.
  /// Continues with `f(next)` if iteration should go on.
  pub fn advance(&mut self, current: f64, next: f64, row: IterationRecord) -> ControlFlow<Outcome, f64> {
    if !next.is_finite() {
      self.trace.push(row);
      let message = format!("Iteration {} produced a non-finite estimate", self.iteration);
      return ControlFlow::Break(Outcome::new(SolveStatus::NumericalError, None, message));
    }
    if is_diverging(next) {
      self.trace.push(row);
      let message = format!("Estimate {next:e} exceeds the divergence bound at iteration {}", self.iteration);
      return ControlFlow::Break(Outcome::new(SolveStatus::Diverged, None, message));
    }
    let f_next = match self.function.try_eval(next) {
      Ok(f_next) => f_next,
      Err(fault) => {
        self.trace.push(row);
        let message = format!("f cannot be evaluated at {next}: {fault}");
        return ControlFlow::Break(Outcome::new(SolveStatus::NumericalError, Some(next), message));
      }
    };

    let error = (self.iteration > 0).then(|| {
      self.metric.measure(&ErrorSample { previous: current, current: next, residual: f_next, width: None })
    });
    self.trace.push(row.with_error(error));
    let completed = self.iteration;
    self.iteration += 1;

    if is_exact_zero(f_next) {
      let message = format!("Exact root found at iteration {completed}");
      return ControlFlow::Break(Outcome::new(SolveStatus::Converged, Some(next), message));
    }
    match self.policy.termination(self.iteration, error) {
      Some(PolicyStop::Converged) => {
        let message = format!("Converged after {} iterations", self.iteration);
        return ControlFlow::Break(Outcome::new(SolveStatus::Converged, Some(next), message));
      }
      Some(PolicyStop::IterationCap) => {
        let message = format!("Reached the maximum of {} iterations", self.policy.max_iterations);
        return ControlFlow::Break(Outcome::new(SolveStatus::MaxIterationsReached, Some(next), message));
      }
      None => {}
    }
    if self.detector.observe(next) {
      let message = format!("Estimates are oscillating; {next} was already visited");
      return ControlFlow::Break(Outcome::new(SolveStatus::Oscillating, Some(next), message));
    }
    ControlFlow::Continue(f_next)
  }

  /// Records a row that ends the iteration before a new estimate
  /// could be formed.
  pub fn push(&mut self, row: IterationRecord) {
    self.trace.push(row);
  }

  pub fn finish(self, kind: MethodKind, outcome: Outcome) -> SolveResult {
    SolveResult::finish(kind, self.trace, outcome.status, outcome.estimate, outcome.message)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_advance_records_error_after_first_iteration() {
    let f = Expression::compile("x - 1").unwrap();
    let policy = ConvergencePolicy::new(1e-12, 50);
    let mut open = OpenIteration::new(&f, &policy, &[5.0]);
    let row = open.record().value("Xi", 5.0);
    assert_eq!(open.advance(5.0, 3.0, row), ControlFlow::Continue(2.0));
    let row = open.record().value("Xi", 3.0);
    assert_eq!(open.advance(3.0, 2.0, row), ControlFlow::Continue(1.0));
    let errors: Vec<_> = open.trace.iterations().map(|row| row.error).collect();
    assert_eq!(errors[0], None);
    assert!(errors[1].is_some());
  }

  #[test]
  fn test_advance_stops_on_non_finite() {
    let f = Expression::compile("x").unwrap();
    let policy = ConvergencePolicy::default();
    let mut open = OpenIteration::new(&f, &policy, &[1.0]);
    let row = open.record();
    let ControlFlow::Break(outcome) = open.advance(1.0, f64::NAN, row) else {
      panic!("expected a break");
    };
    assert_eq!(outcome.status, SolveStatus::NumericalError);
    assert_eq!(open.trace.iteration_count(), 1);
  }

  #[test]
  fn test_advance_stops_on_divergence() {
    let f = Expression::compile("x").unwrap();
    let policy = ConvergencePolicy::default();
    let mut open = OpenIteration::new(&f, &policy, &[1.0]);
    let row = open.record();
    let ControlFlow::Break(outcome) = open.advance(1.0, 1e16, row) else {
      panic!("expected a break");
    };
    assert_eq!(outcome.status, SolveStatus::Diverged);
    assert_eq!(outcome.estimate, None);
  }
}
