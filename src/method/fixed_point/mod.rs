
//! Fixed-point iteration `x_{i+1} = g(x_i)`.
//!
//! The iteration function is either supplied by the caller or derived
//! from `f` by [`rewrite`].
//!
//! See <https://en.wikipedia.org/wiki/Fixed-point_iteration>.

pub mod rewrite;

use super::{MethodKind, RootFinder};
use super::guards::{is_diverging, is_exact_zero, OscillationDetector};
use crate::convergence::{ConvergencePolicy, ErrorSample, PolicyStop};
use crate::expression::Expression;
use crate::status::{SolveResult, SolveStatus};
use crate::trace::{IterationRecord, SolveTrace};

#[derive(Debug, Clone, PartialEq)]
pub struct FixedPoint {
  pub initial: f64,
  /// An explicit `g(x)`. If absent, one is derived from `f`.
  pub iteration_function: Option<Expression>,
}

impl FixedPoint {
  pub fn new(initial: f64) -> Self {
    Self { initial, iteration_function: None }
  }

  pub fn with_iteration_function(mut self, g: Expression) -> Self {
    self.iteration_function = Some(g);
    self
  }

  /// The `g(x)` this method will iterate for `f`, or a diagnostic if
  /// none can be found.
  pub fn iteration_function_for(&self, function: &Expression) -> Result<Expression, String> {
    if let Some(g) = &self.iteration_function {
      return Ok(g.clone());
    }
    let candidates = rewrite::derive_candidates(function.expr(), function.var());
    let Some(selected) = rewrite::select(candidates, self.initial) else {
      return Err(format!("No rewrite of {function} = 0 as x = g(x) was found"));
    };
    if !selected.accepted {
      log::debug!(
        "No rewrite of {function} contracts at {}; falling back to {} ({})",
        self.initial,
        selected.candidate.text(),
        selected.candidate.strategy,
      );
    }
    Ok(selected.candidate.function)
  }

  fn iterate(&self, function: &Expression, g: &Expression, policy: &ConvergencePolicy) -> SolveResult {
    let kind = self.kind();
    let metric = policy.effective_metric(false);
    let mut detector = OscillationDetector::new(self.initial);
    let mut trace = SolveTrace::new();
    let mut x = self.initial;
    let mut iteration = 0;
    loop {
      let row = IterationRecord::new(iteration, metric).value("Xi", x);
      let next = match g.try_eval(x) {
        Ok(next) if next.is_finite() => next,
        Ok(next) => {
          trace.push(row.value("g(Xi)", next));
          let message = format!("g({x}) is not a finite number");
          return SolveResult::finish(kind, trace, SolveStatus::NumericalError, None, message);
        }
        Err(fault) => {
          trace.push(row.field("g(Xi)", Err(fault)));
          let message = format!("g cannot be evaluated at {x}: {fault}");
          return SolveResult::finish(kind, trace, SolveStatus::NumericalError, None, message);
        }
      };
      let row = row.value("g(Xi)", next);
      if is_diverging(next) {
        trace.push(row);
        let message = format!("Estimate {next:e} exceeds the divergence bound at iteration {iteration}");
        return SolveResult::finish(kind, trace, SolveStatus::Diverged, None, message);
      }
      let f_next = match function.try_eval(next) {
        Ok(f_next) => f_next,
        Err(fault) => {
          trace.push(row.field("f(Xi+1)", Err(fault)));
          let message = format!("f cannot be evaluated at {next}: {fault}");
          return SolveResult::finish(kind, trace, SolveStatus::NumericalError, None, message);
        }
      };

      let error = (iteration > 0).then(|| {
        metric.measure(&ErrorSample { previous: x, current: next, residual: f_next, width: None })
      });
      trace.push(row.value("f(Xi+1)", f_next).with_error(error));
      let completed = iteration;
      iteration += 1;

      if is_exact_zero(next - x) {
        let message = format!("Exact fixed point found at iteration {completed}");
        return SolveResult::finish(kind, trace, SolveStatus::Converged, Some(next), message);
      }
      match policy.termination(iteration, error) {
        Some(PolicyStop::Converged) => {
          let message = format!("Converged after {iteration} iterations");
          return SolveResult::finish(kind, trace, SolveStatus::Converged, Some(next), message);
        }
        Some(PolicyStop::IterationCap) => {
          let message = format!("Reached the maximum of {} iterations", policy.max_iterations);
          return SolveResult::finish(kind, trace, SolveStatus::MaxIterationsReached, Some(next), message);
        }
        None => {}
      }
      if detector.observe(next) {
        let message = format!("Estimates are oscillating; {next} was already visited");
        return SolveResult::finish(kind, trace, SolveStatus::Oscillating, Some(next), message);
      }
      x = next;
    }
  }
}

impl RootFinder for FixedPoint {
  fn kind(&self) -> MethodKind {
    MethodKind::FixedPoint
  }

  fn solve(&self, function: &Expression, policy: &ConvergencePolicy) -> SolveResult {
    let g = match self.iteration_function_for(function) {
      Ok(g) => g,
      Err(message) => {
        return SolveResult::finish(self.kind(), SolveTrace::new(), SolveStatus::DomainError, None, message);
      }
    };
    log::debug!("Iterating g(x) = {g}");
    let text = g.source().to_owned();
    self.iterate(function, &g, policy).with_iteration_function(text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use approx::assert_abs_diff_eq;

  #[test]
  fn test_cube_root_rewrite() {
    let f = Expression::compile("x^3 - 7.89x - 11").unwrap();
    let result = FixedPoint::new(3.0).solve(&f, &ConvergencePolicy::default());
    assert_eq!(result.status, SolveStatus::Converged);
    assert_abs_diff_eq!(result.root.unwrap(), 3.3436, epsilon = 1e-3);
    assert!(f.evaluate(result.root.unwrap()).abs() < 1e-3);
    assert!(result.iteration_function.unwrap().starts_with("root("));
  }

  #[test]
  fn test_bad_seed_selects_alternate() {
    let f = Expression::compile("x^3 - 7.89x - 11").unwrap();
    let result = FixedPoint::new(-1.39).solve(&f, &ConvergencePolicy::default());
    let g = result.iteration_function.clone().unwrap();
    assert!(!g.starts_with("root("));
    assert!(result.message().is_some_and(|m| !m.is_empty()));
  }

  #[test]
  fn test_explicit_iteration_function() {
    let f = Expression::compile("x^2 - 2").unwrap();
    let g = Expression::compile("(x + 2/x) / 2").unwrap();
    let result = FixedPoint::new(1.0).with_iteration_function(g).solve(&f, &ConvergencePolicy::default());
    assert_eq!(result.status, SolveStatus::Converged);
    assert_abs_diff_eq!(result.root.unwrap(), 2.0f64.sqrt(), epsilon = 1e-8);
    assert_eq!(result.iteration_function.as_deref(), Some("(x + 2/x) / 2"));
  }

  #[test]
  fn test_row_layout() {
    let f = Expression::compile("x^2 - 2").unwrap();
    let g = Expression::compile("(x + 2/x) / 2").unwrap();
    let result = FixedPoint::new(1.0).with_iteration_function(g).solve(&f, &ConvergencePolicy::default());
    let first = result.trace.iterations().next().unwrap();
    let labels: Vec<_> = first.fields.iter().map(|(label, _)| *label).collect();
    assert_eq!(labels, vec!["Xi", "g(Xi)", "f(Xi+1)"]);
    assert_eq!(first.get("g(Xi)"), Some(Ok(1.5)));
    assert_eq!(first.get("f(Xi+1)"), Some(Ok(0.25)));
  }

  #[test]
  fn test_alternating_convergence() {
    let f = Expression::compile("cos(x) - x").unwrap();
    let result = FixedPoint::new(1.0).solve(&f, &ConvergencePolicy::default());
    assert_eq!(result.status, SolveStatus::Converged, "{:?}", result.message());
    assert_abs_diff_eq!(result.root.unwrap(), 0.7390851332, epsilon = 1e-4);

    let f = Expression::compile("exp(-x) - x").unwrap();
    let result = FixedPoint::new(0.5).solve(&f, &ConvergencePolicy::default());
    assert_eq!(result.status, SolveStatus::Converged, "{:?}", result.message());
    assert_abs_diff_eq!(result.root.unwrap(), 0.5671432904, epsilon = 1e-4);
  }

  #[test]
  fn test_alternating_convergence_with_explicit_g() {
    let f = Expression::compile("cos(x) - x").unwrap();
    let g = Expression::compile("cos(x)").unwrap();
    let policy = ConvergencePolicy::new(1e-8, 200);
    let result = FixedPoint::new(1.0).with_iteration_function(g).solve(&f, &policy);
    assert_eq!(result.status, SolveStatus::Converged);
    assert_abs_diff_eq!(result.root.unwrap(), 0.7390851332, epsilon = 1e-8);
  }

  #[test]
  fn test_oscillating_iteration_function() {
    let f = Expression::compile("x - 1").unwrap();
    let g = Expression::compile("2 - x").unwrap();
    let result = FixedPoint::new(0.0).with_iteration_function(g).solve(&f, &ConvergencePolicy::default());
    assert_eq!(result.status, SolveStatus::Oscillating);
    assert_eq!(result.root, Some(0.0));
  }

  #[test]
  fn test_diverging_iteration_function() {
    let f = Expression::compile("x").unwrap();
    let g = Expression::compile("10x").unwrap();
    let result = FixedPoint::new(1.0).with_iteration_function(g).solve(&f, &ConvergencePolicy::default());
    assert_eq!(result.status, SolveStatus::Diverged);
    assert_eq!(result.root, None);
  }

  #[test]
  fn test_leaving_the_domain() {
    let f = Expression::compile("x").unwrap();
    let g = Expression::compile("sqrt(x - 5)").unwrap();
    let result = FixedPoint::new(1.0).with_iteration_function(g).solve(&f, &ConvergencePolicy::default());
    assert_eq!(result.status, SolveStatus::NumericalError);
    assert_eq!(result.trace.iteration_count(), 1);
  }
}
