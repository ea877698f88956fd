
//! Implementation of the false position (regula falsi) method: like
//! bisection, but the next estimate is where the chord between the
//! bracket endpoints crosses zero.
//!
//! See <https://en.wikipedia.org/wiki/Regula_falsi>.

use super::{MethodKind, RootFinder};
use super::bracketing::{solve_bracketed, Endpoint};
use super::guards::EXACT_TOLERANCE;
use crate::convergence::ConvergencePolicy;
use crate::expression::Expression;
use crate::status::SolveResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FalsePosition {
  pub lower: f64,
  pub upper: f64,
}

impl FalsePosition {
  pub fn new(lower: f64, upper: f64) -> Self {
    Self { lower, upper }
  }
}

fn chord_crossing(lower: Endpoint, upper: Endpoint) -> Result<f64, String> {
  let denominator = lower.fx - upper.fx;
  if denominator.abs() < EXACT_TOLERANCE {
    return Err(format!("f(Xl) - f(Xu) = {denominator} is too close to zero"));
  }
  Ok(upper.x - upper.fx * (lower.x - upper.x) / denominator)
}

impl RootFinder for FalsePosition {
  fn kind(&self) -> MethodKind {
    MethodKind::FalsePosition
  }

  fn solve(&self, function: &Expression, policy: &ConvergencePolicy) -> SolveResult {
    solve_bracketed(self.kind(), function, policy, self.lower, self.upper, chord_crossing)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::convergence::ErrorMetric;
  use crate::status::SolveStatus;

  use approx::assert_abs_diff_eq;

  #[test]
  fn test_chord_crossing() {
    let lower = Endpoint { x: 0.0, fx: -4.0 };
    let upper = Endpoint { x: 3.0, fx: 5.0 };
    assert_abs_diff_eq!(chord_crossing(lower, upper).unwrap(), 4.0 / 3.0, epsilon = 1e-12);
    assert!(chord_crossing(lower, Endpoint { x: 3.0, fx: -4.0 }).is_err());
  }

  #[test]
  fn test_cubic() {
    let f = Expression::compile("x^3 - 7.89x - 11").unwrap();
    let policy = ConvergencePolicy::new(1e-10, 200).with_metric(ErrorMetric::AbsoluteDifference);
    let result = FalsePosition::new(3.0, 4.0).solve(&f, &policy);
    assert_eq!(result.status, SolveStatus::Converged);
    let root = result.root.unwrap();
    assert!(f.evaluate(root).abs() < 1e-6);
    assert!((3.0..=4.0).contains(&root));
  }

  #[test]
  fn test_square_root_of_four() {
    let f = Expression::compile("x^2 - 4").unwrap();
    let result = FalsePosition::new(0.0, 3.0).solve(&f, &ConvergencePolicy::default());
    assert!(result.root.is_some());
    assert_abs_diff_eq!(result.root.unwrap(), 2.0, epsilon = 1e-3);
    let widths: Vec<f64> = result.trace.iterations().map(|row| {
      row.get("Xu").unwrap().unwrap() - row.get("Xl").unwrap().unwrap()
    }).collect();
    assert!(widths.windows(2).all(|w| w[1] <= w[0]));
  }
}
