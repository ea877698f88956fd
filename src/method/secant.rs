
//! Implementation of the secant method: Newton-Raphson with the
//! derivative replaced by the slope through the two most recent
//! estimates.
//!
//! See <https://en.wikipedia.org/wiki/Secant_method>.

use super::{MethodKind, RootFinder};
use super::guards::EXACT_TOLERANCE;
use super::open::{OpenIteration, Outcome};
use crate::convergence::ConvergencePolicy;
use crate::expression::Expression;
use crate::status::{SolveResult, SolveStatus};

use std::ops::ControlFlow;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Secant {
  /// The estimate `x_{-1}`.
  pub previous: f64,
  /// The estimate `x_0`.
  pub initial: f64,
}

impl Secant {
  pub fn new(previous: f64, initial: f64) -> Self {
    Self { previous, initial }
  }
}

impl RootFinder for Secant {
  fn kind(&self) -> MethodKind {
    MethodKind::Secant
  }

  fn solve(&self, function: &Expression, policy: &ConvergencePolicy) -> SolveResult {
    let mut open = OpenIteration::new(function, policy, &[self.previous, self.initial]);
    let seeds = function.try_eval(self.previous).and_then(|f_prev| {
      function.try_eval(self.initial).map(|fx| (f_prev, fx))
    });
    let (mut f_prev, mut fx) = match seeds {
      Ok(values) => values,
      Err(fault) => {
        let message = format!("f cannot be evaluated at the seeds {} and {}: {fault}", self.previous, self.initial);
        return open.finish(self.kind(), Outcome::new(SolveStatus::NumericalError, None, message));
      }
    };
    let mut prev = self.previous;
    let mut x = self.initial;
    loop {
      let row = open.record()
        .value("Xi-1", prev)
        .value("f(Xi-1)", f_prev)
        .value("Xi", x)
        .value("f(Xi)", fx);
      let denominator = fx - f_prev;
      if denominator.abs() < EXACT_TOLERANCE {
        open.push(row);
        let message = format!("f(Xi) - f(Xi-1) = {denominator} is too close to zero at iteration {}", open.iteration());
        return open.finish(self.kind(), Outcome::new(SolveStatus::NumericalError, None, message));
      }

      let next = x - fx * (x - prev) / denominator;
      match open.advance(x, next, row.value("Xi+1", next)) {
        ControlFlow::Continue(f_next) => {
          prev = x;
          f_prev = fx;
          x = next;
          fx = f_next;
        }
        ControlFlow::Break(outcome) => return open.finish(self.kind(), outcome),
      }
    }
  }
}
