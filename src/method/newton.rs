
//! Implementation of the Newton-Raphson method, using the symbolic
//! derivative of the function.
//!
//! See <https://en.wikipedia.org/wiki/Newton%27s_method>.

use super::{MethodKind, RootFinder};
use super::guards::is_exact_zero;
use super::open::{OpenIteration, Outcome};
use crate::convergence::ConvergencePolicy;
use crate::expression::Expression;
use crate::status::{SolveResult, SolveStatus};
use crate::trace::SolveTrace;

use std::ops::ControlFlow;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonRaphson {
  pub initial: f64,
}

impl NewtonRaphson {
  pub fn new(initial: f64) -> Self {
    Self { initial }
  }
}

impl RootFinder for NewtonRaphson {
  fn kind(&self) -> MethodKind {
    MethodKind::NewtonRaphson
  }

  fn solve(&self, function: &Expression, policy: &ConvergencePolicy) -> SolveResult {
    let derivative = match function.derivative() {
      Ok(derivative) => derivative,
      Err(err) => {
        let message = format!("Cannot differentiate {function}: {err}");
        return SolveResult::finish(self.kind(), SolveTrace::new(), SolveStatus::DomainError, None, message);
      }
    };
    log::debug!("f'(x) = {derivative}");

    let mut open = OpenIteration::new(function, policy, &[self.initial]);
    let mut x = self.initial;
    let mut fx = match function.try_eval(x) {
      Ok(fx) => fx,
      Err(fault) => {
        let message = format!("f cannot be evaluated at the initial estimate {x}: {fault}");
        return open.finish(self.kind(), Outcome::new(SolveStatus::NumericalError, None, message));
      }
    };
    loop {
      let row = open.record().value("Xi", x).value("f(Xi)", fx);
      let dfx = match derivative.try_eval(x) {
        Ok(dfx) => dfx,
        Err(fault) => {
          open.push(row.field("f'(Xi)", Err(fault)));
          let message = format!("f' cannot be evaluated at {x}: {fault}");
          return open.finish(self.kind(), Outcome::new(SolveStatus::NumericalError, Some(x), message));
        }
      };
      if is_exact_zero(dfx) {
        let message = format!("f'({x}) = {dfx} is too close to zero at iteration {}", open.iteration());
        return open.finish(self.kind(), Outcome::new(SolveStatus::ZeroDerivative, Some(x), message));
      }

      let next = x - fx / dfx;
      let row = row.value("f'(Xi)", dfx).value("Xi+1", next);
      match open.advance(x, next, row) {
        ControlFlow::Continue(f_next) => {
          x = next;
          fx = f_next;
        }
        ControlFlow::Break(outcome) => return open.finish(self.kind(), outcome),
      }
    }
  }
}
