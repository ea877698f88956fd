
//! Implementation of the bisection method for finding roots of
//! continuous functions on an interval whose endpoints differ in
//! sign.
//!
//! See <https://en.wikipedia.org/wiki/Bisection_method>.

use super::{MethodKind, RootFinder};
use super::bracketing::{solve_bracketed, Endpoint};
use crate::convergence::ConvergencePolicy;
use crate::expression::Expression;
use crate::status::SolveResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bisection {
  pub lower: f64,
  pub upper: f64,
}

impl Bisection {
  pub fn new(lower: f64, upper: f64) -> Self {
    Self { lower, upper }
  }
}

fn midpoint(lower: Endpoint, upper: Endpoint) -> Result<f64, String> {
  Ok((lower.x + upper.x) / 2.0)
}

impl RootFinder for Bisection {
  fn kind(&self) -> MethodKind {
    MethodKind::Bisection
  }

  fn solve(&self, function: &Expression, policy: &ConvergencePolicy) -> SolveResult {
    solve_bracketed(self.kind(), function, policy, self.lower, self.upper, midpoint)
  }
}
