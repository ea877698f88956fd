
//! Rewriting `f(x) = 0` as `x = g(x)`.
//!
//! Candidates are produced in a fixed order of preference and then
//! ranked by how strongly `g` contracts near the starting estimate.

use crate::expr::Expr;
use crate::expr::var::Var;
use crate::expr::algebra::isolate::{has_invertible_call, isolate, isolate_in_place};
use crate::expr::algebra::polynomial::Polynomial;
use crate::expr::algebra::term::{Sign, SumOfTerms};
use crate::expr::simplifier::simplify;
use crate::expression::Expression;

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

/// Relaxation factor of the damped rewrites `x ∓ k·f(x)`.
pub const DAMPING_FACTOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewriteStrategy {
  /// `x^2 + c = 0` as `x = (x - c/x) / 2`.
  Heron,
  /// The highest-degree term of a polynomial, isolated under a root.
  PolynomialRoot,
  /// A closed form, when `x` occurs once in `f`.
  ExactIsolation,
  /// `x = x - f(x)`.
  Identity,
  /// The term linear in `x`, isolated.
  LinearTerm,
  /// A term headed by an invertible function, isolated.
  InverseFunction,
  /// `x = x ∓ k·f(x)`.
  Damped,
}

#[derive(Debug, Clone)]
pub struct Candidate {
  pub strategy: RewriteStrategy,
  pub function: Expression,
}

/// A candidate with its contraction estimate `|g'(x0)|`, if that could
/// be computed.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
  pub candidate: Candidate,
  pub score: Option<f64>,
  pub accepted: bool,
}

impl RewriteStrategy {
  pub fn name(self) -> &'static str {
    match self {
      RewriteStrategy::Heron => "Heron",
      RewriteStrategy::PolynomialRoot => "polynomial root",
      RewriteStrategy::ExactIsolation => "exact isolation",
      RewriteStrategy::Identity => "identity",
      RewriteStrategy::LinearTerm => "linear term",
      RewriteStrategy::InverseFunction => "inverse function",
      RewriteStrategy::Damped => "damped",
    }
  }
}

impl Candidate {
  pub fn text(&self) -> &str {
    self.function.source()
  }
}

impl Display for RewriteStrategy {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// Every rewrite of `f = 0` into `x = g(x)` that applies, in order of
/// preference, without duplicates.
pub fn derive_candidates(f: &Expr, var: &Var) -> Vec<Candidate> {
  let mut builder = CandidateList::default();
  let x = Expr::var(var.clone());

  if let Some(polynomial) = Polynomial::from_expr(f, var) {
    polynomial_rewrites(&polynomial, var, &mut builder);
  }
  if let Some(g) = isolate(f, Expr::zero(), var) {
    builder.push(RewriteStrategy::ExactIsolation, g);
  }
  builder.push(RewriteStrategy::Identity, x.clone() - f.clone());

  let sum = SumOfTerms::split(f.clone());
  for (index, term) in sum.terms().iter().enumerate() {
    let Some(linear) = Polynomial::from_expr(&term.term, var) else {
      continue;
    };
    if linear.degree() != 1 || linear.coefficient(0) != 0.0 {
      continue;
    }
    let a = match term.sign {
      Sign::Positive => linear.coefficient(1),
      Sign::Negative => -linear.coefficient(1),
    };
    let rest = Expr::from(sum.without(index));
    let g = if a < 0.0 {
      rest / Expr::number(-a)
    } else {
      -rest / Expr::number(a)
    };
    builder.push(RewriteStrategy::LinearTerm, g);
  }

  for index in sum.single_occurrence_terms(var) {
    let term = &sum.terms()[index];
    if !has_invertible_call(&term.term, var) {
      continue;
    }
    let rest = Expr::from(sum.without(index));
    let rhs = match term.sign {
      Sign::Positive => -rest,
      Sign::Negative => rest,
    };
    if let Some(g) = isolate_in_place(&term.term, rhs, var) {
      builder.push(RewriteStrategy::InverseFunction, g);
    }
  }

  let k = Expr::number(DAMPING_FACTOR);
  builder.push(RewriteStrategy::Damped, x.clone() - k.clone() * f.clone());
  builder.push(RewriteStrategy::Damped, x + k * f.clone());

  builder.candidates
}

fn polynomial_rewrites(polynomial: &Polynomial, var: &Var, builder: &mut CandidateList) {
  let degree = polynomial.degree();
  if degree < 2 {
    return;
  }
  let leading = polynomial.leading_coefficient();
  let x = Expr::var(var.clone());

  if degree == 2 && polynomial.coefficient(1) == 0.0 {
    let c = polynomial.coefficient(0) / leading;
    let correction = Expr::number(c.abs()) / x.clone();
    let g = if c < 0.0 {
      (x + correction) / Expr::number(2.0)
    } else {
      (x - correction) / Expr::number(2.0)
    };
    builder.push(RewriteStrategy::Heron, g);
  }

  let radicand = polynomial.without_degree(degree).scale(-leading.recip()).to_expr(var);
  let g = Expr::call("root", vec![radicand, Expr::number(degree as f64)]);
  builder.push(RewriteStrategy::PolynomialRoot, g);
}

#[derive(Debug, Default)]
struct CandidateList {
  seen: HashSet<String>,
  candidates: Vec<Candidate>,
}

impl CandidateList {
  fn push(&mut self, strategy: RewriteStrategy, g: Expr) {
    let function = Expression::from_expr(simplify(g));
    if self.seen.insert(function.source().to_owned()) {
      self.candidates.push(Candidate { strategy, function });
    }
  }
}

/// Scores `candidate` at `x0`. A candidate is accepted when `g(x0)` is
/// defined and `|g'(x0)| < 1`.
pub fn score(candidate: Candidate, x0: f64) -> ScoredCandidate {
  let defined = candidate.function.try_eval(x0).is_ok();
  let score = candidate.function.derivative()
    .ok()
    .and_then(|derivative| derivative.try_eval(x0).ok())
    .map(f64::abs)
    .filter(|s| s.is_finite());
  let accepted = defined && score.is_some_and(|s| s < 1.0);
  ScoredCandidate { candidate, score: score.filter(|_| defined), accepted }
}

/// Chooses the rewrite to iterate from `x0`: the first accepted
/// candidate, else the one with the smallest score, else the last one
/// constructed. `None` only if there are no candidates at all.
pub fn select(candidates: Vec<Candidate>, x0: f64) -> Option<ScoredCandidate> {
  let mut best: Option<ScoredCandidate> = None;
  let mut last: Option<ScoredCandidate> = None;
  for candidate in candidates {
    let scored = score(candidate, x0);
    log::debug!(
      "g(x) = {} ({}): |g'({x0})| = {:?}",
      scored.candidate.text(),
      scored.candidate.strategy,
      scored.score,
    );
    if scored.accepted {
      return Some(scored);
    }
    let improves = match (&best, scored.score) {
      (_, None) => false,
      (None, Some(_)) => true,
      (Some(best), Some(score)) => best.score.is_some_and(|b| score < b),
    };
    if improves {
      best = Some(scored.clone());
    }
    last = Some(scored);
  }
  best.or(last)
}
