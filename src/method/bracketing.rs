
//! The iteration shared by Bisection and False Position. The two
//! differ only in where they place the next estimate inside the
//! bracket.

use super::MethodKind;
use super::guards::is_exact_zero;
use crate::convergence::{ConvergencePolicy, ErrorSample, PolicyStop};
use crate::expression::Expression;
use crate::status::{SolveResult, SolveStatus};
use crate::trace::{IterationRecord, SolveTrace};

/// A bracket endpoint and the function value there.
#[derive(Debug, Clone, Copy)]
pub(super) struct Endpoint {
  pub x: f64,
  pub fx: f64,
}

/// Places the next estimate inside the bracket, or explains why it
/// cannot.
pub(super) type NextEstimate = fn(lower: Endpoint, upper: Endpoint) -> Result<f64, String>;

pub(super) fn solve_bracketed(
  kind: MethodKind,
  function: &Expression,
  policy: &ConvergencePolicy,
  lower: f64,
  upper: f64,
  next_estimate: NextEstimate,
) -> SolveResult {
  let trace = SolveTrace::new();
  let fl = match function.try_eval(lower) {
    Ok(fl) => fl,
    Err(fault) => {
      let message = format!("f(Xl) cannot be evaluated at Xl = {lower}: {fault}");
      return SolveResult::finish(kind, trace, SolveStatus::DomainError, None, message);
    }
  };
  let fu = match function.try_eval(upper) {
    Ok(fu) => fu,
    Err(fault) => {
      let message = format!("f(Xu) cannot be evaluated at Xu = {upper}: {fault}");
      return SolveResult::finish(kind, trace, SolveStatus::DomainError, None, message);
    }
  };
  if is_exact_zero(fl) {
    return SolveResult::finish(kind, trace, SolveStatus::Converged, Some(lower), format!("Xl = {lower} is already a root"));
  }
  if is_exact_zero(fu) {
    return SolveResult::finish(kind, trace, SolveStatus::Converged, Some(upper), format!("Xu = {upper} is already a root"));
  }
  if fl * fu > 0.0 {
    let message = format!(
      "f(Xl) = {fl} and f(Xu) = {fu} have the same sign; the interval [{lower}, {upper}] does not bracket a root",
    );
    return SolveResult::finish(kind, trace, SolveStatus::DomainError, None, message);
  }

  iterate(kind, function, policy, Endpoint { x: lower, fx: fl }, Endpoint { x: upper, fx: fu }, next_estimate, trace)
}

fn iterate(
  kind: MethodKind,
  function: &Expression,
  policy: &ConvergencePolicy,
  mut lower: Endpoint,
  mut upper: Endpoint,
  next_estimate: NextEstimate,
  mut trace: SolveTrace,
) -> SolveResult {
  let metric = policy.effective_metric(true);
  let mut previous: Option<f64> = None;
  let mut iteration = 0;
  loop {
    let xr = match next_estimate(lower, upper) {
      Ok(xr) if xr.is_finite() => xr,
      Ok(xr) => {
        let message = format!("Estimate Xr = {xr} is not a finite number");
        return SolveResult::finish(kind, trace, SolveStatus::NumericalError, previous, message);
      }
      Err(message) => {
        return SolveResult::finish(kind, trace, SolveStatus::NumericalError, previous, message);
      }
    };
    let row = IterationRecord::new(iteration, metric)
      .value("Xl", lower.x)
      .value("f(Xl)", lower.fx)
      .value("Xu", upper.x)
      .value("f(Xu)", upper.fx)
      .value("Xr", xr);
    let fr = match function.try_eval(xr) {
      Ok(fr) => fr,
      Err(fault) => {
        trace.push(row.field("f(Xr)", Err(fault)));
        let message = format!("f(Xr) cannot be evaluated at Xr = {xr}: {fault}");
        return SolveResult::finish(kind, trace, SolveStatus::NumericalError, Some(xr), message);
      }
    };

    let (next_lower, next_upper) = if lower.fx * fr < 0.0 {
      (lower, Endpoint { x: xr, fx: fr })
    } else {
      (Endpoint { x: xr, fx: fr }, upper)
    };
    let error = previous.map(|previous| {
      metric.measure(&ErrorSample {
        previous,
        current: xr,
        residual: fr,
        width: Some(next_upper.x - next_lower.x),
      })
    });
    trace.push(row.value("f(Xr)", fr).with_error(error));

    if is_exact_zero(fr) {
      let message = format!("Exact root found at iteration {iteration}");
      return SolveResult::finish(kind, trace, SolveStatus::Converged, Some(xr), message);
    }
    lower = next_lower;
    upper = next_upper;
    previous = Some(xr);
    iteration += 1;

    match policy.termination(iteration, error) {
      Some(PolicyStop::Converged) => {
        let message = format!("Converged after {iteration} iterations");
        return SolveResult::finish(kind, trace, SolveStatus::Converged, Some(xr), message);
      }
      Some(PolicyStop::IterationCap) => {
        let message = format!("Reached the maximum of {} iterations", policy.max_iterations);
        return SolveResult::finish(kind, trace, SolveStatus::MaxIterationsReached, Some(xr), message);
      }
      None => {}
    }
  }
}
