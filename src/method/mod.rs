
//! The five iterative root-finding methods.
//!
//! Every method is a [`RootFinder`]: given a compiled function and a
//! [`ConvergencePolicy`], it runs to completion and reports a
//! [`SolveResult`]. Failures inside a method are statuses, never
//! errors.

mod bracketing;
pub mod bisection;
pub mod false_position;
pub mod fixed_point;
pub mod guards;
pub mod newton;
mod open;
pub mod secant;

pub use bisection::Bisection;
pub use false_position::FalsePosition;
pub use fixed_point::FixedPoint;
pub use newton::NewtonRaphson;
pub use secant::Secant;

use crate::convergence::ConvergencePolicy;
use crate::expression::Expression;
use crate::status::SolveResult;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

pub trait RootFinder {
  fn kind(&self) -> MethodKind;

  fn solve(&self, function: &Expression, policy: &ConvergencePolicy) -> SolveResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodKind {
  #[serde(rename = "Bisection")]
  Bisection,
  #[serde(rename = "False Position")]
  FalsePosition,
  #[serde(rename = "Fixed Point")]
  FixedPoint,
  #[serde(rename = "Newton-Raphson")]
  NewtonRaphson,
  #[serde(rename = "Secant")]
  Secant,
}

/// Starting values for a method.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodParams {
  /// A bracket `[lower, upper]`, for Bisection and False Position.
  Bracket { lower: f64, upper: f64 },
  /// A single starting estimate, for Newton-Raphson and Fixed Point.
  Start { initial: f64 },
  /// A starting estimate and an explicit `g(x)`, for Fixed Point.
  FixedPoint { initial: f64, iteration_function: Option<String> },
  /// Two starting estimates `x_{-1}` and `x_0`, for Secant.
  Seeds { previous: f64, initial: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown method '{0}'")]
pub struct UnknownMethodError(pub String);

impl MethodKind {
  pub const ALL: [MethodKind; 5] = [
    MethodKind::Bisection,
    MethodKind::FalsePosition,
    MethodKind::FixedPoint,
    MethodKind::NewtonRaphson,
    MethodKind::Secant,
  ];

  pub fn name(self) -> &'static str {
    match self {
      MethodKind::Bisection => "Bisection",
      MethodKind::FalsePosition => "False Position",
      MethodKind::FixedPoint => "Fixed Point",
      MethodKind::NewtonRaphson => "Newton-Raphson",
      MethodKind::Secant => "Secant",
    }
  }

  pub fn is_bracketing(self) -> bool {
    matches!(self, MethodKind::Bisection | MethodKind::FalsePosition)
  }
}

impl MethodParams {
  /// Every number in the parameters.
  pub fn values(&self) -> Vec<f64> {
    match self {
      MethodParams::Bracket { lower, upper } => vec![*lower, *upper],
      MethodParams::Start { initial } | MethodParams::FixedPoint { initial, .. } => vec![*initial],
      MethodParams::Seeds { previous, initial } => vec![*previous, *initial],
    }
  }
}

impl FromStr for MethodKind {
  type Err = UnknownMethodError;

  /// Accepts the display names and their lowercase, kebab-case and
  /// snake_case spellings.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let key: String = s.chars()
      .filter(|c| !matches!(c, ' ' | '-' | '_'))
      .flat_map(char::to_lowercase)
      .collect();
    match key.as_str() {
      "bisection" => Ok(MethodKind::Bisection),
      "falseposition" | "regulafalsi" => Ok(MethodKind::FalsePosition),
      "fixedpoint" => Ok(MethodKind::FixedPoint),
      "newtonraphson" | "newton" => Ok(MethodKind::NewtonRaphson),
      "secant" => Ok(MethodKind::Secant),
      _ => Err(UnknownMethodError(s.to_owned())),
    }
  }
}

impl Display for MethodKind {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_method_names() {
    for kind in MethodKind::ALL {
      assert_eq!(kind.name().parse::<MethodKind>().unwrap(), kind);
    }
    assert_eq!("false_position".parse::<MethodKind>().unwrap(), MethodKind::FalsePosition);
    assert_eq!("newton-raphson".parse::<MethodKind>().unwrap(), MethodKind::NewtonRaphson);
    assert_eq!("FIXED-POINT".parse::<MethodKind>().unwrap(), MethodKind::FixedPoint);
    assert_eq!("Brent".parse::<MethodKind>(), Err(UnknownMethodError(String::from("Brent"))));
  }

  #[test]
  fn test_serde_uses_display_names() {
    let json = serde_json::to_string(&MethodKind::NewtonRaphson).unwrap();
    assert_eq!(json, "\"Newton-Raphson\"");
  }
}
