
//! When to stop iterating: the error measure, how it is compared
//! against the threshold, and the iteration cap.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Tolerance used by the `=` comparison.
pub const EQUALITY_TOLERANCE: f64 = 1e-12;

/// Below this magnitude a relative error is meaningless, and the
/// absolute difference is reported instead.
pub const RELATIVE_ERROR_FLOOR: f64 = 1e-10;

/// How the error of an iteration is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorMetric {
  /// `|x_new - x_old|`
  #[serde(alias = "absolute")]
  AbsoluteDifference,
  /// `|x_new - x_old| / |x_new| * 100`
  #[default]
  #[serde(alias = "relative", alias = "percent")]
  RelativePercent,
  /// `|f(x_new)|`
  #[serde(alias = "residual")]
  FunctionValue,
  /// `|x_u - x_l|`, for bracketing methods. Open methods measure the
  /// absolute difference instead.
  #[serde(alias = "width")]
  IntervalWidth,
  /// Relative percentage when the threshold exceeds one, absolute
  /// difference otherwise.
  Auto,
}

/// How the error is compared against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComparisonOperator {
  #[default]
  #[serde(rename = "<=")]
  LessOrEqual,
  #[serde(rename = ">=")]
  GreaterOrEqual,
  #[serde(rename = "<")]
  Less,
  #[serde(rename = ">")]
  Greater,
  #[serde(rename = "=")]
  Equal,
}

/// The inputs an [`ErrorMetric`] may draw on after an iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorSample {
  pub previous: f64,
  pub current: f64,
  /// `f` evaluated at the newest estimate.
  pub residual: f64,
  /// The current bracket width, for bracketing methods.
  pub width: Option<f64>,
}

/// Why the policy asked iteration to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyStop {
  Converged,
  IterationCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePolicy {
  pub metric: ErrorMetric,
  pub operator: ComparisonOperator,
  pub threshold: f64,
  pub max_iterations: usize,
  /// When false, only the iteration cap stops iteration.
  pub stop_by_threshold: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum PolicyError {
  #[error("Threshold must be a positive number, got {0}")]
  InvalidThreshold(f64),
  #[error("Threshold {threshold} exceeds the maximum of {maximum}")]
  ThresholdTooLarge { threshold: f64, maximum: f64 },
  #[error("Maximum iterations must be at least 1")]
  ZeroIterations,
  #[error("Maximum iterations {requested} exceeds the limit of {limit}")]
  TooManyIterations { requested: usize, limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} '{text}'")]
pub struct ParsePolicyError {
  kind: &'static str,
  text: String,
}

impl ErrorMetric {
  /// Resolves [`ErrorMetric::Auto`] against `threshold`, and
  /// [`ErrorMetric::IntervalWidth`] for methods without a bracket.
  pub fn resolve(self, threshold: f64, bracketing: bool) -> ErrorMetric {
    match self {
      ErrorMetric::Auto if threshold > 1.0 => ErrorMetric::RelativePercent,
      ErrorMetric::Auto => ErrorMetric::AbsoluteDifference,
      ErrorMetric::IntervalWidth if !bracketing => ErrorMetric::AbsoluteDifference,
      metric => metric,
    }
  }

  pub fn measure(self, sample: &ErrorSample) -> f64 {
    let difference = (sample.current - sample.previous).abs();
    match self {
      ErrorMetric::AbsoluteDifference | ErrorMetric::Auto => difference,
      ErrorMetric::RelativePercent => {
        if sample.current.abs() < RELATIVE_ERROR_FLOOR {
          difference
        } else {
          difference / sample.current.abs() * 100.0
        }
      }
      ErrorMetric::FunctionValue => sample.residual.abs(),
      ErrorMetric::IntervalWidth => sample.width.map_or(difference, f64::abs),
    }
  }

  /// Whether errors under this metric are percentages.
  pub fn is_percentage(self) -> bool {
    self == ErrorMetric::RelativePercent
  }

  pub fn name(self) -> &'static str {
    match self {
      ErrorMetric::AbsoluteDifference => "absolute",
      ErrorMetric::RelativePercent => "relative",
      ErrorMetric::FunctionValue => "function-value",
      ErrorMetric::IntervalWidth => "interval-width",
      ErrorMetric::Auto => "auto",
    }
  }
}

impl ComparisonOperator {
  pub fn compare(self, error: f64, threshold: f64) -> bool {
    match self {
      ComparisonOperator::LessOrEqual => error <= threshold,
      ComparisonOperator::GreaterOrEqual => error >= threshold,
      ComparisonOperator::Less => error < threshold,
      ComparisonOperator::Greater => error > threshold,
      ComparisonOperator::Equal => (error - threshold).abs() <= EQUALITY_TOLERANCE,
    }
  }

  pub fn symbol(self) -> &'static str {
    match self {
      ComparisonOperator::LessOrEqual => "<=",
      ComparisonOperator::GreaterOrEqual => ">=",
      ComparisonOperator::Less => "<",
      ComparisonOperator::Greater => ">",
      ComparisonOperator::Equal => "=",
    }
  }
}

impl ConvergencePolicy {
  pub const DEFAULT_THRESHOLD: f64 = 1e-4;
  pub const DEFAULT_MAX_ITERATIONS: usize = 50;

  pub fn new(threshold: f64, max_iterations: usize) -> Self {
    Self {
      metric: ErrorMetric::default(),
      operator: ComparisonOperator::default(),
      threshold,
      max_iterations,
      stop_by_threshold: true,
    }
  }

  pub fn with_metric(mut self, metric: ErrorMetric) -> Self {
    self.metric = metric;
    self
  }

  pub fn with_operator(mut self, operator: ComparisonOperator) -> Self {
    self.operator = operator;
    self
  }

  pub fn with_stop_by_threshold(mut self, stop_by_threshold: bool) -> Self {
    self.stop_by_threshold = stop_by_threshold;
    self
  }

  /// Checks the invariants of a policy against configured upper
  /// bounds.
  pub fn validate(&self, max_threshold: f64, iteration_limit: usize) -> Result<(), PolicyError> {
    if !self.threshold.is_finite() || self.threshold <= 0.0 {
      return Err(PolicyError::InvalidThreshold(self.threshold));
    }
    if self.threshold > max_threshold {
      return Err(PolicyError::ThresholdTooLarge { threshold: self.threshold, maximum: max_threshold });
    }
    if self.max_iterations == 0 {
      return Err(PolicyError::ZeroIterations);
    }
    if self.max_iterations > iteration_limit {
      return Err(PolicyError::TooManyIterations { requested: self.max_iterations, limit: iteration_limit });
    }
    Ok(())
  }

  /// The metric actually applied by a method.
  pub fn effective_metric(&self, bracketing: bool) -> ErrorMetric {
    self.metric.resolve(self.threshold, bracketing)
  }

  pub fn has_converged(&self, error: f64) -> bool {
    self.operator.compare(error, self.threshold)
  }

  /// Whether another iteration should run after `completed`
  /// iterations, the last of which had error `latest_error` (absent
  /// for the first iteration).
  pub fn should_continue(&self, completed: usize, latest_error: Option<f64>) -> bool {
    self.termination(completed, latest_error).is_none()
  }

  /// Why iteration should stop, if it should. Convergence takes
  /// precedence over the cap when both apply.
  pub fn termination(&self, completed: usize, latest_error: Option<f64>) -> Option<PolicyStop> {
    let converged = self.stop_by_threshold && latest_error.is_some_and(|e| self.has_converged(e));
    if converged {
      Some(PolicyStop::Converged)
    } else if completed >= self.max_iterations {
      Some(PolicyStop::IterationCap)
    } else {
      None
    }
  }
}

impl Default for ConvergencePolicy {
  fn default() -> Self {
    Self::new(Self::DEFAULT_THRESHOLD, Self::DEFAULT_MAX_ITERATIONS)
  }
}

impl FromStr for ErrorMetric {
  type Err = ParsePolicyError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
      "absolute" | "absolute-difference" | "abs" => Ok(ErrorMetric::AbsoluteDifference),
      "relative" | "relative-percent" | "percent" | "%" => Ok(ErrorMetric::RelativePercent),
      "function-value" | "residual" | "f" => Ok(ErrorMetric::FunctionValue),
      "interval-width" | "width" => Ok(ErrorMetric::IntervalWidth),
      "auto" => Ok(ErrorMetric::Auto),
      _ => Err(ParsePolicyError { kind: "error metric", text: s.to_owned() }),
    }
  }
}

impl FromStr for ComparisonOperator {
  type Err = ParsePolicyError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "<=" => Ok(ComparisonOperator::LessOrEqual),
      ">=" => Ok(ComparisonOperator::GreaterOrEqual),
      "<" => Ok(ComparisonOperator::Less),
      ">" => Ok(ComparisonOperator::Greater),
      "=" | "==" => Ok(ComparisonOperator::Equal),
      _ => Err(ParsePolicyError { kind: "comparison operator", text: s.to_owned() }),
    }
  }
}

impl Display for ErrorMetric {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl Display for ComparisonOperator {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.symbol())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use approx::assert_abs_diff_eq;

  fn sample(previous: f64, current: f64) -> ErrorSample {
    ErrorSample { previous, current, residual: 0.5, width: Some(0.25) }
  }

  #[test]
  fn test_metrics() {
    let s = sample(2.0, 2.5);
    assert_abs_diff_eq!(ErrorMetric::AbsoluteDifference.measure(&s), 0.5);
    assert_abs_diff_eq!(ErrorMetric::RelativePercent.measure(&s), 20.0);
    assert_abs_diff_eq!(ErrorMetric::FunctionValue.measure(&s), 0.5);
    assert_abs_diff_eq!(ErrorMetric::IntervalWidth.measure(&s), 0.25);
  }

  #[test]
  fn test_relative_falls_back_near_zero() {
    let s = sample(1e-3, 0.0);
    assert_abs_diff_eq!(ErrorMetric::RelativePercent.measure(&s), 1e-3);
  }

  #[test]
  fn test_resolve() {
    assert_eq!(ErrorMetric::Auto.resolve(0.5, true), ErrorMetric::AbsoluteDifference);
    assert_eq!(ErrorMetric::Auto.resolve(5.0, false), ErrorMetric::RelativePercent);
    assert_eq!(ErrorMetric::IntervalWidth.resolve(1e-4, false), ErrorMetric::AbsoluteDifference);
    assert_eq!(ErrorMetric::IntervalWidth.resolve(1e-4, true), ErrorMetric::IntervalWidth);
  }

  #[test]
  fn test_operators() {
    assert!(ComparisonOperator::LessOrEqual.compare(1.0, 1.0));
    assert!(!ComparisonOperator::Less.compare(1.0, 1.0));
    assert!(ComparisonOperator::Greater.compare(2.0, 1.0));
    assert!(ComparisonOperator::GreaterOrEqual.compare(1.0, 1.0));
    assert!(ComparisonOperator::Equal.compare(1.0 + 1e-13, 1.0));
    assert!(!ComparisonOperator::Equal.compare(1.0 + 1e-9, 1.0));
  }

  #[test]
  fn test_first_iteration_always_runs() {
    let policy = ConvergencePolicy::new(1e-4, 1);
    assert!(policy.should_continue(0, None));
    assert!(!policy.should_continue(1, Some(50.0)));
  }

  #[test]
  fn test_termination() {
    let policy = ConvergencePolicy::new(1e-4, 10);
    assert_eq!(policy.termination(3, Some(1.0)), None);
    assert_eq!(policy.termination(3, Some(1e-5)), Some(PolicyStop::Converged));
    assert_eq!(policy.termination(10, Some(1.0)), Some(PolicyStop::IterationCap));
    assert_eq!(policy.termination(10, Some(1e-5)), Some(PolicyStop::Converged));
    let policy = policy.with_stop_by_threshold(false);
    assert_eq!(policy.termination(3, Some(1e-5)), None);
  }

  #[test]
  fn test_validate() {
    assert!(ConvergencePolicy::new(1e-4, 50).validate(100.0, 1000).is_ok());
    assert_eq!(
      ConvergencePolicy::new(0.0, 50).validate(100.0, 1000),
      Err(PolicyError::InvalidThreshold(0.0)),
    );
    assert!(ConvergencePolicy::new(f64::NAN, 50).validate(100.0, 1000).is_err());
    assert!(ConvergencePolicy::new(500.0, 50).validate(100.0, 1000).is_err());
    assert_eq!(ConvergencePolicy::new(1e-4, 0).validate(100.0, 1000), Err(PolicyError::ZeroIterations));
    assert!(ConvergencePolicy::new(1e-4, 5000).validate(100.0, 1000).is_err());
  }

  #[test]
  fn test_parse() {
    assert_eq!("<=".parse::<ComparisonOperator>().unwrap(), ComparisonOperator::LessOrEqual);
    assert_eq!("==".parse::<ComparisonOperator>().unwrap(), ComparisonOperator::Equal);
    assert!("~".parse::<ComparisonOperator>().is_err());
    assert_eq!("relative".parse::<ErrorMetric>().unwrap(), ErrorMetric::RelativePercent);
    assert_eq!("Function_Value".parse::<ErrorMetric>().unwrap(), ErrorMetric::FunctionValue);
    assert!("bogus".parse::<ErrorMetric>().is_err());
  }

  #[test]
  fn test_serde() {
    let json = serde_json::to_string(&ComparisonOperator::GreaterOrEqual).unwrap();
    assert_eq!(json, "\">=\"");
    let metric: ErrorMetric = serde_json::from_str("\"absolute\"").unwrap();
    assert_eq!(metric, ErrorMetric::AbsoluteDifference);
  }
}
