
//! User-adjustable defaults for the solver.

use crate::convergence::{ComparisonOperator, ConvergencePolicy, ErrorMetric};
use crate::util::clamp;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Smallest threshold a policy may carry.
pub const MIN_EPSILON: f64 = 1e-10;

/// Upper bound on any configured iteration cap.
pub const ITERATION_LIMIT: usize = 1000;

pub const MAX_DECIMAL_PLACES: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
  pub decimal_places: u32,
  pub max_iterations: usize,
  pub epsilon: f64,
  pub stop_by_epsilon: bool,
  pub operator: ComparisonOperator,
  pub metric: ErrorMetric,
  /// The largest threshold a request may ask for.
  pub max_threshold: f64,
  /// Whether successful solves are offered to the history sink.
  pub auto_save: bool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
  #[error("Could not read settings from {path}: {source}")]
  Io { path: PathBuf, source: io::Error },
  #[error("Invalid settings: {0}")]
  Json(#[from] serde_json::Error),
}

impl SolverSettings {
  pub const DEFAULT_DECIMAL_PLACES: u32 = 6;
  pub const DEFAULT_MAX_THRESHOLD: f64 = 100.0;

  /// A copy with every value forced into its valid range.
  pub fn validated(self) -> Self {
    let max_threshold = if self.max_threshold.is_finite() && self.max_threshold >= MIN_EPSILON {
      self.max_threshold
    } else {
      Self::DEFAULT_MAX_THRESHOLD
    };
    let epsilon = if self.epsilon.is_nan() {
      ConvergencePolicy::DEFAULT_THRESHOLD.min(max_threshold)
    } else {
      clamp(self.epsilon, MIN_EPSILON, max_threshold)
    };
    Self {
      decimal_places: clamp(self.decimal_places, 1, MAX_DECIMAL_PLACES),
      max_iterations: clamp(self.max_iterations, 1, ITERATION_LIMIT),
      epsilon,
      max_threshold,
      ..self
    }
  }

  /// Parses settings from JSON. Missing keys take their defaults and
  /// out-of-range values are clamped.
  pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
    let settings: SolverSettings = serde_json::from_str(json)?;
    Ok(settings.validated())
  }

  /// Loads settings from `path`. A missing file yields the defaults.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
      Ok(json) => Self::from_json_str(&json),
      Err(err) if err.kind() == io::ErrorKind::NotFound => {
        log::info!("No settings file at {}; using defaults", path.display());
        Ok(Self::default())
      }
      Err(source) => Err(SettingsError::Io { path: path.to_owned(), source }),
    }
  }

  /// The policy a request gets when it does not carry its own.
  pub fn default_policy(&self) -> ConvergencePolicy {
    ConvergencePolicy::new(self.epsilon, self.max_iterations)
      .with_metric(self.metric)
      .with_operator(self.operator)
      .with_stop_by_threshold(self.stop_by_epsilon)
  }
}

impl Default for SolverSettings {
  fn default() -> Self {
    Self {
      decimal_places: Self::DEFAULT_DECIMAL_PLACES,
      max_iterations: ConvergencePolicy::DEFAULT_MAX_ITERATIONS,
      epsilon: ConvergencePolicy::DEFAULT_THRESHOLD,
      stop_by_epsilon: true,
      operator: ComparisonOperator::default(),
      metric: ErrorMetric::default(),
      max_threshold: Self::DEFAULT_MAX_THRESHOLD,
      auto_save: true,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_keys_take_defaults() {
    let settings = SolverSettings::from_json_str(r#"{"decimal_places": 3}"#).unwrap();
    assert_eq!(settings, SolverSettings { decimal_places: 3, ..SolverSettings::default() });
  }

  #[test]
  fn test_out_of_range_values_are_clamped() {
    let json = r#"{"decimal_places": 40, "max_iterations": 0, "epsilon": 500.0, "max_threshold": 50.0}"#;
    let settings = SolverSettings::from_json_str(json).unwrap();
    assert_eq!(settings.decimal_places, 20);
    assert_eq!(settings.max_iterations, 1);
    assert_eq!(settings.epsilon, 50.0);

    let settings = SolverSettings::from_json_str(r#"{"epsilon": 0.0}"#).unwrap();
    assert_eq!(settings.epsilon, MIN_EPSILON);
  }

  #[test]
  fn test_operator_and_metric_spellings() {
    let json = r#"{"operator": "<", "metric": "absolute-difference", "stop_by_epsilon": false}"#;
    let settings = SolverSettings::from_json_str(json).unwrap();
    let policy = settings.default_policy();
    assert_eq!(policy.operator, ComparisonOperator::Less);
    assert_eq!(policy.metric, ErrorMetric::AbsoluteDifference);
    assert!(!policy.stop_by_threshold);
  }

  #[test]
  fn test_invalid_json() {
    let err = SolverSettings::from_json_str("{").unwrap_err();
    assert!(matches!(err, SettingsError::Json(_)));
  }

  #[test]
  fn test_missing_file() {
    let settings = SolverSettings::load("/nonexistent/rootsolve/settings.json").unwrap();
    assert_eq!(settings, SolverSettings::default());
  }
}
