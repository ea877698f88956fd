
//! How a solve ended.

use crate::method::MethodKind;
use crate::trace::{Severity, SolveTrace};

use serde::{Serialize, Deserialize};

use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolveStatus {
  Converged,
  Diverged,
  MaxIterationsReached,
  ZeroDerivative,
  NumericalError,
  Oscillating,
  DomainError,
}

/// The outcome of running one method on one function.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
  /// The best estimate, for statuses that carry one.
  pub root: Option<f64>,
  pub trace: SolveTrace,
  pub status: SolveStatus,
  pub method: MethodKind,
  /// For Fixed Point, the text of the `g(x)` that was iterated.
  pub iteration_function: Option<String>,
}

impl SolveStatus {
  pub const ALL: [SolveStatus; 7] = [
    SolveStatus::Converged,
    SolveStatus::Diverged,
    SolveStatus::MaxIterationsReached,
    SolveStatus::ZeroDerivative,
    SolveStatus::NumericalError,
    SolveStatus::Oscillating,
    SolveStatus::DomainError,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      SolveStatus::Converged => "converged",
      SolveStatus::Diverged => "diverged",
      SolveStatus::MaxIterationsReached => "max-iterations-reached",
      SolveStatus::ZeroDerivative => "zero-derivative",
      SolveStatus::NumericalError => "numerical-error",
      SolveStatus::Oscillating => "oscillating",
      SolveStatus::DomainError => "domain-error",
    }
  }

  /// Whether a solve ending this way reports its last estimate as the
  /// root.
  pub fn carries_root(self) -> bool {
    matches!(
      self,
      SolveStatus::Converged | SolveStatus::MaxIterationsReached | SolveStatus::Oscillating | SolveStatus::ZeroDerivative,
    )
  }

  /// Severity of the closing annotation.
  pub fn severity(self) -> Severity {
    match self {
      SolveStatus::Converged => Severity::Info,
      SolveStatus::MaxIterationsReached | SolveStatus::Oscillating | SolveStatus::ZeroDerivative => Severity::Warning,
      SolveStatus::Diverged | SolveStatus::NumericalError | SolveStatus::DomainError => Severity::Error,
    }
  }
}

impl SolveResult {
  /// Closes `trace` with an annotation carrying `message` and builds
  /// the result. `estimate` is reported as the root only if `status`
  /// carries one.
  pub fn finish(
    method: MethodKind,
    mut trace: SolveTrace,
    status: SolveStatus,
    estimate: Option<f64>,
    message: impl Into<String>,
  ) -> Self {
    trace.annotate(status.severity(), message);
    let root = estimate.filter(|_| status.carries_root());
    log::debug!("{method} finished: {status} (root {root:?})");
    Self { root, trace, status, method, iteration_function: None }
  }

  pub fn with_iteration_function(mut self, g: impl Into<String>) -> Self {
    self.iteration_function = Some(g.into());
    self
  }

  /// Human-readable explanation of how the solve ended.
  pub fn message(&self) -> Option<&str> {
    self.trace.final_annotation().map(|a| a.message.as_str())
  }
}

impl Display for SolveStatus {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
