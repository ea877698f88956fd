
//! Entry point of the engine: validates a request, compiles the
//! function, and runs the requested method.

use crate::convergence::{ConvergencePolicy, PolicyError};
use crate::expr::parser::ParseError;
use crate::expression::Expression;
use crate::history::{SolutionRecord, SolutionSink};
use crate::method::{
  Bisection, FalsePosition, FixedPoint, MethodKind, MethodParams, NewtonRaphson,
  RootFinder, Secant, UnknownMethodError,
};
use crate::settings::{SolverSettings, ITERATION_LIMIT};
use crate::status::SolveResult;
use crate::trace::{Severity, SolveTrace};

use thiserror::Error;

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// One request to find a root.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveRequest {
  /// The method's name, in any spelling [`MethodKind`] accepts.
  pub method: String,
  /// The text of `f(x)`.
  pub function: String,
  pub params: MethodParams,
  /// Defaults to the policy described by the solver's settings.
  pub policy: Option<ConvergencePolicy>,
  /// Defaults to the settings' precision.
  pub decimal_places: Option<u32>,
}

/// A request that was rejected before any method ran.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SolveError {
  #[error("Invalid function: {0}")]
  Parse(#[from] ParseError),
  #[error("{0}")]
  UnknownMethod(#[from] UnknownMethodError),
  #[error("Invalid parameters: {0}")]
  InvalidParameters(String),
  #[error("Invalid convergence policy: {0}")]
  InvalidPolicy(#[from] PolicyError),
}

#[derive(Clone, Default)]
pub struct Solver {
  settings: SolverSettings,
  sink: Option<Arc<dyn SolutionSink + Send + Sync>>,
}

impl SolveRequest {
  pub fn new(method: impl Into<String>, function: impl Into<String>, params: MethodParams) -> Self {
    Self {
      method: method.into(),
      function: function.into(),
      params,
      policy: None,
      decimal_places: None,
    }
  }

  pub fn with_policy(mut self, policy: ConvergencePolicy) -> Self {
    self.policy = Some(policy);
    self
  }

  pub fn with_decimal_places(mut self, decimal_places: u32) -> Self {
    self.decimal_places = Some(decimal_places);
    self
  }
}

impl SolveError {
  /// The rejection as a trace: a single error annotation.
  pub fn into_trace(self) -> SolveTrace {
    let mut trace = SolveTrace::new();
    trace.annotate(Severity::Error, self.to_string());
    trace
  }
}

impl Solver {
  pub fn new(settings: SolverSettings) -> Self {
    Self { settings: settings.validated(), sink: None }
  }

  pub fn with_sink(mut self, sink: Arc<dyn SolutionSink + Send + Sync>) -> Self {
    self.sink = Some(sink);
    self
  }

  pub fn settings(&self) -> &SolverSettings {
    &self.settings
  }

  pub fn solve(&self, request: SolveRequest) -> Result<SolveResult, SolveError> {
    let kind = request.method.parse::<MethodKind>().inspect_err(|err| {
      log::warn!("Rejected request: {err}");
    })?;
    let function = Expression::compile(&request.function).inspect_err(|err| {
      log::warn!("Rejected function '{}': {err}", request.function);
    })?;
    let finder = self.finder(kind, &request.params).inspect_err(|err| {
      log::warn!("Rejected {kind} parameters: {err}");
    })?;
    let policy = request.policy.unwrap_or_else(|| self.settings.default_policy());
    policy.validate(self.settings.max_threshold, ITERATION_LIMIT).inspect_err(|err| {
      log::warn!("Rejected policy: {err}");
    })?;

    log::debug!("Solving {function} = 0 by {kind} from {:?} with {policy:?}", request.params);
    let result = finder.solve(&function, &policy);
    self.save(&request, &function, &result);
    Ok(result)
  }

  fn finder(&self, kind: MethodKind, params: &MethodParams) -> Result<Box<dyn RootFinder>, SolveError> {
    if let Some(value) = params.values().into_iter().find(|v| !v.is_finite()) {
      return Err(SolveError::InvalidParameters(format!("{value} is not a finite number")));
    }
    let finder: Box<dyn RootFinder> = match (kind, params) {
      (MethodKind::Bisection | MethodKind::FalsePosition, &MethodParams::Bracket { lower, upper }) => {
        if lower >= upper {
          return Err(SolveError::InvalidParameters(format!("Xl = {lower} must be less than Xu = {upper}")));
        }
        if kind == MethodKind::Bisection {
          Box::new(Bisection::new(lower, upper))
        } else {
          Box::new(FalsePosition::new(lower, upper))
        }
      }
      (MethodKind::NewtonRaphson, &MethodParams::Start { initial }) => {
        Box::new(NewtonRaphson::new(initial))
      }
      (MethodKind::FixedPoint, &MethodParams::Start { initial }) => {
        Box::new(FixedPoint::new(initial))
      }
      (MethodKind::FixedPoint, MethodParams::FixedPoint { initial, iteration_function }) => {
        let mut finder = FixedPoint::new(*initial);
        if let Some(g) = iteration_function {
          finder = finder.with_iteration_function(Expression::compile(g)?);
        }
        Box::new(finder)
      }
      (MethodKind::Secant, &MethodParams::Seeds { previous, initial }) => {
        if previous == initial {
          return Err(SolveError::InvalidParameters(format!("Secant seeds must differ, both are {initial}")));
        }
        Box::new(Secant::new(previous, initial))
      }
      (kind, params) => {
        return Err(SolveError::InvalidParameters(format!("{kind} cannot start from {params:?}")));
      }
    };
    Ok(finder)
  }

  fn save(&self, request: &SolveRequest, function: &Expression, result: &SolveResult) {
    let (Some(sink), Some(root)) = (&self.sink, result.root) else {
      return;
    };
    if !self.settings.auto_save {
      return;
    }
    let decimal_places = request.decimal_places.unwrap_or(self.settings.decimal_places);
    let record = SolutionRecord {
      function: function.source().to_owned(),
      method: result.method,
      root,
      trace: result.trace.to_table(decimal_places),
    };
    sink.offer(&record);
  }
}

impl Debug for Solver {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.debug_struct("Solver")
      .field("settings", &self.settings)
      .field("sink", &self.sink.as_ref().map(|_| "..."))
      .finish()
  }
}
