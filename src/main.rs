
//! Command-line front end: solve one equation and print the trace.

use rootsolve::convergence::{ComparisonOperator, ErrorMetric};
use rootsolve::method::{MethodKind, MethodParams};
use rootsolve::settings::SolverSettings;
use rootsolve::solver::{SolveRequest, Solver};
use rootsolve::status::SolveResult;
use rootsolve::trace::DisplayTable;
use rootsolve::util::round_to;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use env_logger::Env;
use itertools::Itertools;

use std::path::PathBuf;

/// Find a root of a single-variable function by an iterative method
#[derive(Debug, Parser)]
#[command(
  name = "rootsolve",
  version,
  after_help = r#"
Methods:
  bisection, false-position   need --xl and --xu
  newton-raphson              needs --x0
  fixed-point                 needs --x0, and optionally --g
  secant                      needs --x-prev and --x0

Examples:
  rootsolve bisection "x^2 - 4" --xl 0 --xu 3
  rootsolve newton-raphson "x^3 - 7.89x - 11" --x0 3 --threshold 1e-8
  rootsolve fixed-point "x^2 - 2" --x0 1 --g "(x + 2/x) / 2"

Environment Variables:
  ROOTSOLVE_CONFIG=<path>   Path to a JSON settings file
  RUST_LOG=debug            Set log level (error, warn, info, debug, trace)
"#
)]
struct Cli {
  /// Method name
  method: String,

  /// The function f(x)
  function: String,

  /// Lower end of the bracket
  #[arg(long, allow_negative_numbers = true)]
  xl: Option<f64>,

  /// Upper end of the bracket
  #[arg(long, allow_negative_numbers = true)]
  xu: Option<f64>,

  /// Starting estimate
  #[arg(long, allow_negative_numbers = true)]
  x0: Option<f64>,

  /// Estimate preceding --x0, for the secant method
  #[arg(long, allow_negative_numbers = true)]
  x_prev: Option<f64>,

  /// Explicit iteration function g(x), for the fixed-point method
  #[arg(long)]
  g: Option<String>,

  /// Convergence threshold
  #[arg(long)]
  threshold: Option<f64>,

  /// Comparison between the error and the threshold (<=, >=, <, >, =)
  #[arg(long)]
  operator: Option<ComparisonOperator>,

  /// Error metric (absolute, relative, function-value, interval-width, auto)
  #[arg(long)]
  metric: Option<ErrorMetric>,

  /// Maximum number of iterations
  #[arg(long)]
  max_iterations: Option<usize>,

  /// What stops the iteration
  #[arg(long, value_enum)]
  stop_by: Option<StopBy>,

  /// Digits after the decimal point in the printed trace
  #[arg(long)]
  decimal_places: Option<u32>,

  /// Settings file
  #[arg(long, env = "ROOTSOLVE_CONFIG")]
  config: Option<PathBuf>,

  /// Print the result as JSON
  #[arg(long)]
  json: bool,

  /// More logging (-v for debug, -vv for trace)
  #[arg(short, long, action = ArgAction::Count)]
  verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StopBy {
  /// Stop when the error meets the threshold, or at the cap
  Threshold,
  /// Always run to the iteration cap
  Iterations,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let mut logger = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
  match cli.verbose {
    0 => {}
    1 => { logger.filter_level(log::LevelFilter::Debug); }
    _ => { logger.filter_level(log::LevelFilter::Trace); }
  }
  logger.init();

  let settings = match &cli.config {
    Some(path) => SolverSettings::load(path)
      .with_context(|| format!("Failed to load settings from {}", path.display()))?,
    None => SolverSettings::default(),
  };
  let decimal_places = cli.decimal_places.unwrap_or(settings.decimal_places);
  let request = build_request(&cli, &settings)?.with_decimal_places(decimal_places);
  let solver = Solver::new(settings);

  let result = match solver.solve(request) {
    Ok(result) => result,
    Err(err) => {
      if cli.json {
        let table = err.clone().into_trace().to_table(decimal_places);
        let output = serde_json::json!({ "root": null, "status": null, "table": table });
        println!("{}", serde_json::to_string_pretty(&output)?);
      }
      return Err(err).context("Request rejected");
    }
  };

  if cli.json {
    print_json(&cli, &result, decimal_places)?;
  } else {
    print_text(&result, decimal_places);
  }
  Ok(())
}

fn build_request(cli: &Cli, settings: &SolverSettings) -> Result<SolveRequest> {
  let kind: MethodKind = cli.method.parse()?;
  let params = match kind {
    MethodKind::Bisection | MethodKind::FalsePosition => {
      let (Some(lower), Some(upper)) = (cli.xl, cli.xu) else {
        bail!("{kind} needs --xl and --xu");
      };
      MethodParams::Bracket { lower, upper }
    }
    MethodKind::NewtonRaphson => {
      let Some(initial) = cli.x0 else {
        bail!("{kind} needs --x0");
      };
      MethodParams::Start { initial }
    }
    MethodKind::FixedPoint => {
      let Some(initial) = cli.x0 else {
        bail!("{kind} needs --x0");
      };
      MethodParams::FixedPoint { initial, iteration_function: cli.g.clone() }
    }
    MethodKind::Secant => {
      let (Some(previous), Some(initial)) = (cli.x_prev, cli.x0) else {
        bail!("{kind} needs --x-prev and --x0");
      };
      MethodParams::Seeds { previous, initial }
    }
  };

  let mut policy = settings.default_policy();
  if let Some(threshold) = cli.threshold {
    policy.threshold = threshold;
  }
  if let Some(operator) = cli.operator {
    policy.operator = operator;
  }
  if let Some(metric) = cli.metric {
    policy.metric = metric;
  }
  if let Some(max_iterations) = cli.max_iterations {
    policy.max_iterations = max_iterations;
  }
  if let Some(stop_by) = cli.stop_by {
    policy.stop_by_threshold = stop_by == StopBy::Threshold;
  }

  Ok(SolveRequest::new(&cli.method, &cli.function, params).with_policy(policy))
}

fn print_text(result: &SolveResult, decimal_places: u32) {
  if let Some(g) = &result.iteration_function {
    println!("g(x) = {g}");
  }
  print_table(&result.trace.to_table(decimal_places));
  println!();
  match result.root {
    Some(root) => println!("Root: {}", round_to(root, decimal_places)),
    None => println!("Root: none"),
  }
  println!("Status: {}", result.status);
}

/// Prints iteration rows as aligned columns and annotation rows as
/// plain lines.
fn print_table(table: &DisplayTable) {
  let iteration_rows = table.rows().iter().filter(|row| row.cells().len() > 1);
  let mut widths: Vec<usize> = Vec::new();
  let mut header: Vec<&str> = Vec::new();
  for row in iteration_rows {
    for (i, (label, value)) in row.cells().iter().enumerate() {
      let width = label.len().max(value.to_string().len());
      match widths.get_mut(i) {
        Some(w) => *w = (*w).max(width),
        None => {
          widths.push(width);
          header.push(label);
        }
      }
    }
  }
  if !header.is_empty() {
    println!("{}", header.iter().zip(&widths).map(|(label, w)| format!("{label:>w$}")).join("  "));
  }
  for row in table.rows() {
    match row.cells() {
      [(severity, message)] => println!("[{severity}] {message}"),
      cells => {
        println!("{}", cells.iter().zip(&widths).map(|((_, value), w)| format!("{:>w$}", value.to_string())).join("  "));
      }
    }
  }
}

fn print_json(cli: &Cli, result: &SolveResult, decimal_places: u32) -> Result<()> {
  let output = serde_json::json!({
    "function": cli.function,
    "method": result.method,
    "root": result.root.map(|root| round_to(root, decimal_places)),
    "status": result.status,
    "iteration_function": result.iteration_function,
    "message": result.message(),
    "table": result.trace.to_table(decimal_places),
  });
  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}
