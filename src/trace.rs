
//! The record of a solve: one row per iteration, plus annotations
//! explaining how the solve ended.
//!
//! Rows hold raw samples. Rounding and the textual tokens used for
//! non-finite values are applied only by [`SolveTrace::to_table`].

use crate::convergence::ErrorMetric;
use crate::expr::compiled::EvalFault;
use crate::util::round_to;

use serde::{Serialize, Serializer};
use serde::ser::SerializeMap;

use std::fmt::{self, Display, Formatter};

/// A value computed during an iteration, or the reason it could not
/// be computed.
pub type Sample = Result<f64, EvalFault>;

/// Placeholder for the error of the first iteration.
pub const NO_ERROR_TOKEN: &str = "---";

#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
  pub iteration: usize,
  /// Labeled values, in display order.
  pub fields: Vec<(&'static str, Sample)>,
  /// Absent on the first iteration.
  pub error: Option<f64>,
  pub metric: ErrorMetric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Info,
  Warning,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
  pub severity: Severity,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceRow {
  Iteration(IterationRecord),
  Annotation(Annotation),
}

/// Append-only, chronologically ordered rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolveTrace {
  rows: Vec<TraceRow>,
}

/// A formatted cell.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
  Integer(usize),
  Number(f64),
  Text(String),
}

/// A formatted row: ordered `(label, value)` pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayRow {
  cells: Vec<(String, DisplayValue)>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct DisplayTable {
  rows: Vec<DisplayRow>,
}

impl IterationRecord {
  pub fn new(iteration: usize, metric: ErrorMetric) -> Self {
    Self { iteration, fields: Vec::new(), error: None, metric }
  }

  pub fn field(mut self, label: &'static str, sample: Sample) -> Self {
    self.fields.push((label, sample));
    self
  }

  pub fn value(self, label: &'static str, value: f64) -> Self {
    self.field(label, Ok(value))
  }

  pub fn with_error(mut self, error: Option<f64>) -> Self {
    self.error = error;
    self
  }

  pub fn get(&self, label: &str) -> Option<Sample> {
    self.fields.iter().find(|(l, _)| *l == label).map(|(_, v)| *v)
  }

  /// Header of the error column.
  pub fn error_label(&self) -> &'static str {
    if self.metric.is_percentage() { "Error %" } else { "Error" }
  }
}

impl Severity {
  pub fn label(self) -> &'static str {
    match self {
      Severity::Info => "Info",
      Severity::Warning => "Warning",
      Severity::Error => "Error",
    }
  }
}

impl Annotation {
  pub fn new(severity: Severity, message: impl Into<String>) -> Self {
    Self { severity, message: message.into() }
  }
}

impl SolveTrace {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, record: IterationRecord) {
    log::trace!("iteration {}: {:?}", record.iteration, record.fields);
    self.rows.push(TraceRow::Iteration(record));
  }

  pub fn annotate(&mut self, severity: Severity, message: impl Into<String>) {
    self.rows.push(TraceRow::Annotation(Annotation::new(severity, message)));
  }

  pub fn rows(&self) -> &[TraceRow] {
    &self.rows
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn iterations(&self) -> impl Iterator<Item = &IterationRecord> {
    self.rows.iter().filter_map(|row| match row {
      TraceRow::Iteration(record) => Some(record),
      TraceRow::Annotation(_) => None,
    })
  }

  pub fn iteration_count(&self) -> usize {
    self.iterations().count()
  }

  pub fn last_iteration(&self) -> Option<&IterationRecord> {
    self.iterations().last()
  }

  /// The last annotation, which explains how the solve ended.
  pub fn final_annotation(&self) -> Option<&Annotation> {
    self.rows.iter().rev().find_map(|row| match row {
      TraceRow::Annotation(annotation) => Some(annotation),
      TraceRow::Iteration(_) => None,
    })
  }

  /// Formats every row for display, rounding numbers to
  /// `decimal_places`.
  pub fn to_table(&self, decimal_places: u32) -> DisplayTable {
    let rows = self.rows.iter().map(|row| match row {
      TraceRow::Iteration(record) => iteration_row(record, decimal_places),
      TraceRow::Annotation(annotation) => {
        let mut row = DisplayRow::default();
        row.push(annotation.severity.label(), DisplayValue::Text(annotation.message.clone()));
        row
      }
    }).collect();
    DisplayTable { rows }
  }
}

fn iteration_row(record: &IterationRecord, decimal_places: u32) -> DisplayRow {
  let mut row = DisplayRow::default();
  row.push("Iteration", DisplayValue::Integer(record.iteration));
  for (label, sample) in &record.fields {
    let value = match sample {
      Ok(value) => DisplayValue::number(*value, decimal_places),
      Err(_) => DisplayValue::Text(String::from("NaN")),
    };
    row.push(*label, value);
  }
  let error = match record.error {
    None => DisplayValue::Text(String::from(NO_ERROR_TOKEN)),
    Some(error) if record.metric.is_percentage() && error.is_finite() => {
      DisplayValue::Text(format!("{}%", round_to(error, decimal_places)))
    }
    Some(error) => DisplayValue::number(error, decimal_places),
  };
  row.push(record.error_label(), error);
  row
}

impl DisplayValue {
  /// A rounded number, or a textual token if `value` is not finite.
  pub fn number(value: f64, decimal_places: u32) -> Self {
    if value.is_nan() {
      DisplayValue::Text(String::from("NaN"))
    } else if value == f64::INFINITY {
      DisplayValue::Text(String::from("inf"))
    } else if value == f64::NEG_INFINITY {
      DisplayValue::Text(String::from("-inf"))
    } else {
      DisplayValue::Number(round_to(value, decimal_places))
    }
  }
}

impl DisplayRow {
  pub fn push(&mut self, label: impl Into<String>, value: DisplayValue) {
    self.cells.push((label.into(), value));
  }

  pub fn cells(&self) -> &[(String, DisplayValue)] {
    &self.cells
  }

  pub fn get(&self, label: &str) -> Option<&DisplayValue> {
    self.cells.iter().find(|(l, _)| l == label).map(|(_, v)| v)
  }
}

impl DisplayTable {
  pub fn rows(&self) -> &[DisplayRow] {
    &self.rows
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}

impl Display for DisplayValue {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      DisplayValue::Integer(n) => write!(f, "{n}"),
      DisplayValue::Number(x) => write!(f, "{x}"),
      DisplayValue::Text(s) => write!(f, "{s}"),
    }
  }
}

impl Serialize for DisplayValue {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      DisplayValue::Integer(n) => serializer.serialize_u64(*n as u64),
      DisplayValue::Number(x) => serializer.serialize_f64(*x),
      DisplayValue::Text(s) => serializer.serialize_str(s),
    }
  }
}

impl Serialize for DisplayRow {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.cells.len()))?;
    for (label, value) in &self.cells {
      map.serialize_entry(label, value)?;
    }
    map.end()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_trace() -> SolveTrace {
    let mut trace = SolveTrace::new();
    trace.push(
      IterationRecord::new(0, ErrorMetric::RelativePercent)
        .value("Xi", 3.0)
        .value("f(Xi)", 5.0)
        .value("Xi+1", 2.1666666666),
    );
    trace.push(
      IterationRecord::new(1, ErrorMetric::RelativePercent)
        .value("Xi", 2.1666666666)
        .field("f(Xi)", Err(EvalFault::DivisionByZero))
        .value("Xi+1", f64::INFINITY)
        .with_error(Some(38.461538)),
    );
    trace.annotate(Severity::Error, "Estimate is not a finite number");
    trace
  }

  #[test]
  fn test_iterations_and_annotations() {
    let trace = sample_trace();
    assert_eq!(trace.len(), 3);
    assert_eq!(trace.iteration_count(), 2);
    assert_eq!(trace.last_iteration().unwrap().iteration, 1);
    assert_eq!(trace.final_annotation().unwrap().severity, Severity::Error);
    assert_eq!(trace.last_iteration().unwrap().get("Xi"), Some(Ok(2.1666666666)));
  }

  #[test]
  fn test_to_table_formatting() {
    let table = sample_trace().to_table(4);
    let first = &table.rows()[0];
    assert_eq!(first.get("Xi+1"), Some(&DisplayValue::Number(2.1667)));
    assert_eq!(first.get("Error %"), Some(&DisplayValue::Text(String::from("---"))));
    let second = &table.rows()[1];
    assert_eq!(second.get("f(Xi)"), Some(&DisplayValue::Text(String::from("NaN"))));
    assert_eq!(second.get("Xi+1"), Some(&DisplayValue::Text(String::from("inf"))));
    assert_eq!(second.get("Error %"), Some(&DisplayValue::Text(String::from("38.4615%"))));
    let last = &table.rows()[2];
    assert_eq!(last.cells().len(), 1);
    assert_eq!(last.get("Error"), Some(&DisplayValue::Text(String::from("Estimate is not a finite number"))));
  }

  #[test]
  fn test_absolute_error_column() {
    let mut trace = SolveTrace::new();
    trace.push(IterationRecord::new(1, ErrorMetric::AbsoluteDifference).value("Xi", 1.0).with_error(Some(0.123456)));
    let table = trace.to_table(3);
    assert_eq!(table.rows()[0].get("Error"), Some(&DisplayValue::Number(0.123)));
  }

  #[test]
  fn test_serialization_preserves_order() {
    let json = serde_json::to_string(&sample_trace().to_table(2)).unwrap();
    assert!(json.starts_with(r#"[{"Iteration":0,"Xi":3.0,"f(Xi)":5.0,"Xi+1":2.17,"Error %":"---"}"#), "{json}");
    assert!(json.ends_with(r#"{"Error":"Estimate is not a finite number"}]"#), "{json}");
  }
}
