
//! Where finished solves go to be remembered.

use crate::method::MethodKind;
use crate::trace::DisplayTable;

use serde::Serialize;

use std::sync::{Mutex, PoisonError};

/// A solve worth keeping: the function, the method, the root it
/// found, and the formatted trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionRecord {
  pub function: String,
  pub method: MethodKind,
  pub root: f64,
  #[serde(rename = "table")]
  pub trace: DisplayTable,
}

/// Receives the solutions a [`Solver`](crate::solver::Solver) has
/// found.
pub trait SolutionSink {
  fn offer(&self, record: &SolutionRecord);
}

/// Keeps solutions in memory, oldest first.
#[derive(Debug, Default)]
pub struct MemoryHistory {
  records: Mutex<Vec<SolutionRecord>>,
}

impl MemoryHistory {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn records(&self) -> Vec<SolutionRecord> {
    self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  pub fn len(&self) -> usize {
    self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn clear(&self) {
    self.records.lock().unwrap_or_else(PoisonError::into_inner).clear();
  }
}

impl SolutionSink for MemoryHistory {
  fn offer(&self, record: &SolutionRecord) {
    log::debug!("Saving {} solution of {}", record.method, record.function);
    self.records.lock().unwrap_or_else(PoisonError::into_inner).push(record.clone());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(root: f64) -> SolutionRecord {
    SolutionRecord {
      function: String::from("x^2 - 4"),
      method: MethodKind::Bisection,
      root,
      trace: DisplayTable::default(),
    }
  }

  #[test]
  fn test_memory_history() {
    let history = MemoryHistory::new();
    assert!(history.is_empty());
    history.offer(&record(2.0));
    history.offer(&record(-2.0));
    let roots: Vec<f64> = history.records().iter().map(|r| r.root).collect();
    assert_eq!(roots, vec![2.0, -2.0]);
    history.clear();
    assert!(history.is_empty());
  }

  #[test]
  fn test_record_serialization() {
    let json = serde_json::to_string(&record(2.0)).unwrap();
    assert_eq!(json, r#"{"function":"x^2 - 4","method":"Bisection","root":2.0,"table":[]}"#);
  }
}
