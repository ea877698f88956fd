//! The table of functions (and arithmetic operators) an expression
//! may call. Each entry knows how to evaluate itself on real numbers
//! and how to differentiate itself symbolically.

mod library;

use super::Expr;
use super::compiled::EvalFault;
use super::calculus::{DerivativeEngine, DifferentiationError};

use once_cell::sync::Lazy;

use std::collections::HashMap;

pub type UnaryEval = fn(f64) -> Result<f64, EvalFault>;
pub type BinaryEval = fn(f64, f64) -> Result<f64, EvalFault>;

/// Computes the derivative of a call to a function, given the call's
/// arguments. The engine is used to differentiate the arguments
/// themselves (chain rule).
pub type DerivativeRule = fn(&[Expr], &DerivativeEngine<'_>) -> Result<Expr, DifferentiationError>;

/// The functions available to every function text.
pub static STANDARD_FUNCTIONS: Lazy<FunctionTable> = Lazy::new(library::standard_functions);

#[derive(Debug, Clone, Copy)]
pub enum Evaluator {
  Unary(UnaryEval),
  Binary(BinaryEval),
}

#[derive(Debug, Clone)]
pub struct Function {
  name: &'static str,
  evaluator: Evaluator,
  derivative: DerivativeRule,
}

#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
  mapping: HashMap<&'static str, Function>,
}

impl Function {
  pub fn unary(name: &'static str, eval: UnaryEval, derivative: DerivativeRule) -> Self {
    Self { name, evaluator: Evaluator::Unary(eval), derivative }
  }

  pub fn binary(name: &'static str, eval: BinaryEval, derivative: DerivativeRule) -> Self {
    Self { name, evaluator: Evaluator::Binary(eval), derivative }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn arity(&self) -> usize {
    match self.evaluator {
      Evaluator::Unary(_) => 1,
      Evaluator::Binary(_) => 2,
    }
  }

  pub fn evaluator(&self) -> Evaluator {
    self.evaluator
  }

  pub fn differentiate(&self, args: &[Expr], engine: &DerivativeEngine<'_>) -> Result<Expr, DifferentiationError> {
    if args.len() != self.arity() {
      return Err(DifferentiationError::WrongArity {
        name: self.name.to_owned(),
        expected: self.arity(),
        actual: args.len(),
      });
    }
    (self.derivative)(args, engine)
  }
}

impl FunctionTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, name: &str) -> Option<&Function> {
    self.mapping.get(name)
  }

  pub fn insert(&mut self, function: Function) -> Option<Function> {
    self.mapping.insert(function.name, function)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.mapping.contains_key(name)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Function> {
    self.mapping.values()
  }
}

impl FromIterator<Function> for FunctionTable {
  fn from_iter<I: IntoIterator<Item = Function>>(iter: I) -> Self {
    let mut table = FunctionTable::new();
    for function in iter {
      table.insert(function);
    }
    table
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_standard_table_has_operators_and_functions() {
    for name in ["+", "-", "*", "/", "^", "negate", "sin", "ln", "log", "root"] {
      assert!(STANDARD_FUNCTIONS.contains(name), "missing {name}");
    }
    assert_eq!(STANDARD_FUNCTIONS.get("root").unwrap().arity(), 2);
    assert_eq!(STANDARD_FUNCTIONS.get("sqrt").unwrap().arity(), 1);
    assert!(STANDARD_FUNCTIONS.get("gamma").is_none());
  }

  #[test]
  fn test_wrong_arity_derivative() {
    let var = crate::expr::var::Var::x();
    let engine = DerivativeEngine::new(&var, &STANDARD_FUNCTIONS);
    let sin = STANDARD_FUNCTIONS.get("sin").unwrap();
    let err = sin.differentiate(&[], &engine).unwrap_err();
    assert!(matches!(err, DifferentiationError::WrongArity { expected: 1, actual: 0, .. }));
  }
}
