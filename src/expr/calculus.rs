
//! Symbolic differentiation.

use super::Expr;
use super::atom::Atom;
use super::var::Var;
use super::function::FunctionTable;
use super::simplifier::simplify;

use thiserror::Error;

#[derive(Debug)]
pub struct DerivativeEngine<'a> {
  target_variable: &'a Var,
  function_table: &'a FunctionTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DifferentiationError {
  #[error("Derivative of function '{0}' is not known")]
  UnknownDerivative(String),
  #[error("Function '{name}' expects {expected} argument(s) but was given {actual}")]
  WrongArity { name: String, expected: usize, actual: usize },
}

impl<'a> DerivativeEngine<'a> {
  pub fn new(target_variable: &'a Var, function_table: &'a FunctionTable) -> Self {
    Self { target_variable, function_table }
  }

  pub fn target_variable(&self) -> &Var {
    self.target_variable
  }

  /// Whether `expr` depends on the variable of differentiation.
  pub fn depends_on(&self, expr: &Expr) -> bool {
    expr.contains_var(self.target_variable)
  }

  pub fn differentiate(&self, expr: &Expr) -> Result<Expr, DifferentiationError> {
    match expr {
      Expr::Call(function, args) => {
        let Some(known_function) = self.function_table.get(function) else {
          return Err(DifferentiationError::UnknownDerivative(function.clone()));
        };
        known_function.differentiate(args, self)
      }
      Expr::Atom(Atom::Number(_)) => {
        Ok(Expr::zero())
      }
      Expr::Atom(Atom::Var(var)) => {
        if var == self.target_variable {
          Ok(Expr::one())
        } else {
          Ok(Expr::zero())
        }
      }
    }
  }
}

/// Differentiates `expr` with respect to `var` and simplifies the
/// result.
pub fn differentiate(function_table: &FunctionTable, expr: &Expr, var: &Var) -> Result<Expr, DifferentiationError> {
  let engine = DerivativeEngine::new(var, function_table);
  let derivative = engine.differentiate(expr)?;
  Ok(simplify(derivative))
}
