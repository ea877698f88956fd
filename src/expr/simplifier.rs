
//! Bottom-up simplification of expression trees: constant folding and
//! the arithmetic identities that keep derivatives and rewritten
//! iteration functions readable.

use super::Expr;
use super::walker::postorder_walk_ok;
use super::function::{Evaluator, FunctionTable, STANDARD_FUNCTIONS};

pub trait Simplifier {
  /// Simplifies a single node, assuming its children are already
  /// simplified.
  fn simplify_expr_part(&self, expr: Expr) -> Expr;

  fn simplify_expr(&self, expr: Expr) -> Expr {
    postorder_walk_ok(expr, |e| self.simplify_expr_part(e))
  }
}

/// Evaluates calls whose arguments are all numerical literals. Calls
/// that would fault (`1 / 0`, `ln(-1)`) are left untouched so the
/// fault surfaces at evaluation time.
#[derive(Debug, Clone, Copy)]
pub struct ConstantFolder<'a> {
  table: &'a FunctionTable,
}

/// Removes additive and multiplicative identities, collapses double
/// negation, and turns addition of a negation into subtraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityRules;

/// Runs several simplifiers on each node, in order.
pub struct ChainedSimplifier<'a> {
  simplifiers: Vec<Box<dyn Simplifier + 'a>>,
}

impl<'a> ConstantFolder<'a> {
  pub fn new(table: &'a FunctionTable) -> Self {
    Self { table }
  }
}

impl<'a> ChainedSimplifier<'a> {
  pub fn new(simplifiers: Vec<Box<dyn Simplifier + 'a>>) -> Self {
    Self { simplifiers }
  }
}

impl Simplifier for ConstantFolder<'_> {
  fn simplify_expr_part(&self, expr: Expr) -> Expr {
    let Expr::Call(name, args) = &expr else {
      return expr;
    };
    let Some(function) = self.table.get(name) else {
      return expr;
    };
    let values: Option<Vec<f64>> = args.iter().map(Expr::as_number).collect();
    let folded = match (function.evaluator(), values.as_deref()) {
      (Evaluator::Unary(f), Some(&[a])) => f(a).ok(),
      (Evaluator::Binary(f), Some(&[a, b])) => f(a, b).ok(),
      _ => None,
    };
    match folded {
      Some(value) => Expr::number(value),
      None => expr,
    }
  }
}

impl Simplifier for IdentityRules {
  fn simplify_expr_part(&self, expr: Expr) -> Expr {
    let Expr::Call(name, mut args) = expr else {
      return expr;
    };
    match (name.as_str(), args.len()) {
      ("negate", 1) => {
        let arg = args.swap_remove(0);
        match arg {
          Expr::Call(inner, mut inner_args) if inner == "negate" && inner_args.len() == 1 => inner_args.swap_remove(0),
          Expr::Atom(super::atom::Atom::Number(n)) => Expr::number(-n),
          arg => -arg,
        }
      }
      ("+", 2) => {
        let b = args.pop().unwrap_or_else(Expr::zero);
        let a = args.pop().unwrap_or_else(Expr::zero);
        if a.is_number(0.0) {
          b
        } else if b.is_number(0.0) {
          a
        } else if let Some(negated) = negation_of(&b) {
          a - negated
        } else {
          a + b
        }
      }
      ("-", 2) => {
        let b = args.pop().unwrap_or_else(Expr::zero);
        let a = args.pop().unwrap_or_else(Expr::zero);
        if b.is_number(0.0) {
          a
        } else if a.is_number(0.0) {
          self.simplify_expr_part(-b)
        } else if let Some(negated) = negation_of(&b) {
          a + negated
        } else {
          a - b
        }
      }
      ("*", 2) => {
        let b = args.pop().unwrap_or_else(Expr::one);
        let a = args.pop().unwrap_or_else(Expr::one);
        if a.is_number(0.0) || b.is_number(0.0) {
          Expr::zero()
        } else if a.is_number(1.0) {
          b
        } else if b.is_number(1.0) {
          a
        } else if a.is_number(-1.0) {
          self.simplify_expr_part(-b)
        } else if b.is_number(-1.0) {
          self.simplify_expr_part(-a)
        } else {
          a * b
        }
      }
      ("/", 2) => {
        let b = args.pop().unwrap_or_else(Expr::one);
        let a = args.pop().unwrap_or_else(Expr::zero);
        if b.is_number(1.0) {
          a
        } else if a.is_number(0.0) && !b.is_number(0.0) {
          Expr::zero()
        } else {
          a / b
        }
      }
      ("^", 2) => {
        let b = args.pop().unwrap_or_else(Expr::one);
        let a = args.pop().unwrap_or_else(Expr::zero);
        if b.is_number(1.0) {
          a
        } else if b.is_number(0.0) || a.is_number(1.0) {
          Expr::one()
        } else {
          a.pow(b)
        }
      }
      _ => Expr::Call(name, args),
    }
  }
}

impl Simplifier for ChainedSimplifier<'_> {
  fn simplify_expr_part(&self, expr: Expr) -> Expr {
    self.simplifiers.iter().fold(expr, |expr, s| s.simplify_expr_part(expr))
  }
}

/// If `expr` is `-e` (or a negative literal), returns `e`.
fn negation_of(expr: &Expr) -> Option<Expr> {
  if let Some([inner]) = expr.as_call("negate") {
    return Some(inner.clone());
  }
  match expr.as_number() {
    Some(n) if n < 0.0 => Some(Expr::number(-n)),
    _ => None,
  }
}

pub fn default_simplifier() -> ChainedSimplifier<'static> {
  ChainedSimplifier::new(vec![
    Box::new(ConstantFolder::new(&STANDARD_FUNCTIONS)),
    Box::new(IdentityRules),
  ])
}

/// Simplifies `expr` with the default simplifier.
pub fn simplify(expr: Expr) -> Expr {
  default_simplifier().simplify_expr(expr)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::var::Var;

  fn x() -> Expr {
    Expr::var(Var::x())
  }

  #[test]
  fn test_constant_folding() {
    let expr = Expr::number(2.0) * Expr::number(3.0) + Expr::number(1.0);
    assert_eq!(simplify(expr), Expr::number(7.0));
  }

  #[test]
  fn test_faulting_constants_are_kept() {
    let expr = Expr::one() / Expr::zero();
    assert_eq!(simplify(expr.clone()), expr);
    let expr = Expr::apply("ln", Expr::number(-1.0));
    assert_eq!(simplify(expr.clone()), expr);
  }

  #[test]
  fn test_identities() {
    assert_eq!(simplify(x() + Expr::zero()), x());
    assert_eq!(simplify(Expr::zero() + x()), x());
    assert_eq!(simplify(x() * Expr::one()), x());
    assert_eq!(simplify(Expr::zero() * x()), Expr::zero());
    assert_eq!(simplify(x() / Expr::one()), x());
    assert_eq!(simplify(x().pow(Expr::one())), x());
    assert_eq!(simplify(x().pow(Expr::zero())), Expr::one());
    assert_eq!(simplify(Expr::zero() - x()), -x());
  }

  #[test]
  fn test_negation_rules() {
    assert_eq!(simplify(-(-x())), x());
    assert_eq!(simplify(x() + -x()), x() - x());
    assert_eq!(simplify(x() - Expr::number(-2.0)), x() + Expr::number(2.0));
    assert_eq!(simplify(Expr::number(-1.0) * x()), -x());
  }

  #[test]
  fn test_power_rule_output() {
    // 2 * x^(2 - 1) * 1 => 2 * x
    let expr = Expr::number(2.0) * x().pow(Expr::number(2.0) - Expr::one()) * Expr::one();
    assert_eq!(simplify(expr), Expr::number(2.0) * x());
  }
}
