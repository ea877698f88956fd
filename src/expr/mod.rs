//! Expression trees for real-valued functions of one variable, and
//! everything that operates on them: parsing, display, simplification,
//! differentiation, algebraic rewriting, and compilation to an
//! evaluable program.

pub mod algebra;
pub mod atom;
pub mod calculus;
pub mod compiled;
pub mod display;
pub mod function;
pub mod normalize;
pub mod parser;
pub mod simplifier;
pub mod tokenizer;
pub mod var;
pub mod walker;

use atom::Atom;
use var::Var;

use std::ops::{Add, Sub, Mul, Div, Neg};

/// An expression is either an atomic value or a function applied to
/// arguments. Arithmetic operators are calls too, named by their
/// symbol (`"+"`, `"-"`, `"*"`, `"/"`, `"^"`), and unary minus is the
/// call `"negate"`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Atom(Atom),
  Call(String, Vec<Expr>),
}

impl Expr {
  /// Convenience constructor for [Expr::Call].
  pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call(name.to_string(), args)
  }

  pub fn number(n: f64) -> Expr {
    Expr::Atom(Atom::Number(n))
  }

  pub fn var(v: Var) -> Expr {
    Expr::Atom(Atom::Var(v))
  }

  pub fn zero() -> Expr {
    Expr::number(0.0)
  }

  pub fn one() -> Expr {
    Expr::number(1.0)
  }

  pub fn pow(self, other: Expr) -> Expr {
    Expr::call("^", vec![self, other])
  }

  /// Applies a one-argument function such as `sin` or `ln`.
  pub fn apply(function: &str, arg: Expr) -> Expr {
    Expr::call(function, vec![arg])
  }

  /// If this expression is a numerical literal, returns its value.
  pub fn as_number(&self) -> Option<f64> {
    match self {
      Expr::Atom(Atom::Number(n)) => Some(*n),
      _ => None,
    }
  }

  pub fn is_number(&self, value: f64) -> bool {
    self.as_number() == Some(value)
  }

  /// If this expression is a call to `name`, returns its arguments.
  pub fn as_call(&self, name: &str) -> Option<&[Expr]> {
    match self {
      Expr::Call(function, args) if function == name => Some(args),
      _ => None,
    }
  }

  pub fn is_var(&self, var: &Var) -> bool {
    matches!(self, Expr::Atom(Atom::Var(v)) if v == var)
  }

  pub fn contains_var(&self, var: &Var) -> bool {
    walker::any(self, |e| e.is_var(var))
  }

  /// Number of times `var` occurs in this expression.
  pub fn count_var(&self, var: &Var) -> usize {
    walker::count(self, |e| e.is_var(var))
  }

  pub fn substitute_var(self, var: &Var, value: &Expr) -> Expr {
    walker::postorder_walk_ok(self, |e| {
      if e.is_var(var) { value.clone() } else { e }
    })
  }
}

impl Add for Expr {
  type Output = Expr;

  fn add(self, other: Expr) -> Expr {
    Expr::call("+", vec![self, other])
  }
}

impl Sub for Expr {
  type Output = Expr;

  fn sub(self, other: Expr) -> Expr {
    Expr::call("-", vec![self, other])
  }
}

impl Mul for Expr {
  type Output = Expr;

  fn mul(self, other: Expr) -> Expr {
    Expr::call("*", vec![self, other])
  }
}

impl Div for Expr {
  type Output = Expr;

  fn div(self, other: Expr) -> Expr {
    Expr::call("/", vec![self, other])
  }
}

impl Neg for Expr {
  type Output = Expr;

  fn neg(self) -> Expr {
    Expr::call("negate", vec![self])
  }
}

impl From<Atom> for Expr {
  fn from(a: Atom) -> Expr {
    Expr::Atom(a)
  }
}

impl From<f64> for Expr {
  fn from(n: f64) -> Expr {
    Expr::number(n)
  }
}

impl From<Var> for Expr {
  fn from(v: Var) -> Expr {
    Expr::var(v)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn x() -> Expr {
    Expr::var(Var::x())
  }

  #[test]
  fn test_count_var() {
    let expr = x().pow(Expr::number(3.0)) - Expr::number(7.89) * x();
    assert_eq!(expr.count_var(&Var::x()), 2);
    assert!(expr.contains_var(&Var::x()));
    assert!(!Expr::number(1.0).contains_var(&Var::x()));
  }

  #[test]
  fn test_substitute_var() {
    let expr = x() + Expr::one();
    let substituted = expr.substitute_var(&Var::x(), &Expr::number(2.0));
    assert_eq!(substituted, Expr::number(2.0) + Expr::one());
  }

  #[test]
  fn test_as_call() {
    let expr = Expr::apply("sin", x());
    assert_eq!(expr.as_call("sin"), Some(&[x()][..]));
    assert_eq!(expr.as_call("cos"), None);
  }
}
