
//! Solving `lhs = rhs` for a variable that occurs exactly once in
//! `lhs`, by inverting each operation on the path from the root of
//! `lhs` down to the variable.

use crate::expr::Expr;
use crate::expr::var::Var;
use crate::expr::simplifier::simplify;

use std::f64::consts::{LN_10, LN_2};

/// Function heads [`isolate`] knows how to invert, other than the
/// arithmetic operators.
pub const INVERTIBLE_FUNCTIONS: &[&str] = &[
  "exp", "ln", "log", "log10", "log2",
  "sin", "cos", "tan", "asin", "acos", "atan",
  "sqrt", "cbrt", "root",
];

/// Solves `lhs = rhs` for `var`. Returns `None` unless `var` occurs
/// exactly once in `lhs`, not at all in `rhs`, and every operation on
/// the path to it can be inverted. Inverses take the principal branch
/// (`sin(u) = r` gives `u = asin(r)`).
pub fn isolate(lhs: &Expr, rhs: Expr, var: &Var) -> Option<Expr> {
  if lhs.count_var(var) != 1 || rhs.contains_var(var) {
    return None;
  }
  isolate_impl(lhs, rhs, var).map(simplify)
}

/// Like [`isolate`], but `rhs` may itself mention `var`. The result is
/// then an equation `var = g(var)` rather than a closed form.
pub fn isolate_in_place(lhs: &Expr, rhs: Expr, var: &Var) -> Option<Expr> {
  if lhs.count_var(var) != 1 {
    return None;
  }
  isolate_impl(lhs, rhs, var).map(simplify)
}

fn isolate_impl(lhs: &Expr, rhs: Expr, var: &Var) -> Option<Expr> {
  if lhs.is_var(var) {
    return Some(rhs);
  }
  let Expr::Call(name, args) = lhs else {
    return None;
  };
  match (name.as_str(), args.as_slice()) {
    ("+", [a, b]) => {
      if a.contains_var(var) {
        isolate_impl(a, rhs - b.clone(), var)
      } else {
        isolate_impl(b, rhs - a.clone(), var)
      }
    }
    ("-", [a, b]) => {
      if a.contains_var(var) {
        isolate_impl(a, rhs + b.clone(), var)
      } else {
        isolate_impl(b, a.clone() - rhs, var)
      }
    }
    ("*", [a, b]) => {
      if a.contains_var(var) {
        isolate_impl(a, rhs / b.clone(), var)
      } else {
        isolate_impl(b, rhs / a.clone(), var)
      }
    }
    ("/", [a, b]) => {
      if a.contains_var(var) {
        isolate_impl(a, rhs * b.clone(), var)
      } else {
        isolate_impl(b, a.clone() / rhs, var)
      }
    }
    ("^", [base, exponent]) => {
      if base.contains_var(var) {
        isolate_impl(base, Expr::call("root", vec![rhs, exponent.clone()]), var)
      } else {
        let log_rhs = Expr::apply("ln", rhs) / Expr::apply("ln", base.clone());
        isolate_impl(exponent, log_rhs, var)
      }
    }
    ("root", [value, degree]) if !degree.contains_var(var) => {
      isolate_impl(value, rhs.pow(degree.clone()), var)
    }
    ("negate", [a]) => isolate_impl(a, -rhs, var),
    ("exp", [a]) => isolate_impl(a, Expr::apply("ln", rhs), var),
    ("ln" | "log", [a]) => isolate_impl(a, Expr::apply("exp", rhs), var),
    ("log10", [a]) => isolate_impl(a, Expr::apply("exp", rhs * Expr::number(LN_10)), var),
    ("log2", [a]) => isolate_impl(a, Expr::apply("exp", rhs * Expr::number(LN_2)), var),
    ("sin", [a]) => isolate_impl(a, Expr::apply("asin", rhs), var),
    ("cos", [a]) => isolate_impl(a, Expr::apply("acos", rhs), var),
    ("tan", [a]) => isolate_impl(a, Expr::apply("atan", rhs), var),
    ("asin", [a]) => isolate_impl(a, Expr::apply("sin", rhs), var),
    ("acos", [a]) => isolate_impl(a, Expr::apply("cos", rhs), var),
    ("atan", [a]) => isolate_impl(a, Expr::apply("tan", rhs), var),
    ("sqrt", [a]) => isolate_impl(a, rhs.pow(Expr::number(2.0)), var),
    ("cbrt", [a]) => isolate_impl(a, rhs.pow(Expr::number(3.0)), var),
    _ => None,
  }
}

/// Whether `expr` contains a call to one of the
/// [`INVERTIBLE_FUNCTIONS`] whose argument mentions `var`.
pub fn has_invertible_call(expr: &Expr, var: &Var) -> bool {
  crate::expr::walker::any(expr, |e| {
    match e {
      Expr::Call(name, args) => {
        INVERTIBLE_FUNCTIONS.contains(&name.as_str()) && args.iter().any(|a| a.contains_var(var))
      }
      Expr::Atom(_) => false,
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::compiled::Program;
  use crate::expr::function::STANDARD_FUNCTIONS;

  use approx::assert_abs_diff_eq;

  fn x() -> Expr {
    Expr::var(Var::x())
  }

  fn eval(expr: &Expr, at: f64) -> f64 {
    Program::compile(expr, &Var::x(), &STANDARD_FUNCTIONS).eval(at).unwrap()
  }

  #[test]
  fn test_linear() {
    // 2x - 6 = 0 => x = 3
    let solution = isolate(&(Expr::number(2.0) * x() - Expr::number(6.0)), Expr::zero(), &Var::x()).unwrap();
    assert_eq!(solution, Expr::number(3.0));
  }

  #[test]
  fn test_through_functions() {
    // exp(2x) - 5 = 0 => x = ln(5) / 2
    let lhs = Expr::apply("exp", Expr::number(2.0) * x()) - Expr::number(5.0);
    let solution = isolate(&lhs, Expr::zero(), &Var::x()).unwrap();
    assert_abs_diff_eq!(solution.as_number().unwrap(), 5f64.ln() / 2.0, epsilon = 1e-12);
  }

  #[test]
  fn test_variable_exponent() {
    // 2^x = 8 => x = 3
    let solution = isolate(&Expr::number(2.0).pow(x()), Expr::number(8.0), &Var::x()).unwrap();
    assert_abs_diff_eq!(solution.as_number().unwrap(), 3.0, epsilon = 1e-12);
  }

  #[test]
  fn test_rejects_repeated_variable() {
    let lhs = x() * x() - Expr::number(4.0);
    assert!(isolate(&lhs, Expr::zero(), &Var::x()).is_none());
  }

  #[test]
  fn test_in_place() {
    // exp(x) = 3 - x => x = ln(3 - x)
    let g = isolate_in_place(&Expr::apply("exp", x()), Expr::number(3.0) - x(), &Var::x()).unwrap();
    assert_abs_diff_eq!(eval(&g, 1.0), 2f64.ln(), epsilon = 1e-12);
  }

  #[test]
  fn test_has_invertible_call() {
    assert!(has_invertible_call(&(Expr::number(3.0) * Expr::apply("exp", x())), &Var::x()));
    assert!(!has_invertible_call(&Expr::apply("exp", Expr::number(1.0)), &Var::x()));
    assert!(!has_invertible_call(&x().pow(Expr::number(2.0)), &Var::x()));
  }
}
