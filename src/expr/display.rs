
//! Rendering of expression trees as function text. The output uses
//! the fewest parentheses that still parse back to the same tree.

use super::Expr;
use super::atom::Atom;
use crate::parsing::operator::{OperatorTable, Operator, Precedence};

use itertools::Itertools;
use once_cell::sync::Lazy;

use std::fmt::{self, Display, Formatter};

static ARITHMETIC: Lazy<OperatorTable> = Lazy::new(OperatorTable::arithmetic);

/// Unary minus binds tighter than multiplication and looser than
/// exponentiation, so `-x^2` is `-(x^2)` and `-x * y` is `(-x) * y`.
fn negation_precedence() -> Precedence {
  Precedence::new(195)
}

impl Display for Expr {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let mut out = String::new();
    write_expr(&mut out, self);
    f.write_str(&out)
  }
}

/// Precedence of the outermost construct in `expr`, for deciding
/// whether it needs parentheses.
fn precedence_of(expr: &Expr) -> Precedence {
  match expr {
    Expr::Atom(Atom::Number(n)) if n.is_sign_negative() && *n != 0.0 => negation_precedence(),
    Expr::Atom(_) => Precedence::MAX,
    Expr::Call(name, args) => {
      if name == "negate" && args.len() == 1 {
        negation_precedence()
      } else if let (Some(op), 2) = (ARITHMETIC.get(name), args.len()) {
        op.precedence()
      } else {
        Precedence::MAX
      }
    }
  }
}

fn is_negative(expr: &Expr) -> bool {
  precedence_of(expr) == negation_precedence()
}

fn write_expr(out: &mut String, expr: &Expr) {
  match expr {
    Expr::Atom(atom) => {
      out.push_str(&atom.to_string());
    }
    Expr::Call(name, args) => {
      if let ("negate", [arg]) = (name.as_str(), args.as_slice()) {
        out.push('-');
        write_operand(out, arg, negation_precedence());
      } else if let (Some(op), [left, right]) = (ARITHMETIC.get(name), args.as_slice()) {
        write_infix(out, op, left, right);
      } else {
        write_call(out, name, args);
      }
    }
  }
}

fn write_infix(out: &mut String, op: &Operator, left: &Expr, right: &Expr) {
  write_operand(out, left, op.left_precedence());
  if op.name() == "^" {
    out.push('^');
  } else {
    out.push(' ');
    out.push_str(op.name());
    out.push(' ');
  }
  // A negation directly to the right of an operator is always
  // bracketed, to avoid text like `a - -b`.
  if is_negative(right) {
    write_parenthesized(out, right);
  } else {
    write_operand(out, right, op.right_precedence());
  }
}

fn write_operand(out: &mut String, expr: &Expr, required: Precedence) {
  if precedence_of(expr) < required {
    write_parenthesized(out, expr);
  } else {
    write_expr(out, expr);
  }
}

fn write_parenthesized(out: &mut String, expr: &Expr) {
  out.push('(');
  write_expr(out, expr);
  out.push(')');
}

fn write_call(out: &mut String, name: &str, args: &[Expr]) {
  out.push_str(name);
  out.push('(');
  out.push_str(&args.iter().map(|arg| arg.to_string()).join(", "));
  out.push(')');
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::var::Var;

  fn x() -> Expr {
    Expr::var(Var::x())
  }

  fn n(value: f64) -> Expr {
    Expr::number(value)
  }

  #[test]
  fn test_simple_polynomial() {
    let expr = x().pow(n(3.0)) - n(7.89) * x() - n(11.0);
    assert_eq!(expr.to_string(), "x^3 - 7.89 * x - 11");
  }

  #[test]
  fn test_parentheses_for_precedence() {
    assert_eq!(((x() + n(1.0)) * n(2.0)).to_string(), "(x + 1) * 2");
    assert_eq!((n(2.0) * (x() + n(1.0))).to_string(), "2 * (x + 1)");
    assert_eq!((x() - (x() - n(1.0))).to_string(), "x - (x - 1)");
    assert_eq!(((x() - x()) - n(1.0)).to_string(), "x - x - 1");
  }

  #[test]
  fn test_power_associativity() {
    assert_eq!(x().pow(n(2.0).pow(n(3.0))).to_string(), "x^2^3");
    assert_eq!(x().pow(n(2.0)).pow(n(3.0)).to_string(), "(x^2)^3");
    assert_eq!(x().pow(n(1.0) / n(3.0)).to_string(), "x^(1 / 3)");
  }

  #[test]
  fn test_negation() {
    assert_eq!((-x().pow(n(2.0))).to_string(), "-x^2");
    assert_eq!((-x()).pow(n(2.0)).to_string(), "(-x)^2");
    assert_eq!(n(-2.0).pow(n(2.0)).to_string(), "(-2)^2");
    assert_eq!((x() - -x()).to_string(), "x - (-x)");
    assert_eq!((x() * n(-0.1)).to_string(), "x * (-0.1)");
    assert_eq!((-(x() + n(1.0))).to_string(), "-(x + 1)");
    assert_eq!((-x() * n(2.0)).to_string(), "-x * 2");
  }

  #[test]
  fn test_function_calls() {
    let expr = Expr::call("root", vec![-(n(-11.0) - n(7.89) * x()), n(3.0)]);
    assert_eq!(expr.to_string(), "root(-(-11 - 7.89 * x), 3)");
    assert_eq!(Expr::apply("sin", x() + n(1.0)).to_string(), "sin(x + 1)");
  }
}
