
//! Recognition of polynomials in one variable.

use crate::expr::Expr;
use crate::expr::var::Var;
use crate::expr::simplifier::simplify;

use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};

/// Highest power expanded when raising a polynomial to an integer
/// exponent.
const MAX_EXPANDED_DEGREE: u32 = 32;

const ZERO_TOLERANCE: f64 = 1e-12;

/// A polynomial with real coefficients, stored as a map from degree
/// to coefficient. Zero coefficients are never stored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polynomial {
  coefficients: BTreeMap<u32, f64>,
}

impl Polynomial {
  pub fn zero() -> Self {
    Self::default()
  }

  pub fn constant(c: f64) -> Self {
    Self::monomial(c, 0)
  }

  pub fn monomial(coefficient: f64, degree: u32) -> Self {
    let mut coefficients = BTreeMap::new();
    if coefficient.abs() > ZERO_TOLERANCE {
      coefficients.insert(degree, coefficient);
    }
    Self { coefficients }
  }

  /// Extracts the coefficients of `expr` as a polynomial in `var`.
  /// Returns `None` if `expr` is not a polynomial (a function of `var`
  /// other than sums, products, quotients by constants, and
  /// non-negative integer powers).
  pub fn from_expr(expr: &Expr, var: &Var) -> Option<Self> {
    if !expr.contains_var(var) {
      let value = simplify(expr.clone()).as_number()?;
      return value.is_finite().then(|| Polynomial::constant(value));
    }
    if expr.is_var(var) {
      return Some(Polynomial::monomial(1.0, 1));
    }
    let Expr::Call(name, args) = expr else {
      return None;
    };
    match (name.as_str(), args.as_slice()) {
      ("+", [a, b]) => Some(Self::from_expr(a, var)? + Self::from_expr(b, var)?),
      ("-", [a, b]) => Some(Self::from_expr(a, var)? - Self::from_expr(b, var)?),
      ("*", [a, b]) => Some(Self::from_expr(a, var)? * Self::from_expr(b, var)?),
      ("negate", [a]) => Some(-Self::from_expr(a, var)?),
      ("/", [a, b]) if !b.contains_var(var) => {
        let divisor = simplify(b.clone()).as_number()?;
        if divisor.abs() <= ZERO_TOLERANCE {
          return None;
        }
        Some(Self::from_expr(a, var)?.scale(divisor.recip()))
      }
      ("^", [base, exponent]) if !exponent.contains_var(var) => {
        let n = simplify(exponent.clone()).as_number()?;
        if n < 0.0 || n.fract() != 0.0 || n > MAX_EXPANDED_DEGREE as f64 {
          return None;
        }
        let base = Self::from_expr(base, var)?;
        let result = (0..n as u32).fold(Polynomial::constant(1.0), |acc, _| acc * base.clone());
        (result.degree() <= MAX_EXPANDED_DEGREE).then_some(result)
      }
      _ => None,
    }
  }

  /// The degree of the polynomial. The zero polynomial has degree 0.
  pub fn degree(&self) -> u32 {
    self.coefficients.keys().next_back().copied().unwrap_or(0)
  }

  pub fn coefficient(&self, degree: u32) -> f64 {
    self.coefficients.get(&degree).copied().unwrap_or(0.0)
  }

  pub fn leading_coefficient(&self) -> f64 {
    self.coefficient(self.degree())
  }

  pub fn is_zero(&self) -> bool {
    self.coefficients.is_empty()
  }

  /// The polynomial with the term of the given degree removed.
  pub fn without_degree(&self, degree: u32) -> Polynomial {
    let mut result = self.clone();
    result.coefficients.remove(&degree);
    result
  }

  pub fn scale(mut self, factor: f64) -> Polynomial {
    for c in self.coefficients.values_mut() {
      *c *= factor;
    }
    self.coefficients.retain(|_, c| c.abs() > ZERO_TOLERANCE);
    self
  }

  /// Renders the polynomial as an expression in `var`, highest degree
  /// first.
  pub fn to_expr(&self, var: &Var) -> Expr {
    let x = Expr::var(var.clone());
    let terms = self.coefficients.iter().rev().map(|(&degree, &c)| {
      let power = match degree {
        0 => None,
        1 => Some(x.clone()),
        n => Some(x.clone().pow(Expr::number(n as f64))),
      };
      match power {
        None => Expr::number(c),
        Some(power) => Expr::number(c) * power,
      }
    });
    let expr = terms.reduce(|acc, term| acc + term).unwrap_or_else(Expr::zero);
    simplify(expr)
  }

  fn insert_add(&mut self, degree: u32, value: f64) {
    let entry = self.coefficients.entry(degree).or_insert(0.0);
    *entry += value;
    if entry.abs() <= ZERO_TOLERANCE {
      self.coefficients.remove(&degree);
    }
  }
}

impl Add for Polynomial {
  type Output = Polynomial;

  fn add(mut self, other: Polynomial) -> Polynomial {
    for (degree, c) in other.coefficients {
      self.insert_add(degree, c);
    }
    self
  }
}

impl Sub for Polynomial {
  type Output = Polynomial;

  fn sub(self, other: Polynomial) -> Polynomial {
    self + (-other)
  }
}

impl Neg for Polynomial {
  type Output = Polynomial;

  fn neg(self) -> Polynomial {
    self.scale(-1.0)
  }
}

impl Mul for Polynomial {
  type Output = Polynomial;

  fn mul(self, other: Polynomial) -> Polynomial {
    let mut result = Polynomial::zero();
    for (&d1, &c1) in &self.coefficients {
      for (&d2, &c2) in &other.coefficients {
        result.insert_add(d1 + d2, c1 * c2);
      }
    }
    result
  }
}
