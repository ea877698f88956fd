
//! Splitting an expression into the signed terms of a sum.

use crate::expr::Expr;
use crate::expr::var::Var;

use std::fmt::{self, Formatter, Display};
use std::ops::{Mul, Neg};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Sign {
  Negative,
  Positive,
}

/// A `SignedTerm` is an expression together with a [`Sign`].
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTerm {
  pub sign: Sign,
  pub term: Expr,
}

/// A sum of several signed terms.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SumOfTerms {
  terms: Vec<SignedTerm>,
}

impl Sign {
  pub fn other(self) -> Self {
    match self {
      Self::Negative => Self::Positive,
      Self::Positive => Self::Negative,
    }
  }
}

impl SignedTerm {
  pub fn new(sign: Sign, term: Expr) -> Self {
    Self { sign, term }
  }
}

impl SumOfTerms {
  pub fn new(terms: impl IntoIterator<Item = SignedTerm>) -> Self {
    Self { terms: terms.into_iter().collect() }
  }

  /// Flattens the additions, subtractions and negations at the top of
  /// `expr` into a list of terms.
  pub fn split(expr: Expr) -> Self {
    let mut terms = Vec::new();
    split_into(expr, Sign::Positive, &mut terms);
    Self { terms }
  }

  pub fn terms(&self) -> &[SignedTerm] {
    &self.terms
  }

  pub fn len(&self) -> usize {
    self.terms.len()
  }

  pub fn is_empty(&self) -> bool {
    self.terms.is_empty()
  }

  /// The sum of every term except the one at `index`.
  pub fn without(&self, index: usize) -> SumOfTerms {
    let terms = self.terms.iter()
      .enumerate()
      .filter(|(i, _)| *i != index)
      .map(|(_, t)| t.clone());
    SumOfTerms::new(terms)
  }

  /// Indices of the terms mentioning `var` exactly once.
  pub fn single_occurrence_terms<'a>(&'a self, var: &'a Var) -> impl Iterator<Item = usize> + 'a {
    self.terms.iter()
      .enumerate()
      .filter(move |(_, t)| t.term.count_var(var) == 1)
      .map(|(i, _)| i)
  }
}

fn split_into(expr: Expr, sign: Sign, out: &mut Vec<SignedTerm>) {
  match expr {
    Expr::Call(name, args) if args.len() == 2 && (name == "+" || name == "-") => {
      let mut args = args.into_iter();
      if let (Some(left), Some(right)) = (args.next(), args.next()) {
        let right_sign = if name == "+" { sign } else { sign.other() };
        split_into(left, sign, out);
        split_into(right, right_sign, out);
      }
    }
    Expr::Call(name, mut args) if args.len() == 1 && name == "negate" => {
      split_into(args.swap_remove(0), sign.other(), out);
    }
    expr => {
      out.push(SignedTerm::new(sign, expr));
    }
  }
}

impl From<SignedTerm> for Expr {
  fn from(t: SignedTerm) -> Self {
    match t.sign {
      Sign::Positive => t.term,
      Sign::Negative => -t.term,
    }
  }
}

impl From<SumOfTerms> for Expr {
  fn from(sum: SumOfTerms) -> Self {
    let mut iter = sum.terms.into_iter();
    let Some(first) = iter.next() else {
      return Expr::zero();
    };
    iter.fold(Expr::from(first), |acc, t| {
      match t.sign {
        Sign::Positive => acc + t.term,
        Sign::Negative => acc - t.term,
      }
    })
  }
}

impl Mul for Sign {
  type Output = Self;

  fn mul(self, other: Self) -> Self::Output {
    if self == other {
      Self::Positive
    } else {
      Self::Negative
    }
  }
}

impl Neg for SignedTerm {
  type Output = Self;

  fn neg(self) -> Self::Output {
    Self { sign: self.sign.other(), term: self.term }
  }
}

impl Display for Sign {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Self::Negative => write!(f, "-"),
      Self::Positive => write!(f, "+"),
    }
  }
}

impl Display for SignedTerm {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.sign, self.term)
  }
}
