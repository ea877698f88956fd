
//! Definitions of the built-in functions.
//!
//! Every evaluator reports domain violations as an [`EvalFault`]
//! rather than producing NaN or infinity, and every function carries
//! a derivative rule, so differentiation of a well-formed expression
//! never fails for lack of a rule.

use super::{Function, FunctionTable};
use crate::expr::Expr;
use crate::expr::compiled::EvalFault;
use crate::expr::calculus::{DerivativeEngine, DifferentiationError};

use std::f64::consts::{LN_10, LN_2};

type DerivResult = Result<Expr, DifferentiationError>;

pub(super) fn standard_functions() -> FunctionTable {
  vec![
    // Arithmetic
    Function::binary("+", |a, b| checked("+", a, a + b), d_add),
    Function::binary("-", |a, b| checked("-", a, a - b), d_sub),
    Function::binary("*", |a, b| checked("*", a, a * b), d_mul),
    Function::binary("/", divide, d_div),
    Function::binary("^", power, d_pow),
    Function::unary("negate", |a| Ok(-a), d_negate),
    // Trigonometric
    Function::unary("sin", |a| checked("sin", a, a.sin()), d_sin),
    Function::unary("cos", |a| checked("cos", a, a.cos()), d_cos),
    Function::unary("tan", |a| checked("tan", a, a.tan()), d_tan),
    Function::unary("asin", |a| unit_interval("asin", a).map(f64::asin), d_asin),
    Function::unary("acos", |a| unit_interval("acos", a).map(f64::acos), d_acos),
    Function::unary("atan", |a| checked("atan", a, a.atan()), d_atan),
    Function::unary("sinh", |a| checked("sinh", a, a.sinh()), d_sinh),
    Function::unary("cosh", |a| checked("cosh", a, a.cosh()), d_cosh),
    Function::unary("tanh", |a| checked("tanh", a, a.tanh()), d_tanh),
    // Exponential and logarithmic
    Function::unary("exp", |a| checked("exp", a, a.exp()), d_exp),
    Function::unary("ln", |a| positive("ln", a).map(f64::ln), d_ln),
    Function::unary("log", |a| positive("log", a).map(f64::ln), d_ln),
    Function::unary("log10", |a| positive("log10", a).map(f64::log10), d_log10),
    Function::unary("log2", |a| positive("log2", a).map(f64::log2), d_log2),
    // Roots and magnitude
    Function::unary("sqrt", square_root, d_sqrt),
    Function::unary("cbrt", |a| checked("cbrt", a, a.cbrt()), d_cbrt),
    Function::binary("root", real_root, d_root),
    Function::unary("abs", |a| checked("abs", a, a.abs()), d_abs),
  ].into_iter().collect()
}

fn checked(function: &'static str, argument: f64, value: f64) -> Result<f64, EvalFault> {
  if value.is_nan() {
    Err(EvalFault::DomainError { function, argument })
  } else if value.is_infinite() {
    Err(EvalFault::Overflow { function })
  } else {
    Ok(value)
  }
}

fn positive(function: &'static str, argument: f64) -> Result<f64, EvalFault> {
  if argument > 0.0 {
    Ok(argument)
  } else {
    Err(EvalFault::DomainError { function, argument })
  }
}

fn unit_interval(function: &'static str, argument: f64) -> Result<f64, EvalFault> {
  if (-1.0..=1.0).contains(&argument) {
    Ok(argument)
  } else {
    Err(EvalFault::DomainError { function, argument })
  }
}

fn divide(a: f64, b: f64) -> Result<f64, EvalFault> {
  if b == 0.0 {
    return Err(EvalFault::DivisionByZero);
  }
  checked("/", a, a / b)
}

fn power(base: f64, exponent: f64) -> Result<f64, EvalFault> {
  if base == 0.0 && exponent < 0.0 {
    return Err(EvalFault::DivisionByZero);
  }
  if base < 0.0 && exponent.fract() != 0.0 {
    // A fractional power of a negative number is complex.
    return Err(EvalFault::DomainError { function: "^", argument: base });
  }
  checked("^", base, base.powf(exponent))
}

fn square_root(a: f64) -> Result<f64, EvalFault> {
  if a < 0.0 {
    return Err(EvalFault::DomainError { function: "sqrt", argument: a });
  }
  Ok(a.sqrt())
}

/// The real `n`-th root of `value`. Odd integer degrees accept
/// negative values and preserve their sign.
fn real_root(value: f64, degree: f64) -> Result<f64, EvalFault> {
  if degree == 0.0 {
    return Err(EvalFault::DivisionByZero);
  }
  if value < 0.0 {
    let is_odd_integer = degree.fract() == 0.0 && (degree % 2.0).abs() == 1.0;
    if !is_odd_integer {
      return Err(EvalFault::DomainError { function: "root", argument: value });
    }
    return checked("root", value, -(-value).powf(degree.recip()));
  }
  checked("root", value, value.powf(degree.recip()))
}

fn d_add(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  Ok(engine.differentiate(&args[0])? + engine.differentiate(&args[1])?)
}

fn d_sub(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  Ok(engine.differentiate(&args[0])? - engine.differentiate(&args[1])?)
}

fn d_negate(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  Ok(-engine.differentiate(&args[0])?)
}

fn d_mul(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  let (u, v) = (&args[0], &args[1]);
  let du = engine.differentiate(u)?;
  let dv = engine.differentiate(v)?;
  Ok(du * v.clone() + u.clone() * dv)
}

fn d_div(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  let (u, v) = (&args[0], &args[1]);
  let du = engine.differentiate(u)?;
  let dv = engine.differentiate(v)?;
  Ok((du * v.clone() - u.clone() * dv) / v.clone().pow(Expr::number(2.0)))
}

fn d_pow(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  let (u, v) = (&args[0], &args[1]);
  if !engine.depends_on(v) {
    // Power rule.
    let du = engine.differentiate(u)?;
    Ok(v.clone() * u.clone().pow(v.clone() - Expr::one()) * du)
  } else if !engine.depends_on(u) {
    // Exponential rule.
    let dv = engine.differentiate(v)?;
    Ok(u.clone().pow(v.clone()) * Expr::apply("ln", u.clone()) * dv)
  } else {
    let du = engine.differentiate(u)?;
    let dv = engine.differentiate(v)?;
    let inner = dv * Expr::apply("ln", u.clone()) + v.clone() * du / u.clone();
    Ok(u.clone().pow(v.clone()) * inner)
  }
}

fn d_sin(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  Ok(Expr::apply("cos", args[0].clone()) * engine.differentiate(&args[0])?)
}

fn d_cos(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  Ok(-Expr::apply("sin", args[0].clone()) * engine.differentiate(&args[0])?)
}

fn d_tan(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  let cos_sq = Expr::apply("cos", args[0].clone()).pow(Expr::number(2.0));
  Ok(engine.differentiate(&args[0])? / cos_sq)
}

fn one_minus_square_root(u: &Expr) -> Expr {
  Expr::apply("sqrt", Expr::one() - u.clone().pow(Expr::number(2.0)))
}

fn d_asin(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  Ok(engine.differentiate(&args[0])? / one_minus_square_root(&args[0]))
}

fn d_acos(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  Ok(-(engine.differentiate(&args[0])? / one_minus_square_root(&args[0])))
}

fn d_atan(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  let denominator = Expr::one() + args[0].clone().pow(Expr::number(2.0));
  Ok(engine.differentiate(&args[0])? / denominator)
}

fn d_sinh(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  Ok(Expr::apply("cosh", args[0].clone()) * engine.differentiate(&args[0])?)
}

fn d_cosh(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  Ok(Expr::apply("sinh", args[0].clone()) * engine.differentiate(&args[0])?)
}

fn d_tanh(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  let cosh_sq = Expr::apply("cosh", args[0].clone()).pow(Expr::number(2.0));
  Ok(engine.differentiate(&args[0])? / cosh_sq)
}

fn d_exp(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  Ok(Expr::apply("exp", args[0].clone()) * engine.differentiate(&args[0])?)
}

fn d_ln(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  Ok(engine.differentiate(&args[0])? / args[0].clone())
}

fn d_log10(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  Ok(engine.differentiate(&args[0])? / (args[0].clone() * Expr::number(LN_10)))
}

fn d_log2(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  Ok(engine.differentiate(&args[0])? / (args[0].clone() * Expr::number(LN_2)))
}

fn d_sqrt(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  let denominator = Expr::number(2.0) * Expr::apply("sqrt", args[0].clone());
  Ok(engine.differentiate(&args[0])? / denominator)
}

fn d_cbrt(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  let denominator = Expr::number(3.0) * Expr::apply("cbrt", args[0].clone()).pow(Expr::number(2.0));
  Ok(engine.differentiate(&args[0])? / denominator)
}

fn d_root(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  // d/dx u^(1/n) = u^(1/n) * (u' / (n u) - n' ln|u| / n^2)
  let (u, n) = (&args[0], &args[1]);
  let du = engine.differentiate(u)?;
  let dn = engine.differentiate(n)?;
  let root = Expr::call("root", vec![u.clone(), n.clone()]);
  let from_value = du / (n.clone() * u.clone());
  let from_degree = dn * Expr::apply("ln", Expr::apply("abs", u.clone())) / n.clone().pow(Expr::number(2.0));
  Ok(root * (from_value - from_degree))
}

fn d_abs(args: &[Expr], engine: &DerivativeEngine<'_>) -> DerivResult {
  let sign = args[0].clone() / Expr::apply("abs", args[0].clone());
  Ok(engine.differentiate(&args[0])? * sign)
}
