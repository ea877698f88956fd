
//! Compiled single-variable functions, as handed to the root-finding
//! methods.

use crate::expr::Expr;
use crate::expr::var::Var;
use crate::expr::compiled::{EvalFault, Program};
use crate::expr::calculus::{self, DifferentiationError};
use crate::expr::function::STANDARD_FUNCTIONS;
use crate::expr::normalize::normalize_spelling;
use crate::expr::parser::{ExprParser, ParseError};
use crate::parsing::operator::OperatorTable;

use once_cell::sync::Lazy;

use std::fmt::{self, Display, Formatter};

static OPERATORS: Lazy<OperatorTable> = Lazy::new(OperatorTable::arithmetic);

/// An immutable function of `x`, together with the text it was parsed
/// from and the program used to evaluate it.
#[derive(Debug, Clone)]
pub struct Expression {
  source: String,
  expr: Expr,
  var: Var,
  program: Program,
}

impl Expression {
  /// Parses `text` as a function of `x`. Alternative spellings (`**`,
  /// `arcsin`, `√`, ...) are accepted.
  pub fn compile(text: &str) -> Result<Expression, ParseError> {
    let var = Var::x();
    let normalized = normalize_spelling(text);
    let parser = ExprParser::new(&OPERATORS, &STANDARD_FUNCTIONS, &var);
    let expr = parser.parse(&normalized)?;
    Ok(Expression::with_source(normalized, expr, var))
  }

  /// Wraps an already-built tree. Its source text is the rendered
  /// tree.
  pub fn from_expr(expr: Expr) -> Expression {
    let source = expr.to_string();
    Expression::with_source(source, expr, Var::x())
  }

  fn with_source(source: String, expr: Expr, var: Var) -> Expression {
    let program = Program::compile(&expr, &var, &STANDARD_FUNCTIONS);
    Expression { source, expr, var, program }
  }

  pub fn source(&self) -> &str {
    &self.source
  }

  pub fn expr(&self) -> &Expr {
    &self.expr
  }

  pub fn var(&self) -> &Var {
    &self.var
  }

  /// Evaluates at `x`, reporting why the function is undefined there
  /// if it is.
  pub fn try_eval(&self, x: f64) -> Result<f64, EvalFault> {
    self.program.eval(x)
  }

  /// Evaluates at `x`. Never panics; any fault yields NaN.
  pub fn evaluate(&self, x: f64) -> f64 {
    self.try_eval(x).unwrap_or(f64::NAN)
  }

  /// The symbolic derivative with respect to `x`, simplified.
  pub fn derivative(&self) -> Result<Expression, DifferentiationError> {
    let derivative = calculus::differentiate(&STANDARD_FUNCTIONS, &self.expr, &self.var)?;
    Ok(Expression::from_expr(derivative))
  }
}

impl Display for Expression {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.source)
  }
}

impl PartialEq for Expression {
  fn eq(&self, other: &Self) -> bool {
    self.expr == other.expr && self.var == other.var
  }
}
