
//! Parser for function text.
//!
//! Operands (numbers, the variable, constants, calls, parenthesized
//! groups, with their unary signs and exponents) are parsed by
//! recursive descent; the binary operators between them are resolved
//! by the shunting yard algorithm. Juxtaposed operands are multiplied,
//! so `2x`, `3(x + 1)` and `2sin(x)` are all products. Juxtaposition
//! binds tighter than `*` and `/` (but looser than `^`), so `x/2x` is
//! `x / (2 * x)`.

use super::Expr;
use super::var::Var;
use super::function::FunctionTable;
use super::tokenizer::{ExprTokenizer, Token, TokenData, TokenizerError};
use crate::parsing::operator::{Associativity, Operator, OperatorTable, Precedence};
use crate::parsing::shunting_yard::{self, ShuntingYardDriver, ShuntingYardError};
use crate::parsing::source::{Span, SourceOffset};
use crate::parsing::tokenizer::TokenizerState;

use thiserror::Error;

use std::convert::Infallible;
use std::f64::consts::{E, PI};

#[derive(Clone, Debug)]
pub struct ExprParser<'a> {
  tokenizer: ExprTokenizer<'a>,
  operator_table: &'a OperatorTable,
  function_table: &'a FunctionTable,
  var: &'a Var,
}

#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct ExprShuntingYardDriver {}

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
  #[error("{0}")]
  Tokenizer(#[from] TokenizerError),
  #[error("Unexpected '{token}' at {span}")]
  UnexpectedToken { token: String, span: Span },
  #[error("Unexpected end of input at {0}")]
  UnexpectedEOF(SourceOffset),
  #[error("Unknown function '{name}' at {span}")]
  UnknownFunction { name: String, span: Span },
  #[error("Unknown name '{name}' at {span}")]
  UnknownVariable { name: String, span: Span },
  #[error("Function '{name}' expects {expected} argument(s) but was given {actual}")]
  WrongArity { name: String, expected: usize, actual: usize, span: Span },
  #[error("Operator at {0} is missing an operand")]
  MissingOperand(Span),
  #[error("Empty expression")]
  EmptyInput,
}

/// Position within a token list, remembering where the input ends so
/// that end-of-input errors can be reported.
#[derive(Debug)]
struct TokenCursor<'t> {
  tokens: &'t [Token],
  position: usize,
  eof: SourceOffset,
}

impl<'a> ExprParser<'a> {
  pub fn new(operator_table: &'a OperatorTable, function_table: &'a FunctionTable, var: &'a Var) -> Self {
    Self {
      tokenizer: ExprTokenizer::new(operator_table),
      operator_table,
      function_table,
      var,
    }
  }

  pub fn tokenizer(&self) -> &ExprTokenizer<'a> {
    &self.tokenizer
  }

  pub fn parse(&self, input: &str) -> Result<Expr, ParseError> {
    let mut state = TokenizerState::new(input);
    let tokens = self.tokenizer.read_tokens(&mut state)?;
    if tokens.is_empty() {
      return Err(ParseError::EmptyInput);
    }
    let mut cursor = TokenCursor { tokens: &tokens, position: 0, eof: SourceOffset(input.len()) };
    let expr = self.parse_chain(&mut cursor)?;
    match cursor.next() {
      None => Ok(expr),
      Some(token) => Err(unexpected(token)),
    }
  }

  /// Parses operands separated by binary operators (or by nothing, for
  /// implicit multiplication) up to a closing parenthesis, a comma or
  /// the end of input.
  fn parse_chain(&self, cursor: &mut TokenCursor<'_>) -> Result<Expr, ParseError> {
    let mut chain: Vec<shunting_yard::Token<Expr>> = Vec::new();
    let span = cursor.peek_span();
    chain.push(shunting_yard::Token::scalar(self.parse_operand(cursor)?, span));
    loop {
      let Some(token) = cursor.peek() else { break };
      match &token.data {
        TokenData::Operator(op) => {
          let op = op.clone();
          let op_span = token.span;
          cursor.advance();
          let span = cursor.peek_span();
          chain.push(shunting_yard::Token::infix_operator(op, op_span));
          chain.push(shunting_yard::Token::scalar(self.parse_operand(cursor)?, span));
        }
        TokenData::Number(_) | TokenData::Identifier(_) | TokenData::FunctionCallStart(_) | TokenData::LeftParen => {
          let span = token.span;
          chain.push(shunting_yard::Token::infix_operator(self.implicit_multiplication(), Span::point(span.start)));
          chain.push(shunting_yard::Token::scalar(self.parse_operand(cursor)?, span));
        }
        TokenData::RightParen | TokenData::Comma => break,
      }
    }
    shunting_yard::parse(&mut ExprShuntingYardDriver::new(), chain).map_err(|err| match err {
      ShuntingYardError::CustomError(never) => match never {},
      ShuntingYardError::MissingOperand(span) => ParseError::MissingOperand(span),
      ShuntingYardError::DanglingOperand(span) => ParseError::UnexpectedToken { token: String::from("operand"), span },
      ShuntingYardError::Empty => ParseError::EmptyInput,
    })
  }

  /// Multiplication one precedence level above the explicit `*`.
  fn implicit_multiplication(&self) -> Operator {
    let prec = self.operator_table.get("*").map_or(Precedence::new(190), Operator::precedence);
    Operator::new("*", Associativity::LEFT, prec.incremented())
  }

  /// An operand with any number of leading unary signs. Negation
  /// binds looser than exponentiation: `-x^2` is `-(x^2)`.
  fn parse_operand(&self, cursor: &mut TokenCursor<'_>) -> Result<Expr, ParseError> {
    match cursor.peek().map(|t| &t.data) {
      Some(TokenData::Operator(op)) if op.name() == "-" => {
        cursor.advance();
        let operand = self.parse_operand(cursor)?;
        Ok(match operand.as_number() {
          Some(n) => Expr::number(-n),
          None => -operand,
        })
      }
      Some(TokenData::Operator(op)) if op.name() == "+" => {
        cursor.advance();
        self.parse_operand(cursor)
      }
      _ => self.parse_power(cursor),
    }
  }

  /// A primary, optionally raised to a power. The exponent may carry
  /// its own sign (`x^-2`) and associates to the right.
  fn parse_power(&self, cursor: &mut TokenCursor<'_>) -> Result<Expr, ParseError> {
    let base = self.parse_primary(cursor)?;
    match cursor.peek().map(|t| &t.data) {
      Some(TokenData::Operator(op)) if op.name() == "^" => {
        cursor.advance();
        let exponent = self.parse_operand(cursor)?;
        Ok(base.pow(exponent))
      }
      _ => Ok(base),
    }
  }

  fn parse_primary(&self, cursor: &mut TokenCursor<'_>) -> Result<Expr, ParseError> {
    let eof = cursor.eof;
    let token = cursor.next().ok_or(ParseError::UnexpectedEOF(eof))?;
    match &token.data {
      TokenData::Number(n) => Ok(Expr::number(*n)),
      TokenData::Identifier(name) => self.resolve_name(name, token.span),
      TokenData::LeftParen => {
        let inner = self.parse_chain(cursor)?;
        self.expect_right_paren(cursor)?;
        Ok(inner)
      }
      TokenData::FunctionCallStart(name) => {
        if self.function_table.contains(name) {
          self.parse_call(cursor, name, token.span)
        } else if let Ok(value) = self.resolve_name(name, token.span) {
          // `x(x + 1)` is a product, not a call.
          let inner = self.parse_chain(cursor)?;
          self.expect_right_paren(cursor)?;
          Ok(value * inner)
        } else {
          Err(ParseError::UnknownFunction { name: name.to_owned(), span: token.span })
        }
      }
      TokenData::Operator(_) | TokenData::Comma | TokenData::RightParen => {
        Err(unexpected(token))
      }
    }
  }

  fn parse_call(&self, cursor: &mut TokenCursor<'_>, name: &str, span: Span) -> Result<Expr, ParseError> {
    let mut args = Vec::new();
    if cursor.peek().map(|t| &t.data) == Some(&TokenData::RightParen) {
      cursor.advance();
    } else {
      loop {
        args.push(self.parse_chain(cursor)?);
        let eof = cursor.eof;
        let token = cursor.next().ok_or(ParseError::UnexpectedEOF(eof))?;
        match token.data {
          TokenData::Comma => continue,
          TokenData::RightParen => break,
          _ => return Err(unexpected(token)),
        }
      }
    }
    let expected = self.function_table.get(name).map_or(args.len(), |f| f.arity());
    if expected != args.len() {
      return Err(ParseError::WrongArity { name: name.to_owned(), expected, actual: args.len(), span });
    }
    Ok(Expr::call(name, args))
  }

  fn resolve_name(&self, name: &str, span: Span) -> Result<Expr, ParseError> {
    if name == self.var.as_str() {
      return Ok(Expr::var(self.var.clone()));
    }
    match name {
      "pi" => Ok(Expr::number(PI)),
      "e" => Ok(Expr::number(E)),
      _ => Err(ParseError::UnknownVariable { name: name.to_owned(), span }),
    }
  }

  fn expect_right_paren(&self, cursor: &mut TokenCursor<'_>) -> Result<(), ParseError> {
    let eof = cursor.eof;
    let token = cursor.next().ok_or(ParseError::UnexpectedEOF(eof))?;
    if token.data == TokenData::RightParen {
      Ok(())
    } else {
      Err(unexpected(token))
    }
  }
}

impl<'t> TokenCursor<'t> {
  fn peek(&self) -> Option<&'t Token> {
    self.tokens.get(self.position)
  }

  fn peek_span(&self) -> Span {
    self.peek().map_or(Span::point(self.eof), |t| t.span)
  }

  fn advance(&mut self) {
    self.position += 1;
  }

  fn next(&mut self) -> Option<&'t Token> {
    let token = self.peek()?;
    self.advance();
    Some(token)
  }
}

fn unexpected(token: &Token) -> ParseError {
  ParseError::UnexpectedToken { token: token.data.to_string(), span: token.span }
}

impl ExprShuntingYardDriver {
  pub fn new() -> Self {
    Self {}
  }
}

impl ShuntingYardDriver<Expr> for ExprShuntingYardDriver {
  type Output = Expr;
  type Error = Infallible;

  fn compile_scalar(&mut self, scalar: Expr) -> Result<Expr, Infallible> {
    Ok(scalar)
  }

  fn compile_infix_op(&mut self, left: Expr, oper: &Operator, right: Expr) -> Result<Expr, Infallible> {
    Ok(Expr::call(oper.name(), vec![left, right]))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::function::STANDARD_FUNCTIONS;

  fn parse(input: &str) -> Result<Expr, ParseError> {
    let operators = OperatorTable::arithmetic();
    let var = Var::x();
    let parser = ExprParser::new(&operators, &STANDARD_FUNCTIONS, &var);
    parser.parse(input)
  }

  fn x() -> Expr {
    Expr::var(Var::x())
  }

  fn n(value: f64) -> Expr {
    Expr::number(value)
  }

  fn span(start: usize, end: usize) -> Span {
    Span::new(SourceOffset(start), SourceOffset(end))
  }

  #[test]
  fn test_precedence() {
    assert_eq!(
      parse("x^3 - 7.89*x - 11").unwrap(),
      x().pow(n(3.0)) - n(7.89) * x() - n(11.0),
    );
    assert_eq!(parse("1 + 2 * x").unwrap(), n(1.0) + n(2.0) * x());
    assert_eq!(parse("(1 + 2) * x").unwrap(), (n(1.0) + n(2.0)) * x());
  }

  #[test]
  fn test_power_is_right_associative() {
    assert_eq!(parse("x^2^3").unwrap(), x().pow(n(2.0).pow(n(3.0))));
    assert_eq!(parse("x^-2").unwrap(), x().pow(n(-2.0)));
  }

  #[test]
  fn test_unary_minus() {
    assert_eq!(parse("-x^2").unwrap(), -x().pow(n(2.0)));
    assert_eq!(parse("-2").unwrap(), n(-2.0));
    assert_eq!(parse("-x * 2").unwrap(), -x() * n(2.0));
    assert_eq!(parse("2 - -x").unwrap(), n(2.0) - -x());
    assert_eq!(parse("+x").unwrap(), x());
  }

  #[test]
  fn test_implicit_multiplication() {
    assert_eq!(parse("2x").unwrap(), n(2.0) * x());
    assert_eq!(parse("3(x + 1)").unwrap(), n(3.0) * (x() + n(1.0)));
    assert_eq!(parse("2sin(x)").unwrap(), n(2.0) * Expr::apply("sin", x()));
    assert_eq!(parse("2x^2").unwrap(), n(2.0) * x().pow(n(2.0)));
    assert_eq!(parse("x(x + 1)").unwrap(), x() * (x() + n(1.0)));
  }

  #[test]
  fn test_implicit_multiplication_binds_tighter_than_division() {
    assert_eq!(parse("x/2x").unwrap(), x() / (n(2.0) * x()));
    assert_eq!(parse("1/2x^2").unwrap(), n(1.0) / (n(2.0) * x().pow(n(2.0))));
    assert_eq!(parse("2x/3").unwrap(), (n(2.0) * x()) / n(3.0));
    assert_eq!(parse("x/2*x").unwrap(), (x() / n(2.0)) * x());
    assert_eq!(parse("2x^3").unwrap(), n(2.0) * x().pow(n(3.0)));
  }

  #[test]
  fn test_constants() {
    assert_eq!(parse("pi").unwrap(), n(PI));
    assert_eq!(parse("e^x").unwrap(), n(E).pow(x()));
  }

  #[test]
  fn test_function_calls() {
    assert_eq!(parse("root(x, 3)").unwrap(), Expr::call("root", vec![x(), n(3.0)]));
    assert_eq!(parse("exp(-x) - x").unwrap(), Expr::apply("exp", -x()) - x());
  }

  #[test]
  fn test_round_trip_through_display() {
    for text in ["x^3 - 7.89 * x - 11", "-x^2 + 1", "(x + 1)^(1 / 3)", "root(-(-11 - 7.89 * x), 3)", "x - (-x)"] {
      let expr = parse(text).unwrap();
      assert_eq!(parse(&expr.to_string()).unwrap(), expr, "{text}");
    }
  }

  #[test]
  fn test_errors() {
    assert_eq!(parse(""), Err(ParseError::EmptyInput));
    assert_eq!(parse("   "), Err(ParseError::EmptyInput));
    assert_eq!(parse("x +"), Err(ParseError::UnexpectedEOF(SourceOffset(3))));
    assert_eq!(parse("(x + 1"), Err(ParseError::UnexpectedEOF(SourceOffset(6))));
    assert_eq!(
      parse("y + 1"),
      Err(ParseError::UnknownVariable { name: String::from("y"), span: span(0, 1) }),
    );
    assert_eq!(
      parse("foo(x)"),
      Err(ParseError::UnknownFunction { name: String::from("foo"), span: span(0, 4) }),
    );
    assert!(matches!(parse("sin(x, 2)"), Err(ParseError::WrongArity { expected: 1, actual: 2, .. })));
    assert!(matches!(parse("x )"), Err(ParseError::UnexpectedToken { .. })));
    assert!(matches!(parse("x $ 1"), Err(ParseError::Tokenizer(_))));
  }
}
