
//! Resolution of a flat chain `a op b op c ...` into a tree according
//! to operator precedence and associativity.

use super::operator::Operator;
use super::source::Span;

use std::error::{Error as StdError};
use std::fmt::{self, Display, Formatter};

/// A token, for the purposes of the shunting yard algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<T> {
  data: TokenData<T>,
  span: Span,
}

/// Tracks an output value together with the span of the first token
/// that produced it, for error reporting.
#[derive(Debug, Clone)]
struct OutputWithSpan<O> {
  output: O,
  span: Span,
}

#[derive(Clone, Debug)]
struct OpStackValue {
  operator: Operator,
  span: Span,
}

#[derive(Debug, Clone, PartialEq)]
enum TokenData<T> {
  /// An already-parsed operand.
  Scalar(T),
  /// A binary infix operator.
  InfixOperator(Operator),
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ShuntingYardError<E: StdError> {
  CustomError(E),
  /// An operator was missing one of its operands.
  MissingOperand(Span),
  /// Two operands appeared with no operator between them.
  DanglingOperand(Span),
  /// The token chain was empty.
  Empty,
}

/// A type implementing this trait drives the shunting yard algorithm,
/// compiling operands and operator applications into its own output
/// type.
pub trait ShuntingYardDriver<T> {
  type Output;
  type Error: StdError;

  fn compile_scalar(&mut self, scalar: T) -> Result<Self::Output, Self::Error>;
  fn compile_infix_op(
    &mut self,
    left: Self::Output,
    op: &Operator,
    right: Self::Output,
  ) -> Result<Self::Output, Self::Error>;
}

impl<T> Token<T> {
  pub fn scalar(data: T, span: Span) -> Self {
    Self { data: TokenData::Scalar(data), span }
  }

  pub fn infix_operator(op: Operator, span: Span) -> Self {
    Self { data: TokenData::InfixOperator(op), span }
  }

  pub fn span(&self) -> Span {
    self.span
  }
}

impl<E: StdError> Display for ShuntingYardError<E> {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
    match self {
      ShuntingYardError::CustomError(e) =>
        write!(f, "{}", e),
      ShuntingYardError::MissingOperand(span) =>
        write!(f, "operator at position {} is missing an operand", span),
      ShuntingYardError::DanglingOperand(span) =>
        write!(f, "unexpected operand at position {}", span),
      ShuntingYardError::Empty =>
        write!(f, "empty expression"),
    }
  }
}

impl<E> StdError for ShuntingYardError<E>
where E: StdError + 'static {
  fn source(&self) -> Option<&(dyn StdError + 'static)> {
    match self {
      ShuntingYardError::CustomError(e) => Some(e),
      _ => None,
    }
  }
}

impl<E: StdError> From<E> for ShuntingYardError<E> {
  fn from(e: E) -> Self {
    Self::CustomError(e)
  }
}

pub fn parse<T, D, I>(
  driver: &mut D,
  input: I
) -> Result<D::Output, ShuntingYardError<D::Error>>
where D: ShuntingYardDriver<T>,
      I: IntoIterator<Item = Token<T>> {
  let mut operator_stack: Vec<OpStackValue> = Vec::new();
  let mut output_stack: Vec<OutputWithSpan<D::Output>> = Vec::new();
  for token in input {
    match token.data {
      TokenData::Scalar(t) => {
        let output = driver.compile_scalar(t)?;
        output_stack.push(OutputWithSpan { output, span: token.span });
      }
      TokenData::InfixOperator(op) => {
        // Pop operators until we hit one that binds less tightly.
        while let Some(stack_value) = operator_stack.pop() {
          if compare_precedence(&stack_value.operator, &op) {
            simplify_operator(driver, &mut output_stack, stack_value)?;
          } else {
            operator_stack.push(stack_value);
            break;
          }
        }
        operator_stack.push(OpStackValue { operator: op, span: token.span });
      }
    }
  }

  while let Some(stack_value) = operator_stack.pop() {
    simplify_operator(driver, &mut output_stack, stack_value)?;
  }

  let final_result = output_stack.pop().ok_or(ShuntingYardError::Empty)?;
  if let Some(remaining_value) = output_stack.pop() {
    return Err(ShuntingYardError::DanglingOperand(remaining_value.span));
  }
  Ok(final_result.output)
}

fn compare_precedence(stack_op: &Operator, current_op: &Operator) -> bool {
  stack_op.precedence() > current_op.precedence() ||
    (stack_op.precedence() == current_op.precedence() && current_op.associativity().is_left_assoc())
}

fn simplify_operator<D, T>(
  driver: &mut D,
  output_stack: &mut Vec<OutputWithSpan<D::Output>>,
  stack_value: OpStackValue,
) -> Result<(), ShuntingYardError<D::Error>>
where D: ShuntingYardDriver<T> {
  let (arg1, arg2) = output_stack.pop()
    .and_then(|arg2| output_stack.pop().map(|arg1| (arg1, arg2)))
    .ok_or(ShuntingYardError::MissingOperand(stack_value.span))?;
  let output = driver.compile_infix_op(arg1.output, &stack_value.operator, arg2.output)?;
  output_stack.push(OutputWithSpan { output, span: arg1.span });
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parsing::source::SourceOffset;
  use crate::parsing::operator::{Precedence, Associativity};

  use std::convert::Infallible;

  #[derive(Debug, Clone, PartialEq, Eq)]
  enum TestExpr {
    Scalar(i64),
    InfixOp(Box<TestExpr>, String, Box<TestExpr>),
  }

  #[derive(Clone, Debug)]
  struct TestDriver;

  impl TestExpr {
    fn infix_op(left: TestExpr, op: impl Into<String>, right: TestExpr) -> Self {
      Self::InfixOp(Box::new(left), op.into(), Box::new(right))
    }
  }

  impl ShuntingYardDriver<i64> for TestDriver {
    type Output = TestExpr;
    type Error = Infallible;

    fn compile_scalar(&mut self, scalar: i64) -> Result<Self::Output, Self::Error> {
      Ok(TestExpr::Scalar(scalar))
    }

    fn compile_infix_op(
      &mut self,
      left: Self::Output,
      op: &Operator,
      right: Self::Output,
    ) -> Result<Self::Output, Self::Error> {
      Ok(TestExpr::infix_op(left, op.name(), right))
    }
  }

  fn minus() -> Operator {
    Operator::new("-", Associativity::LEFT, Precedence::new(10))
  }

  fn times() -> Operator {
    Operator::new("*", Associativity::LEFT, Precedence::new(20))
  }

  fn pow() -> Operator {
    Operator::new("^", Associativity::RIGHT, Precedence::new(30))
  }

  fn span(start: usize, end: usize) -> Span {
    Span::new(SourceOffset(start), SourceOffset(end))
  }

  fn chain(ops: Vec<Operator>) -> Vec<Token<i64>> {
    let mut tokens = vec![Token::scalar(1, span(0, 1))];
    for (i, op) in ops.into_iter().enumerate() {
      let pos = 2 * i + 1;
      tokens.push(Token::infix_operator(op, span(pos, pos + 1)));
      tokens.push(Token::scalar(i as i64 + 2, span(pos + 1, pos + 2)));
    }
    tokens
  }

  #[test]
  fn test_left_assoc_op() {
    let result = parse(&mut TestDriver, chain(vec![minus(), minus()])).unwrap();
    assert_eq!(
      result,
      TestExpr::infix_op(
        TestExpr::infix_op(TestExpr::Scalar(1), "-", TestExpr::Scalar(2)),
        "-",
        TestExpr::Scalar(3),
      ),
    );
  }

  #[test]
  fn test_right_assoc_op() {
    let result = parse(&mut TestDriver, chain(vec![pow(), pow()])).unwrap();
    assert_eq!(
      result,
      TestExpr::infix_op(
        TestExpr::Scalar(1),
        "^",
        TestExpr::infix_op(TestExpr::Scalar(2), "^", TestExpr::Scalar(3)),
      ),
    );
  }

  #[test]
  fn test_higher_precedence_on_right() {
    let result = parse(&mut TestDriver, chain(vec![minus(), times()])).unwrap();
    assert_eq!(
      result,
      TestExpr::infix_op(
        TestExpr::Scalar(1),
        "-",
        TestExpr::infix_op(TestExpr::Scalar(2), "*", TestExpr::Scalar(3)),
      ),
    );
  }

  #[test]
  fn test_higher_precedence_on_left() {
    let result = parse(&mut TestDriver, chain(vec![times(), minus()])).unwrap();
    assert_eq!(
      result,
      TestExpr::infix_op(
        TestExpr::infix_op(TestExpr::Scalar(1), "*", TestExpr::Scalar(2)),
        "-",
        TestExpr::Scalar(3),
      ),
    );
  }

  #[test]
  fn test_missing_operand() {
    let tokens = vec![
      Token::scalar(1, span(0, 1)),
      Token::infix_operator(minus(), span(1, 2)),
    ];
    let err = parse(&mut TestDriver, tokens).unwrap_err();
    assert!(matches!(err, ShuntingYardError::MissingOperand(s) if s == span(1, 2)));
  }

  #[test]
  fn test_dangling_operand() {
    let tokens = vec![
      Token::scalar(1, span(0, 1)),
      Token::scalar(2, span(2, 3)),
    ];
    let err = parse(&mut TestDriver, tokens).unwrap_err();
    assert!(matches!(err, ShuntingYardError::DanglingOperand(s) if s == span(0, 1)));
  }

  #[test]
  fn test_empty() {
    let err = parse(&mut TestDriver, Vec::<Token<i64>>::new()).unwrap_err();
    assert!(matches!(err, ShuntingYardError::Empty));
  }
}
