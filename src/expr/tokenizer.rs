
//! Splits function text into tokens.

use crate::parsing::operator::{Operator, OperatorTable};
use crate::parsing::source::{Span, SourceOffset};
use crate::parsing::tokenizer::TokenizerState;
use crate::util::regex_opt_with;

use regex::Regex;
use once_cell::sync::Lazy;
use thiserror::Error;

use std::fmt::{self, Display, Formatter};

#[derive(Clone, Debug)]
pub struct ExprTokenizer<'a> {
  operator_table: &'a OperatorTable,
  operator_regex: Regex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
  pub data: TokenData,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenData {
  Number(f64),
  /// A bare name: the variable or a constant.
  Identifier(String),
  Operator(Operator),
  /// A name immediately followed by an opening parenthesis.
  FunctionCallStart(String),
  LeftParen,
  Comma,
  RightParen,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum TokenizerError {
  #[error("Expected token, but found EOF at {0}")]
  UnexpectedEOF(SourceOffset),
  #[error("Unexpected character '{0}' at {1}")]
  UnexpectedChar(char, SourceOffset),
  #[error("Invalid number '{0}' at {1}")]
  InvalidNumber(String, Span),
}

impl<'a> ExprTokenizer<'a> {
  pub fn new(operator_table: &'a OperatorTable) -> Self {
    let operator_names = operator_table.iter().map(|op| op.name());
    let operator_regex = regex_opt_with(operator_names, |s| format!("^{s}"));
    Self { operator_table, operator_regex }
  }

  pub fn read_tokens(&self, state: &mut TokenizerState<'_>) -> Result<Vec<Token>, TokenizerError> {
    let start_pos = state.current_pos();
    let mut tokens = Vec::new();
    loop {
      state.consume_spaces();
      match self.read_one_token(state) {
        Ok(token) => {
          tokens.push(token);
        }
        Err(TokenizerError::UnexpectedEOF(_)) => {
          return Ok(tokens);
        }
        Err(err) => {
          state.seek(start_pos);
          return Err(err);
        }
      }
    }
  }

  pub fn read_one_token(&self, state: &mut TokenizerState<'_>) -> Result<Token, TokenizerError> {
    if let Some(tok) = self.read_char_token(state) {
      Ok(tok)
    } else if let Some(tok) = self.read_function_call_token(state) {
      Ok(tok)
    } else if let Some(tok) = self.read_identifier(state) {
      Ok(tok)
    } else if let Some(res) = self.read_number_literal(state) {
      res
    } else if let Some(tok) = self.read_operator(state) {
      Ok(tok)
    } else {
      let pos = state.current_pos();
      match state.peek() {
        None => Err(TokenizerError::UnexpectedEOF(pos)),
        Some(ch) => Err(TokenizerError::UnexpectedChar(ch, pos)),
      }
    }
  }

  fn read_char_token(&self, state: &mut TokenizerState<'_>) -> Option<Token> {
    #[allow(clippy::manual_map)] // Cleaner in an if-else chain
    if let Some(m) = state.read_literal("(") {
      Some(Token::new(TokenData::LeftParen, m.span()))
    } else if let Some(m) = state.read_literal(")") {
      Some(Token::new(TokenData::RightParen, m.span()))
    } else if let Some(m) = state.read_literal(",") {
      Some(Token::new(TokenData::Comma, m.span()))
    } else {
      None
    }
  }

  fn read_function_call_token(&self, state: &mut TokenizerState<'_>) -> Option<Token> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-zA-Z_][a-zA-Z0-9_]*)\s*\(").unwrap());
    let m = state.read_regex_with_captures(&RE)?;
    let function_name = m.get(1)?;
    Some(Token::new(TokenData::FunctionCallStart(function_name.to_owned()), m.span()))
  }

  fn read_identifier(&self, state: &mut TokenizerState<'_>) -> Option<Token> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*").unwrap());
    state.read_regex(&RE).map(|m| {
      Token::new(TokenData::Identifier(m.as_str().to_owned()), m.span())
    })
  }

  fn read_operator(&self, state: &mut TokenizerState<'_>) -> Option<Token> {
    let reset_pos = state.current_pos();
    let m = state.read_regex(&self.operator_regex)?;
    match self.operator_table.get(m.as_str()) {
      Some(operator) => Some(Token::new(TokenData::Operator(operator.clone()), m.span())),
      None => {
        state.seek(reset_pos);
        None
      }
    }
  }

  fn read_number_literal(&self, state: &mut TokenizerState<'_>) -> Option<Result<Token, TokenizerError>> {
    // Signs are unary operators, not part of the literal.
    static RE: Lazy<Regex> = Lazy::new(|| {
      Regex::new(r"^(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").unwrap()
    });
    let reset_pos = state.current_pos();
    let m = state.read_regex(&RE)?;
    match m.as_str().parse::<f64>() {
      Ok(number) if number.is_finite() => {
        Some(Ok(Token::new(TokenData::Number(number), m.span())))
      }
      _ => {
        state.seek(reset_pos);
        Some(Err(TokenizerError::InvalidNumber(m.as_str().to_owned(), m.span())))
      }
    }
  }
}

impl Token {
  pub fn new(data: TokenData, span: Span) -> Self {
    Self { data, span }
  }
}

impl Display for TokenData {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      TokenData::Number(n) => write!(f, "{n}"),
      TokenData::Identifier(name) => write!(f, "{name}"),
      TokenData::Operator(op) => write!(f, "{}", op.name()),
      TokenData::FunctionCallStart(name) => write!(f, "{name}("),
      TokenData::LeftParen => write!(f, "("),
      TokenData::Comma => write!(f, ","),
      TokenData::RightParen => write!(f, ")"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn span(start: usize, end: usize) -> Span {
    Span::new(SourceOffset(start), SourceOffset(end))
  }

  fn tokenize(input: &str) -> Result<Vec<TokenData>, TokenizerError> {
    let table = OperatorTable::arithmetic();
    let tokenizer = ExprTokenizer::new(&table);
    let mut state = TokenizerState::new(input);
    let tokens = tokenizer.read_tokens(&mut state)?;
    Ok(tokens.into_iter().map(|t| t.data).collect())
  }

  fn op(name: &str) -> TokenData {
    TokenData::Operator(OperatorTable::arithmetic().get(name).unwrap().clone())
  }

  #[test]
  fn test_read_one_token_literal_char() {
    let table = OperatorTable::arithmetic();
    let tokenizer = ExprTokenizer::new(&table);

    let mut state = TokenizerState::new("(");
    let token = tokenizer.read_one_token(&mut state).unwrap();
    assert_eq!(token, Token::new(TokenData::LeftParen, span(0, 1)));

    let mut state = TokenizerState::new(",");
    let token = tokenizer.read_one_token(&mut state).unwrap();
    assert_eq!(token, Token::new(TokenData::Comma, span(0, 1)));
  }

  #[test]
  fn test_polynomial() {
    assert_eq!(
      tokenize("x^3 - 7.89*x - 11").unwrap(),
      vec![
        TokenData::Identifier(String::from("x")),
        op("^"),
        TokenData::Number(3.0),
        op("-"),
        TokenData::Number(7.89),
        op("*"),
        TokenData::Identifier(String::from("x")),
        op("-"),
        TokenData::Number(11.0),
      ],
    );
  }

  #[test]
  fn test_numbers() {
    assert_eq!(tokenize("1e-3").unwrap(), vec![TokenData::Number(0.001)]);
    assert_eq!(tokenize(".5").unwrap(), vec![TokenData::Number(0.5)]);
    assert_eq!(tokenize("2.").unwrap(), vec![TokenData::Number(2.0)]);
    // `2e` is two followed by the constant e
    assert_eq!(
      tokenize("2e").unwrap(),
      vec![TokenData::Number(2.0), TokenData::Identifier(String::from("e"))],
    );
  }

  #[test]
  fn test_function_call_start() {
    assert_eq!(
      tokenize("sin (x)").unwrap(),
      vec![
        TokenData::FunctionCallStart(String::from("sin")),
        TokenData::Identifier(String::from("x")),
        TokenData::RightParen,
      ],
    );
  }

  #[test]
  fn test_unexpected_char() {
    let table = OperatorTable::arithmetic();
    let tokenizer = ExprTokenizer::new(&table);
    let mut state = TokenizerState::new("x $ 2");
    let err = tokenizer.read_tokens(&mut state).unwrap_err();
    assert_eq!(err, TokenizerError::UnexpectedChar('$', SourceOffset(2)));
    assert_eq!(state.current_pos(), SourceOffset(0));
  }

  #[test]
  fn test_overflowing_literal() {
    let err = tokenize("1e999").unwrap_err();
    assert!(matches!(err, TokenizerError::InvalidNumber(_, _)));
  }
}
