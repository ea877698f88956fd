
//! A cursor over function text, with helpers for matching literals
//! and anchored regular expressions.

use super::source::{SourceOffset, Span};
use crate::util::clamp;

use regex::{Regex, Captures};
use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct TokenizerState<'a> {
  whole_input: &'a str,
  input: &'a str,
  position: SourceOffset,
}

#[derive(Debug, Clone)]
pub struct TokenizerMatch<'a> {
  matched_str: &'a str,
  start: SourceOffset,
  end: SourceOffset,
}

#[derive(Debug)]
pub struct TokenizerCaptures<'a> {
  captures: Captures<'a>,
  start: SourceOffset,
  end: SourceOffset,
}

impl<'a> TokenizerState<'a> {
  pub fn new(input: &'a str) -> Self {
    Self {
      whole_input: input,
      input,
      position: SourceOffset(0)
    }
  }

  /// Total length of the input, regardless of the current position.
  pub fn len(&self) -> usize {
    self.whole_input.len()
  }

  pub fn is_empty(&self) -> bool {
    self.whole_input.is_empty()
  }

  pub fn remaining_len(&self) -> usize {
    self.input.len()
  }

  pub fn is_eof(&self) -> bool {
    self.input.is_empty()
  }

  pub fn peek(&self) -> Option<char> {
    self.input.chars().next()
  }

  /// Seeks to an absolute position in the string. Out of bounds
  /// positions are clamped to the end of the input.
  pub fn seek(&mut self, pos: SourceOffset) {
    let pos = clamp(pos, SourceOffset(0), SourceOffset(self.len()));
    self.position = pos;
    self.input = &self.whole_input[pos.0..];
  }

  /// Advances by `amount` bytes (never past the end of the input) and
  /// returns the skipped text.
  pub fn advance(&mut self, amount: usize) -> TokenizerMatch<'a> {
    let amount = amount.min(self.input.len());

    let match_pos = self.current_pos();
    let input: &'a str = self.input;
    let (prefix, suffix) = input.split_at(amount);
    self.position += amount;
    self.input = suffix;
    TokenizerMatch {
      matched_str: prefix,
      start: match_pos,
      end: match_pos + amount,
    }
  }

  /// Advances past the next character, which may span several bytes.
  pub fn advance_char(&mut self) -> Option<TokenizerMatch<'a>> {
    let ch = self.peek()?;
    Some(self.advance(ch.len_utf8()))
  }

  pub fn current_pos(&self) -> SourceOffset {
    self.position
  }

  pub fn read_literal(&mut self, literal: &str) -> Option<TokenizerMatch<'a>> {
    self.input.starts_with(literal).then(|| {
      self.advance(literal.len())
    })
  }

  /// If the input at the current position matches `regex`, consumes
  /// and returns the match.
  ///
  /// The regex MUST be anchored at the start of the input. This
  /// function panics if that precondition is not satisfied.
  pub fn read_regex(&mut self, regex: &Regex) -> Option<TokenizerMatch<'a>> {
    let input: &'a str = self.input;
    let m = regex.find(input)?;
    assert_eq!(m.start(), 0, "Regex must be anchored at the start of the input");

    Some(self.advance(m.len()))
  }

  pub fn read_regex_with_captures(&mut self, regex: &Regex) -> Option<TokenizerCaptures<'a>> {
    let input: &'a str = self.input;
    let c = regex.captures(input)?;
    let whole = c.get(0)?; // Group zero is always present on a match.
    assert_eq!(whole.start(), 0, "Regex must be anchored at the start of the input");
    let m = self.advance(whole.len());
    Some(TokenizerCaptures {
      captures: c,
      start: m.start(),
      end: m.end(),
    })
  }

  pub fn consume_spaces(&mut self) {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*").unwrap());
    self.read_regex(&RE);
  }
}

impl<'h> TokenizerMatch<'h> {
  pub fn as_str(&self) -> &'h str {
    self.matched_str
  }
  pub fn start(&self) -> SourceOffset {
    self.start
  }
  pub fn end(&self) -> SourceOffset {
    self.end
  }
  pub fn span(&self) -> Span {
    Span::new(self.start, self.end)
  }
  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }
}

impl<'h> TokenizerCaptures<'h> {
  pub fn get(&self, i: usize) -> Option<&'h str> {
    self.captures.get(i).map(|m| m.as_str())
  }
  pub fn span(&self) -> Span {
    Span::new(self.start, self.end)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_len_is_independent_of_position() {
    let mut state = TokenizerState::new("x^2 - 4");
    assert_eq!(state.len(), 7);
    state.advance(3);
    assert_eq!(state.len(), 7);
    assert_eq!(state.remaining_len(), 4);
    state.advance(99);
    assert_eq!(state.remaining_len(), 0);
    assert!(state.is_eof());
  }

  #[test]
  fn test_seek() {
    let mut state = TokenizerState::new("sin(x)");
    state.seek(SourceOffset(4));
    assert_eq!(state.peek(), Some('x'));
    state.seek(SourceOffset(1));
    assert_eq!(state.peek(), Some('i'));
    state.seek(SourceOffset(999));
    assert_eq!(state.current_pos(), SourceOffset(6));
    assert_eq!(state.peek(), None);
  }

  #[test]
  fn test_advance_positions() {
    let mut state = TokenizerState::new("exp(x)");
    let m = state.advance(3);
    assert_eq!(m.as_str(), "exp");
    assert_eq!(m.span(), Span::new(SourceOffset(0), SourceOffset(3)));
    let m = state.advance(99);
    assert_eq!(m.as_str(), "(x)");
    assert_eq!(m.start(), SourceOffset(3));
    assert_eq!(m.end(), SourceOffset(6));
    let m = state.advance(1);
    assert!(m.is_empty());
  }

  #[test]
  fn test_advance_char_multibyte() {
    let mut state = TokenizerState::new("πx");
    let m = state.advance_char().unwrap();
    assert_eq!(m.as_str(), "π");
    assert_eq!(state.peek(), Some('x'));
  }

  #[test]
  fn test_read_literal() {
    let mut state = TokenizerState::new("(x+1)");
    assert!(state.read_literal("x").is_none());
    assert_eq!(state.current_pos(), SourceOffset(0));
    let m = state.read_literal("(").unwrap();
    assert_eq!(m.span(), Span::new(SourceOffset(0), SourceOffset(1)));
    assert!(state.read_literal("x").is_some());
    assert_eq!(state.current_pos(), SourceOffset(2));
  }

  #[test]
  fn test_read_regex() {
    let re = Regex::new(r"^[0-9]+").unwrap();
    let mut state = TokenizerState::new("42x");
    let m = state.read_regex(&re).unwrap();
    assert_eq!(m.as_str(), "42");
    assert!(state.read_regex(&re).is_none());
    assert_eq!(state.current_pos(), SourceOffset(2));
  }

  #[test]
  fn test_read_regex_with_captures() {
    let re = Regex::new(r"^([a-z]+)\(").unwrap();
    let mut state = TokenizerState::new("cos(x)");
    let m = state.read_regex_with_captures(&re).unwrap();
    assert_eq!(m.get(1), Some("cos"));
    assert_eq!(m.span(), Span::new(SourceOffset(0), SourceOffset(4)));
    assert_eq!(state.peek(), Some('x'));

    let mut state = TokenizerState::new("cos x");
    assert!(state.read_regex_with_captures(&re).is_none());
    assert_eq!(state.current_pos(), SourceOffset(0));
  }

  #[test]
  fn test_consume_spaces() {
    let mut state = TokenizerState::new("   x  + 1");
    state.consume_spaces();
    assert_eq!(state.current_pos(), SourceOffset(3));
    state.consume_spaces();
    assert_eq!(state.current_pos(), SourceOffset(3));
  }
}
