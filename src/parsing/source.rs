
use std::fmt::{self, Display, Formatter};
use std::ops::{Add, AddAssign};

/// Byte position in the function text being parsed. Reported in
/// parse errors so the caller can point at the offending character.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceOffset(pub usize);

/// A half-open range of source offsets: `start` is included, `end` is
/// not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
  pub start: SourceOffset,
  pub end: SourceOffset,
}

impl Span {
  pub fn new(start: SourceOffset, end: SourceOffset) -> Self {
    Self { start, end }
  }

  /// An empty span sitting at `pos`. Used for end-of-input errors.
  pub fn point(pos: SourceOffset) -> Self {
    Self { start: pos, end: pos }
  }

  /// The smallest span covering both `self` and `other`.
  pub fn to(self, other: Span) -> Span {
    Span {
      start: self.start.min(other.start),
      end: self.end.max(other.end),
    }
  }
}

impl From<usize> for SourceOffset {
  fn from(i: usize) -> Self {
    SourceOffset(i)
  }
}

impl Display for SourceOffset {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl Add<usize> for SourceOffset {
  type Output = Self;

  fn add(self, rhs: usize) -> Self::Output {
    Self(self.0 + rhs)
  }
}

impl AddAssign<usize> for SourceOffset {
  fn add_assign(&mut self, rhs: usize) {
    self.0 += rhs
  }
}

impl Display for Span {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    if self.start == self.end {
      write!(f, "{}", self.start)
    } else {
      write!(f, "{}-{}", self.start, self.end)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_span_to() {
    let a = Span::new(SourceOffset(2), SourceOffset(4));
    let b = Span::new(SourceOffset(7), SourceOffset(9));
    assert_eq!(a.to(b), Span::new(SourceOffset(2), SourceOffset(9)));
    assert_eq!(b.to(a), Span::new(SourceOffset(2), SourceOffset(9)));
  }

  #[test]
  fn test_span_display() {
    assert_eq!(Span::new(SourceOffset(1), SourceOffset(3)).to_string(), "1-3");
    assert_eq!(Span::point(SourceOffset(5)).to_string(), "5");
  }
}
