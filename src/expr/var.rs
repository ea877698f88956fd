
use regex::Regex;
use once_cell::sync::Lazy;
use serde::{Serialize, Deserialize};

use std::fmt::{self, Display, Formatter};

/// The free variable of a function.
///
/// A variable's name must begin with a letter, followed by zero or
/// more letters, digits, or underscores. This structure enforces
/// these constraints.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Var(String);

#[derive(Clone, Debug, thiserror::Error)]
#[error("'{original_string}' is not a valid variable name")]
pub struct TryFromStringError {
  original_string: String,
}

pub static VALID_NAME_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").unwrap()
});

impl Var {
  pub fn new(name: impl Into<String>) -> Option<Self> {
    Self::try_from(name.into()).ok()
  }

  /// The variable `x`, which every function text is written in.
  pub fn x() -> Self {
    Self(String::from("x"))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Default for Var {
  fn default() -> Self {
    Self::x()
  }
}

impl TryFrom<String> for Var {
  type Error = TryFromStringError;

  fn try_from(name: String) -> Result<Self, Self::Error> {
    if VALID_NAME_RE.is_match(&name) {
      Ok(Self(name))
    } else {
      Err(TryFromStringError { original_string: name })
    }
  }
}

impl From<Var> for String {
  fn from(v: Var) -> Self {
    v.0
  }
}

impl Display for Var {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
