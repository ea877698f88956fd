
//! Rewrites common alternative spellings in function text into the
//! forms the parser understands.

use regex::{Captures, Regex};
use once_cell::sync::Lazy;

static WORD_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"[a-zA-Z_][a-zA-Z0-9_]*").unwrap()
});

static RADICAL_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"√\s*([0-9]*\.?[0-9]+|[a-zA-Z_][a-zA-Z0-9_]*)?").unwrap()
});

/// Normalizes the spelling of `text`:
///
/// * `**` becomes `^`,
/// * `arcsin`, `arccos`, `arctan` become `asin`, `acos`, `atan`,
/// * `lg` becomes `log10`, `sen` becomes `sin`, `tg` becomes `tan`,
/// * `√` becomes `sqrt` and `π` becomes `pi`,
/// * an uppercase `X` becomes the variable `x`,
/// * `×`, `÷` and `−` become their ASCII operators,
///
/// and surrounding whitespace is removed.
pub fn normalize_spelling(text: &str) -> String {
  let text = text.trim()
    .replace("**", "^")
    .replace('×', "*")
    .replace('÷', "/")
    .replace('−', "-")
    .replace('π', "pi");
  let text = RADICAL_RE.replace_all(&text, |caps: &Captures| {
    match caps.get(1) {
      Some(operand) => format!("sqrt({})", operand.as_str()),
      None => String::from("sqrt"),
    }
  });
  let text = WORD_RE.replace_all(&text, |caps: &Captures| {
    let word = &caps[0];
    match word {
      "arcsin" => "asin",
      "arccos" => "acos",
      "arctan" => "atan",
      "lg" => "log10",
      "sen" => "sin",
      "tg" => "tan",
      "X" => "x",
      _ => word,
    }.to_owned()
  });
  text.into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_python_power() {
    assert_eq!(normalize_spelling("  -x**3 + 7.89*x + 11 "), "-x^3 + 7.89*x + 11");
  }

  #[test]
  fn test_function_aliases() {
    assert_eq!(normalize_spelling("arcsin(x) + arccos(x)"), "asin(x) + acos(x)");
    assert_eq!(normalize_spelling("lg(x) - sen(x) * tg(x)"), "log10(x) - sin(x) * tan(x)");
    // Only whole words are rewritten.
    assert_eq!(normalize_spelling("sign(x) + tgx"), "sign(x) + tgx");
    assert_eq!(normalize_spelling("2X^2"), "2x^2");
  }

  #[test]
  fn test_symbols() {
    assert_eq!(normalize_spelling("√(X) − π"), "sqrt(x) - pi");
    assert_eq!(normalize_spelling("√x × 2 ÷ 3"), "sqrt(x) * 2 / 3");
    assert_eq!(normalize_spelling("√2"), "sqrt(2)");
  }

  #[test]
  fn test_plain_text_untouched() {
    assert_eq!(normalize_spelling("exp(-x) - x"), "exp(-x) - x");
  }
}
