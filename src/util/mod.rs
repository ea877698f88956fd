//! Various utility functions.

use regex::{Regex, escape};

use std::cmp::Reverse;

/// Constructs a regex which matches any string in `options`. Applies
/// the function `helper` to the resulting regex string before
/// compilation. If the result of `helper` is not a valid regular
/// expression, this function will panic.
pub fn regex_opt_with<'a, I, F>(options: I, helper: F) -> Regex
where I : IntoIterator<Item = &'a str>,
      F : FnOnce(String) -> String {
  // Longer alternatives first, so we always match the longest thing
  // we can.
  let mut options: Vec<_> = options.into_iter().collect();
  options.sort_by_key(|a| Reverse(a.len()));

  let regex_str = options.into_iter().map(escape).collect::<Vec<_>>().join("|");
  let regex_str = helper(format!("(?:{regex_str})"));
  Regex::new(&regex_str).unwrap_or_else(|_| {
    panic!("Invalid regular expression: {}", regex_str);
  })
}

pub fn clamp<T: PartialOrd>(val: T, min: T, max: T) -> T {
  if val < min { min } else if val > max { max } else { val }
}

/// Rounds `value` to `decimal_places` digits after the point.
/// Non-finite values are returned unchanged.
pub fn round_to(value: f64, decimal_places: u32) -> f64 {
  if !value.is_finite() {
    return value;
  }
  let scale = 10f64.powi(decimal_places as i32);
  let rounded = (value * scale).round() / scale;
  if rounded.is_finite() { rounded } else { value }
}
