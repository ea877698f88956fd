
use std::collections::{hash_map, HashMap};

/// A table of binary operators, indexed by their symbol.
#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
  mapping: HashMap<String, Operator>,
}

/// A binary infix operator: a symbol with a precedence and an
/// associativity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
  name: String,
  assoc: Associativity,
  prec: Precedence,
}

/// The precedence of an operator. Higher binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Precedence(u64);

/// The associativity of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Associativity {
  left_assoc: bool,
  right_assoc: bool,
}

impl OperatorTable {
  pub fn new() -> OperatorTable {
    OperatorTable::default()
  }

  pub fn with_capacity(capacity: usize) -> OperatorTable {
    OperatorTable {
      mapping: HashMap::with_capacity(capacity),
    }
  }

  pub fn get(&self, name: &str) -> Option<&Operator> {
    self.mapping.get(name)
  }

  pub fn insert(&mut self, op: Operator) -> Option<Operator> {
    let name = op.name().to_owned();
    self.mapping.insert(name, op)
  }

  /// The five arithmetic operators of real-valued function text.
  /// Multiplication and division share a level and associate to the
  /// left, as do addition and subtraction; exponentiation binds
  /// tightest and associates to the right.
  pub fn arithmetic() -> OperatorTable {
    vec![
      Operator::new("^", Associativity::RIGHT, Precedence::new(200)),
      Operator::new("*", Associativity::LEFT, Precedence::new(190)),
      Operator::new("/", Associativity::LEFT, Precedence::new(190)),
      Operator::new("+", Associativity::LEFT, Precedence::new(180)),
      Operator::new("-", Associativity::LEFT, Precedence::new(180)),
    ].into_iter().collect()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Operator> {
    self.mapping.values()
  }
}

impl Operator {
  pub fn new(name: impl Into<String>, assoc: Associativity, prec: Precedence) -> Operator {
    Operator {
      name: name.into(),
      assoc,
      prec,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn associativity(&self) -> Associativity {
    self.assoc
  }

  pub fn precedence(&self) -> Precedence {
    self.prec
  }

  /// The precedence an expression on the left-hand side of this
  /// operator must have to be written without parentheses.
  pub fn left_precedence(&self) -> Precedence {
    if self.assoc.is_left_assoc() {
      self.prec
    } else {
      self.prec.incremented()
    }
  }

  /// The precedence an expression on the right-hand side of this
  /// operator must have to be written without parentheses.
  pub fn right_precedence(&self) -> Precedence {
    if self.assoc.is_right_assoc() {
      self.prec
    } else {
      self.prec.incremented()
    }
  }
}

impl Associativity {
  pub const LEFT: Associativity = Associativity {
    left_assoc: true,
    right_assoc: false,
  };
  pub const RIGHT: Associativity = Associativity {
    left_assoc: false,
    right_assoc: true,
  };
  /// A non-associative operator, which always requires parentheses
  /// for nested applications of itself.
  pub const NONE: Associativity = Associativity {
    left_assoc: false,
    right_assoc: false,
  };
  pub const fn is_left_assoc(self) -> bool {
    self.left_assoc
  }
  pub const fn is_right_assoc(self) -> bool {
    self.right_assoc
  }
}

impl Precedence {
  pub const MIN: Precedence = Precedence(0);
  pub const MAX: Precedence = Precedence(u64::MAX);

  /// Precedences are stored as ten times the input value, leaving
  /// room to increment a level by one when representing
  /// associativity. A left-associative operator at internal level `p`
  /// accepts a left operand at `p` and requires `p + 1` on its right.
  pub fn new(n: u64) -> Precedence {
    Precedence(n * 10)
  }

  pub fn from_raw(n: u64) -> Precedence {
    Precedence(n)
  }

  pub fn incremented(self) -> Precedence {
    Precedence(self.0 + 1)
  }
}

impl IntoIterator for OperatorTable {
  type Item = Operator;
  type IntoIter = hash_map::IntoValues<String, Operator>;

  fn into_iter(self) -> Self::IntoIter {
    self.mapping.into_values()
  }
}

impl FromIterator<Operator> for OperatorTable {
  fn from_iter<I>(iter: I) -> Self
  where I : IntoIterator<Item = Operator> {
    let iter = iter.into_iter();
    let (len_bound, _) = iter.size_hint();
    let mut table = OperatorTable::with_capacity(len_bound);
    for op in iter {
      table.insert(op);
    }
    table
  }
}
