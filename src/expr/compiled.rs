
//! Compilation of an expression tree into a flat postfix program
//! that can be evaluated repeatedly without re-walking the tree.

use super::Expr;
use super::atom::Atom;
use super::var::Var;
use super::function::{Evaluator, FunctionTable};

use thiserror::Error;

/// Reason a function could not be evaluated at a point.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[non_exhaustive]
pub enum EvalFault {
  #[error("{function} is undefined at {argument}")]
  DomainError { function: &'static str, argument: f64 },
  #[error("Division by zero")]
  DivisionByZero,
  #[error("{function} overflowed")]
  Overflow { function: &'static str },
  #[error("Expression refers to an unknown name")]
  Unresolved,
}

#[derive(Debug, Clone)]
enum Instruction {
  Constant(f64),
  LoadVar,
  Apply(Evaluator),
  /// A name that could not be resolved at compile time. Evaluating it
  /// always faults.
  Unresolved,
}

/// A compiled expression in one variable.
#[derive(Debug, Clone)]
pub struct Program {
  instructions: Vec<Instruction>,
}

impl Program {
  /// Compiles `expr` as a function of `var`. Unknown function names
  /// and other variables compile to instructions that fault on
  /// evaluation rather than failing here.
  pub fn compile(expr: &Expr, var: &Var, table: &FunctionTable) -> Program {
    let mut instructions = Vec::new();
    compile_into(expr, var, table, &mut instructions);
    Program { instructions }
  }

  pub fn eval(&self, x: f64) -> Result<f64, EvalFault> {
    let mut stack: Vec<f64> = Vec::with_capacity(self.instructions.len());
    for instruction in &self.instructions {
      let value = match instruction {
        Instruction::Constant(n) => *n,
        Instruction::LoadVar => x,
        Instruction::Apply(Evaluator::Unary(f)) => {
          let a = stack.pop().ok_or(EvalFault::Unresolved)?;
          f(a)?
        }
        Instruction::Apply(Evaluator::Binary(f)) => {
          let b = stack.pop().ok_or(EvalFault::Unresolved)?;
          let a = stack.pop().ok_or(EvalFault::Unresolved)?;
          f(a, b)?
        }
        Instruction::Unresolved => {
          return Err(EvalFault::Unresolved);
        }
      };
      stack.push(value);
    }
    match (stack.pop(), stack.is_empty()) {
      (Some(value), true) => Ok(value),
      _ => Err(EvalFault::Unresolved),
    }
  }
}

fn compile_into(expr: &Expr, var: &Var, table: &FunctionTable, out: &mut Vec<Instruction>) {
  match expr {
    Expr::Atom(Atom::Number(n)) => out.push(Instruction::Constant(*n)),
    Expr::Atom(Atom::Var(v)) => {
      if v == var {
        out.push(Instruction::LoadVar);
      } else {
        out.push(Instruction::Unresolved);
      }
    }
    Expr::Call(name, args) => {
      match table.get(name) {
        Some(function) if function.arity() == args.len() => {
          for arg in args {
            compile_into(arg, var, table, out);
          }
          out.push(Instruction::Apply(function.evaluator()));
        }
        _ => out.push(Instruction::Unresolved),
      }
    }
  }
}
