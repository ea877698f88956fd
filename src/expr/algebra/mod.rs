
//! Helpers for manipulating expressions algebraically.

pub mod isolate;
pub mod polynomial;
pub mod term;
