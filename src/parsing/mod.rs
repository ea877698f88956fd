//! Expression-agnostic parsing machinery: source positions, a cursor
//! over the input text, operator tables, and the shunting yard
//! resolver used to turn flat operator chains into trees.

pub mod operator;
pub mod shunting_yard;
pub mod source;
pub mod tokenizer;
