
// The #[non_exhaustive] attribute applies at the crate-level, and I
// want module-level restrictions, which are far stricter.
#![allow(clippy::manual_non_exhaustive)]

pub mod convergence;
pub mod expr;
pub mod expression;
pub mod history;
pub mod method;
pub mod parsing;
pub mod settings;
pub mod solver;
pub mod status;
pub mod trace;
pub mod util;
