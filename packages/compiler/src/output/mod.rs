//! Output Module
//!
//! The target-language expression and statement tree IR expressions are embedded in.

pub mod output_ast;

pub use output_ast::*;
