//! Expression Parser Module
//!
//! The expression AST handed to ingestion by the binding parser.

pub mod ast;

pub use ast::*;
