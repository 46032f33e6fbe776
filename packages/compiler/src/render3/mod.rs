//! Render3 Module
//!
//! Template AST consumed by ingestion and the runtime identifiers phases refer to.

pub mod r3_ast;
pub mod r3_identifiers;

pub use r3_identifiers::Identifiers;
