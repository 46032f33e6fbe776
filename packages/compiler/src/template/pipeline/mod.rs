//! Template Pipeline
//!
//! `ir` defines the operations and expressions of the intermediate representation; `src` holds
//! ingestion, the compilation job model and the transformation phases.

#[path = "ir/src/mod.rs"]
pub mod ir;
pub mod src;
