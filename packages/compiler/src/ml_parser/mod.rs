//! ML (Markup Language) Parser Module
//!
//! Tag-name helpers shared by ingestion and binding specialization.

pub mod tags;

pub use tags::*;
