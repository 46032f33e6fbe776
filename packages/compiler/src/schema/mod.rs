//! Schema Module
//!
//! Security classification of DOM properties and attributes.

pub mod dom_security_schema;

pub use dom_security_schema::{calc_possible_security_contexts, security_context};
