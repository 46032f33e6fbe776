//! Core
//!
//! Shared enums consumed by both the template AST and the IR.

use serde::{Deserialize, Serialize};

/// Sanitization class of a bound value, as determined by the DOM security schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
#[repr(u8)]
pub enum SecurityContext {
    NONE = 0,
    HTML = 1,
    STYLE = 2,
    SCRIPT = 3,
    URL = 4,
    ResourceUrl = 5,
}

impl Default for SecurityContext {
    fn default() -> Self {
        SecurityContext::NONE
    }
}
