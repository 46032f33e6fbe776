//! Template compilation.

pub mod pipeline;
