//! Template Pipeline
//!
//! Compilation jobs, template and host ingestion, and the transformation phases.

pub mod compilation;
pub mod conversion;
pub mod ingest;
pub mod phases;

pub use compilation::*;
pub use ingest::{ingest_component, ingest_host_binding, HostAttribute, HostBindingInput};
