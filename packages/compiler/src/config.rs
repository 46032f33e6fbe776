//! Compiler Options
//!
//! Job-level configuration, captured when a compilation job is created.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::template::pipeline::ir::enums::CompatibilityMode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    pub compatibility_mode: CompatibilityMode,
    /// Whether translated messages use external (closure-style) ids
    pub i18n_use_external_ids: bool,
    pub enable_debug_locations: bool,
    /// Path of the component file relative to the project, used for debug locations
    pub relative_context_file_path: String,
}

impl CompilerOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
