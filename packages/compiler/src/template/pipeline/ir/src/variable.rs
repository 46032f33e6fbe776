//! IR Variables
//!
//! Semantic variables declared by `Variable` ops.

use crate::template::pipeline::ir::enums::SemanticVariableKind;
use crate::template::pipeline::ir::handle::XrefId;

/// Special name used to refer to the context of the current view in generated code.
pub const CTX_REF: &str = "CTX_REF_MARKER";

/// A variable declared by a `Variable` op. `name` is assigned by a later naming pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticVariable {
    /// The context of a particular view.
    Context { view: XrefId, name: Option<String> },
    /// A specific identifier within a template.
    Identifier {
        identifier: String,
        local: bool,
        name: Option<String>,
    },
    /// The view that was current when the variable was initialized.
    SavedView { view: XrefId, name: Option<String> },
    /// An alias that is inlined at every usage site.
    Alias { identifier: String, name: Option<String> },
}

impl SemanticVariable {
    pub fn context(view: XrefId) -> Self {
        SemanticVariable::Context { view, name: None }
    }

    pub fn saved_view(view: XrefId) -> Self {
        SemanticVariable::SavedView { view, name: None }
    }

    pub fn identifier(identifier: impl Into<String>, local: bool) -> Self {
        SemanticVariable::Identifier {
            identifier: identifier.into(),
            local,
            name: None,
        }
    }

    pub fn kind(&self) -> SemanticVariableKind {
        match self {
            SemanticVariable::Context { .. } => SemanticVariableKind::Context,
            SemanticVariable::Identifier { .. } => SemanticVariableKind::Identifier,
            SemanticVariable::SavedView { .. } => SemanticVariableKind::SavedView,
            SemanticVariable::Alias { .. } => SemanticVariableKind::Alias,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            SemanticVariable::Context { name, .. }
            | SemanticVariable::Identifier { name, .. }
            | SemanticVariable::SavedView { name, .. }
            | SemanticVariable::Alias { name, .. } => name.as_deref(),
        }
    }
}
