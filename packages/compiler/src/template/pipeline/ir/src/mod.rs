//! Template pipeline IR.

pub mod enums;
pub mod expression;
pub mod handle;
pub mod operations;
pub mod ops;
pub mod variable;

pub use enums::{
    BindingKind, CompatibilityMode, I18nContextKind, Namespace, OpKind, SemanticVariableKind,
    TemplateKind, VariableFlags,
};
pub use expression::VisitorContextFlag;
pub use handle::{SlotHandle, XrefId};
pub use operations::{Cursor, ListId, Op, OpId, OpList};
pub use ops::{CreateOp, UpdateOp};
