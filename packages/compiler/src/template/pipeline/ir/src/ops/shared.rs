//! Shared Operations
//!
//! Op payloads that can appear in both the create and the update list.

use crate::output::output_ast::{Expression, Statement};
use crate::template::pipeline::ir::enums::VariableFlags;
use crate::template::pipeline::ir::handle::XrefId;
use crate::template::pipeline::ir::variable::SemanticVariable;

/// An op which wraps an output AST statement.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementOp {
    pub statement: Statement,
}

impl StatementOp {
    pub fn new(statement: Statement) -> Self {
        StatementOp { statement }
    }
}

/// An op which declares and initializes a `SemanticVariable`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableOp {
    /// `XrefId` which identifies this specific variable, and is used to reference this variable
    /// from other parts of the IR.
    pub xref: XrefId,
    pub variable: SemanticVariable,
    pub initializer: Box<Expression>,
    pub flags: VariableFlags,
}

impl VariableOp {
    pub fn new(
        xref: XrefId,
        variable: SemanticVariable,
        initializer: Expression,
        flags: VariableFlags,
    ) -> Self {
        VariableOp {
            xref,
            variable,
            initializer: Box::new(initializer),
            flags,
        }
    }
}
