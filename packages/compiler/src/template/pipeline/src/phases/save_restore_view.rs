//! Save Restore View Phase
//!
//! When inside of a listener, we may need access to one or more enclosing views. Therefore, each
//! view should save the current view, and each listener must have the ability to restore the
//! appropriate view. We eagerly generate all save view variables; they will be optimized away later.

use std::collections::HashSet;

use tracing::trace;

use crate::output::output_ast::{Expression, Statement};
use crate::template::pipeline::ir::enums::VariableFlags;
use crate::template::pipeline::ir::expression::{
    visit_expressions_in_op, EitherXrefIdOrExpression, GetCurrentViewExpr, ResetViewExpr,
    RestoreViewExpr,
};
use crate::template::pipeline::ir::ops::shared::VariableOp;
use crate::template::pipeline::ir::variable::SemanticVariable;
use crate::template::pipeline::ir::{CreateOp, OpId, OpList, UpdateOp, XrefId};
use crate::template::pipeline::src::compilation::CompilationJob;

pub fn save_and_restore_view(job: &mut dyn CompilationJob) {
    let root = job.root_xref();
    for xref in job.unit_xrefs() {
        let saved_view = job.allocate_xref_id();
        let local_names = local_state_names(&*job, xref);
        let listeners = match job.unit_mut(xref) {
            Some(unit) => listeners_needing_restore(unit.create_mut(), xref != root, &local_names),
            None => continue,
        };
        let restores: Vec<(OpId, XrefId)> = listeners
            .into_iter()
            .map(|listener| (listener, job.allocate_xref_id()))
            .collect();

        let Some(unit) = job.unit_mut(xref) else {
            continue;
        };
        unit.create_mut().prepend([CreateOp::Variable(VariableOp::new(
            saved_view,
            SemanticVariable::saved_view(xref),
            Expression::GetCurrentView(GetCurrentViewExpr),
            VariableFlags::NONE,
        ))]);
        for (listener, context) in restores {
            if let Some(CreateOp::Listener(op)) = unit.create_mut().get_mut(listener) {
                trace!(view = %xref, event = %op.name, "restoring view in listener");
                add_save_restore_view_operation(&mut op.handler_ops, xref, context);
            }
        }
    }
}

/// Names of the local refs and `@let` declarations visible from `view`: its own and those of every
/// enclosing view.
fn local_state_names(job: &dyn CompilationJob, view: XrefId) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut scope = Some(view);
    while let Some(xref) = scope {
        let Some(unit) = job.unit(xref) else {
            break;
        };
        for op in unit.create().iter() {
            if let CreateOp::DeclareLet(op) = op {
                names.insert(op.declared_name.clone());
            } else if let Some(base) = op.element_base() {
                names.extend(base.local_refs.iter().map(|local_ref| local_ref.name.clone()));
            }
        }
        scope = unit.parent();
    }
    names
}

/// Listeners of embedded views always restore their view. Root listeners only do so when the
/// handler reads a local reference or a `@let` from the context.
fn listeners_needing_restore(
    create: &mut OpList<CreateOp>,
    embedded: bool,
    local_names: &HashSet<String>,
) -> Vec<OpId> {
    let mut needs_restore = Vec::new();
    let mut cursor = create.cursor();
    while let Some(id) = cursor.next(create) {
        let Some(CreateOp::Listener(op)) = create.get_mut(id) else {
            continue;
        };
        if embedded || handler_reads_local_state(&mut op.handler_ops, local_names) {
            needs_restore.push(id);
        }
    }
    needs_restore
}

/// Reads of local state are still lexical right after ingestion; later they may already be
/// resolved to reference expressions.
fn handler_reads_local_state(
    handler_ops: &mut OpList<UpdateOp>,
    local_names: &HashSet<String>,
) -> bool {
    let mut found = false;
    for op in handler_ops.iter_mut() {
        visit_expressions_in_op(op, &mut |expr, _| match expr {
            Expression::Reference(_) | Expression::ContextLetReference(_) => found = true,
            Expression::LexicalRead(read) if local_names.contains(&read.name) => found = true,
            _ => {}
        });
    }
    found
}

fn add_save_restore_view_operation(
    handler_ops: &mut OpList<UpdateOp>,
    view: XrefId,
    context: XrefId,
) {
    handler_ops.prepend([UpdateOp::Variable(VariableOp::new(
        context,
        SemanticVariable::context(view),
        Expression::RestoreView(RestoreViewExpr {
            view: EitherXrefIdOrExpression::XrefId(view),
        }),
        VariableFlags::NONE,
    ))]);

    // The "restore view" operation in listeners requires a call to `resetView` to reset the
    // context prior to returning from the listener operation. Find any `return` statements in
    // the listener body and wrap them in a call to reset the view.
    for op in handler_ops.iter_mut() {
        if let UpdateOp::Statement(op) = op {
            if let Statement::Return(ret) = &mut op.statement {
                let value = std::mem::take(&mut *ret.value);
                *ret.value = Expression::ResetView(ResetViewExpr {
                    expr: Box::new(value),
                });
            }
        }
    }
}
