//! Next Context Merging Phase
//!
//! Merges logically sequential `NextContextExpr` operations.
//!
//! `NextContextExpr` can be referenced repeatedly, "popping" the runtime's context stack each time.
//! When two such expressions appear back-to-back, it's possible to merge them together into a single
//! `NextContextExpr` that steps multiple contexts. This merging is possible if all conditions are met:
//!
//!   * The result of the `NextContextExpr` that's folded into the subsequent one is not stored (that
//!     is, the call is purely side-effectful).
//!   * No operations in between them uses the implicit context.

use tracing::trace;

use crate::output::output_ast::{Expression, Statement};
use crate::template::pipeline::ir::expression::transform_expressions_in_op;
use crate::template::pipeline::ir::ops::shared::StatementOp;
use crate::template::pipeline::ir::{CreateOp, OpList, UpdateOp, VisitorContextFlag};
use crate::template::pipeline::src::compilation::CompilationJob;

pub fn merge_next_context_expressions(job: &mut dyn CompilationJob) {
    for xref in job.unit_xrefs() {
        let Some(unit) = job.unit_mut(xref) else {
            continue;
        };
        for op in unit.create_mut().iter_mut() {
            match op {
                CreateOp::Listener(op) => merge_next_contexts_in_ops(&mut op.handler_ops),
                CreateOp::RepeaterCreate(op) => {
                    if let Some(track_by_ops) = op.track_by_ops.as_mut() {
                        merge_next_contexts_in_ops(track_by_ops);
                    }
                }
                _ => {}
            }
        }
        merge_next_contexts_in_ops(unit.update_mut());
    }
}

/// The step count of a bare `nextContext()` statement.
fn bare_next_context_steps(op: Option<&UpdateOp>) -> Option<usize> {
    match op {
        Some(UpdateOp::Statement(StatementOp {
            statement: Statement::Expression(stmt),
        })) => match &*stmt.expr {
            Expression::NextContext(next) => Some(next.steps),
            _ => None,
        },
        _ => None,
    }
}

fn merge_next_contexts_in_ops(ops: &mut OpList<UpdateOp>) {
    let mut cursor = ops.cursor();
    while let Some(id) = cursor.next(ops) {
        let Some(merge_steps) = bare_next_context_steps(ops.get(id)) else {
            continue;
        };

        let mut try_to_merge = true;
        let mut merged = false;
        let mut candidate = ops.next(id).filter(|next| !ops.is_sentinel(*next));
        while let Some(candidate_id) = candidate {
            if !try_to_merge {
                break;
            }
            if let Some(candidate_op) = ops.get_mut(candidate_id) {
                transform_expressions_in_op(
                    candidate_op,
                    &mut |expr, flags| {
                        if !try_to_merge
                            || flags.contains(VisitorContextFlag::IN_CHILD_OPERATION)
                            || !expr.is_ir_expression()
                        {
                            return expr;
                        }
                        match expr {
                            Expression::NextContext(mut next) => {
                                next.steps += merge_steps;
                                merged = true;
                                try_to_merge = false;
                                Expression::NextContext(next)
                            }
                            blocking @ (Expression::GetCurrentView(_)
                            | Expression::Reference(_)
                            | Expression::ContextLetReference(_)) => {
                                try_to_merge = false;
                                blocking
                            }
                            other => other,
                        }
                    },
                    VisitorContextFlag::NONE,
                );
            }
            candidate = ops
                .next(candidate_id)
                .filter(|next| !ops.is_sentinel(*next));
        }

        if merged {
            trace!(steps = merge_steps, "merged nextContext into a later step");
            ops.remove(id);
        }
    }
}
