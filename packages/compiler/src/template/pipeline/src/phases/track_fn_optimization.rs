//! Track Function Optimization Phase
//!
//! `track` functions in `for` repeaters can sometimes be "optimized," i.e. transformed into inline
//! expressions, in lieu of an external function call. For example, tracking by `$index` can be
//! optimized into an inline `trackByIndex` reference. This phase checks track expressions for
//! optimizable cases.

use tracing::debug;

use crate::output::output_ast::{import_expr, Expression, Statement};
use crate::render3::Identifiers;
use crate::template::pipeline::ir::expression::{transform_expression_in_place, TrackContextExpr};
use crate::template::pipeline::ir::ops::create::RepeaterCreateOp;
use crate::template::pipeline::ir::ops::shared::StatementOp;
use crate::template::pipeline::ir::{
    CreateOp, OpId, OpList, UpdateOp, VisitorContextFlag, XrefId,
};
use crate::template::pipeline::src::compilation::CompilationJob;

pub fn optimize_track_fns(job: &mut dyn CompilationJob) {
    let root = job.root_xref();
    for xref in job.unit_xrefs() {
        let repeaters: Vec<OpId> = match job.unit(xref) {
            Some(unit) => {
                let create = unit.create();
                create
                    .ids()
                    .filter(|id| matches!(create.get(*id), Some(CreateOp::RepeaterCreate(_))))
                    .collect()
            }
            None => continue,
        };

        for id in repeaters {
            let needs_track_ops = match job
                .unit_mut(xref)
                .and_then(|unit| unit.create_mut().get_mut(id))
            {
                Some(CreateOp::RepeaterCreate(op)) => optimize_repeater(op, root, xref),
                _ => false,
            };
            if !needs_track_ops {
                continue;
            }

            // The track expression stays as it is and is evaluated by a generated function.
            let list = job.allocate_list_id();
            if let Some(CreateOp::RepeaterCreate(op)) = job
                .unit_mut(xref)
                .and_then(|unit| unit.create_mut().get_mut(id))
            {
                let mut track_by_ops = OpList::new(list);
                track_by_ops.push(UpdateOp::Statement(StatementOp::new(Statement::returning(
                    (*op.track).clone(),
                    None,
                ))));
                op.track_by_ops = Some(track_by_ops);
            }
        }
    }
}

/// Picks a track function for `op`. Returns `true` when none applies and the track expression
/// needs its own function body.
fn optimize_repeater(op: &mut RepeaterCreateOp, root: XrefId, unit: XrefId) -> bool {
    if let Expression::ReadVar(read) = &*op.track {
        let builtin = match read.name.as_str() {
            "$index" => Some(Identifiers::repeater_track_by_index()),
            "$item" => Some(Identifiers::repeater_track_by_identity()),
            _ => None,
        };
        if let Some(builtin) = builtin {
            debug!(repeater = %op.base.xref, track_fn = ?builtin.name, "using built-in track function");
            op.track_by_fn = Some(Box::new(import_expr(builtin)));
            return false;
        }
    }

    if let Some(method) = track_by_method(root, &op.track) {
        // Top-level access of the item uses the built in identity, but the method still needs
        // the component instance.
        op.uses_component_instance = true;
        if unit == root {
            debug!(repeater = %op.base.xref, %method, "tracking by component method");
            if let Expression::InvokeFn(call) = &*op.track {
                op.track_by_fn = Some(call.fn_.clone());
            }
        } else {
            debug!(repeater = %op.base.xref, %method, "tracking by component method through the instance");
            let track_by_fn = import_expr(Identifiers::component_instance())
                .call_fn(vec![])
                .prop(&method);
            op.track_by_fn = Some(Box::new(track_by_fn.clone()));
            op.track = Box::new(track_by_fn);
        }
        return false;
    }

    // The track function could not be optimized. Replace context reads with a special
    // context read that the track function's body understands.
    let mut reads_context = false;
    transform_expression_in_place(
        &mut op.track,
        &mut |expr, _| match expr {
            Expression::PipeBinding(_) => {
                panic!("Illegal State: Pipes are not allowed in this context")
            }
            Expression::Context(context) => {
                reads_context = true;
                Expression::TrackContext(TrackContextExpr { view: context.view })
            }
            other => other,
        },
        VisitorContextFlag::NONE,
    );
    if reads_context {
        op.uses_component_instance = true;
    }
    debug!(repeater = %op.base.xref, reads_context, "track expression kept as a function body");
    true
}

/// Matches `ctx.method($index)` and `ctx.method($index, $item)` where `ctx` is the root view's
/// context, returning the method name.
fn track_by_method(root: XrefId, expr: &Expression) -> Option<String> {
    let Expression::InvokeFn(call) = expr else {
        return None;
    };
    let Expression::ReadProp(method) = &*call.fn_ else {
        return None;
    };
    if !matches!(&*method.receiver, Expression::Context(context) if context.view == root) {
        return None;
    }
    let is_read = |arg: Option<&Expression>, name: &str| {
        matches!(arg, Some(Expression::ReadVar(read)) if read.name == name)
    };
    let matches_args = match call.args.len() {
        1 => is_read(call.args.first(), "$index"),
        2 => is_read(call.args.first(), "$index") && is_read(call.args.get(1), "$item"),
        _ => false,
    };
    matches_args.then(|| method.name.clone())
}
