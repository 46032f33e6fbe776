//! Resolve Dollar Event Phase
//!
//! Any variable inside a listener with the name `$event` will be transformed into a output lexical
//! read immediately, and does not participate in any of the normal logic for handling variables.

use tracing::trace;

use crate::output::output_ast::{variable, Expression};
use crate::template::pipeline::ir::expression::transform_expressions_in_op;
use crate::template::pipeline::ir::{CreateOp, VisitorContextFlag};
use crate::template::pipeline::src::compilation::CompilationJob;

const DOLLAR_EVENT: &str = "$event";

pub fn resolve_dollar_event(job: &mut dyn CompilationJob) {
    for xref in job.unit_xrefs() {
        let Some(unit) = job.unit_mut(xref) else {
            continue;
        };
        for op in unit.create_mut().iter_mut() {
            if !matches!(op, CreateOp::Listener(_)) {
                continue;
            }
            let mut consumes_dollar_event = false;
            transform_expressions_in_op(
                op,
                &mut |expr, _| match expr {
                    Expression::LexicalRead(read) if read.name == DOLLAR_EVENT => {
                        consumes_dollar_event = true;
                        variable(DOLLAR_EVENT)
                    }
                    other => other,
                },
                VisitorContextFlag::IN_CHILD_OPERATION,
            );
            if let CreateOp::Listener(listener) = op {
                if consumes_dollar_event {
                    trace!(target = %listener.target, event = %listener.name, "listener consumes $event");
                    listener.consumes_dollar_event = true;
                }
            }
        }
    }
}
