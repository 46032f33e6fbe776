//! Track Variables Phase
//!
//! Inside the `track` expression on a `for` repeater, the `$index` and `$item` variables are
//! ambiently available. In this phase, we find those variable usages, and replace them with the
//! appropriate output read.

use crate::output::output_ast::{Expression, ReadVarExpr};
use crate::template::pipeline::ir::expression::transform_expression_in_place;
use crate::template::pipeline::ir::{CreateOp, VisitorContextFlag};
use crate::template::pipeline::src::compilation::CompilationJob;

pub fn generate_track_variables(job: &mut dyn CompilationJob) {
    for xref in job.unit_xrefs() {
        let Some(unit) = job.unit_mut(xref) else {
            continue;
        };
        for op in unit.create_mut().iter_mut() {
            let CreateOp::RepeaterCreate(op) = op else {
                continue;
            };
            let var_names = &op.var_names;
            transform_expression_in_place(
                &mut op.track,
                &mut |expr, _| match expr {
                    Expression::LexicalRead(read) => {
                        let name = if var_names.dollar_index.contains(&read.name) {
                            "$index"
                        } else if read.name == var_names.dollar_implicit {
                            "$item"
                        } else {
                            return Expression::LexicalRead(read);
                        };
                        Expression::ReadVar(ReadVarExpr {
                            name: name.to_string(),
                            source_span: read.source_span,
                        })
                    }
                    other => other,
                },
                VisitorContextFlag::NONE,
            );
        }
    }
}
