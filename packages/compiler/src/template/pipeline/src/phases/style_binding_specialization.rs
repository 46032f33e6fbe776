//! Style Binding Specialization Phase
//!
//! Transforms special-case bindings with 'style' or 'class' in their names. Must run before the
//! main binding specialization pass.

use tracing::trace;

use crate::template::pipeline::ir::enums::BindingKind;
use crate::template::pipeline::ir::ops::update::{
    BindingExpression, ClassMapOp, ClassPropOp, StyleMapOp, StylePropOp,
};
use crate::template::pipeline::ir::{Op, OpList, UpdateOp};
use crate::template::pipeline::src::compilation::CompilationJob;

/// Transforms special-case bindings with 'style' or 'class' in their names. Must run before the
/// main binding specialization pass.
pub fn specialize_style_bindings(job: &mut dyn CompilationJob) {
    for xref in job.unit_xrefs() {
        if let Some(unit) = job.unit_mut(xref) {
            specialize_in_list(unit.update_mut());
        }
    }
}

fn specialize_in_list(ops: &mut OpList<UpdateOp>) {
    let mut cursor = ops.cursor();
    while let Some(id) = cursor.next(ops) {
        let UpdateOp::Binding(op) = &ops[id] else {
            continue;
        };

        let replacement = match op.binding_kind {
            BindingKind::ClassName => {
                let BindingExpression::Expression(expression) = &op.expression else {
                    panic!("Unexpected interpolation in ClassName binding");
                };
                UpdateOp::ClassProp(ClassPropOp {
                    target: op.target,
                    name: op.name.clone(),
                    expression: expression.clone(),
                    source_span: op.source_span.clone(),
                })
            }
            BindingKind::StyleProperty => UpdateOp::StyleProp(StylePropOp {
                target: op.target,
                name: op.name.clone(),
                expression: op.expression.clone(),
                unit: op.unit.clone(),
                source_span: op.source_span.clone(),
            }),
            BindingKind::Property | BindingKind::Template if op.name == "style" => {
                UpdateOp::StyleMap(StyleMapOp {
                    target: op.target,
                    expression: op.expression.clone(),
                    source_span: op.source_span.clone(),
                })
            }
            BindingKind::Property | BindingKind::Template if op.name == "class" => {
                UpdateOp::ClassMap(ClassMapOp {
                    target: op.target,
                    expression: op.expression.clone(),
                    source_span: op.source_span.clone(),
                })
            }
            _ => continue,
        };

        trace!(
            target = %op.target,
            binding = %op.name,
            kind = ?replacement.kind(),
            "specialized style binding"
        );
        ops.replace(id, replacement);
    }
}
