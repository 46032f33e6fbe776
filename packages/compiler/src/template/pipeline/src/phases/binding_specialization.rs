//! Binding Specialization Phase
//!
//! Narrows the generic `Binding` ops produced by ingestion into attribute, property, two-way
//! property and host DOM property ops.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::ml_parser::tags::split_ns_name;
use crate::template::pipeline::ir::enums::BindingKind;
use crate::template::pipeline::ir::ops::update::{
    AttributeOp, BindingExpression, BindingOp, DomPropertyOp, PropertyOp, TwoWayPropertyOp,
};
use crate::template::pipeline::ir::{CreateOp, OpList, UpdateOp, XrefId};
use crate::template::pipeline::src::compilation::{CompilationJob, CompilationJobKind};

/// Attribute that disables binding processing for an element and its descendants.
const NG_NON_BINDABLE: &str = "ngNonBindable";

pub fn specialize_bindings(job: &mut dyn CompilationJob) {
    let job_kind = job.kind();
    for xref in job.unit_xrefs() {
        let Some(unit) = job.unit_mut(xref) else {
            continue;
        };
        let non_bindable = specialize_in_list(unit.update_mut(), job_kind);
        if !non_bindable.is_empty() {
            mark_non_bindable(unit.create_mut(), &non_bindable);
        }
    }
}

/// Returns the targets of removed `ngNonBindable` attributes.
fn specialize_in_list(ops: &mut OpList<UpdateOp>, job_kind: CompilationJobKind) -> Vec<XrefId> {
    let mut non_bindable = Vec::new();
    let mut cursor = ops.cursor();
    while let Some(id) = cursor.next(ops) {
        let UpdateOp::Binding(op) = &ops[id] else {
            continue;
        };

        let replacement = match op.binding_kind {
            BindingKind::Attribute if op.name == NG_NON_BINDABLE => {
                non_bindable.push(op.target);
                ops.remove(id);
                continue;
            }
            BindingKind::Attribute => UpdateOp::Attribute(attribute_op(op)),
            BindingKind::Property | BindingKind::Template | BindingKind::Animation => {
                if job_kind == CompilationJobKind::Host {
                    UpdateOp::DomProperty(DomPropertyOp {
                        name: op.name.clone(),
                        expression: op.expression.clone(),
                        binding_kind: op.binding_kind,
                        i18n_context: op.i18n_context,
                        security_context: op.security_context.clone(),
                        source_span: op.source_span.clone(),
                    })
                } else {
                    UpdateOp::Property(PropertyOp {
                        target: op.target,
                        name: op.name.clone(),
                        expression: op.expression.clone(),
                        binding_kind: op.binding_kind,
                        security_context: op.security_context.clone(),
                        is_structural_template_attribute: op.is_structural_template_attribute,
                        template_kind: op.template_kind,
                        i18n_context: op.i18n_context,
                        i18n_message: op.i18n_message.clone(),
                        source_span: op.source_span.clone(),
                    })
                }
            }
            BindingKind::TwoWayProperty => {
                let BindingExpression::Expression(expression) = &op.expression else {
                    panic!(
                        "Expected value of two-way property binding \"{}\" to be an expression",
                        op.name
                    );
                };
                UpdateOp::TwoWayProperty(TwoWayPropertyOp {
                    target: op.target,
                    name: op.name.clone(),
                    expression: expression.clone(),
                    security_context: op.security_context.clone(),
                    is_structural_template_attribute: op.is_structural_template_attribute,
                    template_kind: op.template_kind,
                    i18n_context: op.i18n_context,
                    i18n_message: op.i18n_message.clone(),
                    source_span: op.source_span.clone(),
                })
            }
            BindingKind::I18n | BindingKind::ClassName | BindingKind::StyleProperty => {
                panic!("Unhandled binding of kind {:?}", op.binding_kind)
            }
        };

        trace!(target = ?op.target, binding = %op.name, "specialized binding");
        ops.replace(id, replacement);
    }
    non_bindable
}

fn attribute_op(op: &BindingOp) -> AttributeOp {
    let (namespace, name) =
        split_ns_name(&op.name, false).unwrap_or_else(|_| (None, op.name.clone()));
    AttributeOp {
        target: op.target,
        namespace,
        name,
        expression: op.expression.clone(),
        security_context: op.security_context.clone(),
        is_text_attribute: op.is_text_attribute,
        is_structural_template_attribute: op.is_structural_template_attribute,
        template_kind: op.template_kind,
        i18n_context: op.i18n_context,
        i18n_message: op.i18n_message.clone(),
        source_span: op.source_span.clone(),
    }
}

fn mark_non_bindable(create: &mut OpList<CreateOp>, targets: &[XrefId]) {
    let mut remaining: HashSet<XrefId> = targets.iter().copied().collect();
    for op in create.iter_mut() {
        if let Some(base) = op.element_base_mut() {
            if remaining.remove(&base.xref) {
                base.non_bindable = true;
                debug!(element = %base.xref, "element marked non-bindable");
            }
        }
    }
    if !remaining.is_empty() {
        panic!("All attributes should have an element-like target.");
    }
}
