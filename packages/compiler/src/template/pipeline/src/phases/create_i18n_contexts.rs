//! Create I18n Contexts Phase
//!
//! Create one helper context op per i18n block (including generate descending blocks).
//!
//! Also, if an ICU exists inside an i18n block that also contains other localizable content (such as
//! string), create an additional helper context op for the ICU.
//!
//! These context ops are later used for generating i18n messages. (Although we generate at least one
//! context op per nested view, we will collect them up the tree later, to generate a top-level
//! message.)

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::i18n::i18n_ast::Message;
use crate::template::pipeline::ir::enums::I18nContextKind;
use crate::template::pipeline::ir::ops::create::I18nContextOp;
use crate::template::pipeline::ir::{CreateOp, UpdateOp, XrefId};
use crate::template::pipeline::src::compilation::CompilationJob;

/// Create one helper context op per i18n block.
pub fn create_i18n_contexts(job: &mut dyn CompilationJob) {
    create_attribute_contexts(job);
    let mut block_contexts = create_root_block_contexts(job);
    assign_child_block_contexts(job, &mut block_contexts);
    create_icu_contexts(job, &block_contexts);
}

/// The i18n messages of translated attributes in `unit`, in op order.
fn attribute_messages(job: &dyn CompilationJob, unit: XrefId) -> Vec<Message> {
    let Some(unit) = job.unit(unit) else {
        return Vec::new();
    };
    let create = unit.create().iter().filter_map(|op| match op {
        CreateOp::ExtractedAttribute(op) => op.i18n_message.clone(),
        _ => None,
    });
    let update = unit.update().iter().filter_map(|op| match op {
        UpdateOp::Binding(op) => op.i18n_message.clone(),
        UpdateOp::Property(op) => op.i18n_message.clone(),
        UpdateOp::Attribute(op) => op.i18n_message.clone(),
        _ => None,
    });
    create.chain(update).collect()
}

/// Every distinct attribute message gets one `Attr` context, shared by all bindings that carry it.
fn create_attribute_contexts(job: &mut dyn CompilationJob) {
    let mut context_by_message: Vec<(Message, XrefId)> = Vec::new();
    let lookup = |contexts: &[(Message, XrefId)], message: &Message| {
        contexts
            .iter()
            .find(|(candidate, _)| candidate == message)
            .map(|(_, xref)| *xref)
    };

    for xref in job.unit_xrefs() {
        let mut new_contexts = Vec::new();
        for message in attribute_messages(&*job, xref) {
            if lookup(&context_by_message, &message).is_none() {
                let context = job.allocate_xref_id();
                context_by_message.push((message.clone(), context));
                new_contexts.push(CreateOp::I18nContext(I18nContextOp {
                    xref: context,
                    context_kind: I18nContextKind::Attr,
                    i18n_block: None,
                    message,
                    source_span: None,
                }));
            }
        }

        let Some(unit) = job.unit_mut(xref) else {
            continue;
        };
        for op in unit.create_mut().iter_mut() {
            if let CreateOp::ExtractedAttribute(op) = op {
                if let Some(message) = &op.i18n_message {
                    op.i18n_context = lookup(&context_by_message, message);
                }
            }
        }
        for op in unit.update_mut().iter_mut() {
            let (message, context) = match op {
                UpdateOp::Binding(op) => (&op.i18n_message, &mut op.i18n_context),
                UpdateOp::Property(op) => (&op.i18n_message, &mut op.i18n_context),
                UpdateOp::Attribute(op) => (&op.i18n_message, &mut op.i18n_context),
                _ => continue,
            };
            if let Some(message) = message {
                *context = lookup(&context_by_message, message);
            }
        }
        unit.create_mut().push_all(new_contexts);
    }
}

/// Root i18n blocks each get a `RootI18n` context. Returns the context of every block.
fn create_root_block_contexts(job: &mut dyn CompilationJob) -> HashMap<XrefId, XrefId> {
    let mut block_contexts = HashMap::new();
    for xref in job.unit_xrefs() {
        let roots: Vec<(XrefId, Message)> = match job.unit(xref) {
            Some(unit) => unit
                .create()
                .iter()
                .filter_map(|op| match op {
                    CreateOp::I18nStart(op) if op.xref == op.root => {
                        Some((op.xref, op.message.clone()))
                    }
                    _ => None,
                })
                .collect(),
            None => continue,
        };
        if roots.is_empty() {
            continue;
        }

        let mut context_ops = Vec::with_capacity(roots.len());
        for (block, message) in roots {
            let context = job.allocate_xref_id();
            block_contexts.insert(block, context);
            context_ops.push(CreateOp::I18nContext(I18nContextOp {
                xref: context,
                context_kind: I18nContextKind::RootI18n,
                i18n_block: Some(block),
                message,
                source_span: None,
            }));
        }

        let Some(unit) = job.unit_mut(xref) else {
            continue;
        };
        for op in unit.create_mut().iter_mut() {
            if let CreateOp::I18nStart(op) = op {
                if op.xref == op.root {
                    op.context = block_contexts.get(&op.xref).copied();
                    trace!(block = %op.xref, context = ?op.context, "created root i18n context");
                }
            }
        }
        unit.create_mut().push_all(context_ops);
    }
    block_contexts
}

/// Child i18n blocks don't need their own context, instead they inherit from their root i18n
/// block.
fn assign_child_block_contexts(
    job: &mut dyn CompilationJob,
    block_contexts: &mut HashMap<XrefId, XrefId>,
) {
    for xref in job.unit_xrefs() {
        let Some(unit) = job.unit_mut(xref) else {
            continue;
        };
        for op in unit.create_mut().iter_mut() {
            let CreateOp::I18nStart(op) = op else {
                continue;
            };
            if op.xref == op.root {
                continue;
            }
            let Some(root_context) = block_contexts.get(&op.root).copied() else {
                panic!("AssertionError: Root i18n block i18n context should have been created.");
            };
            op.context = Some(root_context);
            block_contexts.insert(op.xref, root_context);
        }
    }
}

/// An ICU that is the whole message of its block turns the block context into an ICU context; any
/// other ICU is a sub-message and gets a context of its own.
fn create_icu_contexts(job: &mut dyn CompilationJob, block_contexts: &HashMap<XrefId, XrefId>) {
    let mut converted_to_icu = HashSet::new();

    for xref in job.unit_xrefs() {
        let mut new_contexts = Vec::new();
        let mut pending = Vec::new();
        {
            let Some(unit) = job.unit(xref) else {
                continue;
            };
            // (block xref, block root, block message id)
            let mut current_block: Option<(XrefId, XrefId, String)> = None;
            for op in unit.create().iter() {
                match op {
                    CreateOp::I18nStart(op) => {
                        current_block = Some((op.xref, op.root, op.message.id.clone()))
                    }
                    CreateOp::I18nEnd(_) => current_block = None,
                    CreateOp::IcuStart(op) => {
                        let Some((block, root, message_id)) = &current_block else {
                            panic!("AssertionError: Unexpected ICU outside of an i18n block.");
                        };
                        if op.message.id != *message_id {
                            pending.push((op.xref, None, *root, op.message.clone()));
                        } else {
                            let context = block_contexts.get(block).copied();
                            pending.push((op.xref, context, *root, op.message.clone()));
                            if let Some(context) = context {
                                converted_to_icu.insert(context);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        let mut assignments = HashMap::new();
        for (icu, context, root, message) in pending {
            let context = match context {
                Some(context) => context,
                None => {
                    let context = job.allocate_xref_id();
                    new_contexts.push(CreateOp::I18nContext(I18nContextOp {
                        xref: context,
                        context_kind: I18nContextKind::Icu,
                        i18n_block: Some(root),
                        message,
                        source_span: None,
                    }));
                    context
                }
            };
            assignments.insert(icu, context);
        }

        let Some(unit) = job.unit_mut(xref) else {
            continue;
        };
        for op in unit.create_mut().iter_mut() {
            if let CreateOp::IcuStart(op) = op {
                if let Some(context) = assignments.get(&op.xref) {
                    op.context = Some(*context);
                }
            }
        }
        unit.create_mut().push_all(new_contexts);
    }

    if converted_to_icu.is_empty() {
        return;
    }
    for xref in job.unit_xrefs() {
        let Some(unit) = job.unit_mut(xref) else {
            continue;
        };
        for op in unit.create_mut().iter_mut() {
            if let CreateOp::I18nContext(op) = op {
                if converted_to_icu.contains(&op.xref) {
                    op.context_kind = I18nContextKind::Icu;
                }
            }
        }
    }
}
