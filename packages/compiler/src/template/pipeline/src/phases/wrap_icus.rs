//! Wrap I18n ICUs Phase
//!
//! Wraps ICUs that do not already belong to an i18n block in a new i18n block carrying the ICU's
//! own message.

use tracing::trace;

use crate::i18n::i18n_ast::Message;
use crate::template::pipeline::ir::ops::create::{I18nEndOp, I18nStartOp};
use crate::template::pipeline::ir::{CreateOp, OpId, OpList};
use crate::template::pipeline::src::compilation::CompilationJob;

pub fn wrap_i18n_icus(job: &mut dyn CompilationJob) {
    for xref in job.unit_xrefs() {
        let lone_icus = match job.unit(xref) {
            Some(unit) => lone_icus(unit.create()),
            None => continue,
        };
        if lone_icus.is_empty() {
            continue;
        }

        let blocks: Vec<_> = lone_icus
            .into_iter()
            .map(|icu| (job.allocate_xref_id(), icu))
            .collect();
        let Some(unit) = job.unit_mut(xref) else {
            continue;
        };
        let create = unit.create_mut();
        for (block, (start, end, message)) in blocks {
            // ICU blocks carry no source span.
            create.insert_before(
                CreateOp::I18nStart(I18nStartOp::new(block, message, None, None)),
                start,
            );
            if let Some(end) = end {
                create.insert_after(
                    CreateOp::I18nEnd(I18nEndOp {
                        xref: block,
                        source_span: None,
                    }),
                    end,
                );
            }
            trace!(view = %xref, %block, "wrapped ICU in its own i18n block");
        }
    }
}

/// The `IcuStart` and matching `IcuEnd` of every ICU that sits outside an i18n block.
fn lone_icus(create: &OpList<CreateOp>) -> Vec<(OpId, Option<OpId>, Message)> {
    let mut lone = Vec::new();
    let mut in_block = false;
    let mut pending: Option<(OpId, Message)> = None;
    for id in create.ids() {
        match create.get(id) {
            Some(CreateOp::I18nStart(_)) => in_block = true,
            Some(CreateOp::I18nEnd(_)) => in_block = false,
            Some(CreateOp::IcuStart(op)) if !in_block => pending = Some((id, op.message.clone())),
            Some(CreateOp::IcuEnd(_)) => {
                if let Some((start, message)) = pending.take() {
                    lone.push((start, Some(id), message));
                }
            }
            _ => {}
        }
    }
    if let Some((start, message)) = pending {
        lone.push((start, None, message));
    }
    lone
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerOptions;
    use crate::parse_util::{ParseSourceFile, ParseSourceSpan};
    use crate::template::pipeline::ir::ops::create::{IcuEndOp, IcuStartOp};
    use crate::template::pipeline::ir::{OpKind, XrefId};
    use crate::template::pipeline::ir::Op;
    use crate::template::pipeline::src::compilation::ComponentCompilationJob;

    fn span() -> ParseSourceSpan {
        let file = ParseSourceFile::new("{n, plural, =1 {one}}".into(), "t.html".into());
        ParseSourceSpan::from_offsets(&file, 0, 21)
    }

    fn message(id: &str) -> Message {
        let mut message = Message::new(vec![], String::new(), String::new(), String::new());
        message.id = id.to_string();
        message
    }

    fn icu(xref: XrefId, message_id: &str) -> [CreateOp; 2] {
        [
            CreateOp::IcuStart(IcuStartOp {
                xref,
                message: message(message_id),
                message_placeholder: "ICU".to_string(),
                context: None,
                source_span: span(),
            }),
            CreateOp::IcuEnd(IcuEndOp { xref }),
        ]
    }

    fn kinds(job: &ComponentCompilationJob) -> Vec<OpKind> {
        job.root.create.iter().map(|op| op.kind()).collect()
    }

    #[test]
    fn wraps_an_icu_outside_any_block() {
        let mut job = ComponentCompilationJob::new("Cmp", CompilerOptions::default());
        let icu_xref = job.allocate_xref_id();
        job.root.create.push_all(icu(icu_xref, "icu"));

        wrap_i18n_icus(&mut job);

        assert_eq!(
            kinds(&job),
            [OpKind::I18nStart, OpKind::IcuStart, OpKind::IcuEnd, OpKind::I18nEnd]
        );
        let ops: Vec<_> = job.root.create.iter().collect();
        let (CreateOp::I18nStart(start), CreateOp::I18nEnd(end)) = (ops[0], ops[3]) else {
            panic!("expected the ICU to be wrapped, got {ops:?}");
        };
        assert_eq!(start.xref, end.xref);
        assert_eq!(start.root, start.xref);
        assert_eq!(start.message.id, "icu");
        assert!(start.source_span.is_none());
        job.root.create.assert_consistent();
    }

    #[test]
    fn leaves_icus_inside_a_block_alone() {
        let mut job = ComponentCompilationJob::new("Cmp", CompilerOptions::default());
        let block = job.allocate_xref_id();
        let icu_xref = job.allocate_xref_id();
        job.root
            .create
            .push(CreateOp::I18nStart(I18nStartOp::new(block, message("m"), None, None)));
        job.root.create.push_all(icu(icu_xref, "m"));
        job.root.create.push(CreateOp::I18nEnd(I18nEndOp {
            xref: block,
            source_span: None,
        }));

        wrap_i18n_icus(&mut job);

        assert_eq!(
            kinds(&job),
            [OpKind::I18nStart, OpKind::IcuStart, OpKind::IcuEnd, OpKind::I18nEnd]
        );
    }
}
