//! Propagate I18n Blocks Phase
//!
//! Propagate i18n blocks down through child templates that act as placeholders in the root i18n
//! message. Views are visited in order; every view declared with an i18n placeholder inside an
//! i18n block is wrapped in a child `I18nStart`/`I18nEnd` pair rooted at the outer block, and gets
//! the next sub-template index.

use tracing::{trace, warn};

use crate::i18n::i18n_ast::Message;
use crate::template::pipeline::ir::ops::create::{I18nEndOp, I18nStartOp};
use crate::template::pipeline::ir::{CreateOp, OpId, OpList, XrefId};
use crate::template::pipeline::src::compilation::CompilationJob;

pub fn propagate_i18n_blocks(job: &mut dyn CompilationJob) {
    let root = job.root_xref();
    propagate_to_templates(job, root, 0);
}

/// What the traversal needs from the create list of one view, in op order.
enum Step {
    BlockStart(OpId),
    BlockEnd,
    View { xref: XrefId, has_placeholder: bool },
}

/// The i18n block currently open in the view being walked.
struct OpenBlock {
    root: XrefId,
    message: Message,
    indexed: bool,
}

fn steps(create: &OpList<CreateOp>) -> Vec<Step> {
    let mut steps = Vec::new();
    for id in create.ids() {
        let Some(op) = create.get(id) else {
            continue;
        };
        match op {
            CreateOp::I18nStart(_) => steps.push(Step::BlockStart(id)),
            CreateOp::I18nEnd(_) => steps.push(Step::BlockEnd),
            CreateOp::Template(op) => steps.push(Step::View {
                xref: op.base.xref,
                has_placeholder: op.i18n_placeholder.is_some(),
            }),
            CreateOp::ConditionalCreate(op) | CreateOp::ConditionalBranchCreate(op) => {
                steps.push(Step::View {
                    xref: op.base.xref,
                    has_placeholder: op.i18n_placeholder.is_some(),
                })
            }
            CreateOp::RepeaterCreate(op) => {
                steps.push(Step::View {
                    xref: op.base.xref,
                    has_placeholder: op.i18n_placeholder.is_some(),
                });
                if let Some(empty_view) = op.empty_view {
                    steps.push(Step::View {
                        xref: empty_view,
                        has_placeholder: op.empty_i18n_placeholder.is_some(),
                    });
                }
            }
            CreateOp::Projection(op) => {
                if let Some(fallback_view) = op.fallback_view {
                    steps.push(Step::View {
                        xref: fallback_view,
                        has_placeholder: op.i18n_placeholder.is_some(),
                    });
                }
            }
            _ => {}
        }
    }
    steps
}

/// Walks the create ops of `view` and every view it declares. Returns the sub-template index to
/// continue counting from.
fn propagate_to_templates(
    job: &mut dyn CompilationJob,
    view: XrefId,
    sub_template_index: usize,
) -> usize {
    let Some(steps) = job.unit(view).map(|unit| steps(unit.create())) else {
        return sub_template_index;
    };

    let mut current = sub_template_index;
    let mut open_block: Option<OpenBlock> = None;
    for step in steps {
        match step {
            Step::BlockStart(id) => {
                let Some(unit) = job.unit_mut(view) else {
                    continue;
                };
                let Some(CreateOp::I18nStart(op)) = unit.create_mut().get_mut(id) else {
                    continue;
                };
                if current != 0 {
                    op.sub_template_index = Some(current);
                }
                open_block = Some(OpenBlock {
                    root: op.root,
                    message: op.message.clone(),
                    indexed: op.sub_template_index.is_some(),
                });
            }
            Step::BlockEnd => {
                if let Some(block) = open_block.take() {
                    if !block.indexed {
                        current = 0;
                    }
                }
            }
            Step::View {
                xref,
                has_placeholder,
            } => {
                current = propagate_to_view(job, xref, open_block.as_ref(), has_placeholder, current);
            }
        }
    }
    current
}

fn propagate_to_view(
    job: &mut dyn CompilationJob,
    view: XrefId,
    block: Option<&OpenBlock>,
    has_placeholder: bool,
    sub_template_index: usize,
) -> usize {
    if has_placeholder {
        match block {
            Some(block) => {
                wrap_view_in_child_block(job, view, block);
                return propagate_to_templates(job, view, sub_template_index + 1);
            }
            None => warn!(%view, "view has an i18n placeholder but no enclosing i18n block"),
        }
    }
    propagate_to_templates(job, view, sub_template_index)
}

/// Opens a child block at the start of `view` and closes it at the end, unless one was already
/// propagated there.
fn wrap_view_in_child_block(job: &mut dyn CompilationJob, view: XrefId, parent: &OpenBlock) {
    let already_wrapped = match job.unit(view) {
        Some(unit) => {
            let create = unit.create();
            matches!(
                create.first().and_then(|id| create.get(id)),
                Some(CreateOp::I18nStart(_))
            )
        }
        None => return,
    };
    if already_wrapped {
        return;
    }

    let xref = job.allocate_xref_id();
    let Some(unit) = job.unit_mut(view) else {
        return;
    };
    // Nested blocks carry no source span.
    unit.create_mut().prepend([CreateOp::I18nStart(I18nStartOp::new(
        xref,
        parent.message.clone(),
        Some(parent.root),
        None,
    ))]);
    unit.create_mut().push(CreateOp::I18nEnd(I18nEndOp {
        xref,
        source_span: None,
    }));
    trace!(%view, block = %xref, root = %parent.root, "propagated i18n block");
}
