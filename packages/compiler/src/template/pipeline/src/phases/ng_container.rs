//! Ng Container Phase
//!
//! Retags every `ElementStart`/`ElementEnd` pair whose tag is `ng-container` as a container. The
//! ops keep their position and identity in the list.

use std::collections::HashSet;

use tracing::debug;

use crate::ml_parser::tags::is_ng_container;
use crate::template::pipeline::ir::ops::create::{ContainerEndOp, ContainerStartOp};
use crate::template::pipeline::ir::{CreateOp, Op, XrefId};
use crate::template::pipeline::src::compilation::CompilationJob;

pub fn generate_ng_container_ops(job: &mut dyn CompilationJob) {
    for xref in job.unit_xrefs() {
        let Some(unit) = job.unit_mut(xref) else {
            continue;
        };
        let mut containers: HashSet<XrefId> = HashSet::new();
        for op in unit.create_mut().iter_mut() {
            let retag = match op {
                CreateOp::ElementStart(start) => is_ng_container(&start.tag),
                CreateOp::ElementEnd(end) => containers.contains(&end.xref),
                _ => false,
            };
            if !retag {
                continue;
            }
            *op = match std::mem::replace(op, CreateOp::list_end()) {
                CreateOp::ElementStart(start) => {
                    debug!(xref = %start.base.xref, "retagged ng-container");
                    containers.insert(start.base.xref);
                    CreateOp::ContainerStart(ContainerStartOp {
                        base: start.base,
                        i18n_placeholder: start.i18n_placeholder,
                    })
                }
                CreateOp::ElementEnd(end) => CreateOp::ContainerEnd(ContainerEndOp {
                    xref: end.xref,
                    source_span: end.source_span,
                }),
                other => other,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerOptions;
    use crate::parse_util::{ParseSourceFile, ParseSourceSpan};
    use crate::template::pipeline::ir::enums::Namespace;
    use crate::template::pipeline::ir::ops::create::{ElementEndOp, ElementStartOp};
    use crate::template::pipeline::ir::OpKind;
    use crate::template::pipeline::src::compilation::ComponentCompilationJob;

    fn span() -> ParseSourceSpan {
        ParseSourceSpan::from_offsets(
            &ParseSourceFile::new("<ng-container><div></div></ng-container>".into(), "t.html".into()),
            0,
            40,
        )
    }

    fn element(job: &mut ComponentCompilationJob, tag: &str) -> (CreateOp, CreateOp) {
        let xref = job.allocate_xref_id();
        (
            CreateOp::ElementStart(ElementStartOp::new(
                tag.to_string(),
                xref,
                Namespace::HTML,
                None,
                span(),
                span(),
            )),
            CreateOp::ElementEnd(ElementEndOp {
                xref,
                source_span: Some(span()),
            }),
        )
    }

    #[test]
    fn ng_container_pairs_are_retagged_in_place() {
        let mut job = ComponentCompilationJob::new("Cmp", CompilerOptions::default());
        let (container_start, container_end) = element(&mut job, "ng-container");
        let (div_start, div_end) = element(&mut job, "div");
        let ids = job
            .root
            .create
            .push_all([container_start, div_start, div_end, container_end]);

        generate_ng_container_ops(&mut job);

        let kinds: Vec<_> = job.root.create.iter().map(|op| op.kind()).collect();
        assert_eq!(
            kinds,
            [
                OpKind::ContainerStart,
                OpKind::ElementStart,
                OpKind::ElementEnd,
                OpKind::ContainerEnd
            ]
        );
        assert_eq!(job.root.create.ids().collect::<Vec<_>>(), ids.to_vec());
        job.root.create.assert_consistent();
    }
}
