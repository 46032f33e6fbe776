//! Ingestion integration tests

use std::collections::HashSet;

use angular_template_pipeline::expression_parser::ast::{ASTWithSource, BindingType, AST};
use angular_template_pipeline::i18n::i18n_ast::{self as i18n, I18nMeta};
use angular_template_pipeline::render3::r3_ast as t;
use angular_template_pipeline::template::pipeline::ir::enums::DeferOpModifierKind;
use angular_template_pipeline::template::pipeline::ir::ops::create::{DeferOp, DeferTrigger, TemplateOp};
use angular_template_pipeline::template::pipeline::ir::{
    CreateOp, Op, OpKind, TemplateKind, UpdateOp, XrefId,
};
use angular_template_pipeline::template::pipeline::src::{
    ingest_component, ComponentCompilationJob,
};
use angular_template_pipeline::{CompileError, CompilerOptions};

#[path = "util/mod.rs"]
mod util;
use util::*;

fn ingest(nodes: Vec<t::R3Node>) -> ComponentCompilationJob {
    init_tracing();
    ingest_component("TestCmp", &nodes, CompilerOptions::default()).expect("ingestion succeeds")
}

fn create_kinds(job: &ComponentCompilationJob) -> Vec<OpKind> {
    job.root.create.iter().map(|op| op.kind()).collect()
}

#[test]
fn nested_elements_and_text_keep_document_order() {
    let span_el = element(
        "span",
        vec![t::R3Node::BoundText(t::BoundText {
            value: ASTWithSource::new(
                AST::interpolation(&["Hi ", "!"], vec![AST::read("name")]),
                None,
            ),
            source_span: span(),
            i18n: None,
        })],
    );
    let div = element("div", vec![text("Hello "), t::R3Node::Element(span_el)]);

    let job = ingest(vec![t::R3Node::Element(div)]);

    assert_eq!(
        create_kinds(&job),
        [
            OpKind::ElementStart,
            OpKind::Text,
            OpKind::ElementStart,
            OpKind::Text,
            OpKind::ElementEnd,
            OpKind::ElementEnd,
        ]
    );
    let texts: Vec<_> = job
        .root
        .create
        .iter()
        .filter_map(|op| match op {
            CreateOp::Text(op) => Some(op),
            _ => None,
        })
        .collect();
    assert_eq!(texts[0].initial_value, "Hello ");
    assert_eq!(texts[1].initial_value, "");

    let interpolation = job
        .root
        .update
        .iter()
        .find_map(|op| match op {
            UpdateOp::InterpolateText(op) => Some(op),
            _ => None,
        })
        .expect("interpolated text");
    assert_eq!(interpolation.target, texts[1].xref);
    assert_eq!(interpolation.interpolation.strings, ["Hi ", "!"]);
    assert_eq!(interpolation.interpolation.expressions.len(), 1);
}

#[test]
fn switch_cases_get_one_view_each() {
    let case = |expr: Option<AST>| t::SwitchBlockCase {
        expression: expr,
        children: vec![text("x")],
        block: block(),
        i18n: None,
    };
    let switch = t::R3Node::SwitchBlock(t::SwitchBlock {
        expression: AST::read("mode"),
        cases: vec![case(Some(AST::string("a"))), case(None)],
        block: block(),
    });

    let job = ingest(vec![switch]);

    assert_eq!(job.views.len(), 2);
    assert_eq!(
        create_kinds(&job),
        [OpKind::ConditionalCreate, OpKind::ConditionalBranchCreate]
    );
    let conditional = job
        .root
        .update
        .iter()
        .find_map(|op| match op {
            UpdateOp::Conditional(op) => Some(op),
            _ => None,
        })
        .expect("conditional");
    assert!(conditional.test.is_some());
    let targets: Vec<_> = conditional.conditions.iter().map(|case| case.target).collect();
    assert_eq!(targets, job.views.keys().copied().collect::<Vec<_>>());
    assert!(conditional.conditions[1].expr.is_none());
}

#[test]
fn let_declarations_declare_and_store() {
    let decl = t::R3Node::LetDeclaration(t::LetDeclaration {
        name: "total".to_string(),
        value: AST::binary("+", AST::read("a"), AST::read("b")),
        source_span: span(),
        value_span: span(),
    });

    let job = ingest(vec![decl]);

    let declared = job
        .root
        .create
        .iter()
        .find_map(|op| match op {
            CreateOp::DeclareLet(op) => Some(op),
            _ => None,
        })
        .expect("declare let");
    assert_eq!(declared.declared_name, "total");
    assert!(job.root.update.iter().any(
        |op| matches!(op, UpdateOp::StoreLet(store) if store.target == declared.xref && store.declared_name == "total")
    ));
}

#[test]
fn content_with_fallback_gets_its_own_view() {
    let content = t::R3Node::Content(t::Content {
        selector: "[header]".to_string(),
        attributes: vec![text_attribute("select", "[header]")],
        children: vec![text("Default header")],
        source_span: span(),
        i18n: None,
    });

    let job = ingest(vec![content]);

    let projection = job
        .root
        .create
        .iter()
        .find_map(|op| match op {
            CreateOp::Projection(op) => Some(op),
            _ => None,
        })
        .expect("projection");
    assert_eq!(projection.selector, "[header]");
    let fallback = projection.fallback_view.expect("fallback view");
    assert_eq!(job.view(fallback).create.len(), 1);
    assert!(job.root.update.iter().any(
        |op| matches!(op, UpdateOp::Binding(binding) if binding.target == projection.xref && binding.is_text_attribute)
    ));
}

#[test]
fn whitespace_only_content_has_no_fallback() {
    let content = t::R3Node::Content(t::Content {
        selector: "*".to_string(),
        attributes: vec![],
        children: vec![text("  \n ")],
        source_span: span(),
        i18n: None,
    });

    let job = ingest(vec![content]);

    assert!(job.views.is_empty());
    assert!(matches!(
        job.root.create.iter().next(),
        Some(CreateOp::Projection(op)) if op.fallback_view.is_none()
    ));
}

#[test]
fn references_become_local_refs() {
    let mut input_el = element("input", vec![]);
    input_el.references.push(reference("field"));

    let job = ingest(vec![t::R3Node::Element(input_el)]);

    let start = job
        .root
        .create
        .iter()
        .find_map(|op| match op {
            CreateOp::ElementStart(op) => Some(op),
            _ => None,
        })
        .expect("element start");
    let names: Vec<_> = start.base.local_refs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["field"]);
}

#[test]
fn xrefs_are_unique_across_views_and_lists_are_consistent() {
    let mut button = element("button", vec![text("go")]);
    button.outputs.push(output("click", AST::call(AST::read("go"), vec![])));
    button
        .inputs
        .push(input("disabled", BindingType::Property, AST::read("busy")));
    let nodes = vec![
        if_block(vec![
            if_branch(Some(AST::read("a")), vec![t::R3Node::Element(button.clone())]),
            if_branch(None, vec![text("none")]),
        ]),
        for_block("item", AST::read("item"), vec![t::R3Node::Element(button)]),
    ];

    let job = ingest(nodes);

    let mut seen = HashSet::new();
    for view in job.all_views() {
        view.create.assert_consistent();
        view.update.assert_consistent();
        assert!(seen.insert(view.xref), "view xref {} reused", view.xref);
        for op in view.create.iter() {
            if let Some(xref) = op.xref() {
                if matches!(op, CreateOp::ElementEnd(_) | CreateOp::ContainerEnd(_)) {
                    continue;
                }
                // Control-flow create ops declare the xref of the view they create.
                if matches!(
                    op,
                    CreateOp::ConditionalCreate(_)
                        | CreateOp::ConditionalBranchCreate(_)
                        | CreateOp::RepeaterCreate(_)
                ) {
                    continue;
                }
                assert!(seen.insert(xref), "xref {xref} declared twice");
            }
        }
    }
    assert_eq!(job.views.len(), 3);
}

#[test]
fn malformed_namespace_is_an_invalid_name() {
    let err = ingest_component(
        "TestCmp",
        &[t::R3Node::Element(element(":svg", vec![]))],
        CompilerOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::InvalidName(_)));
}

fn deferred(children: Vec<t::R3Node>) -> t::DeferredBlock {
    t::DeferredBlock {
        children,
        triggers: Default::default(),
        prefetch_triggers: Default::default(),
        hydrate_triggers: Default::default(),
        placeholder: None,
        loading: None,
        error: None,
        block: block(),
        main_block_span: span(),
        i18n: None,
    }
}

fn ng_template(children: Vec<t::R3Node>) -> t::Template {
    t::Template {
        tag_name: Some("ng-template".to_string()),
        attributes: vec![],
        inputs: vec![],
        outputs: vec![],
        template_attrs: vec![],
        children,
        references: vec![],
        variables: vec![],
        source_span: span(),
        start_source_span: span(),
        end_source_span: Some(span()),
        i18n: None,
    }
}

fn templates(job: &ComponentCompilationJob) -> Vec<&TemplateOp> {
    job.root
        .create
        .iter()
        .filter_map(|op| match op {
            CreateOp::Template(op) => Some(op),
            _ => None,
        })
        .collect()
}

fn defer_op(job: &ComponentCompilationJob) -> &DeferOp {
    job.root
        .create
        .iter()
        .find_map(|op| match op {
            CreateOp::Defer(op) => Some(op),
            _ => None,
        })
        .expect("a defer op was ingested")
}

fn defer_triggers(job: &ComponentCompilationJob) -> Vec<(DeferTrigger, DeferOpModifierKind)> {
    job.root
        .create
        .iter()
        .filter_map(|op| match op {
            CreateOp::DeferOn(op) => Some((op.trigger.clone(), op.modifier)),
            _ => None,
        })
        .collect()
}

fn view_kinds(job: &ComponentCompilationJob, view: XrefId) -> Vec<OpKind> {
    job.view(view).create.iter().map(|op| op.kind()).collect()
}

#[test]
fn defer_block_declares_a_view_per_sub_block() {
    let mut defer = deferred(vec![text("content")]);
    defer.loading = Some(Box::new(t::DeferredBlockLoading {
        children: vec![text("loading")],
        after_time: Some(100),
        minimum_time: Some(1000),
        block: block(),
        i18n: None,
    }));
    defer.placeholder = Some(Box::new(t::DeferredBlockPlaceholder {
        children: vec![text("placeholder")],
        minimum_time: Some(500),
        block: block(),
        i18n: None,
    }));
    defer.error = Some(Box::new(t::DeferredBlockError {
        children: vec![text("error")],
        block: block(),
        i18n: None,
    }));

    let job = ingest(vec![t::R3Node::DeferredBlock(defer)]);

    assert_eq!(
        create_kinds(&job),
        [
            OpKind::Template,
            OpKind::Template,
            OpKind::Template,
            OpKind::Template,
            OpKind::Defer,
            OpKind::DeferOn,
        ]
    );
    assert_eq!(job.views.len(), 4);
    let templates = templates(&job);
    let suffixes: Vec<_> = templates
        .iter()
        .map(|op| op.function_name_suffix.as_str())
        .collect();
    assert_eq!(suffixes, ["Defer", "DeferLoading", "DeferPlaceholder", "DeferError"]);
    assert!(templates
        .iter()
        .all(|op| op.template_kind == TemplateKind::Block));
    for op in &templates {
        assert_eq!(view_kinds(&job, op.base.xref), [OpKind::Text]);
    }

    let defer = defer_op(&job);
    assert_eq!(defer.main_view, templates[0].base.xref);
    assert_eq!(defer.loading_view, Some(templates[1].base.xref));
    assert_eq!(defer.placeholder_view, Some(templates[2].base.xref));
    assert_eq!(defer.error_view, Some(templates[3].base.xref));
    assert_eq!(defer.loading_slot, Some(templates[1].base.handle));
    assert_eq!(defer.placeholder_slot, Some(templates[2].base.handle));
    assert_eq!(defer.error_slot, Some(templates[3].base.handle));
    assert_eq!(defer.loading_after_time, Some(100));
    assert_eq!(defer.loading_minimum_time, Some(1000));
    assert_eq!(defer.placeholder_minimum_time, Some(500));

    assert_eq!(
        defer_triggers(&job),
        [(DeferTrigger::Idle, DeferOpModifierKind::None)]
    );
}

#[test]
fn defer_without_optional_blocks_leaves_their_slots_empty() {
    let job = ingest(vec![t::R3Node::DeferredBlock(deferred(vec![]))]);

    assert_eq!(job.views.len(), 1);
    let defer = defer_op(&job);
    assert_eq!(defer.loading_view, None);
    assert_eq!(defer.loading_slot, None);
    assert_eq!(defer.placeholder_view, None);
    assert_eq!(defer.error_slot, None);
    assert_eq!(defer.loading_minimum_time, None);
}

#[test]
fn defer_triggers_keep_hydrate_first_and_modifiers_apart() {
    let mut defer = deferred(vec![text("content")]);
    defer.hydrate_triggers.never = Some(t::DeferredTrigger::Never { source_span: span() });
    defer.triggers.viewport = Some(t::DeferredTrigger::Viewport {
        reference: Some("anchor".to_string()),
        source_span: span(),
    });
    defer.prefetch_triggers.idle = Some(t::DeferredTrigger::Idle { source_span: span() });
    defer.prefetch_triggers.when = Some(t::DeferredTrigger::Bound {
        value: AST::read("ready"),
        source_span: span(),
    });

    let job = ingest(vec![t::R3Node::DeferredBlock(defer)]);

    assert_eq!(
        defer_triggers(&job),
        [
            (DeferTrigger::Never, DeferOpModifierKind::Hydrate),
            (
                DeferTrigger::Viewport {
                    target_name: Some("anchor".to_string())
                },
                DeferOpModifierKind::None
            ),
            (DeferTrigger::Idle, DeferOpModifierKind::Prefetch),
        ]
    );
    let whens: Vec<_> = job
        .root
        .update
        .iter()
        .filter_map(|op| match op {
            UpdateOp::DeferWhen(op) => Some(op.modifier),
            _ => None,
        })
        .collect();
    assert_eq!(whens, [DeferOpModifierKind::Prefetch]);
}

#[test]
fn prefetch_only_defer_still_loads_on_idle() {
    let mut defer = deferred(vec![]);
    defer.prefetch_triggers.timer = Some(t::DeferredTrigger::Timer {
        delay: 200,
        source_span: span(),
    });

    let job = ingest(vec![t::R3Node::DeferredBlock(defer)]);

    assert_eq!(
        defer_triggers(&job),
        [
            (DeferTrigger::Timer { delay: 200 }, DeferOpModifierKind::Prefetch),
            (DeferTrigger::Idle, DeferOpModifierKind::None),
        ]
    );
}

#[test]
fn icu_vars_and_placeholders_become_text_inside_the_icu() {
    let job = ingest(vec![icu(
        icu_message("plural", "ICU"),
        &[("START_BOLD_TEXT", "<b>")],
    )]);

    assert_eq!(
        create_kinds(&job),
        [OpKind::IcuStart, OpKind::Text, OpKind::Text, OpKind::IcuEnd]
    );
    let ops: Vec<_> = job.root.create.iter().collect();
    let CreateOp::IcuStart(start) = ops[0] else {
        panic!("expected an ICU start, got {:?}", ops[0]);
    };
    assert_eq!(start.message_placeholder, "ICU");
    let CreateOp::IcuEnd(end) = ops[3] else {
        panic!("expected an ICU end, got {:?}", ops[3]);
    };
    assert_eq!(end.xref, start.xref);

    let texts: Vec<_> = ops
        .iter()
        .filter_map(|op| match op {
            CreateOp::Text(op) => Some((op.xref, op.i18n_placeholder.as_deref())),
            _ => None,
        })
        .collect();
    assert_eq!(texts[0].1, Some("VAR_PLURAL"));
    assert_eq!(texts[1].1, Some("START_BOLD_TEXT"));
    let interpolated: Vec<_> = job
        .root
        .update
        .iter()
        .filter_map(|op| match op {
            UpdateOp::InterpolateText(op) => Some(op.target),
            _ => None,
        })
        .collect();
    assert_eq!(interpolated, [texts[0].0]);
}

#[test]
fn icu_needs_a_message_holding_only_the_icu() {
    let err = ingest_component(
        "TestCmp",
        &[icu(message("plain"), &[])],
        CompilerOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnexpectedI18nMeta {
            node: "Icu",
            actual: "Message",
            ..
        }
    ));
}

#[test]
fn translated_element_brackets_its_children() {
    let mut div = element("div", vec![t::R3Node::Element(element("span", vec![])), text("hi")]);
    div.i18n = Some(I18nMeta::Message(message("greeting")));

    let job = ingest(vec![t::R3Node::Element(div)]);

    assert_eq!(
        create_kinds(&job),
        [
            OpKind::ElementStart,
            OpKind::I18nStart,
            OpKind::ElementStart,
            OpKind::ElementEnd,
            OpKind::Text,
            OpKind::I18nEnd,
            OpKind::ElementEnd,
        ]
    );
    let ops: Vec<_> = job.root.create.iter().collect();
    let (CreateOp::I18nStart(start), CreateOp::I18nEnd(end)) = (ops[1], ops[5]) else {
        panic!("expected an i18n block around the children, got {ops:?}");
    };
    assert_eq!(start.xref, end.xref);
    assert_eq!(start.root, start.xref);
    assert_eq!(start.message.id, "greeting");
    assert!(start.source_span.is_some());
}

#[test]
fn translated_ng_template_brackets_its_own_view() {
    let mut tmpl = ng_template(vec![text("hi")]);
    tmpl.i18n = Some(I18nMeta::Message(message("greeting")));

    let job = ingest(vec![t::R3Node::Template(tmpl)]);

    assert_eq!(create_kinds(&job), [OpKind::Template]);
    let view = templates(&job)[0].base.xref;
    assert_eq!(
        view_kinds(&job, view),
        [OpKind::I18nStart, OpKind::Text, OpKind::I18nEnd]
    );
}

#[test]
fn structural_template_leaves_i18n_to_its_element() {
    let mut tmpl = ng_template(vec![t::R3Node::Element(element("div", vec![]))]);
    tmpl.tag_name = Some("div".to_string());
    tmpl.i18n = Some(I18nMeta::Message(message("greeting")));

    let job = ingest(vec![t::R3Node::Template(tmpl)]);

    let view = templates(&job)[0].base.xref;
    assert_eq!(
        view_kinds(&job, view),
        [OpKind::ElementStart, OpKind::ElementEnd]
    );
}

#[test]
fn wrong_i18n_metadata_shape_is_fatal() {
    let mut div = element("div", vec![]);
    div.i18n = Some(I18nMeta::Node(i18n::Node::Container(i18n::Container {
        children: vec![],
        source_span: span(),
    })));
    let err = ingest_component("TestCmp", &[t::R3Node::Element(div)], CompilerOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnexpectedI18nMeta {
            node: "Element",
            actual: "Container",
            ..
        }
    ));

    let mut branch = if_branch(Some(AST::read("c")), vec![]);
    branch.i18n = Some(I18nMeta::Message(message("branch")));
    let err = ingest_component("TestCmp", &[if_block(vec![branch])], CompilerOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnexpectedI18nMeta {
            node: "IfBlockBranch",
            expected: "BlockPlaceholder",
            actual: "Message",
            ..
        }
    ));

    let mut defer = deferred(vec![]);
    defer.i18n = Some(I18nMeta::Message(message("defer")));
    let err = ingest_component(
        "TestCmp",
        &[t::R3Node::DeferredBlock(defer)],
        CompilerOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnexpectedI18nMeta {
            node: "DeferredBlock",
            ..
        }
    ));
}
