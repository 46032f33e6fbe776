//! End-to-end tests for the standard phase plan

use angular_template_pipeline::compile_template;
use angular_template_pipeline::compile_template_with;
use angular_template_pipeline::expression_parser::ast::{BindingType, AST};
use angular_template_pipeline::i18n::i18n_ast::{I18nMeta, Message};
use angular_template_pipeline::output::output_ast::{Expression, Statement};
use angular_template_pipeline::render3::r3_ast as t;
use angular_template_pipeline::render3::Identifiers;
use angular_template_pipeline::template::pipeline::ir::enums::I18nContextKind;
use angular_template_pipeline::template::pipeline::ir::expression::{
    EitherXrefIdOrExpression, NextContextExpr,
};
use angular_template_pipeline::template::pipeline::ir::ops::create::{ListenerOp, RepeaterCreateOp};
use angular_template_pipeline::template::pipeline::ir::ops::shared::StatementOp;
use angular_template_pipeline::template::pipeline::ir::variable::SemanticVariable;
use angular_template_pipeline::template::pipeline::ir::{CreateOp, Op, OpKind, OpList, UpdateOp};
use angular_template_pipeline::template::pipeline::src::phases::{Phase, PhasePlan};
use angular_template_pipeline::template::pipeline::src::ComponentCompilationJob;
use angular_template_pipeline::{CompileError, CompilerOptions};

#[path = "util/mod.rs"]
mod util;
use util::*;

fn compile(nodes: Vec<t::R3Node>) -> ComponentCompilationJob {
    init_tracing();
    compile_template("TestCmp", &nodes, CompilerOptions::default()).expect("compilation succeeds")
}

fn update_kinds(job: &ComponentCompilationJob) -> Vec<OpKind> {
    job.root.update.iter().map(|op| op.kind()).collect()
}

fn listeners(job: &ComponentCompilationJob) -> Vec<&ListenerOp> {
    job.all_views()
        .flat_map(|view| view.create.iter())
        .filter_map(|op| match op {
            CreateOp::Listener(op) => Some(op),
            _ => None,
        })
        .collect()
}

fn repeater(job: &ComponentCompilationJob) -> &RepeaterCreateOp {
    job.all_views()
        .flat_map(|view| view.create.iter())
        .find_map(|op| match op {
            CreateOp::RepeaterCreate(op) => Some(op),
            _ => None,
        })
        .expect("a repeater was ingested")
}

fn returned(op: &UpdateOp) -> &Expression {
    match op {
        UpdateOp::Statement(StatementOp {
            statement: Statement::Return(ret),
        }) => &*ret.value,
        other => panic!("expected a return statement, got {other:?}"),
    }
}

fn external_name(expr: &Expression) -> Option<&str> {
    match expr {
        Expression::External(external) => external.value.name.as_deref(),
        _ => None,
    }
}

#[test]
fn class_and_style_bindings_are_specialized() {
    let mut div = element("div", vec![]);
    div.inputs = vec![
        input("active", BindingType::Class, AST::read("isActive")),
        input("width", BindingType::Style, AST::read("width")),
        input("style", BindingType::Property, AST::read("styles")),
        input("class", BindingType::Property, AST::read("classes")),
        input("aria-label", BindingType::Attribute, AST::read("label")),
        input("title", BindingType::Property, AST::read("title")),
    ];
    div.inputs[1].unit = Some("px".to_string());

    let job = compile(vec![t::R3Node::Element(div)]);

    assert_eq!(
        update_kinds(&job),
        [
            OpKind::ClassProp,
            OpKind::StyleProp,
            OpKind::StyleMap,
            OpKind::ClassMap,
            OpKind::Attribute,
            OpKind::Property,
        ]
    );
    let style = job.root.update.iter().find_map(|op| match op {
        UpdateOp::StyleProp(op) => Some(op),
        _ => None,
    });
    let style = style.expect("a style property op");
    assert_eq!(style.name, "width");
    assert_eq!(style.unit.as_deref(), Some("px"));
}

#[test]
fn ng_non_bindable_marks_the_element_and_drops_the_attribute() {
    let mut div = element("div", vec![]);
    div.attributes = vec![
        text_attribute("ngNonBindable", ""),
        text_attribute("id", "frozen"),
    ];

    let job = compile(vec![t::R3Node::Element(div)]);

    let start = job.root.create.iter().find_map(|op| match op {
        CreateOp::ElementStart(op) => Some(op),
        _ => None,
    });
    assert!(start.expect("an element start").base.non_bindable);
    let names: Vec<_> = job
        .root
        .update
        .iter()
        .filter_map(|op| match op {
            UpdateOp::Attribute(op) => Some(op.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, ["id"]);
}

#[test]
fn ng_container_elements_become_containers() {
    let container = element("ng-container", vec![t::R3Node::Element(element("span", vec![]))]);

    let job = compile(vec![t::R3Node::Element(container)]);

    let kinds: Vec<_> = job.root.create.iter().map(|op| op.kind()).collect();
    assert_eq!(
        kinds,
        [
            OpKind::Variable,
            OpKind::ContainerStart,
            OpKind::ElementStart,
            OpKind::ElementEnd,
            OpKind::ContainerEnd,
        ]
    );
    job.root.create.assert_consistent();
}

#[test]
fn listener_in_embedded_view_restores_its_view() {
    let mut button = element("button", vec![]);
    button.outputs = vec![output(
        "click",
        AST::call(AST::read("onClick"), vec![AST::read("$event")]),
    )];
    let template = vec![if_block(vec![if_branch(
        Some(AST::read("show")),
        vec![t::R3Node::Element(button)],
    )])];

    let job = compile(template);

    let [listener] = listeners(&job)[..] else {
        panic!("expected exactly one listener");
    };
    assert!(listener.consumes_dollar_event);
    let handler: Vec<_> = listener.handler_ops.iter().collect();
    assert_eq!(handler.len(), 2);
    match handler[0] {
        UpdateOp::Variable(var) => {
            assert!(matches!(var.variable, SemanticVariable::Context { .. }));
            assert!(matches!(
                &*var.initializer,
                Expression::RestoreView(restore)
                    if matches!(restore.view, EitherXrefIdOrExpression::XrefId(_))
            ));
        }
        other => panic!("expected a restore-view variable, got {other:?}"),
    }
    let Expression::ResetView(reset) = returned(handler[1]) else {
        panic!("the returned value should reset the view");
    };
    let Expression::InvokeFn(call) = &*reset.expr else {
        panic!("expected the handler call inside the reset");
    };
    assert!(matches!(&call.args[..], [Expression::ReadVar(read)] if read.name == "$event"));

    // Every view captures its current view up front.
    for view in job.all_views() {
        match view.create.iter().next() {
            Some(CreateOp::Variable(var)) => {
                assert_eq!(var.variable, SemanticVariable::saved_view(view.xref));
                assert!(matches!(*var.initializer, Expression::GetCurrentView(_)));
            }
            other => panic!("expected a saved-view variable, got {other:?}"),
        };
    }
}

#[test]
fn root_listener_without_references_keeps_its_handler() {
    let mut button = element("button", vec![]);
    button.outputs = vec![output("click", AST::call(AST::read("save"), vec![]))];

    let job = compile(vec![t::R3Node::Element(button)]);

    let [listener] = listeners(&job)[..] else {
        panic!("expected exactly one listener");
    };
    assert!(!listener.consumes_dollar_event);
    assert_eq!(listener.handler_ops.len(), 1);
    let returned = listener.handler_ops.iter().next().map(returned);
    assert!(matches!(returned, Some(Expression::InvokeFn(_))));
}

#[test]
fn root_listener_reading_a_local_ref_restores_its_view() {
    let mut field = element("input", vec![]);
    field.references = vec![reference("box")];
    let mut button = element("button", vec![]);
    button.outputs = vec![output(
        "click",
        AST::call(AST::read("go"), vec![AST::prop(AST::read("box"), "value")]),
    )];

    let job = compile(vec![t::R3Node::Element(field), t::R3Node::Element(button)]);

    let [listener] = listeners(&job)[..] else {
        panic!("expected exactly one listener");
    };
    let kinds: Vec<_> = listener.handler_ops.iter().map(|op| op.kind()).collect();
    assert_eq!(kinds, [OpKind::Variable, OpKind::Statement]);
    let returned = listener.handler_ops.iter().nth(1).map(returned);
    assert!(matches!(returned, Some(Expression::ResetView(_))));
}

#[test]
fn tracking_by_index_uses_the_builtin() {
    let job = compile(vec![for_block("item", AST::read("$index"), vec![text("x")])]);

    let repeater = repeater(&job);
    let track_by_fn = repeater.track_by_fn.as_deref().expect("a track function");
    assert_eq!(
        external_name(track_by_fn),
        Identifiers::repeater_track_by_index().name.as_deref()
    );
    assert!(repeater.track_by_ops.is_none());
    assert!(!repeater.uses_component_instance);
}

#[test]
fn tracking_by_item_uses_the_identity_builtin() {
    let job = compile(vec![for_block("item", AST::read("item"), vec![])]);

    let track_by_fn = repeater(&job).track_by_fn.as_deref().expect("a track function");
    assert_eq!(
        external_name(track_by_fn),
        Identifiers::repeater_track_by_identity().name.as_deref()
    );
}

fn track_by_id() -> AST {
    AST::call(
        AST::prop(AST::this_receiver(), "trackById"),
        vec![AST::read("$index"), AST::read("item")],
    )
}

#[test]
fn component_method_in_root_view_is_passed_directly() {
    let job = compile(vec![for_block("item", track_by_id(), vec![])]);

    let repeater = repeater(&job);
    assert!(repeater.uses_component_instance);
    assert!(repeater.track_by_ops.is_none());
    match repeater.track_by_fn.as_deref() {
        Some(Expression::ReadProp(read)) => {
            assert_eq!(read.name, "trackById");
            assert!(matches!(&*read.receiver, Expression::Context(ctx) if ctx.view == job.root.xref));
        }
        other => panic!("expected the component method, got {other:?}"),
    }
}

#[test]
fn component_method_in_embedded_view_goes_through_the_instance() {
    let template = vec![if_block(vec![if_branch(
        Some(AST::read("ready")),
        vec![for_block("item", track_by_id(), vec![])],
    )])];

    let job = compile(template);

    let repeater = repeater(&job);
    assert!(repeater.uses_component_instance);
    let Some(Expression::ReadProp(read)) = repeater.track_by_fn.as_deref() else {
        panic!("expected a method read off the component instance");
    };
    assert_eq!(read.name, "trackById");
    let Expression::InvokeFn(instance) = &*read.receiver else {
        panic!("expected a component instance call");
    };
    assert!(instance.args.is_empty());
    assert_eq!(
        external_name(&instance.fn_),
        Identifiers::component_instance().name.as_deref()
    );
}

#[test]
fn arbitrary_track_expression_gets_a_body() {
    let job = compile(vec![for_block(
        "item",
        AST::prop(AST::read("item"), "id"),
        vec![],
    )]);

    let repeater = repeater(&job);
    assert!(repeater.track_by_fn.is_none());
    assert!(!repeater.uses_component_instance);
    let ops = repeater.track_by_ops.as_ref().expect("a track body");
    assert_eq!(ops.len(), 1);
    match ops.iter().next().map(returned) {
        Some(Expression::ReadProp(read)) => {
            assert_eq!(read.name, "id");
            assert!(matches!(&*read.receiver, Expression::ReadVar(var) if var.name == "$item"));
        }
        other => panic!("expected `$item.id`, got {other:?}"),
    };
}

fn bare_next_context(steps: usize) -> UpdateOp {
    UpdateOp::Statement(StatementOp::new(Statement::expression(
        Expression::NextContext(NextContextExpr { steps }),
        None,
    )))
}

#[test]
fn next_context_steps_merge_in_listener_handlers() {
    let mut button = element("button", vec![]);
    button.outputs = vec![output("click", AST::call(AST::read("save"), vec![]))];
    let mut job = ingest_only(vec![t::R3Node::Element(button)]);

    for op in job.root.create.iter_mut() {
        if let CreateOp::Listener(listener) = op {
            let first = listener.handler_ops.first().expect("a handler statement");
            listener.handler_ops.insert_before(bare_next_context(1), first);
            listener.handler_ops.insert_before(bare_next_context(1), first);
        }
    }
    Phase::NextContextMerging.run(&mut job);

    let [listener] = listeners(&job)[..] else {
        panic!("expected exactly one listener");
    };
    let steps: Vec<_> = listener
        .handler_ops
        .iter()
        .filter_map(|op| match op {
            UpdateOp::Statement(StatementOp {
                statement: Statement::Expression(stmt),
            }) => match &*stmt.expr {
                Expression::NextContext(next) => Some(next.steps),
                _ => None,
            },
            _ => None,
        })
        .collect();
    assert_eq!(steps, [2]);
    listener.handler_ops.assert_consistent();
}

fn ingest_only(nodes: Vec<t::R3Node>) -> ComponentCompilationJob {
    init_tracing();
    let plan = PhasePlan::new([]).expect("an empty plan is valid");
    compile_template_with("TestCmp", &nodes, CompilerOptions::default(), &plan)
        .expect("ingestion succeeds")
}

#[test]
fn out_of_order_plan_is_rejected() {
    let err = PhasePlan::new([Phase::BindingSpecialization, Phase::StyleBindingSpecialization])
        .expect_err("specialization order is checked");
    assert!(matches!(
        err,
        CompileError::PhaseOrder {
            phase: "specialize_bindings",
            ..
        }
    ));

    let err = PhasePlan::new([Phase::NgContainer, Phase::NgContainer])
        .expect_err("duplicates are checked");
    assert!(matches!(err, CompileError::DuplicatePhase(_)));
}

#[test]
fn custom_plan_runs_only_its_phases() {
    init_tracing();
    let mut div = element("div", vec![]);
    div.inputs = vec![input("active", BindingType::Class, AST::read("on"))];
    let container = element("ng-container", vec![]);
    let template = vec![t::R3Node::Element(div), t::R3Node::Element(container)];

    let plan = PhasePlan::new([Phase::StyleBindingSpecialization]).expect("a valid plan");
    let job = compile_template_with("TestCmp", &template, CompilerOptions::default(), &plan)
        .expect("compilation succeeds");

    assert_eq!(update_kinds(&job), [OpKind::ClassProp]);
    let kinds: Vec<_> = job.root.create.iter().map(|op| op.kind()).collect();
    assert_eq!(
        kinds,
        [
            OpKind::ElementStart,
            OpKind::ElementEnd,
            OpKind::ElementStart,
            OpKind::ElementEnd,
        ]
    );
}

#[test]
fn translated_attributes_share_one_context() {
    let message = || {
        Message::new(
            vec![],
            String::new(),
            "greeting".to_string(),
            String::new(),
        )
    };
    let mut first = text_attribute("title", "Hello");
    first.i18n = Some(I18nMeta::Message(message()));
    let mut second = text_attribute("title", "Hello");
    second.i18n = Some(I18nMeta::Message(message()));
    let mut a = element("div", vec![]);
    a.attributes = vec![first];
    let mut b = element("div", vec![]);
    b.attributes = vec![second];

    let job = compile(vec![t::R3Node::Element(a), t::R3Node::Element(b)]);

    let contexts: Vec<_> = job
        .root
        .create
        .iter()
        .filter_map(|op| match op {
            CreateOp::I18nContext(op) => Some(op),
            _ => None,
        })
        .collect();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].context_kind, I18nContextKind::Attr);
    let attribute_contexts: Vec<_> = job
        .root
        .update
        .iter()
        .filter_map(|op| match op {
            UpdateOp::Attribute(op) => Some(op.i18n_context),
            _ => None,
        })
        .collect();
    assert_eq!(
        attribute_contexts,
        [Some(contexts[0].xref), Some(contexts[0].xref)]
    );
    assert_eq!(
        job.root
            .create
            .iter()
            .filter(|op| op.kind() == OpKind::I18nAttributes)
            .count(),
        2
    );
}

fn i18n_structure(ops: &OpList<CreateOp>) -> Vec<OpKind> {
    ops.iter()
        .map(|op| op.kind())
        .filter(|kind| {
            matches!(
                kind,
                OpKind::I18nStart | OpKind::I18nEnd | OpKind::IcuStart | OpKind::IcuEnd
            )
        })
        .collect()
}

#[test]
fn lone_icu_is_wrapped_in_its_own_block() {
    let job = compile(vec![icu(icu_message("plural", "ICU"), &[("PH", "items")])]);

    assert_eq!(
        i18n_structure(&job.root.create),
        [OpKind::I18nStart, OpKind::IcuStart, OpKind::IcuEnd, OpKind::I18nEnd]
    );
    let ops: Vec<_> = job.root.create.iter().collect();
    let block = ops
        .iter()
        .find_map(|op| match op {
            CreateOp::I18nStart(op) => Some(op),
            _ => None,
        })
        .expect("the ICU is wrapped in a block");
    assert_eq!(block.root, block.xref);
    assert_eq!(block.message.id, "plural");
    let icu_context = ops.iter().find_map(|op| match op {
        CreateOp::IcuStart(op) => op.context,
        _ => None,
    });
    let contexts: Vec<_> = ops
        .iter()
        .filter_map(|op| match op {
            CreateOp::I18nContext(op) => Some(op),
            _ => None,
        })
        .collect();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].context_kind, I18nContextKind::Icu);
    assert_eq!(contexts[0].i18n_block, Some(block.xref));
    assert_eq!(block.context, Some(contexts[0].xref));
    assert_eq!(icu_context, Some(contexts[0].xref));
}

#[test]
fn icu_in_a_branch_of_a_translated_element_joins_the_outer_block() {
    let mut branch = if_branch(
        Some(AST::read("c")),
        vec![icu(icu_message("plural", "ICU"), &[])],
    );
    branch.i18n = Some(block_placeholder("IF"));
    let mut div = element("div", vec![if_block(vec![branch])]);
    div.i18n = Some(I18nMeta::Message(message("block")));

    let job = compile(vec![t::R3Node::Element(div)]);

    let (outer, outer_context) = job
        .root
        .create
        .iter()
        .find_map(|op| match op {
            CreateOp::I18nStart(op) => Some((op.xref, op.context)),
            _ => None,
        })
        .expect("the translated element opens a block");
    let branch_view = job
        .root
        .create
        .iter()
        .find_map(|op| match op {
            CreateOp::ConditionalCreate(op) => Some(op.base.xref),
            _ => None,
        })
        .expect("the @if branch was ingested");

    let branch_ops = &job.view(branch_view).create;
    assert_eq!(
        i18n_structure(branch_ops),
        [OpKind::I18nStart, OpKind::IcuStart, OpKind::IcuEnd, OpKind::I18nEnd]
    );
    let child = branch_ops
        .iter()
        .find_map(|op| match op {
            CreateOp::I18nStart(op) => Some(op),
            _ => None,
        })
        .expect("the branch view opens a child block");
    assert_eq!(child.root, outer);
    assert_ne!(child.xref, outer);
    assert_eq!(child.sub_template_index, Some(1));
    assert_eq!(child.context, outer_context);

    // The ICU is a sub-message of the outer block, so it gets a context of its own.
    let icu_context = branch_ops.iter().find_map(|op| match op {
        CreateOp::I18nContext(op) => Some(op),
        _ => None,
    });
    let icu_context = icu_context.expect("the ICU gets its own context");
    assert_eq!(icu_context.context_kind, I18nContextKind::Icu);
    assert_eq!(icu_context.i18n_block, Some(outer));
}
