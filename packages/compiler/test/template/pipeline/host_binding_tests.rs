//! Host binding compilation tests

use angular_template_pipeline::compile_host_bindings;
use angular_template_pipeline::expression_parser::ast::{
    ASTWithSource, ParsedEvent, ParsedEventType, ParsedProperty, AST,
};
use angular_template_pipeline::output::output_ast::{literal, Expression, LiteralValue, Statement};
use angular_template_pipeline::template::pipeline::ir::ops::shared::StatementOp;
use angular_template_pipeline::template::pipeline::ir::{CreateOp, Op, OpKind, UpdateOp};
use angular_template_pipeline::template::pipeline::src::{
    HostAttribute, HostBindingCompilationJob, HostBindingInput,
};
use angular_template_pipeline::CompilerOptions;

#[path = "util/mod.rs"]
mod util;
use util::*;

fn property(name: &str, value: AST) -> ParsedProperty {
    ParsedProperty {
        name: name.to_string(),
        expression: ASTWithSource::new(value, None),
        is_animation: false,
        source_span: span(),
    }
}

fn event(name: &str, handler: AST) -> ParsedEvent {
    ParsedEvent {
        name: name.to_string(),
        target_or_phase: None,
        event_type: ParsedEventType::Regular,
        handler: ASTWithSource::new(handler, None),
        source_span: span(),
        handler_span: span(),
    }
}

fn compile(input: HostBindingInput) -> HostBindingCompilationJob {
    init_tracing();
    compile_host_bindings(&input, CompilerOptions::default()).expect("host compilation succeeds")
}

fn input() -> HostBindingInput {
    HostBindingInput {
        component_name: "HostCmp".to_string(),
        component_selector: "host-cmp".to_string(),
        ..Default::default()
    }
}

#[test]
fn host_properties_are_specialized() {
    let job = compile(HostBindingInput {
        properties: vec![
            property("title", AST::read("title")),
            property("attr.aria-label", AST::read("label")),
            property("style", AST::read("styles")),
            property("class.active", AST::read("active")),
        ],
        ..input()
    });

    let kinds: Vec<_> = job.root.update.iter().map(|op| op.kind()).collect();
    assert_eq!(
        kinds,
        [
            OpKind::DomProperty,
            OpKind::Attribute,
            OpKind::StyleMap,
            OpKind::DomProperty,
        ]
    );
    let names: Vec<_> = job
        .root
        .update
        .iter()
        .filter_map(|op| match op {
            UpdateOp::DomProperty(op) => Some(op.name.as_str()),
            UpdateOp::Attribute(op) => Some(op.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, ["title", "aria-label", "class.active"]);
}

#[test]
fn static_host_attributes_are_text_attributes() {
    let job = compile(HostBindingInput {
        attributes: vec![HostAttribute {
            name: "role".to_string(),
            value: literal(LiteralValue::String("button".to_string())),
            source_span: span(),
        }],
        ..input()
    });

    match job.root.update.iter().next() {
        Some(UpdateOp::Attribute(op)) => {
            assert_eq!(op.name, "role");
            assert!(op.is_text_attribute);
        }
        other => panic!("expected an attribute op, got {other:?}"),
    };
}

#[test]
fn host_listener_reads_event_without_restoring_a_view() {
    let job = compile(HostBindingInput {
        events: vec![event(
            "click",
            AST::call(AST::read("onClick"), vec![AST::read("$event")]),
        )],
        ..input()
    });

    let kinds: Vec<_> = job.root.create.iter().map(|op| op.kind()).collect();
    assert_eq!(kinds, [OpKind::Listener]);
    let Some(CreateOp::Listener(listener)) = job.root.create.iter().next() else {
        panic!("expected a listener");
    };
    assert!(listener.host_listener);
    assert!(listener.consumes_dollar_event);
    assert_eq!(listener.handler_ops.len(), 1);
    let returned = listener.handler_ops.iter().next().and_then(|op| match op {
        UpdateOp::Statement(StatementOp {
            statement: Statement::Return(ret),
        }) => Some(&*ret.value),
        _ => None,
    });
    let Some(Expression::InvokeFn(call)) = returned else {
        panic!("expected the handler call to be returned as is");
    };
    assert!(matches!(&call.args[..], [Expression::ReadVar(read)] if read.name == "$event"));
}

#[test]
fn empty_host_produces_empty_lists() {
    let job = compile(input());

    assert!(job.root.create.is_empty());
    assert!(job.root.update.is_empty());
}
