//! Ingest Module
//!
//! Lowers a template AST (or a component's host bindings) into the IR of a compilation job.
//! Every nested view (template, control flow branch, loop body, defer sub-view) becomes its own
//! `ViewCompilationUnit`.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use crate::config::CompilerOptions;
use crate::core::SecurityContext;
use crate::error::{location, CompileError, Result};
use crate::expression_parser::ast::{
    BindingType, ParsedEvent, ParsedEventType, ParsedProperty, AST,
};
use crate::i18n::i18n_ast::{I18nMeta, Message, Node as I18nNode};
use crate::ml_parser::tags::split_ns_name;
use crate::output::output_ast::{
    BinaryOperator, Expression, LiteralExpr, LiteralValue, Statement,
};
use crate::parse_util::ParseSourceSpan;
use crate::render3::r3_ast as t;
use crate::schema::{calc_possible_security_contexts, security_context};
use crate::template::pipeline::ir::expression::{ConditionalCaseExpr, LexicalReadExpr};
use crate::template::pipeline::ir::ops::create::{
    ConditionalCreateOp, DeclareLetOp, DeferOnOp, DeferOp, DeferTrigger, ElementEndOp,
    ElementStartOp, ExtractedAttributeOp, I18nAttributesOp, I18nEndOp, I18nPlaceholder,
    I18nStartOp, IcuEndOp, IcuStartOp, ListenerOp, LocalRef, ProjectionOp, RepeaterCreateOp,
    RepeaterVarNames, TemplateOp, TextOp,
};
use crate::template::pipeline::ir::ops::shared::StatementOp;
use crate::template::pipeline::ir::ops::update::{
    BindingExpression, BindingOp, ConditionalOp, DeferWhenOp, Interpolation, InterpolateTextOp,
    RepeaterOp, StoreLetOp,
};
use crate::template::pipeline::ir::variable::CTX_REF;
use crate::template::pipeline::ir::{
    self, BindingKind, CreateOp, Namespace, OpList, SlotHandle, TemplateKind, UpdateOp, XrefId,
};
use crate::template::pipeline::src::compilation::{
    AliasVariable, CompilationJob, ComponentCompilationJob, HostBindingCompilationJob,
};
use crate::template::pipeline::src::conversion::{
    convert_ast, convert_source_span, prefix_with_namespace,
};

/// Tag name of the `ng-template` element.
const NG_TEMPLATE_TAG_NAME: &str = "ng-template";

/// Tag name of the `ng-content` element.
const NG_CONTENT_TAG_NAME: &str = "ng-content";

/// Prefix for any animation binding
const ANIMATE_PREFIX: &str = "animate.";

/// Process a template AST and convert it into a `ComponentCompilationJob` in the intermediate
/// representation.
pub fn ingest_component(
    component_name: impl Into<String>,
    template: &[t::R3Node],
    options: CompilerOptions,
) -> Result<ComponentCompilationJob> {
    let mut job = ComponentCompilationJob::new(component_name, options);
    let root = job.root.xref;
    ingest_nodes(&mut job, root, template)?;
    debug!(
        component = %job.component_name,
        views = job.views.len() + 1,
        "ingested template"
    );
    Ok(job)
}

/// A static host attribute, e.g. `host: {'role': 'button'}`.
#[derive(Debug, Clone)]
pub struct HostAttribute {
    pub name: String,
    pub value: Expression,
    pub source_span: ParseSourceSpan,
}

/// The host bindings of a component or directive.
#[derive(Debug, Clone, Default)]
pub struct HostBindingInput {
    pub component_name: String,
    pub component_selector: String,
    pub properties: Vec<ParsedProperty>,
    pub attributes: Vec<HostAttribute>,
    pub events: Vec<ParsedEvent>,
}

/// Process a host binding AST and convert it into a `HostBindingCompilationJob` in the
/// intermediate representation.
pub fn ingest_host_binding(
    input: &HostBindingInput,
    options: CompilerOptions,
) -> Result<HostBindingCompilationJob> {
    let mut job = HostBindingCompilationJob::new(input.component_name.clone(), options);

    for property in &input.properties {
        let mut binding_kind = BindingKind::Property;
        let mut name = property.name.as_str();
        if let Some(attr_name) = name.strip_prefix("attr.") {
            name = attr_name;
            binding_kind = BindingKind::Attribute;
        }
        if property.is_animation {
            binding_kind = BindingKind::Animation;
        }
        let security_contexts = possible_security_contexts(
            &input.component_selector,
            name,
            binding_kind == BindingKind::Attribute,
        );
        ingest_dom_property(&mut job, property, name, binding_kind, security_contexts)?;
    }

    for attribute in &input.attributes {
        let security_contexts =
            possible_security_contexts(&input.component_selector, &attribute.name, true);
        ingest_host_attribute(&mut job, attribute, security_contexts);
    }

    for event in &input.events {
        ingest_host_event(&mut job, event)?;
    }

    debug!(
        component = %job.component_name,
        bindings = job.root.update.len(),
        listeners = job.root.create.len(),
        "ingested host bindings"
    );
    Ok(job)
}

fn possible_security_contexts(
    selector: &str,
    name: &str,
    is_attribute: bool,
) -> Vec<SecurityContext> {
    calc_possible_security_contexts(selector, name, is_attribute)
        .into_iter()
        .filter(|context| *context != SecurityContext::NONE)
        .collect()
}

fn ingest_dom_property(
    job: &mut HostBindingCompilationJob,
    property: &ParsedProperty,
    name: &str,
    binding_kind: BindingKind,
    security_contexts: Vec<SecurityContext>,
) -> Result<()> {
    let expression = match property.expression.ast.as_ref() {
        AST::Interpolation(interpolation) => {
            let expressions = interpolation
                .expressions
                .iter()
                .map(|expr| convert_ast(expr, &mut *job, Some(&property.source_span)))
                .collect::<Result<Vec<_>>>()?;
            BindingExpression::Interpolation(Interpolation::new(
                interpolation.strings.clone(),
                expressions,
                Vec::new(),
            )?)
        }
        ast => BindingExpression::Expression(convert_ast(
            ast,
            &mut *job,
            Some(&property.source_span),
        )?),
    };

    let binding = BindingOp::new(
        job.root.xref,
        binding_kind,
        name.to_string(),
        expression,
        None,
        security_contexts,
        false,
        false,
        None,
        None,
        property.source_span.clone(),
    );
    job.root.update.push(UpdateOp::Binding(binding));
    Ok(())
}

fn ingest_host_attribute(
    job: &mut HostBindingCompilationJob,
    attribute: &HostAttribute,
    security_contexts: Vec<SecurityContext>,
) {
    let binding = BindingOp::new(
        job.root.xref,
        BindingKind::Attribute,
        attribute.name.clone(),
        BindingExpression::Expression(attribute.value.clone()),
        None,
        security_contexts,
        // Host attributes are always extracted to the static attribute array.
        true,
        false,
        None,
        None,
        attribute.source_span.clone(),
    );
    job.root.update.push(UpdateOp::Binding(binding));
}

fn ingest_host_event(job: &mut HostBindingCompilationJob, event: &ParsedEvent) -> Result<()> {
    let (phase, target) = match event.event_type {
        ParsedEventType::Animation => (event.target_or_phase.clone(), None),
        _ => (None, event.target_or_phase.clone()),
    };
    let handler_ops =
        make_listener_handler_ops(&mut *job, &event.handler.ast, &event.name, &event.handler_span)?;
    let listener = ListenerOp::new(
        job.root.xref,
        SlotHandle::new(),
        event.name.clone(),
        None,
        handler_ops,
        phase,
        target,
        true,
        event.source_span.clone(),
    );
    job.root.create.push(CreateOp::Listener(listener));
    Ok(())
}

/// Ingest the nodes of a template AST into the view `view`.
fn ingest_nodes(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    template: &[t::R3Node],
) -> Result<()> {
    for node in template {
        match node {
            t::R3Node::Element(el) => ingest_element(job, view, el)?,
            t::R3Node::Template(tmpl) => ingest_template(job, view, tmpl)?,
            t::R3Node::Content(content) => ingest_content(job, view, content)?,
            t::R3Node::Text(text) => ingest_text(job, view, text, None),
            t::R3Node::BoundText(text) => ingest_bound_text(job, view, text, None)?,
            t::R3Node::IfBlock(block) => ingest_if_block(job, view, block)?,
            t::R3Node::SwitchBlock(block) => ingest_switch_block(job, view, block)?,
            t::R3Node::DeferredBlock(block) => ingest_defer_block(job, view, block)?,
            t::R3Node::Icu(icu) => ingest_icu(job, view, icu)?,
            t::R3Node::ForLoopBlock(block) => ingest_for_block(job, view, block)?,
            t::R3Node::LetDeclaration(decl) => ingest_let_declaration(job, view, decl)?,
            t::R3Node::Comment(_) => {}
            t::R3Node::UnknownBlock(block) => {
                return Err(CompileError::UnsupportedNode {
                    kind: node.kind_name(),
                    location: location(Some(&block.source_span)),
                })
            }
        }
    }
    Ok(())
}

fn unexpected_i18n(
    node: &'static str,
    expected: &'static str,
    actual: Option<&I18nMeta>,
    span: &ParseSourceSpan,
) -> CompileError {
    CompileError::UnexpectedI18nMeta {
        node,
        expected,
        actual: actual.map_or("none", I18nMeta::kind_name),
        location: location(Some(span)),
    }
}

/// The metadata of an attribute or binding, which is either absent or a whole message.
fn as_message(
    meta: Option<&I18nMeta>,
    node: &'static str,
    span: &ParseSourceSpan,
) -> Result<Option<Message>> {
    match meta {
        None => Ok(None),
        Some(I18nMeta::Message(message)) => Ok(Some(message.clone())),
        Some(other) => Err(unexpected_i18n(node, "Message", Some(other), span)),
    }
}

fn block_placeholder(
    meta: Option<&I18nMeta>,
    node: &'static str,
    span: &ParseSourceSpan,
) -> Result<Option<crate::i18n::i18n_ast::BlockPlaceholder>> {
    match meta {
        None => Ok(None),
        Some(I18nMeta::Node(I18nNode::BlockPlaceholder(placeholder))) => {
            Ok(Some(placeholder.clone()))
        }
        Some(other) => Err(unexpected_i18n(node, "BlockPlaceholder", Some(other), span)),
    }
}

fn split_name(name: &str) -> Result<(Option<String>, String)> {
    split_ns_name(name, true).map_err(CompileError::InvalidName)
}

fn string_literal(value: &str, source_span: &ParseSourceSpan) -> Expression {
    Expression::Literal(LiteralExpr {
        value: LiteralValue::String(value.to_string()),
        source_span: Some(source_span.clone()),
    })
}

fn local_refs(references: &[t::Reference]) -> Vec<LocalRef> {
    references
        .iter()
        .map(|reference| LocalRef {
            name: reference.name.clone(),
            target: reference.value.clone(),
        })
        .collect()
}

fn binding_kind_for(binding_type: BindingType) -> BindingKind {
    match binding_type {
        BindingType::Property => BindingKind::Property,
        BindingType::TwoWay => BindingKind::TwoWayProperty,
        BindingType::Attribute => BindingKind::Attribute,
        BindingType::Class => BindingKind::ClassName,
        BindingType::Style => BindingKind::StyleProperty,
        BindingType::Animation => BindingKind::Animation,
    }
}

/// Names of the interpolation placeholders of a message, in order of first appearance.
fn message_placeholders(message: &Message) -> Vec<String> {
    fn collect(nodes: &[I18nNode], names: &mut IndexSet<String>) {
        for node in nodes {
            match node {
                I18nNode::Placeholder(placeholder) => {
                    names.insert(placeholder.name.clone());
                }
                I18nNode::Container(container) => collect(&container.children, names),
                I18nNode::TagPlaceholder(tag) => collect(&tag.children, names),
                I18nNode::BlockPlaceholder(block) => collect(&block.children, names),
                I18nNode::Text(_) | I18nNode::Icu(_) | I18nNode::IcuPlaceholder(_) => {}
            }
        }
    }

    let mut names = IndexSet::new();
    collect(&message.nodes, &mut names);
    names.into_iter().collect()
}

/// Converts a binding value: interpolations keep their literal segments, anything else becomes a
/// single expression.
fn convert_ast_with_interpolation(
    job: &mut dyn CompilationJob,
    value: &AST,
    i18n_message: Option<&Message>,
    source_span: Option<&ParseSourceSpan>,
) -> Result<BindingExpression> {
    match value {
        AST::Interpolation(interpolation) => {
            let expressions = interpolation
                .expressions
                .iter()
                .map(|expr| convert_ast(expr, &mut *job, source_span))
                .collect::<Result<Vec<_>>>()?;
            let placeholders = i18n_message.map(message_placeholders).unwrap_or_default();
            Ok(BindingExpression::Interpolation(Interpolation::new(
                interpolation.strings.clone(),
                expressions,
                placeholders,
            )?))
        }
        ast => Ok(BindingExpression::Expression(convert_ast(ast, job, source_span)?)),
    }
}

/// Ingest an element AST from the template into the view `view`.
fn ingest_element(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    element: &t::Element,
) -> Result<()> {
    let i18n_placeholder = match &element.i18n {
        None | Some(I18nMeta::Message(_)) => None,
        Some(I18nMeta::Node(I18nNode::TagPlaceholder(placeholder))) => Some(placeholder.clone()),
        other => {
            return Err(unexpected_i18n(
                "Element",
                "Message or TagPlaceholder",
                other.as_ref(),
                &element.start_source_span,
            ))
        }
    };

    let id = job.allocate_xref_id();
    let (namespace_key, element_name) = split_name(&element.name)?;
    let mut start_op = ElementStartOp::new(
        element_name,
        id,
        Namespace::from_prefix(namespace_key.as_deref()),
        i18n_placeholder,
        element.start_source_span.clone(),
        element.source_span.clone(),
    );
    start_op.base.local_refs = local_refs(&element.references);
    let handle = start_op.base.handle;
    let tag = start_op.tag.clone();
    job.view_mut(view).create.push(CreateOp::ElementStart(start_op));

    ingest_element_bindings(job, view, id, handle, &tag, element)?;

    // The i18n block opens after the element and its bindings, but before its children.
    let i18n_block = match &element.i18n {
        Some(I18nMeta::Message(message)) => {
            let block = job.allocate_xref_id();
            job.view_mut(view).create.push(CreateOp::I18nStart(I18nStartOp::new(
                block,
                message.clone(),
                None,
                Some(element.start_source_span.clone()),
            )));
            Some(block)
        }
        _ => None,
    };

    ingest_nodes(job, view, &element.children)?;

    let end_span = element
        .end_source_span
        .clone()
        .unwrap_or_else(|| element.start_source_span.clone());
    let create = &mut job.view_mut(view).create;
    if let Some(block) = i18n_block {
        create.push(CreateOp::I18nEnd(I18nEndOp {
            xref: block,
            source_span: Some(end_span.clone()),
        }));
    }
    create.push(CreateOp::ElementEnd(ElementEndOp {
        xref: id,
        source_span: Some(end_span),
    }));
    Ok(())
}

/// Ingest an `ng-template` node from the AST into the view `view`.
fn ingest_template(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    tmpl: &t::Template,
) -> Result<()> {
    let i18n_placeholder = match &tmpl.i18n {
        None | Some(I18nMeta::Message(_)) => None,
        Some(I18nMeta::Node(I18nNode::TagPlaceholder(placeholder))) => {
            Some(I18nPlaceholder::Tag(placeholder.clone()))
        }
        other => {
            return Err(unexpected_i18n(
                "Template",
                "Message or TagPlaceholder",
                other.as_ref(),
                &tmpl.start_source_span,
            ))
        }
    };

    let child_view = job.allocate_view(view);

    let (namespace_prefix, tag_name) = match &tmpl.tag_name {
        Some(tag_name) => {
            let (prefix, name) = split_name(tag_name)?;
            (prefix, Some(name))
        }
        None => (None, None),
    };
    let namespace = Namespace::from_prefix(namespace_prefix.as_deref());
    let function_name_suffix = tag_name
        .as_deref()
        .map(|tag| prefix_with_namespace(tag, namespace))
        .unwrap_or_default();
    let template_kind = if is_plain_template(tmpl) {
        TemplateKind::NgTemplate
    } else {
        TemplateKind::Structural
    };

    let mut template_op = TemplateOp::new(
        child_view,
        template_kind,
        tag_name.clone(),
        function_name_suffix,
        namespace,
        i18n_placeholder,
        tmpl.start_source_span.clone(),
        tmpl.source_span.clone(),
    );
    template_op.base.local_refs = local_refs(&tmpl.references);
    let handle = template_op.base.handle;
    job.view_mut(view).create.push(CreateOp::Template(template_op));

    ingest_template_bindings(job, view, child_view, handle, tag_name.as_deref(), tmpl, template_kind)?;
    ingest_nodes(job, child_view, &tmpl.children)?;

    let unit = job.view_mut(child_view);
    for variable in &tmpl.variables {
        let value = if variable.value.is_empty() {
            "$implicit".to_string()
        } else {
            variable.value.clone()
        };
        unit.context_variables.insert(variable.name.clone(), value);
    }

    // A structural template gets its i18n ops from the element the directive sits on; a plain
    // template brackets its own contents.
    if template_kind == TemplateKind::NgTemplate {
        if let Some(I18nMeta::Message(message)) = &tmpl.i18n {
            let id = job.allocate_xref_id();
            let end_span = tmpl
                .end_source_span
                .clone()
                .unwrap_or_else(|| tmpl.start_source_span.clone());
            let create = &mut job.view_mut(child_view).create;
            create.prepend([CreateOp::I18nStart(I18nStartOp::new(
                id,
                message.clone(),
                None,
                Some(tmpl.start_source_span.clone()),
            ))]);
            create.push(CreateOp::I18nEnd(I18nEndOp {
                xref: id,
                source_span: Some(end_span),
            }));
        }
    }
    Ok(())
}

/// Ingest a content node from the AST into the view `view`.
fn ingest_content(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    content: &t::Content,
) -> Result<()> {
    let i18n_placeholder = match &content.i18n {
        None => None,
        Some(I18nMeta::Node(I18nNode::TagPlaceholder(placeholder))) => Some(placeholder.clone()),
        other => {
            return Err(unexpected_i18n(
                "Content",
                "TagPlaceholder",
                other.as_ref(),
                &content.source_span,
            ))
        }
    };

    // Default content made up only of whitespace and comments is not captured. It is ingested
    // before the projection to match the runtime insertion order.
    let has_fallback = content.children.iter().any(|child| match child {
        t::R3Node::Comment(_) => false,
        t::R3Node::Text(text) => !text.value.trim().is_empty(),
        _ => true,
    });
    let fallback_view = if has_fallback {
        let fallback = job.allocate_view(view);
        ingest_nodes(job, fallback, &content.children)?;
        Some(fallback)
    } else {
        None
    };

    let id = job.allocate_xref_id();
    let op = ProjectionOp {
        xref: id,
        handle: SlotHandle::new(),
        selector: content.selector.clone(),
        projection_slot_index: 0,
        fallback_view,
        i18n_placeholder,
        source_span: content.source_span.clone(),
    };

    // Projection selectors must be static, so attributes are bound as literals only.
    for attr in &content.attributes {
        let context = security_context(NG_CONTENT_TAG_NAME, &attr.name, true);
        let binding = BindingOp::new(
            id,
            BindingKind::Attribute,
            attr.name.clone(),
            BindingExpression::Expression(string_literal(&attr.value, &attr.source_span)),
            None,
            vec![context],
            true,
            false,
            None,
            as_message(attr.i18n.as_ref(), "TextAttribute", &attr.source_span)?,
            attr.source_span.clone(),
        );
        job.view_mut(view).update.push(UpdateOp::Binding(binding));
    }

    job.view_mut(view).create.push(CreateOp::Projection(op));
    Ok(())
}

/// Ingest a literal text node from the AST into the view `view`.
fn ingest_text(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    text: &t::Text,
    icu_placeholder: Option<String>,
) {
    let xref = job.allocate_xref_id();
    job.view_mut(view).create.push(CreateOp::Text(TextOp::new(
        xref,
        text.value.clone(),
        icu_placeholder,
        Some(text.source_span.clone()),
    )));
}

/// Ingest an interpolated text node from the AST into the view `view`.
fn ingest_bound_text(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    text: &t::BoundText,
    icu_placeholder: Option<String>,
) -> Result<()> {
    let AST::Interpolation(value) = text.value.ast.as_ref() else {
        return Err(CompileError::ExpectedInterpolation {
            context: "bound text",
            kind: text.value.ast.type_name(),
            location: location(Some(&text.source_span)),
        });
    };

    let i18n_placeholders = match &text.i18n {
        None => Vec::new(),
        Some(I18nMeta::Node(I18nNode::Container(container))) => container
            .children
            .iter()
            .filter_map(|node| match node {
                I18nNode::Placeholder(placeholder) => Some(placeholder.name.clone()),
                _ => None,
            })
            .collect(),
        other => {
            return Err(unexpected_i18n(
                "BoundText",
                "Container",
                other.as_ref(),
                &text.source_span,
            ))
        }
    };

    let base_source_span = match job.compatibility() {
        ir::CompatibilityMode::TemplateDefinitionBuilder => None,
        ir::CompatibilityMode::Normal => Some(&text.source_span),
    };
    let expressions = value
        .expressions
        .iter()
        .map(|expr| convert_ast(expr, &mut *job, base_source_span))
        .collect::<Result<Vec<_>>>()?;
    let interpolation = Interpolation::new(value.strings.clone(), expressions, i18n_placeholders)?;

    let xref = job.allocate_xref_id();
    let unit = job.view_mut(view);
    unit.create.push(CreateOp::Text(TextOp::new(
        xref,
        String::new(),
        icu_placeholder,
        Some(text.source_span.clone()),
    )));
    unit.update.push(UpdateOp::InterpolateText(InterpolateTextOp {
        target: xref,
        interpolation,
        source_span: text.source_span.clone(),
    }));
    Ok(())
}

/// Ingest an `@if` block into the view `view`.
fn ingest_if_block(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    if_block: &t::IfBlock,
) -> Result<()> {
    let mut first_xref = None;
    let mut conditions = Vec::with_capacity(if_block.branches.len());

    for (i, branch) in if_block.branches.iter().enumerate() {
        let branch_view = job.allocate_view(view);
        let tag_name =
            ingest_control_flow_insertion_point(job, view, branch_view, &branch.children)?;

        if let Some(alias) = &branch.expression_alias {
            job.view_mut(branch_view)
                .context_variables
                .insert(alias.name.clone(), CTX_REF.to_string());
        }

        let i18n_placeholder =
            block_placeholder(branch.i18n.as_ref(), "IfBlockBranch", &branch.block.start_source_span)?;
        let create_op = ConditionalCreateOp::new(
            branch_view,
            tag_name,
            "Conditional".to_string(),
            i18n_placeholder,
            branch.block.start_source_span.clone(),
            branch.block.source_span.clone(),
        );
        let handle = create_op.base.handle;
        job.view_mut(view).create.push(if i == 0 {
            CreateOp::ConditionalCreate(create_op)
        } else {
            CreateOp::ConditionalBranchCreate(create_op)
        });
        if first_xref.is_none() {
            first_xref = Some(branch_view);
        }

        let case_expr = branch
            .expression
            .as_ref()
            .map(|expr| convert_ast(expr, &mut *job, None))
            .transpose()?;
        let mut case = ConditionalCaseExpr::new(
            case_expr,
            branch_view,
            branch.expression_alias.as_ref().map(|alias| alias.name.clone()),
        );
        case.target_slot = handle;
        conditions.push(case);

        ingest_nodes(job, branch_view, &branch.children)?;
    }

    // An `@if` always has at least its first branch.
    let Some(first_xref) = first_xref else {
        return Ok(());
    };
    let mut conditional = ConditionalOp::new(first_xref, None, if_block.block.source_span.clone());
    conditional.conditions = conditions;
    job.view_mut(view).update.push(UpdateOp::Conditional(conditional));
    Ok(())
}

/// Ingest a `@switch` block into the view `view`.
fn ingest_switch_block(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    switch_block: &t::SwitchBlock,
) -> Result<()> {
    // Empty switches render nothing.
    if switch_block.cases.is_empty() {
        return Ok(());
    }

    let mut first_xref = None;
    let mut conditions = Vec::with_capacity(switch_block.cases.len());

    for (i, case) in switch_block.cases.iter().enumerate() {
        let case_view = job.allocate_view(view);
        let tag_name = ingest_control_flow_insertion_point(job, view, case_view, &case.children)?;
        let i18n_placeholder =
            block_placeholder(case.i18n.as_ref(), "SwitchBlockCase", &case.block.start_source_span)?;

        let create_op = ConditionalCreateOp::new(
            case_view,
            tag_name,
            "Case".to_string(),
            i18n_placeholder,
            case.block.start_source_span.clone(),
            case.block.source_span.clone(),
        );
        let handle = create_op.base.handle;
        job.view_mut(view).create.push(if i == 0 {
            CreateOp::ConditionalCreate(create_op)
        } else {
            CreateOp::ConditionalBranchCreate(create_op)
        });
        if first_xref.is_none() {
            first_xref = Some(case_view);
        }

        let case_expr = case
            .expression
            .as_ref()
            .map(|expr| {
                convert_ast(expr, &mut *job, Some(&switch_block.block.start_source_span))
            })
            .transpose()?;
        let mut condition = ConditionalCaseExpr::new(case_expr, case_view, None);
        condition.target_slot = handle;
        conditions.push(condition);

        ingest_nodes(job, case_view, &case.children)?;
    }

    let Some(first_xref) = first_xref else {
        return Ok(());
    };
    let test = convert_ast(&switch_block.expression, &mut *job, None)?;
    let mut conditional = ConditionalOp::new(
        first_xref,
        Some(test),
        switch_block.block.source_span.clone(),
    );
    conditional.conditions = conditions;
    job.view_mut(view).update.push(UpdateOp::Conditional(conditional));
    Ok(())
}

/// Ingests one view of a `@defer` block as a block template. Returns the view and its slot.
fn ingest_defer_view(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    suffix: &str,
    i18n: Option<&I18nMeta>,
    content: Option<(&[t::R3Node], &t::BlockNode)>,
) -> Result<Option<(XrefId, SlotHandle)>> {
    let Some((children, block)) = content else {
        return Ok(None);
    };
    let i18n_placeholder = block_placeholder(i18n, "DeferredBlock", &block.start_source_span)?;

    let secondary_view = job.allocate_view(view);
    ingest_nodes(job, secondary_view, children)?;

    let template_op = TemplateOp::new(
        secondary_view,
        TemplateKind::Block,
        None,
        format!("Defer{}", suffix),
        Namespace::HTML,
        i18n_placeholder.map(I18nPlaceholder::Block),
        block.source_span.clone(),
        block.source_span.clone(),
    );
    let handle = template_op.base.handle;
    job.view_mut(view).create.push(CreateOp::Template(template_op));
    Ok(Some((secondary_view, handle)))
}

/// Ingest a `@defer` block into the view `view`.
fn ingest_defer_block(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    defer_block: &t::DeferredBlock,
) -> Result<()> {
    let main = ingest_defer_view(
        job,
        view,
        "",
        defer_block.i18n.as_ref(),
        Some((&defer_block.children, &defer_block.block)),
    )?;
    let loading = ingest_defer_view(
        job,
        view,
        "Loading",
        defer_block.loading.as_ref().and_then(|loading| loading.i18n.as_ref()),
        defer_block
            .loading
            .as_ref()
            .map(|loading| (loading.children.as_slice(), &loading.block)),
    )?;
    let placeholder = ingest_defer_view(
        job,
        view,
        "Placeholder",
        defer_block
            .placeholder
            .as_ref()
            .and_then(|placeholder| placeholder.i18n.as_ref()),
        defer_block
            .placeholder
            .as_ref()
            .map(|placeholder| (placeholder.children.as_slice(), &placeholder.block)),
    )?;
    let error = ingest_defer_view(
        job,
        view,
        "Error",
        defer_block.error.as_ref().and_then(|error| error.i18n.as_ref()),
        defer_block
            .error
            .as_ref()
            .map(|error| (error.children.as_slice(), &error.block)),
    )?;

    let Some((main_view, main_slot)) = main else {
        return Ok(());
    };
    let defer_xref = job.allocate_xref_id();
    let mut defer_op = DeferOp::new(defer_xref, main_view, defer_block.block.source_span.clone());
    defer_op.main_slot = main_slot;
    defer_op.loading_view = loading.map(|(xref, _)| xref);
    defer_op.loading_slot = loading.map(|(_, slot)| slot);
    defer_op.placeholder_view = placeholder.map(|(xref, _)| xref);
    defer_op.placeholder_slot = placeholder.map(|(_, slot)| slot);
    defer_op.error_view = error.map(|(xref, _)| xref);
    defer_op.error_slot = error.map(|(_, slot)| slot);
    defer_op.placeholder_minimum_time = defer_block
        .placeholder
        .as_ref()
        .and_then(|placeholder| placeholder.minimum_time);
    defer_op.loading_minimum_time = defer_block
        .loading
        .as_ref()
        .and_then(|loading| loading.minimum_time);
    defer_op.loading_after_time = defer_block
        .loading
        .as_ref()
        .and_then(|loading| loading.after_time);
    job.view_mut(view).create.push(CreateOp::Defer(defer_op));

    let mut on_ops = Vec::new();
    let mut when_ops = Vec::new();
    // Hydrate triggers come first: during SSR they set up every other trigger.
    let trigger_sets = [
        (ir::enums::DeferOpModifierKind::Hydrate, &defer_block.hydrate_triggers),
        (ir::enums::DeferOpModifierKind::None, &defer_block.triggers),
        (ir::enums::DeferOpModifierKind::Prefetch, &defer_block.prefetch_triggers),
    ];
    for (modifier, triggers) in trigger_sets {
        ingest_defer_triggers(job, modifier, triggers, defer_xref, &mut on_ops, &mut when_ops)?;
    }

    // Without a plain trigger the block loads when the browser is idle.
    let has_concrete_trigger = on_ops
        .iter()
        .any(|op: &DeferOnOp| op.modifier == ir::enums::DeferOpModifierKind::None)
        || when_ops
            .iter()
            .any(|op: &DeferWhenOp| op.modifier == ir::enums::DeferOpModifierKind::None);
    if !has_concrete_trigger {
        on_ops.push(DeferOnOp {
            defer: defer_xref,
            trigger: DeferTrigger::Idle,
            modifier: ir::enums::DeferOpModifierKind::None,
            source_span: defer_block.block.source_span.clone(),
        });
    }

    let unit = job.view_mut(view);
    unit.create.push_all(on_ops.into_iter().map(CreateOp::DeferOn));
    unit.update.push_all(when_ops.into_iter().map(UpdateOp::DeferWhen));
    Ok(())
}

fn defer_on_trigger(trigger: &t::DeferredTrigger) -> Option<(DeferTrigger, &ParseSourceSpan)> {
    let converted = match trigger {
        t::DeferredTrigger::Idle { source_span } => (DeferTrigger::Idle, source_span),
        t::DeferredTrigger::Immediate { source_span } => (DeferTrigger::Immediate, source_span),
        t::DeferredTrigger::Never { source_span } => (DeferTrigger::Never, source_span),
        t::DeferredTrigger::Timer { delay, source_span } => {
            (DeferTrigger::Timer { delay: *delay }, source_span)
        }
        t::DeferredTrigger::Hover {
            reference,
            source_span,
        } => (
            DeferTrigger::Hover {
                target_name: reference.clone(),
            },
            source_span,
        ),
        t::DeferredTrigger::Interaction {
            reference,
            source_span,
        } => (
            DeferTrigger::Interaction {
                target_name: reference.clone(),
            },
            source_span,
        ),
        t::DeferredTrigger::Viewport {
            reference,
            source_span,
        } => (
            DeferTrigger::Viewport {
                target_name: reference.clone(),
            },
            source_span,
        ),
        t::DeferredTrigger::Bound { .. } => return None,
    };
    Some(converted)
}

fn ingest_defer_triggers(
    job: &mut ComponentCompilationJob,
    modifier: ir::enums::DeferOpModifierKind,
    triggers: &t::DeferredBlockTriggers,
    defer: XrefId,
    on_ops: &mut Vec<DeferOnOp>,
    when_ops: &mut Vec<DeferWhenOp>,
) -> Result<()> {
    for trigger in triggers.on_triggers() {
        if let Some((trigger, source_span)) = defer_on_trigger(trigger) {
            on_ops.push(DeferOnOp {
                defer,
                trigger,
                modifier,
                source_span: source_span.clone(),
            });
        }
    }

    if let Some(t::DeferredTrigger::Bound { value, source_span }) = &triggers.when {
        let expr = convert_ast(value, &mut *job, Some(source_span))?;
        when_ops.push(DeferWhenOp {
            target: defer,
            expr,
            modifier,
            source_span: source_span.clone(),
        });
    }
    Ok(())
}

/// The placeholder name of a message that consists of exactly one ICU.
fn single_icu_placeholder(message: &Message) -> Option<&str> {
    match message.nodes.as_slice() {
        [I18nNode::IcuPlaceholder(placeholder)] => Some(&placeholder.name),
        _ => None,
    }
}

/// Ingest an ICU expression into the view `view`.
fn ingest_icu(job: &mut ComponentCompilationJob, view: XrefId, icu: &t::Icu) -> Result<()> {
    let (message, placeholder) = match &icu.i18n {
        Some(I18nMeta::Message(message)) => match single_icu_placeholder(message) {
            Some(placeholder) => (message, placeholder.to_string()),
            None => {
                return Err(unexpected_i18n(
                    "Icu",
                    "a single-ICU Message",
                    icu.i18n.as_ref(),
                    &icu.source_span,
                ))
            }
        },
        other => {
            return Err(unexpected_i18n(
                "Icu",
                "Message",
                other.as_ref(),
                &icu.source_span,
            ))
        }
    };

    let xref = job.allocate_xref_id();
    job.view_mut(view).create.push(CreateOp::IcuStart(IcuStartOp {
        xref,
        message: message.clone(),
        message_placeholder: placeholder,
        context: None,
        source_span: icu.source_span.clone(),
    }));

    for (placeholder, text) in &icu.vars {
        ingest_bound_text(job, view, text, Some(placeholder.clone()))?;
    }
    for (placeholder, node) in &icu.placeholders {
        match node {
            t::IcuPlaceholder::Text(text) => ingest_text(job, view, text, Some(placeholder.clone())),
            t::IcuPlaceholder::BoundText(text) => {
                ingest_bound_text(job, view, text, Some(placeholder.clone()))?
            }
        }
    }

    job.view_mut(view).create.push(CreateOp::IcuEnd(IcuEndOp { xref }));
    Ok(())
}

/// The expression an `@for` context variable aliases. `$index` and `$count` use loop-specific
/// names so nested loops do not shadow each other.
fn for_loop_variable_expression(
    variable: &t::Variable,
    index_name: &str,
    count_name: &str,
) -> Result<Expression> {
    let index = || Expression::LexicalRead(LexicalReadExpr::new(index_name, None));
    let count = || Expression::LexicalRead(LexicalReadExpr::new(count_name, None));
    let number = |n: f64| crate::output::output_ast::literal(LiteralValue::Number(n));

    let expr = match variable.value.as_str() {
        "$index" => index(),
        "$count" => count(),
        "$first" => index().binary(BinaryOperator::Identical, number(0.0)),
        "$last" => index().binary(
            BinaryOperator::Identical,
            count().binary(BinaryOperator::Minus, number(1.0)),
        ),
        "$even" => index()
            .binary(BinaryOperator::Modulo, number(2.0))
            .binary(BinaryOperator::Identical, number(0.0)),
        "$odd" => index()
            .binary(BinaryOperator::Modulo, number(2.0))
            .binary(BinaryOperator::NotIdentical, number(0.0)),
        _ => {
            return Err(CompileError::UnknownLoopVariable {
                name: variable.value.clone(),
                location: location(Some(&variable.source_span)),
            })
        }
    };
    Ok(expr)
}

/// Ingest a `@for` block into the view `view`.
fn ingest_for_block(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    for_block: &t::ForLoopBlock,
) -> Result<()> {
    let i18n_placeholder =
        block_placeholder(for_block.i18n.as_ref(), "ForLoopBlock", &for_block.block.start_source_span)?;
    let empty_i18n_placeholder = match &for_block.empty {
        Some(empty) => {
            block_placeholder(empty.i18n.as_ref(), "ForLoopBlockEmpty", &empty.block.start_source_span)?
        }
        None => None,
    };

    let repeater_view = job.allocate_view(view);
    let index_name = format!("ɵ$index_{}", repeater_view.as_usize());
    let count_name = format!("ɵ$count_{}", repeater_view.as_usize());
    let mut index_var_names = IndexSet::new();
    let mut context_variables = IndexMap::new();
    let mut aliases = Vec::new();

    context_variables.insert(for_block.item.name.clone(), for_block.item.value.clone());
    for variable in &for_block.context_variables {
        if variable.value == "$index" {
            index_var_names.insert(variable.name.clone());
        }
        match variable.name.as_str() {
            "$index" => {
                context_variables.insert("$index".to_string(), variable.value.clone());
                context_variables.insert(index_name.clone(), variable.value.clone());
            }
            "$count" => {
                context_variables.insert("$count".to_string(), variable.value.clone());
                context_variables.insert(count_name.clone(), variable.value.clone());
            }
            _ => aliases.push(AliasVariable {
                identifier: variable.name.clone(),
                expression: for_loop_variable_expression(variable, &index_name, &count_name)?,
            }),
        }
    }
    {
        let unit = job.view_mut(repeater_view);
        unit.context_variables.extend(context_variables);
        unit.aliases.extend(aliases);
    }

    let track_span = convert_source_span(&for_block.track_by.ast.span(), Some(&for_block.block.source_span));
    let track = convert_ast(&for_block.track_by.ast, &mut *job, track_span.as_ref())?;

    ingest_nodes(job, repeater_view, &for_block.children)?;

    let (empty_view, empty_tag_name) = match &for_block.empty {
        Some(empty) => {
            let empty_view = job.allocate_view(view);
            ingest_nodes(job, empty_view, &empty.children)?;
            let tag = ingest_control_flow_insertion_point(job, view, empty_view, &empty.children)?;
            (Some(empty_view), tag)
        }
        None => (None, None),
    };

    let var_names = RepeaterVarNames {
        dollar_index: index_var_names,
        dollar_implicit: for_block.item.name.clone(),
    };
    let tag_name =
        ingest_control_flow_insertion_point(job, view, repeater_view, &for_block.children)?;

    let repeater_create = RepeaterCreateOp::new(
        repeater_view,
        empty_view,
        tag_name,
        track,
        var_names,
        empty_tag_name,
        i18n_placeholder,
        empty_i18n_placeholder,
        for_block.block.start_source_span.clone(),
        for_block.block.source_span.clone(),
    );
    let handle = repeater_create.base.handle;
    job.view_mut(view).create.push(CreateOp::RepeaterCreate(repeater_create));

    let collection_span =
        convert_source_span(&for_block.expression.ast.span(), Some(&for_block.block.source_span));
    let collection = convert_ast(&for_block.expression.ast, &mut *job, collection_span.as_ref())?;
    job.view_mut(view).update.push(UpdateOp::Repeater(RepeaterOp {
        target: repeater_view,
        target_slot: handle,
        collection,
        source_span: for_block.block.source_span.clone(),
    }));
    Ok(())
}

/// Ingest a `@let` declaration into the view `view`.
fn ingest_let_declaration(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    decl: &t::LetDeclaration,
) -> Result<()> {
    let target = job.allocate_xref_id();
    let value = convert_ast(&decl.value, &mut *job, Some(&decl.value_span))?;
    let unit = job.view_mut(view);
    unit.create.push(CreateOp::DeclareLet(DeclareLetOp {
        xref: target,
        handle: SlotHandle::new(),
        declared_name: decl.name.clone(),
        source_span: decl.source_span.clone(),
    }));
    unit.update.push(UpdateOp::StoreLet(StoreLetOp {
        target,
        declared_name: decl.name.clone(),
        value,
        source_span: decl.source_span.clone(),
    }));
    Ok(())
}

/// Whether the template is an explicit `<ng-template>` rather than one desugared from a
/// structural directive.
fn is_plain_template(tmpl: &t::Template) -> bool {
    split_ns_name(tmpl.tag_name.as_deref().unwrap_or(""), false)
        .map(|(_, name)| name == NG_TEMPLATE_TAG_NAME)
        .unwrap_or(false)
}

/// Process all of the bindings on an element in the template AST and convert them to their IR
/// representation.
fn ingest_element_bindings(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    element_xref: XrefId,
    handle: SlotHandle,
    tag: &str,
    element: &t::Element,
) -> Result<()> {
    let mut bindings = Vec::with_capacity(element.attributes.len() + element.inputs.len());
    let mut i18n_attribute_binding_names = HashSet::new();

    for attr in &element.attributes {
        let context = security_context(&element.name, &attr.name, true);
        bindings.push(BindingOp::new(
            element_xref,
            BindingKind::Attribute,
            attr.name.clone(),
            BindingExpression::Expression(string_literal(&attr.value, &attr.source_span)),
            None,
            vec![context],
            true,
            false,
            None,
            as_message(attr.i18n.as_ref(), "TextAttribute", &attr.source_span)?,
            attr.source_span.clone(),
        ));
        if attr.i18n.is_some() {
            i18n_attribute_binding_names.insert(attr.name.as_str());
        }
    }

    for input in &element.inputs {
        if i18n_attribute_binding_names.contains(input.name.as_str()) {
            warn!(
                component = %job.component_name,
                binding = %input.name,
                "binding is both an i18n attribute and a property; the property binding wins"
            );
        }
        let i18n_message = as_message(input.i18n.as_ref(), "BoundAttribute", &input.source_span)?;
        let expression = convert_ast_with_interpolation(
            &mut *job,
            &input.value.ast,
            i18n_message.as_ref(),
            Some(&input.source_span),
        )?;
        bindings.push(BindingOp::new(
            element_xref,
            binding_kind_for(input.type_),
            input.name.clone(),
            expression,
            input.unit.clone(),
            vec![input.security_context],
            false,
            false,
            None,
            i18n_message,
            input.source_span.clone(),
        ));
    }

    let has_i18n_attributes = bindings.iter().any(|binding| binding.i18n_message.is_some());
    job.view_mut(view)
        .update
        .push_all(bindings.into_iter().map(UpdateOp::Binding));

    for output in &element.outputs {
        let listener = ingest_listener(job, element_xref, handle, Some(tag), output)?;
        job.view_mut(view).create.push(CreateOp::Listener(listener));
    }

    if has_i18n_attributes {
        let xref = job.allocate_xref_id();
        job.view_mut(view)
            .create
            .push(CreateOp::I18nAttributes(I18nAttributesOp {
                xref,
                handle: SlotHandle::new(),
                target: element_xref,
            }));
    }
    Ok(())
}

fn ingest_listener(
    job: &mut ComponentCompilationJob,
    target: XrefId,
    target_slot: SlotHandle,
    tag: Option<&str>,
    output: &t::BoundEvent,
) -> Result<ListenerOp> {
    if output.type_ == ParsedEventType::Animation && output.phase.is_none() {
        return Err(CompileError::MissingAnimationPhase {
            event: output.name.clone(),
            location: location(Some(&output.source_span)),
        });
    }
    let handler_ops =
        make_listener_handler_ops(&mut *job, &output.handler.ast, &output.name, &output.handler_span)?;
    Ok(ListenerOp::new(
        target,
        target_slot,
        output.name.clone(),
        tag.map(str::to_string),
        handler_ops,
        output.phase.clone(),
        output.target.clone(),
        false,
        output.source_span.clone(),
    ))
}

/// Lowers an event handler into its own op list: one statement per expression of a chain, the
/// last of which is returned.
fn make_listener_handler_ops(
    job: &mut dyn CompilationJob,
    handler: &AST,
    event: &str,
    handler_span: &ParseSourceSpan,
) -> Result<OpList<UpdateOp>> {
    let handler_exprs: Vec<&AST> = match handler {
        AST::Chain(chain) => chain.expressions.iter().map(|expr| expr.as_ref()).collect(),
        _ => vec![handler],
    };

    let mut expressions = handler_exprs
        .into_iter()
        .map(|expr| convert_ast(expr, &mut *job, Some(handler_span)))
        .collect::<Result<Vec<_>>>()?;
    let Some(return_expr) = expressions.pop() else {
        return Err(CompileError::EmptyHandler {
            event: event.to_string(),
            location: location(Some(handler_span)),
        });
    };

    let mut handler_ops = OpList::new(job.allocate_list_id());
    for expr in expressions {
        let span = expr.source_span().cloned();
        handler_ops.push(UpdateOp::Statement(StatementOp::new(Statement::expression(
            expr, span,
        ))));
    }
    let span = return_expr.source_span().cloned();
    handler_ops.push(UpdateOp::Statement(StatementOp::new(Statement::returning(
        return_expr,
        span,
    ))));
    Ok(handler_ops)
}

/// A template attribute value: static text, or an expression to bind.
#[derive(Clone, Copy)]
enum TemplateBindingValue<'a> {
    Text(&'a str),
    Ast(&'a AST),
}

/// A template binding lowers to an update binding, to a static const-array entry, or to nothing.
enum TemplateBinding {
    Binding(BindingOp),
    Extracted(ExtractedAttributeOp),
}

/// Process all of the bindings on a template in the template AST and convert them to their IR
/// representation.
fn ingest_template_bindings(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    template_xref: XrefId,
    handle: SlotHandle,
    tag: Option<&str>,
    template: &t::Template,
    template_kind: TemplateKind,
) -> Result<()> {
    let mut bindings = Vec::new();

    for attr in &template.template_attrs {
        let binding = match attr {
            t::TemplateAttr::Text(attr) => create_template_binding(
                job,
                template_xref,
                BindingType::Attribute,
                &attr.name,
                TemplateBindingValue::Text(&attr.value),
                None,
                security_context(NG_TEMPLATE_TAG_NAME, &attr.name, true),
                true,
                template_kind,
                as_message(attr.i18n.as_ref(), "TextAttribute", &attr.source_span)?,
                &attr.source_span,
            )?,
            t::TemplateAttr::Bound(attr) => create_template_binding(
                job,
                template_xref,
                attr.type_,
                &attr.name,
                TemplateBindingValue::Ast(&attr.value.ast),
                attr.unit.clone(),
                attr.security_context,
                true,
                template_kind,
                as_message(attr.i18n.as_ref(), "BoundAttribute", &attr.source_span)?,
                &attr.source_span,
            )?,
        };
        bindings.extend(binding);
    }

    for attr in &template.attributes {
        // Attribute literal bindings, such as `attr.foo="bar"`.
        let binding = create_template_binding(
            job,
            template_xref,
            BindingType::Attribute,
            &attr.name,
            TemplateBindingValue::Text(&attr.value),
            None,
            security_context(NG_TEMPLATE_TAG_NAME, &attr.name, true),
            false,
            template_kind,
            as_message(attr.i18n.as_ref(), "TextAttribute", &attr.source_span)?,
            &attr.source_span,
        )?;
        bindings.extend(binding);
    }

    for input in &template.inputs {
        // Dynamic bindings (both attribute and property bindings).
        let binding = create_template_binding(
            job,
            template_xref,
            input.type_,
            &input.name,
            TemplateBindingValue::Ast(&input.value.ast),
            input.unit.clone(),
            input.security_context,
            false,
            template_kind,
            as_message(input.i18n.as_ref(), "BoundAttribute", &input.source_span)?,
            &input.source_span,
        )?;
        bindings.extend(binding);
    }

    let has_i18n_attributes = bindings.iter().any(|binding| match binding {
        TemplateBinding::Binding(op) => op.i18n_message.is_some(),
        TemplateBinding::Extracted(op) => op.i18n_message.is_some(),
    });
    let mut update_ops = Vec::new();
    let mut create_ops = Vec::new();
    for binding in bindings {
        match binding {
            TemplateBinding::Binding(op) => update_ops.push(UpdateOp::Binding(op)),
            TemplateBinding::Extracted(op) => create_ops.push(CreateOp::ExtractedAttribute(op)),
        }
    }
    let unit = job.view_mut(view);
    unit.create.push_all(create_ops);
    unit.update.push_all(update_ops);

    for output in &template.outputs {
        if output.type_ == ParsedEventType::Animation && output.phase.is_none() {
            return Err(CompileError::MissingAnimationPhase {
                event: output.name.clone(),
                location: location(Some(&output.source_span)),
            });
        }

        match template_kind {
            TemplateKind::NgTemplate => {
                let listener = ingest_listener(job, template_xref, handle, tag, output)?;
                job.view_mut(view).create.push(CreateOp::Listener(listener));
            }
            // Animation listeners are left out of a structural template's const array.
            TemplateKind::Structural if output.type_ != ParsedEventType::Animation => {
                let context = security_context(NG_TEMPLATE_TAG_NAME, &output.name, false);
                job.view_mut(view)
                    .create
                    .push(CreateOp::ExtractedAttribute(ExtractedAttributeOp {
                        target: template_xref,
                        binding_kind: BindingKind::Property,
                        namespace: None,
                        name: output.name.clone(),
                        expression: None,
                        i18n_context: None,
                        i18n_message: None,
                        security_context: vec![context],
                        source_span: None,
                    }));
            }
            _ => {}
        }
    }

    if has_i18n_attributes {
        let xref = job.allocate_xref_id();
        job.view_mut(view)
            .create
            .push(CreateOp::I18nAttributes(I18nAttributesOp {
                xref,
                handle: SlotHandle::new(),
                target: template_xref,
            }));
    }
    Ok(())
}

fn extracted_property(
    target: XrefId,
    binding_kind: BindingKind,
    name: &str,
    i18n_message: Option<Message>,
    security_context: SecurityContext,
) -> TemplateBinding {
    TemplateBinding::Extracted(ExtractedAttributeOp {
        target,
        binding_kind,
        namespace: None,
        name: name.to_string(),
        expression: None,
        i18n_context: None,
        i18n_message,
        security_context: vec![security_context],
        source_span: None,
    })
}

/// Helper to ingest a template binding. Bindings of a structural template that actually target
/// the element inside it only contribute a const-array entry, or nothing at all.
#[allow(clippy::too_many_arguments)]
fn create_template_binding(
    job: &mut ComponentCompilationJob,
    xref: XrefId,
    binding_type: BindingType,
    name: &str,
    value: TemplateBindingValue<'_>,
    unit: Option<String>,
    security_context: SecurityContext,
    is_structural_template_attribute: bool,
    template_kind: TemplateKind,
    i18n_message: Option<Message>,
    source_span: &ParseSourceSpan,
) -> Result<Option<TemplateBinding>> {
    let is_text_binding = matches!(value, TemplateBindingValue::Text(_));

    if template_kind == TemplateKind::Structural {
        if !is_structural_template_attribute {
            match binding_type {
                BindingType::Property | BindingType::Class | BindingType::Style => {
                    return Ok(Some(extracted_property(
                        xref,
                        BindingKind::Property,
                        name,
                        i18n_message,
                        security_context,
                    )));
                }
                BindingType::TwoWay => {
                    return Ok(Some(extracted_property(
                        xref,
                        BindingKind::TwoWayProperty,
                        name,
                        i18n_message,
                        security_context,
                    )));
                }
                BindingType::Attribute | BindingType::Animation => {}
            }
        }
        if !is_text_binding
            && matches!(binding_type, BindingType::Attribute | BindingType::Animation)
        {
            return Ok(None);
        }
    }

    let mut binding_kind = binding_kind_for(binding_type);
    // Dynamic attribute, class and style bindings make little sense on an explicit
    // `<ng-template>`; they become plain property bindings.
    if template_kind == TemplateKind::NgTemplate
        && (matches!(binding_type, BindingType::Class | BindingType::Style)
            || (binding_type == BindingType::Attribute && !is_text_binding))
    {
        binding_kind = BindingKind::Property;
    }

    let expression = match value {
        TemplateBindingValue::Text(text) => {
            BindingExpression::Expression(string_literal(text, source_span))
        }
        TemplateBindingValue::Ast(ast) => convert_ast_with_interpolation(
            &mut *job,
            ast,
            i18n_message.as_ref(),
            Some(source_span),
        )?,
    };

    Ok(Some(TemplateBinding::Binding(BindingOp::new(
        xref,
        binding_kind,
        name.to_string(),
        expression,
        unit,
        vec![security_context],
        is_text_binding,
        is_structural_template_attribute,
        Some(template_kind),
        i18n_message,
        source_span.clone(),
    ))))
}

/// Copies the static attributes and property names of the single root element of a control flow
/// branch onto the branch template, so content projection matches it like it would match a
/// `*ngIf` host. Returns the tag name to use for the branch template.
fn ingest_control_flow_insertion_point(
    job: &mut ComponentCompilationJob,
    view: XrefId,
    xref: XrefId,
    children: &[t::R3Node],
) -> Result<Option<String>> {
    let mut root = None;
    for child in children {
        // Comments and `@let` declarations do not count as a root.
        if matches!(child, t::R3Node::Comment(_) | t::R3Node::LetDeclaration(_)) {
            continue;
        }
        if root.is_some() {
            return Ok(None);
        }
        match child {
            t::R3Node::Element(_) => root = Some(child),
            t::R3Node::Template(tmpl) if tmpl.tag_name.is_some() => root = Some(child),
            _ => return Ok(None),
        }
    }

    let (attributes, inputs, tag_name) = match root {
        Some(t::R3Node::Element(el)) => (&el.attributes, &el.inputs, el.name.as_str()),
        Some(t::R3Node::Template(tmpl)) => match tmpl.tag_name.as_deref() {
            Some(tag_name) => (&tmpl.attributes, &tmpl.inputs, tag_name),
            None => return Ok(None),
        },
        _ => return Ok(None),
    };

    for attr in attributes {
        if attr.name.starts_with(ANIMATE_PREFIX) {
            continue;
        }
        let context = security_context(NG_TEMPLATE_TAG_NAME, &attr.name, true);
        let binding = BindingOp::new(
            xref,
            BindingKind::Attribute,
            attr.name.clone(),
            BindingExpression::Expression(string_literal(&attr.value, &attr.source_span)),
            None,
            vec![context],
            true,
            false,
            None,
            as_message(attr.i18n.as_ref(), "TextAttribute", &attr.source_span)?,
            attr.source_span.clone(),
        );
        job.view_mut(view).update.push(UpdateOp::Binding(binding));
    }

    for input in inputs {
        if matches!(input.type_, BindingType::Animation | BindingType::Attribute) {
            continue;
        }
        let context = security_context(NG_TEMPLATE_TAG_NAME, &input.name, true);
        job.view_mut(view)
            .create
            .push(CreateOp::ExtractedAttribute(ExtractedAttributeOp {
                target: xref,
                binding_kind: BindingKind::Property,
                namespace: None,
                name: input.name.clone(),
                expression: None,
                i18n_context: None,
                i18n_message: None,
                security_context: vec![context],
                source_span: None,
            }));
    }

    Ok((tag_name != NG_TEMPLATE_TAG_NAME).then(|| tag_name.to_string()))
}
