//! IR Ops
//!
//! The two closed op families. Every phase matches on these exhaustively, so adding a kind is a
//! compile-checked change.

pub mod create;
pub mod shared;
pub mod update;

use crate::template::pipeline::ir::enums::OpKind;
use crate::template::pipeline::ir::expression::{
    transform_expression_in_place, transform_expressions_in_statement, ExpressionTransform,
    VisitorContextFlag,
};
use crate::template::pipeline::ir::handle::XrefId;
use crate::template::pipeline::ir::operations::Op;

use create::*;
use shared::{StatementOp, VariableOp};
use update::*;

/// An operation usable on the creation side of the IR.
#[derive(Debug)]
pub enum CreateOp {
    ListEnd,
    ElementStart(ElementStartOp),
    ElementEnd(ElementEndOp),
    ContainerStart(ContainerStartOp),
    ContainerEnd(ContainerEndOp),
    Template(TemplateOp),
    ConditionalCreate(ConditionalCreateOp),
    ConditionalBranchCreate(ConditionalCreateOp),
    RepeaterCreate(RepeaterCreateOp),
    Listener(ListenerOp),
    Text(TextOp),
    Projection(ProjectionOp),
    ExtractedAttribute(ExtractedAttributeOp),
    Defer(DeferOp),
    DeferOn(DeferOnOp),
    I18nStart(I18nStartOp),
    I18nEnd(I18nEndOp),
    I18nContext(I18nContextOp),
    I18nAttributes(I18nAttributesOp),
    IcuStart(IcuStartOp),
    IcuEnd(IcuEndOp),
    DeclareLet(DeclareLetOp),
    Variable(VariableOp),
    Statement(StatementOp),
}

/// An operation usable on the update side of the IR.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    ListEnd,
    Binding(BindingOp),
    Property(PropertyOp),
    TwoWayProperty(TwoWayPropertyOp),
    Attribute(AttributeOp),
    DomProperty(DomPropertyOp),
    StyleProp(StylePropOp),
    ClassProp(ClassPropOp),
    StyleMap(StyleMapOp),
    ClassMap(ClassMapOp),
    InterpolateText(InterpolateTextOp),
    Conditional(ConditionalOp),
    Repeater(RepeaterOp),
    DeferWhen(DeferWhenOp),
    StoreLet(StoreLetOp),
    Variable(VariableOp),
    Statement(StatementOp),
}

impl CreateOp {
    /// The xref this op declares, if it declares one.
    pub fn xref(&self) -> Option<XrefId> {
        match self {
            CreateOp::ElementStart(op) => Some(op.base.xref),
            CreateOp::ElementEnd(op) => Some(op.xref),
            CreateOp::ContainerStart(op) => Some(op.base.xref),
            CreateOp::ContainerEnd(op) => Some(op.xref),
            CreateOp::Template(op) => Some(op.base.xref),
            CreateOp::ConditionalCreate(op) | CreateOp::ConditionalBranchCreate(op) => {
                Some(op.base.xref)
            }
            CreateOp::RepeaterCreate(op) => Some(op.base.xref),
            CreateOp::Text(op) => Some(op.xref),
            CreateOp::Projection(op) => Some(op.xref),
            CreateOp::Defer(op) => Some(op.xref),
            CreateOp::I18nStart(op) => Some(op.xref),
            CreateOp::I18nEnd(op) => Some(op.xref),
            CreateOp::I18nContext(op) => Some(op.xref),
            CreateOp::I18nAttributes(op) => Some(op.xref),
            CreateOp::IcuStart(op) => Some(op.xref),
            CreateOp::IcuEnd(op) => Some(op.xref),
            CreateOp::DeclareLet(op) => Some(op.xref),
            CreateOp::Variable(op) => Some(op.xref),
            CreateOp::ListEnd
            | CreateOp::Listener(_)
            | CreateOp::ExtractedAttribute(_)
            | CreateOp::DeferOn(_)
            | CreateOp::Statement(_) => None,
        }
    }

    /// The shared fields of element-like ops (elements, containers and templates of every kind).
    pub fn element_base(&self) -> Option<&ElementOrContainerOpBase> {
        match self {
            CreateOp::ElementStart(op) => Some(&op.base),
            CreateOp::ContainerStart(op) => Some(&op.base),
            CreateOp::Template(op) => Some(&op.base),
            CreateOp::ConditionalCreate(op) | CreateOp::ConditionalBranchCreate(op) => {
                Some(&op.base)
            }
            CreateOp::RepeaterCreate(op) => Some(&op.base),
            _ => None,
        }
    }

    pub fn element_base_mut(&mut self) -> Option<&mut ElementOrContainerOpBase> {
        match self {
            CreateOp::ElementStart(op) => Some(&mut op.base),
            CreateOp::ContainerStart(op) => Some(&mut op.base),
            CreateOp::Template(op) => Some(&mut op.base),
            CreateOp::ConditionalCreate(op) | CreateOp::ConditionalBranchCreate(op) => {
                Some(&mut op.base)
            }
            CreateOp::RepeaterCreate(op) => Some(&mut op.base),
            _ => None,
        }
    }
}

impl UpdateOp {
    /// The element, text node or view this op updates.
    pub fn target(&self) -> Option<XrefId> {
        match self {
            UpdateOp::Binding(op) => Some(op.target),
            UpdateOp::Property(op) => Some(op.target),
            UpdateOp::TwoWayProperty(op) => Some(op.target),
            UpdateOp::Attribute(op) => Some(op.target),
            UpdateOp::StyleProp(op) => Some(op.target),
            UpdateOp::ClassProp(op) => Some(op.target),
            UpdateOp::StyleMap(op) => Some(op.target),
            UpdateOp::ClassMap(op) => Some(op.target),
            UpdateOp::InterpolateText(op) => Some(op.target),
            UpdateOp::Conditional(op) => Some(op.target),
            UpdateOp::Repeater(op) => Some(op.target),
            UpdateOp::DeferWhen(op) => Some(op.target),
            UpdateOp::StoreLet(op) => Some(op.target),
            UpdateOp::ListEnd
            | UpdateOp::DomProperty(_)
            | UpdateOp::Variable(_)
            | UpdateOp::Statement(_) => None,
        }
    }
}

fn transform_binding_expression(
    expression: &mut BindingExpression,
    transform: &mut ExpressionTransform<'_>,
    flags: VisitorContextFlag,
) {
    match expression {
        BindingExpression::Expression(expr) => transform_expression_in_place(expr, transform, flags),
        BindingExpression::Interpolation(interpolation) => {
            for expr in &mut interpolation.expressions {
                transform_expression_in_place(expr, transform, flags);
            }
        }
    }
}

impl Op for CreateOp {
    fn kind(&self) -> OpKind {
        match self {
            CreateOp::ListEnd => OpKind::ListEnd,
            CreateOp::ElementStart(_) => OpKind::ElementStart,
            CreateOp::ElementEnd(_) => OpKind::ElementEnd,
            CreateOp::ContainerStart(_) => OpKind::ContainerStart,
            CreateOp::ContainerEnd(_) => OpKind::ContainerEnd,
            CreateOp::Template(_) => OpKind::Template,
            CreateOp::ConditionalCreate(_) => OpKind::ConditionalCreate,
            CreateOp::ConditionalBranchCreate(_) => OpKind::ConditionalBranchCreate,
            CreateOp::RepeaterCreate(_) => OpKind::RepeaterCreate,
            CreateOp::Listener(_) => OpKind::Listener,
            CreateOp::Text(_) => OpKind::Text,
            CreateOp::Projection(_) => OpKind::Projection,
            CreateOp::ExtractedAttribute(_) => OpKind::ExtractedAttribute,
            CreateOp::Defer(_) => OpKind::Defer,
            CreateOp::DeferOn(_) => OpKind::DeferOn,
            CreateOp::I18nStart(_) => OpKind::I18nStart,
            CreateOp::I18nEnd(_) => OpKind::I18nEnd,
            CreateOp::I18nContext(_) => OpKind::I18nContext,
            CreateOp::I18nAttributes(_) => OpKind::I18nAttributes,
            CreateOp::IcuStart(_) => OpKind::IcuStart,
            CreateOp::IcuEnd(_) => OpKind::IcuEnd,
            CreateOp::DeclareLet(_) => OpKind::DeclareLet,
            CreateOp::Variable(_) => OpKind::Variable,
            CreateOp::Statement(_) => OpKind::Statement,
        }
    }

    fn list_end() -> Self {
        CreateOp::ListEnd
    }

    fn transform_expressions(
        &mut self,
        transform: &mut ExpressionTransform<'_>,
        flags: VisitorContextFlag,
    ) {
        match self {
            CreateOp::Variable(op) => {
                transform_expression_in_place(&mut op.initializer, transform, flags)
            }
            CreateOp::Statement(op) => {
                transform_expressions_in_statement(&mut op.statement, transform, flags)
            }
            CreateOp::Listener(op) => {
                for inner in op.handler_ops.iter_mut() {
                    inner.transform_expressions(
                        transform,
                        flags | VisitorContextFlag::IN_CHILD_OPERATION,
                    );
                }
            }
            CreateOp::RepeaterCreate(op) => {
                match op.track_by_ops.as_mut() {
                    None => transform_expression_in_place(&mut op.track, transform, flags),
                    Some(track_by_ops) => {
                        for inner in track_by_ops.iter_mut() {
                            inner.transform_expressions(
                                transform,
                                flags | VisitorContextFlag::IN_CHILD_OPERATION,
                            );
                        }
                    }
                }
                if let Some(track_by_fn) = op.track_by_fn.as_mut() {
                    transform_expression_in_place(track_by_fn, transform, flags);
                }
            }
            CreateOp::ExtractedAttribute(op) => {
                if let Some(expr) = op.expression.as_mut() {
                    transform_expression_in_place(expr, transform, flags);
                }
            }
            CreateOp::ListEnd
            | CreateOp::ElementStart(_)
            | CreateOp::ElementEnd(_)
            | CreateOp::ContainerStart(_)
            | CreateOp::ContainerEnd(_)
            | CreateOp::Template(_)
            | CreateOp::ConditionalCreate(_)
            | CreateOp::ConditionalBranchCreate(_)
            | CreateOp::Text(_)
            | CreateOp::Projection(_)
            | CreateOp::Defer(_)
            | CreateOp::DeferOn(_)
            | CreateOp::I18nStart(_)
            | CreateOp::I18nEnd(_)
            | CreateOp::I18nContext(_)
            | CreateOp::I18nAttributes(_)
            | CreateOp::IcuStart(_)
            | CreateOp::IcuEnd(_)
            | CreateOp::DeclareLet(_) => {}
        }
    }
}

impl Op for UpdateOp {
    fn kind(&self) -> OpKind {
        match self {
            UpdateOp::ListEnd => OpKind::ListEnd,
            UpdateOp::Binding(_) => OpKind::Binding,
            UpdateOp::Property(_) => OpKind::Property,
            UpdateOp::TwoWayProperty(_) => OpKind::TwoWayProperty,
            UpdateOp::Attribute(_) => OpKind::Attribute,
            UpdateOp::DomProperty(_) => OpKind::DomProperty,
            UpdateOp::StyleProp(_) => OpKind::StyleProp,
            UpdateOp::ClassProp(_) => OpKind::ClassProp,
            UpdateOp::StyleMap(_) => OpKind::StyleMap,
            UpdateOp::ClassMap(_) => OpKind::ClassMap,
            UpdateOp::InterpolateText(_) => OpKind::InterpolateText,
            UpdateOp::Conditional(_) => OpKind::Conditional,
            UpdateOp::Repeater(_) => OpKind::Repeater,
            UpdateOp::DeferWhen(_) => OpKind::DeferWhen,
            UpdateOp::StoreLet(_) => OpKind::StoreLet,
            UpdateOp::Variable(_) => OpKind::Variable,
            UpdateOp::Statement(_) => OpKind::Statement,
        }
    }

    fn list_end() -> Self {
        UpdateOp::ListEnd
    }

    fn transform_expressions(
        &mut self,
        transform: &mut ExpressionTransform<'_>,
        flags: VisitorContextFlag,
    ) {
        match self {
            UpdateOp::Binding(op) => transform_binding_expression(&mut op.expression, transform, flags),
            UpdateOp::Property(op) => {
                transform_binding_expression(&mut op.expression, transform, flags)
            }
            UpdateOp::Attribute(op) => {
                transform_binding_expression(&mut op.expression, transform, flags)
            }
            UpdateOp::DomProperty(op) => {
                transform_binding_expression(&mut op.expression, transform, flags)
            }
            UpdateOp::StyleProp(op) => {
                transform_binding_expression(&mut op.expression, transform, flags)
            }
            UpdateOp::StyleMap(op) => {
                transform_binding_expression(&mut op.expression, transform, flags)
            }
            UpdateOp::ClassMap(op) => {
                transform_binding_expression(&mut op.expression, transform, flags)
            }
            UpdateOp::TwoWayProperty(op) => {
                transform_expression_in_place(&mut op.expression, transform, flags)
            }
            UpdateOp::ClassProp(op) => {
                transform_expression_in_place(&mut op.expression, transform, flags)
            }
            UpdateOp::InterpolateText(op) => {
                for expr in &mut op.interpolation.expressions {
                    transform_expression_in_place(expr, transform, flags);
                }
            }
            UpdateOp::Conditional(op) => {
                if let Some(test) = op.test.as_mut() {
                    transform_expression_in_place(test, transform, flags);
                }
                for condition in &mut op.conditions {
                    if let Some(expr) = condition.expr.as_mut() {
                        transform_expression_in_place(expr, transform, flags);
                    }
                }
                if let Some(processed) = op.processed.as_mut() {
                    transform_expression_in_place(processed, transform, flags);
                }
                if let Some(context_value) = op.context_value.as_mut() {
                    transform_expression_in_place(context_value, transform, flags);
                }
            }
            UpdateOp::Repeater(op) => {
                transform_expression_in_place(&mut op.collection, transform, flags)
            }
            UpdateOp::DeferWhen(op) => transform_expression_in_place(&mut op.expr, transform, flags),
            UpdateOp::StoreLet(op) => transform_expression_in_place(&mut op.value, transform, flags),
            UpdateOp::Variable(op) => {
                transform_expression_in_place(&mut op.initializer, transform, flags)
            }
            UpdateOp::Statement(op) => {
                transform_expressions_in_statement(&mut op.statement, transform, flags)
            }
            UpdateOp::ListEnd => {}
        }
    }
}
