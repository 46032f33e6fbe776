//! Update Operations
//!
//! Payloads of the `UpdateOp` variants: ops that run on every change detection pass.

use crate::core::SecurityContext;
use crate::error::{CompileError, Result};
use crate::i18n::i18n_ast::Message;
use crate::output::output_ast::Expression;
use crate::parse_util::ParseSourceSpan;
use crate::template::pipeline::ir::enums::{BindingKind, DeferOpModifierKind, TemplateKind};
use crate::template::pipeline::ir::expression::ConditionalCaseExpr;
use crate::template::pipeline::ir::handle::{SlotHandle, XrefId};

/// Static strings interleaved with dynamic expressions; `strings.len() == expressions.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    pub strings: Vec<String>,
    pub expressions: Vec<Expression>,
    /// i18n placeholder names for the expressions; either empty or one per expression
    pub i18n_placeholders: Vec<String>,
}

impl Interpolation {
    pub fn new(
        strings: Vec<String>,
        expressions: Vec<Expression>,
        i18n_placeholders: Vec<String>,
    ) -> Result<Self> {
        if !i18n_placeholders.is_empty() && i18n_placeholders.len() != expressions.len() {
            return Err(CompileError::PlaceholderCountMismatch {
                expected: expressions.len(),
                actual: i18n_placeholders.len(),
            });
        }
        Ok(Interpolation {
            strings,
            expressions,
            i18n_placeholders,
        })
    }
}

/// The value of a binding: a single expression or an interpolation.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingExpression {
    Expression(Expression),
    Interpolation(Interpolation),
}

impl BindingExpression {
    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            BindingExpression::Expression(expr) => Some(expr),
            BindingExpression::Interpolation(_) => None,
        }
    }
}

/// An intermediate binding op, that has not yet been processed into an individual property,
/// attribute, style, etc.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingOp {
    /// Reference to the element on which the property is bound
    pub target: XrefId,
    pub binding_kind: BindingKind,
    pub name: String,
    pub expression: BindingExpression,
    /// The unit of the bound value (`px` in `[style.width.px]`)
    pub unit: Option<String>,
    pub security_context: Vec<SecurityContext>,
    /// Whether the binding is a TextAttribute (e.g. `some-attr="some-value"`)
    pub is_text_attribute: bool,
    pub is_structural_template_attribute: bool,
    pub template_kind: Option<TemplateKind>,
    pub i18n_context: Option<XrefId>,
    pub i18n_message: Option<Message>,
    pub source_span: ParseSourceSpan,
}

impl BindingOp {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        target: XrefId,
        binding_kind: BindingKind,
        name: String,
        expression: BindingExpression,
        unit: Option<String>,
        security_context: Vec<SecurityContext>,
        is_text_attribute: bool,
        is_structural_template_attribute: bool,
        template_kind: Option<TemplateKind>,
        i18n_message: Option<Message>,
        source_span: ParseSourceSpan,
    ) -> Self {
        BindingOp {
            target,
            binding_kind,
            name,
            expression,
            unit,
            security_context,
            is_text_attribute,
            is_structural_template_attribute,
            template_kind,
            i18n_context: None,
            i18n_message,
            source_span,
        }
    }
}

/// A logical operation representing binding to a property in the update IR.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyOp {
    pub target: XrefId,
    pub name: String,
    pub expression: BindingExpression,
    /// `Property`, `Template` or `Animation`
    pub binding_kind: BindingKind,
    pub security_context: Vec<SecurityContext>,
    pub is_structural_template_attribute: bool,
    pub template_kind: Option<TemplateKind>,
    pub i18n_context: Option<XrefId>,
    pub i18n_message: Option<Message>,
    pub source_span: ParseSourceSpan,
}

/// The property side of a `[(prop)]` binding.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoWayPropertyOp {
    pub target: XrefId,
    pub name: String,
    pub expression: Expression,
    pub security_context: Vec<SecurityContext>,
    pub is_structural_template_attribute: bool,
    pub template_kind: Option<TemplateKind>,
    pub i18n_context: Option<XrefId>,
    pub i18n_message: Option<Message>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeOp {
    pub target: XrefId,
    pub namespace: Option<String>,
    pub name: String,
    pub expression: BindingExpression,
    pub security_context: Vec<SecurityContext>,
    pub is_text_attribute: bool,
    pub is_structural_template_attribute: bool,
    pub template_kind: Option<TemplateKind>,
    pub i18n_context: Option<XrefId>,
    pub i18n_message: Option<Message>,
    pub source_span: ParseSourceSpan,
}

/// A property binding on a host element.
#[derive(Debug, Clone, PartialEq)]
pub struct DomPropertyOp {
    pub name: String,
    pub expression: BindingExpression,
    pub binding_kind: BindingKind,
    pub i18n_context: Option<XrefId>,
    pub security_context: Vec<SecurityContext>,
    pub source_span: ParseSourceSpan,
}

/// `[style.name.unit]="value"`
#[derive(Debug, Clone, PartialEq)]
pub struct StylePropOp {
    pub target: XrefId,
    pub name: String,
    pub expression: BindingExpression,
    pub unit: Option<String>,
    pub source_span: ParseSourceSpan,
}

/// `[class.name]="condition"`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassPropOp {
    pub target: XrefId,
    pub name: String,
    pub expression: Expression,
    pub source_span: ParseSourceSpan,
}

/// `[style]="map"`
#[derive(Debug, Clone, PartialEq)]
pub struct StyleMapOp {
    pub target: XrefId,
    pub expression: BindingExpression,
    pub source_span: ParseSourceSpan,
}

/// `[class]="map"`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMapOp {
    pub target: XrefId,
    pub expression: BindingExpression,
    pub source_span: ParseSourceSpan,
}

/// A logical operation to perform string interpolation on a text node.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolateTextOp {
    /// Reference to the text node to which the interpolation is bound
    pub target: XrefId,
    pub interpolation: Interpolation,
    pub source_span: ParseSourceSpan,
}

/// Selects which branch of an `@if`/`@switch` block is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalOp {
    /// The view of the first branch; the conditional instruction is anchored on it
    pub target: XrefId,
    /// The `@switch` discriminant, or `None` for `@if`
    pub test: Option<Expression>,
    /// One case per branch, in declaration order
    pub conditions: Vec<ConditionalCaseExpr>,
    /// The lowered selector expression, produced by a later pass
    pub processed: Option<Expression>,
    pub context_value: Option<Expression>,
    pub source_span: ParseSourceSpan,
}

impl ConditionalOp {
    pub fn new(target: XrefId, test: Option<Expression>, source_span: ParseSourceSpan) -> Self {
        ConditionalOp {
            target,
            test,
            conditions: Vec::new(),
            processed: None,
            context_value: None,
            source_span,
        }
    }
}

/// Supplies the collection of a `@for` block on every change detection pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeaterOp {
    pub target: XrefId,
    pub target_slot: SlotHandle,
    pub collection: Expression,
    pub source_span: ParseSourceSpan,
}

/// A `when` trigger of a `@defer` block.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferWhenOp {
    pub target: XrefId,
    pub expr: Expression,
    pub modifier: DeferOpModifierKind,
    pub source_span: ParseSourceSpan,
}

/// Stores the current value of a `@let` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreLetOp {
    pub target: XrefId,
    pub declared_name: String,
    pub value: Expression,
    pub source_span: ParseSourceSpan,
}
