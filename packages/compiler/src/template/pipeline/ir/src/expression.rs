//! IR Expressions
//!
//! Template-specific expression nodes and the traversal helpers phases use to rewrite them.

use bitflags::bitflags;

use crate::output::output_ast::{Expression, Statement};
use crate::parse_util::ParseSourceSpan;
use crate::template::pipeline::ir::handle::{SlotHandle, XrefId};
use crate::template::pipeline::ir::operations::Op;

bitflags! {
    /// Context passed to expression transforms.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VisitorContextFlag: u8 {
        const NONE = 0b0000;
        /// The expression belongs to an op nested inside the op being visited (a listener handler
        /// body or a repeater track body).
        const IN_CHILD_OPERATION = 0b0001;
    }
}

/// Signature of the rewrite callbacks phases hand to the traversal helpers.
pub type ExpressionTransform<'a> = dyn FnMut(Expression, VisitorContextFlag) -> Expression + 'a;

/// Logical expression representing a lexical read of a variable name.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalReadExpr {
    pub name: String,
    pub source_span: Option<ParseSourceSpan>,
}

/// Runtime operation to retrieve the value of a local reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceExpr {
    pub target: XrefId,
    pub target_slot: SlotHandle,
    pub offset: usize,
}

/// A reference to the current view context (usually the `ctx` variable in a template function).
#[derive(Debug, Clone, PartialEq)]
pub struct ContextExpr {
    pub view: XrefId,
}

/// A reference to the current view context inside a track function.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackContextExpr {
    pub view: XrefId,
}

/// Runtime operation to navigate to the next view context in the view hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct NextContextExpr {
    pub steps: usize,
}

/// Runtime operation to snapshot the current view context.
#[derive(Debug, Clone, PartialEq)]
pub struct GetCurrentViewExpr;

/// The view a `RestoreViewExpr` restores, either by its xref or by an already-lowered expression.
#[derive(Debug, Clone, PartialEq)]
pub enum EitherXrefIdOrExpression {
    XrefId(XrefId),
    Expression(Box<Expression>),
}

/// Runtime operation to restore a snapshotted view.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreViewExpr {
    pub view: EitherXrefIdOrExpression,
}

/// Runtime operation to reset the current view context after `RestoreView`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResetViewExpr {
    pub expr: Box<Expression>,
}

/// Read of a variable declared by a `Variable` op.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadVariableExpr {
    pub xref: XrefId,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipeBindingExpr {
    pub target: XrefId,
    pub target_slot: SlotHandle,
    pub name: String,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SafePropertyReadExpr {
    pub receiver: Box<Expression>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SafeKeyedReadExpr {
    pub receiver: Box<Expression>,
    pub index: Box<Expression>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SafeInvokeFunctionExpr {
    pub receiver: Box<Expression>,
    pub args: Vec<Expression>,
}

/// An empty expression that will be stripped before emission.
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyExpr {
    pub source_span: Option<ParseSourceSpan>,
}

/// One case of a conditional. `expr` is `None` for a default (`@else`) case.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalCaseExpr {
    pub expr: Option<Box<Expression>>,
    pub target: XrefId,
    pub target_slot: SlotHandle,
    pub alias: Option<String>,
}

/// Reads a `@let` declaration from the context of the view that declares it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextLetReferenceExpr {
    pub target: XrefId,
    pub target_slot: SlotHandle,
}

impl LexicalReadExpr {
    pub fn new(name: impl Into<String>, source_span: Option<ParseSourceSpan>) -> Self {
        LexicalReadExpr {
            name: name.into(),
            source_span,
        }
    }
}

impl ConditionalCaseExpr {
    pub fn new(expr: Option<Expression>, target: XrefId, alias: Option<String>) -> Self {
        ConditionalCaseExpr {
            expr: expr.map(Box::new),
            target,
            target_slot: SlotHandle::new(),
            alias,
        }
    }
}

fn transform_boxed(
    expr: Box<Expression>,
    transform: &mut ExpressionTransform<'_>,
    flags: VisitorContextFlag,
) -> Box<Expression> {
    Box::new(transform_expressions_in_expression(*expr, transform, flags))
}

fn transform_all(
    exprs: Vec<Expression>,
    transform: &mut ExpressionTransform<'_>,
    flags: VisitorContextFlag,
) -> Vec<Expression> {
    exprs
        .into_iter()
        .map(|expr| transform_expressions_in_expression(expr, transform, flags))
        .collect()
}

/// Rewrites `expr` bottom-up: children are transformed first, then `transform` is applied to the
/// rebuilt node itself.
pub fn transform_expressions_in_expression(
    expr: Expression,
    transform: &mut ExpressionTransform<'_>,
    flags: VisitorContextFlag,
) -> Expression {
    let expr = match expr {
        Expression::InvokeFn(mut e) => {
            e.fn_ = transform_boxed(e.fn_, transform, flags);
            e.args = transform_all(e.args, transform, flags);
            Expression::InvokeFn(e)
        }
        Expression::Conditional(mut e) => {
            e.condition = transform_boxed(e.condition, transform, flags);
            e.true_case = transform_boxed(e.true_case, transform, flags);
            e.false_case = e
                .false_case
                .map(|false_case| transform_boxed(false_case, transform, flags));
            Expression::Conditional(e)
        }
        Expression::NotExpr(mut e) => {
            e.condition = transform_boxed(e.condition, transform, flags);
            Expression::NotExpr(e)
        }
        Expression::BinaryOp(mut e) => {
            e.lhs = transform_boxed(e.lhs, transform, flags);
            e.rhs = transform_boxed(e.rhs, transform, flags);
            Expression::BinaryOp(e)
        }
        Expression::ReadProp(mut e) => {
            e.receiver = transform_boxed(e.receiver, transform, flags);
            Expression::ReadProp(e)
        }
        Expression::ReadKey(mut e) => {
            e.receiver = transform_boxed(e.receiver, transform, flags);
            e.index = transform_boxed(e.index, transform, flags);
            Expression::ReadKey(e)
        }
        Expression::LiteralArray(mut e) => {
            e.entries = transform_all(e.entries, transform, flags);
            Expression::LiteralArray(e)
        }
        Expression::LiteralMap(mut e) => {
            for entry in &mut e.entries {
                let value = std::mem::take(&mut *entry.value);
                *entry.value = transform_expressions_in_expression(value, transform, flags);
            }
            Expression::LiteralMap(e)
        }
        Expression::TypeOf(mut e) => {
            e.expr = transform_boxed(e.expr, transform, flags);
            Expression::TypeOf(e)
        }
        Expression::Void(mut e) => {
            e.expr = transform_boxed(e.expr, transform, flags);
            Expression::Void(e)
        }
        Expression::Unary(mut e) => {
            e.expr = transform_boxed(e.expr, transform, flags);
            Expression::Unary(e)
        }
        Expression::RestoreView(mut e) => {
            e.view = match e.view {
                EitherXrefIdOrExpression::Expression(view) => {
                    EitherXrefIdOrExpression::Expression(transform_boxed(view, transform, flags))
                }
                xref => xref,
            };
            Expression::RestoreView(e)
        }
        Expression::ResetView(mut e) => {
            e.expr = transform_boxed(e.expr, transform, flags);
            Expression::ResetView(e)
        }
        Expression::PipeBinding(mut e) => {
            e.args = transform_all(e.args, transform, flags);
            Expression::PipeBinding(e)
        }
        Expression::SafePropertyRead(mut e) => {
            e.receiver = transform_boxed(e.receiver, transform, flags);
            Expression::SafePropertyRead(e)
        }
        Expression::SafeKeyedRead(mut e) => {
            e.receiver = transform_boxed(e.receiver, transform, flags);
            e.index = transform_boxed(e.index, transform, flags);
            Expression::SafeKeyedRead(e)
        }
        Expression::SafeInvokeFunction(mut e) => {
            e.receiver = transform_boxed(e.receiver, transform, flags);
            e.args = transform_all(e.args, transform, flags);
            Expression::SafeInvokeFunction(e)
        }
        Expression::ConditionalCase(mut e) => {
            e.expr = e.expr.map(|expr| transform_boxed(expr, transform, flags));
            Expression::ConditionalCase(e)
        }
        leaf @ (Expression::ReadVar(_)
        | Expression::Literal(_)
        | Expression::External(_)
        | Expression::LexicalRead(_)
        | Expression::Reference(_)
        | Expression::Context(_)
        | Expression::TrackContext(_)
        | Expression::NextContext(_)
        | Expression::GetCurrentView(_)
        | Expression::ReadVariable(_)
        | Expression::Empty(_)
        | Expression::ContextLetReference(_)) => leaf,
    };
    transform(expr, flags)
}

/// Rewrites `slot` in place.
pub fn transform_expression_in_place(
    slot: &mut Expression,
    transform: &mut ExpressionTransform<'_>,
    flags: VisitorContextFlag,
) {
    let expr = std::mem::take(slot);
    *slot = transform_expressions_in_expression(expr, transform, flags);
}

pub fn transform_expressions_in_statement(
    stmt: &mut Statement,
    transform: &mut ExpressionTransform<'_>,
    flags: VisitorContextFlag,
) {
    match stmt {
        Statement::Expression(s) => transform_expression_in_place(&mut s.expr, transform, flags),
        Statement::Return(s) => transform_expression_in_place(&mut s.value, transform, flags),
        Statement::DeclareVar(s) => {
            if let Some(value) = s.value.as_mut() {
                transform_expression_in_place(value, transform, flags);
            }
        }
        Statement::IfStmt(s) => {
            transform_expression_in_place(&mut s.condition, transform, flags);
            for case in s.true_case.iter_mut().chain(s.false_case.iter_mut()) {
                transform_expressions_in_statement(case, transform, flags);
            }
        }
    }
}

pub fn transform_expressions_in_op<T: Op>(
    op: &mut T,
    transform: &mut ExpressionTransform<'_>,
    flags: VisitorContextFlag,
) {
    op.transform_expressions(transform, flags);
}

/// Calls `visitor` on every expression in `op`, including ops nested inside it.
pub fn visit_expressions_in_op<T: Op>(
    op: &mut T,
    visitor: &mut dyn FnMut(&Expression, VisitorContextFlag),
) {
    op.transform_expressions(
        &mut |expr, flags| {
            visitor(&expr, flags);
            expr
        },
        VisitorContextFlag::NONE,
    );
}
