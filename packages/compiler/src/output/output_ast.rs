//! Output AST
//!
//! Expressions and statements the pipeline manipulates. Template-specific IR expressions
//! (`LexicalRead`, `NextContext`, ...) live in the same enum so a single tree can mix both
//! until later phases lower the IR forms away.

use crate::parse_util::ParseSourceSpan;
use crate::template::pipeline::ir::expression::{
    ConditionalCaseExpr, ContextExpr, ContextLetReferenceExpr, EmptyExpr, GetCurrentViewExpr,
    LexicalReadExpr, NextContextExpr, PipeBindingExpr, ReadVariableExpr, ReferenceExpr,
    ResetViewExpr, RestoreViewExpr, SafeInvokeFunctionExpr, SafeKeyedReadExpr,
    SafePropertyReadExpr, TrackContextExpr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Equals,
    NotEquals,
    Assign,
    Identical,
    NotIdentical,
    Minus,
    Plus,
    Divide,
    Multiply,
    Modulo,
    And,
    Or,
    BitwiseOr,
    BitwiseAnd,
    Lower,
    LowerEquals,
    Bigger,
    BiggerEquals,
    NullishCoalesce,
    Exponentiation,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Minus,
    Plus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
}

/// A symbol imported from a runtime module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalReference {
    pub module_name: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    ReadVar(ReadVarExpr),
    InvokeFn(InvokeFunctionExpr),
    Literal(LiteralExpr),
    External(ExternalExpr),
    Conditional(ConditionalExpr),
    NotExpr(NotExpr),
    BinaryOp(BinaryOperatorExpr),
    ReadProp(ReadPropExpr),
    ReadKey(ReadKeyExpr),
    LiteralArray(LiteralArrayExpr),
    LiteralMap(LiteralMapExpr),
    TypeOf(TypeofExpr),
    Void(VoidExpr),
    Unary(UnaryOperatorExpr),

    // IR Expression variants
    LexicalRead(LexicalReadExpr),
    Reference(ReferenceExpr),
    Context(ContextExpr),
    TrackContext(TrackContextExpr),
    NextContext(NextContextExpr),
    GetCurrentView(GetCurrentViewExpr),
    RestoreView(RestoreViewExpr),
    ResetView(ResetViewExpr),
    ReadVariable(ReadVariableExpr),
    PipeBinding(PipeBindingExpr),
    SafePropertyRead(SafePropertyReadExpr),
    SafeKeyedRead(SafeKeyedReadExpr),
    SafeInvokeFunction(SafeInvokeFunctionExpr),
    Empty(EmptyExpr),
    ConditionalCase(ConditionalCaseExpr),
    ContextLetReference(ContextLetReferenceExpr),
}

impl Default for Expression {
    /// Placeholder used while a subtree is temporarily moved out for rewriting.
    fn default() -> Self {
        Expression::Empty(EmptyExpr { source_span: None })
    }
}

impl Expression {
    pub fn source_span(&self) -> Option<&ParseSourceSpan> {
        match self {
            Expression::ReadVar(e) => e.source_span.as_ref(),
            Expression::InvokeFn(e) => e.source_span.as_ref(),
            Expression::Literal(e) => e.source_span.as_ref(),
            Expression::External(e) => e.source_span.as_ref(),
            Expression::Conditional(e) => e.source_span.as_ref(),
            Expression::NotExpr(e) => e.source_span.as_ref(),
            Expression::BinaryOp(e) => e.source_span.as_ref(),
            Expression::ReadProp(e) => e.source_span.as_ref(),
            Expression::ReadKey(e) => e.source_span.as_ref(),
            Expression::LiteralArray(e) => e.source_span.as_ref(),
            Expression::LiteralMap(e) => e.source_span.as_ref(),
            Expression::TypeOf(e) => e.source_span.as_ref(),
            Expression::Void(e) => e.source_span.as_ref(),
            Expression::Unary(e) => e.source_span.as_ref(),
            Expression::LexicalRead(e) => e.source_span.as_ref(),
            Expression::SafeKeyedRead(e) => e.source_span.as_ref(),
            Expression::Empty(e) => e.source_span.as_ref(),
            _ => None,
        }
    }

    /// True for the template-specific variants that must be lowered before emission.
    pub fn is_ir_expression(&self) -> bool {
        matches!(
            self,
            Expression::LexicalRead(_)
                | Expression::Reference(_)
                | Expression::Context(_)
                | Expression::TrackContext(_)
                | Expression::NextContext(_)
                | Expression::GetCurrentView(_)
                | Expression::RestoreView(_)
                | Expression::ResetView(_)
                | Expression::ReadVariable(_)
                | Expression::PipeBinding(_)
                | Expression::SafePropertyRead(_)
                | Expression::SafeKeyedRead(_)
                | Expression::SafeInvokeFunction(_)
                | Expression::Empty(_)
                | Expression::ConditionalCase(_)
                | Expression::ContextLetReference(_)
        )
    }

    pub fn prop(self, name: &str) -> Expression {
        Expression::ReadProp(ReadPropExpr {
            receiver: Box::new(self),
            name: name.to_string(),
            source_span: None,
        })
    }

    pub fn key(self, index: Expression) -> Expression {
        Expression::ReadKey(ReadKeyExpr {
            receiver: Box::new(self),
            index: Box::new(index),
            source_span: None,
        })
    }

    pub fn call_fn(self, args: Vec<Expression>) -> Expression {
        Expression::InvokeFn(InvokeFunctionExpr {
            fn_: Box::new(self),
            args,
            source_span: None,
            pure: false,
        })
    }

    pub fn binary(self, operator: BinaryOperator, rhs: Expression) -> Expression {
        Expression::BinaryOp(BinaryOperatorExpr {
            operator,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
            source_span: None,
        })
    }
}

pub fn variable(name: &str) -> Expression {
    Expression::ReadVar(ReadVarExpr {
        name: name.to_string(),
        source_span: None,
    })
}

pub fn literal(value: LiteralValue) -> Expression {
    Expression::Literal(LiteralExpr {
        value,
        source_span: None,
    })
}

pub fn import_expr(value: ExternalReference) -> Expression {
    Expression::External(ExternalExpr {
        value,
        source_span: None,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadVarExpr {
    pub name: String,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvokeFunctionExpr {
    pub fn_: Box<Expression>,
    pub args: Vec<Expression>,
    pub source_span: Option<ParseSourceSpan>,
    pub pure: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: LiteralValue,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalExpr {
    pub value: ExternalReference,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpr {
    pub condition: Box<Expression>,
    pub true_case: Box<Expression>,
    pub false_case: Option<Box<Expression>>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotExpr {
    pub condition: Box<Expression>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperatorExpr {
    pub operator: BinaryOperator,
    pub lhs: Box<Expression>,
    pub rhs: Box<Expression>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadPropExpr {
    pub receiver: Box<Expression>,
    pub name: String,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadKeyExpr {
    pub receiver: Box<Expression>,
    pub index: Box<Expression>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralArrayExpr {
    pub entries: Vec<Expression>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralMapEntry {
    pub key: String,
    pub value: Box<Expression>,
    pub quoted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralMapExpr {
    pub entries: Vec<LiteralMapEntry>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeofExpr {
    pub expr: Box<Expression>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoidExpr {
    pub expr: Box<Expression>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperatorExpr {
    pub operator: UnaryOperator,
    pub expr: Box<Expression>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    DeclareVar(DeclareVarStmt),
    Expression(ExpressionStatement),
    Return(ReturnStatement),
    IfStmt(IfStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclareVarStmt {
    pub name: String,
    pub value: Option<Box<Expression>>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expr: Box<Expression>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Box<Expression>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Box<Expression>,
    pub true_case: Vec<Statement>,
    pub false_case: Vec<Statement>,
    pub source_span: Option<ParseSourceSpan>,
}

impl Statement {
    pub fn expression(expr: Expression, source_span: Option<ParseSourceSpan>) -> Statement {
        Statement::Expression(ExpressionStatement {
            expr: Box::new(expr),
            source_span,
        })
    }

    pub fn returning(value: Expression, source_span: Option<ParseSourceSpan>) -> Statement {
        Statement::Return(ReturnStatement {
            value: Box::new(value),
            source_span,
        })
    }
}
