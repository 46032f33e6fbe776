//! Angular Expression AST
//!
//! Expression trees produced by the binding parser and consumed read-only by ingestion.

use crate::parse_util::ParseSourceSpan;
use serde::{Deserialize, Serialize};

/// Span relative to the start of the expression source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseSpan {
    pub start: usize,
    pub end: usize,
}

impl ParseSpan {
    pub fn new(start: usize, end: usize) -> Self {
        ParseSpan { start, end }
    }

    pub fn to_absolute(&self, absolute_offset: usize) -> AbsoluteSourceSpan {
        AbsoluteSourceSpan::new(absolute_offset + self.start, absolute_offset + self.end)
    }
}

/// Absolute source span for mapping back to source
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteSourceSpan {
    pub start: usize,
    pub end: usize,
}

impl AbsoluteSourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        AbsoluteSourceSpan { start, end }
    }
}

/// Main AST enum containing all node types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AST {
    EmptyExpr(EmptyExpr),
    ImplicitReceiver(ImplicitReceiver),
    ThisReceiver(ThisReceiver),
    Chain(Chain),
    Conditional(Conditional),
    PropertyRead(PropertyRead),
    SafePropertyRead(SafePropertyRead),
    KeyedRead(KeyedRead),
    SafeKeyedRead(SafeKeyedRead),
    BindingPipe(BindingPipe),
    LiteralPrimitive(LiteralPrimitive),
    LiteralArray(LiteralArray),
    LiteralMap(LiteralMap),
    Interpolation(Interpolation),
    Binary(Binary),
    PrefixNot(PrefixNot),
    Unary(Unary),
    TypeofExpression(TypeofExpression),
    VoidExpression(VoidExpression),
    NonNullAssert(NonNullAssert),
    Call(Call),
    SafeCall(SafeCall),
    ParenthesizedExpression(ParenthesizedExpression),
}

impl AST {
    pub fn span(&self) -> ParseSpan {
        match self {
            AST::EmptyExpr(e) => e.span,
            AST::ImplicitReceiver(e) => e.span,
            AST::ThisReceiver(e) => e.span,
            AST::Chain(e) => e.span,
            AST::Conditional(e) => e.span,
            AST::PropertyRead(e) => e.span,
            AST::SafePropertyRead(e) => e.span,
            AST::KeyedRead(e) => e.span,
            AST::SafeKeyedRead(e) => e.span,
            AST::BindingPipe(e) => e.span,
            AST::LiteralPrimitive(e) => e.span,
            AST::LiteralArray(e) => e.span,
            AST::LiteralMap(e) => e.span,
            AST::Interpolation(e) => e.span,
            AST::Binary(e) => e.span,
            AST::PrefixNot(e) => e.span,
            AST::Unary(e) => e.span,
            AST::TypeofExpression(e) => e.span,
            AST::VoidExpression(e) => e.span,
            AST::NonNullAssert(e) => e.span,
            AST::Call(e) => e.span,
            AST::SafeCall(e) => e.span,
            AST::ParenthesizedExpression(e) => e.span,
        }
    }

    /// Name of the node type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            AST::EmptyExpr(_) => "EmptyExpr",
            AST::ImplicitReceiver(_) => "ImplicitReceiver",
            AST::ThisReceiver(_) => "ThisReceiver",
            AST::Chain(_) => "Chain",
            AST::Conditional(_) => "Conditional",
            AST::PropertyRead(_) => "PropertyRead",
            AST::SafePropertyRead(_) => "SafePropertyRead",
            AST::KeyedRead(_) => "KeyedRead",
            AST::SafeKeyedRead(_) => "SafeKeyedRead",
            AST::BindingPipe(_) => "BindingPipe",
            AST::LiteralPrimitive(_) => "LiteralPrimitive",
            AST::LiteralArray(_) => "LiteralArray",
            AST::LiteralMap(_) => "LiteralMap",
            AST::Interpolation(_) => "Interpolation",
            AST::Binary(_) => "Binary",
            AST::PrefixNot(_) => "PrefixNot",
            AST::Unary(_) => "Unary",
            AST::TypeofExpression(_) => "TypeofExpression",
            AST::VoidExpression(_) => "VoidExpression",
            AST::NonNullAssert(_) => "NonNullAssert",
            AST::Call(_) => "Call",
            AST::SafeCall(_) => "SafeCall",
            AST::ParenthesizedExpression(_) => "ParenthesizedExpression",
        }
    }

    // Helper constructors. Nodes get empty spans, which is what hand-assembled trees need.

    pub fn implicit_receiver() -> AST {
        AST::ImplicitReceiver(ImplicitReceiver::default())
    }

    pub fn this_receiver() -> AST {
        AST::ThisReceiver(ThisReceiver::default())
    }

    pub fn empty() -> AST {
        AST::EmptyExpr(EmptyExpr::default())
    }

    /// `name` read from the implicit receiver, e.g. `isOn`.
    pub fn read(name: &str) -> AST {
        AST::prop(AST::implicit_receiver(), name)
    }

    pub fn prop(receiver: AST, name: &str) -> AST {
        AST::PropertyRead(PropertyRead {
            span: ParseSpan::default(),
            source_span: AbsoluteSourceSpan::default(),
            name_span: AbsoluteSourceSpan::default(),
            receiver: Box::new(receiver),
            name: name.to_string(),
        })
    }

    pub fn call(receiver: AST, args: Vec<AST>) -> AST {
        AST::Call(Call {
            span: ParseSpan::default(),
            source_span: AbsoluteSourceSpan::default(),
            receiver: Box::new(receiver),
            args: args.into_iter().map(Box::new).collect(),
            argument_span: AbsoluteSourceSpan::default(),
            has_trailing_comma: false,
        })
    }

    pub fn string(value: &str) -> AST {
        AST::LiteralPrimitive(LiteralPrimitive {
            span: ParseSpan::default(),
            source_span: AbsoluteSourceSpan::default(),
            value: LiteralValue::String(value.to_string()),
        })
    }

    pub fn number(value: f64) -> AST {
        AST::LiteralPrimitive(LiteralPrimitive {
            span: ParseSpan::default(),
            source_span: AbsoluteSourceSpan::default(),
            value: LiteralValue::Number(value),
        })
    }

    pub fn binary(operation: &str, left: AST, right: AST) -> AST {
        AST::Binary(Binary {
            span: ParseSpan::default(),
            source_span: AbsoluteSourceSpan::default(),
            operation: operation.to_string(),
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn chain(expressions: Vec<AST>) -> AST {
        AST::Chain(Chain {
            span: ParseSpan::default(),
            source_span: AbsoluteSourceSpan::default(),
            expressions: expressions.into_iter().map(Box::new).collect(),
        })
    }

    pub fn pipe(exp: AST, name: &str, args: Vec<AST>) -> AST {
        AST::BindingPipe(BindingPipe {
            span: ParseSpan::default(),
            source_span: AbsoluteSourceSpan::default(),
            name_span: AbsoluteSourceSpan::default(),
            exp: Box::new(exp),
            name: name.to_string(),
            args: args.into_iter().map(Box::new).collect(),
            pipe_type: BindingPipeType::ReferencedByName,
        })
    }

    /// `strings[0] {{expressions[0]}} strings[1] ...`
    pub fn interpolation(strings: &[&str], expressions: Vec<AST>) -> AST {
        AST::Interpolation(Interpolation {
            span: ParseSpan::default(),
            source_span: AbsoluteSourceSpan::default(),
            strings: strings.iter().map(|s| s.to_string()).collect(),
            expressions: expressions.into_iter().map(Box::new).collect(),
        })
    }
}

/// Empty expression
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmptyExpr {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
}

/// Implicit receiver (the component instance)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImplicitReceiver {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
}

/// This receiver (explicit `this`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThisReceiver {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
}

/// Chain of expressions (e.g., `a; b; c`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expressions: Vec<Box<AST>>,
}

/// Ternary conditional (e.g., `condition ? true : false`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub condition: Box<AST>,
    pub true_exp: Box<AST>,
    pub false_exp: Box<AST>,
}

/// Property read (e.g., `obj.property`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub name: String,
}

/// Safe property read (e.g., `obj?.property`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafePropertyRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub name: String,
}

/// Keyed read (e.g., `obj[key]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
}

/// Safe keyed read (e.g., `obj?.[key]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeKeyedRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
}

/// Pipe types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingPipeType {
    /// Referenced by name: `{{value | pipeName}}`
    ReferencedByName,
    /// Referenced directly: `{{value | PipeClass}}`
    ReferencedDirectly,
}

/// Pipe binding (e.g., `value | pipeName:arg1:arg2`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingPipe {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub exp: Box<AST>,
    pub name: String,
    pub args: Vec<Box<AST>>,
    pub pipe_type: BindingPipeType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "literalType", content = "value")]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
}

/// Literal primitive (string, number, boolean, null, undefined)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralPrimitive {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub value: LiteralValue,
}

/// Array literal (e.g., `[1, 2, 3]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralArray {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expressions: Vec<Box<AST>>,
}

/// Map literal key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralMapKey {
    pub key: String,
    pub quoted: bool,
}

/// Object literal (e.g., `{a: 1, b: 2}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralMap {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub keys: Vec<LiteralMapKey>,
    pub values: Vec<Box<AST>>,
}

/// Alternating literal strings and expressions; `strings.len() == expressions.len() + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolation {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub strings: Vec<String>,
    pub expressions: Vec<Box<AST>>,
}

/// Binary operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub operation: String,
    pub left: Box<AST>,
    pub right: Box<AST>,
}

/// Prefix not operator (e.g., `!expr`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixNot {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

/// Unary operator (e.g., `+expr`, `-expr`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unary {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub operator: String,
    pub expr: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeofExpression {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoidExpression {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

/// Function call (e.g., `fn(a, b)`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub args: Vec<Box<AST>>,
    pub argument_span: AbsoluteSourceSpan,
    pub has_trailing_comma: bool,
}

/// Safe function call (e.g., `fn?.(a, b)`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeCall {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub args: Vec<Box<AST>>,
    pub argument_span: AbsoluteSourceSpan,
    pub has_trailing_comma: bool,
}

/// Non-null assertion (e.g., `expr!`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonNullAssert {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParenthesizedExpression {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

/// An expression together with the source text it was parsed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ASTWithSource {
    pub ast: Box<AST>,
    pub source: Option<String>,
    pub location: String,
    pub absolute_offset: usize,
}

impl ASTWithSource {
    pub fn new(ast: AST, source: Option<String>) -> Self {
        ASTWithSource {
            ast: Box::new(ast),
            source,
            location: String::new(),
            absolute_offset: 0,
        }
    }
}

/// Binding types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingType {
    /// `[prop]="value"`
    Property,
    /// `[attr.name]="value"`
    Attribute,
    /// `[class.name]="condition"`
    Class,
    /// `[style.name]="value"`
    Style,
    /// `[@trigger]="state"`
    Animation,
    /// `[(prop)]="value"`
    TwoWay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsedEventType {
    /// DOM or directive event
    Regular,
    /// Animation specific event
    Animation,
    /// Event side of a two-way binding
    TwoWay,
}

/// Host property binding, as declared in a component's `host` metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedProperty {
    pub name: String,
    pub expression: ASTWithSource,
    pub is_animation: bool,
    pub source_span: ParseSourceSpan,
}

/// Host event binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEvent {
    pub name: String,
    pub target_or_phase: Option<String>,
    pub event_type: ParsedEventType,
    pub handler: ASTWithSource,
    pub source_span: ParseSourceSpan,
    pub handler_span: ParseSourceSpan,
}
