//! Render3 AST
//!
//! Template node definitions. Ingestion walks these read-only; the parser that produces them
//! lives outside this crate, so every node is serde-serializable for hand-off.

use crate::core::SecurityContext;
use crate::expression_parser::ast::{ASTWithSource, BindingType, ParsedEventType, AST};
use crate::i18n::i18n_ast::I18nMeta;
use crate::parse_util::ParseSourceSpan;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Comment node - wrapper for raw html.Comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

/// Text node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

/// Bound text node (interpolation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundText {
    pub value: ASTWithSource,
    pub source_span: ParseSourceSpan,
    pub i18n: Option<I18nMeta>,
}

/// Text attribute in the template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAttribute {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
    pub i18n: Option<I18nMeta>,
}

/// Bound attribute node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundAttribute {
    pub name: String,
    pub type_: BindingType,
    pub security_context: SecurityContext,
    pub value: ASTWithSource,
    pub unit: Option<String>,
    pub source_span: ParseSourceSpan,
    pub i18n: Option<I18nMeta>,
}

/// Bound event node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundEvent {
    pub name: String,
    pub type_: ParsedEventType,
    pub handler: ASTWithSource,
    pub target: Option<String>,
    pub phase: Option<String>,
    pub source_span: ParseSourceSpan,
    pub handler_span: ParseSourceSpan,
}

/// Element node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<TextAttribute>,
    pub inputs: Vec<BoundAttribute>,
    pub outputs: Vec<BoundEvent>,
    pub children: Vec<R3Node>,
    pub references: Vec<Reference>,
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
    pub end_source_span: Option<ParseSourceSpan>,
    pub i18n: Option<I18nMeta>,
}

/// Template attribute (either bound or text)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateAttr {
    Bound(BoundAttribute),
    Text(TextAttribute),
}

/// Template node: an explicit `<ng-template>` or the template a structural directive
/// (`*ngIf`) desugars into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub tag_name: Option<String>,
    pub attributes: Vec<TextAttribute>,
    pub inputs: Vec<BoundAttribute>,
    pub outputs: Vec<BoundEvent>,
    pub template_attrs: Vec<TemplateAttr>,
    pub children: Vec<R3Node>,
    pub references: Vec<Reference>,
    pub variables: Vec<Variable>,
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
    pub end_source_span: Option<ParseSourceSpan>,
    pub i18n: Option<I18nMeta>,
}

/// Content node (ng-content)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub selector: String,
    pub attributes: Vec<TextAttribute>,
    pub children: Vec<R3Node>,
    pub source_span: ParseSourceSpan,
    pub i18n: Option<I18nMeta>,
}

/// Variable node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
}

/// Reference node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
}

/// Source locations shared by every `@block`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
    pub end_source_span: Option<ParseSourceSpan>,
}

/// If block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfBlock {
    pub branches: Vec<IfBlockBranch>,
    pub block: BlockNode,
}

/// If block branch. `expression` is `None` for `@else`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfBlockBranch {
    pub expression: Option<AST>,
    pub children: Vec<R3Node>,
    pub expression_alias: Option<Variable>,
    pub block: BlockNode,
    pub i18n: Option<I18nMeta>,
}

/// Switch block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchBlock {
    pub expression: AST,
    pub cases: Vec<SwitchBlockCase>,
    pub block: BlockNode,
}

/// Switch block case. `expression` is `None` for `@default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchBlockCase {
    pub expression: Option<AST>,
    pub children: Vec<R3Node>,
    pub block: BlockNode,
    pub i18n: Option<I18nMeta>,
}

/// For loop block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForLoopBlock {
    pub item: Variable,
    pub expression: ASTWithSource,
    pub track_by: ASTWithSource,
    pub context_variables: Vec<Variable>,
    pub children: Vec<R3Node>,
    pub empty: Option<Box<ForLoopBlockEmpty>>,
    pub block: BlockNode,
    pub main_block_span: ParseSourceSpan,
    pub i18n: Option<I18nMeta>,
}

/// For loop block empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForLoopBlockEmpty {
    pub children: Vec<R3Node>,
    pub block: BlockNode,
    pub i18n: Option<I18nMeta>,
}

/// Deferred trigger types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeferredTrigger {
    Bound { value: AST, source_span: ParseSourceSpan },
    Never { source_span: ParseSourceSpan },
    Idle { source_span: ParseSourceSpan },
    Immediate { source_span: ParseSourceSpan },
    Hover { reference: Option<String>, source_span: ParseSourceSpan },
    Timer { delay: i64, source_span: ParseSourceSpan },
    Interaction { reference: Option<String>, source_span: ParseSourceSpan },
    Viewport { reference: Option<String>, source_span: ParseSourceSpan },
}

/// Deferred block triggers collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeferredBlockTriggers {
    pub when: Option<DeferredTrigger>,
    pub idle: Option<DeferredTrigger>,
    pub immediate: Option<DeferredTrigger>,
    pub hover: Option<DeferredTrigger>,
    pub timer: Option<DeferredTrigger>,
    pub interaction: Option<DeferredTrigger>,
    pub viewport: Option<DeferredTrigger>,
    pub never: Option<DeferredTrigger>,
}

impl DeferredBlockTriggers {
    /// The `on` triggers in declaration-independent, fixed order.
    pub fn on_triggers(&self) -> impl Iterator<Item = &DeferredTrigger> {
        [
            &self.idle,
            &self.immediate,
            &self.timer,
            &self.hover,
            &self.interaction,
            &self.viewport,
            &self.never,
        ]
        .into_iter()
        .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.when.is_none() && self.on_triggers().next().is_none()
    }
}

/// Deferred block placeholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredBlockPlaceholder {
    pub children: Vec<R3Node>,
    pub minimum_time: Option<i64>,
    pub block: BlockNode,
    pub i18n: Option<I18nMeta>,
}

/// Deferred block loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredBlockLoading {
    pub children: Vec<R3Node>,
    pub after_time: Option<i64>,
    pub minimum_time: Option<i64>,
    pub block: BlockNode,
    pub i18n: Option<I18nMeta>,
}

/// Deferred block error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredBlockError {
    pub children: Vec<R3Node>,
    pub block: BlockNode,
    pub i18n: Option<I18nMeta>,
}

/// Deferred block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredBlock {
    pub children: Vec<R3Node>,
    pub triggers: DeferredBlockTriggers,
    pub prefetch_triggers: DeferredBlockTriggers,
    pub hydrate_triggers: DeferredBlockTriggers,
    pub placeholder: Option<Box<DeferredBlockPlaceholder>>,
    pub loading: Option<Box<DeferredBlockLoading>>,
    pub error: Option<Box<DeferredBlockError>>,
    pub block: BlockNode,
    pub main_block_span: ParseSourceSpan,
    pub i18n: Option<I18nMeta>,
}

/// Unknown block (kept by the parser for autocompletion)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownBlock {
    pub name: String,
    pub source_span: ParseSourceSpan,
}

/// Let declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetDeclaration {
    pub name: String,
    pub value: AST,
    pub source_span: ParseSourceSpan,
    pub value_span: ParseSourceSpan,
}

/// ICU node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icu {
    pub vars: IndexMap<String, BoundText>,
    pub placeholders: IndexMap<String, IcuPlaceholder>,
    pub source_span: ParseSourceSpan,
    pub i18n: Option<I18nMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IcuPlaceholder {
    Text(Text),
    BoundText(BoundText),
}

/// Enum for all R3 node types that can appear as template children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node")]
pub enum R3Node {
    Comment(Comment),
    Text(Text),
    BoundText(BoundText),
    Element(Element),
    Template(Template),
    Content(Content),
    IfBlock(IfBlock),
    SwitchBlock(SwitchBlock),
    ForLoopBlock(ForLoopBlock),
    DeferredBlock(DeferredBlock),
    Icu(Icu),
    LetDeclaration(LetDeclaration),
    UnknownBlock(UnknownBlock),
}

impl R3Node {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            R3Node::Comment(n) => &n.source_span,
            R3Node::Text(n) => &n.source_span,
            R3Node::BoundText(n) => &n.source_span,
            R3Node::Element(n) => &n.source_span,
            R3Node::Template(n) => &n.source_span,
            R3Node::Content(n) => &n.source_span,
            R3Node::IfBlock(n) => &n.block.source_span,
            R3Node::SwitchBlock(n) => &n.block.source_span,
            R3Node::ForLoopBlock(n) => &n.block.source_span,
            R3Node::DeferredBlock(n) => &n.block.source_span,
            R3Node::Icu(n) => &n.source_span,
            R3Node::LetDeclaration(n) => &n.source_span,
            R3Node::UnknownBlock(n) => &n.source_span,
        }
    }

    /// Name of the concrete node type, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            R3Node::Comment(_) => "Comment",
            R3Node::Text(_) => "Text",
            R3Node::BoundText(_) => "BoundText",
            R3Node::Element(_) => "Element",
            R3Node::Template(_) => "Template",
            R3Node::Content(_) => "Content",
            R3Node::IfBlock(_) => "IfBlock",
            R3Node::SwitchBlock(_) => "SwitchBlock",
            R3Node::ForLoopBlock(_) => "ForLoopBlock",
            R3Node::DeferredBlock(_) => "DeferredBlock",
            R3Node::Icu(_) => "Icu",
            R3Node::LetDeclaration(_) => "LetDeclaration",
            R3Node::UnknownBlock(_) => "UnknownBlock",
        }
    }
}
