//! I18n AST
//!
//! Messages extracted from `i18n` attributes and the placeholder nodes they contain.

use crate::parse_util::ParseSourceSpan;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A translatable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub nodes: Vec<Node>,
    pub meaning: String,
    pub description: String,
    pub custom_id: String,
    pub id: String,
    pub message_string: String,
}

impl Message {
    pub fn new(nodes: Vec<Node>, meaning: String, description: String, custom_id: String) -> Self {
        Message {
            nodes,
            meaning,
            description,
            custom_id,
            id: String::new(),
            message_string: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Node {
    Text(Text),
    Container(Container),
    Icu(Icu),
    TagPlaceholder(TagPlaceholder),
    Placeholder(Placeholder),
    IcuPlaceholder(IcuPlaceholder),
    BlockPlaceholder(BlockPlaceholder),
}

impl Node {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            Node::Text(n) => &n.source_span,
            Node::Container(n) => &n.source_span,
            Node::Icu(n) => &n.source_span,
            Node::TagPlaceholder(n) => &n.source_span,
            Node::Placeholder(n) => &n.source_span,
            Node::IcuPlaceholder(n) => &n.source_span,
            Node::BlockPlaceholder(n) => &n.source_span,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Text(_) => "Text",
            Node::Container(_) => "Container",
            Node::Icu(_) => "Icu",
            Node::TagPlaceholder(_) => "TagPlaceholder",
            Node::Placeholder(_) => "Placeholder",
            Node::IcuPlaceholder(_) => "IcuPlaceholder",
            Node::BlockPlaceholder(_) => "BlockPlaceholder",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub children: Vec<Node>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icu {
    pub expression: String,
    pub type_: String,
    pub cases: IndexMap<String, Node>,
    pub source_span: ParseSourceSpan,
    pub expression_placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagPlaceholder {
    pub tag: String,
    pub start_name: String,
    pub close_name: String,
    pub children: Vec<Node>,
    pub is_void: bool,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    pub value: String,
    pub name: String,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcuPlaceholder {
    pub value: Icu,
    pub name: String,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPlaceholder {
    pub name: String,
    pub parameters: Vec<String>,
    pub start_name: String,
    pub close_name: String,
    pub children: Vec<Node>,
    pub source_span: ParseSourceSpan,
}

/// The i18n metadata a template node may carry: either a whole message (the node is the root
/// of a translatable block) or a node inside an enclosing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metaKind", content = "value")]
pub enum I18nMeta {
    Message(Message),
    Node(Node),
}

impl I18nMeta {
    /// Name of the concrete metadata type, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            I18nMeta::Message(_) => "Message",
            I18nMeta::Node(node) => node.kind_name(),
        }
    }
}
