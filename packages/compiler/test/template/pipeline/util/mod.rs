//! Template AST builders for pipeline tests
//!
//! The parser that produces render3 nodes lives outside this crate, so tests assemble the AST by
//! hand.

#![allow(dead_code)]

use angular_template_pipeline::core::SecurityContext;
use angular_template_pipeline::expression_parser::ast::{
    ASTWithSource, BindingType, ParsedEventType, AST,
};
use angular_template_pipeline::i18n::i18n_ast::{self as i18n, I18nMeta, Message};
use angular_template_pipeline::parse_util::{ParseSourceFile, ParseSourceSpan};
use angular_template_pipeline::render3::r3_ast as t;
use tracing_subscriber::EnvFilter;

/// Routes pipeline logs to the test output. Set `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn span() -> ParseSourceSpan {
    let file = ParseSourceFile::new("<div></div>".to_string(), "test.html".to_string());
    ParseSourceSpan::from_offsets(&file, 0, 5)
}

pub fn block() -> t::BlockNode {
    t::BlockNode {
        source_span: span(),
        start_source_span: span(),
        end_source_span: None,
    }
}

pub fn element(name: &str, children: Vec<t::R3Node>) -> t::Element {
    t::Element {
        name: name.to_string(),
        attributes: vec![],
        inputs: vec![],
        outputs: vec![],
        children,
        references: vec![],
        source_span: span(),
        start_source_span: span(),
        end_source_span: Some(span()),
        i18n: None,
    }
}

pub fn text_attribute(name: &str, value: &str) -> t::TextAttribute {
    t::TextAttribute {
        name: name.to_string(),
        value: value.to_string(),
        source_span: span(),
        i18n: None,
    }
}

pub fn input(name: &str, type_: BindingType, value: AST) -> t::BoundAttribute {
    t::BoundAttribute {
        name: name.to_string(),
        type_,
        security_context: SecurityContext::NONE,
        value: ASTWithSource::new(value, None),
        unit: None,
        source_span: span(),
        i18n: None,
    }
}

pub fn output(name: &str, handler: AST) -> t::BoundEvent {
    t::BoundEvent {
        name: name.to_string(),
        type_: ParsedEventType::Regular,
        handler: ASTWithSource::new(handler, None),
        target: None,
        phase: None,
        source_span: span(),
        handler_span: span(),
    }
}

pub fn reference(name: &str) -> t::Reference {
    t::Reference {
        name: name.to_string(),
        value: String::new(),
        source_span: span(),
    }
}

pub fn variable(name: &str, value: &str) -> t::Variable {
    t::Variable {
        name: name.to_string(),
        value: value.to_string(),
        source_span: span(),
    }
}

pub fn if_branch(expression: Option<AST>, children: Vec<t::R3Node>) -> t::IfBlockBranch {
    t::IfBlockBranch {
        expression,
        children,
        expression_alias: None,
        block: block(),
        i18n: None,
    }
}

pub fn if_block(branches: Vec<t::IfBlockBranch>) -> t::R3Node {
    t::R3Node::IfBlock(t::IfBlock {
        branches,
        block: block(),
    })
}

/// `@for (<item> of items; track <track>)` with `$index` in scope.
pub fn for_block(item: &str, track: AST, children: Vec<t::R3Node>) -> t::R3Node {
    t::R3Node::ForLoopBlock(t::ForLoopBlock {
        item: variable(item, "$implicit"),
        expression: ASTWithSource::new(AST::read("items"), None),
        track_by: ASTWithSource::new(track, None),
        context_variables: vec![variable("$index", "$index")],
        children,
        empty: None,
        block: block(),
        main_block_span: span(),
        i18n: None,
    })
}

pub fn text(value: &str) -> t::R3Node {
    t::R3Node::Text(t::Text {
        value: value.to_string(),
        source_span: span(),
    })
}

pub fn message(id: &str) -> Message {
    let mut message = Message::new(vec![], String::new(), String::new(), String::new());
    message.id = id.to_string();
    message
}

/// A message whose only content is the ICU placeholder `name`.
pub fn icu_message(id: &str, name: &str) -> Message {
    let icu = i18n::Icu {
        expression: "count".to_string(),
        type_: "plural".to_string(),
        cases: Default::default(),
        source_span: span(),
        expression_placeholder: Some("VAR_PLURAL".to_string()),
    };
    let mut message = message(id);
    message.nodes = vec![i18n::Node::IcuPlaceholder(i18n::IcuPlaceholder {
        value: icu,
        name: name.to_string(),
        source_span: span(),
    })];
    message
}

/// `{count, plural, ...}` with one bound var and the given static text placeholders.
pub fn icu(message: Message, placeholders: &[(&str, &str)]) -> t::R3Node {
    let var = t::BoundText {
        value: ASTWithSource::new(AST::interpolation(&["", ""], vec![AST::read("count")]), None),
        source_span: span(),
        i18n: None,
    };
    t::R3Node::Icu(t::Icu {
        vars: [("VAR_PLURAL".to_string(), var)].into_iter().collect(),
        placeholders: placeholders
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    t::IcuPlaceholder::Text(t::Text {
                        value: value.to_string(),
                        source_span: span(),
                    }),
                )
            })
            .collect(),
        source_span: span(),
        i18n: Some(I18nMeta::Message(message)),
    })
}

pub fn block_placeholder(name: &str) -> I18nMeta {
    I18nMeta::Node(i18n::Node::BlockPlaceholder(i18n::BlockPlaceholder {
        name: name.to_string(),
        parameters: vec![],
        start_name: format!("START_BLOCK_{name}"),
        close_name: format!("CLOSE_BLOCK_{name}"),
        children: vec![],
        source_span: span(),
    }))
}
