//! DOM Security Schema
//!
//! # Security Warning
//!
//! ```text
//! =================================================================================================
//!        DO NOT EDIT THIS LIST OF SECURITY SENSITIVE PROPERTIES WITHOUT A SECURITY REVIEW!
//! =================================================================================================
//! ```

use crate::core::SecurityContext;
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};

/// Map from tagName|propertyName to SecurityContext. Properties applying to all tags use '*'.
static SECURITY_SCHEMA: Lazy<HashMap<String, SecurityContext>> = Lazy::new(|| {
    let mut schema = HashMap::new();

    // Case is insignificant below, all element and attribute names are lower-cased for lookup.

    register_context(
        &mut schema,
        SecurityContext::HTML,
        &["iframe|srcdoc", "*|innerhtml", "*|outerhtml"],
    );

    register_context(&mut schema, SecurityContext::STYLE, &["*|style"]);

    // NB: no SCRIPT contexts here, they are never allowed due to the parser stripping them.

    register_context(
        &mut schema,
        SecurityContext::URL,
        &[
            "*|formaction",
            "area|href",
            "area|ping",
            "audio|src",
            "a|href",
            "a|ping",
            "blockquote|cite",
            "body|background",
            "del|cite",
            "form|action",
            "img|src",
            "input|src",
            "ins|cite",
            "q|cite",
            "source|src",
            "track|src",
            "video|poster",
            "video|src",
        ],
    );

    register_context(
        &mut schema,
        SecurityContext::ResourceUrl,
        &[
            "applet|code",
            "applet|codebase",
            "base|href",
            "embed|src",
            "frame|src",
            "head|profile",
            "html|manifest",
            "iframe|src",
            "link|href",
            "media|src",
            "object|codebase",
            "object|data",
            "script|src",
        ],
    );

    schema
});

/// Attribute names whose DOM property differs in spelling.
static ATTR_TO_PROP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("class", "className"),
        ("for", "htmlFor"),
        ("formaction", "formAction"),
        ("innerHtml", "innerHTML"),
        ("readonly", "readOnly"),
        ("tabindex", "tabIndex"),
    ])
});

fn register_context(
    schema: &mut HashMap<String, SecurityContext>,
    ctx: SecurityContext,
    specs: &[&str],
) {
    for spec in specs {
        schema.insert(spec.to_lowercase(), ctx);
    }
}

/// Security context of `prop_name` on `tag_name`. Attribute names are mapped to their
/// property spelling first so both forms classify the same way.
pub fn security_context(tag_name: &str, prop_name: &str, is_attribute: bool) -> SecurityContext {
    let prop_name = if is_attribute {
        ATTR_TO_PROP.get(prop_name).copied().unwrap_or(prop_name)
    } else {
        prop_name
    };
    let tag_name = tag_name.to_lowercase();
    let prop_name = prop_name.to_lowercase();

    SECURITY_SCHEMA
        .get(&format!("{}|{}", tag_name, prop_name))
        .or_else(|| SECURITY_SCHEMA.get(&format!("*|{}", prop_name)))
        .copied()
        .unwrap_or(SecurityContext::NONE)
}

/// Every context `prop_name` may have on an element matched by `selector`.
///
/// Selectors without an element name (`[attr]`, `.cls`) may match any element, so every
/// tag known to the schema is considered. The result is sorted and never empty.
pub fn calc_possible_security_contexts(
    selector: &str,
    prop_name: &str,
    is_attribute: bool,
) -> Vec<SecurityContext> {
    let mut contexts = BTreeSet::new();
    for part in selector.split(',') {
        let element: String = part
            .trim()
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '-')
            .collect();
        if element.is_empty() {
            for key in SECURITY_SCHEMA.keys() {
                if let Some((tag, _)) = key.split_once('|') {
                    contexts.insert(security_context(tag, prop_name, is_attribute));
                }
            }
        } else {
            contexts.insert(security_context(&element, prop_name, is_attribute));
        }
    }

    if contexts.is_empty() {
        vec![SecurityContext::NONE]
    } else {
        contexts.into_iter().collect()
    }
}
