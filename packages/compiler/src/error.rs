//! Compile Errors
//!
//! Errors caused by the shape of the input. Corrupted IR is not an error value: `OpList` and the
//! phases panic on it.

use thiserror::Error;

use crate::parse_util::ParseSourceSpan;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("{location}: unsupported template node `{kind}`")]
    UnsupportedNode { kind: &'static str, location: String },

    #[error("{location}: unhandled i18n metadata type for {node}: expected {expected}, got {actual}")]
    UnexpectedI18nMeta {
        node: &'static str,
        expected: &'static str,
        actual: &'static str,
        location: String,
    },

    #[error("Expected {expected} placeholders to match interpolation expression count, but got {actual}")]
    PlaceholderCountMismatch { expected: usize, actual: usize },

    #[error("{location}: expected listener for `{event}` to have non-empty expression list")]
    EmptyHandler { event: String, location: String },

    #[error("{location}: unsupported expression `{kind}`: {reason}")]
    UnsupportedExpression {
        kind: &'static str,
        reason: &'static str,
        location: String,
    },

    #[error("{location}: expected an interpolation in {context}, got `{kind}`")]
    ExpectedInterpolation {
        context: &'static str,
        kind: &'static str,
        location: String,
    },

    #[error("{location}: unknown @for loop variable `{name}`")]
    UnknownLoopVariable { name: String, location: String },

    #[error("{location}: animation listener `{event}` should have a phase")]
    MissingAnimationPhase { event: String, location: String },

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid compiler options: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Phase `{phase}` must run after `{prerequisite}`")]
    PhaseOrder {
        phase: &'static str,
        prerequisite: &'static str,
    },

    #[error("Phase `{0}` is scheduled more than once")]
    DuplicatePhase(&'static str),
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// `url@line:col` of the start of `span`, for error messages.
pub fn location(span: Option<&ParseSourceSpan>) -> String {
    match span {
        Some(span) => span.start.to_string(),
        None => "<unknown>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_util::ParseSourceFile;

    #[test]
    fn errors_render_source_locations() {
        let file = ParseSourceFile::new("<p>\n<foo-bar>".into(), "app.html".into());
        let span = ParseSourceSpan::from_offsets(&file, 4, 13);
        let err = CompileError::UnsupportedNode {
            kind: "UnknownBlock",
            location: location(Some(&span)),
        };
        assert_eq!(
            err.to_string(),
            "app.html@1:0: unsupported template node `UnknownBlock`"
        );
        assert_eq!(location(None), "<unknown>");
    }
}
