//! I18n Module
//!
//! Translation metadata attached to template nodes.

pub mod i18n_ast;

pub use i18n_ast::*;
