//! IR Enums
//!
//! Discriminants and small classification enums shared by IR operations and expressions.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Distinguishes different kinds of IR operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// A special operation type which is used to represent the beginning and end nodes of a linked
    /// list of operations.
    ListEnd,
    /// An operation which wraps an output AST statement.
    Statement,
    /// An operation which declares and initializes a `SemanticVariable`.
    Variable,
    ElementStart,
    ElementEnd,
    /// An operation which declares an embedded view.
    Template,
    ContainerStart,
    ContainerEnd,
    /// Creates an embedded view for one branch of an `@if` / `@switch`.
    ConditionalCreate,
    ConditionalBranchCreate,
    /// Selects which conditional branch is rendered.
    Conditional,
    Listener,
    Text,
    InterpolateText,
    /// An intermediate binding op, that has not had the execution order determined yet.
    Binding,
    Property,
    TwoWayProperty,
    DomProperty,
    StyleProp,
    ClassProp,
    StyleMap,
    ClassMap,
    Attribute,
    Projection,
    /// An attribute hoisted onto the element's static attribute array.
    ExtractedAttribute,
    Defer,
    DeferOn,
    DeferWhen,
    I18nStart,
    I18nEnd,
    I18nContext,
    I18nAttributes,
    IcuStart,
    IcuEnd,
    RepeaterCreate,
    Repeater,
    DeclareLet,
    StoreLet,
}

/// The kind of a binding before it is specialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Static attributes.
    Attribute,
    /// Class bindings.
    ClassName,
    /// Style bindings.
    StyleProperty,
    /// Dynamic property bindings.
    Property,
    /// Property or attribute bindings on a template.
    Template,
    /// Internationalized attributes.
    I18n,
    /// Animation property bindings.
    Animation,
    /// Property side of a two-way binding.
    TwoWayProperty,
}

/// Distinguishes the different kinds of embedded views a template op can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// An explicit `<ng-template>`.
    NgTemplate,
    /// A template created from a structural directive (`*ngIf`).
    Structural,
    /// A template created for a control flow block (`@if`, `@for`, `@defer`, ...).
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    #[default]
    HTML,
    SVG,
    Math,
}

impl Namespace {
    /// Maps the namespace prefix of a `:ns:name` tag to a namespace.
    pub fn from_prefix(prefix: Option<&str>) -> Namespace {
        match prefix {
            Some("svg") => Namespace::SVG,
            Some("math") => Namespace::Math,
            _ => Namespace::HTML,
        }
    }
}

/// The kinds of semantic variables an op can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticVariableKind {
    Context,
    Identifier,
    SavedView,
    Alias,
}

/// Whether the compilation mirrors the legacy TemplateDefinitionBuilder output exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompatibilityMode {
    #[default]
    Normal,
    TemplateDefinitionBuilder,
}

/// Kinds of i18n contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum I18nContextKind {
    RootI18n,
    Icu,
    Attr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferTriggerKind {
    Idle,
    Immediate,
    Timer,
    Hover,
    Interaction,
    Viewport,
    Never,
}

/// Which phase of a `@defer` block a trigger belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeferOpModifierKind {
    #[default]
    None,
    Prefetch,
    Hydrate,
}

bitflags! {
    /// Flags describing how a variable may be treated by later optimization passes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VariableFlags: u8 {
        const NONE = 0b0000;
        /// Always inline this variable, regardless of the number of times it's used.
        const ALWAYS_INLINE = 0b0001;
    }
}
