//! Create Operations
//!
//! Payloads of the `CreateOp` variants: ops that build the structure of a view.

use indexmap::IndexSet;

use crate::core::SecurityContext;
use crate::i18n::i18n_ast::{BlockPlaceholder, Message, TagPlaceholder};
use crate::output::output_ast::Expression;
use crate::parse_util::ParseSourceSpan;
use crate::template::pipeline::ir::enums::{
    BindingKind, DeferOpModifierKind, DeferTriggerKind, I18nContextKind, Namespace, TemplateKind,
};
use crate::template::pipeline::ir::handle::{SlotHandle, XrefId};
use crate::template::pipeline::ir::operations::OpList;
use crate::template::pipeline::ir::ops::UpdateOp;

/// Local reference on an element
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRef {
    /// User-defined name of the local ref variable
    pub name: String,
    /// Target of the local reference variable (often empty string)
    pub target: String,
}

/// The i18n placeholder of an embedded view: a tag for `<ng-template>`, a block for `@if` & co.
#[derive(Debug, Clone, PartialEq)]
pub enum I18nPlaceholder {
    Tag(TagPlaceholder),
    Block(BlockPlaceholder),
}

/// Fields shared by every op that declares an element-like node.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementOrContainerOpBase {
    /// XrefId allocated for this element
    pub xref: XrefId,
    pub handle: SlotHandle,
    pub local_refs: Vec<LocalRef>,
    /// Whether marked ngNonBindable
    pub non_bindable: bool,
    pub start_source_span: ParseSourceSpan,
    pub whole_source_span: ParseSourceSpan,
}

impl ElementOrContainerOpBase {
    pub fn new(
        xref: XrefId,
        start_source_span: ParseSourceSpan,
        whole_source_span: ParseSourceSpan,
    ) -> Self {
        ElementOrContainerOpBase {
            xref,
            handle: SlotHandle::new(),
            local_refs: Vec::new(),
            non_bindable: false,
            start_source_span,
            whole_source_span,
        }
    }
}

/// Logical operation representing the start of an element in the creation IR.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementStartOp {
    pub base: ElementOrContainerOpBase,
    /// HTML tag name, without its namespace prefix
    pub tag: String,
    pub namespace: Namespace,
    pub i18n_placeholder: Option<TagPlaceholder>,
}

impl ElementStartOp {
    pub fn new(
        tag: String,
        xref: XrefId,
        namespace: Namespace,
        i18n_placeholder: Option<TagPlaceholder>,
        start_source_span: ParseSourceSpan,
        whole_source_span: ParseSourceSpan,
    ) -> Self {
        ElementStartOp {
            base: ElementOrContainerOpBase::new(xref, start_source_span, whole_source_span),
            tag,
            namespace,
            i18n_placeholder,
        }
    }
}

/// Logical operation representing the end of an element structure in the creation IR.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementEndOp {
    /// The XrefId of the element declared via ElementStart
    pub xref: XrefId,
    pub source_span: Option<ParseSourceSpan>,
}

/// Start of an `<ng-container>`: an element-like grouping that renders no DOM node.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerStartOp {
    pub base: ElementOrContainerOpBase,
    pub i18n_placeholder: Option<TagPlaceholder>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerEndOp {
    pub xref: XrefId,
    pub source_span: Option<ParseSourceSpan>,
}

/// Logical operation representing an embedded view declaration in the creation IR.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateOp {
    pub base: ElementOrContainerOpBase,
    pub tag: Option<String>,
    pub namespace: Namespace,
    pub template_kind: TemplateKind,
    pub function_name_suffix: String,
    pub i18n_placeholder: Option<I18nPlaceholder>,
}

impl TemplateOp {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        xref: XrefId,
        template_kind: TemplateKind,
        tag: Option<String>,
        function_name_suffix: String,
        namespace: Namespace,
        i18n_placeholder: Option<I18nPlaceholder>,
        start_source_span: ParseSourceSpan,
        whole_source_span: ParseSourceSpan,
    ) -> Self {
        TemplateOp {
            base: ElementOrContainerOpBase::new(xref, start_source_span, whole_source_span),
            tag,
            namespace,
            template_kind,
            function_name_suffix,
            i18n_placeholder,
        }
    }
}

/// Declares the embedded view of one `@if`/`@switch` branch. The first branch of a block is a
/// `ConditionalCreate`, later ones are `ConditionalBranchCreate`; both carry this payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalCreateOp {
    pub base: ElementOrContainerOpBase,
    pub tag: Option<String>,
    pub namespace: Namespace,
    pub template_kind: TemplateKind,
    pub function_name_suffix: String,
    pub i18n_placeholder: Option<BlockPlaceholder>,
}

impl ConditionalCreateOp {
    pub fn new(
        xref: XrefId,
        tag: Option<String>,
        function_name_suffix: String,
        i18n_placeholder: Option<BlockPlaceholder>,
        start_source_span: ParseSourceSpan,
        whole_source_span: ParseSourceSpan,
    ) -> Self {
        ConditionalCreateOp {
            base: ElementOrContainerOpBase::new(xref, start_source_span, whole_source_span),
            tag,
            namespace: Namespace::HTML,
            template_kind: TemplateKind::Block,
            function_name_suffix,
            i18n_placeholder,
        }
    }
}

/// Variable names for repeater operations
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepeaterVarNames {
    /// Every name the loop index is visible under (`$index` plus its aliases)
    pub dollar_index: IndexSet<String>,
    /// The name of the loop item
    pub dollar_implicit: String,
}

/// An op that creates a repeater (e.g. a for loop).
#[derive(Debug)]
pub struct RepeaterCreateOp {
    /// Shared element fields; `base.xref` is the repeated item view.
    pub base: ElementOrContainerOpBase,
    pub tag: Option<String>,
    pub namespace: Namespace,
    /// The Xref of the empty view function
    pub empty_view: Option<XrefId>,
    /// The track expression to use while iterating
    pub track: Box<Expression>,
    /// Statements computing the track value when it cannot be expressed as a single expression
    pub track_by_ops: Option<OpList<UpdateOp>>,
    /// The resolved track function, set by track function optimization
    pub track_by_fn: Option<Box<Expression>>,
    pub var_names: RepeaterVarNames,
    /// Whether the repeater track function relies on the component instance
    pub uses_component_instance: bool,
    pub function_name_suffix: String,
    pub empty_tag: Option<String>,
    pub i18n_placeholder: Option<BlockPlaceholder>,
    pub empty_i18n_placeholder: Option<BlockPlaceholder>,
}

impl RepeaterCreateOp {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        primary_view: XrefId,
        empty_view: Option<XrefId>,
        tag: Option<String>,
        track: Expression,
        var_names: RepeaterVarNames,
        empty_tag: Option<String>,
        i18n_placeholder: Option<BlockPlaceholder>,
        empty_i18n_placeholder: Option<BlockPlaceholder>,
        start_source_span: ParseSourceSpan,
        whole_source_span: ParseSourceSpan,
    ) -> Self {
        RepeaterCreateOp {
            base: ElementOrContainerOpBase::new(primary_view, start_source_span, whole_source_span),
            tag,
            namespace: Namespace::HTML,
            empty_view,
            track: Box::new(track),
            track_by_ops: None,
            track_by_fn: None,
            var_names,
            uses_component_instance: false,
            function_name_suffix: "For".to_string(),
            empty_tag,
            i18n_placeholder,
            empty_i18n_placeholder,
        }
    }
}

/// Logical operation representing an event listener on an element in the creation IR.
#[derive(Debug)]
pub struct ListenerOp {
    /// The element (or template) the listener is attached to
    pub target: XrefId,
    pub target_slot: SlotHandle,
    /// Whether this listener is from a host binding
    pub host_listener: bool,
    /// Name of the event which is being listened to
    pub name: String,
    /// Tag name of the element on which this listener is placed
    pub tag: Option<String>,
    /// The body of the event listener
    pub handler_ops: OpList<UpdateOp>,
    /// Whether this listener is known to consume `$event` in its body
    pub consumes_dollar_event: bool,
    pub is_legacy_animation_listener: bool,
    pub legacy_animation_phase: Option<String>,
    /// Some event listeners can have a target, e.g. in `document:dragover`
    pub event_target: Option<String>,
    pub source_span: ParseSourceSpan,
}

impl ListenerOp {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        target: XrefId,
        target_slot: SlotHandle,
        name: String,
        tag: Option<String>,
        handler_ops: OpList<UpdateOp>,
        legacy_animation_phase: Option<String>,
        event_target: Option<String>,
        host_listener: bool,
        source_span: ParseSourceSpan,
    ) -> Self {
        ListenerOp {
            target,
            target_slot,
            host_listener,
            name,
            tag,
            handler_ops,
            consumes_dollar_event: false,
            is_legacy_animation_listener: legacy_animation_phase.is_some(),
            legacy_animation_phase,
            event_target,
            source_span,
        }
    }
}

/// Creates a text node with a static initial value.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOp {
    pub xref: XrefId,
    pub handle: SlotHandle,
    pub initial_value: String,
    pub i18n_placeholder: Option<String>,
    pub source_span: Option<ParseSourceSpan>,
}

impl TextOp {
    pub fn new(
        xref: XrefId,
        initial_value: String,
        i18n_placeholder: Option<String>,
        source_span: Option<ParseSourceSpan>,
    ) -> Self {
        TextOp {
            xref,
            handle: SlotHandle::new(),
            initial_value,
            i18n_placeholder,
            source_span,
        }
    }
}

/// An `<ng-content>` projection point.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionOp {
    pub xref: XrefId,
    pub handle: SlotHandle,
    pub selector: String,
    /// Index of this projection among the projections of the component, in document order
    pub projection_slot_index: usize,
    /// The view rendered when nothing is projected
    pub fallback_view: Option<XrefId>,
    pub i18n_placeholder: Option<TagPlaceholder>,
    pub source_span: ParseSourceSpan,
}

/// An attribute hoisted onto the static attribute array of an element or template.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedAttributeOp {
    /// The element or template the attribute belongs to
    pub target: XrefId,
    pub binding_kind: BindingKind,
    pub namespace: Option<String>,
    pub name: String,
    /// Literal value, or `None` when only the attribute name is recorded
    pub expression: Option<Expression>,
    pub i18n_context: Option<XrefId>,
    pub i18n_message: Option<Message>,
    pub security_context: Vec<SecurityContext>,
    pub source_span: Option<ParseSourceSpan>,
}

/// A `@defer` block and its secondary views.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferOp {
    pub xref: XrefId,
    pub handle: SlotHandle,
    pub main_view: XrefId,
    pub main_slot: SlotHandle,
    pub loading_view: Option<XrefId>,
    pub loading_slot: Option<SlotHandle>,
    pub placeholder_view: Option<XrefId>,
    pub placeholder_slot: Option<SlotHandle>,
    pub error_view: Option<XrefId>,
    pub error_slot: Option<SlotHandle>,
    pub placeholder_minimum_time: Option<i64>,
    pub loading_minimum_time: Option<i64>,
    pub loading_after_time: Option<i64>,
    pub source_span: ParseSourceSpan,
}

impl DeferOp {
    pub fn new(xref: XrefId, main_view: XrefId, source_span: ParseSourceSpan) -> Self {
        DeferOp {
            xref,
            handle: SlotHandle::new(),
            main_view,
            main_slot: SlotHandle::new(),
            loading_view: None,
            loading_slot: None,
            placeholder_view: None,
            placeholder_slot: None,
            error_view: None,
            error_slot: None,
            placeholder_minimum_time: None,
            loading_minimum_time: None,
            loading_after_time: None,
            source_span,
        }
    }
}

/// Trigger configuration of a `DeferOn` op.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferTrigger {
    Idle,
    Immediate,
    Never,
    Timer { delay: i64 },
    Hover { target_name: Option<String> },
    Interaction { target_name: Option<String> },
    Viewport { target_name: Option<String> },
}

impl DeferTrigger {
    pub fn kind(&self) -> DeferTriggerKind {
        match self {
            DeferTrigger::Idle => DeferTriggerKind::Idle,
            DeferTrigger::Immediate => DeferTriggerKind::Immediate,
            DeferTrigger::Never => DeferTriggerKind::Never,
            DeferTrigger::Timer { .. } => DeferTriggerKind::Timer,
            DeferTrigger::Hover { .. } => DeferTriggerKind::Hover,
            DeferTrigger::Interaction { .. } => DeferTriggerKind::Interaction,
            DeferTrigger::Viewport { .. } => DeferTriggerKind::Viewport,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeferOnOp {
    pub defer: XrefId,
    pub trigger: DeferTrigger,
    pub modifier: DeferOpModifierKind,
    pub source_span: ParseSourceSpan,
}

/// Marks the start of a translated block.
#[derive(Debug, Clone, PartialEq)]
pub struct I18nStartOp {
    pub xref: XrefId,
    pub handle: SlotHandle,
    /// The outermost i18n block this one is nested in, or its own xref for a root block
    pub root: XrefId,
    pub message: Message,
    pub message_index: Option<usize>,
    pub sub_template_index: Option<usize>,
    /// The i18n context generated for this block
    pub context: Option<XrefId>,
    pub source_span: Option<ParseSourceSpan>,
}

impl I18nStartOp {
    pub fn new(
        xref: XrefId,
        message: Message,
        root: Option<XrefId>,
        source_span: Option<ParseSourceSpan>,
    ) -> Self {
        I18nStartOp {
            xref,
            handle: SlotHandle::new(),
            root: root.unwrap_or(xref),
            message,
            message_index: None,
            sub_template_index: None,
            context: None,
            source_span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct I18nEndOp {
    pub xref: XrefId,
    pub source_span: Option<ParseSourceSpan>,
}

/// Collects the parameters of one translated message.
#[derive(Debug, Clone, PartialEq)]
pub struct I18nContextOp {
    pub xref: XrefId,
    pub context_kind: I18nContextKind,
    /// The i18n block this context belongs to; `None` for attribute contexts
    pub i18n_block: Option<XrefId>,
    pub message: Message,
    pub source_span: Option<ParseSourceSpan>,
}

/// Associates the translated attributes of an element with that element.
#[derive(Debug, Clone, PartialEq)]
pub struct I18nAttributesOp {
    pub xref: XrefId,
    pub handle: SlotHandle,
    pub target: XrefId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IcuStartOp {
    pub xref: XrefId,
    pub message: Message,
    pub message_placeholder: String,
    pub context: Option<XrefId>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IcuEndOp {
    pub xref: XrefId,
}

/// Declares the slot of a `@let` value.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareLetOp {
    pub xref: XrefId,
    pub handle: SlotHandle,
    pub declared_name: String,
    pub source_span: ParseSourceSpan,
}
