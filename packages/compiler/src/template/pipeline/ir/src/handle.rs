//! IR Handles
//!
//! Identifiers used to link IR operations together.

/// Cross-reference id. During ingestion, `XrefId`s are allocated by the compilation job to link
/// together operations which need to reference each other (an element and its bindings, a view
/// and the template op that declares it, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct XrefId(pub usize);

impl XrefId {
    pub fn new(id: usize) -> Self {
        XrefId(id)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for XrefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "xref#{}", self.0)
    }
}

/// Slot handle for operations that consume slots.
///
/// Slots are assigned by a later allocation pass; until then `slot` is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SlotHandle {
    pub slot: Option<usize>,
}

impl SlotHandle {
    pub fn new() -> Self {
        SlotHandle { slot: None }
    }

    pub fn with_slot(slot: usize) -> Self {
        SlotHandle { slot: Some(slot) }
    }
}
