//! Render3 Identifiers
//!
//! Angular runtime symbols referenced by IR expressions.

use crate::output::output_ast::ExternalReference;

const CORE: &str = "@angular/core";

/// Angular runtime identifiers used in generated code
pub struct Identifiers;

impl Identifiers {
    fn make_ref(name: &str) -> ExternalReference {
        ExternalReference {
            module_name: Some(CORE.to_string()),
            name: Some(name.to_string()),
        }
    }

    pub fn repeater_track_by_index() -> ExternalReference {
        Self::make_ref("ɵɵrepeaterTrackByIndex")
    }

    pub fn repeater_track_by_identity() -> ExternalReference {
        Self::make_ref("ɵɵrepeaterTrackByIdentity")
    }

    pub fn component_instance() -> ExternalReference {
        Self::make_ref("ɵɵcomponentInstance")
    }
}
