//! Tag Name Utilities

/// Splits `:ns:name` into its namespace and local name.
///
/// Names without a leading colon have no namespace. With `fatal`, a leading colon that is
/// not followed by a second one is an error instead of being passed through.
pub fn split_ns_name(element_name: &str, fatal: bool) -> Result<(Option<String>, String), String> {
    let Some(rest) = element_name.strip_prefix(':') else {
        return Ok((None, element_name.to_string()));
    };

    match rest.find(':') {
        None if fatal => Err(format!(
            "Unsupported format \"{}\" expecting \":namespace:name\"",
            element_name
        )),
        None => Ok((None, element_name.to_string())),
        Some(idx) => Ok((Some(rest[..idx].to_string()), rest[idx + 1..].to_string())),
    }
}

/// Check if tag is `<ng-container>` (works same regardless of namespace)
pub fn is_ng_container(tag_name: &str) -> bool {
    split_ns_name(tag_name, false)
        .map(|(_, name)| name == "ng-container")
        .unwrap_or(false)
}
