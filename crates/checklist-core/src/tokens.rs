//! Placeholder-token substitution for templated text fields.
//!
//! Spec text and the image-folder path may carry tokens like `<SOP_ID>` that
//! are only resolvable at render time. Substitution is a pure rewrite over a
//! small enumerated table; stored raw text is never mutated, and a token
//! whose value is empty stays literal rather than being blanked.

pub const SOP_ID_TOKEN: &str = "<SOP_ID>";

/// Resolve all known tokens in `text` against the current SOP id.
pub fn resolve(text: &str, sop_id: &str) -> String {
    let mut out = text.to_string();
    for (token, value) in [(SOP_ID_TOKEN, sop_id.trim())] {
        if !value.is_empty() {
            out = out.replace(token, value);
        }
    }
    out
}

/// Collapse all whitespace runs (including newlines) to single spaces.
/// Used when multi-line reminder/notes text is flattened into a report line.
pub fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
