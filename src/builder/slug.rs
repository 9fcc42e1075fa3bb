use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("slug regex compiles"));

static FIELD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("field name regex compiles"));

/// Derive a machine-safe identifier from a human label.
///
/// Lower-cases, collapses every run of characters outside `[a-z0-9]` into a
/// single `_` and trims underscores from both ends.
pub fn slugify(label: &str) -> String {
    let lowered = label.to_lowercase();
    NON_ALNUM_RUN
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// Starts with a letter, then letters, digits and underscores only
pub fn is_valid_field_name(name: &str) -> bool {
    FIELD_NAME.is_match(name)
}
