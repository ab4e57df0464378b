//! # Path Builder
//!
//! Dotted addresses for nested document positions.
//!
//! Mapping children are joined with `.`; sequence elements are index-qualified
//! (`ports[0]`, or `[0]` at the document root). The same scheme is used for
//! every sequence so an address always names exactly one position.

/// Address of a mapping child
#[must_use]
pub fn build(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Address of a sequence element
#[must_use]
pub fn element(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

/// Final `.`-separated segment of an address
#[must_use]
pub fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}
