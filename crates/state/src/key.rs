//! Composite keys
//!
//! Format: `\0NAMESPACE\0PART_1\0PART_2\0...`
//!
//! The leading and trailing delimiters make the encoding injective and keep
//! namespaces apart under prefix scans: the prefix of `MEMBER` is
//! `\0MEMBER\0`, which never matches keys of a `MEMBERSHIP` namespace.
//! Plain (non-composite) singleton keys never start with `\0`.

use crate::error::{StateError, StateResult};

/// Delimiter between key components
pub const DELIMITER: char = '\u{0}';

/// Largest code point; reserved as a range sentinel
pub const MAX_CODE_POINT: char = '\u{10FFFF}';

/// Build a full composite key from a namespace and its ordered parts
pub fn make_key(namespace: &str, parts: &[&str]) -> StateResult<String> {
    partial_key(namespace, parts)
}

/// Build a scan prefix from a namespace and leading parts.
///
/// `partial_key(ns, &[])` matches every key created under `ns`.
pub fn partial_key(namespace: &str, parts: &[&str]) -> StateResult<String> {
    if namespace.is_empty() {
        return Err(StateError::InvalidKey("namespace cannot be empty".to_string()));
    }
    validate_component(namespace)?;

    let mut key = String::with_capacity(
        2 + namespace.len() + parts.iter().map(|p| p.len() + 1).sum::<usize>(),
    );
    key.push(DELIMITER);
    key.push_str(namespace);
    key.push(DELIMITER);

    for part in parts {
        validate_component(part)?;
        key.push_str(part);
        key.push(DELIMITER);
    }

    Ok(key)
}

fn validate_component(component: &str) -> StateResult<()> {
    if component.contains(DELIMITER) || component.contains(MAX_CODE_POINT) {
        return Err(StateError::InvalidKey(format!(
            "component {:?} contains a reserved character",
            component
        )));
    }
    Ok(())
}
