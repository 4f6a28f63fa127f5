//! Field Lookup Utilities
//!
//! Helper functions for navigating nested contexts using dot-notation paths.

use verdict_core::{FeelContext, FeelValue};

/// Split a dotted path into its segments (`"user.profile.email"`)
pub(crate) fn split_path(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}

/// Follow `segments` from `root`.
///
/// Returns `None` if any segment is missing or an intermediate value is not
/// a context; callers treat that as null.
pub(crate) fn get_nested_value<'a, S: AsRef<str>>(
    root: &'a FeelContext,
    segments: &[S],
) -> Option<&'a FeelValue> {
    let (first, rest) = segments.split_first()?;
    let mut current = root.get(first.as_ref())?;

    for segment in rest {
        current = match current {
            FeelValue::Context(map) => match map.get(segment.as_ref()) {
                Some(value) => value,
                None => {
                    tracing::trace!("Field segment not found: {}", segment.as_ref());
                    return None;
                }
            },
            other => {
                tracing::trace!(
                    "Cannot access '{}' on non-context {}",
                    segment.as_ref(),
                    other.type_name()
                );
                return None;
            }
        };
    }

    Some(current)
}
