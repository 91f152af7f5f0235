//! Helpers for reading free-form generated text.

use serde::de::DeserializeOwned;

/// Byte offset of the first case-insensitive occurrence of `needle` in `haystack`.
///
/// Empty or whitespace-only needles never match.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.trim();
    if needle.is_empty() {
        return None;
    }
    haystack.to_lowercase().find(&needle.to_lowercase())
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    find_ignore_case(haystack, needle).is_some()
}

/// Parses the first `{ ... }` block of `text` that decodes as `T`.
///
/// Models tend to wrap JSON in prose or markdown fences, and the prose may
/// itself contain braces, so each `{` is tried in turn and anything after
/// the decoded object is ignored.
pub fn extract_json_object<T: DeserializeOwned>(text: &str) -> Option<T> {
    text.match_indices('{').find_map(|(start, _)| {
        serde_json::Deserializer::from_str(&text[start..])
            .into_iter::<T>()
            .next()
            .and_then(|parsed| parsed.ok())
    })
}
