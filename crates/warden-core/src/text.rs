//! Small string helpers shared across the bot's modules.

use std::collections::HashSet;

/// First value that appears more than once, if any.
pub fn first_duplicate<'a>(values: &'a [String]) -> Option<&'a str> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .iter()
        .find(|v| !seen.insert(v.as_str()))
        .map(String::as_str)
}

/// Truncate to at most `max` characters, appending `…` when cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deduplicate while keeping the first occurrence of each value.
pub fn dedup_preserving_order(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}
