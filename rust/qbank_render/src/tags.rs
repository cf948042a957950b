//! Knowledge-point tags: the `【知识点】` marker line and tag list merging.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG_LINE: Regex = Regex::new(r"【知识点】(.*)").unwrap();
    static ref TAG_SEP: Regex = Regex::new(r"[、,，;；\s]+").unwrap();
}

/// Collects tags from every `【知识点】` line, deduplicated in order of first
/// appearance.
pub fn extract_tags(raw: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for caps in TAG_LINE.captures_iter(raw) {
        let payload = caps[1].trim_start_matches(|c: char| c == '：' || c == ':' || c.is_whitespace());
        let found = TAG_SEP
            .split(payload)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        tags = merge_tags(&tags, found);
    }
    tags
}

/// `existing` followed by the unseen entries of `incoming`.
pub fn merge_tags<I>(existing: &[String], incoming: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashSet<String> = existing.iter().cloned().collect();
    let mut out = existing.to_vec();
    for tag in incoming {
        if seen.insert(tag.clone()) {
            out.push(tag);
        }
    }
    out
}
