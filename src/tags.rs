use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered set of case-sensitive tags.
///
/// Insertion order is preserved and duplicates are never stored. Tags are
/// trimmed on the way in and blank tags are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(Vec<String>);

/// Anything that carries a tag set (tasks and notes).
pub trait Tagged {
    fn tags(&self) -> &TagSet;
}

impl TagSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse a comma-separated tag string, e.g. `"work, urgent"`.
    pub fn parse(input: &str) -> Self {
        input.split(',').collect()
    }

    /// Insert a tag. Returns `true` if the set changed.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Remove a tag. Returns `true` if the set changed.
    pub fn remove(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Format as `[tag1] [tag2]` for list rows.
    pub fn format_brackets(&self) -> String {
        self.0
            .iter()
            .map(|t| format!("[{}]", t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Format as `#tag1 #tag2` for detail panes and markdown export.
    pub fn format_hashes(&self) -> String {
        self.0
            .iter()
            .map(|t| format!("#{}", t))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag.as_ref());
        }
        set
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn insert_is_idempotent() {
        let mut tags = TagSet::new();
        assert!(tags.insert("work"));
        assert!(!tags.insert("work"));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn tags_are_case_sensitive() {
        let mut tags = TagSet::new();
        tags.insert("Work");
        tags.insert("work");
        assert_eq!(tags.as_slice(), ["Work", "work"]);
    }

    #[test]
    fn blank_and_padded_input() {
        let mut tags = TagSet::new();
        assert!(!tags.insert("   "));
        assert!(tags.insert("  home "));
        assert!(tags.contains("home"));
    }

    #[test]
    fn removing_absent_tag_is_noop() {
        let mut tags = TagSet::parse("a, b");
        assert!(!tags.remove("c"));
        assert!(tags.remove("a"));
        assert_eq!(tags.as_slice(), ["b"]);
    }

    #[test]
    fn parse_keeps_first_occurrence_order() {
        let tags = TagSet::parse("b, a, b,, c");
        assert_eq!(tags.as_slice(), ["b", "a", "c"]);
        assert_eq!(tags.to_string(), "b, a, c");
        assert_eq!(tags.format_brackets(), "[b] [a] [c]");
    }

    #[test]
    fn deserializing_drops_duplicates() {
        let tags: TagSet = serde_json::from_str(r#"["x","y","x"]"#).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#"["x","y"]"#);
    }

    proptest! {
        #[test]
        fn prop_duplicate_insert_keeps_size(tags in prop::collection::vec("[a-z]{1,8}", 1..10), pick in 0usize..10) {
            let mut set: TagSet = tags.iter().collect();
            let before = set.len();
            let existing = set.as_slice()[pick % before].clone();
            prop_assert!(!set.insert(&existing));
            prop_assert_eq!(set.len(), before);
        }
    }
}
