//! Partitioning: tasks by list, notes by folder, tag usage counts and
//! priority groups.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

use crate::filter::SmartList;
use crate::models::{Note, Priority, Task};
use crate::tags::Tagged;

/// Selector key matching every task.
pub const ALL_LISTS_KEY: &str = "all";

/// Which list the sidebar has selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ListSelector {
    /// Sentinel matching every task.
    #[default]
    All,
    Smart(SmartList),
    List(String),
}

impl ListSelector {
    /// `"all"` and the smart list keys map to their variants, anything else is
    /// treated as a custom list id.
    pub fn parse(key: &str) -> Self {
        let key = key.trim();
        if key == ALL_LISTS_KEY {
            return ListSelector::All;
        }
        match SmartList::from_key(key) {
            Some(smart) => ListSelector::Smart(smart),
            None => ListSelector::List(key.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            ListSelector::All => ALL_LISTS_KEY,
            ListSelector::Smart(smart) => smart.key(),
            ListSelector::List(id) => id,
        }
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            ListSelector::All => true,
            ListSelector::Smart(smart) => smart.matches(task, today),
            ListSelector::List(id) => task.list_id == *id,
        }
    }
}

impl fmt::Display for ListSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub fn partition_by_list<'a, I>(tasks: I, selector: &ListSelector, today: NaiveDate) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|task| selector.matches(task, today))
        .collect()
}

/// A folder and the notes filed in it.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderGroup<'a> {
    pub name: &'a str,
    pub notes: Vec<&'a Note>,
}

/// Group notes by folder. Groups appear in the order their folder is first
/// seen; notes without a folder go to "Unfiled".
pub fn group_by_folder<'a, I>(notes: I) -> Vec<FolderGroup<'a>>
where
    I: IntoIterator<Item = &'a Note>,
{
    let mut groups: Vec<FolderGroup<'a>> = Vec::new();
    for note in notes {
        let name = note.folder_name();
        match groups.iter_mut().find(|group| group.name == name) {
            Some(group) => group.notes.push(note),
            None => groups.push(FolderGroup {
                name,
                notes: vec![note],
            }),
        }
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Every distinct tag in sorted order with the number of items using it.
pub fn tag_index<'a, T, I>(items: I) -> Vec<TagCount>
where
    T: Tagged + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut counts: BTreeMap<&'a str, usize> = BTreeMap::new();
    for item in items {
        for tag in item.tags() {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect()
}

/// Tasks grouped by priority, highest first. Empty groups are omitted.
pub fn group_by_priority<'a, I>(tasks: I) -> Vec<(Priority, Vec<&'a Task>)>
where
    I: IntoIterator<Item = &'a Task>,
{
    let tasks: Vec<&Task> = tasks.into_iter().collect();
    Priority::ALL
        .into_iter()
        .filter_map(|priority| {
            let group: Vec<&Task> = tasks
                .iter()
                .copied()
                .filter(|task| task.priority == priority)
                .collect();
            (!group.is_empty()).then_some((priority, group))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::INBOX_LIST_ID;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
    }

    fn task_in(list: &str) -> Task {
        let mut task = Task::new("u1", format!("in {}", list));
        task.list_id = list.to_string();
        task
    }

    fn note_in(title: &str, folder: Option<&str>) -> Note {
        let mut note = Note::new("u1", title.to_string(), String::new());
        note.folder = folder.map(str::to_string);
        note
    }

    #[test]
    fn all_matches_every_list() {
        let tasks = vec![task_in("work"), task_in(INBOX_LIST_ID), task_in("home")];
        assert_eq!(partition_by_list(&tasks, &ListSelector::All, today()).len(), 3);
        let work = partition_by_list(&tasks, &ListSelector::parse("work"), today());
        assert_eq!(work.len(), 1);
        assert_eq!(work[0].list_id, "work");
    }

    #[test]
    fn parse_recognises_smart_lists() {
        assert_eq!(ListSelector::parse("all"), ListSelector::All);
        assert_eq!(ListSelector::parse("important"), ListSelector::Smart(SmartList::Important));
        assert_eq!(ListSelector::parse("inbox"), ListSelector::Smart(SmartList::Inbox));
        assert_eq!(ListSelector::parse("shopping"), ListSelector::List("shopping".into()));
    }

    #[test]
    fn folders_group_in_first_seen_order() {
        let notes = vec![
            note_in("a", Some("Work")),
            note_in("b", None),
            note_in("c", Some("Work")),
            note_in("d", Some("Personal")),
        ];
        let groups = group_by_folder(&notes);
        let names: Vec<_> = groups.iter().map(|g| g.name).collect();
        assert_eq!(names, ["Work", "Unfiled", "Personal"]);
        assert_eq!(groups[0].notes.len(), 2);
    }

    #[test]
    fn tag_index_is_sorted_with_counts() {
        let mut a = note_in("a", None);
        a.tags.insert("zeta");
        a.tags.insert("alpha");
        let mut b = note_in("b", None);
        b.tags.insert("alpha");
        let index = tag_index(&[a, b]);
        assert_eq!(
            index,
            vec![
                TagCount { tag: "alpha".into(), count: 2 },
                TagCount { tag: "zeta".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn priority_groups_skip_empty() {
        let mut high = task_in("x");
        high.priority = Priority::High;
        let low = task_in("y");
        let tasks = vec![low, high];
        let groups = group_by_priority(&tasks);
        let order: Vec<_> = groups.iter().map(|(p, _)| *p).collect();
        assert_eq!(order, [Priority::High, Priority::None]);
    }
}
