//! Task filtering: the all/today/upcoming/completed buckets, the smart lists
//! and free-text search.
//!
//! Everything here is pure. The current date is always passed in so results
//! are deterministic.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::models::{INBOX_LIST_ID, Note, Priority, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Today,
    Upcoming,
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown filter '{0}' (expected all, today, upcoming or completed)")]
pub struct ParseFilterError(pub String);

impl TaskFilter {
    pub const ALL: [TaskFilter; 4] = [
        TaskFilter::All,
        TaskFilter::Today,
        TaskFilter::Upcoming,
        TaskFilter::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Today => "today",
            TaskFilter::Upcoming => "upcoming",
            TaskFilter::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskFilter::All => "All",
            TaskFilter::Today => "Today",
            TaskFilter::Upcoming => "Upcoming",
            TaskFilter::Completed => "Completed",
        }
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Today => !task.completed && task.due_date == Some(today),
            TaskFilter::Upcoming => !task.completed && task.due_date.is_some_and(|due| due > today),
            TaskFilter::Completed => task.completed,
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskFilter::ALL
            .into_iter()
            .find(|filter| filter.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ParseFilterError(s.to_string()))
    }
}

/// Keep the tasks matching `filter`, in their original order.
///
/// Accepts any iterator of task references so an already filtered result can
/// be filtered again.
pub fn filter_tasks<'a, I>(tasks: I, filter: TaskFilter, today: NaiveDate) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|task| filter.matches(task, today))
        .collect()
}

/// Sidebar lists derived from task attributes rather than list membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmartList {
    Inbox,
    NextSevenDays,
    Important,
    Planned,
    Flagged,
}

impl SmartList {
    pub const ALL: [SmartList; 5] = [
        SmartList::Inbox,
        SmartList::NextSevenDays,
        SmartList::Important,
        SmartList::Planned,
        SmartList::Flagged,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SmartList::Inbox => INBOX_LIST_ID,
            SmartList::NextSevenDays => "next-7-days",
            SmartList::Important => "important",
            SmartList::Planned => "planned",
            SmartList::Flagged => "flagged",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SmartList::Inbox => "Inbox",
            SmartList::NextSevenDays => "Next 7 Days",
            SmartList::Important => "Important",
            SmartList::Planned => "Planned",
            SmartList::Flagged => "Flagged",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        SmartList::ALL.into_iter().find(|list| list.key() == key)
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            SmartList::Inbox => task.list_id == INBOX_LIST_ID,
            SmartList::NextSevenDays => {
                let horizon = today.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX);
                !task.completed && task.due_date.is_some_and(|due| due >= today && due <= horizon)
            }
            SmartList::Important => task.starred,
            SmartList::Planned => task.due_date.is_some(),
            SmartList::Flagged => task.priority == Priority::High,
        }
    }
}

/// Case-insensitive substring match on title and description. An empty
/// query matches everything.
pub fn task_matches_search(task: &Task, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    task.title.to_lowercase().contains(&query)
        || task
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&query))
}

/// Case-insensitive substring match on title, content or any tag.
pub fn note_matches_search(note: &Note, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    note.title.to_lowercase().contains(&query)
        || note.content.to_lowercase().contains(&query)
        || note.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn task(title: &str, completed: bool, due: Option<NaiveDate>) -> Task {
        let mut task = Task::new("u1", title.to_string());
        task.completed = completed;
        task.due_date = due;
        task
    }

    #[test]
    fn today_and_completed_buckets() {
        let tasks = vec![task("1", false, Some(day(10))), task("2", true, None)];
        let today: Vec<_> = filter_tasks(&tasks, TaskFilter::Today, day(10))
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        let completed: Vec<_> = filter_tasks(&tasks, TaskFilter::Completed, day(10))
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(today, ["1"]);
        assert_eq!(completed, ["2"]);
    }

    #[test]
    fn upcoming_is_strictly_after_today() {
        let tasks = vec![
            task("today", false, Some(day(10))),
            task("tomorrow", false, Some(day(11))),
            task("done", true, Some(day(12))),
            task("undated", false, None),
        ];
        let upcoming = filter_tasks(&tasks, TaskFilter::Upcoming, day(10));
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].title, "tomorrow");
    }

    #[test]
    fn completed_task_due_today_is_not_in_today() {
        let tasks = vec![task("x", true, Some(day(10)))];
        assert!(filter_tasks(&tasks, TaskFilter::Today, day(10)).is_empty());
    }

    #[test]
    fn filter_keys_round_trip_through_strings() {
        for filter in TaskFilter::ALL {
            assert_eq!(filter.as_str().parse::<TaskFilter>(), Ok(filter));
        }
        assert_eq!(" Today ".parse::<TaskFilter>(), Ok(TaskFilter::Today));
        assert!("later".parse::<TaskFilter>().is_err());
    }

    #[test]
    fn next_seven_days_window() {
        let inside = task("in", false, Some(day(17)));
        let outside = task("out", false, Some(day(18)));
        let past = task("past", false, Some(day(9)));
        assert!(SmartList::NextSevenDays.matches(&inside, day(10)));
        assert!(!SmartList::NextSevenDays.matches(&outside, day(10)));
        assert!(!SmartList::NextSevenDays.matches(&past, day(10)));
    }

    #[test]
    fn search_matches_title_and_description() {
        let mut t = task("Buy milk", false, None);
        t.description = Some("From the Corner shop".into());
        assert!(task_matches_search(&t, "MILK"));
        assert!(task_matches_search(&t, "corner"));
        assert!(task_matches_search(&t, ""));
        assert!(!task_matches_search(&t, "bread"));
    }

    #[test]
    fn note_search_includes_tags() {
        let mut note = Note::new("u1", "Ideas".into(), "nothing here".into());
        note.tags.insert("Roadmap");
        assert!(note_matches_search(&note, "roadmap"));
        assert!(!note_matches_search(&note, "budget"));
    }

    #[rstest]
    #[case::all_includes_done(true, None, TaskFilter::All, true)]
    #[case::today_open_due_today(false, Some(10), TaskFilter::Today, true)]
    #[case::today_excludes_overdue(false, Some(9), TaskFilter::Today, false)]
    #[case::today_excludes_undated(false, None, TaskFilter::Today, false)]
    #[case::today_excludes_done(true, Some(10), TaskFilter::Today, false)]
    #[case::upcoming_tomorrow(false, Some(11), TaskFilter::Upcoming, true)]
    #[case::upcoming_excludes_today(false, Some(10), TaskFilter::Upcoming, false)]
    #[case::upcoming_excludes_done(true, Some(12), TaskFilter::Upcoming, false)]
    #[case::completed_done(true, None, TaskFilter::Completed, true)]
    #[case::completed_excludes_open(false, Some(10), TaskFilter::Completed, false)]
    fn filter_membership(
        #[case] completed: bool,
        #[case] due: Option<u32>,
        #[case] filter: TaskFilter,
        #[case] expected: bool,
    ) {
        assert_eq!(filter.matches(&task("t", completed, due.map(day)), day(10)), expected);
    }

    fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
        prop::collection::vec((any::<bool>(), prop::option::of(0u32..30)), 0..20).prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (completed, due))| task(&i.to_string(), completed, due.map(|d| day(d + 1))))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_completed_filter_is_exact(tasks in arb_tasks()) {
            let completed = filter_tasks(&tasks, TaskFilter::Completed, day(10));
            prop_assert_eq!(completed.len(), tasks.iter().filter(|t| t.completed).count());
            prop_assert!(completed.iter().all(|t| t.completed));
        }

        #[test]
        fn prop_today_never_holds_undated(tasks in arb_tasks()) {
            let today = filter_tasks(&tasks, TaskFilter::Today, day(10));
            prop_assert!(today.iter().all(|t| t.due_date == Some(day(10))));
        }

        #[test]
        fn prop_filtering_twice_changes_nothing(
            tasks in arb_tasks(),
            filter in prop::sample::select(TaskFilter::ALL.to_vec()),
        ) {
            let once = filter_tasks(&tasks, filter, day(10));
            let twice = filter_tasks(once.iter().copied(), filter, day(10));
            prop_assert_eq!(once, twice);
        }
    }
}
