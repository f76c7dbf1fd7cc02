use chrono::NaiveDate;

use crate::models::{Priority, Task};
use crate::partition::{TagCount, tag_index};

/// Summary numbers for the stats view and `tasks --stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    pub due_today: usize,
    pub starred: usize,
    /// Rounded down; 0 when there are no tasks.
    pub completion_rate: u8,
    /// Highest priority first, every priority present.
    pub by_priority: Vec<(Priority, usize)>,
    pub by_tag: Vec<TagCount>,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let completion_rate = if total == 0 {
            0
        } else {
            (completed * 100 / total) as u8
        };
        Self {
            total,
            completed,
            pending: total - completed,
            overdue: tasks.iter().filter(|t| t.is_overdue(today)).count(),
            due_today: tasks
                .iter()
                .filter(|t| !t.completed && t.due_date == Some(today))
                .count(),
            starred: tasks.iter().filter(|t| t.starred).count(),
            completion_rate,
            by_priority: Priority::ALL
                .into_iter()
                .map(|p| (p, tasks.iter().filter(|t| t.priority == p).count()))
                .collect(),
            by_tag: tag_index(tasks),
        }
    }
}
