use chrono::{Datelike, Months, NaiveDate};

use crate::models::Task;

/// A month laid out in Sunday-first weeks. Cells before the 1st and after
/// the last day are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[Option<NaiveDate>; 7]>,
}

pub const WEEKDAY_LABELS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

impl MonthGrid {
    /// `None` for an invalid year/month.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let days = days_in_month(first);
        let lead = first.weekday().num_days_from_sunday() as usize;

        let mut cells: Vec<Option<NaiveDate>> = vec![None; lead];
        cells.extend((0..days).map(|offset| first.checked_add_days(chrono::Days::new(offset as u64))));
        while cells.len() % 7 != 0 {
            cells.push(None);
        }

        let weeks = cells
            .chunks(7)
            .map(|chunk| {
                let mut week = [None; 7];
                week.copy_from_slice(chunk);
                week
            })
            .collect();
        Some(Self { year, month, weeks })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month()).unwrap_or(Self {
            year: date.year(),
            month: date.month(),
            weeks: Vec::new(),
        })
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn title(&self) -> String {
        self.first_day()
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }
}

fn days_in_month(first: NaiveDate) -> u32 {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Move a date by whole months, clamping the day (Jan 31 + 1 month = Feb 28/29).
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// Tasks due on `day`, in collection order.
pub fn tasks_due_on(tasks: &[Task], day: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|t| t.due_date == Some(day)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn april_2025_starts_on_tuesday() {
        let grid = MonthGrid::new(2025, 4).unwrap();
        let first_week = grid.weeks[0];
        assert_eq!(first_week[0], None);
        assert_eq!(first_week[1], None);
        assert_eq!(first_week[2], NaiveDate::from_ymd_opt(2025, 4, 1));
        assert_eq!(grid.weeks.len(), 5);
        let days: usize = grid.weeks.iter().flatten().filter(|d| d.is_some()).count();
        assert_eq!(days, 30);
    }

    #[test]
    fn leap_february() {
        let grid = MonthGrid::new(2024, 2).unwrap();
        let days: usize = grid.weeks.iter().flatten().filter(|d| d.is_some()).count();
        assert_eq!(days, 29);
        assert_eq!(grid.title(), "February 2024");
    }

    #[test]
    fn invalid_month_is_none() {
        assert!(MonthGrid::new(2025, 13).is_none());
    }

    #[test]
    fn shifting_clamps_day() {
        let jan31 = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(shift_month(jan31, 1), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert_eq!(shift_month(jan31, -2), NaiveDate::from_ymd_opt(2024, 11, 30).unwrap());
    }

    #[test]
    fn due_on_day() {
        let day = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let mut a = Task::new("u", "a".into());
        a.due_date = Some(day);
        let b = Task::new("u", "b".into());
        let tasks = [a, b];
        let due = tasks_due_on(&tasks, day);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].title, "a");
    }
}
