//! Study plan calendar and month grid.

use crate::core::error::DomainError;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Date format used on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One thing to study on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyTask {
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl StudyTask {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Calendar entry as it appears in the list layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatedTask {
    pub date: String,
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaskEntry {
    Text(String),
    Task(StudyTask),
}

/// The two layouts a generated plan arrives in: a map from date to the
/// day's topics, or a flat list of dated tasks.
#[derive(Deserialize)]
#[serde(untagged)]
enum CalendarWire {
    ByDate(BTreeMap<String, Vec<TaskEntry>>),
    Entries(Vec<DatedTask>),
}

/// A study plan keyed by day.
///
/// Entries whose date does not parse (the generator emits `TBA` for
/// undated events) are dropped on decode. Serializes as a list of
/// `{date, task, category}` objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CalendarWire", into = "Vec<DatedTask>")]
pub struct StudyCalendar {
    days: BTreeMap<NaiveDate, Vec<StudyTask>>,
}

impl From<CalendarWire> for StudyCalendar {
    fn from(wire: CalendarWire) -> Self {
        let mut calendar = StudyCalendar::new();
        match wire {
            CalendarWire::ByDate(map) => {
                for (date, entries) in map {
                    let Ok(date) = parse_date(&date) else {
                        continue;
                    };
                    for entry in entries {
                        let task = match entry {
                            TaskEntry::Text(text) => StudyTask::new(text),
                            TaskEntry::Task(task) => task,
                        };
                        calendar.insert(date, task);
                    }
                }
            }
            CalendarWire::Entries(entries) => {
                for entry in entries {
                    let Ok(date) = parse_date(&entry.date) else {
                        continue;
                    };
                    calendar.insert(
                        date,
                        StudyTask {
                            task: entry.task,
                            category: entry.category,
                        },
                    );
                }
            }
        }
        calendar
    }
}

impl From<StudyCalendar> for Vec<DatedTask> {
    fn from(calendar: StudyCalendar) -> Self {
        calendar
            .days
            .into_iter()
            .flat_map(|(date, tasks)| {
                let date = date.format(DATE_FORMAT).to_string();
                tasks.into_iter().map(move |t| DatedTask {
                    date: date.clone(),
                    task: t.task,
                    category: t.category,
                })
            })
            .collect()
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate(s.to_string()))
}

impl StudyCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, task: StudyTask) {
        self.days.entry(date).or_default().push(task);
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of days with at least one task.
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn task_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn tasks_on(&self, date: NaiveDate) -> &[StudyTask] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn topics_on(&self, date: NaiveDate) -> Vec<&str> {
        self.tasks_on(date).iter().map(|t| t.task.as_str()).collect()
    }

    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &[StudyTask])> {
        self.days.iter().map(|(d, t)| (*d, t.as_slice()))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }
}

/// Layout of one calendar month, weeks starting on Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthGrid {
    year: i32,
    month: u32,
    leading_blanks: u32,
    days_in_month: u32,
}

impl MonthGrid {
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| DomainError::InvalidDate(format!("{year}-{month:02}")))?;
        Ok(Self::from_first(first))
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::from_first(date.with_day(1).unwrap_or(date))
    }

    fn from_first(first: NaiveDate) -> Self {
        let days_in_month = first
            .checked_add_months(Months::new(1))
            .map(|next| (next - first).num_days() as u32)
            .unwrap_or(31);
        Self {
            year: first.year(),
            month: first.month(),
            leading_blanks: first.weekday().num_days_from_sunday(),
            days_in_month,
        }
    }

    fn first(&self) -> Option<NaiveDate> {
        self.date(1)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Empty cells before day 1 (0 when the month starts on Sunday).
    pub fn leading_blanks(&self) -> u32 {
        self.leading_blanks
    }

    pub fn days_in_month(&self) -> u32 {
        self.days_in_month
    }

    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// `"March 2025"`
    pub fn title(&self) -> String {
        self.first()
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }

    /// Rows of seven cells holding day numbers, `None` for padding.
    pub fn weeks(&self) -> Vec<[Option<u32>; 7]> {
        let cells = self.leading_blanks + self.days_in_month;
        let rows = cells.div_ceil(7);
        (0..rows)
            .map(|row| {
                std::array::from_fn(|col| {
                    let cell = row * 7 + col as u32;
                    (cell >= self.leading_blanks && cell < cells)
                        .then(|| cell - self.leading_blanks + 1)
                })
            })
            .collect()
    }

    pub fn next(&self) -> Self {
        self.first()
            .and_then(|d| d.checked_add_months(Months::new(1)))
            .map(Self::from_first)
            .unwrap_or(*self)
    }

    pub fn prev(&self) -> Self {
        self.first()
            .and_then(|d| d.checked_sub_months(Months::new(1)))
            .map(Self::from_first)
            .unwrap_or(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn decodes_map_layout() {
        let calendar: StudyCalendar = serde_json::from_str(
            r#"{"2025-03-03":["Cardiology","ECG review"],"2025-03-05":["Renal"]}"#,
        )
        .unwrap();
        assert_eq!(calendar.day_count(), 2);
        assert_eq!(
            calendar.topics_on(date("2025-03-03")),
            vec!["Cardiology", "ECG review"]
        );
        assert!(calendar.topics_on(date("2025-03-04")).is_empty());
    }

    #[test]
    fn decodes_list_layout_and_skips_undated() {
        let calendar: StudyCalendar = serde_json::from_str(
            r#"[
                {"date":"2025-03-01","task":"Prepare for Midterm","category":"exam prep"},
                {"date":"TBA","task":"Guest lecture","category":"major event"},
                {"date":"2025-03-01","task":"Review Lecture 3"}
            ]"#,
        )
        .unwrap();
        assert_eq!(calendar.task_count(), 2);
        let tasks = calendar.tasks_on(date("2025-03-01"));
        assert_eq!(tasks[0].category.as_deref(), Some("exam prep"));
        assert_eq!(tasks[1].category, None);
    }

    #[test]
    fn serializes_as_list_of_dated_tasks() {
        let mut calendar = StudyCalendar::new();
        calendar.insert(
            date("2025-01-02"),
            StudyTask::new("Anatomy").with_category("study"),
        );
        let json = serde_json::to_value(&calendar).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"date":"2025-01-02","task":"Anatomy","category":"study"}])
        );
        let back: StudyCalendar = serde_json::from_value(json).unwrap();
        assert_eq!(back, calendar);
    }

    #[test]
    fn first_and_last_dates() {
        let calendar: StudyCalendar =
            serde_json::from_str(r#"{"2025-05-10":["b"],"2025-04-01":["a"]}"#).unwrap();
        assert_eq!(calendar.first_date(), Some(date("2025-04-01")));
        assert_eq!(calendar.last_date(), Some(date("2025-05-10")));
    }

    #[test]
    fn month_grid_starts_on_sunday() {
        // 1 March 2025 is a Saturday
        let grid = MonthGrid::new(2025, 3).unwrap();
        assert_eq!(grid.leading_blanks(), 6);
        assert_eq!(grid.days_in_month(), 31);
        assert_eq!(grid.title(), "March 2025");

        let weeks = grid.weeks();
        assert_eq!(weeks.len(), 6);
        assert_eq!(weeks[0], [None, None, None, None, None, None, Some(1)]);
        assert_eq!(weeks[5][0], Some(30));
        assert_eq!(weeks[5][1], Some(31));
        assert_eq!(weeks[5][2], None);
    }

    #[test]
    fn february_lengths() {
        assert_eq!(MonthGrid::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(MonthGrid::new(2025, 2).unwrap().days_in_month(), 28);
        // 1 June 2025 is a Sunday
        assert_eq!(MonthGrid::new(2025, 6).unwrap().leading_blanks(), 0);
    }

    #[test]
    fn navigation_wraps_years() {
        let december = MonthGrid::new(2024, 12).unwrap();
        assert_eq!(december.next(), MonthGrid::new(2025, 1).unwrap());
        assert_eq!(december.next().prev(), december);
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(MonthGrid::new(2025, 13).is_err());
        assert!(parse_date("2025-02-30").is_err());
    }
}
