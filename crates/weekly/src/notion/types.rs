//! Notion task data types and the weekly window.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::github::Commit;

/// Status of a tracked task.
///
/// Only these two states take part in reports; pages with any other
/// status are ignored at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work finished during the week.
    Completed,
    /// Work still underway.
    InProgress,
}

impl TaskStatus {
    /// Parse a status name from a Notion status property.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "done" | "complete" | "completed" => Some(TaskStatus::Completed),
            "in progress" | "in-progress" | "doing" => Some(TaskStatus::InProgress),
            _ => None,
        }
    }

    /// The canonical status name used in query filters.
    #[must_use]
    pub fn api_name(&self) -> &'static str {
        match self {
            TaskStatus::Completed => "Done",
            TaskStatus::InProgress => "In progress",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Completed => "completed",
            TaskStatus::InProgress => "in progress",
        };
        write!(f, "{s}")
    }
}

/// A task record pulled from the tracker database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Notion page id.
    pub id: String,
    /// Task title.
    pub title: String,
    /// Current status.
    pub status: TaskStatus,
    /// Free-text notes/description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Task type labels.
    #[serde(default)]
    pub task_types: Vec<String>,
    /// Priority label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Due date as entered in the tracker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Linked repository URL, if the task tracks code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    /// When the page was last edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_edited: Option<DateTime<Utc>>,
    /// Commits made during the week (filled by enrichment).
    #[serde(default)]
    pub commits: Vec<Commit>,
}

impl Task {
    /// Create a task with the minimal required fields.
    #[must_use]
    pub fn new(id: String, title: String, status: TaskStatus) -> Self {
        Self {
            id,
            title,
            status,
            notes: None,
            task_types: Vec::new(),
            priority: None,
            due_date: None,
            repo_url: None,
            last_edited: None,
            commits: Vec::new(),
        }
    }
}

/// Closed Monday-to-Sunday interval used to filter tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    /// Monday 00:00:00 local time.
    pub start: DateTime<Local>,
    /// Sunday 23:59:59 local time.
    pub end: DateTime<Local>,
}

impl WeekWindow {
    /// The week containing the current local date.
    #[must_use]
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    /// The week containing a given date.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        let sunday = monday + Duration::days(6);

        let start = monday.and_time(NaiveTime::MIN);
        // 23:59:59 always exists
        let end = sunday.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap());

        Self {
            start: to_local(start),
            end: to_local(end),
        }
    }

    /// Whether a timestamp falls inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Window start, ISO 8601 for the query filter.
    #[must_use]
    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339()
    }

    /// Window end, ISO 8601 for the query filter.
    #[must_use]
    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339()
    }

    /// Window start as a plain date.
    #[must_use]
    pub fn start_date(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// Window end as a plain date.
    #[must_use]
    pub fn end_date(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    /// Human-readable label, e.g. `2026-08-03 ~ 2026-08-09`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ~ {}", self.start_date(), self.end_date())
    }

    /// Title for the published report page.
    #[must_use]
    pub fn report_title(&self) -> String {
        format!("Weekly report {}", self.label())
    }
}

/// Attach the local offset to a naive timestamp. On a DST gap the
/// earliest valid interpretation is used.
pub(crate) fn to_local(ndt: NaiveDateTime) -> DateTime<Local> {
    Local
        .from_local_datetime(&ndt)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&ndt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_status_parse() {
        assert_eq!(TaskStatus::parse("Done"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::parse("completed"), Some(TaskStatus::Completed));
        assert_eq!(
            TaskStatus::parse("In progress"),
            Some(TaskStatus::InProgress)
        );
        assert_eq!(TaskStatus::parse("doing"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("Not started"), None);
        assert_eq!(TaskStatus::parse("Archived"), None);
    }

    #[test]
    fn test_window_spans_monday_to_sunday() {
        // 2026-08-06 is a Thursday
        let window = WeekWindow::containing(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());

        assert_eq!(window.start.weekday(), Weekday::Mon);
        assert_eq!(window.end.weekday(), Weekday::Sun);
        assert_eq!(window.start_date(), "2026-08-03");
        assert_eq!(window.end_date(), "2026-08-09");
        assert_eq!(window.label(), "2026-08-03 ~ 2026-08-09");
    }

    #[test]
    fn test_window_for_a_monday_starts_same_day() {
        let window = WeekWindow::containing(NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
        assert_eq!(window.start_date(), "2026-08-03");
    }

    #[test]
    fn test_contains_is_inclusive_at_both_bounds() {
        let window = WeekWindow::containing(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());

        let start_utc = window.start.with_timezone(&Utc);
        let end_utc = window.end.with_timezone(&Utc);

        assert!(window.contains(start_utc));
        assert!(window.contains(end_utc));
        assert!(!window.contains(start_utc - Duration::seconds(1)));
        assert!(!window.contains(end_utc + Duration::seconds(1)));
    }

    #[test]
    fn test_report_title() {
        let window = WeekWindow::containing(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        assert_eq!(
            window.report_title(),
            "Weekly report 2026-08-03 ~ 2026-08-09"
        );
    }
}
