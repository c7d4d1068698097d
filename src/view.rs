//! View pipeline: filter, then sort, then render.
//!
//! All three stages are pure. They work on copies of the collection and
//! never touch the repository.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::task::{Task, TaskId};

/// Label shown when a task has no due date.
pub const NO_DUE_DATE: &str = "No due date";

/// Elapsed-time units, largest first. Month and year are fixed lengths.
const TIME_UNITS: [(&str, i64); 7] = [
    ("year", 31_536_000),
    ("month", 2_592_000),
    ("week", 604_800),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
    ("second", 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" | "done" => Ok(Filter::Completed),
            _ => Err(Error::InvalidArgument(format!(
                "invalid filter '{}': must be all, active, or completed",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "dueDate")]
    DueDate,
    #[serde(rename = "priority")]
    Priority,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::CreatedAt, SortKey::DueDate, SortKey::Priority];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::CreatedAt => "createdAt",
            SortKey::DueDate => "dueDate",
            SortKey::Priority => "priority",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::CreatedAt => "Newest first",
            SortKey::DueDate => "Due date",
            SortKey::Priority => "Priority",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "createdat" | "created" => Ok(SortKey::CreatedAt),
            "duedate" | "due" => Ok(SortKey::DueDate),
            "priority" => Ok(SortKey::Priority),
            _ => Err(Error::InvalidArgument(format!(
                "invalid sort '{}': must be createdAt, dueDate, or priority",
                s
            ))),
        }
    }
}

/// Keep the tasks accepted by `filter`, in their original order.
pub fn filter_tasks(tasks: Vec<Task>, filter: Filter) -> Vec<Task> {
    tasks.into_iter().filter(|task| filter.matches(task)).collect()
}

/// Stable sort; equal keys keep their relative order.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey) {
    match key {
        SortKey::CreatedAt => tasks.sort_by(|left, right| right.created_at.cmp(&left.created_at)),
        SortKey::DueDate => {
            tasks.sort_by(|left, right| compare_due_dates(left.due_date, right.due_date))
        }
        SortKey::Priority => {
            tasks.sort_by(|left, right| right.priority.weight().cmp(&left.priority.weight()))
        }
    }
}

// Earliest first; tasks without a due date go last.
fn compare_due_dates(left: Option<NaiveDate>, right: Option<NaiveDate>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Display projection of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_label: String,
    pub priority_label: String,
    pub age_label: String,
    pub completed: bool,
    pub toggle_hint: &'static str,
}

impl TaskView {
    pub fn from_task(task: &Task, now: DateTime<Utc>) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.has_description().then(|| task.description.clone()),
            due_label: format_due_date(task.due_date),
            priority_label: task.priority.to_string(),
            age_label: time_ago(task.created_at, now),
            completed: task.completed,
            toggle_hint: if task.completed {
                "Mark as incomplete"
            } else {
                "Mark as complete"
            },
        }
    }
}

/// Counts over the whole collection, independent of the active filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl Summary {
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total: tasks.len(),
            active: tasks.len() - completed,
            completed,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} | Active: {} | Completed: {}",
            self.total, self.active, self.completed
        )
    }
}

/// The output of one full pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub filter: Filter,
    pub sort: SortKey,
    pub tasks: Vec<TaskView>,
    pub summary: Summary,
}

pub fn render(tasks: &[Task], now: DateTime<Utc>) -> Vec<TaskView> {
    tasks.iter().map(|task| TaskView::from_task(task, now)).collect()
}

/// Filter, sort and render `all`, with the summary taken before filtering.
pub fn project(all: Vec<Task>, filter: Filter, sort: SortKey, now: DateTime<Utc>) -> Board {
    let summary = Summary::of(&all);
    let mut visible = filter_tasks(all, filter);
    sort_tasks(&mut visible, sort);
    Board {
        filter,
        sort,
        tasks: render(&visible, now),
        summary,
    }
}

/// `Jan 5, 2026`, or the no-due-date label.
pub fn format_due_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => NO_DUE_DATE.to_string(),
    }
}

/// Relative age such as `3 days ago`; anything under a second is `just now`.
pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - created_at).num_seconds();
    for (unit, size) in TIME_UNITS {
        let count = seconds / size;
        if count >= 1 {
            let plural = if count == 1 { "" } else { "s" };
            return format!("{count} {unit}{plural} ago");
        }
    }
    "just now".to_string()
}
