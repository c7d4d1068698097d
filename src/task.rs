//! Task records and form input for todos.
//!
//! A task is persisted with the camelCase field layout of the stored blob:
//! `{id, title, description, dueDate, priority, completed, createdAt}`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, FieldError, Result};

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Identifier of a task within the stored collection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(TaskId)
            .map_err(|_| Error::InvalidArgument(format!("invalid task id '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Sort weight: high 3, medium 2, low 1.
    pub fn weight(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(Error::InvalidArgument(format!(
                "invalid priority '{}': must be low, medium, or high",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "deserialize_due_date",
        serialize_with = "serialize_due_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }
}

// Absent, null, empty and unparseable due dates all read back as "no due date".
fn deserialize_due_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_due_date))
}

fn serialize_due_date<S>(value: &Option<NaiveDate>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(date) => serializer.serialize_str(&date.format(DUE_DATE_FORMAT).to_string()),
        None => serializer.serialize_none(),
    }
}

/// Parse a `YYYY-MM-DD` date; a trailing time part (`2024-05-01T00:00`) is ignored.
pub fn parse_due_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, DUE_DATE_FORMAT).ok()
}

/// Raw, unvalidated input from a task form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: String,
}

/// A draft that passed validation; only these can become tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
}

impl TaskDraft {
    /// Check every required field and report all failures together.
    pub fn validate(&self) -> Result<ValidDraft> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(FieldError {
                field: "title",
                message: "is required".to_string(),
            });
        }

        let due_date = if self.due_date.trim().is_empty() {
            errors.push(FieldError {
                field: "dueDate",
                message: "is required".to_string(),
            });
            None
        } else {
            let parsed = parse_due_date(&self.due_date);
            if parsed.is_none() {
                errors.push(FieldError {
                    field: "dueDate",
                    message: format!("'{}' is not a YYYY-MM-DD date", self.due_date.trim()),
                });
            }
            parsed
        };

        let priority = if self.priority.trim().is_empty() {
            errors.push(FieldError {
                field: "priority",
                message: "is required".to_string(),
            });
            None
        } else {
            match self.priority.parse::<Priority>() {
                Ok(priority) => Some(priority),
                Err(_) => {
                    errors.push(FieldError {
                        field: "priority",
                        message: format!("'{}' is not low, medium, or high", self.priority.trim()),
                    });
                    None
                }
            }
        };

        match (errors.is_empty(), priority) {
            (true, Some(priority)) => Ok(ValidDraft {
                title: title.to_string(),
                description: self.description.trim().to_string(),
                due_date,
                priority,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }
}

impl ValidDraft {
    pub fn into_task(self, id: TaskId, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
            completed: false,
            created_at,
        }
    }
}

/// Next free id: one past the largest id in use.
///
/// Must be called while the store lock is held so two writers cannot pick
/// the same value.
pub fn next_id(tasks: &[Task]) -> Result<TaskId> {
    match tasks.iter().map(|task| task.id.0).max() {
        None => Ok(TaskId(1)),
        Some(max) => max.checked_add(1).map(TaskId).ok_or_else(|| {
            Error::OperationFailed(format!("no task id left after {max}"))
        }),
    }
}
