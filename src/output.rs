//! Shared output formatting for todos CLI commands.

use serde::Serialize;

use crate::controller::{Notification, NotificationKind};
use crate::error::{exit_codes, Error, Result};
use crate::view::{Board, TaskView};

pub const SCHEMA_VERSION: &str = "todos.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|h| h.warnings.clone()).unwrap_or_default();

        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
            kind: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<serde_json::Value>,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            },
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = error_hint(err) {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    push_summary(&mut lines, &output.summary);
    push_section(&mut lines, "Tasks", &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);

    lines.join("\n")
}

/// One list line per task, e.g. `[x] 3  Buy milk  (medium, due Jan 5, 2026, 2 hours ago)`.
pub fn format_task_line(task: &TaskView) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!(
        "[{mark}] {}  {}  ({}, due {}, {})",
        task.id, task.title, task.priority_label, task.due_label, task.age_label
    );
    if let Some(description) = task.description.as_deref() {
        line.push_str("\n      ");
        line.push_str(description);
    }
    line
}

/// Human rendering of a refreshed board, optionally headed by a notification.
pub fn board_output(board: &Board, notification: Option<&Notification>) -> HumanOutput {
    let header = notification
        .map(|note| note.message.clone())
        .unwrap_or_else(|| board.summary.to_string());
    let mut human = HumanOutput::new(header);
    human.push_summary("filter", board.filter.as_str());
    human.push_summary("sort", board.sort.as_str());
    human.push_summary("stats", board.summary.to_string());
    for task in &board.tasks {
        human.push_detail(format_task_line(task));
    }
    if let Some(note) = notification {
        if note.kind == NotificationKind::Warning {
            human.push_warning(note.message.clone());
        }
    }
    human
}

pub fn infer_command_name_from_args() -> String {
    std::env::args()
        .skip(1)
        .find(|arg| !arg.starts_with('-'))
        .unwrap_or_else(|| "todos".to_string())
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        exit_codes::USER_ERROR => "user_error",
        exit_codes::VALIDATION_FAILED => "validation_failed",
        _ => "operation_failed",
    }
}

fn error_hint(err: &Error) -> Option<String> {
    match err {
        Error::Validation(_) => {
            Some("todos add <TITLE> --due YYYY-MM-DD --priority low|medium|high".to_string())
        }
        Error::LockFailed(_) => Some("another todos process holds the store; retry".to_string()),
        Error::InvalidConfig(_) => Some("fix todos.toml then retry".to_string()),
        _ => None,
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("- {key}"));
        } else {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskId;

    fn view(completed: bool, description: Option<&str>) -> TaskView {
        TaskView {
            id: TaskId(3),
            title: "Buy milk".to_string(),
            description: description.map(str::to_string),
            due_label: "Jan 5, 2026".to_string(),
            priority_label: "medium".to_string(),
            age_label: "2 hours ago".to_string(),
            completed,
            toggle_hint: "Mark as complete",
        }
    }

    #[test]
    fn task_line_marks_completion() {
        assert_eq!(
            format_task_line(&view(true, None)),
            "[x] 3  Buy milk  (medium, due Jan 5, 2026, 2 hours ago)"
        );
        let line = format_task_line(&view(false, Some("2 litres")));
        assert!(line.starts_with("[ ] 3"));
        assert!(line.ends_with("2 litres"));
    }

    #[test]
    fn human_output_sections() {
        let mut human = HumanOutput::new("Task added successfully!");
        human.push_summary("stats", "Total: 1 | Active: 1 | Completed: 0");
        human.push_detail("[ ] 1  a");
        let text = format_human(&human);
        assert!(text.starts_with("Task added successfully!"));
        assert!(text.contains("Summary:\n- stats: Total: 1 | Active: 1 | Completed: 0"));
        assert!(text.contains("Tasks:\n- [ ] 1  a"));
    }
}
