//! todos task command implementations.

use std::io::{self, BufRead, Write};

use crate::config::{default_store_dir, Config};
use crate::controller::{Controller, Notification, ViewState};
use crate::error::Result;
use crate::output::{board_output, emit_success, HumanOutput, OutputOptions};
use crate::repository::TaskRepository;
use crate::store::FileStore;
use crate::task::{TaskDraft, TaskId};
use crate::view::{Filter, SortKey};

use super::GlobalOptions;

const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

pub struct AddOptions {
    pub title: String,
    pub due: String,
    pub priority: String,
    pub description: String,
}

pub struct ListOptions {
    pub filter: Option<String>,
    pub sort: Option<String>,
}

pub struct ToggleOptions {
    pub id: String,
}

pub struct DeleteOptions {
    pub id: String,
    pub yes: bool,
}

pub fn run_add(options: AddOptions, globals: &GlobalOptions) -> Result<()> {
    let (mut controller, _) = load_context(globals, None, None)?;
    let feedback = controller.submit(TaskDraft {
        title: options.title,
        description: options.description,
        due_date: options.due,
        priority: options.priority,
    })?;

    let human = board_output(&feedback.board, feedback.notification.as_ref());
    emit_success(output_options(globals), "add", &feedback, Some(&human))
}

pub fn run_list(options: ListOptions, globals: &GlobalOptions) -> Result<()> {
    let (controller, _) = load_context(
        globals,
        options.filter.as_deref(),
        options.sort.as_deref(),
    )?;
    let board = controller.reload()?;

    let human = board_output(&board, None);
    emit_success(output_options(globals), "list", &board, Some(&human))
}

pub fn run_toggle(options: ToggleOptions, globals: &GlobalOptions) -> Result<()> {
    let id: TaskId = options.id.parse()?;
    let (mut controller, _) = load_context(globals, None, None)?;
    let feedback = controller.toggle(id)?;

    let human = board_output(&feedback.board, feedback.notification.as_ref());
    emit_success(output_options(globals), "toggle", &feedback, Some(&human))
}

pub fn run_delete(options: DeleteOptions, globals: &GlobalOptions) -> Result<()> {
    let id: TaskId = options.id.parse()?;
    let (mut controller, _) = load_context(globals, None, None)?;

    let feedback = match controller.request_delete(id)? {
        None => controller.feedback(Some(Notification::warning("Task not found")))?,
        Some(pending) => {
            let confirmed = options.yes || prompt_confirm(&pending.title)?;
            if confirmed {
                controller.confirm_delete()?
            } else {
                controller.cancel_delete()?
            }
        }
    };

    let human = board_output(&feedback.board, feedback.notification.as_ref());
    emit_success(output_options(globals), "delete", &feedback, Some(&human))
}

pub fn run_stats(globals: &GlobalOptions) -> Result<()> {
    let (controller, _) = load_context(globals, None, None)?;
    let summary = controller.reload()?.summary;

    let mut human = HumanOutput::new(summary.to_string());
    human.push_summary("total", summary.total.to_string());
    human.push_summary("active", summary.active.to_string());
    human.push_summary("completed", summary.completed.to_string());
    emit_success(output_options(globals), "stats", &summary, Some(&human))
}

/// Open the store named by flags/env/config and build a controller over it.
pub(crate) fn load_context(
    globals: &GlobalOptions,
    filter: Option<&str>,
    sort: Option<&str>,
) -> Result<(Controller<FileStore>, Config)> {
    let dir = match globals.store.clone() {
        Some(dir) => dir,
        None => default_store_dir()?,
    };
    let config = Config::load_from_dir(&dir);
    let key = globals
        .key
        .clone()
        .unwrap_or_else(|| config.store.key.clone());
    let store = FileStore::new(dir, key)?.with_lock_timeout(config.store.lock_timeout_ms);
    tracing::debug!(path = %store.blob_path().display(), "opened task store");

    let state = ViewState {
        filter: match filter {
            Some(value) => value.parse::<Filter>()?,
            None => config.view.filter,
        },
        sort: match sort {
            Some(value) => value.parse::<SortKey>()?,
            None => config.view.sort,
        },
    };
    Ok((Controller::new(TaskRepository::new(store), state), config))
}

fn output_options(globals: &GlobalOptions) -> OutputOptions {
    OutputOptions {
        json: globals.json,
        quiet: globals.quiet,
    }
}

fn prompt_confirm(title: &str) -> Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{DELETE_PROMPT} \"{title}\" [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}
