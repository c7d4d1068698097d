//! Controller: turns user intents into repository calls and view refreshes.
//!
//! The selected filter and sort live on the controller instance and are
//! never persisted. Deletion is two-phase: `request_delete` marks a pending
//! removal, then `confirm_delete` or `cancel_delete` resolves it.

use chrono::Utc;
use serde::Serialize;

use crate::error::Result;
use crate::repository::TaskRepository;
use crate::store::Store;
use crate::task::{TaskDraft, TaskId};
use crate::view::{self, Board, Filter, SortKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }
}

/// Filter and sort currently selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ViewState {
    pub filter: Filter,
    pub sort: SortKey,
}

/// A deletion waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingDelete {
    pub id: TaskId,
    pub title: String,
}

/// Result of handling one user intent.
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub board: Board,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

pub struct Controller<S> {
    repository: TaskRepository<S>,
    state: ViewState,
    pending_delete: Option<PendingDelete>,
}

impl<S: Store> Controller<S> {
    pub fn new(repository: TaskRepository<S>, state: ViewState) -> Self {
        Self {
            repository,
            state,
            pending_delete: None,
        }
    }

    pub fn repository(&self) -> &TaskRepository<S> {
        &self.repository
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    /// Re-run listAll, filter, sort and render with the current selections.
    pub fn reload(&self) -> Result<Board> {
        let all = self.repository.list_all()?;
        Ok(view::project(all, self.state.filter, self.state.sort, Utc::now()))
    }

    /// Validate a form and create a task. Nothing is written when validation fails.
    pub fn submit(&mut self, draft: TaskDraft) -> Result<Feedback> {
        let valid = draft.validate()?;
        self.repository.add(valid, Utc::now())?;
        self.feedback(Some(Notification::success("Task added successfully!")))
    }

    pub fn toggle(&mut self, id: TaskId) -> Result<Feedback> {
        let notification = match self.repository.toggle_completion(id)? {
            Some(task) if task.completed => Notification::info("Task marked as completed"),
            Some(_) => Notification::info("Task marked as incomplete"),
            None => Notification::warning("Task not found"),
        };
        self.feedback(Some(notification))
    }

    /// First phase of deletion. Returns the pending entry, or `None` if the id is unknown.
    pub fn request_delete(&mut self, id: TaskId) -> Result<Option<PendingDelete>> {
        let found = self
            .repository
            .list_all()?
            .into_iter()
            .find(|task| task.id == id)
            .map(|task| PendingDelete {
                id: task.id,
                title: task.title,
            });
        self.pending_delete = found.clone();
        Ok(found)
    }

    /// Second phase: remove the pending task. A no-op when nothing is pending.
    pub fn confirm_delete(&mut self) -> Result<Feedback> {
        let Some(pending) = self.pending_delete.take() else {
            return self.feedback(None);
        };
        let notification = match self.repository.remove(pending.id)? {
            Some(_) => Notification::success("Task deleted successfully"),
            None => Notification::warning("Task not found"),
        };
        self.feedback(Some(notification))
    }

    /// Abandon the pending deletion without touching the repository.
    pub fn cancel_delete(&mut self) -> Result<Feedback> {
        let notification = self
            .pending_delete
            .take()
            .map(|_| Notification::info("Delete cancelled"));
        self.feedback(notification)
    }

    pub fn select_filter(&mut self, filter: Filter) -> Result<Board> {
        self.state.filter = filter;
        self.reload()
    }

    pub fn select_sort(&mut self, sort: SortKey) -> Result<Board> {
        self.state.sort = sort;
        self.reload()
    }

    /// Reload the board and attach `notification`.
    pub fn feedback(&self, notification: Option<Notification>) -> Result<Feedback> {
        Ok(Feedback {
            board: self.reload()?,
            notification,
        })
    }
}
