//! Task repository: the only owner of the canonical collection.
//!
//! Every operation reads the full collection from the store, applies one
//! change, and writes the full collection back while holding the store lock.
//! Stored order is kept: new tasks go to the end and other records never move.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::store::Store;
use crate::task::{next_id, Task, TaskId, ValidDraft};

#[derive(Debug, Clone)]
pub struct TaskRepository<S> {
    store: S,
}

impl<S: Store> TaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a task from a validated draft and append it to the collection.
    pub fn add(&self, draft: ValidDraft, now: DateTime<Utc>) -> Result<Task> {
        let _guard = self.store.lock()?;
        let mut tasks = self.store.read()?;
        let id = next_id(&tasks)?;
        let task = draft.into_task(id, now);
        tasks.push(task.clone());
        self.store.write(&tasks)?;
        tracing::info!(id = %id, priority = %task.priority, "task added");
        Ok(task)
    }

    /// Flip `completed` on the task with `id`; `None` when no such task exists.
    pub fn toggle_completion(&self, id: TaskId) -> Result<Option<Task>> {
        let _guard = self.store.lock()?;
        let mut tasks = self.store.read()?;
        let Some(index) = position(&tasks, id) else {
            tracing::debug!(id = %id, "toggle ignored: task not found");
            return Ok(None);
        };
        let task = &mut tasks[index];
        task.completed = !task.completed;
        let updated = task.clone();
        self.store.write(&tasks)?;
        tracing::info!(id = %id, completed = updated.completed, "task toggled");
        Ok(Some(updated))
    }

    /// Remove the task with `id`; `None` (and no write) when no such task exists.
    pub fn remove(&self, id: TaskId) -> Result<Option<Task>> {
        let _guard = self.store.lock()?;
        let mut tasks = self.store.read()?;
        let Some(index) = position(&tasks, id) else {
            tracing::debug!(id = %id, "remove ignored: task not found");
            return Ok(None);
        };
        let removed = tasks.remove(index);
        self.store.write(&tasks)?;
        tracing::info!(id = %id, "task removed");
        Ok(Some(removed))
    }

    /// The full stored collection, in stored order.
    pub fn list_all(&self) -> Result<Vec<Task>> {
        self.store.read()
    }
}

// First record carrying `id`. Records sharing an id (hand-edited blobs) are
// left in place; only the first one is ever changed.
fn position(tasks: &[Task], id: TaskId) -> Option<usize> {
    let mut matches = tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| task.id == id)
        .map(|(index, _)| index);
    let first = matches.next()?;
    if matches.next().is_some() {
        tracing::warn!(id = %id, "duplicate task id in store; changing the first record only");
    }
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::{FileStore, MemoryStore, DEFAULT_KEY};
    use crate::task::{Priority, TaskDraft};

    fn draft(title: &str, priority: &str) -> ValidDraft {
        TaskDraft {
            title: title.to_string(),
            description: String::new(),
            due_date: "2026-01-15".to_string(),
            priority: priority.to_string(),
        }
        .validate()
        .unwrap()
    }

    fn repo() -> TaskRepository<MemoryStore> {
        TaskRepository::new(MemoryStore::new())
    }

    #[test]
    fn add_appends_one_incomplete_task() {
        let repo = repo();
        let before = Utc::now();
        let task = repo.add(draft("Buy milk", "medium"), Utc::now()).unwrap();
        let after = Utc::now();

        let all = repo.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], task);
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.created_at >= before && task.created_at <= after);
    }

    #[test]
    fn ids_are_unique_even_within_one_clock_tick() {
        let repo = repo();
        let now = Utc::now();
        let a = repo.add(draft("a", "low"), now).unwrap();
        let b = repo.add(draft("b", "low"), now).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn toggle_twice_restores_state() {
        let repo = repo();
        let task = repo.add(draft("a", "low"), Utc::now()).unwrap();

        let once = repo.toggle_completion(task.id).unwrap().unwrap();
        assert!(once.completed);
        let twice = repo.toggle_completion(task.id).unwrap().unwrap();
        assert!(!twice.completed);
        assert_eq!(repo.list_all().unwrap()[0].completed, task.completed);
    }

    #[test]
    fn toggle_missing_id_is_noop() {
        let repo = repo();
        repo.add(draft("a", "low"), Utc::now()).unwrap();
        let before = repo.list_all().unwrap();
        assert!(repo.toggle_completion(TaskId(999)).unwrap().is_none());
        assert_eq!(repo.list_all().unwrap(), before);
    }

    #[test]
    fn remove_drops_only_the_match() {
        let repo = repo();
        let a = repo.add(draft("a", "low"), Utc::now()).unwrap();
        let b = repo.add(draft("b", "high"), Utc::now()).unwrap();

        let removed = repo.remove(a.id).unwrap().unwrap();
        assert_eq!(removed.id, a.id);
        let all = repo.list_all().unwrap();
        assert_eq!(all, vec![b]);

        let before = repo.list_all().unwrap();
        assert!(repo.remove(a.id).unwrap().is_none());
        assert_eq!(repo.list_all().unwrap(), before);
    }

    #[test]
    fn preserves_insertion_order_on_write() {
        let repo = repo();
        for title in ["one", "two", "three"] {
            repo.add(draft(title, "low"), Utc::now()).unwrap();
        }
        let middle = repo.list_all().unwrap()[1].id;
        repo.toggle_completion(middle).unwrap();
        let titles: Vec<_> = repo
            .list_all()
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }

    fn stored(id: u64, title: &str) -> Task {
        draft(title, "low").into_task(TaskId(id), Utc::now())
    }

    fn stored_ids(repo: &TaskRepository<MemoryStore>) -> Vec<u64> {
        repo.list_all().unwrap().iter().map(|t| t.id.0).collect()
    }

    #[test]
    fn mutations_keep_stored_order() {
        let repo = TaskRepository::new(MemoryStore::with_tasks(vec![
            stored(3, "three"),
            stored(1, "one"),
        ]));

        repo.toggle_completion(TaskId(3)).unwrap().unwrap();
        assert_eq!(stored_ids(&repo), vec![3, 1]);

        let added = repo.add(draft("four", "low"), Utc::now()).unwrap();
        assert_eq!(added.id, TaskId(4));
        assert_eq!(stored_ids(&repo), vec![3, 1, 4]);

        repo.remove(TaskId(1)).unwrap().unwrap();
        assert_eq!(stored_ids(&repo), vec![3, 4]);
    }

    #[test]
    fn add_fails_instead_of_reusing_the_largest_id() {
        let repo = TaskRepository::new(MemoryStore::with_tasks(vec![stored(u64::MAX, "last")]));

        let err = repo.add(draft("new", "low"), Utc::now()).unwrap_err();
        assert!(matches!(err, Error::OperationFailed(_)));
        let all = repo.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "last");
    }

    #[test]
    fn duplicate_ids_are_not_dropped() {
        let repo = TaskRepository::new(MemoryStore::with_tasks(vec![
            stored(1, "first copy"),
            stored(2, "other"),
            stored(1, "second copy"),
        ]));

        repo.toggle_completion(TaskId(2)).unwrap().unwrap();
        let titles: Vec<_> = repo.list_all().unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["first copy", "other", "second copy"]);

        let toggled = repo.toggle_completion(TaskId(1)).unwrap().unwrap();
        assert_eq!(toggled.title, "first copy");
        let all = repo.list_all().unwrap();
        assert!(all[0].completed);
        assert!(!all[2].completed);
    }

    #[test]
    fn file_backed_repository_persists() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp.path(), DEFAULT_KEY).unwrap();
        let repo = TaskRepository::new(store.clone());
        let task = repo.add(draft("persist me", "high"), Utc::now()).unwrap();

        let reopened = TaskRepository::new(store);
        let all = reopened.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, task.id);
        assert_eq!(all[0].title, "persist me");
    }
}
