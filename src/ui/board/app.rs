use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::UiConfig;
use crate::controller::{Controller, Feedback, Notification};
use crate::error::{Error, Result};
use crate::store::{FileStore, Store};
use crate::task::TaskId;
use crate::view::{Board, Filter, SortKey, TaskView};

use super::form::{FormAction, TaskForm};
use super::view;

const EVENT_POLL_MS: u64 = 120;
const WATCH_DEBOUNCE_MS: u64 = 200;

enum UiMsg {
    Reload,
    WatchError(String),
}

/// A row marked for removal, waiting for its confirmation prompt.
pub(crate) struct DeleteConfirmState {
    pub(crate) task_id: TaskId,
    pub(crate) title: String,
    marked_at: Instant,
}

pub(crate) struct ActiveNotification {
    pub(crate) notification: Notification,
    shown_at: Instant,
}

pub struct AppState<S> {
    controller: Controller<S>,
    pub(crate) board: Board,
    pub(crate) selected: usize,
    pub(crate) form: Option<TaskForm>,
    pub(crate) sort_picker: Option<usize>,
    pub(crate) delete_confirm: Option<DeleteConfirmState>,
    pub(crate) notification: Option<ActiveNotification>,
    pub(crate) show_help: bool,
    config: UiConfig,
}

impl<S: Store> AppState<S> {
    pub fn new(controller: Controller<S>, config: UiConfig) -> Result<Self> {
        let board = controller.reload()?;
        Ok(Self {
            controller,
            board,
            selected: 0,
            form: None,
            sort_picker: None,
            delete_confirm: None,
            notification: None,
            show_help: false,
            config,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn filter(&self) -> Filter {
        self.controller.state().filter
    }

    pub fn sort(&self) -> SortKey {
        self.controller.state().sort
    }

    pub(crate) fn selected_task(&self) -> Option<&TaskView> {
        self.board.tasks.get(self.selected)
    }

    pub(crate) fn is_marked_for_delete(&self, id: TaskId) -> bool {
        self.delete_confirm
            .as_ref()
            .map(|state| state.task_id == id)
            .unwrap_or(false)
    }

    /// The confirmation prompt appears once the removal mark has been visible long enough.
    pub(crate) fn delete_prompt_visible(&self, now: Instant) -> bool {
        self.delete_confirm
            .as_ref()
            .map(|state| {
                now.duration_since(state.marked_at)
                    >= Duration::from_millis(self.config.delete_delay_ms)
            })
            .unwrap_or(false)
    }

    pub(crate) fn current_notification(&self, now: Instant) -> Option<&Notification> {
        self.notification.as_ref().and_then(|active| {
            let age = now.duration_since(active.shown_at);
            (age < Duration::from_millis(self.config.notification_ms))
                .then_some(&active.notification)
        })
    }

    pub(crate) fn footer_hint(&self) -> &'static str {
        if self.delete_confirm.is_some() {
            return "y confirm delete  n/esc cancel";
        }
        if self.sort_picker.is_some() {
            return "j/k move  enter apply  esc cancel";
        }
        if self.form.is_some() {
            return "tab next field  \u{2190}/\u{2192} priority  enter save  esc cancel";
        }
        "j/k move  n new  space toggle  d delete  1/2/3 filter  s sort  ? help  q quit"
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some(ActiveNotification {
            notification,
            shown_at: Instant::now(),
        });
    }

    fn apply_board(&mut self, board: Board) {
        let previous = self.selected_task().map(|task| task.id);
        self.board = board;
        self.selected = previous
            .and_then(|id| self.board.tasks.iter().position(|task| task.id == id))
            .unwrap_or(self.selected)
            .min(self.board.tasks.len().saturating_sub(1));
    }

    fn apply_feedback(&mut self, feedback: Feedback) {
        self.apply_board(feedback.board);
        if let Some(notification) = feedback.notification {
            self.notify(notification);
        }
    }

    fn apply_result(&mut self, result: Result<Feedback>) {
        match result {
            Ok(feedback) => self.apply_feedback(feedback),
            Err(err) => self.notify(Notification::error(err.to_string())),
        }
    }

    pub(crate) fn reload(&mut self) {
        match self.controller.reload() {
            Ok(board) => self.apply_board(board),
            Err(err) => self.notify(Notification::error(err.to_string())),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.board.tasks.is_empty() {
            self.selected = 0;
            return;
        }
        let max = self.board.tasks.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, max) as usize;
    }

    fn select_filter(&mut self, filter: Filter) {
        match self.controller.select_filter(filter) {
            Ok(board) => self.apply_board(board),
            Err(err) => self.notify(Notification::error(err.to_string())),
        }
    }

    fn select_sort(&mut self, sort: SortKey) {
        match self.controller.select_sort(sort) {
            Ok(board) => self.apply_board(board),
            Err(err) => self.notify(Notification::error(err.to_string())),
        }
    }

    /// Handle one key press. Returns true when the board should close.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        if self.delete_confirm.is_some() {
            self.handle_delete_key(key);
            return false;
        }

        if let Some(mut form) = self.form.take() {
            match form.handle_key(key) {
                FormAction::None => self.form = Some(form),
                FormAction::Cancel => {}
                FormAction::Submit => match self.controller.submit(form.draft()) {
                    Ok(feedback) => self.apply_feedback(feedback),
                    Err(Error::Validation(errors)) => {
                        form.apply_errors(&errors);
                        self.form = Some(form);
                    }
                    Err(err) => {
                        self.notify(Notification::error(err.to_string()));
                        self.form = Some(form);
                    }
                },
            }
            return false;
        }

        if let Some(index) = self.sort_picker.take() {
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => {
                    self.sort_picker = Some((index + 1).min(SortKey::ALL.len() - 1));
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.sort_picker = Some(index.saturating_sub(1));
                }
                KeyCode::Enter => self.select_sort(SortKey::ALL[index]),
                KeyCode::Esc | KeyCode::Char('q') => {}
                _ => self.sort_picker = Some(index),
            }
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('g') | KeyCode::Home => self.selected = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.selected = self.board.tasks.len().saturating_sub(1)
            }
            KeyCode::Char('n') | KeyCode::Char('a') => self.form = Some(TaskForm::new()),
            KeyCode::Char('1') => self.select_filter(Filter::All),
            KeyCode::Char('2') => self.select_filter(Filter::Active),
            KeyCode::Char('3') => self.select_filter(Filter::Completed),
            KeyCode::Char('s') => {
                let current = SortKey::ALL
                    .iter()
                    .position(|sort| *sort == self.sort())
                    .unwrap_or(0);
                self.sort_picker = Some(current);
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char(' ') | KeyCode::Char('c') | KeyCode::Enter => {
                let Some(id) = self.selected_task().map(|task| task.id) else {
                    self.notify(Notification::warning("no task selected"));
                    return false;
                };
                let result = self.controller.toggle(id);
                self.apply_result(result);
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let Some(id) = self.selected_task().map(|task| task.id) else {
                    self.notify(Notification::warning("no task selected"));
                    return false;
                };
                match self.controller.request_delete(id) {
                    Ok(Some(pending)) => {
                        self.delete_confirm = Some(DeleteConfirmState {
                            task_id: pending.id,
                            title: pending.title,
                            marked_at: Instant::now(),
                        });
                    }
                    Ok(None) => self.notify(Notification::warning("Task not found")),
                    Err(err) => self.notify(Notification::error(err.to_string())),
                }
            }
            _ => {}
        }
        false
    }

    fn handle_delete_key(&mut self, key: KeyEvent) {
        let prompt_visible = self.delete_prompt_visible(Instant::now());
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter if prompt_visible => {
                self.delete_confirm = None;
                let result = self.controller.confirm_delete();
                self.apply_result(result);
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                self.delete_confirm = None;
                let result = self.controller.cancel_delete();
                self.apply_result(result);
            }
            _ => {}
        }
    }
}

pub fn run(controller: Controller<FileStore>, config: UiConfig) -> Result<()> {
    let store_dir = controller.repository().store().root().to_path_buf();
    let mut app = AppState::new(controller, config)?;
    let (ui_tx, ui_rx) = mpsc::channel();
    spawn_watch(store_dir, ui_tx);
    run_terminal(&mut app, ui_rx)
}

fn run_terminal<S: Store>(app: &mut AppState<S>, ui_rx: Receiver<UiMsg>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app, ui_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop<S: Store>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState<S>,
    ui_rx: Receiver<UiMsg>,
) -> Result<()> {
    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            match msg {
                UiMsg::Reload => app.reload(),
                UiMsg::WatchError(message) => app.notify(Notification::error(message)),
            }
        }

        // Redraw every tick so notifications expire and the delete prompt appears on time.
        terminal.draw(|frame| view::render(frame, &*app))?;

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            if let Event::Key(key) = event::read()? {
                if app.handle_key(key) {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Reload when another process rewrites the store.
fn spawn_watch(store_dir: PathBuf, ui_tx: Sender<UiMsg>) {
    if !store_dir.exists() {
        return;
    }

    thread::spawn(move || {
        let (event_tx, event_rx) = mpsc::channel();
        let watcher: notify::Result<RecommendedWatcher> = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        });

        let mut watcher = match watcher {
            Ok(watcher) => watcher,
            Err(err) => {
                let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
                return;
            }
        };

        if let Err(err) = watcher.watch(&store_dir, RecursiveMode::NonRecursive) {
            let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
            return;
        }

        let debounce = Duration::from_millis(WATCH_DEBOUNCE_MS);
        let mut pending: Option<Instant> = None;

        loop {
            let timeout = pending
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(Duration::from_secs(3600));
            match event_rx.recv_timeout(timeout) {
                Ok(Ok(_)) => {
                    pending = Some(Instant::now() + debounce);
                }
                Ok(Err(err)) => {
                    let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if pending.take().is_some() && ui_tx.send(UiMsg::Reload).is_err() {
                        break;
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{NotificationKind, ViewState};
    use crate::repository::TaskRepository;
    use crate::store::MemoryStore;

    fn app() -> AppState<MemoryStore> {
        let controller = Controller::new(
            TaskRepository::new(MemoryStore::new()),
            ViewState::default(),
        );
        let config = UiConfig {
            notification_ms: 5000,
            delete_delay_ms: 0,
        };
        AppState::new(controller, config).unwrap()
    }

    fn press(app: &mut AppState<MemoryStore>, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut AppState<MemoryStore>, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn add_task(app: &mut AppState<MemoryStore>, title: &str, priority_steps: usize) {
        press(app, KeyCode::Char('n'));
        type_text(app, title);
        press(app, KeyCode::Tab);
        press(app, KeyCode::Tab);
        type_text(app, "2026-01-05");
        press(app, KeyCode::Tab);
        for _ in 0..priority_steps {
            press(app, KeyCode::Right);
        }
        press(app, KeyCode::Enter);
    }

    #[test]
    fn form_submit_adds_task_and_notifies() {
        let mut app = app();
        add_task(&mut app, "Buy milk", 2);

        assert!(app.form.is_none());
        assert_eq!(app.board().summary.total, 1);
        assert_eq!(app.board().tasks[0].priority_label, "medium");
        let note = app.current_notification(Instant::now()).unwrap();
        assert_eq!(note.message, "Task added successfully!");
    }

    #[test]
    fn invalid_form_stays_open() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);

        let form = app.form.as_ref().expect("form still open");
        assert!(form.was_validated());
        assert_eq!(app.board().summary.total, 0);
    }

    #[test]
    fn toggle_then_delete_with_confirmation() {
        let mut app = app();
        add_task(&mut app, "Buy milk", 1);

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.board().summary.completed, 1);

        press(&mut app, KeyCode::Char('d'));
        let id = app.board().tasks[0].id;
        assert!(app.is_marked_for_delete(id));
        assert!(app.delete_prompt_visible(Instant::now()));

        press(&mut app, KeyCode::Char('y'));
        assert!(app.delete_confirm.is_none());
        assert_eq!(app.board().summary.total, 0);
    }

    #[test]
    fn cancelled_delete_keeps_task() {
        let mut app = app();
        add_task(&mut app, "keep me", 1);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Esc);
        assert!(app.delete_confirm.is_none());
        assert_eq!(app.board().summary.total, 1);
        let note = app.current_notification(Instant::now()).unwrap();
        assert_eq!(note.kind, NotificationKind::Info);
    }

    #[test]
    fn filter_and_sort_keys_update_the_board() {
        let mut app = app();
        add_task(&mut app, "low", 1);
        add_task(&mut app, "high", 3);

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.sort(), SortKey::Priority);
        assert_eq!(app.board().tasks[0].title, "high");

        // Selection follows "low" to its new row.
        assert_eq!(app.selected_task().unwrap().title, "low");
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.filter(), Filter::Active);
        let titles: Vec<_> = app.board().tasks.iter().map(|t| t.title.clone()).collect();
        assert_eq!(titles, vec!["high".to_string()]);
    }

    #[test]
    fn quit_keys_close_the_board() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }
}
