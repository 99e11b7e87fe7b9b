//! Application state and event loop.
//!
//! One tokio task owns all state. Keyboard input arrives from a blocking
//! reader thread and network results from spawned request tasks, all over a
//! single mpsc channel, so every state change is applied sequentially.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::filter;
use crate::item::{DeleteDecision, ItemStates};
use crate::list::TaskList;
use crate::profile::{Profile, ProfileField, ProfileForm};
use crate::task::{Task, TaskStatus};
use crate::ui;

/// Everything the event loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    TasksLoaded {
        generation: u64,
        result: Result<Vec<Task>, String>,
    },
    TaskCreated {
        result: Result<Task, String>,
    },
    StatusUpdated {
        id: u64,
        result: Result<Task, String>,
    },
    TaskDeleted {
        id: u64,
        result: Result<(), String>,
    },
    ProfileLoaded {
        result: Result<Profile, String>,
    },
    ProfileSaved {
        result: Result<Profile, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Tasks,
    Notifications,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing a new task description.
    NewTask,
    /// Typing into the search box.
    Search,
    /// The profile modal is open.
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStyle {
    Success,
    Error,
}

/// Status filter cycle order shown in the filter row; `None` is "all".
pub const FILTERS: [Option<TaskStatus>; 4] = [
    None,
    Some(TaskStatus::Todo),
    Some(TaskStatus::InProgress),
    Some(TaskStatus::Done),
];

pub struct App {
    api: Arc<ApiClient>,
    tx: UnboundedSender<AppEvent>,
    pub list: TaskList,
    pub items: ItemStates,
    pub status_filter: Option<TaskStatus>,
    pub search: String,
    pub tab: Tab,
    pub mode: InputMode,
    pub selected: usize,
    pub new_task_input: String,
    pub profile: ProfileForm,
    pub toast: Option<(String, ToastStyle)>,
    pub should_quit: bool,
}

impl App {
    pub fn new(api: Arc<ApiClient>, tx: UnboundedSender<AppEvent>) -> Self {
        Self {
            api,
            tx,
            list: TaskList::new(),
            items: ItemStates::default(),
            status_filter: None,
            search: String::new(),
            tab: Tab::Tasks,
            mode: InputMode::Normal,
            selected: 0,
            new_task_input: String::new(),
            profile: ProfileForm::default(),
            toast: None,
            should_quit: false,
        }
    }

    /// The derived view: recomputed from the raw snapshot on demand, so a
    /// filter or query change never touches the network.
    pub fn visible_tasks(&self) -> Vec<Task> {
        filter::apply(self.list.tasks(), self.status_filter, &self.search)
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::TasksLoaded { generation, result } => {
                let applied = self.list.complete_fetch(generation, result);
                if !applied {
                    tracing::debug!(generation, "dropping stale task list response");
                    return;
                }
                self.items.retain_known(self.list.tasks());
                self.clamp_selection();
            }
            AppEvent::TaskCreated { result } => match result {
                Ok(task) => {
                    tracing::info!(id = task.id, "task created");
                    self.toast = Some(("Task added".to_string(), ToastStyle::Success));
                    // Match the page behavior: jump to the todo filter so
                    // the new task is in view.
                    self.status_filter = Some(TaskStatus::Todo);
                    self.spawn_list_fetch();
                }
                Err(message) => {
                    tracing::warn!(%message, "create failed");
                    self.toast = Some((format!("Failed to add task: {message}"), ToastStyle::Error));
                }
            },
            AppEvent::StatusUpdated { id, result } => {
                self.items.entry(id).settle();
                match result {
                    Ok(task) => {
                        tracing::info!(id, status = task.status.as_str(), "status updated");
                        self.spawn_list_fetch();
                    }
                    Err(message) => {
                        tracing::warn!(id, %message, "status update failed");
                        self.toast =
                            Some((format!("Failed to update task: {message}"), ToastStyle::Error));
                    }
                }
            }
            AppEvent::TaskDeleted { id, result } => {
                self.items.entry(id).settle();
                match result {
                    Ok(()) => {
                        tracing::info!(id, "task deleted");
                        self.toast = Some(("Task deleted".to_string(), ToastStyle::Success));
                        self.spawn_list_fetch();
                    }
                    Err(message) => {
                        tracing::warn!(id, %message, "delete failed");
                        self.toast =
                            Some((format!("Failed to delete task: {message}"), ToastStyle::Error));
                    }
                }
            }
            AppEvent::ProfileLoaded { result } => match result {
                // Only prefill while the modal is open and untouched.
                Ok(profile) => {
                    if self.mode == InputMode::Profile
                        && self.profile.name.is_empty()
                        && self.profile.phone.is_empty()
                    {
                        self.profile.load(&profile);
                    }
                }
                Err(message) => tracing::debug!(%message, "no stored profile"),
            },
            AppEvent::ProfileSaved { result } => {
                self.profile.submitting = false;
                match result {
                    Ok(_) => {
                        self.profile.saved = true;
                        self.profile.submit_error = None;
                        tracing::info!("profile saved");
                    }
                    Err(message) => {
                        tracing::warn!(%message, "profile save failed");
                        self.profile.submit_error =
                            Some(format!("Failed to save profile: {message}"));
                    }
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.toast = None;
        match self.mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::NewTask => self.handle_new_task_key(key),
            InputMode::Search => self.handle_search_key(key),
            InputMode::Profile => self.handle_profile_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => {
                self.tab = match self.tab {
                    Tab::Tasks => Tab::Notifications,
                    Tab::Notifications => Tab::Tasks,
                };
            }
            KeyCode::Char('p') => self.open_profile(),
            _ if self.tab != Tab::Tasks => {}
            KeyCode::Char('a') => {
                self.new_task_input.clear();
                self.mode = InputMode::NewTask;
            }
            KeyCode::Char('/') => self.mode = InputMode::Search,
            KeyCode::Char('r') => self.spawn_list_fetch(),
            KeyCode::Left => self.cycle_filter(-1),
            KeyCode::Right => self.cycle_filter(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Enter | KeyCode::Char('n') => self.advance_selected(),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char(' ') | KeyCode::Char('e') => self.toggle_selected_details(),
            KeyCode::Esc => {
                // First escape backs out of a pending confirm, a second
                // clears the search query.
                if let Some(task) = self.selected_task() {
                    let state = self.items.entry(task.id);
                    if state.delete_confirm_pending {
                        state.cancel_delete();
                        return;
                    }
                }
                self.search.clear();
                self.clamp_selection();
            }
            _ => {}
        }
    }

    fn handle_new_task_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let description = self.new_task_input.trim().to_string();
                if description.is_empty() {
                    return;
                }
                self.new_task_input.clear();
                self.mode = InputMode::Normal;
                let api = self.api.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api
                        .create_task(&description)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx.send(AppEvent::TaskCreated { result });
                });
            }
            KeyCode::Esc => {
                self.new_task_input.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.new_task_input.pop();
            }
            KeyCode::Char(c) => self.new_task_input.push(c),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.mode = InputMode::Normal,
            KeyCode::Esc => {
                self.search.clear();
                self.mode = InputMode::Normal;
                self.clamp_selection();
            }
            KeyCode::Backspace => {
                self.search.pop();
                self.clamp_selection();
            }
            KeyCode::Char(c) => {
                self.search.push(c);
                self.clamp_selection();
            }
            _ => {}
        }
    }

    fn handle_profile_key(&mut self, key: KeyEvent) {
        if self.profile.submitting {
            return;
        }
        match key.code {
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Tab | KeyCode::Down => self.profile.next_field(),
            KeyCode::Enter => {
                // Validation failures stay local: field messages are set
                // and nothing goes out.
                let Ok(submission) = self.profile.try_submission() else {
                    return;
                };
                self.profile.submitting = true;
                self.profile.saved = false;
                self.profile.submit_error = None;
                let api = self.api.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api
                        .save_profile(&submission)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx.send(AppEvent::ProfileSaved { result });
                });
            }
            KeyCode::Left if self.profile.field == ProfileField::Country => {
                self.profile.cycle_country(-1)
            }
            KeyCode::Right if self.profile.field == ProfileField::Country => {
                self.profile.cycle_country(1)
            }
            KeyCode::Backspace => self.profile.backspace(),
            KeyCode::Char(c) => self.profile.push_char(c),
            _ => {}
        }
    }

    fn open_profile(&mut self) {
        self.mode = InputMode::Profile;
        self.profile = ProfileForm::default();
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.get_profile().await.map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::ProfileLoaded { result });
        });
    }

    fn cycle_filter(&mut self, delta: isize) {
        let current = FILTERS
            .iter()
            .position(|f| *f == self.status_filter)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(FILTERS.len() as isize) as usize;
        self.status_filter = FILTERS[next];
        self.items.cancel_all_confirms();
        self.clamp_selection();
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible_tasks().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, len as isize - 1) as usize;
        self.items.cancel_all_confirms();
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn selected_task(&self) -> Option<Task> {
        self.visible_tasks().get(self.selected).cloned()
    }

    fn advance_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let Some(next) = self.items.entry(task.id).begin_advance(task.status) else {
            return;
        };
        tracing::info!(id = task.id, next = next.as_str(), "requesting status advance");
        let api = self.api.clone();
        let tx = self.tx.clone();
        let id = task.id;
        tokio::spawn(async move {
            let result = api.update_status(id, next).await.map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::StatusUpdated { id, result });
        });
    }

    fn delete_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        match self.items.entry(task.id).request_delete() {
            DeleteDecision::ConfirmFirst | DeleteDecision::Busy => {}
            DeleteDecision::Issue => {
                tracing::info!(id = task.id, "requesting delete");
                let api = self.api.clone();
                let tx = self.tx.clone();
                let id = task.id;
                tokio::spawn(async move {
                    let result = api.delete_task(id).await.map_err(|e| e.to_string());
                    let _ = tx.send(AppEvent::TaskDeleted { id, result });
                });
            }
        }
    }

    fn toggle_selected_details(&mut self) {
        if let Some(task) = self.selected_task() {
            self.items.entry(task.id).toggle_details();
        }
    }

    /// Kick off a list fetch tagged with the orchestrator's generation.
    pub fn spawn_list_fetch(&mut self) {
        let generation = self.list.begin_fetch();
        tracing::debug!(generation, "fetching task list");
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.list_tasks().await.map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::TasksLoaded { generation, result });
        });
    }
}

/// Blocking keyboard reader feeding the event channel; exits once the
/// receiver side goes away.
fn spawn_input_reader(tx: UnboundedSender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(Duration::from_millis(200)) {
            Ok(true) => {
                if let Ok(Event::Key(key)) = event::read() {
                    if key.kind == KeyEventKind::Press && tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
            }
            Ok(false) => {
                if tx.is_closed() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

pub async fn run<B: Backend>(terminal: &mut Terminal<B>, config: &AppConfig) -> crate::error::Result<()> {
    let api = Arc::new(ApiClient::new(config)?);
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_input_reader(tx.clone());

    let mut app = App::new(api, tx);
    app.spawn_list_fetch();

    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, &app))?;
        let Some(event) = rx.recv().await else { break };
        app.handle_event(event);
        // Apply anything else already queued before paying for a redraw.
        while let Ok(event) = rx.try_recv() {
            app.handle_event(event);
            if app.should_quit {
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Args;
    use clap::Parser;
    use crossterm::event::KeyModifiers;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn test_app() -> (App, UnboundedReceiver<AppEvent>) {
        let args = Args::parse_from(["taskdeck", "--api-url", "http://localhost:1"]);
        let api = Arc::new(ApiClient::new(&AppConfig::from_args(args)).unwrap());
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(api, tx), rx)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn loaded(generation: u64, ids: &[u64]) -> AppEvent {
        let tasks = ids
            .iter()
            .map(|id| {
                serde_json::from_str(&format!(
                    r#"{{"id": {id}, "description": "t{id}", "status": "todo"}}"#
                ))
                .unwrap()
            })
            .collect();
        AppEvent::TasksLoaded {
            generation,
            result: Ok(tasks),
        }
    }

    #[tokio::test]
    async fn filter_cycles_through_all_statuses_and_wraps() {
        let (mut app, _rx) = test_app();
        assert_eq!(app.status_filter, None);
        app.handle_event(key(KeyCode::Right));
        assert_eq!(app.status_filter, Some(TaskStatus::Todo));
        app.handle_event(key(KeyCode::Right));
        assert_eq!(app.status_filter, Some(TaskStatus::InProgress));
        app.handle_event(key(KeyCode::Right));
        assert_eq!(app.status_filter, Some(TaskStatus::Done));
        app.handle_event(key(KeyCode::Right));
        assert_eq!(app.status_filter, None);
        app.handle_event(key(KeyCode::Left));
        assert_eq!(app.status_filter, Some(TaskStatus::Done));
    }

    #[tokio::test]
    async fn selection_clamps_when_the_view_shrinks() {
        let (mut app, _rx) = test_app();
        let generation = app.list.begin_fetch();
        app.handle_event(loaded(generation, &[1, 2, 3]));
        app.handle_event(key(KeyCode::Down));
        app.handle_event(key(KeyCode::Down));
        assert_eq!(app.selected, 2);

        let generation = app.list.begin_fetch();
        app.handle_event(loaded(generation, &[1]));
        assert_eq!(app.selected, 0);
    }

    #[tokio::test]
    async fn stale_list_response_is_ignored() {
        let (mut app, _rx) = test_app();
        let stale = app.list.begin_fetch();
        let fresh = app.list.begin_fetch();
        app.handle_event(loaded(fresh, &[42]));
        app.handle_event(loaded(stale, &[1, 2, 3]));
        assert_eq!(app.list.tasks().len(), 1);
        assert_eq!(app.list.tasks()[0].id, 42);
    }

    #[tokio::test]
    async fn successful_create_switches_filter_to_todo_and_refreshes() {
        let (mut app, mut rx) = test_app();
        let task = serde_json::from_str(
            r#"{"id": 5, "description": "new one", "status": "todo"}"#,
        )
        .unwrap();
        app.handle_event(AppEvent::TaskCreated { result: Ok(task) });
        assert_eq!(app.status_filter, Some(TaskStatus::Todo));
        assert!(matches!(app.toast, Some((_, ToastStyle::Success))));
        // The refresh fetch reports back on the channel eventually; the
        // important part here is the orchestrator went into a fetch.
        assert!(app.list.is_fetching());
        rx.close();
    }

    #[tokio::test]
    async fn mutation_failure_surfaces_a_toast_and_settles_the_item() {
        let (mut app, _rx) = test_app();
        let generation = app.list.begin_fetch();
        app.handle_event(loaded(generation, &[1]));
        app.items.entry(1).begin_advance(TaskStatus::Todo).unwrap();

        app.handle_event(AppEvent::StatusUpdated {
            id: 1,
            result: Err("connection refused".to_string()),
        });
        assert_eq!(app.items.get(1).phase, crate::item::ItemPhase::Idle);
        assert!(matches!(app.toast, Some((_, ToastStyle::Error))));
    }

    #[tokio::test]
    async fn delete_key_arms_confirmation_without_issuing() {
        let (mut app, mut rx) = test_app();
        let generation = app.list.begin_fetch();
        app.handle_event(loaded(generation, &[1]));

        // First press only arms the confirmation; the item never enters
        // the deleting phase.
        app.handle_event(key(KeyCode::Char('d')));
        assert!(app.items.get(1).delete_confirm_pending);
        assert_eq!(app.items.get(1).phase, crate::item::ItemPhase::Idle);

        app.handle_event(key(KeyCode::Esc));
        assert!(!app.items.get(1).delete_confirm_pending);
        rx.close();
    }

    #[tokio::test]
    async fn search_typing_narrows_the_view_without_a_fetch() {
        let (mut app, _rx) = test_app();
        let generation = app.list.begin_fetch();
        app.handle_event(loaded(generation, &[1, 2]));
        assert_eq!(app.visible_tasks().len(), 2);

        app.handle_event(key(KeyCode::Char('/')));
        for c in "t2".chars() {
            app.handle_event(key(KeyCode::Char(c)));
        }
        assert_eq!(app.visible_tasks().len(), 1);
        assert_eq!(app.visible_tasks()[0].id, 2);
        // Still loaded: narrowing the query never re-entered loading.
        assert!(!app.list.is_fetching());
    }
}
