//! Fetch lifecycle for the task list.
//!
//! The orchestrator owns the raw snapshot and a small state machine:
//! `loading -> {loaded, error}`, `loaded -> refreshing -> {loaded, error}`.
//! Error is recoverable by retrying, which re-enters loading. Every fetch
//! gets a generation number; a completion for anything but the latest
//! generation is stale and must be dropped.

use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    /// Initial load, or a retry after an error. No usable snapshot yet.
    Loading,
    /// A re-fetch while the previous snapshot stays on screen.
    Refreshing,
    Loaded,
    Error(String),
}

#[derive(Debug)]
pub struct TaskList {
    tasks: Vec<Task>,
    phase: LoadPhase,
    generation: u64,
}

impl TaskList {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            phase: LoadPhase::Loading,
            generation: 0,
        }
    }

    /// Start a fetch and return its generation. Called on startup, on
    /// explicit refresh/retry, and after a successful mutation. A fetch
    /// begun while another is in flight supersedes it.
    pub fn begin_fetch(&mut self) -> u64 {
        self.phase = match self.phase {
            LoadPhase::Loaded | LoadPhase::Refreshing => LoadPhase::Refreshing,
            LoadPhase::Loading | LoadPhase::Error(_) => LoadPhase::Loading,
        };
        self.generation += 1;
        self.generation
    }

    /// Apply a fetch result. Returns false (and changes nothing) when the
    /// result belongs to a superseded fetch.
    pub fn complete_fetch(
        &mut self,
        generation: u64,
        result: Result<Vec<Task>, String>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        match result {
            Ok(tasks) => {
                self.tasks = tasks;
                self.phase = LoadPhase::Loaded;
            }
            Err(message) => self.phase = LoadPhase::Error(message),
        }
        true
    }

    /// The raw snapshot; the filter pipeline derives views from this.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.phase, LoadPhase::Loading | LoadPhase::Refreshing)
    }
}

impl Default for TaskList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks(ids: &[u64]) -> Vec<Task> {
        ids.iter()
            .map(|id| {
                serde_json::from_str(&format!(
                    r#"{{"id": {id}, "description": "t{id}", "status": "todo"}}"#
                ))
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn starts_loading_then_loads() {
        let mut list = TaskList::new();
        assert_eq!(*list.phase(), LoadPhase::Loading);
        let generation = list.begin_fetch();
        assert!(list.complete_fetch(generation, Ok(tasks(&[1, 2]))));
        assert_eq!(*list.phase(), LoadPhase::Loaded);
        assert_eq!(list.tasks().len(), 2);
    }

    #[test]
    fn error_is_recoverable_via_retry() {
        let mut list = TaskList::new();
        let generation = list.begin_fetch();
        list.complete_fetch(generation, Err("connection refused".to_string()));
        assert_eq!(
            *list.phase(),
            LoadPhase::Error("connection refused".to_string())
        );

        let generation = list.begin_fetch();
        assert_eq!(*list.phase(), LoadPhase::Loading);
        list.complete_fetch(generation, Ok(tasks(&[3])));
        assert_eq!(*list.phase(), LoadPhase::Loaded);
    }

    #[test]
    fn refresh_keeps_the_previous_snapshot_visible() {
        let mut list = TaskList::new();
        let generation = list.begin_fetch();
        list.complete_fetch(generation, Ok(tasks(&[1])));

        list.begin_fetch();
        assert_eq!(*list.phase(), LoadPhase::Refreshing);
        assert_eq!(list.tasks().len(), 1);
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut list = TaskList::new();
        let first = list.begin_fetch();
        let second = list.begin_fetch();

        assert!(!list.complete_fetch(first, Ok(tasks(&[1]))));
        assert!(list.tasks().is_empty());
        assert!(list.is_fetching());

        assert!(list.complete_fetch(second, Ok(tasks(&[2]))));
        assert_eq!(list.tasks()[0].id, 2);
    }

    #[test]
    fn stale_error_does_not_clobber_a_newer_fetch() {
        let mut list = TaskList::new();
        let first = list.begin_fetch();
        let second = list.begin_fetch();
        assert!(!list.complete_fetch(first, Err("timed out".to_string())));
        assert!(list.complete_fetch(second, Ok(tasks(&[1]))));
        assert_eq!(*list.phase(), LoadPhase::Loaded);
    }

    #[test]
    fn failed_refresh_reports_error() {
        let mut list = TaskList::new();
        let generation = list.begin_fetch();
        list.complete_fetch(generation, Ok(tasks(&[1])));
        let generation = list.begin_fetch();
        list.complete_fetch(generation, Err("boom".to_string()));
        assert_eq!(*list.phase(), LoadPhase::Error("boom".to_string()));
    }
}
