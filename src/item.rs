//! Per-task transient view state.
//!
//! Nothing in here is persisted or shared: each task on screen gets a small
//! flags record keyed by its id, tracking in-flight mutations, the expanded
//! details panel, and the two-step delete confirmation.

use std::collections::HashMap;

use crate::task::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemPhase {
    #[default]
    Idle,
    /// Status transition in flight.
    Updating,
    /// Delete in flight.
    Deleting,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ItemState {
    pub phase: ItemPhase,
    pub details_expanded: bool,
    pub delete_confirm_pending: bool,
}

/// Outcome of asking to delete a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDecision {
    /// First press: arm the confirmation, issue nothing.
    ConfirmFirst,
    /// Confirmed: the delete request may be sent now.
    Issue,
    /// A mutation is already in flight for this item.
    Busy,
}

impl ItemState {
    /// A status advance is allowed only for an idle item that isn't done.
    pub fn can_advance(&self, status: TaskStatus) -> bool {
        self.phase == ItemPhase::Idle && status != TaskStatus::Done
    }

    /// Gate and start a status advance. Returns the status to request,
    /// or `None` when the item is done or already busy.
    pub fn begin_advance(&mut self, status: TaskStatus) -> Option<TaskStatus> {
        if !self.can_advance(status) {
            return None;
        }
        let next = status.next()?;
        self.phase = ItemPhase::Updating;
        Some(next)
    }

    /// Two-step delete: the first call arms the confirmation, the second
    /// actually allows the request.
    pub fn request_delete(&mut self) -> DeleteDecision {
        if self.phase != ItemPhase::Idle {
            return DeleteDecision::Busy;
        }
        if !self.delete_confirm_pending {
            self.delete_confirm_pending = true;
            return DeleteDecision::ConfirmFirst;
        }
        self.delete_confirm_pending = false;
        self.phase = ItemPhase::Deleting;
        DeleteDecision::Issue
    }

    pub fn cancel_delete(&mut self) {
        self.delete_confirm_pending = false;
    }

    pub fn toggle_details(&mut self) {
        self.details_expanded = !self.details_expanded;
    }

    /// Return to idle after a mutation completes or fails.
    pub fn settle(&mut self) {
        self.phase = ItemPhase::Idle;
    }
}

/// View state for every task currently known, keyed by task id.
#[derive(Debug, Default)]
pub struct ItemStates {
    by_id: HashMap<u64, ItemState>,
}

impl ItemStates {
    pub fn get(&self, id: u64) -> ItemState {
        self.by_id.get(&id).copied().unwrap_or_default()
    }

    pub fn entry(&mut self, id: u64) -> &mut ItemState {
        self.by_id.entry(id).or_default()
    }

    /// Drop state for ids no longer present in the latest snapshot.
    pub fn retain_known(&mut self, tasks: &[Task]) {
        self.by_id.retain(|id, _| tasks.iter().any(|t| t.id == *id));
    }

    /// Disarm any pending delete confirmation, e.g. when the selection moves.
    pub fn cancel_all_confirms(&mut self) {
        for state in self.by_id.values_mut() {
            state.delete_confirm_pending = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_requires_confirmation_before_issuing() {
        let mut state = ItemState::default();
        assert_eq!(state.request_delete(), DeleteDecision::ConfirmFirst);
        assert_eq!(state.phase, ItemPhase::Idle);
        assert_eq!(state.request_delete(), DeleteDecision::Issue);
        assert_eq!(state.phase, ItemPhase::Deleting);
    }

    #[test]
    fn cancel_disarms_the_confirmation() {
        let mut state = ItemState::default();
        assert_eq!(state.request_delete(), DeleteDecision::ConfirmFirst);
        state.cancel_delete();
        assert_eq!(state.request_delete(), DeleteDecision::ConfirmFirst);
    }

    #[test]
    fn delete_is_busy_while_a_mutation_is_in_flight() {
        let mut state = ItemState::default();
        state.begin_advance(TaskStatus::Todo).unwrap();
        assert_eq!(state.request_delete(), DeleteDecision::Busy);
    }

    #[test]
    fn advance_walks_the_lifecycle_and_stops_at_done() {
        let mut state = ItemState::default();
        assert_eq!(
            state.begin_advance(TaskStatus::Todo),
            Some(TaskStatus::InProgress)
        );
        state.settle();
        assert_eq!(
            state.begin_advance(TaskStatus::InProgress),
            Some(TaskStatus::Done)
        );
        state.settle();
        assert_eq!(state.begin_advance(TaskStatus::Done), None);
    }

    #[test]
    fn advance_is_a_noop_while_updating() {
        let mut state = ItemState::default();
        state.begin_advance(TaskStatus::Todo).unwrap();
        assert_eq!(state.begin_advance(TaskStatus::Todo), None);
    }

    #[test]
    fn failure_settles_back_to_idle() {
        let mut state = ItemState::default();
        state.request_delete();
        state.request_delete();
        assert_eq!(state.phase, ItemPhase::Deleting);
        state.settle();
        assert_eq!(state.phase, ItemPhase::Idle);
        assert!(!state.delete_confirm_pending);
    }

    #[test]
    fn retain_known_prunes_stale_ids() {
        let mut states = ItemStates::default();
        states.entry(1).details_expanded = true;
        states.entry(2).details_expanded = true;
        let tasks: Vec<crate::task::Task> =
            serde_json::from_str(r#"[{"id": 1, "description": "x", "status": "todo"}]"#).unwrap();
        states.retain_known(&tasks);
        assert!(states.get(1).details_expanded);
        assert!(!states.get(2).details_expanded);
    }
}
