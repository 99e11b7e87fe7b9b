//! Status and free-text filtering over an in-memory task list.
//!
//! The pipeline is pure: it derives a new view from the raw list and never
//! mutates it. A status filter and a search query are two independent
//! predicates applied conjunctively, preserving input order.

use crate::task::{Task, TaskStatus};

/// Derive the visible subset of `tasks` for the given status filter and
/// search query. `status` of `None` means "all". A query that is empty
/// after trimming filters nothing.
pub fn apply(tasks: &[Task], status: Option<TaskStatus>, query: &str) -> Vec<Task> {
    let query = query.trim().to_lowercase();
    tasks
        .iter()
        .filter(|task| status.map_or(true, |wanted| task.status == wanted))
        .filter(|task| query.is_empty() || matches_query(task, &query))
        .cloned()
        .collect()
}

/// Case-insensitive substring match against title, description, or any tag.
/// `query` must already be trimmed and lower-cased. A missing or empty
/// field simply doesn't match; it never fails the whole task.
pub fn matches_query(task: &Task, query: &str) -> bool {
    if let Some(title) = &task.title {
        if title.to_lowercase().contains(query) {
            return true;
        }
    }
    if task.description.to_lowercase().contains(query) {
        return true;
    }
    task.tags.iter().any(|tag| tag.to_lowercase().contains(query))
}

/// Split `text` into `(segment, emphasized)` pieces, emphasizing every
/// occurrence of `query`. Case folding here is ASCII-only so segment byte
/// offsets stay valid for the original text; this is display annotation
/// and has no effect on which tasks the pipeline keeps.
pub fn split_highlighted<'a>(text: &'a str, query: &str) -> Vec<(&'a str, bool)> {
    let query = query.trim();
    if query.is_empty() {
        return vec![(text, false)];
    }
    let haystack = text.to_ascii_lowercase();
    let needle = query.to_ascii_lowercase();

    let mut segments = Vec::new();
    let mut pos = 0;
    while let Some(found) = haystack[pos..].find(&needle) {
        let start = pos + found;
        let end = start + needle.len();
        if start > pos {
            segments.push((&text[pos..start], false));
        }
        segments.push((&text[start..end], true));
        pos = end;
    }
    if pos < text.len() {
        segments.push((&text[pos..], false));
    }
    if segments.is_empty() {
        segments.push((text, false));
    }
    segments
}
