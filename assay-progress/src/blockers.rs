//! Blocker classification and analysis.
//!
//! One classification function decides what counts as blocked; it is consumed
//! by both `identify_blockers` and the status-transition guard so the rule
//! cannot drift between call sites. Dependency blockers are derived
//! deterministically from unmet dependency edges; the other kinds come from
//! the metadata recorded when the todo entered `Blocked`.

use assay_core::{
    AssayResult, BlockedInfo, BlockerKind, TaskId, Timestamp, TodoId, TodoItemRecord, TodoStatus,
};
use assay_storage::TodoStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot index of todo statuses within one task, used for dependency
/// resolution.
pub type StatusIndex = HashMap<TodoId, TodoStatus>;

/// Build a status index from a task's todo items.
pub fn status_index(todos: &[TodoItemRecord]) -> StatusIndex {
    todos.iter().map(|t| (t.todo_id, t.status)).collect()
}

/// Dependencies of `todo` that are not yet completed. A dependency missing
/// from the index counts as unmet.
pub fn unmet_dependencies(todo: &TodoItemRecord, index: &StatusIndex) -> Vec<TodoId> {
    todo.dependencies
        .iter()
        .filter(|dep| index.get(dep) != Some(&TodoStatus::Completed))
        .copied()
        .collect()
}

/// One blocked (or blockable) todo in a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockerEntry {
    pub todo_id: TodoId,
    pub title: String,
    pub kind: BlockerKind,
    pub reason: String,
    pub blocking_since: Option<Timestamp>,
    pub unmet_dependencies: Vec<TodoId>,
    /// True when the blocking condition has lifted since the todo entered
    /// `Blocked` (dependency completed, resource freed); the todo is
    /// eligible to resume.
    pub cleared: bool,
}

/// Classification of one todo against the current task snapshot.
///
/// Returns `None` for todos that are neither blocked nor blockable. The
/// dependency rule is deterministic: any unmet dependency edge classifies the
/// todo as dependency-blocked regardless of recorded metadata.
pub fn classify_blocker(todo: &TodoItemRecord, index: &StatusIndex) -> Option<BlockerEntry> {
    let unmet = unmet_dependencies(todo, index);

    if !unmet.is_empty() && todo.status != TodoStatus::Completed {
        return Some(BlockerEntry {
            todo_id: todo.todo_id,
            title: todo.title.clone(),
            kind: BlockerKind::Dependency,
            reason: format!("{} unmet dependencies", unmet.len()),
            blocking_since: todo.blocked.as_ref().map(|b| b.blocked_at),
            unmet_dependencies: unmet,
            cleared: false,
        });
    }

    if todo.status == TodoStatus::Blocked {
        let (kind, reason) = match &todo.blocked {
            Some(info) => (info.kind, info.reason.clone()),
            None => (BlockerKind::Technical, "unspecified".to_string()),
        };
        return Some(BlockerEntry {
            todo_id: todo.todo_id,
            title: todo.title.clone(),
            kind,
            reason,
            blocking_since: todo.blocked.as_ref().map(|b| b.blocked_at),
            unmet_dependencies: Vec::new(),
            // All dependencies are met (checked above); a dependency-blocked
            // todo with no remaining unmet edges has cleared. Other kinds
            // clear when their recorded condition lifts, which the metadata
            // cannot show, so they stay uncleared until resumed explicitly.
            cleared: kind == BlockerKind::Dependency,
        });
    }

    None
}

/// Analysis of every blocker in a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockerAnalysis {
    pub task_id: TaskId,
    pub blockers: Vec<BlockerEntry>,
    pub dependency_blockers: usize,
    pub resource_blockers: usize,
    pub approval_blockers: usize,
    pub technical_blockers: usize,
    pub external_blockers: usize,
    /// Mean hours spent blocked, over entries with a known blocking start.
    pub average_blocking_hours: f64,
    pub analyzed_at: Timestamp,
}

/// Identify blockers for a task and auto-flip pending todos with unmet
/// dependencies to `Blocked` (recording dependency metadata), so the stored
/// state reflects the analysis.
///
/// Clearance is re-evaluated on every run: a dependency-blocked todo whose
/// dependencies have since completed is reported with `cleared: true`.
pub async fn identify_blockers(
    store: &dyn TodoStore,
    task_id: TaskId,
) -> AssayResult<BlockerAnalysis> {
    let todos = store.todo_list_by_task(task_id).await?;
    let index = status_index(&todos);
    let now = chrono::Utc::now();

    let mut blockers = Vec::new();
    for todo in &todos {
        let Some(entry) = classify_blocker(todo, &index) else {
            continue;
        };

        // Flip pending todos with unmet dependencies into Blocked so the
        // stored status matches what the analysis reports.
        if todo.status == TodoStatus::Pending && entry.kind == BlockerKind::Dependency {
            let flipped = store
                .todo_update_status(
                    todo.todo_id,
                    TodoStatus::Blocked,
                    Some(BlockedInfo {
                        kind: BlockerKind::Dependency,
                        reason: entry.reason.clone(),
                        blocked_at: now,
                    }),
                    Some("auto-blocked by blocker analysis".to_string()),
                )
                .await?;
            tracing::info!(todo_id = %flipped.todo_id, "pending todo auto-flipped to blocked");
            blockers.push(BlockerEntry {
                blocking_since: Some(now),
                ..entry
            });
        } else {
            blockers.push(entry);
        }
    }

    let count = |kind: BlockerKind| blockers.iter().filter(|b| b.kind == kind).count();
    let durations: Vec<f64> = blockers
        .iter()
        .filter_map(|b| b.blocking_since)
        .map(|since| (now - since).num_seconds().max(0) as f64 / 3600.0)
        .collect();
    let average_blocking_hours = if durations.is_empty() {
        0.0
    } else {
        durations.iter().sum::<f64>() / durations.len() as f64
    };

    Ok(BlockerAnalysis {
        task_id,
        dependency_blockers: count(BlockerKind::Dependency),
        resource_blockers: count(BlockerKind::Resource),
        approval_blockers: count(BlockerKind::Approval),
        technical_blockers: count(BlockerKind::Technical),
        external_blockers: count(BlockerKind::External),
        average_blocking_hours,
        blockers,
        analyzed_at: now,
    })
}

// ============================================================================
// TESTS
// ============================================================================
