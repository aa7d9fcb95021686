//! Progress aggregation and time-ranged reporting.

use assay_core::{
    AssayError, AssayResult, ProgressSummary, TaskId, Timestamp, TodoId, TodoItemRecord,
    TodoStatus, ValidationError,
};
use assay_storage::{TimeRange, TodoStore};
use serde::{Deserialize, Serialize};

/// Maximum report window, in days.
pub const MAX_REPORT_RANGE_DAYS: i64 = 365;

/// Completion percentages treated as milestones.
pub const MILESTONES: [f64; 4] = [25.0, 50.0, 75.0, 100.0];

/// Aggregate the current todo state of a task. Pure read: no mutation, and
/// two calls with no intervening state change return identical summaries.
pub async fn track_progress(store: &dyn TodoStore, task_id: TaskId) -> AssayResult<ProgressSummary> {
    let todos = store.todo_list_by_task(task_id).await?;
    Ok(summarize(task_id, &todos))
}

/// Pure aggregation over a todo snapshot.
pub fn summarize(task_id: TaskId, todos: &[TodoItemRecord]) -> ProgressSummary {
    let count = |status: TodoStatus| todos.iter().filter(|t| t.status == status).count();
    let total = todos.len();
    let completed = count(TodoStatus::Completed);
    ProgressSummary {
        task_id,
        total_todos: total,
        pending: count(TodoStatus::Pending),
        in_progress: count(TodoStatus::InProgress),
        blocked: count(TodoStatus::Blocked),
        completed,
        completion_percentage: if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        },
    }
}

/// Milestones crossed by moving from `before` to `after` percent complete.
/// A crossing is `before < m <= after`; reverts (after < before) cross
/// nothing.
pub fn milestones_crossed(before: f64, after: f64) -> Vec<f64> {
    MILESTONES
        .iter()
        .copied()
        .filter(|m| before < *m && *m <= after)
        .collect()
}

/// A todo item past its due date and not completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayedTodo {
    pub todo_id: TodoId,
    pub title: String,
    pub due_date: Timestamp,
    pub hours_overdue: f64,
}

/// Scheduled-sweep helper: todos whose due date has passed without
/// completion, most overdue first.
pub fn detect_delays(todos: &[TodoItemRecord], now: Timestamp) -> Vec<DelayedTodo> {
    let mut delayed: Vec<DelayedTodo> = todos
        .iter()
        .filter(|t| t.status != TodoStatus::Completed)
        .filter_map(|t| {
            let due = t.due_date?;
            (due < now).then(|| DelayedTodo {
                todo_id: t.todo_id,
                title: t.title.clone(),
                due_date: due,
                hours_overdue: (now - due).num_seconds() as f64 / 3600.0,
            })
        })
        .collect();
    delayed.sort_by(|a, b| b.hours_overdue.total_cmp(&a.hours_overdue));
    delayed
}

/// Caller-supplied report window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRange {
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

impl ReportRange {
    /// Caller-facing validation: the window must be forward and at most
    /// [`MAX_REPORT_RANGE_DAYS`] long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start_date >= self.end_date {
            return Err(ValidationError::InvalidDateRange {
                reason: "start_date must be before end_date".to_string(),
            });
        }
        if self.end_date - self.start_date > chrono::Duration::days(MAX_REPORT_RANGE_DAYS) {
            return Err(ValidationError::InvalidDateRange {
                reason: format!("range exceeds {MAX_REPORT_RANGE_DAYS} days"),
            });
        }
        Ok(())
    }
}

/// One completed item within a report window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedItem {
    pub todo_id: TodoId,
    pub title: String,
    pub completed_at: Timestamp,
}

/// One item that entered `Blocked` within a report window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedItem {
    pub todo_id: TodoId,
    pub title: String,
    pub entered_blocked_at: Timestamp,
}

/// Time-ranged progress report over a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub task_id: TaskId,
    pub range: ReportRange,
    pub completed_items: Vec<CompletedItem>,
    pub blocked_items: Vec<BlockedItem>,
    /// Same shape as the live summary, with completion scoped to the period:
    /// `completed` counts completions observed inside the window while the
    /// other status counts reflect the current snapshot.
    pub summary: ProgressSummary,
}

/// Build a progress report restricted to status changes observed within
/// `[start_date, end_date)`.
///
/// # Errors
/// `ValidationError::InvalidDateRange` for an empty/backwards window or one
/// longer than a year.
pub async fn generate_progress_report(
    store: &dyn TodoStore,
    task_id: TaskId,
    range: ReportRange,
) -> AssayResult<ProgressReport> {
    range.validate().map_err(AssayError::Validation)?;

    let todos = store.todo_list_by_task(task_id).await?;
    let changes = store
        .todo_status_changes(
            task_id,
            Some(TimeRange {
                start: range.start_date,
                end: range.end_date,
            }),
        )
        .await?;

    let title_of = |id: TodoId| {
        todos
            .iter()
            .find(|t| t.todo_id == id)
            .map(|t| t.title.clone())
            .unwrap_or_default()
    };

    let mut completed_items = Vec::new();
    let mut blocked_items = Vec::new();
    for change in &changes {
        match change.to {
            TodoStatus::Completed => completed_items.push(CompletedItem {
                todo_id: change.todo_id,
                title: title_of(change.todo_id),
                completed_at: change.changed_at,
            }),
            TodoStatus::Blocked => blocked_items.push(BlockedItem {
                todo_id: change.todo_id,
                title: title_of(change.todo_id),
                entered_blocked_at: change.changed_at,
            }),
            _ => {}
        }
    }

    let mut summary = summarize(task_id, &todos);
    summary.completed = completed_items.len();
    summary.completion_percentage = if summary.total_todos == 0 {
        0.0
    } else {
        summary.completed as f64 / summary.total_todos as f64 * 100.0
    };

    tracing::debug!(
        %task_id,
        completed = completed_items.len(),
        blocked = blocked_items.len(),
        "progress report generated"
    );

    Ok(ProgressReport {
        task_id,
        range,
        completed_items,
        blocked_items,
        summary,
    })
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
