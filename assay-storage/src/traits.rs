//! Async storage traits for ASSAY entities.
//!
//! All I/O in the workspace flows through these seams so the scoring,
//! aggregation, and dispatch logic stays pure and testable. Implementations
//! must be safe for concurrent use.

use assay_core::{
    AssayResult, AuditEntry, BlockedInfo, DeliverableId, DeliverableRecord, DeliverableStatus,
    DeliveryAttempt, NotificationPreferences, NotificationRecord, QualityAssessmentResult, TaskId,
    Timestamp, TodoId, TodoItemRecord, TodoStatus,
};
use async_trait::async_trait;

/// Half-open time window `[start, end)` used by journal queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    pub fn contains(&self, at: Timestamp) -> bool {
        self.start <= at && at < self.end
    }
}

/// Update payload for a deliverable version.
///
/// Keyed by `(deliverable_id, version)`: a concurrent submission of a newer
/// version never touches the version an in-flight assessment references.
#[derive(Debug, Clone, Default)]
pub struct DeliverableUpdate {
    pub status: Option<DeliverableStatus>,
    pub quality_assessment: Option<QualityAssessmentResult>,
}

// ============================================================================
// DELIVERABLE OPERATIONS
// ============================================================================

#[async_trait]
pub trait DeliverableStore: Send + Sync {
    /// Insert a new deliverable version. The lineage is append-only; an
    /// existing `(deliverable_id, version)` pair is an insert failure.
    async fn deliverable_insert(&self, d: &DeliverableRecord) -> AssayResult<()>;

    /// Get the latest version of a deliverable lineage.
    async fn deliverable_get(&self, id: DeliverableId)
        -> AssayResult<Option<DeliverableRecord>>;

    /// Get one specific version of a deliverable lineage.
    async fn deliverable_get_version(
        &self,
        id: DeliverableId,
        version: u32,
    ) -> AssayResult<Option<DeliverableRecord>>;

    /// List all versions of all deliverables owned by a todo item.
    async fn deliverable_list_by_todo(
        &self,
        todo_id: TodoId,
    ) -> AssayResult<Vec<DeliverableRecord>>;

    /// Apply an update to one deliverable version.
    async fn deliverable_update(
        &self,
        id: DeliverableId,
        version: u32,
        update: DeliverableUpdate,
    ) -> AssayResult<()>;
}

// ============================================================================
// TODO OPERATIONS
// ============================================================================

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Insert a new todo item.
    async fn todo_insert(&self, t: &TodoItemRecord) -> AssayResult<()>;

    /// Get a todo item by ID.
    async fn todo_get(&self, id: TodoId) -> AssayResult<Option<TodoItemRecord>>;

    /// List all todo items of a task.
    async fn todo_list_by_task(&self, task_id: TaskId) -> AssayResult<Vec<TodoItemRecord>>;

    /// Apply a status transition and journal it.
    ///
    /// Rejects transitions the state machine shape forbids
    /// (`TodoStatus::can_transition`). Dependency gating is the transition
    /// guard's concern in `assay-progress`; callers outside tests go through
    /// that guard.
    ///
    /// `blocked` carries blocking metadata when `to` is `Blocked` and is
    /// cleared on re-entry to `InProgress`.
    async fn todo_update_status(
        &self,
        id: TodoId,
        to: TodoStatus,
        blocked: Option<BlockedInfo>,
        note: Option<String>,
    ) -> AssayResult<TodoItemRecord>;

    /// Status-change journal for a task, oldest first, optionally restricted
    /// to a time window.
    async fn todo_status_changes(
        &self,
        task_id: TaskId,
        range: Option<TimeRange>,
    ) -> AssayResult<Vec<assay_core::StatusChange>>;
}

// ============================================================================
// NOTIFICATION OPERATIONS
// ============================================================================

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a new dispatch record.
    async fn notification_insert(&self, record: &NotificationRecord) -> AssayResult<()>;

    /// Look up a dispatch record by its `notif-...` ID.
    async fn notification_get(&self, id: &str) -> AssayResult<Option<NotificationRecord>>;

    /// Append a retry outcome to an existing record. The record is otherwise
    /// immutable after creation.
    async fn notification_append_attempt(
        &self,
        id: &str,
        attempt: DeliveryAttempt,
    ) -> AssayResult<()>;
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Explicit per-recipient preferences; `None` when the recipient has
    /// never customized anything.
    async fn preferences_get(
        &self,
        recipient: &str,
    ) -> AssayResult<Option<NotificationPreferences>>;

    /// Create-or-replace a recipient's preferences.
    async fn preferences_upsert(
        &self,
        recipient: &str,
        preferences: &NotificationPreferences,
    ) -> AssayResult<()>;
}

// ============================================================================
// AUDIT LOG
// ============================================================================

/// Append-only audit sink. Callers treat appends as fire-and-forget: an
/// audit failure is logged by the caller and never propagated to the
/// user-facing operation.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn audit_append(&self, entry: AuditEntry) -> AssayResult<()>;
}
