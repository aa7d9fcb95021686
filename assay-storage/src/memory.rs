//! In-memory store backing tests and embedded deployments.

use crate::traits::{
    AuditLog, DeliverableStore, DeliverableUpdate, NotificationStore, PreferenceStore, TimeRange,
    TodoStore,
};
use assay_core::{
    AssayError, AssayResult, AuditEntry, BlockedInfo, DeliverableId, DeliverableRecord,
    DeliveryAttempt, EntityType, NotificationPreferences, NotificationRecord, StatusChange,
    StorageError, TaskId, TodoId, TodoItemRecord, TodoStatus, ValidationError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of every ASSAY storage trait.
///
/// Deliverable lineages are append-only vectors sorted by version; todo
/// status transitions are journaled so time-ranged reports can replay them.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    deliverables: Arc<RwLock<HashMap<DeliverableId, Vec<DeliverableRecord>>>>,
    todos: Arc<RwLock<HashMap<TodoId, TodoItemRecord>>>,
    status_log: Arc<RwLock<Vec<StatusChange>>>,
    preferences: Arc<RwLock<HashMap<String, NotificationPreferences>>>,
    notifications: Arc<RwLock<HashMap<String, NotificationRecord>>>,
    audit: Arc<RwLock<Vec<AuditEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub async fn clear(&self) {
        self.deliverables.write().await.clear();
        self.todos.write().await.clear();
        self.status_log.write().await.clear();
        self.preferences.write().await.clear();
        self.notifications.write().await.clear();
        self.audit.write().await.clear();
    }

    pub async fn todo_count(&self) -> usize {
        self.todos.read().await.len()
    }

    pub async fn notification_count(&self) -> usize {
        self.notifications.read().await.len()
    }

    pub async fn audit_count(&self) -> usize {
        self.audit.read().await.len()
    }

    /// Audit entries in append order, for assertions.
    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.read().await.clone()
    }
}

#[async_trait]
impl DeliverableStore for MemoryStore {
    async fn deliverable_insert(&self, d: &DeliverableRecord) -> AssayResult<()> {
        let mut deliverables = self.deliverables.write().await;
        let lineage = deliverables.entry(d.deliverable_id).or_default();
        if lineage.iter().any(|existing| existing.version == d.version) {
            return Err(AssayError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Deliverable,
                reason: format!("version {} already exists", d.version),
            }));
        }
        lineage.push(d.clone());
        lineage.sort_by_key(|record| record.version);
        Ok(())
    }

    async fn deliverable_get(
        &self,
        id: DeliverableId,
    ) -> AssayResult<Option<DeliverableRecord>> {
        let deliverables = self.deliverables.read().await;
        Ok(deliverables
            .get(&id)
            .and_then(|lineage| lineage.last().cloned()))
    }

    async fn deliverable_get_version(
        &self,
        id: DeliverableId,
        version: u32,
    ) -> AssayResult<Option<DeliverableRecord>> {
        let deliverables = self.deliverables.read().await;
        Ok(deliverables
            .get(&id)
            .and_then(|lineage| lineage.iter().find(|r| r.version == version).cloned()))
    }

    async fn deliverable_list_by_todo(
        &self,
        todo_id: TodoId,
    ) -> AssayResult<Vec<DeliverableRecord>> {
        let deliverables = self.deliverables.read().await;
        Ok(deliverables
            .values()
            .flatten()
            .filter(|r| r.todo_id == todo_id)
            .cloned()
            .collect())
    }

    async fn deliverable_update(
        &self,
        id: DeliverableId,
        version: u32,
        update: DeliverableUpdate,
    ) -> AssayResult<()> {
        let mut deliverables = self.deliverables.write().await;
        let lineage = deliverables
            .get_mut(&id)
            .ok_or(AssayError::Storage(StorageError::NotFound {
                entity_type: EntityType::Deliverable,
                id,
            }))?;
        let record = lineage
            .iter_mut()
            .find(|r| r.version == version)
            .ok_or(AssayError::Storage(StorageError::VersionNotFound { id, version }))?;

        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(assessment) = update.quality_assessment {
            record.quality_assessment = Some(assessment);
        }
        record.updated_at = chrono::Utc::now();
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn todo_insert(&self, t: &TodoItemRecord) -> AssayResult<()> {
        let mut todos = self.todos.write().await;
        if todos.contains_key(&t.todo_id) {
            return Err(AssayError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Todo,
                reason: "already exists".to_string(),
            }));
        }
        todos.insert(t.todo_id, t.clone());
        Ok(())
    }

    async fn todo_get(&self, id: TodoId) -> AssayResult<Option<TodoItemRecord>> {
        let todos = self.todos.read().await;
        Ok(todos.get(&id).cloned())
    }

    async fn todo_list_by_task(&self, task_id: TaskId) -> AssayResult<Vec<TodoItemRecord>> {
        let todos = self.todos.read().await;
        Ok(todos
            .values()
            .filter(|t| t.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn todo_update_status(
        &self,
        id: TodoId,
        to: TodoStatus,
        blocked: Option<BlockedInfo>,
        note: Option<String>,
    ) -> AssayResult<TodoItemRecord> {
        let mut todos = self.todos.write().await;
        let todo = todos
            .get_mut(&id)
            .ok_or(AssayError::Storage(StorageError::NotFound {
                entity_type: EntityType::Todo,
                id,
            }))?;

        let from = todo.status;
        if !from.can_transition(to) {
            return Err(AssayError::Validation(ValidationError::InvalidTransition {
                todo_id: id,
                from,
                to,
            }));
        }

        let now = chrono::Utc::now();
        todo.status = to;
        todo.updated_at = now;
        match to {
            TodoStatus::Blocked => todo.blocked = blocked,
            TodoStatus::InProgress => todo.blocked = None,
            TodoStatus::Completed => todo.completed_at = Some(now),
            TodoStatus::Pending => {}
        }

        let change = StatusChange {
            todo_id: id,
            task_id: todo.task_id,
            from,
            to,
            changed_at: now,
            note,
        };
        let updated = todo.clone();
        drop(todos);

        self.status_log.write().await.push(change);
        Ok(updated)
    }

    async fn todo_status_changes(
        &self,
        task_id: TaskId,
        range: Option<TimeRange>,
    ) -> AssayResult<Vec<StatusChange>> {
        let log = self.status_log.read().await;
        Ok(log
            .iter()
            .filter(|c| c.task_id == task_id)
            .filter(|c| range.map_or(true, |r| r.contains(c.changed_at)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn notification_insert(&self, record: &NotificationRecord) -> AssayResult<()> {
        let mut notifications = self.notifications.write().await;
        if notifications.contains_key(&record.notification_id) {
            return Err(AssayError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Notification,
                reason: "already exists".to_string(),
            }));
        }
        notifications.insert(record.notification_id.clone(), record.clone());
        Ok(())
    }

    async fn notification_get(&self, id: &str) -> AssayResult<Option<NotificationRecord>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(id).cloned())
    }

    async fn notification_append_attempt(
        &self,
        id: &str,
        attempt: DeliveryAttempt,
    ) -> AssayResult<()> {
        let mut notifications = self.notifications.write().await;
        match notifications.get_mut(id) {
            Some(record) => {
                record.delivery_attempts.push(attempt);
                Ok(())
            }
            None => Err(AssayError::Storage(StorageError::NotificationNotFound {
                id: id.to_string(),
            })),
        }
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn preferences_get(
        &self,
        recipient: &str,
    ) -> AssayResult<Option<NotificationPreferences>> {
        let preferences = self.preferences.read().await;
        Ok(preferences.get(recipient).cloned())
    }

    async fn preferences_upsert(
        &self,
        recipient: &str,
        preferences: &NotificationPreferences,
    ) -> AssayResult<()> {
        let mut map = self.preferences.write().await;
        map.insert(recipient.to_string(), preferences.clone());
        Ok(())
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn audit_append(&self, entry: AuditEntry) -> AssayResult<()> {
        self.audit.write().await.push(entry);
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assay_core::{compute_content_hash, new_entity_id, DeliverableStatus, StakeholderPriority};
    use chrono::Utc;

    fn sample_deliverable(version: u32) -> DeliverableRecord {
        DeliverableRecord {
            deliverable_id: new_entity_id(),
            todo_id: new_entity_id(),
            task_id: new_entity_id(),
            file_name: "report.md".to_string(),
            file_type: ".md".to_string(),
            version,
            status: DeliverableStatus::Submitted,
            content: "# Report".to_string(),
            content_hash: compute_content_hash(b"# Report"),
            quality_assessment: None,
            submitted_at: Utc::now(),
            updated_at: Utc::now(),
            metadata: None,
        }
    }

    fn sample_todo(task_id: TaskId, status: TodoStatus) -> TodoItemRecord {
        TodoItemRecord {
            todo_id: new_entity_id(),
            task_id,
            title: "write report".to_string(),
            description: None,
            priority: StakeholderPriority::Medium,
            estimated_hours: 4.0,
            category: None,
            status,
            dependencies: vec![],
            related_workgroups: vec![],
            blocked: None,
            due_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn test_deliverable_lineage_is_append_only() {
        let store = MemoryStore::new();
        let mut v1 = sample_deliverable(1);
        store.deliverable_insert(&v1).await.unwrap();

        let mut v2 = sample_deliverable(2);
        v2.deliverable_id = v1.deliverable_id;
        store.deliverable_insert(&v2).await.unwrap();

        // Latest wins on plain get; prior versions stay reachable.
        let latest = store.deliverable_get(v1.deliverable_id).await.unwrap().unwrap();
        assert_eq!(latest.version, 2);
        let first = store
            .deliverable_get_version(v1.deliverable_id, 1)
            .await
            .unwrap();
        assert!(first.is_some());

        // Duplicate version rejected.
        v1.content = "changed".to_string();
        assert!(store.deliverable_insert(&v1).await.is_err());
    }

    #[tokio::test]
    async fn test_deliverable_update_targets_one_version() {
        let store = MemoryStore::new();
        let v1 = sample_deliverable(1);
        let mut v2 = sample_deliverable(2);
        v2.deliverable_id = v1.deliverable_id;
        store.deliverable_insert(&v1).await.unwrap();
        store.deliverable_insert(&v2).await.unwrap();

        store
            .deliverable_update(
                v1.deliverable_id,
                1,
                DeliverableUpdate {
                    status: Some(DeliverableStatus::Validating),
                    quality_assessment: None,
                },
            )
            .await
            .unwrap();

        let first = store
            .deliverable_get_version(v1.deliverable_id, 1)
            .await
            .unwrap()
            .unwrap();
        let second = store
            .deliverable_get_version(v1.deliverable_id, 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.status, DeliverableStatus::Validating);
        assert_eq!(second.status, DeliverableStatus::Submitted);
    }

    #[tokio::test]
    async fn test_todo_update_status_rejects_illegal_transition() {
        let store = MemoryStore::new();
        let todo = sample_todo(new_entity_id(), TodoStatus::Pending);
        store.todo_insert(&todo).await.unwrap();

        let result = store
            .todo_update_status(todo.todo_id, TodoStatus::Completed, None, None)
            .await;
        assert!(matches!(
            result,
            Err(AssayError::Validation(ValidationError::InvalidTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn test_todo_status_changes_are_journaled() {
        let store = MemoryStore::new();
        let task_id = new_entity_id();
        let todo = sample_todo(task_id, TodoStatus::Pending);
        store.todo_insert(&todo).await.unwrap();

        store
            .todo_update_status(todo.todo_id, TodoStatus::InProgress, None, None)
            .await
            .unwrap();
        store
            .todo_update_status(todo.todo_id, TodoStatus::Completed, None, None)
            .await
            .unwrap();

        let changes = store.todo_status_changes(task_id, None).await.unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].to, TodoStatus::InProgress);
        assert_eq!(changes[1].to, TodoStatus::Completed);
        assert!(changes[0].changed_at <= changes[1].changed_at);
    }

    #[tokio::test]
    async fn test_unblocking_clears_blocked_metadata() {
        let store = MemoryStore::new();
        let todo = sample_todo(new_entity_id(), TodoStatus::Pending);
        store.todo_insert(&todo).await.unwrap();

        let blocked = store
            .todo_update_status(
                todo.todo_id,
                TodoStatus::Blocked,
                Some(BlockedInfo {
                    kind: assay_core::BlockerKind::Resource,
                    reason: "waiting on staging slot".to_string(),
                    blocked_at: Utc::now(),
                }),
                None,
            )
            .await
            .unwrap();
        assert!(blocked.blocked.is_some());

        let resumed = store
            .todo_update_status(todo.todo_id, TodoStatus::InProgress, None, None)
            .await
            .unwrap();
        assert!(resumed.blocked.is_none());
    }

    #[tokio::test]
    async fn test_preferences_upsert_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.preferences_get("team-a").await.unwrap().is_none());

        let prefs = NotificationPreferences::default();
        store.preferences_upsert("team-a", &prefs).await.unwrap();
        assert_eq!(store.preferences_get("team-a").await.unwrap(), Some(prefs));
    }

    #[tokio::test]
    async fn test_notification_append_attempt() {
        let store = MemoryStore::new();
        let record = NotificationRecord {
            notification_id: "notif-1700000000000-abc123".to_string(),
            recipient: "team-a".to_string(),
            channels: vec![assay_core::Channel::Slack],
            failed_channels: vec![],
            message: "build failed".to_string(),
            urgency: assay_core::Severity::High,
            created_at: Utc::now(),
            delivery_attempts: vec![],
        };
        store.notification_insert(&record).await.unwrap();
        store
            .notification_append_attempt(
                &record.notification_id,
                DeliveryAttempt {
                    channel: assay_core::Channel::Slack,
                    attempted_at: Utc::now(),
                    success: true,
                    error: None,
                },
            )
            .await
            .unwrap();

        let stored = store
            .notification_get(&record.notification_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.delivery_attempts.len(), 1);
        assert!(stored.delivery_attempts[0].success);
    }
}
