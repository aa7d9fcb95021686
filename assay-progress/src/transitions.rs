//! Status-transition guard for todo items.
//!
//! The state-machine shape lives on `TodoStatus::can_transition`; this module
//! adds the dependency gate on top of it, reusing the same classification the
//! blocker analysis uses. Entry to `InProgress` from `Pending` with unmet
//! dependencies is auto-redirected to `Blocked`; resuming a `Blocked` todo
//! whose dependencies are still unmet is refused.

use crate::blockers::{status_index, unmet_dependencies};
use assay_core::{
    AssayError, AssayResult, BlockedInfo, BlockerKind, EntityType, StorageError, TodoId,
    TodoItemRecord, TodoStatus, ValidationError,
};
use assay_storage::TodoStore;

/// Result of a guarded transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub todo: TodoItemRecord,
    /// The caller asked for `InProgress` but unmet dependencies redirected
    /// the todo to `Blocked` instead.
    pub redirected_to_blocked: bool,
}

/// Apply a status transition with dependency gating.
///
/// # Errors
/// - `StorageError::NotFound` when the todo does not exist.
/// - `ValidationError::InvalidTransition` when the state-machine shape
///   forbids the move (e.g. out of `Completed`).
/// - `ValidationError::UnresolvedDependencies` when resuming a `Blocked`
///   todo whose dependencies are still unmet.
pub async fn update_todo_status(
    store: &dyn TodoStore,
    todo_id: TodoId,
    requested: TodoStatus,
    blocked: Option<BlockedInfo>,
) -> AssayResult<TransitionOutcome> {
    let todo = store
        .todo_get(todo_id)
        .await?
        .ok_or(AssayError::Storage(StorageError::NotFound {
            entity_type: EntityType::Todo,
            id: todo_id,
        }))?;

    if requested == TodoStatus::InProgress {
        let siblings = store.todo_list_by_task(todo.task_id).await?;
        let index = status_index(&siblings);
        let unmet = unmet_dependencies(&todo, &index);
        if !unmet.is_empty() {
            return match todo.status {
                // Starting a pending todo too early parks it in Blocked with
                // dependency metadata instead of failing the call.
                TodoStatus::Pending => {
                    let info = BlockedInfo {
                        kind: BlockerKind::Dependency,
                        reason: format!("{} unmet dependencies", unmet.len()),
                        blocked_at: chrono::Utc::now(),
                    };
                    let updated = store
                        .todo_update_status(
                            todo_id,
                            TodoStatus::Blocked,
                            Some(info),
                            Some("redirected: dependencies unmet".to_string()),
                        )
                        .await?;
                    tracing::info!(%todo_id, "start redirected to blocked");
                    Ok(TransitionOutcome {
                        todo: updated,
                        redirected_to_blocked: true,
                    })
                }
                _ => Err(AssayError::Validation(
                    ValidationError::UnresolvedDependencies {
                        todo_id,
                        unmet,
                    },
                )),
            };
        }
    }

    let updated = store
        .todo_update_status(todo_id, requested, blocked, None)
        .await?;
    Ok(TransitionOutcome {
        todo: updated,
        redirected_to_blocked: false,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assay_core::{new_entity_id, StakeholderPriority, TaskId};
    use assay_storage::MemoryStore;
    use chrono::Utc;

    fn todo(task_id: TaskId, dependencies: Vec<TodoId>) -> TodoItemRecord {
        TodoItemRecord {
            todo_id: new_entity_id(),
            task_id,
            title: "guarded".to_string(),
            description: None,
            priority: StakeholderPriority::Medium,
            estimated_hours: 1.0,
            category: None,
            status: TodoStatus::Pending,
            dependencies,
            related_workgroups: vec![],
            blocked: None,
            due_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn test_start_with_met_dependencies_proceeds() {
        let store = MemoryStore::new();
        let task_id = new_entity_id();
        let mut dep = todo(task_id, vec![]);
        dep.status = TodoStatus::Completed;
        store.todo_insert(&dep).await.unwrap();
        let item = todo(task_id, vec![dep.todo_id]);
        store.todo_insert(&item).await.unwrap();

        let outcome = update_todo_status(&store, item.todo_id, TodoStatus::InProgress, None)
            .await
            .unwrap();
        assert!(!outcome.redirected_to_blocked);
        assert_eq!(outcome.todo.status, TodoStatus::InProgress);
    }

    #[tokio::test]
    async fn test_start_with_unmet_dependencies_redirects_to_blocked() {
        let store = MemoryStore::new();
        let task_id = new_entity_id();
        let dep = todo(task_id, vec![]);
        store.todo_insert(&dep).await.unwrap();
        let item = todo(task_id, vec![dep.todo_id]);
        store.todo_insert(&item).await.unwrap();

        let outcome = update_todo_status(&store, item.todo_id, TodoStatus::InProgress, None)
            .await
            .unwrap();
        assert!(outcome.redirected_to_blocked);
        assert_eq!(outcome.todo.status, TodoStatus::Blocked);
        let info = outcome.todo.blocked.expect("dependency metadata recorded");
        assert_eq!(info.kind, BlockerKind::Dependency);
    }

    #[tokio::test]
    async fn test_resume_blocked_with_unmet_dependencies_refused() {
        let store = MemoryStore::new();
        let task_id = new_entity_id();
        let dep = todo(task_id, vec![]);
        store.todo_insert(&dep).await.unwrap();
        let item = todo(task_id, vec![dep.todo_id]);
        store.todo_insert(&item).await.unwrap();

        // Park it in Blocked first.
        update_todo_status(&store, item.todo_id, TodoStatus::InProgress, None)
            .await
            .unwrap();

        let result = update_todo_status(&store, item.todo_id, TodoStatus::InProgress, None).await;
        assert!(matches!(
            result,
            Err(AssayError::Validation(
                ValidationError::UnresolvedDependencies { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_resume_after_dependency_completes() {
        let store = MemoryStore::new();
        let task_id = new_entity_id();
        let dep = todo(task_id, vec![]);
        store.todo_insert(&dep).await.unwrap();
        let item = todo(task_id, vec![dep.todo_id]);
        store.todo_insert(&item).await.unwrap();

        update_todo_status(&store, item.todo_id, TodoStatus::InProgress, None)
            .await
            .unwrap(); // parked in Blocked

        // Complete the dependency, then resume.
        update_todo_status(&store, dep.todo_id, TodoStatus::InProgress, None)
            .await
            .unwrap();
        update_todo_status(&store, dep.todo_id, TodoStatus::Completed, None)
            .await
            .unwrap();

        let outcome = update_todo_status(&store, item.todo_id, TodoStatus::InProgress, None)
            .await
            .unwrap();
        assert!(!outcome.redirected_to_blocked);
        assert_eq!(outcome.todo.status, TodoStatus::InProgress);
        assert!(outcome.todo.blocked.is_none());
    }

    #[tokio::test]
    async fn test_completed_is_terminal_through_the_guard() {
        let store = MemoryStore::new();
        let task_id = new_entity_id();
        let item = todo(task_id, vec![]);
        store.todo_insert(&item).await.unwrap();
        update_todo_status(&store, item.todo_id, TodoStatus::InProgress, None)
            .await
            .unwrap();
        update_todo_status(&store, item.todo_id, TodoStatus::Completed, None)
            .await
            .unwrap();

        let result = update_todo_status(&store, item.todo_id, TodoStatus::InProgress, None).await;
        assert!(matches!(
            result,
            Err(AssayError::Validation(ValidationError::InvalidTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn test_missing_todo_is_not_found() {
        let store = MemoryStore::new();
        let result =
            update_todo_status(&store, new_entity_id(), TodoStatus::InProgress, None).await;
        assert!(matches!(
            result,
            Err(AssayError::Storage(StorageError::NotFound { .. }))
        ));
    }
}
