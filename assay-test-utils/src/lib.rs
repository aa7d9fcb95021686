//! ASSAY Test Utilities
//!
//! Centralized test infrastructure for the ASSAY workspace:
//! - Fixtures for deliverables, todos, and stakeholders
//! - Mock channel adapters and a recording retry queue
//! - Proptest generators for core enum and preference types

// Re-export the in-memory store from its source crate
pub use assay_storage::MemoryStore;

// Re-export core types for convenience
pub use assay_core::{
    compute_content_hash, new_entity_id, BlockedInfo, BlockerKind, Channel, DeliverableRecord,
    DeliverableStatus, NotificationPreferences, QuietHours, Severity, SeverityThresholds,
    Stakeholder, StakeholderPriority, TaskId, Timestamp, TodoId, TodoItemRecord, TodoStatus,
};

use chrono::{NaiveTime, Utc};
use proptest::prelude::*;

// ============================================================================
// FIXTURES
// ============================================================================

/// A submitted deliverable with content-derived hash and version 1.
pub fn sample_deliverable(file_name: &str, content: &str) -> DeliverableRecord {
    DeliverableRecord {
        deliverable_id: new_entity_id(),
        todo_id: new_entity_id(),
        task_id: new_entity_id(),
        file_name: file_name.to_string(),
        file_type: file_name
            .rsplit_once('.')
            .map(|(_, ext)| format!(".{ext}"))
            .unwrap_or_default(),
        version: 1,
        status: DeliverableStatus::Submitted,
        content: content.to_string(),
        content_hash: compute_content_hash(content.as_bytes()),
        quality_assessment: None,
        submitted_at: Utc::now(),
        updated_at: Utc::now(),
        metadata: None,
    }
}

/// A pending todo item with no dependencies.
pub fn sample_todo(task_id: TaskId, title: &str) -> TodoItemRecord {
    TodoItemRecord {
        todo_id: new_entity_id(),
        task_id,
        title: title.to_string(),
        description: None,
        priority: StakeholderPriority::Medium,
        estimated_hours: 4.0,
        category: None,
        status: TodoStatus::Pending,
        dependencies: vec![],
        related_workgroups: vec![],
        blocked: None,
        due_date: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        completed_at: None,
    }
}

/// A stakeholder with contact info derived from the team ID and no carried
/// preferences.
pub fn sample_stakeholder(team_id: &str, priority: StakeholderPriority) -> Stakeholder {
    Stakeholder {
        team_id: team_id.to_string(),
        contact_info: format!("{team_id}@example.com"),
        role: "member".to_string(),
        priority,
        notification_preferences: None,
    }
}

// ============================================================================
// MOCK CHANNEL ADAPTER + RECORDING RETRY QUEUE
// ============================================================================
//
// These implement assay-notify's own traits, so they are defined in that crate
// (behind its `test-util` feature) to avoid a dev-dependency cycle. Re-exported
// here so existing `assay_test_utils::{...}` imports keep working.
pub use assay_notify::testing::{FailureMode, MockChannelAdapter, RecordingRetryQueue};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Low),
        Just(Severity::Medium),
        Just(Severity::High),
        Just(Severity::Critical),
    ]
}

pub fn arb_channel() -> impl Strategy<Value = Channel> {
    prop_oneof![
        Just(Channel::Slack),
        Just(Channel::Teams),
        Just(Channel::Email),
        Just(Channel::Sms),
    ]
}

pub fn arb_todo_status() -> impl Strategy<Value = TodoStatus> {
    prop_oneof![
        Just(TodoStatus::Pending),
        Just(TodoStatus::InProgress),
        Just(TodoStatus::Blocked),
        Just(TodoStatus::Completed),
    ]
}

pub fn arb_severity_thresholds() -> impl Strategy<Value = SeverityThresholds> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(low, medium, high, critical)| SeverityThresholds {
            low,
            medium,
            high,
            critical,
        },
    )
}

pub fn arb_quiet_hours() -> impl Strategy<Value = QuietHours> {
    (0u32..24, 0u32..60, 0u32..24, 0u32..60).prop_map(|(sh, sm, eh, em)| QuietHours {
        start: NaiveTime::from_hms_opt(sh, sm, 0).unwrap(),
        end: NaiveTime::from_hms_opt(eh, em, 0).unwrap(),
        timezone: "UTC".to_string(),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assay_notify::{ChannelAdapter, RenderedMessage};

    #[tokio::test]
    async fn test_mock_adapter_failure_modes() {
        let reliable = MockChannelAdapter::reliable(Channel::Slack);
        let failing = MockChannelAdapter::failing(Channel::Slack);
        let selective = MockChannelAdapter::failing_for(Channel::Slack, "bad");
        let message = RenderedMessage {
            channel: Channel::Slack,
            text: "hello".to_string(),
        };

        assert!(reliable.send("team-a@example.com", &message).await.is_ok());
        assert!(failing.send("team-a@example.com", &message).await.is_err());
        assert!(selective.send("team-bad@example.com", &message).await.is_err());
        assert!(selective.send("team-good@example.com", &message).await.is_ok());

        assert_eq!(reliable.sent_count(), 1);
        assert_eq!(failing.failed_count(), 1);
        assert_eq!(selective.sent_count(), 1);
        assert_eq!(selective.failed_count(), 1);
    }

    #[test]
    fn test_sample_deliverable_hash_matches_content() {
        let d = sample_deliverable("api.ts", "export const x = 1;");
        assert_eq!(d.content_hash, compute_content_hash(d.content.as_bytes()));
        assert_eq!(d.file_type, ".ts");
    }
}
