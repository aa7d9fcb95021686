//! ASSAY Notify - Notification Orchestration
//!
//! Event-driven, multi-channel notification delivery: a single severity
//! policy table drives channel selection, quiet-hours bypass, and escalation
//! delays; preference resolution and quiet-hours evaluation are pure
//! functions over snapshots; dispatch isolates failures per stakeholder and
//! per channel and reports mixed outcomes in a structured result instead of
//! throwing.
//!
//! Concrete channel adapters and the bounded-backoff retry queue are
//! external collaborators behind the `ChannelAdapter` and `RetryQueue`
//! traits.

mod channels;
mod orchestrator;
mod policy;
mod triggers;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use channels::{
    render_for_channel, ChannelAdapter, DeferredItem, KnowledgeService, NotificationMessage,
    RenderedMessage, RetryItem, RetryQueue,
};
pub use orchestrator::{
    CreatedIssue, DispatchSummary, FailedNotification, IssueStatus, NotificationOrchestrator,
    NotificationRequest, NotificationResult, SentNotification,
};
pub use policy::{
    determine_channels, is_in_quiet_hours, notification_id, quiet_hours_end, resolve_preferences,
    severity_policy, SeverityPolicy,
};
pub use triggers::{NotificationAction, TriggerEvent};
