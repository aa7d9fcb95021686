//! Notification orchestrator.
//!
//! Resolves effective preferences per stakeholder, applies the severity
//! filter and quiet-hours suppression, fans out to channel adapters, and
//! aggregates the outcome. Per-stakeholder and per-channel failures are
//! isolated: one bad contact never fails the batch, and the dispatch entry
//! point always returns a result object.

use crate::channels::{
    render_for_channel, ChannelAdapter, DeferredItem, KnowledgeService, NotificationMessage,
    RetryItem, RetryQueue,
};
use crate::policy::{
    determine_channels, is_in_quiet_hours, notification_id, quiet_hours_end, resolve_preferences,
    severity_policy,
};
use assay_core::{
    new_entity_id, AssayError, AssayResult, AuditEntry, Channel, DeliveryAttempt, EntityId,
    NotificationPreferences, NotificationRecord, Severity, Stakeholder, StakeholderPriority,
    Timestamp, ValidationError,
};
use assay_storage::{AuditLog, NotificationStore, PreferenceStore};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One dispatch request: an event classification plus its audience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub stakeholders: Vec<Stakeholder>,
    pub action_url: Option<String>,
    pub context: Option<serde_json::Value>,
}

/// A delivery that reached at least one channel (or was deferred past quiet
/// hours).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentNotification {
    pub notification_id: String,
    pub recipient: String,
    pub channels: Vec<Channel>,
    /// Set when quiet hours deferred the delivery.
    pub delayed_until: Option<Timestamp>,
}

/// A delivery with at least one failed channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedNotification {
    pub notification_id: String,
    pub recipient: String,
    pub failed_channels: Vec<Channel>,
    pub errors: Vec<String>,
}

/// Batch totals. `total_stakeholders` counts only stakeholders that passed
/// the severity filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub total_stakeholders: usize,
    pub sent: usize,
    pub failed: usize,
    pub deferred: usize,
}

/// Aggregated outcome of one dispatch. Mixed outcomes are normal: a
/// stakeholder with one delivered and one failed channel appears in both
/// lists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NotificationResult {
    pub sent_notifications: Vec<SentNotification>,
    pub failed_notifications: Vec<FailedNotification>,
    pub summary: DispatchSummary,
}

/// Issue workflow state for coordination issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    PendingApproval,
}

/// Handle to an issue created during coordination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub issue_id: EntityId,
    pub title: String,
    /// `None` for the primary coordination issue; the owning team for
    /// team-specific issues.
    pub team_id: Option<String>,
    pub status: IssueStatus,
    pub created_at: Timestamp,
}

/// The orchestrator. Stateless between invocations; preferences and policy
/// are read-only snapshots per dispatch.
pub struct NotificationOrchestrator {
    adapters: HashMap<Channel, Arc<dyn ChannelAdapter>>,
    retry_queue: Option<Arc<dyn RetryQueue>>,
    notifications: Arc<dyn NotificationStore>,
    preferences: Arc<dyn PreferenceStore>,
    audit: Option<Arc<dyn AuditLog>>,
    knowledge: Option<Arc<dyn KnowledgeService>>,
}

impl NotificationOrchestrator {
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            adapters: HashMap::new(),
            retry_queue: None,
            notifications,
            preferences,
            audit: None,
            knowledge: None,
        }
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn ChannelAdapter>) -> Self {
        self.adapters.insert(adapter.channel(), adapter);
        self
    }

    pub fn with_retry_queue(mut self, queue: Arc<dyn RetryQueue>) -> Self {
        self.retry_queue = Some(queue);
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_knowledge_service(mut self, knowledge: Arc<dyn KnowledgeService>) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    /// Dispatch one notification to every eligible stakeholder.
    ///
    /// Stakeholders whose severity threshold disables this event's severity
    /// are filtered out before any channel work and do not count toward
    /// `summary.total_stakeholders`. Channel failures land in
    /// `failed_notifications` and the retry queue; this method never returns
    /// an error.
    pub async fn send_notifications_with_retry(
        &self,
        request: &NotificationRequest,
    ) -> NotificationResult {
        let now = chrono::Utc::now();
        let policy = severity_policy(request.severity);
        let mut message = NotificationMessage {
            subject: request.title.clone(),
            body: request.message.clone(),
            action_url: request.action_url.clone(),
        };
        if let Some(knowledge) = &self.knowledge {
            match knowledge.enrich(&request.title).await {
                Ok(Some(context)) => {
                    message.body = format!("{}\n\n{context}", message.body);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::debug!(%err, "knowledge enrichment failed (ignored)");
                }
            }
        }

        let mut result = NotificationResult::default();
        let mut used_ids: HashSet<String> = HashSet::new();

        for stakeholder in &request.stakeholders {
            let explicit = match self.preferences.preferences_get(&stakeholder.team_id).await {
                Ok(prefs) => prefs,
                Err(err) => {
                    tracing::warn!(recipient = %stakeholder.team_id, %err,
                        "preference lookup failed; using stakeholder defaults");
                    None
                }
            };
            let prefs = resolve_preferences(stakeholder, explicit);

            if !prefs.severity_thresholds.enabled(request.severity) {
                tracing::debug!(recipient = %stakeholder.team_id, severity = %request.severity,
                    "stakeholder filtered by severity threshold");
                continue;
            }
            result.summary.total_stakeholders += 1;

            let mut id = notification_id(now);
            while !used_ids.insert(id.clone()) {
                id = notification_id(now);
            }

            let channels = determine_channels(stakeholder, request.severity, &prefs);

            if !policy.bypass_quiet_hours && is_in_quiet_hours(prefs.quiet_hours.as_ref(), now) {
                let deliver_after = prefs
                    .quiet_hours
                    .as_ref()
                    .map(|qh| quiet_hours_end(qh, now))
                    .unwrap_or(now);
                self.defer(&id, stakeholder, &channels, deliver_after, request, now)
                    .await;
                result.sent_notifications.push(SentNotification {
                    notification_id: id,
                    recipient: stakeholder.team_id.clone(),
                    channels,
                    delayed_until: Some(deliver_after),
                });
                result.summary.deferred += 1;
                continue;
            }

            let (sent, failed) = self
                .dispatch_to_channels(&id, stakeholder, &channels, &message, request.severity, now)
                .await;

            if let Some(sent) = sent {
                result.sent_notifications.push(sent);
                result.summary.sent += 1;
            }
            if let Some(failed) = failed {
                result.failed_notifications.push(failed);
                result.summary.failed += 1;
            }
        }

        self.audit_dispatch(request, &result).await;
        result
    }

    /// Fan out one notification to its channels, isolating failures per
    /// channel. Returns the sent/failed views of the same record.
    async fn dispatch_to_channels(
        &self,
        id: &str,
        stakeholder: &Stakeholder,
        channels: &[Channel],
        message: &NotificationMessage,
        severity: Severity,
        now: Timestamp,
    ) -> (Option<SentNotification>, Option<FailedNotification>) {
        let mut attempts = Vec::with_capacity(channels.len());
        let mut delivered = Vec::new();
        let mut failed_channels = Vec::new();
        let mut errors = Vec::new();

        for channel in channels {
            let outcome = match render_for_channel(*channel, message, severity) {
                Ok(rendered) => match self.adapters.get(channel) {
                    Some(adapter) => adapter.send(&stakeholder.contact_info, &rendered).await,
                    None => Err(assay_core::ChannelError::NotConfigured { channel: *channel }),
                },
                Err(err) => Err(err),
            };

            match outcome {
                Ok(()) => {
                    delivered.push(*channel);
                    attempts.push(DeliveryAttempt {
                        channel: *channel,
                        attempted_at: now,
                        success: true,
                        error: None,
                    });
                }
                Err(err) => {
                    tracing::warn!(recipient = %stakeholder.team_id, channel = %channel, %err,
                        "channel delivery failed");
                    failed_channels.push(*channel);
                    errors.push(err.to_string());
                    attempts.push(DeliveryAttempt {
                        channel: *channel,
                        attempted_at: now,
                        success: false,
                        error: Some(err.to_string()),
                    });
                    if let Some(queue) = &self.retry_queue {
                        let item = RetryItem {
                            notification_id: id.to_string(),
                            recipient: stakeholder.team_id.clone(),
                            channel: *channel,
                            reason: err.to_string(),
                            attempt: 1,
                        };
                        if let Err(queue_err) = queue.enqueue_retry(item).await {
                            tracing::warn!(%queue_err, "retry enqueue failed (ignored)");
                        }
                    }
                }
            }
        }

        let record = NotificationRecord {
            notification_id: id.to_string(),
            recipient: stakeholder.team_id.clone(),
            channels: channels.to_vec(),
            failed_channels: failed_channels.clone(),
            message: message.body.clone(),
            urgency: severity,
            created_at: now,
            delivery_attempts: attempts,
        };
        if let Err(err) = self.notifications.notification_insert(&record).await {
            tracing::warn!(notification_id = %id, %err, "notification record insert failed (ignored)");
        }

        let sent = (!delivered.is_empty()).then(|| SentNotification {
            notification_id: id.to_string(),
            recipient: stakeholder.team_id.clone(),
            channels: delivered,
            delayed_until: None,
        });
        let failed = (!failed_channels.is_empty()).then(|| FailedNotification {
            notification_id: id.to_string(),
            recipient: stakeholder.team_id.clone(),
            failed_channels,
            errors,
        });
        (sent, failed)
    }

    /// Record a quiet-hours deferral and hand it to the retry queue.
    async fn defer(
        &self,
        id: &str,
        stakeholder: &Stakeholder,
        channels: &[Channel],
        deliver_after: Timestamp,
        request: &NotificationRequest,
        now: Timestamp,
    ) {
        tracing::debug!(recipient = %stakeholder.team_id, %deliver_after,
            "notification deferred past quiet hours");
        let record = NotificationRecord {
            notification_id: id.to_string(),
            recipient: stakeholder.team_id.clone(),
            channels: channels.to_vec(),
            failed_channels: Vec::new(),
            message: request.message.clone(),
            urgency: request.severity,
            created_at: now,
            delivery_attempts: Vec::new(),
        };
        if let Err(err) = self.notifications.notification_insert(&record).await {
            tracing::warn!(notification_id = %id, %err, "notification record insert failed (ignored)");
        }
        if let Some(queue) = &self.retry_queue {
            let item = DeferredItem {
                notification_id: id.to_string(),
                recipient: stakeholder.team_id.clone(),
                channels: channels.to_vec(),
                deliver_after,
            };
            if let Err(err) = queue.enqueue_deferred(item).await {
                tracing::warn!(%err, "deferred enqueue failed (ignored)");
            }
        }
    }

    async fn audit_dispatch(&self, request: &NotificationRequest, result: &NotificationResult) {
        let Some(audit) = &self.audit else {
            return;
        };
        let entry = AuditEntry {
            entry_id: new_entity_id(),
            action: "notification_dispatch".to_string(),
            subject: request.title.clone(),
            detail: serde_json::to_value(result.summary).ok(),
            created_at: chrono::Utc::now(),
        };
        if let Err(err) = audit.audit_append(entry).await {
            tracing::warn!(%err, "audit append failed (ignored)");
        }
    }

    /// Create the coordination issues for an event: always one primary
    /// issue, plus one team-specific issue per high-priority stakeholder
    /// among the affected teams (not one per affected team).
    pub async fn create_issues_with_approval(
        &self,
        request: &NotificationRequest,
        requires_approval: bool,
    ) -> Vec<CreatedIssue> {
        let now = chrono::Utc::now();
        let status = if requires_approval {
            IssueStatus::PendingApproval
        } else {
            IssueStatus::Open
        };

        let mut issues = vec![CreatedIssue {
            issue_id: new_entity_id(),
            title: format!("[coordination] {}", request.title),
            team_id: None,
            status,
            created_at: now,
        }];

        for stakeholder in &request.stakeholders {
            if stakeholder.priority == StakeholderPriority::High {
                issues.push(CreatedIssue {
                    issue_id: new_entity_id(),
                    title: format!("[{}] {}", stakeholder.team_id, request.title),
                    team_id: Some(stakeholder.team_id.clone()),
                    status,
                    created_at: now,
                });
            }
        }

        tracing::info!(
            title = %request.title,
            issues = issues.len(),
            pending_approval = requires_approval,
            "coordination issues created"
        );
        issues
    }

    /// Upsert a recipient's notification preferences. Rejects quiet-hours
    /// windows with unparseable timezones; well-formed input never errors.
    pub async fn update_notification_preferences(
        &self,
        recipient: &str,
        preferences: &NotificationPreferences,
    ) -> AssayResult<()> {
        if let Some(qh) = &preferences.quiet_hours {
            if qh.offset().is_none() {
                return Err(AssayError::Validation(ValidationError::InvalidValue {
                    field: "quiet_hours.timezone".to_string(),
                    reason: format!("unsupported timezone '{}'", qh.timezone),
                }));
            }
        }
        self.preferences
            .preferences_upsert(recipient, preferences)
            .await
    }

    /// Ordered delivery attempts for a notification. Unknown IDs yield an
    /// empty list, never an error.
    pub async fn get_notification_status(
        &self,
        notification_id: &str,
    ) -> AssayResult<Vec<DeliveryAttempt>> {
        let record = self.notifications.notification_get(notification_id).await?;
        Ok(record.map(|r| r.delivery_attempts).unwrap_or_default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
