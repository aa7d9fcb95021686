//! Channel adapter and retry-queue seams.
//!
//! Concrete adapters (Slack, Teams, email, SMS gateways) live outside this
//! core; the orchestrator talks to them through `ChannelAdapter` and hands
//! failed or deferred deliveries to the external `RetryQueue`, which owns the
//! bounded exponential backoff and re-invocation.

use assay_core::{Channel, ChannelError, Severity, Timestamp};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Channel-agnostic notification content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
    pub action_url: Option<String>,
}

/// Content rendered for one concrete channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub channel: Channel,
    pub text: String,
}

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

/// SMS payload ceiling (two concatenated segments).
const SMS_MAX_CHARS: usize = 320;

/// Render a message for a channel, enforcing the channel's format
/// constraints. SMS is plain text with no action URLs and is reserved for
/// critical urgency.
pub fn render_for_channel(
    channel: Channel,
    message: &NotificationMessage,
    severity: Severity,
) -> Result<RenderedMessage, ChannelError> {
    let text = match channel {
        Channel::Sms => {
            if severity != Severity::Critical {
                return Err(ChannelError::MessageRejected {
                    channel,
                    reason: "sms is reserved for critical urgency".to_string(),
                });
            }
            let plain = format!("{}: {}", message.subject, message.body);
            let stripped = URL.replace_all(&plain, "").trim().to_string();
            stripped.chars().take(SMS_MAX_CHARS).collect()
        }
        Channel::Slack | Channel::Teams | Channel::Email => {
            let mut text = format!("*{}*\n{}", message.subject, message.body);
            if let Some(url) = &message.action_url {
                text.push_str(&format!("\n{url}"));
            }
            text
        }
    };
    Ok(RenderedMessage { channel, text })
}

/// One concrete delivery channel.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    fn channel(&self) -> Channel;

    /// Deliver one rendered message. Failures are caught per channel by the
    /// orchestrator and never abort the batch.
    async fn send(&self, recipient: &str, message: &RenderedMessage) -> Result<(), ChannelError>;
}

/// A failed delivery queued for bounded-backoff retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryItem {
    pub notification_id: String,
    pub recipient: String,
    pub channel: Channel,
    pub reason: String,
    pub attempt: u32,
}

/// A notification deferred past a quiet-hours window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredItem {
    pub notification_id: String,
    pub recipient: String,
    pub channels: Vec<Channel>,
    pub deliver_after: Timestamp,
}

/// External retry/deferral queue. Backoff bounds and the maximum attempt
/// count are that collaborator's concern; the orchestrator is one-shot per
/// invocation.
#[async_trait]
pub trait RetryQueue: Send + Sync {
    async fn enqueue_retry(&self, item: RetryItem) -> assay_core::AssayResult<()>;
    async fn enqueue_deferred(&self, item: DeferredItem) -> assay_core::AssayResult<()>;
}

/// Search/knowledge collaborator consumed for contextual enrichment of
/// notification content only. Enrichment failures are ignored; this seam is
/// never on the scoring or state-machine path.
#[async_trait]
pub trait KnowledgeService: Send + Sync {
    /// Additional context for a subject line, when the service has any.
    async fn enrich(&self, subject: &str) -> assay_core::AssayResult<Option<String>>;
}

// ============================================================================
// TESTS
// ============================================================================
