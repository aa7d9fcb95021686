//! Core entity structures

use crate::{
    BlockerKind, Channel, ContentHash, DeliverableId, DeliverableStatus, EntityId, FileCategory,
    QualityDimension, Severity, StakeholderPriority, SuggestionCategory, TaskId, Timestamp, TodoId,
    TodoStatus,
};
use chrono::{FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};

// ============================================================================
// DELIVERABLES
// ============================================================================

/// Deliverable - a submitted artifact under evaluation.
///
/// A deliverable lineage is append-only: resubmission creates a new record
/// with a higher `version`, never overwriting prior versions. All assessment
/// state is keyed by `(deliverable_id, version)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverableRecord {
    pub deliverable_id: DeliverableId,
    pub todo_id: TodoId,
    pub task_id: TaskId,
    pub file_name: String,
    pub file_type: String,
    /// Monotonically increasing per lineage, starting at 1.
    pub version: u32,
    pub status: DeliverableStatus,
    pub content: String,
    pub content_hash: ContentHash,
    pub quality_assessment: Option<QualityAssessmentResult>,
    pub submitted_at: Timestamp,
    pub updated_at: Timestamp,
    pub metadata: Option<serde_json::Value>,
}

impl DeliverableRecord {
    /// The category this deliverable is assessed under.
    pub fn category(&self) -> FileCategory {
        FileCategory::from_file_name(&self.file_name)
    }
}

/// Score for one quality dimension within an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: QualityDimension,
    /// Weighted combination of check scores, 0-100.
    pub score: f64,
    /// The configured floor this dimension was held to.
    pub minimum_score: f64,
    pub passed: bool,
}

/// Compliance verdict of one assessment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceStatus {
    /// True iff the overall score met the threshold AND every dimension met
    /// its own minimum.
    pub is_compliant: bool,
    pub threshold: f64,
    pub failed_dimensions: Vec<QualityDimension>,
}

/// One actionable improvement surfaced by an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementSuggestion {
    pub category: SuggestionCategory,
    pub dimension: Option<QualityDimension>,
    pub description: String,
    pub impact: String,
    pub effort: String,
    /// 0-10; suggestion lists are sorted by this, descending.
    pub priority: u8,
}

/// Output of one scoring run against one deliverable version.
/// Created fresh per run; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessmentResult {
    /// Weighted combination of dimension scores, 0-100.
    pub overall_score: f64,
    pub dimensions: Vec<DimensionScore>,
    pub compliance: ComplianceStatus,
    pub suggestions: Vec<ImprovementSuggestion>,
    /// Set when an optional external check provider was unavailable and one
    /// or more checks degraded to a neutral score.
    pub degraded: bool,
    pub category: FileCategory,
    pub deliverable_version: u32,
    pub assessed_at: Timestamp,
}

// ============================================================================
// TODO ITEMS
// ============================================================================

/// Blocking metadata recorded when a todo enters `Blocked`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedInfo {
    pub kind: BlockerKind,
    pub reason: String,
    pub blocked_at: Timestamp,
}

/// Todo item - unit of work within a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItemRecord {
    pub todo_id: TodoId,
    pub task_id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub priority: StakeholderPriority,
    pub estimated_hours: f64,
    pub category: Option<String>,
    pub status: TodoStatus,
    /// Todo IDs that must be Completed before this one may leave Pending.
    pub dependencies: Vec<TodoId>,
    pub related_workgroups: Vec<String>,
    /// Present only while status is Blocked (or for history after unblocking,
    /// cleared on re-entry to InProgress).
    pub blocked: Option<BlockedInfo>,
    pub due_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// Append-only record of one todo status transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub todo_id: TodoId,
    pub task_id: TaskId,
    pub from: TodoStatus,
    pub to: TodoStatus,
    pub changed_at: Timestamp,
    pub note: Option<String>,
}

// ============================================================================
// PROGRESS
// ============================================================================

/// Aggregate view over a task's todo items at a point in time.
/// Recomputed on demand and always derivable from the current todo set, so
/// two computations over unchanged state are identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub task_id: TaskId,
    pub total_todos: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub completed: usize,
    /// completed / total * 100; 0.0 for an empty task.
    pub completion_percentage: f64,
}

impl ProgressSummary {
    /// Count of currently blocked todos.
    pub fn blocked_todos(&self) -> usize {
        self.blocked
    }
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

/// Per-severity enablement switches. A disabled severity filters the
/// recipient out of dispatch entirely for events of that severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    pub low: bool,
    pub medium: bool,
    pub high: bool,
    pub critical: bool,
}

impl SeverityThresholds {
    pub fn enabled(&self, severity: Severity) -> bool {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            low: true,
            medium: true,
            high: true,
            critical: true,
        }
    }
}

/// A configured suppression window for non-critical notifications.
///
/// The window is half-open `[start, end)` in the preference's timezone and
/// may wrap past midnight (e.g. 22:00-08:00). Timezones are fixed UTC
/// offsets: "UTC", "Z", "+HH:MM", or "-HH:MM".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuietHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub timezone: String,
}

impl QuietHours {
    /// Parse the configured timezone into a fixed offset.
    /// `None` for anything unrecognized.
    pub fn offset(&self) -> Option<FixedOffset> {
        parse_fixed_offset(&self.timezone)
    }

    /// Whether `now` falls inside the window, evaluated in the configured
    /// timezone. An unparseable timezone is evaluated as UTC. A zero-length
    /// window (start == end) matches nothing.
    pub fn contains(&self, now: Timestamp) -> bool {
        let offset = self.offset().unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
        let local = now.with_timezone(&offset).time();
        if self.start == self.end {
            return false;
        }
        if self.start < self.end {
            self.start <= local && local < self.end
        } else {
            // Wraps past midnight.
            local >= self.start || local < self.end
        }
    }
}

/// Parse "UTC", "Z", "+HH:MM", "-HH:MM", "+HHMM", or "-HHMM" into a fixed
/// offset. Returns `None` for anything else.
pub fn parse_fixed_offset(tz: &str) -> Option<FixedOffset> {
    let tz = tz.trim();
    if tz.eq_ignore_ascii_case("utc") || tz == "Z" {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match tz.as_bytes().first()? {
        b'+' => (1i32, &tz[1..]),
        b'-' => (-1i32, &tz[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Per user/team notification preferences.
/// Read-only snapshots during dispatch; updated only through explicit upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    /// Ordered preferred channels. Empty means "use the severity policy's
    /// default channel set".
    pub channels: Vec<Channel>,
    pub severity_thresholds: SeverityThresholds,
    pub quiet_hours: Option<QuietHours>,
    pub escalation_delay_minutes: u32,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            severity_thresholds: SeverityThresholds::default(),
            quiet_hours: None,
            escalation_delay_minutes: 30,
        }
    }
}

/// A party to be notified about an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stakeholder {
    pub team_id: String,
    pub contact_info: String,
    pub role: String,
    pub priority: StakeholderPriority,
    /// Default preferences carried by the stakeholder record; explicit
    /// per-user preferences override these at dispatch time.
    pub notification_preferences: Option<NotificationPreferences>,
}

/// One delivery attempt on one channel. Appended, never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    pub channel: Channel,
    pub attempted_at: Timestamp,
    pub success: bool,
    pub error: Option<String>,
}

/// Audit record of one dispatch. Append-only; retry outcomes are appended to
/// `delivery_attempts` after creation, nothing else changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Format: `notif-<timestamp-millis>-<random>`.
    pub notification_id: String,
    pub recipient: String,
    pub channels: Vec<Channel>,
    pub failed_channels: Vec<Channel>,
    pub message: String,
    pub urgency: Severity,
    pub created_at: Timestamp,
    pub delivery_attempts: Vec<DeliveryAttempt>,
}

/// Audit log entry, fire-and-forget from the orchestrator's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entry_id: EntityId,
    pub action: String,
    pub subject: String,
    pub detail: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
