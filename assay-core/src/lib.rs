//! ASSAY Core - Entity Types
//!
//! Pure data structures shared by every ASSAY crate: identifiers, enums,
//! entities, and the error taxonomy. Business logic lives in the sibling
//! crates (`assay-quality`, `assay-progress`, `assay-notify`); this crate
//! contains the shapes they exchange.

mod entities;
mod enums;
mod error;
mod identity;

pub use entities::{
    AuditEntry, BlockedInfo, ComplianceStatus, DeliverableRecord, DeliveryAttempt, DimensionScore,
    ImprovementSuggestion, NotificationPreferences, NotificationRecord, ProgressSummary,
    QualityAssessmentResult, QuietHours, SeverityThresholds, Stakeholder, StatusChange,
    TodoItemRecord, parse_fixed_offset,
};
pub use enums::{
    BlockerKind, Channel, CheckKind, DeliverableStatus, EntityType, FileCategory,
    QualityDimension, Severity, StakeholderPriority, SuggestionCategory, TodoStatus,
};
pub use error::{
    AssayError, AssayResult, ChannelError, ConfigError, StorageError, ValidationError,
};
pub use identity::{
    compute_content_hash, new_entity_id, ContentHash, DeliverableId, EntityId, TaskId, Timestamp,
    TodoId,
};
