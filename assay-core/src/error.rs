//! Error types for ASSAY operations

use crate::{Channel, EntityId, EntityType, TodoStatus};
use thiserror::Error;

/// Quality standard configuration errors.
///
/// Raised before any scoring work begins; a config that fails static
/// validation is never silently coerced.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid quality standard configuration: {}", violations.join("; "))]
    InvalidStandard { violations: Vec<String> },

    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Caller input validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid date range: {reason}")]
    InvalidDateRange { reason: String },

    #[error("Invalid status transition for todo {todo_id}: {from:?} -> {to:?}")]
    InvalidTransition {
        todo_id: EntityId,
        from: TodoStatus,
        to: TodoStatus,
    },

    #[error("Todo {todo_id} has unresolved dependencies: {unmet:?}")]
    UnresolvedDependencies {
        todo_id: EntityId,
        unmet: Vec<EntityId>,
    },
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: EntityId },

    #[error("Version {version} not found for deliverable {id}")]
    VersionNotFound { id: EntityId, version: u32 },

    #[error("Notification not found: {id}")]
    NotificationNotFound { id: String },

    #[error("Insert failed for {entity_type:?}: {reason}")]
    InsertFailed { entity_type: EntityType, reason: String },

    #[error("Update failed for {entity_type:?} with id {id}: {reason}")]
    UpdateFailed {
        entity_type: EntityType,
        id: EntityId,
        reason: String,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Channel adapter errors.
///
/// Per-channel failures during fan-out are caught and aggregated into the
/// dispatch result; they surface here only from the adapter itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Delivery via {channel} to {recipient} failed: {reason}")]
    DeliveryFailed {
        channel: Channel,
        recipient: String,
        reason: String,
    },

    #[error("Message rejected by {channel}: {reason}")]
    MessageRejected { channel: Channel, reason: String },

    #[error("Channel {channel} is not configured")]
    NotConfigured { channel: Channel },
}

/// Master error type for all ASSAY errors.
#[derive(Debug, Clone, Error)]
pub enum AssayError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Result type alias for ASSAY operations.
pub type AssayResult<T> = Result<T, AssayError>;

// =============================================================================
// TESTS
// =============================================================================
