//! ASSAY Storage - Storage Traits and In-Memory Implementation
//!
//! Defines the async storage seams the ASSAY core computes against:
//! deliverables, todo items (with an append-only status-change journal),
//! notification records, notification preferences, and the audit log.
//! Production backends live behind these traits; `MemoryStore` provides the
//! embedded/in-test implementation.

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::{
    AuditLog, DeliverableStore, DeliverableUpdate, NotificationStore, PreferenceStore, TimeRange,
    TodoStore,
};
