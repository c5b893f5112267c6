//! Domain entities and business logic
//!
//! This module contains the core domain types for dropsync:
//! - Newtypes for type-safe remote identifiers
//! - Local entry snapshots and transfer strategy selection
//! - Content-type resolution
//! - Domain-specific error types

pub mod content_type;
pub mod entry;
pub mod errors;
pub mod newtypes;

// Re-export commonly used types
pub use content_type::{ContentTypeResolver, DEFAULT_CONTENT_TYPE};
pub use entry::{EntryKind, LocalEntry, TransferStrategy};
pub use errors::DomainError;
pub use newtypes::RemoteId;
