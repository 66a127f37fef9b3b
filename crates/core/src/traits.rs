//! Collaborator traits: document store and event bus
//!
//! The entity layer owns no storage engine. Everything it needs from one
//! is expressed here, so backends can be swapped without touching the
//! layers above. The same goes for the global named-event dispatcher.

use crate::error::Result;
use crate::types::{DocId, Document, Filter};
use crate::value::Value;
use std::sync::Arc;

/// A named document collection
///
/// The operation set is deliberately minimal — equality lookups, counted
/// matches, insert, upsert-by-identity, removal, and index creation.
/// Atomicity is whatever the backing store natively provides per document;
/// the entity layer adds no cross-document coordination.
///
/// Thread safety: all methods must be safe to call concurrently
/// (requires Send + Sync).
pub trait Collection: Send + Sync {
    /// Find the first document matching the filter
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn find_one(&self, filter: &Filter) -> Result<Option<Document>>;

    /// Count documents matching the filter
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn count(&self, filter: &Filter) -> Result<usize>;

    /// Insert a new document, assigning an identity if it has none
    ///
    /// Returns the identity of the stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails or a unique index
    /// is violated.
    fn insert(&self, doc: Document) -> Result<DocId>;

    /// Upsert by identity: insert when the document has no identity,
    /// otherwise replace the document with that identity
    ///
    /// Returns the (possibly newly assigned) identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails or a unique index
    /// is violated.
    fn save(&self, doc: Document) -> Result<DocId>;

    /// Remove every document matching the filter
    ///
    /// Returns the number of documents removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn remove(&self, filter: &Filter) -> Result<usize>;

    /// Ensure an index on the named field
    ///
    /// Idempotent: repeated calls for the same field are allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn create_index(&self, field: &str, unique: bool) -> Result<()>;
}

/// Named-collection accessor
///
/// Two collection names are reserved beyond the per-type ones:
/// `entity_schemas` (persisted type schemas) and `waste` (soft-deleted
/// entity payloads).
pub trait DocumentStore: Send + Sync {
    /// Access a collection by name, creating it on first use
    fn collection(&self, name: &str) -> Arc<dyn Collection>;
}

/// Collection name for persisted type schemas
pub const SCHEMAS_COLLECTION: &str = "entity_schemas";

/// Collection name for the waste store
pub const WASTE_COLLECTION: &str = "waste";

/// Global named-event dispatcher
///
/// Post-success notification only: the hook pipeline has already run and
/// succeeded by the time a dispatch goes out, so failures here cannot veto
/// anything. Implementations must not block the calling operation on
/// subscriber work.
pub trait EventBus: Send + Sync {
    /// Dispatch a payload on the named channels, in order
    fn dispatch(&self, channels: &[String], payload: &Value);
}

/// Event bus that drops every dispatch
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn dispatch(&self, _channels: &[String], _payload: &Value) {}
}
