//! Error types for the entity layer
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Every variant is terminal: a failing pipeline stage short-circuits the
//! remaining stages of its operation and the error is returned to the caller
//! unchanged. Nothing here is retried locally.

use thiserror::Error;

/// Result type alias for entity operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the entity layer
#[derive(Debug, Error)]
pub enum Error {
    /// An entity type schema has already been registered under this name
    #[error("Entity type already registered: {0}")]
    AlreadyRegistered(String),

    /// No schema document exists for the requested entity type
    #[error("Undefined entity type: {0}")]
    UndefinedEntityType(String),

    /// The loaded schema is structurally unusable (e.g. no collection name)
    #[error("Unknown schema for entity type: {0}")]
    UnknownSchema(String),

    /// The entity type name itself is invalid
    #[error("Invalid entity type: {0}")]
    InvalidEntityType(String),

    /// A named plugin has not been registered
    #[error("Undefined plugin: {0}")]
    UndefinedPlugin(String),

    /// A field is not declared in the effective schema
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A value does not match the field's declared type
    #[error("Invalid type for field {field}: expected {expected}")]
    InvalidType {
        /// The offending field
        field: String,
        /// The declared field type
        expected: String,
    },

    /// A required field has no value
    #[error("Required field: {0}")]
    RequiredField(String),

    /// The effective field set is empty, nothing to validate
    #[error("Entity type {0} has no fields")]
    NoFields(String),

    /// The named bundle is not declared in the schema
    #[error("Undefined bundle {bundle} for entity type {entity_type}")]
    UndefinedBundle {
        /// The entity type whose schema was consulted
        entity_type: String,
        /// The missing bundle name
        bundle: String,
    },

    /// A load was attempted without a machine name to look up
    #[error("Undefined name for entity type {0}")]
    UndefinedName(String),

    /// No record exists in the primary collection or the waste store
    #[error("Entity not found: {entity_type} with {key} = {value}")]
    EntityNotFound {
        /// The entity type searched
        entity_type: String,
        /// The lookup key (usually "name")
        key: String,
        /// The lookup value
        value: String,
    },

    /// A trashed entity cannot be saved until restored
    #[error("Can't save trashed entity: {entity_type} ({name})")]
    CantSaveTrashed {
        /// The entity type
        entity_type: String,
        /// The entity machine name
        name: String,
    },

    /// The entity is already in the waste store
    #[error("Can't trash an already trashed entity")]
    CantTrashTrashed,

    /// A restore was attempted but no waste record exists
    #[error("Entity not trashed: {entity_type} ({name})")]
    EntityNotTrashed {
        /// The entity type
        entity_type: String,
        /// The entity machine name
        name: String,
    },

    /// The operation requires a persisted identity
    #[error("Missing entity ID")]
    MissingId,

    /// A named validator is not registered
    #[error("Undefined validator: {0}")]
    UndefinedValidator(String),

    /// A named validator rejected the value
    #[error("Validation failed ({validator}): {reason}")]
    ValidationFailed {
        /// The validator that rejected the value
        validator: String,
        /// Human-readable rejection reason
        reason: String,
    },

    /// A named hook or method action is not registered
    #[error("Undefined action: {0}")]
    UndefinedAction(String),

    /// Schema (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Storage collaborator error
    #[error("Storage error: {0}")]
    Storage(String),

    /// A hook vetoed the operation
    #[error("Hook {hook} aborted {event}: {reason}")]
    HookAborted {
        /// The registered action key of the hook
        hook: String,
        /// The lifecycle event being executed
        event: String,
        /// The hook's stated reason
        reason: String,
    },
}
