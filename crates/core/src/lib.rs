//! Core types and traits for entitydb
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: unified value enum for entity field data
//! - FieldType / FieldDefinition: the declared shape of a field slot
//! - Schema: the declarative definition of an entity type
//! - Event: the closed set of lifecycle events
//! - DocId / Document / Filter / Actor: storage-facing data types
//! - Error: error type hierarchy
//! - Traits: collaborator definitions (Collection, DocumentStore, EventBus)
//! - Validators: named value checks, including `machine-name`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod event;
pub mod field;
pub mod schema;
pub mod traits;
pub mod types;
pub mod validate;
pub mod value;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use event::Event;
pub use field::{type_matches, FieldDefinition, FieldType};
pub use schema::{BundleFields, HookRef, Schema};
pub use traits::{
    Collection, DocumentStore, EventBus, NullEventBus, SCHEMAS_COLLECTION, WASTE_COLLECTION,
};
pub use types::{Actor, DocId, Document, Filter};
pub use validate::{Validator, ValidatorRegistry};
pub use value::Value;
