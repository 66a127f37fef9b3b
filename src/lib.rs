//! entitydb - Schema-driven entity persistence over a pluggable document store
//!
//! Entity types are defined at run time by schemas: field declarations with
//! types, defaults, required flags, and named validators, plus bundles
//! (field overlays), lifecycle hooks, plugins, and methods. Instances move
//! through a full persistence lifecycle with two-phase deletion: `trash`
//! parks a record in the shared waste collection, `restore` brings it back,
//! and only `delete` destroys it.
//!
//! # Quick Start
//!
//! ```ignore
//! use entitydb::{
//!     Actor, EntityRegistry, FieldDefinition, FieldType, MemoryStore, Runtime, Schema,
//! };
//! use std::sync::Arc;
//!
//! let runtime = Runtime::new(Arc::new(MemoryStore::new()));
//! let registry = EntityRegistry::new(runtime);
//!
//! registry.register(
//!     "page",
//!     Schema::new().with_field("title", FieldDefinition::of_type(FieldType::String)),
//! )?;
//!
//! let mut page = registry.create("page", None)?;
//! page.set("name", "front")?;
//! page.set("title", "Front page")?;
//! page.save(Actor::System)?;
//! ```
//!
//! # Architecture
//!
//! Three layers, assembled here:
//! - `entitydb-core`: values, schemas, events, errors, and the collaborator
//!   traits ([`DocumentStore`], [`EventBus`])
//! - `entitydb-store`: in-memory reference implementations of those traits
//! - `entitydb-entities`: the [`Entity`] lifecycle state machine, hook
//!   pipeline, plugins, and the [`EntityRegistry`]
//!
//! Nothing is global: every collaborator is owned by a [`Runtime`] that the
//! caller constructs and injects.

pub use entitydb_core::*;
pub use entitydb_entities::*;
pub use entitydb_store::*;
