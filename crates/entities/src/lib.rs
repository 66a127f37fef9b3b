//! Entity layer for entitydb
//!
//! This crate drives schema-defined entities through their persistence
//! lifecycle:
//! - Runtime: the injected collaborator bundle (store, bus, registries)
//! - Entity: a single instance with get/set, validation, save, two-phase
//!   deletion (trash/restore), and load
//! - EntityRegistry: persisted entity types and instance construction
//! - Hooks: ordered per-event pipelines plus post-success notification
//! - Actions: string-keyed hook and method callables
//! - Plugins: reusable schema extensions (`created_by`, `revisions`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod actions;
pub mod entity;
pub mod hooks;
pub mod plugins;
pub mod registry;
pub mod runtime;

// Re-export the surface most callers need
pub use actions::{ActionRegistry, HookFn, MethodFn};
pub use entity::Entity;
pub use hooks::HookContext;
pub use plugins::{CreatedBy, Plugin, PluginEntry, PluginRegistry, Revisions};
pub use registry::EntityRegistry;
pub use runtime::{Runtime, RuntimeBuilder};
