//! Plugins — per-entity schema and behavior extension
//!
//! A plugin is applied once per entity during `initialize()`, before
//! indexes are ensured, and may add fields, hooks, and methods to the
//! entity's owned schema copy. Schemas reference plugins by registered
//! name; an unresolved name fails the initialization with
//! `UndefinedPlugin`.

mod created_by;
mod revisions;

pub use created_by::CreatedBy;
pub use revisions::Revisions;

use crate::entity::Entity;
use entitydb_core::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A schema/behavior extension applied at entity initialization
pub trait Plugin: Send + Sync {
    /// Extend the entity's schema copy
    ///
    /// # Errors
    ///
    /// A failing plugin aborts the entity's initialization.
    fn apply(&self, entity: &mut Entity) -> Result<()>;
}

impl<F> Plugin for F
where
    F: Fn(&mut Entity) -> Result<()> + Send + Sync,
{
    fn apply(&self, entity: &mut Entity) -> Result<()> {
        self(entity)
    }
}

/// A registered plugin with its admin metadata
#[derive(Clone)]
pub struct PluginEntry {
    /// Human-readable title
    pub title: String,
    /// Human-readable description
    pub description: String,
    /// The plugin callback
    pub callback: Arc<dyn Plugin>,
}

/// Registry of named plugins
///
/// In-memory only: plugin callbacks are process state, never persisted.
/// Registration is expected during the quiescent setup phase.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<HashMap<String, PluginEntry>>,
}

impl PluginRegistry {
    /// An empty registry
    pub fn new() -> Self {
        PluginRegistry::default()
    }

    /// Register a plugin under a name, replacing any previous one
    pub fn register(
        &self,
        name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        callback: Arc<dyn Plugin>,
    ) {
        self.plugins.write().insert(
            name.into(),
            PluginEntry {
                title: title.into(),
                description: description.into(),
                callback,
            },
        );
    }

    /// True if a plugin is registered under the name
    pub fn registered(&self, name: &str) -> bool {
        self.plugins.read().contains_key(name)
    }

    /// Remove a registered plugin
    ///
    /// # Errors
    ///
    /// `UndefinedPlugin` when the name is unknown.
    pub fn unregister(&self, name: &str) -> Result<()> {
        self.plugins
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::UndefinedPlugin(name.to_string()))
    }

    /// Resolve a plugin callback
    ///
    /// # Errors
    ///
    /// `UndefinedPlugin` when the name is unknown.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Plugin>> {
        self.plugins
            .read()
            .get(name)
            .map(|entry| entry.callback.clone())
            .ok_or_else(|| Error::UndefinedPlugin(name.to_string()))
    }

    /// Every registered plugin's (name, title, description), sorted by name
    pub fn all(&self) -> Vec<(String, String, String)> {
        let mut all: Vec<(String, String, String)> = self
            .plugins
            .read()
            .iter()
            .map(|(name, entry)| (name.clone(), entry.title.clone(), entry.description.clone()))
            .collect();
        all.sort();
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_resolve() {
        let registry = PluginRegistry::new();
        registry.register("noop", "No-op", "Does nothing", Arc::new(|_: &mut Entity| -> Result<()> { Ok(()) }));
        assert!(registry.registered("noop"));
        assert!(registry.get("noop").is_ok());
    }

    #[test]
    fn unknown_lookups_fail() {
        let registry = PluginRegistry::new();
        assert!(matches!(
            registry.get("missing"),
            Err(Error::UndefinedPlugin(_))
        ));
        assert!(matches!(
            registry.unregister("missing"),
            Err(Error::UndefinedPlugin(_))
        ));
    }

    #[test]
    fn unregister_removes() {
        let registry = PluginRegistry::new();
        registry.register("noop", "", "", Arc::new(|_: &mut Entity| -> Result<()> { Ok(()) }));
        registry.unregister("noop").unwrap();
        assert!(!registry.registered("noop"));
    }

    #[test]
    fn all_lists_metadata_sorted() {
        let registry = PluginRegistry::new();
        registry.register("b", "B", "second", Arc::new(|_: &mut Entity| -> Result<()> { Ok(()) }));
        registry.register("a", "A", "first", Arc::new(|_: &mut Entity| -> Result<()> { Ok(()) }));
        let all = registry.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, "a");
        assert_eq!(all[1].2, "second");
    }
}
