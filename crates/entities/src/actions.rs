//! Action registry — string-keyed callables
//!
//! Persisted schemas never contain source text; hooks and methods are
//! referenced by key (`@action{<key>}`) and resolved here at run time.
//! The registry is owned by the [`Runtime`](crate::Runtime) and populated
//! during the quiescent setup phase, before traffic exercises the types
//! that reference its keys.

use crate::entity::Entity;
use crate::hooks::HookContext;
use entitydb_core::{Error, Result, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A hook callable: runs against the entity at a lifecycle event and may
/// veto the event by failing or rewrite the context it is handed
pub type HookFn = Arc<dyn Fn(&mut Entity, &mut HookContext) -> Result<()> + Send + Sync>;

/// A method callable: schema-declared behavior invoked through
/// [`Entity::call`](crate::Entity::call)
pub type MethodFn = Arc<dyn Fn(&mut Entity, &[Value]) -> Result<Value> + Send + Sync>;

/// Registry of hook and method callables, keyed by action name
#[derive(Default)]
pub struct ActionRegistry {
    hooks: RwLock<HashMap<String, HookFn>>,
    methods: RwLock<HashMap<String, MethodFn>>,
}

impl ActionRegistry {
    /// An empty registry
    pub fn new() -> Self {
        ActionRegistry::default()
    }

    /// Register a hook callable, replacing any previous one under the key
    pub fn register_hook<F>(&self, key: impl Into<String>, hook: F)
    where
        F: Fn(&mut Entity, &mut HookContext) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.write().insert(key.into(), Arc::new(hook));
    }

    /// Register a method callable, replacing any previous one under the key
    pub fn register_method<F>(&self, key: impl Into<String>, method: F)
    where
        F: Fn(&mut Entity, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.write().insert(key.into(), Arc::new(method));
    }

    /// True if a hook is registered under the key
    pub fn registered_hook(&self, key: &str) -> bool {
        self.hooks.read().contains_key(key)
    }

    /// True if a method is registered under the key
    pub fn registered_method(&self, key: &str) -> bool {
        self.methods.read().contains_key(key)
    }

    /// Resolve a hook callable
    ///
    /// # Errors
    ///
    /// `UndefinedAction` when nothing is registered under the key.
    pub fn hook(&self, key: &str) -> Result<HookFn> {
        self.hooks
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::UndefinedAction(key.to_string()))
    }

    /// Resolve a method callable
    ///
    /// # Errors
    ///
    /// `UndefinedAction` when nothing is registered under the key.
    pub fn method(&self, key: &str) -> Result<MethodFn> {
        self.methods
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::UndefinedAction(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_registration_and_lookup() {
        let registry = ActionRegistry::new();
        assert!(!registry.registered_hook("noop"));
        registry.register_hook("noop", |_entity, _ctx| Ok(()));
        assert!(registry.registered_hook("noop"));
        assert!(registry.hook("noop").is_ok());
    }

    #[test]
    fn unknown_keys_fail() {
        let registry = ActionRegistry::new();
        assert!(matches!(
            registry.hook("missing"),
            Err(Error::UndefinedAction(_))
        ));
        assert!(matches!(
            registry.method("missing"),
            Err(Error::UndefinedAction(_))
        ));
    }

    #[test]
    fn method_registration_and_lookup() {
        let registry = ActionRegistry::new();
        registry.register_method("answer", |_entity, _args| Ok(Value::Int(42)));
        assert!(registry.registered_method("answer"));
        assert!(registry.method("answer").is_ok());
    }

    #[test]
    fn hooks_and_methods_are_separate_namespaces() {
        let registry = ActionRegistry::new();
        registry.register_hook("same-key", |_entity, _ctx| Ok(()));
        assert!(!registry.registered_method("same-key"));
    }
}
