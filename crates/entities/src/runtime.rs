//! Runtime — the explicitly owned collaborator bundle
//!
//! Everything the entity layer shares across instances hangs off one
//! `Runtime`: the document store, the event bus, and the validator,
//! action, and plugin registries. There is no process-global state; the
//! runtime is constructed at application start and injected into whatever
//! constructs entities.

use crate::actions::ActionRegistry;
use crate::plugins::{CreatedBy, PluginRegistry, Revisions};
use entitydb_core::{DocumentStore, EventBus, NullEventBus, ValidatorRegistry};
use std::sync::Arc;

/// Shared collaborator bundle for the entity layer
pub struct Runtime {
    store: Arc<dyn DocumentStore>,
    bus: Arc<dyn EventBus>,
    validators: Arc<ValidatorRegistry>,
    actions: Arc<ActionRegistry>,
    plugins: Arc<PluginRegistry>,
}

impl Runtime {
    /// A runtime over the given store with default collaborators
    ///
    /// Installs the built-in validators and the stock plugins
    /// (`created_by`, `revisions`) with their actions.
    pub fn new(store: Arc<dyn DocumentStore>) -> Arc<Self> {
        Runtime::builder(store).build()
    }

    /// Start building a runtime with custom collaborators
    pub fn builder(store: Arc<dyn DocumentStore>) -> RuntimeBuilder {
        RuntimeBuilder {
            store,
            bus: None,
            validators: None,
        }
    }

    /// The document store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// The global event bus
    pub fn bus(&self) -> &Arc<dyn EventBus> {
        &self.bus
    }

    /// The named-validator registry
    pub fn validators(&self) -> &Arc<ValidatorRegistry> {
        &self.validators
    }

    /// The hook/method action registry
    pub fn actions(&self) -> &Arc<ActionRegistry> {
        &self.actions
    }

    /// The plugin registry
    pub fn plugins(&self) -> &Arc<PluginRegistry> {
        &self.plugins
    }
}

/// Builder for [`Runtime`]
pub struct RuntimeBuilder {
    store: Arc<dyn DocumentStore>,
    bus: Option<Arc<dyn EventBus>>,
    validators: Option<Arc<ValidatorRegistry>>,
}

impl RuntimeBuilder {
    /// Use a custom event bus (default: [`NullEventBus`])
    #[must_use]
    pub fn with_bus(mut self, bus: Arc<dyn EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Use a custom validator registry (default: built-ins installed)
    #[must_use]
    pub fn with_validators(mut self, validators: Arc<ValidatorRegistry>) -> Self {
        self.validators = Some(validators);
        self
    }

    /// Finish the runtime and install the stock plugins
    pub fn build(self) -> Arc<Runtime> {
        let actions = Arc::new(ActionRegistry::new());
        let plugins = Arc::new(PluginRegistry::new());
        CreatedBy::install(&plugins, &actions);
        Revisions::install(&plugins, &actions);

        Arc::new(Runtime {
            store: self.store,
            bus: self.bus.unwrap_or_else(|| Arc::new(NullEventBus)),
            validators: self
                .validators
                .unwrap_or_else(|| Arc::new(ValidatorRegistry::new())),
            actions,
            plugins,
        })
    }
}
