//! Entity type registry
//!
//! Entity types are registered with a schema, persisted as documents in
//! the `entity_schemas` collection, and resolved back into [`Schema`]
//! values on demand. The registry is also the front door for constructing
//! entity instances: [`create`](EntityRegistry::create) for fresh ones,
//! [`load`](EntityRegistry::load) for persisted ones.

use crate::entity::Entity;
use crate::plugins::Plugin;
use crate::runtime::Runtime;
use entitydb_core::{
    Collection, Document, Error, Filter, Result, Schema, Value, SCHEMAS_COLLECTION,
};
use std::sync::Arc;

/// Registry of entity types backed by the `entity_schemas` collection
pub struct EntityRegistry {
    runtime: Arc<Runtime>,
}

impl EntityRegistry {
    /// A registry over the given runtime
    pub fn new(runtime: Arc<Runtime>) -> Self {
        EntityRegistry { runtime }
    }

    /// The shared runtime
    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    fn schemas(&self) -> Arc<dyn Collection> {
        self.runtime.store().collection(SCHEMAS_COLLECTION)
    }

    /// Register a new entity type
    ///
    /// The type name must be a machine name. The schema is normalized
    /// (collection name, hook lists, implicit base fields) before being
    /// persisted.
    ///
    /// # Errors
    ///
    /// `InvalidEntityType` for a malformed name, `AlreadyRegistered` when
    /// a schema document for the type exists, plus storage failures.
    pub fn register(&self, entity_type: &str, mut schema: Schema) -> Result<()> {
        if self
            .runtime
            .validators()
            .validate("machine-name", &Value::from(entity_type))
            .is_err()
        {
            return Err(Error::InvalidEntityType(entity_type.to_string()));
        }
        if self.registered(entity_type)? {
            return Err(Error::AlreadyRegistered(entity_type.to_string()));
        }

        schema.normalize(entity_type);
        schema.ensure_base_fields();
        let doc = Document::new()
            .with("type", entity_type)
            .with("schema", schema.to_value()?);
        self.schemas().insert(doc)?;
        tracing::info!(entity_type, "entity type registered");
        Ok(())
    }

    /// Replace a registered type's schema
    ///
    /// # Errors
    ///
    /// `UndefinedEntityType` when the type was never registered.
    pub fn update(&self, entity_type: &str, mut schema: Schema) -> Result<()> {
        let schemas = self.schemas();
        let Some(existing) = schemas.find_one(&Filter::by_field("type", entity_type))? else {
            return Err(Error::UndefinedEntityType(entity_type.to_string()));
        };

        schema.normalize(entity_type);
        schema.ensure_base_fields();
        let mut doc = Document::new()
            .with("type", entity_type)
            .with("schema", schema.to_value()?);
        doc.id = existing.id;
        schemas.save(doc)?;
        Ok(())
    }

    /// True when a schema document exists for the type
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub fn registered(&self, entity_type: &str) -> Result<bool> {
        Ok(self.schemas().count(&Filter::by_field("type", entity_type))? > 0)
    }

    /// Remove a registered type's schema document
    ///
    /// Existing entity records in the type's collection are untouched.
    ///
    /// # Errors
    ///
    /// `UndefinedEntityType` when no schema document exists.
    pub fn unregister(&self, entity_type: &str) -> Result<()> {
        let removed = self
            .schemas()
            .remove(&Filter::by_field("type", entity_type))?;
        if removed == 0 {
            return Err(Error::UndefinedEntityType(entity_type.to_string()));
        }
        tracing::info!(entity_type, "entity type unregistered");
        Ok(())
    }

    /// Resolve a registered type's schema
    ///
    /// # Errors
    ///
    /// `UndefinedEntityType` when no schema document exists,
    /// `UnknownSchema` when the document carries no usable schema value.
    pub fn schema(&self, entity_type: &str) -> Result<Schema> {
        let Some(doc) = self
            .schemas()
            .find_one(&Filter::by_field("type", entity_type))?
        else {
            return Err(Error::UndefinedEntityType(entity_type.to_string()));
        };
        let Some(value) = doc.get("schema") else {
            return Err(Error::UnknownSchema(entity_type.to_string()));
        };
        Schema::from_value(value)
    }

    /// Construct and initialize a fresh entity of a registered type
    ///
    /// # Errors
    ///
    /// Schema resolution failures, initialization failures, and
    /// `UndefinedBundle` for an undeclared bundle.
    pub fn create(&self, entity_type: &str, bundle: Option<&str>) -> Result<Entity> {
        let schema = self.schema(entity_type)?;
        let mut entity = Entity::new(entity_type, schema, self.runtime.clone());
        entity.initialize()?;
        if let Some(bundle) = bundle {
            entity.set_bundle(bundle)?;
        }
        Ok(entity)
    }

    /// Load a persisted entity of a registered type by machine name
    ///
    /// Falls back to the waste collection like
    /// [`Entity::load`](crate::Entity::load) does.
    ///
    /// # Errors
    ///
    /// Schema resolution failures plus everything `Entity::load` can fail
    /// with.
    pub fn load(&self, entity_type: &str, name: &str) -> Result<Entity> {
        let schema = self.schema(entity_type)?;
        let mut entity = Entity::new(entity_type, schema, self.runtime.clone());
        // Plugins must extend the schema before loaded data is filtered
        // against it.
        entity.initialize()?;
        entity.load(Some(name))?;
        Ok(entity)
    }

    /// True when a record with the machine name exists for the type
    ///
    /// Checks the primary collection only; trashed entities do not count
    /// as existing.
    ///
    /// # Errors
    ///
    /// `UnknownSchema` when the resolved schema names no collection, plus
    /// resolution and storage failures.
    pub fn exists(&self, entity_type: &str, name: &str) -> Result<bool> {
        let schema = self.schema(entity_type)?;
        let collection = schema
            .collection
            .ok_or_else(|| Error::UnknownSchema(entity_type.to_string()))?;
        let count = self
            .runtime
            .store()
            .collection(&collection)
            .count(&Filter::by_field("name", name))?;
        Ok(count > 0)
    }

    /// Register a plugin on the shared runtime
    pub fn register_plugin(
        &self,
        name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        callback: Arc<dyn Plugin>,
    ) {
        self.runtime
            .plugins()
            .register(name, title, description, callback);
    }

    /// Remove a plugin from the shared runtime
    ///
    /// # Errors
    ///
    /// `UndefinedPlugin` when the name is unknown.
    pub fn unregister_plugin(&self, name: &str) -> Result<()> {
        self.runtime.plugins().unregister(name)
    }

    /// True when a plugin is registered under the name
    pub fn registered_plugin(&self, name: &str) -> bool {
        self.runtime.plugins().registered(name)
    }

    /// Resolve a plugin callback from the shared runtime
    ///
    /// # Errors
    ///
    /// `UndefinedPlugin` when the name is unknown.
    pub fn plugin(&self, name: &str) -> Result<Arc<dyn Plugin>> {
        self.runtime.plugins().get(name)
    }

    /// Every registered plugin's (name, title, description)
    pub fn plugins(&self) -> Vec<(String, String, String)> {
        self.runtime.plugins().all()
    }
}
