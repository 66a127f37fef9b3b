//! The entity instance: a schema-driven record with a lifecycle
//!
//! An `Entity` pairs an owned schema copy with raw field data and drives
//! the full persistence lifecycle: initialize, get/set, validate, save,
//! trash, restore, delete, load. Every lifecycle operation runs its hook
//! pipeline; every successful operation is announced on the runtime bus.
//!
//! Deletion is two-phase. `trash` moves the record into the `waste`
//! collection (with provenance metadata) and removes it from its primary
//! collection; `restore` moves it back; only `delete` destroys the record
//! for good. A trashed entity refuses saves until restored.

use crate::hooks::{self, HookContext};
use crate::runtime::Runtime;
use chrono::Utc;
use entitydb_core::{
    type_matches, Actor, Collection, DocId, Document, Error, Event, FieldDefinition, Filter,
    HookRef, Result, Schema, Value, WASTE_COLLECTION,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A single entity instance of a registered type
pub struct Entity {
    entity_type: String,
    schema: Schema,
    runtime: Arc<Runtime>,
    bundle: Option<String>,
    id: Option<DocId>,
    raw: BTreeMap<String, Value>,
    is_new: bool,
    is_updated: bool,
    is_trashed: bool,
    methods: BTreeMap<String, HookRef>,
    plugins_applied: bool,
}

impl Entity {
    /// A fresh, uninitialized entity of the given type
    ///
    /// Normalizes the schema copy (collection name, hook lists) and
    /// installs the implicit `name`/`bundle` base fields. Callers are
    /// expected to run [`initialize`](Entity::initialize) before using
    /// the instance; [`EntityRegistry::create`](crate::EntityRegistry::create)
    /// does both.
    pub fn new(entity_type: impl Into<String>, mut schema: Schema, runtime: Arc<Runtime>) -> Self {
        let entity_type = entity_type.into();
        schema.normalize(&entity_type);
        schema.ensure_base_fields();
        Entity {
            entity_type,
            schema,
            runtime,
            bundle: None,
            id: None,
            raw: BTreeMap::new(),
            is_new: true,
            is_updated: false,
            is_trashed: false,
            methods: BTreeMap::new(),
            plugins_applied: false,
        }
    }

    /// The entity type name
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The entity's owned schema copy
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Mutable access to the owned schema copy (used by plugins)
    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    /// The shared runtime
    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// The persisted identity, absent until first save
    pub fn id(&self) -> Option<DocId> {
        self.id
    }

    /// The active bundle, if any
    pub fn bundle(&self) -> Option<&str> {
        self.bundle.as_deref()
    }

    /// The entity's machine name, once set
    pub fn name(&self) -> Option<&str> {
        self.raw.get("name").and_then(Value::as_str)
    }

    /// True until the first successful save
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// True once a field has been mutated; only [`delete`](Entity::delete)
    /// resets it
    pub fn is_updated(&self) -> bool {
        self.is_updated
    }

    /// True while the record lives in the waste collection
    pub fn is_trashed(&self) -> bool {
        self.is_trashed
    }

    /// This entity as an actor descriptor, for operations it drives
    pub fn actor(&self) -> Actor {
        Actor::Entity {
            entity_type: self.entity_type.clone(),
            id: self.id,
        }
    }

    /// A raw field value, bypassing defaults and the `get` pipeline
    pub fn raw_value(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    /// Write a raw field value, bypassing validation and the `set` pipeline
    ///
    /// Hook and plugin territory; regular callers go through
    /// [`set`](Entity::set).
    pub fn set_raw(&mut self, name: impl Into<String>, value: Value) {
        self.raw.insert(name.into(), value);
    }

    /// Snapshot of the entity as a storage document
    ///
    /// Realizes the effective field set: every declared field appears,
    /// holding its raw value, else its declared default, else `Null`.
    /// Raw keys outside the effective set are not carried.
    pub fn raw_document(&self) -> Document {
        let mut fields = BTreeMap::new();
        for (name, fld) in self.schema.effective_fields(self.bundle.as_deref()) {
            let value = self
                .raw
                .get(&name)
                .cloned()
                .or(fld.default)
                .unwrap_or(Value::Null);
            fields.insert(name, value);
        }
        Document {
            id: self.id,
            fields,
        }
    }

    /// The entity's primary storage collection
    fn collection(&self) -> Arc<dyn Collection> {
        let name = self
            .schema
            .collection
            .clone()
            .unwrap_or_else(|| format!("entities_{}", self.entity_type));
        self.runtime.store().collection(&name)
    }

    /// The shared waste collection
    fn waste(&self) -> Arc<dyn Collection> {
        self.runtime.store().collection(WASTE_COLLECTION)
    }

    /// Prepare the instance for use
    ///
    /// Applies the schema's plugins (once per instance), adopts the schema
    /// method map, ensures declared indexes, and materializes field
    /// defaults into the raw data. Runs the `init` pipeline.
    ///
    /// # Errors
    ///
    /// Fails when a plugin name is unregistered, a plugin itself fails,
    /// index creation fails, or an `init` hook vetoes.
    pub fn initialize(&mut self) -> Result<()> {
        if !self.plugins_applied {
            for name in self.schema.plugins.clone() {
                let plugin = self.runtime.plugins().get(&name)?;
                plugin.apply(self)?;
            }
            self.plugins_applied = true;
        }
        self.methods = self.schema.methods.clone();

        let collection = self.collection();
        for (name, fld) in self.schema.effective_fields(self.bundle.as_deref()) {
            if fld.index {
                collection.create_index(&name, fld.unique)?;
            }
            if let Some(default) = fld.default {
                self.raw.entry(name).or_insert(default);
            }
        }

        let mut ctx = HookContext::for_event(Event::Init);
        hooks::run(self, &mut ctx)
    }

    /// Activate a declared bundle; an empty name deactivates
    ///
    /// # Errors
    ///
    /// `UndefinedBundle` when the schema declares no such bundle.
    pub fn set_bundle(&mut self, bundle: &str) -> Result<()> {
        if bundle.is_empty() {
            self.bundle = None;
        } else if self.schema.has_bundle(bundle) {
            self.bundle = Some(bundle.to_string());
        } else {
            return Err(Error::UndefinedBundle {
                entity_type: self.entity_type.clone(),
                bundle: bundle.to_string(),
            });
        }
        self.raw
            .insert("bundle".to_string(), Value::String(bundle.to_string()));
        Ok(())
    }

    /// The effective definition of a declared field
    ///
    /// # Errors
    ///
    /// `UnknownField` when neither the base fields nor the active bundle
    /// declare the name.
    pub fn get_field(&self, name: &str) -> Result<&FieldDefinition> {
        self.schema
            .field(self.bundle.as_deref(), name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    /// True when the field is declared and holds a non-null raw value or
    /// declares a default
    ///
    /// `Null` doubles as absence throughout the layer, so a field
    /// explicitly assigned `Null` reads as not held.
    pub fn has(&self, name: &str) -> bool {
        let Ok(fld) = self.get_field(name) else {
            return false;
        };
        self.raw.get(name).is_some_and(|v| !v.is_null()) || fld.default.is_some()
    }

    /// Read a field value
    ///
    /// Resolution order: raw value, then field default, then `Null`.
    /// A pure read; the `get` event exists for subscribers but no
    /// pipeline runs here.
    ///
    /// # Errors
    ///
    /// `UnknownField` when the effective schema does not declare the name.
    pub fn get(&self, name: &str) -> Result<Value> {
        let fld = self.get_field(name)?;
        Ok(self
            .raw
            .get(name)
            .cloned()
            .or_else(|| fld.default.clone())
            .unwrap_or(Value::Null))
    }

    /// Assign a field through the `set` pipeline
    ///
    /// Only base-schema fields are settable here; a field declared solely
    /// by a bundle overlay aborts with `UnknownField` like an undeclared
    /// one (overlay definitions still govern validation of same-named base
    /// fields). A value failing the field's checks is absorbed: the
    /// assignment is skipped and `Ok` is returned, leaving the previous
    /// value in place. Hooks may rewrite the value before it is committed.
    ///
    /// # Errors
    ///
    /// `UnknownField`, or whatever a `set` hook fails with.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if !self.schema.fields.contains_key(name) {
            return Err(Error::UnknownField(name.to_string()));
        }
        if let Err(err) = self.validate_field(name, &value) {
            tracing::debug!(
                entity_type = %self.entity_type,
                field = name,
                error = %err,
                "field assignment absorbed"
            );
            return Ok(());
        }

        let mut ctx = HookContext::for_event(Event::Set).with_field(name, value);
        hooks::run(self, &mut ctx)?;
        self.raw
            .insert(name.to_string(), ctx.value.unwrap_or(Value::Null));
        self.is_updated = true;
        Ok(())
    }

    /// Assign several fields, in map order
    ///
    /// # Errors
    ///
    /// Stops at the first `UnknownField` or hook failure.
    pub fn set_many(&mut self, values: BTreeMap<String, Value>) -> Result<()> {
        for (name, value) in values {
            self.set(&name, value)?;
        }
        Ok(())
    }

    /// Check one value against a field's declared type, required flag, and
    /// named validators
    ///
    /// # Errors
    ///
    /// `UnknownField`, `InvalidType`, `RequiredField`, or a validator
    /// failure, in that order.
    pub fn validate_field(&self, name: &str, value: &Value) -> Result<()> {
        let fld = self.get_field(name)?;
        if let Some(ty) = fld.field_type {
            if !value.is_null() && !type_matches(value, ty) {
                return Err(Error::InvalidType {
                    field: name.to_string(),
                    expected: ty.to_string(),
                });
            }
        }
        if fld.required && value.is_null() {
            return Err(Error::RequiredField(name.to_string()));
        }
        for validator in &fld.validators {
            self.runtime.validators().validate(validator, value)?;
        }
        Ok(())
    }

    /// Validate the whole entity against its effective field set
    ///
    /// Absent fields are checked as `Null`, which is what trips the
    /// required check. Runs the `validate` pipeline after the field checks
    /// pass, so hooks can veto beyond the declarative rules.
    ///
    /// # Errors
    ///
    /// `NoFields` on an empty effective field set, otherwise the first
    /// failing field or hook.
    pub fn validate(&mut self) -> Result<()> {
        let fields = self.schema.effective_fields(self.bundle.as_deref());
        if fields.is_empty() {
            return Err(Error::NoFields(self.entity_type.clone()));
        }
        for name in fields.keys() {
            let value = self.raw.get(name).cloned().unwrap_or(Value::Null);
            self.validate_field(name, &value)?;
        }

        let mut ctx = HookContext::for_event(Event::Validate).with_data(self.raw_document());
        hooks::run(self, &mut ctx)
    }

    /// Validate and persist the entity
    ///
    /// The `presave` pipeline receives the outgoing data snapshot and may
    /// rewrite it; the (possibly rewritten) snapshot is what gets stored.
    /// On success the entity adopts the assigned identity and clears its
    /// new flag before the `saved` pipeline runs.
    ///
    /// # Errors
    ///
    /// `CantSaveTrashed` while trashed, validation failures, hook vetoes,
    /// and storage failures (including unique-index violations on `name`).
    pub fn save(&mut self, actor: Actor) -> Result<()> {
        if self.is_trashed {
            return Err(Error::CantSaveTrashed {
                entity_type: self.entity_type.clone(),
                name: self.name().unwrap_or_default().to_string(),
            });
        }
        self.validate()?;

        let mut ctx = HookContext::for_event(Event::Presave)
            .with_data(self.raw_document())
            .with_actor(actor.clone());
        hooks::run(self, &mut ctx)?;

        let data = ctx.data.take().unwrap_or_else(|| self.raw_document());
        let id = self.collection().save(data.clone())?;
        self.id = Some(id);
        self.is_new = false;
        tracing::debug!(entity_type = %self.entity_type, %id, "entity saved");

        let mut saved = HookContext::for_event(Event::Saved)
            .with_data(data.with_id(id))
            .with_actor(actor);
        hooks::run(self, &mut saved)
    }

    /// Move the entity into the waste collection (first deletion phase)
    ///
    /// The waste record keeps the entity's identity and wraps the data
    /// snapshot with type, name, and a `trashedOn` `{when, who}` stamp.
    /// The primary record is removed afterwards; when that removal fails
    /// the error propagates and the already-inserted waste record stays
    /// behind, so both copies exist until reconciled.
    ///
    /// # Errors
    ///
    /// `MissingId` before the first save, `CantTrashTrashed` when already
    /// trashed, hook vetoes, and storage failures on either collection.
    pub fn trash(&mut self, actor: Actor) -> Result<()> {
        let id = self.id.ok_or(Error::MissingId)?;
        if self.is_trashed {
            return Err(Error::CantTrashTrashed);
        }

        let mut ctx = HookContext::for_event(Event::Pretrash)
            .with_data(self.raw_document())
            .with_actor(actor.clone());
        hooks::run(self, &mut ctx)?;

        let mut stamp = BTreeMap::new();
        stamp.insert("when".to_string(), Value::Int(Utc::now().timestamp_millis()));
        stamp.insert("who".to_string(), actor.to_value());
        let record = Document::new()
            .with_id(id)
            .with("type", self.entity_type.clone())
            .with("name", self.name().unwrap_or_default().to_string())
            .with("data", Value::Object(self.raw_document().fields))
            .with("trashedOn", Value::Object(stamp));
        self.waste().insert(record)?;

        match self.collection().remove(&Filter::by_id(id)) {
            Ok(0) => tracing::warn!(
                entity_type = %self.entity_type,
                %id,
                "trashed entity had no primary record to remove"
            ),
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(
                    entity_type = %self.entity_type,
                    %id,
                    error = %err,
                    "primary removal failed after waste insert; both copies remain"
                );
                return Err(err);
            }
        }
        self.is_trashed = true;

        let mut trashed = HookContext::for_event(Event::Trashed).with_actor(actor);
        hooks::run(self, &mut trashed)
    }

    /// Move the entity back out of the waste collection
    ///
    /// Looks the waste record up by type and name, re-adopts its payload,
    /// saves the entity back into its primary collection, and only then
    /// removes the waste record.
    ///
    /// # Errors
    ///
    /// `UndefinedName` without a machine name, `EntityNotTrashed` when no
    /// waste record exists, plus anything the inner save can fail with.
    pub fn restore(&mut self, actor: Actor) -> Result<()> {
        let name = self
            .name()
            .map(str::to_string)
            .ok_or_else(|| Error::UndefinedName(self.entity_type.clone()))?;

        let mut ctx = HookContext::for_event(Event::Prerestore).with_actor(actor.clone());
        hooks::run(self, &mut ctx)?;

        let waste = self.waste();
        let filter =
            Filter::by_field("type", self.entity_type.clone()).and("name", name.clone());
        let Some(record) = waste.find_one(&filter)? else {
            return Err(Error::EntityNotTrashed {
                entity_type: self.entity_type.clone(),
                name,
            });
        };

        if let Some(Value::Object(data)) = record.get("data").cloned() {
            self.raw = data;
        }
        self.id = record.id;
        self.is_trashed = false;
        self.save(actor.clone())?;
        if let Some(waste_id) = record.id {
            waste.remove(&Filter::by_id(waste_id))?;
        }

        let mut restored = HookContext::for_event(Event::Restored)
            .with_data(self.raw_document())
            .with_actor(actor);
        hooks::run(self, &mut restored)
    }

    /// Destroy the record for good (second deletion phase)
    ///
    /// Removes whichever of the waste record and the primary record exist
    /// and resets the instance to a fresh, unpersisted state.
    ///
    /// # Errors
    ///
    /// `MissingId` when the entity was never persisted, hook vetoes, and
    /// storage failures.
    pub fn delete(&mut self) -> Result<()> {
        let id = self.id.ok_or(Error::MissingId)?;

        let mut ctx = HookContext::for_event(Event::Predelete);
        hooks::run(self, &mut ctx)?;

        self.waste().remove(&Filter::by_id(id))?;
        self.collection().remove(&Filter::by_id(id))?;
        self.id = None;
        self.is_new = true;
        self.is_updated = false;
        self.is_trashed = false;

        let mut deleted = HookContext::for_event(Event::Deleted);
        hooks::run(self, &mut deleted)
    }

    /// Load a persisted entity by machine name
    ///
    /// Looks in the primary collection first; when absent, falls back to
    /// the waste collection (matching type and name), in which case the
    /// loaded instance is marked trashed. With no argument the entity's
    /// current `name` field is used.
    ///
    /// # Errors
    ///
    /// `UndefinedName` without a name to look up, `EntityNotFound` when
    /// neither collection has a record, plus initialization failures.
    pub fn load(&mut self, name: Option<&str>) -> Result<()> {
        let name = name
            .map(str::to_string)
            .or_else(|| self.name().map(str::to_string))
            .ok_or_else(|| Error::UndefinedName(self.entity_type.clone()))?;

        if let Some(doc) = self.collection().find_one(&Filter::by_field("name", name.clone()))? {
            self.id = doc.id;
            self.raw = doc.fields;
            // Stale keys from a previously active bundle are dropped.
            let declared = &self.schema.fields;
            self.raw.retain(|key, _| declared.contains_key(key));
            self.is_trashed = false;
        } else {
            let filter =
                Filter::by_field("type", self.entity_type.clone()).and("name", name.clone());
            let Some(record) = self.waste().find_one(&filter)? else {
                return Err(Error::EntityNotFound {
                    entity_type: self.entity_type.clone(),
                    key: "name".to_string(),
                    value: name,
                });
            };
            self.id = record.id;
            self.raw = match record.get("data").cloned() {
                Some(Value::Object(data)) => data,
                _ => BTreeMap::new(),
            };
            let declared = &self.schema.fields;
            self.raw.retain(|key, _| declared.contains_key(key));
            self.raw
                .entry("name".to_string())
                .or_insert_with(|| Value::String(name.clone()));
            self.is_trashed = true;
        }
        self.is_new = false;

        let bundle = self
            .raw
            .get("bundle")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.bundle = (!bundle.is_empty() && self.schema.has_bundle(&bundle)).then_some(bundle);

        self.initialize()?;
        let mut ctx = HookContext::for_event(Event::Loaded).with_data(self.raw_document());
        hooks::run(self, &mut ctx)
    }

    /// Invoke a schema-declared method
    ///
    /// The method map (schema `methods` plus plugin additions, adopted at
    /// initialization) resolves the name to an action key; the registered
    /// callable runs against the entity.
    ///
    /// # Errors
    ///
    /// `UndefinedAction` when the name is not in the method map or its key
    /// is unregistered, otherwise whatever the callable fails with.
    pub fn call(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        let action = self
            .methods
            .get(method)
            .cloned()
            .ok_or_else(|| Error::UndefinedAction(method.to_string()))?;
        let method_fn = self.runtime.actions().method(action.key())?;
        method_fn(self, args)
    }
}
