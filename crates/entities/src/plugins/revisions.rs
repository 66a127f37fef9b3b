//! Revisions plugin
//!
//! Extends an entity with a `revisions` object field (revision name to
//! revision record) and a presave guard that refuses to overwrite a
//! locked revision. Opt-in: call [`Revisions::install`] and declare
//! `revisions` in the schema's plugin list.

use crate::actions::ActionRegistry;
use crate::entity::Entity;
use crate::hooks::HookContext;
use crate::plugins::{Plugin, PluginRegistry};
use entitydb_core::{Error, Event, FieldDefinition, FieldType, HookRef, Result, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registered plugin name
pub const NAME: &str = "revisions";
/// Action key of the presave lock guard
pub const GUARD_ACTION: &str = "revisions.guard";

/// The revisions plugin
pub struct Revisions;

impl Revisions {
    /// Register the plugin and its actions on a runtime's registries
    pub fn install(plugins: &PluginRegistry, actions: &ActionRegistry) {
        plugins.register(
            NAME,
            "Revisions",
            "Stores field revisions and guards locked revisions",
            Arc::new(Revisions),
        );
        actions.register_hook(GUARD_ACTION, guard);
        actions.register_method("revisions.has", |entity, args| {
            let name = args.first().and_then(Value::as_str).unwrap_or_default();
            Ok(Value::Bool(revision(entity, name).is_some()))
        });
        actions.register_method("revisions.get", |entity, args| {
            let name = args.first().and_then(Value::as_str).unwrap_or_default();
            Ok(revision(entity, name).unwrap_or(Value::Null))
        });
    }
}

impl Plugin for Revisions {
    fn apply(&self, entity: &mut Entity) -> Result<()> {
        let schema = entity.schema_mut();
        schema
            .fields
            .entry("revisions".to_string())
            .or_insert_with(|| {
                FieldDefinition::of_type(FieldType::Object)
                    .with_default(Value::Object(BTreeMap::new()))
            });
        schema
            .fields
            .entry("revision".to_string())
            .or_insert_with(|| FieldDefinition::of_type(FieldType::String));
        schema
            .hooks
            .entry(Event::Presave)
            .or_default()
            .push(HookRef::new(GUARD_ACTION));

        schema
            .methods
            .insert("has_revision".to_string(), HookRef::new("revisions.has"));
        schema
            .methods
            .insert("get_revision".to_string(), HookRef::new("revisions.get"));
        Ok(())
    }
}

/// Look up a named revision record in the entity's raw data
fn revision(entity: &Entity, name: &str) -> Option<Value> {
    entity
        .raw_value("revisions")
        .and_then(Value::as_object)
        .and_then(|revisions| revisions.get(name))
        .cloned()
}

/// Presave guard: fail the save when the active revision is locked
fn guard(entity: &mut Entity, ctx: &mut HookContext) -> Result<()> {
    let Some(active) = entity
        .raw_value("revision")
        .and_then(Value::as_str)
        .map(str::to_string)
    else {
        return Ok(());
    };

    let locked = revision(entity, &active)
        .as_ref()
        .and_then(Value::as_object)
        .and_then(|rev| rev.get("locked"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if locked {
        return Err(Error::HookAborted {
            hook: GUARD_ACTION.to_string(),
            event: ctx.event.to_string(),
            reason: format!("revision {active} is locked"),
        });
    }
    Ok(())
}
