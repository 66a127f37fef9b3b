//! Created-by plugin
//!
//! Extends an entity with `createdOn`/`updatedOn` object fields holding
//! `{when, who}` stamps, a presave hook that fills them, and accessor
//! methods. Registered as `created_by` when the runtime is built.
//!
//! The stamp fields are optional: the presave hook fills them after
//! validation has already passed, so marking them required would fail
//! every first save before the hook had a chance to run.

use crate::actions::ActionRegistry;
use crate::entity::Entity;
use crate::hooks::HookContext;
use crate::plugins::{Plugin, PluginRegistry};
use chrono::Utc;
use entitydb_core::{Event, FieldDefinition, FieldType, HookRef, Result, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registered plugin name
pub const NAME: &str = "created_by";
/// Action key of the presave stamping hook
pub const STAMP_ACTION: &str = "created_by.stamp";

/// The created-by plugin
pub struct CreatedBy;

impl CreatedBy {
    /// Register the plugin and its actions on a runtime's registries
    pub fn install(plugins: &PluginRegistry, actions: &ActionRegistry) {
        plugins.register(
            NAME,
            "Created-by",
            "Stores who created/updated the entity, and when",
            Arc::new(CreatedBy),
        );
        actions.register_hook(STAMP_ACTION, stamp);
        actions.register_method("created_by.created_on", |entity, _args| {
            Ok(stamp_part(entity, "createdOn", "when"))
        });
        actions.register_method("created_by.created_by", |entity, _args| {
            Ok(stamp_part(entity, "createdOn", "who"))
        });
        actions.register_method("created_by.updated_on", |entity, _args| {
            Ok(stamp_part(entity, "updatedOn", "when"))
        });
        actions.register_method("created_by.updated_by", |entity, _args| {
            Ok(stamp_part(entity, "updatedOn", "who"))
        });
    }
}

impl Plugin for CreatedBy {
    fn apply(&self, entity: &mut Entity) -> Result<()> {
        let schema = entity.schema_mut();
        schema
            .fields
            .entry("createdOn".to_string())
            .or_insert_with(|| FieldDefinition::of_type(FieldType::Object));
        schema
            .fields
            .entry("updatedOn".to_string())
            .or_insert_with(|| FieldDefinition::of_type(FieldType::Object));
        schema
            .hooks
            .entry(Event::Presave)
            .or_default()
            .push(HookRef::new(STAMP_ACTION));

        schema.methods.insert(
            "created_on".to_string(),
            HookRef::new("created_by.created_on"),
        );
        schema.methods.insert(
            "created_by".to_string(),
            HookRef::new("created_by.created_by"),
        );
        schema.methods.insert(
            "updated_on".to_string(),
            HookRef::new("created_by.updated_on"),
        );
        schema.methods.insert(
            "updated_by".to_string(),
            HookRef::new("created_by.updated_by"),
        );
        Ok(())
    }
}

/// Presave hook: fill `createdOn` on first save, refresh `updatedOn` on
/// every save. Writes both the entity's raw data and the outgoing snapshot.
fn stamp(entity: &mut Entity, ctx: &mut HookContext) -> Result<()> {
    let mut fields = BTreeMap::new();
    fields.insert("when".to_string(), Value::Int(Utc::now().timestamp_millis()));
    fields.insert(
        "who".to_string(),
        ctx.actor.clone().unwrap_or_default().to_value(),
    );
    let stamp = Value::Object(fields);

    let unset = entity
        .raw_value("createdOn")
        .map_or(true, Value::is_null);
    if unset {
        entity.set_raw("createdOn", stamp.clone());
        if let Some(data) = ctx.data.as_mut() {
            data.fields.insert("createdOn".to_string(), stamp.clone());
        }
    }

    entity.set_raw("updatedOn", stamp.clone());
    if let Some(data) = ctx.data.as_mut() {
        data.fields.insert("updatedOn".to_string(), stamp);
    }
    Ok(())
}

/// Pull one half of a `{when, who}` stamp out of a raw field
fn stamp_part(entity: &Entity, field: &str, part: &str) -> Value {
    entity
        .raw_value(field)
        .and_then(Value::as_object)
        .and_then(|obj| obj.get(part))
        .cloned()
        .unwrap_or(Value::Null)
}
