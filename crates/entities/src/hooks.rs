//! Hook pipeline
//!
//! Two separable halves:
//!
//! 1. [`execute`] — the ordered hook-chain executor. Runs an event's hooks
//!    in registration order against the entity; the first failure aborts
//!    the remaining hooks and is returned unchanged.
//! 2. [`notify`] — the post-success notification. Dispatches the context
//!    payload on the global channels `entities[<type>].<event>` and
//!    `entities.<event>`. Never runs when execution failed.
//!
//! [`run`] chains the two, which is what every lifecycle operation uses.

use crate::entity::Entity;
use entitydb_core::{Actor, Document, Event, Result, Value};
use std::collections::BTreeMap;

/// Context handed to every hook of one event execution
///
/// Hooks receive the context mutably and may rewrite it; the operation
/// that ran the pipeline reads the (possibly rewritten) context back.
/// Which slots are populated depends on the event: `set` carries
/// field/original/value, `presave` carries data and actor, and so on.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// The lifecycle event being executed
    pub event: Event,
    /// The field being assigned (`set` only)
    pub field: Option<String>,
    /// The caller's original argument, untouched by hooks (`set` only)
    pub original: Option<Value>,
    /// The value about to be committed; hooks may rewrite it (`set` only)
    pub value: Option<Value>,
    /// The data snapshot being persisted or adopted
    pub data: Option<Document>,
    /// The responsible actor, when the operation records one
    pub actor: Option<Actor>,
}

impl HookContext {
    /// An empty context for the event
    pub fn for_event(event: Event) -> Self {
        HookContext {
            event,
            field: None,
            original: None,
            value: None,
            data: None,
            actor: None,
        }
    }

    /// Populate the field-assignment slots (builder style)
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>, value: Value) -> Self {
        self.field = Some(field.into());
        self.original = Some(value.clone());
        self.value = Some(value);
        self
    }

    /// Populate the data snapshot (builder style)
    #[must_use]
    pub fn with_data(mut self, data: Document) -> Self {
        self.data = Some(data);
        self
    }

    /// Populate the actor descriptor (builder style)
    #[must_use]
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    /// The payload dispatched on the global channels
    pub fn payload(&self, entity_type: &str) -> Value {
        let mut map = BTreeMap::new();
        map.insert("type".to_string(), Value::String(entity_type.to_string()));
        map.insert("event".to_string(), Value::String(self.event.to_string()));
        if let Some(field) = &self.field {
            map.insert("field".to_string(), Value::String(field.clone()));
        }
        if let Some(value) = &self.value {
            map.insert("value".to_string(), value.clone());
        }
        if let Some(data) = &self.data {
            map.insert("data".to_string(), Value::Object(data.fields.clone()));
        }
        if let Some(actor) = &self.actor {
            map.insert("actor".to_string(), actor.to_value());
        }
        Value::Object(map)
    }
}

/// Execute an event's hooks in registration order, fail-fast
///
/// Hook callables are resolved from the runtime action registry by key;
/// an unregistered key fails the chain with `UndefinedAction`.
pub fn execute(entity: &mut Entity, ctx: &mut HookContext) -> Result<()> {
    let hooks = entity
        .schema()
        .hooks
        .get(&ctx.event)
        .cloned()
        .unwrap_or_default();

    for hook in hooks {
        let hook_fn = entity.runtime().actions().hook(hook.key())?;
        hook_fn(entity, ctx)?;
    }
    Ok(())
}

/// Dispatch the post-success notification for an executed event
pub fn notify(entity: &Entity, ctx: &HookContext) {
    let channels = ctx.event.channels(entity.entity_type());
    entity
        .runtime()
        .bus()
        .dispatch(&channels, &ctx.payload(entity.entity_type()));
}

/// Execute the hooks and, on full success, dispatch the notification
pub fn run(entity: &mut Entity, ctx: &mut HookContext) -> Result<()> {
    tracing::debug!(
        entity_type = entity.entity_type(),
        event = %ctx.event,
        "running hook pipeline"
    );
    execute(entity, ctx)?;
    notify(entity, ctx);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_builders_populate_slots() {
        let ctx = HookContext::for_event(Event::Set).with_field("title", Value::Int(1));
        assert_eq!(ctx.field.as_deref(), Some("title"));
        assert_eq!(ctx.original, Some(Value::Int(1)));
        assert_eq!(ctx.value, Some(Value::Int(1)));

        let ctx = HookContext::for_event(Event::Presave)
            .with_data(Document::new().with("name", "front"))
            .with_actor(Actor::System);
        assert!(ctx.data.is_some());
        assert_eq!(ctx.actor, Some(Actor::System));
    }

    #[test]
    fn payload_carries_event_and_type() {
        let ctx = HookContext::for_event(Event::Saved).with_actor(Actor::System);
        let payload = ctx.payload("page");
        let obj = payload.as_object().unwrap();
        assert_eq!(obj.get("type"), Some(&Value::String("page".to_string())));
        assert_eq!(obj.get("event"), Some(&Value::String("saved".to_string())));
        assert_eq!(obj.get("actor"), Some(&Value::String("system".to_string())));
        assert!(obj.get("field").is_none());
    }
}
