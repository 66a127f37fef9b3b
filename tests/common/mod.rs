//! Shared harness for integration tests

use entitydb::{
    EntityRegistry, FieldDefinition, FieldType, MemoryStore, RecordingEventBus, Runtime, Schema,
};
use std::sync::Arc;

/// Everything a test needs: the store and bus for inspection, the
/// registry as the entry point.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub bus: Arc<RecordingEventBus>,
    pub registry: EntityRegistry,
}

pub fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let bus = Arc::new(RecordingEventBus::new());
    let runtime = Runtime::builder(store.clone()).with_bus(bus.clone()).build();
    Harness {
        store,
        bus,
        registry: EntityRegistry::new(runtime),
    }
}

/// A schema with one optional and one required field plus a bundle that
/// adds another required field.
pub fn test_schema() -> Schema {
    Schema::new()
        .with_field("test1", FieldDefinition::of_type(FieldType::String))
        .with_field(
            "test2",
            FieldDefinition::of_type(FieldType::String).required(),
        )
        .with_bundle("strict", {
            let mut overlay = entitydb::BundleFields::new();
            overlay.insert(
                "test3".to_string(),
                FieldDefinition::of_type(FieldType::String).required(),
            );
            overlay
        })
}
