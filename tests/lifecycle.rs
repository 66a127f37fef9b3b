//! End-to-end entity lifecycle scenarios through the public facade

mod common;

use common::{harness, test_schema};
use entitydb::{
    Actor, BundleFields, DocumentStore, Error, FieldDefinition, FieldType, Filter, Schema, Value,
    WASTE_COLLECTION,
};
use std::collections::BTreeMap;

#[test]
fn save_blocks_until_every_required_field_is_set() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();

    let mut thing = h.registry.create("thing", None).unwrap();
    thing.set("test1", "optional, present anyway").unwrap();
    assert!(matches!(
        thing.save(Actor::System),
        Err(Error::RequiredField(field)) if field == "name"
    ));

    thing.set("name", "sample").unwrap();
    assert!(matches!(
        thing.save(Actor::System),
        Err(Error::RequiredField(field)) if field == "test2"
    ));

    thing.set("test2", "now present").unwrap();
    thing.save(Actor::System).unwrap();
    assert!(thing.id().is_some());
}

#[test]
fn bundle_overlay_adds_required_fields() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();

    let mut thing = h.registry.create("thing", Some("strict")).unwrap();
    thing.set("name", "sample").unwrap();
    thing.set("test2", "present").unwrap();
    assert!(matches!(
        thing.save(Actor::System),
        Err(Error::RequiredField(field)) if field == "test3"
    ));

    // Overlay-only fields are declared but not settable through set().
    assert!(thing.get_field("test3").is_ok());
    assert!(matches!(
        thing.set("test3", "nope"),
        Err(Error::UnknownField(_))
    ));
    thing.set_raw("test3", Value::from("present too"));
    thing.save(Actor::System).unwrap();
}

#[test]
fn bundle_overlay_replaces_field_definitions() {
    let h = harness();
    let schema = test_schema().with_bundle("loose", {
        let mut overlay = BundleFields::new();
        overlay.insert(
            "test2".to_string(),
            FieldDefinition::of_type(FieldType::Boolean),
        );
        overlay
    });
    h.registry.register("thing", schema).unwrap();

    let mut thing = h.registry.create("thing", Some("loose")).unwrap();
    let fld = thing.get_field("test2").unwrap();
    assert_eq!(fld.field_type, Some(FieldType::Boolean));
    assert!(!fld.required);

    // The overlay governs validation of the (base-declared) field.
    thing.set("name", "sample").unwrap();
    thing.set("test2", true).unwrap();
    thing.save(Actor::System).unwrap();
}

#[test]
fn batch_set_then_validate_reports_missing_required_field() {
    let h = harness();
    let schema = Schema::new()
        .with_field(
            "test1",
            FieldDefinition::of_type(FieldType::String).required(),
        )
        .with_field(
            "test2",
            FieldDefinition::of_type(FieldType::String).required(),
        )
        .with_field(
            "test3",
            FieldDefinition::of_type(FieldType::String).required(),
        );
    h.registry.register("thing", schema).unwrap();

    let mut thing = h.registry.create("thing", None).unwrap();
    thing.set("name", "sample").unwrap();
    let mut batch = BTreeMap::new();
    batch.insert("test1".to_string(), Value::from("hello"));
    batch.insert("test3".to_string(), Value::from("world"));
    thing.set_many(batch).unwrap();

    assert!(matches!(
        thing.validate(),
        Err(Error::RequiredField(field)) if field == "test2"
    ));
    thing.set("test2", "now").unwrap();
    thing.validate().unwrap();
}

#[test]
fn trash_and_restore_round_trip() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();

    let mut thing = h.registry.create("thing", None).unwrap();
    thing.set("name", "sample").unwrap();
    thing.set("test2", "payload").unwrap();
    thing.save(Actor::System).unwrap();
    let id = thing.id();

    thing.trash(Actor::System).unwrap();
    assert!(thing.is_trashed());
    assert!(!h.registry.exists("thing", "sample").unwrap());

    thing.restore(Actor::System).unwrap();
    assert!(!thing.is_trashed());
    assert_eq!(thing.id(), id);
    assert_eq!(thing.get("test2").unwrap(), Value::from("payload"));
    assert!(h.registry.exists("thing", "sample").unwrap());

    let waste = h.store.collection(WASTE_COLLECTION);
    assert_eq!(waste.count(&Filter::all()).unwrap(), 0);
}

#[test]
fn double_trash_leaves_exactly_one_waste_record() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();

    let mut thing = h.registry.create("thing", None).unwrap();
    thing.set("name", "sample").unwrap();
    thing.set("test2", "payload").unwrap();
    thing.save(Actor::System).unwrap();

    thing.trash(Actor::System).unwrap();
    assert!(matches!(
        thing.trash(Actor::System),
        Err(Error::CantTrashTrashed)
    ));

    let waste = h.store.collection(WASTE_COLLECTION);
    assert_eq!(waste.count(&Filter::by_field("name", "sample")).unwrap(), 1);
}

#[test]
fn trashed_entity_refuses_saves_until_restored() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();

    let mut thing = h.registry.create("thing", None).unwrap();
    thing.set("name", "sample").unwrap();
    thing.set("test2", "payload").unwrap();
    thing.save(Actor::System).unwrap();
    thing.trash(Actor::System).unwrap();

    assert!(matches!(
        thing.save(Actor::System),
        Err(Error::CantSaveTrashed { .. })
    ));

    thing.restore(Actor::System).unwrap();
    thing.set("test2", "edited").unwrap();
    thing.save(Actor::System).unwrap();
}

#[test]
fn loading_a_trashed_entity_marks_it_trashed() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();

    let mut thing = h.registry.create("thing", None).unwrap();
    thing.set("name", "sample").unwrap();
    thing.set("test2", "payload").unwrap();
    thing.save(Actor::System).unwrap();
    thing.trash(Actor::System).unwrap();

    let mut loaded = h.registry.load("thing", "sample").unwrap();
    assert!(loaded.is_trashed());
    assert_eq!(loaded.get("test2").unwrap(), Value::from("payload"));

    loaded.restore(Actor::System).unwrap();
    assert!(h.registry.exists("thing", "sample").unwrap());
}

#[test]
fn delete_destroys_primary_and_waste_records() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();

    let mut thing = h.registry.create("thing", None).unwrap();
    thing.set("name", "sample").unwrap();
    thing.set("test2", "payload").unwrap();
    thing.save(Actor::System).unwrap();
    thing.trash(Actor::System).unwrap();
    thing.delete().unwrap();

    assert!(thing.is_new());
    assert!(matches!(
        h.registry.load("thing", "sample"),
        Err(Error::EntityNotFound { .. })
    ));
}

#[test]
fn lifecycle_events_reach_both_channels() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();

    let mut thing = h.registry.create("thing", None).unwrap();
    thing.set("name", "sample").unwrap();
    thing.set("test2", "payload").unwrap();
    h.bus.clear();
    thing.save(Actor::System).unwrap();

    assert_eq!(h.bus.count("entities[thing].presave"), 1);
    assert_eq!(h.bus.count("entities[thing].saved"), 1);
    assert_eq!(h.bus.count("entities.saved"), 1);

    h.bus.clear();
    thing.trash(Actor::System).unwrap();
    assert_eq!(h.bus.count("entities[thing].pretrash"), 1);
    assert_eq!(h.bus.count("entities[thing].trashed"), 1);
}

#[test]
fn failed_operations_do_not_notify() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();

    let mut thing = h.registry.create("thing", None).unwrap();
    thing.set("name", "sample").unwrap();
    h.bus.clear();

    // Missing required test2 fails validation before presave runs.
    assert!(thing.save(Actor::System).is_err());
    assert_eq!(h.bus.count("entities[thing].presave"), 0);
    assert_eq!(h.bus.count("entities[thing].saved"), 0);
}

#[test]
fn created_by_plugin_survives_persistence() {
    let h = harness();
    h.registry
        .register("audited", test_schema().with_plugin("created_by"))
        .unwrap();

    let mut thing = h.registry.create("audited", None).unwrap();
    thing.set("name", "sample").unwrap();
    thing.set("test2", "payload").unwrap();
    thing.save(Actor::System).unwrap();

    assert!(matches!(
        thing.call("created_on", &[]).unwrap(),
        Value::Int(_)
    ));
    assert_eq!(
        thing.call("created_by", &[]).unwrap(),
        Value::from("system")
    );

    // Reload and check the stamps were stored, not just held in memory.
    let mut loaded = h.registry.load("audited", "sample").unwrap();
    assert!(loaded.has("createdOn"));
    assert!(matches!(
        loaded.call("updated_on", &[]).unwrap(),
        Value::Int(_)
    ));
}

#[test]
fn entity_actor_is_recorded_in_waste_metadata() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();
    h.registry.register("user", test_schema()).unwrap();

    let mut admin = h.registry.create("user", None).unwrap();
    admin.set("name", "admin").unwrap();
    admin.set("test2", "x").unwrap();
    admin.save(Actor::System).unwrap();

    let mut thing = h.registry.create("thing", None).unwrap();
    thing.set("name", "sample").unwrap();
    thing.set("test2", "payload").unwrap();
    thing.save(Actor::System).unwrap();
    thing.trash(admin.actor()).unwrap();

    let waste = h.store.collection(WASTE_COLLECTION);
    let record = waste
        .find_one(&Filter::by_field("name", "sample"))
        .unwrap()
        .unwrap();
    let trashed_on = record.get("trashedOn").unwrap().as_object().unwrap();
    let who = trashed_on.get("who").unwrap().as_object().unwrap();
    assert_eq!(who.get("type"), Some(&Value::from("user")));
}
